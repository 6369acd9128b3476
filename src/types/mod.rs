//! Core data types shared across forge adapters.

pub mod forge;
pub mod options;
pub mod repo;

pub use forge::ForgeKind;
pub use options::{filter_repositories, ArchivedFilter, ForkFilter, ListOptions};
pub use repo::{Repository, Tag};
