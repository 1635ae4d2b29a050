//! Domain layer: entities and allocation logic
//!
//! This layer is independent of external concerns (no I/O, no CLI, no config loading).

pub mod arena;
pub mod builder;
pub mod entities;
pub mod error;

pub use arena::{AllocationTree, BudgetNode, TreeIterator, PATH_SEPARATOR};
pub use builder::{TreeBuilder, DEFAULT_ROOT_NAME};
pub use entities::*;
pub use error::{DomainError, DomainResult};
