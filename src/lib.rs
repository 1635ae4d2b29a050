//! budgettree: hierarchical investment budget planner.
//!
//! A total amount is split top-down across weighted categories; every actual
//! investment entered at a leaf is aggregated upwards and the remaining budget
//! is redistributed among the categories not yet invested.

pub mod application;
pub mod cli;
pub mod config;
pub mod domain;
pub mod exitcode;
pub mod infrastructure;
pub mod util;

pub use domain::{AllocationTree, TreeBuilder, WeightConfig};
