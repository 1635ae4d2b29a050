//! Domain-level errors (no external dependencies)

use thiserror::Error;

/// Domain errors represent allocation rule violations.
/// These are independent of infrastructure concerns.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum DomainError {
    #[error("weight configuration has no categories")]
    EmptyConfig,

    #[error("invalid amount: {0}")]
    InvalidAmount(f64),

    #[error("invalid weight for {name}: {weight}")]
    InvalidWeight { name: String, weight: f64 },

    #[error("top-level weights sum to {sum}, leaving a negative weight for {last}")]
    TopLevelWeightsExceedOne { sum: f64, last: String },

    #[error("all categories under {parent} have zero weight")]
    ZeroWeightGroup { parent: String },

    #[error("unknown top-level category: {0}")]
    UnknownCategory(String),

    #[error("category name clashes with the root: {0}")]
    RootNameClash(String),

    #[error("node is not a leaf: {0}")]
    NotALeaf(String),

    #[error("node not found in tree")]
    NodeNotFound,
}

/// Result type for domain operations.
pub type DomainResult<T> = Result<T, DomainError>;
