//! Error types for graph conversion, clustering runs and annotation

use thiserror::Error;

use crate::attributes::AttrType;

/// Result type alias for engine operations.
pub type Result<T> = std::result::Result<T, EngineError>;

/// Errors surfaced by the clustering engine.
#[derive(Error, Debug)]
pub enum EngineError {
    /// The weight attribute holds a value that is not a number on some edge.
    #[error("weight attribute '{attribute}' on edge {edge} is not numeric: {value}")]
    NonNumericAttribute {
        attribute: String,
        edge: usize,
        value: String,
    },

    /// The weight attribute is numeric but negative or not finite.
    #[error("weight attribute '{attribute}' on edge {edge} must be a non-negative finite number, got {value}")]
    InvalidWeight {
        attribute: String,
        edge: usize,
        value: f64,
    },

    /// The converted graph has no edges, so there is nothing to cluster.
    ///
    /// Self-loops are dropped during conversion, so a network whose only
    /// edges are self-loops ends up here too.
    #[error("the selected network contains no edges")]
    EmptyGraph,

    /// A node attribute already exists with a type other than the one required.
    #[error("node attribute '{attribute}' already exists as {found:?}, expected {expected:?}")]
    AttributeTypeMismatch {
        attribute: String,
        expected: AttrType,
        found: AttrType,
    },

    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    /// The clustering task failed on its worker.
    #[error("clustering task failed: {0}")]
    TaskFailed(String),
}
