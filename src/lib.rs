//! Core library for quality-driven graph clustering: cached graph conversion,
//! incremental node set scoring, and cluster status/affinity annotation

pub mod attributes;
pub mod cluster;
pub mod config;
pub mod data;
pub mod error;
pub mod graph;
pub mod mediator;
pub mod network;
pub mod session;
pub mod storage;
pub mod task;

pub use error::{EngineError, Result};
pub use session::{ClusteringResult, ClusteringSession, RunOutcome};
