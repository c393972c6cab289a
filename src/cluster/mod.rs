//! Cluster analysis module: node sets, quality functions, growth and annotation

pub mod nodeset;
pub mod quality;
pub mod growth;
pub mod annotate;

pub use annotate::{AnnotationOutcome, NodeStatus, ATTRIBUTE_AFFINITY, ATTRIBUTE_STATUS};
pub use growth::{ClusteringAlgorithm, GreedyGrowth};
pub use nodeset::{MutableNodeSet, NodeSet, NodeSetView, SetStatistics, ValuedNodeSet};
pub use quality::{CohesivenessFunction, DensityFunction, QualityFunction};
