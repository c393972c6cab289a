//! Graph representation, construction and caching module

pub mod weighted;
pub mod builder;
pub mod algorithms;
pub mod cache;

pub use builder::GraphBuilder;
pub use cache::GraphCache;
pub use weighted::{Edge, WeightedGraph};
