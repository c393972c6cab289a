//! Network loading from files

pub mod json;
pub mod parquet;

use anyhow::{bail, Result};

use crate::network::InMemoryNetwork;

/// Load a network, picking the reader from the file extension.
///
/// Parquet files are read as edge tables with the given endpoint columns;
/// `.json` files as network documents.
pub fn load_network(path: &str, source_col: &str, target_col: &str) -> Result<InMemoryNetwork> {
    let extension = std::path::Path::new(path)
        .extension()
        .and_then(|e| e.to_str())
        .map(str::to_ascii_lowercase);

    match extension.as_deref() {
        Some("parquet") => parquet::load_network_parquet(path, source_col, target_col),
        Some("json") => json::load_network_json(path),
        _ => bail!("Unsupported input format: {} (expected .json or .parquet)", path),
    }
}
