//! Parquet edge tables

use std::collections::HashMap;

use anyhow::{anyhow, Result};
use polars::prelude::*;

use crate::attributes::AttrValue;
use crate::network::InMemoryNetwork;

/// Load an edge table into a network.
///
/// `source_col` and `target_col` name the endpoint columns; every other
/// column becomes an edge attribute typed from its dtype. Nulls leave the
/// attribute unset on that edge.
pub fn load_network_parquet(path: &str, source_col: &str, target_col: &str) -> Result<InMemoryNetwork> {
    log::info!("Reading parquet file: {}", path);

    // Check if the file exists
    if !std::path::Path::new(path).exists() {
        return Err(anyhow!("File not found: {}", path));
    }

    let df = LazyFrame::scan_parquet(path, Default::default())?.collect()?;
    log::info!("File schema: {:?}", df.schema());
    log::info!("Loaded {} edge rows", df.height());

    let sources = df.column(source_col)?.cast(&DataType::String)?;
    let targets = df.column(target_col)?.cast(&DataType::String)?;
    let sources = sources.str()?;
    let targets = targets.str()?;

    let attribute_columns: Vec<(String, Vec<Option<AttrValue>>)> = df
        .get_column_names()
        .into_iter()
        .filter(|name| name.as_str() != source_col && name.as_str() != target_col)
        .map(|name| {
            let values = column_values(df.column(name.as_str())?)?;
            Ok((name.to_string(), values))
        })
        .collect::<Result<_>>()?;

    let name = std::path::Path::new(path)
        .file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or("network");
    let mut network = InMemoryNetwork::new(name);

    for row in 0..df.height() {
        let (Some(src), Some(dst)) = (sources.get(row), targets.get(row)) else {
            log::debug!("Skipping row {} with a missing endpoint", row);
            continue;
        };

        let attributes: HashMap<String, AttrValue> = attribute_columns
            .iter()
            .filter_map(|(name, values)| values[row].clone().map(|v| (name.clone(), v)))
            .collect();
        network.add_edge(src, dst, attributes);
    }

    log::info!(
        "Built network '{}' with {} nodes and {} edges",
        network.name(),
        network.node_count(),
        network.edge_count()
    );
    Ok(network)
}

/// Convert one column into attribute values, one per row
fn column_values(column: &Column) -> Result<Vec<Option<AttrValue>>> {
    let dtype = column.dtype().clone();

    let values = if dtype.is_float() {
        let cast = column.cast(&DataType::Float64)?;
        cast.f64()?.into_iter().map(|v| v.map(AttrValue::Floating)).collect()
    } else if dtype.is_integer() {
        let cast = column.cast(&DataType::Int64)?;
        cast.i64()?.into_iter().map(|v| v.map(AttrValue::Integer)).collect()
    } else if dtype == DataType::Boolean {
        column.bool()?.into_iter().map(|v| v.map(AttrValue::Boolean)).collect()
    } else {
        let cast = column.cast(&DataType::String)?;
        cast.str()?
            .into_iter()
            .map(|v| v.map(|s| AttrValue::String(s.to_string())))
            .collect()
    };

    Ok(values)
}
