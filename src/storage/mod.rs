//! Results persistence module

use std::fs::{self, File};
use std::io::Write;
use std::path::Path;

use anyhow::Result;
use serde_json::{json, to_string_pretty};
use statrs::statistics::Statistics;

use crate::attributes::NodeAttributes;
use crate::cluster::annotate::{classify, summarize};
use crate::cluster::nodeset::NodeSetView;
use crate::cluster::quality::normalize_nan;
use crate::session::ClusteringResult;

/// Save a clustering result and the node attributes to the specified directory
pub fn save_results(result: &ClusteringResult, attributes: &NodeAttributes, output_dir: &str) -> Result<()> {
    log::info!("Saving {} clusters to {}", result.clusters.len(), output_dir);

    // Ensure output directory exists
    fs::create_dir_all(output_dir)?;

    save_summary(result, output_dir)?;
    save_clusters(result, output_dir)?;
    save_attributes(attributes, output_dir)?;

    log::info!("Results saved successfully");

    Ok(())
}

/// Save summary information
fn save_summary(result: &ClusteringResult, output_dir: &str) -> Result<()> {
    log::info!("Saving summary information");

    let path = Path::new(output_dir).join("summary.json");
    let mut file = File::create(path)?;

    let graph = &result.graph;
    let clusters = &result.clusters;
    let qualities: Vec<f64> = clusters.iter().map(|c| c.quality).collect();
    let sizes: Vec<f64> = clusters.iter().map(|c| c.len() as f64).collect();
    let statuses = summarize(&classify(graph, clusters));

    let summary = json!({
        "graph_stats": {
            "node_count": graph.node_count(),
            "edge_count": graph.edge_count(),
            "total_weight": graph.total_weight(),
            "avg_weighted_degree": normalize_nan(
                2.0 * graph.total_weight() / graph.node_count() as f64
            ),
        },
        "cluster_stats": {
            "cluster_count": clusters.len(),
            "largest_cluster_size": Iterator::max(clusters.iter().map(|c| c.len())).unwrap_or(0),
            "smallest_cluster_size": Iterator::min(clusters.iter().map(|c| c.len())).unwrap_or(0),
            "avg_cluster_size": normalize_nan(sizes.iter().mean()),
            "avg_quality": normalize_nan(qualities.iter().mean()),
            "quality_std_dev": normalize_nan(qualities.iter().std_dev()),
        },
        "node_status": statuses,
    });

    file.write_all(to_string_pretty(&summary)?.as_bytes())?;

    Ok(())
}

/// Save every cluster with its members' external identifiers
fn save_clusters(result: &ClusteringResult, output_dir: &str) -> Result<()> {
    log::info!("Saving individual cluster information");

    let path = Path::new(output_dir).join("clusters.json");
    let mut file = File::create(path)?;

    let clusters_json = json!({
        "clusters": result.clusters.iter().enumerate().map(|(id, c)| {
            json!({
                "id": id,
                "size": c.len(),
                "quality": c.quality,
                "density": c.set.density(),
                "members": c.set.member_ids(),
            })
        }).collect::<Vec<_>>()
    });

    file.write_all(to_string_pretty(&clusters_json)?.as_bytes())?;

    Ok(())
}

/// Save the node attribute store
fn save_attributes(attributes: &NodeAttributes, output_dir: &str) -> Result<()> {
    log::info!("Saving node attributes");

    let path = Path::new(output_dir).join("node_attributes.json");
    let mut file = File::create(path)?;
    file.write_all(to_string_pretty(attributes)?.as_bytes())?;

    Ok(())
}
