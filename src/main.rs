use std::sync::Arc;

use anyhow::Result;
use clap::Parser;

use cohesion_cluster::attributes::NodeAttributes;
use cohesion_cluster::config::{ClusteringConfig, QualityKind};
use cohesion_cluster::mediator::LogMediator;
use cohesion_cluster::network::events::EventBus;
use cohesion_cluster::{data, storage, ClusteringSession, RunOutcome};

#[derive(Parser, Debug)]
#[clap(
    name = "cohesion-cluster",
    about = "Find cohesive, possibly overlapping clusters in weighted networks"
)]
struct Cli {
    /// Path to the input network (.json document or .parquet edge table)
    #[clap(long)]
    input: String,

    /// Output directory for results
    #[clap(long, default_value = "cluster_results")]
    output_dir: String,

    /// Edge attribute holding edge weights; all weights are 1.0 when omitted
    #[clap(long)]
    weight_attr: Option<String>,

    /// Source column of a parquet edge table
    #[clap(long, default_value = "source")]
    source_col: String,

    /// Target column of a parquet edge table
    #[clap(long, default_value = "target")]
    target_col: String,

    /// JSON file with clustering parameters
    #[clap(long)]
    config: Option<String>,

    /// Minimum cluster size
    #[clap(long)]
    min_size: Option<usize>,

    /// Minimum cluster density
    #[clap(long)]
    min_density: Option<f64>,

    /// Boundary penalty of the cohesiveness function
    #[clap(long)]
    penalty: Option<f64>,

    /// Quality function: cohesiveness or density
    #[clap(long)]
    quality: Option<QualityKind>,

    /// Also write node affinities to the cluster with this rank (0 = best)
    #[clap(long)]
    affinity_cluster: Option<usize>,

    /// Replace conflicting node attributes without asking
    #[clap(long)]
    yes: bool,

    /// Number of worker threads (0 = use all available cores)
    #[clap(long, default_value = "0")]
    threads: usize,

    /// Verbose logging
    #[clap(long, short)]
    verbose: bool,
}

impl Cli {
    fn clustering_config(&self) -> Result<ClusteringConfig> {
        let mut config = match &self.config {
            Some(path) => ClusteringConfig::from_json_file(path)?,
            None => ClusteringConfig::default(),
        };

        if let Some(min_size) = self.min_size {
            config.min_size = min_size;
        }
        if let Some(min_density) = self.min_density {
            config.min_density = min_density;
        }
        if let Some(penalty) = self.penalty {
            config.penalty = penalty;
        }
        if let Some(quality) = self.quality {
            config.quality = quality;
        }

        config.validate()?;
        Ok(config)
    }
}

fn main() -> Result<()> {
    // Parse command line arguments
    let args = Cli::parse();

    // Configure logging
    let log_level = if args.verbose {
        log::LevelFilter::Debug
    } else {
        log::LevelFilter::Info
    };

    env_logger::Builder::new()
        .filter_level(log_level)
        .format_timestamp_millis()
        .init();

    // Set number of threads
    let num_threads = if args.threads > 0 {
        args.threads
    } else {
        num_cpus::get()
    };

    log::info!("Using {} worker threads", num_threads);
    rayon::ThreadPoolBuilder::new()
        .num_threads(num_threads)
        .build_global()?;

    let config = args.clustering_config()?;
    log::info!("Starting cluster analysis");
    log::info!("Input: {}", args.input);
    log::info!("Output: {}", args.output_dir);
    log::debug!("Configuration: {:?}", config);

    std::fs::create_dir_all(&args.output_dir)?;

    // 1. Load network
    let events = Arc::new(EventBus::new());
    let network = data::load_network(&args.input, &args.source_col, &args.target_col)?
        .with_events(events.clone());

    // 2. Cluster
    let session = ClusteringSession::new(events.as_ref(), Arc::new(LogMediator::new(args.yes)));
    let mut attributes = NodeAttributes::new();
    let outcome = session.run(
        &network,
        &config,
        args.weight_attr.as_deref(),
        Some(&mut attributes),
    )?;

    let result = match outcome {
        RunOutcome::Completed(result) => result,
        RunOutcome::Cancelled => {
            log::warn!("Clustering was cancelled; nothing saved");
            return Ok(());
        }
    };

    log::info!("Found {} clusters", result.clusters.len());

    // 3. Affinity to one chosen cluster
    if let Some(rank) = args.affinity_cluster {
        match result.clusters.get(rank) {
            Some(cluster) => {
                session.annotate_affinity(&cluster.set, &config, &mut attributes)?;
            }
            None => log::warn!(
                "No cluster with rank {} (found {}); affinities not computed",
                rank,
                result.clusters.len()
            ),
        }
    }

    // 4. Save results
    storage::save_results(&result, &attributes, &args.output_dir)?;

    log::info!("Analysis complete. Results saved to {}", args.output_dir);

    Ok(())
}
