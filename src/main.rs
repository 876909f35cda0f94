mod cli;

use std::path::Path;
use std::time::Instant;

use anyhow::{Context, Result};
use clap::Parser;
use tracing::Level;

use code_topology::classify::ConventionClassifier;
use code_topology::config::TopologyConfig;
use code_topology::export::export_topology;
use code_topology::graph::{DependencyGraph, GraphBuilder};
use code_topology::output;
use code_topology::parser::patterns::ImportPatterns;
use code_topology::topology::model::{ClusteringStrategy, LayoutAlgorithm, NetworkTopology};
use code_topology::topology::{TopologyBuilder, TopologyOptions};
use code_topology::walker::scan_project;

use cli::{Cli, Commands};

/// Diagnostics go to stderr so stdout stays clean for JSON consumers.
fn init_tracing(verbose: bool) {
    let level = if verbose { Level::DEBUG } else { Level::WARN };
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_max_level(level)
        .with_target(false)
        .init();
}

/// Load the config, scan the project and build its dependency graph.
fn analyze_project(
    path: &Path,
    verbose: bool,
) -> Result<(TopologyConfig, ConventionClassifier, DependencyGraph)> {
    let config = TopologyConfig::load(path);
    let files = scan_project(path, &config, verbose)?;
    let classifier = ConventionClassifier::from_config(&config)
        .context("invalid entry pattern in code-topology.toml")?;
    let graph = GraphBuilder::new(ImportPatterns::shared(), config.resolver.extensions.clone())
        .build(files, &classifier);
    Ok((config, classifier, graph))
}

fn build_topology(
    path: &Path,
    verbose: bool,
    layout: Option<LayoutAlgorithm>,
    clustering: Option<ClusteringStrategy>,
) -> Result<NetworkTopology> {
    let (config, classifier, graph) = analyze_project(path, verbose)?;
    let mut options = TopologyOptions::from_config(&config);
    if let Some(layout) = layout {
        options.layout = layout;
    }
    if let Some(clustering) = clustering {
        options.clustering = clustering;
    }
    let topology = TopologyBuilder::new(&classifier)
        .with_options(options)
        .build(&graph)
        .context("failed to build network topology")?;
    Ok(topology)
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let verbose = match &cli.command {
        Commands::Analyze { verbose, .. } | Commands::Topology { verbose, .. } => *verbose,
        Commands::Cycles { .. } | Commands::Export { .. } => false,
    };
    init_tracing(verbose);

    match cli.command {
        Commands::Analyze {
            path,
            verbose,
            json,
        } => {
            let start = Instant::now();
            let (_, _, graph) = analyze_project(&path, verbose)?;
            let elapsed = start.elapsed().as_secs_f64();
            output::print_dependency_summary(&graph.stats(), elapsed, json);
        }

        Commands::Cycles { path, json } => {
            let (_, _, graph) = analyze_project(&path, false)?;
            output::print_cycle_reports(&graph.cycle_reports(), json);
        }

        Commands::Topology {
            path,
            layout,
            clustering,
            json,
            verbose,
        } => {
            let topology = build_topology(&path, verbose, layout, clustering)?;
            output::print_topology_summary(&topology, json);
        }

        Commands::Export {
            path,
            format,
            layout,
            clustering,
            output,
        } => {
            let topology = build_topology(&path, false, layout, clustering)?;
            let result = export_topology(&topology, format)?;
            match output {
                Some(out_path) => {
                    std::fs::write(&out_path, &result.content)
                        .with_context(|| format!("failed to write {}", out_path.display()))?;
                    eprintln!(
                        "Exported {} nodes, {} edges to {}",
                        result.node_count,
                        result.edge_count,
                        out_path.display()
                    );
                }
                None => print!("{}", result.content),
            }
        }
    }

    Ok(())
}
