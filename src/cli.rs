use std::path::PathBuf;

use clap::{Parser, Subcommand};

use code_topology::export::model::ExportFormat;
use code_topology::topology::model::{ClusteringStrategy, LayoutAlgorithm};

/// Dependency graph and network topology analysis for TypeScript/JavaScript projects.
///
/// code-topology scans a project's import statements into a file-level dependency
/// graph, then groups, lays out and annotates it as a network topology.
#[derive(Parser, Debug)]
#[command(
    name = "code-topology",
    version,
    about,
    long_about = None,
    propagate_version = true,
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Build the dependency graph and print summary statistics.
    Analyze {
        /// Path to the project root to analyze.
        path: PathBuf,

        /// Print each discovered file and every unresolved import.
        #[arg(short, long)]
        verbose: bool,

        /// Output results as JSON instead of human-readable text.
        #[arg(long)]
        json: bool,
    },

    /// Detect circular dependencies in the import graph (file-level).
    ///
    /// Each cycle is reported with a severity and the weakest link to cut.
    Cycles {
        /// Path to the project root to analyze.
        path: PathBuf,

        /// Output results as JSON instead of human-readable text.
        #[arg(long)]
        json: bool,
    },

    /// Build the network topology and print metrics, clusters and patterns.
    Topology {
        /// Path to the project root to analyze.
        path: PathBuf,

        /// Layout algorithm (overrides the config file).
        #[arg(long, value_enum)]
        layout: Option<LayoutAlgorithm>,

        /// Clustering strategy (overrides the config file).
        #[arg(long, value_enum)]
        clustering: Option<ClusteringStrategy>,

        /// Print the whole topology as JSON.
        #[arg(long)]
        json: bool,

        /// Print each discovered file and every unresolved import.
        #[arg(short, long)]
        verbose: bool,
    },

    /// Export the network topology as JSON or Graphviz DOT.
    Export {
        /// Path to the project root to analyze.
        path: PathBuf,

        /// Output format.
        #[arg(long, value_enum, default_value_t = ExportFormat::Json)]
        format: ExportFormat,

        /// Layout algorithm (overrides the config file).
        #[arg(long, value_enum)]
        layout: Option<LayoutAlgorithm>,

        /// Clustering strategy (overrides the config file).
        #[arg(long, value_enum)]
        clustering: Option<ClusteringStrategy>,

        /// Write to this file instead of stdout.
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
}
