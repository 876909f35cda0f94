/// Output format for topology export.
#[derive(
    Clone, Copy, Debug, Default, PartialEq, Eq, clap::ValueEnum, serde::Serialize, serde::Deserialize,
)]
pub enum ExportFormat {
    /// The whole topology as pretty-printed JSON (default).
    #[default]
    Json,
    /// Graphviz DOT with one subgraph per cluster and layout positions as `pos`.
    Dot,
}

/// Result of an export operation.
pub struct ExportResult {
    /// The rendered content (JSON or DOT text).
    pub content: String,
    pub node_count: usize,
    pub edge_count: usize,
    /// Advisory warnings (e.g. scale guard messages). Already logged by `export_topology`.
    pub warnings: Vec<String>,
}
