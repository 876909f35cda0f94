pub mod dot;
pub mod model;

use anyhow::Context;
use tracing::warn;

use crate::topology::model::NetworkTopology;

use model::{ExportFormat, ExportResult};

/// Above this many nodes a DOT rendering becomes hard to read.
const DOT_NODE_WARNING: usize = 2000;

/// Export a topology as JSON or DOT.
///
/// Steps:
/// 1. Check scale guards and log warnings if thresholds are exceeded.
/// 2. Dispatch to the appropriate renderer.
/// 3. Return ExportResult with content, counts, and warnings.
pub fn export_topology(
    topology: &NetworkTopology,
    format: ExportFormat,
) -> anyhow::Result<ExportResult> {
    let node_count = topology.nodes.len();
    let edge_count = topology.edges.len();

    let mut warnings: Vec<String> = Vec::new();
    if format == ExportFormat::Dot && node_count > DOT_NODE_WARNING {
        let msg = format!(
            "Large graph: {} nodes may render poorly in DOT. Consider --format json.",
            node_count
        );
        warn!("{}", msg);
        warnings.push(msg);
    }

    let content = match format {
        ExportFormat::Json => {
            serde_json::to_string_pretty(topology).context("failed to serialise topology")?
        }
        ExportFormat::Dot => dot::render_dot(topology),
    };

    Ok(ExportResult {
        content,
        node_count,
        edge_count,
        warnings,
    })
}
