use std::fmt::Write;

use serde::Serialize;

use crate::graph::cycles::CycleReport;
use crate::graph::stats::DependencyStats;
use crate::topology::model::NetworkTopology;

/// Print `value` as pretty JSON to stdout; serialisation failures go to stderr.
fn print_json<T: Serialize + ?Sized>(value: &T) {
    match serde_json::to_string_pretty(value) {
        Ok(s) => println!("{}", s),
        Err(e) => eprintln!("error serialising output: {}", e),
    }
}

/// Print a summary of a dependency-graph build.
///
/// - `json = true`: emit a pretty-printed JSON object to stdout.
/// - `json = false`: emit a cargo-style human-readable summary to stdout.
///
/// If some relative imports could not be resolved, a warning line is written to
/// **stderr** so that the stdout stream remains clean for downstream JSON consumers.
pub fn print_dependency_summary(stats: &DependencyStats, elapsed_secs: f64, json: bool) {
    if json {
        print_json(stats);
        return;
    }

    print!("{}", format_dependency_summary(stats, elapsed_secs));

    if stats.resolution.unresolved > 0 {
        eprintln!(
            "  {} relative imports could not be resolved (run with -v for details)",
            stats.resolution.unresolved
        );
    }
}

pub fn format_dependency_summary(stats: &DependencyStats, elapsed_secs: f64) -> String {
    let mut out = String::new();
    let _ = writeln!(
        out,
        "Analyzed {} files in {:.2}s",
        stats.file_count, elapsed_secs
    );
    let _ = writeln!(
        out,
        "  {} dependency edges ({} distinct links)",
        stats.edge_count, stats.link_count
    );
    let _ = writeln!(
        out,
        "  {} static, {} dynamic, {} require, {} type-only, {} asset, {} re-export",
        stats.static_imports,
        stats.dynamic_imports,
        stats.requires,
        stats.type_imports,
        stats.asset_references,
        stats.re_exports,
    );
    let _ = writeln!(
        out,
        "  Resolved {} imports ({} external, {} unresolved)",
        stats.resolution.resolved, stats.resolution.external, stats.resolution.unresolved,
    );
    let _ = writeln!(
        out,
        "  {:.2} dependencies per file on average, max {}",
        stats.average_dependencies, stats.max_dependencies
    );
    for path in &stats.most_dependent_files {
        let _ = writeln!(out, "    {}", path);
    }
    let _ = writeln!(
        out,
        "  {} cycles, {} orphaned files, {} entry points",
        stats.cycle_count, stats.orphan_count, stats.entry_point_count
    );
    if stats.component_count > 0 {
        let _ = writeln!(
            out,
            "  {} component usages across {} components",
            stats.component_usage_count, stats.component_count
        );
    }
    out
}

/// Print one block per cycle, or a single line when there are none.
pub fn print_cycle_reports(reports: &[CycleReport], json: bool) {
    if json {
        print_json(reports);
        return;
    }
    print!("{}", format_cycle_reports(reports));
}

pub fn format_cycle_reports(reports: &[CycleReport]) -> String {
    let mut out = String::new();
    if reports.is_empty() {
        let _ = writeln!(out, "No circular dependencies found.");
        return out;
    }

    let _ = writeln!(out, "Found {} circular dependencies:", reports.len());
    for (i, report) in reports.iter().enumerate() {
        let _ = writeln!(
            out,
            "\n{}. [{}] {} files",
            i + 1,
            report.severity.as_str(),
            report.files.len()
        );
        let mut chain = report.paths.join(" -> ");
        if let Some(first) = report.paths.first() {
            let _ = write!(chain, " -> {}", first);
        }
        let _ = writeln!(out, "   {}", chain);
        if let Some(cut) = &report.suggested_break {
            let from = report
                .files
                .iter()
                .position(|&f| f == cut.from)
                .and_then(|i| report.paths.get(i));
            let to = report
                .files
                .iter()
                .position(|&f| f == cut.to)
                .and_then(|i| report.paths.get(i));
            if let (Some(from), Some(to)) = (from, to) {
                let _ = writeln!(
                    out,
                    "   suggested break: {} -> {} (strength {:.2})",
                    from, to, cut.strength
                );
            }
        }
    }
    out
}

/// Print the topology summary: metrics, clusters and detected patterns.
///
/// `json = true` prints the whole topology.
pub fn print_topology_summary(topology: &NetworkTopology, json: bool) {
    if json {
        print_json(topology);
        return;
    }
    print!("{}", format_topology_summary(topology));
}

pub fn format_topology_summary(topology: &NetworkTopology) -> String {
    let m = &topology.metrics;
    let mut out = String::new();
    let _ = writeln!(
        out,
        "Built topology {} in {:.1}ms ({} layout, {} clustering)",
        topology.id,
        topology.build_duration_ms,
        topology.layout.algorithm.as_str(),
        topology.layout.clustering.as_str(),
    );
    let _ = writeln!(
        out,
        "  {} nodes, {} edges, {} clusters",
        m.node_count, m.edge_count, m.cluster_count
    );
    let _ = writeln!(
        out,
        "  connectivity avg {:.2} / max {}, density {:.4}, complexity {:.1}",
        m.average_connectivity, m.max_connectivity, m.density, m.complexity_score
    );

    if !topology.clusters.is_empty() {
        let _ = writeln!(out, "Clusters:");
        for cluster in &topology.clusters {
            let _ = writeln!(
                out,
                "  {:<32} {:<18} {:>4} nodes  cohesion {:.2}  coupling {:.2}",
                cluster.label,
                cluster.kind.as_str(),
                cluster.metadata.member_count,
                cluster.metadata.cohesion,
                cluster.metadata.coupling,
            );
        }
    }

    if !topology.patterns.is_empty() {
        let _ = writeln!(out, "Patterns:");
        for pattern in &topology.patterns {
            let _ = writeln!(
                out,
                "  {:<15} {:.2}  {}",
                pattern.kind.as_str(),
                pattern.strength,
                pattern.description
            );
        }
    }
    out
}
