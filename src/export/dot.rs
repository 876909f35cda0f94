use std::collections::HashMap;
use std::fmt::Write;

use crate::topology::model::{NetworkEdge, NetworkTopology, NodeKind};

/// Sanitize a string for use as a DOT node ID or subgraph name.
///
/// Replaces non-alphanumeric characters with `_`. Prepends `n` if the result
/// starts with a digit (DOT IDs must not start with a digit).
pub fn sanitize_dot_id(s: &str) -> String {
    let mut result: String = s
        .chars()
        .map(|c| {
            if c.is_alphanumeric() || c == '_' {
                c
            } else {
                '_'
            }
        })
        .collect();
    if result.starts_with(|c: char| c.is_ascii_digit()) {
        result.insert(0, 'n');
    }
    if result.is_empty() {
        result = "node".to_string();
    }
    result
}

/// Escape a label for use inside a double-quoted DOT string.
fn escape_label(s: &str) -> String {
    s.replace('\\', "\\\\").replace('"', "\\\"")
}

/// Fill colour per node kind.
fn node_fillcolor(kind: &NodeKind) -> &'static str {
    match kind {
        NodeKind::File => "#4ade80",
        NodeKind::Route { .. } => "#3b82f6",
        NodeKind::Component { .. } => "#f59e0b",
    }
}

/// Dynamic imports are dashed, type-only imports dotted.
fn edge_style(edge: &NetworkEdge) -> &'static str {
    if edge.metadata.is_dynamic {
        "dashed"
    } else if edge.metadata.is_type_only {
        "dotted"
    } else {
        "solid"
    }
}

/// Graphviz y grows upwards. Zero stays `0.0` so it never prints as `-0.0`.
fn flip_y(y: f64) -> f64 {
    if y == 0.0 { 0.0 } else { -y }
}

/// Render a topology as a DOT digraph.
///
/// Each cluster becomes a `subgraph cluster_*` block holding its member nodes. Node
/// positions are emitted as pinned `pos` attributes (points, y flipped so that larger
/// layout y renders lower) for `neato -n` style rendering.
pub fn render_dot(topology: &NetworkTopology) -> String {
    let mut out = String::new();
    writeln!(out, "digraph topology {{").unwrap();
    writeln!(out, "    graph [splines=true overlap=false];").unwrap();
    writeln!(
        out,
        "    node [shape=box style=\"rounded,filled\" fontname=\"Helvetica\"];"
    )
    .unwrap();

    let dot_ids: HashMap<&str, String> = topology
        .nodes
        .iter()
        .map(|n| (n.id.as_str(), sanitize_dot_id(&n.id)))
        .collect();
    let by_id: HashMap<&str, usize> = topology
        .nodes
        .iter()
        .enumerate()
        .map(|(i, n)| (n.id.as_str(), i))
        .collect();

    for cluster in &topology.clusters {
        writeln!(out).unwrap();
        writeln!(out, "    subgraph cluster_{} {{", sanitize_dot_id(&cluster.id)).unwrap();
        writeln!(out, "        label=\"{}\";", escape_label(&cluster.label)).unwrap();
        writeln!(out, "        color=\"{}\";", cluster.color).unwrap();
        for member in &cluster.node_ids {
            let Some(&i) = by_id.get(member.as_str()) else {
                continue;
            };
            let node = &topology.nodes[i];
            writeln!(
                out,
                "        {} [label=\"{}\" fillcolor=\"{}\" pos=\"{:.1},{:.1}!\"];",
                dot_ids[member.as_str()],
                escape_label(&node.label),
                node_fillcolor(&node.kind),
                node.position.x,
                flip_y(node.position.y),
            )
            .unwrap();
        }
        writeln!(out, "    }}").unwrap();
    }

    if !topology.edges.is_empty() {
        writeln!(out).unwrap();
    }
    for edge in &topology.edges {
        let (Some(src), Some(tgt)) = (
            dot_ids.get(edge.source.as_str()),
            dot_ids.get(edge.target.as_str()),
        ) else {
            continue;
        };
        writeln!(
            out,
            "    {} -> {} [style={} penwidth={:.2}];",
            src,
            tgt,
            edge_style(edge),
            1.0 + edge.strength * 2.0,
        )
        .unwrap();
    }

    writeln!(out, "}}").unwrap();
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::classify::ConventionClassifier;
    use crate::graph::fixtures::build;
    use crate::topology::TopologyBuilder;
    use crate::topology::model::{ClusteringStrategy, LayoutAlgorithm};

    #[test]
    fn test_sanitize_dot_id() {
        assert_eq!(sanitize_dot_id("file-12"), "file_12");
        assert_eq!(sanitize_dot_id("route-group-(auth)"), "route_group__auth_");
        assert_eq!(sanitize_dot_id("9lives"), "n9lives");
        assert_eq!(sanitize_dot_id(""), "node");
    }

    #[test]
    fn test_render_dot_clusters_and_edges() {
        let graph = build(&[
            ("components/ui/Button.tsx", "import { cn } from '../../lib/cn';"),
            ("components/ui/Icon.tsx", "const Lazy = import('./Button');"),
            ("lib/cn.ts", ""),
        ]);
        let classifier = ConventionClassifier::default();
        let topology = TopologyBuilder::new(&classifier)
            .rebuild_with(&graph, ClusteringStrategy::FeatureBased, LayoutAlgorithm::Grid)
            .unwrap();
        let dot = render_dot(&topology);

        assert!(dot.starts_with("digraph topology {"));
        assert!(dot.trim_end().ends_with('}'));
        assert!(dot.contains("subgraph cluster_component_ui {"));
        assert!(dot.contains("subgraph cluster_unclassified {"));
        assert!(dot.contains("file_0 [label=\"Button.tsx\" fillcolor=\"#f59e0b\" pos=\"0.0,0.0!\"];"));
        assert!(dot.contains("file_0 -> file_2 [style=solid"));
        assert!(dot.contains("file_1 -> file_0 [style=dashed"));
    }

    #[test]
    fn test_flip_y() {
        assert_eq!(flip_y(150.0), -150.0);
        assert_eq!(flip_y(-20.0), 20.0);
        assert_eq!(format!("{:.1}", flip_y(0.0)), "0.0");
    }

    #[test]
    fn test_labels_are_escaped() {
        assert_eq!(escape_label(r#"say "hi""#), r#"say \"hi\""#);
    }
}
