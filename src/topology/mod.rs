pub mod cluster;
pub mod layout;
pub mod metrics;
pub mod model;
pub mod patterns;

use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{Instant, SystemTime, UNIX_EPOCH};

use rayon::prelude::*;
use tracing::info;

use crate::classify::{Classification, Classifier, FileRole};
use crate::config::TopologyConfig;
use crate::error::TopologyError;
use crate::graph::edge::DependencyEdge;
use crate::graph::node::{FileKind, FileRecord};
use crate::graph::{DependencyGraph, FileId};

use cluster::Clustering;
use layout::LayoutInput;
use model::{
    ClusterMetadata, ClusteringStrategy, EdgeMetadata, LayoutAlgorithm, LayoutSettings,
    NetworkCluster, NetworkEdge, NetworkEdgeKind, NetworkNode, NetworkTopology, NodeKind,
    NodeMetadata, Position, DEFAULT_SPACING,
};
use patterns::{PatternConfig, PatternInput};

/// Everything a build can be tuned with.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TopologyOptions {
    pub layout: LayoutAlgorithm,
    pub clustering: ClusteringStrategy,
    pub spacing: f64,
    pub patterns: PatternConfig,
}

impl Default for TopologyOptions {
    fn default() -> Self {
        Self {
            layout: LayoutAlgorithm::default(),
            clustering: ClusteringStrategy::default(),
            spacing: DEFAULT_SPACING,
            patterns: PatternConfig::default(),
        }
    }
}

impl TopologyOptions {
    pub fn from_config(config: &TopologyConfig) -> Self {
        Self {
            layout: config.layout.algorithm,
            clustering: config.clustering.strategy,
            spacing: config.layout.spacing,
            patterns: config.patterns,
        }
    }
}

/// Assembles a [`NetworkTopology`] from a finished [`DependencyGraph`].
///
/// Stages: classify every file, cluster, create one network node per file and one
/// network edge per distinct file link, lay out, detect patterns, compute metrics.
/// The dependency graph is only read.
pub struct TopologyBuilder<'c> {
    classifier: &'c dyn Classifier,
    options: TopologyOptions,
}

impl<'c> TopologyBuilder<'c> {
    pub fn new(classifier: &'c dyn Classifier) -> Self {
        Self {
            classifier,
            options: TopologyOptions::default(),
        }
    }

    pub fn with_options(mut self, options: TopologyOptions) -> Self {
        self.options = options;
        self
    }

    pub fn options(&self) -> &TopologyOptions {
        &self.options
    }

    /// Build with the configured options.
    pub fn build(&self, graph: &DependencyGraph) -> Result<NetworkTopology, TopologyError> {
        self.assemble(graph, self.options)
    }

    /// Build a fresh topology with a different clustering strategy and layout.
    pub fn rebuild_with(
        &self,
        graph: &DependencyGraph,
        clustering: ClusteringStrategy,
        layout: LayoutAlgorithm,
    ) -> Result<NetworkTopology, TopologyError> {
        let options = TopologyOptions {
            clustering,
            layout,
            ..self.options
        };
        self.assemble(graph, options)
    }

    fn assemble(
        &self,
        graph: &DependencyGraph,
        options: TopologyOptions,
    ) -> Result<NetworkTopology, TopologyError> {
        let started = Instant::now();
        graph.validate()?;

        let classifications: Vec<Classification> = graph
            .nodes()
            .par_iter()
            .map(|record| self.classifier.classify(record))
            .collect();

        let clustering = cluster::build_clusters(
            cluster::assign(options.clustering, &classifications, graph),
            graph,
        );

        let roles = GraphRoles::new(graph);
        let mut nodes: Vec<NetworkNode> = graph
            .file_ids()
            .zip(graph.nodes())
            .zip(classifications)
            .map(|((id, record), class)| {
                let cluster_id = clustering.clusters[clustering.node_cluster[id.index()]]
                    .id
                    .clone();
                network_node(graph, &roles, id, record, class, cluster_id)
            })
            .collect();

        let (edges, links) = network_edges(graph, &nodes);

        let mut clusters: Vec<NetworkCluster> = clustering
            .clusters
            .iter()
            .enumerate()
            .map(|(ordinal, seed)| NetworkCluster {
                id: seed.id.clone(),
                label: seed.label.clone(),
                kind: seed.kind,
                node_ids: seed.members.iter().map(|&m| nodes[m].id.clone()).collect(),
                position: Position::ORIGIN,
                size: seed.size(),
                color: seed.color(ordinal),
                metadata: ClusterMetadata {
                    cohesion: seed.cohesion,
                    coupling: seed.coupling,
                    member_count: seed.members.len(),
                    tag: seed.tag.clone(),
                },
            })
            .collect();

        let members: Vec<Vec<usize>> = clustering.clusters.iter().map(|c| c.members.clone()).collect();
        apply_layout(
            &mut nodes,
            &mut clusters,
            options.layout,
            &LayoutInput {
                node_count: graph.len(),
                edges: &links,
                clusters: &members,
                spacing: options.spacing,
            },
        );

        let patterns = detect(&nodes, &clusters, &links, &clustering, &options.patterns);
        let metrics = metrics::compute_metrics(nodes.len(), &links, clusters.len());

        let built_at_ms = unix_millis();
        let topology = NetworkTopology {
            id: next_topology_id(built_at_ms),
            nodes,
            edges,
            clusters,
            layout: LayoutSettings {
                algorithm: options.layout,
                clustering: options.clustering,
                spacing: options.spacing,
            },
            patterns,
            metrics,
            build_duration_ms: started.elapsed().as_secs_f64() * 1000.0,
            built_at_ms,
        };
        topology.validate()?;

        info!(
            nodes = topology.nodes.len(),
            edges = topology.edges.len(),
            clusters = topology.clusters.len(),
            patterns = topology.patterns.len(),
            layout = options.layout.as_str(),
            clustering = options.clustering.as_str(),
            "network topology assembled"
        );

        Ok(topology)
    }
}

// ---------------------------------------------------------------------------
// Node and edge construction
// ---------------------------------------------------------------------------

/// Entry-point and orphan membership, looked up once per node.
struct GraphRoles {
    entry_points: HashSet<FileId>,
    orphans: HashSet<FileId>,
}

impl GraphRoles {
    fn new(graph: &DependencyGraph) -> Self {
        Self {
            entry_points: graph.entry_points().iter().copied().collect(),
            orphans: graph.orphaned_files().iter().copied().collect(),
        }
    }
}

fn network_node(
    graph: &DependencyGraph,
    roles: &GraphRoles,
    id: FileId,
    record: &FileRecord,
    class: Classification,
    cluster_id: String,
) -> NetworkNode {
    let dependencies = graph.dependencies(id).len();
    let dependents = graph.dependents(id).len();

    let category = match &class.role {
        FileRole::Route { .. } => "route",
        FileRole::Component { .. } => "component",
        FileRole::Module => match record.extension.as_str() {
            "tsx" | "jsx" => "component",
            "ts" | "js" | "mjs" | "cjs" => "logic",
            _ => match record.kind {
                FileKind::Markup => "markup",
                FileKind::Style => "style",
                FileKind::Asset => "asset",
                FileKind::Source | FileKind::Other => "other",
            },
        },
    };

    let kind = match class.role {
        FileRole::Module => NodeKind::File,
        FileRole::Route { path } => NodeKind::Route { path },
        FileRole::Component { family } => NodeKind::Component { family },
    };

    NetworkNode {
        id: node_id(id),
        label: record.name.clone(),
        kind,
        file: id,
        path: record.display_path(),
        position: Position::ORIGIN,
        size: (record.size as f64 / 1000.0).clamp(20.0, 100.0),
        importance: ((dependencies + dependents) as f64 / 20.0).min(1.0),
        cluster_id,
        metadata: NodeMetadata {
            dependencies,
            dependents,
            category: category.to_string(),
            tags: class.memberships.into_iter().map(|m| m.label).collect(),
            is_entry_point: roles.entry_points.contains(&id),
            is_orphan: roles.orphans.contains(&id),
        },
    }
}

fn node_id(id: FileId) -> String {
    format!("file-{}", id.0)
}

/// One network edge per distinct file link, in adjacency order, folding every statement
/// between the same two files. Returns the edges and their node-index pairs.
fn network_edges(
    graph: &DependencyGraph,
    nodes: &[NetworkNode],
) -> (Vec<NetworkEdge>, Vec<(usize, usize)>) {
    let mut statements: HashMap<(FileId, FileId), Vec<&DependencyEdge>> = HashMap::new();
    for edge in graph.edges() {
        statements.entry((edge.from, edge.to)).or_default().push(edge);
    }

    let mut edges = Vec::new();
    let mut links = Vec::new();
    for from in graph.file_ids() {
        for &to in graph.dependencies(from) {
            let folded = statements.get(&(from, to)).map(Vec::as_slice).unwrap_or(&[]);
            let (source, target) = (&nodes[from.index()], &nodes[to.index()]);

            let kind = match (&source.kind, &target.kind) {
                (NodeKind::Route { .. }, NodeKind::Route { .. }) => NetworkEdgeKind::RouteRelationship,
                (NodeKind::Component { .. }, NodeKind::Component { .. }) => {
                    NetworkEdgeKind::ComponentRelationship
                }
                _ => NetworkEdgeKind::Dependency,
            };
            let prefix = match kind {
                NetworkEdgeKind::Dependency => "dep",
                NetworkEdgeKind::RouteRelationship => "route",
                NetworkEdgeKind::ComponentRelationship => "comp",
            };

            let strongest = folded.iter().map(|e| e.strength()).fold(0.0, f64::max);
            let mut dependency_kinds = Vec::new();
            let mut specifiers: Vec<String> = Vec::new();
            for statement in folded {
                if !dependency_kinds.contains(&statement.kind) {
                    dependency_kinds.push(statement.kind);
                }
                for s in &statement.specifiers {
                    if !specifiers.contains(s) {
                        specifiers.push(s.clone());
                    }
                }
            }

            edges.push(NetworkEdge {
                id: format!("{prefix}-{}", edges.len()),
                source: source.id.clone(),
                target: target.id.clone(),
                kind,
                strength: (strongest / 5.0).clamp(0.0, 1.0),
                label: folded.first().map(|e| e.import_path.clone()),
                metadata: EdgeMetadata {
                    statement_count: folded.len(),
                    dependency_kinds,
                    is_dynamic: !folded.is_empty() && folded.iter().all(|e| e.is_dynamic),
                    is_type_only: !folded.is_empty() && folded.iter().all(|e| e.is_type_only),
                    specifiers,
                },
            });
            links.push((from.index(), to.index()));
        }
    }

    (edges, links)
}

fn apply_layout(
    nodes: &mut [NetworkNode],
    clusters: &mut [NetworkCluster],
    algorithm: LayoutAlgorithm,
    input: &LayoutInput<'_>,
) {
    let computed = layout::compute(algorithm, input);
    for (node, position) in nodes.iter_mut().zip(computed.nodes) {
        node.position = position;
    }
    for (cluster, position) in clusters.iter_mut().zip(computed.clusters) {
        cluster.position = position;
    }
}

fn detect(
    nodes: &[NetworkNode],
    clusters: &[NetworkCluster],
    links: &[(usize, usize)],
    clustering: &Clustering,
    config: &PatternConfig,
) -> Vec<model::ConnectionPattern> {
    let node_ids: Vec<String> = nodes.iter().map(|n| n.id.clone()).collect();
    let node_labels: Vec<String> = nodes.iter().map(|n| n.path.clone()).collect();
    let cluster_labels: Vec<String> = clusters.iter().map(|c| c.label.clone()).collect();
    patterns::detect_patterns(
        &PatternInput {
            node_ids: &node_ids,
            node_labels: &node_labels,
            edges: links,
            node_cluster: &clustering.node_cluster,
            cluster_labels: &cluster_labels,
        },
        config,
    )
}

fn unix_millis() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis() as u64)
        .unwrap_or(0)
}

static TOPOLOGY_SEQ: AtomicU64 = AtomicU64::new(0);

fn next_topology_id(built_at_ms: u64) -> String {
    let seq = TOPOLOGY_SEQ.fetch_add(1, Ordering::Relaxed);
    format!("topology-{built_at_ms}-{seq}")
}

// ---------------------------------------------------------------------------
// Topology operations
// ---------------------------------------------------------------------------

impl NetworkTopology {
    pub fn node(&self, id: &str) -> Option<&NetworkNode> {
        self.nodes.iter().find(|n| n.id == id)
    }

    pub fn cluster(&self, id: &str) -> Option<&NetworkCluster> {
        self.clusters.iter().find(|c| c.id == id)
    }

    fn node_index(&self) -> HashMap<&str, usize> {
        self.nodes
            .iter()
            .enumerate()
            .map(|(i, n)| (n.id.as_str(), i))
            .collect()
    }

    /// Check that every reference resolves, every node sits in exactly one cluster and
    /// every coordinate is finite.
    pub fn validate(&self) -> Result<(), TopologyError> {
        let index = self.node_index();

        for edge in &self.edges {
            for end in [&edge.source, &edge.target] {
                if !index.contains_key(end.as_str()) {
                    return Err(TopologyError::DanglingEdge {
                        edge: edge.id.clone(),
                        node: end.clone(),
                    });
                }
            }
        }

        let mut memberships = vec![0usize; self.nodes.len()];
        for cluster in &self.clusters {
            for member in &cluster.node_ids {
                let Some(&i) = index.get(member.as_str()) else {
                    return Err(TopologyError::DanglingMember {
                        cluster: cluster.id.clone(),
                        node: member.clone(),
                    });
                };
                memberships[i] += 1;
            }
        }
        if let Some((i, &count)) = memberships.iter().enumerate().find(|(_, c)| **c != 1) {
            return Err(TopologyError::ClusterMembership {
                node: self.nodes[i].id.clone(),
                count,
            });
        }

        if let Some(node) = self.nodes.iter().find(|n| !n.position.is_finite()) {
            return Err(TopologyError::NonFinitePosition {
                node: node.id.clone(),
                x: node.position.x,
                y: node.position.y,
            });
        }

        Ok(())
    }

    /// A copy of this topology re-positioned with `algorithm`. Clusters, edges and
    /// patterns are carried over unchanged.
    pub fn with_layout(&self, algorithm: LayoutAlgorithm) -> Result<NetworkTopology, TopologyError> {
        let started = Instant::now();
        self.validate()?;

        let index = self.node_index();
        let links: Vec<(usize, usize)> = self
            .edges
            .iter()
            .filter_map(|e| Some((*index.get(e.source.as_str())?, *index.get(e.target.as_str())?)))
            .collect();
        let members: Vec<Vec<usize>> = self
            .clusters
            .iter()
            .map(|c| c.node_ids.iter().filter_map(|id| index.get(id.as_str()).copied()).collect())
            .collect();

        let mut relaid = self.clone();
        apply_layout(
            &mut relaid.nodes,
            &mut relaid.clusters,
            algorithm,
            &LayoutInput {
                node_count: self.nodes.len(),
                edges: &links,
                clusters: &members,
                spacing: self.layout.spacing,
            },
        );
        relaid.layout.algorithm = algorithm;
        relaid.built_at_ms = unix_millis();
        relaid.id = next_topology_id(relaid.built_at_ms);
        relaid.build_duration_ms = started.elapsed().as_secs_f64() * 1000.0;
        relaid.validate()?;
        Ok(relaid)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::classify::ConventionClassifier;
    use crate::error::GraphError;
    use crate::graph::fixtures::{add_unmirrored_link, build, id};
    use crate::topology::model::{ClusterKind, PatternKind};

    fn sample_graph() -> DependencyGraph {
        build(&[
            ("app/(shop)/cart/page.tsx", "import { Cart } from '../../../components/cart/Cart';\nimport { api } from '../../../lib/api';"),
            ("app/(shop)/checkout/page.tsx", "import { api } from '../../../lib/api';\nimport type { Order } from '../../../lib/types';"),
            ("components/cart/Cart.tsx", "import { Line } from './Line';\nimport { format } from '../../lib/format';"),
            ("components/cart/Line.tsx", "import { format } from '../../lib/format';"),
            ("lib/api.ts", "import { format } from './format';\nimport { config } from './config';"),
            ("lib/format.ts", ""),
            ("lib/config.ts", ""),
            ("lib/types.ts", ""),
            ("README.md", ""),
        ])
    }

    fn builder(classifier: &ConventionClassifier) -> TopologyBuilder<'_> {
        TopologyBuilder::new(classifier)
    }

    #[test]
    fn test_one_node_per_file_and_edge_per_link() {
        let graph = sample_graph();
        let classifier = ConventionClassifier::default();
        let topology = builder(&classifier).build(&graph).unwrap();

        assert_eq!(topology.nodes.len(), graph.len());
        let links: usize = graph.adjacency().iter().map(Vec::len).sum();
        assert_eq!(topology.edges.len(), links);
        assert!(topology.validate().is_ok());
        assert_eq!(topology.metrics.node_count, 9);
        assert_eq!(topology.metrics.edge_count, links);
    }

    #[test]
    fn test_node_kinds_and_metadata() {
        let graph = sample_graph();
        let classifier = ConventionClassifier::default();
        let topology = builder(&classifier).build(&graph).unwrap();

        let cart_page = topology.nodes.iter().find(|n| n.path == "app/(shop)/cart/page.tsx").unwrap();
        assert_eq!(cart_page.kind, NodeKind::Route { path: "/cart".into() });
        assert_eq!(cart_page.metadata.category, "route");
        assert_eq!(cart_page.metadata.dependencies, 2);
        assert!(cart_page.metadata.is_entry_point);

        let line = topology.nodes.iter().find(|n| n.label == "Line.tsx").unwrap();
        assert_eq!(line.kind, NodeKind::Component { family: "cart".into() });

        let format = topology.nodes.iter().find(|n| n.label == "format.ts").unwrap();
        assert_eq!(format.metadata.dependents, 3);
        assert_eq!(format.metadata.category, "logic");
        assert!((format.importance - 3.0 / 20.0).abs() < 1e-9);
        assert_eq!(format.size, 20.0);

        let readme = topology.nodes.iter().find(|n| n.label == "README.md").unwrap();
        assert!(readme.metadata.is_orphan);
        assert_eq!(readme.cluster_id, cluster::UNCLASSIFIED_ID);
    }

    #[test]
    fn test_edge_kinds_and_strength() {
        let graph = sample_graph();
        let classifier = ConventionClassifier::default();
        let topology = builder(&classifier).build(&graph).unwrap();

        let cart = topology.nodes.iter().find(|n| n.label == "Cart.tsx").unwrap();
        let line = topology.nodes.iter().find(|n| n.label == "Line.tsx").unwrap();
        let edge = topology
            .edges
            .iter()
            .find(|e| e.source == cart.id && e.target == line.id)
            .unwrap();
        assert_eq!(edge.kind, NetworkEdgeKind::ComponentRelationship);
        assert!(edge.id.starts_with("comp-"));
        // One named specifier: (1 + 0.5) * 1.2 = 1.8 -> 0.36
        assert!((edge.strength - 0.36).abs() < 1e-9);
        assert_eq!(edge.label.as_deref(), Some("./Line"));
        assert_eq!(edge.metadata.statement_count, 1);

        let checkout = topology.nodes.iter().find(|n| n.path.ends_with("checkout/page.tsx")).unwrap();
        let types = topology.nodes.iter().find(|n| n.label == "types.ts").unwrap();
        let type_edge = topology
            .edges
            .iter()
            .find(|e| e.source == checkout.id && e.target == types.id)
            .unwrap();
        assert!(type_edge.metadata.is_type_only);
        assert_eq!(type_edge.kind, NetworkEdgeKind::Dependency);
    }

    #[test]
    fn test_feature_clusters() {
        let graph = sample_graph();
        let classifier = ConventionClassifier::default();
        let topology = builder(&classifier)
            .rebuild_with(&graph, ClusteringStrategy::FeatureBased, LayoutAlgorithm::Grid)
            .unwrap();

        let ids: Vec<&str> = topology.clusters.iter().map(|c| c.id.as_str()).collect();
        assert_eq!(ids, vec!["route-group-shop", "component-cart", "unclassified"]);
        let shop = topology.cluster("route-group-shop").unwrap();
        assert_eq!(shop.kind, ClusterKind::RouteGroup);
        assert_eq!(shop.color, "#10b981", "public route group");
        assert_eq!(shop.size, 100.0);
        assert_eq!(topology.layout.algorithm, LayoutAlgorithm::Grid);
        assert_eq!(topology.layout.clustering, ClusteringStrategy::FeatureBased);
    }

    #[test]
    fn test_every_strategy_and_layout_validates() {
        let graph = sample_graph();
        let classifier = ConventionClassifier::default();
        let b = builder(&classifier);
        for clustering in [
            ClusteringStrategy::WorkspaceBased,
            ClusteringStrategy::FeatureBased,
            ClusteringStrategy::DependencyBased,
            ClusteringStrategy::Hybrid,
        ] {
            for layout in [
                LayoutAlgorithm::ForceDirected,
                LayoutAlgorithm::Hierarchical,
                LayoutAlgorithm::Circular,
                LayoutAlgorithm::Grid,
            ] {
                let topology = b.rebuild_with(&graph, clustering, layout).unwrap();
                assert!(topology.validate().is_ok(), "{clustering:?}/{layout:?}");
            }
        }
    }

    #[test]
    fn test_with_layout_leaves_original_untouched() {
        let graph = sample_graph();
        let classifier = ConventionClassifier::default();
        let original = builder(&classifier).build(&graph).unwrap();
        let snapshot = original.clone();

        let relaid = original.with_layout(LayoutAlgorithm::Circular).unwrap();
        assert_eq!(original, snapshot);
        assert_eq!(relaid.layout.algorithm, LayoutAlgorithm::Circular);
        assert_eq!(relaid.clusters.len(), original.clusters.len());
        assert_eq!(relaid.edges, original.edges);
        assert_ne!(relaid.id, original.id);

        let direct = builder(&classifier)
            .rebuild_with(&graph, original.layout.clustering, LayoutAlgorithm::Circular)
            .unwrap();
        let positions = |t: &NetworkTopology| t.nodes.iter().map(|n| n.position).collect::<Vec<_>>();
        assert_eq!(positions(&relaid), positions(&direct));
    }

    #[test]
    fn test_rebuild_is_idempotent() {
        let graph = sample_graph();
        let classifier = ConventionClassifier::default();
        let b = builder(&classifier);
        let first = b.build(&graph).unwrap();
        let second = b.build(&graph).unwrap();
        assert_eq!(first.nodes, second.nodes);
        assert_eq!(first.edges, second.edges);
        assert_eq!(first.clusters, second.clusters);
        assert_eq!(first.patterns, second.patterns);
    }

    #[test]
    fn test_hub_detected_in_assembled_topology() {
        let mut files: Vec<(String, String)> = (0..19)
            .map(|i| (format!("leaf{i}.ts"), String::new()))
            .collect();
        let imports: String = (0..10).map(|i| format!("import './leaf{i}';\n")).collect();
        files.push(("hub.ts".into(), imports));
        let refs: Vec<(&str, &str)> = files.iter().map(|(p, c)| (p.as_str(), c.as_str())).collect();
        let graph = build(&refs);

        let classifier = ConventionClassifier::default();
        let topology = builder(&classifier).build(&graph).unwrap();
        let hubs: Vec<_> = topology.patterns.iter().filter(|p| p.kind == PatternKind::Hub).collect();
        assert_eq!(hubs.len(), 1);
        let hub = topology.node(&hubs[0].node_ids[0]).unwrap();
        assert_eq!(hub.label, "hub.ts");
    }

    fn small_topology() -> NetworkTopology {
        let graph = build(&[("a.ts", "import { b } from './b';"), ("b.ts", "")]);
        let classifier = ConventionClassifier::default();
        builder(&classifier).build(&graph).unwrap()
    }

    #[test]
    fn test_validate_rejects_edge_to_unknown_node() {
        let mut topology = small_topology();
        topology.edges[0].target = "file-99".into();
        assert_eq!(
            topology.validate(),
            Err(TopologyError::DanglingEdge {
                edge: topology.edges[0].id.clone(),
                node: "file-99".into(),
            })
        );

        let mut topology = small_topology();
        topology.edges[0].source = "ghost".into();
        assert!(matches!(
            topology.validate(),
            Err(TopologyError::DanglingEdge { node, .. }) if node == "ghost"
        ));
    }

    #[test]
    fn test_validate_rejects_unknown_cluster_member() {
        let mut topology = small_topology();
        topology.clusters[0].node_ids.push("file-42".into());
        assert_eq!(
            topology.validate(),
            Err(TopologyError::DanglingMember {
                cluster: topology.clusters[0].id.clone(),
                node: "file-42".into(),
            })
        );
    }

    #[test]
    fn test_validate_requires_exactly_one_cluster_per_node() {
        let mut topology = small_topology();
        let first = topology.clusters[0].node_ids[0].clone();
        topology.clusters[0].node_ids.retain(|id| *id != first);
        assert_eq!(
            topology.validate(),
            Err(TopologyError::ClusterMembership {
                node: first.clone(),
                count: 0
            })
        );

        let mut topology = small_topology();
        let mut copy = topology.clusters[0].clone();
        copy.id = "copy".into();
        topology.clusters.push(copy);
        assert!(matches!(
            topology.validate(),
            Err(TopologyError::ClusterMembership { count: 2, .. })
        ));
    }

    #[test]
    fn test_validate_rejects_non_finite_position() {
        let mut topology = small_topology();
        topology.nodes[1].position = Position::new(f64::INFINITY, 5.0);
        assert_eq!(
            topology.validate(),
            Err(TopologyError::NonFinitePosition {
                node: topology.nodes[1].id.clone(),
                x: f64::INFINITY,
                y: 5.0,
            })
        );
        assert!(topology.with_layout(LayoutAlgorithm::Grid).is_err());
    }

    #[test]
    fn test_build_rejects_inconsistent_graph() {
        let mut graph = build(&[("a.ts", ""), ("b.ts", "")]);
        let (a, b) = (id(&graph, "a.ts"), id(&graph, "b.ts"));
        add_unmirrored_link(&mut graph, a, b);

        let classifier = ConventionClassifier::default();
        assert_eq!(
            builder(&classifier).build(&graph),
            Err(TopologyError::Graph(GraphError::AsymmetricAdjacency {
                from: a,
                to: b
            }))
        );
    }

    #[test]
    fn test_empty_graph() {
        let graph = build(&[]);
        let classifier = ConventionClassifier::default();
        for layout in [
            LayoutAlgorithm::ForceDirected,
            LayoutAlgorithm::Hierarchical,
            LayoutAlgorithm::Circular,
            LayoutAlgorithm::Grid,
        ] {
            let topology = builder(&classifier)
                .rebuild_with(&graph, ClusteringStrategy::Hybrid, layout)
                .unwrap();
            assert!(topology.nodes.is_empty());
            assert!(topology.clusters.is_empty());
            assert_eq!(topology.metrics.density, 0.0);
        }
    }
}
