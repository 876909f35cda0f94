use serde::{Deserialize, Serialize};

use crate::graph::FileId;
use crate::graph::edge::DependencyKind;

/// A 2D coordinate in layout space.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Position {
    pub x: f64,
    pub y: f64,
}

impl Position {
    pub const ORIGIN: Position = Position { x: 0.0, y: 0.0 };

    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    pub fn is_finite(&self) -> bool {
        self.x.is_finite() && self.y.is_finite()
    }
}

// ---------------------------------------------------------------------------
// Algorithm selection
// ---------------------------------------------------------------------------

/// How node and cluster coordinates are computed.
#[derive(
    Clone, Copy, Debug, Default, PartialEq, Eq, Hash, clap::ValueEnum, Serialize, Deserialize,
)]
#[serde(rename_all = "kebab-case")]
pub enum LayoutAlgorithm {
    /// Clusters on an outer ring, members on a small ring around their cluster (default).
    #[default]
    ForceDirected,
    /// Rows by dependency depth.
    Hierarchical,
    /// Every node on one ring.
    Circular,
    /// Row-major square grid.
    Grid,
}

impl LayoutAlgorithm {
    pub fn as_str(&self) -> &'static str {
        match self {
            LayoutAlgorithm::ForceDirected => "force-directed",
            LayoutAlgorithm::Hierarchical => "hierarchical",
            LayoutAlgorithm::Circular => "circular",
            LayoutAlgorithm::Grid => "grid",
        }
    }
}

/// Which classification label decides a node's cluster.
#[derive(
    Clone, Copy, Debug, Default, PartialEq, Eq, Hash, clap::ValueEnum, Serialize, Deserialize,
)]
#[serde(rename_all = "kebab-case")]
pub enum ClusteringStrategy {
    /// Workspace membership.
    WorkspaceBased,
    /// Route group, else component family.
    FeatureBased,
    /// Weakly connected components of the dependency graph.
    DependencyBased,
    /// Workspace, else feature, else dependency component (default).
    #[default]
    Hybrid,
}

impl ClusteringStrategy {
    pub fn as_str(&self) -> &'static str {
        match self {
            ClusteringStrategy::WorkspaceBased => "workspace-based",
            ClusteringStrategy::FeatureBased => "feature-based",
            ClusteringStrategy::DependencyBased => "dependency-based",
            ClusteringStrategy::Hybrid => "hybrid",
        }
    }
}

/// Default distance unit for hierarchical and grid layouts.
pub const DEFAULT_SPACING: f64 = 100.0;

/// The layout parameters a topology was built with.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LayoutSettings {
    pub algorithm: LayoutAlgorithm,
    pub clustering: ClusteringStrategy,
    pub spacing: f64,
}

impl Default for LayoutSettings {
    fn default() -> Self {
        Self {
            algorithm: LayoutAlgorithm::default(),
            clustering: ClusteringStrategy::default(),
            spacing: DEFAULT_SPACING,
        }
    }
}

// ---------------------------------------------------------------------------
// Nodes
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "kebab-case")]
pub enum NodeKind {
    File,
    Route { path: String },
    Component { family: String },
}

impl NodeKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            NodeKind::File => "file",
            NodeKind::Route { .. } => "route",
            NodeKind::Component { .. } => "component",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NodeMetadata {
    /// Distinct files this node depends on.
    pub dependencies: usize,
    /// Distinct files depending on this node.
    pub dependents: usize,
    /// Coarse role: `route`, `component`, `logic`, `markup`, `style`, `asset` or `other`.
    pub category: String,
    /// Labels of every cluster membership the classifier reported.
    pub tags: Vec<String>,
    pub is_entry_point: bool,
    pub is_orphan: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NetworkNode {
    pub id: String,
    pub label: String,
    pub kind: NodeKind,
    /// The dependency-graph file this node stands for.
    pub file: FileId,
    /// Path relative to the project root.
    pub path: String,
    pub position: Position,
    pub size: f64,
    /// Connectivity-based weight in `[0, 1]`.
    pub importance: f64,
    pub cluster_id: String,
    pub metadata: NodeMetadata,
}

// ---------------------------------------------------------------------------
// Edges
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum NetworkEdgeKind {
    Dependency,
    RouteRelationship,
    ComponentRelationship,
}

impl NetworkEdgeKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            NetworkEdgeKind::Dependency => "dependency",
            NetworkEdgeKind::RouteRelationship => "route-relationship",
            NetworkEdgeKind::ComponentRelationship => "component-relationship",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EdgeMetadata {
    /// Number of import statements folded into this edge.
    pub statement_count: usize,
    pub dependency_kinds: Vec<DependencyKind>,
    /// Every folded statement is a dynamic import.
    pub is_dynamic: bool,
    /// Every folded statement is type-only.
    pub is_type_only: bool,
    pub specifiers: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NetworkEdge {
    pub id: String,
    pub source: String,
    pub target: String,
    pub kind: NetworkEdgeKind,
    /// Normalised dependency strength in `[0, 1]`.
    pub strength: f64,
    pub label: Option<String>,
    pub metadata: EdgeMetadata,
}

// ---------------------------------------------------------------------------
// Clusters
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ClusterKind {
    Workspace,
    RouteGroup,
    ComponentCluster,
    Dependency,
    Unclassified,
}

impl ClusterKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ClusterKind::Workspace => "workspace",
            ClusterKind::RouteGroup => "route-group",
            ClusterKind::ComponentCluster => "component-cluster",
            ClusterKind::Dependency => "dependency",
            ClusterKind::Unclassified => "unclassified",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClusterMetadata {
    /// Internal links over possible internal links.
    pub cohesion: f64,
    /// Outbound links to other clusters over possible outbound links.
    pub coupling: f64,
    pub member_count: usize,
    /// Workspace type, route protection or component type, when known.
    pub tag: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NetworkCluster {
    pub id: String,
    pub label: String,
    pub kind: ClusterKind,
    pub node_ids: Vec<String>,
    pub position: Position,
    pub size: f64,
    pub color: String,
    pub metadata: ClusterMetadata,
}

// ---------------------------------------------------------------------------
// Patterns and metrics
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum PatternKind {
    Hub,
    Chain,
    Star,
    Circular,
    ClusterBridge,
}

impl PatternKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            PatternKind::Hub => "hub",
            PatternKind::Chain => "chain",
            PatternKind::Star => "star",
            PatternKind::Circular => "circular",
            PatternKind::ClusterBridge => "cluster-bridge",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConnectionPattern {
    pub id: String,
    pub kind: PatternKind,
    pub node_ids: Vec<String>,
    /// Share of the topology the pattern covers, in `[0, 1]`.
    pub strength: f64,
    pub description: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TopologyMetrics {
    pub node_count: usize,
    pub edge_count: usize,
    pub cluster_count: usize,
    /// Mean degree over nodes with at least one edge.
    pub average_connectivity: f64,
    pub max_connectivity: usize,
    pub average_cluster_size: f64,
    /// Edges over possible directed edges.
    pub density: f64,
    /// Heuristic score in `[0, 100]`.
    pub complexity_score: f64,
}

/// The assembled, positioned and annotated network view of a dependency graph.
///
/// Every edge endpoint and cluster member refers to a node in `nodes`, and every node
/// belongs to exactly one cluster. A topology is never mutated after assembly.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NetworkTopology {
    pub id: String,
    pub nodes: Vec<NetworkNode>,
    pub edges: Vec<NetworkEdge>,
    pub clusters: Vec<NetworkCluster>,
    pub layout: LayoutSettings,
    pub patterns: Vec<ConnectionPattern>,
    pub metrics: TopologyMetrics,
    /// Wall-clock build time in milliseconds.
    pub build_duration_ms: f64,
    /// Build completion time, unix epoch milliseconds.
    pub built_at_ms: u64,
}
