use std::collections::HashMap;

use petgraph::unionfind::UnionFind;

use crate::classify::{Classification, ClusterMembership};
use crate::graph::DependencyGraph;

use super::model::{ClusterKind, ClusteringStrategy};

/// Id of the catch-all cluster for nodes no strategy could place.
pub const UNCLASSIFIED_ID: &str = "unclassified";

/// A cluster before layout: identity plus member node indices.
#[derive(Debug, Clone, PartialEq)]
pub struct ClusterSeed {
    pub id: String,
    pub label: String,
    pub kind: ClusterKind,
    pub tag: Option<String>,
    /// Indices into the node list, ascending.
    pub members: Vec<usize>,
    pub cohesion: f64,
    pub coupling: f64,
}

impl ClusterSeed {
    pub fn size(&self) -> f64 {
        (self.members.len() as f64 * 50.0).max(100.0)
    }

    pub fn color(&self, ordinal: usize) -> String {
        cluster_color(self.kind, self.tag.as_deref(), ordinal).to_string()
    }
}

/// The partition of every node into exactly one cluster.
#[derive(Debug, Clone, PartialEq)]
pub struct Clustering {
    pub clusters: Vec<ClusterSeed>,
    /// `node_cluster[i]` = index into `clusters` of node `i`.
    pub node_cluster: Vec<usize>,
}

/// Pick one membership per node according to `strategy`.
///
/// `classifications` is indexed like the graph's nodes. `None` means the node is
/// unassigned and will land in the unclassified cluster.
pub fn assign(
    strategy: ClusteringStrategy,
    classifications: &[Classification],
    graph: &DependencyGraph,
) -> Vec<Option<ClusterMembership>> {
    let components = || dependency_components(graph);
    let workspace =
        |c: &Classification| c.membership(ClusterKind::Workspace).cloned();
    let feature = |c: &Classification| {
        c.membership(ClusterKind::RouteGroup)
            .or_else(|| c.membership(ClusterKind::ComponentCluster))
            .cloned()
    };

    match strategy {
        ClusteringStrategy::WorkspaceBased => classifications.iter().map(workspace).collect(),
        ClusteringStrategy::FeatureBased => classifications.iter().map(feature).collect(),
        ClusteringStrategy::DependencyBased => components(),
        ClusteringStrategy::Hybrid => classifications
            .iter()
            .zip(components())
            .map(|(c, component)| workspace(c).or_else(|| feature(c)).or(component))
            .collect(),
    }
}

/// Weakly connected components of the file graph; single-file components stay unassigned.
///
/// Components are numbered in order of their first node.
pub fn dependency_components(graph: &DependencyGraph) -> Vec<Option<ClusterMembership>> {
    let n = graph.len();
    let mut sets = UnionFind::<usize>::new(n);
    for id in graph.file_ids() {
        for &dep in graph.dependencies(id) {
            sets.union(id.index(), dep.index());
        }
    }
    let labels = sets.into_labeling();

    let mut sizes: HashMap<usize, usize> = HashMap::new();
    for &root in &labels {
        *sizes.entry(root).or_default() += 1;
    }

    let mut ordinals: HashMap<usize, usize> = HashMap::new();
    labels
        .iter()
        .map(|root| {
            if sizes[root] < 2 {
                return None;
            }
            let next = ordinals.len();
            let ordinal = *ordinals.entry(*root).or_insert(next);
            Some(ClusterMembership {
                id: format!("dependency-{ordinal}"),
                label: format!("Dependency group {}", ordinal + 1),
                kind: ClusterKind::Dependency,
                tag: None,
            })
        })
        .collect()
}

/// Group nodes by assigned membership, in first-seen order, and compute cluster metrics.
///
/// Unassigned nodes share one trailing `unclassified` cluster, created only when needed.
pub fn build_clusters(
    assignments: Vec<Option<ClusterMembership>>,
    graph: &DependencyGraph,
) -> Clustering {
    let mut clusters: Vec<ClusterSeed> = Vec::new();
    let mut by_id: HashMap<String, usize> = HashMap::new();
    let mut node_cluster = Vec::with_capacity(assignments.len());
    let mut unassigned = Vec::new();

    for (node, membership) in assignments.into_iter().enumerate() {
        let Some(membership) = membership else {
            unassigned.push(node);
            node_cluster.push(usize::MAX);
            continue;
        };
        let index = *by_id.entry(membership.id.clone()).or_insert_with(|| {
            clusters.push(ClusterSeed {
                id: membership.id,
                label: membership.label,
                kind: membership.kind,
                tag: membership.tag,
                members: Vec::new(),
                cohesion: 0.0,
                coupling: 0.0,
            });
            clusters.len() - 1
        });
        clusters[index].members.push(node);
        node_cluster.push(index);
    }

    if !unassigned.is_empty() {
        let index = clusters.len();
        for &node in &unassigned {
            node_cluster[node] = index;
        }
        clusters.push(ClusterSeed {
            id: UNCLASSIFIED_ID.to_string(),
            label: "Unclassified".to_string(),
            kind: ClusterKind::Unclassified,
            tag: None,
            members: unassigned,
            cohesion: 0.0,
            coupling: 0.0,
        });
    }

    score_clusters(&mut clusters, &node_cluster, graph);
    Clustering {
        clusters,
        node_cluster,
    }
}

/// Fill in cohesion and coupling from the file-level adjacency. Self-imports are ignored.
fn score_clusters(clusters: &mut [ClusterSeed], node_cluster: &[usize], graph: &DependencyGraph) {
    let total = node_cluster.len();
    let mut internal = vec![0usize; clusters.len()];
    let mut outbound = vec![0usize; clusters.len()];

    for id in graph.file_ids() {
        let Some(&from) = node_cluster.get(id.index()) else {
            continue;
        };
        for &dep in graph.dependencies(id) {
            if dep == id {
                continue;
            }
            match node_cluster.get(dep.index()) {
                Some(&to) if to == from => internal[from] += 1,
                Some(_) => outbound[from] += 1,
                None => {}
            }
        }
    }

    for (i, cluster) in clusters.iter_mut().enumerate() {
        let n = cluster.members.len();
        cluster.cohesion = ratio(internal[i], n * n.saturating_sub(1));
        cluster.coupling = ratio(outbound[i], n * total.saturating_sub(n));
    }
}

fn ratio(count: usize, possible: usize) -> f64 {
    if possible == 0 {
        0.0
    } else {
        count as f64 / possible as f64
    }
}

const NEUTRAL: &str = "#6b7280";
const DEPENDENCY_PALETTE: &[&str] = &[
    "#3b82f6", "#10b981", "#f59e0b", "#8b5cf6", "#ef4444", "#06b6d4", "#84cc16", "#ec4899",
];

fn cluster_color(kind: ClusterKind, tag: Option<&str>, ordinal: usize) -> &'static str {
    match (kind, tag) {
        (ClusterKind::Workspace, Some(tag)) => match tag {
            "app" => "#3b82f6",
            "shared-ui" => "#10b981",
            "core-logic" => "#f59e0b",
            "agents" => "#8b5cf6",
            "microservice" => "#ef4444",
            "infrastructure" => "#6b7280",
            "documentation" => "#06b6d4",
            "library" => "#84cc16",
            _ => NEUTRAL,
        },
        (ClusterKind::RouteGroup, Some(tag)) => match tag {
            "public" => "#10b981",
            "authenticated" => "#f59e0b",
            "role-based" => "#ef4444",
            "unauthenticated" => "#3b82f6",
            _ => NEUTRAL,
        },
        (ClusterKind::ComponentCluster, Some(tag)) => match tag {
            "ui" => "#06b6d4",
            "layout" => "#8b5cf6",
            "page" => "#3b82f6",
            "feature" => "#f59e0b",
            _ => NEUTRAL,
        },
        (ClusterKind::Dependency, _) => DEPENDENCY_PALETTE[ordinal % DEPENDENCY_PALETTE.len()],
        _ => NEUTRAL,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::classify::{Classifier, ConventionClassifier};
    use crate::graph::fixtures::build;

    fn classify_all(graph: &DependencyGraph) -> Vec<Classification> {
        let c = ConventionClassifier::default();
        graph.nodes().iter().map(|r| c.classify(r)).collect()
    }

    fn cluster_ids(clustering: &Clustering) -> Vec<&str> {
        clustering.clusters.iter().map(|c| c.id.as_str()).collect()
    }

    fn monorepo() -> DependencyGraph {
        build(&[
            ("apps/web/app/(auth)/login/page.tsx", "import { Button } from '../../../components/ui/Button';"),
            ("apps/web/components/ui/Button.tsx", ""),
            ("libs/core/src/a.ts", "import { b } from './b';"),
            ("libs/core/src/b.ts", ""),
            ("scripts/x.ts", "import { y } from './y';"),
            ("scripts/y.ts", ""),
            ("README.md", ""),
        ])
    }

    #[test]
    fn test_workspace_strategy() {
        let graph = monorepo();
        let clustering = build_clusters(
            assign(ClusteringStrategy::WorkspaceBased, &classify_all(&graph), &graph),
            &graph,
        );
        assert_eq!(
            cluster_ids(&clustering),
            vec!["workspace-web", "workspace-core", UNCLASSIFIED_ID]
        );
        assert_eq!(clustering.clusters[2].members, vec![4, 5, 6]);
    }

    #[test]
    fn test_feature_strategy() {
        let graph = monorepo();
        let clustering = build_clusters(
            assign(ClusteringStrategy::FeatureBased, &classify_all(&graph), &graph),
            &graph,
        );
        assert_eq!(
            cluster_ids(&clustering),
            vec!["route-group-auth", "component-ui", UNCLASSIFIED_ID]
        );
    }

    #[test]
    fn test_dependency_strategy_skips_singletons() {
        let graph = monorepo();
        let clustering = build_clusters(
            assign(ClusteringStrategy::DependencyBased, &classify_all(&graph), &graph),
            &graph,
        );
        assert_eq!(
            cluster_ids(&clustering),
            vec!["dependency-0", "dependency-1", "dependency-2", UNCLASSIFIED_ID]
        );
        assert_eq!(clustering.clusters[3].members, vec![6], "README.md is alone");
    }

    #[test]
    fn test_hybrid_strategy_falls_through() {
        let graph = monorepo();
        let clustering = build_clusters(
            assign(ClusteringStrategy::Hybrid, &classify_all(&graph), &graph),
            &graph,
        );
        assert_eq!(
            cluster_ids(&clustering),
            vec!["workspace-web", "workspace-core", "dependency-2", UNCLASSIFIED_ID]
        );
    }

    #[test]
    fn test_every_node_in_exactly_one_cluster() {
        let graph = monorepo();
        for strategy in [
            ClusteringStrategy::WorkspaceBased,
            ClusteringStrategy::FeatureBased,
            ClusteringStrategy::DependencyBased,
            ClusteringStrategy::Hybrid,
        ] {
            let clustering =
                build_clusters(assign(strategy, &classify_all(&graph), &graph), &graph);
            let mut seen = vec![0; graph.len()];
            for cluster in &clustering.clusters {
                for &m in &cluster.members {
                    seen[m] += 1;
                }
            }
            assert!(seen.iter().all(|&c| c == 1), "{strategy:?}: {seen:?}");
            for (node, &cluster) in clustering.node_cluster.iter().enumerate() {
                assert!(clustering.clusters[cluster].members.contains(&node));
            }
        }
    }

    #[test]
    fn test_cohesion_and_coupling() {
        let graph = build(&[
            ("a.ts", "import './b'; import './c';"),
            ("b.ts", "import './a';"),
            ("c.ts", ""),
        ]);
        // a, b in one group; c alone.
        let m = |id: &str| {
            Some(ClusterMembership {
                id: id.into(),
                label: id.into(),
                kind: ClusterKind::Dependency,
                tag: None,
            })
        };
        let clustering = build_clusters(vec![m("x"), m("x"), m("y")], &graph);
        let x = &clustering.clusters[0];
        assert_eq!(x.cohesion, 1.0, "a->b and b->a out of 2 possible");
        assert_eq!(x.coupling, 0.5, "a->c out of 2 * 1 possible");
        let y = &clustering.clusters[1];
        assert_eq!(y.cohesion, 0.0);
        assert_eq!(y.coupling, 0.0);
        assert_eq!(x.size(), 100.0);
    }

    #[test]
    fn test_empty_graph_has_no_clusters() {
        let graph = build(&[]);
        let clustering = build_clusters(
            assign(ClusteringStrategy::Hybrid, &[], &graph),
            &graph,
        );
        assert!(clustering.clusters.is_empty());
        assert!(clustering.node_cluster.is_empty());
    }
}
