use std::collections::BTreeSet;

use petgraph::algo::kosaraju_scc;
use petgraph::graph::DiGraph;
use serde::Deserialize;

use super::model::{ConnectionPattern, PatternKind};

/// Thresholds for chain and star detection (`[patterns]` in the config file).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct PatternConfig {
    /// Fewest nodes a chain must span.
    pub min_chain_length: usize,
    /// Fewest leaves a star centre must have.
    pub min_star_leaves: usize,
}

impl Default for PatternConfig {
    fn default() -> Self {
        Self {
            min_chain_length: 3,
            min_star_leaves: 4,
        }
    }
}

/// Index-based view of a topology for pattern detection.
#[derive(Debug, Clone, Copy)]
pub struct PatternInput<'a> {
    pub node_ids: &'a [String],
    pub node_labels: &'a [String],
    /// Directed node-index pairs, one per network edge.
    pub edges: &'a [(usize, usize)],
    /// `node_cluster[i]` = cluster index of node `i`.
    pub node_cluster: &'a [usize],
    pub cluster_labels: &'a [String],
}

impl PatternInput<'_> {
    fn node_count(&self) -> usize {
        self.node_ids.len()
    }

    fn ids(&self, nodes: &[usize]) -> Vec<String> {
        nodes.iter().map(|&n| self.node_ids[n].clone()).collect()
    }

    /// Share of all nodes covered by `participants`, clamped to 1.
    fn share(&self, participants: usize) -> f64 {
        if self.node_count() == 0 {
            0.0
        } else {
            (participants as f64 / self.node_count() as f64).min(1.0)
        }
    }
}

/// Per-node neighbour sets with self-loops removed.
struct Neighbourhood {
    successors: Vec<BTreeSet<usize>>,
    predecessors: Vec<BTreeSet<usize>>,
}

impl Neighbourhood {
    fn new(node_count: usize, edges: &[(usize, usize)]) -> Self {
        let mut successors = vec![BTreeSet::new(); node_count];
        let mut predecessors = vec![BTreeSet::new(); node_count];
        for &(from, to) in edges {
            if from != to && from < node_count && to < node_count {
                successors[from].insert(to);
                predecessors[to].insert(from);
            }
        }
        Self {
            successors,
            predecessors,
        }
    }

    /// Undirected neighbours.
    fn neighbours(&self, node: usize) -> BTreeSet<usize> {
        self.successors[node]
            .union(&self.predecessors[node])
            .copied()
            .collect()
    }

    /// Exactly one way in and one way out.
    fn is_link(&self, node: usize) -> bool {
        self.successors[node].len() == 1 && self.predecessors[node].len() == 1
    }
}

/// Find every structural pattern, in the order hubs, chains, cluster cycles, stars,
/// cluster bridges. Read-only over its input.
pub fn detect_patterns(input: &PatternInput<'_>, config: &PatternConfig) -> Vec<ConnectionPattern> {
    let around = Neighbourhood::new(input.node_count(), input.edges);

    let mut patterns = find_hubs(input);
    patterns.extend(find_chains(input, &around, config.min_chain_length));
    patterns.extend(find_cluster_cycles(input));
    patterns.extend(find_stars(input, &around, config.min_star_leaves));
    patterns.extend(find_cluster_bridges(input));
    patterns
}

/// Nodes whose degree (each edge end counted) reaches max(5, 10% of nodes).
fn find_hubs(input: &PatternInput<'_>) -> Vec<ConnectionPattern> {
    let n = input.node_count();
    let mut degree = vec![0usize; n];
    for &(from, to) in input.edges {
        if from < n && to < n {
            degree[from] += 1;
            degree[to] += 1;
        }
    }
    let threshold = (n as f64 * 0.1).max(5.0);

    (0..n)
        .filter(|&node| degree[node] as f64 >= threshold)
        .enumerate()
        .map(|(k, node)| ConnectionPattern {
            id: format!("hub-{k}"),
            kind: PatternKind::Hub,
            node_ids: input.ids(&[node]),
            strength: input.share(degree[node] + 1),
            description: format!(
                "{} is a hub with {} connections",
                input.node_labels[node], degree[node]
            ),
        })
        .collect()
}

/// Maximal runs `start -> link -> ... -> end` whose interior nodes are pure links.
///
/// Runs start at a node that is not itself a link, so closed loops of links are left
/// to the cycle reports.
fn find_chains(
    input: &PatternInput<'_>,
    around: &Neighbourhood,
    min_len: usize,
) -> Vec<ConnectionPattern> {
    let mut chains = Vec::new();

    for start in 0..input.node_count() {
        if around.is_link(start) {
            continue;
        }
        for &first in &around.successors[start] {
            if !around.is_link(first) {
                continue;
            }
            let mut run = vec![start, first];
            let mut current = first;
            while around.is_link(current) {
                let Some(&next) = around.successors[current].first() else {
                    break;
                };
                run.push(next);
                if next == start {
                    break;
                }
                current = next;
            }
            if run.len() >= min_len.max(2) {
                chains.push(run);
            }
        }
    }

    chains
        .into_iter()
        .enumerate()
        .map(|(k, run)| ConnectionPattern {
            id: format!("chain-{k}"),
            kind: PatternKind::Chain,
            strength: input.share(run.len()),
            description: format!(
                "Linear chain of {} nodes from {} to {}",
                run.len(),
                input.node_labels[run[0]],
                input.node_labels[run[run.len() - 1]]
            ),
            node_ids: input.ids(&run),
        })
        .collect()
}

/// Strongly connected groups of two or more clusters in the inter-cluster edge graph.
fn find_cluster_cycles(input: &PatternInput<'_>) -> Vec<ConnectionPattern> {
    let cluster_count = input.cluster_labels.len();
    let mut graph = DiGraph::<usize, ()>::with_capacity(cluster_count, input.edges.len());
    let indices: Vec<_> = (0..cluster_count).map(|c| graph.add_node(c)).collect();

    let cross: Vec<(usize, usize, usize, usize)> = input
        .edges
        .iter()
        .filter_map(|&(from, to)| {
            let (&a, &b) = (input.node_cluster.get(from)?, input.node_cluster.get(to)?);
            (a != b && a < cluster_count && b < cluster_count).then_some((from, to, a, b))
        })
        .collect();
    for &(_, _, a, b) in &cross {
        graph.update_edge(indices[a], indices[b], ());
    }

    let mut components: Vec<Vec<usize>> = kosaraju_scc(&graph)
        .into_iter()
        .filter(|scc| scc.len() > 1)
        .map(|scc| {
            let mut clusters: Vec<usize> = scc.into_iter().map(|ix| graph[ix]).collect();
            clusters.sort_unstable();
            clusters
        })
        .collect();
    components.sort();

    components
        .into_iter()
        .enumerate()
        .map(|(k, clusters)| {
            let participants: BTreeSet<usize> = cross
                .iter()
                .filter(|(_, _, a, b)| clusters.contains(a) && clusters.contains(b))
                .flat_map(|&(from, to, _, _)| [from, to])
                .collect();
            let participants: Vec<usize> = participants.into_iter().collect();
            let names: Vec<&str> = clusters
                .iter()
                .map(|&c| input.cluster_labels[c].as_str())
                .collect();
            ConnectionPattern {
                id: format!("circular-{k}"),
                kind: PatternKind::Circular,
                strength: input.share(participants.len()),
                description: format!("Circular dependency between clusters {}", names.join(", ")),
                node_ids: input.ids(&participants),
            }
        })
        .collect()
}

/// Centres with at least `min_leaves` neighbours connected to nothing but the centre.
fn find_stars(
    input: &PatternInput<'_>,
    around: &Neighbourhood,
    min_leaves: usize,
) -> Vec<ConnectionPattern> {
    let mut stars = Vec::new();
    for centre in 0..input.node_count() {
        let leaves: Vec<usize> = around
            .neighbours(centre)
            .into_iter()
            .filter(|&leaf| {
                let reach = around.neighbours(leaf);
                reach.len() == 1 && reach.contains(&centre)
            })
            .collect();
        if leaves.len() >= min_leaves.max(1) {
            stars.push((centre, leaves));
        }
    }

    stars
        .into_iter()
        .enumerate()
        .map(|(k, (centre, leaves))| {
            let mut members = vec![centre];
            members.extend(&leaves);
            ConnectionPattern {
                id: format!("star-{k}"),
                kind: PatternKind::Star,
                strength: input.share(members.len()),
                description: format!(
                    "{} is the centre of a star with {} leaves",
                    input.node_labels[centre],
                    leaves.len()
                ),
                node_ids: input.ids(&members),
            }
        })
        .collect()
}

/// Nodes with edges (either direction) into two or more clusters besides their own.
fn find_cluster_bridges(input: &PatternInput<'_>) -> Vec<ConnectionPattern> {
    let n = input.node_count();
    let mut touched = vec![BTreeSet::new(); n];
    for &(from, to) in input.edges {
        let (Some(&a), Some(&b)) = (input.node_cluster.get(from), input.node_cluster.get(to))
        else {
            continue;
        };
        if a != b {
            touched[from].insert(b);
            touched[to].insert(a);
        }
    }

    let total_clusters = input.cluster_labels.len().max(1) as f64;
    touched
        .into_iter()
        .enumerate()
        .filter(|(_, clusters)| clusters.len() >= 2)
        .enumerate()
        .map(|(k, (node, clusters))| ConnectionPattern {
            id: format!("cluster-bridge-{k}"),
            kind: PatternKind::ClusterBridge,
            node_ids: input.ids(&[node]),
            strength: (clusters.len() as f64 / total_clusters).min(1.0),
            description: format!(
                "{} bridges {} other clusters",
                input.node_labels[node],
                clusters.len()
            ),
        })
        .collect()
}
