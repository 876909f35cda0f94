use std::f64::consts::TAU;

use super::model::{LayoutAlgorithm, Position};

/// Index-based view of a topology that the layout algorithms work on.
#[derive(Debug, Clone, Copy)]
pub struct LayoutInput<'a> {
    pub node_count: usize,
    /// Directed node-index pairs, one per network edge.
    pub edges: &'a [(usize, usize)],
    /// Member node indices per cluster.
    pub clusters: &'a [Vec<usize>],
    pub spacing: f64,
}

/// Computed coordinates, indexed like the input nodes and clusters.
#[derive(Debug, Clone, PartialEq)]
pub struct Layout {
    pub nodes: Vec<Position>,
    pub clusters: Vec<Position>,
}

/// Run `algorithm` over `input`. Deterministic: equal inputs give equal layouts.
pub fn compute(algorithm: LayoutAlgorithm, input: &LayoutInput<'_>) -> Layout {
    match algorithm {
        LayoutAlgorithm::ForceDirected => force_directed(input),
        LayoutAlgorithm::Hierarchical => with_centroids(input, hierarchical(input)),
        LayoutAlgorithm::Circular => with_centroids(input, circular(input.node_count)),
        LayoutAlgorithm::Grid => with_centroids(input, grid(input.node_count, input.spacing)),
    }
}

// ---------------------------------------------------------------------------
// Force-directed (two-level radial placement)
// ---------------------------------------------------------------------------

fn force_directed(input: &LayoutInput<'_>) -> Layout {
    let mut nodes = vec![Position::ORIGIN; input.node_count];
    let cluster_count = input.clusters.len();
    let radius = (cluster_count as f64 * 50.0).max(300.0);

    let clusters: Vec<Position> = (0..cluster_count)
        .map(|i| on_circle(i, cluster_count, radius, Position::ORIGIN))
        .collect();

    for (center, members) in clusters.iter().zip(input.clusters) {
        let local_radius = (members.len() as f64 * 10.0).min(100.0);
        for (slot, &node) in members.iter().enumerate() {
            if let Some(position) = nodes.get_mut(node) {
                *position = on_circle(slot, members.len(), local_radius, *center);
            }
        }
    }

    Layout { nodes, clusters }
}

// ---------------------------------------------------------------------------
// Hierarchical
// ---------------------------------------------------------------------------

/// Dependency depth of every node by level-by-level Kahn traversal.
///
/// Level 0 holds nodes without incoming edges. A node's level is one more than the
/// deepest of its predecessors. Nodes that sit on or behind a cycle never reach zero
/// in-degree and come back as `None`.
pub fn node_levels(node_count: usize, edges: &[(usize, usize)]) -> Vec<Option<usize>> {
    let mut successors = vec![Vec::new(); node_count];
    let mut in_degree = vec![0usize; node_count];
    for &(from, to) in edges {
        if from < node_count && to < node_count {
            successors[from].push(to);
            in_degree[to] += 1;
        }
    }

    let mut levels = vec![None; node_count];
    let mut frontier: Vec<usize> = (0..node_count).filter(|&i| in_degree[i] == 0).collect();
    let mut level = 0;

    while !frontier.is_empty() {
        let mut next = Vec::new();
        for &node in &frontier {
            levels[node] = Some(level);
            for &succ in &successors[node] {
                in_degree[succ] -= 1;
                if in_degree[succ] == 0 {
                    next.push(succ);
                }
            }
        }
        next.sort_unstable();
        frontier = next;
        level += 1;
    }

    levels
}

fn hierarchical(input: &LayoutInput<'_>) -> Vec<Position> {
    let levels = node_levels(input.node_count, input.edges);
    let cycle_row = levels.iter().flatten().max().map_or(0, |deepest| deepest + 1);
    let rows: Vec<usize> = levels.iter().map(|l| l.unwrap_or(cycle_row)).collect();

    let mut row_sizes = vec![0usize; cycle_row + 1];
    for &row in &rows {
        row_sizes[row] += 1;
    }

    let mut row_slots = vec![0usize; cycle_row + 1];
    rows.iter()
        .map(|&row| {
            let slot = row_slots[row];
            row_slots[row] += 1;
            let offset = slot as f64 - (row_sizes[row] as f64 - 1.0) / 2.0;
            Position::new(
                offset * input.spacing * 1.5,
                row as f64 * input.spacing * 2.0,
            )
        })
        .collect()
}

// ---------------------------------------------------------------------------
// Circular and grid
// ---------------------------------------------------------------------------

fn circular(node_count: usize) -> Vec<Position> {
    let radius = (node_count as f64 * 15.0).max(200.0);
    (0..node_count)
        .map(|i| on_circle(i, node_count, radius, Position::ORIGIN))
        .collect()
}

fn grid(node_count: usize, spacing: f64) -> Vec<Position> {
    let columns = ((node_count as f64).sqrt().ceil() as usize).max(1);
    (0..node_count)
        .map(|i| {
            Position::new(
                (i % columns) as f64 * spacing,
                (i / columns) as f64 * spacing,
            )
        })
        .collect()
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

/// Slot `index` of `count` evenly spaced points on a circle around `center`.
fn on_circle(index: usize, count: usize, radius: f64, center: Position) -> Position {
    if count == 0 {
        return center;
    }
    let angle = TAU * index as f64 / count as f64;
    Position::new(
        center.x + angle.cos() * radius,
        center.y + angle.sin() * radius,
    )
}

/// Pair node positions with cluster positions at each cluster's member centroid.
fn with_centroids(input: &LayoutInput<'_>, nodes: Vec<Position>) -> Layout {
    let clusters = input
        .clusters
        .iter()
        .map(|members| {
            let placed: Vec<Position> = members.iter().filter_map(|&m| nodes.get(m).copied()).collect();
            if placed.is_empty() {
                return Position::ORIGIN;
            }
            let n = placed.len() as f64;
            Position::new(
                placed.iter().map(|p| p.x).sum::<f64>() / n,
                placed.iter().map(|p| p.y).sum::<f64>() / n,
            )
        })
        .collect();
    Layout { nodes, clusters }
}
