use super::model::TopologyMetrics;

/// Summary figures for `node_count` nodes, the given directed edges and `cluster_count`
/// clusters. A node's connectivity is its degree, counting both edge ends.
pub fn compute_metrics(
    node_count: usize,
    edges: &[(usize, usize)],
    cluster_count: usize,
) -> TopologyMetrics {
    let mut degree = vec![0usize; node_count];
    for &(from, to) in edges {
        if let Some(d) = degree.get_mut(from) {
            *d += 1;
        }
        if let Some(d) = degree.get_mut(to) {
            *d += 1;
        }
    }

    let connected: Vec<usize> = degree.iter().copied().filter(|&d| d > 0).collect();
    let average_connectivity = if connected.is_empty() {
        0.0
    } else {
        connected.iter().sum::<usize>() as f64 / connected.len() as f64
    };

    let n = node_count as f64;
    let e = edges.len() as f64;
    // Self-imports have no slot among the n(n-1) ordered pairs.
    let links = edges.iter().filter(|(from, to)| from != to).count() as f64;
    let density = if node_count <= 1 {
        0.0
    } else {
        (links / (n * (n - 1.0))).min(1.0)
    };

    TopologyMetrics {
        node_count,
        edge_count: edges.len(),
        cluster_count,
        average_connectivity,
        max_connectivity: degree.iter().copied().max().unwrap_or(0),
        average_cluster_size: if cluster_count == 0 {
            0.0
        } else {
            n / cluster_count as f64
        },
        density,
        complexity_score: (n * 0.1 + e * 0.05 + cluster_count as f64 * 2.0).min(100.0),
    }
}
