use serde::Serialize;

use super::{DependencyGraph, FileId};

/// Find every cycle reachable by a depth-first walk of `adjacency`.
///
/// Roots are taken in node order and neighbours in adjacency order. Whenever the walk
/// reaches a node that is still on the recursion stack, the path from that node through
/// the current one is recorded as a cycle, and the walk carries on. A node that imports
/// itself yields a cycle of length one.
///
/// The walk keeps its own frame stack, so arbitrarily deep import chains are fine.
pub fn detect_cycles(adjacency: &[Vec<FileId>]) -> Vec<Vec<FileId>> {
    let n = adjacency.len();
    let mut visited = vec![false; n];
    let mut on_stack = vec![false; n];
    // Parallel to the frame stack; `path[i]` is the node of frame `i`.
    let mut path: Vec<FileId> = Vec::new();
    // (node, index of the next neighbour to explore)
    let mut frames: Vec<(FileId, usize)> = Vec::new();
    let mut cycles = Vec::new();

    for root in 0..n {
        if visited[root] {
            continue;
        }
        let root = FileId(root as u32);
        visited[root.index()] = true;
        on_stack[root.index()] = true;
        path.push(root);
        frames.push((root, 0));

        while let Some(frame) = frames.last_mut() {
            let (node, next) = *frame;
            let Some(&neighbour) = adjacency[node.index()].get(next) else {
                frames.pop();
                path.pop();
                on_stack[node.index()] = false;
                continue;
            };
            frame.1 += 1;

            if neighbour.index() >= n {
                continue;
            }
            if on_stack[neighbour.index()] {
                if let Some(start) = path.iter().position(|&f| f == neighbour) {
                    cycles.push(path[start..].to_vec());
                }
            } else if !visited[neighbour.index()] {
                visited[neighbour.index()] = true;
                on_stack[neighbour.index()] = true;
                path.push(neighbour);
                frames.push((neighbour, 0));
            }
        }
    }

    cycles
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum CycleSeverity {
    High,
    Medium,
    Low,
}

impl CycleSeverity {
    /// Short cycles are the most tightly coupled and the easiest to break.
    pub fn for_length(len: usize) -> Self {
        match len {
            0..=3 => Self::High,
            4..=5 => Self::Medium,
            _ => Self::Low,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::High => "high",
            Self::Medium => "medium",
            Self::Low => "low",
        }
    }
}

/// The link of a cycle whose removal costs the least.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BreakPoint {
    pub from: FileId,
    pub to: FileId,
    /// Strongest statement strength between `from` and `to`.
    pub strength: f64,
}

/// A detected cycle with severity and a suggested place to cut it.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CycleReport {
    pub files: Vec<FileId>,
    pub paths: Vec<String>,
    pub severity: CycleSeverity,
    pub suggested_break: Option<BreakPoint>,
}

impl DependencyGraph {
    /// Describe every detected cycle, in detection order.
    pub fn cycle_reports(&self) -> Vec<CycleReport> {
        self.cycles()
            .iter()
            .map(|cycle| CycleReport {
                files: cycle.clone(),
                paths: cycle.iter().map(|&id| self.display_path(id)).collect(),
                severity: CycleSeverity::for_length(cycle.len()),
                suggested_break: self.weakest_link(cycle),
            })
            .collect()
    }

    /// The closing link `cycle[i] -> cycle[i+1]` (wrapping) with the lowest strength.
    /// Ties keep the earliest link.
    fn weakest_link(&self, cycle: &[FileId]) -> Option<BreakPoint> {
        let mut weakest: Option<BreakPoint> = None;
        for (i, &from) in cycle.iter().enumerate() {
            let to = cycle[(i + 1) % cycle.len()];
            let strength = self
                .edges()
                .iter()
                .filter(|e| e.from == from && e.to == to)
                .map(|e| e.strength())
                .fold(None, |acc: Option<f64>, s| Some(acc.map_or(s, |a| a.max(s))));
            let Some(strength) = strength else { continue };
            if weakest.as_ref().is_none_or(|w| strength < w.strength) {
                weakest = Some(BreakPoint { from, to, strength });
            }
        }
        weakest
    }
}
