use serde::Serialize;

use super::DependencyGraph;
use super::edge::DependencyKind;
use crate::resolver::ResolveStats;

/// Aggregated figures for one built dependency graph.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DependencyStats {
    pub file_count: usize,
    /// Number of statement edges (not deduplicated).
    pub edge_count: usize,
    /// Number of distinct file -> file links.
    pub link_count: usize,
    pub static_imports: usize,
    pub dynamic_imports: usize,
    pub requires: usize,
    pub type_imports: usize,
    pub asset_references: usize,
    pub re_exports: usize,
    /// Distinct dependencies per file, averaged over all files.
    pub average_dependencies: f64,
    pub max_dependencies: usize,
    /// Relative paths of every file that has `max_dependencies` dependencies.
    pub most_dependent_files: Vec<String>,
    pub cycle_count: usize,
    pub orphan_count: usize,
    pub entry_point_count: usize,
    /// JSX elements naming a component, over all files.
    pub component_usage_count: usize,
    /// Distinct component names used.
    pub component_count: usize,
    pub resolution: ResolveStats,
}

impl DependencyGraph {
    /// Compute summary statistics.
    pub fn stats(&self) -> DependencyStats {
        let count = |kind: DependencyKind| self.edges().iter().filter(|e| e.kind == kind).count();

        let link_count: usize = self.adjacency().iter().map(Vec::len).sum();
        let max_dependencies = self.adjacency().iter().map(Vec::len).max().unwrap_or(0);
        let most_dependent_files = if max_dependencies == 0 {
            Vec::new()
        } else {
            self.file_ids()
                .filter(|&id| self.dependencies(id).len() == max_dependencies)
                .map(|id| self.display_path(id))
                .collect()
        };
        let average_dependencies = if self.is_empty() {
            0.0
        } else {
            link_count as f64 / self.len() as f64
        };

        DependencyStats {
            file_count: self.len(),
            edge_count: self.edges().len(),
            link_count,
            static_imports: count(DependencyKind::StaticImport),
            dynamic_imports: count(DependencyKind::DynamicImport),
            requires: count(DependencyKind::Require),
            type_imports: count(DependencyKind::TypeImport),
            asset_references: count(DependencyKind::AssetReference),
            re_exports: count(DependencyKind::ReExport),
            average_dependencies,
            max_dependencies,
            most_dependent_files,
            cycle_count: self.cycles().len(),
            orphan_count: self.orphaned_files().len(),
            entry_point_count: self.entry_points().len(),
            component_usage_count: self.component_usages().values().map(Vec::len).sum(),
            component_count: self.component_usages().len(),
            resolution: self.resolve_stats(),
        }
    }
}
