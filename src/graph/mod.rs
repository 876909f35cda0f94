pub mod cycles;
pub mod edge;
pub mod node;
pub mod stats;

use std::collections::{BTreeMap, HashMap};
use std::fmt;
use std::path::{Path, PathBuf};

use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::classify::Classifier;
use crate::error::GraphError;
use crate::parser::{
    ComponentUsage, ImportPatterns, RawDependency, extract_component_usages, extract_dependencies,
};
use crate::resolver::{DEFAULT_EXTENSIONS, PathResolver, Resolution, ResolveStats, normalize_path};

use edge::DependencyEdge;
use node::FileRecord;

/// Dense index of a file node inside a [`DependencyGraph`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FileId(pub u32);

impl FileId {
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

impl fmt::Display for FileId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "file#{}", self.0)
    }
}

/// Dense index of an edge inside a [`DependencyGraph`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EdgeId(pub u32);

impl fmt::Display for EdgeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "edge#{}", self.0)
    }
}

/// The file-level dependency graph of one scan.
///
/// Nodes live in an arena addressed by [`FileId`]; edges, adjacency lists, cycles and
/// the orphan/entry-point lists only ever hold ids. The graph is immutable once built.
#[derive(Debug, Clone)]
pub struct DependencyGraph {
    nodes: Vec<FileRecord>,
    edges: Vec<DependencyEdge>,
    /// `adjacency[a]` = files `a` depends on, first-seen order, no duplicates.
    adjacency: Vec<Vec<FileId>>,
    /// `reverse_adjacency[b]` = files depending on `b`, first-seen order, no duplicates.
    reverse_adjacency: Vec<Vec<FileId>>,
    path_index: HashMap<PathBuf, FileId>,
    natural_entry: Vec<bool>,
    cycles: Vec<Vec<FileId>>,
    orphaned_files: Vec<FileId>,
    entry_points: Vec<FileId>,
    /// JSX component usages grouped by component name.
    component_usages: BTreeMap<String, Vec<ComponentUsage>>,
    resolve_stats: ResolveStats,
}

impl DependencyGraph {
    /// Index every non-directory record as a node, in inventory order.
    fn with_nodes(files: Vec<FileRecord>) -> Self {
        let mut nodes = Vec::with_capacity(files.len());
        let mut path_index = HashMap::with_capacity(files.len());

        for record in files.into_iter().filter(|f| !f.is_directory) {
            let key = normalize_path(&record.path);
            if path_index.contains_key(&key) {
                warn!(path = %record.path.display(), "duplicate inventory entry ignored");
                continue;
            }
            path_index.insert(key, FileId(nodes.len() as u32));
            nodes.push(record);
        }

        let n = nodes.len();
        Self {
            nodes,
            edges: Vec::new(),
            adjacency: vec![Vec::new(); n],
            reverse_adjacency: vec![Vec::new(); n],
            path_index,
            natural_entry: vec![false; n],
            cycles: Vec::new(),
            orphaned_files: Vec::new(),
            entry_points: Vec::new(),
            component_usages: BTreeMap::new(),
            resolve_stats: ResolveStats::default(),
        }
    }

    /// Insert one resolved statement and keep both adjacency lists in step.
    fn add_edge(&mut self, from: FileId, to: FileId, raw: RawDependency) -> EdgeId {
        let id = EdgeId(self.edges.len() as u32);
        self.edges.push(DependencyEdge {
            id,
            from,
            to,
            kind: raw.kind,
            import_path: raw.import_path,
            specifiers: raw.specifiers,
            line: raw.line,
            column: raw.column,
            is_dynamic: raw.is_dynamic,
            is_type_only: raw.is_type_only,
            is_named_import: raw.is_named_import,
        });

        let deps = &mut self.adjacency[from.index()];
        if !deps.contains(&to) {
            deps.push(to);
            self.reverse_adjacency[to.index()].push(from);
        }
        id
    }

    /// Derive cycles, orphans and entry points once every edge is in place.
    fn finalize(&mut self) {
        self.cycles = cycles::detect_cycles(&self.adjacency);

        self.orphaned_files = self
            .file_ids()
            .filter(|&id| {
                !self.natural_entry[id.index()]
                    && self.adjacency[id.index()].is_empty()
                    && self.reverse_adjacency[id.index()].is_empty()
            })
            .collect();

        self.entry_points = self
            .file_ids()
            .filter(|&id| {
                self.natural_entry[id.index()] && self.reverse_adjacency[id.index()].is_empty()
            })
            .collect();
    }

    // -----------------------------------------------------------------------
    // Accessors
    // -----------------------------------------------------------------------

    /// Number of file nodes.
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// All file ids in node order.
    pub fn file_ids(&self) -> impl Iterator<Item = FileId> + '_ {
        (0..self.nodes.len() as u32).map(FileId)
    }

    pub fn nodes(&self) -> &[FileRecord] {
        &self.nodes
    }

    pub fn node(&self, id: FileId) -> Option<&FileRecord> {
        self.nodes.get(id.index())
    }

    /// Look up a file by path (normalised the same way the resolver does).
    pub fn lookup(&self, path: &Path) -> Option<FileId> {
        self.path_index.get(&normalize_path(path)).copied()
    }

    pub fn edges(&self) -> &[DependencyEdge] {
        &self.edges
    }

    /// Files that `id` depends on.
    pub fn dependencies(&self, id: FileId) -> &[FileId] {
        self.adjacency.get(id.index()).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Files that depend on `id`.
    pub fn dependents(&self, id: FileId) -> &[FileId] {
        self.reverse_adjacency
            .get(id.index())
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    /// The whole adjacency list, indexed by `FileId::index()`.
    pub fn adjacency(&self) -> &[Vec<FileId>] {
        &self.adjacency
    }

    pub fn cycles(&self) -> &[Vec<FileId>] {
        &self.cycles
    }

    pub fn orphaned_files(&self) -> &[FileId] {
        &self.orphaned_files
    }

    pub fn entry_points(&self) -> &[FileId] {
        &self.entry_points
    }

    /// Every component usage, keyed by component name; usages in file then source order.
    pub fn component_usages(&self) -> &BTreeMap<String, Vec<ComponentUsage>> {
        &self.component_usages
    }

    /// Usages of one component, empty when it never appears.
    pub fn usages_of(&self, component: &str) -> &[ComponentUsage] {
        self.component_usages
            .get(component)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    /// Whether the classifier marked this file as a natural entry point.
    pub fn is_natural_entry_point(&self, id: FileId) -> bool {
        self.natural_entry.get(id.index()).copied().unwrap_or(false)
    }

    pub fn resolve_stats(&self) -> ResolveStats {
        self.resolve_stats
    }

    /// Relative display path of a node, or the id itself when out of range.
    pub fn display_path(&self, id: FileId) -> String {
        self.node(id)
            .map(FileRecord::display_path)
            .unwrap_or_else(|| id.to_string())
    }

    /// Check every structural invariant: ids in range, adjacency symmetric and unique.
    pub fn validate(&self) -> Result<(), GraphError> {
        let n = self.nodes.len();
        let check = |list: &'static str, file: FileId| {
            if file.index() < n {
                Ok(())
            } else {
                Err(GraphError::DanglingReference { list, file })
            }
        };

        for edge in &self.edges {
            for file in [edge.from, edge.to] {
                if file.index() >= n {
                    return Err(GraphError::DanglingEdge {
                        edge: edge.id,
                        file,
                    });
                }
            }
        }

        for (i, deps) in self.adjacency.iter().enumerate() {
            let from = FileId(i as u32);
            for (pos, &to) in deps.iter().enumerate() {
                check("adjacency", to)?;
                if deps[..pos].contains(&to) {
                    return Err(GraphError::DuplicateAdjacency { file: from, to });
                }
                if !self.reverse_adjacency[to.index()].contains(&from) {
                    return Err(GraphError::AsymmetricAdjacency { from, to });
                }
            }
        }

        for (i, dependents) in self.reverse_adjacency.iter().enumerate() {
            let to = FileId(i as u32);
            for &from in dependents {
                check("reverse adjacency", from)?;
                if !self.adjacency[from.index()].contains(&to) {
                    return Err(GraphError::AsymmetricAdjacency { from, to });
                }
            }
        }

        for &file in self.cycles.iter().flatten() {
            check("cycles", file)?;
        }
        for &file in &self.orphaned_files {
            check("orphaned files", file)?;
        }
        for &file in &self.entry_points {
            check("entry points", file)?;
        }

        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Builder
// ---------------------------------------------------------------------------

/// Turns a file inventory into a [`DependencyGraph`].
///
/// Stages run strictly in order: index every identity, extract statements from all
/// analyzable files (in parallel), resolve and insert edges, then derive cycles,
/// orphans and entry points.
pub struct GraphBuilder<'p> {
    patterns: &'p ImportPatterns,
    extensions: Vec<String>,
}

impl Default for GraphBuilder<'static> {
    fn default() -> Self {
        Self::new(
            ImportPatterns::shared(),
            DEFAULT_EXTENSIONS.iter().map(|e| e.to_string()).collect(),
        )
    }
}

impl<'p> GraphBuilder<'p> {
    pub fn new(patterns: &'p ImportPatterns, extensions: Vec<String>) -> Self {
        Self {
            patterns,
            extensions,
        }
    }

    /// Build the graph for `files`, consulting `classifier` for natural entry points.
    pub fn build(&self, files: Vec<FileRecord>, classifier: &dyn Classifier) -> DependencyGraph {
        let mut graph = DependencyGraph::with_nodes(files);

        graph.natural_entry = graph
            .nodes
            .iter()
            .map(|record| classifier.is_natural_entry_point(record))
            .collect();

        // Extraction: embarrassingly parallel, collected back in node order.
        let (extracted, usages): (Vec<Vec<RawDependency>>, Vec<Vec<ComponentUsage>>) = graph
            .nodes
            .par_iter()
            .enumerate()
            .map(|(i, record)| match (&record.content, record.is_analyzable()) {
                (Some(content), true) => {
                    let usages = if record.may_contain_jsx() {
                        extract_component_usages(content, FileId(i as u32), self.patterns)
                    } else {
                        Vec::new()
                    };
                    (extract_dependencies(content, self.patterns), usages)
                }
                _ => (Vec::new(), Vec::new()),
            })
            .unzip();

        for usage in usages.into_iter().flatten() {
            graph
                .component_usages
                .entry(usage.component.clone())
                .or_default()
                .push(usage);
        }

        // Resolution needs the complete identity index, which `with_nodes` built.
        let mut stats = ResolveStats::default();
        let mut pending: Vec<(FileId, FileId, RawDependency)> = Vec::new();
        {
            let resolver = PathResolver::new(&graph.path_index, &self.extensions);
            for (i, deps) in extracted.into_iter().enumerate() {
                let from = FileId(i as u32);
                let from_path = &graph.nodes[i].path;
                for raw in deps {
                    let resolution = resolver.resolve(&raw.import_path, from_path);
                    stats.record(resolution);
                    match resolution {
                        Resolution::Resolved(to) => pending.push((from, to, raw)),
                        Resolution::Unresolved => debug!(
                            from = %from_path.display(),
                            import = %raw.import_path,
                            line = raw.line,
                            "unresolved relative import dropped"
                        ),
                        Resolution::External => {}
                    }
                }
            }
        }

        for (from, to, raw) in pending {
            graph.add_edge(from, to, raw);
        }
        graph.resolve_stats = stats;
        graph.finalize();

        info!(
            files = graph.len(),
            edges = graph.edges.len(),
            cycles = graph.cycles.len(),
            orphans = graph.orphaned_files.len(),
            entry_points = graph.entry_points.len(),
            components = graph.component_usages.len(),
            "dependency graph built"
        );

        graph
    }
}
