use thiserror::Error;

use crate::graph::{EdgeId, FileId};

/// A structural invariant of the dependency graph does not hold.
///
/// These are builder defects, not input problems: unresolved imports, unreadable files
/// and missing classifications never produce a `GraphError`.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GraphError {
    #[error("edge {edge} references unknown file id {file}")]
    DanglingEdge { edge: EdgeId, file: FileId },

    #[error("{list} references unknown file id {file}")]
    DanglingReference { list: &'static str, file: FileId },

    #[error("adjacency {from} -> {to} has no matching reverse-adjacency entry")]
    AsymmetricAdjacency { from: FileId, to: FileId },

    #[error("adjacency of {file} lists {to} more than once")]
    DuplicateAdjacency { file: FileId, to: FileId },
}

/// A structural invariant of an assembled network topology does not hold.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum TopologyError {
    #[error(transparent)]
    Graph(#[from] GraphError),

    #[error("edge {edge} references unknown node {node}")]
    DanglingEdge { edge: String, node: String },

    #[error("cluster {cluster} references unknown node {node}")]
    DanglingMember { cluster: String, node: String },

    #[error("node {node} belongs to {count} clusters, expected exactly one")]
    ClusterMembership { node: String, count: usize },

    #[error("node {node} was given a non-finite position ({x}, {y})")]
    NonFinitePosition { node: String, x: f64, y: f64 },
}
