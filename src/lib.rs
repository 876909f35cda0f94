//! File-level dependency graphs and network topologies for TypeScript/JavaScript projects.
//!
//! The pipeline is: [`walker::scan_project`] builds the file inventory,
//! [`graph::GraphBuilder`] extracts and resolves imports into a [`graph::DependencyGraph`],
//! and [`topology::TopologyBuilder`] turns that graph into a clustered, laid-out
//! [`topology::model::NetworkTopology`].

pub mod classify;
pub mod config;
pub mod error;
pub mod export;
pub mod graph;
pub mod output;
pub mod parser;
pub mod resolver;
pub mod topology;
pub mod walker;
