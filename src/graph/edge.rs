use serde::{Deserialize, Serialize};

use super::{EdgeId, FileId};

/// The kind of relationship a dependency statement expresses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum DependencyKind {
    /// `import ... from './x'` and side-effect `import './x'`.
    StaticImport,
    /// `import('./x')`.
    DynamicImport,
    /// CommonJS `require('./x')`.
    Require,
    /// `import type { T } from './x'`.
    TypeImport,
    /// Imports of images, stylesheets and fonts.
    AssetReference,
    /// `export { a } from './x'` and `export * from './x'`.
    ReExport,
}

impl DependencyKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            DependencyKind::StaticImport => "static-import",
            DependencyKind::DynamicImport => "dynamic-import",
            DependencyKind::Require => "require",
            DependencyKind::TypeImport => "type-import",
            DependencyKind::AssetReference => "asset-reference",
            DependencyKind::ReExport => "re-export",
        }
    }
}

/// A resolved file -> file dependency created from one import statement.
///
/// Two identical statements produce two edges; only the adjacency lists are deduplicated.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DependencyEdge {
    pub id: EdgeId,
    /// The importing file.
    pub from: FileId,
    /// The resolved imported file.
    pub to: FileId,
    pub kind: DependencyKind,
    /// The raw import path as written in source (e.g. `"./utils"`).
    pub import_path: String,
    /// Imported names; empty for side-effect, require and dynamic imports.
    pub specifiers: Vec<String>,
    /// 1-based line of the statement.
    pub line: usize,
    /// 1-based column of the statement.
    pub column: usize,
    pub is_dynamic: bool,
    pub is_type_only: bool,
    /// True for `{ a, b }` style imports.
    pub is_named_import: bool,
}

impl DependencyEdge {
    /// Relative weight of the statement: more specifiers bind tighter, dynamic and
    /// type-only imports bind looser. Unbounded above; rounded to two decimals.
    pub fn strength(&self) -> f64 {
        let mut strength = 1.0 + self.specifiers.len() as f64 * 0.5;
        if self.is_dynamic {
            strength *= 0.7;
        }
        if self.is_type_only {
            strength *= 0.5;
        }
        if self.is_named_import {
            strength *= 1.2;
        }
        (strength * 100.0).round() / 100.0
    }
}
