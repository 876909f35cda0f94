//! File classification: entry points, roles and cluster memberships.
//!
//! The graph and topology builders never interpret paths themselves; they ask a
//! [`Classifier`]. [`ConventionClassifier`] covers the common Next.js / monorepo layout.

use std::path::{Component, Path};

use regex::Regex;
use serde::Serialize;

use crate::config::{TopologyConfig, WorkspaceConfig};
use crate::graph::node::FileRecord;
use crate::topology::model::ClusterKind;

/// What a file is, from the point of view of the topology.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(tag = "type", rename_all = "kebab-case")]
pub enum FileRole {
    #[default]
    Module,
    /// A routable page or handler; `path` is the URL path it serves.
    Route { path: String },
    /// A UI component belonging to a component family.
    Component { family: String },
}

/// One group a file belongs to. A file may be in a workspace *and* a route group.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ClusterMembership {
    pub id: String,
    pub label: String,
    pub kind: ClusterKind,
    /// Workspace type, route protection level or component type.
    pub tag: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Classification {
    /// Framework-designated entry file: never an orphan.
    pub natural_entry_point: bool,
    pub role: FileRole,
    pub memberships: Vec<ClusterMembership>,
}

impl Classification {
    /// The first membership of the given kind.
    pub fn membership(&self, kind: ClusterKind) -> Option<&ClusterMembership> {
        self.memberships.iter().find(|m| m.kind == kind)
    }
}

/// Labels files for the graph and topology builders.
///
/// Called from worker threads, hence `Sync`.
pub trait Classifier: Sync {
    fn classify(&self, file: &FileRecord) -> Classification;

    fn is_natural_entry_point(&self, file: &FileRecord) -> bool {
        self.classify(file).natural_entry_point
    }
}

/// Classifies nothing: no entry points, no memberships.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoClassification;

impl Classifier for NoClassification {
    fn classify(&self, _file: &FileRecord) -> Classification {
        Classification::default()
    }
}

// ---------------------------------------------------------------------------
// Convention-based classifier
// ---------------------------------------------------------------------------

const ENTRY_PATTERNS: &[&str] = &[
    r"page\.(ts|tsx|js|jsx)$",
    r"layout\.(ts|tsx|js|jsx)$",
    r"loading\.(ts|tsx|js|jsx)$",
    r"error\.(ts|tsx|js|jsx)$",
    r"not-found\.(ts|tsx|js|jsx)$",
    r"route\.(ts|js)$",
    r"middleware\.(ts|js)$",
    r"^index\.(ts|tsx|js|jsx)$",
    r"^app\.(ts|tsx|js|jsx)$",
    r"^main\.(ts|tsx|js|jsx)$",
];

/// File stems that make a file under `app/` a route.
const ROUTE_FILES: &[&str] = &["page", "route"];

/// Directories scanned for workspaces when none are configured.
const WORKSPACE_ROOTS: &[(&str, &str)] = &[
    ("apps", "app"),
    ("libs", "library"),
    ("packages", "library"),
];

/// Path conventions for entry points, workspaces, route groups and component families.
///
/// - entry points: Next.js special files plus `index`/`app`/`main`, and any configured
///   `entry_patterns` (matched against the file name);
/// - workspaces: the configured `[[workspace]]` entries, or else `apps/*`, `libs/*` and
///   `packages/*`;
/// - route groups: the first `(group)` directory under an `app/` directory;
/// - component families: `components/<family>/...`.
#[derive(Debug)]
pub struct ConventionClassifier {
    entry_patterns: Vec<Regex>,
    workspaces: Vec<WorkspaceConfig>,
}

impl Default for ConventionClassifier {
    fn default() -> Self {
        Self {
            entry_patterns: builtin_entry_patterns(),
            workspaces: Vec::new(),
        }
    }
}

fn builtin_entry_patterns() -> Vec<Regex> {
    ENTRY_PATTERNS
        .iter()
        .filter_map(|p| Regex::new(p).ok())
        .collect()
}

impl ConventionClassifier {
    /// Built-in conventions extended with the `[classify]` and `[[workspace]]` config.
    pub fn from_config(config: &TopologyConfig) -> Result<Self, regex::Error> {
        let mut entry_patterns = builtin_entry_patterns();
        for pattern in &config.classify.entry_patterns {
            entry_patterns.push(Regex::new(pattern)?);
        }
        Ok(Self {
            entry_patterns,
            workspaces: config.workspaces.clone(),
        })
    }

    fn is_entry_name(&self, name: &str) -> bool {
        self.entry_patterns.iter().any(|p| p.is_match(name))
    }

    fn workspace(&self, segments: &[&str]) -> Option<ClusterMembership> {
        if !self.workspaces.is_empty() {
            return self.workspaces.iter().find_map(|ws| {
                let prefix: Vec<&str> = ws.path.split('/').filter(|s| !s.is_empty()).collect();
                (!prefix.is_empty() && segments.starts_with(&prefix)).then(|| ClusterMembership {
                    id: format!("workspace-{}", ws.name),
                    label: ws.name.clone(),
                    kind: ClusterKind::Workspace,
                    tag: ws.kind.clone(),
                })
            });
        }

        // Auto-detect: `<root>/<name>/...` with at least one more segment below.
        let (root, name) = (segments.first()?, segments.get(1)?);
        if segments.len() < 3 {
            return None;
        }
        let (_, kind) = WORKSPACE_ROOTS.iter().find(|(r, _)| r == root)?;
        Some(ClusterMembership {
            id: format!("workspace-{name}"),
            label: (*name).to_string(),
            kind: ClusterKind::Workspace,
            tag: Some((*kind).to_string()),
        })
    }
}

impl Classifier for ConventionClassifier {
    fn classify(&self, file: &FileRecord) -> Classification {
        let segments = path_segments(&file.relative_path);
        let dirs = &segments[..segments.len().saturating_sub(1)];
        let stem = file.name.split('.').next().unwrap_or_default();

        let mut memberships = Vec::new();
        if let Some(ws) = self.workspace(&segments) {
            memberships.push(ws);
        }

        let mut role = FileRole::Module;

        if let Some(app_at) = dirs.iter().position(|s| *s == "app") {
            let below_app = &dirs[app_at + 1..];
            if let Some(group) = below_app.iter().find_map(|s| route_group_name(s)) {
                memberships.push(ClusterMembership {
                    id: format!("route-group-{group}"),
                    label: format!("({group})"),
                    kind: ClusterKind::RouteGroup,
                    tag: Some(route_protection(group).to_string()),
                });
            }
            if file.is_analyzable() && ROUTE_FILES.contains(&stem) {
                role = FileRole::Route {
                    path: route_path(below_app),
                };
            }
        }

        if let Some(at) = dirs.iter().position(|s| *s == "components") {
            // Files directly in `components/` form the `shared` family.
            let family = dirs.get(at + 1).copied().unwrap_or("shared");
            memberships.push(ClusterMembership {
                id: format!("component-{family}"),
                label: family.to_string(),
                kind: ClusterKind::ComponentCluster,
                tag: Some(component_type(family).to_string()),
            });
            if role == FileRole::Module && file.is_analyzable() {
                role = FileRole::Component {
                    family: family.to_string(),
                };
            }
        }

        Classification {
            natural_entry_point: self.is_entry_name(&file.name),
            role,
            memberships,
        }
    }
}

fn path_segments(path: &Path) -> Vec<&str> {
    path.components()
        .filter_map(|c| match c {
            Component::Normal(s) => s.to_str(),
            _ => None,
        })
        .collect()
}

/// `(marketing)` -> `marketing`.
fn route_group_name(segment: &str) -> Option<&str> {
    segment
        .strip_prefix('(')
        .and_then(|s| s.strip_suffix(')'))
        .filter(|s| !s.is_empty())
}

/// URL path served by a route file: route groups and private `_folders` do not appear.
fn route_path(dirs: &[&str]) -> String {
    let parts: Vec<&str> = dirs
        .iter()
        .copied()
        .filter(|s| route_group_name(s).is_none() && !s.starts_with('_') && !s.starts_with('@'))
        .collect();
    format!("/{}", parts.join("/"))
}

fn route_protection(group: &str) -> &'static str {
    match group {
        "auth" => "unauthenticated",
        "dashboard" | "protected" | "account" => "authenticated",
        "enterprise" | "admin" => "role-based",
        _ => "public",
    }
}

fn component_type(family: &str) -> &'static str {
    match family {
        "ui" | "primitives" | "shared" => "ui",
        "layout" | "layouts" => "layout",
        "pages" | "page" => "page",
        _ => "feature",
    }
}
