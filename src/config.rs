use std::path::Path;

use serde::Deserialize;
use tracing::warn;

use crate::resolver::DEFAULT_EXTENSIONS;
use crate::topology::model::{ClusteringStrategy, DEFAULT_SPACING, LayoutAlgorithm};
use crate::topology::patterns::PatternConfig;

/// File name looked up at the project root.
pub const CONFIG_FILE: &str = "code-topology.toml";

/// Configuration loaded from `code-topology.toml` at the project root.
///
/// Every section is optional; missing keys take their defaults.
#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
pub struct TopologyConfig {
    /// Additional path patterns to exclude from scanning (beyond .gitignore and node_modules).
    pub exclude: Option<Vec<String>>,
    pub resolver: ResolverConfig,
    pub layout: LayoutConfig,
    pub clustering: ClusteringConfig,
    pub patterns: PatternConfig,
    /// `[[workspace]]` tables.
    #[serde(rename = "workspace")]
    pub workspaces: Vec<WorkspaceConfig>,
    pub classify: ClassifyConfig,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ResolverConfig {
    /// Extensions probed, in order, for extension-less imports. Leading dot included.
    pub extensions: Vec<String>,
}

impl Default for ResolverConfig {
    fn default() -> Self {
        Self {
            extensions: DEFAULT_EXTENSIONS.iter().map(|e| e.to_string()).collect(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct LayoutConfig {
    pub algorithm: LayoutAlgorithm,
    pub spacing: f64,
}

impl Default for LayoutConfig {
    fn default() -> Self {
        Self {
            algorithm: LayoutAlgorithm::default(),
            spacing: DEFAULT_SPACING,
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct ClusteringConfig {
    pub strategy: ClusteringStrategy,
}

/// A declared workspace: every file under `path` belongs to it.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct WorkspaceConfig {
    pub name: String,
    /// Directory relative to the project root.
    pub path: String,
    /// Free-form type (`app`, `library`, `shared-ui`, ...), used for cluster colours.
    pub kind: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct ClassifyConfig {
    /// Extra file-name regexes that mark natural entry points.
    pub entry_patterns: Vec<String>,
}

impl TopologyConfig {
    /// Load configuration from `code-topology.toml` in the given root directory.
    ///
    /// Returns the default configuration if the file does not exist or cannot be parsed.
    pub fn load(root: &Path) -> Self {
        let config_path = root.join(CONFIG_FILE);

        if !config_path.exists() {
            return Self::default();
        }

        match std::fs::read_to_string(&config_path) {
            Ok(contents) => Self::parse(&contents).unwrap_or_else(|err| {
                warn!("failed to parse {CONFIG_FILE}: {err}. Using defaults.");
                Self::default()
            }),
            Err(err) => {
                warn!("failed to read {CONFIG_FILE}: {err}. Using defaults.");
                Self::default()
            }
        }
    }

    pub fn parse(contents: &str) -> Result<Self, toml::de::Error> {
        let mut config: Self = toml::from_str(contents)?;
        if !config.layout.spacing.is_finite() || config.layout.spacing <= 0.0 {
            warn!(
                spacing = config.layout.spacing,
                "layout.spacing must be a positive number, using {DEFAULT_SPACING}"
            );
            config.layout.spacing = DEFAULT_SPACING;
        }
        Ok(config)
    }

    /// Exclusion globs, empty when none are configured.
    pub fn exclude_patterns(&self) -> &[String] {
        self.exclude.as_deref().unwrap_or(&[])
    }
}
