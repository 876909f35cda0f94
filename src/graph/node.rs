use std::path::{Path, PathBuf};
use std::time::SystemTime;

use serde::{Deserialize, Serialize};

/// Coarse classification of a scanned file, derived from its extension.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum FileKind {
    /// TypeScript / JavaScript source that the extractor scans for imports.
    Source,
    /// Documents and markup (`.md`, `.mdx`, `.html`, ...).
    Markup,
    /// Stylesheets (`.css`, `.scss`, `.less`, ...).
    Style,
    /// Images, fonts and other binary assets.
    Asset,
    /// Anything else (config, data, lockfiles).
    Other,
}

impl FileKind {
    /// Classify a file by its extension (without the leading dot, case-insensitive).
    pub fn from_extension(ext: &str) -> Self {
        match ext.to_ascii_lowercase().as_str() {
            "ts" | "tsx" | "js" | "jsx" | "mjs" | "cjs" | "mts" | "cts" => FileKind::Source,
            "md" | "mdx" | "html" | "htm" | "xml" => FileKind::Markup,
            "css" | "scss" | "sass" | "less" | "styl" => FileKind::Style,
            "png" | "jpg" | "jpeg" | "gif" | "svg" | "webp" | "ico" | "bmp" | "avif" | "woff"
            | "woff2" | "ttf" | "eot" | "otf" | "mp3" | "mp4" | "webm" | "wav" => FileKind::Asset,
            _ => FileKind::Other,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            FileKind::Source => "source",
            FileKind::Markup => "markup",
            FileKind::Style => "style",
            FileKind::Asset => "asset",
            FileKind::Other => "other",
        }
    }
}

/// Extensions whose content the import extractor understands.
const ANALYZABLE_EXTENSIONS: &[&str] = &["ts", "tsx", "js", "jsx", "mjs", "cjs"];

/// One entry of the file inventory handed to the graph builder.
///
/// Records are created once per scan and never mutated afterwards; the
/// dependency graph takes ownership of the records it indexes.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FileRecord {
    /// Absolute path; the identity used by the path resolver.
    pub path: PathBuf,
    /// Path relative to the project root.
    pub relative_path: PathBuf,
    /// File name including extension (e.g. `page.tsx`).
    pub name: String,
    /// Extension without the leading dot, empty when the file has none.
    pub extension: String,
    /// Size in bytes.
    pub size: u64,
    /// Last modification time, when the inventory knows it.
    pub modified: Option<SystemTime>,
    pub kind: FileKind,
    pub is_directory: bool,
    /// Raw text content. `None` for binary files or unreadable content; such files
    /// still become graph nodes, just without outgoing edges.
    #[serde(skip)]
    pub content: Option<String>,
}

impl FileRecord {
    /// Build a record for `path`, deriving the relative path, name, extension and kind.
    ///
    /// `path` is used as-is for identity; callers pass absolute paths.
    pub fn new(root: &Path, path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let relative_path = path.strip_prefix(root).unwrap_or(&path).to_path_buf();
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();
        let extension = path
            .extension()
            .map(|e| e.to_string_lossy().into_owned())
            .unwrap_or_default();
        let kind = FileKind::from_extension(&extension);

        Self {
            path,
            relative_path,
            name,
            extension,
            size: 0,
            modified: None,
            kind,
            is_directory: false,
            content: None,
        }
    }

    /// Attach text content. The size is taken from the content length unless set later.
    pub fn with_content(mut self, content: impl Into<String>) -> Self {
        let content = content.into();
        self.size = content.len() as u64;
        self.content = Some(content);
        self
    }

    pub fn with_size(mut self, size: u64) -> Self {
        self.size = size;
        self
    }

    pub fn with_modified(mut self, modified: Option<SystemTime>) -> Self {
        self.modified = modified;
        self
    }

    /// Mark this record as a directory entry. Directories never become graph nodes.
    pub fn as_directory(mut self) -> Self {
        self.is_directory = true;
        self
    }

    /// Whether the import extractor should scan this file.
    pub fn is_analyzable(&self) -> bool {
        !self.is_directory
            && ANALYZABLE_EXTENSIONS
                .iter()
                .any(|ext| self.extension.eq_ignore_ascii_case(ext))
    }

    /// Whether the file may hold JSX (`.js`, `.jsx`, `.tsx`).
    pub fn may_contain_jsx(&self) -> bool {
        !self.is_directory
            && ["js", "jsx", "tsx"]
                .iter()
                .any(|ext| self.extension.eq_ignore_ascii_case(ext))
    }

    /// Relative path rendered with forward slashes, for labels and ids.
    pub fn display_path(&self) -> String {
        self.relative_path.to_string_lossy().replace('\\', "/")
    }
}
