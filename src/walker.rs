use std::path::Path;

use anyhow::Context;
use tracing::{debug, warn};

use crate::config::TopologyConfig;
use crate::graph::node::{FileKind, FileRecord};

/// Walk a project directory and build the file inventory.
///
/// Respects `.gitignore` rules, always excludes `node_modules` and applies any
/// additional exclusions from `config.exclude`. Every remaining file becomes a
/// [`FileRecord`], in file-name order. Text content is loaded for source, markup and
/// style files; a file that cannot be read as UTF-8 keeps `content: None` and is
/// logged, which leaves it a node without outgoing edges.
///
/// When `verbose` is true, each discovered file path is printed to stderr.
pub fn scan_project(
    root: &Path,
    config: &TopologyConfig,
    verbose: bool,
) -> anyhow::Result<Vec<FileRecord>> {
    let root = root
        .canonicalize()
        .with_context(|| format!("cannot access project root {}", root.display()))?;
    anyhow::ensure!(root.is_dir(), "{} is not a directory", root.display());

    let walker = ignore::WalkBuilder::new(&root)
        .standard_filters(true)
        // Read .gitignore files even when the directory is not inside a git repository.
        .require_git(false)
        .sort_by_file_name(|a, b| a.cmp(b))
        .build();

    let mut files = Vec::new();
    for result in walker {
        let entry = match result {
            Ok(e) => e,
            Err(err) => {
                warn!("{err}");
                continue;
            }
        };

        let path = entry.path();

        if entry.file_type().map(|ft| ft.is_dir()).unwrap_or(false) {
            continue;
        }

        // Hard exclusion, independent of .gitignore.
        if path_contains_node_modules(path) {
            continue;
        }

        if is_excluded_by_config(path, config) {
            continue;
        }

        if verbose {
            eprintln!("{}", path.display());
        }

        files.push(load_record(&root, path));
    }

    debug!(root = %root.display(), files = files.len(), "project scanned");
    Ok(files)
}

/// Build one record, reading metadata and (for text kinds) content.
fn load_record(root: &Path, path: &Path) -> FileRecord {
    let mut record = FileRecord::new(root, path);

    if matches!(
        record.kind,
        FileKind::Source | FileKind::Markup | FileKind::Style
    ) {
        match std::fs::read_to_string(path) {
            Ok(content) => record = record.with_content(content),
            Err(err) => warn!(path = %path.display(), "unreadable file, no edges extracted: {err}"),
        }
    }

    if let Ok(meta) = std::fs::metadata(path) {
        record = record.with_size(meta.len()).with_modified(meta.modified().ok());
    }

    record
}

/// Returns true if any component of `path` is named `node_modules`.
fn path_contains_node_modules(path: &Path) -> bool {
    path.components().any(|c| {
        c.as_os_str()
            .to_str()
            .map(|s| s == "node_modules")
            .unwrap_or(false)
    })
}

/// Returns true if `path` matches any exclusion pattern from config.
fn is_excluded_by_config(path: &Path, config: &TopologyConfig) -> bool {
    let path_str = path.to_string_lossy();

    for pattern in config.exclude_patterns() {
        let Ok(matcher) = glob::Pattern::new(pattern) else {
            continue;
        };
        if matcher.matches(&path_str) {
            return true;
        }
        // Also check if any component matches the pattern directly.
        for component in path.components() {
            if let Some(s) = component.as_os_str().to_str()
                && matcher.matches(s)
            {
                return true;
            }
        }
    }

    false
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    fn tmp() -> TempDir {
        tempfile::tempdir().expect("tempdir")
    }

    fn names(files: &[FileRecord]) -> Vec<String> {
        files.iter().map(|f| f.display_path()).collect()
    }

    #[test]
    fn test_scan_collects_every_file_with_content() {
        let dir = tmp();
        fs::create_dir_all(dir.path().join("src")).unwrap();
        fs::write(dir.path().join("src/app.ts"), "import './util';").unwrap();
        fs::write(dir.path().join("src/util.ts"), "export {}").unwrap();
        fs::write(dir.path().join("README.md"), "# Hello").unwrap();
        fs::write(dir.path().join("logo.png"), [0x89u8, 0x50, 0x4e, 0x47]).unwrap();

        let files = scan_project(dir.path(), &TopologyConfig::default(), false).unwrap();
        let found = names(&files);
        assert_eq!(found, vec!["README.md", "logo.png", "src/app.ts", "src/util.ts"]);

        let app = files.iter().find(|f| f.name == "app.ts").unwrap();
        assert_eq!(app.content.as_deref(), Some("import './util';"));
        assert_eq!(app.size, 16);
        assert!(app.modified.is_some());

        let logo = files.iter().find(|f| f.name == "logo.png").unwrap();
        assert!(logo.content.is_none(), "assets are not read");
        assert_eq!(logo.size, 4);
    }

    #[test]
    fn test_scan_respects_exclude_patterns() {
        let dir = tmp();
        fs::create_dir_all(dir.path().join("dist")).unwrap();
        fs::write(dir.path().join("dist/bundle.js"), "").unwrap();
        fs::write(dir.path().join("index.ts"), "").unwrap();
        fs::write(dir.path().join("index.test.ts"), "").unwrap();

        let config = TopologyConfig {
            exclude: Some(vec!["dist".to_string(), "*.test.ts".to_string()]),
            ..Default::default()
        };
        let files = scan_project(dir.path(), &config, false).unwrap();
        assert_eq!(names(&files), vec!["index.ts"]);
    }

    #[test]
    fn test_scan_excludes_node_modules_and_gitignored() {
        let dir = tmp();
        let nm = dir.path().join("node_modules").join("pkg");
        fs::create_dir_all(&nm).unwrap();
        fs::write(nm.join("index.js"), "").unwrap();
        fs::create_dir_all(dir.path().join("build")).unwrap();
        fs::write(dir.path().join("build/out.js"), "").unwrap();
        fs::write(dir.path().join(".gitignore"), "build/\n").unwrap();
        fs::write(dir.path().join("main.ts"), "").unwrap();

        let files = scan_project(dir.path(), &TopologyConfig::default(), false).unwrap();
        let found = names(&files);
        assert!(!found.iter().any(|n| n.contains("node_modules")));
        assert!(!found.iter().any(|n| n.starts_with("build")));
        assert!(found.contains(&"main.ts".to_string()));
    }

    #[test]
    fn test_invalid_utf8_source_has_no_content() {
        let dir = tmp();
        fs::write(dir.path().join("broken.ts"), [0xffu8, 0xfe, 0x00]).unwrap();
        let files = scan_project(dir.path(), &TopologyConfig::default(), false).unwrap();
        assert_eq!(files.len(), 1);
        assert!(files[0].content.is_none());
        assert_eq!(files[0].size, 3);
    }

    #[test]
    fn test_missing_root_is_an_error() {
        let dir = tmp();
        let missing = dir.path().join("nope");
        assert!(scan_project(&missing, &TopologyConfig::default(), false).is_err());
    }
}
