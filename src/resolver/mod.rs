use std::collections::HashMap;
use std::ffi::OsString;
use std::path::{Component, Path, PathBuf};

use serde::Serialize;

use crate::graph::FileId;

/// Extensions probed, in order, when an import path has none.
pub const DEFAULT_EXTENSIONS: &[&str] = &[".ts", ".tsx", ".js", ".jsx", ".d.ts"];

/// The outcome of resolving a single import path.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Resolution {
    /// Resolved to a file already present in the scan.
    Resolved(FileId),
    /// A bare package-style specifier (e.g. `"react"`); never tracked.
    External,
    /// A relative path that matches no indexed file (e.g. points outside the scanned tree).
    Unresolved,
}

/// Counters collected while resolving every extracted import of a build.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct ResolveStats {
    /// Imports that became graph edges.
    pub resolved: usize,
    /// Bare specifiers that were skipped.
    pub external: usize,
    /// Relative imports that matched no indexed file.
    pub unresolved: usize,
}

impl ResolveStats {
    pub fn record(&mut self, resolution: Resolution) {
        match resolution {
            Resolution::Resolved(_) => self.resolved += 1,
            Resolution::External => self.external += 1,
            Resolution::Unresolved => self.unresolved += 1,
        }
    }
}

/// Maps relative import paths onto the file identities of one scan.
///
/// Pure lookup: no filesystem access, the index must already contain every file
/// of the scan before the first call.
pub struct PathResolver<'a> {
    index: &'a HashMap<PathBuf, FileId>,
    extensions: &'a [String],
}

impl<'a> PathResolver<'a> {
    pub fn new(index: &'a HashMap<PathBuf, FileId>, extensions: &'a [String]) -> Self {
        Self { index, extensions }
    }

    /// Resolve `import_path` as written in `from_file`.
    ///
    /// Tries, in order: the exact path, the path with each known extension appended,
    /// then `<path>/index` with each known extension. The first hit wins. A path ending
    /// in `/` only tries the index files.
    pub fn resolve(&self, import_path: &str, from_file: &Path) -> Resolution {
        if !is_relative_specifier(import_path) {
            return Resolution::External;
        }

        let base_dir = from_file.parent().unwrap_or(Path::new(""));
        let target = normalize_path(&base_dir.join(import_path));

        // `./foo/` names a directory: only its index file can match.
        let names_directory = import_path.ends_with('/') || import_path.ends_with('\\');
        if !names_directory {
            if let Some(&id) = self.index.get(&target) {
                return Resolution::Resolved(id);
            }

            for ext in self.extensions {
                if let Some(&id) = self.index.get(&with_suffix(&target, ext)) {
                    return Resolution::Resolved(id);
                }
            }
        }

        let index_base = target.join("index");
        for ext in self.extensions {
            if let Some(&id) = self.index.get(&with_suffix(&index_base, ext)) {
                return Resolution::Resolved(id);
            }
        }

        Resolution::Unresolved
    }
}

/// Relative specifiers start with `.` (`./x`, `../x`, `.`).
pub fn is_relative_specifier(import_path: &str) -> bool {
    import_path.starts_with('.')
}

/// Lexically normalise a path: drop `.` components and fold `..` into the parent.
///
/// `..` at the root (or at the start of a relative path) is kept as-is.
pub fn normalize_path(path: &Path) -> PathBuf {
    let mut out: Vec<Component> = Vec::new();
    for component in path.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => match out.last() {
                Some(Component::Normal(_)) => {
                    out.pop();
                }
                Some(Component::RootDir) | Some(Component::Prefix(_)) => {}
                _ => out.push(component),
            },
            other => out.push(other),
        }
    }
    out.iter().map(|c| c.as_os_str()).collect()
}

/// Append a raw suffix (e.g. `.d.ts`) to the final path component.
fn with_suffix(path: &Path, suffix: &str) -> PathBuf {
    let mut s: OsString = path.as_os_str().to_owned();
    s.push(suffix);
    PathBuf::from(s)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn index(paths: &[&str]) -> HashMap<PathBuf, FileId> {
        paths
            .iter()
            .enumerate()
            .map(|(i, p)| (PathBuf::from(p), FileId(i as u32)))
            .collect()
    }

    fn default_exts() -> Vec<String> {
        DEFAULT_EXTENSIONS.iter().map(|e| e.to_string()).collect()
    }

    #[test]
    fn test_bare_specifier_is_external() {
        let idx = index(&["/proj/react.ts"]);
        let exts = default_exts();
        let resolver = PathResolver::new(&idx, &exts);
        assert_eq!(
            resolver.resolve("react", Path::new("/proj/app.ts")),
            Resolution::External
        );
        assert_eq!(
            resolver.resolve("@scope/pkg", Path::new("/proj/app.ts")),
            Resolution::External
        );
    }

    #[test]
    fn test_exact_match_wins() {
        let idx = index(&["/proj/logo.svg"]);
        let exts = default_exts();
        let resolver = PathResolver::new(&idx, &exts);
        assert_eq!(
            resolver.resolve("./logo.svg", Path::new("/proj/app.tsx")),
            Resolution::Resolved(FileId(0))
        );
    }

    #[test]
    fn test_extension_is_appended() {
        let idx = index(&["/proj/foo.ts", "/proj/foo/index.ts"]);
        let exts = default_exts();
        let resolver = PathResolver::new(&idx, &exts);
        assert_eq!(
            resolver.resolve("./foo", Path::new("/proj/app.ts")),
            Resolution::Resolved(FileId(0)),
            "foo.ts takes precedence over foo/index.ts"
        );
    }

    #[test]
    fn test_index_file_fallback() {
        let idx = index(&["/proj/foo/index.ts"]);
        let exts = default_exts();
        let resolver = PathResolver::new(&idx, &exts);
        assert_eq!(
            resolver.resolve("./foo", Path::new("/proj/app.ts")),
            Resolution::Resolved(FileId(0))
        );
    }

    #[test]
    fn test_trailing_slash_goes_to_index_file() {
        let idx = index(&["/proj/foo.ts", "/proj/foo/index.ts"]);
        let exts = default_exts();
        let resolver = PathResolver::new(&idx, &exts);
        assert_eq!(
            resolver.resolve("./foo/", Path::new("/proj/app.ts")),
            Resolution::Resolved(FileId(1))
        );

        let only_file = index(&["/proj/foo.ts"]);
        let resolver = PathResolver::new(&only_file, &exts);
        assert_eq!(
            resolver.resolve("./foo/", Path::new("/proj/app.ts")),
            Resolution::Unresolved
        );
    }

    #[test]
    fn test_missing_target_is_unresolved() {
        let idx = index(&["/proj/bar.ts"]);
        let exts = default_exts();
        let resolver = PathResolver::new(&idx, &exts);
        assert_eq!(
            resolver.resolve("./foo", Path::new("/proj/app.ts")),
            Resolution::Unresolved
        );
    }

    #[test]
    fn test_parent_directory_and_extension_order() {
        let idx = index(&["/proj/lib/util.tsx", "/proj/lib/util.d.ts"]);
        let exts = default_exts();
        let resolver = PathResolver::new(&idx, &exts);
        assert_eq!(
            resolver.resolve("../lib/util", Path::new("/proj/src/app.ts")),
            Resolution::Resolved(FileId(0)),
            ".tsx is probed before .d.ts"
        );
    }

    #[test]
    fn test_normalize_path_folds_dots() {
        assert_eq!(
            normalize_path(Path::new("/proj/src/./a/../b.ts")),
            PathBuf::from("/proj/src/b.ts")
        );
        assert_eq!(normalize_path(Path::new("/../x")), PathBuf::from("/x"));
        assert_eq!(normalize_path(Path::new("../x")), PathBuf::from("../x"));
    }

    #[test]
    fn test_stats_record_each_outcome() {
        let mut stats = ResolveStats::default();
        stats.record(Resolution::Resolved(FileId(1)));
        stats.record(Resolution::External);
        stats.record(Resolution::External);
        stats.record(Resolution::Unresolved);
        assert_eq!(
            stats,
            ResolveStats {
                resolved: 1,
                external: 2,
                unresolved: 1
            }
        );
    }
}
