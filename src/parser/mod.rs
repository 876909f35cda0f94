pub mod patterns;

use regex::{Captures, Regex};

use serde::Serialize;

use crate::graph::FileId;
use crate::graph::edge::DependencyKind;

pub use patterns::ImportPatterns;

/// One dependency statement found in a file, before path resolution.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawDependency {
    /// The literal import path (e.g. `"./utils"` or `"react"`).
    pub import_path: String,
    pub kind: DependencyKind,
    /// Named, default or namespace bindings; empty for side-effect-only statements.
    pub specifiers: Vec<String>,
    pub is_named_import: bool,
    pub is_dynamic: bool,
    pub is_type_only: bool,
    /// 1-based line of the statement start.
    pub line: usize,
    /// 1-based column of the statement start.
    pub column: usize,
}

/// Line starts of one file, for offset -> (line, column) lookups.
struct LineIndex<'c> {
    content: &'c str,
    breaks: Vec<usize>,
}

impl<'c> LineIndex<'c> {
    fn new(content: &'c str) -> Self {
        let breaks = content
            .bytes()
            .enumerate()
            .filter_map(|(i, b)| (b == b'\n').then_some(i))
            .collect();
        Self { content, breaks }
    }

    /// Line = line breaks before `offset` + 1; column counts characters, not bytes,
    /// from the previous break. `offset` must sit on a char boundary.
    fn position(&self, offset: usize) -> (usize, usize) {
        let before = self.breaks.partition_point(|&b| b < offset);
        let line_start = if before == 0 { 0 } else { self.breaks[before - 1] + 1 };
        let column = self.content[line_start..offset].chars().count() + 1;
        (before + 1, column)
    }
}

/// Flags shared by every record produced from one statement form.
#[derive(Clone, Copy)]
struct Form {
    kind: DependencyKind,
    is_named_import: bool,
    is_dynamic: bool,
    is_type_only: bool,
}

impl Form {
    const fn new(kind: DependencyKind) -> Self {
        Self {
            kind,
            is_named_import: false,
            is_dynamic: false,
            is_type_only: false,
        }
    }

    const fn named(mut self) -> Self {
        self.is_named_import = true;
        self
    }
}

/// Extract every dependency statement from `content`.
///
/// Each statement form is matched independently, so one file may yield records from
/// several categories (an asset import is also a default import). Records come out
/// grouped by form, in match order within each form. Text that does not match a form
/// yields nothing for that form; there is no error path.
pub fn extract_dependencies(content: &str, patterns: &ImportPatterns) -> Vec<RawDependency> {
    let lines = LineIndex::new(content);
    let mut out = Vec::new();

    // Named imports: `import { a, b as c } from './x'`
    collect(
        &patterns.named_import,
        content,
        &lines,
        Form::new(DependencyKind::StaticImport).named(),
        |caps| Some((caps.get(2)?.as_str(), split_specifiers(caps.get(1)?.as_str()))),
        &mut out,
    );

    // Default imports, optionally combined with named bindings.
    collect(
        &patterns.default_import,
        content,
        &lines,
        Form::new(DependencyKind::StaticImport),
        |caps| {
            let mut specifiers = vec![caps.get(1)?.as_str().to_owned()];
            if let Some(named) = caps.get(2) {
                specifiers.extend(split_specifiers(named.as_str()));
            }
            Some((caps.get(3)?.as_str(), specifiers))
        },
        &mut out,
    );

    // Namespace imports: `import * as ns from './x'`
    collect(
        &patterns.namespace_import,
        content,
        &lines,
        Form::new(DependencyKind::StaticImport),
        |caps| Some((caps.get(2)?.as_str(), vec![caps.get(1)?.as_str().to_owned()])),
        &mut out,
    );

    // Side-effect imports: `import './x'`
    collect(
        &patterns.side_effect_import,
        content,
        &lines,
        Form::new(DependencyKind::StaticImport),
        |caps| Some((caps.get(1)?.as_str(), Vec::new())),
        &mut out,
    );

    // Dynamic imports: `import('./x')`
    let mut dynamic = Form::new(DependencyKind::DynamicImport);
    dynamic.is_dynamic = true;
    collect(
        &patterns.dynamic_import,
        content,
        &lines,
        dynamic,
        |caps| Some((caps.get(1)?.as_str(), Vec::new())),
        &mut out,
    );

    // Type-only imports: `import type { T } from './x'`, `import type T from './x'`
    let mut type_only = Form::new(DependencyKind::TypeImport).named();
    type_only.is_type_only = true;
    collect(
        &patterns.type_import,
        content,
        &lines,
        type_only,
        |caps| Some((caps.get(2)?.as_str(), split_specifiers(caps.get(1)?.as_str()))),
        &mut out,
    );

    collect(
        &patterns.type_default_import,
        content,
        &lines,
        type_only,
        |caps| Some((caps.get(2)?.as_str(), vec![caps.get(1)?.as_str().to_owned()])),
        &mut out,
    );

    // CommonJS: `require('./x')`
    collect(
        &patterns.require,
        content,
        &lines,
        Form::new(DependencyKind::Require),
        |caps| Some((caps.get(1)?.as_str(), Vec::new())),
        &mut out,
    );

    // Asset references: images, stylesheets, fonts.
    collect(
        &patterns.asset_import,
        content,
        &lines,
        Form::new(DependencyKind::AssetReference),
        |caps| Some((caps.get(1)?.as_str(), Vec::new())),
        &mut out,
    );

    // Re-exports: `export { a } from './x'`, `export type { T } from './x'`,
    // `export * from './x'`
    collect(
        &patterns.named_reexport,
        content,
        &lines,
        Form::new(DependencyKind::ReExport).named(),
        |caps| Some((caps.get(2)?.as_str(), split_specifiers(caps.get(1)?.as_str()))),
        &mut out,
    );
    let mut type_reexport = Form::new(DependencyKind::ReExport).named();
    type_reexport.is_type_only = true;
    collect(
        &patterns.type_reexport,
        content,
        &lines,
        type_reexport,
        |caps| Some((caps.get(2)?.as_str(), split_specifiers(caps.get(1)?.as_str()))),
        &mut out,
    );
    collect(
        &patterns.star_reexport,
        content,
        &lines,
        Form::new(DependencyKind::ReExport),
        |caps| {
            let specifiers = caps
                .get(1)
                .map(|ns| vec![ns.as_str().to_owned()])
                .unwrap_or_default();
            Some((caps.get(2)?.as_str(), specifiers))
        },
        &mut out,
    );

    out
}

/// One JSX element whose tag names a component (`<Button />`, `<Dialog.Title>`).
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ComponentUsage {
    /// Tag name as written, including any member access (`Dialog.Title`).
    pub component: String,
    pub file: FileId,
    /// 1-based line of the `<`.
    pub line: usize,
    /// 1-based column of the `<`, in characters.
    pub column: usize,
    /// The file opts into client rendering with a `"use client"` directive.
    pub is_client_component: bool,
}

/// Find every component element opened in `content`.
///
/// Tags starting with a lower-case letter are HTML elements and are skipped, as are
/// generic arguments such as `Array<User>`. Closing tags are never counted. Usages come
/// out in source order.
pub fn extract_component_usages(
    content: &str,
    file: FileId,
    patterns: &ImportPatterns,
) -> Vec<ComponentUsage> {
    let lines = LineIndex::new(content);
    let is_client_component = has_use_client_directive(content);
    patterns
        .component_tag
        .captures_iter(content)
        .filter_map(|caps| {
            let name = caps.get(1)?;
            // The tag name sits right after its `<`.
            let (line, column) = lines.position(name.start() - 1);
            Some(ComponentUsage {
                component: name.as_str().to_owned(),
                file,
                line,
                column,
                is_client_component,
            })
        })
        .collect()
}

/// Whether the file starts with a `"use client"` directive, after blank lines and
/// comments.
fn has_use_client_directive(content: &str) -> bool {
    content
        .lines()
        .map(str::trim)
        .find(|line| !line.is_empty() && !line.starts_with("//"))
        .is_some_and(|first| {
            let first = first.trim_end_matches(';');
            first == "\"use client\"" || first == "'use client'"
        })
}

/// Run one statement pattern over `content`, appending a record per match.
fn collect<'c, F>(
    regex: &Regex,
    content: &'c str,
    lines: &LineIndex<'_>,
    form: Form,
    mut pick: F,
    out: &mut Vec<RawDependency>,
) where
    F: FnMut(&Captures<'c>) -> Option<(&'c str, Vec<String>)>,
{
    for caps in regex.captures_iter(content) {
        let Some(whole) = caps.get(0) else { continue };
        let Some((path, specifiers)) = pick(&caps) else {
            continue;
        };
        let path = path.trim();
        if path.is_empty() {
            continue;
        }
        let (line, column) = lines.position(whole.start());
        out.push(RawDependency {
            import_path: path.to_owned(),
            kind: form.kind,
            specifiers,
            is_named_import: form.is_named_import,
            is_dynamic: form.is_dynamic,
            is_type_only: form.is_type_only,
            line,
            column,
        });
    }
}

/// Split a `{ ... }` binding list into imported names.
///
/// Aliases are reduced to the imported name (`a as b` -> `a`), inline `type`
/// modifiers are dropped and trailing commas ignored.
fn split_specifiers(list: &str) -> Vec<String> {
    list.split(',')
        .filter_map(|raw| {
            let raw = raw.trim();
            let raw = raw.strip_prefix("type ").map(str::trim).unwrap_or(raw);
            let name = raw.split(" as ").next().unwrap_or(raw).trim();
            (!name.is_empty()).then(|| name.to_owned())
        })
        .collect()
}
