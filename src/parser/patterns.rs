use std::sync::OnceLock;

use regex::Regex;

// ---------------------------------------------------------------------------
// Pattern sources
// ---------------------------------------------------------------------------

/// `import { a, b as c } from './x'`
const NAMED_IMPORT: &str = r#"\bimport\s*\{([^}]+)\}\s*from\s*['"`]([^'"`]+)['"`]"#;

/// `import A from './x'` and `import A, { b } from './x'`
const DEFAULT_IMPORT: &str =
    r#"\bimport\s+(\w+)\s*(?:,\s*\{([^}]*)\}\s*)?from\s*['"`]([^'"`]+)['"`]"#;

/// `import * as ns from './x'`
const NAMESPACE_IMPORT: &str = r#"\bimport\s*\*\s*as\s+(\w+)\s*from\s*['"`]([^'"`]+)['"`]"#;

/// `import './x'`
const SIDE_EFFECT_IMPORT: &str = r#"\bimport\s*['"`]([^'"`]+)['"`]"#;

/// `import('./x')`
const DYNAMIC_IMPORT: &str = r#"\bimport\s*\(\s*['"`]([^'"`]+)['"`]\s*\)"#;

/// `import type { T } from './x'`
const TYPE_IMPORT: &str = r#"\bimport\s+type\s*\{([^}]+)\}\s*from\s*['"`]([^'"`]+)['"`]"#;

/// `import type T from './x'`
const TYPE_DEFAULT_IMPORT: &str =
    r#"\bimport\s+type\s+(\w+)\s*from\s*['"`]([^'"`]+)['"`]"#;

/// `require('./x')`
const REQUIRE: &str = r#"\brequire\s*\(\s*['"`]([^'"`]+)['"`]\s*\)"#;

/// `import logo from './logo.png'`: images, stylesheets and fonts.
const ASSET_IMPORT: &str = r#"\bimport\s+\w+\s*from\s*['"`]([^'"`]*\.(?:png|jpg|jpeg|gif|svg|css|scss|less|woff|woff2|ttf|eot))['"`]"#;

/// `export { a } from './x'`
const NAMED_REEXPORT: &str = r#"\bexport\s*\{([^}]+)\}\s*from\s*['"`]([^'"`]+)['"`]"#;

/// `export type { T } from './x'`
const TYPE_REEXPORT: &str = r#"\bexport\s+type\s*\{([^}]+)\}\s*from\s*['"`]([^'"`]+)['"`]"#;

/// `export * from './x'` and `export * as ns from './x'`
const STAR_REEXPORT: &str =
    r#"\bexport\s*\*\s*(?:as\s+(\w+)\s*)?from\s*['"`]([^'"`]+)['"`]"#;

/// Opening JSX tag of a component: `<Button`, `<Dialog.Title`. Lower-case tags are
/// intrinsic elements, and a word character before `<` means a generic (`Array<T>`).
const COMPONENT_TAG: &str = r"(?:^|[^\w.$])<([A-Z]\w*(?:\.\w+)*)\b";

// ---------------------------------------------------------------------------
// Shared table
// ---------------------------------------------------------------------------

static SHARED: OnceLock<ImportPatterns> = OnceLock::new();

/// The compiled statement patterns, one per recognised statement form.
///
/// Built once per process and only ever read afterwards; pass it by reference to
/// [`super::extract_dependencies`].
#[derive(Debug)]
pub struct ImportPatterns {
    pub named_import: Regex,
    pub default_import: Regex,
    pub namespace_import: Regex,
    pub side_effect_import: Regex,
    pub dynamic_import: Regex,
    pub type_import: Regex,
    pub type_default_import: Regex,
    pub require: Regex,
    pub asset_import: Regex,
    pub named_reexport: Regex,
    pub type_reexport: Regex,
    pub star_reexport: Regex,
    pub component_tag: Regex,
}

impl ImportPatterns {
    /// Compile every pattern.
    pub fn compile() -> Result<Self, regex::Error> {
        Ok(Self {
            named_import: Regex::new(NAMED_IMPORT)?,
            default_import: Regex::new(DEFAULT_IMPORT)?,
            namespace_import: Regex::new(NAMESPACE_IMPORT)?,
            side_effect_import: Regex::new(SIDE_EFFECT_IMPORT)?,
            dynamic_import: Regex::new(DYNAMIC_IMPORT)?,
            type_import: Regex::new(TYPE_IMPORT)?,
            type_default_import: Regex::new(TYPE_DEFAULT_IMPORT)?,
            require: Regex::new(REQUIRE)?,
            asset_import: Regex::new(ASSET_IMPORT)?,
            named_reexport: Regex::new(NAMED_REEXPORT)?,
            type_reexport: Regex::new(TYPE_REEXPORT)?,
            star_reexport: Regex::new(STAR_REEXPORT)?,
            component_tag: Regex::new(COMPONENT_TAG)?,
        })
    }

    /// The process-wide table, compiled on first use.
    pub fn shared() -> &'static ImportPatterns {
        SHARED.get_or_init(|| Self::compile().expect("built-in import patterns are valid"))
    }
}
