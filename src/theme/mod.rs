//! Design-token theme resolution
//!
//! A theme is a two-level table: category name (`colors`, `fontFamily`, ...)
//! to token name to value. Project configuration layers on top of the
//! built-in base table with one of two explicit operations per category:
//!
//! - [`CategoryOverride::Replace`]: the project table replaces the category
//! - [`CategoryOverride::Extend`]: the project table is merged into the
//!   category, overwriting only the token names it mentions
//!
//! Getting these backwards silently drops unrelated default tokens, so the
//! merge is a single explicit function ([`resolve_theme`]) rather than
//! something inferred while deserializing.

pub mod defaults;

pub use defaults::default_theme;

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Token name to value, sorted for deterministic output.
pub type TokenMap = BTreeMap<String, TokenValue>;

/// A single design-token value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum TokenValue {
    /// Plain CSS value (`"#ef4444"`, `"0.5rem"`)
    Value(String),
    /// Numeric value (`0.5`, `700`)
    Number(serde_json::Number),
    /// Ordered list, e.g. a font stack or a `[size, { lineHeight }]` pair
    List(Vec<TokenValue>),
    /// Nested scale such as `red: { 500: "#ef4444" }`
    Scale(TokenMap),
}

impl TokenValue {
    /// Build a string value.
    pub fn value(value: impl Into<String>) -> Self {
        TokenValue::Value(value.into())
    }

    /// Build a list of string values.
    pub fn list<I, S>(items: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        TokenValue::List(items.into_iter().map(|s| TokenValue::Value(s.into())).collect())
    }

    /// Get the string if this is a plain value.
    pub fn as_str(&self) -> Option<&str> {
        match self {
            TokenValue::Value(s) => Some(s),
            _ => None,
        }
    }

    /// Get the nested scale if this is one.
    pub fn as_scale(&self) -> Option<&TokenMap> {
        match self {
            TokenValue::Scale(map) => Some(map),
            _ => None,
        }
    }

    /// Render the value as it would appear on the right of a CSS declaration.
    ///
    /// A list that pairs a value with a settings scale (`fontSize`) renders
    /// its first element; other lists are joined with `, ` (font stacks).
    /// Scales render their `DEFAULT` entry.
    pub fn to_css(&self) -> Option<String> {
        match self {
            TokenValue::Value(s) => Some(s.clone()),
            TokenValue::Number(n) => Some(n.to_string()),
            TokenValue::List(items) => {
                if items.iter().any(|item| matches!(item, TokenValue::Scale(_))) {
                    return items.first().and_then(TokenValue::to_css);
                }
                let parts: Vec<String> = items.iter().filter_map(TokenValue::to_css).collect();
                if parts.is_empty() {
                    None
                } else {
                    Some(parts.join(", "))
                }
            }
            TokenValue::Scale(map) => map.get("DEFAULT").and_then(TokenValue::to_css),
        }
    }
}

/// A complete theme: category name to token map.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TokenTable {
    categories: BTreeMap<String, TokenMap>,
}

impl TokenTable {
    /// Create an empty table.
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style category insert.
    pub fn with_category(mut self, name: impl Into<String>, tokens: TokenMap) -> Self {
        self.categories.insert(name.into(), tokens);
        self
    }

    /// Insert or replace a whole category.
    pub fn insert_category(&mut self, name: impl Into<String>, tokens: TokenMap) {
        self.categories.insert(name.into(), tokens);
    }

    /// Get a category's tokens.
    pub fn category(&self, name: &str) -> Option<&TokenMap> {
        self.categories.get(name)
    }

    /// Iterate categories in sorted order.
    pub fn categories(&self) -> impl Iterator<Item = (&String, &TokenMap)> {
        self.categories.iter()
    }

    /// Category names in sorted order.
    pub fn category_names(&self) -> Vec<&str> {
        self.categories.keys().map(String::as_str).collect()
    }

    /// Number of categories.
    pub fn len(&self) -> usize {
        self.categories.len()
    }

    /// Whether the table has no categories.
    pub fn is_empty(&self) -> bool {
        self.categories.is_empty()
    }

    /// Look up a token by dotted path within a category.
    ///
    /// Token names may themselves contain dots (`spacing.0.5`), so an exact
    /// key match is tried before descending into nested scales.
    ///
    /// # Example
    /// ```ignore
    /// let red = theme.get("colors", "red.500");
    /// let half = theme.get("spacing", "0.5");
    /// ```
    pub fn get(&self, category: &str, path: &str) -> Option<&TokenValue> {
        lookup(self.categories.get(category)?, path)
    }

    /// Look up a token and render it as a CSS value.
    pub fn css_value(&self, category: &str, path: &str) -> Option<String> {
        self.get(category, path).and_then(TokenValue::to_css)
    }
}

fn lookup<'a>(map: &'a TokenMap, path: &str) -> Option<&'a TokenValue> {
    if let Some(value) = map.get(path) {
        return Some(value);
    }
    for (idx, _) in path.match_indices('.') {
        if let Some(TokenValue::Scale(inner)) = map.get(&path[..idx]) {
            if let Some(value) = lookup(inner, &path[idx + 1..]) {
                return Some(value);
            }
        }
    }
    None
}

/// How a project theme category combines with the base category.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "mode", content = "tokens", rename_all = "kebab-case")]
pub enum CategoryOverride {
    /// Set directly under `theme`: discard the base category
    Replace(TokenMap),
    /// Set under `theme.extend`: merge into the base category
    Extend(TokenMap),
    /// Set in both places: replace first, then extend the replacement
    ReplaceAndExtend {
        /// Direct assignment
        replace: TokenMap,
        /// Extension applied on top of `replace`
        extend: TokenMap,
    },
}

/// Per-category overrides from the project configuration.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(transparent)]
pub struct ThemeOverrides {
    categories: BTreeMap<String, CategoryOverride>,
}

impl ThemeOverrides {
    /// Create an empty override set (the base theme is used unchanged).
    pub fn new() -> Self {
        Self::default()
    }

    /// Build overrides from the two configuration layers.
    pub fn from_layers(
        replace: BTreeMap<String, TokenMap>,
        extend: BTreeMap<String, TokenMap>,
    ) -> Self {
        let mut overrides = Self::new();
        for (category, tokens) in replace {
            overrides = overrides.replace(category, tokens);
        }
        for (category, tokens) in extend {
            overrides = overrides.extend(category, tokens);
        }
        overrides
    }

    /// Replace a category outright.
    pub fn replace(mut self, category: impl Into<String>, tokens: TokenMap) -> Self {
        let category = category.into();
        let next = match self.categories.remove(&category) {
            Some(CategoryOverride::Extend(extend))
            | Some(CategoryOverride::ReplaceAndExtend { extend, .. }) => {
                CategoryOverride::ReplaceAndExtend { replace: tokens, extend }
            }
            Some(CategoryOverride::Replace(_)) | None => CategoryOverride::Replace(tokens),
        };
        self.categories.insert(category, next);
        self
    }

    /// Extend a category.
    pub fn extend(mut self, category: impl Into<String>, tokens: TokenMap) -> Self {
        let category = category.into();
        let next = match self.categories.remove(&category) {
            Some(CategoryOverride::Replace(replace))
            | Some(CategoryOverride::ReplaceAndExtend { replace, .. }) => {
                CategoryOverride::ReplaceAndExtend { replace, extend: tokens }
            }
            Some(CategoryOverride::Extend(_)) | None => CategoryOverride::Extend(tokens),
        };
        self.categories.insert(category, next);
        self
    }

    /// Get the override for a category.
    pub fn get(&self, category: &str) -> Option<&CategoryOverride> {
        self.categories.get(category)
    }

    /// Iterate overrides in category order.
    pub fn iter(&self) -> impl Iterator<Item = (&String, &CategoryOverride)> {
        self.categories.iter()
    }

    /// Whether no category is overridden.
    pub fn is_empty(&self) -> bool {
        self.categories.is_empty()
    }
}

/// Produce the effective token table.
///
/// Categories absent from `overrides` keep their base definition.
pub fn resolve_theme(base: &TokenTable, overrides: &ThemeOverrides) -> TokenTable {
    let mut effective = base.clone();

    for (category, op) in overrides.iter() {
        match op {
            CategoryOverride::Replace(tokens) => {
                tracing::debug!(
                    category = %category,
                    tokens = tokens.len(),
                    "replacing theme category"
                );
                effective.insert_category(category.clone(), tokens.clone());
            }
            CategoryOverride::Extend(tokens) => {
                tracing::debug!(
                    category = %category,
                    tokens = tokens.len(),
                    "extending theme category"
                );
                let target = effective.categories.entry(category.clone()).or_default();
                extend_tokens(target, tokens);
            }
            CategoryOverride::ReplaceAndExtend { replace, extend } => {
                tracing::debug!(category = %category, "replacing then extending theme category");
                let mut tokens = replace.clone();
                extend_tokens(&mut tokens, extend);
                effective.insert_category(category.clone(), tokens);
            }
        }
    }

    effective
}

/// Merge `extension` into `target`. Nested scales merge recursively; any
/// other collision is won by the extension.
fn extend_tokens(target: &mut TokenMap, extension: &TokenMap) {
    for (name, value) in extension {
        if let (Some(TokenValue::Scale(existing)), TokenValue::Scale(incoming)) =
            (target.get_mut(name), value)
        {
            extend_tokens(existing, incoming);
            continue;
        }
        target.insert(name.clone(), value.clone());
    }
}
