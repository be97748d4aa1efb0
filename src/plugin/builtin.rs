//! Built-in plugins
//!
//! Stand-ins for the first-party plugin packages. Each reads the effective
//! theme for its values, so theme extensions flow through to the styles it
//! registers.

use super::{BaseStyle, Declarations, Plugin, PluginOptions, PluginResult, Utility, Variant};
use crate::config::PluginSpec;
use crate::theme::{TokenTable, TokenValue};
use serde_json::Value;

/// Package name of the forms plugin.
pub const FORMS: &str = "@tailwindcss/forms";
/// Package name of the typography plugin.
pub const TYPOGRAPHY: &str = "@tailwindcss/typography";
/// Package name of the aspect-ratio plugin.
pub const ASPECT_RATIO: &str = "@tailwindcss/aspect-ratio";

const TEXT_INPUTS: &str = "[type='text'],input:where(:not([type])),[type='email'],[type='url'],\
[type='password'],[type='number'],[type='date'],[type='datetime-local'],[type='month'],\
[type='search'],[type='tel'],[type='time'],[type='week'],[multiple],textarea,select";

const SELECT_CHEVRON: &str = "url(\"data:image/svg+xml,%3csvg xmlns='http://www.w3.org/2000/svg' \
fill='none' viewBox='0 0 20 20'%3e%3cpath stroke='%236b7280' stroke-linecap='round' \
stroke-linejoin='round' stroke-width='1.5' d='M6 8l4 4 4-4'/%3e%3c/svg%3e\")";

fn theme_value(theme: &TokenTable, category: &str, path: &str, fallback: &str) -> String {
    theme.css_value(category, path).unwrap_or_else(|| fallback.to_string())
}

/// Line height paired with a `fontSize` entry (`[size, { lineHeight }]`).
fn font_line_height(theme: &TokenTable, size: &str, fallback: &str) -> String {
    let paired = match theme.get("fontSize", size) {
        Some(TokenValue::List(items)) => items.iter().find_map(|item| {
            item.as_scale().and_then(|s| s.get("lineHeight")).and_then(TokenValue::to_css)
        }),
        _ => None,
    };
    paired.unwrap_or_else(|| fallback.to_string())
}

fn string_option<'a>(options: &'a PluginOptions, key: &str) -> Result<Option<&'a str>, String> {
    match options.get(key) {
        None | Some(Value::Null) => Ok(None),
        Some(Value::String(s)) => Ok(Some(s)),
        Some(other) => Err(format!("option '{}' must be a string, found {}", key, other)),
    }
}

fn check_known_options(options: &PluginOptions, known: &[&str]) -> Result<(), String> {
    match options.keys().find(|k| !known.contains(&k.as_str())) {
        Some(key) => Err(format!("unknown option '{}'", key)),
        None => Ok(()),
    }
}

/// Which half of the forms plugin to register.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FormsStrategy {
    /// Base styles and `form-*` classes (option unset)
    #[default]
    Both,
    /// Element base styles only
    Base,
    /// `form-*` classes only
    Class,
}

/// Form-control resets, as base styles and/or `form-*` classes.
#[derive(Debug, Clone, Default)]
pub struct FormsPlugin {
    strategy: FormsStrategy,
}

impl FormsPlugin {
    /// Create the plugin with a given strategy.
    pub fn new(strategy: FormsStrategy) -> Self {
        Self { strategy }
    }

    /// Build from declared options (`strategy = "base" | "class"`).
    pub fn from_options(options: &PluginOptions) -> Result<Self, String> {
        check_known_options(options, &["strategy"])?;
        let strategy = match string_option(options, "strategy")? {
            None => FormsStrategy::Both,
            Some("base") => FormsStrategy::Base,
            Some("class") => FormsStrategy::Class,
            Some(other) => {
                return Err(format!("strategy must be \"base\" or \"class\", found \"{}\"", other))
            }
        };
        Ok(Self { strategy })
    }

    /// Configured strategy.
    pub fn strategy(&self) -> FormsStrategy {
        self.strategy
    }

    fn input_declarations(theme: &TokenTable) -> Declarations {
        [
            ("appearance", "none".to_string()),
            ("background-color", theme_value(theme, "colors", "white", "#fff")),
            ("border-color", theme_value(theme, "colors", "gray.500", "#6b7280")),
            ("border-width", "1px".to_string()),
            ("border-radius", "0px".to_string()),
            ("padding-top", theme_value(theme, "spacing", "2", "0.5rem")),
            ("padding-right", theme_value(theme, "spacing", "3", "0.75rem")),
            ("padding-bottom", theme_value(theme, "spacing", "2", "0.5rem")),
            ("padding-left", theme_value(theme, "spacing", "3", "0.75rem")),
            ("font-size", theme_value(theme, "fontSize", "base", "1rem")),
            ("line-height", font_line_height(theme, "base", "1.5rem")),
            ("--tw-shadow", "0 0 #0000".to_string()),
        ]
        .into_iter()
        .map(|(k, v)| (k.to_string(), v))
        .collect()
    }

    fn select_declarations(theme: &TokenTable) -> Declarations {
        let mut declarations = Self::input_declarations(theme);
        declarations.insert("background-image".to_string(), SELECT_CHEVRON.to_string());
        declarations.insert("background-position".to_string(), "right 0.5rem center".to_string());
        declarations.insert("background-repeat".to_string(), "no-repeat".to_string());
        declarations.insert("background-size".to_string(), "1.5em 1.5em".to_string());
        declarations
            .insert("padding-right".to_string(), theme_value(theme, "spacing", "10", "2.5rem"));
        declarations.insert("print-color-adjust".to_string(), "exact".to_string());
        declarations
    }

    fn toggle_declarations(theme: &TokenTable, radius: &str) -> Declarations {
        let size = theme_value(theme, "spacing", "4", "1rem");
        [
            ("appearance", "none".to_string()),
            ("padding", "0".to_string()),
            ("print-color-adjust", "exact".to_string()),
            ("display", "inline-block".to_string()),
            ("vertical-align", "middle".to_string()),
            ("background-origin", "border-box".to_string()),
            ("user-select", "none".to_string()),
            ("flex-shrink", "0".to_string()),
            ("height", size.clone()),
            ("width", size),
            ("color", theme_value(theme, "colors", "blue.600", "#2563eb")),
            ("background-color", theme_value(theme, "colors", "white", "#fff")),
            ("border-color", theme_value(theme, "colors", "gray.500", "#6b7280")),
            ("border-width", "1px".to_string()),
            ("border-radius", radius.to_string()),
        ]
        .into_iter()
        .map(|(k, v)| (k.to_string(), v))
        .collect()
    }
}

impl Plugin for FormsPlugin {
    fn name(&self) -> &str {
        FORMS
    }

    fn base_styles(&self, theme: &TokenTable) -> PluginResult<Vec<BaseStyle>> {
        if self.strategy == FormsStrategy::Class {
            return Ok(Vec::new());
        }
        let placeholder = theme_value(theme, "colors", "gray.500", "#6b7280");
        Ok(vec![
            BaseStyle {
                selector: TEXT_INPUTS.to_string(),
                declarations: Self::input_declarations(theme),
            },
            BaseStyle::new(
                "input::placeholder,textarea::placeholder",
                [("color", placeholder.as_str()), ("opacity", "1")],
            ),
            BaseStyle::new(
                "select",
                Self::select_declarations(theme).into_iter().filter(|(k, _)| {
                    k.starts_with("background") || k == "padding-right" || k == "print-color-adjust"
                }),
            ),
            BaseStyle::new(
                "[multiple],[size]:where(select:not([size='1']))",
                [
                    ("background-image", "initial"),
                    ("background-position", "initial"),
                    ("background-repeat", "unset"),
                    ("background-size", "initial"),
                    ("padding-right", "0.75rem"),
                    ("print-color-adjust", "unset"),
                ],
            ),
            BaseStyle {
                selector: "[type='checkbox']".to_string(),
                declarations: Self::toggle_declarations(theme, "0px"),
            },
            BaseStyle {
                selector: "[type='radio']".to_string(),
                declarations: Self::toggle_declarations(theme, "100%"),
            },
            BaseStyle::new(
                "[type='checkbox']:checked,[type='radio']:checked",
                [
                    ("border-color", "transparent"),
                    ("background-color", "currentColor"),
                    ("background-size", "100% 100%"),
                    ("background-position", "center"),
                    ("background-repeat", "no-repeat"),
                ],
            ),
        ])
    }

    fn utilities(&self, theme: &TokenTable) -> PluginResult<Vec<Utility>> {
        if self.strategy == FormsStrategy::Base {
            return Ok(Vec::new());
        }
        let input = Self::input_declarations(theme);
        let mut multiselect = input.clone();
        multiselect
            .insert("padding-right".to_string(), theme_value(theme, "spacing", "3", "0.75rem"));

        Ok(vec![
            Utility { name: "form-input".to_string(), declarations: input.clone() },
            Utility { name: "form-textarea".to_string(), declarations: input },
            Utility {
                name: "form-select".to_string(),
                declarations: Self::select_declarations(theme),
            },
            Utility { name: "form-multiselect".to_string(), declarations: multiselect },
            Utility {
                name: "form-checkbox".to_string(),
                declarations: Self::toggle_declarations(theme, "0px"),
            },
            Utility {
                name: "form-radio".to_string(),
                declarations: Self::toggle_declarations(theme, "100%"),
            },
        ])
    }
}

/// `prose` typography classes sized from the theme's `fontSize`.
#[derive(Debug, Clone)]
pub struct TypographyPlugin {
    class_name: String,
}

impl Default for TypographyPlugin {
    fn default() -> Self {
        Self { class_name: "prose".to_string() }
    }
}

impl TypographyPlugin {
    /// Build from declared options (`className`).
    pub fn from_options(options: &PluginOptions) -> Result<Self, String> {
        check_known_options(options, &["className"])?;
        match string_option(options, "className")? {
            None => Ok(Self::default()),
            Some(name) if name.trim().is_empty() => Err("className must not be empty".to_string()),
            Some(name) => Ok(Self { class_name: name.trim().to_string() }),
        }
    }

    /// Base class name (`prose` unless configured).
    pub fn class_name(&self) -> &str {
        &self.class_name
    }
}

impl Plugin for TypographyPlugin {
    fn name(&self) -> &str {
        TYPOGRAPHY
    }

    fn utilities(&self, theme: &TokenTable) -> PluginResult<Vec<Utility>> {
        let base = Utility::new(
            &self.class_name,
            [
                ("color".to_string(), theme_value(theme, "colors", "gray.700", "#374151")),
                ("max-width".to_string(), "65ch".to_string()),
                ("font-size".to_string(), theme_value(theme, "fontSize", "base", "1rem")),
                ("line-height".to_string(), "1.75".to_string()),
            ],
        );

        let mut utilities = vec![base];
        let sizes =
            [("sm", "1.7142857"), ("lg", "1.7777778"), ("xl", "1.8"), ("2xl", "1.6666667")];
        for (size, line_height) in sizes {
            let Some(font_size) = theme.css_value("fontSize", size) else {
                continue;
            };
            utilities.push(Utility::new(
                &format!("{}-{}", self.class_name, size),
                [("font-size", font_size.as_str()), ("line-height", line_height)],
            ));
        }
        Ok(utilities)
    }

    fn variants(&self, _theme: &TokenTable) -> PluginResult<Vec<Variant>> {
        let elements = [
            ("headings", "h1, h2, h3, h4, h5, h6"),
            ("lead", "[class~=\"lead\"]"),
            ("p", "p"),
            ("a", "a"),
            ("code", "code"),
            ("img", "img"),
        ];
        Ok(elements
            .iter()
            .map(|(suffix, selector)| {
                Variant::new(
                    format!("{}-{}", self.class_name, suffix),
                    format!("& :is({})", selector),
                )
            })
            .collect())
    }
}

/// Padding-based `aspect-w-*` / `aspect-h-*` classes plus `aspect-*`
/// classes for the theme's `aspectRatio` tokens.
#[derive(Debug, Clone)]
pub struct AspectRatioPlugin {
    max: u64,
}

impl Default for AspectRatioPlugin {
    fn default() -> Self {
        Self { max: 16 }
    }
}

impl AspectRatioPlugin {
    /// Build from declared options (`max`, a positive integer up to 64).
    pub fn from_options(options: &PluginOptions) -> Result<Self, String> {
        check_known_options(options, &["max"])?;
        match options.get("max") {
            None | Some(Value::Null) => Ok(Self::default()),
            Some(value) => match value.as_u64() {
                Some(max) if (1..=64).contains(&max) => Ok(Self { max }),
                _ => Err(format!("max must be an integer between 1 and 64, found {}", value)),
            },
        }
    }
}

impl Plugin for AspectRatioPlugin {
    fn name(&self) -> &str {
        ASPECT_RATIO
    }

    fn utilities(&self, theme: &TokenTable) -> PluginResult<Vec<Utility>> {
        let mut utilities = Vec::new();
        for n in 1..=self.max {
            let n = n.to_string();
            utilities.push(Utility::new(
                &format!("aspect-w-{}", n),
                [
                    ("position", "relative"),
                    ("padding-bottom", "calc(var(--tw-aspect-h) / var(--tw-aspect-w) * 100%)"),
                    ("--tw-aspect-w", n.as_str()),
                ],
            ));
            utilities
                .push(Utility::new(&format!("aspect-h-{}", n), [("--tw-aspect-h", n.as_str())]));
        }
        utilities
            .push(Utility::new("aspect-none", [("position", "static"), ("padding-bottom", "0")]));

        if let Some(ratios) = theme.category("aspectRatio") {
            for (name, value) in ratios {
                if let Some(css) = value.to_css() {
                    utilities
                        .push(Utility::new(&format!("aspect-{}", name), [("aspect-ratio", css)]));
                }
            }
        }
        Ok(utilities)
    }
}

/// A plugin declared directly in configuration.
#[derive(Debug, Clone, Default)]
pub struct InlinePlugin {
    name: String,
    utilities: Vec<Utility>,
    variants: Vec<Variant>,
    base: Vec<BaseStyle>,
}

impl InlinePlugin {
    /// Build from a declaration's `utilities`, `variants` and `base` tables.
    pub fn from_spec(spec: &PluginSpec) -> Self {
        if !spec.options.is_empty() {
            tracing::debug!(plugin = %spec.name, "options are ignored for inline plugins");
        }
        Self {
            name: spec.name.clone(),
            utilities: spec
                .utilities
                .iter()
                .map(|(name, declarations)| Utility::new(name, declarations.clone()))
                .collect(),
            variants: spec
                .variants
                .iter()
                .map(|(name, template)| Variant::new(name.clone(), template.clone()))
                .collect(),
            base: spec
                .base
                .iter()
                .map(|(selector, declarations)| {
                    BaseStyle::new(selector.clone(), declarations.clone())
                })
                .collect(),
        }
    }
}

impl Plugin for InlinePlugin {
    fn name(&self) -> &str {
        &self.name
    }

    fn utilities(&self, _theme: &TokenTable) -> PluginResult<Vec<Utility>> {
        Ok(self.utilities.clone())
    }

    fn variants(&self, _theme: &TokenTable) -> PluginResult<Vec<Variant>> {
        Ok(self.variants.clone())
    }

    fn base_styles(&self, _theme: &TokenTable) -> PluginResult<Vec<BaseStyle>> {
        Ok(self.base.clone())
    }
}
