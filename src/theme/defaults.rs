//! Built-in base theme
//!
//! The framework-default token table that project configuration extends or
//! replaces. Values follow the stock utility-framework defaults.

use super::{TokenMap, TokenTable, TokenValue};

const SHADES: [&str; 11] =
    ["50", "100", "200", "300", "400", "500", "600", "700", "800", "900", "950"];

const GRAY: [&str; 11] = [
    "#f9fafb", "#f3f4f6", "#e5e7eb", "#d1d5db", "#9ca3af", "#6b7280", "#4b5563", "#374151",
    "#1f2937", "#111827", "#030712",
];
const RED: [&str; 11] = [
    "#fef2f2", "#fee2e2", "#fecaca", "#fca5a5", "#f87171", "#ef4444", "#dc2626", "#b91c1c",
    "#991b1b", "#7f1d1d", "#450a0a",
];
const YELLOW: [&str; 11] = [
    "#fefce8", "#fef9c3", "#fef08a", "#fde047", "#facc15", "#eab308", "#ca8a04", "#a16207",
    "#854d0e", "#713f12", "#422006",
];
const GREEN: [&str; 11] = [
    "#f0fdf4", "#dcfce7", "#bbf7d0", "#86efac", "#4ade80", "#22c55e", "#16a34a", "#15803d",
    "#166534", "#14532d", "#052e16",
];
const BLUE: [&str; 11] = [
    "#eff6ff", "#dbeafe", "#bfdbfe", "#93c5fd", "#60a5fa", "#3b82f6", "#2563eb", "#1d4ed8",
    "#1e40af", "#1e3a8a", "#172554",
];

const SPACING_STEPS: [&str; 34] = [
    "0", "0.5", "1", "1.5", "2", "2.5", "3", "3.5", "4", "5", "6", "7", "8", "9", "10", "11",
    "12", "14", "16", "20", "24", "28", "32", "36", "40", "44", "48", "52", "56", "60", "64",
    "72", "80", "96",
];

/// Build the default base theme.
pub fn default_theme() -> TokenTable {
    TokenTable::new()
        .with_category("screens", screens())
        .with_category("colors", colors())
        .with_category("spacing", spacing())
        .with_category("fontFamily", font_family())
        .with_category("fontSize", font_size())
        .with_category("fontWeight", font_weight())
        .with_category("borderRadius", border_radius())
        .with_category("boxShadow", box_shadow())
        .with_category("opacity", opacity())
        .with_category("aspectRatio", aspect_ratio())
}

fn flat(entries: &[(&str, &str)]) -> TokenMap {
    entries.iter().map(|(name, value)| (name.to_string(), TokenValue::value(*value))).collect()
}

fn color_scale(values: &[&str; 11]) -> TokenValue {
    TokenValue::Scale(
        SHADES
            .iter()
            .zip(values)
            .map(|(shade, hex)| (shade.to_string(), TokenValue::value(*hex)))
            .collect(),
    )
}

fn screens() -> TokenMap {
    flat(&[("sm", "640px"), ("md", "768px"), ("lg", "1024px"), ("xl", "1280px"), ("2xl", "1536px")])
}

fn colors() -> TokenMap {
    let mut map = flat(&[
        ("inherit", "inherit"),
        ("current", "currentColor"),
        ("transparent", "transparent"),
        ("black", "#000"),
        ("white", "#fff"),
    ]);
    map.insert("gray".to_string(), color_scale(&GRAY));
    map.insert("red".to_string(), color_scale(&RED));
    map.insert("yellow".to_string(), color_scale(&YELLOW));
    map.insert("green".to_string(), color_scale(&GREEN));
    map.insert("blue".to_string(), color_scale(&BLUE));
    map
}

fn spacing() -> TokenMap {
    let mut map = flat(&[("px", "1px")]);
    for step in SPACING_STEPS {
        if let Ok(n) = step.parse::<f64>() {
            let value = if n == 0.0 { "0px".to_string() } else { format!("{}rem", n / 4.0) };
            map.insert(step.to_string(), TokenValue::Value(value));
        }
    }
    map
}

fn font_family() -> TokenMap {
    let mut map = TokenMap::new();
    map.insert(
        "sans".to_string(),
        TokenValue::list([
            "ui-sans-serif",
            "system-ui",
            "sans-serif",
            "\"Apple Color Emoji\"",
            "\"Segoe UI Emoji\"",
            "\"Segoe UI Symbol\"",
            "\"Noto Color Emoji\"",
        ]),
    );
    map.insert(
        "serif".to_string(),
        TokenValue::list([
            "ui-serif",
            "Georgia",
            "Cambria",
            "\"Times New Roman\"",
            "Times",
            "serif",
        ]),
    );
    map.insert(
        "mono".to_string(),
        TokenValue::list([
            "ui-monospace",
            "SFMono-Regular",
            "Menlo",
            "Monaco",
            "Consolas",
            "\"Liberation Mono\"",
            "\"Courier New\"",
            "monospace",
        ]),
    );
    map
}

fn font_size() -> TokenMap {
    let sizes = [
        ("xs", "0.75rem", "1rem"),
        ("sm", "0.875rem", "1.25rem"),
        ("base", "1rem", "1.5rem"),
        ("lg", "1.125rem", "1.75rem"),
        ("xl", "1.25rem", "1.75rem"),
        ("2xl", "1.5rem", "2rem"),
        ("3xl", "1.875rem", "2.25rem"),
        ("4xl", "2.25rem", "2.5rem"),
        ("5xl", "3rem", "1"),
        ("6xl", "3.75rem", "1"),
        ("7xl", "4.5rem", "1"),
        ("8xl", "6rem", "1"),
        ("9xl", "8rem", "1"),
    ];
    sizes
        .iter()
        .map(|(name, size, line_height)| {
            let settings = flat(&[("lineHeight", *line_height)]);
            let value =
                TokenValue::List(vec![TokenValue::value(*size), TokenValue::Scale(settings)]);
            (name.to_string(), value)
        })
        .collect()
}

fn font_weight() -> TokenMap {
    flat(&[
        ("thin", "100"),
        ("extralight", "200"),
        ("light", "300"),
        ("normal", "400"),
        ("medium", "500"),
        ("semibold", "600"),
        ("bold", "700"),
        ("extrabold", "800"),
        ("black", "900"),
    ])
}

fn border_radius() -> TokenMap {
    flat(&[
        ("none", "0px"),
        ("sm", "0.125rem"),
        ("DEFAULT", "0.25rem"),
        ("md", "0.375rem"),
        ("lg", "0.5rem"),
        ("xl", "0.75rem"),
        ("2xl", "1rem"),
        ("3xl", "1.5rem"),
        ("full", "9999px"),
    ])
}

fn box_shadow() -> TokenMap {
    flat(&[
        ("sm", "0 1px 2px 0 rgb(0 0 0 / 0.05)"),
        ("DEFAULT", "0 1px 3px 0 rgb(0 0 0 / 0.1), 0 1px 2px -1px rgb(0 0 0 / 0.1)"),
        ("md", "0 4px 6px -1px rgb(0 0 0 / 0.1), 0 2px 4px -2px rgb(0 0 0 / 0.1)"),
        ("lg", "0 10px 15px -3px rgb(0 0 0 / 0.1), 0 4px 6px -4px rgb(0 0 0 / 0.1)"),
        ("xl", "0 20px 25px -5px rgb(0 0 0 / 0.1), 0 8px 10px -6px rgb(0 0 0 / 0.1)"),
        ("inner", "inset 0 2px 4px 0 rgb(0 0 0 / 0.05)"),
        ("none", "none"),
    ])
}

fn opacity() -> TokenMap {
    ["0", "5", "10", "20", "25", "30", "40", "50", "60", "70", "75", "80", "90", "95", "100"]
        .iter()
        .filter_map(|step| {
            let n = step.parse::<f64>().ok()?;
            Some((step.to_string(), TokenValue::Value(format!("{}", n / 100.0))))
        })
        .collect()
}

fn aspect_ratio() -> TokenMap {
    flat(&[("auto", "auto"), ("square", "1 / 1"), ("video", "16 / 9")])
}
