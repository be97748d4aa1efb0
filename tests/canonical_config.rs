//! The starter configuration, loaded from disk and resolved end to end

use std::fs;
use std::path::Path;
use tempfile::TempDir;
use windscan::config::{load_config, ConfigFormat, STARTER_JSON, STARTER_TOML};
use windscan::theme::default_theme;
use windscan::{Resolver, TokenValue};

fn create_test_file(dir: &Path, name: &str, contents: &str) {
    let path = dir.join(name);
    fs::create_dir_all(path.parent().unwrap()).unwrap();
    fs::write(path, contents).unwrap();
}

fn canonical_project(config_name: &str, config_text: &str) -> TempDir {
    let temp = TempDir::new().unwrap();
    create_test_file(temp.path(), config_name, config_text);
    create_test_file(
        temp.path(),
        "templates/signup.html",
        r#"<form class="space-y-4"><input type="email" class="form-input rounded-md"></form>"#,
    );
    create_test_file(temp.path(), "src/lib.rs", r#"pub const CARD: &str = "shadow-lg p-6 font-sans";"#);
    temp
}

#[test]
fn test_canonical_config_resolves() {
    for format in [ConfigFormat::Toml, ConfigFormat::Json] {
        let text = match format {
            ConfigFormat::Toml => STARTER_TOML,
            _ => STARTER_JSON,
        };
        let temp = canonical_project(format.file_name(), text);

        let loaded = load_config(Some(&temp.path().join(format.file_name()))).unwrap();
        let resolution = Resolver::from_loaded(loaded, temp.path()).unwrap().run().unwrap();

        let fonts = resolution.effective_theme.category("fontFamily").unwrap();
        assert_eq!(fonts["sans"], TokenValue::list(["Helvetica", "Arial", "sans-serif"]));

        let defaults = default_theme();
        let default_fonts = defaults.category("fontFamily").unwrap();
        assert_eq!(fonts["serif"], default_fonts["serif"]);
        assert_eq!(fonts["mono"], default_fonts["mono"]);

        assert!(resolution.registry.base.keys().any(|selector| selector.contains("textarea")));
        assert!(resolution.registry.base_style("[type='checkbox']").is_some());

        for class in ["space-y-4", "form-input", "rounded-md", "shadow-lg", "p-6", "font-sans"] {
            assert!(resolution.used_classes.contains(class), "missing {}", class);
        }
        assert_eq!(resolution.stats.files_matched, 2);
        assert!(resolution.warnings.is_empty());
    }
}

#[test]
fn test_relative_content_resolves_from_config_dir() {
    let temp = TempDir::new().unwrap();
    create_test_file(
        temp.path(),
        "site/windscan.toml",
        "[content]\nfiles = [\"pages/*.html\"]\nrelative = true\n",
    );
    create_test_file(temp.path(), "site/pages/home.html", r#"<h1 class="text-3xl">"#);

    let loaded = load_config(Some(&temp.path().join("site/windscan.toml"))).unwrap();
    let resolver = Resolver::from_loaded(loaded, temp.path()).unwrap();
    assert_eq!(resolver.content_root(), temp.path().join("site"));

    let resolution = resolver.run().unwrap();
    assert!(resolution.used_classes.contains("text-3xl"));
}
