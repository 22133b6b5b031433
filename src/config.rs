//! Site configuration module.
//!
//! Handles loading, validating, and merging `config.toml`. Stock defaults are
//! serialized to a TOML table, the user file is merged on top of it, and the
//! result is deserialized and validated. A missing file means "all defaults".
//!
//! ## Configuration Options
//!
//! ```toml
//! # All options are optional - defaults shown below
//!
//! [site]
//! title = "My Portfolio"
//! description = ""
//! author = ""
//! # base_url = "https://example.com"   # enables sitemap.xml and robots.txt
//!
//! [paths]
//! content_dir = "content"    # Markdown for `add` / `rewrite`, plus about.md
//! static_dir = "static"      # Copied verbatim to <output>/static/
//! # templates_dir = "templates"  # Tera templates; omit for the built-in theme
//! database = "data/portfolio.db"
//! output_dir = "dist"
//!
//! [build]
//! datetime_format = "%Y-%m-%d %H:%M:%S"   # Date line of imported posts
//! date_format = "%b %d, %Y"               # Dates shown on pages
//! prune_stale = true
//! fail_on_write_error = false
//! # max_processes = 4
//!
//! [colors.light]
//! background = "#ffffff"
//! text = "#111111"
//! text_muted = "#666666"
//! border = "#e0e0e0"
//! link = "#333333"
//! link_hover = "#000000"
//!
//! [colors.dark]
//! background = "#0a0a0a"
//! text = "#eeeeee"
//! text_muted = "#999999"
//! border = "#333333"
//! link = "#cccccc"
//! link_hover = "#ffffff"
//! ```
//!
//! Unknown keys are rejected to catch typos early.

use chrono::NaiveDateTime;
use chrono::format::{Item, StrftimeItems};
use serde::{Deserialize, Serialize};
use std::fmt::Write;
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),
    #[error("Config validation error: {0}")]
    Validation(String),
}

/// Site configuration loaded from `config.toml`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SiteConfig {
    /// Site identity shown in headers, titles and the sitemap.
    pub site: SiteMeta,
    /// Where content, assets, templates, the database and output live.
    pub paths: PathsConfig,
    /// Build behaviour.
    pub build: BuildConfig,
    /// Color schemes for the built-in theme.
    pub colors: ColorConfig,
}

impl SiteConfig {
    /// Validate config values are within acceptable ranges.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.site.title.trim().is_empty() {
            return Err(ConfigError::Validation(
                "site.title must not be empty".into(),
            ));
        }
        if let Some(url) = &self.site.base_url
            && !(url.starts_with("http://") || url.starts_with("https://"))
        {
            return Err(ConfigError::Validation(format!(
                "site.base_url must start with http:// or https:// (got `{url}`)"
            )));
        }
        check_strftime("build.datetime_format", &self.build.datetime_format)?;
        check_strftime("build.date_format", &self.build.date_format)?;
        if self.build.max_processes == Some(0) {
            return Err(ConfigError::Validation(
                "build.max_processes must be at least 1".into(),
            ));
        }
        Ok(())
    }

    /// `site.base_url` without a trailing slash.
    pub fn base_url(&self) -> Option<&str> {
        self.site
            .base_url
            .as_deref()
            .map(|url| url.trim_end_matches('/'))
    }
}

/// Entry timestamps carry no timezone, so a format must both parse and render
/// against a plain `NaiveDateTime`. Offset and zone items (`%z`, `%Z`) parse
/// fine but fail at format time.
fn check_strftime(key: &str, format: &str) -> Result<(), ConfigError> {
    let invalid = || {
        ConfigError::Validation(format!("{key} is not a valid strftime format: `{format}`"))
    };
    if format.is_empty() || StrftimeItems::new(format).any(|item| matches!(item, Item::Error)) {
        return Err(invalid());
    }
    let mut rendered = String::new();
    write!(rendered, "{}", NaiveDateTime::default().format(format)).map_err(|_| invalid())?;
    Ok(())
}

/// Site identity.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SiteMeta {
    pub title: String,
    pub description: String,
    /// Default author for posts that don't name one.
    pub author: String,
    /// Absolute URL the site is served from. Required for `sitemap.xml`.
    pub base_url: Option<String>,
}

impl Default for SiteMeta {
    fn default() -> Self {
        Self {
            title: "My Portfolio".to_string(),
            description: String::new(),
            author: String::new(),
            base_url: None,
        }
    }
}

/// Filesystem locations, relative to the working directory.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct PathsConfig {
    /// Markdown sources, one subdirectory per kind (`posts/`, `projects/`),
    /// plus the optional `about.md` and `about_summary.md` read at build time.
    pub content_dir: PathBuf,
    pub static_dir: PathBuf,
    /// Tera template directory. When absent the built-in theme is used.
    pub templates_dir: Option<PathBuf>,
    pub database: PathBuf,
    pub output_dir: PathBuf,
}

impl Default for PathsConfig {
    fn default() -> Self {
        Self {
            content_dir: PathBuf::from("content"),
            static_dir: PathBuf::from("static"),
            templates_dir: None,
            database: PathBuf::from("data/portfolio.db"),
            output_dir: PathBuf::from("dist"),
        }
    }
}

/// Build behaviour.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct BuildConfig {
    /// strftime format of the date line in imported post files.
    pub datetime_format: String,
    /// strftime format for dates rendered on pages.
    pub date_format: String,
    /// Remove files written by the previous build that this build no longer produces.
    pub prune_stale: bool,
    /// Turn per-file write failures into a failed build.
    pub fail_on_write_error: bool,
    /// Maximum number of parallel render workers.
    /// When absent, defaults to the number of CPU cores.
    /// Values larger than the core count are clamped down.
    pub max_processes: Option<usize>,
}

impl Default for BuildConfig {
    fn default() -> Self {
        Self {
            datetime_format: crate::entity::TIMESTAMP_FORMAT.to_string(),
            date_format: "%b %d, %Y".to_string(),
            prune_stale: true,
            fail_on_write_error: false,
            max_processes: None,
        }
    }
}

/// Resolve the effective thread count from config.
///
/// - `None` → use all available cores
/// - `Some(n)` → use `min(n, cores)` (user can constrain down, not up)
pub fn effective_threads(config: &BuildConfig) -> usize {
    let cores = std::thread::available_parallelism()
        .map(|n| n.get())
        .unwrap_or(1);
    config.max_processes.map(|n| n.min(cores)).unwrap_or(cores)
}

/// Color configuration for light and dark modes.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ColorConfig {
    pub light: ColorScheme,
    pub dark: ColorScheme,
}

impl Default for ColorConfig {
    fn default() -> Self {
        Self {
            light: ColorScheme::default_light(),
            dark: ColorScheme::default_dark(),
        }
    }
}

/// Individual color scheme (light or dark).
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ColorScheme {
    pub background: String,
    pub text: String,
    /// Dates, tags, navigation.
    pub text_muted: String,
    pub border: String,
    pub link: String,
    pub link_hover: String,
}

impl ColorScheme {
    pub fn default_light() -> Self {
        Self {
            background: "#ffffff".to_string(),
            text: "#111111".to_string(),
            text_muted: "#666666".to_string(),
            border: "#e0e0e0".to_string(),
            link: "#333333".to_string(),
            link_hover: "#000000".to_string(),
        }
    }

    pub fn default_dark() -> Self {
        Self {
            background: "#0a0a0a".to_string(),
            text: "#eeeeee".to_string(),
            text_muted: "#999999".to_string(),
            border: "#333333".to_string(),
            link: "#cccccc".to_string(),
            link_hover: "#ffffff".to_string(),
        }
    }
}

impl Default for ColorScheme {
    fn default() -> Self {
        Self::default_light()
    }
}

// =============================================================================
// Config loading, merging, and validation
// =============================================================================

/// Returns the stock default config as a `toml::Value::Table`.
pub fn stock_defaults_value() -> toml::Value {
    match toml::Value::try_from(SiteConfig::default()) {
        Ok(value) => value,
        Err(_) => toml::Value::Table(toml::map::Map::new()),
    }
}

/// Recursively merge `overlay` on top of `base`.
///
/// - Tables are merged key-by-key (overlay keys override base keys).
/// - Non-table values in overlay replace base values entirely.
/// - Keys in base that are not in overlay are preserved.
pub fn merge_toml(base: toml::Value, overlay: toml::Value) -> toml::Value {
    match (base, overlay) {
        (toml::Value::Table(mut base_table), toml::Value::Table(overlay_table)) => {
            for (key, overlay_val) in overlay_table {
                let merged = match base_table.remove(&key) {
                    Some(base_val) => merge_toml(base_val, overlay_val),
                    None => overlay_val,
                };
                base_table.insert(key, merged);
            }
            toml::Value::Table(base_table)
        }
        (_, overlay) => overlay,
    }
}

/// Read a config file as a raw TOML value.
///
/// Returns `Ok(None)` if the file does not exist.
pub fn load_raw_config(path: &Path) -> Result<Option<toml::Value>, ConfigError> {
    if !path.exists() {
        return Ok(None);
    }
    let content = fs::read_to_string(path)?;
    let value: toml::Value = toml::from_str(&content)?;
    Ok(Some(value))
}

/// Merge an optional overlay onto a base value, then deserialize and validate.
pub fn resolve_config(
    base: toml::Value,
    overlay: Option<toml::Value>,
) -> Result<SiteConfig, ConfigError> {
    let merged = match overlay {
        Some(ov) => merge_toml(base, ov),
        None => base,
    };
    let config: SiteConfig = merged.try_into()?;
    config.validate()?;
    Ok(config)
}

/// Load config from the given file, falling back to stock defaults when the
/// file is absent.
pub fn load_config(path: &Path) -> Result<SiteConfig, ConfigError> {
    let base = stock_defaults_value();
    let overlay = load_raw_config(path)?;
    resolve_config(base, overlay)
}

/// Returns a fully-commented stock `config.toml` with all keys and explanations.
///
/// Used by the `gen-config` CLI command.
pub fn stock_config_toml() -> &'static str {
    r##"# static-folio configuration
# ==========================
# All settings are optional. Remove or comment out any you don't need.
# Values shown below are the defaults. Unknown keys will cause an error.

# ---------------------------------------------------------------------------
# Site identity
# ---------------------------------------------------------------------------
[site]
title = "My Portfolio"
description = ""
# Shown on posts that don't name their own author.
author = ""
# Absolute URL the site is served from. When set, sitemap.xml and robots.txt
# are generated.
# base_url = "https://example.com"

# ---------------------------------------------------------------------------
# Paths (relative to the working directory)
# ---------------------------------------------------------------------------
[paths]
# Markdown sources for `add` and `rewrite`: <content_dir>/posts/*.md and
# <content_dir>/projects/*.md. The build also reads the optional
# <content_dir>/about.md (the /about/ page) and about_summary.md (home page).
content_dir = "content"

# Copied verbatim to <output_dir>/static/
static_dir = "static"

# Tera templates (index.html, posts.html, post.html, projects.html,
# project.html). Omit to use the built-in theme.
# templates_dir = "templates"

database = "data/portfolio.db"
output_dir = "dist"

# ---------------------------------------------------------------------------
# Build
# ---------------------------------------------------------------------------
[build]
# strftime format of the date line (line 2) in post files.
datetime_format = "%Y-%m-%d %H:%M:%S"

# strftime format for dates shown on pages.
date_format = "%b %d, %Y"

# Remove files the previous build wrote that this build no longer produces.
# Files the builder never wrote are left alone.
prune_stale = true

# Fail the build (non-zero exit) when any page cannot be written.
fail_on_write_error = false

# Maximum parallel render workers.
# Omit or comment out to auto-detect (= number of CPU cores).
# max_processes = 4

# ---------------------------------------------------------------------------
# Colors - Light mode (prefers-color-scheme: light)
# ---------------------------------------------------------------------------
[colors.light]
background = "#ffffff"
text = "#111111"
text_muted = "#666666"    # Dates, tags, navigation
border = "#e0e0e0"
link = "#333333"
link_hover = "#000000"

# ---------------------------------------------------------------------------
# Colors - Dark mode (prefers-color-scheme: dark)
# ---------------------------------------------------------------------------
[colors.dark]
background = "#0a0a0a"
text = "#eeeeee"
text_muted = "#999999"
border = "#333333"
link = "#cccccc"
link_hover = "#ffffff"
"##
}

/// Generate CSS custom properties from color config.
pub fn generate_color_css(colors: &ColorConfig) -> String {
    format!(
        r#":root {{
    --color-bg: {light_bg};
    --color-text: {light_text};
    --color-text-muted: {light_text_muted};
    --color-border: {light_border};
    --color-link: {light_link};
    --color-link-hover: {light_link_hover};
}}

@media (prefers-color-scheme: dark) {{
    :root {{
        --color-bg: {dark_bg};
        --color-text: {dark_text};
        --color-text-muted: {dark_text_muted};
        --color-border: {dark_border};
        --color-link: {dark_link};
        --color-link-hover: {dark_link_hover};
    }}
}}"#,
        light_bg = colors.light.background,
        light_text = colors.light.text,
        light_text_muted = colors.light.text_muted,
        light_border = colors.light.border,
        light_link = colors.light.link,
        light_link_hover = colors.light.link_hover,
        dark_bg = colors.dark.background,
        dark_text = colors.dark.text,
        dark_text_muted = colors.dark.text_muted,
        dark_border = colors.dark.border,
        dark_link = colors.dark.link,
        dark_link_hover = colors.dark.link_hover,
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn default_config_values() {
        let config = SiteConfig::default();
        assert_eq!(config.site.title, "My Portfolio");
        assert_eq!(config.site.base_url, None);
        assert_eq!(config.paths.output_dir, PathBuf::from("dist"));
        assert_eq!(config.paths.templates_dir, None);
        assert_eq!(config.build.date_format, "%b %d, %Y");
        assert!(config.build.prune_stale);
        assert!(!config.build.fail_on_write_error);
        assert_eq!(config.colors.dark.background, "#0a0a0a");
    }

    #[test]
    fn parse_partial_config() {
        let toml = r##"
[site]
title = "Ada's Notes"

[colors.light]
background = "#fafafa"
"##;
        let config: SiteConfig = toml::from_str(toml).unwrap();
        assert_eq!(config.site.title, "Ada's Notes");
        assert_eq!(config.colors.light.background, "#fafafa");
        // Default values preserved
        assert_eq!(config.colors.light.text, "#111111");
        assert_eq!(config.paths.content_dir, PathBuf::from("content"));
    }

    #[test]
    fn base_url_trailing_slash_is_trimmed() {
        let mut config = SiteConfig::default();
        config.site.base_url = Some("https://example.com/".into());
        assert_eq!(config.base_url(), Some("https://example.com"));
    }

    #[test]
    fn generate_css_uses_config_colors() {
        let mut colors = ColorConfig::default();
        colors.light.background = "#f0f0f0".to_string();
        colors.dark.background = "#1a1a1a".to_string();

        let css = generate_color_css(&colors);
        assert!(css.contains("--color-bg: #f0f0f0"));
        assert!(css.contains("--color-bg: #1a1a1a"));
        assert!(css.contains("@media (prefers-color-scheme: dark)"));
    }

    // =========================================================================
    // load_config tests
    // =========================================================================

    #[test]
    fn load_config_returns_default_when_no_file() {
        let tmp = TempDir::new().unwrap();
        let config = load_config(&tmp.path().join("config.toml")).unwrap();
        assert_eq!(config.site.title, "My Portfolio");
    }

    #[test]
    fn load_config_reads_file() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("site.toml");
        fs::write(
            &path,
            r#"
[site]
base_url = "https://ada.dev"

[paths]
templates_dir = "themes/plain"

[build]
max_processes = 2
"#,
        )
        .unwrap();

        let config = load_config(&path).unwrap();
        assert_eq!(config.site.base_url.as_deref(), Some("https://ada.dev"));
        assert_eq!(
            config.paths.templates_dir,
            Some(PathBuf::from("themes/plain"))
        );
        assert_eq!(config.build.max_processes, Some(2));
        assert_eq!(config.paths.database, PathBuf::from("data/portfolio.db"));
    }

    #[test]
    fn load_config_invalid_toml_is_error() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("config.toml");
        fs::write(&path, "this is not valid toml [[[").unwrap();
        assert!(matches!(load_config(&path), Err(ConfigError::Toml(_))));
    }

    #[test]
    fn unknown_key_rejected_via_load_config() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("config.toml");
        fs::write(&path, "[build]\nprune = false\n").unwrap();
        assert!(load_config(&path).is_err());
    }

    #[test]
    fn unknown_section_rejected() {
        let result: Result<SiteConfig, _> = toml::from_str("[imagez]\nquality = 90\n");
        assert!(result.is_err());
    }

    #[test]
    fn unknown_nested_key_rejected() {
        let result: Result<SiteConfig, _> = toml::from_str("[colors.light]\nbg = \"#fff\"\n");
        let err = result.unwrap_err().to_string();
        assert!(err.contains("unknown field"));
    }

    // =========================================================================
    // Validation tests
    // =========================================================================

    #[test]
    fn validate_default_config_passes() {
        assert!(SiteConfig::default().validate().is_ok());
    }

    #[test]
    fn validate_rejects_empty_title() {
        let mut config = SiteConfig::default();
        config.site.title = "  ".into();
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("site.title"));
    }

    #[test]
    fn validate_rejects_relative_base_url() {
        let mut config = SiteConfig::default();
        config.site.base_url = Some("example.com".into());
        assert!(matches!(
            config.validate(),
            Err(ConfigError::Validation(_))
        ));
    }

    #[test]
    fn validate_rejects_bad_date_format() {
        let mut config = SiteConfig::default();
        config.build.date_format = "%Q".into();
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("build.date_format"));
    }

    #[test]
    fn validate_rejects_timezone_date_format() {
        for format in ["%b %d, %Y %Z", "%Y-%m-%d %z", "%Y-%m-%d %:z"] {
            let mut config = SiteConfig::default();
            config.build.date_format = format.into();
            let err = config.validate().unwrap_err();
            assert!(err.to_string().contains("build.date_format"), "{format}");
        }
        let mut config = SiteConfig::default();
        config.build.datetime_format = "%Y-%m-%d %H:%M:%S %Z".into();
        assert!(config.validate().is_err());
    }

    #[test]
    fn validate_rejects_zero_workers() {
        let mut config = SiteConfig::default();
        config.build.max_processes = Some(0);
        assert!(config.validate().is_err());
    }

    // =========================================================================
    // Thread count tests
    // =========================================================================

    #[test]
    fn effective_threads_auto() {
        let threads = effective_threads(&BuildConfig::default());
        let cores = std::thread::available_parallelism()
            .map(|n| n.get())
            .unwrap_or(1);
        assert_eq!(threads, cores);
    }

    #[test]
    fn effective_threads_clamped_to_cores() {
        let config = BuildConfig {
            max_processes: Some(99999),
            ..BuildConfig::default()
        };
        let cores = std::thread::available_parallelism()
            .map(|n| n.get())
            .unwrap_or(1);
        assert_eq!(effective_threads(&config), cores);
    }

    #[test]
    fn effective_threads_user_constrains_down() {
        let config = BuildConfig {
            max_processes: Some(1),
            ..BuildConfig::default()
        };
        assert_eq!(effective_threads(&config), 1);
    }

    // =========================================================================
    // merge_toml tests
    // =========================================================================

    #[test]
    fn merge_toml_deep_nested() {
        let base: toml::Value = toml::from_str(
            r##"
[colors.light]
background = "#fff"
text = "#000"
"##,
        )
        .unwrap();
        let overlay: toml::Value = toml::from_str(
            r##"
[colors.light]
background = "#fafafa"
"##,
        )
        .unwrap();
        let merged = merge_toml(base, overlay);
        let light = merged.get("colors").unwrap().get("light").unwrap();
        assert_eq!(light.get("background").unwrap().as_str(), Some("#fafafa"));
        assert_eq!(light.get("text").unwrap().as_str(), Some("#000"));
    }

    #[test]
    fn merge_toml_scalar_replaces_table() {
        let base: toml::Value = toml::from_str("[site]\ntitle = \"a\"\n").unwrap();
        let overlay: toml::Value = toml::from_str("site = 3\n").unwrap();
        let merged = merge_toml(base, overlay);
        assert_eq!(merged.get("site").unwrap().as_integer(), Some(3));
    }

    #[test]
    fn resolve_config_with_overlay() {
        let overlay: toml::Value = toml::from_str("[build]\nprune_stale = false\n").unwrap();
        let config = resolve_config(stock_defaults_value(), Some(overlay)).unwrap();
        assert!(!config.build.prune_stale);
        assert_eq!(config.build.date_format, "%b %d, %Y");
    }

    #[test]
    fn resolve_config_rejects_invalid_values() {
        let overlay: toml::Value = toml::from_str("[site]\ntitle = \"\"\n").unwrap();
        let result = resolve_config(stock_defaults_value(), Some(overlay));
        assert!(matches!(result, Err(ConfigError::Validation(_))));
    }

    // =========================================================================
    // stock config tests
    // =========================================================================

    #[test]
    fn stock_config_toml_roundtrips_to_defaults() {
        let config: SiteConfig = toml::from_str(stock_config_toml()).unwrap();
        let defaults = SiteConfig::default();
        assert_eq!(config.site.title, defaults.site.title);
        assert_eq!(config.paths.database, defaults.paths.database);
        assert_eq!(config.build.datetime_format, defaults.build.datetime_format);
        assert_eq!(config.build.date_format, defaults.build.date_format);
        assert_eq!(config.colors.dark.link, defaults.colors.dark.link);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn stock_config_toml_contains_all_sections() {
        let content = stock_config_toml();
        for section in ["[site]", "[paths]", "[build]", "[colors.light]", "[colors.dark]"] {
            assert!(content.contains(section), "missing {section}");
        }
    }

    #[test]
    fn stock_defaults_value_has_all_sections() {
        let val = stock_defaults_value();
        assert!(val.is_table());
        for key in ["site", "paths", "build", "colors"] {
            assert!(val.get(key).is_some(), "missing {key}");
        }
    }
}
