//! Configuration types for wpick.
//!
//! [`Config::load`] reads `~/.config/wpick/config.toml`, creating it with
//! hardcoded defaults if it does not yet exist, then layers an optional
//! explicit file on top. [`Config::defaults`] returns the same defaults
//! without touching the filesystem (useful in tests).
//!
//! The picker's data source is a tagged structure (`[picker.source]` with a
//! `kind` discriminant) rather than a loose bag of optional fields; call
//! [`Config::validate`] before building anything from it.

use crate::error::ConfigError;
use crate::options::MergePolicy;
use crate::types::ItemShape;
use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::time::Duration;

// ---------------------------------------------------------------------------
// Embedded defaults
// ---------------------------------------------------------------------------

const DEFAULT_CONFIG: &str = r#"
[site]
base_url   = "http://localhost:8080"
timeout_ms = 10000

[picker]
per_page    = 20
debounce_ms = 500
multi       = false
searchable  = true
disabled    = false
clearable   = true

[picker.source]
kind = "posts"

[ui]
theme    = "default"
show_ids = true

[keybindings]
query_focus = "/"
clear       = "x"
remove_last = "d"
help        = "?"
"#;

/// Largest page size the WordPress REST API accepts.
pub const MAX_PER_PAGE: u32 = 100;

// ---------------------------------------------------------------------------
// Public config types
// ---------------------------------------------------------------------------

/// Top-level application configuration, loaded from `~/.config/wpick/config.toml`.
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub site: SiteConfig,
    pub picker: PickerConfig,
    #[serde(default)]
    pub ui: UiConfig,
    #[serde(default)]
    pub keybindings: KeybindingsConfig,
}

/// `[site]` section.
#[derive(Debug, Clone, Deserialize)]
pub struct SiteConfig {
    /// Root of the WordPress install, e.g. `http://localhost:8080`.
    pub base_url: String,
    #[serde(default = "default_timeout_ms")]
    pub timeout_ms: u64,
}

fn default_timeout_ms() -> u64 { 10_000 }

impl SiteConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }
}

/// Which records the picker offers.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum SourceConfig {
    Posts,
    Pages,
    Terms {
        #[serde(default = "default_taxonomy")]
        taxonomy: String,
        /// REST route segment, when it differs from the usual mapping.
        #[serde(default)]
        rest_base: Option<String>,
    },
}

fn default_taxonomy() -> String { "category".to_string() }

impl SourceConfig {
    pub fn terms(taxonomy: impl Into<String>) -> Self {
        SourceConfig::Terms {
            taxonomy: taxonomy.into(),
            rest_base: None,
        }
    }

    pub fn shape(&self) -> ItemShape {
        match self {
            SourceConfig::Posts | SourceConfig::Pages => ItemShape::Post,
            SourceConfig::Terms { .. } => ItemShape::Term,
        }
    }

    /// Route segment under `/wp-json/wp/v2/`.
    ///
    /// Core taxonomies are exposed under plural names (`category` →
    /// `categories`, `post_tag` → `tags`); custom taxonomies default to their
    /// own name.
    pub fn rest_base(&self) -> String {
        match self {
            SourceConfig::Posts => "posts".to_string(),
            SourceConfig::Pages => "pages".to_string(),
            SourceConfig::Terms {
                rest_base: Some(base),
                ..
            } => base.clone(),
            SourceConfig::Terms { taxonomy, .. } => match taxonomy.as_str() {
                "category" => "categories".to_string(),
                "post_tag" => "tags".to_string(),
                other => other.to_string(),
            },
        }
    }

    /// Singular and plural nouns used in placeholders.
    fn nouns(&self) -> (&'static str, &'static str) {
        match self {
            SourceConfig::Posts => ("post", "posts"),
            SourceConfig::Pages => ("page", "pages"),
            SourceConfig::Terms { .. } => ("term", "terms"),
        }
    }
}

/// `[picker]` section.
#[derive(Debug, Clone, Deserialize)]
pub struct PickerConfig {
    pub source: SourceConfig,
    #[serde(default = "default_per_page")]
    pub per_page: u32,
    /// Quiet window in milliseconds. `0` disables debouncing.
    #[serde(default = "default_debounce_ms")]
    pub debounce_ms: u64,
    /// Queries shorter than this are not sent. Defaults to 0 for posts and
    /// pages and 3 for terms.
    #[serde(default)]
    pub min_query_chars: Option<usize>,
    #[serde(default)]
    pub multi: bool,
    #[serde(default = "default_true")]
    pub searchable: bool,
    #[serde(default)]
    pub disabled: bool,
    #[serde(default = "default_true")]
    pub clearable: bool,
    #[serde(default)]
    pub placeholder: Option<String>,
}

fn default_per_page() -> u32 { 20 }
fn default_debounce_ms() -> u64 { 500 }
fn default_true() -> bool { true }

impl PickerConfig {
    /// A picker over `source` with every other field at its default.
    pub fn new(source: SourceConfig) -> Self {
        Self {
            source,
            per_page: default_per_page(),
            debounce_ms: default_debounce_ms(),
            min_query_chars: None,
            multi: false,
            searchable: true,
            disabled: false,
            clearable: true,
            placeholder: None,
        }
    }

    pub fn quiet_window(&self) -> Duration {
        Duration::from_millis(self.debounce_ms)
    }

    pub fn min_query_chars(&self) -> usize {
        self.min_query_chars.unwrap_or(match self.source {
            SourceConfig::Terms { .. } => 3,
            _ => 0,
        })
    }

    /// Term pickers accumulate results across searches; post and page
    /// pickers show only the latest response.
    pub fn merge_policy(&self) -> MergePolicy {
        match self.source {
            SourceConfig::Terms { .. } => MergePolicy::KeepFirst,
            _ => MergePolicy::Replace,
        }
    }

    pub fn placeholder(&self) -> String {
        if let Some(p) = &self.placeholder {
            return p.clone();
        }
        let (one, many) = self.source.nouns();
        if self.multi {
            format!("Select {many}...")
        } else {
            format!("Select {one}...")
        }
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.per_page == 0 || self.per_page > MAX_PER_PAGE {
            return Err(ConfigError::PerPage(self.per_page));
        }
        if let SourceConfig::Terms { taxonomy, .. } = &self.source {
            if taxonomy.trim().is_empty() {
                return Err(ConfigError::EmptyTaxonomy);
            }
        }
        Ok(())
    }
}

/// `[ui]` section.
#[derive(Debug, Clone, Deserialize)]
pub struct UiConfig {
    #[serde(default = "default_theme")]
    pub theme: String,
    #[serde(default = "default_true")]
    pub show_ids: bool,
}

fn default_theme() -> String { "default".to_string() }

impl Default for UiConfig {
    fn default() -> Self {
        Self {
            theme: default_theme(),
            show_ids: true,
        }
    }
}

/// `[keybindings]` section. Each binding is a single character.
#[derive(Debug, Clone, Deserialize)]
pub struct KeybindingsConfig {
    #[serde(default = "default_query_focus")]
    pub query_focus: String,
    #[serde(default = "default_clear")]
    pub clear: String,
    #[serde(default = "default_remove_last")]
    pub remove_last: String,
    #[serde(default = "default_help")]
    pub help: String,
}

fn default_query_focus() -> String { "/".to_string() }
fn default_clear() -> String { "x".to_string() }
fn default_remove_last() -> String { "d".to_string() }
fn default_help() -> String { "?".to_string() }

impl Default for KeybindingsConfig {
    fn default() -> Self {
        Self {
            query_focus: default_query_focus(),
            clear: default_clear(),
            remove_last: default_remove_last(),
            help: default_help(),
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self::defaults()
    }
}

impl Config {
    /// Load from `~/.config/wpick/config.toml`, layered on top of the built-in
    /// defaults, then `explicit` on top of that. Creates the user file with
    /// defaults if it does not exist.
    pub fn load(explicit: Option<&Path>) -> anyhow::Result<Self> {
        let path = config_path();

        if !path.exists() {
            if let Some(parent) = path.parent() {
                std::fs::create_dir_all(parent)?;
            }
            std::fs::write(&path, DEFAULT_CONFIG.trim_start())?;
        }

        let mut builder = config::Config::builder()
            .add_source(config::File::from_str(DEFAULT_CONFIG, config::FileFormat::Toml))
            .add_source(config::File::from(path.as_path()).required(false));
        if let Some(explicit) = explicit {
            builder = builder.add_source(config::File::from(explicit).required(true));
        }

        builder.build()?.try_deserialize().map_err(Into::into)
    }

    /// Return the built-in defaults without touching the filesystem.
    pub fn defaults() -> Self {
        config::Config::builder()
            .add_source(config::File::from_str(DEFAULT_CONFIG, config::FileFormat::Toml))
            .build()
            .expect("built-in default config must be valid TOML")
            .try_deserialize()
            .expect("built-in default config must deserialize correctly")
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if !self.site.base_url.starts_with("http://") {
            return Err(ConfigError::Scheme(self.site.base_url.clone()));
        }
        self.picker.validate()
    }
}

// ---------------------------------------------------------------------------
// Path helpers
// ---------------------------------------------------------------------------

fn config_path() -> PathBuf {
    std::env::var("XDG_CONFIG_HOME")
        .map(PathBuf::from)
        .unwrap_or_else(|_| {
            PathBuf::from(std::env::var("HOME").unwrap_or_else(|_| ".".to_string()))
                .join(".config")
        })
        .join("wpick")
        .join("config.toml")
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use rstest::rstest;

    #[test]
    fn defaults_load() {
        let cfg = Config::defaults();
        assert_eq!(cfg.picker.source, SourceConfig::Posts);
        assert_eq!(cfg.picker.per_page, 20);
        assert_eq!(cfg.picker.quiet_window(), Duration::from_millis(500));
        assert_eq!(cfg.keybindings.query_focus, "/");
        assert!(cfg.validate().is_ok());
    }

    #[test]
    fn explicit_file_overrides_source() {
        let dir = tempfile::tempdir().unwrap();
        let file = dir.path().join("site.toml");
        std::fs::write(
            &file,
            "[picker]\nmulti = true\n\n[picker.source]\nkind = \"terms\"\ntaxonomy = \"post_tag\"\n",
        )
        .unwrap();

        let cfg: Config = config::Config::builder()
            .add_source(config::File::from_str(DEFAULT_CONFIG, config::FileFormat::Toml))
            .add_source(config::File::from(file.as_path()))
            .build()
            .unwrap()
            .try_deserialize()
            .unwrap();

        assert!(cfg.picker.multi);
        assert_eq!(cfg.picker.source.rest_base(), "tags");
        assert_eq!(cfg.picker.merge_policy(), MergePolicy::KeepFirst);
        assert_eq!(cfg.picker.min_query_chars(), 3);
    }

    #[rstest]
    #[case(SourceConfig::Posts, "posts")]
    #[case(SourceConfig::Pages, "pages")]
    #[case(SourceConfig::terms("category"), "categories")]
    #[case(SourceConfig::terms("post_tag"), "tags")]
    #[case(SourceConfig::terms("genre"), "genre")]
    #[case(SourceConfig::Terms { taxonomy: "genre".into(), rest_base: Some("genres".into()) }, "genres")]
    fn rest_base_mapping(#[case] source: SourceConfig, #[case] expected: &str) {
        assert_eq!(source.rest_base(), expected);
    }

    #[rstest]
    #[case(SourceConfig::Posts, false, "Select post...")]
    #[case(SourceConfig::Posts, true, "Select posts...")]
    #[case(SourceConfig::Pages, false, "Select page...")]
    #[case(SourceConfig::terms("category"), true, "Select terms...")]
    fn default_placeholders(#[case] source: SourceConfig, #[case] multi: bool, #[case] expected: &str) {
        let mut picker = PickerConfig::new(source);
        picker.multi = multi;
        assert_eq!(picker.placeholder(), expected);
    }

    #[rstest]
    #[case(0)]
    #[case(101)]
    fn per_page_out_of_range(#[case] per_page: u32) {
        let mut picker = PickerConfig::new(SourceConfig::Posts);
        picker.per_page = per_page;
        assert_eq!(picker.validate(), Err(ConfigError::PerPage(per_page)));
    }

    #[test]
    fn https_rejected() {
        let mut cfg = Config::defaults();
        cfg.site.base_url = "https://example.com".to_string();
        assert!(matches!(cfg.validate(), Err(ConfigError::Scheme(_))));
    }

    #[test]
    fn empty_taxonomy_rejected() {
        let picker = PickerConfig::new(SourceConfig::terms(""));
        assert_eq!(picker.validate(), Err(ConfigError::EmptyTaxonomy));
    }
}
