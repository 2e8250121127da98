//! Configuration management for notex.
//!
//! Loads configuration from ${NOTEX_HOME}/config.toml with sensible defaults.

use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::content::ViewMode;

/// Which backend serves the syllabus tree.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum CatalogProvider {
    /// Embedded sample catalog, notes saved to local files.
    #[default]
    Builtin,
    /// Remote PostgREST catalog, notes saved to its notes table.
    Http,
}

/// Catalog backend configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct CatalogConfig {
    /// Backend selector: "builtin" or "http".
    pub provider: CatalogProvider,
    /// Base URL of the HTTP catalog (PostgREST endpoint).
    pub base_url: Option<String>,
    /// Optional API key (overrides environment variable).
    pub api_key: Option<String>,
}

/// Notes generation configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GeneratorConfig {
    /// Gemini model used for generation.
    pub model: String,
    /// Optional API base URL (for proxies).
    pub base_url: Option<String>,
    /// Optional API key (overrides environment variable).
    pub api_key: Option<String>,
    /// Sampling temperature.
    pub temperature: f64,
    /// Top-k sampling cutoff.
    pub top_k: u32,
    /// Nucleus sampling cutoff.
    pub top_p: f64,
    /// Upper bound on generated tokens.
    pub max_output_tokens: u32,
}

impl Default for GeneratorConfig {
    fn default() -> Self {
        Self {
            model: Config::DEFAULT_GENERATOR_MODEL.to_string(),
            base_url: None,
            api_key: None,
            temperature: 0.7,
            top_k: 40,
            top_p: 0.95,
            max_output_tokens: 12000,
        }
    }
}

/// UI preferences persisted across runs.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct UiConfig {
    /// Initial projection of the notes pane.
    pub view_mode: ViewMode,
}

/// Main configuration structure.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Catalog backend configuration.
    pub catalog: CatalogConfig,

    /// Notes generation configuration.
    pub generator: GeneratorConfig,

    /// UI preferences.
    pub ui: UiConfig,
}

/// Returns the default config template with comments.
///
/// This is embedded from default_config.toml at compile time.
/// To update, edit default_config.toml directly.
fn default_config_template() -> &'static str {
    include_str!("../default_config.toml")
}

/// Merges user config values into the default template.
///
/// This ensures new comments/sections from the template are always present,
/// while preserving user's customized values.
fn merge_with_template(user_config: &str) -> Result<String> {
    use toml_edit::DocumentMut;

    let mut doc: DocumentMut = default_config_template()
        .parse()
        .context("Failed to parse default config template")?;

    let user_doc: DocumentMut = user_config.parse().context("Failed to parse user config")?;

    merge_items(doc.as_table_mut(), user_doc.as_table());

    Ok(doc.to_string())
}

/// Recursively merges items from source table into target table.
fn merge_items(target: &mut toml_edit::Table, source: &toml_edit::Table) {
    use toml_edit::Item;

    for (key, value) in source.iter() {
        match value {
            Item::Value(v) => {
                target[key] = Item::Value(v.clone());
            }
            Item::Table(src_table) => {
                if let Some(Item::Table(target_table)) = target.get_mut(key) {
                    merge_items(target_table, src_table);
                } else {
                    target[key] = Item::Table(src_table.clone());
                }
            }
            Item::ArrayOfTables(src_arr) => {
                target[key] = Item::ArrayOfTables(src_arr.clone());
            }
            Item::None => {}
        }
    }
}

pub mod paths {
    //! Path resolution for notex configuration and data directories.
    //!
    //! NOTEX_HOME resolution order:
    //! 1. NOTEX_HOME environment variable (if set)
    //! 2. ~/.config/notex (default)

    use std::path::PathBuf;

    /// Returns the notex home directory.
    ///
    /// Checks NOTEX_HOME env var first, falls back to ~/.config/notex
    pub fn notex_home() -> PathBuf {
        if let Ok(home) = std::env::var("NOTEX_HOME") {
            return PathBuf::from(home);
        }

        dirs::home_dir()
            .map(|h| h.join(".config").join("notex"))
            .expect("Could not determine home directory")
    }

    /// Returns the path to the config.toml file.
    pub fn config_path() -> PathBuf {
        notex_home().join("config.toml")
    }

    /// Returns the directory where the builtin catalog keeps saved notes.
    pub fn notes_dir() -> PathBuf {
        notex_home().join("notes")
    }

    /// Returns the directory for log files.
    pub fn logs_dir() -> PathBuf {
        notex_home().join("logs")
    }
}

impl Config {
    const DEFAULT_GENERATOR_MODEL: &str = "gemini-2.0-flash";

    /// Loads configuration from the default config path.
    pub fn load() -> Result<Self> {
        Self::load_from(&paths::config_path())
    }

    /// Loads configuration from a specific path.
    /// Returns defaults if file doesn't exist.
    pub fn load_from(path: &Path) -> Result<Self> {
        if path.exists() {
            let contents = fs::read_to_string(path)
                .with_context(|| format!("Failed to read config from {}", path.display()))?;
            toml::from_str(&contents)
                .with_context(|| format!("Failed to parse config from {}", path.display()))
        } else {
            Ok(Config::default())
        }
    }

    /// Saves only the view mode to the config file.
    ///
    /// Creates the file if it doesn't exist.
    /// Preserves existing fields and comments using toml_edit.
    pub fn save_view_mode(mode: ViewMode) -> Result<()> {
        Self::save_view_mode_to(&paths::config_path(), mode)
    }

    /// Saves only the view mode to a specific config file path.
    ///
    /// Creates the file with default template if it doesn't exist.
    /// If file exists, merges user values into the latest template.
    pub fn save_view_mode_to(path: &Path, mode: ViewMode) -> Result<()> {
        use toml_edit::{DocumentMut, value};

        let contents = if path.exists() {
            let user_config = fs::read_to_string(path)
                .with_context(|| format!("Failed to read config from {}", path.display()))?;
            merge_with_template(&user_config)?
        } else {
            default_config_template().to_string()
        };

        let mut doc: DocumentMut = contents
            .parse()
            .with_context(|| format!("Failed to parse config from {}", path.display()))?;

        doc["ui"]["view_mode"] = value(mode.id());

        Self::write_config(path, &doc.to_string())
    }

    /// Creates a default config file at the given path.
    /// Returns an error if the file already exists.
    pub fn init(path: &Path) -> Result<()> {
        if path.exists() {
            anyhow::bail!("Config file already exists at {}", path.display());
        }

        Self::write_config(path, default_config_template())
    }

    /// Writes config content to a file, creating parent directories as needed.
    /// Uses atomic write (temp file + rename) to prevent corruption.
    fn write_config(path: &Path, content: &str) -> Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create directory {}", parent.display()))?;
        }

        let tmp_path = path.with_extension("toml.tmp");
        fs::write(&tmp_path, content)
            .with_context(|| format!("Failed to write config to {}", tmp_path.display()))?;
        fs::rename(&tmp_path, path).with_context(|| {
            format!(
                "Failed to rename {} to {}",
                tmp_path.display(),
                path.display()
            )
        })?;

        Ok(())
    }
}

// ============================================================================
// Config resolution helpers
// ============================================================================

/// Resolves an API key with precedence: config > env.
///
/// # Arguments
/// * `config_api_key` - Value from config file (if present)
/// * `env_var` - Environment variable name (e.g., "`GEMINI_API_KEY`")
/// * `config_section` - Config section name (e.g., "generator")
///
/// # Errors
/// Returns an error if neither source provides a key.
pub fn resolve_api_key(
    config_api_key: Option<&str>,
    env_var: &str,
    config_section: &str,
) -> Result<String> {
    // Try config value first
    if let Some(key) = config_api_key {
        let trimmed = key.trim();
        if !trimmed.is_empty() {
            return Ok(trimmed.to_string());
        }
    }

    // Fall back to env var
    std::env::var(env_var).context(format!(
        "No API key available. Set {env_var} or api_key in [{config_section}]."
    ))
}

/// Resolves a base URL with precedence: env > config > default.
///
/// # Arguments
/// * `config_base_url` - Value from config file (if present)
/// * `env_var` - Environment variable name (e.g., "`GEMINI_BASE_URL`")
/// * `default_url` - Default URL if neither env nor config is set
/// * `service_name` - Human-readable service name for error messages
///
/// # Errors
/// Returns an error if a candidate URL fails to parse.
pub fn resolve_base_url(
    config_base_url: Option<&str>,
    env_var: &str,
    default_url: &str,
    service_name: &str,
) -> Result<String> {
    // Try env var first
    if let Ok(env_url) = std::env::var(env_var) {
        let trimmed = env_url.trim();
        if !trimmed.is_empty() {
            validate_url(trimmed, service_name)?;
            return Ok(trimmed.to_string());
        }
    }

    // Try config value
    if let Some(config_url) = config_base_url {
        let trimmed = config_url.trim();
        if !trimmed.is_empty() {
            validate_url(trimmed, service_name)?;
            return Ok(trimmed.to_string());
        }
    }

    // Default
    Ok(default_url.to_string())
}

/// Validates that a URL is well-formed.
fn validate_url(url: &str, service_name: &str) -> Result<()> {
    url::Url::parse(url).with_context(|| format!("Invalid {service_name} base URL: {url}"))?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use std::fs;

    use tempfile::tempdir;

    use super::*;

    /// Config loading: missing file returns defaults.
    #[test]
    fn test_load_missing_file_returns_defaults() {
        let dir = tempdir().unwrap();
        let config_path = dir.path().join("nonexistent.toml");

        let config = Config::load_from(&config_path).unwrap();
        assert_eq!(config.catalog.provider, CatalogProvider::Builtin);
        assert_eq!(config.generator.model, "gemini-2.0-flash");
        assert_eq!(config.ui.view_mode, ViewMode::Structured);
    }

    /// Config loading: partial config merges with defaults.
    #[test]
    fn test_load_partial_config_merges_defaults() {
        let dir = tempdir().unwrap();
        let config_path = dir.path().join("config.toml");

        fs::write(
            &config_path,
            "[generator]\nmodel = \"gemini-2.5-pro\"\n",
        )
        .unwrap();

        let config = Config::load_from(&config_path).unwrap();
        assert_eq!(config.generator.model, "gemini-2.5-pro");
        assert_eq!(config.generator.top_k, 40);
        assert_eq!(config.catalog.provider, CatalogProvider::Builtin);
    }

    /// Config loading: catalog section selects the HTTP backend.
    #[test]
    fn test_load_http_catalog_section() {
        let dir = tempdir().unwrap();
        let config_path = dir.path().join("config.toml");

        fs::write(
            &config_path,
            "[catalog]\nprovider = \"http\"\nbase_url = \"https://db.example.com/rest/v1\"\n",
        )
        .unwrap();

        let config = Config::load_from(&config_path).unwrap();
        assert_eq!(config.catalog.provider, CatalogProvider::Http);
        assert_eq!(
            config.catalog.base_url.as_deref(),
            Some("https://db.example.com/rest/v1")
        );
    }

    /// Config init: creates file with defaults, creates parent dirs.
    #[test]
    fn test_init_creates_config_with_defaults() {
        let dir = tempdir().unwrap();
        let config_path = dir.path().join("subdir").join("config.toml");

        Config::init(&config_path).unwrap();

        assert!(config_path.exists());
        let contents = fs::read_to_string(&config_path).unwrap();
        assert!(contents.contains("gemini-2.0-flash"));
        assert!(contents.contains("# base_url ="));

        // The template must round-trip through the typed loader.
        let config = Config::load_from(&config_path).unwrap();
        assert_eq!(config.catalog.provider, CatalogProvider::Builtin);
    }

    /// Config init: fails if file exists (no silent overwrite).
    #[test]
    fn test_init_fails_if_exists() {
        let dir = tempdir().unwrap();
        let config_path = dir.path().join("config.toml");

        fs::write(&config_path, "").unwrap();

        let result = Config::init(&config_path);
        assert!(result.is_err());
    }

    /// save_view_mode: creates new config file with template if it doesn't exist.
    #[test]
    fn test_save_view_mode_creates_file_with_template() {
        let dir = tempdir().unwrap();
        let config_path = dir.path().join("config.toml");

        Config::save_view_mode_to(&config_path, ViewMode::Raw).unwrap();

        assert!(config_path.exists());

        let config = Config::load_from(&config_path).unwrap();
        assert_eq!(config.ui.view_mode, ViewMode::Raw);

        // Template comments are preserved
        let contents = fs::read_to_string(&config_path).unwrap();
        assert!(contents.contains("# Notex Configuration"));
    }

    /// save_view_mode: preserves other fields in existing config.
    #[test]
    fn test_save_view_mode_preserves_other_fields() {
        let dir = tempdir().unwrap();
        let config_path = dir.path().join("config.toml");

        fs::write(
            &config_path,
            r#"[catalog]
provider = "http"
base_url = "https://db.example.com/rest/v1"

[generator]
temperature = 0.2
"#,
        )
        .unwrap();

        Config::save_view_mode_to(&config_path, ViewMode::Raw).unwrap();

        let config = Config::load_from(&config_path).unwrap();
        assert_eq!(config.ui.view_mode, ViewMode::Raw);
        assert_eq!(config.catalog.provider, CatalogProvider::Http); // preserved
        assert_eq!(config.generator.temperature, 0.2); // preserved
    }

    /// resolve_api_key: config value wins over environment.
    #[test]
    fn test_resolve_api_key_config_wins() {
        let key = resolve_api_key(Some("  from-config  "), "NOTEX_TEST_UNSET_KEY", "catalog");
        assert_eq!(key.unwrap(), "from-config");
    }

    /// resolve_api_key: empty config value falls through to env.
    #[test]
    fn test_resolve_api_key_env_fallback() {
        unsafe { std::env::set_var("NOTEX_TEST_FALLBACK_KEY", "from-env") };
        let key = resolve_api_key(Some("   "), "NOTEX_TEST_FALLBACK_KEY", "catalog");
        assert_eq!(key.unwrap(), "from-env");
    }

    /// resolve_api_key: missing everywhere names the sources in the error.
    #[test]
    fn test_resolve_api_key_missing_mentions_sources() {
        let err = resolve_api_key(None, "NOTEX_TEST_MISSING_KEY", "generator").unwrap_err();
        let message = err.to_string();
        assert!(message.contains("NOTEX_TEST_MISSING_KEY"));
        assert!(message.contains("[generator]"));
    }

    /// resolve_base_url: falls back to default, rejects malformed overrides.
    #[test]
    fn test_resolve_base_url_default_and_validation() {
        let url = resolve_base_url(None, "NOTEX_TEST_UNSET_URL", "https://api.test", "gemini");
        assert_eq!(url.unwrap(), "https://api.test");

        let err = resolve_base_url(
            Some("not a url"),
            "NOTEX_TEST_UNSET_URL",
            "https://api.test",
            "gemini",
        );
        assert!(err.is_err());
    }
}
