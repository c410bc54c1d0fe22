//! Configuration loading and config file resolution
//!
//! Settings come from a TOML file whose sections are all optional:
//!
//! ```toml
//! [server]
//! host = "127.0.0.1"
//! port = 5780
//!
//! [recommendation]
//! alpha_audio = 0.7
//! top_k = 5
//!
//! [evidence]
//! timeout_ms = 10000
//! text_classifier = "remote"
//! text_url = "http://127.0.0.1:8000/analyze/text"
//! text_label_table = "canonical"
//!
//! [catalog]
//! path = "/srv/mindmood/content_items.json"
//! ```
//!
//! Missing files are not fatal (warning + defaults); malformed files are.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use tracing::{info, warn};

use crate::fusion::DEFAULT_ALPHA_AUDIO;
use crate::vocabulary::LabelRemapTable;
use crate::{Error, Result};

/// Environment variable naming the config file
pub const CONFIG_ENV_VAR: &str = "MINDMOOD_CONFIG";

/// Default HTTP port for the recommender
pub const DEFAULT_PORT: u16 = 5780;

/// Root of the TOML configuration file
#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct TomlConfig {
    pub server: ServerConfig,
    pub recommendation: RecommendationConfig,
    pub evidence: EvidenceConfig,
    pub catalog: CatalogConfig,
    pub logging: LoggingConfig,
}

/// `[server]` section
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    /// Upper bound on request bodies (audio uploads)
    pub max_upload_bytes: usize,
    /// Allow any origin (browser front-ends during development)
    pub cors_permissive: bool,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: DEFAULT_PORT,
            max_upload_bytes: 10 * 1024 * 1024,
            cors_permissive: true,
        }
    }
}

/// `[recommendation]` section: per-request defaults
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct RecommendationConfig {
    pub alpha_audio: f64,
    pub top_k: usize,
    pub include_diagnostics: bool,
}

impl Default for RecommendationConfig {
    fn default() -> Self {
        Self {
            alpha_audio: DEFAULT_ALPHA_AUDIO,
            top_k: 5,
            include_diagnostics: true,
        }
    }
}

/// Which text evidence source to construct at startup
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum TextClassifierKind {
    /// Built-in keyword heuristic
    Keyword,
    /// External model server at `text_url`
    Remote,
    /// Text input is always unavailable
    None,
}

/// `[evidence]` section
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct EvidenceConfig {
    /// Per-source deadline; a slower source is treated as unavailable
    pub timeout_ms: u64,
    pub text_classifier: TextClassifierKind,
    pub text_url: Option<String>,
    /// Built-in table for the remote text model's labels
    pub text_label_table: String,
    /// Custom table (external label → canonical class); overrides `text_label_table`
    pub text_labels: Option<HashMap<String, String>>,
    /// External audio model server; audio input is unavailable when unset
    pub audio_url: Option<String>,
    pub audio_label_table: String,
    pub audio_labels: Option<HashMap<String, String>>,
}

impl Default for EvidenceConfig {
    fn default() -> Self {
        Self {
            timeout_ms: 10_000,
            text_classifier: TextClassifierKind::Keyword,
            text_url: None,
            text_label_table: "distilroberta".to_string(),
            text_labels: None,
            audio_url: None,
            audio_label_table: "canonical".to_string(),
            audio_labels: None,
        }
    }
}

impl EvidenceConfig {
    /// Remap table for the remote text classifier
    pub fn text_table(&self) -> Result<LabelRemapTable> {
        Self::resolve_table(self.text_labels.as_ref(), &self.text_label_table)
    }

    /// Remap table for the remote audio classifier
    pub fn audio_table(&self) -> Result<LabelRemapTable> {
        Self::resolve_table(self.audio_labels.as_ref(), &self.audio_label_table)
    }

    fn resolve_table(
        custom: Option<&HashMap<String, String>>,
        named: &str,
    ) -> Result<LabelRemapTable> {
        match custom {
            Some(entries) => LabelRemapTable::from_entries(entries),
            None => LabelRemapTable::named(named),
        }
    }
}

/// `[catalog]` section
#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct CatalogConfig {
    /// Catalog file (.json or .toml); the built-in sample catalog when unset
    pub path: Option<PathBuf>,
}

/// `[logging]` section
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Default tracing filter when RUST_LOG is unset
    pub level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
        }
    }
}

impl TomlConfig {
    /// Parse configuration from TOML text
    pub fn from_toml_str(content: &str) -> Result<Self> {
        toml::from_str(content).map_err(|e| Error::Config(format!("Parse TOML failed: {}", e)))
    }

    /// Check cross-field constraints
    ///
    /// Also builds the configured label tables so a malformed table aborts
    /// startup instead of failing on the first request.
    pub fn validate(&self) -> Result<()> {
        let alpha = self.recommendation.alpha_audio;
        if !(0.0..=1.0).contains(&alpha) {
            return Err(Error::Config(format!(
                "recommendation.alpha_audio must be within [0, 1], got {}",
                alpha
            )));
        }

        if self.recommendation.top_k == 0 {
            return Err(Error::Config(
                "recommendation.top_k must be at least 1".to_string(),
            ));
        }

        if self.evidence.timeout_ms == 0 {
            return Err(Error::Config(
                "evidence.timeout_ms must be greater than 0".to_string(),
            ));
        }

        if self.evidence.text_classifier == TextClassifierKind::Remote {
            if self.evidence.text_url.is_none() {
                return Err(Error::Config(
                    "evidence.text_url is required when text_classifier = \"remote\"".to_string(),
                ));
            }
            self.evidence.text_table()?;
        }

        if self.evidence.audio_url.is_some() {
            self.evidence.audio_table()?;
        }

        Ok(())
    }
}

/// Config file resolution following priority order:
/// 1. Command-line argument (highest priority)
/// 2. Environment variable (`MINDMOOD_CONFIG`)
/// 3. Platform config directory (`<config_dir>/mindmood/mindmood.toml`), if it exists
///
/// Returns `None` when no file applies; the caller then runs on defaults.
pub fn resolve_config_path(cli_arg: Option<&Path>) -> Option<PathBuf> {
    // Priority 1: Command-line argument
    if let Some(path) = cli_arg {
        return Some(path.to_path_buf());
    }

    // Priority 2: Environment variable
    if let Ok(path) = std::env::var(CONFIG_ENV_VAR) {
        if !path.trim().is_empty() {
            return Some(PathBuf::from(path));
        }
    }

    // Priority 3: Platform default, only when present
    default_config_path().filter(|path| path.exists())
}

/// Platform config file location
pub fn default_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|d| d.join("mindmood").join("mindmood.toml"))
}

/// Load and validate configuration
///
/// - `None`: compiled defaults
/// - Path that does not exist: warning + compiled defaults
/// - Path that exists but fails to parse or validate: error
pub fn load_config(path: Option<&Path>) -> Result<TomlConfig> {
    let config = match path {
        None => {
            info!("No config file found, using defaults");
            TomlConfig::default()
        }
        Some(path) if !path.exists() => {
            warn!(
                "Config file {} not found, using defaults",
                path.display()
            );
            TomlConfig::default()
        }
        Some(path) => {
            let content = std::fs::read_to_string(path).map_err(|e| {
                Error::Config(format!("Read {} failed: {}", path.display(), e))
            })?;
            let config = TomlConfig::from_toml_str(&content)?;
            info!("Loaded config from {}", path.display());
            config
        }
    };

    config.validate()?;
    Ok(config)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_are_valid() {
        let config = TomlConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.server.port, DEFAULT_PORT);
        assert_eq!(config.recommendation.alpha_audio, 0.7);
        assert_eq!(config.recommendation.top_k, 5);
        assert_eq!(config.evidence.text_classifier, TextClassifierKind::Keyword);
        assert!(config.catalog.path.is_none());
    }

    #[test]
    fn test_partial_file_fills_defaults() {
        let config = TomlConfig::from_toml_str(
            r#"
            [server]
            port = 6000

            [evidence]
            text_classifier = "none"
            "#,
        )
        .unwrap();

        assert_eq!(config.server.port, 6000);
        assert_eq!(config.server.host, "127.0.0.1");
        assert_eq!(config.evidence.text_classifier, TextClassifierKind::None);
        assert_eq!(config.evidence.timeout_ms, 10_000);
        assert_eq!(config.logging.level, "info");
    }

    #[test]
    fn test_invalid_alpha_rejected() {
        let mut config = TomlConfig::default();
        config.recommendation.alpha_audio = 1.2;
        assert!(matches!(config.validate(), Err(Error::Config(_))));
    }

    #[test]
    fn test_zero_top_k_rejected() {
        let mut config = TomlConfig::default();
        config.recommendation.top_k = 0;
        assert!(matches!(config.validate(), Err(Error::Config(_))));
    }

    #[test]
    fn test_remote_text_requires_url() {
        let mut config = TomlConfig::default();
        config.evidence.text_classifier = TextClassifierKind::Remote;
        assert!(config.validate().is_err());

        config.evidence.text_url = Some("http://127.0.0.1:8000/analyze/text".to_string());
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_custom_label_table_overrides_named() {
        let config = TomlConfig::from_toml_str(
            r#"
            [evidence]
            text_label_table = "no-such-table"

            [evidence.text_labels]
            happy = "Amused"
            furious = "Angry"
            "#,
        )
        .unwrap();

        let table = config.evidence.text_table().unwrap();
        assert_eq!(table.len(), 2);
        assert_eq!(
            table.target_of("furious"),
            Some(crate::emotion::EmotionClass::Angry)
        );
    }

    #[test]
    fn test_malformed_label_table_fails_validation() {
        let config = TomlConfig::from_toml_str(
            r#"
            [evidence]
            text_classifier = "remote"
            text_url = "http://127.0.0.1:8000/analyze/text"

            [evidence.text_labels]
            happy = "Joyful"
            "#,
        )
        .unwrap();

        assert!(matches!(config.validate(), Err(Error::UnknownClass(_))));
    }

    #[test]
    fn test_unknown_classifier_kind_is_parse_error() {
        let result = TomlConfig::from_toml_str(
            r#"
            [evidence]
            text_classifier = "bert"
            "#,
        );
        assert!(matches!(result, Err(Error::Config(_))));
    }
}
