//! # Configuration
//!
//! Centralizes all settings with a clear override hierarchy:
//! defaults → config file → env vars → CLI flags.
//!
//! Config lives at `~/.edubot/config.toml` (or `<state-dir>/config.toml`). If
//! missing on first run, a commented-out default is generated so users can
//! discover all options.

use log::{debug, info, warn};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::core::study::{DEFAULT_FLASHCARDS, DEFAULT_QUIZ_QUESTIONS};
use crate::core::upload::DEFAULT_SUBJECT;

// ============================================================================
// Config Structs (all fields Option<T> for sparse TOML)
// ============================================================================

#[derive(Debug, Default, Deserialize, Serialize)]
pub struct EduBotConfig {
    #[serde(default)]
    pub general: GeneralConfig,
    #[serde(default)]
    pub uploads: UploadsConfig,
    #[serde(default)]
    pub study: StudyConfig,
}

#[derive(Debug, Default, Deserialize, Serialize)]
pub struct GeneralConfig {
    pub server_url: Option<String>,
    pub request_timeout_secs: Option<u64>,
    pub session_refresh_secs: Option<u64>,
}

#[derive(Debug, Default, Deserialize, Serialize)]
pub struct UploadsConfig {
    pub default_subject: Option<String>,
    pub cleanup_delay_ms: Option<u64>,
    pub banner_ms: Option<u64>,
}

#[derive(Debug, Default, Deserialize, Serialize)]
pub struct StudyConfig {
    pub status_ms: Option<u64>,
    pub quiz_questions: Option<u32>,
    pub flashcards: Option<u32>,
}

// ============================================================================
// Defaults
// ============================================================================

pub const DEFAULT_SERVER_URL: &str = "http://127.0.0.1:5000";
pub const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 60;
pub const DEFAULT_SESSION_REFRESH_SECS: u64 = 30;
pub const DEFAULT_CLEANUP_DELAY_MS: u64 = 3000;
pub const DEFAULT_UPLOAD_BANNER_MS: u64 = 5000;
pub const DEFAULT_STATUS_MS: u64 = 3000;

pub const SERVER_URL_ENV: &str = "EDUBOT_SERVER_URL";

// ============================================================================
// Resolved Config (concrete values, no Options)
// ============================================================================

#[derive(Debug, Clone, PartialEq)]
pub struct ResolvedConfig {
    pub server_url: String,
    pub request_timeout: Duration,
    /// `None` disables periodic refresh.
    pub session_refresh: Option<Duration>,
    pub default_subject: String,
    pub upload_cleanup_delay: Duration,
    pub upload_banner: Duration,
    pub status_banner: Duration,
    pub quiz_questions: u32,
    pub flashcards: u32,
}

impl Default for ResolvedConfig {
    fn default() -> Self {
        resolve_from(&EduBotConfig::default(), None, None)
    }
}

// ============================================================================
// Error Type
// ============================================================================

#[derive(Debug)]
pub enum ConfigError {
    Io(std::io::Error),
    Parse(toml::de::Error),
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::Io(e) => write!(f, "config I/O error: {e}"),
            ConfigError::Parse(e) => write!(f, "config parse error: {e}"),
        }
    }
}

impl std::error::Error for ConfigError {}

// ============================================================================
// Loading
// ============================================================================

/// Returns `~/.edubot/`, the home of config, state and log files.
pub fn default_state_dir() -> Option<PathBuf> {
    dirs::home_dir().map(|h| h.join(".edubot"))
}

/// Load config from `<dir>/config.toml`.
///
/// If the file doesn't exist, generates a commented-out default and
/// returns `EduBotConfig::default()`. If it exists but is malformed,
/// returns `ConfigError::Parse`.
pub fn load_config(dir: &Path) -> Result<EduBotConfig, ConfigError> {
    let path = dir.join("config.toml");

    if !path.exists() {
        info!("No config file found, generating default at {}", path.display());
        generate_default_config(&path);
        return Ok(EduBotConfig::default());
    }

    let contents = fs::read_to_string(&path).map_err(ConfigError::Io)?;
    let config: EduBotConfig = toml::from_str(&contents).map_err(ConfigError::Parse)?;
    info!("Loaded config from {}", path.display());
    debug!("Config: {:?}", config);
    Ok(config)
}

/// Like [`load_config`], but a broken file only costs a warning.
pub fn load_config_or_default(dir: &Path) -> EduBotConfig {
    load_config(dir).unwrap_or_else(|e| {
        warn!("Ignoring config file, using defaults: {}", e);
        EduBotConfig::default()
    })
}

fn generate_default_config(path: &Path) {
    let default_content = r#"# EduBot Configuration
# All settings are optional; defaults are used for anything not specified.
# Override hierarchy: defaults → this file → env vars → CLI flags.

# [general]
# server_url = "http://127.0.0.1:5000"   # Or EDUBOT_SERVER_URL / --server-url
# request_timeout_secs = 60
# session_refresh_secs = 30              # 0 disables the periodic session-list refresh

# [uploads]
# default_subject = "General Studies"
# cleanup_delay_ms = 3000                # Preview cleared this long after an upload settles
# banner_ms = 5000

# [study]
# status_ms = 3000
# quiz_questions = 5                     # 1..=20
# flashcards = 10                        # max 20
"#;

    if let Some(parent) = path.parent()
        && let Err(e) = fs::create_dir_all(parent)
    {
        warn!("Failed to create config directory: {}", e);
        return;
    }
    if let Err(e) = fs::write(path, default_content) {
        warn!("Failed to write default config: {}", e);
    }
}

// ============================================================================
// Resolution
// ============================================================================

/// Resolve the final config by collapsing: defaults → config file → env vars → CLI.
pub fn resolve(config: &EduBotConfig, cli_server_url: Option<&str>) -> ResolvedConfig {
    resolve_from(config, cli_server_url, std::env::var(SERVER_URL_ENV).ok())
}

fn resolve_from(
    config: &EduBotConfig,
    cli_server_url: Option<&str>,
    env_server_url: Option<String>,
) -> ResolvedConfig {
    // Server URL: CLI → env → config → default
    let server_url = cli_server_url
        .map(|s| s.to_string())
        .or(env_server_url)
        .filter(|s| !s.trim().is_empty())
        .or_else(|| config.general.server_url.clone())
        .unwrap_or_else(|| DEFAULT_SERVER_URL.to_string());

    let session_refresh = match config
        .general
        .session_refresh_secs
        .unwrap_or(DEFAULT_SESSION_REFRESH_SECS)
    {
        0 => None,
        secs => Some(Duration::from_secs(secs)),
    };

    let default_subject = config
        .uploads
        .default_subject
        .as_deref()
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .unwrap_or(DEFAULT_SUBJECT)
        .to_string();

    ResolvedConfig {
        server_url,
        request_timeout: Duration::from_secs(
            config
                .general
                .request_timeout_secs
                .unwrap_or(DEFAULT_REQUEST_TIMEOUT_SECS),
        ),
        session_refresh,
        default_subject,
        upload_cleanup_delay: Duration::from_millis(
            config
                .uploads
                .cleanup_delay_ms
                .unwrap_or(DEFAULT_CLEANUP_DELAY_MS),
        ),
        upload_banner: Duration::from_millis(
            config.uploads.banner_ms.unwrap_or(DEFAULT_UPLOAD_BANNER_MS),
        ),
        status_banner: Duration::from_millis(config.study.status_ms.unwrap_or(DEFAULT_STATUS_MS)),
        quiz_questions: config
            .study
            .quiz_questions
            .unwrap_or(DEFAULT_QUIZ_QUESTIONS as u32),
        flashcards: config.study.flashcards.unwrap_or(DEFAULT_FLASHCARDS as u32),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_resolve_uses_defaults_when_empty() {
        let resolved = resolve_from(&EduBotConfig::default(), None, None);
        assert_eq!(resolved.server_url, DEFAULT_SERVER_URL);
        assert_eq!(resolved.request_timeout, Duration::from_secs(60));
        assert_eq!(resolved.session_refresh, Some(Duration::from_secs(30)));
        assert_eq!(resolved.default_subject, "General Studies");
        assert_eq!(resolved.upload_cleanup_delay, Duration::from_millis(3000));
        assert_eq!(resolved.upload_banner, Duration::from_millis(5000));
        assert_eq!(resolved.status_banner, Duration::from_millis(3000));
        assert_eq!(resolved.quiz_questions, 5);
        assert_eq!(resolved.flashcards, 10);
    }

    #[test]
    fn test_server_url_precedence() {
        let config = EduBotConfig {
            general: GeneralConfig {
                server_url: Some("http://from-file:5000".to_string()),
                ..Default::default()
            },
            ..Default::default()
        };
        assert_eq!(resolve_from(&config, None, None).server_url, "http://from-file:5000");
        assert_eq!(
            resolve_from(&config, None, Some("http://from-env:5000".into())).server_url,
            "http://from-env:5000"
        );
        assert_eq!(
            resolve_from(&config, Some("http://from-cli:5000"), Some("http://from-env:5000".into()))
                .server_url,
            "http://from-cli:5000"
        );
    }

    #[test]
    fn test_zero_refresh_disables() {
        let config = EduBotConfig {
            general: GeneralConfig {
                session_refresh_secs: Some(0),
                ..Default::default()
            },
            ..Default::default()
        };
        assert_eq!(resolve_from(&config, None, None).session_refresh, None);
    }

    #[test]
    fn test_blank_default_subject_ignored() {
        let config = EduBotConfig {
            uploads: UploadsConfig {
                default_subject: Some("   ".to_string()),
                ..Default::default()
            },
            ..Default::default()
        };
        assert_eq!(resolve_from(&config, None, None).default_subject, DEFAULT_SUBJECT);
    }

    #[test]
    fn test_sparse_toml_parses() {
        let toml_str = r#"
[uploads]
default_subject = "Biology"

[study]
flashcards = 15
"#;
        let config: EduBotConfig = toml::from_str(toml_str).unwrap();
        assert_eq!(config.uploads.default_subject.as_deref(), Some("Biology"));
        assert_eq!(config.study.flashcards, Some(15));
        assert!(config.general.server_url.is_none());
        assert!(config.study.quiz_questions.is_none());
    }

    #[test]
    fn test_missing_file_generates_commented_default() {
        let dir = std::env::temp_dir().join(format!("edubot-config-{}", std::process::id()));
        let _ = fs::remove_dir_all(&dir);

        let config = load_config(&dir).unwrap();
        assert!(config.general.server_url.is_none());

        let generated = fs::read_to_string(dir.join("config.toml")).unwrap();
        assert!(generated.contains("# server_url"));
        // Everything is commented out, so it parses back to the defaults.
        let reparsed: EduBotConfig = toml::from_str(&generated).unwrap();
        assert!(reparsed.uploads.default_subject.is_none());

        let _ = fs::remove_dir_all(&dir);
    }

    #[test]
    fn test_malformed_file_falls_back() {
        let dir = std::env::temp_dir().join(format!("edubot-badconfig-{}", std::process::id()));
        fs::create_dir_all(&dir).unwrap();
        fs::write(dir.join("config.toml"), "[general\nserver_url = ").unwrap();

        assert!(matches!(load_config(&dir), Err(ConfigError::Parse(_))));
        let config = load_config_or_default(&dir);
        assert!(config.general.server_url.is_none());

        let _ = fs::remove_dir_all(&dir);
    }
}
