//! # Configuration
//!
//! Centralizes all settings with a clear override hierarchy:
//! defaults → config file → env vars → CLI flags.
//!
//! Config lives at `~/.shopchat/config.toml`. If missing on first run, a
//! commented-out default is generated so users can discover all options.

use log::{debug, info, warn};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::fs;
use std::path::PathBuf;
use std::time::Duration;

// ============================================================================
// Config Structs (all fields Option<T> for sparse TOML)
// ============================================================================

#[derive(Debug, Default, Deserialize, Serialize)]
pub struct ShopChatConfig {
    #[serde(default)]
    pub general: GeneralConfig,
    #[serde(default)]
    pub display: DisplayConfig,
}

#[derive(Debug, Default, Deserialize, Serialize)]
pub struct GeneralConfig {
    pub api_url: Option<String>,
    pub request_timeout_secs: Option<u64>,
    pub log_file: Option<String>,
}

#[derive(Debug, Default, Deserialize, Serialize)]
pub struct DisplayConfig {
    pub animate: Option<bool>,
    pub reveal_interval_ms: Option<u64>,
    pub probe_images: Option<bool>,
}

/// Values given on the command line. `None`/`false` means "not specified".
#[derive(Debug, Default, Clone)]
pub struct CliOverrides {
    pub api_url: Option<String>,
    pub no_animate: bool,
    pub no_images: bool,
}

// ============================================================================
// Defaults
// ============================================================================

pub const DEFAULT_API_URL: &str = "http://127.0.0.1:5000";
pub const DEFAULT_LOG_FILE: &str = "shopchat.log";
pub const DEFAULT_REVEAL_INTERVAL_MS: u64 = 15;
pub const API_URL_ENV: &str = "SHOPCHAT_API_URL";

// ============================================================================
// Resolved Config (concrete values, no Options)
// ============================================================================

#[derive(Debug, Clone)]
pub struct ResolvedConfig {
    pub api_url: String,
    /// `None` leaves the HTTP client without a request timeout.
    pub request_timeout: Option<Duration>,
    pub log_file: String,
    pub animate: bool,
    pub reveal_interval: Duration,
    pub probe_images: bool,
}

impl Default for ResolvedConfig {
    fn default() -> Self {
        resolve(&ShopChatConfig::default(), &CliOverrides::default())
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

/// Returns the path to `~/.shopchat/config.toml`.
pub fn config_path() -> Option<PathBuf> {
    dirs::home_dir().map(|h| h.join(".shopchat").join("config.toml"))
}

/// Load config from `~/.shopchat/config.toml`.
///
/// If the file doesn't exist, generates a commented-out default and
/// returns `ShopChatConfig::default()`. If it exists but is malformed,
/// returns `ConfigError::Parse`.
pub fn load_config() -> Result<ShopChatConfig, ConfigError> {
    let path = match config_path() {
        Some(p) => p,
        None => {
            warn!("Could not determine home directory, using default config");
            return Ok(ShopChatConfig::default());
        }
    };

    if !path.exists() {
        info!("No config file found, generating default at {}", path.display());
        generate_default_config(&path);
        return Ok(ShopChatConfig::default());
    }

    let contents = fs::read_to_string(&path).map_err(ConfigError::Io)?;
    let config = parse_config(&contents)?;
    info!("Loaded config from {}", path.display());
    debug!("Config: {:?}", config);
    Ok(config)
}

pub fn parse_config(contents: &str) -> Result<ShopChatConfig, ConfigError> {
    toml::from_str(contents).map_err(ConfigError::Parse)
}

fn generate_default_config(path: &PathBuf) {
    let default_content = r#"# shopchat configuration
# All settings are optional; defaults are used for anything not specified.
# Override hierarchy: defaults → this file → env vars → CLI flags.

# [general]
# api_url = "http://127.0.0.1:5000"   # Or set SHOPCHAT_API_URL, or pass --api-url
# request_timeout_secs = 30           # Unset = no timeout
# log_file = "shopchat.log"

# [display]
# animate = true                      # Typewriter reveal of bot replies (--no-animate)
# reveal_interval_ms = 15
# probe_images = true                 # Check product image URLs (--no-images)
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
pub fn resolve(config: &ShopChatConfig, cli: &CliOverrides) -> ResolvedConfig {
    // API URL: CLI → env → config → default
    let api_url = cli
        .api_url
        .clone()
        .or_else(|| std::env::var(API_URL_ENV).ok().filter(|s| !s.is_empty()))
        .or_else(|| config.general.api_url.clone())
        .unwrap_or_else(|| DEFAULT_API_URL.to_string());

    let animate = !cli.no_animate && config.display.animate.unwrap_or(true);
    let probe_images = !cli.no_images && config.display.probe_images.unwrap_or(true);

    ResolvedConfig {
        api_url: api_url.trim_end_matches('/').to_string(),
        request_timeout: config
            .general
            .request_timeout_secs
            .filter(|secs| *secs > 0)
            .map(Duration::from_secs),
        log_file: config
            .general
            .log_file
            .clone()
            .unwrap_or_else(|| DEFAULT_LOG_FILE.to_string()),
        animate,
        reveal_interval: Duration::from_millis(
            config
                .display
                .reveal_interval_ms
                .unwrap_or(DEFAULT_REVEAL_INTERVAL_MS)
                .max(1),
        ),
        probe_images,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_parses() {
        let config = ShopChatConfig::default();
        assert!(config.general.api_url.is_none());
        assert!(config.display.animate.is_none());
    }

    #[test]
    fn test_resolve_uses_defaults_when_empty() {
        let resolved = resolve(&ShopChatConfig::default(), &CliOverrides::default());
        assert!(resolved.animate);
        assert!(resolved.probe_images);
        assert_eq!(resolved.request_timeout, None);
        assert_eq!(resolved.log_file, DEFAULT_LOG_FILE);
        assert_eq!(
            resolved.reveal_interval,
            Duration::from_millis(DEFAULT_REVEAL_INTERVAL_MS)
        );
    }

    #[test]
    fn test_resolve_config_values_override_defaults() {
        let config = ShopChatConfig {
            general: GeneralConfig {
                api_url: Some("http://shop.internal:8080/".to_string()),
                request_timeout_secs: Some(30),
                log_file: Some("/tmp/chat.log".to_string()),
            },
            display: DisplayConfig {
                animate: Some(false),
                reveal_interval_ms: Some(40),
                probe_images: Some(false),
            },
        };
        let cli = CliOverrides {
            api_url: Some("http://shop.internal:8080/".to_string()),
            ..Default::default()
        };
        let resolved = resolve(&config, &cli);
        assert_eq!(resolved.api_url, "http://shop.internal:8080");
        assert_eq!(resolved.request_timeout, Some(Duration::from_secs(30)));
        assert_eq!(resolved.log_file, "/tmp/chat.log");
        assert!(!resolved.animate);
        assert!(!resolved.probe_images);
        assert_eq!(resolved.reveal_interval, Duration::from_millis(40));
    }

    #[test]
    fn test_resolve_cli_api_url_wins() {
        let config = ShopChatConfig {
            general: GeneralConfig {
                api_url: Some("http://from-config:5000".to_string()),
                ..Default::default()
            },
            ..Default::default()
        };
        let cli = CliOverrides {
            api_url: Some("http://from-cli:5000".to_string()),
            ..Default::default()
        };
        assert_eq!(resolve(&config, &cli).api_url, "http://from-cli:5000");
    }

    #[test]
    fn test_cli_flags_disable_features() {
        let config = ShopChatConfig {
            display: DisplayConfig {
                animate: Some(true),
                probe_images: Some(true),
                ..Default::default()
            },
            ..Default::default()
        };
        let cli = CliOverrides {
            no_animate: true,
            no_images: true,
            ..Default::default()
        };
        let resolved = resolve(&config, &cli);
        assert!(!resolved.animate);
        assert!(!resolved.probe_images);
    }

    #[test]
    fn test_zero_timeout_means_none() {
        let config = ShopChatConfig {
            general: GeneralConfig {
                request_timeout_secs: Some(0),
                ..Default::default()
            },
            ..Default::default()
        };
        assert_eq!(resolve(&config, &CliOverrides::default()).request_timeout, None);
    }

    #[test]
    fn test_toml_round_trip() {
        let toml_str = r#"
[general]
api_url = "http://localhost:5000"
request_timeout_secs = 20

[display]
animate = false
reveal_interval_ms = 30
"#;
        let config = parse_config(toml_str).unwrap();
        assert_eq!(config.general.api_url.as_deref(), Some("http://localhost:5000"));
        assert_eq!(config.general.request_timeout_secs, Some(20));
        assert_eq!(config.display.animate, Some(false));
        assert_eq!(config.display.reveal_interval_ms, Some(30));
        assert!(config.display.probe_images.is_none());
    }

    #[test]
    fn test_sparse_toml_parses() {
        // Only override one thing; everything else stays default
        let config = parse_config("[display]\nprobe_images = false\n").unwrap();
        assert_eq!(config.display.probe_images, Some(false));
        assert!(config.general.api_url.is_none());
    }

    #[test]
    fn test_malformed_toml_is_parse_error() {
        let err = parse_config("[general\napi_url = ").unwrap_err();
        assert!(matches!(err, ConfigError::Parse(_)));
        assert!(err.to_string().starts_with("config parse error"));
    }
}
