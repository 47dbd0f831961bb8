//! Configuration loading and root folder resolution
//!
//! Bootstrap configuration comes from a TOML file. Individual values can be
//! overridden from the environment or the command line:
//! 1. Command-line argument (highest priority)
//! 2. Environment variable
//! 3. TOML config file
//! 4. Compiled default (fallback)

use crate::{Error, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};
use tracing::{info, warn};

/// Environment variable overriding the root folder
pub const ROOT_FOLDER_ENV: &str = "STYLEMATE_ROOT_FOLDER";

/// Environment variables holding the Gemini API key, highest priority first
pub const GEMINI_API_KEY_ENVS: [&str; 2] = ["STYLEMATE_GEMINI_API_KEY", "GEMINI_API_KEY"];

/// File name of the per-device Local Store
pub const LOCAL_DB_FILE: &str = "stylemate.db";

/// File name of the Remote Collection API database
pub const SERVER_DB_FILE: &str = "stylemate-server.db";

/// Default HTTP port for stylemate-server
pub const DEFAULT_PORT: u16 = 5730;

/// Default request body limit (10 MiB)
pub const DEFAULT_MAX_BODY_BYTES: usize = 10 * 1024 * 1024;

/// Bootstrap configuration loaded from TOML
///
/// Every field is optional; a missing file is equivalent to an empty one.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct TomlConfig {
    /// Folder holding the database files
    pub root_folder: Option<PathBuf>,

    /// HTTP server port (stylemate-server only)
    pub port: Option<u16>,

    /// Maximum accepted request body in bytes (stylemate-server only)
    pub max_body_bytes: Option<usize>,

    pub logging: LoggingConfig,

    pub gemini: GeminiConfig,

    pub auth: AuthConfig,
}

/// Logging configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error)
    pub level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
        }
    }
}

/// Generative model settings
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct GeminiConfig {
    pub api_key: Option<String>,
    /// Model name, e.g. "gemini-2.5-flash"
    pub model: Option<String>,
    /// API base URL (override for testing or proxies)
    pub base_url: Option<String>,
}

/// Identity token settings (stylemate-server only)
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct AuthConfig {
    /// HS256 secret used to verify bearer tokens
    pub jwt_secret: Option<String>,
    /// Expected `aud` claim, if any
    pub audience: Option<String>,
    /// Accept tokens without verifying the signature (development only)
    pub allow_unverified_tokens: bool,
}

/// Load the TOML config file
///
/// `explicit` takes precedence over the platform search path. A missing file
/// is not an error: a warning is logged and defaults are returned. A file that
/// exists but cannot be parsed is a configuration error.
pub fn load_toml_config(explicit: Option<&Path>) -> Result<TomlConfig> {
    let path = match explicit {
        Some(path) => {
            if !path.exists() {
                return Err(Error::Config(format!("Config file not found: {}", path.display())));
            }
            path.to_path_buf()
        }
        None => match find_config_file() {
            Some(path) => path,
            None => {
                warn!("No config file found, using built-in defaults");
                return Ok(TomlConfig::default());
            }
        },
    };

    let content = std::fs::read_to_string(&path)?;
    let config = parse_toml_config(&content)?;
    info!("Loaded configuration from {}", path.display());
    Ok(config)
}

/// Parse TOML text into a [`TomlConfig`]
pub fn parse_toml_config(content: &str) -> Result<TomlConfig> {
    toml::from_str(content).map_err(|e| Error::Config(format!("Parse TOML failed: {}", e)))
}

/// Search the platform config locations
fn find_config_file() -> Option<PathBuf> {
    let user_config = dirs::config_dir().map(|d| d.join("stylemate").join("config.toml"));
    if let Some(path) = user_config {
        if path.exists() {
            return Some(path);
        }
    }

    if cfg!(target_os = "linux") {
        let system_config = PathBuf::from("/etc/stylemate/config.toml");
        if system_config.exists() {
            return Some(system_config);
        }
    }

    None
}

/// Root folder resolution: CLI → environment → TOML → OS default
pub fn resolve_root_folder(cli_arg: Option<&Path>, toml_config: &TomlConfig) -> PathBuf {
    if let Some(path) = cli_arg {
        return path.to_path_buf();
    }

    if let Ok(path) = std::env::var(ROOT_FOLDER_ENV) {
        if !path.trim().is_empty() {
            return PathBuf::from(path);
        }
    }

    if let Some(path) = &toml_config.root_folder {
        return path.clone();
    }

    default_root_folder()
}

/// OS-dependent default root folder
pub fn default_root_folder() -> PathBuf {
    if cfg!(target_os = "linux") {
        // ~/.local/share/stylemate
        dirs::data_local_dir()
            .map(|d| d.join("stylemate"))
            .unwrap_or_else(|| PathBuf::from("/var/lib/stylemate"))
    } else if cfg!(target_os = "macos") {
        // ~/Library/Application Support/stylemate
        dirs::data_dir()
            .map(|d| d.join("stylemate"))
            .unwrap_or_else(|| PathBuf::from("/Library/Application Support/stylemate"))
    } else if cfg!(target_os = "windows") {
        // %LOCALAPPDATA%\stylemate
        dirs::data_local_dir()
            .map(|d| d.join("stylemate"))
            .unwrap_or_else(|| PathBuf::from("C:\\ProgramData\\stylemate"))
    } else {
        PathBuf::from("./stylemate_data")
    }
}

/// Resolve the Gemini API key: environment → TOML
///
/// Returns `None` when no source holds a non-blank key.
pub fn resolve_gemini_api_key(toml_config: &TomlConfig) -> Option<String> {
    let mut found: Vec<(&str, String)> = Vec::new();

    for var in GEMINI_API_KEY_ENVS {
        if let Ok(key) = std::env::var(var) {
            if is_valid_key(&key) {
                found.push((var, key));
            }
        }
    }

    if let Some(key) = &toml_config.gemini.api_key {
        if is_valid_key(key) {
            found.push(("TOML", key.clone()));
        }
    }

    if found.len() > 1 {
        let sources: Vec<&str> = found.iter().map(|(source, _)| *source).collect();
        warn!(
            "Gemini API key found in multiple sources: {}. Using {}.",
            sources.join(", "),
            sources[0]
        );
    }

    found.into_iter().next().map(|(source, key)| {
        info!("Gemini API key loaded from {}", source);
        key.trim().to_string()
    })
}

/// Validate API key (non-empty, non-whitespace)
pub fn is_valid_key(key: &str) -> bool {
    !key.trim().is_empty()
}

/// Create the root folder if missing
pub fn ensure_root_folder(root_folder: &Path) -> Result<()> {
    if !root_folder.exists() {
        std::fs::create_dir_all(root_folder)?;
        info!("Created root folder: {}", root_folder.display());
    }
    Ok(())
}
