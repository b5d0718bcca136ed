//! Shared configuration for the shelf CLI.
//!
//! TOML profiles merged with `SHELF_*` environment variables, and
//! translation of a profile into a `shelf_core::FetchConfig` plus the
//! source it should fetch from. The CLI layers its flag overrides on top.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use directories::ProjectDirs;
use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use shelf_core::{DEFAULT_TIMEOUT_MS, FetchConfig, TlsMode, TransportConfig};

/// Endpoint used when neither a profile nor a flag names one.
pub const DEFAULT_ENDPOINT: &str = "http://localhost:5000/api/products";

/// Environment variable that overrides the config file location.
pub const CONFIG_PATH_ENV: &str = "SHELF_CONFIG";

// ── Error ───────────────────────────────────────────────────────────

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid {field}: {reason}")]
    Validation { field: String, reason: String },

    #[error("profile '{name}' is not defined")]
    UnknownProfile { name: String },

    #[error("failed to serialize config: {0}")]
    Serialization(#[from] toml::ser::Error),

    #[error("config loading failed: {0}")]
    Figment(Box<figment::Error>),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<figment::Error> for ConfigError {
    fn from(err: figment::Error) -> Self {
        Self::Figment(Box::new(err))
    }
}

// ── TOML config structs ─────────────────────────────────────────────

/// Top-level TOML configuration.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct Config {
    /// Profile used when `--profile` is not given.
    pub default_profile: Option<String>,

    #[serde(default)]
    pub defaults: Defaults,

    /// Named catalog profiles.
    #[serde(default)]
    pub profiles: BTreeMap<String, Profile>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            default_profile: Some("default".into()),
            defaults: Defaults::default(),
            profiles: BTreeMap::new(),
        }
    }
}

impl Config {
    /// A config with a single `default` profile pointing at
    /// [`DEFAULT_ENDPOINT`]. Written by `shelf config init`.
    pub fn starter() -> Self {
        let mut profiles = BTreeMap::new();
        profiles.insert("default".to_owned(), Profile::default());
        Self {
            profiles,
            ..Self::default()
        }
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct Defaults {
    #[serde(default = "default_output")]
    pub output: String,

    #[serde(default = "default_color")]
    pub color: String,

    /// Fetch deadline in milliseconds.
    #[serde(default = "default_timeout_ms")]
    pub timeout_ms: u64,

    #[serde(default = "default_auto_start")]
    pub auto_start: bool,
}

impl Default for Defaults {
    fn default() -> Self {
        Self {
            output: default_output(),
            color: default_color(),
            timeout_ms: default_timeout_ms(),
            auto_start: default_auto_start(),
        }
    }
}

fn default_output() -> String {
    "table".into()
}
fn default_color() -> String {
    "auto".into()
}
fn default_timeout_ms() -> u64 {
    DEFAULT_TIMEOUT_MS
}
fn default_auto_start() -> bool {
    true
}

/// A named catalog profile.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct Profile {
    /// Catalog endpoint (e.g., "http://localhost:5000/api/products").
    #[serde(default = "default_endpoint")]
    pub endpoint: String,

    /// Override the default fetch deadline.
    pub timeout_ms: Option<u64>,

    /// Accept invalid TLS certificates.
    #[serde(default)]
    pub insecure: bool,

    /// Path to custom CA certificate.
    pub ca_cert: Option<PathBuf>,

    /// Serve the built-in sample catalog instead of calling `endpoint`.
    #[serde(default)]
    pub simulate: bool,
}

impl Default for Profile {
    fn default() -> Self {
        Self {
            endpoint: default_endpoint(),
            timeout_ms: None,
            insecure: false,
            ca_cert: None,
            simulate: false,
        }
    }
}

fn default_endpoint() -> String {
    DEFAULT_ENDPOINT.into()
}

// ── Config file path ────────────────────────────────────────────────

/// Resolve the config file path: `$SHELF_CONFIG`, else platform conventions.
pub fn config_path() -> PathBuf {
    if let Some(path) = std::env::var_os(CONFIG_PATH_ENV) {
        return PathBuf::from(path);
    }
    ProjectDirs::from("dev", "shelf", "shelf").map_or_else(
        || {
            let mut p = dirs_fallback();
            p.push("config.toml");
            p
        },
        |dirs| dirs.config_dir().join("config.toml"),
    )
}

fn dirs_fallback() -> PathBuf {
    let mut p = PathBuf::from(std::env::var("HOME").unwrap_or_else(|_| ".".into()));
    p.push(".config");
    p.push("shelf");
    p
}

// ── Config loading ──────────────────────────────────────────────────

/// Load the full Config from the canonical file + environment.
pub fn load_config() -> Result<Config, ConfigError> {
    load_config_from(&config_path())
}

/// Load a Config from `path` + environment. A missing file yields defaults.
///
/// Environment keys nest with a double underscore:
/// `SHELF_DEFAULTS__TIMEOUT_MS=2000`, `SHELF_PROFILES__LOCAL__SIMULATE=true`.
pub fn load_config_from(path: &Path) -> Result<Config, ConfigError> {
    let figment = Figment::new()
        .merge(Serialized::defaults(Config::default()))
        .merge(Toml::file(path))
        .merge(Env::prefixed("SHELF_").ignore(&["config"]).split("__"));

    let config: Config = figment.extract()?;
    Ok(config)
}

// ── Config saving ───────────────────────────────────────────────────

/// Serialize config to TOML and write it to `path`, creating parent
/// directories as needed.
pub fn save_config_to(cfg: &Config, path: &Path) -> Result<(), ConfigError> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    let toml_str = toml::to_string_pretty(cfg)?;
    std::fs::write(path, toml_str)?;
    Ok(())
}

// ── Profile resolution ──────────────────────────────────────────────

/// Where a resolved profile fetches its catalog from.
#[derive(Debug, Clone)]
pub enum SourceTarget {
    Http {
        endpoint: url::Url,
        transport: TransportConfig,
    },
    Simulated,
}

/// A profile resolved into everything needed to build a controller.
#[derive(Debug, Clone)]
pub struct ResolvedProfile {
    pub name: String,
    pub fetch: FetchConfig,
    pub target: SourceTarget,
}

/// Look up a profile by name, falling back to `default_profile`.
///
/// An explicitly requested profile must exist. When no name is requested
/// and the default is missing, a stock [`Profile`] is returned so the tool
/// works without a config file.
pub fn select_profile(config: &Config, requested: Option<&str>) -> Result<(String, Profile), ConfigError> {
    if let Some(name) = requested {
        return config
            .profiles
            .get(name)
            .map(|p| (name.to_owned(), p.clone()))
            .ok_or_else(|| ConfigError::UnknownProfile { name: name.into() });
    }

    let name = config.default_profile.as_deref().unwrap_or("default");
    let profile = config.profiles.get(name).cloned().unwrap_or_default();
    Ok((name.to_owned(), profile))
}

/// Translate a profile into a [`ResolvedProfile`], validating the timeout
/// and endpoint.
pub fn resolve_profile(
    profile: &Profile,
    profile_name: &str,
    defaults: &Defaults,
) -> Result<ResolvedProfile, ConfigError> {
    let timeout_ms = profile.timeout_ms.unwrap_or(defaults.timeout_ms);
    let fetch =
        FetchConfig::new(timeout_ms, defaults.auto_start).map_err(|e| ConfigError::Validation {
            field: "timeout_ms".into(),
            reason: e.to_string(),
        })?;

    let target = if profile.simulate {
        SourceTarget::Simulated
    } else {
        let endpoint: url::Url =
            profile
                .endpoint
                .parse()
                .map_err(|e: url::ParseError| ConfigError::Validation {
                    field: "endpoint".into(),
                    reason: format!("invalid URL '{}': {e}", profile.endpoint),
                })?;

        let tls = if profile.insecure {
            TlsMode::DangerAcceptInvalid
        } else if let Some(ref ca_path) = profile.ca_cert {
            TlsMode::CustomCa(ca_path.clone())
        } else {
            TlsMode::System
        };

        SourceTarget::Http {
            endpoint,
            transport: TransportConfig {
                tls,
                ..TransportConfig::default()
            }
            .with_timeout(fetch.timeout()),
        }
    };

    Ok(ResolvedProfile {
        name: profile_name.to_owned(),
        fetch,
        target,
    })
}
