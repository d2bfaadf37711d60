use std::collections::HashMap;
use std::env;
use std::path::{Path, PathBuf};

use serde::Deserialize;
use thiserror::Error;

use crate::auth::ApiKey;
use crate::resolver::InstallerSource;
use crate::types::{normalize_installer_type, normalize_sha256, parse_mandatory, ReleaseInfo};

/// Environment variable naming an optional TOML settings file.
pub const CONFIG_PATH_VAR: &str = "PORTAL_CONFIG";
const DEFAULT_CONFIG_FILE: &str = "portal.toml";

const DEFAULT_HOST: &str = "0.0.0.0";
const DEFAULT_PORT: u16 = 5000;
const DEFAULT_LOG_LEVEL: &str = "info";

/// Reported when neither installer location form is configured.
pub const INSTALLER_LOCATION_KEY: &str = "PORTAL_INSTALLER_URL (absolute) or PORTAL_INSTALLER_PATH";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("missing required configuration: {}", .0.join(", "))]
    Missing(Vec<String>),

    #[error("invalid PORT value: {0:?}")]
    InvalidPort(String),

    #[error("invalid LOG_FORMAT value: {0:?}")]
    InvalidLogFormat(String),

    #[error(transparent)]
    Source(#[from] config::ConfigError),
}

/// Raw settings as read from the config file and environment.
///
/// Every field is optional here; [`AppConfig::validate`] turns this into
/// [`Settings`] or reports everything that is missing. Environment keys are
/// matched case-insensitively, file keys are the lower-case variable names
/// (`api_key`, `portal_version`, ...).
#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
pub struct AppConfig {
    pub api_key: Option<String>,
    pub portal_version: Option<String>,
    pub portal_release_date: Option<String>,
    pub portal_changelog: Option<String>,
    pub portal_installer_url: Option<String>,
    pub portal_installer_type: Option<String>,
    pub portal_sha256: Option<String>,
    pub portal_mandatory: Option<String>,
    pub portal_min_supported: Option<String>,
    pub server_base_url: Option<String>,
    pub portal_installer_path: Option<String>,
    pub host: Option<String>,
    pub port: Option<String>,
    pub log_level: Option<String>,
    pub log_format: Option<String>,
}

impl AppConfig {
    /// Load configuration from disk and the process environment.
    pub fn load() -> Result<Self, ConfigError> {
        Self::build(None)
    }

    /// Same layering as [`AppConfig::load`], with `vars` standing in for the
    /// process environment.
    pub fn from_env_map(vars: HashMap<String, String>) -> Result<Self, ConfigError> {
        Self::build(Some(vars))
    }

    fn build(vars: Option<HashMap<String, String>>) -> Result<Self, ConfigError> {
        let config_path = match &vars {
            Some(vars) => vars.get(CONFIG_PATH_VAR).cloned(),
            None => env::var(CONFIG_PATH_VAR).ok(),
        }
        .unwrap_or_else(|| DEFAULT_CONFIG_FILE.to_string());

        let mut builder = config::Config::builder();

        if Path::new(&config_path).exists() {
            builder = builder.add_source(config::File::from(PathBuf::from(&config_path)));
        }

        builder = builder.add_source(config::Environment::default().source(vars));

        let settings = builder.build()?;
        Ok(settings.try_deserialize()?)
    }

    /// Logging settings, resolved on their own so tracing can be set up
    /// before the rest of the configuration is validated.
    pub fn logging(&self) -> Result<LoggingSection, ConfigError> {
        let level = non_blank(&self.log_level)
            .unwrap_or(DEFAULT_LOG_LEVEL)
            .to_string();
        let format = match non_blank(&self.log_format) {
            Some(format) => format.parse()?,
            None => LogFormat::default(),
        };

        Ok(LoggingSection { level, format })
    }

    pub fn server(&self) -> Result<ServerConfig, ConfigError> {
        let host = non_blank(&self.host).unwrap_or(DEFAULT_HOST).to_string();
        let port = match non_blank(&self.port) {
            Some(port) => port
                .parse()
                .map_err(|_| ConfigError::InvalidPort(port.to_string()))?,
            None => DEFAULT_PORT,
        };

        Ok(ServerConfig { host, port })
    }

    /// Check that everything needed to serve requests is present.
    ///
    /// All missing keys are collected, not just the first one.
    pub fn validate(self) -> Result<Settings, ConfigError> {
        let mut missing = Vec::new();
        let mut required = |key: &str, value: &Option<String>| {
            if non_blank(value).is_none() {
                missing.push(key.to_string());
            }
            value.clone()
        };

        let api_key = required("API_KEY", &self.api_key);
        let version = required("PORTAL_VERSION", &self.portal_version);
        let release_date = required("PORTAL_RELEASE_DATE", &self.portal_release_date);
        let changelog = required("PORTAL_CHANGELOG", &self.portal_changelog);
        let installer_type = required("PORTAL_INSTALLER_TYPE", &self.portal_installer_type);
        let sha256 = required("PORTAL_SHA256", &self.portal_sha256);
        let mandatory = required("PORTAL_MANDATORY", &self.portal_mandatory);
        let min_supported = required("PORTAL_MIN_SUPPORTED", &self.portal_min_supported);

        let installer = InstallerSource::new(
            self.portal_installer_url.clone(),
            self.server_base_url.clone(),
            self.portal_installer_path.clone(),
        );

        if installer.absolute_url().is_none() {
            if let Some(url) = non_blank(&self.portal_installer_url) {
                tracing::warn!(%url, "PORTAL_INSTALLER_URL is not an absolute URL; ignoring it");
            }
            if installer.installer_path().is_none() {
                missing.push(INSTALLER_LOCATION_KEY.to_string());
            }
        }

        let server = self.server();
        let logging = self.logging();

        match (
            api_key,
            version,
            release_date,
            changelog,
            installer_type,
            sha256,
            mandatory,
            min_supported,
        ) {
            (
                Some(api_key),
                Some(version),
                Some(release_date),
                Some(changelog),
                Some(installer_type),
                Some(sha256),
                Some(mandatory),
                Some(min_supported),
            ) if missing.is_empty() => {
                // Tracing is set up from this section before validation;
                // only its validity is checked here.
                logging?;
                Ok(Settings {
                    api_key: ApiKey::new(api_key),
                    release: ReleaseInfo {
                        version,
                        release_date,
                        changelog,
                        installer_type: normalize_installer_type(Some(&installer_type)),
                        sha256: normalize_sha256(Some(&sha256)),
                        mandatory: parse_mandatory(Some(&mandatory)),
                        min_supported,
                    },
                    installer,
                    server: server?,
                })
            }
            _ => Err(ConfigError::Missing(missing)),
        }
    }
}

/// Validated, immutable configuration shared by all request handlers.
#[derive(Debug, Clone)]
pub struct Settings {
    pub api_key: ApiKey,
    pub release: ReleaseInfo,
    pub installer: InstallerSource,
    pub server: ServerConfig,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

impl ServerConfig {
    pub fn addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: DEFAULT_HOST.to_string(),
            port: DEFAULT_PORT,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoggingSection {
    pub level: String,
    pub format: LogFormat,
}

impl Default for LoggingSection {
    fn default() -> Self {
        Self {
            level: DEFAULT_LOG_LEVEL.to_string(),
            format: LogFormat::default(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LogFormat {
    #[default]
    Text,
    Json,
}

impl std::str::FromStr for LogFormat {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "text" => Ok(LogFormat::Text),
            "json" => Ok(LogFormat::Json),
            other => Err(ConfigError::InvalidLogFormat(other.to_string())),
        }
    }
}

fn non_blank(value: &Option<String>) -> Option<&str> {
    value.as_deref().map(str::trim).filter(|v| !v.is_empty())
}
