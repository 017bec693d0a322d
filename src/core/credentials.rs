//! Credential store
//!
//! A small YAML file holding the Bitbucket host, the username and an access
//! token. It is created by `bb auth setup`, read once per invocation and
//! removed by `bb auth reset`.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::debug;
use url::Url;

/// Directory name under the platform config dir
const CONFIG_DIR_NAME: &str = "bb";
/// Credential file name
const CONFIG_FILE_NAME: &str = "config.yaml";

/// Errors reading or writing the credential file
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Configuration required at '{}', try running 'bb auth setup'", .0.display())]
    Missing(PathBuf),

    #[error("Configuration already present at '{}', run 'bb auth status' for more information", .0.display())]
    AlreadyPresent(PathBuf),

    #[error("Could not determine the user configuration directory")]
    NoConfigDir,

    #[error("Invalid bitbucket_host '{host}': {reason}")]
    InvalidHost { host: String, reason: String },

    #[error("Malformed configuration at '{}': {source}", .path.display())]
    Malformed {
        path: PathBuf,
        #[source]
        source: serde_yaml::Error,
    },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialize(#[from] serde_yaml::Error),
}

/// Host, username and token used for every API call
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Credentials {
    /// Base URL of the Bitbucket Server, without a trailing slash
    #[serde(rename = "bitbucket_host")]
    pub host: String,
    pub username: String,
    pub token: String,
}

impl Credentials {
    /// Build credentials, validating and normalizing the host.
    pub fn new(host: &str, username: &str, token: &str) -> Result<Self, ConfigError> {
        Ok(Self {
            host: normalize_host(host)?,
            username: username.trim().to_string(),
            token: token.trim().to_string(),
        })
    }

    /// Token with every character replaced by `*`.
    pub fn masked_token(&self) -> String {
        "*".repeat(self.token.chars().count())
    }
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("host", &self.host)
            .field("username", &self.username)
            .field("token", &"<redacted>")
            .finish()
    }
}

/// Validate that `host` is an absolute http(s) URL and trim trailing slashes.
pub fn normalize_host(host: &str) -> Result<String, ConfigError> {
    let trimmed = host.trim().trim_end_matches('/');
    let parsed = Url::parse(trimmed).map_err(|e| ConfigError::InvalidHost {
        host: host.to_string(),
        reason: e.to_string(),
    })?;

    if !matches!(parsed.scheme(), "http" | "https") {
        return Err(ConfigError::InvalidHost {
            host: host.to_string(),
            reason: format!("unsupported scheme '{}'", parsed.scheme()),
        });
    }
    if parsed.host_str().is_none() {
        return Err(ConfigError::InvalidHost {
            host: host.to_string(),
            reason: "missing host name".to_string(),
        });
    }

    Ok(trimmed.to_string())
}

/// Default location: `<config_dir>/bb/config.yaml`
pub fn default_config_path() -> Result<PathBuf, ConfigError> {
    dirs::config_dir()
        .map(|dir| dir.join(CONFIG_DIR_NAME).join(CONFIG_FILE_NAME))
        .ok_or(ConfigError::NoConfigDir)
}

/// Reads and writes the credential file at a fixed path
#[derive(Debug, Clone)]
pub struct CredentialStore {
    path: PathBuf,
}

impl CredentialStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Use `path` when given (`--config` / `BB_CONFIG`), else the default location.
    pub fn locate(path: Option<PathBuf>) -> Result<Self, ConfigError> {
        match path {
            Some(p) => Ok(Self::new(p)),
            None => Ok(Self::new(default_config_path()?)),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn exists(&self) -> bool {
        self.path.is_file()
    }

    /// Load credentials, failing with [`ConfigError::Missing`] if the file is absent.
    pub fn load(&self) -> Result<Credentials, ConfigError> {
        if !self.exists() {
            return Err(ConfigError::Missing(self.path.clone()));
        }
        debug!(path = %self.path.display(), "loading credentials");

        let content = fs::read_to_string(&self.path)?;
        let raw: Credentials =
            serde_yaml::from_str(&content).map_err(|source| ConfigError::Malformed {
                path: self.path.clone(),
                source,
            })?;

        Credentials::new(&raw.host, &raw.username, &raw.token)
    }

    /// Write credentials, refusing to overwrite an existing file.
    pub fn create(&self, credentials: &Credentials) -> Result<(), ConfigError> {
        if self.exists() {
            return Err(ConfigError::AlreadyPresent(self.path.clone()));
        }
        self.save(credentials)
    }

    /// Write credentials, replacing any existing file.
    pub fn save(&self, credentials: &Credentials) -> Result<(), ConfigError> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)?;
        }
        let yaml = serde_yaml::to_string(credentials)?;
        fs::write(&self.path, yaml)?;
        restrict_permissions(&self.path)?;
        debug!(path = %self.path.display(), "credentials written");
        Ok(())
    }

    /// Delete the credential file. Returns false if there was nothing to delete.
    pub fn remove(&self) -> Result<bool, ConfigError> {
        if !self.exists() {
            return Ok(false);
        }
        fs::remove_file(&self.path)?;
        Ok(true)
    }
}

#[cfg(unix)]
fn restrict_permissions(path: &Path) -> Result<(), ConfigError> {
    use std::os::unix::fs::PermissionsExt;
    fs::set_permissions(path, fs::Permissions::from_mode(0o600))?;
    Ok(())
}

#[cfg(not(unix))]
fn restrict_permissions(_path: &Path) -> Result<(), ConfigError> {
    Ok(())
}
