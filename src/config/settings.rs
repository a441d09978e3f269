//! Application settings.
//!
//! Settings start from built-in defaults, optionally replaced by a TOML file
//! named by `CONFIG_FILE`, and are finally overridden by environment variables
//! (a `.env` file is loaded into the environment by the binary beforehand).
//!
//! ```toml
//! database_url = "sqlite://agroplanner.db?mode=rwc"
//!
//! [vendor]
//! client_id = "my-client"
//! org_id = "1234"
//!
//! [scheduler]
//! interval_seconds = 600
//! ```

use crate::errors::{Error, Result};
use jsonwebtoken::Algorithm;
use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::time::Duration;
use tracing::debug;

const DEFAULT_DATABASE_URL: &str = "sqlite://agroplanner.db?mode=rwc";
const DEFAULT_BIND_ADDRESS: &str = "0.0.0.0:8000";

/// Top-level configuration for the backend
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// sea-orm connection string
    pub database_url: String,
    /// Socket address the HTTP server binds to
    pub bind_address: String,
    /// Directory for the rolling log file; console only when unset
    pub log_dir: Option<PathBuf>,
    /// Vendor API credentials and client tuning
    pub vendor: VendorSettings,
    /// Periodic sync settings
    pub scheduler: SchedulerSettings,
    /// Local token and password settings
    pub auth: AuthSettings,
}

/// Vendor (John Deere Operations Center) API settings
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct VendorSettings {
    /// OAuth client id
    pub client_id: String,
    /// OAuth client secret
    pub client_secret: String,
    /// Organization whose data is mirrored
    pub org_id: String,
    /// Token endpoint for the client-credentials grant
    pub auth_url: String,
    /// Base URL every API path is appended to
    pub api_base: String,
    /// Static bearer token that bypasses the OAuth exchange
    pub fake_token: Option<String>,
    /// Per-request timeout
    pub request_timeout_seconds: u64,
    /// Items requested per page when listing collections
    pub page_size: u32,
}

/// Periodic sync settings
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct SchedulerSettings {
    /// Seconds between two sync runs
    pub interval_seconds: u64,
    /// Start the scheduler when the server boots
    pub autostart: bool,
}

/// Local authentication settings
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct AuthSettings {
    /// Secret used to sign access tokens
    pub secret_key: String,
    /// Signing algorithm (HMAC family)
    pub algorithm: Algorithm,
    /// Lifetime of an issued access token
    pub access_token_expire_minutes: i64,
    /// bcrypt work factor
    pub bcrypt_cost: u32,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            database_url: DEFAULT_DATABASE_URL.to_string(),
            bind_address: DEFAULT_BIND_ADDRESS.to_string(),
            log_dir: None,
            vendor: VendorSettings::default(),
            scheduler: SchedulerSettings::default(),
            auth: AuthSettings::default(),
        }
    }
}

impl Default for VendorSettings {
    fn default() -> Self {
        Self {
            client_id: String::new(),
            client_secret: String::new(),
            org_id: String::new(),
            auth_url: String::new(),
            api_base: String::new(),
            fake_token: None,
            request_timeout_seconds: 30,
            page_size: 100,
        }
    }
}

impl VendorSettings {
    /// Request timeout as a [`Duration`].
    #[must_use]
    pub const fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_seconds)
    }
}

impl Default for SchedulerSettings {
    fn default() -> Self {
        Self {
            interval_seconds: 300,
            autostart: true,
        }
    }
}

impl Default for AuthSettings {
    fn default() -> Self {
        Self {
            secret_key: String::new(),
            algorithm: Algorithm::HS256,
            access_token_expire_minutes: 60,
            bcrypt_cost: bcrypt::DEFAULT_COST,
        }
    }
}

/// Loads settings from `CONFIG_FILE` (if set) and the process environment.
pub fn load_settings() -> Result<Settings> {
    let base = match std::env::var("CONFIG_FILE") {
        Ok(path) => Settings::from_file(path)?,
        Err(_) => Settings::default(),
    };
    let settings = base.with_overrides(|key| std::env::var(key).ok())?;
    settings.validate()?;
    Ok(settings)
}

impl Settings {
    /// Reads settings from a TOML file. Missing keys keep their defaults.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path_ref = path.as_ref();
        debug!("Loading settings from {:?}", path_ref);
        let contents = std::fs::read_to_string(path_ref).map_err(|e| Error::Config {
            message: format!("Failed to read config file {}: {e}", path_ref.display()),
        })?;
        Self::from_toml_str(&contents)
    }

    /// Parses settings from TOML text.
    pub fn from_toml_str(contents: &str) -> Result<Self> {
        toml::from_str(contents).map_err(|e| Error::Config {
            message: format!("Failed to parse settings TOML: {e}"),
        })
    }

    /// Applies environment-style overrides; `lookup` returns the value of a variable.
    pub fn with_overrides<F>(mut self, lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|value| !value.trim().is_empty());

        if let Some(v) = get("DB_URL") {
            self.database_url = v;
        }
        if let Some(v) = get("BIND_ADDRESS") {
            self.bind_address = v;
        }
        if let Some(v) = get("LOG_DIR") {
            self.log_dir = Some(PathBuf::from(v));
        }

        if let Some(v) = get("CLIENT_ID") {
            self.vendor.client_id = v;
        }
        if let Some(v) = get("CLIENT_SECRET") {
            self.vendor.client_secret = v;
        }
        if let Some(v) = get("ORG_ID") {
            self.vendor.org_id = v;
        }
        if let Some(v) = get("JD_AUTH_URL") {
            self.vendor.auth_url = v;
        }
        if let Some(v) = get("JD_API_BASE") {
            self.vendor.api_base = v;
        }
        if let Some(v) = get("JD_FAKE_TOKEN") {
            self.vendor.fake_token = Some(v);
        }
        if let Some(v) = get("JD_REQUEST_TIMEOUT_SECONDS") {
            self.vendor.request_timeout_seconds = parse_var("JD_REQUEST_TIMEOUT_SECONDS", &v)?;
        }
        if let Some(v) = get("JD_PAGE_SIZE") {
            self.vendor.page_size = parse_var("JD_PAGE_SIZE", &v)?;
        }

        if let Some(v) = get("SCHEDULER_INTERVAL_SECONDS") {
            self.scheduler.interval_seconds = parse_var("SCHEDULER_INTERVAL_SECONDS", &v)?;
        }
        if let Some(v) = get("SCHEDULER_AUTOSTART") {
            self.scheduler.autostart = parse_var("SCHEDULER_AUTOSTART", &v)?;
        }

        if let Some(v) = get("SECRET_KEY") {
            self.auth.secret_key = v;
        }
        if let Some(v) = get("ALGORITHM") {
            self.auth.algorithm = parse_var("ALGORITHM", &v)?;
        }
        if let Some(v) = get("ACCESS_TOKEN_EXPIRE_MINUTES") {
            self.auth.access_token_expire_minutes = parse_var("ACCESS_TOKEN_EXPIRE_MINUTES", &v)?;
        }
        if let Some(v) = get("BCRYPT_COST") {
            self.auth.bcrypt_cost = parse_var("BCRYPT_COST", &v)?;
        }

        Ok(self)
    }

    /// Rejects settings the server cannot run with.
    pub fn validate(&self) -> Result<()> {
        let required = [
            ("CLIENT_ID", &self.vendor.client_id),
            ("CLIENT_SECRET", &self.vendor.client_secret),
            ("ORG_ID", &self.vendor.org_id),
            ("JD_AUTH_URL", &self.vendor.auth_url),
            ("JD_API_BASE", &self.vendor.api_base),
            ("SECRET_KEY", &self.auth.secret_key),
        ];
        let missing: Vec<&str> = required
            .iter()
            .filter(|(_, value)| value.trim().is_empty())
            .map(|(name, _)| *name)
            .collect();
        if !missing.is_empty() {
            return Err(Error::config(format!(
                "Missing required settings: {}",
                missing.join(", ")
            )));
        }

        if self.vendor.page_size == 0 {
            return Err(Error::config("JD_PAGE_SIZE must be at least 1"));
        }
        if self.vendor.request_timeout_seconds == 0 {
            return Err(Error::config("JD_REQUEST_TIMEOUT_SECONDS must be at least 1"));
        }
        if !matches!(
            self.auth.algorithm,
            Algorithm::HS256 | Algorithm::HS384 | Algorithm::HS512
        ) {
            return Err(Error::config(
                "ALGORITHM must be one of HS256, HS384 or HS512",
            ));
        }
        Ok(())
    }
}

fn parse_var<T>(name: &str, raw: &str) -> Result<T>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    raw.trim().parse().map_err(|e| Error::Config {
        message: format!("Invalid value for {name}: {e}"),
    })
}
