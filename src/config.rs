//! Client configuration parsed from environment variables.

use std::time::Duration;

pub const DEFAULT_REQUEST_TIMEOUT_MS: u64 = 5000;
pub const DEFAULT_CSRF_COOKIE: &str = "XSRF-TOKEN";

pub const DEFAULT_MEMBER_INFO_ENDPOINT: &str = "/members/info";
pub const DEFAULT_REISSUE_ENDPOINT: &str = "/auth/reissue";
pub const DEFAULT_SESSION_ENDPOINT: &str = "/auth/session";
pub const DEFAULT_LOGIN_ENDPOINT: &str = "/auth/login";
pub const DEFAULT_LOGOUT_ENDPOINT: &str = "/auth/logout";

/// Errors produced while building a [`PortalConfig`].
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// A required variable is not set.
    #[error("missing required env var {0}")]
    Missing(&'static str),

    /// A variable is set but its value is unusable.
    #[error("invalid value for {key}: {reason}")]
    Invalid { key: &'static str, reason: String },
}

/// Backend paths used by the auth core.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Endpoints {
    pub member_info: String,
    pub reissue: String,
    pub session: String,
    pub login: String,
    pub logout: String,
}

impl Default for Endpoints {
    fn default() -> Self {
        Self {
            member_info: DEFAULT_MEMBER_INFO_ENDPOINT.to_owned(),
            reissue: DEFAULT_REISSUE_ENDPOINT.to_owned(),
            session: DEFAULT_SESSION_ENDPOINT.to_owned(),
            login: DEFAULT_LOGIN_ENDPOINT.to_owned(),
            logout: DEFAULT_LOGOUT_ENDPOINT.to_owned(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PortalConfig {
    /// API origin without a trailing slash, e.g. `https://api.portal.example`.
    pub base_url: String,
    pub request_timeout: Duration,
    pub endpoints: Endpoints,
    /// Cookie whose presence tells bootstrap a server session may exist.
    pub csrf_cookie: String,
    /// Share one in-flight reissue between concurrent 401 responses.
    pub coalesce_refresh: bool,
}

impl PortalConfig {
    /// Config with defaults for everything but the base URL.
    ///
    /// # Errors
    ///
    /// Returns an error if `base_url` is not an absolute `http`/`https` URL.
    pub fn new(base_url: &str) -> Result<Self, ConfigError> {
        Ok(Self {
            base_url: normalize_base_url(base_url)?,
            request_timeout: Duration::from_millis(DEFAULT_REQUEST_TIMEOUT_MS),
            endpoints: Endpoints::default(),
            csrf_cookie: DEFAULT_CSRF_COOKIE.to_owned(),
            coalesce_refresh: true,
        })
    }

    #[must_use]
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.request_timeout = timeout;
        self
    }

    #[must_use]
    pub fn with_coalesce_refresh(mut self, coalesce: bool) -> Self {
        self.coalesce_refresh = coalesce;
        self
    }

    /// Build typed config from environment variables.
    ///
    /// Required:
    /// - `PORTAL_API_BASE_URL`
    ///
    /// Optional:
    /// - `PORTAL_REQUEST_TIMEOUT_MS`: default 5000
    /// - `PORTAL_SESSION_ENDPOINT`: default `/auth/session`
    /// - `PORTAL_CSRF_COOKIE`: default `XSRF-TOKEN`
    /// - `PORTAL_COALESCE_REFRESH`: default on
    ///
    /// # Errors
    ///
    /// Returns an error if the base URL is missing or any value fails to parse.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Same as [`PortalConfig::from_env`], reading values through `lookup`.
    ///
    /// # Errors
    ///
    /// Returns an error if the base URL is missing or any value fails to parse.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let base_url = lookup("PORTAL_API_BASE_URL").ok_or(ConfigError::Missing("PORTAL_API_BASE_URL"))?;
        let mut config = Self::new(&base_url)?;

        if let Some(raw) = lookup("PORTAL_REQUEST_TIMEOUT_MS") {
            let ms = raw.trim().parse::<u64>().map_err(|e| ConfigError::Invalid {
                key: "PORTAL_REQUEST_TIMEOUT_MS",
                reason: e.to_string(),
            })?;
            if ms == 0 {
                return Err(ConfigError::Invalid { key: "PORTAL_REQUEST_TIMEOUT_MS", reason: "must be positive".into() });
            }
            config.request_timeout = Duration::from_millis(ms);
        }
        if let Some(path) = lookup("PORTAL_SESSION_ENDPOINT") {
            config.endpoints.session = normalize_path(&path);
        }
        if let Some(name) = lookup("PORTAL_CSRF_COOKIE") {
            let name = name.trim();
            if name.is_empty() {
                return Err(ConfigError::Invalid { key: "PORTAL_CSRF_COOKIE", reason: "empty cookie name".into() });
            }
            config.csrf_cookie = name.to_owned();
        }
        if let Some(raw) = lookup("PORTAL_COALESCE_REFRESH") {
            config.coalesce_refresh = parse_bool(&raw).ok_or_else(|| ConfigError::Invalid {
                key: "PORTAL_COALESCE_REFRESH",
                reason: format!("expected a boolean, got '{raw}'"),
            })?;
        }

        Ok(config)
    }
}

pub(crate) fn parse_bool(raw: &str) -> Option<bool> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}

fn normalize_base_url(raw: &str) -> Result<String, ConfigError> {
    let trimmed = raw.trim().trim_end_matches('/');
    let url = reqwest::Url::parse(trimmed)
        .map_err(|e| ConfigError::Invalid { key: "PORTAL_API_BASE_URL", reason: e.to_string() })?;
    if !matches!(url.scheme(), "http" | "https") {
        return Err(ConfigError::Invalid {
            key: "PORTAL_API_BASE_URL",
            reason: format!("unsupported scheme '{}'", url.scheme()),
        });
    }
    Ok(trimmed.to_owned())
}

fn normalize_path(raw: &str) -> String {
    let trimmed = raw.trim();
    if trimmed.starts_with('/') { trimmed.to_owned() } else { format!("/{trimmed}") }
}

#[cfg(test)]
#[path = "config_test.rs"]
mod tests;
