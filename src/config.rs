use reqwest::Url;
use std::time::Duration;
use thiserror::Error;

pub const DEFAULT_STATUS_URL: &str = "https://status.salesforce.com";
pub const DEFAULT_LOCALE: &str = "en";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Instance and version flags are required")]
    MissingArguments,
    #[error("No valid instances provided")]
    NoInstances,
    #[error("Instance name {0:?} cannot be used as a URL path segment")]
    InvalidInstance(String),
    #[error("Status URL cannot be used as a base: {0}")]
    InvalidStatusUrl(Url),
}

/// Everything a single check run needs, built once from the command line.
#[derive(Debug, Clone)]
pub struct Config {
    pub instances: Vec<String>,
    pub expected_version: String,
    pub status_url: Url,
    pub locale: String,
    pub timeout: Option<Duration>,
    pub fail_on_error: bool,
}

impl Config {
    /// Validates the raw `--instance` and `--version` flags. Fails before any
    /// request is made if either is missing or no usable instance remains.
    pub fn new(
        instance: Option<&str>,
        version: Option<&str>,
        status_url: Url,
    ) -> Result<Self, ConfigError> {
        let (instance, version) = match (instance, version) {
            (Some(i), Some(v)) if !i.is_empty() && !v.is_empty() => (i, v),
            _ => return Err(ConfigError::MissingArguments),
        };

        let instances = parse_instances(instance);
        if instances.is_empty() {
            return Err(ConfigError::NoInstances);
        }
        if let Some(name) = instances.iter().find(|name| is_dot_segment(name)) {
            return Err(ConfigError::InvalidInstance(name.clone()));
        }

        if status_url.cannot_be_a_base() {
            return Err(ConfigError::InvalidStatusUrl(status_url));
        }

        Ok(Self {
            instances,
            expected_version: version.to_string(),
            status_url,
            locale: DEFAULT_LOCALE.to_string(),
            timeout: None,
            fail_on_error: false,
        })
    }

    pub fn with_locale(mut self, locale: impl Into<String>) -> Self {
        self.locale = locale.into();
        self
    }

    pub fn with_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn fail_on_error(mut self, fail_on_error: bool) -> Self {
        self.fail_on_error = fail_on_error;
        self
    }
}

/// Splits a comma-separated instance list, trimming each name and dropping
/// empty entries. Order is preserved.
pub fn parse_instances(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(String::from)
        .collect()
}

/// `.` and `..` are resolved away by URL normalization, even when
/// percent-encoded, so they can never address an instance.
pub fn is_dot_segment(name: &str) -> bool {
    name == "." || name == ".."
}
