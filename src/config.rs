//! Configuration management for perspective-automation

use crate::driver::keys::Platform;
use crate::{Error, Result};
use serde::Deserialize;
use std::env;
use std::fmt;
use std::time::Duration;

/// Gateway credentials
///
/// Carried for the bootstrap layer; the component layer never reads them.
#[derive(Clone, Deserialize)]
pub struct Credentials {
    pub username: String,
    pub password: String,
}

impl Credentials {
    pub fn new<U: Into<String>, P: Into<String>>(username: U, password: P) -> Self {
        Self {
            username: username.into(),
            password: password.into(),
        }
    }
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("username", &self.username)
            .field("password", &"<redacted>")
            .finish()
    }
}

/// Session configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct SessionConfig {
    /// Gateway base URL, e.g. `http://localhost:8088`
    pub base_url: String,

    /// Path of the Perspective page opened on start
    pub page_path: String,

    /// Default wait timeout in milliseconds
    pub wait_timeout_ms: u64,

    /// Poll interval for waits in milliseconds
    pub poll_interval_ms: u64,

    /// Delay between keystrokes for widgets that re-validate on every key
    pub keystroke_delay_ms: u64,

    /// Gateway credentials
    pub credentials: Option<Credentials>,

    /// Run the browser without a window
    pub headless: bool,

    /// Mobile emulation device name
    pub device_name: Option<String>,

    /// Remote CDP WebSocket endpoint of an already running page target
    pub remote_endpoint: Option<String>,

    /// Browser log channels to capture (CDP domains, e.g. `Log`, `Runtime`)
    pub log_channels: Vec<String>,

    /// Host platform override for key chords; detected when unset
    pub platform: Option<Platform>,

    /// Log level
    pub log_level: String,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:8088".to_string(),
            page_path: "/data/perspective/client".to_string(),
            wait_timeout_ms: 10_000,
            poll_interval_ms: 500,
            keystroke_delay_ms: 100,
            credentials: None,
            headless: true,
            device_name: None,
            remote_endpoint: None,
            log_channels: Vec::new(),
            platform: None,
            log_level: "info".to_string(),
        }
    }
}

impl SessionConfig {
    /// Create a configuration for a base URL and page path with default timings
    pub fn new<B: Into<String>, P: Into<String>>(base_url: B, page_path: P) -> Self {
        Self {
            base_url: base_url.into(),
            page_path: page_path.into(),
            ..Default::default()
        }
    }

    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self> {
        let mut config = SessionConfig::default();

        if let Ok(base_url) = env::var("PERSPECTIVE_BASE_URL") {
            config.base_url = base_url;
        }

        if let Ok(page_path) = env::var("PERSPECTIVE_PAGE_PATH") {
            config.page_path = page_path;
        }

        if let Ok(timeout) = env::var("PERSPECTIVE_WAIT_TIMEOUT_MS") {
            config.wait_timeout_ms = timeout
                .parse()
                .map_err(|_| Error::configuration("Invalid PERSPECTIVE_WAIT_TIMEOUT_MS"))?;
        }

        if let Ok(poll) = env::var("PERSPECTIVE_POLL_INTERVAL_MS") {
            config.poll_interval_ms = poll
                .parse()
                .map_err(|_| Error::configuration("Invalid PERSPECTIVE_POLL_INTERVAL_MS"))?;
        }

        if let Ok(delay) = env::var("PERSPECTIVE_KEYSTROKE_DELAY_MS") {
            config.keystroke_delay_ms = delay
                .parse()
                .map_err(|_| Error::configuration("Invalid PERSPECTIVE_KEYSTROKE_DELAY_MS"))?;
        }

        if let (Ok(username), Ok(password)) = (
            env::var("PERSPECTIVE_USERNAME"),
            env::var("PERSPECTIVE_PASSWORD"),
        ) {
            config.credentials = Some(Credentials::new(username, password));
        }

        if let Ok(headless) = env::var("PERSPECTIVE_HEADLESS") {
            config.headless = headless
                .parse()
                .map_err(|_| Error::configuration("Invalid PERSPECTIVE_HEADLESS"))?;
        }

        if let Ok(device) = env::var("PERSPECTIVE_DEVICE_NAME") {
            config.device_name = Some(device);
        }

        if let Ok(endpoint) = env::var("PERSPECTIVE_CDP_ENDPOINT") {
            config.remote_endpoint = Some(endpoint);
        }

        if let Ok(channels) = env::var("PERSPECTIVE_LOG_CHANNELS") {
            config.log_channels = channels
                .split(',')
                .map(str::trim)
                .filter(|c| !c.is_empty())
                .map(str::to_string)
                .collect();
        }

        if let Ok(platform) = env::var("PERSPECTIVE_PLATFORM") {
            config.platform = Some(platform.parse()?);
        }

        if let Ok(log_level) = env::var("PERSPECTIVE_LOG_LEVEL") {
            config.log_level = log_level;
        }

        config.validate()?;
        Ok(config)
    }

    /// Load configuration from a file
    pub fn from_file(path: &str) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| Error::configuration(format!("Failed to read config file: {}", e)))?;

        Self::from_toml_str(&content)
    }

    /// Parse configuration from TOML text
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let config: SessionConfig = toml::from_str(content)
            .map_err(|e| Error::configuration(format!("Failed to parse config: {}", e)))?;

        config.validate()?;
        Ok(config)
    }

    /// Reject settings that would make every wait fail or spin
    pub fn validate(&self) -> Result<()> {
        if self.poll_interval_ms == 0 {
            return Err(Error::configuration("poll_interval_ms must be positive"));
        }
        if self.base_url.is_empty() {
            return Err(Error::configuration("base_url must not be empty"));
        }
        Ok(())
    }

    /// URL of the page opened on start
    pub fn start_url(&self) -> String {
        format!("{}{}", self.base_url.trim_end_matches('/'), self.page_path)
    }

    /// Default wait timeout
    pub fn wait_timeout(&self) -> Duration {
        Duration::from_millis(self.wait_timeout_ms)
    }

    /// Poll interval for waits
    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms)
    }

    /// Delay between keystrokes
    pub fn keystroke_delay(&self) -> Duration {
        Duration::from_millis(self.keystroke_delay_ms)
    }
}
