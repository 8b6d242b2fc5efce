//! Browser session
//!
//! A [`Session`] owns one page connection plus everything components need to
//! talk to it: the default wait, the key chord for "select all", and the
//! navigation history. It is shared with components through `Arc<Session>`
//! and meant to be used from one task at a time.

use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Mutex;
use tracing::{info, instrument};
use uuid::Uuid;

use crate::component::ElementHandle;
use crate::config::SessionConfig;
use crate::driver::{By, CdpDriver, Driver, Platform};
use crate::wait::{ElementWait, Scope};
use crate::{Error, Result};

/// One browser page under test
#[derive(Debug)]
pub struct Session {
    id: String,
    driver: Arc<dyn Driver>,
    config: SessionConfig,
    platform: Platform,
    select_all_keys: String,
    history: Mutex<Vec<String>>,
}

impl Session {
    /// Wrap an already connected driver without navigating
    pub fn new(driver: Arc<dyn Driver>, config: SessionConfig) -> Arc<Self> {
        let platform = config.platform.unwrap_or_else(Platform::current);
        Arc::new(Self {
            id: Uuid::new_v4().to_string(),
            driver,
            select_all_keys: platform.select_all_chord(),
            platform,
            config,
            history: Mutex::new(Vec::new()),
        })
    }

    /// Wrap a driver and open the configured start page
    pub async fn start(driver: Arc<dyn Driver>, config: SessionConfig) -> Result<Arc<Self>> {
        config.validate()?;
        let session = Self::new(driver, config);
        let start_url = session.config.start_url();
        session.navigate_to_url(Some(&start_url)).await?;
        info!("Session {} started at {}", session.id, start_url);
        Ok(session)
    }

    /// Connect to the configured remote CDP endpoint and open the start page
    ///
    /// Each configured log channel is enabled as a CDP domain so the page's
    /// console output reaches the `browser` tracing target.
    pub async fn connect(config: SessionConfig) -> Result<Arc<Self>> {
        let endpoint = config.remote_endpoint.clone().ok_or_else(|| {
            Error::configuration("remote_endpoint is required to connect a session")
        })?;
        let driver = CdpDriver::connect(&endpoint).await?;

        for channel in &config.log_channels {
            driver.client().enable_domain(channel).await?;
        }

        Self::start(Arc::new(driver), config).await
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn driver(&self) -> Arc<dyn Driver> {
        self.driver.clone()
    }

    pub fn config(&self) -> &SessionConfig {
        &self.config
    }

    pub fn platform(&self) -> Platform {
        self.platform
    }

    /// Select-all chord for this session's platform
    pub fn select_all_keys(&self) -> &str {
        &self.select_all_keys
    }

    pub fn default_timeout(&self) -> Duration {
        self.config.wait_timeout()
    }

    pub fn keystroke_delay(&self) -> Duration {
        self.config.keystroke_delay()
    }

    /// Wait with the given timeout, or the session default
    pub fn wait(&self, timeout: Option<Duration>) -> ElementWait {
        ElementWait::new(
            timeout.unwrap_or_else(|| self.default_timeout()),
            self.config.poll_interval(),
        )
    }

    /// Navigate to `url`, or to the base URL when `None`
    #[instrument(skip(self))]
    pub async fn navigate_to_url(&self, url: Option<&str>) -> Result<()> {
        let target = url.unwrap_or(&self.config.base_url).to_string();
        self.driver.navigate(&target).await?;
        self.history.lock().await.push(target);
        Ok(())
    }

    /// Return to the previous page in the history
    ///
    /// Returns `false` when there is nothing to go back to.
    pub async fn navigate_back(&self) -> Result<bool> {
        let mut history = self.history.lock().await;
        if history.len() < 2 {
            return Ok(false);
        }
        history.pop();
        let Some(previous) = history.last().cloned() else {
            return Ok(false);
        };
        self.driver.navigate(&previous).await?;
        Ok(true)
    }

    /// URLs visited through this session, oldest first
    pub async fn history(&self) -> Vec<String> {
        self.history.lock().await.clone()
    }

    /// Open the gateway's home page
    pub async fn open_gateway_webpage(&self) -> Result<()> {
        let url = format!("{}/web/home", self.config.base_url.trim_end_matches('/'));
        self.navigate_to_url(Some(&url)).await
    }

    /// Wait for an element anywhere in the document
    pub async fn wait_for_element(&self, by: &By, timeout: Option<Duration>) -> Result<ElementHandle> {
        let scope = Scope::Document(self.driver.clone());
        let element = self.wait(timeout).for_element(&scope, by).await?;
        Ok(ElementHandle::new(element, self.driver.clone()))
    }

    /// Wait for at least one element anywhere in the document
    pub async fn wait_for_elements(&self, by: &By, timeout: Option<Duration>) -> Result<Vec<ElementHandle>> {
        let scope = Scope::Document(self.driver.clone());
        let elements = self.wait(timeout).for_elements(&scope, by).await?;
        Ok(elements
            .into_iter()
            .map(|element| ElementHandle::new(element, self.driver.clone()))
            .collect())
    }

    /// Tear the browser connection down
    pub async fn close(&self) -> Result<()> {
        info!("Closing session {}", self.id);
        self.driver.close().await
    }
}
