//! Polling waits
//!
//! [`ElementWait`] re-runs a probe until it yields a value or the timeout
//! elapses. Missing and stale elements keep the loop polling; any other error
//! stops it and is returned wrapped with what was being waited for. Running
//! out of time is reported as [`Error::ElementNotFound`] (or
//! [`Error::ElementNotUpdated`] for state-change waits), never as a
//! transport timeout.

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;
use tokio::time::Instant;
use tracing::{debug, trace};

use crate::driver::{By, Driver, ElementRef};
use crate::{Error, Result};

/// Where a lookup starts
#[derive(Debug, Clone)]
pub enum Scope {
    /// The whole document
    Document(Arc<dyn Driver>),
    /// Descendants of one element
    Element(Arc<dyn ElementRef>),
}

impl Scope {
    /// Immediate lookup, no waiting
    pub async fn find_elements(&self, by: &By) -> Result<Vec<Arc<dyn ElementRef>>> {
        match self {
            Scope::Document(driver) => driver.find_elements(by).await,
            Scope::Element(element) => element.find_elements(by).await,
        }
    }
}

/// Timeout and poll interval for one wait
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ElementWait {
    timeout: Duration,
    poll_interval: Duration,
}

impl ElementWait {
    pub fn new(timeout: Duration, poll_interval: Duration) -> Self {
        Self {
            timeout,
            poll_interval,
        }
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    pub fn poll_interval(&self) -> Duration {
        self.poll_interval
    }

    /// Same poll interval, different timeout
    pub fn with_timeout(self, timeout: Duration) -> Self {
        Self { timeout, ..self }
    }

    /// Poll `probe` until it yields a value
    ///
    /// Fails with [`Error::ElementNotFound`] naming `description` on timeout.
    pub async fn until<T, F, Fut>(&self, description: &str, probe: F) -> Result<T>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<Option<T>>>,
    {
        self.poll(description, probe, || {
            Error::element_not_found(format!("Unable to verify presence of {}", description))
        })
        .await
    }

    /// Poll `probe` until an expected state change shows up
    ///
    /// Fails with [`Error::ElementNotUpdated`] naming `description` on timeout.
    pub async fn until_updated<T, F, Fut>(&self, description: &str, probe: F) -> Result<T>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<Option<T>>>,
    {
        self.poll(description, probe, || {
            Error::element_not_updated(format!("Timed out waiting for {}", description))
        })
        .await
    }

    async fn poll<T, F, Fut, E>(&self, description: &str, mut probe: F, on_timeout: E) -> Result<T>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<Option<T>>>,
        E: FnOnce() -> Error,
    {
        let deadline = Instant::now() + self.timeout;
        let mut attempts = 0u32;

        loop {
            attempts += 1;
            match probe().await {
                Ok(Some(value)) => {
                    trace!("{} satisfied after {} attempt(s)", description, attempts);
                    return Ok(value);
                }
                Ok(None) => {}
                Err(e) if e.is_retryable() => trace!("Retrying {}: {}", description, e),
                Err(e) => return Err(Error::driver(format!("Error waiting for {}", description), e)),
            }

            let now = Instant::now();
            if now >= deadline {
                debug!("Gave up on {} after {} attempt(s)", description, attempts);
                return Err(on_timeout());
            }
            tokio::time::sleep(self.poll_interval.min(deadline - now)).await;
        }
    }

    /// First element matching `by` in `scope`
    pub async fn for_element(&self, scope: &Scope, by: &By) -> Result<Arc<dyn ElementRef>> {
        self.until(&by.to_string(), || async move {
            Ok(scope.find_elements(by).await?.into_iter().next())
        })
        .await
    }

    /// All elements matching `by` in `scope`, once at least one is present
    pub async fn for_elements(&self, scope: &Scope, by: &By) -> Result<Vec<Arc<dyn ElementRef>>> {
        self.until(&by.to_string(), || async move {
            let found = scope.find_elements(by).await?;
            Ok((!found.is_empty()).then_some(found))
        })
        .await
    }

    /// First element matching `by` that is displayed and enabled
    pub async fn for_clickable(&self, scope: &Scope, by: &By) -> Result<Arc<dyn ElementRef>> {
        self.until(&format!("clickable {}", by), || async move {
            for element in scope.find_elements(by).await? {
                if element.is_displayed().await? && element.is_enabled().await? {
                    return Ok(Some(element));
                }
            }
            Ok(None)
        })
        .await
    }

    /// New text of `element` once it differs from `previous`
    pub async fn for_text_change(&self, element: &Arc<dyn ElementRef>, previous: &str) -> Result<String> {
        let description = format!("text of element {} to change from {:?}", element.id(), previous);
        self.until_updated(&description, || async move {
            let text = element.text().await?;
            Ok((text != previous).then_some(text))
        })
        .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::driver::{MockDriver, NodeSpec};
    use std::sync::atomic::{AtomicUsize, Ordering};

    fn short_wait() -> ElementWait {
        ElementWait::new(Duration::from_millis(200), Duration::from_millis(10))
    }

    #[tokio::test]
    async fn test_never_satisfied_times_out_as_not_found() {
        let started = std::time::Instant::now();
        let result: Result<()> = short_wait()
            .until("id: missing", || async { Ok(None) })
            .await;

        let elapsed = started.elapsed();
        assert!(matches!(result, Err(Error::ElementNotFound(ref m)) if m.contains("id: missing")));
        assert!(elapsed >= Duration::from_millis(200));
        assert!(elapsed < Duration::from_secs(2));
    }

    #[tokio::test]
    async fn test_retryable_errors_keep_polling() {
        let calls = AtomicUsize::new(0);
        let value = short_wait()
            .until("class name: ia_pager", || {
                let n = calls.fetch_add(1, Ordering::SeqCst);
                async move {
                    match n {
                        0 => Err(Error::stale_element("3")),
                        1 => Ok(None),
                        _ => Ok(Some(n)),
                    }
                }
            })
            .await
            .unwrap();

        assert_eq!(value, 2);
    }

    #[tokio::test]
    async fn test_unexpected_error_is_wrapped_immediately() {
        let started = std::time::Instant::now();
        let result: Result<()> = short_wait()
            .until("css selector: .x", || async { Err(Error::cdp("socket reset")) })
            .await;

        match result {
            Err(Error::Driver { context, source }) => {
                assert_eq!(context, "Error waiting for css selector: .x");
                assert!(matches!(*source, Error::Cdp(_)));
            }
            other => panic!("unexpected result: {:?}", other),
        }
        assert!(started.elapsed() < Duration::from_millis(200));
    }

    #[tokio::test]
    async fn test_until_updated_reports_not_updated() {
        let result: Result<()> = short_wait()
            .until_updated("page to change", || async { Ok(None) })
            .await;
        assert!(matches!(result, Err(Error::ElementNotUpdated(_))));
    }

    #[tokio::test]
    async fn test_for_clickable_skips_hidden_and_disabled() {
        let driver = MockDriver::new();
        let enabled = {
            let dom = driver.dom();
            let mut dom = dom.lock().await;
            let root = dom.root();
            dom.append(root, NodeSpec::new("button").class("ia_button").text("Hidden").hidden());
            dom.append(
                root,
                NodeSpec::new("button").class("ia_button").attr("disabled", "").text("Disabled"),
            );
            dom.append(root, NodeSpec::new("button").class("ia_button").text("Save"))
        };
        let scope = Scope::Document(Arc::new(driver.clone()));

        let found = short_wait()
            .for_clickable(&scope, &By::class_name("ia_button"))
            .await
            .unwrap();
        assert_eq!(found.text().await.unwrap(), "Save");

        driver.dom().lock().await.set_attr(enabled, "disabled", "");
        let result = short_wait()
            .for_clickable(&scope, &By::class_name("ia_button"))
            .await;
        assert!(matches!(result, Err(Error::ElementNotFound(ref m)) if m.contains("clickable class name: ia_button")));
    }

    #[tokio::test]
    async fn test_for_text_change_returns_new_text() {
        let driver = MockDriver::new();
        let label = {
            let dom = driver.dom();
            let mut dom = dom.lock().await;
            let root = dom.root();
            dom.append(root, NodeSpec::new("div").id("state").text("Idle"))
        };
        let element = driver.find_elements(&By::id("state")).await.unwrap().remove(0);

        let dom = driver.dom();
        tokio::spawn(async move {
            tokio::time::sleep(Duration::from_millis(50)).await;
            dom.lock().await.set_text(label, "Running");
        });

        let text = short_wait().for_text_change(&element, "Idle").await.unwrap();
        assert_eq!(text, "Running");
    }

    #[tokio::test]
    async fn test_for_text_change_times_out_as_not_updated() {
        let driver = MockDriver::new();
        {
            let dom = driver.dom();
            let mut dom = dom.lock().await;
            let root = dom.root();
            dom.append(root, NodeSpec::new("div").id("state").text("Idle"));
        }
        let element = driver.find_elements(&By::id("state")).await.unwrap().remove(0);

        let result = short_wait().for_text_change(&element, "Idle").await;
        assert!(matches!(result, Err(Error::ElementNotUpdated(_))));
    }
}
