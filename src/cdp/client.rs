//! CDP client implementation
//!
//! This module provides a high-level CDP client with typed methods for common operations.

use super::traits::*;
use super::types::*;
use crate::Error;
use async_trait::async_trait;
use std::sync::Arc;
use tokio::time::Duration;
use tracing::{debug, info, warn};

/// Attempts at reading `document.readyState` after a navigation
const LOAD_POLL_ATTEMPTS: u32 = 50;
const LOAD_POLL_INTERVAL: Duration = Duration::from_millis(100);

/// CDP client implementation
#[derive(Debug, Clone)]
pub struct CdpClientImpl {
    /// Underlying CDP connection
    connection: Arc<dyn CdpConnection>,
}

impl CdpClientImpl {
    /// Create a new CDP client
    ///
    /// # Arguments
    /// * `connection` - CDP connection instance
    pub fn new(connection: Arc<dyn CdpConnection>) -> Self {
        Self { connection }
    }

    /// Parse remote object value to evaluation result
    fn parse_remote_object(obj: &RemoteObject) -> EvaluationResult {
        match obj.r#type.as_str() {
            "string" => EvaluationResult::String(
                obj.value
                    .as_ref()
                    .and_then(|v| v.as_str())
                    .unwrap_or_default()
                    .to_string(),
            ),
            "number" => {
                EvaluationResult::Number(obj.value.as_ref().and_then(|v| v.as_f64()).unwrap_or(0.0))
            }
            "boolean" => {
                EvaluationResult::Bool(obj.value.as_ref().and_then(|v| v.as_bool()).unwrap_or(false))
            }
            "object" if obj.subtype.as_deref() == Some("null") => EvaluationResult::Null,
            "object" => EvaluationResult::Object(obj.value.clone().unwrap_or(serde_json::Value::Null)),
            other => {
                debug!("parse_remote_object: type '{}' carries no value", other);
                EvaluationResult::Null
            }
        }
    }
}

#[async_trait]
impl CdpClient for CdpClientImpl {
    fn connection(&self) -> Arc<dyn CdpConnection> {
        Arc::clone(&self.connection)
    }

    async fn navigate(&self, url: &str) -> Result<NavigationResult, Error> {
        info!("Navigating to {}", url);

        let params = NavigateParams { url: url.to_string() };
        let result = self
            .call_method("Page.navigate", serde_json::to_value(params)?)
            .await?;

        if let Some(error_text) = result.get("errorText").and_then(|v| v.as_str()) {
            return Err(Error::cdp(format!("Navigation to {} failed: {}", url, error_text)));
        }

        // Polling readyState avoids racing the load event
        let mut is_loaded = false;
        for attempt in 0..LOAD_POLL_ATTEMPTS {
            tokio::time::sleep(LOAD_POLL_INTERVAL).await;

            match self.evaluate("document.readyState", false).await {
                Ok(EvaluationResult::String(state)) if state == "complete" => {
                    debug!("Page loaded on attempt {}", attempt + 1);
                    is_loaded = true;
                    break;
                }
                Ok(state) => debug!("Document ready state on attempt {}: {:?}", attempt + 1, state),
                Err(e) => debug!("Error checking ready state on attempt {}: {}", attempt + 1, e),
            }
        }

        if !is_loaded {
            warn!("Page load polling timeout for {}; continuing", url);
        }

        Ok(NavigationResult {
            navigation_id: result
                .get("loaderId")
                .and_then(|v| v.as_str())
                .map(|s| s.to_string()),
            url: url.to_string(),
            is_loaded,
        })
    }

    async fn evaluate(&self, script: &str, await_promise: bool) -> Result<EvaluationResult, Error> {
        let params = EvaluateParams {
            expression: script.to_string(),
            await_promise: Some(await_promise),
            return_by_value: Some(true),
        };

        let result = self
            .call_method("Runtime.evaluate", serde_json::to_value(params)?)
            .await?;

        let response: EvaluateResponse = serde_json::from_value(result)
            .map_err(|e| Error::cdp(format!("Failed to parse EvaluateResponse: {}", e)))?;

        if let Some(details) = response.exception_details {
            let description = details
                .exception
                .and_then(|e| e.description)
                .or(details.text)
                .unwrap_or_else(|| "Unknown error".to_string());
            return Err(Error::cdp(format!("Script threw: {}", description)));
        }

        Ok(Self::parse_remote_object(&response.result))
    }

    async fn enable_domain(&self, domain: &str) -> Result<(), Error> {
        info!("Enabling domain: {}", domain);
        self.call_method(&format!("{}.enable", domain), serde_json::json!({}))
            .await?;
        Ok(())
    }

    async fn call_method(&self, method: &str, params: serde_json::Value) -> Result<serde_json::Value, Error> {
        let response = self.connection.send_command(method, params).await?;
        response.result.ok_or_else(|| Error::cdp(format!("No result in response to {}", method)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cdp::mock::MockCdpConnection;

    fn remote(kind: &str, value: Option<serde_json::Value>) -> RemoteObject {
        RemoteObject {
            r#type: kind.to_string(),
            subtype: None,
            value,
            description: None,
        }
    }

    #[test]
    fn test_parse_remote_object_scalars() {
        assert_eq!(
            CdpClientImpl::parse_remote_object(&remote("string", Some(serde_json::json!("3")))),
            EvaluationResult::String("3".to_string())
        );
        assert_eq!(
            CdpClientImpl::parse_remote_object(&remote("number", Some(serde_json::json!(42.5)))),
            EvaluationResult::Number(42.5)
        );
        assert_eq!(
            CdpClientImpl::parse_remote_object(&remote("boolean", Some(serde_json::json!(true)))),
            EvaluationResult::Bool(true)
        );
        assert_eq!(
            CdpClientImpl::parse_remote_object(&remote("undefined", None)),
            EvaluationResult::Null
        );
    }

    #[tokio::test]
    async fn test_evaluate_surfaces_exceptions() {
        let connection = Arc::new(MockCdpConnection::new());
        connection
            .respond(
                "Runtime.evaluate",
                serde_json::json!({
                    "result": { "type": "object" },
                    "exceptionDetails": {
                        "text": "Uncaught",
                        "exception": { "type": "object", "description": "TypeError: boom" }
                    }
                }),
            )
            .await;
        let client = CdpClientImpl::new(connection);

        let err = client.evaluate("null.x", false).await.unwrap_err();
        assert!(err.to_string().contains("TypeError: boom"));
    }

    #[tokio::test]
    async fn test_enable_domain_sends_enable_command() {
        let connection = Arc::new(MockCdpConnection::new());
        let client = CdpClientImpl::new(connection.clone());

        client.enable_domain("Log").await.unwrap();

        let sent = connection.sent().await;
        assert_eq!(sent.len(), 1);
        assert_eq!(sent[0].0, "Log.enable");
    }
}
