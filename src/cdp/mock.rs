//! Mock CDP implementation for testing
//!
//! [`MockCdpConnection`] answers commands from per-method queues of scripted
//! results and records every command it receives.

use async_trait::async_trait;
use serde_json::Value;
use std::collections::{HashMap, VecDeque};
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Arc;
use tokio::sync::Mutex;

use crate::cdp::traits::*;
use crate::Error;

/// Mock CDP connection
#[derive(Debug)]
pub struct MockCdpConnection {
    is_active: Arc<AtomicBool>,
    next_id: AtomicU64,
    scripted: Mutex<HashMap<String, VecDeque<Value>>>,
    sent: Mutex<Vec<(String, Value)>>,
}

impl MockCdpConnection {
    /// Create a new mock CDP connection
    pub fn new() -> Self {
        Self {
            is_active: Arc::new(AtomicBool::new(true)),
            next_id: AtomicU64::new(1),
            scripted: Mutex::new(HashMap::new()),
            sent: Mutex::new(Vec::new()),
        }
    }

    /// Queue the result returned by the next `method` command
    pub async fn respond(&self, method: &str, result: Value) {
        self.scripted
            .lock()
            .await
            .entry(method.to_string())
            .or_default()
            .push_back(result);
    }

    /// Queue the value returned by the next script evaluation
    pub async fn respond_value(&self, value: Value) {
        self.respond(
            "Runtime.evaluate",
            serde_json::json!({ "result": { "type": "object", "value": value } }),
        )
        .await;
    }

    /// Commands received so far, as `(method, params)`
    pub async fn sent(&self) -> Vec<(String, Value)> {
        self.sent.lock().await.clone()
    }

    /// Commands received for one method
    pub async fn sent_for(&self, method: &str) -> Vec<Value> {
        self.sent
            .lock()
            .await
            .iter()
            .filter(|(m, _)| m == method)
            .map(|(_, p)| p.clone())
            .collect()
    }

    fn default_result(method: &str, params: &Value) -> Value {
        match method {
            "Page.navigate" => serde_json::json!({
                "frameId": uuid::Uuid::new_v4().to_string(),
                "loaderId": uuid::Uuid::new_v4().to_string(),
            }),
            "Runtime.evaluate" if params["expression"] == "document.readyState" => {
                serde_json::json!({ "result": { "type": "string", "value": "complete" } })
            }
            "Runtime.evaluate" => serde_json::json!({ "result": { "type": "undefined" } }),
            _ => serde_json::json!({}),
        }
    }
}

impl Default for MockCdpConnection {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl CdpConnection for MockCdpConnection {
    async fn send_command(&self, method: &str, params: Value) -> Result<CdpResponse, Error> {
        if !self.is_active.load(Ordering::Relaxed) {
            return Err(Error::websocket("Connection is not active"));
        }

        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        self.sent
            .lock()
            .await
            .push((method.to_string(), params.clone()));

        let scripted = self
            .scripted
            .lock()
            .await
            .get_mut(method)
            .and_then(|queue| queue.pop_front());
        let result = scripted.unwrap_or_else(|| Self::default_result(method, &params));

        Ok(CdpResponse {
            id,
            result: Some(result),
            error: None,
        })
    }

    async fn close(&self) -> Result<(), Error> {
        self.is_active.store(false, Ordering::Relaxed);
        Ok(())
    }

    fn is_active(&self) -> bool {
        self.is_active.load(Ordering::Relaxed)
    }
}
