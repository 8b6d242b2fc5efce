//! Mock Chrome DevTools Protocol server
//!
//! Serves one page target over WebSocket that renders a single Perspective
//! label, enough to drive a session through the real CDP transport.

#![allow(dead_code)]

use futures_util::{SinkExt, StreamExt};
use serde_json::{json, Value};
use std::sync::{Arc, Mutex};
use tokio::net::{TcpListener, TcpStream};
use tokio_tungstenite::{accept_async, tungstenite::Message};

/// Text of the only element on the mock page
pub const LABEL_TEXT: &str = "Running";

/// Mock Chrome page target
pub struct MockChromeServer {
    addr: String,
    methods: Arc<Mutex<Vec<String>>>,
    shutdown_tx: Option<tokio::sync::oneshot::Sender<()>>,
}

impl MockChromeServer {
    /// Start a new mock Chrome server
    pub async fn start() -> Result<Self, Box<dyn std::error::Error>> {
        let listener = TcpListener::bind("127.0.0.1:0").await?;
        let addr = listener.local_addr()?;
        let ws_addr = format!("ws://{}/devtools/page/mock", addr);
        let methods = Arc::new(Mutex::new(Vec::new()));

        let (shutdown_tx, mut shutdown_rx) = tokio::sync::oneshot::channel::<()>();

        let recorded = methods.clone();
        tokio::spawn(async move {
            loop {
                tokio::select! {
                    result = listener.accept() => {
                        match result {
                            Ok((stream, peer_addr)) => {
                                tracing::info!("Mock Chrome: Connection from {}", peer_addr);
                                tokio::spawn(Self::handle_connection(stream, recorded.clone()));
                            }
                            Err(e) => {
                                tracing::error!("Mock Chrome: Accept error: {}", e);
                                break;
                            }
                        }
                    }
                    _ = &mut shutdown_rx => {
                        tracing::info!("Mock Chrome: Shutdown signal received");
                        break;
                    }
                }
            }
        });

        Ok(Self {
            addr: ws_addr,
            methods,
            shutdown_tx: Some(shutdown_tx),
        })
    }

    async fn handle_connection(stream: TcpStream, methods: Arc<Mutex<Vec<String>>>) {
        let ws_stream = match accept_async(stream).await {
            Ok(ws_stream) => ws_stream,
            Err(e) => {
                tracing::error!("Mock Chrome: WebSocket handshake error: {}", e);
                return;
            }
        };
        let (mut ws_sender, mut ws_receiver) = ws_stream.split();

        while let Some(result) = ws_receiver.next().await {
            match result {
                Ok(Message::Text(text)) => {
                    let Ok(req) = serde_json::from_str::<Value>(&text) else {
                        continue;
                    };
                    let method = req["method"].as_str().unwrap_or("unknown").to_string();
                    methods.lock().unwrap().push(method.clone());

                    let response = Self::create_cdp_response(&req);
                    if ws_sender.send(Message::Text(response.to_string())).await.is_err() {
                        break;
                    }

                    // Console output the page produces once logging is on
                    if method == "Log.enable" {
                        let entry = json!({
                            "method": "Log.entryAdded",
                            "params": { "entry": { "level": "info", "text": "Perspective client started" } }
                        });
                        if ws_sender.send(Message::Text(entry.to_string())).await.is_err() {
                            break;
                        }
                    }
                }
                Ok(Message::Close(_)) => break,
                Err(e) => {
                    tracing::error!("Mock Chrome: WebSocket error: {}", e);
                    break;
                }
                _ => {}
            }
        }
    }

    /// Answer one CDP request
    fn create_cdp_response(req: &Value) -> Value {
        let method = req["method"].as_str().unwrap_or("unknown");
        let id = req["id"].as_u64().unwrap_or(0);

        match method {
            "Log.enable" | "Runtime.enable" | "Page.enable" | "Input.dispatchMouseEvent"
            | "Input.dispatchKeyEvent" => json!({ "id": id, "result": {} }),
            "Page.navigate" => json!({
                "id": id,
                "result": { "frameId": "mock-frame", "loaderId": "mock-loader" }
            }),
            "Runtime.evaluate" => {
                let expression = req["params"]["expression"].as_str().unwrap_or_default();
                json!({ "id": id, "result": { "result": Self::evaluate(expression) } })
            }
            _ => json!({
                "id": id,
                "error": { "code": -32601, "message": format!("Method not implemented: {}", method) }
            }),
        }
    }

    /// Remote object for the page-side scripts the driver runs
    fn evaluate(expression: &str) -> Value {
        if expression == "document.readyState" {
            json!({ "type": "string", "value": "complete" })
        } else if expression.contains("ids: []") {
            if expression.contains("ia_labelComponent") {
                json!({ "type": "object", "value": { "stale": false, "ids": ["1"] } })
            } else {
                json!({ "type": "object", "value": { "stale": false, "ids": [] } })
            }
        } else if expression.contains("el.innerText") {
            json!({ "type": "object", "value": { "stale": false, "value": LABEL_TEXT } })
        } else {
            json!({ "type": "undefined" })
        }
    }

    /// WebSocket debugger URL of the page target
    pub fn ws_endpoint(&self) -> &str {
        &self.addr
    }

    /// CDP methods received so far, in order
    pub fn methods(&self) -> Vec<String> {
        self.methods.lock().unwrap().clone()
    }
}

impl Drop for MockChromeServer {
    fn drop(&mut self) {
        if let Some(tx) = self.shutdown_tx.take() {
            let _ = tx.send(());
        }
    }
}
