//! Mock driver implementation for testing
//!
//! [`MockDriver`] runs the component layer against an in-memory [`MockDom`].
//! Widgets are modelled by attaching event handlers that re-render parts of
//! the tree, and tests assert on the recorded event log.

mod dom;
mod selector;

pub use dom::{DomEvent, EventHandler, EventRecord, MockDom, NodeId, NodeSpec};

use async_trait::async_trait;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{Mutex, RwLock};
use uuid::Uuid;

use super::locator::By;
use super::traits::{Driver, ElementRef, PointerAction};
use crate::{Error, Result};

/// Mock page driver
#[derive(Debug, Clone)]
pub struct MockDriver {
    id: String,
    dom: Arc<Mutex<MockDom>>,
    url: Arc<RwLock<String>>,
    visited: Arc<RwLock<Vec<String>>>,
    closed: Arc<RwLock<bool>>,
}

impl MockDriver {
    /// Create a driver over an empty document
    pub fn new() -> Self {
        Self::with_dom(MockDom::new())
    }

    /// Create a driver over a prepared document
    pub fn with_dom(dom: MockDom) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            dom: Arc::new(Mutex::new(dom)),
            url: Arc::new(RwLock::new("about:blank".to_string())),
            visited: Arc::new(RwLock::new(Vec::new())),
            closed: Arc::new(RwLock::new(false)),
        }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    /// Shared document
    pub fn dom(&self) -> Arc<Mutex<MockDom>> {
        self.dom.clone()
    }

    /// Every URL navigated to, in order
    pub async fn visited(&self) -> Vec<String> {
        self.visited.read().await.clone()
    }

    pub async fn is_closed(&self) -> bool {
        *self.closed.read().await
    }

    fn element(&self, node: NodeId) -> Arc<dyn ElementRef> {
        Arc::new(MockElement {
            id: element_id(node),
            node,
            dom: self.dom.clone(),
        })
    }

    async fn ensure_open(&self) -> Result<()> {
        if *self.closed.read().await {
            Err(Error::websocket("Connection is closed"))
        } else {
            Ok(())
        }
    }
}

impl Default for MockDriver {
    fn default() -> Self {
        Self::new()
    }
}

fn element_id(node: NodeId) -> String {
    format!("mock-{}", node)
}

fn parse_element_id(id: &str) -> Result<NodeId> {
    id.strip_prefix("mock-")
        .and_then(|n| n.parse().ok())
        .ok_or_else(|| Error::stale_element(id.to_string()))
}

#[async_trait]
impl Driver for MockDriver {
    async fn navigate(&self, url: &str) -> Result<()> {
        self.ensure_open().await?;
        *self.url.write().await = url.to_string();
        self.visited.write().await.push(url.to_string());
        Ok(())
    }

    async fn current_url(&self) -> Result<String> {
        Ok(self.url.read().await.clone())
    }

    async fn find_elements(&self, by: &By) -> Result<Vec<Arc<dyn ElementRef>>> {
        self.ensure_open().await?;
        let found = self.dom.lock().await.find(None, by)?;
        Ok(found.into_iter().map(|node| self.element(node)).collect())
    }

    async fn send_keys(&self, keys: &str) -> Result<()> {
        self.ensure_open().await?;
        self.dom.lock().await.type_keys(keys);
        Ok(())
    }

    async fn perform_actions(&self, actions: &[PointerAction]) -> Result<()> {
        self.ensure_open().await?;
        let mut pointer: Option<NodeId> = None;
        let mut clicks = 0;

        for action in actions {
            match action {
                PointerAction::MoveTo { element_id } => {
                    let node = parse_element_id(element_id)?;
                    if pointer != Some(node) {
                        clicks = 0;
                    }
                    pointer = Some(node);
                }
                PointerAction::Down => {}
                PointerAction::Up => {
                    let node = pointer
                        .ok_or_else(|| Error::internal("Pointer released before moving"))?;
                    let mut dom = self.dom.lock().await;
                    dom.click(node)?;
                    clicks += 1;
                    if clicks == 2 {
                        dom.dispatch(node, DomEvent::DoubleClick);
                    }
                }
                PointerAction::Pause { millis } => {
                    tokio::time::sleep(Duration::from_millis(*millis)).await;
                }
            }
        }
        Ok(())
    }

    async fn close(&self) -> Result<()> {
        *self.closed.write().await = true;
        Ok(())
    }
}

/// Element of a [`MockDom`]
#[derive(Debug, Clone)]
pub struct MockElement {
    id: String,
    node: NodeId,
    dom: Arc<Mutex<MockDom>>,
}

impl MockElement {
    /// Arena id of the underlying node
    pub fn node(&self) -> NodeId {
        self.node
    }
}

#[async_trait]
impl ElementRef for MockElement {
    fn id(&self) -> &str {
        &self.id
    }

    async fn tag_name(&self) -> Result<String> {
        let dom = self.dom.lock().await;
        dom.ensure_attached(self.node)?;
        Ok(dom.tag(self.node).unwrap_or_default().to_string())
    }

    async fn text(&self) -> Result<String> {
        let dom = self.dom.lock().await;
        dom.ensure_attached(self.node)?;
        Ok(dom.rendered_text(self.node))
    }

    async fn attribute(&self, name: &str) -> Result<Option<String>> {
        let dom = self.dom.lock().await;
        dom.ensure_attached(self.node)?;
        if name == "textContent" {
            return Ok(Some(dom.text_content(self.node)));
        }
        Ok(dom.attr(self.node, name).map(str::to_string))
    }

    async fn is_displayed(&self) -> Result<bool> {
        let dom = self.dom.lock().await;
        dom.ensure_attached(self.node)?;
        Ok(dom.is_displayed(self.node))
    }

    async fn is_enabled(&self) -> Result<bool> {
        let dom = self.dom.lock().await;
        dom.ensure_attached(self.node)?;
        Ok(dom.is_enabled(self.node))
    }

    async fn click(&self) -> Result<()> {
        self.dom.lock().await.click(self.node)
    }

    async fn submit(&self) -> Result<()> {
        let mut dom = self.dom.lock().await;
        dom.ensure_attached(self.node)?;
        dom.dispatch(self.node, DomEvent::Submit);
        Ok(())
    }

    async fn select_by_visible_text(&self, text: &str) -> Result<bool> {
        self.dom.lock().await.select_option(self.node, text)
    }

    async fn options(&self) -> Result<Vec<String>> {
        let dom = self.dom.lock().await;
        dom.ensure_attached(self.node)?;
        Ok(dom
            .options(self.node)
            .into_iter()
            .map(|o| dom.own_text(o).trim().to_string())
            .collect())
    }

    async fn find_elements(&self, by: &By) -> Result<Vec<Arc<dyn ElementRef>>> {
        let found = self.dom.lock().await.find(Some(self.node), by)?;
        Ok(found
            .into_iter()
            .map(|node| {
                Arc::new(MockElement {
                    id: element_id(node),
                    node,
                    dom: self.dom.clone(),
                }) as Arc<dyn ElementRef>
            })
            .collect())
    }
}
