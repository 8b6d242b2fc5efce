//! Driver implementation over the Chrome DevTools Protocol

use async_trait::async_trait;
use serde_json::Value;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, instrument};

use super::keys::Key;
use super::locator::By;
use super::scripts;
use super::traits::{Driver, ElementRef, PointerAction};
use crate::cdp::types::{KeyEventParams, MouseEventParams};
use crate::cdp::{CdpClient, CdpClientImpl, CdpWebSocketConnection};
use crate::{Error, Result};

const MODIFIER_ALT: u32 = 1;
const MODIFIER_CTRL: u32 = 2;
const MODIFIER_META: u32 = 4;
const MODIFIER_SHIFT: u32 = 8;

/// `(key, code, windowsVirtualKeyCode)` for a special key
fn key_descriptor(key: Key) -> Option<(&'static str, &'static str, u32)> {
    Some(match key {
        Key::Null => return None,
        Key::Backspace => ("Backspace", "Backspace", 8),
        Key::Tab => ("Tab", "Tab", 9),
        Key::Enter => ("Enter", "Enter", 13),
        Key::Shift => ("Shift", "ShiftLeft", 16),
        Key::Control => ("Control", "ControlLeft", 17),
        Key::Alt => ("Alt", "AltLeft", 18),
        Key::Escape => ("Escape", "Escape", 27),
        Key::ArrowLeft => ("ArrowLeft", "ArrowLeft", 37),
        Key::ArrowUp => ("ArrowUp", "ArrowUp", 38),
        Key::ArrowRight => ("ArrowRight", "ArrowRight", 39),
        Key::ArrowDown => ("ArrowDown", "ArrowDown", 40),
        Key::Delete => ("Delete", "Delete", 46),
        Key::Command => ("Meta", "MetaLeft", 91),
    })
}

fn modifier_bit(key: Key) -> u32 {
    match key {
        Key::Alt => MODIFIER_ALT,
        Key::Control => MODIFIER_CTRL,
        Key::Command => MODIFIER_META,
        Key::Shift => MODIFIER_SHIFT,
        _ => 0,
    }
}

/// Translate a key sequence into `Input.dispatchKeyEvent` parameter lists
pub(crate) fn key_events(keys: &str) -> Vec<KeyEventParams> {
    let mut events = Vec::new();
    let mut modifiers = 0u32;
    let mut held: Vec<Key> = Vec::new();

    let event = |kind: &str, modifiers: u32, key: &str, code: &str, text: Option<String>, vk: u32| {
        KeyEventParams {
            r#type: kind.to_string(),
            modifiers,
            key: Some(key.to_string()),
            code: Some(code.to_string()),
            text,
            windows_virtual_key_code: Some(vk),
        }
    };

    let release_all = |held: &mut Vec<Key>, modifiers: &mut u32, events: &mut Vec<KeyEventParams>| {
        for key in held.drain(..).rev() {
            *modifiers &= !modifier_bit(key);
            if let Some((name, code, vk)) = key_descriptor(key) {
                events.push(event("keyUp", *modifiers, name, code, None, vk));
            }
        }
    };

    for ch in keys.chars() {
        match Key::from_code_point(ch) {
            Some(Key::Null) => release_all(&mut held, &mut modifiers, &mut events),
            Some(key) if key.is_modifier() => {
                if !held.contains(&key) {
                    modifiers |= modifier_bit(key);
                    held.push(key);
                    if let Some((name, code, vk)) = key_descriptor(key) {
                        events.push(event("rawKeyDown", modifiers, name, code, None, vk));
                    }
                }
            }
            Some(key) => {
                if let Some((name, code, vk)) = key_descriptor(key) {
                    let text = (key == Key::Enter).then(|| "\r".to_string());
                    events.push(event("keyDown", modifiers, name, code, text, vk));
                    events.push(event("keyUp", modifiers, name, code, None, vk));
                }
            }
            None => {
                let upper = ch.to_ascii_uppercase();
                let code = if ch.is_ascii_alphabetic() {
                    format!("Key{}", upper)
                } else if ch.is_ascii_digit() {
                    format!("Digit{}", ch)
                } else {
                    String::new()
                };
                let vk = if ch.is_ascii_alphanumeric() { upper as u32 } else { 0 };
                let key = ch.to_string();
                // Shortcuts carry no text so the page sees a chord, not input
                let text = (modifiers & (MODIFIER_CTRL | MODIFIER_META) == 0).then(|| key.clone());
                events.push(event("keyDown", modifiers, &key, &code, text, vk));
                events.push(event("keyUp", modifiers, &key, &code, None, vk));
            }
        }
    }
    release_all(&mut held, &mut modifiers, &mut events);
    events
}

async fn dispatch_keys(client: &Arc<dyn CdpClient>, keys: &str) -> Result<()> {
    for event in key_events(keys) {
        client
            .call_method("Input.dispatchKeyEvent", serde_json::to_value(event)?)
            .await?;
    }
    Ok(())
}

async fn evaluate_value(client: &Arc<dyn CdpClient>, script: &str) -> Result<Value> {
    Ok(client.evaluate(script, false).await?.into_value())
}

async fn find_with(
    client: &Arc<dyn CdpClient>,
    scope_id: Option<&str>,
    by: &By,
) -> Result<Vec<Arc<dyn ElementRef>>> {
    let result = evaluate_value(client, &scripts::find_script(scope_id, by)).await?;
    if result["stale"].as_bool().unwrap_or(false) {
        return Err(Error::stale_element(scope_id.unwrap_or("document").to_string()));
    }

    let ids = result["ids"]
        .as_array()
        .ok_or_else(|| Error::cdp(format!("Malformed lookup result for {}", by)))?;
    Ok(ids
        .iter()
        .filter_map(Value::as_str)
        .map(|id| {
            Arc::new(CdpElement {
                id: id.to_string(),
                client: client.clone(),
            }) as Arc<dyn ElementRef>
        })
        .collect())
}

/// Page driver talking CDP to one page target
#[derive(Debug, Clone)]
pub struct CdpDriver {
    client: Arc<dyn CdpClient>,
}

impl CdpDriver {
    pub fn new(client: Arc<dyn CdpClient>) -> Self {
        Self { client }
    }

    /// Connect to a page target's WebSocket debugger URL
    pub async fn connect(ws_url: &str) -> Result<Self> {
        let connection = CdpWebSocketConnection::connect(ws_url).await?;
        Ok(Self::new(Arc::new(CdpClientImpl::new(connection))))
    }

    pub fn client(&self) -> Arc<dyn CdpClient> {
        self.client.clone()
    }

    async fn element_center(&self, element_id: &str) -> Result<(f64, f64)> {
        CdpElement {
            id: element_id.to_string(),
            client: self.client.clone(),
        }
        .center()
        .await
    }

    async fn mouse(&self, kind: &str, (x, y): (f64, f64), click_count: Option<u32>) -> Result<()> {
        let params = MouseEventParams {
            r#type: kind.to_string(),
            x,
            y,
            button: click_count.map(|_| "left".to_string()),
            click_count,
        };
        self.client
            .call_method("Input.dispatchMouseEvent", serde_json::to_value(params)?)
            .await?;
        Ok(())
    }
}

#[async_trait]
impl Driver for CdpDriver {
    #[instrument(skip(self))]
    async fn navigate(&self, url: &str) -> Result<()> {
        self.client.navigate(url).await?;
        Ok(())
    }

    async fn current_url(&self) -> Result<String> {
        match self.client.evaluate("window.location.href", false).await?.into_value() {
            Value::String(url) => Ok(url),
            other => Err(Error::cdp(format!("Unexpected location value: {}", other))),
        }
    }

    async fn find_elements(&self, by: &By) -> Result<Vec<Arc<dyn ElementRef>>> {
        find_with(&self.client, None, by).await
    }

    async fn send_keys(&self, keys: &str) -> Result<()> {
        dispatch_keys(&self.client, keys).await
    }

    async fn perform_actions(&self, actions: &[PointerAction]) -> Result<()> {
        let mut position: Option<(f64, f64)> = None;
        let mut click_count = 0u32;

        for action in actions {
            match action {
                PointerAction::MoveTo { element_id } => {
                    let target = self.element_center(element_id).await?;
                    if position != Some(target) {
                        click_count = 0;
                    }
                    position = Some(target);
                    self.mouse("mouseMoved", target, None).await?;
                }
                PointerAction::Down => {
                    let at = position.ok_or_else(|| Error::internal("Pointer pressed before moving"))?;
                    click_count += 1;
                    self.mouse("mousePressed", at, Some(click_count)).await?;
                }
                PointerAction::Up => {
                    let at = position.ok_or_else(|| Error::internal("Pointer released before moving"))?;
                    self.mouse("mouseReleased", at, Some(click_count.max(1))).await?;
                }
                PointerAction::Pause { millis } => {
                    tokio::time::sleep(Duration::from_millis(*millis)).await;
                }
            }
        }
        Ok(())
    }

    async fn close(&self) -> Result<()> {
        self.client.connection().close().await
    }
}

/// Element registered in the page-side registry
#[derive(Debug, Clone)]
pub struct CdpElement {
    id: String,
    client: Arc<dyn CdpClient>,
}

impl CdpElement {
    /// Run `body` against the element, mapping a detached node to a stale error
    async fn run(&self, body: &str) -> Result<Value> {
        let mut result = evaluate_value(&self.client, &scripts::element_script(&self.id, body)).await?;
        if result["stale"].as_bool().unwrap_or(true) {
            return Err(Error::stale_element(self.id.clone()));
        }
        Ok(result["value"].take())
    }

    async fn center(&self) -> Result<(f64, f64)> {
        let center = self.run(scripts::CENTER).await?;
        if !center["visible"].as_bool().unwrap_or(false) {
            return Err(Error::element_not_interactable(format!(
                "Element {} has no rendered area",
                self.id
            )));
        }
        match (center["x"].as_f64(), center["y"].as_f64()) {
            (Some(x), Some(y)) => Ok((x, y)),
            _ => Err(Error::cdp(format!("Malformed element box for {}", self.id))),
        }
    }
}

#[async_trait]
impl ElementRef for CdpElement {
    fn id(&self) -> &str {
        &self.id
    }

    async fn tag_name(&self) -> Result<String> {
        Ok(self.run(scripts::TAG_NAME).await?.as_str().unwrap_or_default().to_string())
    }

    async fn text(&self) -> Result<String> {
        Ok(self.run(scripts::TEXT).await?.as_str().unwrap_or_default().to_string())
    }

    async fn attribute(&self, name: &str) -> Result<Option<String>> {
        Ok(self
            .run(&scripts::attribute(name))
            .await?
            .as_str()
            .map(str::to_string))
    }

    async fn is_displayed(&self) -> Result<bool> {
        Ok(self.run(scripts::IS_DISPLAYED).await?.as_bool().unwrap_or(false))
    }

    async fn is_enabled(&self) -> Result<bool> {
        Ok(self.run(scripts::IS_ENABLED).await?.as_bool().unwrap_or(false))
    }

    async fn click(&self) -> Result<()> {
        let at = self.center().await?;
        debug!("Clicking element {} at {:?}", self.id, at);
        for kind in ["mouseMoved", "mousePressed", "mouseReleased"] {
            let click_count = (kind != "mouseMoved").then_some(1);
            let params = MouseEventParams {
                r#type: kind.to_string(),
                x: at.0,
                y: at.1,
                button: click_count.map(|_| "left".to_string()),
                click_count,
            };
            self.client
                .call_method("Input.dispatchMouseEvent", serde_json::to_value(params)?)
                .await?;
        }
        Ok(())
    }

    async fn submit(&self) -> Result<()> {
        let submitted = self.run(scripts::SUBMIT_FORM).await?.as_bool().unwrap_or(false);
        if !submitted {
            dispatch_keys(&self.client, &Key::Enter.to_string()).await?;
        }
        Ok(())
    }

    async fn select_by_visible_text(&self, text: &str) -> Result<bool> {
        Ok(self
            .run(&scripts::select_by_visible_text(text))
            .await?
            .as_bool()
            .unwrap_or(false))
    }

    async fn options(&self) -> Result<Vec<String>> {
        let options = self.run(scripts::OPTIONS).await?;
        Ok(options
            .as_array()
            .map(|items| {
                items
                    .iter()
                    .filter_map(Value::as_str)
                    .map(str::to_string)
                    .collect()
            })
            .unwrap_or_default())
    }

    async fn find_elements(&self, by: &By) -> Result<Vec<Arc<dyn ElementRef>>> {
        find_with(&self.client, Some(&self.id), by).await
    }
}
