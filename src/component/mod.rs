//! # Component layer
//!
//! A [`Component`] binds one page element, either found by locator (from the
//! document or inside a parent element) or handed over directly. Lookup is
//! lazy: nothing touches the page until the first operation, and the element
//! found then is kept for the component's lifetime. Construct a new component
//! to pick up a re-rendered node.
//!
//! Widgets wrap a `Component` and opt into shared behaviour through the
//! [`Clickable`], [`TextReadable`] and [`KeyInputTarget`] traits.

mod element;

pub use element::ElementHandle;

use async_trait::async_trait;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::OnceCell;
use tracing::debug;

use crate::driver::By;
use crate::session::Session;
use crate::wait::{ElementWait, Scope};
use crate::Result;

/// Locator plus optional parent scope
#[derive(Debug, Clone)]
struct Locator {
    by: By,
    parent: Option<ElementHandle>,
}

/// A lazily resolved page element
#[derive(Debug, Clone)]
pub struct Component {
    session: Arc<Session>,
    locator: Option<Locator>,
    timeout: Option<Duration>,
    handle: OnceCell<ElementHandle>,
}

impl Component {
    /// Component located from the document root on first use
    pub fn new(session: &Arc<Session>, by: By) -> Self {
        Self {
            session: session.clone(),
            locator: Some(Locator { by, parent: None }),
            timeout: None,
            handle: OnceCell::new(),
        }
    }

    /// Component bound to an element that was already found
    pub fn from_element(session: &Arc<Session>, handle: ElementHandle) -> Self {
        Self {
            session: session.clone(),
            locator: None,
            timeout: None,
            handle: OnceCell::new_with(Some(handle)),
        }
    }

    /// Restrict the lookup to descendants of `parent`
    pub fn within(mut self, parent: &ElementHandle) -> Self {
        if let Some(locator) = self.locator.as_mut() {
            locator.parent = Some(parent.clone());
        }
        self
    }

    /// Override the session's default wait for this component
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// Resolve now instead of on first use
    pub async fn locate(self) -> Result<Self> {
        self.resolve().await?;
        Ok(self)
    }

    /// The bound element, looked up on the first call
    pub async fn resolve(&self) -> Result<&ElementHandle> {
        self.handle
            .get_or_try_init(|| async {
                // `from_element` always fills the cell, so a locator exists here
                let locator = self.locator.as_ref().ok_or_else(|| {
                    crate::Error::internal("Component has neither an element nor a locator")
                })?;
                let scope = match &locator.parent {
                    Some(parent) => parent.scope(),
                    None => Scope::Document(self.session.driver()),
                };
                debug!("Resolving component {}", locator.by);
                let element = self.wait().for_element(&scope, &locator.by).await?;
                Ok::<_, crate::Error>(ElementHandle::new(element, self.session.driver()))
            })
            .await
    }

    /// Whether the element has been looked up yet
    pub fn is_resolved(&self) -> bool {
        self.handle.initialized()
    }

    pub fn session(&self) -> &Arc<Session> {
        &self.session
    }

    /// Locator the component was built from, if any
    pub fn by(&self) -> Option<&By> {
        self.locator.as_ref().map(|l| &l.by)
    }

    /// Effective wait for lookups made by this component
    pub fn wait(&self) -> ElementWait {
        self.session.wait(self.timeout)
    }

    async fn scope(&self) -> Result<Scope> {
        Ok(self.resolve().await?.scope())
    }

    pub async fn text(&self) -> Result<String> {
        self.resolve().await?.text().await
    }

    pub async fn attribute(&self, name: &str) -> Result<Option<String>> {
        self.resolve().await?.attribute(name).await
    }

    pub async fn has_class(&self, class: &str) -> Result<bool> {
        self.resolve().await?.has_class(class).await
    }

    pub async fn is_displayed(&self) -> Result<bool> {
        self.resolve().await?.is_displayed().await
    }

    pub async fn click(&self) -> Result<()> {
        self.resolve().await?.click().await
    }

    pub async fn double_click(&self) -> Result<()> {
        self.resolve().await?.double_click().await
    }

    /// Type into whatever has focus
    pub async fn send_keys(&self, keys: &str) -> Result<()> {
        self.resolve().await?.send_keys(keys).await
    }

    pub async fn submit(&self) -> Result<()> {
        self.resolve().await?.submit().await
    }

    /// Send the session's select-all chord to the focused field
    pub async fn select_all(&self) -> Result<()> {
        self.send_keys(self.session.select_all_keys()).await
    }

    pub async fn find(&self, by: &By) -> Result<Option<ElementHandle>> {
        self.resolve().await?.find(by).await
    }

    pub async fn find_all(&self, by: &By) -> Result<Vec<ElementHandle>> {
        self.resolve().await?.find_all(by).await
    }

    pub async fn has_element(&self, by: &By) -> Result<bool> {
        self.resolve().await?.has_element(by).await
    }

    pub async fn find_by_class_name(&self, name: &str) -> Result<ElementHandle> {
        self.resolve().await?.find_by_class_name(name).await
    }

    pub async fn find_all_by_class_name(&self, name: &str) -> Result<Vec<ElementHandle>> {
        self.resolve().await?.find_all_by_class_name(name).await
    }

    pub async fn find_by_partial_class_name(&self, fragment: &str) -> Result<ElementHandle> {
        self.resolve().await?.find_by_partial_class_name(fragment).await
    }

    pub async fn find_all_by_partial_class_name(&self, fragment: &str) -> Result<Vec<ElementHandle>> {
        self.resolve().await?.find_all_by_partial_class_name(fragment).await
    }

    pub async fn find_by_tag_name(&self, tag: &str) -> Result<ElementHandle> {
        self.resolve().await?.find_by_tag_name(tag).await
    }

    pub async fn find_by_css(&self, selector: &str) -> Result<ElementHandle> {
        self.resolve().await?.find_by_css(selector).await
    }

    pub async fn find_by_xpath(&self, expression: &str) -> Result<ElementHandle> {
        self.resolve().await?.find_by_xpath(expression).await
    }

    /// Wait for a descendant using this component's timeout
    pub async fn wait_for_element(&self, by: &By) -> Result<ElementHandle> {
        self.wait_for_element_within(by, self.wait().timeout()).await
    }

    /// Wait for a descendant with an explicit timeout
    pub async fn wait_for_element_within(&self, by: &By, timeout: Duration) -> Result<ElementHandle> {
        let scope = self.scope().await?;
        let element = self.wait().with_timeout(timeout).for_element(&scope, by).await?;
        Ok(ElementHandle::new(element, self.session.driver()))
    }

    /// Wait for at least one descendant using this component's timeout
    pub async fn wait_for_elements(&self, by: &By) -> Result<Vec<ElementHandle>> {
        self.wait_for_elements_within(by, self.wait().timeout()).await
    }

    pub async fn wait_for_elements_within(&self, by: &By, timeout: Duration) -> Result<Vec<ElementHandle>> {
        let scope = self.scope().await?;
        let elements = self.wait().with_timeout(timeout).for_elements(&scope, by).await?;
        Ok(elements
            .into_iter()
            .map(|e| ElementHandle::new(e, self.session.driver()))
            .collect())
    }

    /// Wait for a displayed, enabled descendant
    pub async fn wait_for_clickable(&self, by: &By) -> Result<ElementHandle> {
        let scope = self.scope().await?;
        let element = self.wait().for_clickable(&scope, by).await?;
        Ok(ElementHandle::new(element, self.session.driver()))
    }

    /// Wait until the component's own text differs from `previous`
    pub async fn wait_for_text_change(&self, previous: &str) -> Result<String> {
        let handle = self.resolve().await?;
        self.wait().for_text_change(handle.element(), previous).await
    }
}

/// A page object built on one [`Component`]
pub trait Widget: Send + Sync + Sized {
    fn from_component(component: Component) -> Self;

    fn component(&self) -> &Component;

    /// Widget located from the document root
    fn locate(session: &Arc<Session>, by: By) -> Self {
        Self::from_component(Component::new(session, by))
    }

    /// Widget located inside `parent`
    fn locate_within(session: &Arc<Session>, by: By, parent: &ElementHandle) -> Self {
        Self::from_component(Component::new(session, by).within(parent))
    }

    /// Widget bound to an element that was already found
    fn from_element(session: &Arc<Session>, handle: ElementHandle) -> Self {
        Self::from_component(Component::from_element(session, handle))
    }
}

/// Widgets that react to pointer clicks
#[async_trait]
pub trait Clickable: Widget {
    async fn click(&self) -> Result<()> {
        self.component().click().await
    }

    async fn double_click(&self) -> Result<()> {
        self.component().double_click().await
    }
}

/// Widgets whose rendered text is meaningful
#[async_trait]
pub trait TextReadable: Widget {
    async fn text(&self) -> Result<String> {
        self.component().text().await
    }
}

/// Widgets that accept typed input
#[async_trait]
pub trait KeyInputTarget: Widget {
    /// Type into whatever has focus; click the widget first to focus it
    async fn send_keys(&self, keys: &str) -> Result<()> {
        self.component().send_keys(keys).await
    }

    async fn select_all_text(&self) -> Result<()> {
        self.component().select_all().await
    }

    async fn submit(&self) -> Result<()> {
        self.component().submit().await
    }
}
