//! Resolved element handle

use std::sync::Arc;
use tracing::instrument;

use crate::driver::{By, Driver, ElementRef, PointerAction};
use crate::wait::Scope;
use crate::{Error, Result};

/// A resolved DOM node plus the driver that found it
///
/// Handles are snapshots: when the page re-renders the node, operations fail
/// with [`Error::StaleElement`] and the caller looks the node up again.
#[derive(Debug, Clone)]
pub struct ElementHandle {
    element: Arc<dyn ElementRef>,
    driver: Arc<dyn Driver>,
}

impl ElementHandle {
    pub fn new(element: Arc<dyn ElementRef>, driver: Arc<dyn Driver>) -> Self {
        Self { element, driver }
    }

    /// Driver-assigned element id
    pub fn id(&self) -> &str {
        self.element.id()
    }

    pub fn element(&self) -> &Arc<dyn ElementRef> {
        &self.element
    }

    pub fn driver(&self) -> &Arc<dyn Driver> {
        &self.driver
    }

    /// Lookup scope rooted at this element
    pub fn scope(&self) -> Scope {
        Scope::Element(self.element.clone())
    }

    fn wrap(&self, element: Arc<dyn ElementRef>) -> ElementHandle {
        ElementHandle::new(element, self.driver.clone())
    }

    pub async fn tag_name(&self) -> Result<String> {
        self.element.tag_name().await
    }

    pub async fn text(&self) -> Result<String> {
        self.element.text().await
    }

    pub async fn attribute(&self, name: &str) -> Result<Option<String>> {
        self.element.attribute(name).await
    }

    /// Class tokens of the element
    pub async fn class_list(&self) -> Result<Vec<String>> {
        Ok(self
            .attribute("class")
            .await?
            .map(|classes| classes.split_whitespace().map(str::to_string).collect())
            .unwrap_or_default())
    }

    /// Whether the class list contains `class` as a whole token
    pub async fn has_class(&self, class: &str) -> Result<bool> {
        Ok(self.class_list().await?.iter().any(|c| c == class))
    }

    pub async fn is_displayed(&self) -> Result<bool> {
        self.element.is_displayed().await
    }

    pub async fn is_enabled(&self) -> Result<bool> {
        self.element.is_enabled().await
    }

    #[instrument(skip(self), fields(element = %self.id()))]
    pub async fn click(&self) -> Result<()> {
        self.element.click().await
    }

    /// Press-release twice over the element as one pointer sequence
    #[instrument(skip(self), fields(element = %self.id()))]
    pub async fn double_click(&self) -> Result<()> {
        self.driver
            .perform_actions(&PointerAction::double_click(self.id()))
            .await
    }

    /// Type into whatever currently has focus; does not click first
    pub async fn send_keys(&self, keys: &str) -> Result<()> {
        self.driver.send_keys(keys).await
    }

    pub async fn submit(&self) -> Result<()> {
        self.element.submit().await
    }

    pub async fn select_by_visible_text(&self, text: &str) -> Result<bool> {
        self.element.select_by_visible_text(text).await
    }

    pub async fn options(&self) -> Result<Vec<String>> {
        self.element.options().await
    }

    /// First descendant matching `by`, if any
    pub async fn find(&self, by: &By) -> Result<Option<ElementHandle>> {
        Ok(self
            .element
            .find_elements(by)
            .await?
            .into_iter()
            .next()
            .map(|e| self.wrap(e)))
    }

    /// All descendants matching `by`
    pub async fn find_all(&self, by: &By) -> Result<Vec<ElementHandle>> {
        Ok(self
            .element
            .find_elements(by)
            .await?
            .into_iter()
            .map(|e| self.wrap(e))
            .collect())
    }

    /// Whether at least one descendant matches `by`
    pub async fn has_element(&self, by: &By) -> Result<bool> {
        Ok(!self.element.find_elements(by).await?.is_empty())
    }

    /// First descendant matching `by`, or [`Error::ElementNotFound`]
    pub async fn require(&self, by: &By) -> Result<ElementHandle> {
        self.find(by)
            .await?
            .ok_or_else(|| Error::element_not_found(format!("No element matching {} in {}", by, self.id())))
    }

    pub async fn find_by_class_name(&self, name: &str) -> Result<ElementHandle> {
        self.require(&By::class_name(name)).await
    }

    pub async fn find_all_by_class_name(&self, name: &str) -> Result<Vec<ElementHandle>> {
        self.find_all(&By::class_name(name)).await
    }

    /// First descendant whose class attribute contains `fragment`
    pub async fn find_by_partial_class_name(&self, fragment: &str) -> Result<ElementHandle> {
        self.require(&By::partial_class_name(fragment)).await
    }

    pub async fn find_all_by_partial_class_name(&self, fragment: &str) -> Result<Vec<ElementHandle>> {
        self.find_all(&By::partial_class_name(fragment)).await
    }

    pub async fn find_by_tag_name(&self, tag: &str) -> Result<ElementHandle> {
        self.require(&By::tag_name(tag)).await
    }

    pub async fn find_by_css(&self, selector: &str) -> Result<ElementHandle> {
        self.require(&By::css(selector)).await
    }

    pub async fn find_by_xpath(&self, expression: &str) -> Result<ElementHandle> {
        self.require(&By::xpath(expression)).await
    }
}
