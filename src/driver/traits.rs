//! Browser driver traits
//!
//! This module defines the abstract interfaces the component layer drives:
//! a page-level [`Driver`] and a DOM-node level [`ElementRef`].

use async_trait::async_trait;
use std::sync::Arc;

use super::locator::By;

/// One step of a pointer action sequence
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PointerAction {
    /// Move the pointer to the centre of an element
    MoveTo { element_id: String },
    /// Press the left button
    Down,
    /// Release the left button
    Up,
    /// Pause between steps
    Pause { millis: u64 },
}

impl PointerAction {
    /// Press-release-press-release over one element
    pub fn double_click(element_id: &str) -> Vec<PointerAction> {
        vec![
            PointerAction::MoveTo {
                element_id: element_id.to_string(),
            },
            PointerAction::Down,
            PointerAction::Up,
            PointerAction::Down,
            PointerAction::Up,
        ]
    }
}

/// Page-level driver
///
/// Represents one browser page the session talks to.
#[async_trait]
pub trait Driver: Send + Sync + std::fmt::Debug {
    /// Navigate to URL
    async fn navigate(&self, url: &str) -> Result<(), crate::Error>;

    /// Get the current URL
    async fn current_url(&self) -> Result<String, crate::Error>;

    /// Find all elements matching the locator from the document root
    async fn find_elements(&self, by: &By) -> Result<Vec<Arc<dyn ElementRef>>, crate::Error>;

    /// Dispatch key input to whatever currently has focus
    async fn send_keys(&self, keys: &str) -> Result<(), crate::Error>;

    /// Perform a pointer action sequence
    async fn perform_actions(&self, actions: &[PointerAction]) -> Result<(), crate::Error>;

    /// Close the page
    async fn close(&self) -> Result<(), crate::Error>;
}

/// Element reference trait
///
/// Represents a DOM element in a page.
#[async_trait]
pub trait ElementRef: Send + Sync + std::fmt::Debug {
    /// Get element ID (driver-assigned, not the DOM `id` attribute)
    fn id(&self) -> &str;

    /// Get lower-case tag name
    async fn tag_name(&self) -> Result<String, crate::Error>;

    /// Get rendered text of the element and its descendants
    async fn text(&self) -> Result<String, crate::Error>;

    /// Get element attribute
    async fn attribute(&self, name: &str) -> Result<Option<String>, crate::Error>;

    /// Check if element is displayed
    async fn is_displayed(&self) -> Result<bool, crate::Error>;

    /// Check if element is enabled
    async fn is_enabled(&self) -> Result<bool, crate::Error>;

    /// Click element
    async fn click(&self) -> Result<(), crate::Error>;

    /// Submit the element (Enter in a field, or the owning form)
    async fn submit(&self) -> Result<(), crate::Error>;

    /// Select the option with the given visible text in a native `<select>`.
    ///
    /// Returns `false` when no option carries that text.
    async fn select_by_visible_text(&self, text: &str) -> Result<bool, crate::Error>;

    /// Visible texts of the options of a native `<select>`
    async fn options(&self) -> Result<Vec<String>, crate::Error>;

    /// Find all descendants matching the locator
    async fn find_elements(&self, by: &By) -> Result<Vec<Arc<dyn ElementRef>>, crate::Error>;
}
