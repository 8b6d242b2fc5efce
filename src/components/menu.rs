//! Menu tree

use tracing::instrument;

use crate::component::{Component, ElementHandle, Widget};
use crate::driver::By;
use crate::{Error, Result};

const MENU_ITEM_CLASS: &str = "menu-item";

/// Perspective menu tree
#[derive(Debug, Clone)]
pub struct Menu {
    component: Component,
}

impl Widget for Menu {
    fn from_component(component: Component) -> Self {
        Self { component }
    }

    fn component(&self) -> &Component {
        &self.component
    }
}

impl Menu {
    /// Item labels; collapsed items are only included with `include_invisible`
    pub async fn values(&self, include_invisible: bool) -> Result<Vec<String>> {
        let mut labels = Vec::new();
        for item in self.items().await? {
            let label = if include_invisible {
                item.attribute("textContent").await?.unwrap_or_default()
            } else if item.is_displayed().await? {
                item.text().await?
            } else {
                continue;
            };
            let label = label.trim();
            if !label.is_empty() {
                labels.push(label.to_string());
            }
        }
        Ok(labels)
    }

    /// Click the visible item labelled `label`
    #[instrument(skip(self))]
    pub async fn select(&self, label: &str) -> Result<()> {
        for item in self.items().await? {
            if item.is_displayed().await? && item.text().await?.trim() == label {
                return item.click().await;
            }
        }
        Err(Error::component_interaction(format!("Menu item not present: {}", label)))
    }

    async fn items(&self) -> Result<Vec<ElementHandle>> {
        self.component
            .wait_for_elements(&By::class_name(MENU_ITEM_CLASS))
            .await
    }
}
