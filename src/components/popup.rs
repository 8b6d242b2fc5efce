//! Popups

use std::sync::Arc;
use tracing::instrument;

use crate::component::{Component, Widget};
use crate::driver::By;
use crate::session::Session;
use crate::Result;

const CLOSE_ICON_CLASS: &str = "close-icon";

/// Popup opened by Perspective's popup action, found by identifier
#[derive(Debug, Clone)]
pub struct Popup {
    component: Component,
}

impl Widget for Popup {
    fn from_component(component: Component) -> Self {
        Self { component }
    }

    fn component(&self) -> &Component {
        &self.component
    }
}

impl Popup {
    /// Popup whose identifier is `identifier`
    pub fn new(session: &Arc<Session>, identifier: &str) -> Self {
        Self::locate(session, popup_locator(identifier))
    }

    /// Whether a popup with `identifier` is currently open
    pub async fn is_open(session: &Arc<Session>, identifier: &str) -> Result<bool> {
        Ok(!session
            .driver()
            .find_elements(&popup_locator(identifier))
            .await?
            .is_empty())
    }

    #[instrument(skip(self))]
    pub async fn close(&self) -> Result<()> {
        self.component.find_by_class_name(CLOSE_ICON_CLASS).await?.click().await
    }
}

fn popup_locator(identifier: &str) -> By {
    By::id(format!("popup-{}", identifier))
}
