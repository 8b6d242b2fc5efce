//! Buttons, labels, views and toggle switches

use tracing::instrument;

use crate::component::{Clickable, Component, TextReadable, Widget};
use crate::driver::By;
use crate::Result;

const TOGGLE_THUMB_CLASS: &str = "ia_toggleSwitch__thumb";
const TOGGLE_SELECTED_CLASS: &str = "ia_toggleSwitch__thumb--selected";

macro_rules! widget {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Debug, Clone)]
        pub struct $name {
            component: Component,
        }

        impl Widget for $name {
            fn from_component(component: Component) -> Self {
                Self { component }
            }

            fn component(&self) -> &Component {
                &self.component
            }
        }
    };
}

widget!(
    /// Perspective button
    Button
);
impl Clickable for Button {}
impl TextReadable for Button {}

widget!(
    /// Perspective label
    Label
);
impl TextReadable for Label {}

widget!(
    /// Embedded view or container, used as a lookup scope
    View
);

widget!(
    /// Perspective toggle switch
    ToggleSwitch
);
impl Clickable for ToggleSwitch {}

impl ToggleSwitch {
    /// Whether the switch is on
    pub async fn value(&self) -> Result<bool> {
        self.component
            .find_by_class_name(TOGGLE_THUMB_CLASS)
            .await?
            .has_class(TOGGLE_SELECTED_CLASS)
            .await
    }

    /// Flip the switch and wait for the thumb to follow; returns the new value
    #[instrument(skip(self))]
    pub async fn toggle(&self) -> Result<bool> {
        let before = self.value().await?;
        self.component.click().await?;
        self.component
            .wait()
            .until_updated("toggle switch to change", || async move {
                let now = self.value().await?;
                Ok((now != before).then_some(now))
            })
            .await
    }

    pub async fn set_value(&self, on: bool) -> Result<()> {
        if self.value().await? != on {
            self.toggle().await?;
        }
        Ok(())
    }

    /// Whether the switch renders a thumb at all
    pub async fn is_rendered(&self) -> Result<bool> {
        self.component.has_element(&By::class_name(TOGGLE_THUMB_CLASS)).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::SessionConfig;
    use crate::driver::{DomEvent, MockDriver, NodeSpec};
    use crate::session::Session;
    use std::sync::Arc;

    fn session(driver: &Arc<MockDriver>) -> Arc<Session> {
        let config = SessionConfig {
            wait_timeout_ms: 200,
            poll_interval_ms: 10,
            ..SessionConfig::default()
        };
        Session::new(driver.clone(), config)
    }

    #[tokio::test]
    async fn test_button_and_label() {
        let driver = Arc::new(MockDriver::new());
        let button = {
            let dom = driver.dom();
            let mut dom = dom.lock().await;
            let root = dom.root();
            let view = dom.append(root, NodeSpec::new("div").id("General.Headers.Default"));
            dom.append(view, NodeSpec::new("span").class("ia_labelComponent").text("Orders"));
            dom.append(view, NodeSpec::new("button").text("Menu"))
        };
        let session = session(&driver);

        let header = View::locate(&session, By::id("General.Headers.Default"));
        let menu = header.component().find_by_tag_name("button").await.unwrap();
        let menu = Button::from_element(&session, menu);
        assert_eq!(menu.text().await.unwrap(), "Menu");
        menu.click().await.unwrap();

        let handle = header.component().resolve().await.unwrap();
        let label = Label::locate_within(&session, By::class_name("ia_labelComponent"), handle);
        assert_eq!(label.text().await.unwrap(), "Orders");

        let dom = driver.dom();
        assert_eq!(dom.lock().await.count_events(button, DomEvent::Click), 1);
    }

    #[tokio::test]
    async fn test_toggle_switch_set_value() {
        let driver = Arc::new(MockDriver::new());
        {
            let dom = driver.dom();
            let mut dom = dom.lock().await;
            let root = dom.root();
            dom.append(
                root,
                NodeSpec::new("div")
                    .id("autoRefresh")
                    .child(NodeSpec::new("div").class(TOGGLE_THUMB_CLASS))
                    .on(DomEvent::Click, |dom, switch| {
                        if let Some(thumb) = dom.children(switch).first().copied() {
                            if dom.has_class(thumb, TOGGLE_SELECTED_CLASS) {
                                dom.remove_class(thumb, TOGGLE_SELECTED_CLASS);
                            } else {
                                dom.add_class(thumb, TOGGLE_SELECTED_CLASS);
                            }
                        }
                    }),
            );
        }
        let switch = ToggleSwitch::locate(&session(&driver), By::id("autoRefresh"));

        assert!(switch.is_rendered().await.unwrap());
        assert!(!switch.value().await.unwrap());
        switch.set_value(true).await.unwrap();
        assert!(switch.value().await.unwrap());
        assert!(!switch.toggle().await.unwrap());
    }
}
