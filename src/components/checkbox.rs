//! Checkbox component
//!
//! Perspective has rendered checkbox state in more than one way over time:
//! through the id of the material icon, and through modifier classes on the
//! checkbox element. State is decoded by walking [`STATE_RULES`] in order.

use tracing::instrument;

use crate::component::{Component, ElementHandle, TextReadable, Widget};
use crate::driver::By;
use crate::{Error, Result};

const CHECKBOX_CLASS: &str = "ia_checkbox";
const ICON_CLASS: &str = "icon";

/// Checkbox state
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CheckState {
    Checked,
    Unchecked,
    Indeterminate,
}

impl CheckState {
    pub fn is_checked(self) -> bool {
        self == CheckState::Checked
    }
}

#[derive(Debug, Clone, Copy)]
enum Detector {
    /// `id` of the icon element equals the value
    IconId(&'static str),
    /// The checkbox element carries the class
    Class(&'static str),
}

/// Checked in order; the first matching rule decides
const STATE_RULES: &[(Detector, CheckState)] = &[
    (Detector::IconId("check_box"), CheckState::Checked),
    (Detector::IconId("check_box_outline_blank"), CheckState::Unchecked),
    (Detector::IconId("indeterminate_check_box"), CheckState::Indeterminate),
    (Detector::Class("ia_checkbox--checked"), CheckState::Checked),
    (Detector::Class("ia_checkbox--unchecked"), CheckState::Unchecked),
    (Detector::Class("ia_checkbox--indeterminate"), CheckState::Indeterminate),
];

/// What the page shows for one checkbox
#[derive(Debug, Default)]
struct Observed {
    icon_id: Option<String>,
    classes: Vec<String>,
}

impl Detector {
    fn matches(self, observed: &Observed) -> bool {
        match self {
            Detector::IconId(id) => observed.icon_id.as_deref() == Some(id),
            Detector::Class(class) => observed.classes.iter().any(|c| c == class),
        }
    }
}

fn decode(observed: &Observed) -> Result<CheckState> {
    STATE_RULES
        .iter()
        .find(|(detector, _)| detector.matches(observed))
        .map(|(_, state)| *state)
        .ok_or_else(|| {
            Error::component_interaction(format!(
                "Unable to determine checkbox state (icon id {:?}, classes {:?})",
                observed.icon_id, observed.classes
            ))
        })
}

/// Perspective checkbox
#[derive(Debug, Clone)]
pub struct CheckBox {
    component: Component,
}

impl Widget for CheckBox {
    fn from_component(component: Component) -> Self {
        Self { component }
    }

    fn component(&self) -> &Component {
        &self.component
    }
}

impl TextReadable for CheckBox {}

impl CheckBox {
    pub async fn state(&self) -> Result<CheckState> {
        decode(&self.observe().await?)
    }

    /// Whether the box is checked; an indeterminate box counts as unchecked
    pub async fn value(&self) -> Result<bool> {
        Ok(self.state().await?.is_checked())
    }

    /// Click the box and wait for its state to change; returns the new state
    #[instrument(skip(self))]
    pub async fn toggle(&self) -> Result<CheckState> {
        let before = self.state().await?;
        self.target().await?.click().await?;
        self.component
            .wait()
            .until_updated(&format!("checkbox to leave {:?}", before), || async move {
                let now = self.state().await?;
                Ok((now != before).then_some(now))
            })
            .await
    }

    pub async fn set_value(&self, checked: bool) -> Result<()> {
        if self.value().await? != checked {
            self.toggle().await?;
        }
        Ok(())
    }

    /// The clickable box, or the component itself when it is the box
    async fn target(&self) -> Result<ElementHandle> {
        match self.component.find(&By::class_name(CHECKBOX_CLASS)).await? {
            Some(checkbox) => Ok(checkbox),
            None => Ok(self.component.resolve().await?.clone()),
        }
    }

    async fn observe(&self) -> Result<Observed> {
        let icon_id = match self.component.find(&By::class_name(ICON_CLASS)).await? {
            Some(icon) => icon.attribute("id").await?,
            None => None,
        };
        let mut classes = self.component.resolve().await?.class_list().await?;
        if let Some(checkbox) = self.component.find(&By::class_name(CHECKBOX_CLASS)).await? {
            classes.extend(checkbox.class_list().await?);
        }
        Ok(Observed { icon_id, classes })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::SessionConfig;
    use crate::driver::{DomEvent, MockDriver, NodeSpec};
    use crate::session::Session;
    use std::sync::Arc;

    fn observed(icon_id: Option<&str>, classes: &[&str]) -> Observed {
        Observed {
            icon_id: icon_id.map(str::to_string),
            classes: classes.iter().map(|c| c.to_string()).collect(),
        }
    }

    #[test]
    fn test_icon_id_wins_over_classes() {
        let state = decode(&observed(Some("check_box"), &["ia_checkbox", "ia_checkbox--unchecked"]));
        assert_eq!(state.unwrap(), CheckState::Checked);
    }

    #[test]
    fn test_class_fallback() {
        assert_eq!(
            decode(&observed(None, &["ia_checkbox", "ia_checkbox--indeterminate"])).unwrap(),
            CheckState::Indeterminate
        );
        assert_eq!(
            decode(&observed(Some("other"), &["ia_checkbox--unchecked"])).unwrap(),
            CheckState::Unchecked
        );
    }

    #[test]
    fn test_unknown_rendering_is_an_error() {
        let err = decode(&observed(Some("toggle_on"), &["ia_checkbox"])).unwrap_err();
        assert!(matches!(err, Error::ComponentInteraction(ref m) if m.contains("toggle_on")));
    }

    #[tokio::test]
    async fn test_set_value_toggles_only_when_needed() {
        let driver = Arc::new(MockDriver::new());
        let checkbox = {
            let dom = driver.dom();
            let mut dom = dom.lock().await;
            let root = dom.root();
            let container = dom.append(root, NodeSpec::new("div").id("approved"));
            dom.append(
                container,
                NodeSpec::new("div")
                    .class(CHECKBOX_CLASS)
                    .child(NodeSpec::new("svg").class(ICON_CLASS).id("check_box_outline_blank"))
                    .on(DomEvent::Click, |dom, checkbox| {
                        if let Some(icon) = dom.children(checkbox).first().copied() {
                            let next = if dom.attr(icon, "id") == Some("check_box") {
                                "check_box_outline_blank"
                            } else {
                                "check_box"
                            };
                            dom.set_attr(icon, "id", next);
                        }
                    }),
            )
        };
        let config = SessionConfig {
            wait_timeout_ms: 200,
            poll_interval_ms: 10,
            ..SessionConfig::default()
        };
        let session = Session::new(driver.clone(), config);
        let widget = CheckBox::locate(&session, By::id("approved"));

        assert!(!widget.value().await.unwrap());
        widget.set_value(true).await.unwrap();
        widget.set_value(true).await.unwrap();
        assert_eq!(widget.state().await.unwrap(), CheckState::Checked);

        let dom = driver.dom();
        assert_eq!(dom.lock().await.count_events(checkbox, DomEvent::Click), 1);
    }
}
