//! Accordion component
//!
//! Expansion state is read from the class list of the header's chevron icon.

use tracing::{debug, instrument};

use crate::component::{Clickable, Component, ElementHandle, TextReadable, Widget};
use crate::driver::By;
use crate::{Error, Result};

const HEADER_CLASS: &str = "ia_accordionComponent__header";
const BODY_CLASS: &str = "ia_accordionComponent__body";
const HEADER_TEXT_CLASS: &str = "ia_accordionComponent__header__text";
const HEADER_VIEW_CLASS: &str = "ia_accordionComponent__header__view";
const CHEVRON_CLASS_FRAGMENT: &str = "ia_accordionComponent__header__chevron";
const EXPANDED_MARKER: &str = "expanded";

/// What an accordion header renders
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AccordionHeaderType {
    Text,
    View,
}

/// One header of an accordion
#[derive(Debug, Clone)]
pub struct AccordionHeader {
    component: Component,
}

impl Widget for AccordionHeader {
    fn from_component(component: Component) -> Self {
        Self { component }
    }

    fn component(&self) -> &Component {
        &self.component
    }
}

impl Clickable for AccordionHeader {}
impl TextReadable for AccordionHeader {}

impl AccordionHeader {
    pub async fn header_type(&self) -> Result<AccordionHeaderType> {
        if self.component.has_element(&By::class_name(HEADER_TEXT_CLASS)).await? {
            Ok(AccordionHeaderType::Text)
        } else if self.component.has_element(&By::class_name(HEADER_VIEW_CLASS)).await? {
            Ok(AccordionHeaderType::View)
        } else {
            Err(Error::component_interaction(
                "Accordion header renders neither text nor a view",
            ))
        }
    }

    pub async fn is_expanded(&self) -> Result<bool> {
        let chevron = self
            .component
            .find_by_partial_class_name(CHEVRON_CLASS_FRAGMENT)
            .await?;
        Ok(chevron
            .attribute("class")
            .await?
            .is_some_and(|class| class.contains(EXPANDED_MARKER)))
    }

    /// Click the header and wait for the chevron to flip; returns the new state
    #[instrument(skip(self))]
    pub async fn toggle_expansion(&self) -> Result<bool> {
        let before = self.is_expanded().await?;
        self.component.click().await?;
        let description = format!("accordion header to {}", if before { "collapse" } else { "expand" });
        self.component
            .wait()
            .until_updated(&description, || async move {
                let now = self.is_expanded().await?;
                Ok((now != before).then_some(now))
            })
            .await
    }

    /// Bring the header into the given state; returns whether it was clicked
    pub async fn set_expansion(&self, expanded: bool) -> Result<bool> {
        if self.is_expanded().await? == expanded {
            debug!("Accordion header already {}", if expanded { "expanded" } else { "collapsed" });
            return Ok(false);
        }
        self.toggle_expansion().await?;
        Ok(true)
    }
}

/// Perspective accordion
#[derive(Debug, Clone)]
pub struct Accordion {
    component: Component,
}

impl Widget for Accordion {
    fn from_component(component: Component) -> Self {
        Self { component }
    }

    fn component(&self) -> &Component {
        &self.component
    }
}

impl Accordion {
    pub async fn headers(&self) -> Result<Vec<AccordionHeader>> {
        let session = self.component.session();
        Ok(self
            .component
            .wait_for_elements(&By::class_name(HEADER_CLASS))
            .await?
            .into_iter()
            .map(|handle| AccordionHeader::from_element(session, handle))
            .collect())
    }

    pub async fn bodies(&self) -> Result<Vec<ElementHandle>> {
        self.component
            .wait_for_elements(&By::class_name(BODY_CLASS))
            .await
    }

    /// Header at `index` (0-based)
    pub async fn header(&self, index: usize) -> Result<AccordionHeader> {
        let mut headers = self.headers().await?;
        if index >= headers.len() {
            return Err(Error::component_interaction(format!(
                "Accordion index {} out of range: {}",
                index,
                headers.len()
            )));
        }
        Ok(headers.swap_remove(index))
    }

    /// Toggle the body at `index`; returns its new expansion state
    pub async fn toggle_body(&self, index: usize) -> Result<bool> {
        self.header(index).await?.toggle_expansion().await
    }

    pub async fn expand_body(&self, index: usize) -> Result<()> {
        self.header(index).await?.set_expansion(true).await?;
        Ok(())
    }

    pub async fn collapse_body(&self, index: usize) -> Result<()> {
        self.header(index).await?.set_expansion(false).await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::SessionConfig;
    use crate::driver::{DomEvent, MockDom, MockDriver, NodeId, NodeSpec};
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

    /// Two sections; the first renders a text header, the second a view
    fn sections(dom: &mut MockDom) -> Vec<NodeId> {
        let root = dom.root();
        let accordion = dom.append(root, NodeSpec::new("div").id("sections"));
        let mut headers = Vec::new();
        for (index, label) in ["Details", "History"].into_iter().enumerate() {
            let header_content = if index == 0 {
                NodeSpec::new("div").class(HEADER_TEXT_CLASS).text(label)
            } else {
                NodeSpec::new("div").class(HEADER_VIEW_CLASS).text(label)
            };
            let header = dom.append(
                accordion,
                NodeSpec::new("div")
                    .class(HEADER_CLASS)
                    .child(header_content)
                    .child(NodeSpec::new("svg").class(CHEVRON_CLASS_FRAGMENT))
                    .on(DomEvent::Click, |dom, header| {
                        if let Some(chevron) = dom.children(header).last().copied() {
                            if dom.has_class(chevron, EXPANDED_MARKER) {
                                dom.remove_class(chevron, EXPANDED_MARKER);
                            } else {
                                dom.add_class(chevron, EXPANDED_MARKER);
                            }
                        }
                    }),
            );
            dom.append(accordion, NodeSpec::new("div").class(BODY_CLASS).hidden());
            headers.push(header);
        }
        headers
    }

    #[tokio::test]
    async fn test_header_types() {
        let driver = Arc::new(MockDriver::new());
        sections(&mut *driver.dom().lock().await);
        let accordion = Accordion::locate(&session(&driver), By::id("sections"));

        let headers = accordion.headers().await.unwrap();
        assert_eq!(headers[0].header_type().await.unwrap(), AccordionHeaderType::Text);
        assert_eq!(headers[1].header_type().await.unwrap(), AccordionHeaderType::View);
        assert_eq!(headers[1].text().await.unwrap(), "History");
        assert_eq!(accordion.bodies().await.unwrap().len(), 2);
    }

    #[tokio::test]
    async fn test_toggle_and_collapse() {
        let driver = Arc::new(MockDriver::new());
        let headers = sections(&mut *driver.dom().lock().await);
        let accordion = Accordion::locate(&session(&driver), By::id("sections"));

        assert!(accordion.toggle_body(1).await.unwrap());
        accordion.collapse_body(1).await.unwrap();
        accordion.collapse_body(1).await.unwrap();

        let dom = driver.dom();
        let dom = dom.lock().await;
        assert_eq!(dom.count_events(headers[1], DomEvent::Click), 2);
        assert_eq!(dom.count_events(headers[0], DomEvent::Click), 0);
    }

    #[tokio::test]
    async fn test_header_index_out_of_range() {
        let driver = Arc::new(MockDriver::new());
        sections(&mut *driver.dom().lock().await);
        let accordion = Accordion::locate(&session(&driver), By::id("sections"));

        let err = accordion.expand_body(2).await.unwrap_err();
        assert!(matches!(err, Error::ComponentInteraction(ref m) if m.contains("out of range")));
    }
}
