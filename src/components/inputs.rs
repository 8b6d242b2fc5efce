//! Text and numeric inputs
//!
//! Key input goes to whatever has focus, so every setter clicks the field
//! first.

use std::fmt::Display;
use tracing::instrument;

use crate::component::{Clickable, Component, ElementHandle, KeyInputTarget, TextReadable, Widget};
use crate::driver::Key;
use crate::Result;

const NUMERAL_INPUT_CLASS: &str = "ia-numeral-input";

fn delete_key() -> String {
    String::from(Key::Delete)
}

/// Perspective text field
#[derive(Debug, Clone)]
pub struct TextBox {
    component: Component,
}

impl Widget for TextBox {
    fn from_component(component: Component) -> Self {
        Self { component }
    }

    fn component(&self) -> &Component {
        &self.component
    }
}

impl Clickable for TextBox {}
impl KeyInputTarget for TextBox {}

impl TextBox {
    /// Current `value` of the field
    pub async fn value(&self) -> Result<String> {
        Ok(self.component.attribute("value").await?.unwrap_or_default())
    }

    /// Focus the field, select everything and delete it
    pub async fn clear_text(&self) -> Result<()> {
        self.component.click().await?;
        self.component.select_all().await?;
        self.component.send_keys(&delete_key()).await
    }

    /// Type `text`, replacing the current value when `replace` is set
    #[instrument(skip(self))]
    pub async fn set_text(&self, text: &str, submit: bool, replace: bool) -> Result<()> {
        if replace {
            self.clear_text().await?;
        } else {
            self.component.click().await?;
        }
        self.component.send_keys(text).await?;
        if submit {
            self.component.submit().await?;
        }
        Ok(())
    }
}

/// Perspective multi-line text area
#[derive(Debug, Clone)]
pub struct TextArea {
    component: Component,
}

impl Widget for TextArea {
    fn from_component(component: Component) -> Self {
        Self { component }
    }

    fn component(&self) -> &Component {
        &self.component
    }
}

impl Clickable for TextArea {}
impl TextReadable for TextArea {}
impl KeyInputTarget for TextArea {}

impl TextArea {
    pub async fn value(&self) -> Result<String> {
        Ok(self.component.attribute("value").await?.unwrap_or_default())
    }

    pub async fn clear_text(&self) -> Result<()> {
        self.component.click().await?;
        self.component.select_all().await?;
        self.component.send_keys(&delete_key()).await
    }

    #[instrument(skip(self))]
    pub async fn set_text(&self, text: &str, replace: bool) -> Result<()> {
        if replace {
            self.clear_text().await?;
        } else {
            self.component.click().await?;
        }
        self.component.send_keys(text).await
    }
}

/// Perspective numeric entry field
///
/// Input goes to the inner `ia-numeral-input` element, not the component root.
#[derive(Debug, Clone)]
pub struct NumericInput {
    component: Component,
}

impl Widget for NumericInput {
    fn from_component(component: Component) -> Self {
        Self { component }
    }

    fn component(&self) -> &Component {
        &self.component
    }
}

impl NumericInput {
    /// Focused inner input field
    pub async fn input_box(&self) -> Result<ElementHandle> {
        let input = self.component.find_by_class_name(NUMERAL_INPUT_CLASS).await?;
        input.click().await?;
        Ok(input)
    }

    pub async fn value(&self) -> Result<String> {
        let input = self.component.find_by_class_name(NUMERAL_INPUT_CLASS).await?;
        Ok(input.attribute("value").await?.unwrap_or_default())
    }

    pub async fn clear_value(&self) -> Result<()> {
        let input = self.input_box().await?;
        input.send_keys(self.component.session().select_all_keys()).await?;
        input.send_keys(&delete_key()).await
    }

    #[instrument(skip(self, value), fields(value = %value))]
    pub async fn set_value<N: Display + Send + Sync>(&self, value: N, submit: bool, replace: bool) -> Result<()> {
        if replace {
            self.clear_value().await?;
        }
        let input = self.input_box().await?;
        input.send_keys(&value.to_string()).await?;
        if submit {
            input.submit().await?;
        }
        Ok(())
    }
}
