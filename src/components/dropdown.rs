//! Dropdown component

use std::time::Duration;
use tracing::{debug, instrument, warn};

use crate::component::{Clickable, Component, ElementHandle, TextReadable, Widget};
use crate::driver::By;
use crate::{Error, Result};

const VALUE_PILL_CLASS: &str = "ia_dropdown__valuePill";
const CLEAR_VALUE_CLASS: &str = "iaDropdownCommon_clear_value";
const OPTION_CLASS: &str = "ia_dropdown__option";
const MULTI_SELECT_CLASS: &str = "iaDropdownCommon_multi-select";

/// Pills and the clear icon are only rendered when a value is set
const VALUE_WAIT: Duration = Duration::from_secs(1);

/// Perspective dropdown, single or multi-select
#[derive(Debug, Clone)]
pub struct Dropdown {
    component: Component,
}

impl Widget for Dropdown {
    fn from_component(component: Component) -> Self {
        Self { component }
    }

    fn component(&self) -> &Component {
        &self.component
    }
}

impl Clickable for Dropdown {}
impl TextReadable for Dropdown {}

impl Dropdown {
    /// Labels of the selected values
    pub async fn values(&self) -> Result<Vec<String>> {
        // Only a missing pill means "no value"; a missing dropdown is an error
        self.component.resolve().await?;
        let pills = match self
            .component
            .wait_for_elements_within(&By::class_name(VALUE_PILL_CLASS), VALUE_WAIT)
            .await
        {
            Ok(pills) => pills,
            Err(e) if e.is_not_found() => return Ok(Vec::new()),
            Err(e) => return Err(e),
        };

        let mut values = Vec::with_capacity(pills.len());
        for pill in pills {
            values.push(pill.text().await?.trim().to_string());
        }
        Ok(values)
    }

    pub async fn is_multi_select(&self) -> Result<bool> {
        self.component.has_class(MULTI_SELECT_CLASS).await
    }

    /// Clear the selection; returns `false` when nothing was set
    #[instrument(skip(self))]
    pub async fn clear(&self) -> Result<bool> {
        self.component.resolve().await?;
        match self
            .component
            .wait_for_element_within(&By::class_name(CLEAR_VALUE_CLASS), VALUE_WAIT)
            .await
        {
            Ok(clear) => {
                clear.click().await?;
                Ok(true)
            }
            Err(e) if e.is_not_found() => {
                debug!("Dropdown has no value to clear");
                Ok(false)
            }
            Err(e) => Err(e),
        }
    }

    /// Open the option list and pick the option labelled exactly `label`
    ///
    /// Returns `false`, clicking nothing, when no option carries that label.
    /// Callers that need the value set should check the return value or read
    /// the selection back.
    #[instrument(skip(self))]
    pub async fn set_value(&self, label: &str) -> Result<bool> {
        match self.open_and_find(label).await? {
            Some(option) => {
                option.click().await?;
                Ok(true)
            }
            None => {
                warn!("Dropdown option {:?} not present, nothing selected", label);
                Ok(false)
            }
        }
    }

    /// Select every label in `labels` on a multi-select dropdown
    ///
    /// Labels that are already selected are removed from `labels` and not
    /// clicked again. On return `labels` holds the labels this call added.
    #[instrument(skip(self))]
    pub async fn set_values(&self, labels: &mut Vec<String>) -> Result<()> {
        if !self.is_multi_select().await? {
            return Err(Error::component_interaction("Dropdown is not multi-select"));
        }

        for selected in self.values().await? {
            if let Some(position) = labels.iter().position(|label| *label == selected) {
                labels.remove(position);
            }
        }

        for label in labels.iter() {
            let option = self.open_and_find(label).await?.ok_or_else(|| {
                Error::component_interaction(format!("Dropdown Value Not Present: {}", label))
            })?;
            option.click().await?;
        }
        Ok(())
    }

    async fn open_and_find(&self, label: &str) -> Result<Option<ElementHandle>> {
        self.component.click().await?;
        let options = self
            .component
            .wait_for_elements(&By::class_name(OPTION_CLASS))
            .await?;
        for option in options {
            if option.text().await? == label {
                return Ok(Some(option));
            }
        }
        Ok(None)
    }
}
