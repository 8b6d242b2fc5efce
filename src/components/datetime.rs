//! Date-time input
//!
//! Setting a value walks the picker modal: year and month through native
//! selects, the day through its tile, then hour and minute typed one digit at
//! a time. The digit fields re-validate on every keystroke, so each digit is
//! followed by the session's keystroke delay.

use chrono::{Datelike, Month, NaiveDateTime, Timelike};
use std::fmt;
use tracing::{debug, instrument};

use crate::component::{Clickable, Component, ElementHandle, TextReadable, Widget};
use crate::driver::By;
use crate::{Error, Result};

const PICKER_CLASS: &str = "ia_dateTimeInputComponent__picker";
const YEAR_SELECT_CLASS: &str = "ia_datePicker__yearSelect";
const MONTH_SELECT_CLASS: &str = "ia_datePicker__monthSelect";
const DAY_CLASS: &str = "ia_datePicker__day";
const HOUR_CLASS: &str = "ia_timePicker__hour";
const MINUTE_CLASS: &str = "ia_timePicker__minute";
const MERIDIEM_CLASS: &str = "ia_timePicker__meridiem";

/// Format of the value shown in the input field
pub const DEFAULT_DISPLAY_FORMAT: &str = "%m/%d/%Y %I:%M %p";

/// Half of a 12-hour clock
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Meridiem {
    Am,
    Pm,
}

impl Meridiem {
    pub fn label(self) -> &'static str {
        match self {
            Meridiem::Am => "AM",
            Meridiem::Pm => "PM",
        }
    }
}

impl fmt::Display for Meridiem {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Convert a 0-23 hour to the 12-hour clock
///
/// Midnight is 12 AM and noon is 12 PM.
pub fn to_twelve_hour(hour: u32) -> (u32, Meridiem) {
    match hour {
        0 => (12, Meridiem::Am),
        1..=11 => (hour, Meridiem::Am),
        12 => (12, Meridiem::Pm),
        _ => (hour - 12, Meridiem::Pm),
    }
}

/// Perspective date-time input
#[derive(Debug, Clone)]
pub struct DateTimeInput {
    component: Component,
    display_format: String,
}

impl Widget for DateTimeInput {
    fn from_component(component: Component) -> Self {
        Self {
            component,
            display_format: DEFAULT_DISPLAY_FORMAT.to_string(),
        }
    }

    fn component(&self) -> &Component {
        &self.component
    }
}

impl Clickable for DateTimeInput {}
impl TextReadable for DateTimeInput {}

impl DateTimeInput {
    /// Use a different chrono format to read the displayed value
    pub fn with_display_format<S: Into<String>>(mut self, format: S) -> Self {
        self.display_format = format.into();
        self
    }

    /// Open the picker modal
    pub async fn open(&self) -> Result<ElementHandle> {
        self.component.click().await?;
        self.component
            .session()
            .wait_for_element(&By::class_name(PICKER_CLASS), None)
            .await
    }

    /// Pick `value` through the modal, to the minute
    #[instrument(skip(self))]
    pub async fn set_value(&self, value: NaiveDateTime) -> Result<()> {
        let picker = self.open().await?;

        let year = value.year().to_string();
        self.select(&picker, YEAR_SELECT_CLASS, &year).await?;

        let month = u8::try_from(value.month())
            .ok()
            .and_then(|m| Month::try_from(m).ok())
            .ok_or_else(|| Error::internal(format!("Invalid month {}", value.month())))?;
        self.select(&picker, MONTH_SELECT_CLASS, month.name()).await?;

        picker
            .find_by_css(&format!(".{}[data-day='{}']", DAY_CLASS, value.day()))
            .await?
            .click()
            .await?;

        let (hour, meridiem) = to_twelve_hour(value.hour());
        self.type_digits(&picker, HOUR_CLASS, hour).await?;
        self.type_digits(&picker, MINUTE_CLASS, value.minute()).await?;

        picker
            .find_by_css(&format!(".{}[data-meridiem='{}']", MERIDIEM_CLASS, meridiem.label()))
            .await?
            .click()
            .await?;
        debug!("Picked {:02}:{:02} {}", hour, value.minute(), meridiem);
        Ok(())
    }

    /// Displayed value, parsed with the display format
    pub async fn value(&self) -> Result<NaiveDateTime> {
        let displayed = match self.component.find(&By::tag_name("input")).await? {
            Some(input) => input.attribute("value").await?.unwrap_or_default(),
            None => self.component.text().await?,
        };
        NaiveDateTime::parse_from_str(displayed.trim(), &self.display_format).map_err(|e| {
            Error::parse(format!(
                "Unable to read {:?} as {}: {}",
                displayed, self.display_format, e
            ))
        })
    }

    async fn select(&self, picker: &ElementHandle, class: &str, label: &str) -> Result<()> {
        let select = picker.find_by_class_name(class).await?;
        if !select.select_by_visible_text(label).await? {
            return Err(Error::component_interaction(format!(
                "Option {} not offered by {}",
                label, class
            )));
        }
        Ok(())
    }

    async fn type_digits(&self, picker: &ElementHandle, class: &str, number: u32) -> Result<()> {
        let field = picker.find_by_class_name(class).await?;
        field.click().await?;
        field.send_keys(self.component.session().select_all_keys()).await?;

        let delay = self.component.session().keystroke_delay();
        for digit in format!("{:02}", number).chars() {
            field.send_keys(&digit.to_string()).await?;
            tokio::time::sleep(delay).await;
        }
        Ok(())
    }
}
