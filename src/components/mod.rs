//! # Perspective widgets
//!
//! Page objects for the Perspective component library. Every widget wraps a
//! [`Component`](crate::component::Component) and is built with
//! [`Widget::locate`](crate::component::Widget::locate),
//! [`Widget::locate_within`](crate::component::Widget::locate_within) or
//! [`Widget::from_element`](crate::component::Widget::from_element).
//!
//! ## Module structure
//! - `table`: tables with row groups, cells and filtering
//! - `pager`: SIMPLE and ROBUST table pagers
//! - `dropdown`: single and multi-select dropdowns
//! - `accordion`: accordions and their headers
//! - `datetime`: date-time input with its picker modal
//! - `checkbox`: checkbox state decoding
//! - `basic`: buttons, labels, views, toggle switches
//! - `inputs`: text boxes, text areas, numeric inputs
//! - `popup`: popups addressed by identifier
//! - `menu`: menu trees

pub mod accordion;
pub mod basic;
pub mod checkbox;
pub mod datetime;
pub mod dropdown;
pub mod inputs;
pub mod menu;
pub mod pager;
pub mod popup;
pub mod table;

pub use accordion::{Accordion, AccordionHeader, AccordionHeaderType};
pub use basic::{Button, Label, ToggleSwitch, View};
pub use checkbox::{CheckBox, CheckState};
pub use datetime::{to_twelve_hour, DateTimeInput, Meridiem};
pub use dropdown::Dropdown;
pub use inputs::{NumericInput, TextArea, TextBox};
pub use menu::Menu;
pub use pager::{Pager, PagerVariant};
pub use popup::Popup;
pub use table::{Table, TableCell, TableRow, TableRowGroup};
