//! Perspective-Automation: page objects for Ignition Perspective UI tests
//!
//! This library drives Perspective pages through the Chrome DevTools Protocol
//! and exposes the Perspective component library (tables, pagers, dropdowns,
//! accordions, date-time inputs and friends) as typed page objects.

pub mod error;
pub mod config;
pub mod logging;

pub mod cdp;
pub mod driver;
pub mod session;
pub mod wait;

pub mod component;
pub mod components;

// Re-exports
pub use component::{Clickable, Component, ElementHandle, KeyInputTarget, TextReadable, Widget};
pub use config::{Credentials, SessionConfig};
pub use driver::By;
pub use error::{Error, Result};
pub use session::Session;
pub use wait::ElementWait;

/// Perspective-Automation library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
