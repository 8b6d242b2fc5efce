//! Unified error types for perspective-automation

use thiserror::Error;

/// Unified Result type
pub type Result<T> = std::result::Result<T, Error>;

/// Unified error type for perspective-automation
#[derive(Error, Debug)]
pub enum Error {
    /// I/O errors
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// WebSocket errors
    #[error("WebSocket error: {0}")]
    WebSocket(String),

    /// CDP protocol errors
    #[error("CDP error: {0}")]
    Cdp(String),

    /// Serialization errors
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// A required element did not appear within the timeout
    #[error("Element not found: {0}")]
    ElementNotFound(String),

    /// The element exists but the requested interaction is invalid in its current state
    #[error("Component interaction failed: {0}")]
    ComponentInteraction(String),

    /// An expected state change did not happen within the timeout
    #[error("Element not updated: {0}")]
    ElementNotUpdated(String),

    /// The bound element is no longer attached to the document
    #[error("Stale element: {0}")]
    StaleElement(String),

    /// The element is present but cannot receive input (hidden, detached from layout)
    #[error("Element not interactable: {0}")]
    ElementNotInteractable(String),

    /// A value read from the page could not be parsed
    #[error("Parse error: {0}")]
    Parse(String),

    /// An unexpected driver error, wrapped with what was being attempted
    #[error("{context}: {source}")]
    Driver {
        context: String,
        #[source]
        source: Box<Error>,
    },

    /// Transport command timeout
    #[error("Operation timeout: {0}")]
    Timeout(String),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// Internal error
    #[error("Internal error: {0}")]
    Internal(String),
}

impl Error {
    /// Create a new WebSocket error
    pub fn websocket<S: Into<String>>(msg: S) -> Self {
        Error::WebSocket(msg.into())
    }

    /// Create a new CDP error
    pub fn cdp<S: Into<String>>(msg: S) -> Self {
        Error::Cdp(msg.into())
    }

    /// Create a new element not found error
    pub fn element_not_found<S: Into<String>>(what: S) -> Self {
        Error::ElementNotFound(what.into())
    }

    /// Create a new component interaction error
    pub fn component_interaction<S: Into<String>>(msg: S) -> Self {
        Error::ComponentInteraction(msg.into())
    }

    /// Create a new element not updated error
    pub fn element_not_updated<S: Into<String>>(msg: S) -> Self {
        Error::ElementNotUpdated(msg.into())
    }

    /// Create a new stale element error
    pub fn stale_element<S: Into<String>>(id: S) -> Self {
        Error::StaleElement(id.into())
    }

    /// Create a new element not interactable error
    pub fn element_not_interactable<S: Into<String>>(msg: S) -> Self {
        Error::ElementNotInteractable(msg.into())
    }

    /// Create a new parse error
    pub fn parse<S: Into<String>>(msg: S) -> Self {
        Error::Parse(msg.into())
    }

    /// Wrap an unexpected error with what was being attempted
    pub fn driver<S: Into<String>>(context: S, source: Error) -> Self {
        Error::Driver {
            context: context.into(),
            source: Box::new(source),
        }
    }

    /// Create a new timeout error
    pub fn timeout<S: Into<String>>(msg: S) -> Self {
        Error::Timeout(msg.into())
    }

    /// Create a new configuration error
    pub fn configuration<S: Into<String>>(msg: S) -> Self {
        Error::Configuration(msg.into())
    }

    /// Create a new internal error
    pub fn internal<S: Into<String>>(msg: S) -> Self {
        Error::Internal(msg.into())
    }

    /// Whether a wait loop should keep polling after this error
    pub fn is_retryable(&self) -> bool {
        matches!(self, Error::ElementNotFound(_) | Error::StaleElement(_))
    }

    /// Whether this error reports a missing element
    pub fn is_not_found(&self) -> bool {
        matches!(self, Error::ElementNotFound(_))
    }
}
