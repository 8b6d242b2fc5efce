//! # Chrome DevTools Protocol (CDP) layer
//!
//! WebSocket transport to one page target of a running Chrome/Chromium.
//!
//! ## Module structure
//! - `traits`: connection and client traits
//! - `types`: protocol wire types
//! - `connection`: WebSocket connection with a single reader task
//! - `client`: typed client (navigation, script evaluation, domains)
//! - `mock`: scripted connection for tests
//!
//! ## Example
//! ```rust,no_run
//! use perspective_automation::cdp::{CdpClient, CdpClientImpl, CdpWebSocketConnection};
//!
//! # async fn example() -> perspective_automation::Result<()> {
//! let connection = CdpWebSocketConnection::connect("ws://localhost:9222/devtools/page/ABC").await?;
//! let client = CdpClientImpl::new(connection);
//! client.navigate("http://localhost:8088/data/perspective/client/MES").await?;
//! # Ok(())
//! # }
//! ```

pub mod client;
pub mod connection;
pub mod mock;
pub mod traits;
pub mod types;

pub use traits::{CdpClient, CdpConnection, CdpError, CdpResponse, EvaluationResult, NavigationResult};

pub use client::CdpClientImpl;
pub use connection::CdpWebSocketConnection;

pub use mock::MockCdpConnection;
