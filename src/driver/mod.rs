//! # Driver layer
//!
//! The browser-facing seam of the crate. Components talk to a page only
//! through the [`Driver`] and [`ElementRef`] traits, so the same page objects
//! run against Chrome over CDP ([`CdpDriver`]) or against the in-memory
//! document used in tests ([`MockDriver`]).
//!
//! ## Module structure
//! - `traits`: `Driver`, `ElementRef`, pointer action sequences
//! - `locator`: `By` locator strategies
//! - `keys`: special key code points and platform chords
//! - `cdp`: CDP-backed implementation
//! - `scripts`: page-side JavaScript used by the CDP implementation
//! - `mock`: in-memory implementation

pub mod cdp;
pub mod keys;
pub mod locator;
pub mod mock;
pub mod scripts;
pub mod traits;

pub use cdp::{CdpDriver, CdpElement};
pub use keys::{Key, Platform};
pub use locator::By;
pub use mock::{DomEvent, MockDom, MockDriver, MockElement, NodeId, NodeSpec};
pub use traits::{Driver, ElementRef, PointerAction};
