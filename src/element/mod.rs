//! The `grace-chat` custom element adapter.
//!
//! Bridges the element's attach/detach lifecycle to a delegate constructed
//! from the external module, and replaces the element's content with an
//! error panel when that bridging fails.

mod adapter;
mod host;
mod panel;

pub use adapter::{AdapterState, AttachStep, ElementAdapter};
pub use host::HostElement;
pub use panel::ErrorPanel;
