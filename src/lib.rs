//! Grace Chat SDK - Rust Implementation
//!
//! Loader and custom element adapter for the Grace chat widget. The chat
//! engine itself lives in an external compiled module; this crate loads it
//! once per element, forwards the element lifecycle to it, and keeps the page
//! running when anything along the way fails.
//!
//! # Features
//!
//! - `native` (default): Native build, used by tests and the `generate-loader` binary
//! - `wasm`: Browser bindings over `web-sys` and `wasm-bindgen`
//! - `test-harness`: Exposes `SdkRegistry::reset` to external test suites
//!
//! # Example
//!
//! ```rust,no_run
//! use grace_sdk::loader::{ElementBootstrap, Loader};
//! use grace_sdk::registry;
//! use grace_sdk::SdkConfig;
//!
//! async fn example() {
//!     let config = SdkConfig::default();
//!     let scope = registry::global();
//!     let bootstrap = ElementBootstrap::new(scope, &config);
//!     Loader::new(scope, &bootstrap, &config).run().await;
//! }
//! ```

#![warn(missing_docs)]

pub mod config;
pub mod element;
pub mod error;
pub mod events;
pub mod loader;
pub mod logging;
pub mod module;
pub mod platform;
pub mod registry;
pub mod script;

#[cfg(all(feature = "wasm", target_arch = "wasm32"))]
pub mod wasm;

pub use config::{SdkConfig, SdkOptions};
pub use element::{AdapterState, ElementAdapter, HostElement};
pub use error::{GraceError, Result};
pub use events::SdkEvent;
pub use loader::{LoadOutcome, Loader};
pub use module::{ChatDelegate, ChatModule, ModuleLoader};
pub use registry::{GlobalScope, SdkFlag, SdkRegistry};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
