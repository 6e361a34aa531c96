//! WASM bindings.
//!
//! Exposes the loader to JavaScript and binds the element adapter to
//! `customElements`, `window` and dynamic `import()`.

pub mod browser;
pub mod error;
pub mod shims;

pub use browser::{live_adapters, BrowserElementRegistry, BrowserHost, WindowScope};
pub use error::WasmError;
pub use shims::{DynamicImportLoader, JsChatModule, JsDelegate};

use tracing::{error, info};
use wasm_bindgen::prelude::*;

use crate::config::{SdkConfig, SdkOptions};
use crate::error::{GraceError, Result};
use crate::loader::{ElementBootstrap, LoadOutcome, Loader};
use crate::registry::define_once;

/// Initialize the WASM module with panic hook and console logging.
#[wasm_bindgen(start)]
pub fn init_wasm() {
    console_error_panic_hook::set_once();
    crate::logging::init_logging();
}

/// Build a configuration from a JavaScript options object.
///
/// `undefined` and `null` yield the defaults. Recognized keys: `cdnUrl`,
/// `modulePath`, `baseUrl`, `elementTag`, `errorMessage`.
pub fn config_from_js(options: JsValue) -> Result<SdkConfig> {
    if options.is_undefined() || options.is_null() {
        return Ok(SdkConfig::default());
    }
    let options: SdkOptions = serde_wasm_bindgen::from_value(options)
        .map_err(|err| GraceError::config(format!("invalid options: {}", err)))?;
    SdkConfig::default().with_options(options)
}

/// Define the `grace-chat` element if it is not defined yet.
///
/// Returns whether this call performed the definition.
#[wasm_bindgen]
pub fn register_grace_chat(options: JsValue) -> std::result::Result<bool, JsValue> {
    let config = config_from_js(options)?;
    let tag = config.element_tag().to_string();
    let registry = BrowserElementRegistry::new(config)?;
    Ok(define_once(&registry, &tag)?)
}

/// Run the loader against `window`.
///
/// Resolves to `"ready"`, `"failed"` or `"already-loaded"`; never rejects.
#[wasm_bindgen(js_name = "loadGraceChat")]
pub async fn load_grace_chat(options: JsValue) -> JsValue {
    let prepared = config_from_js(options).and_then(|config| {
        let scope = WindowScope::new()?;
        let registry = BrowserElementRegistry::new(config.clone())?;
        Ok((config, scope, registry))
    });
    let (config, scope, registry) = match prepared {
        Ok(prepared) => prepared,
        Err(err) => {
            error!(error = %err, "Failed to load Grace Chat SDK");
            return JsValue::from_str("failed");
        }
    };

    let bootstrap = ElementBootstrap::new(&registry, &config);
    let outcome = Loader::new(&scope, &bootstrap, &config).run().await;
    info!(?outcome, "Loader finished");

    JsValue::from_str(match outcome {
        LoadOutcome::Ready { .. } => "ready",
        LoadOutcome::Failed { .. } => "failed",
        LoadOutcome::AlreadyLoaded { .. } => "already-loaded",
    })
}
