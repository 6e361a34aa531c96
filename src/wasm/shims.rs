//! JavaScript shims for the external compiled module.

use std::fmt::{self, Debug};

use anyhow::anyhow;
use js_sys::{Array, Function, Object, Promise, Reflect};
use tracing::{debug, warn};
use wasm_bindgen::prelude::*;
use wasm_bindgen::JsCast;
use wasm_bindgen_futures::JsFuture;

use super::error::js_error_message;
use crate::element::HostElement;
use crate::error::{GraceError, Result};
use crate::module::{
    ChatDelegate, ChatModule, ModuleLoader, EXPORT_DELEGATE, EXPORT_INITIALIZER, EXPORT_INIT_CHAT,
};

const CONNECTED_CALLBACK: &str = "connected_callback";
const DISCONNECTED_CALLBACK: &str = "disconnected_callback";

fn property(target: &JsValue, name: &str) -> Option<JsValue> {
    Reflect::get(target, &JsValue::from_str(name))
        .ok()
        .filter(|value| !value.is_undefined())
}

fn function(target: &JsValue, name: &str) -> Option<Function> {
    property(target, name).and_then(|value| value.dyn_into::<Function>().ok())
}

/// Await `value` if it is a promise.
async fn settle(value: JsValue) -> std::result::Result<JsValue, JsValue> {
    if value.is_instance_of::<Promise>() {
        JsFuture::from(Promise::from(value)).await
    } else {
        Ok(value)
    }
}

/// Imports the module with a dynamic `import()`.
pub struct DynamicImportLoader {
    specifier: String,
}

impl DynamicImportLoader {
    /// Loader for `specifier`.
    pub fn new<S: Into<String>>(specifier: S) -> Self {
        Self {
            specifier: specifier.into(),
        }
    }
}

#[async_trait::async_trait(?Send)]
impl ModuleLoader for DynamicImportLoader {
    fn specifier(&self) -> &str {
        &self.specifier
    }

    async fn load(&self) -> Result<Box<dyn ChatModule>> {
        let import = Function::new_with_args("specifier", "return import(specifier);");
        let promise = import
            .call1(&JsValue::NULL, &JsValue::from_str(&self.specifier))
            .map_err(|err| GraceError::module_load(&self.specifier, js_error_message(&err)))?;

        let namespace = settle(promise)
            .await
            .map_err(|err| GraceError::module_load(&self.specifier, js_error_message(&err)))?;
        // Namespace objects have a null prototype, so `instanceof Object` fails.
        if !namespace.is_object() {
            return Err(GraceError::module_load(
                &self.specifier,
                "import did not yield a module namespace",
            ));
        }
        let namespace: Object = namespace.unchecked_into();

        debug!(specifier = %self.specifier, "Module imported");
        Ok(Box::new(JsChatModule { namespace }))
    }
}

/// A module namespace object returned by `import()`.
pub struct JsChatModule {
    namespace: Object,
}

impl Debug for JsChatModule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("JsChatModule")
            .field("namespace", &"[Module]")
            .finish()
    }
}

impl JsChatModule {
    async fn call_export(&self, name: &str) -> anyhow::Result<()> {
        let func = function(&self.namespace, name)
            .ok_or_else(|| anyhow!("export '{}' is not a function", name))?;
        let result = func
            .call0(&self.namespace)
            .map_err(|err| anyhow!("{}", js_error_message(&err)))?;
        settle(result)
            .await
            .map_err(|err| anyhow!("{}", js_error_message(&err)))?;
        Ok(())
    }
}

#[async_trait::async_trait(?Send)]
impl ChatModule for JsChatModule {
    fn has_export(&self, name: &str) -> bool {
        function(&self.namespace, name).is_some()
    }

    async fn initialize(&self) -> anyhow::Result<()> {
        self.call_export(EXPORT_INITIALIZER).await
    }

    async fn init_chat(&self) -> anyhow::Result<()> {
        self.call_export(EXPORT_INIT_CHAT).await
    }

    fn create_delegate(&self) -> anyhow::Result<Box<dyn ChatDelegate>> {
        let constructor = function(&self.namespace, EXPORT_DELEGATE)
            .ok_or_else(|| anyhow!("export '{}' is not constructible", EXPORT_DELEGATE))?;
        let instance = Reflect::construct(&constructor, &Array::new())
            .map_err(|err| anyhow!("{}", js_error_message(&err)))?;

        let connected = function(&instance, CONNECTED_CALLBACK).ok_or_else(|| {
            anyhow!(
                "{} instances must expose {}(host)",
                EXPORT_DELEGATE,
                CONNECTED_CALLBACK
            )
        })?;

        Ok(Box::new(JsDelegate {
            instance,
            connected,
        }))
    }
}

/// A `GraceChatElement` instance.
pub struct JsDelegate {
    instance: JsValue,
    connected: Function,
}

#[async_trait::async_trait(?Send)]
impl ChatDelegate for JsDelegate {
    async fn connect(&mut self, host: &dyn HostElement) -> anyhow::Result<()> {
        let element = host
            .as_html_element()
            .ok_or_else(|| anyhow!("host is not a DOM element"))?;
        let result = self
            .connected
            .call1(&self.instance, element)
            .map_err(|err| anyhow!("{}", js_error_message(&err)))?;
        settle(result)
            .await
            .map_err(|err| anyhow!("{}", js_error_message(&err)))?;
        Ok(())
    }

    fn disconnect(&mut self) {
        // Teardown beyond this optional hook belongs to the module.
        if let Some(hook) = function(&self.instance, DISCONNECTED_CALLBACK) {
            if let Err(err) = hook.call0(&self.instance) {
                warn!(error = %js_error_message(&err), "Delegate disconnect hook failed");
            }
        }
    }
}
