//! Browser implementations of the global scope, element registry and host.

use std::cell::{Cell, RefCell};
use std::collections::HashMap;
use std::rc::Rc;
use std::sync::Arc;

use js_sys::{Function, Reflect, JSON};
use tracing::{debug, error, warn};
use wasm_bindgen::prelude::*;
use wasm_bindgen::JsCast;
use web_sys::{CustomEvent, CustomEventInit, HtmlElement, Window};

use super::error::js_error_message;
use super::shims::DynamicImportLoader;
use crate::config::SdkConfig;
use crate::element::{ElementAdapter, HostElement};
use crate::error::{GraceError, Result};
use crate::events::SdkEvent;
use crate::registry::{CustomElementRegistry, GlobalScope, SdkFlag, GLOBAL_FLAG_NAME};

/// Property on each element holding the id of its adapter.
const ADAPTER_ID_PROPERTY: &str = "__graceAdapterId";

/// Source of the element class; the lifecycle callbacks forward to Rust.
const ELEMENT_CLASS_SOURCE: &str = "return class GraceChatElement extends HTMLElement { \
    connectedCallback() { connect(this); } \
    disconnectedCallback() { disconnect(this); } \
};";

thread_local! {
    static ADAPTERS: RefCell<HashMap<u32, Rc<ElementAdapter>>> = RefCell::new(HashMap::new());
    static NEXT_ADAPTER_ID: Cell<u32> = const { Cell::new(1) };
}

fn window() -> Result<Window> {
    web_sys::window().ok_or_else(|| GraceError::host("no global `window` exists"))
}

/// `window` as the SDK's global scope.
pub struct WindowScope {
    window: Window,
}

impl WindowScope {
    /// Bind to the current `window`.
    pub fn new() -> Result<Self> {
        Ok(Self { window: window()? })
    }
}

impl GlobalScope for WindowScope {
    fn sdk_flag(&self) -> Option<SdkFlag> {
        let value = Reflect::get(&self.window, &JsValue::from_str(GLOBAL_FLAG_NAME)).ok()?;
        // Any truthy flag counts as loaded, even one set by foreign code.
        if !value.is_truthy() {
            return None;
        }

        let parsed = JSON::stringify(&value)
            .ok()
            .map(String::from)
            .and_then(|json| serde_json::from_str::<SdkFlag>(&json).ok());
        Some(parsed.unwrap_or_else(|| SdkFlag::loaded("unknown", None)))
    }

    fn try_claim(&self, flag: SdkFlag) -> bool {
        if self.sdk_flag().is_some() {
            return false;
        }

        let value = serde_json::to_string(&flag)
            .ok()
            .and_then(|json| JSON::parse(&json).ok())
            .unwrap_or(JsValue::TRUE);
        if let Err(err) = Reflect::set(&self.window, &JsValue::from_str(GLOBAL_FLAG_NAME), &value) {
            error!(error = %js_error_message(&err), "Failed to publish {}", GLOBAL_FLAG_NAME);
        }
        true
    }

    fn dispatch(&self, event: &SdkEvent) {
        let detail = JSON::parse(&event.detail().to_string()).unwrap_or(JsValue::NULL);
        let init = CustomEventInit::new();
        init.set_detail(&detail);

        let dispatched = CustomEvent::new_with_event_init_dict(event.name(), &init)
            .and_then(|custom| self.window.dispatch_event(&custom));
        if let Err(err) = dispatched {
            error!(event = event.name(), error = %js_error_message(&err), "Failed to dispatch event");
        }
    }
}

/// `window.customElements`, defining the adapter-backed element class.
pub struct BrowserElementRegistry {
    registry: web_sys::CustomElementRegistry,
    config: SdkConfig,
    module_url: String,
}

impl BrowserElementRegistry {
    /// Bind to the current `window.customElements`.
    ///
    /// A relative module path is resolved against `config.base_url()`, or
    /// the document base URL when none is set.
    pub fn new(config: SdkConfig) -> Result<Self> {
        let window = window()?;
        let config = if config.base_url().is_some() {
            config
        } else {
            let base_url = document_base_url(&window)?;
            config.with_base_url(base_url)?
        };
        let module_url = config.resolve_module_url()?;
        debug!(module = %module_url, "Chat module resolved");

        Ok(Self {
            registry: window.custom_elements(),
            config,
            module_url,
        })
    }

    /// Absolute URL the element adapters import.
    pub fn module_url(&self) -> &str {
        &self.module_url
    }

    fn element_class(&self) -> Result<Function> {
        let config = self.config.clone();
        let module_url = self.module_url.clone();
        let connect = Closure::<dyn Fn(HtmlElement)>::new(move |element: HtmlElement| {
            connect_element(element, &config, &module_url);
        });
        let disconnect = Closure::<dyn Fn(HtmlElement)>::new(disconnect_element);

        let factory = Function::new_with_args("connect, disconnect", ELEMENT_CLASS_SOURCE);
        factory
            .call2(&JsValue::NULL, &connect.into_js_value(), &disconnect.into_js_value())
            .and_then(|class| class.dyn_into::<Function>().map_err(JsValue::from))
            .map_err(|err| GraceError::ElementDefinition {
                tag: self.config.element_tag().to_string(),
                message: js_error_message(&err),
            })
    }
}

impl CustomElementRegistry for BrowserElementRegistry {
    fn is_defined(&self, tag: &str) -> bool {
        !self.registry.get(tag).is_undefined()
    }

    fn define(&self, tag: &str) -> Result<()> {
        let class = self.element_class()?;
        self.registry
            .define(tag, &class)
            .map_err(|err| GraceError::ElementDefinition {
                tag: tag.to_string(),
                message: js_error_message(&err),
            })
    }
}

/// A `grace-chat` DOM element.
pub struct BrowserHost {
    element: HtmlElement,
}

impl BrowserHost {
    /// Wrap `element`.
    pub fn new(element: HtmlElement) -> Self {
        Self { element }
    }
}

impl HostElement for BrowserHost {
    fn set_inner_html(&self, html: &str) -> Result<()> {
        self.element.set_inner_html(html);
        Ok(())
    }

    fn as_html_element(&self) -> Option<&HtmlElement> {
        Some(&self.element)
    }
}

fn document_base_url(window: &Window) -> Result<String> {
    let document = window
        .document()
        .ok_or_else(|| GraceError::host("window has no document"))?;
    document
        .base_uri()
        .map_err(|err| GraceError::host(js_error_message(&err)))?
        .ok_or_else(|| GraceError::host("document has no base URL"))
}

/// Number of elements currently bound to an adapter.
pub fn live_adapters() -> usize {
    ADAPTERS.with(|adapters| adapters.borrow().len())
}

fn adapter_id(element: &HtmlElement) -> u32 {
    let key = JsValue::from_str(ADAPTER_ID_PROPERTY);
    if let Some(id) = Reflect::get(element, &key).ok().and_then(|v| v.as_f64()) {
        return id as u32;
    }

    let id = NEXT_ADAPTER_ID.with(|next| {
        let id = next.get();
        next.set(id.wrapping_add(1));
        id
    });
    if Reflect::set(element, &key, &JsValue::from(id)).is_err() {
        warn!("Could not tag element with its adapter id");
    }
    id
}

fn connect_element(element: HtmlElement, config: &SdkConfig, module_url: &str) {
    let id = adapter_id(&element);
    let adapter = ADAPTERS.with(|adapters| {
        Rc::clone(adapters.borrow_mut().entry(id).or_insert_with(|| {
            Rc::new(ElementAdapter::new(
                Arc::new(DynamicImportLoader::new(module_url)),
                Arc::new(BrowserHost::new(element.clone())),
                config,
            ))
        }))
    });

    debug!(id, "grace-chat connected");
    wasm_bindgen_futures::spawn_local(async move {
        adapter.connected_callback().await;
    });
}

fn disconnect_element(element: HtmlElement) {
    let id = adapter_id(&element);
    let adapter = ADAPTERS.with(|adapters| adapters.borrow_mut().remove(&id));
    if let Some(adapter) = adapter {
        debug!(id, "grace-chat disconnected");
        adapter.disconnected_callback();
    }
}
