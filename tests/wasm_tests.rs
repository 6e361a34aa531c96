#![cfg(all(target_arch = "wasm32", feature = "wasm"))]

use grace_sdk::element::{AttachStep, ErrorPanel};
use grace_sdk::registry::{define_once, CustomElementRegistry, GLOBAL_FLAG_NAME};
use grace_sdk::wasm::{
    config_from_js, error::WasmError, live_adapters, BrowserElementRegistry, WindowScope,
};
use grace_sdk::{GlobalScope, GraceError, SdkConfig, SdkFlag};
use js_sys::{Object, Promise, Reflect};
use wasm_bindgen::JsValue;
use wasm_bindgen_futures::JsFuture;
use wasm_bindgen_test::{wasm_bindgen_test, wasm_bindgen_test_configure};

wasm_bindgen_test_configure!(run_in_browser);

/// Module with an initializer but without the chat exports.
const INCOMPLETE_MODULE: &str = "data:text/javascript,export default function () {}";

fn sleep(ms: i32) -> JsFuture {
    let promise = Promise::new(&mut |resolve, _reject| {
        web_sys::window()
            .unwrap()
            .set_timeout_with_callback_and_timeout_and_arguments_0(&resolve, ms)
            .unwrap();
    });
    JsFuture::from(promise)
}

fn options(entries: &[(&str, &str)]) -> JsValue {
    let object = Object::new();
    for (key, value) in entries {
        Reflect::set(&object, &JsValue::from_str(key), &JsValue::from_str(value)).unwrap();
    }
    object.into()
}

fn clear_flag() {
    let window = web_sys::window().unwrap();
    Reflect::delete_property(&window, &JsValue::from_str(GLOBAL_FLAG_NAME)).unwrap();
}

#[wasm_bindgen_test]
fn test_module_load_error_fields() {
    let err = WasmError::from(GraceError::module_load("./pkg/grace_chat_core.js", "404"));
    assert_eq!(err.code(), "MODULE_LOAD_ERROR");
    assert_eq!(err.source(), Some("./pkg/grace_chat_core.js".to_string()));
    assert!(err.message().contains("404"));
}

#[wasm_bindgen_test]
fn test_initialization_error_to_string() {
    let err = WasmError::from(GraceError::initialization(AttachStep::InitChat, "boom"));
    assert_eq!(
        err.to_string_js(),
        "[INITIALIZATION_ERROR] chat initialization: Initialization failed during chat initialization: boom"
    );
}

#[wasm_bindgen_test]
fn test_window_flag_is_claimed_once() {
    clear_flag();
    let scope = WindowScope::new().unwrap();

    assert!(scope.sdk_flag().is_none());
    assert!(scope.try_claim(SdkFlag::loaded("0.0.1", None)));
    assert!(!scope.try_claim(SdkFlag::loaded("9.9.9", None)));
    assert_eq!(scope.sdk_flag().unwrap().version, "0.0.1");
    clear_flag();
}

#[wasm_bindgen_test]
fn test_foreign_flag_counts_as_loaded() {
    clear_flag();
    let window = web_sys::window().unwrap();
    Reflect::set(&window, &JsValue::from_str(GLOBAL_FLAG_NAME), &JsValue::TRUE).unwrap();

    let scope = WindowScope::new().unwrap();
    let flag = scope.sdk_flag().unwrap();
    assert!(flag.loaded);
    assert_eq!(flag.version, "unknown");
    assert!(!scope.try_claim(SdkFlag::loaded("0.0.1", None)));
    clear_flag();
}

#[wasm_bindgen_test]
fn test_error_panel_renders_into_element() {
    let document = web_sys::window().unwrap().document().unwrap();
    let element = document.create_element("div").unwrap();
    element.set_inner_html(&ErrorPanel::default().render());

    assert!(element.inner_html().contains("grace-chat-error"));
    assert!(element
        .text_content()
        .unwrap_or_default()
        .contains("Error al cargar el chat"));
}

#[wasm_bindgen_test]
fn test_falsy_flag_does_not_count_as_loaded() {
    clear_flag();
    let window = web_sys::window().unwrap();
    Reflect::set(&window, &JsValue::from_str(GLOBAL_FLAG_NAME), &JsValue::FALSE).unwrap();

    let scope = WindowScope::new().unwrap();
    assert!(scope.sdk_flag().is_none());
    assert!(scope.try_claim(SdkFlag::loaded("0.0.1", None)));
    assert!(scope.sdk_flag().unwrap().loaded);
    clear_flag();
}

#[wasm_bindgen_test]
fn test_options_object_configures_the_sdk() {
    let config = config_from_js(options(&[
        ("cdnUrl", "https://cdn.grace.test"),
        ("errorMessage", "Chat unavailable"),
    ]))
    .unwrap();
    assert_eq!(config.cdn_url(), Some("https://cdn.grace.test"));
    assert_eq!(config.error_message(), "Chat unavailable");

    assert_eq!(config_from_js(JsValue::UNDEFINED).unwrap(), SdkConfig::default());
    assert!(config_from_js(options(&[("elementTag", "chat")])).is_err());
}

#[wasm_bindgen_test]
fn test_relative_module_resolves_against_the_document() {
    let registry = BrowserElementRegistry::new(SdkConfig::default()).unwrap();
    assert!(registry.module_url().starts_with("http"));
    assert!(registry.module_url().ends_with("/pkg/grace_chat_core.js"));
}

#[wasm_bindgen_test]
fn test_browser_registry_defines_once() {
    let config = SdkConfig::new()
        .with_element_tag("grace-chat-define-once")
        .unwrap();
    let registry = BrowserElementRegistry::new(config).unwrap();

    assert!(!registry.is_defined("grace-chat-define-once"));
    assert!(define_once(&registry, "grace-chat-define-once").unwrap());
    assert!(!define_once(&registry, "grace-chat-define-once").unwrap());
    assert!(registry.is_defined("grace-chat-define-once"));
}

#[wasm_bindgen_test(async)]
async fn test_element_lifecycle_binds_and_releases_an_adapter() {
    let config = SdkConfig::new()
        .with_element_tag("grace-chat-lifecycle")
        .unwrap()
        .with_module_path(INCOMPLETE_MODULE);
    let registry = BrowserElementRegistry::new(config).unwrap();
    define_once(&registry, "grace-chat-lifecycle").unwrap();

    let document = web_sys::window().unwrap().document().unwrap();
    let body = document.body().unwrap();
    let element = document.create_element("grace-chat-lifecycle").unwrap();
    let before = live_adapters();

    body.append_child(&element).unwrap();
    assert_eq!(live_adapters(), before + 1);

    // The module lacks the chat exports, so the element ends up showing the panel.
    for _ in 0..50 {
        if element.inner_html().contains("grace-chat-error") {
            break;
        }
        sleep(10).await.unwrap();
    }
    assert!(element.inner_html().contains("grace-chat-error"));

    element.remove();
    assert_eq!(live_adapters(), before);
}
