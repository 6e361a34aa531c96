//! Structured errors handed to JavaScript.

use wasm_bindgen::prelude::*;

use crate::error::GraceError;

/// JavaScript-facing error with a stable code.
#[wasm_bindgen]
#[derive(Clone, Debug)]
pub struct WasmError {
    code: String,
    message: String,
    source: Option<String>,
}

#[wasm_bindgen]
impl WasmError {
    /// Error code for programmatic handling.
    #[wasm_bindgen(getter)]
    pub fn code(&self) -> String {
        self.code.clone()
    }

    /// Human-readable message.
    #[wasm_bindgen(getter)]
    pub fn message(&self) -> String {
        self.message.clone()
    }

    /// What the error relates to (module specifier, tag name...), if known.
    #[wasm_bindgen(getter)]
    pub fn source(&self) -> Option<String> {
        self.source.clone()
    }

    /// Formatted representation.
    #[wasm_bindgen(js_name = "toString")]
    pub fn to_string_js(&self) -> String {
        match &self.source {
            Some(src) => format!("[{}] {}: {}", self.code, src, self.message),
            None => format!("[{}] {}", self.code, self.message),
        }
    }
}

impl WasmError {
    /// Creates a new WasmError.
    pub fn new(code: impl Into<String>, message: impl Into<String>, source: Option<String>) -> Self {
        Self {
            code: code.into(),
            message: message.into(),
            source,
        }
    }

    /// Converts this error to a JsValue for throwing.
    pub fn into_js_value(self) -> JsValue {
        JsValue::from(self)
    }
}

impl From<GraceError> for WasmError {
    fn from(err: GraceError) -> Self {
        let message = err.to_string();
        match err {
            GraceError::ModuleLoad { specifier, .. } => {
                Self::new("MODULE_LOAD_ERROR", message, Some(specifier))
            }
            GraceError::ContractMismatch { .. } => Self::new("CONTRACT_MISMATCH", message, None),
            GraceError::Initialization { step, .. } => {
                Self::new("INITIALIZATION_ERROR", message, Some(step.to_string()))
            }
            GraceError::ElementDefinition { tag, .. } => {
                Self::new("ELEMENT_DEFINITION_ERROR", message, Some(tag))
            }
            GraceError::Host { .. } => Self::new("HOST_ERROR", message, None),
            GraceError::Config { .. } => Self::new("CONFIG_ERROR", message, None),
            GraceError::Template { .. } => Self::new("TEMPLATE_ERROR", message, None),
            GraceError::Superseded { .. } => Self::new("SUPERSEDED", message, None),
            GraceError::Io(_) => Self::new("IO_ERROR", message, None),
        }
    }
}

impl From<GraceError> for JsValue {
    fn from(err: GraceError) -> Self {
        WasmError::from(err).into_js_value()
    }
}

impl std::fmt::Display for WasmError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.to_string_js())
    }
}

impl std::error::Error for WasmError {}

/// Best-effort message of a thrown JavaScript value.
///
/// Prefers `error.message`, then string values, then the debug form.
pub fn js_error_message(value: &JsValue) -> String {
    if let Ok(message) = js_sys::Reflect::get(value, &JsValue::from_str("message")) {
        if let Some(message) = message.as_string() {
            return message;
        }
    }
    value.as_string().unwrap_or_else(|| format!("{:?}", value))
}
