//! SDK configuration.
//!
//! Every value has a default so the browser build works without any
//! environment. Native tooling (the loader generator) overrides them from
//! environment variables or command line flags.

use serde::Deserialize;
use url::Url;

use crate::error::{GraceError, Result};

/// Version recorded in the global flag and the ready event.
pub const SDK_VERSION: &str = env!("CARGO_PKG_VERSION");

/// Tag name of the custom element.
pub const DEFAULT_ELEMENT_TAG: &str = "grace-chat";

/// Module imported by the element adapter when no CDN is configured.
///
/// Relative paths are resolved against the configured base URL.
pub const DEFAULT_MODULE_PATH: &str = "./pkg/grace_chat_core.js";

/// File name of the compiled chat module under a CDN base URL.
///
/// Distinct from this crate's own bindings (`grace_sdk.js`) so the adapter
/// never imports itself.
pub const MODULE_FILE_NAME: &str = "grace_chat_core.js";

/// CDN used by the loader generator when none is configured.
pub const DEFAULT_CDN_URL: &str = "https://cdn.grace-sdk.com";

/// User-facing message shown when an element fails to attach.
pub const DEFAULT_ERROR_MESSAGE: &str = "Error al cargar el chat. Por favor, intenta de nuevo.";

/// Overrides passed from JavaScript to the browser entry points.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase", default, deny_unknown_fields)]
pub struct SdkOptions {
    /// CDN base URL the chat module is served from
    pub cdn_url: Option<String>,
    /// Module specifier used when no CDN is set
    pub module_path: Option<String>,
    /// Base URL relative module paths resolve against
    pub base_url: Option<String>,
    /// Custom element tag name
    pub element_tag: Option<String>,
    /// User-facing error message
    pub error_message: Option<String>,
}

/// Configuration shared by the loader, the element adapter and the generator.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SdkConfig {
    version: String,
    cdn_url: Option<String>,
    module_path: String,
    base_url: Option<String>,
    element_tag: String,
    error_message: String,
}

impl Default for SdkConfig {
    fn default() -> Self {
        Self {
            version: SDK_VERSION.to_string(),
            cdn_url: None,
            module_path: DEFAULT_MODULE_PATH.to_string(),
            base_url: None,
            element_tag: DEFAULT_ELEMENT_TAG.to_string(),
            error_message: DEFAULT_ERROR_MESSAGE.to_string(),
        }
    }
}

impl SdkConfig {
    /// Create a configuration with default values.
    pub fn new() -> Self {
        Self::default()
    }

    /// Load configuration from environment variables.
    ///
    /// Optional:
    /// - GRACE_CDN_URL, falling back to CDN_URL
    /// - GRACE_MODULE_PATH (default: ./pkg/grace_chat_core.js)
    /// - GRACE_ERROR_MESSAGE
    ///
    /// # Errors
    ///
    /// Returns an error if the CDN URL is not an absolute http(s) URL.
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Load configuration through an arbitrary variable lookup.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Self::default();
        let non_empty = |key: &str| lookup(key).filter(|value| !value.trim().is_empty());

        if let Some(cdn_url) = non_empty("GRACE_CDN_URL").or_else(|| non_empty("CDN_URL")) {
            config = config.with_cdn_url(cdn_url)?;
        }

        if let Some(module_path) = non_empty("GRACE_MODULE_PATH") {
            config.module_path = module_path;
        }

        if let Some(message) = non_empty("GRACE_ERROR_MESSAGE") {
            config.error_message = message;
        }

        Ok(config)
    }

    /// Apply overrides received from JavaScript.
    ///
    /// # Errors
    ///
    /// Returns an error if the CDN URL, base URL or tag name is invalid.
    pub fn with_options(mut self, options: SdkOptions) -> Result<Self> {
        if let Some(cdn_url) = options.cdn_url {
            self = self.with_cdn_url(cdn_url)?;
        }
        if let Some(module_path) = options.module_path {
            self = self.with_module_path(module_path);
        }
        if let Some(base_url) = options.base_url {
            self = self.with_base_url(base_url)?;
        }
        if let Some(tag) = options.element_tag {
            self = self.with_element_tag(tag)?;
        }
        if let Some(message) = options.error_message {
            self = self.with_error_message(message);
        }
        Ok(self)
    }

    /// Get the SDK version.
    pub fn version(&self) -> &str {
        &self.version
    }

    /// Get the CDN base URL, if configured.
    pub fn cdn_url(&self) -> Option<&str> {
        self.cdn_url.as_deref()
    }

    /// Get the base URL for relative module paths, if configured.
    pub fn base_url(&self) -> Option<&str> {
        self.base_url.as_deref()
    }

    /// Get the custom element tag name.
    pub fn element_tag(&self) -> &str {
        &self.element_tag
    }

    /// Get the user-facing error message.
    pub fn error_message(&self) -> &str {
        &self.error_message
    }

    /// Specifier the element adapter imports.
    ///
    /// Resolves against the CDN when one is configured, otherwise the
    /// relative module path is used as is.
    pub fn module_url(&self) -> String {
        match &self.cdn_url {
            Some(cdn) => format!("{}/{}", cdn.trim_end_matches('/'), MODULE_FILE_NAME),
            None => self.module_path.clone(),
        }
    }

    /// Absolute URL of the chat module.
    ///
    /// Absolute module paths are used as is; relative ones are joined onto
    /// the base URL.
    ///
    /// # Errors
    ///
    /// Returns an error if the path is relative and no base URL is set.
    pub fn resolve_module_url(&self) -> Result<String> {
        let specifier = self.module_url();
        if let Ok(absolute) = Url::parse(&specifier) {
            return Ok(absolute.into());
        }

        let base = self.base_url.as_deref().ok_or_else(|| {
            GraceError::config(format!(
                "module path '{}' is relative and no base URL is set",
                specifier
            ))
        })?;
        Ok(Url::parse(base)?.join(&specifier)?.into())
    }

    /// Set the version.
    pub fn with_version<S: Into<String>>(mut self, version: S) -> Self {
        self.version = version.into();
        self
    }

    /// Set the CDN base URL.
    ///
    /// # Errors
    ///
    /// Returns an error if the URL does not parse or is not http(s).
    pub fn with_cdn_url<S: Into<String>>(mut self, cdn_url: S) -> Result<Self> {
        let cdn_url = cdn_url.into();
        let parsed = Url::parse(&cdn_url)?;
        if !matches!(parsed.scheme(), "http" | "https") {
            return Err(GraceError::config(format!(
                "CDN URL must use http or https, got '{}'",
                parsed.scheme()
            )));
        }
        self.cdn_url = Some(cdn_url.trim_end_matches('/').to_string());
        Ok(self)
    }

    /// Set the module path used when no CDN is configured.
    pub fn with_module_path<S: Into<String>>(mut self, module_path: S) -> Self {
        self.module_path = module_path.into();
        self
    }

    /// Set the base URL relative module paths resolve against.
    ///
    /// # Errors
    ///
    /// Returns an error if the URL does not parse.
    pub fn with_base_url<S: Into<String>>(mut self, base_url: S) -> Result<Self> {
        let base_url = base_url.into();
        Url::parse(&base_url)?;
        self.base_url = Some(base_url);
        Ok(self)
    }

    /// Set the custom element tag name.
    ///
    /// # Errors
    ///
    /// Returns an error if the name is not a valid custom element name.
    pub fn with_element_tag<S: Into<String>>(mut self, tag: S) -> Result<Self> {
        let tag = tag.into();
        validate_element_tag(&tag)?;
        self.element_tag = tag;
        Ok(self)
    }

    /// Set the user-facing error message.
    pub fn with_error_message<S: Into<String>>(mut self, message: S) -> Self {
        self.error_message = message.into();
        self
    }
}

/// Custom element names must start with a lowercase ASCII letter and contain a hyphen.
fn validate_element_tag(tag: &str) -> Result<()> {
    let starts_lower = tag.chars().next().is_some_and(|c| c.is_ascii_lowercase());
    let valid_chars = tag
        .chars()
        .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || matches!(c, '-' | '.' | '_'));

    if !starts_lower || !tag.contains('-') || !valid_chars {
        return Err(GraceError::config(format!(
            "'{}' is not a valid custom element name",
            tag
        )));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[test]
    fn test_defaults() {
        let config = SdkConfig::new();
        assert_eq!(config.version(), "0.0.1");
        assert_eq!(config.element_tag(), "grace-chat");
        assert_eq!(config.module_url(), "./pkg/grace_chat_core.js");
        assert_eq!(config.error_message(), DEFAULT_ERROR_MESSAGE);
        assert!(config.cdn_url().is_none());
    }

    #[test]
    fn test_cdn_url_drives_module_url() {
        let config = SdkConfig::new()
            .with_cdn_url("https://cdn.example.com/grace/")
            .unwrap();
        assert_eq!(config.cdn_url(), Some("https://cdn.example.com/grace"));
        assert_eq!(
            config.module_url(),
            "https://cdn.example.com/grace/grace_chat_core.js"
        );
    }

    #[test]
    fn test_rejects_non_http_cdn() {
        assert!(SdkConfig::new().with_cdn_url("ftp://cdn.example.com").is_err());
        assert!(SdkConfig::new().with_cdn_url("not a url").is_err());
    }

    #[test]
    fn test_element_tag_validation() {
        assert!(SdkConfig::new().with_element_tag("grace-chat-v2").is_ok());
        assert!(SdkConfig::new().with_element_tag("gracechat").is_err());
        assert!(SdkConfig::new().with_element_tag("Grace-chat").is_err());
        assert!(SdkConfig::new().with_element_tag("-grace").is_err());
    }

    #[test]
    fn test_from_lookup_prefers_grace_prefix() {
        let vars: HashMap<&str, &str> = [
            ("GRACE_CDN_URL", "https://cdn.grace.test"),
            ("CDN_URL", "https://ignored.test"),
            ("GRACE_ERROR_MESSAGE", "Chat unavailable"),
            ("GRACE_MODULE_PATH", "   "),
        ]
        .into_iter()
        .collect();

        let config =
            SdkConfig::from_lookup(|key| vars.get(key).map(|v| v.to_string())).unwrap();
        assert_eq!(config.cdn_url(), Some("https://cdn.grace.test"));
        assert_eq!(config.error_message(), "Chat unavailable");
        assert_eq!(config.module_url(), "https://cdn.grace.test/grace_chat_core.js");
    }

    #[test]
    fn test_from_lookup_falls_back_to_cdn_url() {
        let config = SdkConfig::from_lookup(|key| {
            (key == "CDN_URL").then(|| "http://localhost:8080".to_string())
        })
        .unwrap();
        assert_eq!(config.cdn_url(), Some("http://localhost:8080"));
    }

    #[test]
    fn test_default_module_is_not_the_sdk_bindings() {
        let config = SdkConfig::new();
        assert!(!config.module_url().ends_with("grace_sdk.js"));
    }

    #[test]
    fn test_relative_module_resolves_against_base_url() {
        let config = SdkConfig::new()
            .with_module_path("../pkg/grace_chat_core.js")
            .with_base_url("https://shop.example.com/widgets/chat/loader.js")
            .unwrap();
        assert_eq!(
            config.resolve_module_url().unwrap(),
            "https://shop.example.com/widgets/pkg/grace_chat_core.js"
        );
    }

    #[test]
    fn test_relative_module_without_base_is_an_error() {
        assert!(SdkConfig::new().resolve_module_url().is_err());
    }

    #[test]
    fn test_absolute_module_ignores_base_url() {
        let config = SdkConfig::new()
            .with_module_path("data:text/javascript,export default function () {}")
            .with_base_url("https://shop.example.com/")
            .unwrap();
        assert!(config
            .resolve_module_url()
            .unwrap()
            .starts_with("data:text/javascript,"));

        let cdn = SdkConfig::new()
            .with_cdn_url("https://cdn.grace-sdk.com")
            .unwrap();
        assert_eq!(
            cdn.resolve_module_url().unwrap(),
            "https://cdn.grace-sdk.com/grace_chat_core.js"
        );
    }

    #[test]
    fn test_options_override_defaults() {
        let options: SdkOptions = serde_json::from_value(serde_json::json!({
            "cdnUrl": "https://cdn.grace.test",
            "errorMessage": "Chat unavailable",
            "elementTag": "grace-chat-beta"
        }))
        .unwrap();

        let config = SdkConfig::new().with_options(options).unwrap();
        assert_eq!(config.cdn_url(), Some("https://cdn.grace.test"));
        assert_eq!(config.error_message(), "Chat unavailable");
        assert_eq!(config.element_tag(), "grace-chat-beta");
        assert_eq!(
            config.resolve_module_url().unwrap(),
            "https://cdn.grace.test/grace_chat_core.js"
        );
    }

    #[test]
    fn test_invalid_options_are_rejected() {
        let bad_tag = SdkOptions {
            element_tag: Some("chat".to_string()),
            ..Default::default()
        };
        assert!(SdkConfig::new().with_options(bad_tag).is_err());

        let unknown = serde_json::from_value::<SdkOptions>(serde_json::json!({ "cdn": "x" }));
        assert!(unknown.is_err());
    }
}
