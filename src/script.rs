//! Loader script generation.
//!
//! Renders the JavaScript bootstrap served from the CDN. The script mirrors
//! the Rust loader and element adapter for pages that include the SDK with a
//! plain `<script>` tag.

use std::fs;
use std::path::Path;

use handlebars::Handlebars;
use serde_json::json;
use tracing::debug;

use crate::config::SdkConfig;
use crate::element::ErrorPanel;
use crate::error::Result;
use crate::events::{ERROR_EVENT, READY_EVENT};
use crate::module::REQUIRED_EXPORTS;
use crate::registry::GLOBAL_FLAG_NAME;

/// Default output path of the generated loader.
pub const DEFAULT_OUTPUT_PATH: &str = "pkg/grace-chat-loader.js";

const TEMPLATE_NAME: &str = "loader";
const TEMPLATE: &str = include_str!("../templates/grace-chat-loader.js.hbs");

/// The generated loader script.
pub struct LoaderScript<'a> {
    config: &'a SdkConfig,
}

impl<'a> LoaderScript<'a> {
    /// Loader script for `config`.
    pub fn new(config: &'a SdkConfig) -> Self {
        Self { config }
    }

    /// Render the script.
    ///
    /// Every interpolated value is emitted as a JSON literal, so strings are
    /// quoted and escaped for JavaScript.
    pub fn render(&self) -> Result<String> {
        let mut handlebars = Handlebars::new();
        handlebars.set_strict_mode(true);
        handlebars.register_escape_fn(handlebars::no_escape);
        handlebars.register_template_string(TEMPLATE_NAME, TEMPLATE)?;

        let panel = ErrorPanel::new(self.config.error_message()).render();
        let data = json!({
            "version_label": format!("v{}", self.config.version()),
            "flag_name": GLOBAL_FLAG_NAME,
            "version": literal(self.config.version()),
            "has_cdn": self.config.cdn_url().is_some(),
            "cdn_url": literal(self.config.cdn_url()),
            "module_url": literal(self.config.module_url()),
            "element_tag": literal(self.config.element_tag()),
            "error_panel": literal(panel),
            "required_exports": literal(REQUIRED_EXPORTS),
            "ready_event": literal(READY_EVENT),
            "error_event": literal(ERROR_EVENT),
        });

        Ok(handlebars.render(TEMPLATE_NAME, &data)?)
    }

    /// Render the script and write it to `path`, creating parent directories.
    pub fn write_to(&self, path: &Path) -> Result<()> {
        let script = self.render()?;
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)?;
        }
        fs::write(path, script)?;
        debug!(path = %path.display(), "Loader script written");
        Ok(())
    }
}

fn literal<T: serde::Serialize>(value: T) -> String {
    serde_json::to_string(&value).unwrap_or_else(|_| "null".to_string())
}
