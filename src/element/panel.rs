use crate::config::DEFAULT_ERROR_MESSAGE;

const PANEL_STYLE: &str = "position: fixed; bottom: 20px; right: 20px; \
background: #dc3545; color: white; padding: 15px; border-radius: 8px; \
box-shadow: 0 4px 12px rgba(0,0,0,0.15); \
font-family: system-ui, -apple-system, sans-serif; font-size: 14px; \
max-width: 300px; z-index: 999999;";

/// Inline error overlay rendered in place of the chat when attachment fails.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ErrorPanel {
    message: String,
}

impl Default for ErrorPanel {
    fn default() -> Self {
        Self::new(DEFAULT_ERROR_MESSAGE)
    }
}

impl ErrorPanel {
    /// Panel showing `message` to the user.
    pub fn new<S: Into<String>>(message: S) -> Self {
        Self {
            message: message.into(),
        }
    }

    /// User-facing message.
    pub fn message(&self) -> &str {
        &self.message
    }

    /// Markup for the element's content. The message is HTML-escaped.
    pub fn render(&self) -> String {
        format!(
            r#"<div class="grace-chat-error" role="alert" style="{}"><strong>Error:</strong> {}</div>"#,
            PANEL_STYLE,
            handlebars::html_escape(&self.message)
        )
    }
}
