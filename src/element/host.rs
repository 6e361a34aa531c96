use crate::error::Result;
use crate::platform::PlatformService;

/// The DOM element an adapter is attached to.
pub trait HostElement: PlatformService {
    /// Replace the element's rendered content.
    fn set_inner_html(&self, html: &str) -> Result<()>;

    /// The underlying DOM element, for delegates that render into it.
    #[cfg(all(feature = "wasm", target_arch = "wasm32"))]
    fn as_html_element(&self) -> Option<&web_sys::HtmlElement> {
        None
    }
}
