//! Process-wide SDK state.
//!
//! Two pieces of state outlive any single element: the `GraceChatSDK` flag
//! that makes the loader idempotent, and the set of defined custom elements.
//! Both are created once and never torn down during the life of the page (or
//! process). In the browser they live on `window`; [`SdkRegistry`] is the
//! in-process equivalent used natively and in tests.

use std::collections::HashSet;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{GraceError, Result};
use crate::events::SdkEvent;
use crate::platform::PlatformService;

/// Name of the flag object on the global scope.
pub const GLOBAL_FLAG_NAME: &str = "GraceChatSDK";

/// The `GraceChatSDK` flag object.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SdkFlag {
    /// SDK version that claimed the page
    pub version: String,
    /// Always true once set
    pub loaded: bool,
    /// CDN base URL, when one is configured
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cdn_url: Option<String>,
}

impl SdkFlag {
    /// Create a loaded flag for the given version.
    pub fn loaded<S: Into<String>>(version: S, cdn_url: Option<String>) -> Self {
        Self {
            version: version.into(),
            loaded: true,
            cdn_url,
        }
    }
}

/// Global scope the loader publishes to.
pub trait GlobalScope: PlatformService {
    /// Current flag, if any loader already claimed the scope.
    fn sdk_flag(&self) -> Option<SdkFlag>;

    /// Set the flag unless one is already present.
    ///
    /// Returns `false` without touching the existing flag when the scope was
    /// already claimed. Must not suspend.
    fn try_claim(&self, flag: SdkFlag) -> bool;

    /// Dispatch a notification to every listener on the scope.
    fn dispatch(&self, event: &SdkEvent);
}

/// Registry of custom element definitions.
pub trait CustomElementRegistry: PlatformService {
    /// Whether `tag` is already defined.
    fn is_defined(&self, tag: &str) -> bool;

    /// Define `tag`. Defining an existing tag is an error, as in the DOM.
    fn define(&self, tag: &str) -> Result<()>;
}

/// Define `tag` unless it is already defined.
///
/// Returns whether this call performed the definition.
pub fn define_once(registry: &dyn CustomElementRegistry, tag: &str) -> Result<bool> {
    if registry.is_defined(tag) {
        debug!(tag, "Custom element already defined");
        return Ok(false);
    }
    registry.define(tag)?;
    debug!(tag, "Custom element defined");
    Ok(true)
}

/// Event listener registered on an [`SdkRegistry`].
pub type Listener = Arc<dyn Fn(&SdkEvent) + Send + Sync>;

/// In-process global scope and element registry.
#[derive(Default)]
pub struct SdkRegistry {
    flag: Mutex<Option<SdkFlag>>,
    elements: Mutex<HashSet<String>>,
    listeners: Mutex<Vec<(String, Listener)>>,
}

static GLOBAL: Lazy<SdkRegistry> = Lazy::new(SdkRegistry::new);

/// The process-wide registry.
pub fn global() -> &'static SdkRegistry {
    &GLOBAL
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

impl SdkRegistry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a listener for events named `event_name`.
    pub fn add_event_listener<F>(&self, event_name: &str, listener: F)
    where
        F: Fn(&SdkEvent) + Send + Sync + 'static,
    {
        lock(&self.listeners).push((event_name.to_string(), Arc::new(listener)));
    }

    /// Tags defined so far.
    pub fn defined_elements(&self) -> Vec<String> {
        let mut tags: Vec<String> = lock(&self.elements).iter().cloned().collect();
        tags.sort();
        tags
    }

    /// Clear the flag, definitions and listeners.
    ///
    /// Only available to test harnesses; production code never resets the
    /// registry.
    #[cfg(any(test, feature = "test-harness"))]
    pub fn reset(&self) {
        *lock(&self.flag) = None;
        lock(&self.elements).clear();
        lock(&self.listeners).clear();
    }
}

impl GlobalScope for SdkRegistry {
    fn sdk_flag(&self) -> Option<SdkFlag> {
        lock(&self.flag).clone()
    }

    fn try_claim(&self, flag: SdkFlag) -> bool {
        let mut current = lock(&self.flag);
        if current.is_some() {
            return false;
        }
        *current = Some(flag);
        true
    }

    fn dispatch(&self, event: &SdkEvent) {
        // Listeners run outside the lock so they may call back into the registry.
        let listeners: Vec<Listener> = lock(&self.listeners)
            .iter()
            .filter(|(name, _)| name == event.name())
            .map(|(_, listener)| Arc::clone(listener))
            .collect();

        for listener in listeners {
            listener(event);
        }
    }
}

impl CustomElementRegistry for SdkRegistry {
    fn is_defined(&self, tag: &str) -> bool {
        lock(&self.elements).contains(tag)
    }

    fn define(&self, tag: &str) -> Result<()> {
        if !lock(&self.elements).insert(tag.to_string()) {
            return Err(GraceError::ElementDefinition {
                tag: tag.to_string(),
                message: "this name has already been used with this registry".to_string(),
            });
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::events::{ERROR_EVENT, READY_EVENT};
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[test]
    fn test_try_claim_sets_flag_once() {
        let registry = SdkRegistry::new();
        assert!(registry.sdk_flag().is_none());

        assert!(registry.try_claim(SdkFlag::loaded("0.0.1", None)));
        assert!(!registry.try_claim(SdkFlag::loaded("9.9.9", None)));

        assert_eq!(registry.sdk_flag(), Some(SdkFlag::loaded("0.0.1", None)));
    }

    #[test]
    fn test_define_once_never_redefines() {
        let registry = SdkRegistry::new();
        assert!(define_once(&registry, "grace-chat").unwrap());
        assert!(!define_once(&registry, "grace-chat").unwrap());
        assert_eq!(registry.defined_elements(), vec!["grace-chat".to_string()]);

        // A raw second define is rejected like the DOM does.
        assert!(registry.define("grace-chat").is_err());
    }

    #[test]
    fn test_dispatch_only_reaches_matching_listeners() {
        let registry = SdkRegistry::new();
        let ready = Arc::new(AtomicUsize::new(0));
        let errors = Arc::new(AtomicUsize::new(0));

        let counter = Arc::clone(&ready);
        registry.add_event_listener(READY_EVENT, move |_| {
            counter.fetch_add(1, Ordering::SeqCst);
        });
        let counter = Arc::clone(&errors);
        registry.add_event_listener(ERROR_EVENT, move |_| {
            counter.fetch_add(1, Ordering::SeqCst);
        });

        registry.dispatch(&SdkEvent::ready("0.0.1", None));

        assert_eq!(ready.load(Ordering::SeqCst), 1);
        assert_eq!(errors.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn test_flag_serializes_like_the_window_object() {
        let flag = SdkFlag::loaded("0.0.1", Some("https://cdn.grace-sdk.com".to_string()));
        let json = serde_json::to_value(&flag).unwrap();
        assert_eq!(
            json,
            serde_json::json!({
                "version": "0.0.1",
                "loaded": true,
                "cdnUrl": "https://cdn.grace-sdk.com"
            })
        );
    }

    #[test]
    fn test_reset_clears_global_state() {
        let registry = global();
        registry.reset();
        assert!(registry.try_claim(SdkFlag::loaded("0.0.1", None)));
        registry.reset();
        assert!(registry.sdk_flag().is_none());
    }
}
