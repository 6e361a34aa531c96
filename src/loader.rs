//! One-shot SDK bootstrap.
//!
//! The loader claims the global `GraceChatSDK` flag before its first
//! suspension point. Scheduling is cooperative, so a second invocation that
//! runs while the first one awaits the bootstrap sees the flag and returns;
//! no lock is involved.

use tracing::{error, info, warn};

use crate::config::SdkConfig;
use crate::error::Result;
use crate::events::SdkEvent;
use crate::platform::PlatformService;
use crate::registry::{define_once, CustomElementRegistry, GlobalScope, SdkFlag};

/// Work performed once the flag is claimed.
#[cfg_attr(not(target_arch = "wasm32"), async_trait::async_trait)]
#[cfg_attr(target_arch = "wasm32", async_trait::async_trait(?Send))]
pub trait Bootstrap: PlatformService {
    /// Load the element wrapper.
    async fn load(&self) -> Result<()>;
}

/// Bootstrap that registers the custom element exactly once.
pub struct ElementBootstrap<'a> {
    registry: &'a dyn CustomElementRegistry,
    tag: String,
}

impl<'a> ElementBootstrap<'a> {
    /// Register `config.element_tag()` in `registry`.
    pub fn new(registry: &'a dyn CustomElementRegistry, config: &SdkConfig) -> Self {
        Self {
            registry,
            tag: config.element_tag().to_string(),
        }
    }
}

#[cfg_attr(not(target_arch = "wasm32"), async_trait::async_trait)]
#[cfg_attr(target_arch = "wasm32", async_trait::async_trait(?Send))]
impl<'a> Bootstrap for ElementBootstrap<'a> {
    async fn load(&self) -> Result<()> {
        define_once(self.registry, &self.tag).map(|_| ())
    }
}

/// What a loader invocation did.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LoadOutcome {
    /// The bootstrap succeeded and the ready event was dispatched.
    Ready {
        /// Version recorded in the flag
        version: String,
    },
    /// The bootstrap failed and the error event was dispatched.
    Failed {
        /// Message carried by the error event
        error: String,
    },
    /// Another invocation already claimed the scope; nothing happened.
    AlreadyLoaded {
        /// Version found in the existing flag
        version: String,
    },
}

/// The SDK loader.
pub struct Loader<'a> {
    scope: &'a dyn GlobalScope,
    bootstrap: &'a dyn Bootstrap,
    config: &'a SdkConfig,
}

impl<'a> Loader<'a> {
    /// Create a loader publishing to `scope`.
    pub fn new(
        scope: &'a dyn GlobalScope,
        bootstrap: &'a dyn Bootstrap,
        config: &'a SdkConfig,
    ) -> Self {
        Self {
            scope,
            bootstrap,
            config,
        }
    }

    /// Run the loader.
    ///
    /// Never fails: bootstrap errors become an error event.
    pub async fn run(&self) -> LoadOutcome {
        if let Some(existing) = self.scope.sdk_flag() {
            warn!(version = %existing.version, "Grace Chat SDK already loaded");
            return LoadOutcome::AlreadyLoaded {
                version: existing.version,
            };
        }

        let flag = SdkFlag::loaded(
            self.config.version(),
            self.config.cdn_url().map(str::to_string),
        );
        if !self.scope.try_claim(flag.clone()) {
            let version = self
                .scope
                .sdk_flag()
                .map(|existing| existing.version)
                .unwrap_or_default();
            warn!(version = %version, "Grace Chat SDK already loaded");
            return LoadOutcome::AlreadyLoaded { version };
        }

        match self.bootstrap.load().await {
            Ok(()) => {
                info!(version = %flag.version, "Grace Chat SDK loaded successfully");
                self.scope
                    .dispatch(&SdkEvent::ready(flag.version.as_str(), flag.cdn_url));
                LoadOutcome::Ready {
                    version: flag.version,
                }
            }
            Err(err) => {
                error!(error = %err, "Failed to load Grace Chat SDK");
                let message = err.to_string();
                self.scope.dispatch(&SdkEvent::error(message.as_str()));
                LoadOutcome::Failed { error: message }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::registry::SdkRegistry;

    #[cfg(not(target_arch = "wasm32"))]
    #[tokio::test]
    async fn test_element_bootstrap_defines_tag() {
        let registry = SdkRegistry::new();
        let config = SdkConfig::default();
        let bootstrap = ElementBootstrap::new(&registry, &config);

        bootstrap.load().await.unwrap();
        bootstrap.load().await.unwrap();

        assert_eq!(registry.defined_elements(), vec!["grace-chat".to_string()]);
    }

    #[cfg(not(target_arch = "wasm32"))]
    #[tokio::test]
    async fn test_loader_registers_element_and_sets_flag() {
        let registry = SdkRegistry::new();
        let config = SdkConfig::default();
        let bootstrap = ElementBootstrap::new(&registry, &config);

        let outcome = Loader::new(&registry, &bootstrap, &config).run().await;

        assert_eq!(
            outcome,
            LoadOutcome::Ready {
                version: "0.0.1".to_string()
            }
        );
        assert!(registry.is_defined("grace-chat"));
        assert_eq!(registry.sdk_flag(), Some(SdkFlag::loaded("0.0.1", None)));
    }
}
