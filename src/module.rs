//! Contract of the external compiled module.
//!
//! The element adapter never talks to the chat engine directly. It imports a
//! module exposing three things: a default initializer, the
//! `init_grace_chat` entry point and a constructible `GraceChatElement`
//! delegate. The shape is checked right after the import so a module built
//! against a different contract fails with [`GraceError::ContractMismatch`]
//! instead of a missing-method failure deep inside the lifecycle.

use crate::element::HostElement;
use crate::error::{GraceError, Result};
use crate::platform::PlatformService;

/// Export name of the asynchronous module initializer.
pub const EXPORT_INITIALIZER: &str = "default";

/// Export name of the chat initialization entry point.
pub const EXPORT_INIT_CHAT: &str = "init_grace_chat";

/// Export name of the delegate constructor.
pub const EXPORT_DELEGATE: &str = "GraceChatElement";

/// Exports every conforming module must provide.
pub const REQUIRED_EXPORTS: [&str; 3] = [EXPORT_INITIALIZER, EXPORT_INIT_CHAT, EXPORT_DELEGATE];

/// Instance constructed from the module that performs the actual chat behaviour.
#[cfg_attr(not(target_arch = "wasm32"), async_trait::async_trait)]
#[cfg_attr(target_arch = "wasm32", async_trait::async_trait(?Send))]
pub trait ChatDelegate: PlatformService {
    /// Connected hook; receives the element so the delegate can render into it.
    async fn connect(&mut self, host: &dyn HostElement) -> anyhow::Result<()>;

    /// Called when the adapter releases the delegate.
    fn disconnect(&mut self) {}
}

/// A loaded external module.
#[cfg_attr(not(target_arch = "wasm32"), async_trait::async_trait)]
#[cfg_attr(target_arch = "wasm32", async_trait::async_trait(?Send))]
pub trait ChatModule: PlatformService {
    /// Whether the module exposes `name`.
    fn has_export(&self, name: &str) -> bool;

    /// One-time module initializer (`default()`).
    async fn initialize(&self) -> anyhow::Result<()>;

    /// Chat initialization entry point (`init_grace_chat()`).
    async fn init_chat(&self) -> anyhow::Result<()>;

    /// Construct a delegate (`new GraceChatElement()`).
    fn create_delegate(&self) -> anyhow::Result<Box<dyn ChatDelegate>>;
}

/// Imports the external module.
#[cfg_attr(not(target_arch = "wasm32"), async_trait::async_trait)]
#[cfg_attr(target_arch = "wasm32", async_trait::async_trait(?Send))]
pub trait ModuleLoader: PlatformService {
    /// Specifier or URL being imported.
    fn specifier(&self) -> &str;

    /// Import and evaluate the module.
    async fn load(&self) -> Result<Box<dyn ChatModule>>;
}

/// Check that `module` provides every required export.
///
/// # Errors
///
/// Returns [`GraceError::ContractMismatch`] naming all missing exports.
pub fn validate_contract(module: &dyn ChatModule) -> Result<()> {
    let missing: Vec<String> = REQUIRED_EXPORTS
        .iter()
        .filter(|name| !module.has_export(name))
        .map(|name| name.to_string())
        .collect();

    if missing.is_empty() {
        Ok(())
    } else {
        Err(GraceError::ContractMismatch { missing })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct PartialModule {
        exports: Vec<&'static str>,
    }

    #[cfg_attr(not(target_arch = "wasm32"), async_trait::async_trait)]
    #[cfg_attr(target_arch = "wasm32", async_trait::async_trait(?Send))]
    impl ChatModule for PartialModule {
        fn has_export(&self, name: &str) -> bool {
            self.exports.iter().any(|export| *export == name)
        }

        async fn initialize(&self) -> anyhow::Result<()> {
            Ok(())
        }

        async fn init_chat(&self) -> anyhow::Result<()> {
            Ok(())
        }

        fn create_delegate(&self) -> anyhow::Result<Box<dyn ChatDelegate>> {
            anyhow::bail!("no delegate")
        }
    }

    #[test]
    fn test_complete_module_passes() {
        let module = PartialModule {
            exports: REQUIRED_EXPORTS.to_vec(),
        };
        assert!(validate_contract(&module).is_ok());
    }

    #[test]
    fn test_missing_exports_are_all_reported() {
        let module = PartialModule {
            exports: vec![EXPORT_INITIALIZER],
        };
        match validate_contract(&module) {
            Err(GraceError::ContractMismatch { missing }) => {
                assert_eq!(missing, vec!["init_grace_chat", "GraceChatElement"]);
            }
            other => panic!("expected contract mismatch, got {:?}", other),
        }
    }
}
