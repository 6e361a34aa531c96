//! Platform-aware bounds for native and WASM targets.
//!
//! The browser runs everything on one thread and JavaScript handles are not
//! `Send`, so trait objects shared by the loader and the element adapter only
//! require `Send + Sync` on native targets.

/// Marker trait for platform-aware bounds on host-facing traits.
#[cfg(not(target_arch = "wasm32"))]
pub trait PlatformService: Send + Sync {}

/// Marker trait for wasm32 targets.
#[cfg(target_arch = "wasm32")]
pub trait PlatformService {}

#[cfg(not(target_arch = "wasm32"))]
impl<T> PlatformService for T where T: Send + Sync {}

#[cfg(target_arch = "wasm32")]
impl<T> PlatformService for T {}
