//! Logging setup.
//!
//! Natively events go to stderr. In the browser the fmt layer writes through
//! `web_sys::console`, routing warnings and errors to `console.warn` and
//! `console.error`.

use tracing::Level;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

/// Filter used when `RUST_LOG` is not set.
pub const DEFAULT_FILTER: &str = "info";

/// Initialize logging from `RUST_LOG`, defaulting to `info`.
///
/// Returns `false` if a global subscriber was already installed.
pub fn init_logging() -> bool {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER));
    install(filter)
}

/// Initialize logging with a specific level.
pub fn init_logging_with_level(level: Level) -> bool {
    install(EnvFilter::new(level.as_str()))
}

#[cfg(not(all(feature = "wasm", target_arch = "wasm32")))]
fn install(filter: EnvFilter) -> bool {
    tracing_subscriber::registry()
        .with(fmt::layer().with_target(false))
        .with(filter)
        .try_init()
        .is_ok()
}

#[cfg(all(feature = "wasm", target_arch = "wasm32"))]
fn install(filter: EnvFilter) -> bool {
    tracing_subscriber::registry()
        .with(
            fmt::layer()
                .with_ansi(false)
                .with_target(false)
                .without_time()
                .with_writer(console::ConsoleMakeWriter),
        )
        .with(filter)
        .try_init()
        .is_ok()
}

#[cfg(all(feature = "wasm", target_arch = "wasm32"))]
mod console {
    use std::io;

    use tracing::{Level, Metadata};
    use tracing_subscriber::fmt::MakeWriter;
    use wasm_bindgen::JsValue;

    /// Creates one [`ConsoleWriter`] per formatted event.
    pub struct ConsoleMakeWriter;

    /// Buffers one formatted event and flushes it to the console on drop.
    pub struct ConsoleWriter {
        level: Level,
        buffer: Vec<u8>,
    }

    impl io::Write for ConsoleWriter {
        fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
            self.buffer.extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    impl Drop for ConsoleWriter {
        fn drop(&mut self) {
            if self.buffer.is_empty() {
                return;
            }
            let text = String::from_utf8_lossy(&self.buffer);
            let line = JsValue::from_str(text.trim_end());
            if self.level == Level::ERROR {
                web_sys::console::error_1(&line);
            } else if self.level == Level::WARN {
                web_sys::console::warn_1(&line);
            } else if self.level > Level::INFO {
                web_sys::console::debug_1(&line);
            } else {
                web_sys::console::log_1(&line);
            }
        }
    }

    impl<'a> MakeWriter<'a> for ConsoleMakeWriter {
        type Writer = ConsoleWriter;

        fn make_writer(&'a self) -> Self::Writer {
            ConsoleWriter {
                level: Level::INFO,
                buffer: Vec::new(),
            }
        }

        fn make_writer_for(&'a self, meta: &Metadata<'_>) -> Self::Writer {
            ConsoleWriter {
                level: *meta.level(),
                buffer: Vec::new(),
            }
        }
    }
}
