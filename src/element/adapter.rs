use std::fmt;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use tracing::{debug, error, info};

use super::host::HostElement;
use super::panel::ErrorPanel;
use crate::config::SdkConfig;
use crate::error::{GraceError, Result};
use crate::module::{validate_contract, ChatDelegate, ModuleLoader};

/// Steps of the attach sequence, in execution order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AttachStep {
    /// Dynamic import of the external module.
    Import,
    /// The module's one-time initializer.
    Initialize,
    /// The chat initialization entry point.
    InitChat,
    /// Delegate construction.
    Construct,
    /// The delegate's connected hook.
    Connect,
}

impl fmt::Display for AttachStep {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Import => "module import",
            Self::Initialize => "module initialization",
            Self::InitChat => "chat initialization",
            Self::Construct => "delegate construction",
            Self::Connect => "connected hook",
        };
        f.write_str(name)
    }
}

/// Lifecycle state of one element.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AdapterState {
    /// Not attached; no delegate.
    Unattached,
    /// Attach sequence in flight.
    Attaching,
    /// Delegate constructed and connected.
    Attached,
    /// Attach failed; the error panel is the element's content.
    Error,
}

struct Binding {
    state: AdapterState,
    token: u64,
    delegate: Option<Box<dyn ChatDelegate>>,
}

/// Lifecycle adapter for one `grace-chat` element.
///
/// Each attachment gets a fresh token. A detach, or a newer attach, bumps the
/// token so that an attach sequence still awaiting the module finds itself
/// stale and discards its result instead of installing an orphaned delegate.
pub struct ElementAdapter {
    loader: Arc<dyn ModuleLoader>,
    host: Arc<dyn HostElement>,
    error_message: String,
    binding: Mutex<Binding>,
}

impl fmt::Debug for ElementAdapter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let binding = self.lock();
        f.debug_struct("ElementAdapter")
            .field("module", &self.loader.specifier())
            .field("state", &binding.state)
            .field("token", &binding.token)
            .finish()
    }
}

impl ElementAdapter {
    /// Create an unattached adapter for `host`.
    pub fn new(
        loader: Arc<dyn ModuleLoader>,
        host: Arc<dyn HostElement>,
        config: &SdkConfig,
    ) -> Self {
        Self {
            loader,
            host,
            error_message: config.error_message().to_string(),
            binding: Mutex::new(Binding {
                state: AdapterState::Unattached,
                token: 0,
                delegate: None,
            }),
        }
    }

    /// Current lifecycle state.
    pub fn state(&self) -> AdapterState {
        self.lock().state
    }

    /// Whether a delegate is currently held.
    pub fn has_delegate(&self) -> bool {
        self.lock().delegate.is_some()
    }

    /// Token of the most recent lifecycle transition.
    pub fn current_token(&self) -> u64 {
        self.lock().token
    }

    /// Attachment callback.
    ///
    /// Runs import, initialize, chat init, construct and connect in order.
    /// Failures are logged and rendered as the error panel; nothing is
    /// propagated to the caller.
    pub async fn connected_callback(&self) {
        let token = self.begin_attach();
        debug!(token, module = self.loader.specifier(), "Attaching element");

        match self.attach(token).await {
            Ok(delegate) => self.finish_attach(token, delegate),
            Err(err) if err.is_superseded() => {
                debug!(token, "Attachment superseded before completion");
            }
            Err(err) => self.fail_attach(token, err),
        }
    }

    /// Detachment callback. Releases the delegate, if any.
    pub fn disconnected_callback(&self) {
        let released = {
            let mut binding = self.lock();
            binding.token += 1;
            binding.state = AdapterState::Unattached;
            binding.delegate.take()
        };

        if let Some(mut delegate) = released {
            delegate.disconnect();
            debug!("Delegate released");
        }
    }

    fn begin_attach(&self) -> u64 {
        let (token, previous) = {
            let mut binding = self.lock();
            binding.token += 1;
            binding.state = AdapterState::Attaching;
            (binding.token, binding.delegate.take())
        };

        // Attached twice without a detach in between.
        if let Some(mut delegate) = previous {
            delegate.disconnect();
        }
        token
    }

    async fn attach(&self, token: u64) -> Result<Box<dyn ChatDelegate>> {
        let module = self.loader.load().await?;
        self.ensure_current(token)?;
        validate_contract(module.as_ref())?;

        module
            .initialize()
            .await
            .map_err(|e| step_error(AttachStep::Initialize, e))?;
        self.ensure_current(token)?;

        module
            .init_chat()
            .await
            .map_err(|e| step_error(AttachStep::InitChat, e))?;
        self.ensure_current(token)?;

        let mut delegate = module
            .create_delegate()
            .map_err(|e| step_error(AttachStep::Construct, e))?;

        delegate
            .connect(self.host.as_ref())
            .await
            .map_err(|e| step_error(AttachStep::Connect, e))?;

        Ok(delegate)
    }

    fn finish_attach(&self, token: u64, mut delegate: Box<dyn ChatDelegate>) {
        {
            let mut binding = self.lock();
            if binding.token == token {
                binding.delegate = Some(delegate);
                binding.state = AdapterState::Attached;
                info!(token, "Grace Chat element attached");
                return;
            }
        }

        debug!(token, "Discarding delegate from a stale attachment");
        delegate.disconnect();
    }

    fn fail_attach(&self, token: u64, err: GraceError) {
        {
            let mut binding = self.lock();
            if binding.token != token {
                debug!(token, error = %err, "Ignoring failure of a stale attachment");
                return;
            }
            binding.state = AdapterState::Error;
            binding.delegate = None;
        }

        error!(token, error = %err, "Error initializing Grace Chat");
        let panel = ErrorPanel::new(self.error_message.as_str());
        if let Err(render_err) = self.host.set_inner_html(&panel.render()) {
            error!(error = %render_err, "Failed to render error panel");
        }
    }

    fn ensure_current(&self, token: u64) -> Result<()> {
        if self.lock().token == token {
            Ok(())
        } else {
            Err(GraceError::Superseded { token })
        }
    }

    fn lock(&self) -> MutexGuard<'_, Binding> {
        self.binding.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

fn step_error(step: AttachStep, err: anyhow::Error) -> GraceError {
    GraceError::initialization(step, format!("{:#}", err))
}
