//! Error types for the Grace Chat SDK.

use thiserror::Error;

use crate::element::AttachStep;

/// A specialized Result type for SDK operations.
pub type Result<T> = std::result::Result<T, GraceError>;

/// Broad classification of failures.
///
/// A duplicate load is deliberately absent: it is reported as
/// [`crate::loader::LoadOutcome::AlreadyLoaded`], not as an error.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    /// The external module or the element wrapper could not be imported or evaluated.
    Load,
    /// The module imported but its initializers, constructor or hooks failed.
    Initialization,
    /// Invalid SDK configuration.
    Configuration,
    /// Work was abandoned because a newer attachment superseded it.
    Cancelled,
    /// Host or tooling failure unrelated to the external module.
    Internal,
}

/// Errors that can occur while loading the SDK or attaching an element.
#[derive(Error, Debug)]
pub enum GraceError {
    /// The module could not be imported.
    #[error("Failed to load module '{specifier}': {message}")]
    ModuleLoad {
        /// Module specifier or URL that was imported.
        specifier: String,
        /// Reason reported by the host.
        message: String,
    },

    /// The imported module does not expose the required exports.
    #[error("Module contract mismatch: missing {}", missing.join(", "))]
    ContractMismatch {
        /// Names of the missing exports.
        missing: Vec<String>,
    },

    /// A lifecycle step after the import failed.
    #[error("Initialization failed during {step}: {message}")]
    Initialization {
        /// Step of the attach sequence that failed.
        step: AttachStep,
        /// Reason reported by the module.
        message: String,
    },

    /// The custom element could not be defined.
    #[error("Failed to define custom element <{tag}>: {message}")]
    ElementDefinition {
        /// Tag name being defined.
        tag: String,
        /// Reason reported by the registry.
        message: String,
    },

    /// A host (DOM/global scope) operation failed.
    #[error("Host error: {message}")]
    Host {
        /// Detailed error message.
        message: String,
    },

    /// Invalid configuration.
    #[error("Configuration error: {message}")]
    Config {
        /// Detailed error message.
        message: String,
    },

    /// The loader script template failed to render.
    #[error("Template error: {message}")]
    Template {
        /// Detailed error message.
        message: String,
    },

    /// The attachment was superseded by a detach or a newer attachment.
    #[error("Attachment {token} was superseded")]
    Superseded {
        /// Token of the stale attachment.
        token: u64,
    },

    /// I/O failure.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl GraceError {
    /// Creates a module load error.
    pub fn module_load<S: Into<String>, M: Into<String>>(specifier: S, message: M) -> Self {
        Self::ModuleLoad {
            specifier: specifier.into(),
            message: message.into(),
        }
    }

    /// Creates an initialization error for the given step.
    pub fn initialization<S: Into<String>>(step: AttachStep, message: S) -> Self {
        Self::Initialization {
            step,
            message: message.into(),
        }
    }

    /// Creates a host error.
    pub fn host<S: Into<String>>(message: S) -> Self {
        Self::Host {
            message: message.into(),
        }
    }

    /// Creates a configuration error.
    pub fn config<S: Into<String>>(message: S) -> Self {
        Self::Config {
            message: message.into(),
        }
    }

    /// Returns the category this error belongs to.
    pub fn category(&self) -> ErrorCategory {
        match self {
            Self::ModuleLoad { .. } | Self::ContractMismatch { .. } => ErrorCategory::Load,
            Self::ElementDefinition { .. } => ErrorCategory::Load,
            Self::Initialization { .. } => ErrorCategory::Initialization,
            Self::Config { .. } => ErrorCategory::Configuration,
            Self::Superseded { .. } => ErrorCategory::Cancelled,
            Self::Host { .. } | Self::Template { .. } | Self::Io(_) => ErrorCategory::Internal,
        }
    }

    /// Returns true if this error only signals a stale attachment.
    pub fn is_superseded(&self) -> bool {
        matches!(self, Self::Superseded { .. })
    }
}

impl From<handlebars::RenderError> for GraceError {
    fn from(err: handlebars::RenderError) -> Self {
        Self::Template {
            message: err.to_string(),
        }
    }
}

impl From<handlebars::TemplateError> for GraceError {
    fn from(err: handlebars::TemplateError) -> Self {
        Self::Template {
            message: err.to_string(),
        }
    }
}

impl From<url::ParseError> for GraceError {
    fn from(err: url::ParseError) -> Self {
        Self::Config {
            message: format!("Invalid URL: {}", err),
        }
    }
}
