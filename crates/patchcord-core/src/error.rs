//! Error types for module construction and patching.
//!
//! Errors only ever surface from control operations (construction, patch,
//! output, reset). The block path never produces them.

use thiserror::Error;

/// Invariant violations while registering a module's ports.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ExposeError {
    /// The module's ports were registered twice.
    #[error("ports of '{0}' are already exposed")]
    AlreadyExposed(String),

    /// Two ports share a name.
    #[error("duplicate port '{port}' on '{module}'")]
    DuplicatePort {
        /// Module instance id.
        module: String,
        /// Repeated port name.
        port: String,
    },

    /// An output has no provider to instantiate readers from.
    #[error("output '{output}' on '{module}' has no provider")]
    MissingProvider {
        /// Module instance id.
        module: String,
        /// Output without a provider.
        output: String,
    },

    /// An input default cannot be turned into a constant.
    #[error("input '{input}' on '{module}' has an invalid default: {reason}")]
    BadDefault {
        /// Module instance id.
        module: String,
        /// Input whose default failed.
        input: String,
        /// What was wrong with it.
        reason: String,
    },
}

/// Failures of `patch`, `output` and `reset`.
///
/// A failed patch leaves the existing wiring untouched.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PatchError {
    /// The module has no input with this name.
    #[error("unknown input '{input}' on '{module}'")]
    UnknownInput {
        /// Module instance id.
        module: String,
        /// Requested input.
        input: String,
    },

    /// The module has no output with this name.
    #[error("unknown output '{output}' on '{module}'")]
    UnknownOutput {
        /// Module instance id.
        module: String,
        /// Requested output.
        output: String,
    },

    /// The output already has a consumer.
    #[error("output '{output}' on '{module}' is already patched")]
    AlreadyPatched {
        /// Module instance id.
        module: String,
        /// Claimed output.
        output: String,
    },

    /// The source could not be turned into a processor.
    #[error("cannot patch {0}")]
    Unresolvable(String),

    /// A module output was patched into one of its own normal inputs.
    ///
    /// Feedback into the same module must go through a force-sinking input.
    #[error("'{module}' cannot feed its own input '{input}'")]
    SelfFeedback {
        /// Module instance id.
        module: String,
        /// Target input.
        input: String,
    },

    /// No module with this id is mounted in the rack.
    #[error("unknown module '{0}'")]
    UnknownModule(String),
}

/// Failures while constructing a module from its configuration.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ConfigError {
    /// No factory is registered under this name.
    #[error("unknown module type: {0}")]
    UnknownModule(String),

    /// A config field has the wrong shape or an out-of-range value.
    #[error("invalid field '{field}' for '{module}': {reason}")]
    InvalidField {
        /// Module type.
        module: String,
        /// Offending field.
        field: String,
        /// What was wrong with it.
        reason: String,
    },

    /// Port registration failed.
    #[error(transparent)]
    Expose(#[from] ExposeError),
}

impl ConfigError {
    /// Create an invalid field error.
    pub fn invalid_field(
        module: impl Into<String>,
        field: impl Into<String>,
        reason: impl Into<String>,
    ) -> Self {
        ConfigError::InvalidField {
            module: module.into(),
            field: field.into(),
            reason: reason.into(),
        }
    }
}
