//! The pluggable instrumentation capability.
//!
//! Weaving advice into a running program is delegated to an
//! [`InstrumentationEngine`]. The registry only hands it compiled hooks and
//! asks it to install them once.

use thiserror::Error;
use tracing::{error, info, trace};

use crate::matcher::CompiledHook;

/// Errors reported by an instrumentation engine.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum EngineError {
    #[error("hook {id} is already registered")]
    DuplicateHook { id: String },

    #[error("hook {id} targets {target_type}, which is in an ignored namespace")]
    IgnoredTarget { id: String, target_type: String },

    #[error("engine is already installed; hook {id} arrived too late")]
    RegistrationClosed { id: String },

    #[error("engine is already installed")]
    AlreadyInstalled,

    #[error("install failed: {0}")]
    InstallFailed(String),
}

/// What an install accomplished.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct InstallSummary {
    /// Hooks handed to the engine.
    pub hooks: usize,
    /// Already-loaded types that were retransformed.
    pub transformed_types: usize,
    /// Members that received advice.
    pub woven_members: usize,
    /// Transformation errors reported to the listener.
    pub errors: usize,
}

/// Weaves compiled hooks into the host program.
pub trait InstrumentationEngine {
    /// Queue a hook. Nothing takes effect until [`InstrumentationEngine::install`].
    fn register(&mut self, hook: CompiledHook) -> Result<(), EngineError>;

    /// Apply every queued hook to loaded types and arm it for future ones.
    fn install(&mut self) -> Result<InstallSummary, EngineError>;
}

/// Observer of per-type transformation events.
pub trait TransformListener: Send + Sync {
    /// A type received advice on the listed hook ids.
    fn on_transformation(&self, type_name: &str, hook_ids: &[String]);

    /// A type was skipped because it lies in an ignored namespace.
    fn on_ignored(&self, _type_name: &str) {}

    /// Weaving part of a type failed; the rest of the type is unaffected.
    fn on_error(&self, type_name: &str, message: &str);
}

/// Default listener: reports transformation events through `tracing`.
#[derive(Debug, Default, Clone, Copy)]
pub struct LoggingListener;

impl TransformListener for LoggingListener {
    fn on_transformation(&self, type_name: &str, hook_ids: &[String]) {
        info!(target_type = type_name, hooks = ?hook_ids, "TRANSFORM");
    }

    fn on_ignored(&self, type_name: &str) {
        trace!(target_type = type_name, "type in ignored namespace left untouched");
    }

    fn on_error(&self, type_name: &str, message: &str) {
        error!(target_type = type_name, error = message, "transformation error");
    }
}
