//! Compiles descriptors and registers them with an engine, one at a time.

use thiserror::Error;
use tracing::{info, warn};

use crate::descriptor::HookDescriptor;
use crate::engine::{EngineError, InstrumentationEngine};
use crate::matcher::{JoinPointKind, MatcherBuilder, MatcherError};

/// Why a single descriptor could not be registered.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RegistrationError {
    #[error(transparent)]
    Matcher(#[from] MatcherError),

    #[error(transparent)]
    Engine(#[from] EngineError),
}

/// A hook the engine accepted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RegisteredHook {
    pub id: String,
    pub target_type: String,
    pub member: String,
    pub kind: JoinPointKind,
    pub advice: String,
}

/// A hook that failed to compile or register.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FailedHook {
    pub id: String,
    pub error: RegistrationError,
}

/// Per-descriptor outcome of an apply pass.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ApplyReport {
    pub registered: Vec<RegisteredHook>,
    pub failed: Vec<FailedHook>,
}

impl ApplyReport {
    pub fn is_clean(&self) -> bool {
        self.failed.is_empty()
    }
}

/// Feeds compiled hooks to an [`InstrumentationEngine`].
///
/// Each descriptor is handled in isolation: a compile or registration
/// failure is logged and recorded, and the remaining descriptors still go
/// through. Nothing is woven until the engine is installed.
pub struct InterceptionApplier;

impl InterceptionApplier {
    pub fn apply<E>(engine: &mut E, descriptors: &[HookDescriptor]) -> ApplyReport
    where
        E: InstrumentationEngine + ?Sized,
    {
        let mut report = ApplyReport::default();
        for descriptor in descriptors {
            match Self::register_one(engine, descriptor) {
                Ok(hook) => report.registered.push(hook),
                Err(error) => {
                    warn!(hook = %descriptor.id(), %error, "failed to register hook");
                    report.failed.push(FailedHook {
                        id: descriptor.id(),
                        error,
                    });
                }
            }
        }
        report
    }

    fn register_one<E>(
        engine: &mut E,
        descriptor: &HookDescriptor,
    ) -> Result<RegisteredHook, RegistrationError>
    where
        E: InstrumentationEngine + ?Sized,
    {
        let compiled = MatcherBuilder::compile(descriptor)?;
        let registered = RegisteredHook {
            id: compiled.id().to_string(),
            target_type: descriptor.target_type().to_string(),
            member: descriptor.member_label().to_string(),
            kind: compiled.kind(),
            advice: compiled.advice().name().to_string(),
        };
        engine.register(compiled)?;
        info!(
            hook = %format_args!("{}#{}", registered.target_type, registered.member),
            native = descriptor.is_native(),
            advice = %registered.advice,
            "Registered hook"
        );
        Ok(registered)
    }
}
