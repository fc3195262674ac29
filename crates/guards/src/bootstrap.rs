//! Process-global publication slot for guard state.
//!
//! Advice can run on any thread, long after the installer returned. The
//! installer publishes the policy and audit sink here exactly once; advice
//! reads them with [`shared`].

use std::sync::{Arc, OnceLock};

use audit_log::AuditSink;
use policy_engine::PolicyStore;
use thiserror::Error;
use tracing::{debug, info};

/// Read-only state every guard consults.
#[derive(Debug, Clone)]
pub struct BootstrapState {
    pub policy: PolicyStore,
    pub audit: Option<AuditSink>,
}

impl BootstrapState {
    pub fn new(policy: PolicyStore, audit: Option<AuditSink>) -> Self {
        Self { policy, audit }
    }

    /// Built-in deny catalogue, no audit trail.
    pub fn builtin() -> Self {
        Self::new(PolicyStore::builtin(), None)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum BootstrapError {
    #[error("guard state has already been published")]
    AlreadyPublished,
}

static PUBLISHED: OnceLock<Arc<BootstrapState>> = OnceLock::new();
static FALLBACK: OnceLock<Arc<BootstrapState>> = OnceLock::new();

/// Publish the guard state. Succeeds once per process.
pub fn publish(state: BootstrapState) -> Result<Arc<BootstrapState>, BootstrapError> {
    let state = Arc::new(state);
    PUBLISHED
        .set(Arc::clone(&state))
        .map_err(|_| BootstrapError::AlreadyPublished)?;
    info!(
        policy = ?state.policy,
        audit = state.audit.is_some(),
        "guard state published"
    );
    Ok(state)
}

pub fn is_published() -> bool {
    PUBLISHED.get().is_some()
}

/// The published state, or the built-in catalogue before publication.
pub fn shared() -> Arc<BootstrapState> {
    match PUBLISHED.get() {
        Some(state) => Arc::clone(state),
        None => Arc::clone(FALLBACK.get_or_init(|| {
            debug!("guard state not yet published; using built-in deny catalogue");
            Arc::new(BootstrapState::builtin())
        })),
    }
}
