//! Agent installation: policy, bootstrap publication, discovery, weaving.

use std::sync::atomic::{AtomicBool, Ordering};

use audit_log::{AuditEntry, AuditEventType, AuditSink, AuditSource, AuditWriteError};
use guards::bootstrap::{self, BootstrapError, BootstrapState};
use hook_registry::{
    ApplyReport, EngineError, HookDiscovery, InProcessEngine, InstallSummary,
    InstrumentationEngine, InterceptionApplier, Rejection,
};
use serde_json::json;
use thiserror::Error;
use tracing::{error, info, warn};

use crate::config::Config;

const COMPONENT: &str = "hookwarden";

static INSTALLED: AtomicBool = AtomicBool::new(false);

/// Fatal installation failures. Per-hook problems are not fatal; they are
/// listed in the [`InstallReport`].
#[derive(Debug, Error)]
pub enum InstallError {
    #[error("hookwarden is already installed in this process")]
    AlreadyInstalled,

    #[error("failed to load policy: {0:#}")]
    Policy(anyhow::Error),

    #[error(transparent)]
    Audit(#[from] AuditWriteError),

    #[error(transparent)]
    Bootstrap(#[from] BootstrapError),

    #[error("instrumentation engine install failed: {0}")]
    Engine(#[from] EngineError),
}

/// What an install did.
#[derive(Debug, Clone)]
pub struct InstallReport {
    pub namespace: String,
    /// Declarations that failed validation during discovery.
    pub rejected: Vec<Rejection>,
    /// Per-descriptor registration outcome.
    pub apply: ApplyReport,
    pub engine: InstallSummary,
}

/// Drives a one-time agent install from a [`Config`].
#[derive(Debug, Clone)]
pub struct Orchestrator {
    config: Config,
}

impl Orchestrator {
    pub fn new(config: Config) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    /// An in-process engine honouring the configured ignore list.
    pub fn engine(&self) -> InProcessEngine {
        InProcessEngine::new().with_ignored(self.config.ignore_namespaces.iter().cloned())
    }

    /// Install every hook in the configured namespace into `engine`.
    ///
    /// Succeeds at most once per process. A failure is logged loudly and
    /// audited, then returned; the process is never left silently
    /// unprotected.
    pub fn install<E>(&self, engine: &mut E) -> Result<InstallReport, InstallError>
    where
        E: InstrumentationEngine + ?Sized,
    {
        if INSTALLED
            .compare_exchange(false, true, Ordering::SeqCst, Ordering::SeqCst)
            .is_err()
        {
            warn!("install requested but hookwarden is already installed");
            return Err(InstallError::AlreadyInstalled);
        }

        let audit = match self.open_audit() {
            Ok(audit) => audit,
            Err(err) => return Err(self.fail(err, None)),
        };

        match self.try_install(engine, audit.as_ref()) {
            Ok(report) => Ok(report),
            Err(err) => Err(self.fail(err, audit.as_ref())),
        }
    }

    fn open_audit(&self) -> Result<Option<AuditSink>, InstallError> {
        if !self.config.audit.enabled {
            return Ok(None);
        }
        Ok(Some(AuditSink::open(&self.config.audit.path)?))
    }

    fn try_install<E>(
        &self,
        engine: &mut E,
        audit: Option<&AuditSink>,
    ) -> Result<InstallReport, InstallError>
    where
        E: InstrumentationEngine + ?Sized,
    {
        let namespace = self.config.extension_namespace.clone();

        // 1. Banner.
        info!("==================== hookwarden ====================");
        info!(
            version = env!("CARGO_PKG_VERSION"),
            namespace = %namespace,
            policy_file = ?self.config.policy_file,
            "hookwarden agent starting"
        );
        record(
            audit,
            AuditEventType::AgentStarting,
            AuditSource::new(COMPONENT),
            json!({
                "version": env!("CARGO_PKG_VERSION"),
                "namespace": namespace,
                "policy_file": self.config.policy_file,
            }),
        );

        // 2. Policy.
        let policy = policy_engine::loader::load_store(self.config.policy_file.as_deref())
            .map_err(InstallError::Policy)?;
        info!(?policy, "policy loaded");

        // 3. Publish guard state before any hook can fire.
        bootstrap::publish(BootstrapState::new(policy, audit.cloned()))?;

        // 4. Discovery.
        let catalog = HookDiscovery::new(namespace.as_str()).discover();
        for rejection in catalog.rejected() {
            record(
                audit,
                AuditEventType::HookRejected,
                AuditSource::new(COMPONENT).with_hook(rejection.label.clone()),
                json!({ "stage": "discovery", "error": rejection.error.to_string() }),
            );
        }

        // 5. Registration, isolated per hook.
        let apply = InterceptionApplier::apply(engine, catalog.descriptors());
        for hook in &apply.registered {
            record(
                audit,
                AuditEventType::HookRegistered,
                AuditSource::new(COMPONENT).with_hook(hook.id.clone()),
                json!({ "kind": hook.kind.to_string(), "advice": hook.advice }),
            );
        }
        for failed in &apply.failed {
            record(
                audit,
                AuditEventType::HookRejected,
                AuditSource::new(COMPONENT).with_hook(failed.id.clone()),
                json!({ "stage": "registration", "error": failed.error.to_string() }),
            );
        }

        // 6. Weave.
        let summary = engine.install()?;
        info!(
            registered = apply.registered.len(),
            failed = apply.failed.len() + catalog.rejected().len(),
            transformed_types = summary.transformed_types,
            "hookwarden agent installed"
        );
        record(
            audit,
            AuditEventType::AgentInstalled,
            AuditSource::new(COMPONENT),
            json!({
                "registered": apply.registered.len(),
                "rejected": catalog.rejected().len(),
                "failed": apply.failed.len(),
                "transformed_types": summary.transformed_types,
                "woven_members": summary.woven_members,
            }),
        );

        Ok(InstallReport {
            namespace,
            rejected: catalog.rejected().to_vec(),
            apply,
            engine: summary,
        })
    }

    /// Log and audit a fatal failure, then hand the error back.
    fn fail(&self, err: InstallError, audit: Option<&AuditSink>) -> InstallError {
        error!("!!!!!!!!!!!!!!!! HOOKWARDEN INSTALL FAILED !!!!!!!!!!!!!!!!");
        error!(error = %err, "the process is running WITHOUT runtime protection");
        record(
            audit,
            AuditEventType::InstallFailed,
            AuditSource::new(COMPONENT),
            json!({ "error": err.to_string() }),
        );
        // Nothing was published, so a corrected retry may proceed.
        if !bootstrap::is_published() {
            INSTALLED.store(false, Ordering::SeqCst);
        }
        err
    }
}

fn record(
    audit: Option<&AuditSink>,
    event_type: AuditEventType,
    source: AuditSource,
    details: serde_json::Value,
) {
    if let Some(audit) = audit {
        audit.log(AuditEntry::new(event_type, source, details));
    }
}
