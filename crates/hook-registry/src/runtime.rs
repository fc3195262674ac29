//! In-process reference engine.
//!
//! Hosts that route their sensitive operations through [`InProcessEngine::invoke`]
//! get the same entry/exit and replace semantics a bytecode weaver would
//! provide. Types are "loaded" with [`InProcessEngine::define_type`]; those
//! defined before install are retransformed by it, later ones are transformed
//! on definition.

use std::collections::{BTreeMap, HashMap, HashSet};
use std::sync::{Arc, PoisonError, RwLock};

use thiserror::Error;
use tracing::{debug, info, trace};

use crate::advice::{Arg, ExitStatus, Invocation, SecurityViolation};
use crate::engine::{
    EngineError, InstallSummary, InstrumentationEngine, LoggingListener, TransformListener,
};
use crate::matcher::{CompiledHook, JoinPointKind};
use crate::signature::{MemberDescription, TypeDescription};

/// Outcome of a guarded call that did not complete normally.
#[derive(Debug, Error)]
pub enum InvocationError {
    #[error(transparent)]
    Blocked(#[from] SecurityViolation),

    #[error("intercepted body raised: {0}")]
    Body(anyhow::Error),
}

impl InvocationError {
    pub fn violation(&self) -> Option<&SecurityViolation> {
        match self {
            InvocationError::Blocked(v) => Some(v),
            InvocationError::Body(_) => None,
        }
    }
}

/// Advice woven into one member.
#[derive(Debug, Clone)]
enum Woven {
    Wrap(Vec<CompiledHook>),
    Replace(CompiledHook),
}

#[derive(Debug, Default)]
struct EngineState {
    installed: bool,
    types: BTreeMap<String, TypeDescription>,
    /// Woven advice by type name, then member. Entries are shared with
    /// in-flight dispatches.
    woven: HashMap<String, HashMap<MemberDescription, Arc<Woven>>>,
    errors: usize,
}

/// Reference [`InstrumentationEngine`] that dispatches calls in-process.
pub struct InProcessEngine {
    ignored: Vec<String>,
    hooks: Vec<CompiledHook>,
    ids: HashSet<String>,
    listener: Arc<dyn TransformListener>,
    state: RwLock<EngineState>,
}

impl Default for InProcessEngine {
    fn default() -> Self {
        Self::new()
    }
}

impl InProcessEngine {
    pub fn new() -> Self {
        Self {
            ignored: Vec::new(),
            hooks: Vec::new(),
            ids: HashSet::new(),
            listener: Arc::new(LoggingListener),
            state: RwLock::new(EngineState::default()),
        }
    }

    /// Type-name prefixes that are never transformed.
    pub fn with_ignored<I, S>(mut self, prefixes: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.ignored.extend(prefixes.into_iter().map(Into::into));
        self
    }

    pub fn with_listener(mut self, listener: Arc<dyn TransformListener>) -> Self {
        self.listener = listener;
        self
    }

    pub fn is_ignored(&self, type_name: &str) -> bool {
        self.ignored.iter().any(|p| type_name.starts_with(p.as_str()))
    }

    pub fn is_installed(&self) -> bool {
        self.read().installed
    }

    /// Hooks registered so far, in registration order.
    pub fn hooks(&self) -> &[CompiledHook] {
        &self.hooks
    }

    /// Load a type. After install it is transformed immediately.
    pub fn define_type(&self, ty: TypeDescription) {
        let mut state = self.write();
        if state.installed {
            self.transform(&mut state, &ty);
        }
        state.types.insert(ty.name.clone(), ty);
    }

    /// Ids of the hooks woven into `member` of `type_name`, in run order.
    pub fn woven_hooks(&self, type_name: &str, member: &MemberDescription) -> Vec<String> {
        match self.lookup(type_name, member).as_deref() {
            Some(Woven::Wrap(hooks)) => hooks.iter().map(|h| h.id().to_string()).collect(),
            Some(Woven::Replace(hook)) => vec![hook.id().to_string()],
            None => Vec::new(),
        }
    }

    /// Dispatch a call to `member` of `type_name` through any woven advice.
    ///
    /// Returns `Ok(Some(_))` when the body ran to completion and `Ok(None)`
    /// when a native member was replaced by advice that allowed the call.
    pub fn invoke<R>(
        &self,
        type_name: &str,
        member: &MemberDescription,
        args: &[Arg],
        body: impl FnOnce(&[Arg]) -> anyhow::Result<R>,
    ) -> Result<Option<R>, InvocationError> {
        // Advice may itself define types; never hold the lock across it.
        let woven = self.lookup(type_name, member);

        let call = Invocation {
            type_name,
            member,
            args,
        };

        match woven.as_deref() {
            None => body(args).map(Some).map_err(InvocationError::Body),
            Some(Woven::Replace(hook)) => {
                trace!(hook = hook.id(), "replaced native call");
                hook.advice().on_enter(&call)?;
                Ok(None)
            }
            Some(Woven::Wrap(hooks)) => {
                let mut exits = PendingExits {
                    hooks,
                    entered: 0,
                    call,
                    status: None,
                };
                for hook in hooks {
                    if let Err(violation) = hook.advice().on_enter(&call) {
                        exits.status = Some(ExitStatus::Raised(violation.to_string()));
                        return Err(violation.into());
                    }
                    exits.entered += 1;
                }
                match body(args) {
                    Ok(value) => {
                        exits.status = Some(ExitStatus::Returned);
                        Ok(Some(value))
                    }
                    Err(err) => {
                        exits.status = Some(ExitStatus::Raised(err.to_string()));
                        Err(InvocationError::Body(err))
                    }
                }
            }
        }
    }

    fn transform(&self, state: &mut EngineState, ty: &TypeDescription) -> usize {
        if self.is_ignored(&ty.name) {
            self.listener.on_ignored(&ty.name);
            return 0;
        }

        let mut applied = Vec::new();
        let mut woven_members = 0;
        for member in &ty.members {
            let matching: Vec<&CompiledHook> = self
                .hooks
                .iter()
                .filter(|h| h.matches(&ty.name, member))
                .collect();
            if matching.is_empty() {
                continue;
            }

            let (replace, wrap): (Vec<&CompiledHook>, Vec<&CompiledHook>) = matching
                .into_iter()
                .partition(|h| h.kind() == JoinPointKind::Replace);

            let woven = match replace.split_first() {
                Some((first, rest)) => {
                    for dropped in rest.iter().chain(wrap.iter()) {
                        state.errors += 1;
                        self.listener.on_error(
                            &ty.name,
                            &format!(
                                "member {member} is already replaced by {}; {} not woven",
                                first.id(),
                                dropped.id()
                            ),
                        );
                    }
                    applied.push(first.id().to_string());
                    Woven::Replace((*first).clone())
                }
                None => {
                    applied.extend(wrap.iter().map(|h| h.id().to_string()));
                    Woven::Wrap(wrap.into_iter().cloned().collect())
                }
            };
            state
                .woven
                .entry(ty.name.clone())
                .or_default()
                .insert(member.clone(), Arc::new(woven));
            woven_members += 1;
        }

        if !applied.is_empty() {
            self.listener.on_transformation(&ty.name, &applied);
        }
        woven_members
    }

    fn lookup(&self, type_name: &str, member: &MemberDescription) -> Option<Arc<Woven>> {
        self.read()
            .woven
            .get(type_name)
            .and_then(|members| members.get(member))
            .cloned()
    }

    fn read(&self) -> std::sync::RwLockReadGuard<'_, EngineState> {
        self.state.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write(&self) -> std::sync::RwLockWriteGuard<'_, EngineState> {
        self.state.write().unwrap_or_else(PoisonError::into_inner)
    }
}

impl InstrumentationEngine for InProcessEngine {
    fn register(&mut self, hook: CompiledHook) -> Result<(), EngineError> {
        if self.read().installed {
            return Err(EngineError::RegistrationClosed {
                id: hook.id().to_string(),
            });
        }
        if self.is_ignored(hook.target_type()) {
            return Err(EngineError::IgnoredTarget {
                id: hook.id().to_string(),
                target_type: hook.target_type().to_string(),
            });
        }
        if !self.ids.insert(hook.id().to_string()) {
            return Err(EngineError::DuplicateHook {
                id: hook.id().to_string(),
            });
        }
        debug!(hook = hook.id(), kind = %hook.kind(), "hook queued");
        self.hooks.push(hook);
        Ok(())
    }

    fn install(&mut self) -> Result<InstallSummary, EngineError> {
        let mut state = self.write();
        if state.installed {
            return Err(EngineError::AlreadyInstalled);
        }
        state.installed = true;

        let loaded: Vec<TypeDescription> = state.types.values().cloned().collect();
        let mut summary = InstallSummary {
            hooks: self.hooks.len(),
            ..InstallSummary::default()
        };
        for ty in &loaded {
            let woven = self.transform(&mut state, ty);
            if woven > 0 {
                summary.transformed_types += 1;
                summary.woven_members += woven;
            }
        }
        summary.errors = state.errors;

        info!(
            hooks = summary.hooks,
            transformed_types = summary.transformed_types,
            woven_members = summary.woven_members,
            "in-process engine installed"
        );
        Ok(summary)
    }
}

/// Runs the exit advice of every entered wrap hook, innermost first, when
/// dropped. Unwinding out of the body leaves `status` unset, which reports
/// the call as raised.
struct PendingExits<'a> {
    hooks: &'a [CompiledHook],
    entered: usize,
    call: Invocation<'a>,
    status: Option<ExitStatus>,
}

impl Drop for PendingExits<'_> {
    fn drop(&mut self) {
        let status = self
            .status
            .take()
            .unwrap_or_else(|| ExitStatus::Raised("panicked".to_string()));
        for hook in self.hooks[..self.entered].iter().rev() {
            if hook.advice().has_exit() {
                hook.advice().on_exit(&self.call, &status);
            }
        }
    }
}
