//! Process spawn guard.
//!
//! Spawning a process while serving a request is treated as command
//! injection. Spawns outside any request (startup, scheduled work) are left
//! alone.

use std::sync::Arc;

use hook_registry::{Advice, HookDeclaration, Invocation, SecurityViolation};
use policy_engine::PolicyDecision;

use crate::{diagnostics, NAMESPACE};

const OPERATION: &str = "process spawn";

/// Where the command line lives in the intercepted call's arguments.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CommandSource {
    /// A string argument holding the whole command line.
    Text(usize),
    /// A byte-array argument of NUL-separated words.
    NulSeparated(usize),
}

impl CommandSource {
    fn extract(self, call: &Invocation<'_>) -> Option<String> {
        match self {
            CommandSource::Text(index) => call.arg(index)?.as_str().map(str::to_string),
            CommandSource::NulSeparated(index) => {
                call.arg(index)?.as_bytes().map(command_from_block)
            }
        }
    }
}

/// Join a NUL-separated argument block into one command line.
pub fn command_from_block(block: &[u8]) -> String {
    let spaced: Vec<u8> = block
        .iter()
        .map(|&b| if b == 0 { b' ' } else { b })
        .collect();
    String::from_utf8_lossy(&spaced).trim().to_string()
}

/// Blocks native process creation while a request is bound to the thread.
#[derive(Debug)]
pub struct ProcessSpawnGuard {
    name: &'static str,
    source: CommandSource,
}

impl ProcessSpawnGuard {
    pub fn new(name: &'static str, source: CommandSource) -> Self {
        Self { name, source }
    }
}

impl Advice for ProcessSpawnGuard {
    fn name(&self) -> &str {
        self.name
    }

    fn on_enter(&self, call: &Invocation<'_>) -> Result<(), SecurityViolation> {
        if !request_context::is_bound() {
            return Ok(());
        }
        let Some(command) = self.source.extract(call).filter(|c| !c.is_empty()) else {
            return Ok(());
        };
        let decision = PolicyDecision::block_default(format!(
            "process spawn during an inbound request: {command}"
        ));
        Err(diagnostics::block(call, OPERATION, &command, &decision))
    }
}

fn create_guard() -> Arc<dyn Advice> {
    Arc::new(ProcessSpawnGuard::new(
        "ProcessSpawnGuard::create",
        CommandSource::Text(0),
    ))
}

fn fork_and_exec_guard() -> Arc<dyn Advice> {
    Arc::new(ProcessSpawnGuard::new(
        "ProcessSpawnGuard::forkAndExec",
        CommandSource::NulSeparated(2),
    ))
}

inventory::submit! {
    HookDeclaration::method(NAMESPACE, "java.lang.ProcessImpl", "create", create_guard).native()
}

inventory::submit! {
    HookDeclaration::method(NAMESPACE, "java.lang.ProcessImpl", "forkAndExec", fork_and_exec_guard)
        .native()
}

inventory::submit! {
    HookDeclaration::method(NAMESPACE, "java.lang.UNIXProcess", "forkAndExec", fork_and_exec_guard)
        .native()
}
