mod cli;

use std::path::Path;
use std::process::ExitCode;

use anyhow::{Context, Result};
use clap::Parser;
use tracing::info;

use hook_registry::{HookDiscovery, MatcherBuilder};
use hookwarden::{config, init_tracing, Config, Orchestrator};
use policy_engine::{Capability, PolicyStore};

use crate::cli::{Cli, Command};

fn main() -> Result<ExitCode> {
    // 1. Parse CLI args.
    let cli = Cli::parse();

    // 2. Load config.
    let cfg = config::load(&cli.config)?;

    // 3. Init tracing.
    init_tracing(&cfg.logging, cli.log_level.as_deref())?;
    info!(
        config_file = %cli.config.display(),
        command = ?cli.command,
        "hookwarden starting"
    );

    // 4. Dispatch.
    match cli.command {
        Command::Hooks { namespace } => {
            let namespace = namespace.unwrap_or_else(|| cfg.extension_namespace.clone());
            list_hooks(&namespace);
            Ok(ExitCode::SUCCESS)
        }
        Command::Policy { policy } => {
            let store = load_store(&cfg, policy.as_deref())?;
            report_policy(&store);
            Ok(ExitCode::SUCCESS)
        }
        Command::Check {
            capability,
            candidate,
            policy,
        } => {
            let store = load_store(&cfg, policy.as_deref())?;
            Ok(check(&store, capability.into(), &candidate))
        }
        Command::Install => install(cfg),
    }
}

fn load_store(cfg: &Config, policy_override: Option<&Path>) -> Result<PolicyStore> {
    let path = policy_override.or(cfg.policy_file.as_deref());
    policy_engine::loader::load_store(path).context("failed to load policy file")
}

fn list_hooks(namespace: &str) {
    let catalog = HookDiscovery::new(namespace).discover();
    println!("namespace {namespace}: {} hook(s)", catalog.len());
    for descriptor in catalog.descriptors() {
        match MatcherBuilder::compile(descriptor) {
            Ok(hook) => println!(
                "  {:<7} {}\n          advice={} matcher={}",
                hook.kind().to_string(),
                hook.id(),
                hook.advice().name(),
                hook.member_matcher(),
            ),
            Err(err) => println!("  invalid {}\n          {err}", descriptor.id()),
        }
    }
    for rejection in catalog.rejected() {
        println!("  rejected {}\n          {}", rejection.label, rejection.error);
    }
}

fn report_policy(store: &PolicyStore) {
    for capability in Capability::ALL {
        let list = store.deny_list(capability);
        println!("{capability}: {} rule(s)", list.len());
        for shadowed in list.shadowed_rules() {
            println!(
                "  unreachable rule #{} '{}' (covered by rule #{})",
                shadowed.index, shadowed.rule.pattern, shadowed.shadowed_by
            );
        }
    }
}

fn check(store: &PolicyStore, capability: Capability, candidate: &str) -> ExitCode {
    let decision = store.evaluate(capability, candidate);
    if decision.is_blocked() {
        println!("BLOCKED {candidate}: {}", decision.reason);
        ExitCode::from(2)
    } else {
        println!("allowed {candidate}: {}", decision.reason);
        ExitCode::SUCCESS
    }
}

fn install(cfg: Config) -> Result<ExitCode> {
    let orchestrator = Orchestrator::new(cfg);
    let mut engine = orchestrator.engine();
    let report = orchestrator.install(&mut engine)?;

    println!(
        "installed namespace {}: {} registered, {} failed, {} rejected",
        report.namespace,
        report.apply.registered.len(),
        report.apply.failed.len(),
        report.rejected.len(),
    );
    for failed in &report.apply.failed {
        println!("  failed {}: {}", failed.id, failed.error);
    }
    for rejection in &report.rejected {
        println!("  rejected {}: {}", rejection.label, rejection.error);
    }

    if report.apply.is_clean() && report.rejected.is_empty() {
        Ok(ExitCode::SUCCESS)
    } else {
        Ok(ExitCode::FAILURE)
    }
}
