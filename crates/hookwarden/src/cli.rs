use clap::{Parser, Subcommand, ValueEnum};
use policy_engine::Capability;
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "hookwarden", version, about = "Runtime self-protection agent")]
pub struct Cli {
    /// Path to the configuration file
    #[arg(short, long, global = true, default_value = "hookwarden.yaml")]
    pub config: PathBuf,

    /// Log level (overrides config file setting)
    #[arg(long, global = true)]
    pub log_level: Option<String>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// List the hooks declared in an extension namespace
    Hooks {
        /// Namespace to list (overrides config file setting)
        #[arg(short, long)]
        namespace: Option<String>,
    },

    /// Load a policy and report its deny lists
    Policy {
        /// Path to the policy file (overrides config file setting)
        #[arg(short, long)]
        policy: Option<PathBuf>,
    },

    /// Evaluate a class name against a deny list; exits 2 when blocked
    Check {
        /// Deny list to evaluate against
        #[arg(value_enum)]
        capability: CapabilityArg,

        /// Fully qualified class name
        candidate: String,

        /// Path to the policy file (overrides config file setting)
        #[arg(short, long)]
        policy: Option<PathBuf>,
    },

    /// Run a full install into an in-process engine and print the report
    Install,
}

#[derive(ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
pub enum CapabilityArg {
    Deserialization,
    ObjectFactory,
}

impl From<CapabilityArg> for Capability {
    fn from(arg: CapabilityArg) -> Self {
        match arg {
            CapabilityArg::Deserialization => Capability::Deserialization,
            CapabilityArg::ObjectFactory => Capability::ObjectFactory,
        }
    }
}
