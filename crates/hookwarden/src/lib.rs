//! # hookwarden
//!
//! Runtime self-protection agent. [`Orchestrator::install`] loads the deny
//! policy, publishes it to the guards, discovers every hook declared in the
//! configured namespace and weaves them through an instrumentation engine.
//!
//! ```rust,no_run
//! use hookwarden::{config, Orchestrator};
//!
//! # fn main() -> anyhow::Result<()> {
//! let config = config::load(std::path::Path::new("hookwarden.yaml"))?;
//! let orchestrator = Orchestrator::new(config);
//! let mut engine = orchestrator.engine();
//! let report = orchestrator.install(&mut engine)?;
//! assert!(report.apply.is_clean());
//! # Ok(())
//! # }
//! ```

pub mod agent;
pub mod config;
pub mod telemetry;

pub use agent::{InstallError, InstallReport, Orchestrator};
pub use config::Config;
pub use telemetry::init_tracing;
