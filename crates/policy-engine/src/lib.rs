//! # policy-engine
//!
//! Deny-rule evaluation for the hookwarden guards. A [`DenyList`] is an
//! ordered list of prefix or exact patterns where the first match wins; a
//! [`PolicyStore`] holds one list per protected [`Capability`].
//!
//! ## Quick start
//!
//! ```rust
//! use policy_engine::{Capability, PolicyStore};
//!
//! let store = PolicyStore::builtin();
//! let decision = store.evaluate(Capability::Deserialization, "java.lang.Runtime");
//! assert!(decision.is_blocked());
//! ```

mod decision;
pub mod defaults;
mod evaluator;
pub mod loader;
pub mod matcher;
mod schema;

// Re-export primary public API at crate root.
pub use decision::{PolicyDecision, ResolvedAction};
pub use evaluator::{DenyList, PolicyStore, ShadowedRule};
pub use schema::{Capability, DenyListsConfig, PolicyConfig, PolicyRule, RuleKind};
