//! # guards
//!
//! The concrete protections hookwarden installs. Each module submits its
//! hook declarations under [`NAMESPACE`]; discovery picks them up at install
//! time.
//!
//! | module | join point | decision |
//! |---|---|---|
//! | [`process`] | native process creation | block while a request is bound and the command is non-empty |
//! | [`deserialization`] | stream class resolution | block on the deserialization deny list |
//! | [`naming`] | naming object factories, RMI class loading | block remote locations; block factories on the deny list |
//! | [`native_library`] | native library loading | always block |
//! | [`inbound`] | servlet dispatch | bind/unbind the request context |
//!
//! Guards read their policy from the [`bootstrap`] slot.

pub mod bootstrap;
pub mod deserialization;
pub mod diagnostics;
pub mod inbound;
pub mod naming;
pub mod native_library;
pub mod process;

use hook_registry::{HookCatalog, HookDiscovery};

/// Extension namespace every guard declaration is submitted under.
pub const NAMESPACE: &str = "guards";

/// Discover and validate every guard hook.
pub fn catalog() -> HookCatalog {
    HookDiscovery::new(NAMESPACE).discover()
}
