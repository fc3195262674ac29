//! # request-context
//!
//! Binds the inbound request being served to the worker thread serving it,
//! so guards deep in the call stack can tell "inside a request" from "at
//! startup" and describe the offending request when they block.
//!
//! ```rust
//! use request_context::{is_bound, scope, ObjectSnapshot};
//!
//! let request = ObjectSnapshot::new("javax.servlet.http.HttpServletRequest")
//!     .with_property("method", "GET")
//!     .with_property("requestURI", "/")
//!     .into_ref();
//!
//! assert!(scope(request, None, is_bound));
//! assert!(!is_bound());
//! ```

pub mod host;
pub mod propagator;

pub use host::{string_property, HostObject, ObjectRef, ObjectSnapshot, RequestSummary};
pub use propagator::{
    bind, current, is_bound, scope, unbind, with_current, BoundContext, ContextScope,
};
