//! Inbound request binding.
//!
//! Wraps the servlet dispatch entry point so that every guard running below
//! it on the same thread can see the request being served. The binding is
//! released when dispatch returns or raises.

use std::sync::Arc;

use hook_registry::{Advice, ExitStatus, HookDeclaration, Invocation, SecurityViolation};
use tracing::trace;

use crate::NAMESPACE;

/// Binds `(request, response)` on entry and unbinds on exit.
#[derive(Debug, Default)]
pub struct InboundRequestBinder;

impl Advice for InboundRequestBinder {
    fn name(&self) -> &str {
        "InboundRequestBinder"
    }

    fn on_enter(&self, call: &Invocation<'_>) -> Result<(), SecurityViolation> {
        let Some(request) = call.arg(0).and_then(|arg| arg.as_object()) else {
            trace!(target_type = call.type_name, "dispatch without a request object");
            return Ok(());
        };
        let response = call.arg(1).and_then(|arg| arg.as_object()).cloned();
        request_context::bind(Arc::clone(request), response);
        Ok(())
    }

    fn has_exit(&self) -> bool {
        true
    }

    fn on_exit(&self, _call: &Invocation<'_>, status: &ExitStatus) {
        if let ExitStatus::Raised(reason) = status {
            trace!(%reason, "dispatch raised; releasing request context");
        }
        request_context::unbind();
    }
}

fn inbound_request_binder() -> Arc<dyn Advice> {
    Arc::new(InboundRequestBinder)
}

inventory::submit! {
    HookDeclaration::method(NAMESPACE, "javax.servlet.http.HttpServlet", "service", inbound_request_binder)
        .parameters(&["javax.servlet.ServletRequest", "javax.servlet.ServletResponse"])
}

inventory::submit! {
    HookDeclaration::method(NAMESPACE, "jakarta.servlet.http.HttpServlet", "service", inbound_request_binder)
        .parameters(&["jakarta.servlet.ServletRequest", "jakarta.servlet.ServletResponse"])
}
