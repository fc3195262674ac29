//! Deserialization guard: checks every class name a stream resolves.

use std::sync::Arc;

use hook_registry::{Advice, HookDeclaration, Invocation, SecurityViolation};
use policy_engine::Capability;
use request_context::string_property;
use tracing::trace;

use crate::{bootstrap, diagnostics, NAMESPACE};

const OPERATION: &str = "deserialization";

/// Rejects stream class descriptors whose name is on the deserialization
/// deny list.
#[derive(Debug, Default)]
pub struct ResolveClassGuard;

impl Advice for ResolveClassGuard {
    fn name(&self) -> &str {
        "ResolveClassGuard"
    }

    fn on_enter(&self, call: &Invocation<'_>) -> Result<(), SecurityViolation> {
        let class_name = call
            .arg(0)
            .and_then(|arg| arg.as_object())
            .and_then(|desc| string_property(desc.as_ref(), "name"));

        let decision = bootstrap::shared()
            .policy
            .evaluate(Capability::Deserialization, class_name.as_deref());
        if !decision.is_blocked() {
            trace!(class = ?class_name, reason = %decision.reason, "class allowed");
            return Ok(());
        }
        let class_name = class_name.unwrap_or_default();
        Err(diagnostics::block(call, OPERATION, &class_name, &decision))
    }
}

fn resolve_class_guard() -> Arc<dyn Advice> {
    Arc::new(ResolveClassGuard)
}

inventory::submit! {
    HookDeclaration::method(NAMESPACE, "java.io.ObjectInputStream", "resolveClass", resolve_class_guard)
        .parameters(&["java.io.ObjectStreamClass"])
}

#[cfg(test)]
mod tests {
    use super::*;
    use hook_registry::{Arg, MemberDescription};
    use request_context::ObjectSnapshot;

    fn resolve(class_name: Option<&str>) -> Result<(), SecurityViolation> {
        let member = MemberDescription::method("resolveClass", ["java.io.ObjectStreamClass"]);
        let mut desc = ObjectSnapshot::new("java.io.ObjectStreamClass");
        if let Some(name) = class_name {
            desc = desc.with_property("name", name);
        }
        let args = [Arg::Object(desc.into_ref())];
        ResolveClassGuard.on_enter(&Invocation {
            type_name: "java.io.ObjectInputStream",
            member: &member,
            args: &args,
        })
    }

    #[test]
    fn exact_rule_blocks_runtime() {
        let err = resolve(Some("java.lang.Runtime")).unwrap_err();
        assert_eq!(err.subject, "java.lang.Runtime");
        assert_eq!(err.matched_rule.as_deref(), Some("java.lang.Runtime"));
    }

    #[test]
    fn prefix_rule_blocks_functors() {
        let err = resolve(Some("org.apache.commons.collections.functors.InvokerTransformer"))
            .unwrap_err();
        assert_eq!(
            err.matched_rule.as_deref(),
            Some("org.apache.commons.collections.functors.")
        );
    }

    #[test]
    fn ordinary_classes_pass() {
        assert!(resolve(Some("java.util.ArrayList")).is_ok());
        assert!(resolve(Some("java.lang.RuntimeException")).is_ok());
    }

    #[test]
    fn unreadable_descriptor_passes() {
        assert!(resolve(None).is_ok());
        let member = MemberDescription::method("resolveClass", ["java.io.ObjectStreamClass"]);
        let call = Invocation {
            type_name: "java.io.ObjectInputStream",
            member: &member,
            args: &[Arg::Null],
        };
        assert!(ResolveClassGuard.on_enter(&call).is_ok());
    }
}
