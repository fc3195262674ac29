//! Remote class-loading guards: naming object factories and RMI codebases.

use std::sync::Arc;

use hook_registry::{Advice, HookDeclaration, Invocation, SecurityViolation};
use policy_engine::{Capability, PolicyDecision};
use request_context::string_property;
use tracing::trace;

use crate::{bootstrap, diagnostics, NAMESPACE};

/// Blocks object factories fetched from a remote location, and local
/// factories on the object-factory deny list.
#[derive(Debug, Default)]
pub struct ObjectFactoryGuard;

impl Advice for ObjectFactoryGuard {
    fn name(&self) -> &str {
        "ObjectFactoryGuard"
    }

    fn on_enter(&self, call: &Invocation<'_>) -> Result<(), SecurityViolation> {
        let location = call
            .arg(0)
            .and_then(|arg| arg.as_object())
            .and_then(|reference| string_property(reference.as_ref(), "factoryClassLocation"))
            .filter(|location| !location.is_empty());
        if let Some(location) = location {
            let decision = PolicyDecision::block_default(format!(
                "object factory requested from remote location {location}"
            ));
            return Err(diagnostics::block(
                call,
                "remote object factory",
                &location,
                &decision,
            ));
        }

        let factory = call.arg(1).and_then(|arg| arg.as_str());
        let decision = bootstrap::shared()
            .policy
            .evaluate(Capability::ObjectFactory, factory);
        if !decision.is_blocked() {
            trace!(factory = ?factory, reason = %decision.reason, "object factory allowed");
            return Ok(());
        }
        Err(diagnostics::block(
            call,
            "object factory",
            factory.unwrap_or_default(),
            &decision,
        ))
    }
}

/// Blocks RMI class loading whenever a codebase URL list is supplied.
#[derive(Debug, Default)]
pub struct RmiCodebaseGuard;

impl Advice for RmiCodebaseGuard {
    fn name(&self) -> &str {
        "RmiCodebaseGuard"
    }

    fn on_enter(&self, call: &Invocation<'_>) -> Result<(), SecurityViolation> {
        let urls = call
            .arg(0)
            .and_then(|arg| arg.as_str_array())
            .unwrap_or_default();
        if urls.is_empty() {
            return Ok(());
        }
        let subject = urls.join(" ");
        let decision =
            PolicyDecision::block_default(format!("RMI codebase loading from {subject}"));
        Err(diagnostics::block(call, "rmi codebase", &subject, &decision))
    }
}

fn object_factory_guard() -> Arc<dyn Advice> {
    Arc::new(ObjectFactoryGuard)
}

fn rmi_codebase_guard() -> Arc<dyn Advice> {
    Arc::new(RmiCodebaseGuard)
}

inventory::submit! {
    HookDeclaration::method(
        NAMESPACE,
        "javax.naming.spi.NamingManager",
        "getObjectFactoryFromReference",
        object_factory_guard,
    )
}

inventory::submit! {
    HookDeclaration::method(NAMESPACE, "sun.rmi.server.LoaderHandler", "lookupLoader", rmi_codebase_guard)
}

#[cfg(test)]
mod tests {
    use super::*;
    use hook_registry::{Arg, MemberDescription};
    use request_context::ObjectSnapshot;

    fn lookup(location: Option<&str>, factory: &str) -> Result<(), SecurityViolation> {
        let member = MemberDescription::method(
            "getObjectFactoryFromReference",
            ["javax.naming.Reference", "java.lang.String"],
        );
        let mut reference = ObjectSnapshot::new("javax.naming.Reference");
        if let Some(location) = location {
            reference = reference.with_property("factoryClassLocation", location);
        }
        let args = [Arg::Object(reference.into_ref()), Arg::from(factory)];
        ObjectFactoryGuard.on_enter(&Invocation {
            type_name: "javax.naming.spi.NamingManager",
            member: &member,
            args: &args,
        })
    }

    fn load_rmi(urls: Arg) -> Result<(), SecurityViolation> {
        let member = MemberDescription::method("lookupLoader", ["java.net.URL[]", "java.lang.ClassLoader"]);
        let args = [urls, Arg::Null];
        RmiCodebaseGuard.on_enter(&Invocation {
            type_name: "sun.rmi.server.LoaderHandler",
            member: &member,
            args: &args,
        })
    }

    #[test]
    fn remote_location_blocks_unconditionally() {
        let err = lookup(Some("http://attacker.example/"), "com.example.Harmless").unwrap_err();
        assert_eq!(err.subject, "http://attacker.example/");
        assert!(err.matched_rule.is_none());
    }

    #[test]
    fn empty_location_falls_through_to_deny_list() {
        assert!(lookup(Some(""), "com.example.Harmless").is_ok());
        let err = lookup(Some(""), "org.apache.naming.factory.BeanFactory").unwrap_err();
        assert_eq!(
            err.matched_rule.as_deref(),
            Some("org.apache.naming.factory.")
        );
    }

    #[test]
    fn local_factory_not_on_list_passes() {
        assert!(lookup(None, "com.example.Harmless").is_ok());
        assert!(lookup(None, "").is_ok());
    }

    #[test]
    fn rmi_codebase_blocks_non_empty_urls() {
        let err = load_rmi(Arg::StrArray(vec!["http://evil.example/classes/".into()])).unwrap_err();
        assert_eq!(err.subject, "http://evil.example/classes/");
        assert!(load_rmi(Arg::StrArray(Vec::new())).is_ok());
        assert!(load_rmi(Arg::Null).is_ok());
    }
}
