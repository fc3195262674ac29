//! Native library load guard. Loading native code is never allowed once the
//! agent is installed.

use std::sync::Arc;

use hook_registry::{Advice, HookDeclaration, Invocation, SecurityViolation};
use policy_engine::PolicyDecision;

use crate::{diagnostics, NAMESPACE};

const OPERATION: &str = "native library load";

/// Blocks every native library load, naming the library from the given
/// argument position.
#[derive(Debug)]
pub struct NativeLibraryGuard {
    name_arg: usize,
}

impl NativeLibraryGuard {
    pub fn new(name_arg: usize) -> Self {
        Self { name_arg }
    }
}

impl Advice for NativeLibraryGuard {
    fn name(&self) -> &str {
        "NativeLibraryGuard"
    }

    fn on_enter(&self, call: &Invocation<'_>) -> Result<(), SecurityViolation> {
        let library = call
            .arg(self.name_arg)
            .and_then(|arg| arg.as_str())
            .unwrap_or("<unknown>");
        let decision =
            PolicyDecision::block_default(format!("native library loading is not permitted: {library}"));
        Err(diagnostics::block(call, OPERATION, library, &decision))
    }
}

fn native_libraries_guard() -> Arc<dyn Advice> {
    Arc::new(NativeLibraryGuard::new(1))
}

fn class_loader_native_guard() -> Arc<dyn Advice> {
    Arc::new(NativeLibraryGuard::new(0))
}

inventory::submit! {
    HookDeclaration::method(NAMESPACE, "jdk.internal.loader.NativeLibraries", "load", native_libraries_guard)
        .native()
}

inventory::submit! {
    HookDeclaration::method(NAMESPACE, "java.lang.ClassLoader$NativeLibrary", "load", class_loader_native_guard)
        .native()
}

#[cfg(test)]
mod tests {
    use super::*;
    use hook_registry::{Arg, MemberDescription};

    #[test]
    fn every_load_is_blocked() {
        let member = MemberDescription::method("load", ["java.lang.Object", "java.lang.String"]).native();
        let args = [Arg::Null, Arg::from("/tmp/evil.so")];
        let call = Invocation {
            type_name: "jdk.internal.loader.NativeLibraries",
            member: &member,
            args: &args,
        };
        let err = native_libraries_guard().on_enter(&call).unwrap_err();
        assert_eq!(err.subject, "/tmp/evil.so");
        assert_eq!(err.operation, OPERATION);
    }

    #[test]
    fn missing_name_still_blocks() {
        let member = MemberDescription::method("load", ["java.lang.String"]).native();
        let call = Invocation {
            type_name: "java.lang.ClassLoader$NativeLibrary",
            member: &member,
            args: &[],
        };
        let err = class_loader_native_guard().on_enter(&call).unwrap_err();
        assert_eq!(err.subject, "<unknown>");
    }
}
