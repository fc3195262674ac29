use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use hook_registry::{
    Advice, Arg, HookDeclaration, HookDiscovery, InProcessEngine, InstrumentationEngine,
    InterceptionApplier, Invocation, JoinPointKind, MemberDescription, SecurityViolation,
    TypeDescription,
};

const NS: &str = "weaving-test";

static DENY_CALLS: AtomicUsize = AtomicUsize::new(0);

/// Blocks any call whose first argument is the string "forbidden".
struct DenyForbidden;

impl Advice for DenyForbidden {
    fn name(&self) -> &str {
        "DenyForbidden"
    }

    fn on_enter(&self, call: &Invocation<'_>) -> Result<(), SecurityViolation> {
        DENY_CALLS.fetch_add(1, Ordering::SeqCst);
        match call.arg(0).and_then(Arg::as_str) {
            Some("forbidden") => Err(SecurityViolation::new("test", "forbidden")),
            _ => Ok(()),
        }
    }
}

fn deny_forbidden() -> Arc<dyn Advice> {
    Arc::new(DenyForbidden)
}

inventory::submit! {
    HookDeclaration::method(NS, "app.Files", "open", deny_forbidden)
        .parameters(&["java.lang.String", "int"])
}

inventory::submit! {
    HookDeclaration::method(NS, "app.Native", "load", deny_forbidden).native()
}

// The constructor flag wins over the member name.
inventory::submit! {
    HookDeclaration {
        is_constructor: true,
        ..HookDeclaration::method(NS, "app.Session", "ctor", deny_forbidden)
    }
}

// Malformed: the wildcard mixed with an explicit type.
inventory::submit! {
    HookDeclaration::method(NS, "app.Broken", "open", deny_forbidden)
        .parameters(&["*", "int"])
}

fn open2() -> MemberDescription {
    MemberDescription::method("open", ["java.lang.String", "int"])
}

fn open3() -> MemberDescription {
    MemberDescription::method("open", ["java.lang.String", "int", "int"])
}

fn session_init() -> MemberDescription {
    MemberDescription::constructor(["java.lang.String"])
}

fn session_ctor_method() -> MemberDescription {
    MemberDescription::method("ctor", ["java.lang.String"])
}

fn load() -> MemberDescription {
    MemberDescription::method("load", ["java.lang.String"]).native()
}

#[test]
fn discovered_hooks_weave_and_enforce() {
    let catalog = HookDiscovery::new(NS).discover();
    assert_eq!(catalog.len(), 3);
    assert_eq!(catalog.rejected().len(), 1);
    assert_eq!(catalog.rejected()[0].label, "app.Broken#open");

    let mut engine = InProcessEngine::new();
    // Loaded before install: picked up by retransformation.
    engine.define_type(
        TypeDescription::new("app.Files")
            .with_member(open2())
            .with_member(open3()),
    );

    let report = InterceptionApplier::apply(&mut engine, catalog.descriptors());
    assert!(report.is_clean());
    let kinds: Vec<JoinPointKind> = report.registered.iter().map(|h| h.kind).collect();
    assert_eq!(
        kinds,
        vec![JoinPointKind::Wrap, JoinPointKind::Replace, JoinPointKind::Wrap]
    );
    assert_eq!(report.registered[2].id, "app.Session#<init>(*)");

    let summary = engine.install().unwrap();
    assert_eq!(summary.hooks, 3);
    assert_eq!(summary.transformed_types, 1);
    assert_eq!(summary.woven_members, 1);

    // Loaded after install: transformed on definition.
    engine.define_type(TypeDescription::new("app.Native").with_member(load()));
    engine.define_type(
        TypeDescription::new("app.Session")
            .with_member(session_init())
            .with_member(session_ctor_method()),
    );

    // The exact 2-arg shape is woven; the 3-arg overload is not.
    assert_eq!(engine.woven_hooks("app.Files", &open2()).len(), 1);
    assert!(engine.woven_hooks("app.Files", &open3()).is_empty());

    let before = DENY_CALLS.load(Ordering::SeqCst);
    let blocked = engine.invoke("app.Files", &open2(), &[Arg::from("forbidden"), Arg::Null], |_| {
        Ok("opened")
    });
    assert!(blocked.unwrap_err().violation().is_some());

    let allowed = engine
        .invoke("app.Files", &open2(), &[Arg::from("notes.txt"), Arg::Null], |_| Ok("opened"))
        .unwrap();
    assert_eq!(allowed, Some("opened"));

    let unwoven = engine
        .invoke(
            "app.Files",
            &open3(),
            &[Arg::from("forbidden"), Arg::Null, Arg::Null],
            |_| Ok("opened"),
        )
        .unwrap();
    assert_eq!(unwoven, Some("opened"));

    let native = engine
        .invoke("app.Native", &load(), &[Arg::from("libok.so")], |_| Ok(()))
        .unwrap();
    assert_eq!(native, None);

    assert_eq!(DENY_CALLS.load(Ordering::SeqCst) - before, 3);

    // Only the constructor carries the constructor hook, never a method
    // sharing the declared member name.
    assert_eq!(engine.woven_hooks("app.Session", &session_init()).len(), 1);
    assert!(engine.woven_hooks("app.Session", &session_ctor_method()).is_empty());
    let err = engine
        .invoke("app.Session", &session_init(), &[Arg::from("forbidden")], |_| Ok(()))
        .unwrap_err();
    assert!(err.violation().is_some());
    let plain = engine
        .invoke("app.Session", &session_ctor_method(), &[Arg::from("forbidden")], |_| {
            Ok("plain")
        })
        .unwrap();
    assert_eq!(plain, Some("plain"));
}
