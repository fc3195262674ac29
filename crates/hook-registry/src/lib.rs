//! # hook-registry
//!
//! Turns declarative interception descriptors into join-point matchers and
//! hands them to a pluggable [`InstrumentationEngine`].
//!
//! ```text
//! HookDeclaration (inventory) --HookDiscovery--> HookCatalog
//!     --MatcherBuilder--> CompiledHook --InterceptionApplier--> engine.install()
//! ```
//!
//! Non-native members are *wrapped* (entry advice, body, exit advice).
//! Native members are *replaced*: the advice stands in for the call and the
//! native effect is skipped unless the advice raises.

pub mod advice;
pub mod applier;
pub mod descriptor;
pub mod discovery;
pub mod engine;
pub mod matcher;
pub mod runtime;
pub mod signature;

pub use advice::{Advice, AdviceFactory, Arg, ExitStatus, Invocation, SecurityViolation};
pub use applier::{ApplyReport, FailedHook, InterceptionApplier, RegisteredHook, RegistrationError};
pub use descriptor::{
    DescriptorError, HookDeclaration, HookDescriptor, HookDescriptorBuilder, ParameterShape,
    ANY_PARAMETERS,
};
pub use discovery::{HookCatalog, HookDiscovery, Rejection};
pub use engine::{
    EngineError, InstallSummary, InstrumentationEngine, LoggingListener, TransformListener,
};
pub use matcher::{CompiledHook, ElementMatcher, JoinPointKind, MatcherBuilder, MatcherError};
pub use runtime::{InProcessEngine, InvocationError};
pub use signature::{MemberDescription, MemberKind, TypeDescription, CONSTRUCTOR_NAME};
