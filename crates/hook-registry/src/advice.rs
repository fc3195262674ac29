//! The behaviour a hook attaches to a join point.

use std::fmt;
use std::sync::Arc;

use request_context::ObjectRef;
use thiserror::Error;

use crate::signature::MemberDescription;

/// A call argument as seen by advice.
#[derive(Debug, Clone)]
pub enum Arg {
    Null,
    Str(String),
    Bytes(Vec<u8>),
    StrArray(Vec<String>),
    Object(ObjectRef),
}

impl Arg {
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Arg::Str(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_bytes(&self) -> Option<&[u8]> {
        match self {
            Arg::Bytes(b) => Some(b),
            _ => None,
        }
    }

    pub fn as_str_array(&self) -> Option<&[String]> {
        match self {
            Arg::StrArray(items) => Some(items),
            _ => None,
        }
    }

    pub fn as_object(&self) -> Option<&ObjectRef> {
        match self {
            Arg::Object(obj) => Some(obj),
            _ => None,
        }
    }

    pub fn is_null(&self) -> bool {
        matches!(self, Arg::Null)
    }
}

impl From<&str> for Arg {
    fn from(s: &str) -> Self {
        Arg::Str(s.to_string())
    }
}

impl From<String> for Arg {
    fn from(s: String) -> Self {
        Arg::Str(s)
    }
}

impl From<ObjectRef> for Arg {
    fn from(obj: ObjectRef) -> Self {
        Arg::Object(obj)
    }
}

/// One intercepted call.
#[derive(Debug, Clone, Copy)]
pub struct Invocation<'a> {
    pub type_name: &'a str,
    pub member: &'a MemberDescription,
    pub args: &'a [Arg],
}

impl<'a> Invocation<'a> {
    pub fn arg(&self, index: usize) -> Option<&'a Arg> {
        self.args.get(index)
    }
}

/// How the intercepted body finished.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ExitStatus {
    Returned,
    Raised(String),
}

/// Raised by advice to abort the intercepted operation.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("security check failed: {operation} blocked: {subject}")]
pub struct SecurityViolation {
    /// Short name of the protected operation, e.g. `deserialization`.
    pub operation: String,
    /// The offending symbol, command or location.
    pub subject: String,
    /// Pattern of the deny rule that matched, when a rule was involved.
    pub matched_rule: Option<String>,
}

impl SecurityViolation {
    pub fn new(operation: impl Into<String>, subject: impl Into<String>) -> Self {
        Self {
            operation: operation.into(),
            subject: subject.into(),
            matched_rule: None,
        }
    }

    pub fn with_rule(mut self, pattern: impl Into<String>) -> Self {
        self.matched_rule = Some(pattern.into());
        self
    }
}

/// Entry (and optionally exit) behaviour attached to a join point.
///
/// Advice runs inline on the calling thread and must not block. Returning
/// `Err` from [`Advice::on_enter`] aborts the call before the body runs.
pub trait Advice: Send + Sync {
    /// Stable identity used in logs and hook listings.
    fn name(&self) -> &str;

    fn on_enter(&self, call: &Invocation<'_>) -> Result<(), SecurityViolation>;

    /// Whether [`Advice::on_exit`] should be woven. Exit advice is only
    /// valid on wrapped (non-native) join points.
    fn has_exit(&self) -> bool {
        false
    }

    /// Runs after the body returns or raises.
    fn on_exit(&self, _call: &Invocation<'_>, _status: &ExitStatus) {}
}

impl fmt::Debug for dyn Advice {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Advice({})", self.name())
    }
}

/// Constructor for a shared advice instance.
pub type AdviceFactory = fn() -> Arc<dyn Advice>;

#[cfg(test)]
mod tests {
    use super::*;
    use request_context::ObjectSnapshot;

    #[test]
    fn arg_accessors() {
        assert_eq!(Arg::from("ls").as_str(), Some("ls"));
        assert!(Arg::Str("x".into()).as_bytes().is_none());
        assert_eq!(Arg::Bytes(vec![1, 2]).as_bytes(), Some(&[1u8, 2][..]));
        assert_eq!(
            Arg::StrArray(vec!["a".into()]).as_str_array(),
            Some(&["a".to_string()][..])
        );
        let obj = ObjectSnapshot::new("java.io.ObjectStreamClass").into_ref();
        assert_eq!(
            Arg::from(obj).as_object().map(|o| o.type_name().to_string()),
            Some("java.io.ObjectStreamClass".to_string())
        );
        assert!(Arg::Null.is_null());
    }

    #[test]
    fn violation_message_names_operation_and_subject() {
        let v = SecurityViolation::new("deserialization", "java.lang.Runtime")
            .with_rule("java.lang.Runtime");
        assert_eq!(
            v.to_string(),
            "security check failed: deserialization blocked: java.lang.Runtime"
        );
        assert_eq!(v.matched_rule.as_deref(), Some("java.lang.Runtime"));
    }
}
