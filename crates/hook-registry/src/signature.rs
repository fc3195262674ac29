//! Engine-facing descriptions of loaded types and their members.

use std::fmt;

/// Whether a member is an ordinary method or a constructor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MemberKind {
    Method,
    Constructor,
}

/// Name used for constructors in member descriptions and hook ids.
pub const CONSTRUCTOR_NAME: &str = "<init>";

/// One member of a loaded type.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct MemberDescription {
    pub name: String,
    pub kind: MemberKind,
    /// Fully-qualified parameter type names, in declaration order.
    pub parameter_types: Vec<String>,
    pub is_native: bool,
}

impl MemberDescription {
    pub fn method<I, S>(name: impl Into<String>, parameter_types: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            name: name.into(),
            kind: MemberKind::Method,
            parameter_types: parameter_types.into_iter().map(Into::into).collect(),
            is_native: false,
        }
    }

    pub fn constructor<I, S>(parameter_types: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            name: CONSTRUCTOR_NAME.to_string(),
            kind: MemberKind::Constructor,
            parameter_types: parameter_types.into_iter().map(Into::into).collect(),
            is_native: false,
        }
    }

    /// Mark the member as native.
    pub fn native(mut self) -> Self {
        self.is_native = true;
        self
    }

    pub fn is_constructor(&self) -> bool {
        self.kind == MemberKind::Constructor
    }

    pub fn arity(&self) -> usize {
        self.parameter_types.len()
    }
}

impl fmt::Display for MemberDescription {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_native {
            write!(f, "native ")?;
        }
        write!(f, "{}({})", self.name, self.parameter_types.join(", "))
    }
}

/// A loaded type as the instrumentation engine sees it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TypeDescription {
    pub name: String,
    pub members: Vec<MemberDescription>,
}

impl TypeDescription {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            members: Vec::new(),
        }
    }

    pub fn with_member(mut self, member: MemberDescription) -> Self {
        self.members.push(member);
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn constructor_uses_init_name() {
        let ctor = MemberDescription::constructor(["java.lang.String"]);
        assert!(ctor.is_constructor());
        assert_eq!(ctor.name, CONSTRUCTOR_NAME);
        assert_eq!(ctor.arity(), 1);
    }

    #[test]
    fn display_shows_native_flag_and_params() {
        let m = MemberDescription::method("load", ["java.lang.String", "boolean"]).native();
        assert_eq!(m.to_string(), "native load(java.lang.String, boolean)");
        let m = MemberDescription::method("run", Vec::<String>::new());
        assert_eq!(m.to_string(), "run()");
    }
}
