//! Declarative hook descriptors.
//!
//! A [`HookDeclaration`] is the static, link-time form a guard module submits
//! with `inventory::submit!`. Validation turns it into an immutable
//! [`HookDescriptor`] that the matcher builder can compile.

use std::fmt;
use std::sync::Arc;

use thiserror::Error;

use crate::advice::{Advice, AdviceFactory};
use crate::signature::CONSTRUCTOR_NAME;

/// Parameter-type wildcard: matches any arity and any types.
pub const ANY_PARAMETERS: &str = "*";

/// Errors found while validating a single declaration.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DescriptorError {
    #[error("hook declares an empty target type")]
    EmptyTargetType,

    #[error("hook on {target_type} names neither a member nor a constructor")]
    MissingMember { target_type: String },

    #[error("hook on {target_type} mixes the '*' wildcard with explicit parameter types")]
    MixedWildcard { target_type: String },

    #[error("hook on {target_type} has an empty parameter type at position {index}")]
    EmptyParameterType { target_type: String, index: usize },
}

// ---------------------------------------------------------------------------
// ParameterShape
// ---------------------------------------------------------------------------

/// Which argument lists a hook accepts.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum ParameterShape {
    /// Any arity, any types.
    Any,
    /// Exactly these fully-qualified types, in order. Empty means no
    /// arguments.
    Exact(Vec<String>),
}

impl ParameterShape {
    /// Interpret a declared parameter list, where a lone `"*"` means any.
    fn from_declared(target_type: &str, declared: &[&str]) -> Result<Self, DescriptorError> {
        if declared == [ANY_PARAMETERS] {
            return Ok(Self::Any);
        }
        if declared.contains(&ANY_PARAMETERS) {
            return Err(DescriptorError::MixedWildcard {
                target_type: target_type.to_string(),
            });
        }
        if let Some(index) = declared.iter().position(|t| t.trim().is_empty()) {
            return Err(DescriptorError::EmptyParameterType {
                target_type: target_type.to_string(),
                index,
            });
        }
        Ok(Self::Exact(declared.iter().map(|t| t.to_string()).collect()))
    }
}

impl fmt::Display for ParameterShape {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Any => write!(f, "{ANY_PARAMETERS}"),
            Self::Exact(types) => write!(f, "{}", types.join(",")),
        }
    }
}

// ---------------------------------------------------------------------------
// HookDescriptor
// ---------------------------------------------------------------------------

/// A validated interception request: where to hook and what to run.
#[derive(Debug, Clone)]
pub struct HookDescriptor {
    target_type: String,
    target_member: Option<String>,
    parameter_shape: ParameterShape,
    is_constructor: bool,
    is_native: bool,
    advice: Arc<dyn Advice>,
}

impl HookDescriptor {
    pub fn builder(target_type: impl Into<String>, advice: Arc<dyn Advice>) -> HookDescriptorBuilder {
        HookDescriptorBuilder {
            target_type: target_type.into(),
            member: None,
            constructor: false,
            parameters: vec![ANY_PARAMETERS.to_string()],
            native: false,
            advice,
        }
    }

    pub fn target_type(&self) -> &str {
        &self.target_type
    }

    /// The hooked member name; `None` for constructor hooks.
    pub fn target_member(&self) -> Option<&str> {
        self.target_member.as_deref()
    }

    /// Member name as it appears in ids and logs.
    pub fn member_label(&self) -> &str {
        self.target_member.as_deref().unwrap_or(CONSTRUCTOR_NAME)
    }

    pub fn parameter_shape(&self) -> &ParameterShape {
        &self.parameter_shape
    }

    pub fn is_constructor(&self) -> bool {
        self.is_constructor
    }

    pub fn is_native(&self) -> bool {
        self.is_native
    }

    pub fn advice(&self) -> &Arc<dyn Advice> {
        &self.advice
    }

    /// Stable identity: `type#member(params)`.
    pub fn id(&self) -> String {
        format!(
            "{}#{}({})",
            self.target_type,
            self.member_label(),
            self.parameter_shape
        )
    }
}

/// Builder for [`HookDescriptor`]; parameters default to any.
pub struct HookDescriptorBuilder {
    target_type: String,
    member: Option<String>,
    constructor: bool,
    parameters: Vec<String>,
    native: bool,
    advice: Arc<dyn Advice>,
}

impl HookDescriptorBuilder {
    pub fn method(mut self, name: impl Into<String>) -> Self {
        self.member = Some(name.into());
        self
    }

    pub fn constructor(mut self) -> Self {
        self.constructor = true;
        self
    }

    pub fn parameters<I, S>(mut self, types: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.parameters = types.into_iter().map(Into::into).collect();
        self
    }

    pub fn native(mut self) -> Self {
        self.native = true;
        self
    }

    pub fn build(self) -> Result<HookDescriptor, DescriptorError> {
        let declared: Vec<&str> = self.parameters.iter().map(String::as_str).collect();
        validate(
            &self.target_type,
            self.member.as_deref(),
            self.constructor,
            &declared,
        )
        .map(|parameter_shape| HookDescriptor {
            target_member: self.member.filter(|_| !self.constructor),
            target_type: self.target_type,
            parameter_shape,
            is_constructor: self.constructor,
            is_native: self.native,
            advice: self.advice,
        })
    }
}

fn validate(
    target_type: &str,
    member: Option<&str>,
    constructor: bool,
    parameters: &[&str],
) -> Result<ParameterShape, DescriptorError> {
    if target_type.trim().is_empty() {
        return Err(DescriptorError::EmptyTargetType);
    }
    // A constructor hook ignores whatever member name it carries.
    let has_member = member.is_some_and(|m| !m.trim().is_empty());
    if !has_member && !constructor {
        return Err(DescriptorError::MissingMember {
            target_type: target_type.to_string(),
        });
    }
    ParameterShape::from_declared(target_type, parameters)
}

// ---------------------------------------------------------------------------
// HookDeclaration
// ---------------------------------------------------------------------------

/// Link-time hook registration, collected with `inventory`.
///
/// ```rust,ignore
/// inventory::submit! {
///     HookDeclaration::method("guards", "java.io.ObjectInputStream", "resolveClass", advice)
///         .parameters(&["java.io.ObjectStreamClass"])
/// }
/// ```
#[derive(Debug, Clone, Copy)]
pub struct HookDeclaration {
    /// Extension namespace the declaration belongs to.
    pub namespace: &'static str,
    pub target_type: &'static str,
    /// Member name; ignored for constructor hooks.
    pub member: &'static str,
    /// Declared parameter types; `["*"]` means any.
    pub parameter_types: &'static [&'static str],
    pub is_constructor: bool,
    pub is_native: bool,
    pub advice: AdviceFactory,
}

inventory::collect!(HookDeclaration);

impl HookDeclaration {
    pub const fn method(
        namespace: &'static str,
        target_type: &'static str,
        member: &'static str,
        advice: AdviceFactory,
    ) -> Self {
        Self {
            namespace,
            target_type,
            member,
            parameter_types: &[ANY_PARAMETERS],
            is_constructor: false,
            is_native: false,
            advice,
        }
    }

    pub const fn constructor(
        namespace: &'static str,
        target_type: &'static str,
        advice: AdviceFactory,
    ) -> Self {
        Self {
            namespace,
            target_type,
            member: "",
            parameter_types: &[ANY_PARAMETERS],
            is_constructor: true,
            is_native: false,
            advice,
        }
    }

    pub const fn parameters(self, parameter_types: &'static [&'static str]) -> Self {
        Self {
            parameter_types,
            ..self
        }
    }

    pub const fn native(self) -> Self {
        Self {
            is_native: true,
            ..self
        }
    }

    /// Human-readable location used when the declaration is rejected.
    pub fn label(&self) -> String {
        let member = if self.is_constructor {
            CONSTRUCTOR_NAME
        } else {
            self.member
        };
        format!("{}#{}", self.target_type, member)
    }

    /// Validate and instantiate the descriptor. The advice factory runs only
    /// when validation succeeds.
    pub fn to_descriptor(&self) -> Result<HookDescriptor, DescriptorError> {
        let member = (!self.member.is_empty()).then_some(self.member);
        let parameter_shape = validate(
            self.target_type,
            member,
            self.is_constructor,
            self.parameter_types,
        )?;
        Ok(HookDescriptor {
            target_type: self.target_type.to_string(),
            target_member: member.filter(|_| !self.is_constructor).map(str::to_string),
            parameter_shape,
            is_constructor: self.is_constructor,
            is_native: self.is_native,
            advice: (self.advice)(),
        })
    }
}
