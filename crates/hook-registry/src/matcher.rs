//! Compiles hook descriptors into join-point predicates.

use std::fmt;
use std::sync::Arc;

use thiserror::Error;

use crate::advice::Advice;
use crate::descriptor::{HookDescriptor, ParameterShape};
use crate::signature::{MemberDescription, MemberKind};

/// Reasons a valid descriptor cannot be turned into a join point.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MatcherError {
    #[error("hook {id}: a native member cannot be a constructor")]
    NativeConstructor { id: String },

    #[error("hook {id}: advice '{advice}' has exit behaviour, which a replaced native member never reaches")]
    ExitOnNative { id: String, advice: String },
}

/// How advice is woven at a join point.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum JoinPointKind {
    /// Entry before the body, exit after it returns or raises.
    Wrap,
    /// Advice substitutes for the native body.
    Replace,
}

impl fmt::Display for JoinPointKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Wrap => write!(f, "wrap"),
            Self::Replace => write!(f, "replace"),
        }
    }
}

/// Predicate over a member signature, combined with [`ElementMatcher::and`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ElementMatcher {
    Named(String),
    IsConstructor,
    TakesArguments(usize),
    TakesArgument { index: usize, type_name: String },
    IsNative,
    And(Vec<ElementMatcher>),
}

impl ElementMatcher {
    pub fn and(self, other: ElementMatcher) -> ElementMatcher {
        match self {
            ElementMatcher::And(mut all) => {
                all.push(other);
                ElementMatcher::And(all)
            }
            first => ElementMatcher::And(vec![first, other]),
        }
    }

    pub fn matches(&self, member: &MemberDescription) -> bool {
        match self {
            ElementMatcher::Named(name) => {
                member.kind == MemberKind::Method && member.name == *name
            }
            ElementMatcher::IsConstructor => member.kind == MemberKind::Constructor,
            ElementMatcher::TakesArguments(n) => member.arity() == *n,
            ElementMatcher::TakesArgument { index, type_name } => member
                .parameter_types
                .get(*index)
                .is_some_and(|t| t == type_name),
            ElementMatcher::IsNative => member.is_native,
            ElementMatcher::And(all) => all.iter().all(|m| m.matches(member)),
        }
    }
}

impl fmt::Display for ElementMatcher {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ElementMatcher::Named(name) => write!(f, "named({name})"),
            ElementMatcher::IsConstructor => write!(f, "isConstructor()"),
            ElementMatcher::TakesArguments(n) => write!(f, "takesArguments({n})"),
            ElementMatcher::TakesArgument { index, type_name } => {
                write!(f, "takesArgument({index}, {type_name})")
            }
            ElementMatcher::IsNative => write!(f, "isNative()"),
            ElementMatcher::And(all) => {
                for (i, m) in all.iter().enumerate() {
                    if i > 0 {
                        write!(f, ".and(")?;
                        write!(f, "{m})")?;
                    } else {
                        write!(f, "{m}")?;
                    }
                }
                Ok(())
            }
        }
    }
}

/// A descriptor compiled into type and member predicates.
#[derive(Debug, Clone)]
pub struct CompiledHook {
    id: String,
    target_type: String,
    member_matcher: ElementMatcher,
    kind: JoinPointKind,
    advice: Arc<dyn Advice>,
}

impl CompiledHook {
    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn target_type(&self) -> &str {
        &self.target_type
    }

    pub fn member_matcher(&self) -> &ElementMatcher {
        &self.member_matcher
    }

    pub fn kind(&self) -> JoinPointKind {
        self.kind
    }

    pub fn is_native(&self) -> bool {
        self.kind == JoinPointKind::Replace
    }

    pub fn advice(&self) -> &Arc<dyn Advice> {
        &self.advice
    }

    pub fn matches_type(&self, type_name: &str) -> bool {
        self.target_type == type_name
    }

    pub fn matches(&self, type_name: &str, member: &MemberDescription) -> bool {
        self.matches_type(type_name) && self.member_matcher.matches(member)
    }
}

/// Turns [`HookDescriptor`]s into [`CompiledHook`]s.
pub struct MatcherBuilder;

impl MatcherBuilder {
    /// Build the predicates for one descriptor.
    ///
    /// The type is matched by exact name. Members are matched by constructor
    /// flag or exact name, then by arity and per-position type unless the
    /// shape is any, then by the native flag.
    pub fn compile(descriptor: &HookDescriptor) -> Result<CompiledHook, MatcherError> {
        let id = descriptor.id();

        if descriptor.is_native() && descriptor.is_constructor() {
            return Err(MatcherError::NativeConstructor { id });
        }
        if descriptor.is_native() && descriptor.advice().has_exit() {
            return Err(MatcherError::ExitOnNative {
                id,
                advice: descriptor.advice().name().to_string(),
            });
        }

        let mut matcher = match descriptor.target_member() {
            Some(name) if !descriptor.is_constructor() => ElementMatcher::Named(name.to_string()),
            _ => ElementMatcher::IsConstructor,
        };

        if let ParameterShape::Exact(types) = descriptor.parameter_shape() {
            matcher = matcher.and(ElementMatcher::TakesArguments(types.len()));
            for (index, type_name) in types.iter().enumerate() {
                matcher = matcher.and(ElementMatcher::TakesArgument {
                    index,
                    type_name: type_name.clone(),
                });
            }
        }

        let kind = if descriptor.is_native() {
            matcher = matcher.and(ElementMatcher::IsNative);
            JoinPointKind::Replace
        } else {
            JoinPointKind::Wrap
        };

        Ok(CompiledHook {
            id,
            target_type: descriptor.target_type().to_string(),
            member_matcher: matcher,
            kind,
            advice: Arc::clone(descriptor.advice()),
        })
    }
}
