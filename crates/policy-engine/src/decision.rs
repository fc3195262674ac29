use crate::schema::{Capability, PolicyRule};

/// The outcome of checking one candidate symbol against a deny list.
#[derive(Debug, Clone)]
pub struct PolicyDecision {
    /// The resolved action to take.
    pub action: ResolvedAction,
    /// Pattern of the rule that matched, if any.
    pub matched_rule: Option<String>,
    /// Human-readable reason explaining the decision.
    pub reason: String,
}

/// What the guarded call site should do after evaluation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResolvedAction {
    /// Let the original operation proceed.
    Allow,
    /// Raise a security fault before the operation executes.
    Block,
}

impl PolicyDecision {
    /// Convenience constructor for an allow decision with no matching rule.
    pub fn allow_default(reason: impl Into<String>) -> Self {
        Self {
            action: ResolvedAction::Allow,
            matched_rule: None,
            reason: reason.into(),
        }
    }

    /// Convenience constructor for a block decision with no matching rule.
    ///
    /// Used by checks that block independently of any deny list, such as a
    /// remote factory location or a native library load.
    pub fn block_default(reason: impl Into<String>) -> Self {
        Self {
            action: ResolvedAction::Block,
            matched_rule: None,
            reason: reason.into(),
        }
    }

    /// Block decision caused by `rule` matching `candidate`.
    pub fn block_rule(capability: Capability, rule: &PolicyRule, candidate: &str) -> Self {
        Self {
            action: ResolvedAction::Block,
            matched_rule: Some(rule.pattern.clone()),
            reason: format!(
                "{capability} candidate '{candidate}' matched {} rule '{}'",
                rule.kind, rule.pattern
            ),
        }
    }

    pub fn is_blocked(&self) -> bool {
        self.action == ResolvedAction::Block
    }
}
