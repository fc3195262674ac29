use tracing::{debug, trace, warn};

use crate::decision::PolicyDecision;
use crate::defaults::{DESERIALIZATION_DENY, OBJECT_FACTORY_DENY};
use crate::matcher::{matches_rule, shadows};
use crate::schema::{Capability, PolicyConfig, PolicyRule};

// ---------------------------------------------------------------------------
// DenyList
// ---------------------------------------------------------------------------

/// An ordered, read-only list of deny rules. The first matching rule wins.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DenyList {
    rules: Vec<PolicyRule>,
}

/// A rule that can never match because an earlier rule already covers it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ShadowedRule {
    /// Position of the unreachable rule.
    pub index: usize,
    pub rule: PolicyRule,
    /// Position of the first earlier rule that covers it.
    pub shadowed_by: usize,
}

impl DenyList {
    pub fn new(rules: Vec<PolicyRule>) -> Self {
        Self { rules }
    }

    /// Build a list from raw configuration strings, classifying each with
    /// the trailing-dot convention.
    pub fn from_patterns<I, S>(patterns: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            rules: patterns.into_iter().map(PolicyRule::new).collect(),
        }
    }

    /// Return the first rule matching `candidate`.
    ///
    /// An absent or empty candidate never matches, whatever the list holds.
    pub fn check_deny<'a>(&self, candidate: impl Into<Option<&'a str>>) -> Option<&PolicyRule> {
        let candidate = candidate.into().filter(|c| !c.is_empty())?;
        let hit = self.rules.iter().find(|rule| matches_rule(rule, candidate));
        if let Some(rule) = hit {
            trace!(candidate, pattern = %rule.pattern, kind = %rule.kind, "deny rule matched");
        }
        hit
    }

    pub fn rules(&self) -> &[PolicyRule] {
        &self.rules
    }

    pub fn len(&self) -> usize {
        self.rules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    /// Report rules that are unreachable under first-match-wins.
    ///
    /// This only reports; the list is never reordered.
    pub fn shadowed_rules(&self) -> Vec<ShadowedRule> {
        let mut out = Vec::new();
        for (index, later) in self.rules.iter().enumerate() {
            if let Some(shadowed_by) = self.rules[..index]
                .iter()
                .position(|earlier| shadows(earlier, later))
            {
                out.push(ShadowedRule {
                    index,
                    rule: later.clone(),
                    shadowed_by,
                });
            }
        }
        out
    }
}

// ---------------------------------------------------------------------------
// PolicyStore
// ---------------------------------------------------------------------------

/// The two independent deny lists consulted by the guards.
///
/// Built once at startup and only read afterwards, so it can be shared
/// across threads without locking.
#[derive(Clone, PartialEq, Eq)]
pub struct PolicyStore {
    deserialization: DenyList,
    object_factory: DenyList,
}

impl std::fmt::Debug for PolicyStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PolicyStore")
            .field("deserialization_rules", &self.deserialization.len())
            .field("object_factory_rules", &self.object_factory.len())
            .finish()
    }
}

impl PolicyStore {
    pub fn new(deserialization: DenyList, object_factory: DenyList) -> Self {
        Self {
            deserialization,
            object_factory,
        }
    }

    /// The store backed by the built-in catalogue.
    pub fn builtin() -> Self {
        Self::new(
            DenyList::from_patterns(DESERIALIZATION_DENY.iter().copied()),
            DenyList::from_patterns(OBJECT_FACTORY_DENY.iter().copied()),
        )
    }

    /// Build a store from a validated [`PolicyConfig`].
    ///
    /// Omitted lists fall back to the built-in catalogue. With
    /// `inherit_builtin` the catalogue is appended after the configured rules.
    /// Shadowed rules are logged as warnings but kept.
    pub fn from_config(config: &PolicyConfig) -> Self {
        let store = Self::new(
            build_list(config, Capability::Deserialization, DESERIALIZATION_DENY),
            build_list(config, Capability::ObjectFactory, OBJECT_FACTORY_DENY),
        );
        store.warn_shadowed();
        debug!(?store, "policy store built");
        store
    }

    pub fn deny_list(&self, capability: Capability) -> &DenyList {
        match capability {
            Capability::Deserialization => &self.deserialization,
            Capability::ObjectFactory => &self.object_factory,
        }
    }

    pub fn check_deny<'a>(
        &self,
        capability: Capability,
        candidate: impl Into<Option<&'a str>>,
    ) -> Option<&PolicyRule> {
        self.deny_list(capability).check_deny(candidate)
    }

    /// Evaluate a candidate symbol for one capability.
    pub fn evaluate<'a>(
        &self,
        capability: Capability,
        candidate: impl Into<Option<&'a str>>,
    ) -> PolicyDecision {
        let candidate = candidate.into();
        debug!(%capability, ?candidate, "evaluating candidate against deny list");

        match (candidate, self.check_deny(capability, candidate)) {
            (Some(name), Some(rule)) => PolicyDecision::block_rule(capability, rule, name),
            (None, _) | (Some(""), _) => {
                PolicyDecision::allow_default("no candidate symbol to evaluate")
            }
            (Some(_), None) => PolicyDecision::allow_default("no deny rule matched"),
        }
    }

    /// Log every shadowed rule across both lists.
    pub fn warn_shadowed(&self) -> usize {
        let mut total = 0;
        for capability in Capability::ALL {
            for shadowed in self.deny_list(capability).shadowed_rules() {
                let earlier = &self.deny_list(capability).rules()[shadowed.shadowed_by];
                warn!(
                    %capability,
                    pattern = %shadowed.rule.pattern,
                    index = shadowed.index,
                    shadowed_by = %earlier.pattern,
                    shadowed_by_index = shadowed.shadowed_by,
                    "deny rule is unreachable; an earlier rule already covers it"
                );
                total += 1;
            }
        }
        total
    }
}

fn build_list(config: &PolicyConfig, capability: Capability, builtin: &[&str]) -> DenyList {
    let configured = config.deny_lists.patterns(capability);
    let mut patterns: Vec<String> = match configured {
        Some(configured) => configured.to_vec(),
        None => builtin.iter().map(|p| p.to_string()).collect(),
    };
    if config.inherit_builtin && configured.is_some() {
        patterns.extend(builtin.iter().map(|p| p.to_string()));
    }
    DenyList::from_patterns(patterns)
}

impl Default for PolicyStore {
    fn default() -> Self {
        Self::builtin()
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
