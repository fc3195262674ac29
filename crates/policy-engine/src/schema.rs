use std::fmt;

use serde::{Deserialize, Serialize};

/// Top-level policy configuration loaded from a YAML file.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PolicyConfig {
    /// Schema version; currently must be "1.0".
    pub version: String,
    /// Append the built-in catalogue after the file's own rules.
    #[serde(default)]
    pub inherit_builtin: bool,
    /// Per-capability ordered pattern lists.
    #[serde(default)]
    pub deny_lists: DenyListsConfig,
}

/// Raw pattern lists, one per protected capability.
///
/// A list that is omitted falls back to the built-in catalogue for that
/// capability. A list that is present, even when empty, replaces it.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DenyListsConfig {
    #[serde(default)]
    pub deserialization: Option<Vec<String>>,
    #[serde(default)]
    pub object_factory: Option<Vec<String>>,
}

impl DenyListsConfig {
    pub fn patterns(&self, capability: Capability) -> Option<&[String]> {
        match capability {
            Capability::Deserialization => self.deserialization.as_deref(),
            Capability::ObjectFactory => self.object_factory.as_deref(),
        }
    }
}

/// The operation family a deny list protects.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Capability {
    /// Class names resolved while deserializing an object stream.
    Deserialization,
    /// Object-factory classes resolved by a naming lookup.
    ObjectFactory,
}

impl Capability {
    pub const ALL: [Capability; 2] = [Capability::Deserialization, Capability::ObjectFactory];
}

impl fmt::Display for Capability {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Deserialization => write!(f, "deserialization"),
            Self::ObjectFactory => write!(f, "object_factory"),
        }
    }
}

/// How a rule's pattern is compared with a candidate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RuleKind {
    /// Candidate starts with the pattern (a package such as `"a.b."`).
    Prefix,
    /// Candidate equals the pattern.
    Exact,
}

impl fmt::Display for RuleKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Prefix => write!(f, "prefix"),
            Self::Exact => write!(f, "exact"),
        }
    }
}

/// A single deny rule.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PolicyRule {
    pub pattern: String,
    pub kind: RuleKind,
}

impl PolicyRule {
    /// Build a rule whose kind follows the trailing-dot convention.
    pub fn new(pattern: impl Into<String>) -> Self {
        let pattern = pattern.into();
        let kind = RuleKind::infer(&pattern);
        Self { pattern, kind }
    }

    pub fn prefix(pattern: impl Into<String>) -> Self {
        Self {
            pattern: pattern.into(),
            kind: RuleKind::Prefix,
        }
    }

    pub fn exact(pattern: impl Into<String>) -> Self {
        Self {
            pattern: pattern.into(),
            kind: RuleKind::Exact,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn deserialize_minimal_config() {
        let yaml = r#"
version: "1.0"
"#;
        let config: PolicyConfig = serde_yml::from_str(yaml).unwrap();
        assert_eq!(config.version, "1.0");
        assert!(!config.inherit_builtin);
        assert!(config.deny_lists.deserialization.is_none());
        assert!(config.deny_lists.object_factory.is_none());
    }

    #[test]
    fn deserialize_full_config() {
        let yaml = r#"
version: "1.0"
inherit_builtin: true
deny_lists:
  deserialization:
    - "java.lang.Runtime"
    - "org.apache.commons.collections.functors."
  object_factory: []
"#;
        let config: PolicyConfig = serde_yml::from_str(yaml).unwrap();
        assert!(config.inherit_builtin);
        assert_eq!(
            config.deny_lists.patterns(Capability::Deserialization).unwrap(),
            &["java.lang.Runtime", "org.apache.commons.collections.functors."]
        );
        assert_eq!(
            config.deny_lists.patterns(Capability::ObjectFactory),
            Some(&[][..])
        );
    }

    #[test]
    fn rule_constructors_set_kind() {
        assert_eq!(PolicyRule::new("javax.naming.").kind, RuleKind::Prefix);
        assert_eq!(PolicyRule::new("java.lang.Runtime").kind, RuleKind::Exact);
        assert_eq!(PolicyRule::prefix("x").kind, RuleKind::Prefix);
        assert_eq!(PolicyRule::exact("x.").kind, RuleKind::Exact);
    }

    #[test]
    fn capability_display_matches_yaml_keys() {
        assert_eq!(Capability::Deserialization.to_string(), "deserialization");
        assert_eq!(Capability::ObjectFactory.to_string(), "object_factory");
    }
}
