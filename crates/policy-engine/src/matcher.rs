use crate::schema::{PolicyRule, RuleKind};

impl RuleKind {
    /// Classify a configured pattern: a trailing `.` marks a package prefix,
    /// anything else is an exact symbol name.
    pub fn infer(pattern: &str) -> Self {
        if pattern.ends_with('.') {
            RuleKind::Prefix
        } else {
            RuleKind::Exact
        }
    }
}

/// Check whether `candidate` matches a single rule.
///
/// Comparison is byte-wise: no case folding, no trimming.
pub fn matches_rule(rule: &PolicyRule, candidate: &str) -> bool {
    match rule.kind {
        RuleKind::Prefix => candidate.starts_with(rule.pattern.as_str()),
        RuleKind::Exact => candidate == rule.pattern,
    }
}

/// Whether `earlier` makes `later` unreachable when `earlier` is evaluated
/// first.
///
/// A prefix rule shadows every later rule whose pattern starts with it, and an
/// exact rule shadows a later identical exact rule. An empty later pattern is
/// never reported because the empty candidate never reaches the rules.
pub fn shadows(earlier: &PolicyRule, later: &PolicyRule) -> bool {
    if later.pattern.is_empty() {
        return false;
    }
    match earlier.kind {
        RuleKind::Prefix => later.pattern.starts_with(earlier.pattern.as_str()),
        RuleKind::Exact => later.kind == RuleKind::Exact && later.pattern == earlier.pattern,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn infer_trailing_dot_is_prefix() {
        assert_eq!(RuleKind::infer("com.sun.jndi.rmi."), RuleKind::Prefix);
        assert_eq!(RuleKind::infer("java.lang.Runtime"), RuleKind::Exact);
        assert_eq!(
            RuleKind::infer("org.springframework.beans.BeanWrapperImpl$BeanPropertyHandler"),
            RuleKind::Exact
        );
        assert_eq!(RuleKind::infer(""), RuleKind::Exact);
    }

    #[test]
    fn prefix_matching() {
        let rule = PolicyRule::new("org.apache.commons.collections.functors.");
        assert!(matches_rule(
            &rule,
            "org.apache.commons.collections.functors.InvokerTransformer"
        ));
        assert!(!matches_rule(&rule, "org.apache.commons.collections.map.LazyMap"));
        // The package itself without the trailing dot is not covered.
        assert!(!matches_rule(&rule, "org.apache.commons.collections.functors"));
    }

    #[test]
    fn exact_matching_is_literal() {
        let rule = PolicyRule::new("java.lang.Runtime");
        assert!(matches_rule(&rule, "java.lang.Runtime"));
        assert!(!matches_rule(&rule, "java.lang.Runtime2"));
        assert!(!matches_rule(&rule, "java.lang.runtime"));
        assert!(!matches_rule(&rule, " java.lang.Runtime"));
    }

    #[test]
    fn prefix_shadows_narrower_rules() {
        let broad = PolicyRule::new("javax.imageio.");
        assert!(shadows(&broad, &PolicyRule::new("javax.imageio.spi.")));
        assert!(shadows(&broad, &PolicyRule::new("javax.imageio.ImageIO")));
        assert!(!shadows(&broad, &PolicyRule::new("javax.naming.")));
    }

    #[test]
    fn narrow_prefix_does_not_shadow_broader_one() {
        let narrow = PolicyRule::new("org.apache.commons.codec.binary.");
        assert!(!shadows(&narrow, &PolicyRule::new("org.apache.commons.codec.")));
    }

    #[test]
    fn exact_only_shadows_duplicate() {
        let exact = PolicyRule::new("java.lang.Runtime");
        assert!(shadows(&exact, &PolicyRule::new("java.lang.Runtime")));
        assert!(!shadows(&exact, &PolicyRule::prefix("java.lang.Runtime")));
        assert!(!shadows(&exact, &PolicyRule::new("java.lang.RuntimeX")));
    }

    #[test]
    fn empty_later_rule_is_not_reported() {
        assert!(!shadows(&PolicyRule::prefix(""), &PolicyRule::exact("")));
    }
}
