use std::collections::HashSet;
use std::path::Path;

use anyhow::{bail, Context, Result};
use tracing::warn;

use crate::evaluator::PolicyStore;
use crate::schema::{Capability, PolicyConfig};

/// Load a [`PolicyConfig`] from a YAML file on disk.
///
/// Validates the config after deserialization (version check, pattern hygiene).
pub fn load_policy(path: impl AsRef<Path>) -> Result<PolicyConfig> {
    let path = path.as_ref();
    let contents = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read policy file: {}", path.display()))?;
    load_policy_from_str(&contents)
        .with_context(|| format!("failed to parse policy file: {}", path.display()))
}

/// Parse and validate a [`PolicyConfig`] from a YAML string.
pub fn load_policy_from_str(yaml: &str) -> Result<PolicyConfig> {
    let config: PolicyConfig =
        serde_yml::from_str(yaml).context("YAML deserialization failed")?;
    validate(&config)?;
    Ok(config)
}

/// Load the policy file at `path`, or the built-in catalogue when `None`.
pub fn load_store(path: Option<&Path>) -> Result<PolicyStore> {
    match path {
        Some(path) => Ok(PolicyStore::from_config(&load_policy(path)?)),
        None => Ok(PolicyStore::builtin()),
    }
}

/// Run post-deserialization validation checks.
///
/// Only the version is fatal. Empty and duplicate patterns are legal but
/// suspicious, so they are logged.
fn validate(config: &PolicyConfig) -> Result<()> {
    if config.version != "1.0" {
        bail!(
            "unsupported policy version '{}'; only '1.0' is supported",
            config.version
        );
    }

    for capability in Capability::ALL {
        let Some(patterns) = config.deny_lists.patterns(capability) else {
            continue;
        };
        let mut seen = HashSet::new();
        for (index, pattern) in patterns.iter().enumerate() {
            if pattern.is_empty() {
                warn!(%capability, index, "empty deny pattern can never match");
            } else if pattern.trim() != pattern.as_str() {
                warn!(%capability, index, pattern = %pattern, "deny pattern has surrounding whitespace and is compared literally");
            }
            if !seen.insert(pattern) {
                warn!(%capability, index, pattern = %pattern, "duplicate deny pattern");
            }
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn load_minimal_policy() {
        let config = load_policy_from_str("version: \"1.0\"\n").unwrap();
        assert_eq!(config.version, "1.0");
    }

    #[test]
    fn reject_wrong_version() {
        let yaml = r#"
version: "2.0"
deny_lists:
  deserialization: []
"#;
        let err = load_policy_from_str(yaml).unwrap_err();
        assert!(
            err.to_string().contains("unsupported policy version"),
            "unexpected error: {err}"
        );
    }

    #[test]
    fn empty_and_duplicate_patterns_are_accepted() {
        let yaml = r#"
version: "1.0"
deny_lists:
  deserialization:
    - ""
    - "java.lang.Runtime"
    - "java.lang.Runtime"
"#;
        let config = load_policy_from_str(yaml).unwrap();
        assert_eq!(
            config
                .deny_lists
                .patterns(Capability::Deserialization)
                .unwrap()
                .len(),
            3
        );
    }

    #[test]
    fn reject_malformed_yaml() {
        let err = load_policy_from_str("version: [").unwrap_err();
        assert!(
            err.to_string().contains("YAML deserialization failed"),
            "unexpected error: {err}"
        );
    }

    #[test]
    fn load_from_nonexistent_file() {
        let err = load_policy("/does/not/exist.yaml").unwrap_err();
        assert!(
            err.to_string().contains("failed to read policy file"),
            "unexpected error: {err}"
        );
    }

    #[test]
    fn load_store_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(
            file,
            r#"version: "1.0"
deny_lists:
  deserialization:
    - "com.example.gadgets."
"#
        )
        .unwrap();

        let store = load_store(Some(file.path())).unwrap();
        assert!(store
            .check_deny(Capability::Deserialization, "com.example.gadgets.Chain")
            .is_some());
    }

    #[test]
    fn load_store_without_path_is_builtin() {
        assert_eq!(load_store(None).unwrap(), PolicyStore::builtin());
    }
}
