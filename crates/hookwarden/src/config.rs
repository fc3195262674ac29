use serde::Deserialize;
use std::path::{Path, PathBuf};
use tracing::warn;

#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    /// Deny-list policy file; the built-in catalogue when absent.
    #[serde(default)]
    pub policy_file: Option<PathBuf>,
    /// Namespace whose hook declarations are installed.
    #[serde(default = "default_extension_namespace")]
    pub extension_namespace: String,
    /// Type-name prefixes that are never transformed.
    #[serde(default = "default_ignore_namespaces")]
    pub ignore_namespaces: Vec<String>,
    #[serde(default)]
    pub logging: LoggingConfig,
    #[serde(default)]
    pub audit: AuditConfig,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            policy_file: None,
            extension_namespace: default_extension_namespace(),
            ignore_namespaces: default_ignore_namespaces(),
            logging: LoggingConfig::default(),
            audit: AuditConfig::default(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    Json,
    Compact,
}

#[derive(Debug, Clone, Deserialize)]
pub struct LoggingConfig {
    #[serde(default = "default_log_level")]
    pub level: String,
    #[serde(default = "default_log_format")]
    pub format: LogFormat,
    /// Directory for the diagnostic log file; stderr only when `null`.
    #[serde(default = "default_log_dir")]
    pub log_dir: Option<PathBuf>,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            format: default_log_format(),
            log_dir: default_log_dir(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct AuditConfig {
    #[serde(default = "default_true")]
    pub enabled: bool,
    #[serde(default = "default_audit_path")]
    pub path: PathBuf,
}

impl Default for AuditConfig {
    fn default() -> Self {
        Self {
            enabled: default_true(),
            path: default_audit_path(),
        }
    }
}

// ---------------------------------------------------------------------------
// Default-value functions used by serde
// ---------------------------------------------------------------------------

fn default_extension_namespace() -> String {
    guards::NAMESPACE.to_string()
}

fn default_ignore_namespaces() -> Vec<String> {
    vec!["hookwarden.".to_string()]
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_log_format() -> LogFormat {
    LogFormat::Json
}

fn default_log_dir() -> Option<PathBuf> {
    Some(PathBuf::from("rasp-logs"))
}

fn default_audit_path() -> PathBuf {
    PathBuf::from("rasp-logs/audit.jsonl")
}

fn default_true() -> bool {
    true
}

// ---------------------------------------------------------------------------
// Loader
// ---------------------------------------------------------------------------

/// Load configuration from a YAML file.
///
/// If the file does not exist a default configuration is returned and a
/// warning is emitted, so the agent can start without a config file.
pub fn load(path: &Path) -> anyhow::Result<Config> {
    if !path.exists() {
        warn!(
            path = %path.display(),
            "configuration file not found; using defaults"
        );
        return Ok(Config::default());
    }

    let contents = std::fs::read_to_string(path)
        .map_err(|e| anyhow::anyhow!("failed to read config file {}: {e}", path.display()))?;

    load_from_str(&contents)
        .map_err(|e| anyhow::anyhow!("failed to parse config file {}: {e}", path.display()))
}

/// Parse configuration from a YAML string.
pub fn load_from_str(yaml: &str) -> anyhow::Result<Config> {
    let config: Config = serde_yml::from_str(yaml)?;
    if config.extension_namespace.trim().is_empty() {
        anyhow::bail!("extension_namespace must not be empty");
    }
    Ok(config)
}
