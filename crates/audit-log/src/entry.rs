use serde::{Deserialize, Serialize};

/// A single audit log entry representing an agent event.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuditEntry {
    pub id: uuid::Uuid,
    pub timestamp: chrono::DateTime<chrono::Utc>,
    pub event_type: AuditEventType,
    pub source: AuditSource,
    pub details: serde_json::Value,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub policy_decision: Option<PolicyDecisionRecord>,
}

impl AuditEntry {
    /// Create a new `AuditEntry` with an auto-generated UUID v4 and the current
    /// UTC timestamp. `policy_decision` defaults to `None`.
    pub fn new(
        event_type: AuditEventType,
        source: AuditSource,
        details: serde_json::Value,
    ) -> Self {
        Self {
            id: uuid::Uuid::new_v4(),
            timestamp: chrono::Utc::now(),
            event_type,
            source,
            details,
            policy_decision: None,
        }
    }

    /// Attach a policy decision record, builder-style.
    pub fn with_policy_decision(mut self, decision: PolicyDecisionRecord) -> Self {
        self.policy_decision = Some(decision);
        self
    }
}

/// The category of audit event being recorded.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AuditEventType {
    AgentStarting,
    HookRegistered,
    HookRejected,
    AgentInstalled,
    InstallFailed,
    OperationBlocked,
}

/// The component that produced the event and, when known, the hook and
/// inbound request it relates to.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuditSource {
    pub component: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub hook: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub request: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub thread: Option<String>,
}

impl AuditSource {
    /// Source with only the component name set.
    pub fn new(component: impl Into<String>) -> Self {
        Self {
            component: component.into(),
            hook: None,
            request: None,
            thread: None,
        }
    }

    pub fn with_hook(mut self, hook: impl Into<String>) -> Self {
        self.hook = Some(hook.into());
        self
    }

    pub fn with_request(mut self, request: impl Into<String>) -> Self {
        self.request = Some(request.into());
        self
    }

    /// Record the name (or id) of the calling thread.
    pub fn on_current_thread(mut self) -> Self {
        let current = std::thread::current();
        self.thread = Some(
            current
                .name()
                .map(str::to_string)
                .unwrap_or_else(|| format!("{:?}", current.id())),
        );
        self
    }
}

/// Records the outcome of a policy evaluation attached to an audit event.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PolicyDecisionRecord {
    pub action: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub matched_rule: Option<String>,
    pub reason: String,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn event_types_serialize_snake_case() {
        let v = serde_json::to_value(AuditEventType::OperationBlocked).unwrap();
        assert_eq!(v, json!("operation_blocked"));
        let v = serde_json::to_value(AuditEventType::AgentStarting).unwrap();
        assert_eq!(v, json!("agent_starting"));
    }

    #[test]
    fn optional_fields_are_omitted() {
        let entry = AuditEntry::new(
            AuditEventType::HookRegistered,
            AuditSource::new("hook-registry"),
            json!({}),
        );
        let v = serde_json::to_value(&entry).unwrap();
        assert!(v.get("policy_decision").is_none());
        assert!(v["source"].get("hook").is_none());
        assert_eq!(v["source"]["component"], "hook-registry");
    }

    #[test]
    fn source_builders_set_fields() {
        let source = AuditSource::new("guards")
            .with_hook("java.io.ObjectInputStream#resolveClass")
            .with_request("POST /upload")
            .on_current_thread();
        assert_eq!(source.hook.as_deref(), Some("java.io.ObjectInputStream#resolveClass"));
        assert_eq!(source.request.as_deref(), Some("POST /upload"));
        assert!(source.thread.is_some());
    }
}
