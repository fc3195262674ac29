//! Block reporting: one diagnostic line and one audit entry per block.

use audit_log::{AuditEntry, AuditEventType, AuditSource, PolicyDecisionRecord};
use hook_registry::{Invocation, SecurityViolation};
use policy_engine::{PolicyDecision, ResolvedAction};
use request_context::with_current;
use serde_json::json;
use tracing::warn;

use crate::bootstrap;

/// Shown when a request is bound but its details cannot be read.
const SUMMARY_UNAVAILABLE: &str = "unavailable";

/// Describe the request bound to this thread, if any.
pub fn current_request() -> Option<String> {
    with_current(|bound| {
        bound.map(|ctx| {
            ctx.summary()
                .map(|summary| summary.to_string())
                .unwrap_or_else(|| SUMMARY_UNAVAILABLE.to_string())
        })
    })
}

/// Report a blocked call and build the violation that aborts it.
pub fn block(
    call: &Invocation<'_>,
    operation: &str,
    subject: &str,
    decision: &PolicyDecision,
) -> SecurityViolation {
    let hook = format!("{}#{}", call.type_name, call.member.name);
    let request = current_request();

    warn!(
        operation,
        subject,
        hook = %hook,
        matched_rule = decision.matched_rule.as_deref().unwrap_or("-"),
        reason = %decision.reason,
        request = request.as_deref().unwrap_or("none"),
        "BLOCKED"
    );

    if let Some(audit) = &bootstrap::shared().audit {
        let mut source = AuditSource::new("guards")
            .with_hook(hook.clone())
            .on_current_thread();
        if let Some(request) = &request {
            source = source.with_request(request.clone());
        }
        audit.log(
            AuditEntry::new(
                AuditEventType::OperationBlocked,
                source,
                json!({ "operation": operation, "subject": subject }),
            )
            .with_policy_decision(PolicyDecisionRecord {
                action: action_name(decision.action).to_string(),
                matched_rule: decision.matched_rule.clone(),
                reason: decision.reason.clone(),
            }),
        );
    }

    let violation = SecurityViolation::new(operation, subject);
    match &decision.matched_rule {
        Some(pattern) => violation.with_rule(pattern.clone()),
        None => violation,
    }
}

fn action_name(action: ResolvedAction) -> &'static str {
    match action {
        ResolvedAction::Allow => "allow",
        ResolvedAction::Block => "block",
    }
}
