//! Audit trail for hookwarden.
//!
//! Entries are appended to a [JSON Lines](https://jsonlines.org/) file, one
//! object per line, and flushed as they are written. The agent records its
//! own lifecycle (start, hook registration, install outcome) and every
//! blocked operation, with the request that triggered it when one is bound.
//!
//! # Quick start
//!
//! ```rust,no_run
//! use audit_log::{AuditEntry, AuditEventType, AuditSink, AuditSource};
//!
//! # fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let sink = AuditSink::open("rasp-logs/audit.jsonl")?;
//!
//! sink.log(AuditEntry::new(
//!     AuditEventType::AgentStarting,
//!     AuditSource::new("hookwarden"),
//!     serde_json::json!({"version": "0.1.0"}),
//! ));
//! # Ok(())
//! # }
//! ```

pub mod entry;
pub mod sink;
pub mod writer;

pub use entry::{AuditEntry, AuditEventType, AuditSource, PolicyDecisionRecord};
pub use sink::AuditSink;
pub use writer::{AuditWriteError, AuditWriter};
