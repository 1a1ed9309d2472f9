//! Audit log sink
//!
//! Compliance-relevant events (currently rate-limit rejections) are written
//! through an [`AuditSink`] so deployments can route them separately from
//! diagnostic logging.

use log::Level;
use serde_json::Value;

/// Log target used by [`LogAuditSink`].
pub const AUDIT_TARGET: &str = "dojokit::audit";

/// Destination for audit entries.
pub trait AuditSink: Send + Sync {
    fn log(&self, level: Level, message: &str, fields: &Value);
}

/// Writes audit entries to the `log` facade under [`AUDIT_TARGET`].
#[derive(Debug, Default, Clone, Copy)]
pub struct LogAuditSink;

impl AuditSink for LogAuditSink {
    fn log(&self, level: Level, message: &str, fields: &Value) {
        log::log!(target: AUDIT_TARGET, level, "{} {}", message, fields);
    }
}
