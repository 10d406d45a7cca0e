//! Core traits for the audit trail
//!
//! Every component that writes audit records receives the sink it writes to
//! instead of reaching for a process-wide logger, so tests can capture the
//! trail in memory and the binary can send it to stdout or a file.

use super::audit_log::AuditEvent;
use std::thread;

/// Destination for human-readable operation records
///
/// Implementations must write each line atomically with respect to other
/// `record` calls: two concurrent writers never produce an interleaved line.
/// No ordering is promised beyond arrival order at the sink's own lock.
pub trait AuditSink: Send + Sync {
    /// Append one complete line (without a trailing newline)
    ///
    /// `line` should not contain line breaks. Sinks that write physical lines
    /// escape any `\n` or `\r` they receive rather than splitting the record.
    fn record(&self, line: &str);

    /// Format an event with the calling thread's label and record it
    fn record_event(&self, event: &AuditEvent) {
        self.record(&format!("Thread {} - {}", current_thread_label(), event));
    }
}

/// Name of the current thread, or its id when it is unnamed
pub fn current_thread_label() -> String {
    let current = thread::current();
    match current.name() {
        Some(name) => name.to_string(),
        None => format!("{:?}", current.id()),
    }
}
