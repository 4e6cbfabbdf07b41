//! Telemetry for the console: structured event log, failure classification,
//! and the user-facing notification channel.
//!
//! The whole layer is owned by an explicit [`Telemetry`] context created at
//! startup and passed by reference; there is no ambient global state.

pub mod errors;
pub mod logger;
pub mod notification;

pub use errors::{DiagnosticRecord, ErrorCategory, Telemetry};
pub use logger::{EventLog, LogEntry, LogLevel, LOG_CAPACITY};
pub use notification::{ConsoleNotifier, MemoryNotifier, NotificationKind, Notifier};
