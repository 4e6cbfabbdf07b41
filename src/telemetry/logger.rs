use std::cell::RefCell;
use std::collections::VecDeque;
use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Maximum entries kept in memory; the oldest entry is evicted first
pub const LOG_CAPACITY: usize = 1000;

/// Log severity, ordered from least to most severe.
///
/// The ordering is ordinal (`Warn < Error`), never lexical; severity filters
/// rely on the derived `Ord`.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, Default,
)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    #[default]
    Debug,
    Info,
    Warn,
    Error,
    Critical,
}

impl LogLevel {
    pub fn as_str(&self) -> &'static str {
        match self {
            LogLevel::Debug => "DEBUG",
            LogLevel::Info => "INFO",
            LogLevel::Warn => "WARN",
            LogLevel::Error => "ERROR",
            LogLevel::Critical => "CRITICAL",
        }
    }
}

impl fmt::Display for LogLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for LogLevel {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "debug" => Ok(LogLevel::Debug),
            "info" => Ok(LogLevel::Info),
            "warn" | "warning" => Ok(LogLevel::Warn),
            "error" => Ok(LogLevel::Error),
            "critical" => Ok(LogLevel::Critical),
            other => Err(format!("nível de log desconhecido: {other}")),
        }
    }
}

/// One structured log event
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LogEntry {
    pub timestamp: DateTime<Utc>,
    pub level: LogLevel,
    pub component: String,
    pub action: String,
    pub message: String,

    /// Structured payload attached by the caller
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<serde_json::Value>,

    /// Serialized error, present on error-path entries
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,

    /// Time-and-random identifier; unique enough to correlate, not globally
    pub correlation_id: String,
}

/// Bounded in-memory event log.
///
/// Capacity is [`LOG_CAPACITY`]; appending past it evicts the oldest entry
/// (FIFO). All mutation happens on the single UI thread, so interior
/// mutability is a `RefCell`, not a lock. Every entry is mirrored to the
/// `tracing` subscriber for terminal/file output.
#[derive(Debug)]
pub struct EventLog {
    min_level: LogLevel,
    entries: RefCell<VecDeque<LogEntry>>,
}

impl Default for EventLog {
    fn default() -> Self {
        Self::new()
    }
}

impl EventLog {
    /// Create a log that records everything
    pub fn new() -> Self {
        Self::with_min_level(LogLevel::Debug)
    }

    /// Create a log that drops entries below `min_level`
    pub fn with_min_level(min_level: LogLevel) -> Self {
        Self {
            min_level,
            entries: RefCell::new(VecDeque::new()),
        }
    }

    pub fn debug(
        &self,
        component: &str,
        action: &str,
        message: &str,
        data: Option<serde_json::Value>,
    ) {
        self.push(LogLevel::Debug, component, action, message, data, None);
    }

    pub fn info(
        &self,
        component: &str,
        action: &str,
        message: &str,
        data: Option<serde_json::Value>,
    ) {
        self.push(LogLevel::Info, component, action, message, data, None);
    }

    pub fn warn(
        &self,
        component: &str,
        action: &str,
        message: &str,
        data: Option<serde_json::Value>,
    ) {
        self.push(LogLevel::Warn, component, action, message, data, None);
    }

    pub fn error(
        &self,
        component: &str,
        action: &str,
        message: &str,
        error: Option<String>,
        data: Option<serde_json::Value>,
    ) {
        self.push(LogLevel::Error, component, action, message, data, error);
    }

    pub fn critical(
        &self,
        component: &str,
        action: &str,
        message: &str,
        error: Option<String>,
        data: Option<serde_json::Value>,
    ) {
        self.push(LogLevel::Critical, component, action, message, data, error);
    }

    fn push(
        &self,
        level: LogLevel,
        component: &str,
        action: &str,
        message: &str,
        data: Option<serde_json::Value>,
        error: Option<String>,
    ) {
        if level < self.min_level {
            return;
        }

        let entry = LogEntry {
            timestamp: Utc::now(),
            level,
            component: component.to_string(),
            action: action.to_string(),
            message: message.to_string(),
            data,
            error,
            correlation_id: Self::correlation_id(),
        };

        match level {
            LogLevel::Debug => {
                tracing::debug!(component, action, correlation = %entry.correlation_id, "{message}")
            }
            LogLevel::Info => {
                tracing::info!(component, action, correlation = %entry.correlation_id, "{message}")
            }
            LogLevel::Warn => {
                tracing::warn!(component, action, correlation = %entry.correlation_id, "{message}")
            }
            LogLevel::Error | LogLevel::Critical => {
                tracing::error!(component, action, correlation = %entry.correlation_id, "{message}")
            }
        }

        let mut entries = self.entries.borrow_mut();
        entries.push_back(entry);
        while entries.len() > LOG_CAPACITY {
            entries.pop_front();
        }
    }

    /// Snapshot of all retained entries, oldest first
    pub fn entries(&self) -> Vec<LogEntry> {
        self.entries.borrow().iter().cloned().collect()
    }

    /// Filter retained entries by component, action, and exact level
    pub fn diagnostics(
        &self,
        component: Option<&str>,
        action: Option<&str>,
        level: Option<LogLevel>,
    ) -> Vec<LogEntry> {
        self.entries
            .borrow()
            .iter()
            .filter(|entry| {
                if let Some(component) = component {
                    if entry.component != component {
                        return false;
                    }
                }
                if let Some(action) = action {
                    if entry.action != action {
                        return false;
                    }
                }
                if let Some(level) = level {
                    if entry.level != level {
                        return false;
                    }
                }
                true
            })
            .cloned()
            .collect()
    }

    /// Retained entries at or above the given severity
    pub fn at_or_above(&self, level: LogLevel) -> Vec<LogEntry> {
        self.entries
            .borrow()
            .iter()
            .filter(|entry| entry.level >= level)
            .cloned()
            .collect()
    }

    /// Export retained entries as pretty-printed JSON
    pub fn export_json(&self) -> String {
        let entries = self.entries();
        serde_json::to_string_pretty(&entries).unwrap_or_else(|_| "[]".to_string())
    }

    /// Drop all retained entries
    pub fn clear(&self) {
        self.entries.borrow_mut().clear();
    }

    pub fn len(&self) -> usize {
        self.entries.borrow().len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.borrow().is_empty()
    }

    /// UTC millis plus a random suffix; collisions are acceptable, ordering
    /// hints are the point
    fn correlation_id() -> String {
        let suffix = Uuid::new_v4().simple().to_string();
        format!("{}-{}", Utc::now().timestamp_millis(), &suffix[..9])
    }
}
