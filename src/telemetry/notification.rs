use std::cell::RefCell;

/// Kind of a user-facing notification
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NotificationKind {
    Success,
    Error,
    Info,
}

/// User-visible notification channel.
///
/// Fire-and-forget: implementations must not fail and no acknowledgment is
/// expected. A GUI shell would render toasts; the console prints.
pub trait Notifier {
    fn success(&self, message: &str);
    fn error(&self, message: &str);
    fn info(&self, message: &str);
}

/// Prints notifications to the terminal
#[derive(Debug, Default)]
pub struct ConsoleNotifier;

impl Notifier for ConsoleNotifier {
    fn success(&self, message: &str) {
        println!("✅ {message}");
    }

    fn error(&self, message: &str) {
        eprintln!("❌ {message}");
    }

    fn info(&self, message: &str) {
        println!("ℹ️  {message}");
    }
}

/// Collects notifications in memory; used by tests and report tooling
#[derive(Debug, Default)]
pub struct MemoryNotifier {
    messages: RefCell<Vec<(NotificationKind, String)>>,
}

impl MemoryNotifier {
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of everything notified so far
    pub fn messages(&self) -> Vec<(NotificationKind, String)> {
        self.messages.borrow().clone()
    }

    /// Only the error-channel messages
    pub fn errors(&self) -> Vec<String> {
        self.messages
            .borrow()
            .iter()
            .filter(|(kind, _)| *kind == NotificationKind::Error)
            .map(|(_, message)| message.clone())
            .collect()
    }
}

impl Notifier for MemoryNotifier {
    fn success(&self, message: &str) {
        self.messages
            .borrow_mut()
            .push((NotificationKind::Success, message.to_string()));
    }

    fn error(&self, message: &str) {
        self.messages
            .borrow_mut()
            .push((NotificationKind::Error, message.to_string()));
    }

    fn info(&self, message: &str) {
        self.messages
            .borrow_mut()
            .push((NotificationKind::Info, message.to_string()));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_memory_notifier_records_in_order() {
        let notifier = MemoryNotifier::new();
        notifier.info("loading");
        notifier.error("boom");
        notifier.success("done");

        let messages = notifier.messages();
        assert_eq!(messages.len(), 3);
        assert_eq!(messages[1], (NotificationKind::Error, "boom".to_string()));
        assert_eq!(notifier.errors(), vec!["boom".to_string()]);
    }
}
