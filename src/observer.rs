use std::sync::Mutex;

/// Receives the progress and failure messages emitted while building a chart.
///
/// The pipeline never logs directly; it reports through an observer so that
/// callers can route messages elsewhere or assert on them.
pub trait Observer: Send + Sync {
    /// Reports normal progress.
    fn info(&self, message: &str);

    /// Reports a recoverable failure.
    fn error(&self, message: &str);
}

/// Forwards every message to `tracing`.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingObserver;

impl Observer for TracingObserver {
    fn info(&self, message: &str) {
        tracing::info!("{message}");
    }

    fn error(&self, message: &str) {
        tracing::error!("{message}");
    }
}

/// Severity of a collected message.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Level {
    /// Progress message
    Info,
    /// Recoverable failure
    Error,
}

/// Keeps every message in memory, in arrival order.
#[derive(Debug, Default)]
pub struct CollectingObserver {
    messages: Mutex<Vec<(Level, String)>>,
}

impl CollectingObserver {
    /// Creates an empty collector.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns a snapshot of everything collected so far.
    #[must_use]
    pub fn messages(&self) -> Vec<(Level, String)> {
        self.messages
            .lock()
            .map(|guard| guard.clone())
            .unwrap_or_default()
    }

    /// Returns the messages reported at the given level.
    #[must_use]
    pub fn at(&self, level: Level) -> Vec<String> {
        self.messages()
            .into_iter()
            .filter(|(l, _)| *l == level)
            .map(|(_, m)| m)
            .collect()
    }

    /// Returns the reported errors.
    #[must_use]
    pub fn errors(&self) -> Vec<String> {
        self.at(Level::Error)
    }

    fn push(&self, level: Level, message: &str) {
        if let Ok(mut guard) = self.messages.lock() {
            guard.push((level, message.to_string()));
        }
    }
}

impl Observer for CollectingObserver {
    fn info(&self, message: &str) {
        self.push(Level::Info, message);
    }

    fn error(&self, message: &str) {
        self.push(Level::Error, message);
    }
}
