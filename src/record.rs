use chrono::NaiveDateTime;
use serde::Serialize;
use std::fmt;

/// Whether a log line opens or closes a stage.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum Status {
    /// Line carries a begin keyword
    Start,
    /// Line carries a finish keyword
    End,
}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Start => f.write_str("START"),
            Self::End => f.write_str("END"),
        }
    }
}

/// A single classified log line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogRecord {
    /// Stage name as listed in the stages lexicon
    pub stage: String,

    /// Start or end marker
    pub status: Status,

    /// Timestamp parsed from the start of the line
    pub timestamp: NaiveDateTime,

    /// 1-based line number in the source log
    pub line_number: usize,
}

impl LogRecord {
    /// Creates a new record.
    #[must_use]
    pub fn new(
        stage: impl Into<String>,
        status: Status,
        timestamp: NaiveDateTime,
        line_number: usize,
    ) -> Self {
        Self {
            stage: stage.into(),
            status,
            timestamp,
            line_number,
        }
    }
}

/// One bar of the chart.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Task {
    /// Stage name
    pub name: String,

    /// First start timestamp of the stage
    pub begin: NaiveDateTime,

    /// First end timestamp of the stage
    pub finish: NaiveDateTime,
}

impl Task {
    /// Creates a new task.
    #[must_use]
    pub fn new(name: impl Into<String>, begin: NaiveDateTime, finish: NaiveDateTime) -> Self {
        Self {
            name: name.into(),
            begin,
            finish,
        }
    }

    /// Signed duration from begin to finish. Negative when the log reports
    /// the end before the start.
    #[must_use]
    pub fn duration(&self) -> chrono::Duration {
        self.finish - self.begin
    }

    /// Earliest and latest of the two timestamps.
    #[must_use]
    pub fn span(&self) -> (NaiveDateTime, NaiveDateTime) {
        if self.begin <= self.finish {
            (self.begin, self.finish)
        } else {
            (self.finish, self.begin)
        }
    }
}
