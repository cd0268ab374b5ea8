use crate::{
    config::Config,
    error::{Error, Result},
    lexicon::Lexicons,
    observer::Observer,
    record::{LogRecord, Status},
};
use chrono::NaiveDateTime;
use regex::Regex;
use std::{
    fs::File,
    io::{BufRead, BufReader},
    path::Path,
};
use tracing::{debug, trace};

/// Statistics collected during scanning.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct ScanStats {
    /// Lines read from the log
    pub lines: usize,

    /// Lines containing a known stage
    pub stage_lines: usize,

    /// Lines with both a stage and a timestamp
    pub timestamped_lines: usize,

    /// Records emitted
    pub records: usize,
}

/// Classifies log lines into start/end records.
#[derive(Debug, Clone)]
pub struct Scanner {
    pattern: Regex,
    datetime_format: String,
}

impl Scanner {
    /// Creates a scanner from a timestamp pattern and `strftime` format.
    ///
    /// # Errors
    ///
    /// Returns a configuration error if the pattern does not compile.
    pub fn new(pattern: &str, datetime_format: impl Into<String>) -> Result<Self> {
        Ok(Self {
            pattern: Regex::new(pattern)?,
            datetime_format: datetime_format.into(),
        })
    }

    /// Creates a scanner from the timestamp settings of a configuration.
    ///
    /// # Errors
    ///
    /// Returns a configuration error if the pattern does not compile.
    pub fn from_config(config: &Config) -> Result<Self> {
        Self::new(&config.timestamp_regex, config.timestamp_format.clone())
    }

    /// Scans a log file and returns its records in file order.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - The file cannot be opened or read
    /// - A matched timestamp cannot be parsed
    pub fn scan(
        &self,
        path: &Path,
        lexicons: &Lexicons,
        observer: &dyn Observer,
    ) -> Result<(Vec<LogRecord>, ScanStats)> {
        let file = File::open(path).map_err(|e| Error::io(path, e))?;

        debug!("Scanning {}", path.display());
        let (records, stats) = self.scan_reader(BufReader::new(file), path, lexicons)?;

        debug!(
            "Scan complete: {} lines, {} with stage, {} timestamped, {} records",
            stats.lines, stats.stage_lines, stats.timestamped_lines, stats.records
        );
        observer.info(&format!(
            "Collected {} records from {}",
            records.len(),
            path.display()
        ));

        Ok((records, stats))
    }

    /// Scans any buffered reader. `origin` names the source in errors.
    ///
    /// # Errors
    ///
    /// Returns an error if reading fails or a matched timestamp cannot be parsed.
    pub fn scan_reader(
        &self,
        reader: impl BufRead,
        origin: &Path,
        lexicons: &Lexicons,
    ) -> Result<(Vec<LogRecord>, ScanStats)> {
        let mut records = Vec::new();
        let mut stats = ScanStats::default();

        for (index, line) in reader.lines().enumerate() {
            let line = line.map_err(|e| Error::io(origin, e))?;
            let line_number = index + 1;
            stats.lines += 1;

            let Some(stage) = lexicons.stage_of(&line) else {
                continue;
            };
            stats.stage_lines += 1;

            let Some(found) = self.pattern.find(&line) else {
                continue;
            };
            stats.timestamped_lines += 1;

            let timestamp = self.parse_timestamp(found.as_str(), origin, line_number)?;

            let status = if lexicons.begin_word_of(&line).is_some() {
                Status::Start
            } else if lexicons.finish_word_of(&line).is_some() {
                Status::End
            } else {
                trace!("Line {line_number}: stage '{stage}' without keyword");
                continue;
            };

            trace!("Line {line_number}: {stage} {status} at {timestamp}");
            records.push(LogRecord::new(stage, status, timestamp, line_number));
        }

        stats.records = records.len();
        Ok((records, stats))
    }

    fn parse_timestamp(&self, text: &str, origin: &Path, line: usize) -> Result<NaiveDateTime> {
        NaiveDateTime::parse_from_str(text, &self.datetime_format)
            .map_err(|e| Error::timestamp(origin, line, text, e))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{DEFAULT_TIMESTAMP_FORMAT, DEFAULT_TIMESTAMP_REGEX};
    use crate::observer::{CollectingObserver, Level};
    use assert_fs::prelude::*;
    use chrono::NaiveDate;
    use std::io::Cursor;

    fn scanner() -> Scanner {
        Scanner::new(DEFAULT_TIMESTAMP_REGEX, DEFAULT_TIMESTAMP_FORMAT).unwrap()
    }

    fn lexicons() -> Lexicons {
        Lexicons::new(["Build", "Test"], ["STARTED", "BEGIN"], ["DONE"])
    }

    fn scan_str(text: &str, lexicons: &Lexicons) -> Result<(Vec<LogRecord>, ScanStats)> {
        scanner().scan_reader(Cursor::new(text), Path::new("test.log"), lexicons)
    }

    fn at(h: u32, m: u32, s: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2024, 1, 1)
            .unwrap()
            .and_hms_opt(h, m, s)
            .unwrap()
    }

    #[test]
    fn test_scan_start_and_end() {
        let log = "01-01-2024 10:00:00 Build STARTED\n01-01-2024 10:05:00 Build DONE\n";
        let (records, stats) = scan_str(log, &lexicons()).unwrap();

        assert_eq!(
            records,
            vec![
                LogRecord::new("Build", Status::Start, at(10, 0, 0), 1),
                LogRecord::new("Build", Status::End, at(10, 5, 0), 2),
            ]
        );
        assert_eq!(stats.lines, 2);
        assert_eq!(stats.records, 2);
    }

    #[test]
    fn test_line_without_keyword_is_skipped() {
        let log = "01-01-2024 10:00:00 Build compiling crate foo\n";
        let (records, stats) = scan_str(log, &lexicons()).unwrap();

        assert!(records.is_empty());
        assert_eq!(stats.timestamped_lines, 1);
    }

    #[test]
    fn test_line_without_timestamp_is_skipped() {
        let log = "Build STARTED 01-01-2024 10:00:00\n[info] Build DONE\n";
        let (records, stats) = scan_str(log, &lexicons()).unwrap();

        assert!(records.is_empty());
        assert_eq!(stats.stage_lines, 2);
        assert_eq!(stats.timestamped_lines, 0);
    }

    #[test]
    fn test_line_without_stage_is_skipped() {
        let log = "01-01-2024 10:00:00 Deploy STARTED\n";
        let (records, _) = scan_str(log, &lexicons()).unwrap();
        assert!(records.is_empty());
    }

    #[test]
    fn test_begin_keyword_wins_over_finish() {
        let log = "01-01-2024 10:00:00 Build DONE waiting, STARTED next\n";
        let (records, _) = scan_str(log, &lexicons()).unwrap();

        assert_eq!(records.len(), 1);
        assert_eq!(records[0].status, Status::Start);
    }

    #[test]
    fn test_stage_follows_lexicon_order() {
        // "Test" appears first in the line but "Build" is listed first
        let log = "01-01-2024 10:00:00 Test of Build STARTED\n";
        let (records, _) = scan_str(log, &lexicons()).unwrap();

        assert_eq!(records[0].stage, "Build");
    }

    #[test]
    fn test_ambiguous_begin_keywords_do_not_fail() {
        let log = "01-01-2024 10:00:00 Build BEGIN STARTED\n";
        let (records, _) = scan_str(log, &lexicons()).unwrap();

        assert_eq!(records.len(), 1);
        assert_eq!(records[0].status, Status::Start);
    }

    #[test]
    fn test_unparseable_timestamp_fails() {
        let log = "01-01-2024 10:00:00 Build STARTED\n99-99-2024 10:00:00 Build DONE\n";
        let err = scan_str(log, &lexicons()).unwrap_err();

        assert!(err.is_timestamp());
        assert!(err.to_string().contains("test.log:2"));
    }

    #[test]
    fn test_bad_timestamp_without_stage_is_ignored() {
        let log = "99-99-2024 10:00:00 nothing to see\n";
        let (records, _) = scan_str(log, &lexicons()).unwrap();
        assert!(records.is_empty());
    }

    #[test]
    fn test_custom_timestamp_format() {
        let scanner =
            Scanner::new(r"^\d{4}-\d{2}-\d{2}T\d{2}:\d{2}:\d{2}", "%Y-%m-%dT%H:%M:%S").unwrap();
        let log = "2024-01-01T10:00:30 Test BEGIN\n";
        let (records, _) = scanner
            .scan_reader(Cursor::new(log), Path::new("iso.log"), &lexicons())
            .unwrap();

        assert_eq!(records[0].timestamp, at(10, 0, 30));
        assert_eq!(records[0].stage, "Test");
    }

    #[test]
    fn test_scan_file_reports_count() {
        let temp = assert_fs::TempDir::new().unwrap();
        let log = temp.child("build.log");
        log.write_str("01-01-2024 10:00:00 Build STARTED\nnoise\n01-01-2024 10:01:00 Build DONE")
            .unwrap();

        let observer = CollectingObserver::new();
        let (records, stats) = scanner().scan(log.path(), &lexicons(), &observer).unwrap();

        assert_eq!(records.len(), 2);
        assert_eq!(stats.lines, 3);
        let infos = observer.at(Level::Info);
        assert_eq!(infos.len(), 1);
        assert!(infos[0].starts_with("Collected 2 records"));
        assert!(observer.errors().is_empty());
    }

    #[test]
    fn test_scan_missing_file() {
        let temp = assert_fs::TempDir::new().unwrap();
        let err = scanner()
            .scan(
                &temp.path().join("missing.log"),
                &lexicons(),
                &CollectingObserver::new(),
            )
            .unwrap_err();
        assert!(err.is_io());
    }
}
