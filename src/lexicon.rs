use crate::error::{Error, Result};
use crate::observer::Observer;
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;
use tracing::debug;

/// Reads a lexicon file: one entry per line, surrounding whitespace trimmed.
///
/// Blank lines are skipped because an empty entry would be a substring of
/// every log line. No tab splitting happens even for `.tsv` files.
///
/// # Errors
///
/// Returns [`Error::Io`] if the file cannot be opened or read.
pub fn read_lexicon(path: impl AsRef<Path>) -> Result<Vec<String>> {
    let path = path.as_ref();
    let file = File::open(path).map_err(|e| Error::io(path, e))?;

    let mut entries = Vec::new();
    for line in BufReader::new(file).lines() {
        let line = line.map_err(|e| Error::io(path, e))?;
        let entry = line.trim();
        if entry.is_empty() {
            debug!("Skipping blank entry in {}", path.display());
            continue;
        }
        entries.push(entry.to_string());
    }

    Ok(entries)
}

/// The three word lists used to classify log lines.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Lexicons {
    /// Stage names, in priority order
    pub stages: Vec<String>,

    /// Keywords marking the start of a stage
    pub begin_words: Vec<String>,

    /// Keywords marking the end of a stage
    pub finish_words: Vec<String>,
}

impl Lexicons {
    /// Builds lexicons from in-memory lists.
    #[must_use]
    pub fn new<S: Into<String>>(
        stages: impl IntoIterator<Item = S>,
        begin_words: impl IntoIterator<Item = S>,
        finish_words: impl IntoIterator<Item = S>,
    ) -> Self {
        Self {
            stages: stages.into_iter().map(Into::into).collect(),
            begin_words: begin_words.into_iter().map(Into::into).collect(),
            finish_words: finish_words.into_iter().map(Into::into).collect(),
        }
    }

    /// Loads all three lexicons from disk.
    ///
    /// Blank lines are dropped rather than kept as empty entries that would
    /// match nothing useful; see [`read_lexicon`].
    ///
    /// # Errors
    ///
    /// Returns [`Error::Io`] for the first file that cannot be read.
    pub fn load(
        stages: &Path,
        begin_words: &Path,
        finish_words: &Path,
        observer: &dyn Observer,
    ) -> Result<Self> {
        let load = |path: &Path| -> Result<Vec<String>> {
            let entries = read_lexicon(path)?;
            observer.info(&format!("Read file {}", path.display()));
            Ok(entries)
        };

        Ok(Self {
            stages: load(stages)?,
            begin_words: load(begin_words)?,
            finish_words: load(finish_words)?,
        })
    }

    /// Returns the first stage (in listed order) contained in `line`.
    #[must_use]
    pub fn stage_of(&self, line: &str) -> Option<&str> {
        first_contained(&self.stages, line)
    }

    /// Returns the first begin keyword (in listed order) contained in `line`.
    #[must_use]
    pub fn begin_word_of(&self, line: &str) -> Option<&str> {
        first_contained(&self.begin_words, line)
    }

    /// Returns the first finish keyword (in listed order) contained in `line`.
    #[must_use]
    pub fn finish_word_of(&self, line: &str) -> Option<&str> {
        first_contained(&self.finish_words, line)
    }
}

fn first_contained<'a>(entries: &'a [String], line: &str) -> Option<&'a str> {
    entries
        .iter()
        .find(|entry| line.contains(entry.as_str()))
        .map(String::as_str)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::observer::{CollectingObserver, Level};
    use assert_fs::prelude::*;

    #[test]
    fn test_read_lexicon_trims_lines() {
        let temp = assert_fs::TempDir::new().unwrap();
        let file = temp.child("stages.tsv");
        file.write_str("  Build  \nTest\t\r\nDeploy").unwrap();

        let entries = read_lexicon(file.path()).unwrap();
        assert_eq!(entries, vec!["Build", "Test", "Deploy"]);
    }

    #[test]
    fn test_read_lexicon_skips_blank_lines() {
        let temp = assert_fs::TempDir::new().unwrap();
        let file = temp.child("begin.tsv");
        file.write_str("STARTED\n\n   \nBEGIN\n").unwrap();

        let entries = read_lexicon(file.path()).unwrap();
        assert_eq!(entries, vec!["STARTED", "BEGIN"]);
    }

    #[test]
    fn test_read_lexicon_keeps_tabs_inside_entry() {
        let temp = assert_fs::TempDir::new().unwrap();
        let file = temp.child("finish.tsv");
        file.write_str("step\tdone\n").unwrap();

        let entries = read_lexicon(file.path()).unwrap();
        assert_eq!(entries, vec!["step\tdone"]);
    }

    #[test]
    fn test_read_lexicon_missing_file() {
        let temp = assert_fs::TempDir::new().unwrap();
        let err = read_lexicon(temp.path().join("missing.tsv")).unwrap_err();
        assert!(err.is_io());
        assert!(err.to_string().contains("missing.tsv"));
    }

    #[test]
    fn test_load_reports_each_file() {
        let temp = assert_fs::TempDir::new().unwrap();
        temp.child("stages.tsv").write_str("Build\n").unwrap();
        temp.child("begin.tsv").write_str("STARTED\n").unwrap();
        temp.child("finish.tsv").write_str("DONE\n").unwrap();

        let observer = CollectingObserver::new();
        let lexicons = Lexicons::load(
            &temp.path().join("stages.tsv"),
            &temp.path().join("begin.tsv"),
            &temp.path().join("finish.tsv"),
            &observer,
        )
        .unwrap();

        assert_eq!(lexicons, Lexicons::new(["Build"], ["STARTED"], ["DONE"]));
        let infos = observer.at(Level::Info);
        assert_eq!(infos.len(), 3);
        assert!(infos[0].starts_with("Read file"));
        assert!(infos[2].contains("finish.tsv"));
    }

    #[test]
    fn test_load_fails_on_missing_keyword_file() {
        let temp = assert_fs::TempDir::new().unwrap();
        temp.child("stages.tsv").write_str("Build\n").unwrap();

        let err = Lexicons::load(
            &temp.path().join("stages.tsv"),
            &temp.path().join("begin.tsv"),
            &temp.path().join("finish.tsv"),
            &CollectingObserver::new(),
        )
        .unwrap_err();
        assert!(err.to_string().contains("begin.tsv"));
    }

    #[test]
    fn test_first_match_follows_listed_order() {
        let lexicons = Lexicons::new(["Test", "Build"], ["BEGIN", "STARTED"], ["DONE"]);
        let line = "01-01-2024 10:00:00 Build STARTED then BEGIN Test";

        assert_eq!(lexicons.stage_of(line), Some("Test"));
        assert_eq!(lexicons.begin_word_of(line), Some("BEGIN"));
        assert_eq!(lexicons.finish_word_of(line), None);
    }

    #[test]
    fn test_no_match() {
        let lexicons = Lexicons::new(["Build"], ["STARTED"], ["DONE"]);
        assert_eq!(lexicons.stage_of("nothing here"), None);
    }
}
