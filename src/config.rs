use crate::chart::ChartOptions;
use crate::error::{Error, Result};
use regex::Regex;
use std::path::PathBuf;

/// Default log file, relative to the working directory.
pub const DEFAULT_INPUT: &str = "data/17357.ngp.cli-output.txt";
/// Default chart path.
pub const DEFAULT_OUTPUT: &str = "data/ganta_chart.png";
/// Default stage lexicon.
pub const DEFAULT_STAGES: &str = "data/stages.tsv";
/// Default begin-keyword lexicon.
pub const DEFAULT_BEGIN: &str = "data/begin.tsv";
/// Default finish-keyword lexicon.
pub const DEFAULT_FINISH: &str = "data/finish.tsv";
/// Default pattern locating the timestamp at the start of a line.
pub const DEFAULT_TIMESTAMP_REGEX: &str = r"^\d{2}-\d{2}-\d{4} \d{2}:\d{2}:\d{2}";
/// Default `strftime` format applied to the matched timestamp.
pub const DEFAULT_TIMESTAMP_FORMAT: &str = "%d-%m-%Y %H:%M:%S";

const MIN_CHART_WIDTH: u32 = 200;
const MIN_ROW_HEIGHT: u32 = 10;
const MIN_TICK_COUNT: u32 = 2;
const MAX_CHART_WIDTH: u32 = 16_384;
const MAX_ROW_HEIGHT: u32 = 1_024;
const MAX_TICK_COUNT: u32 = 100;

/// Configuration for the log-gantt pipeline.
///
/// Use [`Config::builder()`] to construct a new configuration.
#[derive(Debug, Clone)]
#[non_exhaustive]
pub struct Config {
    /// Log file to scan
    pub input: PathBuf,

    /// Chart image to write; the extension selects the image format
    pub output: PathBuf,

    /// Stage names lexicon
    pub stages_file: PathBuf,

    /// Begin keywords lexicon
    pub begin_file: PathBuf,

    /// Finish keywords lexicon
    pub finish_file: PathBuf,

    /// Regular expression locating the timestamp in a line
    pub timestamp_regex: String,

    /// `strftime` format used to parse the matched timestamp
    pub timestamp_format: String,

    /// Chart geometry
    pub chart: ChartOptions,

    /// Optional JSON dump of the assembled tasks
    pub tasks_json: Option<PathBuf>,

    /// Dry run mode (no chart written)
    pub dry_run: bool,
}

impl Config {
    /// Creates a new configuration builder.
    ///
    /// # Examples
    ///
    /// ```
    /// use log_gantt::Config;
    ///
    /// let config = Config::builder()
    ///     .input("build.log")
    ///     .output("build.png")
    ///     .build()
    ///     .expect("valid configuration");
    /// ```
    #[must_use]
    pub fn builder() -> ConfigBuilder {
        ConfigBuilder::default()
    }

    /// Validates the configuration.
    ///
    /// Input files are not checked here; a missing file surfaces as an IO
    /// error when it is read.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - The timestamp pattern does not compile
    /// - The timestamp format is empty
    /// - Chart geometry is outside the supported range
    pub fn validate(&self) -> Result<()> {
        Regex::new(&self.timestamp_regex)?;

        if self.timestamp_format.trim().is_empty() {
            return Err(Error::config("timestamp_format must not be empty"));
        }

        if !(MIN_CHART_WIDTH..=MAX_CHART_WIDTH).contains(&self.chart.width) {
            return Err(Error::config(format!(
                "chart width ({}) must be between {MIN_CHART_WIDTH} and {MAX_CHART_WIDTH} pixels",
                self.chart.width
            )));
        }

        if !(MIN_ROW_HEIGHT..=MAX_ROW_HEIGHT).contains(&self.chart.row_height) {
            return Err(Error::config(format!(
                "row height ({}) must be between {MIN_ROW_HEIGHT} and {MAX_ROW_HEIGHT} pixels",
                self.chart.row_height
            )));
        }

        if !(MIN_TICK_COUNT..=MAX_TICK_COUNT).contains(&self.chart.tick_count) {
            return Err(Error::config(format!(
                "tick count ({}) must be between {MIN_TICK_COUNT} and {MAX_TICK_COUNT}",
                self.chart.tick_count
            )));
        }

        if self.output.as_os_str().is_empty() && !self.dry_run {
            return Err(Error::config("output path must not be empty"));
        }

        Ok(())
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            input: PathBuf::from(DEFAULT_INPUT),
            output: PathBuf::from(DEFAULT_OUTPUT),
            stages_file: PathBuf::from(DEFAULT_STAGES),
            begin_file: PathBuf::from(DEFAULT_BEGIN),
            finish_file: PathBuf::from(DEFAULT_FINISH),
            timestamp_regex: DEFAULT_TIMESTAMP_REGEX.to_string(),
            timestamp_format: DEFAULT_TIMESTAMP_FORMAT.to_string(),
            chart: ChartOptions::default(),
            tasks_json: None,
            dry_run: false,
        }
    }
}

/// Builder for creating a [`Config`].
#[derive(Debug, Default)]
pub struct ConfigBuilder {
    input: Option<PathBuf>,
    output: Option<PathBuf>,
    stages_file: Option<PathBuf>,
    begin_file: Option<PathBuf>,
    finish_file: Option<PathBuf>,
    timestamp_regex: Option<String>,
    timestamp_format: Option<String>,
    chart_width: Option<u32>,
    row_height: Option<u32>,
    tick_count: Option<u32>,
    tasks_json: Option<PathBuf>,
    dry_run: bool,
}

impl ConfigBuilder {
    /// Sets the log file to scan.
    #[must_use]
    pub fn input(mut self, path: impl Into<PathBuf>) -> Self {
        self.input = Some(path.into());
        self
    }

    /// Sets the chart image path.
    #[must_use]
    pub fn output(mut self, path: impl Into<PathBuf>) -> Self {
        self.output = Some(path.into());
        self
    }

    /// Sets the stage names lexicon.
    #[must_use]
    pub fn stages_file(mut self, path: impl Into<PathBuf>) -> Self {
        self.stages_file = Some(path.into());
        self
    }

    /// Sets the begin keywords lexicon.
    #[must_use]
    pub fn begin_file(mut self, path: impl Into<PathBuf>) -> Self {
        self.begin_file = Some(path.into());
        self
    }

    /// Sets the finish keywords lexicon.
    #[must_use]
    pub fn finish_file(mut self, path: impl Into<PathBuf>) -> Self {
        self.finish_file = Some(path.into());
        self
    }

    /// Sets the regular expression locating timestamps.
    #[must_use]
    pub fn timestamp_regex(mut self, pattern: impl Into<String>) -> Self {
        self.timestamp_regex = Some(pattern.into());
        self
    }

    /// Sets the `strftime` format for timestamps.
    #[must_use]
    pub fn timestamp_format(mut self, format: impl Into<String>) -> Self {
        self.timestamp_format = Some(format.into());
        self
    }

    /// Sets the chart width in pixels.
    #[must_use]
    pub const fn chart_width(mut self, width: u32) -> Self {
        self.chart_width = Some(width);
        self
    }

    /// Sets the height of one task row in pixels.
    #[must_use]
    pub const fn row_height(mut self, height: u32) -> Self {
        self.row_height = Some(height);
        self
    }

    /// Sets the number of labelled ticks on the time axis.
    #[must_use]
    pub const fn tick_count(mut self, ticks: u32) -> Self {
        self.tick_count = Some(ticks);
        self
    }

    /// Also writes the assembled tasks as JSON to this path.
    #[must_use]
    pub fn tasks_json(mut self, path: impl Into<PathBuf>) -> Self {
        self.tasks_json = Some(path.into());
        self
    }

    /// Enables dry run mode.
    #[must_use]
    pub const fn dry_run(mut self, enabled: bool) -> Self {
        self.dry_run = enabled;
        self
    }

    /// Builds and validates the configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if validation fails.
    pub fn build(self) -> Result<Config> {
        let defaults = Config::default();
        let chart = ChartOptions {
            width: self.chart_width.unwrap_or(defaults.chart.width),
            row_height: self.row_height.unwrap_or(defaults.chart.row_height),
            tick_count: self.tick_count.unwrap_or(defaults.chart.tick_count),
        };

        let config = Config {
            input: self.input.unwrap_or(defaults.input),
            output: self.output.unwrap_or(defaults.output),
            stages_file: self.stages_file.unwrap_or(defaults.stages_file),
            begin_file: self.begin_file.unwrap_or(defaults.begin_file),
            finish_file: self.finish_file.unwrap_or(defaults.finish_file),
            timestamp_regex: self.timestamp_regex.unwrap_or(defaults.timestamp_regex),
            timestamp_format: self.timestamp_format.unwrap_or(defaults.timestamp_format),
            chart,
            tasks_json: self.tasks_json,
            dry_run: self.dry_run,
        };

        config.validate()?;
        Ok(config)
    }
}
