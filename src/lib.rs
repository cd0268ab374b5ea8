//! # log-gantt
//!
//! Turns a timestamped log into a Gantt-chart image.
//!
//! ## Quick Start
//!
//! ```no_run
//! use log_gantt::{Config, Pipeline};
//!
//! # fn main() -> anyhow::Result<()> {
//! let config = Config::builder()
//!     .input("build.log")
//!     .output("build.png")
//!     .stages_file("stages.tsv")
//!     .begin_file("begin.tsv")
//!     .finish_file("finish.tsv")
//!     .build()?;
//!
//! Pipeline::new(config)?.run()?;
//! # Ok(())
//! # }
//! ```
//!
//! ## Architecture
//!
//! 1. **Lexicons**: stage names and begin/finish keywords, one per line
//! 2. **Scanner**: classifies timestamped log lines into start/end records
//! 3. **Assembler**: pairs the first start and first end of each stage
//! 4. **Chart**: draws one bar per task and saves the image

#![warn(
    missing_docs,
    rust_2018_idioms,
    unreachable_pub,
    clippy::all,
    clippy::pedantic,
    clippy::nursery
)]
#![allow(
    clippy::module_name_repetitions,
    clippy::cast_possible_truncation,
    clippy::cast_precision_loss,
    clippy::cast_sign_loss
)]

mod assembler;
mod chart;
mod config;
mod error;
mod glyph;
mod lexicon;
mod observer;
mod pipeline;
mod record;
mod scanner;

pub use assembler::{assemble, Assembly, IncompleteStage};
pub use chart::{ChartLayout, ChartOptions, ChartRenderer, Rect, PALETTE};
pub use config::{
    Config, ConfigBuilder, DEFAULT_BEGIN, DEFAULT_FINISH, DEFAULT_INPUT, DEFAULT_OUTPUT,
    DEFAULT_STAGES, DEFAULT_TIMESTAMP_FORMAT, DEFAULT_TIMESTAMP_REGEX,
};
pub use error::{Error, Result};
pub use lexicon::{read_lexicon, Lexicons};
pub use observer::{CollectingObserver, Level, Observer, TracingObserver};
pub use pipeline::{Pipeline, PipelineStats};
pub use record::{LogRecord, Status, Task};
pub use scanner::{ScanStats, Scanner};

/// Runs the complete conversion with the given configuration.
///
/// # Errors
///
/// Returns an error if:
/// - Configuration is invalid
/// - A lexicon or the log file cannot be read
/// - A timestamp cannot be parsed
/// - The chart cannot be written
///
/// # Examples
///
/// ```no_run
/// use log_gantt::{Config, run};
///
/// # fn main() -> anyhow::Result<()> {
/// let stats = run(Config::builder().build()?)?;
/// println!("{} tasks", stats.tasks);
/// # Ok(())
/// # }
/// ```
pub fn run(config: Config) -> Result<PipelineStats> {
    Pipeline::new(config)?.run()
}
