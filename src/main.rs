use anyhow::Context;
use clap::Parser;
use log_gantt::{
    Config, Pipeline, DEFAULT_BEGIN, DEFAULT_FINISH, DEFAULT_INPUT, DEFAULT_OUTPUT,
    DEFAULT_STAGES, DEFAULT_TIMESTAMP_FORMAT, DEFAULT_TIMESTAMP_REGEX,
};
use std::path::PathBuf;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

#[derive(Parser, Debug)]
#[command(
    name = "log-gantt",
    version,
    author,
    about = "Draw a Gantt chart from a timestamped log",
    long_about = "Draw a Gantt chart from a timestamped log.\n\n\
    Each log line that starts with a timestamp, names a known stage and carries a \
    begin or finish keyword marks the start or end of that stage. The first start \
    and the first end of every stage become one bar of the chart.\n\n\
    USAGE EXAMPLES:\n  \
      # Use the files under ./data\n  \
      log-gantt\n\n  \
      # Explicit files\n  \
      log-gantt -i build.log -o build.png -s stages.txt -b begin.txt -f finish.txt\n\n  \
      # ISO timestamps\n  \
      log-gantt --timestamp-regex '^\\d{4}-\\d{2}-\\d{2}T\\d{2}:\\d{2}:\\d{2}' \
      --timestamp-format '%Y-%m-%dT%H:%M:%S'"
)]
struct Cli {
    /// Log file to scan
    #[arg(short, long, default_value = DEFAULT_INPUT, value_name = "FILE")]
    input: PathBuf,

    /// Chart image to write (format follows the extension: png, jpg, bmp)
    #[arg(short, long, default_value = DEFAULT_OUTPUT, value_name = "FILE")]
    output: PathBuf,

    /// Stage names, one per line
    #[arg(short, long, default_value = DEFAULT_STAGES, value_name = "FILE")]
    stages: PathBuf,

    /// Keywords marking a stage start, one per line
    #[arg(short, long, default_value = DEFAULT_BEGIN, value_name = "FILE")]
    begin: PathBuf,

    /// Keywords marking a stage end, one per line
    #[arg(short, long, default_value = DEFAULT_FINISH, value_name = "FILE")]
    finish: PathBuf,

    /// Regular expression locating the timestamp in a line
    #[arg(long, default_value = DEFAULT_TIMESTAMP_REGEX, value_name = "REGEX")]
    timestamp_regex: String,

    /// strftime format of the matched timestamp
    #[arg(long, default_value = DEFAULT_TIMESTAMP_FORMAT, value_name = "FORMAT")]
    timestamp_format: String,

    /// Chart width in pixels
    #[arg(long, default_value_t = 1200)]
    width: u32,

    /// Height of one task row in pixels
    #[arg(long, default_value_t = 28)]
    row_height: u32,

    /// Also write the assembled tasks as JSON
    #[arg(long, value_name = "FILE")]
    tasks_json: Option<PathBuf>,

    /// Dry run (don't write the chart)
    #[arg(long)]
    dry_run: bool,

    /// Verbose output
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    setup_tracing(cli.verbose);

    let mut builder = Config::builder()
        .input(cli.input)
        .output(cli.output)
        .stages_file(cli.stages)
        .begin_file(cli.begin)
        .finish_file(cli.finish)
        .timestamp_regex(cli.timestamp_regex)
        .timestamp_format(cli.timestamp_format)
        .chart_width(cli.width)
        .row_height(cli.row_height)
        .dry_run(cli.dry_run);

    if let Some(path) = cli.tasks_json {
        builder = builder.tasks_json(path);
    }

    let config = builder.build().context("Failed to build configuration")?;

    let stats = Pipeline::new(config)
        .context("Failed to create pipeline")?
        .run()
        .context("Pipeline execution failed")?;

    stats.print_summary();

    Ok(())
}

fn setup_tracing(verbosity: u8) {
    let filter = match verbosity {
        0 => EnvFilter::new("log_gantt=info"),
        1 => EnvFilter::new("log_gantt=debug"),
        _ => EnvFilter::new("log_gantt=trace"),
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_target(false).with_thread_ids(false))
        .init();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_defaults() {
        let cli = Cli::parse_from(["log-gantt"]);

        assert_eq!(cli.input, PathBuf::from("data/17357.ngp.cli-output.txt"));
        assert_eq!(cli.output, PathBuf::from("data/ganta_chart.png"));
        assert_eq!(cli.stages, PathBuf::from("data/stages.tsv"));
        assert_eq!(cli.begin, PathBuf::from("data/begin.tsv"));
        assert_eq!(cli.finish, PathBuf::from("data/finish.tsv"));
        assert_eq!(cli.timestamp_format, "%d-%m-%Y %H:%M:%S");
        assert!(!cli.dry_run);
    }

    #[test]
    fn test_cli_short_flags() {
        let cli = Cli::parse_from([
            "log-gantt", "-i", "in.log", "-o", "out.png", "-s", "s.txt", "-b", "b.txt", "-f",
            "f.txt", "-vv",
        ]);

        assert_eq!(cli.input, PathBuf::from("in.log"));
        assert_eq!(cli.output, PathBuf::from("out.png"));
        assert_eq!(cli.stages, PathBuf::from("s.txt"));
        assert_eq!(cli.begin, PathBuf::from("b.txt"));
        assert_eq!(cli.finish, PathBuf::from("f.txt"));
        assert_eq!(cli.verbose, 2);
    }

    #[test]
    fn test_cli_definition() {
        use clap::CommandFactory;
        Cli::command().debug_assert();
    }
}
