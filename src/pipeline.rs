use crate::{
    assembler::{self, Assembly},
    chart::ChartRenderer,
    config::Config,
    error::{Error, Result},
    lexicon::Lexicons,
    observer::{Observer, TracingObserver},
    record::Task,
    scanner::Scanner,
};
use serde::Serialize;
use std::{
    fs,
    path::Path,
    time::{Duration, Instant},
};
use tracing::{debug, info, instrument, warn};

/// Statistics collected during pipeline execution.
#[derive(Debug, Clone, Default, Serialize)]
pub struct PipelineStats {
    /// Number of stage names loaded
    pub stages: usize,

    /// Number of begin keywords loaded
    pub begin_words: usize,

    /// Number of finish keywords loaded
    pub finish_words: usize,

    /// Lines read from the log
    pub lines_scanned: usize,

    /// Start/end records extracted
    pub records: usize,

    /// Tasks drawn on the chart
    pub tasks: usize,

    /// Stages dropped for missing a start or an end
    pub incomplete: usize,

    /// Whether a chart image was written
    pub chart_written: bool,

    /// Total execution time
    pub duration: Duration,

    /// Time spent loading lexicons
    pub load_duration: Duration,

    /// Time spent scanning the log
    pub scan_duration: Duration,

    /// Time spent rendering and writing
    pub render_duration: Duration,
}

impl PipelineStats {
    /// Prints a human-readable summary to stdout.
    pub fn print_summary(&self) {
        println!("\n╔═══════════════════════════════════════════════════════╗");
        println!("║            Gantt Chart Summary                        ║");
        println!("╠═══════════════════════════════════════════════════════╣");
        println!(
            "║ Lexicons:      {:>4} stages, {:>4} begin, {:>4} finish  ║",
            self.stages, self.begin_words, self.finish_words
        );
        println!(
            "║ Lines Scanned:        {:>8}                        ║",
            self.lines_scanned
        );
        println!(
            "║ Records:              {:>8}                        ║",
            self.records
        );
        println!(
            "║ Tasks:                {:>8}                        ║",
            self.tasks
        );
        println!(
            "║ Incomplete Stages:    {:>8}                        ║",
            self.incomplete
        );
        println!("║                                                       ║");
        println!("║ Timing Breakdown:                                     ║");
        println!(
            "║   - Loading:          {:>8.2}s                     ║",
            self.load_duration.as_secs_f64()
        );
        println!(
            "║   - Scanning:         {:>8.2}s                     ║",
            self.scan_duration.as_secs_f64()
        );
        println!(
            "║   - Rendering:        {:>8.2}s                     ║",
            self.render_duration.as_secs_f64()
        );
        println!(
            "║   - Total:            {:>8.2}s                     ║",
            self.duration.as_secs_f64()
        );
        println!("╚═══════════════════════════════════════════════════════╝\n");
    }
}

/// Orchestrates lexicon loading, log scanning, task assembly and rendering.
pub struct Pipeline {
    config: Config,
    scanner: Scanner,
    renderer: ChartRenderer,
    observer: Box<dyn Observer>,
}

impl Pipeline {
    /// Creates a new pipeline that reports through `tracing`.
    ///
    /// # Errors
    ///
    /// Returns an error if configuration validation fails.
    pub fn new(config: Config) -> Result<Self> {
        Self::with_observer(config, Box::new(TracingObserver))
    }

    /// Creates a new pipeline that reports through `observer`.
    ///
    /// # Errors
    ///
    /// Returns an error if configuration validation fails.
    pub fn with_observer(config: Config, observer: Box<dyn Observer>) -> Result<Self> {
        config.validate()?;

        let scanner = Scanner::from_config(&config)?;
        let renderer = ChartRenderer::new(config.chart);

        Ok(Self {
            config,
            scanner,
            renderer,
            observer,
        })
    }

    /// Executes the pipeline and returns statistics.
    ///
    /// # Errors
    ///
    /// Returns an error if a file cannot be read, a timestamp cannot be
    /// parsed, or the chart cannot be written. Incomplete stages are not
    /// errors; they are reported and skipped.
    #[instrument(skip(self), fields(input = %self.config.input.display()))]
    pub fn run(&self) -> Result<PipelineStats> {
        let start_time = Instant::now();
        let mut stats = PipelineStats::default();

        info!("Stage 1/4: Loading lexicons...");
        let load_start = Instant::now();
        let lexicons = Lexicons::load(
            &self.config.stages_file,
            &self.config.begin_file,
            &self.config.finish_file,
            self.observer.as_ref(),
        )?;
        stats.load_duration = load_start.elapsed();
        stats.stages = lexicons.stages.len();
        stats.begin_words = lexicons.begin_words.len();
        stats.finish_words = lexicons.finish_words.len();

        if lexicons.stages.is_empty() {
            warn!(
                "Stage list {} is empty; no line can match",
                self.config.stages_file.display()
            );
        }

        info!("Stage 2/4: Scanning log...");
        let scan_start = Instant::now();
        let (records, scan_stats) =
            self.scanner
                .scan(&self.config.input, &lexicons, self.observer.as_ref())?;
        stats.scan_duration = scan_start.elapsed();
        stats.lines_scanned = scan_stats.lines;
        stats.records = records.len();

        info!("Stage 3/4: Assembling tasks...");
        let Assembly { tasks, incomplete } = assembler::assemble(&records, self.observer.as_ref());
        stats.tasks = tasks.len();
        stats.incomplete = incomplete.len();

        for task in &tasks {
            debug!(
                "  {}: {} -> {} ({}s)",
                task.name,
                task.begin,
                task.finish,
                task.duration().num_seconds()
            );
        }

        if !incomplete.is_empty() {
            warn!("{} stage(s) skipped as incomplete", incomplete.len());
        }

        if let Some(path) = &self.config.tasks_json {
            write_tasks_json(&tasks, path)?;
            info!("✓ Wrote {} tasks to {}", tasks.len(), path.display());
        }

        let render_start = Instant::now();
        if self.config.dry_run {
            warn!("Dry run mode enabled - skipping chart write");
        } else {
            info!("Stage 4/4: Rendering chart...");
            self.renderer.write(&tasks, &self.config.output)?;
            self.observer
                .info(&format!("Chart created in {}", self.config.output.display()));
            stats.chart_written = true;
        }
        stats.render_duration = render_start.elapsed();

        stats.duration = start_time.elapsed();
        info!(
            "✓ Pipeline completed: {} tasks in {:.2}s",
            stats.tasks,
            stats.duration.as_secs_f64()
        );

        Ok(stats)
    }
}

fn write_tasks_json(tasks: &[Task], path: &Path) -> Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent).map_err(|e| Error::io(parent, e))?;
    }

    let json = serde_json::to_string_pretty(tasks)?;
    fs::write(path, json).map_err(|e| Error::io(path, e))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::observer::{CollectingObserver, Level};
    use assert_fs::prelude::*;
    use chrono::NaiveDate;
    use std::sync::Arc;

    /// Lets a test keep a handle on the observer owned by the pipeline.
    struct Shared(Arc<CollectingObserver>);

    impl Observer for Shared {
        fn info(&self, message: &str) {
            self.0.info(message);
        }

        fn error(&self, message: &str) {
            self.0.error(message);
        }
    }

    fn write_lexicons(temp: &assert_fs::TempDir) {
        temp.child("stages.tsv").write_str("Build\nTest\nDeploy\n").unwrap();
        temp.child("begin.tsv").write_str("STARTED\n").unwrap();
        temp.child("finish.tsv").write_str("DONE\n").unwrap();
    }

    fn config_for(temp: &assert_fs::TempDir) -> Config {
        Config::builder()
            .input(temp.path().join("build.log"))
            .output(temp.path().join("out").join("gantt.png"))
            .stages_file(temp.path().join("stages.tsv"))
            .begin_file(temp.path().join("begin.tsv"))
            .finish_file(temp.path().join("finish.tsv"))
            .build()
            .unwrap()
    }

    fn run_with_observer(config: Config) -> (Result<PipelineStats>, Arc<CollectingObserver>) {
        let observer = Arc::new(CollectingObserver::new());
        let pipeline =
            Pipeline::with_observer(config, Box::new(Shared(Arc::clone(&observer)))).unwrap();
        (pipeline.run(), observer)
    }

    #[test]
    fn test_pipeline_round_trip() {
        let temp = assert_fs::TempDir::new().unwrap();
        write_lexicons(&temp);
        temp.child("build.log")
            .write_str("01-01-2024 10:00:00 Build STARTED\n01-01-2024 10:05:00 Build DONE\n")
            .unwrap();

        let config = Config {
            tasks_json: Some(temp.path().join("tasks.json")),
            ..config_for(&temp)
        };
        let (result, observer) = run_with_observer(config);
        let stats = result.unwrap();

        assert_eq!(stats.records, 2);
        assert_eq!(stats.tasks, 1);
        assert_eq!(stats.incomplete, 0);
        assert!(stats.chart_written);
        assert!(temp.child("out/gantt.png").path().is_file());

        let json = std::fs::read_to_string(temp.path().join("tasks.json")).unwrap();
        let tasks: serde_json::Value = serde_json::from_str(&json).unwrap();
        assert_eq!(
            tasks,
            serde_json::json!([{
                "name": "Build",
                "begin": "2024-01-01T10:00:00",
                "finish": "2024-01-01T10:05:00"
            }])
        );

        assert!(observer.errors().is_empty());
        let infos = observer.at(Level::Info);
        assert!(infos.iter().any(|m| m == "Assembled task Build"));
        assert!(infos.last().unwrap().starts_with("Chart created in"));
    }

    #[test]
    fn test_pipeline_partial_failure() {
        let temp = assert_fs::TempDir::new().unwrap();
        write_lexicons(&temp);
        temp.child("build.log")
            .write_str(
                "01-01-2024 10:00:00 Build STARTED\n\
                 01-01-2024 10:05:00 Build DONE\n\
                 01-01-2024 10:05:00 Test STARTED\n\
                 01-01-2024 10:06:00 Test still running\n\
                 01-01-2024 10:07:00 Deploy STARTED\n\
                 01-01-2024 10:09:00 Deploy DONE\n",
            )
            .unwrap();

        let (result, observer) = run_with_observer(config_for(&temp));
        let stats = result.unwrap();

        assert_eq!(stats.records, 5);
        assert_eq!(stats.tasks, 2);
        assert_eq!(stats.incomplete, 1);
        let errors = observer.errors();
        assert_eq!(errors.len(), 1);
        assert!(errors[0].starts_with("Task Test cannot be assembled"));
    }

    #[test]
    fn test_pipeline_no_matches_writes_empty_chart() {
        let temp = assert_fs::TempDir::new().unwrap();
        write_lexicons(&temp);
        temp.child("build.log")
            .write_str("nothing relevant\n01-01-2024 10:00:00 unrelated STARTED\n")
            .unwrap();

        let (result, observer) = run_with_observer(config_for(&temp));
        let stats = result.unwrap();

        assert_eq!(stats.tasks, 0);
        assert!(stats.chart_written);
        assert!(temp.child("out/gantt.png").path().is_file());
        assert!(observer.errors().is_empty());
    }

    #[test]
    fn test_pipeline_dry_run() {
        let temp = assert_fs::TempDir::new().unwrap();
        write_lexicons(&temp);
        temp.child("build.log")
            .write_str("01-01-2024 10:00:00 Build STARTED\n01-01-2024 10:05:00 Build DONE\n")
            .unwrap();

        let config = Config {
            dry_run: true,
            ..config_for(&temp)
        };
        let stats = Pipeline::new(config).unwrap().run().unwrap();

        assert_eq!(stats.tasks, 1);
        assert!(!stats.chart_written);
        assert!(!temp.child("out").path().exists());
    }

    #[test]
    fn test_pipeline_missing_log() {
        let temp = assert_fs::TempDir::new().unwrap();
        write_lexicons(&temp);

        let err = Pipeline::new(config_for(&temp)).unwrap().run().unwrap_err();
        assert!(err.is_io());
        assert!(err.to_string().contains("build.log"));
    }

    #[test]
    fn test_pipeline_bad_timestamp_aborts() {
        let temp = assert_fs::TempDir::new().unwrap();
        write_lexicons(&temp);
        temp.child("build.log")
            .write_str("31-02-2024 10:00:00 Build STARTED\n")
            .unwrap();

        let err = Pipeline::new(config_for(&temp)).unwrap().run().unwrap_err();
        assert!(err.is_timestamp());
        assert!(!temp.child("out/gantt.png").path().exists());
    }

    #[test]
    fn test_pipeline_tasks_match_source_lines() {
        let temp = assert_fs::TempDir::new().unwrap();
        write_lexicons(&temp);
        temp.child("build.log")
            .write_str(
                "01-01-2024 09:00:00 Build STARTED\n\
                 01-01-2024 09:10:00 Build DONE\n\
                 01-01-2024 09:10:00 Test STARTED\n\
                 01-01-2024 09:40:00 Test DONE\n\
                 01-01-2024 09:41:00 Deploy STARTED\n\
                 01-01-2024 09:45:00 Deploy DONE\n",
            )
            .unwrap();

        let config = Config {
            tasks_json: Some(temp.path().join("tasks.json")),
            dry_run: true,
            ..config_for(&temp)
        };
        Pipeline::new(config).unwrap().run().unwrap();

        let json = std::fs::read_to_string(temp.path().join("tasks.json")).unwrap();
        let tasks: Vec<serde_json::Value> = serde_json::from_str(&json).unwrap();
        assert_eq!(tasks.len(), 3);

        let day = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap();
        let names: Vec<_> = tasks.iter().map(|t| t["name"].as_str().unwrap()).collect();
        assert_eq!(names, vec!["Build", "Test", "Deploy"]);
        assert_eq!(
            tasks[1]["begin"],
            day.and_hms_opt(9, 10, 0).unwrap().format("%Y-%m-%dT%H:%M:%S").to_string()
        );
        for task in &tasks {
            assert!(task["begin"].as_str().unwrap() <= task["finish"].as_str().unwrap());
        }
    }
}
