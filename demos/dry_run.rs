//! Dry run example
//!
//! Scans the log and assembles tasks without writing the chart. Messages are
//! collected in memory instead of going to `tracing`.

use log_gantt::{CollectingObserver, Config, Level, Observer, Pipeline};
use std::sync::Arc;

struct Shared(Arc<CollectingObserver>);

impl Observer for Shared {
    fn info(&self, message: &str) {
        self.0.info(message);
    }

    fn error(&self, message: &str) {
        self.0.error(message);
    }
}

fn main() -> anyhow::Result<()> {
    let config = Config::builder()
        .input("data/17357.ngp.cli-output.txt")
        .stages_file("data/stages.tsv")
        .begin_file("data/begin.tsv")
        .finish_file("data/finish.tsv")
        .tasks_json("data/tasks.json")
        .dry_run(true)
        .build()?;

    println!("Running in DRY RUN mode - no chart will be written\n");

    let observer = Arc::new(CollectingObserver::new());
    let stats = Pipeline::with_observer(config, Box::new(Shared(Arc::clone(&observer))))?.run()?;

    println!("Would have drawn {} tasks", stats.tasks);
    println!("Tasks written to data/tasks.json");
    println!();
    for (level, message) in observer.messages() {
        let tag = match level {
            Level::Info => "info ",
            Level::Error => "error",
        };
        println!("  [{tag}] {message}");
    }

    Ok(())
}
