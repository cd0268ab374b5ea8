//! Basic example of using log-gantt as a library
//!
//! Reads the sample files under `./data` and writes the chart next to them.

use log_gantt::{Config, Pipeline};

fn main() -> anyhow::Result<()> {
    let config = Config::builder()
        .input("data/17357.ngp.cli-output.txt")
        .output("data/ganta_chart.png")
        .stages_file("data/stages.tsv")
        .begin_file("data/begin.tsv")
        .finish_file("data/finish.tsv")
        .build()?;

    let stats = Pipeline::new(config)?.run()?;

    stats.print_summary();

    println!(
        "\n✓ Drew {} tasks from {} records ({} incomplete stages skipped)",
        stats.tasks, stats.records, stats.incomplete
    );

    Ok(())
}
