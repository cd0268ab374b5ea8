use crate::{
    observer::Observer,
    record::{LogRecord, Status, Task},
};
use chrono::NaiveDateTime;
use std::collections::HashMap;

/// A stage that was seen but lacks a start or an end.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IncompleteStage {
    /// Stage name
    pub stage: String,

    /// First start timestamp, if any
    pub begin: Option<NaiveDateTime>,

    /// First end timestamp, if any
    pub finish: Option<NaiveDateTime>,
}

/// Outcome of pairing records into tasks.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Assembly {
    /// Complete tasks, in order of first appearance of their stage
    pub tasks: Vec<Task>,

    /// Stages dropped for missing a start or an end
    pub incomplete: Vec<IncompleteStage>,
}

#[derive(Debug)]
struct Pending<'a> {
    stage: &'a str,
    begin: Option<NaiveDateTime>,
    finish: Option<NaiveDateTime>,
}

/// Pairs the first start and the first end of every stage.
///
/// Records are consumed once in file order. A stage mentioned in several
/// separate runs of the log is still one task: the earliest start and the
/// earliest end found anywhere win. Stages missing either side are reported
/// through `observer.error` and left out.
pub fn assemble(records: &[LogRecord], observer: &dyn Observer) -> Assembly {
    let mut order: Vec<Pending<'_>> = Vec::new();
    let mut index: HashMap<&str, usize> = HashMap::new();

    for record in records {
        let slot = *index.entry(record.stage.as_str()).or_insert_with(|| {
            order.push(Pending {
                stage: record.stage.as_str(),
                begin: None,
                finish: None,
            });
            order.len() - 1
        });

        let pending = &mut order[slot];
        match record.status {
            Status::Start => {
                pending.begin.get_or_insert(record.timestamp);
            }
            Status::End => {
                pending.finish.get_or_insert(record.timestamp);
            }
        }
    }

    let mut assembly = Assembly::default();
    for pending in order {
        if let (Some(begin), Some(finish)) = (pending.begin, pending.finish) {
            observer.info(&format!("Assembled task {}", pending.stage));
            assembly.tasks.push(Task::new(pending.stage, begin, finish));
        } else {
            observer.error(&format!(
                "Task {} cannot be assembled as whole task! Start date: {} Finish date: {}",
                pending.stage,
                describe(pending.begin),
                describe(pending.finish)
            ));
            assembly.incomplete.push(IncompleteStage {
                stage: pending.stage.to_string(),
                begin: pending.begin,
                finish: pending.finish,
            });
        }
    }

    assembly
}

fn describe(timestamp: Option<NaiveDateTime>) -> String {
    timestamp.map_or_else(|| "None".to_string(), |t| t.to_string())
}
