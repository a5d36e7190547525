use serde::Serialize;
use std::collections::HashSet;

use crate::directory::SubscriptionDirectory;
use crate::models::{DeliveryAttemptRecord, Outcome};

/// One entry of the distinct-task index
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TaskRef {
    pub task_id: String,
    /// Subscription of the task's first record in fetch order
    pub subscription_id: String,
}

/// Task entry enriched for display
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TaskSummary {
    pub task_id: String,
    /// Resolved through the directory, "Unknown" on a miss
    pub event_type: String,
}

/// Scan `batch` once, keeping the first-seen subscription of every task.
///
/// Output follows first-seen order.
pub fn distinct_tasks(batch: &[DeliveryAttemptRecord]) -> Vec<TaskRef> {
    let mut seen = HashSet::new();
    batch
        .iter()
        .filter(|record| seen.insert(record.delivery_task_id.as_str()))
        .map(|record| TaskRef {
            task_id: record.delivery_task_id.clone(),
            subscription_id: record.subscription_id.clone(),
        })
        .collect()
}

pub fn summarize(tasks: &[TaskRef], directory: &SubscriptionDirectory) -> Vec<TaskSummary> {
    tasks
        .iter()
        .map(|task| TaskSummary {
            task_id: task.task_id.clone(),
            event_type: directory.event_type(&task.subscription_id).to_string(),
        })
        .collect()
}

/// Attempts of one delivery task, ordered by attempt number
#[derive(Debug, Clone)]
pub struct TaskTimeline<'a> {
    pub task_id: &'a str,
    attempts: Vec<&'a DeliveryAttemptRecord>,
}

impl<'a> TaskTimeline<'a> {
    /// Collect the attempts of `task_id` from `batch`; `None` when it has none
    pub fn from_batch(task_id: &'a str, batch: &'a [DeliveryAttemptRecord]) -> Option<Self> {
        let mut attempts: Vec<&DeliveryAttemptRecord> = batch
            .iter()
            .filter(|r| r.delivery_task_id == task_id)
            .collect();
        if attempts.is_empty() {
            return None;
        }
        attempts.sort_by_key(|r| (r.attempt_number, r.id));
        Some(Self { task_id, attempts })
    }

    /// One timeline per distinct task, in first-seen order
    pub fn all(batch: &'a [DeliveryAttemptRecord]) -> Vec<Self> {
        let mut seen = HashSet::new();
        batch
            .iter()
            .filter(|r| seen.insert(r.delivery_task_id.as_str()))
            .filter_map(|r| Self::from_batch(&r.delivery_task_id, batch))
            .collect()
    }

    pub fn attempts(&self) -> &[&'a DeliveryAttemptRecord] {
        &self.attempts
    }

    pub fn attempt_count(&self) -> usize {
        self.attempts.len()
    }

    pub fn subscription_id(&self) -> &'a str {
        &self.attempts[0].subscription_id
    }

    /// Outcome of the highest-numbered attempt
    pub fn final_outcome(&self) -> Outcome {
        self.attempts[self.attempts.len() - 1].outcome
    }

    /// Whether the task has reached `SUCCESS` or `FAILURE`
    pub fn is_settled(&self) -> bool {
        self.final_outcome().is_terminal()
    }
}
