//! One sync cycle: every task, concurrently

use std::sync::Arc;

use futures::future::join_all;
use skysync_domain::CycleReport;
use tracing::{info, warn};

use super::ports::SyncTask;

/// Run every task concurrently and wait for all of them.
///
/// Outcomes are reported in task order.
pub async fn run_cycle(tasks: &[Arc<dyn SyncTask>]) -> CycleReport {
    let outcomes = join_all(tasks.iter().map(|task| async move {
        let outcome = task.run().await;
        (task.name().to_string(), outcome)
    }))
    .await;

    let report = CycleReport { outcomes };
    if report.all_succeeded() {
        info!(tasks = tasks.len(), "Sync cycle completed");
    } else {
        warn!(failed = ?report.failed_tasks(), "Sync cycle had failing tasks");
    }
    report
}
