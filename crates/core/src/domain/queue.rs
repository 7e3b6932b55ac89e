// Queue Ordering Policy
//
// Pure functions over the set of active (queued/printing) jobs for one
// machine. The ordering is recomputed on every query; nothing is cached or
// incrementally maintained.

use crate::domain::job::{JobId, PrintJob};

/// Order jobs by priority tier (urgent first), then creation time (FIFO
/// within a tier). The sort is stable, so full ties keep the iteration
/// order the store returned.
pub fn order_queue(mut jobs: Vec<PrintJob>) -> Vec<PrintJob> {
    jobs.sort_by(|a, b| {
        a.priority
            .as_i32()
            .cmp(&b.priority.as_i32())
            .then(a.created_at.cmp(&b.created_at))
    });
    jobs
}

/// 1-based rank of a job within its machine's ordered queue
pub fn queue_position(ordered: &[PrintJob], job_id: &JobId) -> Option<usize> {
    ordered.iter().position(|j| &j.id == job_id).map(|i| i + 1)
}
