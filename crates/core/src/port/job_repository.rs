// Job Repository Port (Interface)

use crate::domain::{JobId, JobStatus, PrintJob};
use crate::error::Result;
use async_trait::async_trait;

/// Repository interface for PrintJob persistence
#[async_trait]
pub trait JobRepository: Send + Sync {
    /// Insert a new job
    async fn insert(&self, job: &PrintJob) -> Result<()>;

    /// Find job by ID
    async fn find_by_id(&self, id: &JobId) -> Result<Option<PrintJob>>;

    /// Update a job record in full
    async fn update(&self, job: &PrintJob) -> Result<()>;

    /// All active (queued/printing) jobs for a machine, in queue order
    /// (priority ascending, then creation time). Recomputed per call.
    async fn active_for_machine(&self, machine_key: &str) -> Result<Vec<PrintJob>>;

    /// Attach a payment order id to a job
    async fn set_order_id(&self, id: &JobId, order_id: &str, now_millis: i64) -> Result<()>;

    /// Record a verified payment. Only flips a job whose payment status is
    /// still pending; returns false when the job was already paid, which is
    /// what makes repeated verification idempotent.
    async fn mark_paid(&self, id: &JobId, payment_id: &str, now_millis: i64) -> Result<bool>;

    /// Count jobs by status across all machines
    async fn count_by_status(&self, status: JobStatus) -> Result<i64>;
}
