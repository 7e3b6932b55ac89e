// Print Job Domain Model

use serde::{Deserialize, Serialize};

use crate::domain::error::{DomainError, Result};

/// Job ID (UUID v4)
pub type JobId = String;

/// Job lifecycle status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum JobStatus {
    Queued,
    Printing,
    Completed,
    Failed,
}

impl JobStatus {
    /// Closed transition table. The original service allowed any status to
    /// overwrite any other; here only the print lifecycle is legal:
    /// queued -> printing -> completed | failed, plus queued -> failed for
    /// operator aborts before printing starts. Terminal states are final.
    pub fn can_transition(self, to: JobStatus) -> bool {
        use JobStatus::*;
        matches!(
            (self, to),
            (Queued, Printing) | (Printing, Completed) | (Printing, Failed) | (Queued, Failed)
        )
    }

    /// Terminal statuses admit no further transitions
    pub fn is_terminal(self) -> bool {
        matches!(self, JobStatus::Completed | JobStatus::Failed)
    }

    /// Active jobs occupy a queue slot
    pub fn is_active(self) -> bool {
        matches!(self, JobStatus::Queued | JobStatus::Printing)
    }
}

impl std::fmt::Display for JobStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            JobStatus::Queued => write!(f, "queued"),
            JobStatus::Printing => write!(f, "printing"),
            JobStatus::Completed => write!(f, "completed"),
            JobStatus::Failed => write!(f, "failed"),
        }
    }
}

impl std::str::FromStr for JobStatus {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "queued" => Ok(JobStatus::Queued),
            "printing" => Ok(JobStatus::Printing),
            "completed" => Ok(JobStatus::Completed),
            "failed" => Ok(JobStatus::Failed),
            other => Err(DomainError::ValidationError(format!(
                "Unknown job status: {}",
                other
            ))),
        }
    }
}

/// Payment status is an independent axis from the print lifecycle
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PaymentStatus {
    Pending,
    Paid,
}

impl std::fmt::Display for PaymentStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PaymentStatus::Pending => write!(f, "pending"),
            PaymentStatus::Paid => write!(f, "paid"),
        }
    }
}

/// Priority tier: urgent jobs jump the queue and cost more.
/// Wire format is the numeric tier (1 = urgent, 2 = normal).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "i32", into = "i32")]
pub enum Priority {
    Urgent = 1,
    Normal = 2,
}

impl Priority {
    /// Cost multiplier applied at job creation
    pub fn multiplier(self) -> f64 {
        match self {
            Priority::Urgent => 1.5,
            Priority::Normal => 1.0,
        }
    }

    pub fn as_i32(self) -> i32 {
        self as i32
    }
}

impl TryFrom<i32> for Priority {
    type Error = DomainError;

    fn try_from(value: i32) -> Result<Self> {
        match value {
            1 => Ok(Priority::Urgent),
            2 => Ok(Priority::Normal),
            other => Err(DomainError::InvalidPriority(other)),
        }
    }
}

impl From<Priority> for i32 {
    fn from(p: Priority) -> i32 {
        p.as_i32()
    }
}

/// Print Job Entity
///
/// Cost and pages_count are derived once at creation and never recomputed.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PrintJob {
    pub id: JobId,
    pub machine_key: String,
    pub user_name: String,

    pub file_url: String,
    pub file_name: String,
    pub total_pages: u32,
    pub pages_spec: String,
    pub pages_count: u32,

    pub priority: Priority,
    pub status: JobStatus,
    pub cost: f64,

    pub payment_status: PaymentStatus,
    pub payment_id: Option<String>,
    pub order_id: Option<String>,
    pub paid_at: Option<i64>,

    pub error: Option<String>,

    pub created_at: i64, // epoch ms
    pub updated_at: i64,
}

impl PrintJob {
    /// Create a new queued, unpaid job.
    ///
    /// # Arguments
    ///
    /// * `id` - Unique job ID (injected, not generated)
    /// * `created_at` - Creation timestamp in epoch ms (injected, not system time)
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        id: impl Into<String>,
        created_at: i64,
        machine_key: impl Into<String>,
        user_name: impl Into<String>,
        file_url: impl Into<String>,
        file_name: impl Into<String>,
        total_pages: u32,
        pages_spec: impl Into<String>,
        pages_count: u32,
        priority: Priority,
        cost: f64,
    ) -> Self {
        Self {
            id: id.into(),
            machine_key: machine_key.into(),
            user_name: user_name.into(),
            file_url: file_url.into(),
            file_name: file_name.into(),
            total_pages,
            pages_spec: pages_spec.into(),
            pages_count,
            priority,
            status: JobStatus::Queued,
            cost,
            payment_status: PaymentStatus::Pending,
            payment_id: None,
            order_id: None,
            paid_at: None,
            error: None,
            created_at,
            updated_at: created_at,
        }
    }

    /// Apply a status transition, enforcing the legality table
    pub fn transition(&mut self, to: JobStatus, now_millis: i64) -> Result<()> {
        if !self.status.can_transition(to) {
            return Err(DomainError::InvalidStatusTransition {
                from: self.status.to_string(),
                to: to.to_string(),
            });
        }
        self.status = to;
        self.updated_at = now_millis;
        Ok(())
    }

    /// Transition to Printing
    pub fn begin_printing(&mut self, now_millis: i64) -> Result<()> {
        self.transition(JobStatus::Printing, now_millis)
    }

    /// Transition to Completed
    pub fn complete(&mut self, now_millis: i64) -> Result<()> {
        self.transition(JobStatus::Completed, now_millis)
    }

    /// Transition to Failed, recording the error message
    pub fn fail(&mut self, error: Option<String>, now_millis: i64) -> Result<()> {
        self.transition(JobStatus::Failed, now_millis)?;
        self.error = error;
        Ok(())
    }

    /// Record a verified payment
    pub fn mark_paid(&mut self, payment_id: impl Into<String>, now_millis: i64) {
        self.payment_status = PaymentStatus::Paid;
        self.payment_id = Some(payment_id.into());
        self.paid_at = Some(now_millis);
        self.updated_at = now_millis;
    }
}

impl PrintJob {
    /// Create a test job with deterministic ID and timestamp.
    ///
    /// Uses a simple counter for deterministic test IDs (test-1, test-2, ...).
    /// Timestamps start at 1000 and increment by 1000.
    ///
    /// **Note**: This method should only be used in tests. For production code,
    /// always inject ID and time via providers.
    pub fn new_test(machine_key: impl Into<String>, priority: Priority) -> Self {
        use std::sync::atomic::{AtomicU64, Ordering};
        static TEST_COUNTER: AtomicU64 = AtomicU64::new(1);

        let counter = TEST_COUNTER.fetch_add(1, Ordering::SeqCst);
        let id = format!("test-{}", counter);
        let created_at = (counter * 1000) as i64;

        Self::new(
            id,
            created_at,
            machine_key,
            "Test User",
            "https://files.example/test.pdf",
            "test.pdf",
            10,
            "1-4",
            4,
            priority,
            8.0,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lifecycle_happy_path() {
        let mut job = PrintJob::new_test("M1", Priority::Normal);
        assert_eq!(job.status, JobStatus::Queued);

        job.begin_printing(2000).unwrap();
        assert_eq!(job.status, JobStatus::Printing);

        job.complete(3000).unwrap();
        assert_eq!(job.status, JobStatus::Completed);
        assert_eq!(job.updated_at, 3000);
    }

    #[test]
    fn queued_to_completed_is_rejected() {
        let mut job = PrintJob::new_test("M1", Priority::Normal);
        let err = job.complete(2000).unwrap_err();
        assert!(matches!(err, DomainError::InvalidStatusTransition { .. }));
        assert_eq!(job.status, JobStatus::Queued);
    }

    #[test]
    fn terminal_states_are_final() {
        let mut job = PrintJob::new_test("M1", Priority::Normal);
        job.begin_printing(2000).unwrap();
        job.fail(Some("out of paper".into()), 3000).unwrap();
        assert_eq!(job.status, JobStatus::Failed);
        assert_eq!(job.error.as_deref(), Some("out of paper"));

        assert!(job.begin_printing(4000).is_err());
        assert!(job.complete(4000).is_err());
    }

    #[test]
    fn queued_job_can_be_aborted() {
        let mut job = PrintJob::new_test("M1", Priority::Urgent);
        job.fail(Some("cancelled at kiosk".into()), 2000).unwrap();
        assert_eq!(job.status, JobStatus::Failed);
    }

    #[test]
    fn payment_axis_is_independent() {
        let mut job = PrintJob::new_test("M1", Priority::Normal);
        job.begin_printing(2000).unwrap();

        // A job can be printing while payment is still pending
        assert_eq!(job.payment_status, PaymentStatus::Pending);
        job.mark_paid("pay_123", 2500);
        assert_eq!(job.payment_status, PaymentStatus::Paid);
        assert_eq!(job.status, JobStatus::Printing);
    }

    #[test]
    fn priority_wire_values() {
        assert_eq!(Priority::try_from(1).unwrap(), Priority::Urgent);
        assert_eq!(Priority::try_from(2).unwrap(), Priority::Normal);
        assert!(Priority::try_from(0).is_err());
        assert_eq!(Priority::Urgent.multiplier(), 1.5);
        assert_eq!(Priority::Normal.multiplier(), 1.0);
    }
}
