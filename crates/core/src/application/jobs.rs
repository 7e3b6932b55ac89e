// Job Service - create jobs, query queues, drive status transitions

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::application::events::{EventHub, MachineEvent};
use crate::domain::{
    count_pages, job_cost, order_queue, queue_position, JobId, JobStatus, MachineStatus, PrintJob,
    Priority,
};
use crate::error::{AppError, Result};
use crate::port::{IdProvider, JobRepository, MachineRepository, TimeProvider};

/// Job creation request. `priority` carries the wire tier (1 urgent,
/// 2 normal) and defaults to normal.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateJobRequest {
    pub machine_key: String,
    pub user_name: String,
    pub file_url: String,
    pub file_name: String,
    pub total_pages: u32,
    pub pages_spec: String,
    #[serde(default = "default_priority")]
    pub priority: i32,
}

fn default_priority() -> i32 {
    Priority::Normal.as_i32()
}

/// Created job plus its 1-based position in the machine queue
#[derive(Debug, Clone)]
pub struct CreatedJob {
    pub job: PrintJob,
    pub queue_position: usize,
    pub queue_length: usize,
}

pub struct JobService {
    jobs: Arc<dyn JobRepository>,
    machines: Arc<dyn MachineRepository>,
    id_provider: Arc<dyn IdProvider>,
    time_provider: Arc<dyn TimeProvider>,
    events: Arc<EventHub>,
}

impl JobService {
    pub fn new(
        jobs: Arc<dyn JobRepository>,
        machines: Arc<dyn MachineRepository>,
        id_provider: Arc<dyn IdProvider>,
        time_provider: Arc<dyn TimeProvider>,
        events: Arc<EventHub>,
    ) -> Self {
        Self {
            jobs,
            machines,
            id_provider,
            time_provider,
            events,
        }
    }

    /// Create a job on an online machine.
    ///
    /// Pages and cost are derived here, once; the cost is never recomputed
    /// afterwards even if the machine's rate changes.
    pub async fn create_job(&self, req: CreateJobRequest) -> Result<CreatedJob> {
        validate_request(&req)?;

        let priority = Priority::try_from(req.priority)
            .map_err(|e| AppError::Validation(e.to_string()))?;

        let machine = self
            .machines
            .find_by_key(&req.machine_key)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Machine {} not found", req.machine_key)))?;

        if !machine.is_online() {
            return Err(AppError::Precondition(format!(
                "Machine {} is {}",
                machine.machine_key, machine.status
            )));
        }

        let pages_count = count_pages(&req.pages_spec);
        if pages_count == 0 {
            return Err(AppError::Validation(format!(
                "Page selection '{}' selects no pages",
                req.pages_spec
            )));
        }

        let cost = job_cost(pages_count, machine.rate_per_page, priority);
        let now = self.time_provider.now_millis();

        let job = PrintJob::new(
            self.id_provider.generate_id(),
            now,
            req.machine_key,
            req.user_name,
            req.file_url,
            req.file_name,
            req.total_pages,
            req.pages_spec,
            pages_count,
            priority,
            cost,
        );

        self.jobs.insert(&job).await?;

        // Recompute the queue to place the new job
        let queue = self.machine_queue(&job.machine_key).await?;
        let queue_length = queue.len();
        let queue_position = queue_position(&queue, &job.id).unwrap_or(queue_length);

        info!(
            job_id = %job.id,
            machine_key = %job.machine_key,
            pages = pages_count,
            cost,
            position = queue_position,
            "Job created"
        );

        self.events.publish(
            &job.machine_key,
            MachineEvent::JobCreated { job: (&job).into() },
        );

        Ok(CreatedJob {
            job,
            queue_position,
            queue_length,
        })
    }

    /// Full job projection by id
    pub async fn job_status(&self, job_id: &JobId) -> Result<PrintJob> {
        self.jobs
            .find_by_id(job_id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Job {} not found", job_id)))
    }

    /// Ordered active jobs for a machine. The ordering is recomputed on
    /// every call; the store sorts and the domain policy re-sorts, so a
    /// store that returns unordered rows still yields the right queue.
    pub async fn machine_queue(&self, machine_key: &str) -> Result<Vec<PrintJob>> {
        let jobs = self.jobs.active_for_machine(machine_key).await?;
        Ok(order_queue(jobs))
    }

    /// Apply an explicit status transition and mirror it onto the machine.
    ///
    /// The job write and the machine mirror are two separate writes with no
    /// atomicity between them; a crash in between leaves the machine status
    /// to be corrected by the next transition or the offline sweeper.
    pub async fn update_status(
        &self,
        job_id: &JobId,
        to: JobStatus,
        error: Option<String>,
    ) -> Result<PrintJob> {
        let mut job = self.job_status(job_id).await?;
        let now = self.time_provider.now_millis();

        match to {
            JobStatus::Failed => job.fail(error, now)?,
            _ => job.transition(to, now)?,
        }

        self.jobs.update(&job).await?;

        if let Some(mirror) = machine_mirror(to) {
            match self.machines.find_by_key(&job.machine_key).await? {
                Some(_) => {
                    self.machines
                        .update_status(&job.machine_key, mirror)
                        .await?;
                    self.events.publish(
                        &job.machine_key,
                        MachineEvent::MachineStatusChanged {
                            machine_key: job.machine_key.clone(),
                            status: mirror,
                        },
                    );
                }
                None => {
                    warn!(
                        machine_key = %job.machine_key,
                        job_id = %job.id,
                        "Job references a machine that no longer exists; skipping mirror"
                    );
                }
            }
        }

        info!(job_id = %job.id, status = %job.status, "Job status updated");

        self.events.publish(
            &job.machine_key,
            MachineEvent::JobStatusChanged { job: (&job).into() },
        );

        Ok(job)
    }

    /// Job counts by status (admin stats)
    pub async fn count_by_status(&self, status: JobStatus) -> Result<i64> {
        self.jobs.count_by_status(status).await
    }
}

/// Machine status implied by a job status, if any
fn machine_mirror(status: JobStatus) -> Option<MachineStatus> {
    match status {
        JobStatus::Printing => Some(MachineStatus::Printing),
        JobStatus::Completed | JobStatus::Failed => Some(MachineStatus::Online),
        JobStatus::Queued => None,
    }
}

fn validate_request(req: &CreateJobRequest) -> Result<()> {
    fn required(field: &str, value: &str) -> Result<()> {
        if value.trim().is_empty() {
            return Err(AppError::Validation(format!("{} is required", field)));
        }
        Ok(())
    }

    required("machineKey", &req.machine_key)?;
    required("userName", &req.user_name)?;
    required("fileUrl", &req.file_url)?;
    required("fileName", &req.file_name)?;
    required("pagesToPrint", &req.pages_spec)?;

    if req.total_pages == 0 {
        return Err(AppError::Validation("pageCount must be positive".into()));
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn validation_rejects_missing_fields() {
        let req = CreateJobRequest {
            machine_key: "M1".into(),
            user_name: "".into(),
            file_url: "https://files.example/a.pdf".into(),
            file_name: "a.pdf".into(),
            total_pages: 10,
            pages_spec: "1-3".into(),
            priority: 2,
        };

        let err = validate_request(&req).unwrap_err();
        assert!(err.to_string().contains("userName"));
    }

    #[test]
    fn validation_rejects_zero_page_count() {
        let req = CreateJobRequest {
            machine_key: "M1".into(),
            user_name: "alice".into(),
            file_url: "https://files.example/a.pdf".into(),
            file_name: "a.pdf".into(),
            total_pages: 0,
            pages_spec: "1".into(),
            priority: 2,
        };

        assert!(validate_request(&req).is_err());
    }

    #[test]
    fn mirror_follows_the_print_lifecycle() {
        assert_eq!(
            machine_mirror(JobStatus::Printing),
            Some(MachineStatus::Printing)
        );
        assert_eq!(
            machine_mirror(JobStatus::Completed),
            Some(MachineStatus::Online)
        );
        assert_eq!(
            machine_mirror(JobStatus::Failed),
            Some(MachineStatus::Online)
        );
        assert_eq!(machine_mirror(JobStatus::Queued), None);
    }
}
