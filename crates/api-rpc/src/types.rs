//! RPC Request/Response Types
//!
//! Defines the JSON-RPC method parameters and results.

use printvend_core::application::MachineEvent;
use printvend_core::domain::{Machine, PrintJob};
use serde::{Deserialize, Serialize};

/// Wire projection of a print job
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JobView {
    pub id: String,
    pub machine_key: String,
    pub user_name: String,
    pub file_url: String,
    pub file_name: String,
    pub total_pages: u32,
    pub pages_spec: String,
    pub pages_count: u32,
    pub priority: i32,
    pub status: String,
    pub cost: f64,
    pub payment_status: String,
    pub order_id: Option<String>,
    pub payment_id: Option<String>,
    pub paid_at: Option<i64>,
    pub error: Option<String>,
    pub created_at: i64,
    pub updated_at: i64,
}

impl From<&PrintJob> for JobView {
    fn from(job: &PrintJob) -> Self {
        Self {
            id: job.id.clone(),
            machine_key: job.machine_key.clone(),
            user_name: job.user_name.clone(),
            file_url: job.file_url.clone(),
            file_name: job.file_name.clone(),
            total_pages: job.total_pages,
            pages_spec: job.pages_spec.clone(),
            pages_count: job.pages_count,
            priority: job.priority.as_i32(),
            status: job.status.to_string(),
            cost: job.cost,
            payment_status: job.payment_status.to_string(),
            order_id: job.order_id.clone(),
            payment_id: job.payment_id.clone(),
            paid_at: job.paid_at,
            error: job.error.clone(),
            created_at: job.created_at,
            updated_at: job.updated_at,
        }
    }
}

/// Wire projection of a machine
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MachineView {
    pub machine_key: String,
    pub name: String,
    pub location: String,
    pub status: String,
    pub rate_per_page: f64,
    pub last_seen_at: i64,
}

impl From<&Machine> for MachineView {
    fn from(machine: &Machine) -> Self {
        Self {
            machine_key: machine.machine_key.clone(),
            name: machine.name.clone(),
            location: machine.location.clone(),
            status: machine.status.to_string(),
            rate_per_page: machine.rate_per_page,
            last_seen_at: machine.last_seen_at,
        }
    }
}

/// job.create.v1 - Create a print job
#[derive(Debug, Deserialize)]
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
    2
}

#[derive(Debug, Clone, Serialize)]
pub struct CreateJobResponse {
    pub job: JobView,
    pub queue_position: usize,
    pub queue_length: usize,
}

/// job.status.v1 - Fetch a job
#[derive(Debug, Deserialize)]
pub struct JobStatusRequest {
    pub job_id: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct JobStatusResponse {
    pub job: JobView,
}

/// job.queue.v1 - Ordered active jobs for a machine
#[derive(Debug, Deserialize)]
pub struct JobQueueRequest {
    pub machine_key: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct JobQueueResponse {
    pub machine_key: String,
    pub queue: Vec<JobView>,
    pub queue_length: usize,
}

/// job.update.v1 - Drive a job status transition (machine console)
#[derive(Debug, Deserialize)]
pub struct UpdateJobRequest {
    pub job_id: String,
    pub status: String,
    pub error: Option<String>,
}

/// payment.order.v1 - Create a gateway order for a job
#[derive(Debug, Deserialize)]
pub struct CreateOrderRequest {
    pub job_id: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct CreateOrderResponse {
    pub job_id: String,
    pub order_id: String,
    pub amount_minor: i64,
    pub currency: String,
}

/// payment.verify.v1 - Verify a signed payment confirmation
#[derive(Debug, Deserialize)]
pub struct VerifyPaymentRequest {
    pub job_id: String,
    pub order_id: String,
    pub payment_id: String,
    pub signature: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct VerifyPaymentResponse {
    pub verified: bool,
    pub job: JobView,
}

/// machine.register.v1 - Register (or re-register) a machine
#[derive(Debug, Deserialize)]
pub struct RegisterMachineRequest {
    pub machine_key: String,
    pub name: String,
    pub location: String,
    pub rate_per_page: Option<f64>,
}

#[derive(Debug, Clone, Serialize)]
pub struct RegisterMachineResponse {
    pub machine: MachineView,
    pub connect_url: String,
}

/// machine.connect.v1 - Open a user session (QR scan flow)
#[derive(Debug, Deserialize)]
pub struct ConnectRequest {
    pub machine_key: String,
    pub user_name: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct ConnectResponse {
    pub session_id: String,
    pub machine: MachineView,
}

/// machine.console.v1 - Bind a machine console session
#[derive(Debug, Deserialize)]
pub struct ConsoleRequest {
    pub machine_key: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct ConsoleResponse {
    pub session_id: String,
    pub machine: MachineView,
}

/// machine.disconnect.v1 - Close a session by id
#[derive(Debug, Deserialize)]
pub struct DisconnectRequest {
    pub session_id: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct DisconnectResponse {
    pub session_id: String,
}

/// machine.status.v1 - Machine projection plus its queue (polling backstop)
#[derive(Debug, Deserialize)]
pub struct MachineStatusRequest {
    pub machine_key: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct MachineStatusResponse {
    pub machine: MachineView,
    pub queue: Vec<JobView>,
    pub queue_length: usize,
}

/// machine.heartbeat.v1 - Console liveness ping
#[derive(Debug, Deserialize)]
pub struct HeartbeatRequest {
    pub machine_key: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct HeartbeatResponse {
    pub machine: MachineView,
}

/// machine.events.v1 - Long-poll for machine events
#[derive(Debug, Deserialize)]
pub struct EventsRequest {
    pub machine_key: String,
    #[serde(default = "default_wait_ms")]
    pub wait_ms: u64,
}

fn default_wait_ms() -> u64 {
    25_000
}

#[derive(Debug, Clone, Serialize)]
pub struct EventsResponse {
    pub machine_key: String,
    pub events: Vec<MachineEvent>,
}

/// admin.stats.v1 - Get system statistics
#[derive(Debug, Deserialize)]
pub struct StatsRequest {
    // No parameters needed
}

#[derive(Debug, Clone, Serialize)]
pub struct StatsResponse {
    pub queued_jobs: i64,
    pub printing_jobs: i64,
    pub completed_jobs: i64,
    pub failed_jobs: i64,
    pub machines_online: i64,
    pub machines_printing: i64,
    pub machines_offline: i64,
    pub uptime_seconds: i64,
}
