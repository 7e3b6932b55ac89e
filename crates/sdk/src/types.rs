//! SDK Request/Response Types
//!
//! Mirrors the JSON-RPC types from the api-rpc crate.

use serde::{Deserialize, Serialize};

/// A print job as the daemon reports it
#[derive(Debug, Clone, Deserialize)]
pub struct Job {
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

/// A machine as the daemon reports it
#[derive(Debug, Clone, Deserialize)]
pub struct Machine {
    pub machine_key: String,
    pub name: String,
    pub location: String,
    pub status: String,
    pub rate_per_page: f64,
    pub last_seen_at: i64,
}

/// Request to create a print job
#[derive(Debug, Clone, Serialize)]
pub struct CreateJobRequest {
    pub machine_key: String,
    pub user_name: String,
    pub file_url: String,
    pub file_name: String,
    pub total_pages: u32,
    pub pages_spec: String,
    pub priority: i32,
}

/// Response from job creation
#[derive(Debug, Clone, Deserialize)]
pub struct CreateJobResponse {
    pub job: Job,
    pub queue_position: usize,
    pub queue_length: usize,
}

/// Response carrying a single job
#[derive(Debug, Clone, Deserialize)]
pub struct JobResponse {
    pub job: Job,
}

/// Response from queue queries
#[derive(Debug, Clone, Deserialize)]
pub struct QueueResponse {
    pub machine_key: String,
    pub queue: Vec<Job>,
    pub queue_length: usize,
}

/// Response from order creation
#[derive(Debug, Clone, Deserialize)]
pub struct OrderResponse {
    pub job_id: String,
    pub order_id: String,
    pub amount_minor: i64,
    pub currency: String,
}

/// Response from payment verification
#[derive(Debug, Clone, Deserialize)]
pub struct VerifyResponse {
    pub verified: bool,
    pub job: Job,
}

/// Response from machine registration
#[derive(Debug, Clone, Deserialize)]
pub struct RegisterResponse {
    pub machine: Machine,
    pub connect_url: String,
}

/// Response from opening a user session
#[derive(Debug, Clone, Deserialize)]
pub struct ConnectResponse {
    pub session_id: String,
    pub machine: Machine,
}

/// Response from binding a console session
#[derive(Debug, Clone, Deserialize)]
pub struct ConsoleResponse {
    pub session_id: String,
    pub machine: Machine,
}

/// Response from machine status queries
#[derive(Debug, Clone, Deserialize)]
pub struct MachineStatusResponse {
    pub machine: Machine,
    pub queue: Vec<Job>,
    pub queue_length: usize,
}

/// Response from heartbeats
#[derive(Debug, Clone, Deserialize)]
pub struct HeartbeatResponse {
    pub machine: Machine,
}

/// Response from the long-poll event endpoint. Events are kept as raw
/// JSON so SDK consumers stay decoupled from the daemon's event enum.
#[derive(Debug, Clone, Deserialize)]
pub struct EventsResponse {
    pub machine_key: String,
    pub events: Vec<serde_json::Value>,
}

/// Response from admin stats
#[derive(Debug, Clone, Deserialize)]
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
