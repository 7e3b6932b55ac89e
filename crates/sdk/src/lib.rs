//! Printvend SDK - Rust Client Library
//!
//! Provides a convenient client for talking to the Printvend daemon: job
//! creation, queue queries, payment, machine lifecycle, and the long-poll
//! event feed.
//!
//! # Example
//!
//! ```no_run
//! use printvend_sdk::{CreateJobRequest, PrintvendClient};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let client = PrintvendClient::connect("http://127.0.0.1:9631").await?;
//!
//!     let created = client.create_job(CreateJobRequest {
//!         machine_key: "LIB-2F".to_string(),
//!         user_name: "alice".to_string(),
//!         file_url: "https://files.example/report.pdf".to_string(),
//!         file_name: "report.pdf".to_string(),
//!         total_pages: 12,
//!         pages_spec: "1-3,7".to_string(),
//!         priority: 2,
//!     }).await?;
//!
//!     println!("Job {} at position {}", created.job.id, created.queue_position);
//!
//!     Ok(())
//! }
//! ```

mod client;
mod error;
mod types;

pub use client::PrintvendClient;
pub use error::{Result, SdkError};
pub use types::{
    ConnectResponse, ConsoleResponse, CreateJobRequest, CreateJobResponse, EventsResponse,
    HeartbeatResponse, Job, JobResponse, Machine, MachineStatusResponse, OrderResponse,
    QueueResponse, RegisterResponse, StatsResponse, VerifyResponse,
};
