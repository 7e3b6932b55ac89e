//! Printvend Client Implementation

use crate::error::{Result, SdkError};
use crate::types::{
    ConnectResponse, ConsoleResponse, CreateJobRequest, CreateJobResponse, EventsResponse,
    HeartbeatResponse, JobResponse, MachineStatusResponse, OrderResponse, QueueResponse,
    RegisterResponse, StatsResponse, VerifyResponse,
};
use jsonrpsee::core::client::ClientT;
use jsonrpsee::core::traits::ToRpcParams;
use jsonrpsee::http_client::{HttpClient, HttpClientBuilder};
use serde::Serialize;
use serde_json::json;
use std::time::Duration;

/// Named-object params wrapper. The daemon parses each request as a JSON
/// object, so params go over the wire as the object itself rather than a
/// positional array.
struct ObjectOf<T>(T);

impl<T: Serialize> ToRpcParams for ObjectOf<T> {
    fn to_rpc_params(self) -> std::result::Result<Option<Box<serde_json::value::RawValue>>, serde_json::Error> {
        serde_json::value::to_raw_value(&self.0).map(Some)
    }
}

/// Printvend daemon client
///
/// # Example
///
/// ```no_run
/// use printvend_sdk::PrintvendClient;
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let client = PrintvendClient::connect("http://127.0.0.1:9631").await?;
/// let stats = client.stats().await?;
/// println!("{} jobs queued", stats.queued_jobs);
/// # Ok(())
/// # }
/// ```
pub struct PrintvendClient {
    client: HttpClient,
}

impl PrintvendClient {
    /// Connect to the Printvend daemon
    ///
    /// The request timeout is generous because machine.events.v1 long-polls.
    pub async fn connect(url: impl AsRef<str>) -> Result<Self> {
        let client = HttpClientBuilder::default()
            .request_timeout(Duration::from_secs(90))
            .build(url.as_ref())
            .map_err(|e| SdkError::Connection(format!("Failed to create client: {}", e)))?;

        Ok(Self { client })
    }

    /// Create a print job
    pub async fn create_job(&self, request: CreateJobRequest) -> Result<CreateJobResponse> {
        Ok(self
            .client
            .request("job.create.v1", ObjectOf(request))
            .await?)
    }

    /// Fetch a job by id
    pub async fn job_status(&self, job_id: impl AsRef<str>) -> Result<JobResponse> {
        Ok(self
            .client
            .request("job.status.v1", ObjectOf(json!({ "job_id": job_id.as_ref() })))
            .await?)
    }

    /// Ordered active jobs for a machine
    pub async fn job_queue(&self, machine_key: impl AsRef<str>) -> Result<QueueResponse> {
        Ok(self
            .client
            .request(
                "job.queue.v1",
                ObjectOf(json!({ "machine_key": machine_key.as_ref() })),
            )
            .await?)
    }

    /// Drive a job status transition (machine console)
    pub async fn update_job(
        &self,
        job_id: impl AsRef<str>,
        status: impl AsRef<str>,
        error: Option<String>,
    ) -> Result<JobResponse> {
        Ok(self
            .client
            .request(
                "job.update.v1",
                ObjectOf(json!({
                    "job_id": job_id.as_ref(),
                    "status": status.as_ref(),
                    "error": error,
                })),
            )
            .await?)
    }

    /// Create a payment order for a job
    pub async fn create_order(&self, job_id: impl AsRef<str>) -> Result<OrderResponse> {
        Ok(self
            .client
            .request(
                "payment.order.v1",
                ObjectOf(json!({ "job_id": job_id.as_ref() })),
            )
            .await?)
    }

    /// Verify a signed payment confirmation
    pub async fn verify_payment(
        &self,
        job_id: impl AsRef<str>,
        order_id: impl AsRef<str>,
        payment_id: impl AsRef<str>,
        signature: impl AsRef<str>,
    ) -> Result<VerifyResponse> {
        Ok(self
            .client
            .request(
                "payment.verify.v1",
                ObjectOf(json!({
                    "job_id": job_id.as_ref(),
                    "order_id": order_id.as_ref(),
                    "payment_id": payment_id.as_ref(),
                    "signature": signature.as_ref(),
                })),
            )
            .await?)
    }

    /// Register (or re-register) a machine
    pub async fn register_machine(
        &self,
        machine_key: impl AsRef<str>,
        name: impl AsRef<str>,
        location: impl AsRef<str>,
        rate_per_page: Option<f64>,
    ) -> Result<RegisterResponse> {
        Ok(self
            .client
            .request(
                "machine.register.v1",
                ObjectOf(json!({
                    "machine_key": machine_key.as_ref(),
                    "name": name.as_ref(),
                    "location": location.as_ref(),
                    "rate_per_page": rate_per_page,
                })),
            )
            .await?)
    }

    /// Open a user session against an online machine
    pub async fn connect_machine(
        &self,
        machine_key: impl AsRef<str>,
        user_name: impl AsRef<str>,
    ) -> Result<ConnectResponse> {
        Ok(self
            .client
            .request(
                "machine.connect.v1",
                ObjectOf(json!({
                    "machine_key": machine_key.as_ref(),
                    "user_name": user_name.as_ref(),
                })),
            )
            .await?)
    }

    /// Bind a machine console session
    pub async fn console(&self, machine_key: impl AsRef<str>) -> Result<ConsoleResponse> {
        Ok(self
            .client
            .request(
                "machine.console.v1",
                ObjectOf(json!({ "machine_key": machine_key.as_ref() })),
            )
            .await?)
    }

    /// Close a session by id
    pub async fn disconnect(&self, session_id: impl AsRef<str>) -> Result<()> {
        let _: serde_json::Value = self
            .client
            .request(
                "machine.disconnect.v1",
                ObjectOf(json!({ "session_id": session_id.as_ref() })),
            )
            .await?;
        Ok(())
    }

    /// Machine projection plus its queue (polling backstop)
    pub async fn machine_status(
        &self,
        machine_key: impl AsRef<str>,
    ) -> Result<MachineStatusResponse> {
        Ok(self
            .client
            .request(
                "machine.status.v1",
                ObjectOf(json!({ "machine_key": machine_key.as_ref() })),
            )
            .await?)
    }

    /// Console liveness ping
    pub async fn heartbeat(&self, machine_key: impl AsRef<str>) -> Result<HeartbeatResponse> {
        Ok(self
            .client
            .request(
                "machine.heartbeat.v1",
                ObjectOf(json!({ "machine_key": machine_key.as_ref() })),
            )
            .await?)
    }

    /// Long-poll for machine events; returns an empty list on timeout
    pub async fn poll_events(
        &self,
        machine_key: impl AsRef<str>,
        wait_ms: Option<u64>,
    ) -> Result<EventsResponse> {
        Ok(self
            .client
            .request(
                "machine.events.v1",
                ObjectOf(json!({
                    "machine_key": machine_key.as_ref(),
                    "wait_ms": wait_ms.unwrap_or(25_000),
                })),
            )
            .await?)
    }

    /// System statistics
    pub async fn stats(&self) -> Result<StatsResponse> {
        Ok(self
            .client
            .request("admin.stats.v1", ObjectOf(json!({})))
            .await?)
    }
}
