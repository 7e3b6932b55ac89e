//! RPC Method Handlers
//!
//! Implements the business logic for each JSON-RPC method.

use crate::error::to_rpc_error;
use crate::types::{
    ConnectRequest, ConnectResponse, ConsoleRequest, ConsoleResponse, CreateJobRequest,
    CreateJobResponse, CreateOrderRequest, CreateOrderResponse, DisconnectRequest,
    DisconnectResponse, EventsRequest, EventsResponse, HeartbeatRequest, HeartbeatResponse,
    JobQueueRequest, JobQueueResponse, JobStatusRequest, JobStatusResponse, JobView,
    MachineStatusRequest, MachineStatusResponse, RegisterMachineRequest, RegisterMachineResponse,
    StatsRequest, StatsResponse, UpdateJobRequest, VerifyPaymentRequest, VerifyPaymentResponse,
};
use jsonrpsee::types::ErrorObjectOwned;
use printvend_core::application::jobs as job_app;
use printvend_core::application::{EventHub, JobService, MachineService, PaymentService};
use printvend_core::domain::{JobStatus, MachineStatus};
use printvend_core::error::AppError;
use printvend_core::port::IdProvider;
use std::sync::Arc;
use std::time::Duration;

// Long-poll requests are capped so a stuck client cannot pin a
// connection forever
const MAX_WAIT_MS: u64 = 60_000;

/// RPC Handler with injected dependencies
pub struct RpcHandler {
    jobs: Arc<JobService>,
    machines: Arc<MachineService>,
    payments: Arc<PaymentService>,
    events: Arc<EventHub>,
    id_provider: Arc<dyn IdProvider>,
    start_time: std::time::Instant,
}

impl RpcHandler {
    pub fn new(
        jobs: Arc<JobService>,
        machines: Arc<MachineService>,
        payments: Arc<PaymentService>,
        events: Arc<EventHub>,
        id_provider: Arc<dyn IdProvider>,
    ) -> Self {
        Self {
            jobs,
            machines,
            payments,
            events,
            id_provider,
            start_time: std::time::Instant::now(),
        }
    }

    /// job.create.v1
    pub async fn create_job(
        &self,
        params: CreateJobRequest,
    ) -> Result<CreateJobResponse, ErrorObjectOwned> {
        let req = job_app::CreateJobRequest {
            machine_key: params.machine_key,
            user_name: params.user_name,
            file_url: params.file_url,
            file_name: params.file_name,
            total_pages: params.total_pages,
            pages_spec: params.pages_spec,
            priority: params.priority,
        };

        let created = self.jobs.create_job(req).await.map_err(to_rpc_error)?;

        Ok(CreateJobResponse {
            job: (&created.job).into(),
            queue_position: created.queue_position,
            queue_length: created.queue_length,
        })
    }

    /// job.status.v1
    pub async fn job_status(
        &self,
        params: JobStatusRequest,
    ) -> Result<JobStatusResponse, ErrorObjectOwned> {
        let job = self
            .jobs
            .job_status(&params.job_id)
            .await
            .map_err(to_rpc_error)?;

        Ok(JobStatusResponse { job: (&job).into() })
    }

    /// job.queue.v1
    pub async fn job_queue(
        &self,
        params: JobQueueRequest,
    ) -> Result<JobQueueResponse, ErrorObjectOwned> {
        let queue = self
            .jobs
            .machine_queue(&params.machine_key)
            .await
            .map_err(to_rpc_error)?;

        let queue: Vec<JobView> = queue.iter().map(JobView::from).collect();
        let queue_length = queue.len();

        Ok(JobQueueResponse {
            machine_key: params.machine_key,
            queue,
            queue_length,
        })
    }

    /// job.update.v1
    pub async fn update_job(
        &self,
        params: UpdateJobRequest,
    ) -> Result<JobStatusResponse, ErrorObjectOwned> {
        let status: JobStatus = params.status.parse().map_err(|_| {
            to_rpc_error(AppError::Validation(format!(
                "Unknown job status '{}'",
                params.status
            )))
        })?;

        let job = self
            .jobs
            .update_status(&params.job_id, status, params.error)
            .await
            .map_err(to_rpc_error)?;

        Ok(JobStatusResponse { job: (&job).into() })
    }

    /// payment.order.v1
    pub async fn create_order(
        &self,
        params: CreateOrderRequest,
    ) -> Result<CreateOrderResponse, ErrorObjectOwned> {
        let order = self
            .payments
            .create_order(&params.job_id)
            .await
            .map_err(to_rpc_error)?;

        Ok(CreateOrderResponse {
            job_id: order.job_id,
            order_id: order.order_id,
            amount_minor: order.amount_minor,
            currency: order.currency,
        })
    }

    /// payment.verify.v1
    pub async fn verify_payment(
        &self,
        params: VerifyPaymentRequest,
    ) -> Result<VerifyPaymentResponse, ErrorObjectOwned> {
        let job = self
            .payments
            .verify(
                &params.job_id,
                &params.order_id,
                &params.payment_id,
                &params.signature,
            )
            .await
            .map_err(to_rpc_error)?;

        Ok(VerifyPaymentResponse {
            verified: true,
            job: (&job).into(),
        })
    }

    /// machine.register.v1
    pub async fn register_machine(
        &self,
        params: RegisterMachineRequest,
    ) -> Result<RegisterMachineResponse, ErrorObjectOwned> {
        let registered = self
            .machines
            .register(
                &params.machine_key,
                &params.name,
                &params.location,
                params.rate_per_page,
            )
            .await
            .map_err(to_rpc_error)?;

        Ok(RegisterMachineResponse {
            machine: (&registered.machine).into(),
            connect_url: registered.connect_url,
        })
    }

    /// machine.connect.v1
    pub async fn connect(&self, params: ConnectRequest) -> Result<ConnectResponse, ErrorObjectOwned> {
        let connection = self
            .machines
            .connect(&params.machine_key, &params.user_name)
            .await
            .map_err(to_rpc_error)?;

        Ok(ConnectResponse {
            session_id: connection.session_id,
            machine: (&connection.machine).into(),
        })
    }

    /// machine.console.v1
    pub async fn console(&self, params: ConsoleRequest) -> Result<ConsoleResponse, ErrorObjectOwned> {
        let session_id = self.id_provider.generate_id();
        let machine = self
            .machines
            .register_console(&params.machine_key, &session_id)
            .await
            .map_err(to_rpc_error)?;

        Ok(ConsoleResponse {
            session_id,
            machine: (&machine).into(),
        })
    }

    /// machine.disconnect.v1
    pub async fn disconnect(
        &self,
        params: DisconnectRequest,
    ) -> Result<DisconnectResponse, ErrorObjectOwned> {
        self.machines
            .disconnect(&params.session_id)
            .await
            .map_err(to_rpc_error)?;

        Ok(DisconnectResponse {
            session_id: params.session_id,
        })
    }

    /// machine.status.v1
    pub async fn machine_status(
        &self,
        params: MachineStatusRequest,
    ) -> Result<MachineStatusResponse, ErrorObjectOwned> {
        let machine = self
            .machines
            .status(&params.machine_key)
            .await
            .map_err(to_rpc_error)?;

        let queue = self
            .jobs
            .machine_queue(&params.machine_key)
            .await
            .map_err(to_rpc_error)?;

        let queue: Vec<JobView> = queue.iter().map(JobView::from).collect();
        let queue_length = queue.len();

        Ok(MachineStatusResponse {
            machine: (&machine).into(),
            queue,
            queue_length,
        })
    }

    /// machine.heartbeat.v1
    pub async fn heartbeat(
        &self,
        params: HeartbeatRequest,
    ) -> Result<HeartbeatResponse, ErrorObjectOwned> {
        let machine = self
            .machines
            .heartbeat(&params.machine_key)
            .await
            .map_err(to_rpc_error)?;

        Ok(HeartbeatResponse {
            machine: (&machine).into(),
        })
    }

    /// machine.events.v1
    ///
    /// Long-poll: blocks until at least one event arrives on the machine's
    /// channel or the wait expires, whichever comes first. Events published
    /// between polls are not replayed; machine.status.v1 is the backstop.
    pub async fn events(&self, params: EventsRequest) -> Result<EventsResponse, ErrorObjectOwned> {
        // Unknown machines get an error, not an eternally-silent channel
        self.machines
            .status(&params.machine_key)
            .await
            .map_err(to_rpc_error)?;

        let wait = Duration::from_millis(params.wait_ms.min(MAX_WAIT_MS));
        let mut rx = self.events.subscribe(&params.machine_key);

        let mut events = Vec::new();
        if let Ok(Ok(event)) = tokio::time::timeout(wait, rx.recv()).await {
            events.push(event);
            // Drain whatever else is already buffered
            while let Ok(event) = rx.try_recv() {
                events.push(event);
            }
        }

        Ok(EventsResponse {
            machine_key: params.machine_key,
            events,
        })
    }

    /// admin.stats.v1
    pub async fn stats(&self, _params: StatsRequest) -> Result<StatsResponse, ErrorObjectOwned> {
        let queued = self
            .jobs
            .count_by_status(JobStatus::Queued)
            .await
            .map_err(to_rpc_error)?;
        let printing = self
            .jobs
            .count_by_status(JobStatus::Printing)
            .await
            .map_err(to_rpc_error)?;
        let completed = self
            .jobs
            .count_by_status(JobStatus::Completed)
            .await
            .map_err(to_rpc_error)?;
        let failed = self
            .jobs
            .count_by_status(JobStatus::Failed)
            .await
            .map_err(to_rpc_error)?;

        let machines_online = self
            .machines
            .count_by_status(MachineStatus::Online)
            .await
            .map_err(to_rpc_error)?;
        let machines_printing = self
            .machines
            .count_by_status(MachineStatus::Printing)
            .await
            .map_err(to_rpc_error)?;
        let machines_offline = self
            .machines
            .count_by_status(MachineStatus::Offline)
            .await
            .map_err(to_rpc_error)?;

        Ok(StatsResponse {
            queued_jobs: queued,
            printing_jobs: printing,
            completed_jobs: completed,
            failed_jobs: failed,
            machines_online,
            machines_printing,
            machines_offline,
            uptime_seconds: self.start_time.elapsed().as_secs() as i64,
        })
    }
}
