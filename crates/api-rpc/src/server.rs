//! JSON-RPC Server
//!
//! Exposes the job, payment, and machine services over JSON-RPC 2.0.

use crate::handler::RpcHandler;
use crate::types::{
    ConnectRequest, ConsoleRequest, CreateJobRequest, CreateOrderRequest, DisconnectRequest,
    EventsRequest, HeartbeatRequest, JobQueueRequest, JobStatusRequest, MachineStatusRequest,
    RegisterMachineRequest, StatsRequest, UpdateJobRequest, VerifyPaymentRequest,
};
use jsonrpsee::server::{Server, ServerHandle};
use jsonrpsee::RpcModule;
use printvend_core::application::{EventHub, JobService, MachineService, PaymentService};
use printvend_core::port::IdProvider;
use std::net::SocketAddr;
use std::sync::Arc;
use tracing::info;

// TCP on localhost by default; kiosks and phones reach the daemon through
// the reverse proxy in front of it, never this bind directly.
const DEFAULT_RPC_HOST: &str = "127.0.0.1";
const DEFAULT_RPC_PORT: u16 = 9631;

/// RPC Server Configuration
pub struct RpcServerConfig {
    pub host: String,
    pub port: u16,
}

impl Default for RpcServerConfig {
    fn default() -> Self {
        Self {
            host: DEFAULT_RPC_HOST.to_string(),
            port: DEFAULT_RPC_PORT,
        }
    }
}

/// RPC Server
pub struct RpcServer {
    config: RpcServerConfig,
    handler: Arc<RpcHandler>,
}

impl RpcServer {
    pub fn new(
        config: RpcServerConfig,
        jobs: Arc<JobService>,
        machines: Arc<MachineService>,
        payments: Arc<PaymentService>,
        events: Arc<EventHub>,
        id_provider: Arc<dyn IdProvider>,
    ) -> Self {
        Self {
            config,
            handler: Arc::new(RpcHandler::new(jobs, machines, payments, events, id_provider)),
        }
    }

    /// Start the JSON-RPC server, returning its handle and bound address
    pub async fn start(self) -> Result<(ServerHandle, SocketAddr), String> {
        let addr = format!("{}:{}", self.config.host, self.config.port);

        info!(
            host = %self.config.host,
            port = %self.config.port,
            "Starting JSON-RPC server"
        );

        let server = Server::builder()
            .build(&addr)
            .await
            .map_err(|e| format!("Failed to build server on {}: {}", addr, e))?;

        let local_addr = server
            .local_addr()
            .map_err(|e| format!("Failed to read bound address: {}", e))?;

        let mut module = RpcModule::new(());

        // Job methods
        let handler = self.handler.clone();
        module
            .register_async_method("job.create.v1", move |params, _, _| {
                let handler = handler.clone();
                async move {
                    let req: CreateJobRequest = params.parse()?;
                    handler.create_job(req).await
                }
            })
            .map_err(|e| e.to_string())?;

        let handler = self.handler.clone();
        module
            .register_async_method("job.status.v1", move |params, _, _| {
                let handler = handler.clone();
                async move {
                    let req: JobStatusRequest = params.parse()?;
                    handler.job_status(req).await
                }
            })
            .map_err(|e| e.to_string())?;

        let handler = self.handler.clone();
        module
            .register_async_method("job.queue.v1", move |params, _, _| {
                let handler = handler.clone();
                async move {
                    let req: JobQueueRequest = params.parse()?;
                    handler.job_queue(req).await
                }
            })
            .map_err(|e| e.to_string())?;

        let handler = self.handler.clone();
        module
            .register_async_method("job.update.v1", move |params, _, _| {
                let handler = handler.clone();
                async move {
                    let req: UpdateJobRequest = params.parse()?;
                    handler.update_job(req).await
                }
            })
            .map_err(|e| e.to_string())?;

        // Payment methods
        let handler = self.handler.clone();
        module
            .register_async_method("payment.order.v1", move |params, _, _| {
                let handler = handler.clone();
                async move {
                    let req: CreateOrderRequest = params.parse()?;
                    handler.create_order(req).await
                }
            })
            .map_err(|e| e.to_string())?;

        let handler = self.handler.clone();
        module
            .register_async_method("payment.verify.v1", move |params, _, _| {
                let handler = handler.clone();
                async move {
                    let req: VerifyPaymentRequest = params.parse()?;
                    handler.verify_payment(req).await
                }
            })
            .map_err(|e| e.to_string())?;

        // Machine methods
        let handler = self.handler.clone();
        module
            .register_async_method("machine.register.v1", move |params, _, _| {
                let handler = handler.clone();
                async move {
                    let req: RegisterMachineRequest = params.parse()?;
                    handler.register_machine(req).await
                }
            })
            .map_err(|e| e.to_string())?;

        let handler = self.handler.clone();
        module
            .register_async_method("machine.connect.v1", move |params, _, _| {
                let handler = handler.clone();
                async move {
                    let req: ConnectRequest = params.parse()?;
                    handler.connect(req).await
                }
            })
            .map_err(|e| e.to_string())?;

        let handler = self.handler.clone();
        module
            .register_async_method("machine.console.v1", move |params, _, _| {
                let handler = handler.clone();
                async move {
                    let req: ConsoleRequest = params.parse()?;
                    handler.console(req).await
                }
            })
            .map_err(|e| e.to_string())?;

        let handler = self.handler.clone();
        module
            .register_async_method("machine.disconnect.v1", move |params, _, _| {
                let handler = handler.clone();
                async move {
                    let req: DisconnectRequest = params.parse()?;
                    handler.disconnect(req).await
                }
            })
            .map_err(|e| e.to_string())?;

        let handler = self.handler.clone();
        module
            .register_async_method("machine.status.v1", move |params, _, _| {
                let handler = handler.clone();
                async move {
                    let req: MachineStatusRequest = params.parse()?;
                    handler.machine_status(req).await
                }
            })
            .map_err(|e| e.to_string())?;

        let handler = self.handler.clone();
        module
            .register_async_method("machine.heartbeat.v1", move |params, _, _| {
                let handler = handler.clone();
                async move {
                    let req: HeartbeatRequest = params.parse()?;
                    handler.heartbeat(req).await
                }
            })
            .map_err(|e| e.to_string())?;

        let handler = self.handler.clone();
        module
            .register_async_method("machine.events.v1", move |params, _, _| {
                let handler = handler.clone();
                async move {
                    let req: EventsRequest = params.parse()?;
                    handler.events(req).await
                }
            })
            .map_err(|e| e.to_string())?;

        // Admin APIs
        let handler = self.handler.clone();
        module
            .register_async_method("admin.stats.v1", move |params, _, _| {
                let handler = handler.clone();
                async move {
                    let req: StatsRequest = params.parse()?;
                    handler.stats(req).await
                }
            })
            .map_err(|e| e.to_string())?;

        info!("JSON-RPC server started successfully");

        let handle = server.start(module);
        Ok((handle, local_addr))
    }
}
