// Port Layer - Interfaces for external dependencies

pub mod id_provider;
pub mod job_repository;
pub mod machine_repository;
pub mod payment_gateway;
pub mod time_provider;

// Re-exports
pub use id_provider::IdProvider;
pub use job_repository::JobRepository;
pub use machine_repository::MachineRepository;
pub use payment_gateway::{GatewayOrder, OrderRequest, PaymentGateway};
pub use time_provider::TimeProvider;
