// Domain Layer - Pure business logic and entities

pub mod error;
pub mod job;
pub mod machine;
pub mod pages;
pub mod queue;

// Re-exports
pub use error::DomainError;
pub use job::{JobId, JobStatus, PaymentStatus, PrintJob, Priority};
pub use machine::{Machine, MachineKey, MachineStatus};
pub use pages::{count_pages, job_cost};
pub use queue::{order_queue, queue_position};
