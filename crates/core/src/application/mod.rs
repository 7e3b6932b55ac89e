// Application Layer - Use Cases and Services

pub mod events;
pub mod jobs;
pub mod machines;
pub mod payment;
pub mod session;
pub mod shutdown;
pub mod sweeper;

// Re-exports
pub use events::{EventHub, JobProjection, MachineEvent};
pub use jobs::{CreateJobRequest, CreatedJob, JobService};
pub use machines::{MachineService, RegisteredMachine};
pub use payment::PaymentService;
pub use session::{SessionBinding, SessionRegistry};
pub use shutdown::{shutdown_channel, ShutdownSender, ShutdownToken};
pub use sweeper::OfflineSweeper;
