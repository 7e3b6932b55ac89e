// Offline Sweeper - flips machines with stale heartbeats to offline
//
// Transport disconnects already flip a machine offline through the session
// registry; the sweeper catches the consoles that vanished without a clean
// disconnect (power cut, network drop).

use std::sync::Arc;
use std::time::Duration;

use tokio::time::interval;
use tracing::{error, info};

use crate::application::events::{EventHub, MachineEvent};
use crate::application::shutdown::ShutdownToken;
use crate::domain::MachineStatus;
use crate::error::Result;
use crate::port::{MachineRepository, TimeProvider};

pub struct OfflineSweeper {
    machines: Arc<dyn MachineRepository>,
    time_provider: Arc<dyn TimeProvider>,
    events: Arc<EventHub>,
    sweep_interval: Duration,
    offline_after: Duration,
}

impl OfflineSweeper {
    pub fn new(
        machines: Arc<dyn MachineRepository>,
        time_provider: Arc<dyn TimeProvider>,
        events: Arc<EventHub>,
        sweep_interval: Duration,
        offline_after: Duration,
    ) -> Self {
        Self {
            machines,
            time_provider,
            events,
            sweep_interval,
            offline_after,
        }
    }

    /// Run the sweep loop until shutdown. Should be spawned in tokio::spawn.
    pub async fn run(self, mut shutdown: ShutdownToken) {
        info!(
            sweep_interval_s = self.sweep_interval.as_secs(),
            offline_after_s = self.offline_after.as_secs(),
            "Offline sweeper started"
        );

        let mut tick = interval(self.sweep_interval);

        loop {
            tokio::select! {
                _ = tick.tick() => {
                    if let Err(e) = self.sweep_once().await {
                        error!(error = ?e, "Offline sweep failed");
                    }
                }
                _ = shutdown.wait() => {
                    info!("Offline sweeper shutting down");
                    break;
                }
            }
        }
    }

    /// One sweep pass: everything online whose heartbeat predates the
    /// cutoff goes offline, and each flip is broadcast.
    pub async fn sweep_once(&self) -> Result<usize> {
        let cutoff = self.time_provider.now_millis() - self.offline_after.as_millis() as i64;
        let flipped = self.machines.mark_stale_offline(cutoff).await?;

        for machine_key in &flipped {
            info!(machine_key = %machine_key, "Machine heartbeat stale; marked offline");
            self.events.publish(
                machine_key,
                MachineEvent::MachineStatusChanged {
                    machine_key: machine_key.clone(),
                    status: MachineStatus::Offline,
                },
            );
        }

        Ok(flipped.len())
    }
}
