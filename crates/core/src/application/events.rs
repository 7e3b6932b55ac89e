// Event Hub - Per-machine broadcast channels
//
// Best-effort, non-durable fan-out: a disconnected subscriber misses events
// with no replay, and a lagging one drops the oldest. Clients poll
// machine.status.v1 as the correctness backstop; this hub only shaves the
// latency off.

use std::collections::HashMap;
use std::sync::RwLock;

use serde::{Deserialize, Serialize};
use tokio::sync::broadcast;

use crate::domain::{JobStatus, MachineStatus, PaymentStatus, PrintJob, Priority};

const CHANNEL_CAPACITY: usize = 64;

/// The job fields subscribers see (mirrors what the kiosk UIs render)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JobProjection {
    pub id: String,
    pub user_name: String,
    pub file_name: String,
    pub status: JobStatus,
    pub priority: Priority,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    pub created_at: i64,
}

impl From<&PrintJob> for JobProjection {
    fn from(job: &PrintJob) -> Self {
        Self {
            id: job.id.clone(),
            user_name: job.user_name.clone(),
            file_name: job.file_name.clone(),
            status: job.status,
            priority: job.priority,
            error: job.error.clone(),
            created_at: job.created_at,
        }
    }
}

/// Event broadcast on a machine's channel after each mutation
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "event", rename_all = "kebab-case")]
pub enum MachineEvent {
    JobCreated { job: JobProjection },
    JobStatusChanged { job: JobProjection },
    JobPaid { job_id: String, payment_status: PaymentStatus },
    MachineStatusChanged { machine_key: String, status: MachineStatus },
}

/// Lazily-created broadcast channel per machine key
pub struct EventHub {
    channels: RwLock<HashMap<String, broadcast::Sender<MachineEvent>>>,
}

impl EventHub {
    pub fn new() -> Self {
        Self {
            channels: RwLock::new(HashMap::new()),
        }
    }

    /// Subscribe to a machine's channel, creating it if needed
    pub fn subscribe(&self, machine_key: &str) -> broadcast::Receiver<MachineEvent> {
        let mut channels = self.channels.write().expect("event hub lock poisoned");
        channels
            .entry(machine_key.to_string())
            .or_insert_with(|| broadcast::channel(CHANNEL_CAPACITY).0)
            .subscribe()
    }

    /// Publish an event to everyone subscribed to this machine.
    /// A send error just means nobody is listening; that is fine.
    pub fn publish(&self, machine_key: &str, event: MachineEvent) {
        let channels = self.channels.read().expect("event hub lock poisoned");
        if let Some(tx) = channels.get(machine_key) {
            let _ = tx.send(event);
        }
    }

    /// Number of live subscribers on a machine's channel
    pub fn subscriber_count(&self, machine_key: &str) -> usize {
        let channels = self.channels.read().expect("event hub lock poisoned");
        channels
            .get(machine_key)
            .map(|tx| tx.receiver_count())
            .unwrap_or(0)
    }
}

impl Default for EventHub {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn subscribers_receive_published_events() {
        let hub = EventHub::new();
        let mut rx = hub.subscribe("M1");

        hub.publish(
            "M1",
            MachineEvent::MachineStatusChanged {
                machine_key: "M1".to_string(),
                status: MachineStatus::Printing,
            },
        );

        let event = rx.recv().await.unwrap();
        assert!(matches!(
            event,
            MachineEvent::MachineStatusChanged {
                status: MachineStatus::Printing,
                ..
            }
        ));
    }

    #[tokio::test]
    async fn publish_without_subscribers_is_a_no_op() {
        let hub = EventHub::new();
        // No channel exists yet; must not panic
        hub.publish(
            "M2",
            MachineEvent::JobPaid {
                job_id: "j1".to_string(),
                payment_status: PaymentStatus::Paid,
            },
        );
        assert_eq!(hub.subscriber_count("M2"), 0);
    }

    #[tokio::test]
    async fn channels_are_isolated_per_machine() {
        let hub = EventHub::new();
        let mut rx_m1 = hub.subscribe("M1");
        let _rx_m2 = hub.subscribe("M2");

        hub.publish(
            "M2",
            MachineEvent::MachineStatusChanged {
                machine_key: "M2".to_string(),
                status: MachineStatus::Offline,
            },
        );

        assert!(rx_m1.try_recv().is_err());
    }
}
