// Machine Repository Port (Interface)

use crate::domain::{Machine, MachineKey, MachineStatus};
use crate::error::Result;
use async_trait::async_trait;

/// Repository interface for Machine persistence
#[async_trait]
pub trait MachineRepository: Send + Sync {
    /// Insert or update a machine registration (keyed by machine_key)
    async fn upsert(&self, machine: &Machine) -> Result<()>;

    /// Find machine by its short key
    async fn find_by_key(&self, machine_key: &str) -> Result<Option<Machine>>;

    /// Set the machine status (job lifecycle mirror, connect/disconnect)
    async fn update_status(&self, machine_key: &str, status: MachineStatus) -> Result<()>;

    /// Refresh the heartbeat timestamp; revives an offline machine
    async fn touch_last_seen(&self, machine_key: &str, now_millis: i64) -> Result<()>;

    /// Flip online machines whose heartbeat predates `cutoff_millis` to
    /// offline. Returns the keys that were flipped so callers can notify.
    async fn mark_stale_offline(&self, cutoff_millis: i64) -> Result<Vec<MachineKey>>;

    /// Count machines by status
    async fn count_by_status(&self, status: MachineStatus) -> Result<i64>;
}
