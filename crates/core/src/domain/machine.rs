// Machine Domain Model

use serde::{Deserialize, Serialize};

use crate::domain::error::DomainError;

/// Machine key: the short human-entered identifier printed on the station
pub type MachineKey = String;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MachineStatus {
    Online,
    Offline,
    Printing,
}

impl std::fmt::Display for MachineStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            MachineStatus::Online => write!(f, "online"),
            MachineStatus::Offline => write!(f, "offline"),
            MachineStatus::Printing => write!(f, "printing"),
        }
    }
}

impl std::str::FromStr for MachineStatus {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, DomainError> {
        match s {
            "online" => Ok(MachineStatus::Online),
            "offline" => Ok(MachineStatus::Offline),
            "printing" => Ok(MachineStatus::Printing),
            other => Err(DomainError::ValidationError(format!(
                "Unknown machine status: {}",
                other
            ))),
        }
    }
}

/// Print Station Entity
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Machine {
    pub machine_key: MachineKey,
    pub name: String,
    pub location: String,
    pub status: MachineStatus,
    pub rate_per_page: f64,
    pub last_seen_at: i64, // epoch ms
}

pub const DEFAULT_RATE_PER_PAGE: f64 = 2.0;

impl Machine {
    pub fn new(
        machine_key: impl Into<String>,
        name: impl Into<String>,
        location: impl Into<String>,
        rate_per_page: f64,
        now_millis: i64,
    ) -> Self {
        Self {
            machine_key: machine_key.into(),
            name: name.into(),
            location: location.into(),
            status: MachineStatus::Online,
            rate_per_page,
            last_seen_at: now_millis,
        }
    }

    /// Only online machines accept new jobs and user connections
    pub fn is_online(&self) -> bool {
        self.status == MachineStatus::Online
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_machine_starts_online() {
        let m = Machine::new("M1", "Library Kiosk", "2nd floor", 2.0, 1000);
        assert!(m.is_online());
        assert_eq!(m.last_seen_at, 1000);
    }

    #[test]
    fn printing_machine_is_not_accepting() {
        let mut m = Machine::new("M1", "Library Kiosk", "2nd floor", 2.0, 1000);
        m.status = MachineStatus::Printing;
        assert!(!m.is_online());
    }
}
