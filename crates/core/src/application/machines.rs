// Machine Service - registration, user connections, status, heartbeat

use std::sync::Arc;

use tracing::info;

use crate::application::events::{EventHub, MachineEvent};
use crate::application::session::SessionRegistry;
use crate::domain::machine::DEFAULT_RATE_PER_PAGE;
use crate::domain::{Machine, MachineStatus};
use crate::error::{AppError, Result};
use crate::port::{IdProvider, MachineRepository, TimeProvider};

/// Registration result: the machine plus the text a kiosk encodes as its
/// QR code (image rendering is the caller's concern).
#[derive(Debug, Clone)]
pub struct RegisteredMachine {
    pub machine: Machine,
    pub connect_url: String,
}

/// A user session opened against an online machine
#[derive(Debug, Clone)]
pub struct UserConnection {
    pub machine: Machine,
    pub session_id: String,
}

pub struct MachineService {
    machines: Arc<dyn MachineRepository>,
    sessions: Arc<SessionRegistry>,
    id_provider: Arc<dyn IdProvider>,
    time_provider: Arc<dyn TimeProvider>,
    events: Arc<EventHub>,
    base_url: String,
}

impl MachineService {
    pub fn new(
        machines: Arc<dyn MachineRepository>,
        sessions: Arc<SessionRegistry>,
        id_provider: Arc<dyn IdProvider>,
        time_provider: Arc<dyn TimeProvider>,
        events: Arc<EventHub>,
        base_url: impl Into<String>,
    ) -> Self {
        Self {
            machines,
            sessions,
            id_provider,
            time_provider,
            events,
            base_url: base_url.into(),
        }
    }

    /// Register (or re-register) a machine. Always forces it online and
    /// refreshes the heartbeat; name, location and rate are updated in
    /// place. A re-registration keeps the stored rate unless a new one is
    /// given.
    pub async fn register(
        &self,
        machine_key: &str,
        name: &str,
        location: &str,
        rate_per_page: Option<f64>,
    ) -> Result<RegisteredMachine> {
        if machine_key.trim().is_empty() || name.trim().is_empty() || location.trim().is_empty() {
            return Err(AppError::Validation(
                "Machine key, name, and location are required".into(),
            ));
        }
        if let Some(rate) = rate_per_page {
            if rate <= 0.0 {
                return Err(AppError::Validation("ratePerPage must be positive".into()));
            }
        }

        let now = self.time_provider.now_millis();
        let existing = self.machines.find_by_key(machine_key).await?;

        let machine = match existing {
            Some(mut machine) => {
                machine.name = name.to_string();
                machine.location = location.to_string();
                machine.status = MachineStatus::Online;
                machine.last_seen_at = now;
                if let Some(rate) = rate_per_page {
                    machine.rate_per_page = rate;
                }
                machine
            }
            None => Machine::new(
                machine_key,
                name,
                location,
                rate_per_page.unwrap_or(DEFAULT_RATE_PER_PAGE),
                now,
            ),
        };

        self.machines.upsert(&machine).await?;

        info!(machine_key, name, location, "Machine registered");

        self.events.publish(
            machine_key,
            MachineEvent::MachineStatusChanged {
                machine_key: machine_key.to_string(),
                status: MachineStatus::Online,
            },
        );

        let connect_url = format!(
            "{}/connect?machineKey={}",
            self.base_url.trim_end_matches('/'),
            machine.machine_key
        );

        Ok(RegisteredMachine {
            machine,
            connect_url,
        })
    }

    /// Open a user session against an online machine (QR scan flow)
    pub async fn connect(&self, machine_key: &str, user_name: &str) -> Result<UserConnection> {
        if machine_key.trim().is_empty() || user_name.trim().is_empty() {
            return Err(AppError::Validation(
                "Machine key and user name are required".into(),
            ));
        }

        let machine = self.find_machine(machine_key).await?;

        if !machine.is_online() {
            return Err(AppError::Precondition(format!(
                "Machine {} is currently {}",
                machine_key, machine.status
            )));
        }

        let session_id = self.id_provider.generate_id();
        self.sessions
            .bind_user(session_id.clone(), machine_key, user_name);

        info!(machine_key, user_name, session_id = %session_id, "User connected");

        Ok(UserConnection {
            machine,
            session_id,
        })
    }

    /// Bind a machine console session: flips the machine online, refreshes
    /// the heartbeat, and replaces any previous console binding.
    pub async fn register_console(&self, machine_key: &str, session_id: &str) -> Result<Machine> {
        let machine = self.find_machine(machine_key).await?;

        self.sessions.bind_console(session_id, machine_key);
        self.machines
            .touch_last_seen(machine_key, self.time_provider.now_millis())
            .await?;

        if machine.status == MachineStatus::Offline {
            self.machines
                .update_status(machine_key, MachineStatus::Online)
                .await?;
            self.events.publish(
                machine_key,
                MachineEvent::MachineStatusChanged {
                    machine_key: machine_key.to_string(),
                    status: MachineStatus::Online,
                },
            );
        }

        self.find_machine(machine_key).await
    }

    /// Close a transport session. A console session going away flips its
    /// machine offline; user sessions just disappear.
    pub async fn disconnect(&self, session_id: &str) -> Result<()> {
        let Some(binding) = self.sessions.close(session_id) else {
            return Ok(());
        };

        if let crate::application::session::SessionBinding::MachineConsole { machine_key } =
            binding
        {
            self.machines
                .update_status(&machine_key, MachineStatus::Offline)
                .await?;
            info!(machine_key = %machine_key, "Machine console disconnected; machine offline");
            self.events.publish(
                &machine_key,
                MachineEvent::MachineStatusChanged {
                    machine_key: machine_key.clone(),
                    status: MachineStatus::Offline,
                },
            );
        }

        Ok(())
    }

    /// Machine projection (polling backstop endpoint)
    pub async fn status(&self, machine_key: &str) -> Result<Machine> {
        self.find_machine(machine_key).await
    }

    /// Refresh the heartbeat; an offline machine phoning home comes back
    /// online.
    pub async fn heartbeat(&self, machine_key: &str) -> Result<Machine> {
        let machine = self.find_machine(machine_key).await?;
        let now = self.time_provider.now_millis();

        self.machines.touch_last_seen(machine_key, now).await?;

        if machine.status == MachineStatus::Offline {
            self.machines
                .update_status(machine_key, MachineStatus::Online)
                .await?;
            self.events.publish(
                machine_key,
                MachineEvent::MachineStatusChanged {
                    machine_key: machine_key.to_string(),
                    status: MachineStatus::Online,
                },
            );
        }

        self.find_machine(machine_key).await
    }

    /// Machine counts by status (admin stats)
    pub async fn count_by_status(&self, status: MachineStatus) -> Result<i64> {
        self.machines.count_by_status(status).await
    }

    async fn find_machine(&self, machine_key: &str) -> Result<Machine> {
        self.machines
            .find_by_key(machine_key)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Machine {} not found", machine_key)))
    }
}
