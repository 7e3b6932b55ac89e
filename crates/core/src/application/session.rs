// Session Registry - transport sessions bound to machines and users
//
// The original service stored socket ids on the durable machine/job records;
// here transient transport state lives only in this in-memory map and the
// durable rows stay clean. Entity lookup goes through the binding.

use std::collections::HashMap;
use std::sync::RwLock;

/// What a transport session is bound to
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionBinding {
    /// The machine's own console (dashboard); at most one per machine
    MachineConsole { machine_key: String },
    /// A user who scanned the machine's QR code
    UserClient {
        machine_key: String,
        user_name: String,
    },
}

impl SessionBinding {
    pub fn machine_key(&self) -> &str {
        match self {
            SessionBinding::MachineConsole { machine_key } => machine_key,
            SessionBinding::UserClient { machine_key, .. } => machine_key,
        }
    }
}

/// In-memory session-to-entity map
pub struct SessionRegistry {
    inner: RwLock<HashMap<String, SessionBinding>>,
}

impl SessionRegistry {
    pub fn new() -> Self {
        Self {
            inner: RwLock::new(HashMap::new()),
        }
    }

    /// Bind a session as a machine's console. Any previous console session
    /// for the same machine is dropped (overwrite on reconnect).
    pub fn bind_console(&self, session_id: impl Into<String>, machine_key: impl Into<String>) {
        let machine_key = machine_key.into();
        let mut inner = self.inner.write().expect("session registry lock poisoned");
        inner.retain(|_, binding| {
            !matches!(binding, SessionBinding::MachineConsole { machine_key: k } if *k == machine_key)
        });
        inner.insert(
            session_id.into(),
            SessionBinding::MachineConsole { machine_key },
        );
    }

    /// Bind a session as a user connected to a machine
    pub fn bind_user(
        &self,
        session_id: impl Into<String>,
        machine_key: impl Into<String>,
        user_name: impl Into<String>,
    ) {
        let mut inner = self.inner.write().expect("session registry lock poisoned");
        inner.insert(
            session_id.into(),
            SessionBinding::UserClient {
                machine_key: machine_key.into(),
                user_name: user_name.into(),
            },
        );
    }

    pub fn get(&self, session_id: &str) -> Option<SessionBinding> {
        let inner = self.inner.read().expect("session registry lock poisoned");
        inner.get(session_id).cloned()
    }

    /// Remove a session, returning what it was bound to
    pub fn close(&self, session_id: &str) -> Option<SessionBinding> {
        let mut inner = self.inner.write().expect("session registry lock poisoned");
        inner.remove(session_id)
    }

    /// The console session id for a machine, if one is connected
    pub fn console_for(&self, machine_key: &str) -> Option<String> {
        let inner = self.inner.read().expect("session registry lock poisoned");
        inner.iter().find_map(|(id, binding)| match binding {
            SessionBinding::MachineConsole { machine_key: k } if k == machine_key => {
                Some(id.clone())
            }
            _ => None,
        })
    }

    pub fn len(&self) -> usize {
        self.inner.read().expect("session registry lock poisoned").len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl Default for SessionRegistry {
    fn default() -> Self {
        Self::new()
    }
}
