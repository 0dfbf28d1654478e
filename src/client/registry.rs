//! Client registry
//!
//! Maps connection ids to their records and registered names to connection
//! ids. All mutation goes through the methods below; callers share one
//! instance behind a single mutex (`SharedRegistry`), so every operation is
//! atomic with respect to every other.

use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;

use tokio::sync::Mutex;

use crate::client::{ClientHandle, ConnectionId, ConnectionRecord, ConnectionState};
use crate::error::RegistryError;
use crate::utils::is_valid_name;

/// Registry shared between the accept loop and every connection task.
pub type SharedRegistry = Arc<Mutex<Registry>>;

/// Registry for tracking connected clients and their display names.
///
/// Invariants: every value in `by_name` is a key of `by_id`, and a name maps
/// to at most one connection.
#[derive(Debug)]
pub struct Registry {
    by_id: BTreeMap<ConnectionId, ConnectionRecord>,
    by_name: HashMap<String, ConnectionId>,
    next_id: u64,
}

impl Registry {
    pub fn new() -> Self {
        Self {
            by_id: BTreeMap::new(),
            by_name: HashMap::new(),
            next_id: 1,
        }
    }

    /// Creates an empty registry wrapped for sharing across tasks.
    pub fn shared() -> SharedRegistry {
        Arc::new(Mutex::new(Self::new()))
    }

    /// Allocates the next id and stores an unregistered record for it.
    pub fn connect(&mut self, handle: ClientHandle) -> ConnectionId {
        let id = ConnectionId::new(self.next_id);
        self.next_id += 1;
        self.by_id.insert(id, ConnectionRecord::new(id, handle));
        id
    }

    /// Claims `name` for connection `id`.
    ///
    /// Nothing is modified unless every check passes.
    pub fn register(&mut self, id: ConnectionId, name: &str) -> Result<(), RegistryError> {
        if !is_valid_name(name) {
            return Err(RegistryError::InvalidName(name.to_string()));
        }
        if self.by_name.contains_key(name) {
            return Err(RegistryError::NameTaken(name.to_string()));
        }

        let record = self
            .by_id
            .get_mut(&id)
            .ok_or(RegistryError::UnknownConnection(id))?;
        if record.name().is_some() {
            return Err(RegistryError::AlreadyRegistered(id));
        }

        record.set_name(name.to_string());
        self.by_name.insert(name.to_string(), id);
        Ok(())
    }

    pub fn is_registered(&self, id: ConnectionId) -> bool {
        self.state(id) == Some(ConnectionState::Registered)
    }

    /// Returns the connection's state, or `None` if it is not in the registry.
    pub fn state(&self, id: ConnectionId) -> Option<ConnectionState> {
        self.by_id.get(&id).map(ConnectionRecord::state)
    }

    pub fn get(&self, id: ConnectionId) -> Option<&ConnectionRecord> {
        self.by_id.get(&id)
    }

    pub fn lookup_by_name(&self, name: &str) -> Option<ConnectionId> {
        self.by_name.get(name).copied()
    }

    /// Registered names ordered by connection id, i.e. by connect order.
    pub fn list_names(&self) -> Vec<String> {
        self.by_id
            .values()
            .filter_map(|record| record.name().map(str::to_string))
            .collect()
    }

    /// Removes the connection and releases its name. Returns the removed
    /// record; an id that is already gone is a no-op.
    pub fn disconnect(&mut self, id: ConnectionId) -> Option<ConnectionRecord> {
        let record = self.by_id.remove(&id)?;
        if let Some(name) = record.name() {
            self.by_name.remove(name);
        }
        Some(record)
    }

    /// Every connection currently in the registry, registered or not.
    pub fn all(&self) -> impl Iterator<Item = &ConnectionRecord> {
        self.by_id.values()
    }

    pub fn active_count(&self) -> usize {
        self.by_id.len()
    }

    /// Drops every entry and returns the removed records. The id counter is
    /// kept, so ids stay unique for the life of the process.
    pub fn clear(&mut self) -> Vec<ConnectionRecord> {
        self.by_name.clear();
        std::mem::take(&mut self.by_id).into_values().collect()
    }
}

impl Default for Registry {
    fn default() -> Self {
        Self::new()
    }
}
