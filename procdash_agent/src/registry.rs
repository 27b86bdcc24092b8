//! Connection registry: the set of observers eligible for broadcast.
//!
//! Each observer is represented by the sending half of a bounded channel
//! (its outbox); the WebSocket task owns the receiving half. Dropping an
//! entry drops the outbox, which ends that observer's socket task.

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Mutex, MutexGuard, PoisonError};

use tokio::sync::mpsc;

/// Serialized payload shared by every observer in one cycle.
pub type Payload = std::sync::Arc<str>;

pub type Outbox = mpsc::Sender<Payload>;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ConnectionId(u64);

impl ConnectionId {
    pub fn get(self) -> u64 {
        self.0
    }
}

impl std::fmt::Display for ConnectionId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "#{}", self.0)
    }
}

#[derive(Debug, Default)]
pub struct ConnectionRegistry {
    next_id: AtomicU64,
    conns: Mutex<HashMap<ConnectionId, Outbox>>,
}

impl ConnectionRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    // A panic while holding the lock leaves the map itself consistent.
    fn lock(&self) -> MutexGuard<'_, HashMap<ConnectionId, Outbox>> {
        self.conns.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn register(&self, outbox: Outbox) -> ConnectionId {
        let id = ConnectionId(self.next_id.fetch_add(1, Ordering::Relaxed));
        self.lock().insert(id, outbox);
        id
    }

    /// Returns whether the connection was present. Removing an absent id is a no-op.
    pub fn unregister(&self, id: ConnectionId) -> bool {
        self.lock().remove(&id).is_some()
    }

    /// Visit every connection under one lock. Connections for which `f`
    /// fails are removed before the lock is released; the remaining
    /// connections are still visited. Returns the pruned ids.
    pub fn for_each<F, E>(&self, mut f: F) -> Vec<ConnectionId>
    where
        F: FnMut(ConnectionId, &Outbox) -> Result<(), E>,
    {
        let mut conns = self.lock();
        let mut pruned = Vec::new();
        conns.retain(|id, outbox| {
            if f(*id, outbox).is_ok() {
                true
            } else {
                pruned.push(*id);
                false
            }
        });
        pruned
    }

    pub fn contains(&self, id: ConnectionId) -> bool {
        self.lock().contains_key(&id)
    }

    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }

    /// Drop every outbox, closing all observer sockets. Returns how many were removed.
    pub fn clear(&self) -> usize {
        let mut conns = self.lock();
        let n = conns.len();
        conns.clear();
        n
    }
}
