//! Remote player registry - last-known snapshots keyed by peer id

use std::collections::HashMap;
use std::time::Duration;

use dashmap::DashMap;

use crate::net::protocol::PlayerSnapshot;
use crate::util::time::unix_millis;

/// Registry value: the most recently merged snapshot for one peer, plus the
/// local receipt time consulted only by the optional staleness sweep
#[derive(Debug, Clone)]
pub struct RemoteEntry {
    pub snapshot: PlayerSnapshot,
    /// Unix millis at merge time
    pub last_seen_ms: u64,
}

/// Last-known state of every other peer on the broadcast domain.
///
/// Written by the listener task, read by the simulation loop. A merge
/// replaces the entry wholesale - last write wins, no reconciliation. The
/// local player's id never appears here; self-echoes are filtered before
/// insertion.
pub struct RemoteRegistry {
    remotes: DashMap<String, RemoteEntry>,
}

impl RemoteRegistry {
    pub fn new() -> Self {
        Self {
            remotes: DashMap::new(),
        }
    }

    /// Replace (or create) the entry for the snapshot's peer.
    /// Returns true when this is the first snapshot seen from that peer.
    pub fn upsert(&self, snapshot: PlayerSnapshot) -> bool {
        let pid = snapshot.pid.clone();
        let entry = RemoteEntry {
            snapshot,
            last_seen_ms: unix_millis(),
        };
        self.remotes.insert(pid, entry).is_none()
    }

    /// Copy of the last-known snapshot for one peer
    pub fn get(&self, pid: &str) -> Option<PlayerSnapshot> {
        self.remotes.get(pid).map(|e| e.snapshot.clone())
    }

    /// Point-in-time copy of every known peer.
    ///
    /// Consumers iterate their own copy; a concurrent upsert never shows up
    /// mid-iteration.
    pub fn snapshot_all(&self) -> HashMap<String, PlayerSnapshot> {
        self.remotes
            .iter()
            .map(|e| (e.key().clone(), e.value().snapshot.clone()))
            .collect()
    }

    pub fn remove(&self, pid: &str) -> Option<PlayerSnapshot> {
        self.remotes.remove(pid).map(|(_, e)| e.snapshot)
    }

    pub fn len(&self) -> usize {
        self.remotes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.remotes.is_empty()
    }

    /// Drop entries not refreshed within `max_age`, returning the evicted
    /// peer ids. Only runs when a peer timeout is configured; by default
    /// entries live for the whole session.
    pub fn evict_stale(&self, max_age: Duration) -> Vec<String> {
        let cutoff = unix_millis().saturating_sub(max_age.as_millis() as u64);
        let stale: Vec<String> = self
            .remotes
            .iter()
            .filter(|e| e.value().last_seen_ms < cutoff)
            .map(|e| e.key().clone())
            .collect();

        for pid in &stale {
            self.remotes.remove(pid);
        }
        stale
    }
}

impl Default for RemoteRegistry {
    fn default() -> Self {
        Self::new()
    }
}
