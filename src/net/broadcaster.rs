//! Outbound sync scheduler - rate-limited state broadcasts

use std::sync::Arc;
use std::time::Duration;

use tracing::debug;

use crate::net::protocol::{self, NetMsg, PlayerSnapshot};
use crate::net::transport::Transport;
use crate::util::rate_limit::{interval_limiter, Limiter};

/// Accepts the local player's state once per simulation tick and forwards it
/// to the transport at most once per configured interval. No reliability
/// logic lives here: a lost datagram is simply superseded by the next one.
pub struct Broadcaster {
    transport: Arc<Transport>,
    gate: Limiter,
}

impl Broadcaster {
    pub fn new(transport: Arc<Transport>, send_interval: Duration) -> Self {
        Self {
            transport,
            gate: interval_limiter(send_interval),
        }
    }

    /// Broadcast the snapshot if the minimum interval has elapsed.
    ///
    /// Returns true when a send was attempted. The interval clock advances
    /// whether or not the send succeeds; failures are not retried within
    /// the same tick.
    pub fn sync(&self, snapshot: &PlayerSnapshot) -> bool {
        if self.gate.check().is_err() {
            return false;
        }

        match protocol::encode(&NetMsg::Update(snapshot.clone())) {
            Ok(payload) => self.transport.send(&payload),
            Err(e) => debug!(error = %e, "Failed to encode snapshot"),
        }
        true
    }
}
