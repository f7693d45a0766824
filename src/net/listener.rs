//! Background receive loop - decode, filter, merge

use std::net::SocketAddr;
use std::sync::Arc;

use tokio::sync::watch;
use tracing::{debug, info, trace, warn};

use crate::net::protocol::{self, NetMsg};
use crate::net::registry::RemoteRegistry;
use crate::net::transport::Transport;

/// Long-lived receive task feeding the remote registry.
///
/// Every per-packet failure is absorbed here: malformed payloads, foreign
/// broadcast traffic, snapshots missing required fields (rejected by the
/// typed decode) and self-echoes are all discarded without surfacing. The
/// simulation loop only ever observes "peer known" or "peer not yet known".
pub struct Listener {
    local_pid: String,
    transport: Arc<Transport>,
    registry: Arc<RemoteRegistry>,
    shutdown_rx: watch::Receiver<bool>,
    recv_buffer_bytes: usize,
}

impl Listener {
    pub fn new(
        local_pid: String,
        transport: Arc<Transport>,
        registry: Arc<RemoteRegistry>,
        shutdown_rx: watch::Receiver<bool>,
        recv_buffer_bytes: usize,
    ) -> Self {
        Self {
            local_pid,
            transport,
            registry,
            shutdown_rx,
            recv_buffer_bytes,
        }
    }

    /// Run until the shutdown flag flips.
    ///
    /// The receive wait is bounded, so the flag is observed within one
    /// timeout even on a silent network.
    pub async fn run(self) {
        let mut buf = vec![0u8; self.recv_buffer_bytes];
        info!(pid = %self.local_pid, "Listener started");

        while !*self.shutdown_rx.borrow() {
            match self.transport.recv_from(&mut buf).await {
                Ok(Some((len, addr))) => self.handle_datagram(&buf[..len], addr),
                Ok(None) => {
                    // Receive timeout; loop around and re-check the flag
                }
                Err(e) => {
                    if *self.shutdown_rx.borrow() {
                        // Socket torn down mid-receive during shutdown
                        break;
                    }
                    warn!(error = %e, "Receive failed");
                }
            }
        }

        info!(pid = %self.local_pid, "Listener stopped");
    }

    /// Decode, filter and merge one datagram
    fn handle_datagram(&self, payload: &[u8], addr: SocketAddr) {
        let msg = match protocol::decode(payload) {
            Ok(msg) => msg,
            Err(e) => {
                debug!(peer_addr = %addr, error = %e, "Discarded undecodable datagram");
                return;
            }
        };

        let NetMsg::Update(snapshot) = msg;

        // Broadcasts loop back to the sender; drop our own
        if snapshot.pid == self.local_pid {
            trace!("Ignoring self-echo");
            return;
        }

        let pid = snapshot.pid.clone();
        if self.registry.upsert(snapshot) {
            info!(pid = %pid, peer_addr = %addr, "New peer discovered");
        }
    }
}
