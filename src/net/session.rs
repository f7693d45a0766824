//! Netplay session - component wiring, startup and shutdown

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::watch;
use tokio::task::JoinHandle;
use tracing::{info, warn};
use uuid::Uuid;

use crate::config::Config;
use crate::net::broadcaster::Broadcaster;
use crate::net::listener::Listener;
use crate::net::protocol::PlayerSnapshot;
use crate::net::registry::RemoteRegistry;
use crate::net::transport::Transport;

/// Margin on top of one receive timeout for the listener to acknowledge
/// shutdown before its task is aborted
const SHUTDOWN_GRACE_MARGIN: Duration = Duration::from_millis(500);

/// Errors that prevent the sync subsystem from starting.
///
/// Everything after startup is best-effort and absorbed; a process that
/// cannot bind its sockets must fail startup rather than run half-networked.
#[derive(Debug, thiserror::Error)]
pub enum NetplayError {
    #[error("failed to bind UDP transport: {0}")]
    Bind(#[from] std::io::Error),
}

/// One process's participation in the broadcast domain.
///
/// Owns the transport, the background listener and the broadcaster, and
/// hands the simulation loop copies out of the remote registry. The two
/// peers of a session are symmetric; each runs an identical pipeline.
pub struct NetplaySession {
    local_pid: String,
    registry: Arc<RemoteRegistry>,
    broadcaster: Broadcaster,
    peer_timeout: Option<Duration>,
    shutdown_grace: Duration,
    shutdown_tx: watch::Sender<bool>,
    listener_handle: JoinHandle<()>,
}

impl NetplaySession {
    /// Generate a peer id unique to this process instance
    pub fn generate_pid() -> String {
        format!("player-{}", &Uuid::new_v4().to_string()[..8])
    }

    /// Bind sockets and spawn the listener.
    ///
    /// Must run inside a tokio runtime. Bind failure is fatal and surfaces
    /// here, before any background task exists.
    pub fn start(local_pid: impl Into<String>, config: &Config) -> Result<Self, NetplayError> {
        let local_pid = local_pid.into();
        let transport = Arc::new(Transport::bind(config)?);
        let registry = Arc::new(RemoteRegistry::new());
        let (shutdown_tx, shutdown_rx) = watch::channel(false);

        let listener = Listener::new(
            local_pid.clone(),
            transport.clone(),
            registry.clone(),
            shutdown_rx,
            config.recv_buffer_bytes,
        );
        let listener_handle = tokio::spawn(listener.run());

        info!(
            pid = %local_pid,
            port = config.port,
            target_addr = %config.target_addr(),
            "Netplay session started"
        );

        Ok(Self {
            local_pid,
            registry,
            broadcaster: Broadcaster::new(transport, config.send_interval),
            peer_timeout: config.peer_timeout,
            // The listener notices the flag within one bounded receive
            shutdown_grace: config.recv_timeout + SHUTDOWN_GRACE_MARGIN,
            shutdown_tx,
            listener_handle,
        })
    }

    pub fn local_pid(&self) -> &str {
        &self.local_pid
    }

    /// Rate-limited broadcast of the local player's state; call once per
    /// simulation tick. Runs the stale-peer sweep when one is configured.
    pub fn sync(&self, snapshot: &PlayerSnapshot) -> bool {
        if let Some(max_age) = self.peer_timeout {
            for pid in self.registry.evict_stale(max_age) {
                info!(pid = %pid, "Evicted silent peer");
            }
        }
        self.broadcaster.sync(snapshot)
    }

    /// Point-in-time copy of every known remote player
    pub fn remotes(&self) -> HashMap<String, PlayerSnapshot> {
        self.registry.snapshot_all()
    }

    /// Shared registry handle for consumers that prefer `get` over full maps
    pub fn registry(&self) -> Arc<RemoteRegistry> {
        self.registry.clone()
    }

    /// Signal the listener to stop and wait for it to acknowledge, aborting
    /// after a grace period so shutdown never hangs on an in-flight receive.
    /// The sockets close once the listener task has released its transport.
    pub async fn shutdown(self) {
        info!(pid = %self.local_pid, "Shutting down netplay session");
        let _ = self.shutdown_tx.send(true);

        let mut handle = self.listener_handle;
        tokio::select! {
            _ = &mut handle => {}
            _ = tokio::time::sleep(self.shutdown_grace) => {
                warn!("Listener did not acknowledge shutdown in time; aborting task");
                handle.abort();
            }
        }
    }
}
