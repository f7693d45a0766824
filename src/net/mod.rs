//! Peer-to-peer synchronization stack
//!
//! One identical pipeline per peer: the broadcaster pushes the local
//! player's snapshot onto the wire, the listener merges everyone else's
//! into the remote registry.

pub mod broadcaster;
pub mod listener;
pub mod protocol;
pub mod registry;
pub mod session;
pub mod transport;

pub use registry::{RemoteEntry, RemoteRegistry};
pub use session::{NetplayError, NetplaySession};
