//! Peer-to-peer LAN state sync for multiplayer platformer prototypes.
//!
//! Every peer broadcasts a JSON snapshot of its own player over UDP a few
//! dozen times per second and mirrors the last snapshot heard from every
//! other peer. There is no server, no handshake and no delivery guarantee;
//! the protocol is best-effort and stateless per datagram, with last-write-
//! wins merging on the receiving side.

pub mod config;
pub mod game;
pub mod net;
pub mod util;

pub use config::Config;
pub use net::protocol::{NetMsg, PlayerSnapshot};
pub use net::registry::RemoteRegistry;
pub use net::session::{NetplayError, NetplaySession};
