//! Wire protocol message definitions
//! These are the datagram types peers broadcast to each other

use serde::{Deserialize, Serialize};

/// Which way a player sprite faces
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Facing {
    Left,
    Right,
}

impl Default for Facing {
    fn default() -> Self {
        Self::Right
    }
}

impl Facing {
    /// Signed unit for velocity math (-1.0 left, 1.0 right)
    pub fn sign(self) -> f32 {
        match self {
            Self::Left => -1.0,
            Self::Right => 1.0,
        }
    }

    pub fn flipped(self) -> Self {
        match self {
            Self::Left => Self::Right,
            Self::Right => Self::Left,
        }
    }
}

/// Discrete player form
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PlayerForm {
    /// Small, default form
    Normal,
    /// Grown by a mushroom or fire flower
    Powered,
    /// Tucked into a shell
    Shell,
    /// Invincibility star active
    Star,
    /// Shrunk by a mini mushroom
    Mini,
    /// Mega mushroom active
    Mega,
    /// Awaiting respawn
    Dead,
}

impl Default for PlayerForm {
    fn default() -> Self {
        Self::Normal
    }
}

/// Active power-up tags carried in a player's inventory
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PowerUp {
    Mushroom,
    Fire,
    Shell,
    Star,
    Mini,
    Mega,
}

/// Projectile flavor (affects damage rules and rendering on the remote side)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProjectileKind {
    Fireball,
    Iceball,
}

/// One in-flight projectile owned by the sending player
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProjectileSnapshot {
    pub x: f32,
    pub y: f32,
    pub vx: f32,
    pub vy: f32,
    pub kind: ProjectileKind,
    /// Remaining lifetime in simulation ticks
    pub ttl: u32,
}

/// Complete public state of one player at one instant.
///
/// Identity plus position and velocity are the only fields a peer must send;
/// everything else defaults so trimmed-down or older builds still merge.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlayerSnapshot {
    /// Opaque peer identifier, unique per process instance for the session
    pub pid: String,
    /// Position X
    pub x: f32,
    /// Position Y
    pub y: f32,
    /// Velocity X
    pub vx: f32,
    /// Velocity Y
    pub vy: f32,
    #[serde(default)]
    pub facing: Facing,
    /// Standing on solid ground this tick
    #[serde(default)]
    pub ground: bool,
    #[serde(default)]
    pub form: PlayerForm,
    /// Active power-ups, oldest first
    #[serde(default)]
    pub power: Vec<PowerUp>,
    #[serde(default)]
    pub stars: u32,
    #[serde(default)]
    pub lives: u32,
    #[serde(default)]
    pub coins: u32,
    #[serde(default)]
    pub score: u32,
    /// Invulnerability ticks remaining after taking a hit
    #[serde(default)]
    pub invuln: u32,
    /// Ticks remaining frozen by an ice projectile
    #[serde(default)]
    pub frozen: u32,
    /// Ticks until this player respawns (0 = alive)
    #[serde(default)]
    pub respawn: u32,
    #[serde(default)]
    pub projectiles: Vec<ProjectileSnapshot>,
    /// Avatar tint so a newly seen peer renders in the sender's colors
    #[serde(default)]
    pub color: Option<[u8; 3]>,
}

/// Datagram envelope.
///
/// The `type` tag is the discriminator that lets receivers skip unrelated
/// broadcast traffic sharing the port. Unknown fields inside a recognized
/// message are ignored for forward tolerance.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum NetMsg {
    /// Full state broadcast for one player
    Update(PlayerSnapshot),
}

/// Failure to interpret an inbound datagram as a protocol message.
///
/// Covers non-UTF-8 payloads, invalid JSON, a missing or unrecognized
/// discriminator, and missing required fields.
#[derive(Debug, thiserror::Error)]
#[error("malformed datagram: {0}")]
pub struct DecodeError(#[from] serde_json::Error);

/// Encode a message for the wire
pub fn encode(msg: &NetMsg) -> serde_json::Result<Vec<u8>> {
    serde_json::to_vec(msg)
}

/// Decode a datagram payload. Never panics on arbitrary input.
pub fn decode(payload: &[u8]) -> Result<NetMsg, DecodeError> {
    Ok(serde_json::from_slice(payload)?)
}
