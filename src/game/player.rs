//! Local player state and snapshot production

use rand::Rng;

use crate::net::protocol::{Facing, PlayerForm, PlayerSnapshot, PowerUp, ProjectileSnapshot};
use crate::util::time::tick_delta;

/// Invulnerability window granted right after a respawn, in ticks
const RESPAWN_MERCY_TICKS: u32 = 120;

/// Authoritative state of the locally simulated player.
///
/// The sync layer only ever sees this through [`LocalPlayer::snapshot`];
/// remote peers mirror whatever the snapshot carried and nothing else.
#[derive(Debug, Clone)]
pub struct LocalPlayer {
    pub pid: String,
    pub x: f32,
    pub y: f32,
    pub vx: f32,
    pub vy: f32,
    pub facing: Facing,
    pub ground: bool,
    pub form: PlayerForm,
    pub power: Vec<PowerUp>,
    pub stars: u32,
    pub lives: u32,
    pub coins: u32,
    pub score: u32,
    pub invuln: u32,
    pub frozen: u32,
    pub respawn: u32,
    pub projectiles: Vec<ProjectileSnapshot>,
    /// Avatar tint broadcast so peers render us in our colors
    pub color: [u8; 3],
}

impl LocalPlayer {
    /// Spawn with 3 lives at a jittered position along the ground strip
    pub fn spawn(pid: impl Into<String>, color: [u8; 3]) -> Self {
        let mut rng = rand::thread_rng();
        Self {
            pid: pid.into(),
            x: rng.gen_range(64.0..640.0),
            y: 300.0,
            vx: 0.0,
            vy: 0.0,
            facing: Facing::Right,
            ground: true,
            form: PlayerForm::Normal,
            power: Vec::new(),
            stars: 0,
            lives: 3,
            coins: 0,
            score: 0,
            invuln: 0,
            frozen: 0,
            respawn: 0,
            projectiles: Vec::new(),
            color,
        }
    }

    /// Per-tick bookkeeping: count down timers, age out projectiles
    pub fn tick_timers(&mut self) {
        self.invuln = self.invuln.saturating_sub(1);
        self.frozen = self.frozen.saturating_sub(1);

        if self.respawn > 0 {
            self.respawn -= 1;
            if self.respawn == 0 && self.form == PlayerForm::Dead {
                self.form = PlayerForm::Normal;
                self.invuln = RESPAWN_MERCY_TICKS;
            }
        }

        let dt = tick_delta();
        for p in &mut self.projectiles {
            p.x += p.vx * dt;
            p.y += p.vy * dt;
            p.ttl = p.ttl.saturating_sub(1);
        }
        self.projectiles.retain(|p| p.ttl > 0);
    }

    /// Project the public state for the wire
    pub fn snapshot(&self) -> PlayerSnapshot {
        PlayerSnapshot {
            pid: self.pid.clone(),
            x: self.x,
            y: self.y,
            vx: self.vx,
            vy: self.vy,
            facing: self.facing,
            ground: self.ground,
            form: self.form,
            power: self.power.clone(),
            stars: self.stars,
            lives: self.lives,
            coins: self.coins,
            score: self.score,
            invuln: self.invuln,
            frozen: self.frozen,
            respawn: self.respawn,
            projectiles: self.projectiles.clone(),
            color: Some(self.color),
        }
    }
}
