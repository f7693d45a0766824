//! Platformer netplay demo peer
//!
//! Runs a headless 60 Hz simulation of one player patrolling a strip of
//! ground, broadcasts its state to the LAN, and logs every peer it hears.
//! Start two instances (same host or same subnet) and each will mirror the
//! other as a remote player.

use std::time::Duration;

use anyhow::Context;
use rand::Rng;
use tokio::time::{interval, MissedTickBehavior};
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use platformer_netplay::config::Config;
use platformer_netplay::game::LocalPlayer;
use platformer_netplay::net::protocol::Facing;
use platformer_netplay::net::NetplaySession;
use platformer_netplay::util::time::{tick_delta, Timer, TICK_DURATION_MICROS};

/// Patrol bounds of the demo ground strip, in world units
const STRIP_LEFT: f32 = 32.0;
const STRIP_RIGHT: f32 = 768.0;
/// Demo walking speed, world units per second
const WALK_SPEED: f32 = 40.0;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load environment variables
    dotenvy::dotenv().ok();

    let config = Config::from_env()?;
    init_tracing(&config.log_level);

    info!("Starting platformer netplay demo peer");
    info!("Broadcast target: {}", config.target_addr());

    let pid = NetplaySession::generate_pid();
    let session = NetplaySession::start(pid.clone(), &config).context("netplay startup failed")?;

    let mut rng = rand::thread_rng();
    let color = [
        rng.gen_range(64..=255),
        rng.gen_range(64..=255),
        rng.gen_range(64..=255),
    ];
    let mut player = LocalPlayer::spawn(pid, color);
    player.vx = WALK_SPEED;

    let mut ticker = interval(Duration::from_micros(TICK_DURATION_MICROS));
    ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);
    let mut status = Timer::new();

    let shutdown = shutdown_signal();
    tokio::pin!(shutdown);

    loop {
        tokio::select! {
            _ = ticker.tick() => {
                patrol(&mut player);
                player.tick_timers();
                session.sync(&player.snapshot());

                if status.elapsed_ms() >= 1000 {
                    status.reset();
                    let remotes = session.remotes();
                    info!(x = %player.x, peers = remotes.len(), "Tick status");
                    for (pid, snap) in remotes {
                        info!(pid = %pid, x = %snap.x, y = %snap.y, form = ?snap.form, "Remote peer");
                    }
                }
            }
            _ = &mut shutdown => break,
        }
    }

    session.shutdown().await;
    info!("Demo peer shutdown complete");
    Ok(())
}

/// Walk back and forth along the ground strip
fn patrol(player: &mut LocalPlayer) {
    player.x += player.vx * tick_delta();
    if player.x <= STRIP_LEFT {
        player.x = STRIP_LEFT;
        player.vx = WALK_SPEED;
        player.facing = Facing::Right;
    } else if player.x >= STRIP_RIGHT {
        player.x = STRIP_RIGHT;
        player.vx = -WALK_SPEED;
        player.facing = Facing::Left;
    }
}

/// Initialize tracing/logging
fn init_tracing(log_level: &str) {
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(log_level));

    tracing_subscriber::registry()
        .with(env_filter)
        .with(tracing_subscriber::fmt::layer().with_target(true))
        .init();
}

/// Graceful shutdown signal handler
async fn shutdown_signal() {
    let ctrl_c = async {
        tokio::signal::ctrl_c()
            .await
            .expect("Failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
            .expect("Failed to install signal handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            info!("Received Ctrl+C, starting graceful shutdown");
        }
        _ = terminate => {
            info!("Received terminate signal, starting graceful shutdown");
        }
    }
}
