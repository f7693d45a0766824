//! End-to-end tests over real UDP on the loopback interface.
//!
//! Two sessions point their broadcast targets at each other's receive ports
//! so delivery is deterministic. Each test pins its own ports to keep the
//! suite parallel-safe.

use std::net::{IpAddr, Ipv4Addr, SocketAddr};
use std::time::Duration;

use platformer_netplay::config::Config;
use platformer_netplay::net::protocol::{Facing, PlayerForm, PlayerSnapshot};
use platformer_netplay::net::NetplaySession;
use platformer_netplay::RemoteRegistry;

fn peer_config(port: u16, target_port: u16) -> Config {
    Config {
        port,
        broadcast_target: SocketAddr::new(IpAddr::V4(Ipv4Addr::LOCALHOST), target_port),
        send_interval: Duration::from_millis(5),
        recv_timeout: Duration::from_millis(100),
        ..Config::default()
    }
}

/// A plain grounded player mid-walk
fn scenario_snapshot(pid: &str) -> PlayerSnapshot {
    PlayerSnapshot {
        pid: pid.to_string(),
        x: 10.0,
        y: 20.0,
        vx: 1.0,
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
        color: None,
    }
}

/// Keep broadcasting `snapshot` from `sender` until `receiver_registry`
/// satisfies `check` or the deadline passes. UDP on loopback rarely drops,
/// but the tests never rely on any single datagram arriving.
async fn sync_until(
    sender: &NetplaySession,
    snapshot: &PlayerSnapshot,
    receiver_registry: &RemoteRegistry,
    check: impl Fn(&RemoteRegistry) -> bool,
) -> bool {
    for _ in 0..300 {
        sender.sync(snapshot);
        if check(receiver_registry) {
            return true;
        }
        tokio::time::sleep(Duration::from_millis(10)).await;
    }
    false
}

#[tokio::test]
async fn snapshot_crosses_the_wire_exactly() {
    let a = NetplaySession::start("A", &peer_config(40711, 40712)).unwrap();
    let b = NetplaySession::start("B", &peer_config(40712, 40711)).unwrap();

    let sent = scenario_snapshot("A");
    let b_registry = b.registry();
    assert!(
        sync_until(&a, &sent, &b_registry, |r| r.get("A").is_some()).await,
        "peer B never saw peer A"
    );
    assert_eq!(b_registry.get("A").unwrap(), sent);

    // The pipeline is symmetric
    let reply = scenario_snapshot("B");
    let a_registry = a.registry();
    assert!(
        sync_until(&b, &reply, &a_registry, |r| r.get("B").is_some()).await,
        "peer A never saw peer B"
    );
    assert_eq!(a_registry.get("B").unwrap(), reply);

    a.shutdown().await;
    b.shutdown().await;
}

#[tokio::test]
async fn self_echo_never_reaches_the_registry() {
    // Target our own receive port, the worst case for echo
    let session = NetplaySession::start("loner", &peer_config(40713, 40713)).unwrap();
    let snapshot = scenario_snapshot("loner");

    for _ in 0..20 {
        session.sync(&snapshot);
        tokio::time::sleep(Duration::from_millis(10)).await;
    }

    assert!(session.remotes().is_empty());
    session.shutdown().await;
}

#[tokio::test]
async fn later_snapshot_fully_replaces_earlier_one() {
    let a = NetplaySession::start("A", &peer_config(40714, 40715)).unwrap();
    let b = NetplaySession::start("B", &peer_config(40715, 40714)).unwrap();
    let b_registry = b.registry();

    let mut starred = scenario_snapshot("A");
    starred.stars = 1;
    starred.coins = 30;
    assert!(
        sync_until(&a, &starred, &b_registry, |r| {
            r.get("A").is_some_and(|s| s.stars == 1)
        })
        .await
    );

    // Hit, star lost: the registry must reflect the new value, not an
    // accumulation of the old one
    let mut unstarred = scenario_snapshot("A");
    unstarred.stars = 0;
    unstarred.x = 55.5;
    assert!(
        sync_until(&a, &unstarred, &b_registry, |r| {
            r.get("A").is_some_and(|s| s.stars == 0)
        })
        .await
    );
    assert_eq!(b_registry.get("A").unwrap(), unstarred);

    a.shutdown().await;
    b.shutdown().await;
}

#[tokio::test]
async fn foreign_traffic_is_discarded_and_the_listener_survives() {
    let session = NetplaySession::start("B", &peer_config(40717, 40717)).unwrap();
    let target = SocketAddr::new(IpAddr::V4(Ipv4Addr::LOCALHOST), 40717);

    let prober = std::net::UdpSocket::bind((Ipv4Addr::LOCALHOST, 0)).unwrap();
    let hostile: [&[u8]; 5] = [
        b"",
        b"\xff\xfe\x00garbage",
        br#"{"pid":"A","x":1.0,"y":2.0,"vx":0.0,"vy":0.0}"#, // no discriminator
        br#"{"type":"chat","pid":"A","text":"hi"}"#,         // foreign discriminator
        br#"{"type":"update","pid":"A","x":1.0,"y":2.0}"#,   // missing velocity
    ];
    for payload in hostile {
        prober.send_to(payload, target).unwrap();
    }
    tokio::time::sleep(Duration::from_millis(200)).await;
    assert!(session.remotes().is_empty());

    // A well-formed update still merges afterwards, stray extras and all
    let valid = br#"{
        "type": "update",
        "pid": "A",
        "x": 10.0, "y": 20.0, "vx": 1.0, "vy": 0.0,
        "ground": true, "lives": 3,
        "color_r": 200, "color_g": 30, "color_b": 30
    }"#;
    let mut merged = false;
    for _ in 0..100 {
        prober.send_to(valid, target).unwrap();
        if session.registry().get("A").is_some() {
            merged = true;
            break;
        }
        tokio::time::sleep(Duration::from_millis(10)).await;
    }
    assert!(merged, "valid update after hostile traffic never merged");

    let snap = session.registry().get("A").unwrap();
    assert_eq!(snap.lives, 3);
    assert!(snap.ground);
    assert_eq!(snap.form, PlayerForm::Normal);

    session.shutdown().await;
}

#[tokio::test]
async fn exclusively_bound_port_fails_startup() {
    // A plain socket without reuse flags blocks the well-known port
    let blocker = std::net::UdpSocket::bind((Ipv4Addr::UNSPECIFIED, 40719)).unwrap();

    let result = NetplaySession::start("late", &peer_config(40719, 40719));
    assert!(result.is_err(), "startup must fail when the port is taken");

    drop(blocker);
}

#[tokio::test]
async fn shutdown_releases_the_receive_port() {
    let session = NetplaySession::start("quitter", &peer_config(40721, 40721)).unwrap();
    session.shutdown().await;
    tokio::time::sleep(Duration::from_millis(50)).await;

    // Without reuse flags this only succeeds once the socket is closed
    assert!(std::net::UdpSocket::bind((Ipv4Addr::UNSPECIFIED, 40721)).is_ok());
}
