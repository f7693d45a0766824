//! UDP transport - socket setup and raw datagram I/O, no game logic

use std::io;
use std::net::SocketAddr;
use std::time::Duration;

use socket2::{Domain, Protocol, Socket, Type};
use tokio::net::UdpSocket;
use tracing::debug;

use crate::config::Config;

/// Owns the socket pair for the sync protocol: a broadcast-capable send
/// socket on an ephemeral port, and a receive socket on the well-known port
/// with address reuse so several local processes can listen at once.
pub struct Transport {
    send_sock: UdpSocket,
    recv_sock: UdpSocket,
    target: SocketAddr,
    recv_timeout: Duration,
}

impl Transport {
    /// Bind both sockets. This is the subsystem's only fatal failure surface:
    /// callers must refuse to start without a working transport.
    ///
    /// Must be called from within a tokio runtime.
    pub fn bind(config: &Config) -> io::Result<Self> {
        let send_sock = bind_send_socket()?;
        let recv_sock = bind_recv_socket(config.recv_addr())?;

        Ok(Self {
            send_sock,
            recv_sock,
            target: config.target_addr(),
            recv_timeout: config.recv_timeout,
        })
    }

    /// Local address of the receive socket
    pub fn local_addr(&self) -> io::Result<SocketAddr> {
        self.recv_sock.local_addr()
    }

    /// Fire-and-forget send to the configured target.
    ///
    /// Never blocks the caller. Transient failures (no interface, full OS
    /// buffer, network unreachable) are dropped; the next scheduled
    /// broadcast retries naturally.
    pub fn send(&self, payload: &[u8]) {
        if let Err(e) = self.send_sock.try_send_to(payload, self.target) {
            debug!(target_addr = %self.target, error = %e, "Dropped outbound datagram");
        }
    }

    /// Receive one datagram with a bounded wait.
    ///
    /// `Ok(None)` signals the timeout elapsed with nothing to read, so the
    /// caller can check its shutdown flag and come back.
    pub async fn recv_from(&self, buf: &mut [u8]) -> io::Result<Option<(usize, SocketAddr)>> {
        match tokio::time::timeout(self.recv_timeout, self.recv_sock.recv_from(buf)).await {
            Ok(Ok((len, addr))) => Ok(Some((len, addr))),
            Ok(Err(e)) => Err(e),
            Err(_elapsed) => Ok(None),
        }
    }
}

/// Ephemeral-port socket with broadcast enabled
fn bind_send_socket() -> io::Result<UdpSocket> {
    let sock = std::net::UdpSocket::bind((std::net::Ipv4Addr::UNSPECIFIED, 0))?;
    sock.set_broadcast(true)?;
    sock.set_nonblocking(true)?;
    UdpSocket::from_std(sock)
}

/// Well-known-port socket with address/port reuse, so multiple instances on
/// one host (tests, two local processes) can all hear the broadcasts
fn bind_recv_socket(addr: SocketAddr) -> io::Result<UdpSocket> {
    let sock = Socket::new(Domain::IPV4, Type::DGRAM, Some(Protocol::UDP))?;
    sock.set_reuse_address(true)?;
    #[cfg(unix)]
    sock.set_reuse_port(true)?;
    sock.set_nonblocking(true)?;
    sock.bind(&addr.into())?;
    UdpSocket::from_std(sock.into())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::net::{IpAddr, Ipv4Addr};

    fn loopback_config(port: u16, recv_timeout_ms: u64) -> Config {
        Config {
            port,
            broadcast_target: SocketAddr::new(IpAddr::V4(Ipv4Addr::LOCALHOST), port),
            recv_timeout: Duration::from_millis(recv_timeout_ms),
            ..Config::default()
        }
    }

    #[test]
    fn datagram_reaches_peer_transport() {
        tokio_test::block_on(async {
            let a = Transport::bind(&loopback_config(47311, 500)).unwrap();

            // Target is 127.0.0.1 on our own well-known port, so the send
            // lands on our own receive socket
            a.send(b"hello");

            let mut buf = [0u8; 64];
            let got = a.recv_from(&mut buf).await.unwrap();
            let (len, _addr) = got.expect("datagram should arrive before the timeout");
            assert_eq!(&buf[..len], b"hello");
        });
    }

    #[test]
    fn recv_times_out_quietly() {
        tokio_test::block_on(async {
            let t = Transport::bind(&loopback_config(47312, 50)).unwrap();

            let mut buf = [0u8; 64];
            assert!(t.recv_from(&mut buf).await.unwrap().is_none());
        });
    }

    #[test]
    fn two_transports_share_the_receive_port() {
        tokio_test::block_on(async {
            let config = loopback_config(47313, 100);
            let first = Transport::bind(&config).unwrap();
            let second = Transport::bind(&config).unwrap();
            assert_eq!(
                first.local_addr().unwrap().port(),
                second.local_addr().unwrap().port()
            );
        });
    }
}
