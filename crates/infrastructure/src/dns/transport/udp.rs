//! UDP transport (RFC 1035 §4.2.1).
//!
//! The socket is connected to the forwarder so ICMP port-unreachable
//! surfaces as a refused connection. Datagrams whose ID does not match
//! the query are dropped until the deadline passes.

use super::{io_error, timeout_error, DnsTransport, TransportResponse};
use async_trait::async_trait;
use spark_dns_domain::DomainError;
use std::net::{Ipv4Addr, Ipv6Addr, SocketAddr};
use std::time::Duration;
use tokio::net::UdpSocket;
use tokio::time::Instant;
use tracing::{debug, warn};

/// Receive buffer size. Holds any UDP datagram, so a reply larger than the
/// advertised EDNS payload still arrives whole.
const MAX_UDP_RESPONSE_SIZE: usize = u16::MAX as usize;

pub struct UdpTransport {
    server_addr: SocketAddr,
}

impl UdpTransport {
    pub fn new(server_addr: SocketAddr) -> Self {
        Self { server_addr }
    }

    fn bind_addr(&self) -> SocketAddr {
        if self.server_addr.is_ipv4() {
            SocketAddr::from((Ipv4Addr::UNSPECIFIED, 0))
        } else {
            SocketAddr::from((Ipv6Addr::UNSPECIFIED, 0))
        }
    }
}

#[async_trait]
impl DnsTransport for UdpTransport {
    async fn send(
        &self,
        message_bytes: &[u8],
        timeout: Duration,
    ) -> Result<TransportResponse, DomainError> {
        let server = self.server_addr;
        let deadline = Instant::now() + timeout;

        let socket = UdpSocket::bind(self.bind_addr())
            .await
            .map_err(|e| io_error(server, e))?;
        socket.connect(server).await.map_err(|e| io_error(server, e))?;

        tokio::time::timeout_at(deadline, socket.send(message_bytes))
            .await
            .map_err(|_| timeout_error(server))?
            .map_err(|e| io_error(server, e))?;

        debug!(server = %server, bytes_sent = message_bytes.len(), "UDP query sent");

        let mut recv_buf = vec![0u8; MAX_UDP_RESPONSE_SIZE];
        loop {
            let bytes_received = tokio::time::timeout_at(deadline, socket.recv(&mut recv_buf))
                .await
                .map_err(|_| timeout_error(server))?
                .map_err(|e| io_error(server, e))?;

            if bytes_received >= 2
                && message_bytes.len() >= 2
                && recv_buf[..2] == message_bytes[..2]
            {
                recv_buf.truncate(bytes_received);
                debug!(server = %server, bytes_received, "UDP response received");
                return Ok(TransportResponse {
                    bytes: recv_buf,
                    protocol_used: "UDP",
                });
            }

            warn!(server = %server, bytes_received, "Dropping UDP datagram with mismatched ID");
        }
    }

    fn protocol_name(&self) -> &'static str {
        "UDP"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_udp_transport_creation() {
        let addr: SocketAddr = "8.8.8.8:53".parse().unwrap();
        let transport = UdpTransport::new(addr);
        assert_eq!(transport.server_addr, addr);
        assert_eq!(transport.protocol_name(), "UDP");
        assert!(transport.bind_addr().is_ipv4());
    }

    #[test]
    fn test_udp_transport_ipv6() {
        let addr: SocketAddr = "[2001:4860:4860::8888]:53".parse().unwrap();
        let transport = UdpTransport::new(addr);
        assert!(transport.bind_addr().is_ipv6());
    }

    #[tokio::test]
    async fn test_silent_server_times_out() {
        let silent = UdpSocket::bind("127.0.0.1:0").await.unwrap();
        let addr = silent.local_addr().unwrap();
        let transport = UdpTransport::new(addr);

        let err = transport
            .send(&[0x12, 0x34, 0, 0], Duration::from_millis(100))
            .await
            .unwrap_err();
        assert_eq!(
            err,
            DomainError::TransportTimeout {
                server: addr.to_string()
            }
        );
    }
}
