use spark_dns_domain::{DnsProtocol, DomainError, DEFAULT_DNS_PORT};
use std::net::{IpAddr, SocketAddr};
use std::path::Path;
use std::str::FromStr;
use tracing::{debug, warn};

pub const DEFAULT_RESOLV_CONF: &str = "/etc/resolv.conf";

/// The `nameserver` entries of a resolv.conf file, in file order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ResolvConf {
    pub nameservers: Vec<DnsProtocol>,
}

impl ResolvConf {
    pub fn load(path: impl AsRef<Path>) -> Result<Self, DomainError> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|e| {
            DomainError::Config(format!("Failed to read {}: {}", path.display(), e))
        })?;

        let conf = Self::parse(&content);
        debug!(path = %path.display(), nameservers = conf.nameservers.len(), "resolv.conf parsed");
        Ok(conf)
    }

    // Format:
    // nameserver 192.0.2.53
    // nameserver fe80::1%eth0   <- scoped, skipped
    // search example.com
    pub fn parse(content: &str) -> Self {
        let mut nameservers = Vec::new();

        for line in content.lines() {
            let line = line.trim_start();
            if line.starts_with('#') || line.starts_with(';') {
                continue;
            }

            let mut fields = line.split_whitespace();
            if fields.next() != Some("nameserver") {
                continue;
            }
            let Some(addr) = fields.next() else {
                continue;
            };

            match IpAddr::from_str(addr) {
                Ok(ip) => nameservers.push(DnsProtocol::Udp {
                    addr: SocketAddr::new(ip, DEFAULT_DNS_PORT),
                }),
                Err(e) => {
                    warn!(error = %e, nameserver = addr, "Skipping nameserver entry");
                }
            }
        }

        Self { nameservers }
    }
}
