use crate::dns::forwarding::{DnsResponse, MessageBuilder, QueryOptions, ResponseParser};
use crate::dns::transport;
use async_trait::async_trait;
use spark_dns_domain::{DnsProtocol, DnsQuery, DomainError, EngineConfig};
use std::time::{Duration, Instant};
use tracing::{debug, warn};

/// One question, one answer. The validator fetches DS and DNSKEY sets
/// through this seam.
#[async_trait]
pub trait DnsExchange: Send + Sync {
    async fn exchange(
        &self,
        query: &DnsQuery,
        checking_disabled: bool,
    ) -> Result<DnsResponse, DomainError>;
}

pub struct UpstreamResponse {
    pub response: DnsResponse,
    pub server: DnsProtocol,
    pub latency_ms: u64,
}

/// Forwarders tried in order until one answers.
pub struct UpstreamClient {
    servers: Vec<DnsProtocol>,
    timeout: Duration,
    tcp_fallback: bool,
    edns_payload: u16,
}

impl UpstreamClient {
    pub fn new(servers: Vec<DnsProtocol>) -> Result<Self, DomainError> {
        if servers.is_empty() {
            return Err(DomainError::NoUpstreams);
        }
        let defaults = EngineConfig::default();
        Ok(Self {
            servers,
            timeout: Duration::from_millis(defaults.timeout_ms),
            tcp_fallback: defaults.tcp_fallback,
            edns_payload: defaults.edns_payload,
        })
    }

    pub fn from_config(
        servers: Vec<DnsProtocol>,
        config: &EngineConfig,
    ) -> Result<Self, DomainError> {
        Ok(Self::new(servers)?
            .with_timeout(Duration::from_millis(config.timeout_ms))
            .with_tcp_fallback(config.tcp_fallback)
            .with_edns_payload(config.edns_payload))
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn with_tcp_fallback(mut self, enabled: bool) -> Self {
        self.tcp_fallback = enabled;
        self
    }

    pub fn with_edns_payload(mut self, payload: u16) -> Self {
        self.edns_payload = payload;
        self
    }

    pub fn servers(&self) -> &[DnsProtocol] {
        &self.servers
    }

    pub async fn query(
        &self,
        query: &DnsQuery,
        checking_disabled: bool,
    ) -> Result<UpstreamResponse, DomainError> {
        let options = QueryOptions {
            dnssec_ok: true,
            checking_disabled,
            edns_payload: self.edns_payload,
        };
        let (id, query_bytes) = MessageBuilder::build_query(query, &options)?;

        let mut last_error = DomainError::NoUpstreams;
        for (index, protocol) in self.servers.iter().enumerate() {
            let start = Instant::now();
            match self.query_server(protocol, id, &query_bytes).await {
                Ok(response) => {
                    let latency_ms = start.elapsed().as_millis() as u64;
                    debug!(
                        server = %protocol,
                        latency_ms,
                        position = index,
                        rcode = response.rcode,
                        "Server responded"
                    );
                    return Ok(UpstreamResponse {
                        response,
                        server: *protocol,
                        latency_ms,
                    });
                }
                Err(e) => {
                    warn!(protocol = %protocol, error = %e, position = index, "Failing over");
                    last_error = e;
                }
            }
        }
        Err(last_error)
    }

    async fn query_server(
        &self,
        protocol: &DnsProtocol,
        id: u16,
        query_bytes: &[u8],
    ) -> Result<DnsResponse, DomainError> {
        let start = Instant::now();
        let reply = transport::create_transport(protocol)
            .send(query_bytes, self.timeout)
            .await?;
        let response = Self::parse_matching(id, &reply.bytes)?;

        if !(response.truncated && protocol.is_udp() && self.tcp_fallback) {
            return Ok(response);
        }

        let tcp_protocol = protocol.as_tcp();
        debug!(server = %tcp_protocol, "Response truncated (TC bit), retrying via TCP");

        let remaining = self
            .timeout
            .checked_sub(start.elapsed())
            .unwrap_or(Duration::from_millis(500));
        let reply = transport::create_transport(&tcp_protocol)
            .send(query_bytes, remaining)
            .await?;
        Self::parse_matching(id, &reply.bytes)
    }

    fn parse_matching(id: u16, bytes: &[u8]) -> Result<DnsResponse, DomainError> {
        let response = ResponseParser::parse(bytes)?;
        if response.id != id {
            return Err(DomainError::InvalidDnsResponse(format!(
                "response ID {} does not match query ID {}",
                response.id, id
            )));
        }
        Ok(response)
    }
}

#[async_trait]
impl DnsExchange for UpstreamClient {
    async fn exchange(
        &self,
        query: &DnsQuery,
        checking_disabled: bool,
    ) -> Result<DnsResponse, DomainError> {
        self.query(query, checking_disabled)
            .await
            .map(|upstream| upstream.response)
    }
}
