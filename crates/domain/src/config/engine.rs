use serde::{Deserialize, Serialize};

use super::errors::ConfigError;
use crate::dns_protocol::DnsProtocol;

/// Smallest EDNS(0) payload a forwarder is offered (RFC 6891 §6.2.5).
pub const MIN_EDNS_PAYLOAD: u16 = 512;

/// Largest EDNS(0) payload a forwarder is offered.
pub const MAX_EDNS_PAYLOAD: u16 = 4096;

/// Settings of the resolution engine, loaded from an optional TOML file.
///
/// ```toml
/// upstreams = ["9.9.9.9", "tcp://1.1.1.1:53", "192.0.2.53@5353"]
/// timeout_ms = 3000
/// tcp_fallback = true
/// edns_payload = 1232
/// trust_anchor_files = ["/etc/spark-dns/root.key"]
/// ```
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq, Eq)]
pub struct EngineConfig {
    /// Forwarders tried in order. Used when the resolver mode is built-in.
    #[serde(default)]
    pub upstreams: Vec<String>,

    /// Deadline of one network exchange, in milliseconds.
    #[serde(default = "default_timeout_ms")]
    pub timeout_ms: u64,

    /// Retry truncated UDP answers over TCP.
    #[serde(default = "default_true")]
    pub tcp_fallback: bool,

    /// Advertised EDNS(0) UDP payload size, 512 to 4096.
    #[serde(default = "default_edns_payload")]
    pub edns_payload: u16,

    /// Extra trust anchors as DNSKEY presentation text.
    #[serde(default)]
    pub trust_anchors: Vec<String>,

    /// Files holding one DNSKEY anchor per line.
    #[serde(default)]
    pub trust_anchor_files: Vec<String>,

    /// Upper bound on how long validated keys stay cached.
    #[serde(default = "default_key_cache_ttl_secs")]
    pub key_cache_ttl_secs: u64,
}

fn default_timeout_ms() -> u64 {
    5000
}

fn default_true() -> bool {
    true
}

fn default_edns_payload() -> u16 {
    1232
}

fn default_key_cache_ttl_secs() -> u64 {
    3600
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            upstreams: Vec::new(),
            timeout_ms: default_timeout_ms(),
            tcp_fallback: true,
            edns_payload: default_edns_payload(),
            trust_anchors: Vec::new(),
            trust_anchor_files: Vec::new(),
            key_cache_ttl_secs: default_key_cache_ttl_secs(),
        }
    }
}

impl EngineConfig {
    /// Load the named file, or defaults when no path is given, then apply
    /// command-line overrides and validate.
    pub fn load(path: Option<&str>, cli_overrides: CliOverrides) -> Result<Self, ConfigError> {
        let mut config = match path {
            Some(path) => Self::from_file(path)?,
            None => Self::default(),
        };

        config.apply_cli_overrides(cli_overrides);
        config.validate()?;
        Ok(config)
    }

    pub fn from_file(path: &str) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path)
            .map_err(|e| ConfigError::FileRead(path.to_string(), e.to_string()))?;
        let config: Self = toml::from_str(&contents).map_err(|e| ConfigError::Parse(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    fn apply_cli_overrides(&mut self, overrides: CliOverrides) {
        if let Some(timeout_ms) = overrides.timeout_ms {
            self.timeout_ms = timeout_ms;
        }
        if let Some(upstreams) = overrides.upstreams {
            self.upstreams = upstreams;
        }
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.timeout_ms == 0 {
            return Err(ConfigError::Validation("timeout_ms cannot be 0".to_string()));
        }

        if !(MIN_EDNS_PAYLOAD..=MAX_EDNS_PAYLOAD).contains(&self.edns_payload) {
            return Err(ConfigError::Validation(format!(
                "edns_payload must be between {} and {}, got {}",
                MIN_EDNS_PAYLOAD, MAX_EDNS_PAYLOAD, self.edns_payload
            )));
        }

        for upstream in &self.upstreams {
            upstream
                .parse::<DnsProtocol>()
                .map_err(ConfigError::Validation)?;
        }

        Ok(())
    }

    /// Parsed forwarders. Only valid after `validate` succeeded.
    pub fn upstream_protocols(&self) -> Vec<DnsProtocol> {
        self.upstreams
            .iter()
            .filter_map(|u| u.parse::<DnsProtocol>().ok())
            .collect()
    }
}

/// Command-line overrides for the engine configuration.
#[derive(Debug, Default)]
pub struct CliOverrides {
    pub upstreams: Option<Vec<String>>,
    pub timeout_ms: Option<u64>,
}
