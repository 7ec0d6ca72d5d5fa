use super::core::ValidatingResolver;
use crate::dns::dnssec::{DnssecCache, DnssecValidator, TrustAnchorStore};
use crate::dns::upstream::{DnsExchange, UpstreamClient};
use crate::system::{ResolvConf, DEFAULT_RESOLV_CONF};
use spark_dns_domain::{DnsProtocol, DomainError, EngineConfig, ResolverMode};
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tracing::info;

/// Forwarders used in built-in mode when the configuration names none.
pub const BUILTIN_UPSTREAMS: &[&str] = &["9.9.9.9", "1.1.1.1", "8.8.8.8"];

pub struct EngineBuilder {
    config: EngineConfig,
    mode: ResolverMode,
    check_security: bool,
    resolv_conf: PathBuf,
}

impl EngineBuilder {
    pub fn new(config: EngineConfig) -> Self {
        Self {
            config,
            mode: ResolverMode::default(),
            check_security: true,
            resolv_conf: PathBuf::from(DEFAULT_RESOLV_CONF),
        }
    }

    pub fn with_mode(mut self, mode: ResolverMode) -> Self {
        self.mode = mode;
        self
    }

    pub fn with_security_check(mut self, enabled: bool) -> Self {
        self.check_security = enabled;
        self
    }

    pub fn with_resolv_conf(mut self, path: impl Into<PathBuf>) -> Self {
        self.resolv_conf = path.into();
        self
    }

    /// The forwarders the engine will try, in order.
    pub fn upstreams(&self) -> Result<Vec<DnsProtocol>, DomainError> {
        let servers = match &self.mode {
            ResolverMode::Forward(protocol) => vec![*protocol],
            ResolverMode::System => ResolvConf::load(&self.resolv_conf)?.nameservers,
            ResolverMode::BuiltIn if !self.config.upstreams.is_empty() => {
                self.config.upstream_protocols()
            }
            ResolverMode::BuiltIn => BUILTIN_UPSTREAMS
                .iter()
                .filter_map(|s| s.parse::<DnsProtocol>().ok())
                .collect(),
        };

        if servers.is_empty() {
            return Err(DomainError::Config(format!(
                "no usable nameservers for resolver mode {}",
                self.mode
            )));
        }
        Ok(servers)
    }

    /// Built-in root anchors plus the configured ones.
    pub fn trust_store(&self) -> Result<TrustAnchorStore, DomainError> {
        let mut store = TrustAnchorStore::new();
        for text in &self.config.trust_anchors {
            store.add_from_text(text)?;
        }
        for path in &self.config.trust_anchor_files {
            store.load_file(path)?;
        }
        Ok(store)
    }

    pub fn build(self) -> Result<ValidatingResolver, DomainError> {
        let servers = self.upstreams()?;
        let client = UpstreamClient::from_config(servers, &self.config)?;

        info!(
            mode = %self.mode,
            upstreams = ?client.servers().iter().map(ToString::to_string).collect::<Vec<_>>(),
            timeout_ms = self.config.timeout_ms,
            dnssec = self.check_security,
            "Building resolution engine"
        );

        let upstream: Arc<dyn DnsExchange> = Arc::new(client);
        let resolver = ValidatingResolver::new(Arc::clone(&upstream));
        if !self.check_security {
            return Ok(resolver);
        }

        let trust_store = self.trust_store()?;
        info!(anchors = trust_store.len(), "DNSSEC validation enabled");

        let cache = Arc::new(DnssecCache::with_max_ttl(Duration::from_secs(
            self.config.key_cache_ttl_secs,
        )));
        Ok(resolver.with_validator(DnssecValidator::with_cache(upstream, trust_store, cache)))
    }
}
