use anyhow::{anyhow, Context};
use spark_dns_application::ports::ResolutionEngine;
use spark_dns_domain::{CliOverrides, EngineConfig, QueryConfig, RecordType, ResolverMode};
use spark_dns_infrastructure::dns::EngineBuilder;
use std::sync::Arc;
use tracing::{info, warn};

pub fn query_config(
    rrtype: &str,
    check_security: bool,
    randomize: bool,
    print_records: bool,
) -> QueryConfig {
    let record_type = match rrtype.parse::<RecordType>() {
        Ok(record_type) => record_type,
        Err(e) => {
            warn!(error = %e, "Keeping the default record type");
            RecordType::parse_query_type(rrtype)
        }
    };

    QueryConfig::new(record_type)
        .with_security_check(check_security)
        .with_randomize(randomize)
        .with_print_records(print_records)
}

pub fn resolver_mode(flag: Option<&str>) -> anyhow::Result<ResolverMode> {
    ResolverMode::from_flag(flag).map_err(|e| anyhow!("Failed to set resolver: {}", e))
}

/// Builds the engine once; it is shared by every worker and dropped when
/// `main` returns.
pub fn build_engine(
    config_path: Option<&str>,
    overrides: CliOverrides,
    mode: ResolverMode,
    check_security: bool,
) -> anyhow::Result<Arc<dyn ResolutionEngine>> {
    if let Some(path) = config_path {
        println!("Reading config file {}", path);
    }
    let config = EngineConfig::load(config_path, overrides)
        .with_context(|| format!("Invalid engine configuration {}", config_path.unwrap_or("")))?;

    let engine = EngineBuilder::new(config)
        .with_mode(mode)
        .with_security_check(check_security)
        .build()
        .context("Failed to set resolver")?;

    info!(dnssec = engine.validates(), "Resolution engine ready");
    Ok(Arc::new(engine))
}
