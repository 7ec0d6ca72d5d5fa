use clap::Parser;
use spark_dns_domain::CliOverrides;
use std::time::Duration;
use tracing::info;

mod bootstrap;
mod driver;

#[global_allocator]
static GLOBAL: mimalloc::MiMalloc = mimalloc::MiMalloc;

#[derive(Parser)]
#[command(name = "spark-dns")]
#[command(version)]
#[command(about = "Spark DNS - bulk DNS and DNSSEC status checker for lists of domains")]
struct Cli {
    /// File with one domain name per line (default: standard input)
    #[arg(long, value_name = "FILE")]
    names: Option<String>,

    /// Forwarder address (IP, IP:PORT or IP@PORT), or `none` for the
    /// built-in upstreams. Defaults to /etc/resolv.conf
    #[arg(long, value_name = "ADDR")]
    resolver: Option<String>,

    /// Record type to query, by name or as TYPE<n>
    #[arg(long, value_name = "TYPE", default_value = "A")]
    rrtype: String,

    /// Number of parallel workers
    #[arg(short = 'w', long = "goroutines", value_name = "N", default_value_t = 50)]
    workers: usize,

    /// Print the answer records ahead of each status line
    #[arg(long)]
    print_rrs: bool,

    /// Prefix each name with a random label
    #[arg(long)]
    randomize: bool,

    /// Skip DNSSEC validation and report response codes only
    #[arg(long)]
    insecure: bool,

    /// Engine configuration file (TOML)
    #[arg(short = 'c', long, value_name = "FILE")]
    config: Option<String>,

    /// Give up on a name after this many milliseconds
    #[arg(long, value_name = "MS")]
    task_timeout_ms: Option<u64>,

    /// Deadline of one upstream exchange, overrides the config file
    #[arg(long, value_name = "MS")]
    timeout_ms: Option<u64>,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long, default_value = "warn")]
    log_level: String,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    bootstrap::init_logging(&cli.log_level);
    info!("Starting Spark DNS v{}", env!("CARGO_PKG_VERSION"));

    let input = bootstrap::open_input(cli.names.as_deref()).await?;
    let query_config =
        bootstrap::query_config(&cli.rrtype, !cli.insecure, cli.randomize, cli.print_rrs);
    let mode = bootstrap::resolver_mode(cli.resolver.as_deref())?;

    let overrides = CliOverrides {
        upstreams: None,
        timeout_ms: cli.timeout_ms,
    };
    let engine = bootstrap::build_engine(cli.config.as_deref(), overrides, mode, !cli.insecure)?;

    let stats = driver::run(
        engine,
        query_config,
        cli.workers,
        cli.task_timeout_ms.map(Duration::from_millis),
        input,
    )
    .await?;

    info!(
        submitted = stats.submitted,
        records = stats.records,
        "Spark DNS finished"
    );
    Ok(())
}
