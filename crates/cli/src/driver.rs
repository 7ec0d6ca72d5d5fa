use anyhow::Context;
use spark_dns_application::ports::ResolutionEngine;
use spark_dns_application::use_cases::{DispatchPipeline, PipelineStats, ResultStream};
use spark_dns_domain::QueryConfig;
use std::sync::Arc;
use std::time::Duration;
use tokio::io::{AsyncBufRead, AsyncWrite, AsyncWriteExt};
use tracing::{debug, warn};

/// Runs every name of `input` through the pipeline and prints the results
/// to stdout as they arrive.
pub async fn run<R>(
    engine: Arc<dyn ResolutionEngine>,
    config: QueryConfig,
    workers: usize,
    task_timeout: Option<Duration>,
    input: R,
) -> anyhow::Result<PipelineStats>
where
    R: AsyncBufRead + Unpin,
{
    run_with_output(engine, config, workers, task_timeout, input, tokio::io::stdout()).await
}

pub async fn run_with_output<R, W>(
    engine: Arc<dyn ResolutionEngine>,
    config: QueryConfig,
    workers: usize,
    task_timeout: Option<Duration>,
    input: R,
    output: W,
) -> anyhow::Result<PipelineStats>
where
    R: AsyncBufRead + Unpin,
    W: AsyncWrite + Unpin + Send + 'static,
{
    let (feeder, results) = DispatchPipeline::new(engine, Arc::new(config), workers)
        .with_task_timeout(task_timeout)
        .launch()
        .context("Failed to start the dispatch pipeline")?;

    let printer = tokio::spawn(print_results(results, output));
    let stats = feeder.feed(input).await;
    let printed = printer.await.context("Result printer stopped unexpectedly")?;

    debug!(printed, "Result stream closed");
    Ok(stats)
}

/// Drains the stream until the pipeline closes it. Write failures are
/// logged once and the rest of the stream is discarded, so workers never
/// block on a full result queue.
async fn print_results<W>(mut results: ResultStream, mut output: W) -> u64
where
    W: AsyncWrite + Unpin,
{
    let mut printed = 0;
    let mut broken = false;

    while let Some(record) = results.recv().await {
        if broken {
            continue;
        }
        let line = format!("{}\n", record);
        match output.write_all(line.as_bytes()).await {
            Ok(()) => printed += 1,
            Err(e) => {
                warn!(error = %e, "Failed to write result, discarding the rest");
                broken = true;
            }
        }
    }

    if !broken {
        if let Err(e) = output.flush().await {
            warn!(error = %e, "Failed to flush results");
        }
    }
    printed
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use spark_dns_domain::{DnsQuery, DomainError, RecordType, ResolutionOutcome};
    use tokio::io::AsyncReadExt;

    struct NxDomainEngine;

    #[async_trait]
    impl ResolutionEngine for NxDomainEngine {
        async fn resolve(&self, query: &DnsQuery) -> Result<ResolutionOutcome, DomainError> {
            Ok(ResolutionOutcome::new(query.fqdn(), 3))
        }
    }

    #[tokio::test]
    async fn test_run_prints_one_line_per_name() {
        let input: &[u8] = b"example.com\n\n  example.org  \nexample.net\n";
        let (writer, mut reader) = tokio::io::duplex(64 * 1024);

        let stats = run_with_output(
            Arc::new(NxDomainEngine),
            QueryConfig::new(RecordType::A).with_security_check(false),
            4,
            None,
            input,
            writer,
        )
        .await
        .unwrap();
        assert_eq!(stats.submitted, 3);

        let mut printed = String::new();
        reader.read_to_string(&mut printed).await.unwrap();
        let mut lines: Vec<&str> = printed.lines().collect();
        lines.sort_unstable();
        assert_eq!(
            lines,
            vec![
                "example.com. : nodata (3 - nxdomain)",
                "example.net. : nodata (3 - nxdomain)",
                "example.org. : nodata (3 - nxdomain)",
            ]
        );
    }

    #[tokio::test]
    async fn test_run_rejects_zero_workers() {
        let input: &[u8] = b"example.com\n";
        let (writer, _reader) = tokio::io::duplex(1024);

        let result = run_with_output(
            Arc::new(NxDomainEngine),
            QueryConfig::default(),
            0,
            None,
            input,
            writer,
        )
        .await;
        assert!(result.is_err());
    }
}
