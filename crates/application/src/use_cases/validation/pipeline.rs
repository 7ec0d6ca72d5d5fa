use super::worker::{ResolverWorker, WorkerReport};
use crate::ports::ResolutionEngine;
use spark_dns_domain::{DomainError, QueryConfig, ResultRecord};
use std::sync::Arc;
use std::time::Duration;
use tokio::io::{AsyncBufRead, AsyncBufReadExt};
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

/// Counters of one pipeline run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PipelineStats {
    pub submitted: u64,
    pub completed: u64,
    pub records: u64,
}

/// Fixed pool of resolver workers behind two bounded queues.
pub struct DispatchPipeline {
    engine: Arc<dyn ResolutionEngine>,
    config: Arc<QueryConfig>,
    workers: usize,
    task_timeout: Option<Duration>,
}

impl DispatchPipeline {
    pub fn new(engine: Arc<dyn ResolutionEngine>, config: Arc<QueryConfig>, workers: usize) -> Self {
        Self {
            engine,
            config,
            workers,
            task_timeout: None,
        }
    }

    pub fn with_task_timeout(mut self, task_timeout: Option<Duration>) -> Self {
        self.task_timeout = task_timeout;
        self
    }

    /// Starts `workers` workers with default settings.
    pub fn start(
        engine: Arc<dyn ResolutionEngine>,
        config: Arc<QueryConfig>,
        workers: usize,
    ) -> Result<(PipelineInput, ResultStream), DomainError> {
        Self::new(engine, config, workers).launch()
    }

    /// Spawns the workers. Must be called from within a Tokio runtime.
    pub fn launch(self) -> Result<(PipelineInput, ResultStream), DomainError> {
        if self.workers == 0 {
            return Err(DomainError::Config(
                "worker count must be at least 1".to_string(),
            ));
        }

        let capacity = self.workers * 2;
        let (task_tx, tasks) = async_channel::bounded::<String>(capacity);
        let (result_tx, result_rx) = mpsc::channel::<ResultRecord>(capacity);

        let shutdown = CancellationToken::new();
        let mut stop_tokens = Vec::with_capacity(self.workers);
        let mut handles = Vec::with_capacity(self.workers);

        for id in 0..self.workers {
            let stop = shutdown.child_token();
            let worker = ResolverWorker::new(
                id,
                Arc::clone(&self.engine),
                Arc::clone(&self.config),
                tasks.clone(),
                result_tx.clone(),
                stop.clone(),
            )
            .with_task_timeout(self.task_timeout);

            stop_tokens.push(stop);
            handles.push(tokio::spawn(worker.run()));
        }

        info!(
            workers = self.workers,
            capacity,
            record_type = %self.config.record_type,
            check_security = self.config.check_security,
            randomize = self.config.randomize,
            "Dispatch pipeline started"
        );

        let input = PipelineInput {
            tasks: task_tx,
            results: result_tx,
            stop_tokens,
            handles,
            submitted: 0,
        };

        Ok((input, ResultStream { results: result_rx }))
    }
}

/// Feeding side of a running pipeline. Also the coordinator: it alone
/// stops the workers and closes both queues.
pub struct PipelineInput {
    tasks: async_channel::Sender<String>,
    results: mpsc::Sender<ResultRecord>,
    stop_tokens: Vec<CancellationToken>,
    handles: Vec<JoinHandle<WorkerReport>>,
    submitted: u64,
}

impl PipelineInput {
    /// Queues one name. Waits while the queue is full.
    pub async fn submit(&mut self, name: String) -> Result<(), DomainError> {
        self.tasks
            .send(name)
            .await
            .map_err(|_| DomainError::Config("all workers have stopped".to_string()))?;
        self.submitted += 1;
        Ok(())
    }

    /// Submits every non-empty trimmed line of `source`, then shuts the
    /// pipeline down. A read error ends the input like end of file.
    pub async fn feed<R>(mut self, source: R) -> PipelineStats
    where
        R: AsyncBufRead + Unpin,
    {
        let mut lines = source.lines();

        loop {
            match lines.next_line().await {
                Ok(Some(line)) => {
                    let name = line.trim();
                    if name.is_empty() {
                        continue;
                    }
                    if let Err(e) = self.submit(name.to_string()).await {
                        warn!(error = %e, domain = %name, "Failed to submit task");
                        break;
                    }
                }
                Ok(None) => break,
                Err(e) => {
                    warn!(error = %e, "Failed to read input, finishing with what was read");
                    break;
                }
            }
        }

        self.shutdown().await
    }

    /// Stops every worker, waits for all of them, then closes the queues.
    pub async fn shutdown(self) -> PipelineStats {
        let PipelineInput {
            tasks,
            results,
            stop_tokens,
            handles,
            submitted,
        } = self;

        for stop in &stop_tokens {
            stop.cancel();
        }

        let mut stats = PipelineStats {
            submitted,
            ..PipelineStats::default()
        };

        for handle in handles {
            match handle.await {
                Ok(report) => {
                    debug!(worker = report.id, tasks = report.tasks, "Worker joined");
                    stats.completed += report.tasks;
                    stats.records += report.records;
                }
                Err(e) => warn!(error = %e, "Worker terminated abnormally"),
            }
        }

        drop(tasks);
        drop(results);

        info!(
            submitted = stats.submitted,
            completed = stats.completed,
            records = stats.records,
            "Dispatch pipeline finished"
        );

        stats
    }
}

/// Results in completion order. Ends once every worker has stopped.
pub struct ResultStream {
    results: mpsc::Receiver<ResultRecord>,
}

impl ResultStream {
    pub async fn recv(&mut self) -> Option<ResultRecord> {
        self.results.recv().await
    }
}
