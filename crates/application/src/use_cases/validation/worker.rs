use crate::ports::ResolutionEngine;
use crate::services::{probe_name, ResultClassifier, MAX_RANDOMIZABLE_LEN};
use spark_dns_domain::{DnsQuery, DomainError, QueryConfig, ResultRecord};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

/// Receive side of the task queue. Every worker holds its own clone; the
/// queue hands each name to exactly one of them.
pub type TaskReceiver = async_channel::Receiver<String>;

/// What a worker did before it stopped.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct WorkerReport {
    pub id: usize,
    pub tasks: u64,
    pub records: u64,
}

pub struct ResolverWorker {
    id: usize,
    engine: Arc<dyn ResolutionEngine>,
    config: Arc<QueryConfig>,
    tasks: TaskReceiver,
    results: mpsc::Sender<ResultRecord>,
    stop: CancellationToken,
    task_timeout: Option<Duration>,
}

impl ResolverWorker {
    pub fn new(
        id: usize,
        engine: Arc<dyn ResolutionEngine>,
        config: Arc<QueryConfig>,
        tasks: TaskReceiver,
        results: mpsc::Sender<ResultRecord>,
        stop: CancellationToken,
    ) -> Self {
        Self {
            id,
            engine,
            config,
            tasks,
            results,
            stop,
            task_timeout: None,
        }
    }

    /// Bound each engine call; an expired call yields `Query timeout`.
    pub fn with_task_timeout(mut self, task_timeout: Option<Duration>) -> Self {
        self.task_timeout = task_timeout;
        self
    }

    /// Processes tasks until stopped or the queue is closed.
    ///
    /// Tasks win over the stop signal: once stopped, the worker keeps
    /// draining whatever is still queued and only then returns.
    pub async fn run(self) -> WorkerReport {
        let mut report = WorkerReport {
            id: self.id,
            ..WorkerReport::default()
        };

        loop {
            tokio::select! {
                biased;
                task = self.tasks.recv() => match task {
                    Ok(name) => {
                        if !self.handle(name, &mut report).await {
                            break;
                        }
                    }
                    Err(_) => {
                        debug!(worker = self.id, "Task queue closed");
                        break;
                    }
                },
                _ = self.stop.cancelled() => {
                    self.drain(&mut report).await;
                    debug!(worker = self.id, tasks = report.tasks, "Worker stopped");
                    break;
                }
            }
        }

        report
    }

    async fn drain(&self, report: &mut WorkerReport) {
        while let Ok(name) = self.tasks.try_recv() {
            if !self.handle(name, report).await {
                return;
            }
        }
    }

    /// Returns `false` once the result stream has gone away.
    async fn handle(&self, name: String, report: &mut WorkerReport) -> bool {
        let records = self.process(&name).await;
        report.tasks += 1;

        for record in records {
            if self.results.send(record).await.is_err() {
                warn!(worker = self.id, domain = %name, "Result stream closed, stopping worker");
                return false;
            }
            report.records += 1;
        }

        true
    }

    /// Resolves and classifies one name. Never fails: engine errors become
    /// an output line of their own.
    pub async fn process(&self, name: &str) -> Vec<ResultRecord> {
        let queried = if self.config.randomize {
            if name.len() > MAX_RANDOMIZABLE_LEN {
                return ResultClassifier::too_long(name);
            }
            match probe_name(name) {
                Ok(probed) => probed,
                Err(e) => return ResultClassifier::failure(name, &e),
            }
        } else {
            name.to_string()
        };

        let query = DnsQuery::new(queried.as_str(), self.config.record_type);

        let resolution = match self.task_timeout {
            Some(limit) => tokio::time::timeout(limit, self.engine.resolve(&query))
                .await
                .unwrap_or(Err(DomainError::QueryTimeout)),
            None => self.engine.resolve(&query).await,
        };

        match resolution {
            Ok(outcome) => {
                debug!(
                    worker = self.id,
                    domain = %queried,
                    rcode = outcome.rcode,
                    secure = outcome.secure,
                    bogus = outcome.bogus,
                    "Resolved"
                );
                ResultClassifier::classify(&queried, &outcome, &self.config)
            }
            Err(e) => {
                debug!(worker = self.id, domain = %queried, error = %e, "Resolution failed");
                ResultClassifier::failure(&queried, &e)
            }
        }
    }
}
