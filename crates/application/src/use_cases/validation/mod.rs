mod pipeline;
mod worker;

pub use pipeline::{DispatchPipeline, PipelineInput, PipelineStats, ResultStream};
pub use worker::{ResolverWorker, TaskReceiver, WorkerReport};
