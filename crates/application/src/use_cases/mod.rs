pub mod validation;

// Re-export use cases
pub use validation::{
    DispatchPipeline, PipelineInput, PipelineStats, ResolverWorker, ResultStream, TaskReceiver,
};
