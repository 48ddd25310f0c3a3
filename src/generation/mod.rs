//! Batch generation: partitioning, prompt rendering, the generator boundary and the
//! bounded-concurrency executor.

pub mod batch;
pub mod executor;
pub mod generator;
pub mod prompt;

pub use batch::{partition_batches, Batch, BatchId, BatchOutcome, BatchState, GeneratedText};
pub use executor::{
    BatchExecutor, ExecutionReport, ExecutionSummary, ExecutorSettings, DEFAULT_SENTINEL,
};
pub use generator::{parse_items, GenerationRequest, Generator, ItemDescriptor, ProviderGenerator};
pub use prompt::PromptRenderer;
