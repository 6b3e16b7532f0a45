pub mod artifacts;
pub mod cli;
pub mod config;
pub mod discovery;
pub mod normalize;
pub mod pipeline;
pub mod probe;
pub mod report;
pub mod resolve;
pub mod scan;
pub mod tools;
pub mod trace;

pub use pipeline::{Pipeline, PipelineOptions, StageOutcome};
pub use resolve::ResolvedHost;
