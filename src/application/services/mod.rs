//! Application services for pipeline stage transitions and detail edits.

mod pipeline;

pub use pipeline::{
    EditApplicationRequest, PipelineError, PipelineResult, PipelineService,
    TransitionApplicationRequest, TransitionOutcome,
};
