/// Review pipeline: prompts, declared schemas, typed replies and the
/// service that ties them to a [`ModelProvider`](crate::model::ModelProvider).
pub mod prompts;
pub mod schema;
pub mod service;
pub mod types;

pub use service::ReviewService;
pub use types::{
    AnalysisResult, Bug, Category, ExecutionTrace, Improvement, RefineResponse, Severity,
    TraceStep, VariableState,
};
