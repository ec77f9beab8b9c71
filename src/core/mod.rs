pub mod export;
pub mod filter;
pub mod infer;
pub mod pipeline;
pub mod render;
pub mod sources;

pub use crate::domain::model::{
    ArchitectureElement, FilteredGraph, FirewallRule, ModelFetch, RawGraph, Relationship,
    RuleDocument, SourceKind,
};
pub use crate::domain::ports::{ModelSource, RetryStrategy, RuleInference, Storage};
pub use crate::utils::error::Result;
