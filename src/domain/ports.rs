use crate::domain::model::{FilteredGraph, FirewallRule, ModelFetch, SourceKind};
use crate::utils::error::{PipelineError, Result};
use async_trait::async_trait;

/// One of the two mutually exclusive graph acquisition strategies. A source
/// never mixes strategies within one pipeline run.
#[async_trait]
pub trait ModelSource: Send + Sync {
    async fn fetch(&self) -> Result<ModelFetch>;
    fn kind(&self) -> SourceKind;
}

/// One call to the external structured-reasoning service, validated against
/// the declared rule schema before the result is accepted.
#[async_trait]
pub trait RuleInference: Send + Sync {
    async fn infer(&self, graph: &FilteredGraph) -> Result<Vec<FirewallRule>>;
}

pub trait Storage: Send + Sync {
    fn read_file(&self, path: &str) -> impl std::future::Future<Output = Result<Vec<u8>>> + Send;
    fn write_file(
        &self,
        path: &str,
        data: &[u8],
    ) -> impl std::future::Future<Output = Result<()>> + Send;
}

/// Decides whether a failed inference attempt should be retried. The
/// pipeline ships with [`NoRetry`]; a bounded re-prompt strategy can be
/// swapped in without touching the client.
pub trait RetryStrategy: Send + Sync {
    /// `attempt` is 1-based and counts the attempt that just failed.
    fn should_retry(&self, attempt: usize, error: &PipelineError) -> bool;
}

/// Every external-service failure is terminal for the run.
pub struct NoRetry;

impl RetryStrategy for NoRetry {
    fn should_retry(&self, _attempt: usize, _error: &PipelineError) -> bool {
        false
    }
}

/// Free-text editing of the architecture model's source notation: takes a
/// document and an instruction, returns a replacement document. External
/// tooling implements this; the rule pipeline never calls it.
#[async_trait]
pub trait ModelEditor: Send + Sync {
    async fn edit(&self, document: &str, instruction: &str) -> Result<String>;
}
