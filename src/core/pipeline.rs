use crate::core::filter::{filter, FilterOutcome};
use crate::core::render::{render_document, RenderStyle, NO_RULES_SENTINEL};
use crate::domain::model::{FilteredGraph, RuleDocument};
use crate::domain::ports::{ModelSource, RuleInference, Storage};
use crate::utils::error::Result;

#[derive(Debug)]
pub enum PipelineOutcome {
    Generated(RuleDocument),
    /// Designed degenerate case, not a failure: the sentinel text was
    /// written to both output locations and inference was never invoked.
    NoRelationships,
}

/// Sequences extraction -> filter -> inference -> render -> persist. Each
/// stage completes fully before the next begins; outputs are all-or-nothing
/// per run (both renderings exist in memory before either file is written).
pub struct TablePipeline<M: ModelSource, I: RuleInference, S: Storage> {
    source: M,
    inference: I,
    storage: S,
    json_path: String,
    table_path: String,
}

impl<M: ModelSource, I: RuleInference, S: Storage> TablePipeline<M, I, S> {
    pub fn new(
        source: M,
        inference: I,
        storage: S,
        json_path: String,
        table_path: String,
    ) -> Self {
        Self {
            source,
            inference,
            storage,
            json_path,
            table_path,
        }
    }

    pub async fn run(&self) -> Result<PipelineOutcome> {
        tracing::info!("Starting firewall table pipeline");
        let style = RenderStyle::for_source(self.source.kind());

        tracing::info!("Extracting architecture graph...");
        let fetch = self.source.fetch().await?;

        let filtered = if fetch.relationships_present {
            match filter(fetch.graph) {
                FilterOutcome::Subgraph(graph) => graph,
                FilterOutcome::NoRelationships => {
                    tracing::warn!("No relationships found in the model");
                    return self.write_sentinel().await;
                }
            }
        } else {
            // This source strategy never populates relationships; the filter
            // becomes an identity no-op over the elements.
            tracing::warn!("Source provides no relationships; elements pass through unfiltered");
            if fetch.graph.elements.is_empty() {
                return self.write_sentinel().await;
            }
            FilteredGraph {
                elements: fetch.graph.elements,
                relationships: Vec::new(),
            }
        };

        tracing::info!(
            "Filtered subgraph: {} elements, {} relationships",
            filtered.elements.len(),
            filtered.relationships.len()
        );

        tracing::info!("Requesting firewall rules from inference service...");
        let rules = self.inference.infer(&filtered).await?;

        tracing::info!("Rendering {} rules...", rules.len());
        let doc = render_document(rules, &style)?;

        self.storage
            .write_file(&self.json_path, doc.json.as_bytes())
            .await?;
        self.storage
            .write_file(&self.table_path, doc.table.as_bytes())
            .await?;

        tracing::info!(
            "Outputs saved to: {} and {}",
            self.json_path,
            self.table_path
        );
        Ok(PipelineOutcome::Generated(doc))
    }

    async fn write_sentinel(&self) -> Result<PipelineOutcome> {
        tracing::info!("Writing 'no rules' sentinel to both output locations");
        self.storage
            .write_file(&self.json_path, NO_RULES_SENTINEL.as_bytes())
            .await?;
        self.storage
            .write_file(&self.table_path, NO_RULES_SENTINEL.as_bytes())
            .await?;
        Ok(PipelineOutcome::NoRelationships)
    }
}
