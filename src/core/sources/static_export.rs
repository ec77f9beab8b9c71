use crate::domain::model::{
    ArchitectureElement, ModelFetch, RawGraph, Relationship, SourceKind,
};
use crate::domain::ports::{ModelSource, Storage};
use crate::utils::error::{PipelineError, Result};
use async_trait::async_trait;
use serde::Deserialize;
use std::collections::HashMap;

/// Static extraction strategy: reads a previously exported model document
/// from disk. The export itself is an external collaborator the entry point
/// is expected to have run beforehand.
pub struct StaticModelSource<S: Storage> {
    storage: S,
    model_path: String,
}

#[derive(Deserialize)]
struct ModelDoc {
    #[serde(default)]
    elements: HashMap<String, ElementDoc>,
    #[serde(default)]
    relations: HashMap<String, RelationDoc>,
}

#[derive(Deserialize)]
struct ElementDoc {
    title: Option<String>,
    kind: Option<String>,
    description: Option<String>,
    technology: Option<String>,
}

/// Relation entries nest their endpoint ids one level deep under a `model`
/// accessor; the adapter flattens them to scalar ids.
#[derive(Deserialize)]
struct RelationDoc {
    source: Option<EndpointDoc>,
    target: Option<EndpointDoc>,
    title: Option<String>,
}

#[derive(Deserialize)]
struct EndpointDoc {
    model: Option<String>,
}

impl<S: Storage> StaticModelSource<S> {
    pub fn new(storage: S, model_path: String) -> Self {
        Self {
            storage,
            model_path,
        }
    }

    fn parse_model(&self, data: &[u8]) -> Result<RawGraph> {
        let doc: ModelDoc = serde_json::from_slice(data).map_err(|e| {
            PipelineError::MalformedModel(format!("'{}': {}", self.model_path, e))
        })?;

        let elements: HashMap<String, ArchitectureElement> = doc
            .elements
            .into_iter()
            .map(|(id, e)| {
                let element = ArchitectureElement {
                    id: id.clone(),
                    title: e.title.unwrap_or_else(|| id.clone()),
                    kind: e.kind.unwrap_or_else(|| "unknown".to_string()),
                    description: e.description.unwrap_or_default(),
                    technology: e.technology,
                };
                (id, element)
            })
            .collect();

        let mut relationships = Vec::with_capacity(doc.relations.len());
        for (rel_id, rel) in doc.relations {
            let source = rel.source.and_then(|s| s.model);
            let target = rel.target.and_then(|t| t.model);

            match (source, target) {
                (Some(source), Some(target)) => relationships.push(Relationship {
                    source,
                    target,
                    description: rel.title.unwrap_or_else(|| "No description".to_string()),
                }),
                _ => {
                    // Relations missing either endpoint id are skipped, never abort.
                    tracing::warn!("Skipping relation '{}' with missing endpoint id", rel_id);
                }
            }
        }

        Ok(RawGraph {
            elements,
            relationships,
        })
    }
}

#[async_trait]
impl<S: Storage> ModelSource for StaticModelSource<S> {
    async fn fetch(&self) -> Result<ModelFetch> {
        tracing::info!("Reading exported model from: {}", self.model_path);

        let data = match self.storage.read_file(&self.model_path).await {
            Ok(data) => data,
            Err(PipelineError::IoError(e)) if e.kind() == std::io::ErrorKind::NotFound => {
                return Err(PipelineError::NotFound(format!(
                    "'{}' not found. Run the model export step first.",
                    self.model_path
                )));
            }
            Err(e) => return Err(e),
        };

        let graph = self.parse_model(&data)?;
        tracing::info!(
            "Parsed {} elements and {} relationships",
            graph.elements.len(),
            graph.relationships.len()
        );

        Ok(ModelFetch {
            graph,
            relationships_present: true,
        })
    }

    fn kind(&self) -> SourceKind {
        SourceKind::StaticExport
    }
}
