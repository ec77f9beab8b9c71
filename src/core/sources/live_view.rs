use crate::domain::model::{ArchitectureElement, ModelFetch, RawGraph, SourceKind};
use crate::domain::ports::ModelSource;
use crate::utils::error::{PipelineError, Result};
use async_trait::async_trait;
use rmcp::{model::CallToolRequestParam, transport::SseClientTransport, ServiceExt};
use serde::Deserialize;
use std::collections::HashMap;

/// Live extraction strategy: one `read-view` query against a running
/// model-serving session over MCP/SSE. This path only sees the view's node
/// list, so the returned graph never carries relationships.
pub struct LiveViewSource {
    port: u16,
    view_id: String,
}

#[derive(Deserialize)]
struct ViewDoc {
    #[serde(default)]
    nodes: Vec<NodeDoc>,
}

#[derive(Deserialize)]
struct NodeDoc {
    id: Option<String>,
    title: Option<String>,
    represents: Option<RepresentsDoc>,
}

#[derive(Deserialize)]
struct RepresentsDoc {
    element: Option<serde_json::Value>,
}

impl LiveViewSource {
    pub fn new(port: u16, view_id: String) -> Self {
        Self { port, view_id }
    }

    /// Opens the streaming session, issues the query, and tears the session
    /// down once the full response has arrived.
    async fn read_view(&self) -> Result<String> {
        let url = format!("http://localhost:{}/sse", self.port);
        tracing::info!("Connecting to model-serving session at: {}", url);

        let transport = SseClientTransport::start(url).await.map_err(|e| {
            PipelineError::ExternalService(format!("failed to open MCP session: {}", e))
        })?;

        let client = ().serve(transport).await.map_err(|e| {
            PipelineError::ExternalService(format!("MCP handshake failed: {}", e))
        })?;

        tracing::info!("Calling read-view tool for '{}'", self.view_id);
        let result = client
            .call_tool(CallToolRequestParam {
                name: "read-view".into(),
                arguments: serde_json::json!({ "id": self.view_id }).as_object().cloned(),
            })
            .await;

        let text = match result {
            Ok(res) => res
                .content
                .iter()
                .filter_map(|c| c.as_text())
                .map(|t| t.text.as_str())
                .collect::<String>(),
            Err(e) => {
                client.cancel().await.ok();
                return Err(PipelineError::ExternalService(format!(
                    "read-view call failed: {}",
                    e
                )));
            }
        };

        client.cancel().await.ok();
        tracing::info!("View content received");
        Ok(text)
    }
}

/// Walks the view payload's node list. Parse failure yields an empty graph
/// rather than an error; nodes without an id or a resolved "represents"
/// reference are skipped.
pub(crate) fn parse_view(text: &str) -> RawGraph {
    let doc: ViewDoc = match serde_json::from_str(text) {
        Ok(doc) => doc,
        Err(e) => {
            tracing::error!("Failed to parse view content as JSON: {}", e);
            return RawGraph::default();
        }
    };

    let mut elements = HashMap::new();
    for node in doc.nodes {
        let id = match node.id {
            Some(id) => id,
            None => continue,
        };
        let represents = node.represents.and_then(|r| r.element);
        if represents.is_none() || represents.as_ref().is_some_and(|e| e.is_null()) {
            continue;
        }

        let element = ArchitectureElement {
            title: node.title.unwrap_or_else(|| id.clone()),
            kind: "unknown".to_string(),
            description: String::new(),
            technology: None,
            id: id.clone(),
        };
        elements.insert(id, element);
    }

    tracing::info!("Parsed {} elements from view", elements.len());
    RawGraph {
        elements,
        relationships: Vec::new(),
    }
}

#[async_trait]
impl ModelSource for LiveViewSource {
    async fn fetch(&self) -> Result<ModelFetch> {
        let text = self.read_view().await?;
        let graph = parse_view(&text);

        Ok(ModelFetch {
            graph,
            relationships_present: false,
        })
    }

    fn kind(&self) -> SourceKind {
        SourceKind::LiveView
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_view_builds_elements_with_unknown_kind() {
        let payload = r#"{
            "nodes": [
                {"id": "web", "title": "Web App", "represents": {"element": "shop.web"}},
                {"id": "db", "title": "Database", "represents": {"element": "shop.db"}}
            ]
        }"#;

        let graph = parse_view(payload);

        assert_eq!(graph.elements.len(), 2);
        assert!(graph.relationships.is_empty());
        let web = &graph.elements["web"];
        assert_eq!(web.title, "Web App");
        assert_eq!(web.kind, "unknown");
        assert!(web.description.is_empty());
    }

    #[test]
    fn test_parse_view_skips_nodes_without_represents() {
        let payload = r#"{
            "nodes": [
                {"id": "group", "title": "Boundary"},
                {"id": "web", "title": "Web", "represents": {"element": "shop.web"}}
            ]
        }"#;

        let graph = parse_view(payload);
        assert_eq!(graph.elements.len(), 1);
        assert!(graph.elements.contains_key("web"));
    }

    #[test]
    fn test_parse_failure_yields_empty_graph() {
        let graph = parse_view("not even close to json");
        assert!(graph.elements.is_empty());
        assert!(graph.relationships.is_empty());
    }

    #[test]
    fn test_title_falls_back_to_id() {
        let payload = r#"{"nodes": [{"id": "web", "represents": {"element": "shop.web"}}]}"#;
        let graph = parse_view(payload);
        assert_eq!(graph.elements["web"].title, "web");
    }
}
