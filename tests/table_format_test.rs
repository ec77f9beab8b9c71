use anyhow::Result;
use fwtable::core::SourceKind;
use fwtable::domain::ports::{RuleInference, Storage};
use fwtable::{LocalStorage, OpenAiRuleClient, PipelineOutcome, StaticModelSource, TablePipeline};
use httpmock::prelude::*;
use tempfile::TempDir;

const MODEL_JSON: &str = r#"{
    "elements": {
        "api": {
            "title": "API Gateway",
            "kind": "container",
            "description": "Network ID: 172.16.0.10",
            "technology": "Kong"
        },
        "svc": {
            "title": "Order Service",
            "kind": "container",
            "description": "Network ID: 172.16.0.20",
            "technology": null
        },
        "cache": {
            "title": "Cache",
            "kind": "container",
            "description": "Network ID: 172.16.0.30",
            "technology": "Redis"
        }
    },
    "relations": {
        "r1": {
            "source": {"model": "api"},
            "target": {"model": "svc"},
            "title": "routes (TCP 8080)"
        },
        "r2": {
            "source": {"model": "svc"},
            "target": {"model": "cache"},
            "title": "reads data from"
        }
    }
}"#;

fn chat_body(content: &serde_json::Value) -> serde_json::Value {
    serde_json::json!({
        "choices": [{"message": {"content": content.to_string()}}]
    })
}

fn static_client(server: &MockServer) -> OpenAiRuleClient {
    OpenAiRuleClient::new(
        server.base_url(),
        "test-key".to_string(),
        "gpt-4o-mini-2024-07-18".to_string(),
        SourceKind::StaticExport,
    )
}

#[tokio::test]
async fn test_table_and_json_agree_rule_for_rule() -> Result<()> {
    let dir = TempDir::new()?;
    let storage = LocalStorage::new(dir.path().to_string_lossy().to_string());
    storage.write_file("dist/model.json", MODEL_JSON.as_bytes()).await?;

    let server = MockServer::start();
    server.mock(|when, then| {
        when.method(POST).path("/chat/completions");
        then.status(200).json_body(chat_body(&serde_json::json!({
            "rules": [
                {
                    "source": "172.16.0.10",
                    "destination": "172.16.0.20",
                    "port": "TCP 8080",
                    "description": "routes (TCP 8080)"
                },
                {
                    "source": "172.16.0.20",
                    "destination": "172.16.0.30",
                    "description": "reads data from"
                }
            ]
        })));
    });

    let source = StaticModelSource::new(storage.clone(), "dist/model.json".to_string());
    let pipeline = TablePipeline::new(
        source,
        static_client(&server),
        storage.clone(),
        "dist/firewall_rules.json".to_string(),
        "dist/FirewallRules.md".to_string(),
    );

    let outcome = pipeline.run().await?;
    let doc = match outcome {
        PipelineOutcome::Generated(doc) => doc,
        PipelineOutcome::NoRelationships => anyhow::bail!("expected generated rules"),
    };

    // Second rule had no port; the client derives the sentinel.
    assert_eq!(doc.rules[1].port, "Any");

    // Data rows line up one-to-one, in order, with the JSON document.
    let table = String::from_utf8(storage.read_file("dist/FirewallRules.md").await?)?;
    let rows: Vec<&str> = table.trim_end().split('\n').skip(2).collect();
    assert_eq!(rows.len(), doc.rules.len());

    let json: serde_json::Value =
        serde_json::from_slice(&storage.read_file("dist/firewall_rules.json").await?)?;
    let json_rules = json["rules"].as_array().unwrap();
    assert_eq!(json_rules.len(), doc.rules.len());

    for (i, rule) in doc.rules.iter().enumerate() {
        assert!(rows[i].contains(&rule.source));
        assert!(rows[i].contains(&rule.destination));
        assert_eq!(json_rules[i]["source"], rule.source.as_str());
        assert_eq!(json_rules[i]["destination"], rule.destination.as_str());
    }

    assert!(table.contains("| 172.16.0.20 | Any | 172.16.0.30 | reads data from |"));
    Ok(())
}

#[tokio::test]
async fn test_inference_alone_preserves_insertion_order() -> Result<()> {
    let server = MockServer::start();
    server.mock(|when, then| {
        when.method(POST).path("/chat/completions");
        then.status(200).json_body(chat_body(&serde_json::json!({
            "rules": [
                {"source": "c", "destination": "d", "port": "Any", "description": "second"},
                {"source": "a", "destination": "b", "port": "Any", "description": "first"}
            ]
        })));
    });

    let graph = fwtable::core::FilteredGraph::default();
    let rules = static_client(&server).infer(&graph).await?;

    assert_eq!(rules[0].description, "second");
    assert_eq!(rules[1].description, "first");
    Ok(())
}
