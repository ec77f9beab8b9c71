use crate::domain::model::{FilteredGraph, FirewallRule, SourceKind};
use crate::domain::ports::{NoRetry, RetryStrategy, RuleInference};
use crate::utils::error::{PipelineError, Result};
use async_trait::async_trait;
use regex::Regex;
use reqwest::Client;
use serde::Deserialize;

/// Client for the structured-reasoning service (an OpenAI-compatible chat
/// completion endpoint). One request per pipeline run, declared JSON-object
/// output, validated against the per-path rule schema before acceptance.
pub struct OpenAiRuleClient {
    client: Client,
    base_url: String,
    api_key: String,
    model: String,
    schema: SourceKind,
    retry: Box<dyn RetryStrategy>,
}

#[derive(Deserialize)]
struct ChatResponse {
    choices: Vec<ChatChoice>,
}

#[derive(Deserialize)]
struct ChatChoice {
    message: ChatMessageBody,
}

#[derive(Deserialize)]
struct ChatMessageBody {
    content: String,
}

impl OpenAiRuleClient {
    pub fn new(base_url: String, api_key: String, model: String, schema: SourceKind) -> Self {
        Self {
            client: Client::new(),
            base_url,
            api_key,
            model,
            schema,
            retry: Box::new(NoRetry),
        }
    }

    pub fn with_retry(mut self, retry: Box<dyn RetryStrategy>) -> Self {
        self.retry = retry;
        self
    }

    fn system_prompt(&self) -> &'static str {
        match self.schema {
            SourceKind::StaticExport => {
                "You are a senior network security engineer. Your task is to analyze a structured \
                 JSON object describing system architecture and generate a precise list of \
                 firewall rules. You will respond ONLY with a valid JSON object containing a \
                 single key 'rules', which is a list of rule objects."
            }
            SourceKind::LiveView => {
                "You are a security assistant that generates firewall rules in JSON."
            }
        }
    }

    fn user_prompt(&self, graph_json: &str) -> String {
        match self.schema {
            SourceKind::StaticExport => format!(
                "Analyze the following architecture data and generate a list of firewall rules.\n\
                 \n\
                 Follow these instructions exactly:\n\
                 1. Identify Source and Destination: for each relationship, find the \
                 corresponding source and target elements in the `elements` dictionary. You MUST \
                 parse the `description` field of each element to find the 'Network ID:'. Use \
                 that ID as the value for the 'source' and 'destination' fields in the final \
                 rule.\n\
                 2. Identify Port and Protocol: infer the port and protocol directly from the \
                 relationship's `description` field. The format is typically 'Description \
                 (PROTOCOL PORT)'. Extract this information accurately (e.g. 'connects (TCP \
                 443)' -> 'TCP 443'). If a port cannot be determined, use 'Any'.\n\
                 3. Use Relationship Description: the `description` for each rule must be the \
                 full `description` from the corresponding relationship.\n\
                 4. Format Output: the final output must be a JSON object with a single key \
                 \"rules\", which contains a list of rule objects of the shape \
                 {{\"source\": \"string\", \"destination\": \"string\", \"port\": \"string\", \
                 \"description\": \"string\"}}.\n\
                 \n\
                 Here is the filtered architecture data:\n{}\n\
                 \n\
                 Generate the completed JSON object now.",
                graph_json
            ),
            SourceKind::LiveView => format!(
                "Given system elements and network connections, generate firewall rules. Each \
                 rule should contain: source, target, port, protocol, and purpose.\n\
                 \n\
                 Architecture data:\n{}\n\
                 \n\
                 If port/protocol is not clearly stated, guess common ones. Format like:\n\
                 {{ \"firewall_rules\": [{{\"source\": \"...\", \"target\": \"...\", \"port\": \
                 \"...\", \"protocol\": \"...\", \"purpose\": \"...\"}}] }}",
                graph_json
            ),
        }
    }

    async fn request_rules(&self, graph: &FilteredGraph) -> Result<Vec<FirewallRule>> {
        let graph_json = serde_json::to_string_pretty(graph)?;

        let body = serde_json::json!({
            "model": self.model,
            "messages": [
                {"role": "system", "content": self.system_prompt()},
                {"role": "user", "content": self.user_prompt(&graph_json)},
            ],
            "response_format": {"type": "json_object"},
        });

        tracing::debug!("Sending inference request to: {}/chat/completions", self.base_url);
        let response = self
            .client
            .post(format!("{}/chat/completions", self.base_url))
            .bearer_auth(&self.api_key)
            .json(&body)
            .send()
            .await?;

        let status = response.status();
        tracing::debug!("Inference service response status: {}", status);
        if !status.is_success() {
            return Err(PipelineError::ExternalService(format!(
                "inference service returned {}",
                status
            )));
        }

        let chat: ChatResponse = response.json().await?;
        let content = chat
            .choices
            .first()
            .map(|c| c.message.content.as_str())
            .ok_or_else(|| {
                PipelineError::SchemaValidation("response contains no choices".to_string())
            })?;

        parse_rules(content, self.schema)
    }
}

#[async_trait]
impl RuleInference for OpenAiRuleClient {
    async fn infer(&self, graph: &FilteredGraph) -> Result<Vec<FirewallRule>> {
        let mut attempt = 0;
        loop {
            attempt += 1;
            match self.request_rules(graph).await {
                Ok(rules) => {
                    tracing::info!("Inference service returned {} rules", rules.len());
                    return Ok(rules);
                }
                Err(e) if self.retry.should_retry(attempt, &e) => {
                    tracing::warn!("Inference attempt {} failed, retrying: {}", attempt, e);
                }
                Err(e) => return Err(e),
            }
        }
    }
}

/// Parses and validates the service's JSON answer against the declared
/// schema, normalizing to the common rule shape.
fn parse_rules(content: &str, schema: SourceKind) -> Result<Vec<FirewallRule>> {
    let value: serde_json::Value = serde_json::from_str(content).map_err(|e| {
        PipelineError::SchemaValidation(format!("response is not a JSON object: {}", e))
    })?;

    let key = match schema {
        SourceKind::StaticExport => "rules",
        SourceKind::LiveView => "firewall_rules",
    };

    let entries = value
        .get(key)
        .ok_or_else(|| {
            PipelineError::SchemaValidation(format!("missing expected top-level key '{}'", key))
        })?
        .as_array()
        .ok_or_else(|| {
            PipelineError::SchemaValidation(format!("'{}' is not a list of rule objects", key))
        })?;

    let mut rules = Vec::with_capacity(entries.len());
    for (i, entry) in entries.iter().enumerate() {
        let obj = entry.as_object().ok_or_else(|| {
            PipelineError::SchemaValidation(format!("rule {} is not an object", i))
        })?;

        let rule = match schema {
            SourceKind::StaticExport => {
                let description = string_field(obj, "description").unwrap_or_default();
                FirewallRule {
                    source: required_field(obj, "source", i)?,
                    destination: required_field(obj, "destination", i)?,
                    port: normalize_port(string_field(obj, "port"), &description),
                    description,
                }
            }
            SourceKind::LiveView => {
                let purpose = string_field(obj, "purpose").unwrap_or_default();
                let joined = match (string_field(obj, "protocol"), string_field(obj, "port")) {
                    (Some(protocol), Some(port)) => format!("{} {}", protocol, port),
                    (Some(protocol), None) => protocol,
                    (None, Some(port)) => port,
                    (None, None) => String::new(),
                };
                FirewallRule {
                    source: required_field(obj, "source", i)?,
                    destination: required_field(obj, "target", i)?,
                    port: normalize_port(Some(joined), &purpose),
                    description: purpose,
                }
            }
        };
        rules.push(rule);
    }

    Ok(rules)
}

fn string_field(obj: &serde_json::Map<String, serde_json::Value>, key: &str) -> Option<String> {
    obj.get(key)
        .and_then(|v| v.as_str())
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
}

fn required_field(
    obj: &serde_json::Map<String, serde_json::Value>,
    key: &str,
    index: usize,
) -> Result<String> {
    string_field(obj, key).ok_or_else(|| {
        PipelineError::SchemaValidation(format!("rule {} is missing field '{}'", index, key))
    })
}

/// Falls back to the "<text> (<PROTOCOL> <PORT>)" pattern in the rule's
/// description when the service left the port blank, then to "Any".
fn normalize_port(port: Option<String>, description: &str) -> String {
    if let Some(p) = port.filter(|p| !p.trim().is_empty()) {
        return p.trim().to_string();
    }

    let re = Regex::new(r"\(([A-Za-z]+)\s+(\d+)\)").unwrap();
    if let Some(caps) = re.captures(description) {
        return format!("{} {}", &caps[1], &caps[2]);
    }

    "Any".to_string()
}
