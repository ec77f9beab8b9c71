use crate::domain::model::{FirewallRule, RuleDocument, SourceKind};
use crate::utils::error::Result;

pub const NO_RULES_SENTINEL: &str =
    "No rules could be generated because the C4 model does not contain any relationships.";

/// Rendering conventions differ between the two pipeline paths and are kept
/// that way on purpose: the placeholder is an explicit value the driver
/// hands in per path, not a hidden default.
#[derive(Debug, Clone)]
pub struct RenderStyle {
    pub top_level_key: &'static str,
    pub missing_field: &'static str,
}

impl RenderStyle {
    pub fn for_source(kind: SourceKind) -> Self {
        match kind {
            SourceKind::StaticExport => Self {
                top_level_key: "rules",
                missing_field: "N/A",
            },
            SourceKind::LiveView => Self {
                top_level_key: "firewall_rules",
                missing_field: "",
            },
        }
    }
}

/// Produces both renderings of the rule sequence. No rule is dropped,
/// reordered, or deduplicated between them.
pub fn render_document(rules: Vec<FirewallRule>, style: &RenderStyle) -> Result<RuleDocument> {
    let mut root = serde_json::Map::new();
    root.insert(style.top_level_key.to_string(), serde_json::to_value(&rules)?);
    let json = serde_json::to_string_pretty(&serde_json::Value::Object(root))?;
    let table = render_table(&rules, style);

    Ok(RuleDocument { rules, json, table })
}

fn render_table(rules: &[FirewallRule], style: &RenderStyle) -> String {
    let mut lines = vec![
        "| Source | Port | Destination | Description |".to_string(),
        "|--------|------|-------------|-------------|".to_string(),
    ];

    for rule in rules {
        lines.push(format!(
            "| {} | {} | {} | {} |",
            cell(&rule.source, style),
            cell(&rule.port, style),
            cell(&rule.destination, style),
            cell(&rule.description, style),
        ));
    }

    let mut table = lines.join("\n");
    table.push('\n');
    table
}

fn cell<'a>(value: &'a str, style: &'a RenderStyle) -> &'a str {
    if value.is_empty() {
        style.missing_field
    } else {
        value
    }
}
