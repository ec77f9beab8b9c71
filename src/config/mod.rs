pub mod file;
pub mod storage;

use crate::utils::error::Result;
use crate::utils::validation::{validate_non_empty_string, validate_path, validate_url, Validate};
use clap::Parser;
use file::FileConfig;

pub const DEFAULT_LLM_MODEL: &str = "gpt-4o-mini-2024-07-18";
pub const DEFAULT_BASE_URL: &str = "https://api.openai.com/v1";
pub const DEFAULT_MODEL_JSON: &str = "./dist/model.json";
pub const DEFAULT_RULES_JSON: &str = "./dist/firewall_rules.json";
pub const DEFAULT_RULES_TABLE: &str = "./dist/FirewallRules.md";
pub const DEFAULT_VIEW: &str = "SimplifiedFirewallView";
pub const DEFAULT_MCP_PORT: u16 = 33335;

#[derive(Debug, Clone, Parser)]
#[command(about = "Derives a firewall rule table from a C4 architecture model")]
pub struct CliConfig {
    #[arg(long, env = "OPENAI_API_KEY", hide_env_values = true)]
    pub api_key: Option<String>,

    #[arg(long, env = "OPENAI_MODEL", help = "Chat model used for rule inference")]
    pub llm_model: Option<String>,

    #[arg(long, env = "OPENAI_BASE_URL")]
    pub base_url: Option<String>,

    #[arg(long, help = "Path of the exported model document (static path)")]
    pub model_json: Option<String>,

    #[arg(long, help = "Output path of the serialized rule document")]
    pub rules_json: Option<String>,

    #[arg(long, help = "Output path of the Markdown rule table")]
    pub rules_table: Option<String>,

    #[arg(long, env = "PORT", help = "Model-serving session port (live path)")]
    pub port: Option<u16>,

    #[arg(long, help = "View identifier queried on the live path")]
    pub view: Option<String>,

    #[arg(long, help = "Optional TOML configuration file")]
    pub config: Option<String>,

    #[arg(long, help = "Skip the external model export step")]
    pub skip_export: bool,

    #[arg(long, help = "Enable verbose output")]
    pub verbose: bool,
}

/// The one immutable configuration value the process resolves at startup
/// and hands into the adapters explicitly. Core logic never reads the
/// environment on its own.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub api_key: String,
    pub llm_model: String,
    pub base_url: String,
    pub model_json: String,
    pub rules_json: String,
    pub rules_table: String,
    pub view: String,
    pub port: u16,
    pub skip_export: bool,
    pub verbose: bool,
}

impl AppConfig {
    /// Precedence: CLI argument, then config file, then built-in default.
    pub fn resolve(cli: CliConfig) -> Result<Self> {
        let file = match &cli.config {
            Some(path) => FileConfig::from_file(path)?,
            None => FileConfig::default(),
        };

        let llm = file.llm.unwrap_or_default();
        let model = file.model.unwrap_or_default();
        let output = file.output.unwrap_or_default();

        let config = Self {
            api_key: cli.api_key.or(llm.api_key).unwrap_or_default(),
            llm_model: cli
                .llm_model
                .or(llm.model)
                .unwrap_or_else(|| DEFAULT_LLM_MODEL.to_string()),
            base_url: cli
                .base_url
                .or(llm.base_url)
                .unwrap_or_else(|| DEFAULT_BASE_URL.to_string()),
            model_json: cli
                .model_json
                .or(model.json_path)
                .unwrap_or_else(|| DEFAULT_MODEL_JSON.to_string()),
            rules_json: cli
                .rules_json
                .or(output.json_path)
                .unwrap_or_else(|| DEFAULT_RULES_JSON.to_string()),
            rules_table: cli
                .rules_table
                .or(output.table_path)
                .unwrap_or_else(|| DEFAULT_RULES_TABLE.to_string()),
            view: cli.view.or(model.view).unwrap_or_else(|| DEFAULT_VIEW.to_string()),
            port: cli.port.or(model.port).unwrap_or(DEFAULT_MCP_PORT),
            skip_export: cli.skip_export,
            verbose: cli.verbose,
        };

        config.validate()?;
        Ok(config)
    }
}

impl Validate for AppConfig {
    fn validate(&self) -> Result<()> {
        validate_non_empty_string("api_key", &self.api_key)?;
        validate_non_empty_string("llm_model", &self.llm_model)?;
        validate_url("base_url", &self.base_url)?;
        validate_path("model_json", &self.model_json)?;
        validate_path("rules_json", &self.rules_json)?;
        validate_path("rules_table", &self.rules_table)?;
        Ok(())
    }
}
