pub mod config;
pub mod core;
pub mod domain;
pub mod utils;

pub use config::storage::LocalStorage;
pub use config::{AppConfig, CliConfig};
pub use core::export::ModelExport;
pub use core::infer::OpenAiRuleClient;
pub use core::pipeline::{PipelineOutcome, TablePipeline};
pub use core::sources::{LiveViewSource, StaticModelSource};
pub use utils::error::{PipelineError, Result};
