use clap::Parser;
use fwtable::core::SourceKind;
use fwtable::utils::logger;
use fwtable::{
    AppConfig, CliConfig, LiveViewSource, LocalStorage, OpenAiRuleClient, PipelineOutcome,
    TablePipeline,
};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = CliConfig::parse();
    logger::init_cli_logger(cli.verbose);

    tracing::info!("Starting fwtable (live view path)");

    let config = match AppConfig::resolve(cli) {
        Ok(config) => config,
        Err(e) => {
            tracing::error!("Configuration validation failed: {}", e);
            eprintln!("❌ {}", e);
            std::process::exit(1);
        }
    };

    let storage = LocalStorage::new(".".to_string());
    let source = LiveViewSource::new(config.port, config.view.clone());
    let inference = OpenAiRuleClient::new(
        config.base_url.clone(),
        config.api_key.clone(),
        config.llm_model.clone(),
        SourceKind::LiveView,
    );
    let pipeline = TablePipeline::new(
        source,
        inference,
        storage,
        config.rules_json.clone(),
        config.rules_table.clone(),
    );

    match pipeline.run().await {
        Ok(PipelineOutcome::Generated(doc)) => {
            tracing::info!("✅ Firewall table generated successfully!");
            println!("\n--- Generated Table ---");
            println!("{}", doc.table);
            println!("--- End of Table --- (Saved to {})", config.rules_table);
        }
        Ok(PipelineOutcome::NoRelationships) => {
            println!("Execution stopped because the view did not yield any elements.");
        }
        Err(e) => {
            tracing::error!("❌ Pipeline failed: {}", e);
            eprintln!("❌ {}", e);
            std::process::exit(1);
        }
    }

    Ok(())
}
