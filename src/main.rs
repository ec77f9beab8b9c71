use clap::Parser;
use fwtable::core::SourceKind;
use fwtable::utils::logger;
use fwtable::{
    AppConfig, CliConfig, LocalStorage, ModelExport, OpenAiRuleClient, PipelineOutcome,
    StaticModelSource, TablePipeline,
};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = CliConfig::parse();
    logger::init_cli_logger(cli.verbose);

    tracing::info!("Starting fwtable (static export path)");

    let config = match AppConfig::resolve(cli) {
        Ok(config) => config,
        Err(e) => {
            tracing::error!("Configuration validation failed: {}", e);
            eprintln!("❌ {}", e);
            std::process::exit(1);
        }
    };

    // Step 1: export the model to JSON via the external collaborator.
    if config.skip_export {
        tracing::info!("Skipping model export step (--skip-export)");
    } else if let Err(e) = ModelExport::json_export().run().await {
        tracing::error!("Model export failed: {}", e);
        eprintln!("❌ {}", e);
        std::process::exit(1);
    }

    let storage = LocalStorage::new(".".to_string());
    let source = StaticModelSource::new(storage.clone(), config.model_json.clone());
    let inference = OpenAiRuleClient::new(
        config.base_url.clone(),
        config.api_key.clone(),
        config.llm_model.clone(),
        SourceKind::StaticExport,
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
            println!("Execution stopped because no relationships were found in the model.");
        }
        Err(e) => {
            tracing::error!("❌ Pipeline failed: {}", e);
            eprintln!("❌ {}", e);
            std::process::exit(1);
        }
    }

    Ok(())
}
