use clap::Parser;
use fwtable::utils::logger;
use fwtable::ModelExport;

#[derive(Debug, Parser)]
#[command(about = "Exports all model views as PNG images via the LikeC4 CLI")]
struct Cli {
    #[arg(long, default_value = "./dist/images")]
    output_dir: String,

    #[arg(long, help = "Enable verbose output")]
    verbose: bool,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    logger::init_cli_logger(cli.verbose);

    if let Err(e) = ModelExport::image_export(&cli.output_dir).run().await {
        tracing::error!("❌ Image export failed: {}", e);
        eprintln!("❌ {}", e);
        std::process::exit(1);
    }

    println!("✅ Success! Images saved to '{}'", cli.output_dir);
    Ok(())
}
