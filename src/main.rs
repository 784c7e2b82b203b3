use clap::Parser;
use shipment_etl::utils::{logger, validation::Validate};
use shipment_etl::{
    CliConfig, EtlEngine, FlatExportPipeline, HttpPortLookup, LocalStorage, PortResolver,
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = CliConfig::parse();

    logger::init_cli_logger(config.verbose);

    tracing::info!("Starting shipment-etl");
    if config.verbose {
        tracing::debug!("CLI config: {:?}", config);
    }

    if let Err(e) = config.validate() {
        tracing::error!("Configuration validation failed: {}", e);
        eprintln!("{}", e);
        std::process::exit(1);
    }

    let tracking = config.tracking()?;
    let lookup = HttpPortLookup::new(&tracking)?;
    let resolver = PortResolver::new(&tracking, lookup);

    let storage = LocalStorage::new();
    let pipeline = FlatExportPipeline::new(storage, config, resolver);
    let engine = EtlEngine::new(pipeline);

    match engine.run().await {
        Ok(output_path) => {
            println!("Output saved to: {}", output_path);
        }
        Err(e) => {
            tracing::error!("Flat export failed: {}", e);
            eprintln!("{}", e);
            std::process::exit(1);
        }
    }

    Ok(())
}
