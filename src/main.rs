use clap::Parser;
use smash_query::utils::logger;
use smash_query::{Cli, LocalStorage, QueryConfig, QueryEngine, TapClient};

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    logger::init_cli_logger(cli.verbose);

    tracing::info!("Starting smash-query");
    if cli.verbose {
        tracing::debug!("CLI args: {:?}", cli);
    }

    let config = match QueryConfig::from_file(&cli.settings) {
        Ok(config) => config,
        Err(e) => {
            tracing::error!("Configuration error: {}", e);
            eprintln!("{}", e);
            eprintln!("Suggestion: {}", e.recovery_suggestion());
            std::process::exit(e.exit_code());
        }
    };

    let storage = LocalStorage::new(config.output_path.clone());
    let service = TapClient::new(config.service_url.clone(), config.max_records);

    let engine = match QueryEngine::new(storage, service, config) {
        Ok(engine) => engine,
        Err(e) => {
            tracing::error!("Startup failed: {}", e);
            eprintln!("{}", e);
            std::process::exit(e.exit_code());
        }
    };

    match engine.run().await {
        Ok(output_path) => {
            tracing::info!("Catalog saved as {}", output_path);
            println!("Catalog saved as {}", output_path);
        }
        Err(e) => {
            tracing::error!("Query failed: {} (category: {:?})", e, e.category());
            eprintln!("{}", e);
            eprintln!("Suggestion: {}", e.recovery_suggestion());
            std::process::exit(e.exit_code());
        }
    }
}
