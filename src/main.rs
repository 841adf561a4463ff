use std::process::ExitCode;

use tracing::{error, info};

use fileshelf::web::WebServer;
use fileshelf::{Config, Database};

#[tokio::main]
async fn main() -> ExitCode {
    let config = match Config::load_or_default("config.toml") {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Failed to load config.toml: {e}");
            return ExitCode::FAILURE;
        }
    };

    if let Err(e) = fileshelf::logging::init(&config.logging) {
        eprintln!("Failed to initialize logging: {e}");
        fileshelf::logging::init_console_only(&config.logging.level);
    }

    info!("fileshelf {}", env!("CARGO_PKG_VERSION"));

    if let Err(e) = config.validate() {
        error!("{e}");
        return ExitCode::FAILURE;
    }

    let db = match Database::open(&config.database.path).await {
        Ok(db) => db,
        Err(e) => {
            error!("Failed to open database: {e}");
            return ExitCode::FAILURE;
        }
    };

    let server = match WebServer::new(&config, db) {
        Ok(server) => server,
        Err(e) => {
            error!("Failed to start web server: {e}");
            return ExitCode::FAILURE;
        }
    };

    info!(
        "Delete mode: {:?}, upload cap: {} MB",
        config.storage.delete_mode, config.storage.max_upload_size_mb
    );

    if let Err(e) = server.run().await {
        error!("Web server error: {e}");
        return ExitCode::FAILURE;
    }

    ExitCode::SUCCESS
}
