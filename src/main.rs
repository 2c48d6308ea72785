use astra::Server;
use field_data_hub::config::AppConfig;
use field_data_hub::router::respond;
use std::sync::Arc;
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    // 1️⃣ Configuration
    let config = match AppConfig::from_env() {
        Ok(config) => config,
        Err(e) => {
            error!("❌ Invalid configuration: {e}");
            std::process::exit(1);
        }
    };

    // 2️⃣ Store handle. A failed connect keeps the server up and reports 503s.
    let store = Arc::new(config.build_store());
    if config.store.is_none() {
        info!("FIELD_DATA_DB not set, running without a database");
    } else if let Err(e) = store.connect() {
        warn!("field data store connection failed: {e}");
    }

    // 3️⃣ Start the server
    let addr = config.bind_addr();
    info!("Starting server at http://{addr}");

    let server = Server::bind(&addr).max_workers(config.max_workers);

    let handle = Arc::clone(&store);
    let result = server.serve(move |req, _info| respond(req, &handle));

    if let Err(e) = result {
        error!("Server ended with error: {e}");
    }

    store.disconnect();
    info!("Server shut down cleanly.");
}
