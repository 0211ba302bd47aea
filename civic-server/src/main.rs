use civic_server::{Config, Server, ServerState, init_logger_with_file};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // 1. .env, then configuration
    dotenv::dotenv().ok();
    let config = Config::from_env()?;

    // 2. Logging
    init_logger_with_file(Some(&config.log_level), config.log_dir.as_deref());
    tracing::info!(environment = %config.environment, "civic-server starting...");

    // 3. Store, notifier and services
    let state = ServerState::initialize(&config)?;

    // 4. HTTP server until ctrl-c
    let server = Server::with_state(config, state);
    if let Err(e) = server.run().await {
        tracing::error!("Server error: {}", e);
        return Err(e.into());
    }

    Ok(())
}
