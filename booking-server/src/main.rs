use booking_server::{Config, Server, init_logger_with_file};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenv::dotenv().ok();

    let config = Config::from_env();

    let log_dir = std::path::Path::new(&config.work_dir).join("logs");
    let _ = std::fs::create_dir_all(&log_dir);
    let log_level = std::env::var("LOG_LEVEL").ok();
    init_logger_with_file(log_level.as_deref(), log_dir.to_str());

    tracing::info!("Booking server starting...");

    let server = Server::new(config);
    server.run().await
}
