use souk_server::{Config, Server, ServerState};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // .env before Config: every setting can come from either place
    dotenv::dotenv().ok();

    let config = Config::from_env();
    // Log dir must exist before the rolling appender can open it
    config.ensure_work_dir_structure()?;
    souk_server::setup_logging(&config);

    tracing::info!(
        environment = %config.environment,
        port = config.http_port,
        work_dir = %config.work_dir,
        "starting souk-server v{}",
        env!("CARGO_PKG_VERSION")
    );

    let state = ServerState::initialize(&config).await?;
    Server::new(state).run().await?;

    Ok(())
}
