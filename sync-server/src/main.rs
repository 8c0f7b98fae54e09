use sync_server::core::{BackgroundTasks, Config, ServerState, TaskKind};
use sync_server::utils::logger::init_logger_with_file;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // 1. Environment (dotenv, logging)
    let _ = dotenv::dotenv();

    // 2. Load configuration
    let config = Config::from_env();
    init_logger_with_file(config.log_dir.as_deref());

    tracing::info!(environment = %config.environment, "Sync server starting");

    // 3. Background tasks + supervisor
    let mut tasks = BackgroundTasks::new();
    let (state, supervisor) = ServerState::initialize(&config, tasks.shutdown_token());
    tasks.spawn("sync_supervisor", TaskKind::Worker, supervisor.run());

    // 4. HTTP control API
    let app = sync_server::api::router(state);
    let addr = std::net::SocketAddr::from(([0, 0, 0, 0], config.http_port));
    let listener = tokio::net::TcpListener::bind(addr).await?;
    tracing::info!("Sync server listening on {addr}");

    axum::serve(listener, app)
        .with_graceful_shutdown(async {
            let _ = tokio::signal::ctrl_c().await;
            tracing::info!("Shutting down...");
        })
        .await?;

    // 5. Graceful shutdown of the supervisor, bounded by config
    let grace = std::time::Duration::from_millis(config.shutdown_timeout_ms);
    if tokio::time::timeout(grace, tasks.shutdown()).await.is_err() {
        tracing::warn!("Background tasks did not stop within the shutdown budget");
    }

    Ok(())
}
