use recovery_path::parser::RecordParser;
use recovery_path::seed::seed_snapshot;
use recovery_path::tracker::Tracker;
use recovery_path::{AppState, import_snapshot_file, resolve_import_path, resolve_port, router};
use std::net::SocketAddr;
use tracing::info;
use tracing_subscriber::{fmt, EnvFilter};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    fmt()
        .with_env_filter(EnvFilter::from_default_env().add_directive("info".parse()?))
        .init();

    let parser = RecordParser::default();
    let mut tracker = Tracker::new(seed_snapshot(&parser));
    info!(
        "seeded {} profiles, {} relapses",
        tracker.profiles().len(),
        tracker.snapshot().relapses.len()
    );

    if let Some(path) = resolve_import_path() {
        import_snapshot_file(&path, &mut tracker).await;
    }

    let app = router(AppState::new(parser, tracker));

    let addr = SocketAddr::from(([0, 0, 0, 0], resolve_port()));
    info!("listening on http://{addr}");
    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    Ok(())
}

async fn shutdown_signal() {
    let _ = tokio::signal::ctrl_c().await;
    info!("shutting down");
}
