use clap::Parser;
use dotenvy::dotenv;
use rust_pdf_converter::config::ConverterConfig;
use rust_pdf_converter::infrastructure::storage;
use rust_pdf_converter::services::conversion_service::ConversionService;
use rust_pdf_converter::services::storage::StorageService;
use rust_pdf_converter::services::worker::BackgroundWorker;
use rust_pdf_converter::{AppState, create_app};
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::signal;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Address to bind the API server to
    #[arg(long, default_value = "127.0.0.1")]
    host: String,

    /// Port for the API server
    #[arg(short, long, default_value_t = 5000)]
    port: u16,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // 1. Environment & Logging Setup
    dotenv().ok();
    let args = Args::parse();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "rust_pdf_converter=info,tower_http=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("🚀 Starting PDF converter...");

    let config = ConverterConfig::from_env();
    info!(
        "🛡️  Limits: Max Size={}MB, Retention={}s, Origins={:?}",
        config.max_file_size_mb(),
        config.retention.as_secs(),
        config.allowed_origins
    );

    // 2. Scratch directories
    let scratch = storage::setup_storage(&config).await?;
    let output: Arc<dyn StorageService> = scratch.output.clone();
    let uploads: Arc<dyn StorageService> = scratch.uploads.clone();

    // 3. Background sweep of stale scratch files
    let (shutdown_tx, shutdown_rx) = tokio::sync::watch::channel(false);
    let worker = BackgroundWorker::new(
        vec![uploads, output.clone()],
        config.retention,
        config.sweep_interval,
        shutdown_rx,
    );
    let worker_handle = tokio::spawn(worker.run());

    // 4. API
    let state = AppState {
        converter: Arc::new(ConversionService::new(output, &config)),
        config: config.clone(),
    };

    let app = create_app(state);
    let addr: SocketAddr = format!("{}:{}", args.host, args.port).parse()?;
    let listener = tokio::net::TcpListener::bind(addr).await?;

    info!("✅ Server ready at http://{}", addr);
    info!("📖 Swagger UI: http://{}/swagger-ui", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("🛑 Shutting down...");
    let _ = shutdown_tx.send(true);
    let _ = worker_handle.await;

    info!("👋 Exited cleanly.");
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("failed to install signal handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            info!("⌨️  Ctrl+C received, starting graceful shutdown...");
        },
        _ = terminate => {
            info!("💤 SIGTERM received, starting graceful shutdown...");
        },
    }
}
