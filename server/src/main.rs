use clap::Parser;
use log::{error, info};
use std::path::PathBuf;
use std::sync::Arc;
use tokio::sync::mpsc;

use server::http::{router, AppState};
use server::lifecycle::{Coordinator, CoordinatorMessage};
use server::questions::{seed_questions, QuestionStore};

#[derive(Parser, Debug)]
#[clap(author, version, about)]
struct Args {
    /// Host address to bind to
    #[clap(short = 'H', long, default_value = "0.0.0.0")]
    host: String,
    /// Port to listen on
    #[clap(short, long, default_value = "3000")]
    port: u16,
    /// Remote JSON source the question store is seeded from at startup
    #[clap(
        long,
        default_value = "https://s3-us-west-2.amazonaws.com/s.cdpn.io/40041/FF3.json"
    )]
    questions_url: String,
    /// Directory of static assets served at the site root
    #[clap(long, default_value = "public")]
    public_dir: PathBuf,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::init();
    let args = Args::parse();

    let questions = Arc::new(QuestionStore::new());

    // One-shot seeding runs independently so it never blocks connection
    // acceptance. Until it lands the question API serves the empty-store
    // response; on failure the store keeps whatever it had.
    {
        let questions = Arc::clone(&questions);
        let url = args.questions_url.clone();
        tokio::spawn(async move {
            match seed_questions(&questions, &url).await {
                Ok(count) => info!("Seeded {} questions from {}", count, url),
                Err(err) => error!("Question seeding skipped: {}", err),
            }
        });
    }

    let (coordinator_tx, coordinator_rx) = mpsc::unbounded_channel();
    let coordinator = tokio::spawn(Coordinator::new().run(coordinator_rx));

    let state = AppState {
        coordinator_tx: coordinator_tx.clone(),
        questions,
    };
    let app = router(state, args.public_dir.clone());

    let addr = format!("{}:{}", args.host, args.port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    info!("Listening at http://{}", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    // The listener is closed and in-flight handling has finished; tell the
    // coordinator to wind down.
    let _ = coordinator_tx.send(CoordinatorMessage::Shutdown);
    let _ = coordinator.await;
    info!("Server stopped");

    Ok(())
}

/// Resolves when a termination signal arrives.
async fn shutdown_signal() {
    let ctrl_c = async {
        tokio::signal::ctrl_c()
            .await
            .expect("failed to install SIGINT handler");
    };

    #[cfg(unix)]
    let terminate = async {
        tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
            .expect("failed to install SIGTERM handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => info!("Received SIGINT: closing HTTP server"),
        _ = terminate => info!("Received SIGTERM: closing HTTP server"),
    }
}
