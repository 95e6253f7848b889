use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use coverlens::infrastructure::AppState;
use coverlens::{config, db, server};

#[tokio::main]
async fn main() {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "coverlens=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    // Load configuration
    dotenvy::dotenv().ok();
    let config = config::Config::from_env();

    tracing::info!(
        "Genre model: {}, OCR backend: {:?}, metadata: {}",
        config.genre_model_url,
        config.ocr_backend,
        config.google_books_url
    );

    // Initialize database
    let db = db::init_db(&config.database_url)
        .await
        .expect("Failed to initialize database");

    if let Err(e) = tokio::fs::create_dir_all(&config.upload_dir).await {
        tracing::error!(
            "Failed to create upload directory {}: {}",
            config.upload_dir.display(),
            e
        );
    }

    let state = AppState::from_config(db, config).expect("Failed to build application state");

    if let Err(e) = server::serve(state).await {
        tracing::error!("{}", e);
        std::process::exit(1);
    }
}
