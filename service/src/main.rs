mod http;

use actix_cors::Cors;
use actix_web::{web, App, HttpServer};
use fellowcraft_rag::{
    config::{ConfigError, ServiceConfig},
    error::Error,
    loader::{load_corpus, LoaderError},
    rag::RagService,
};
use thiserror::Error;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

#[derive(Debug, Error)]
enum StartupError {
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error(transparent)]
    Loader(#[from] LoaderError),
    #[error(transparent)]
    Rag(#[from] Error),
    #[error("HTTP server error: {0}")]
    Server(#[from] std::io::Error),
}

/// Builds the service context. Any failure here stops the process before it
/// accepts traffic.
async fn initialize(config: &ServiceConfig) -> Result<RagService, StartupError> {
    let documents = load_corpus(&config.corpus)?;
    let embedding_model = config.embedder.build()?;
    let completion_model = config.generator.build()?;

    Ok(RagService::init(
        documents,
        embedding_model,
        completion_model,
        config.rag_settings(),
    )
    .await?)
}

async fn run() -> Result<(), StartupError> {
    let config = ServiceConfig::load()?;
    info!("Initializing RAG service...");
    let service = web::Data::new(initialize(&config).await?);

    info!("Listening on http://{}:{}", config.host, config.port);
    HttpServer::new(move || {
        App::new()
            .wrap(Cors::permissive())
            .app_data(service.clone())
            .configure(http::configure)
    })
    .bind((config.host.as_str(), config.port))?
    .run()
    .await?;

    Ok(())
}

#[actix_web::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    if let Err(e) = run().await {
        error!("RAG service failed: {e}");
        std::process::exit(1);
    }
}
