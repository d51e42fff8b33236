// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Concept Hub API Server
//!
//! Serves the concept catalog plus likes, comments and accounts.

use concept_hub::{
    config::{Config, StoreBackend},
    db::{ContentStore, FirestoreDb, MemoryDb},
    services::{ConceptCatalog, GoTrueClient, IdentityProvider},
    AppState,
};
use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize structured JSON logging for GCP
    init_logging()?;

    // Load configuration from environment
    let config = Config::from_env()?;
    tracing::info!(port = config.port, "Starting Concept Hub API");

    // Initialize the content store
    let store: Arc<dyn ContentStore> = match config.store_backend {
        StoreBackend::Firestore => Arc::new(FirestoreDb::new(&config.gcp_project_id).await?),
        StoreBackend::Memory => {
            tracing::warn!("Using in-memory store; data is lost on restart");
            Arc::new(MemoryDb::new())
        }
    };

    // Load the concept catalog
    tracing::info!(path = %config.catalog_path, "Loading concept catalog");
    let catalog = ConceptCatalog::load_from_file(&config.catalog_path)?;

    let identity: Arc<dyn IdentityProvider> = Arc::new(GoTrueClient::new(
        &config.auth_url,
        config.auth_anon_key.clone(),
    ));

    // Build shared state
    let state = Arc::new(AppState::new(config.clone(), catalog, store, identity));

    // Build router
    let app = concept_hub::routes::create_router(state);

    // Start server
    let addr = format!("0.0.0.0:{}", config.port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    tracing::info!(address = %addr, "Server listening");

    axum::serve(listener, app).await?;
    Ok(())
}

/// Initialize structured JSON logging (GCP-compliant).
fn init_logging() -> Result<(), Box<dyn std::error::Error>> {
    let format = tracing_subscriber::fmt::layer()
        .json()
        .with_target(false)
        .with_current_span(true)
        .flatten_event(true);

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("concept_hub=debug".parse()?)
                .add_directive("info".parse()?),
        )
        .with(format)
        .init();
    Ok(())
}
