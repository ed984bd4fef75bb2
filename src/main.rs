// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! TagYou Tracker API Server
//!
//! Tracks carnival squads: who's sharing their location, which named area
//! they're in, and which premium features their tier unlocks.

use std::sync::Arc;

use tagyou_tracker::{
    config::Config,
    services::{
        AuthClient, CheckoutClient, Gazetteer, InviteService, MemoryCache, PremiumRegistry,
        SupabaseRegistry, TierService,
    },
    AppState,
};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize structured JSON logging
    init_logging();

    // Load configuration from environment
    let config = Config::from_env().expect("Failed to load configuration");
    tracing::info!(port = config.port, "Starting TagYou Tracker API");

    // Load carnival landmarks
    let geo_path = "data/carnival_landmarks.geojson";
    tracing::info!(path = geo_path, "Loading carnival landmarks");
    let gazetteer =
        Arc::new(Gazetteer::load_from_file(geo_path).expect("Failed to load carnival landmarks"));
    tracing::info!(count = gazetteer.landmarks().len(), "Carnival landmarks loaded");

    // Shared key-value cache (tier cache + remembered preferences)
    let cache = MemoryCache::shared();

    // Premium registry handle, resolved once at startup
    let registry: Option<Arc<dyn PremiumRegistry>> = Some(Arc::new(SupabaseRegistry::new(
        config.supabase_url.clone(),
        config.supabase_service_key.clone(),
    )));

    let tier_service = TierService::new(
        cache.clone(),
        registry.clone(),
        config.premium_allowlist.clone(),
    );

    let auth_client = AuthClient::new(
        config.supabase_url.clone(),
        config.supabase_anon_key.clone(),
    );

    let checkout = CheckoutClient::new(config.checkout_url.clone());
    let invites = InviteService::new(
        config.invite_signing_key.clone(),
        config.frontend_url.clone(),
    );

    // Build shared state
    let state = Arc::new(AppState {
        config: config.clone(),
        gazetteer,
        cache,
        tier_service,
        registry,
        auth_client,
        checkout,
        invites,
        sessions: dashmap::DashMap::new(),
    });

    // Build router
    let app = tagyou_tracker::routes::create_router(state);

    // Start server
    let addr = format!("0.0.0.0:{}", config.port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    tracing::info!(address = %addr, "Server listening");

    axum::serve(listener, app).await?;
    Ok(())
}

/// Initialize structured JSON logging.
fn init_logging() {
    let format = tracing_subscriber::fmt::layer()
        .json()
        .with_target(false)
        .with_current_span(true)
        .flatten_event(true);

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("tagyou_tracker=debug".parse().unwrap())
                .add_directive("info".parse().unwrap()),
        )
        .with(format)
        .init();
}
