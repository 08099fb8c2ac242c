use std::sync::Arc;

use tower_http::cors::CorsLayer;

use style_onboard::api::HttpApiClient;
use style_onboard::config::{ApiConfig, OnboardingConfig};
use style_onboard::onboarding::{
    OnboardingManager, OnboardingRouteState, SessionFlags, onboarding_routes,
};
use style_onboard::storage::{FileGenderStore, GenderStore, MemoryGenderStore};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_target(false)
        .init();

    let config = OnboardingConfig::from_env()?;
    let api_config = ApiConfig::from_env();

    let port: u16 = std::env::var("STYLE_ONBOARD_PORT")
        .unwrap_or_else(|_| "8080".to_string())
        .parse()
        .unwrap_or(8080);

    eprintln!("style-onboard v{}", env!("CARGO_PKG_VERSION"));
    eprintln!("   API: {}", api_config.base_url);
    eprintln!(
        "   Auth: {}",
        if api_config.access_token.is_some() {
            "bearer token"
        } else {
            "none"
        }
    );
    eprintln!(
        "   Limits: {}-{} tags, {} outfits",
        config.limits.min_tags, config.limits.max_tags, config.limits.required_outfits
    );

    let client = Arc::new(HttpApiClient::new(api_config)?);

    // ── Gender storage ───────────────────────────────────────────────────
    let store: Arc<dyn GenderStore> = match std::env::var("STYLE_ONBOARD_STORAGE_PATH") {
        Ok(path) => {
            eprintln!("   Storage: {}", path);
            Arc::new(FileGenderStore::new(path.into()))
        }
        Err(_) => {
            eprintln!("   Storage: in-memory");
            Arc::new(MemoryGenderStore::new())
        }
    };

    let manager = OnboardingManager::new(
        config,
        SessionFlags::new(),
        client.clone(),
        client,
        store,
    );

    let app = onboarding_routes(OnboardingRouteState { manager }).layer(CorsLayer::permissive());

    let listener = tokio::net::TcpListener::bind(format!("0.0.0.0:{}", port)).await?;
    eprintln!("   Onboarding API: http://0.0.0.0:{}/api/onboarding/state\n", port);
    tracing::info!(port, "Onboarding server started");
    axum::serve(listener, app).await?;

    Ok(())
}
