//! REST API Routes Module
//!
//! Includes:
//! - TaskNote CRUD routes under /api/tasknote
//! - Health check endpoints (Kubernetes-compatible)
//! - Prometheus metrics at /metrics
//! - OpenAPI document at /openapi.json
//! - CORS support for browser-based clients

pub mod health;
pub mod tasknote;

use std::sync::Arc;
use std::time::Duration;

use axum::{
    http::{header, HeaderValue, Method},
    middleware::from_fn,
    routing::get,
    Router,
};
use tasknote_storage::TaskNoteStore;
use tower::ServiceBuilder;
use tower_http::cors::{Any, CorsLayer};

use crate::config::ApiConfig;
use crate::telemetry::{metrics_handler, observability_middleware};

pub use tasknote::TASKNOTE_BASE_PATH;

// ============================================================================
// OPENAPI ENDPOINTS
// ============================================================================

/// Handler for /openapi.json endpoint.
#[cfg(all(feature = "openapi", not(feature = "swagger-ui")))]
async fn openapi_json() -> impl axum::response::IntoResponse {
    use utoipa::OpenApi;
    axum::Json(crate::openapi::ApiDoc::openapi())
}

#[cfg(feature = "openapi")]
fn with_openapi(router: Router) -> Router {
    #[cfg(feature = "swagger-ui")]
    {
        use utoipa::OpenApi;
        use utoipa_swagger_ui::SwaggerUi;
        // SwaggerUi serves /openapi.json itself.
        router.merge(
            SwaggerUi::new("/swagger-ui").url("/openapi.json", crate::openapi::ApiDoc::openapi()),
        )
    }
    #[cfg(not(feature = "swagger-ui"))]
    {
        router.route("/openapi.json", get(openapi_json))
    }
}

#[cfg(not(feature = "openapi"))]
fn with_openapi(router: Router) -> Router {
    router
}

// ============================================================================
// CORS LAYER
// ============================================================================

/// Build the CORS layer from ApiConfig.
///
/// In development mode (empty origins), allows all origins.
/// In production mode, only allows configured origins.
fn build_cors_layer(config: &ApiConfig) -> CorsLayer {
    let cors = CorsLayer::new()
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PUT,
            Method::DELETE,
            Method::OPTIONS,
        ])
        .allow_headers([header::CONTENT_TYPE, header::ACCEPT])
        .expose_headers([header::LOCATION])
        .max_age(Duration::from_secs(config.cors_max_age_secs));

    if !config.is_production() {
        tracing::info!("CORS: Development mode - allowing all origins");
        return cors.allow_origin(Any);
    }

    tracing::info!(
        "CORS: Production mode - allowing origins: {:?}",
        config.cors_origins
    );
    let origins: Vec<HeaderValue> = config
        .cors_origins
        .iter()
        .filter_map(|o| o.parse().ok())
        .collect();

    if config.cors_allow_credentials {
        cors.allow_origin(origins).allow_credentials(true)
    } else {
        cors.allow_origin(origins)
    }
}

// ============================================================================
// ROUTER ASSEMBLY
// ============================================================================

/// Create the complete API router.
///
/// Layer order (outermost first): CORS -> Observability -> Handler.
pub fn create_api_router(store: Arc<dyn TaskNoteStore>, api_config: &ApiConfig) -> Router {
    let router = Router::new()
        .nest(TASKNOTE_BASE_PATH, tasknote::create_router(Arc::clone(&store)))
        .nest("/health", health::create_router(store))
        .route("/metrics", get(metrics_handler));

    with_openapi(router).layer(
        ServiceBuilder::new()
            .layer(build_cors_layer(api_config))
            .layer(from_fn(observability_middleware)),
    )
}
