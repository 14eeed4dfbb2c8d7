use axum::http::{header, Method};
use axum::{
    routing::{get, post},
    Router,
};
use std::time::Duration;
use tower_http::{cors::CorsLayer, limit::RequestBodyLimitLayer, trace::TraceLayer};

#[cfg(not(test))]
use {
    std::net::IpAddr,
    std::sync::Arc,
    tower_governor::{governor::GovernorConfigBuilder, key_extractor::KeyExtractor, GovernorLayer},
};

use crate::config::Settings;
use crate::proxy::handlers::{self, AppState};

/// Create the proxy router: the embed endpoint plus a health check
#[cfg_attr(test, allow(unused_variables))]
pub fn create_router(state: AppState, settings: &Settings) -> Router {
    #[cfg_attr(test, allow(unused_mut))]
    let mut api_routes = Router::new()
        .route("/embed", post(handlers::embed_text))
        .with_state(state.clone());

    // Apply rate limiting only in non-test builds
    // NOTE: Rate limiting uses a custom key extractor that:
    // 1. Tries to extract peer IP from connection
    // 2. Falls back to 127.0.0.1 for local testing when peer IP is unavailable
    // For production behind a reverse proxy, configure the proxy to set X-Real-IP or
    // X-Forwarded-For headers, and use PeerIpKeyExtractor instead.
    #[cfg(not(test))]
    {
        // Custom key extractor that provides fallback
        #[derive(Clone, Copy, Debug)]
        struct FallbackIpKeyExtractor;

        impl KeyExtractor for FallbackIpKeyExtractor {
            type Key = IpAddr;

            fn extract<B>(
                &self,
                req: &axum::http::Request<B>,
            ) -> Result<Self::Key, tower_governor::GovernorError> {
                // Try to get peer IP from extensions (set by axum)
                if let Some(addr) = req.extensions().get::<std::net::SocketAddr>() {
                    return Ok(addr.ip());
                }

                // Fall back to localhost for local development/testing
                Ok(IpAddr::V4(std::net::Ipv4Addr::new(127, 0, 0, 1)))
            }
        }

        let governor_conf = Arc::new(
            GovernorConfigBuilder::default()
                .key_extractor(FallbackIpKeyExtractor)
                .per_second(settings.server.rate_limit)
                .burst_size(settings.server.rate_limit as u32 * 2)
                .finish()
                .unwrap(),
        );
        let governor_layer = GovernorLayer {
            config: governor_conf,
        };
        api_routes = api_routes.layer(governor_layer);
    }

    let api_routes = api_routes;

    let health_routes = Router::new()
        .route("/health", get(handlers::health_check))
        .with_state(state);

    Router::new()
        .merge(health_routes)
        .nest("/api", api_routes)
        .layer(
            // Request body size limit - prevent memory exhaustion from large payloads
            RequestBodyLimitLayer::new(settings.server.max_request_body_size),
        )
        .layer(
            // CORS - the recommendation UI calls this endpoint cross-origin
            CorsLayer::new()
                .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
                .allow_headers([header::CONTENT_TYPE, header::ACCEPT])
                .allow_origin(tower_http::cors::Any)
                .max_age(Duration::from_secs(3600)),
        )
        .layer(
            // Tracing
            TraceLayer::new_for_http(),
        )
}
