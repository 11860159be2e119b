//! Router configuration for the EventHub server.

use super::state::AppState;
use crate::api::{events, registrations};
use crate::auth::handlers as auth;
use axum::{
    Router,
    http::{HeaderValue, Method, header},
    routing::{delete, get, post},
};
use eventhub_web::{correlation_id_layer, handlers};
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

/// Build the complete router.
///
/// | Prefix | Access |
/// |---|---|
/// | `/`, `/health`, `/api/health` | public |
/// | `/api/auth` | signup/login public, logout/profile authenticated |
/// | `/api/events` | reads public, writes and attendees admin |
/// | `/api/registrations` | student or admin |
///
/// `cors_origins` may send credentialed (cookie) requests; other origins
/// get no CORS headers.
pub fn build_router(state: AppState, cors_origins: &[String]) -> Router {
    let auth_routes = Router::new()
        .route("/signup", post(auth::signup))
        .route("/login", post(auth::login))
        .route("/logout", post(auth::logout))
        .route("/profile", get(auth::profile));

    let event_routes = Router::new()
        .route("/", get(events::list_events).post(events::create_event))
        .route(
            "/:id",
            get(events::get_event)
                .put(events::update_event)
                .delete(events::delete_event),
        )
        .route("/:id/attendees", get(events::list_attendees));

    let registration_routes = Router::new()
        .route("/register", post(registrations::register))
        .route("/my-registrations", get(registrations::my_registrations))
        .route("/:id", delete(registrations::cancel));

    let api_routes = Router::new()
        .route("/health", get(handlers::api_health))
        .nest("/auth", auth_routes)
        .nest("/events", event_routes)
        .nest("/registrations", registration_routes);

    Router::new()
        .route("/", get(handlers::service_banner))
        .route("/health", get(handlers::health_check))
        .nest("/api", api_routes)
        .with_state(state)
        .layer(TraceLayer::new_for_http())
        .layer(cors_layer(cors_origins))
        .layer(correlation_id_layer())
}

fn cors_layer(origins: &[String]) -> CorsLayer {
    let allowed: Vec<HeaderValue> = origins
        .iter()
        .filter_map(|origin| match HeaderValue::from_str(origin) {
            Ok(value) => Some(value),
            Err(e) => {
                tracing::warn!(origin = %origin, error = %e, "Ignoring invalid CORS origin");
                None
            }
        })
        .collect();

    CorsLayer::new()
        .allow_origin(allowed)
        .allow_credentials(true)
        .allow_methods([Method::GET, Method::POST, Method::PUT, Method::DELETE, Method::OPTIONS])
        .allow_headers([header::CONTENT_TYPE, header::ACCEPT])
}
