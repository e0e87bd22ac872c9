use axum::{
    http::Method,
    routing::{delete, get, post, put},
    Router,
};
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

pub mod catalog;
pub mod error;
pub mod export;
pub mod selections;
pub mod session;
pub mod state;

pub use state::AppState;

pub fn app(state: AppState) -> Router {
    // CORS Middleware
    let cors = CorsLayer::new()
        .allow_origin(tower_http::cors::Any)
        .allow_methods([Method::GET, Method::POST, Method::PUT, Method::DELETE, Method::OPTIONS])
        .allow_headers([
            axum::http::header::AUTHORIZATION,
            axum::http::header::CONTENT_TYPE,
            axum::http::header::USER_AGENT,
        ]);

    Router::new()
        .route(
            "/v1/session/{key}",
            put(session::put_session).get(session::get_session),
        )
        .route("/v1/catalog/load", post(catalog::load_catalog))
        .route("/v1/catalog/services", get(catalog::list_services))
        .route(
            "/v1/catalog/contracts/{contract_id}/services",
            get(catalog::contract_services),
        )
        .route(
            "/v1/selections",
            post(selections::toggle_selection)
                .get(selections::list_selections)
                .delete(selections::clear_all_selections),
        )
        .route(
            "/v1/selections/{organization}/{plan}",
            delete(selections::clear_selection),
        )
        .route("/v1/export/generate", post(export::generate))
        .route("/v1/export/download", get(export::download))
        .route("/v1/export/submit", post(export::submit))
        .route("/v1/export/status", get(export::status))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
