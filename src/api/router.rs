use axum::routing::{get, post};
use axum::Router;
use tower_http::cors::CorsLayer;

use super::endpoints::{chat, health, share_packs};
use super::types::ApiContext;

/// Build the application router. All routes live under `/api`.
pub fn build_router(ctx: ApiContext) -> Router {
    let api = Router::new()
        .route("/health", get(health::health))
        .route("/chat", post(chat::chat))
        .route("/share-packs", post(share_packs::create_pack))
        .route("/share-packs/:id", get(share_packs::view_pack))
        .route("/share-packs/:id/verify", post(share_packs::verify_pack))
        .route("/share-packs/:id/revoke", post(share_packs::revoke_pack))
        .with_state(ctx);

    Router::new().nest("/api", api).layer(CorsLayer::permissive())
}
