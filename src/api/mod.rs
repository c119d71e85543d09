mod handlers;

use axum::{routing::get, Router};
use tower::ServiceBuilder;
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use crate::db::Database;

/// Router with permissive CORS, for local use and tests.
pub fn create_router(db: Database) -> Router {
    create_router_with_cors(db, CorsLayer::permissive())
}

pub fn create_router_with_cors(db: Database, cors: CorsLayer) -> Router {
    let api = Router::new()
        // Heroes
        .route(
            "/heroes",
            get(handlers::list_heroes).post(handlers::create_hero),
        )
        .route(
            "/heroes/{id}",
            get(handlers::get_hero)
                .patch(handlers::update_hero)
                .delete(handlers::delete_hero),
        )
        .route(
            "/heroes/{id}/powers",
            get(handlers::list_powers_of_hero).post(handlers::add_power_to_hero),
        )
        // Powers
        .route(
            "/powers",
            get(handlers::list_powers).post(handlers::create_power),
        )
        .route(
            "/powers/{id}",
            get(handlers::get_power)
                .patch(handlers::update_power)
                .delete(handlers::delete_power),
        )
        .route(
            "/powers/{id}/heroes",
            get(handlers::list_heroes_of_power).post(handlers::add_hero_to_power),
        )
        // Hero powers
        .route(
            "/hero_powers",
            get(handlers::list_hero_powers).post(handlers::create_hero_power),
        )
        .route(
            "/hero_powers/{id}",
            get(handlers::get_hero_power)
                .patch(handlers::update_hero_power)
                .delete(handlers::delete_hero_power),
        )
        // Health
        .route("/health", get(handlers::health));

    Router::new()
        .nest("/api/v1", api)
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(cors),
        )
        .with_state(db)
}
