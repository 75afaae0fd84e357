//! API routes module

pub mod health;

use axum::Router;
use domain_categories::CategoryService;
use domain_products::ProductService;
use domain_users::UserService;

use crate::state::AppState;

/// Create all API routes
pub fn routes(state: &AppState) -> Router {
    Router::new()
        .nest("/users", domain_users::handlers::router(UserService::new(&state.db)))
        .nest(
            "/categories",
            domain_categories::handlers::router(CategoryService::new(&state.db)),
        )
        .nest(
            "/products",
            domain_products::handlers::router(ProductService::new(&state.db)),
        )
        .merge(health::router(state.clone()))
}

/// Initialize database indexes
pub async fn init_indexes(state: &AppState) -> eyre::Result<()> {
    UserService::new(&state.db).init_indexes().await?;
    CategoryService::new(&state.db).init_indexes().await?;
    ProductService::new(&state.db).init_indexes().await?;
    Ok(())
}
