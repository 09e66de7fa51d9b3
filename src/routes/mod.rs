use axum::Router;

use crate::state::AppState;

pub mod courses;
pub mod doc;
pub mod health;
pub mod orders;
pub mod params;
pub mod users;

// Build the API router without binding state; it will be provided at the top level.
pub fn create_api_router() -> Router<AppState> {
    Router::new()
        .nest("/course", courses::router())
        .nest("/order", orders::router())
        .nest("/user", users::router())
}
