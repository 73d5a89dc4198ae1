//! API routes for the Stride server.

mod routes;

use axum::Router;

pub fn routes() -> Router<std::sync::Arc<crate::state::AppState>> {
    routes::create_router()
}

#[cfg(test)]
mod tests;
