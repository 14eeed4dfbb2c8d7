// Embedding proxy service: one POST endpoint that forwards a text to
// the configured upstream provider and answers in one canonical shape.

pub mod handlers;
pub mod models;
pub mod routes;
pub mod upstream;

// Re-exports
pub use handlers::AppState;
pub use routes::create_router;
pub use upstream::{Provider, ProviderRegistry};
