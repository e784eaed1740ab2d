//! HTTP surface for the Parley conversation engine.
//!
//! A thin axum wrapper: POST `/chat` runs one exchange through the engine,
//! GET `/health` reports liveness. The engine itself never fails a request;
//! non-200 responses only happen for malformed bodies.

pub mod error;
pub mod handlers;
pub mod routes;
pub mod state;

pub use routes::{create_router, start_server};
pub use state::AppState;
