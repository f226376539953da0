//! HTTP surface of the Citadel proxy: router construction, handlers, middleware and logging.

pub mod app;
pub mod logging;
pub mod middleware;
pub mod router;

pub use app::create_app;
pub use router::AppState;
