//! MuleHunter server — HTTP surface over the risk scoring core.

pub mod notify;
pub mod routes;
pub mod state;

pub use routes::build_router;
pub use state::AppState;
