pub mod ai;
pub mod rest;
pub mod router;
pub mod state;

pub use router::{api_routes, build_router};
pub use state::AppState;
