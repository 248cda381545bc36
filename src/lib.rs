pub mod config;
pub mod db;
pub mod error;
pub mod middleware;
pub mod models;
pub mod party;
pub mod routes;
pub mod services;
pub mod state;

pub use routes::create_router;
pub use state::AppState;
