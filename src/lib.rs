pub mod client;
pub mod config;
pub mod content;
pub mod database;
pub mod error;
pub mod files;
pub mod handlers;
pub mod models;
pub mod router;
pub mod state;
pub mod storage;
pub mod utils;

pub use config::Config;
pub use error::AppError;
pub use router::create_router;
pub use state::AppState;
