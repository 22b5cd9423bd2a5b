mod config;
mod context;
mod error;
mod handlers;
mod server;
pub mod types;

pub use config::HttpConfig;
pub use context::AppContext;
pub use error::ApiError;
pub use server::{router, HttpServer};
