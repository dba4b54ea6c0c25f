pub mod config;
pub mod delivery;
pub mod error;
pub mod routes;
mod state;
mod views;

use std::env;

pub use state::AppState;
use tracing_subscriber::{EnvFilter, prelude::*};

pub fn init_tracing() {
    if tracing::dispatcher::has_been_set() {
        return;
    }

    let log_level = env::var("RUST_LOG").unwrap_or_else(|_| "info".to_string());
    let filter_string = format!("warn,server={level},sso={level}", level = log_level);
    let env_filter = EnvFilter::try_new(filter_string).unwrap_or_else(|_| EnvFilter::new("info"));

    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer().with_filter(env_filter))
        .init();
}
