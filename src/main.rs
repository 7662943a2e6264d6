use crate::app::AppState;
use crate::config::Config;
use crate::db::connection::{init_db, Database};
use astra::Server;
use std::net::SocketAddr;
use tracing_subscriber::EnvFilter;

mod app;
mod auth;
mod config;
mod db;
mod domain;
mod errors;
mod events;
mod handlers;
mod insights;
mod mailer;
mod request;
mod responses;
mod router;
mod services;
mod spreadsheets;
mod templates;

#[cfg(test)]
mod tests;

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let config = Config::load();
    let db = Database::new(config.db_path.clone());

    if let Err(e) = init_db(&db, &config.schema_path) {
        tracing::error!("database initialization failed: {e}");
        std::process::exit(1);
    }

    let addr: SocketAddr = match config.bind_addr.parse() {
        Ok(addr) => addr,
        Err(e) => {
            tracing::error!(bind_addr = %config.bind_addr, "invalid bind address: {e}");
            std::process::exit(1);
        }
    };
    let server = Server::bind(&addr).max_workers(config.max_workers);

    if config.brevo_api_key.is_none() {
        tracing::warn!("brevo_api_key not set, sign-in links will be logged instead of emailed");
    }
    let app = AppState::new(db, config);
    tracing::info!("listening on http://{addr}");

    let result = server.serve(move |req, _info| router::respond(req, &app));

    if let Err(e) = result {
        tracing::error!("server ended with error: {e}");
    }
    tracing::info!("server shut down");
}
