use clap::Parser;
use std::time::Duration;

mod api;
mod app_context;
mod auth;
mod cli;
mod estimates;
mod geo;
mod health;
mod http;
mod logging;
mod maps;
mod sessions;
mod storage;

#[tokio::main]
async fn main() {
    let args = cli::Args::parse();
    logging::init(&args);
    auth::init(&args);
    api::init(&args);
    let app_context = app_context::init(&args);
    sessions::reaper::spawn_reaper(
        app_context.clone(),
        Duration::from_secs(args.session_sweep_interval_secs.max(1)),
    );
    let router = http::router::new(&args, app_context);

    let listener = tokio::net::TcpListener::bind(args.listen_address)
        .await
        .expect("Failed to bind the listen address.");
    tracing::info!("Listening on {}.", args.listen_address);
    axum::serve(listener, router)
        .await
        .expect("Failed to run the server.");
}
