mod availability;
mod backfill;
mod config;
mod data;
mod error;
mod exact;
mod greedy;
mod objective;
mod priority;
mod report;
mod schedule;
mod server;
mod solver;
mod validation;

use log::error;

#[tokio::main]
async fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let config = config::ServiceConfig::from_env();
    if let Err(e) = server::run_server(&config).await {
        error!("Server stopped: {}", e);
        std::process::exit(1);
    }
}
