mod collectors;
mod config;
mod evaluator;
mod http;
mod render;
mod report;
mod update;

use clap::Parser;
use collectors::collect_report;
use config::Config;
use evaluator::evaluate;
use render::render_plain;
use reqwest::Client;
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::net::TcpListener;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(name = "screend")]
#[command(version)]
struct Cli {
    #[arg(long, default_value = "./config.yaml")]
    config: String,
    #[arg(long)]
    print_default_config: bool,
    /// Print the plaintext report once and exit instead of serving HTTP.
    #[arg(long, conflicts_with = "self_update")]
    once: bool,
    /// Fetch the configured update URL and replace the local target file.
    #[arg(long)]
    self_update: bool,
}

#[tokio::main]
async fn main() {
    init_tracing();

    let cli = Cli::parse();
    if cli.print_default_config {
        println!("{}", Config::example_yaml());
        return;
    }

    let cfg = match Config::load_from_file(&cli.config) {
        Ok(cfg) => cfg,
        Err(err) => {
            error!(error = %err, path = %cli.config, "failed to load configuration");
            std::process::exit(1);
        }
    };

    if cli.self_update {
        let client = build_client();
        match update::run_self_update(&client, &cfg.update).await {
            Ok(()) => println!("Update successful"),
            Err(err) => {
                error!(error = %err, "self-update failed");
                println!("Update failed");
                std::process::exit(1);
            }
        }
        return;
    }

    if cli.once {
        let report = collect_report(&cfg.database).await;
        let issues = evaluate(&report);
        print!("{}", render_plain(&issues));
        return;
    }

    info!(listen = %cfg.listen, "starting screend");

    let addr: SocketAddr = match cfg.listen.parse() {
        Ok(addr) => addr,
        Err(err) => {
            error!(error = %err, listen = %cfg.listen, "invalid listen address");
            std::process::exit(1);
        }
    };

    let listener = match TcpListener::bind(addr).await {
        Ok(l) => l,
        Err(err) => {
            error!(error = %err, "failed to start HTTP server");
            std::process::exit(1);
        }
    };

    let app = http::build_router(Arc::new(cfg));
    let server = axum::serve(listener, app).with_graceful_shutdown(async {
        if let Err(err) = tokio::signal::ctrl_c().await {
            error!(error = %err, "failed to wait for Ctrl+C");
        }
        info!("received Ctrl+C, shutting down");
    });

    if let Err(err) = server.await {
        error!(error = %err, "HTTP server error");
    }
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt().with_env_filter(filter).init();
}

fn build_client() -> Client {
    Client::builder()
        .user_agent(concat!("screend/", env!("CARGO_PKG_VERSION")))
        .build()
        .unwrap_or_else(|_| Client::new())
}
