use std::{net::SocketAddr, path::PathBuf};

use anyhow::Context;
use clap::Parser;
use depot_core::{config::Config, http, Core};
use tokio::net::TcpListener;
use tracing::info;
use tracing_subscriber::EnvFilter;

/// HTTP release artifact index and upload server.
#[derive(Parser, Debug)]
#[command(name = "depot-server", version, about)]
struct Args {
	/// Path to the JSON configuration file
	#[arg(short, long, default_value = "depot.json")]
	config: PathBuf,

	/// Override the configured listen port
	#[arg(short, long)]
	port: Option<u16>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
	tracing_subscriber::fmt()
		.with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
		.init();

	let args = Args::parse();

	let mut config = Config::load(&args.config)
		.await
		.with_context(|| format!("failed to load config from {}", args.config.display()))?;
	if let Some(port) = args.port {
		config.port = port;
	}

	let port = config.port;
	let root = config.root_folder.clone();

	let core = Core::new(config);
	let app = http::router(core);

	// This listens on IPv6 and IPv4
	let mut addr = "[::]:9696".parse::<SocketAddr>()?;
	addr.set_port(port);

	info!("Serving {} on http://localhost:{port}", root.display());

	let listener = TcpListener::bind(addr)
		.await
		.context("failed to bind listen address")?;
	axum::serve(listener, app)
		.with_graceful_shutdown(shutdown_signal())
		.await
		.context("HTTP server failed")?;

	Ok(())
}

async fn shutdown_signal() {
	tokio::signal::ctrl_c().await.ok();
	info!("Shutting down");
}
