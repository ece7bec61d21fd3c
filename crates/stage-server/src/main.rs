// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Stage internship management server binary.

use std::path::PathBuf;
use std::sync::Arc;

use clap::{Parser, Subcommand};
use stage_server::{create_app_state, create_router, jobs};
use stage_server_blob::LocalBlobStore;
use stage_server_config::LogFormat;
use tower_http::{
	cors::{Any, CorsLayer},
	trace::TraceLayer,
};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Stage server - HTTP API for internship management.
#[derive(Parser, Debug)]
#[command(name = "stage-server", about = "Stage internship management server", version)]
struct Args {
	/// Config file to use instead of `$STAGE_CONFIG` or the system path
	#[arg(long, short = 'c', global = true)]
	config: Option<PathBuf>,

	#[command(subcommand)]
	command: Option<Command>,
}

#[derive(Subcommand, Debug)]
enum Command {
	/// Run the HTTP server (default)
	Serve,
	/// Show version information
	Version,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
	let args = Args::parse();

	if let Some(Command::Version) = args.command {
		println!("stage-server version: {}", env!("CARGO_PKG_VERSION"));
		return Ok(());
	}

	dotenvy::dotenv().ok();

	let config = match &args.config {
		Some(path) => stage_server_config::load_config_with_file(path)?,
		None => stage_server_config::load_config()?,
	};

	let filter = tracing_subscriber::EnvFilter::try_from_default_env()
		.unwrap_or_else(|_| config.logging.level.clone().into());
	let registry = tracing_subscriber::registry().with(filter);
	match config.logging.format {
		LogFormat::Json => registry.with(tracing_subscriber::fmt::layer().json()).init(),
		LogFormat::Pretty => registry.with(tracing_subscriber::fmt::layer()).init(),
	}

	tracing::info!(
		host = %config.http.host,
		port = config.http.port,
		environment = %config.auth.environment,
		"starting stage-server"
	);

	let pool =
		stage_server_db::create_pool(&config.database.url, config.database.max_connections).await?;
	stage_server_db::run_migrations(&pool).await?;

	let blob_store = Arc::new(LocalBlobStore::new(config.storage.root.clone()));
	tracing::info!(root = %config.storage.root.display(), "blob store ready");

	let state = create_app_state(pool, &config, blob_store)?;

	let cleanup = jobs::spawn_session_cleanup(
		Arc::clone(&state.session_repo),
		jobs::SESSION_CLEANUP_INTERVAL,
	);

	let app = create_router(state)
		.layer(TraceLayer::new_for_http())
		.layer(
			CorsLayer::new()
				.allow_origin(Any)
				.allow_methods(Any)
				.allow_headers(Any),
		);

	let addr = config.socket_addr()?;
	tracing::info!("listening on {}", addr);

	let listener = tokio::net::TcpListener::bind(&addr).await?;

	tokio::select! {
		result = axum::serve(listener, app) => {
			if let Err(e) = result {
				tracing::error!(error = %e, "Server error");
			}
		}
		_ = tokio::signal::ctrl_c() => {
			tracing::info!("Received shutdown signal");
		}
	}

	cleanup.abort();
	tracing::info!("Server shutdown complete");
	Ok(())
}
