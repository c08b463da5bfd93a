pub mod routes;
pub mod state;

use std::{net::SocketAddr, path::PathBuf};

use clap::Parser;
use color_eyre::eyre;
use tokio::{net::TcpListener, signal, sync::watch};
use tracing_subscriber::EnvFilter;

use propcloud_config::Config;

use crate::state::AppState;

#[derive(Debug, Parser)]
#[command(
	version = propcloud_cli::VERSION,
	rename_all = "kebab",
	styles = propcloud_cli::styles(),
)]
pub struct Args {
	#[arg(long, short = 'c', value_name = "FILE")]
	pub config: PathBuf,
}

/// Public and admin socket addresses after the loopback rules are applied.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ListenAddrs {
	pub http: SocketAddr,
	pub admin: SocketAddr,
}
impl ListenAddrs {
	/// The admin bind must be loopback, and so must the public one under `bind_localhost_only`.
	pub fn from_config(config: &Config) -> eyre::Result<Self> {
		let http: SocketAddr = config.service.http_bind.parse()?;
		let admin: SocketAddr = config.service.admin_bind.parse()?;

		if !admin.ip().is_loopback() {
			eyre::bail!("service.admin_bind must be a loopback address, got {admin}.");
		}
		if config.security.bind_localhost_only && !http.ip().is_loopback() {
			eyre::bail!(
				"service.http_bind must be a loopback address when security.bind_localhost_only \
				 is set, got {http}."
			);
		}
		if http == admin {
			eyre::bail!("service.http_bind and service.admin_bind must differ.");
		}

		Ok(Self { http, admin })
	}
}

pub async fn run(args: Args) -> color_eyre::Result<()> {
	let config = propcloud_config::load(&args.config)?;

	init_tracing(&config);

	let addrs = ListenAddrs::from_config(&config)?;
	let state = AppState::new(config).await?;
	let public = TcpListener::bind(addrs.http).await?;
	let admin = TcpListener::bind(addrs.admin).await?;
	let (stop_tx, stop_rx) = watch::channel(false);

	tracing::info!(
		http_addr = %addrs.http,
		admin_addr = %addrs.admin,
		"PropCloud API listening."
	);

	tokio::spawn(async move {
		wait_for_signal().await;

		let _ = stop_tx.send(true);
	});
	tokio::try_join!(
		axum::serve(public, routes::router(state.clone()))
			.with_graceful_shutdown(stopped(stop_rx.clone())),
		axum::serve(admin, routes::admin_router(state)).with_graceful_shutdown(stopped(stop_rx)),
	)?;

	tracing::info!("PropCloud API stopped.");

	Ok(())
}

fn init_tracing(config: &Config) {
	let filter =
		EnvFilter::try_new(&config.service.log_level).unwrap_or_else(|_| EnvFilter::new("info"));

	tracing_subscriber::fmt().with_env_filter(filter).init();
}

async fn stopped(mut rx: watch::Receiver<bool>) {
	let _ = rx.wait_for(|stop| *stop).await;
}

async fn wait_for_signal() {
	let ctrl_c = async {
		if let Err(err) = signal::ctrl_c().await {
			tracing::error!(error = %err, "Failed to listen for Ctrl+C.");

			std::future::pending::<()>().await;
		}
	};

	#[cfg(unix)]
	let terminate = async {
		match signal::unix::signal(signal::unix::SignalKind::terminate()) {
			Ok(mut stream) => {
				stream.recv().await;
			},
			Err(err) => {
				tracing::error!(error = %err, "Failed to listen for SIGTERM.");

				std::future::pending::<()>().await;
			},
		}
	};
	#[cfg(not(unix))]
	let terminate = std::future::pending::<()>();

	tokio::select! {
		_ = ctrl_c => tracing::info!("Received Ctrl+C; shutting down."),
		_ = terminate => tracing::info!("Received SIGTERM; shutting down."),
	}
}
