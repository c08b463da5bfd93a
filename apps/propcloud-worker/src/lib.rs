pub mod worker;

mod error;

pub use error::{Error, Result};

use std::{path::PathBuf, time::Duration};

use clap::Parser;
use tracing_subscriber::EnvFilter;

use propcloud_service::PropcloudService;
use propcloud_storage::db::Db;

#[derive(Debug, Parser)]
#[command(
	version = propcloud_cli::VERSION,
	rename_all = "kebab",
	styles = propcloud_cli::styles(),
)]
pub struct Args {
	#[arg(long, short = 'c', value_name = "FILE")]
	pub config: PathBuf,
	/// Run a single backfill pass and exit.
	#[arg(long)]
	pub once: bool,
}

pub async fn run(args: Args) -> color_eyre::Result<()> {
	let config = propcloud_config::load(&args.config)?;
	let filter =
		EnvFilter::try_new(&config.service.log_level).unwrap_or_else(|_| EnvFilter::new("info"));

	tracing_subscriber::fmt().with_env_filter(filter).init();

	let db = Db::connect(&config.storage.postgres).await?;

	db.ensure_schema(config.storage.vector_dim).await?;

	let poll_interval = Duration::from_secs(config.embeddings.poll_interval_secs);
	let service = PropcloudService::new(config, db);

	if args.once {
		worker::run_pass(&service).await?;

		return Ok(());
	}

	worker::run_worker(&service, poll_interval).await;

	Ok(())
}
