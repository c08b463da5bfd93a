//! Disposable Postgres databases for integration tests.

mod error;

pub use error::{Error, Result};

use std::{env, str::FromStr, thread};

use sqlx::{
	ConnectOptions, Connection, Executor,
	postgres::{PgConnectOptions, PgConnection},
};
use tokio::runtime::Builder;
use uuid::Uuid;

pub const DSN_ENV: &str = "PROPCLOUD_PG_DSN";

/// Maintenance databases tried in order when creating or dropping a test database.
const ADMIN_DATABASES: [&str; 2] = ["postgres", "template1"];

/// A uniquely named database created from a base DSN and dropped on cleanup or drop.
pub struct TestDatabase {
	name: String,
	dsn: String,
	admin: PgConnectOptions,
	dropped: bool,
}
impl TestDatabase {
	pub async fn new(base_dsn: &str) -> Result<Self> {
		let base = PgConnectOptions::from_str(base_dsn)
			.map_err(|source| Error::InvalidDsn { env: DSN_ENV, source })?;
		let (admin, mut conn) = admin_connection(&base).await?;
		let name = format!("propcloud_test_{}", Uuid::new_v4().simple());

		conn.execute(format!(r#"CREATE DATABASE "{name}""#).as_str()).await.map_err(
			|source| Error::Database { action: "create", name: name.clone(), source },
		)?;

		let dsn = base.database(&name).to_url_lossy().to_string();

		Ok(Self { name, dsn, admin, dropped: false })
	}

	pub fn dsn(&self) -> &str {
		&self.dsn
	}

	pub async fn cleanup(mut self) -> Result<()> {
		drop_database(&self.admin, &self.name).await?;

		self.dropped = true;

		Ok(())
	}
}
impl Drop for TestDatabase {
	fn drop(&mut self) {
		if self.dropped {
			return;
		}

		let name = std::mem::take(&mut self.name);
		let admin = self.admin.clone();

		// `drop` cannot await; block on a private runtime in a separate thread.
		let handle = thread::spawn(move || {
			let res = Builder::new_current_thread()
				.enable_all()
				.build()
				.map_err(|err| err.to_string())
				.and_then(|rt| {
					rt.block_on(drop_database(&admin, &name)).map_err(|err| err.to_string())
				});

			if let Err(err) = res {
				eprintln!("Test database cleanup failed: {err}");
			}
		});
		let _ = handle.join();
	}
}

/// The base DSN for database-backed tests, when one is configured.
pub fn env_dsn() -> Option<String> {
	env::var(DSN_ENV).ok().filter(|dsn| !dsn.trim().is_empty())
}

async fn admin_connection(base: &PgConnectOptions) -> Result<(PgConnectOptions, PgConnection)> {
	let mut last = None;

	for database in ADMIN_DATABASES {
		let options = base.clone().database(database);

		match PgConnection::connect_with(&options).await {
			Ok(conn) => return Ok((options, conn)),
			Err(err) => last = Some(err),
		}
	}

	Err(Error::AdminUnreachable { source: last.unwrap_or(sqlx::Error::PoolClosed) })
}

async fn drop_database(admin: &PgConnectOptions, name: &str) -> Result<()> {
	let to_err = |source| Error::Database { action: "drop", name: name.to_string(), source };
	let mut conn = PgConnection::connect_with(admin).await.map_err(to_err)?;

	conn.execute(format!(r#"DROP DATABASE IF EXISTS "{name}" WITH (FORCE)"#).as_str())
		.await
		.map_err(to_err)?;

	Ok(())
}
