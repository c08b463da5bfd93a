pub type Result<T, E = Error> = std::result::Result<T, E>;

#[derive(Debug, thiserror::Error)]
pub enum Error {
	#[error("Invalid {env} value: {source}.")]
	InvalidDsn { env: &'static str, source: sqlx::Error },

	#[error("No admin database reachable; last error: {source}.")]
	AdminUnreachable { source: sqlx::Error },

	#[error("Failed to {action} database {name}: {source}.")]
	Database { action: &'static str, name: String, source: sqlx::Error },
}
