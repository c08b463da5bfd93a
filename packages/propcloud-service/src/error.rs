pub type Result<T, E = Error> = std::result::Result<T, E>;

#[derive(Debug, thiserror::Error)]
pub enum Error {
	#[error("Invalid request: {message}")]
	InvalidRequest { message: String, field: Option<String> },
	#[error("{message}")]
	Unauthorized { message: String },
	#[error("Not found: {message}")]
	NotFound { message: String },
	#[error("Conflict: {message}")]
	Conflict { message: String },
	#[error("Provider error: {message}")]
	Provider { message: String },
	#[error("Storage error: {message}")]
	Storage { message: String },
}
impl Error {
	pub(crate) fn invalid_field(field: &str, message: impl Into<String>) -> Self {
		Self::InvalidRequest { message: message.into(), field: Some(field.to_string()) }
	}
}

impl From<sqlx::Error> for Error {
	fn from(err: sqlx::Error) -> Self {
		Self::Storage { message: err.to_string() }
	}
}

impl From<propcloud_storage::Error> for Error {
	fn from(err: propcloud_storage::Error) -> Self {
		match err {
			propcloud_storage::Error::Sqlx(inner) => Self::Storage { message: inner.to_string() },
			propcloud_storage::Error::InvalidArgument(message) =>
				Self::InvalidRequest { message, field: None },
			propcloud_storage::Error::NotFound(message) => Self::NotFound { message },
			propcloud_storage::Error::Conflict(message) => Self::Conflict { message },
		}
	}
}

impl From<propcloud_providers::Error> for Error {
	fn from(err: propcloud_providers::Error) -> Self {
		match err {
			propcloud_providers::Error::Unauthorized { message } => Self::Unauthorized { message },
			other => Self::Provider {
				message: propcloud_providers::sanitize_error_text(&other.to_string()),
			},
		}
	}
}
