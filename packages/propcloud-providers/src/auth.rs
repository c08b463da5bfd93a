use reqwest::{StatusCode, header::AUTHORIZATION};
use serde::Deserialize;
use uuid::Uuid;

use crate::{Error, Result};

const PROVIDER: &str = "auth";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthUser {
	pub id: Uuid,
	pub email: Option<String>,
}

#[derive(Debug, Deserialize)]
struct UserBody {
	id: String,
	#[serde(default)]
	email: Option<String>,
}

/// Resolves a bearer access token into the user it was issued to.
pub async fn verify(cfg: &propcloud_config::Auth, access_token: &str) -> Result<AuthUser> {
	let client = crate::http_client(cfg.timeout_ms)?;
	let url = format!("{}{}", cfg.api_base, cfg.path);
	let res = client
		.get(url)
		.header(AUTHORIZATION, format!("Bearer {access_token}"))
		.header("apikey", cfg.anon_key.as_str())
		.send()
		.await?;

	if matches!(res.status(), StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN) {
		return Err(Error::Unauthorized { message: "Invalid authorization".to_string() });
	}

	let body: UserBody = crate::check_status(PROVIDER, res).await?.json().await?;

	parse_user(body)
}

fn parse_user(body: UserBody) -> Result<AuthUser> {
	let id = Uuid::parse_str(body.id.trim()).map_err(|_| Error::InvalidResponse {
		message: "Auth response carries a malformed user id.".to_string(),
	})?;

	Ok(AuthUser { id, email: body.email.filter(|email| !email.is_empty()) })
}
