use serde::{Deserialize, Serialize};

use propcloud_domain::email::{self, Email, RejectCode};
use propcloud_providers::email::welcome_email;
use propcloud_storage::queries;

use crate::{Error, PropcloudService, Result};

const MAX_REFERRAL_CHARS: usize = 256;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JoinWaitlistRequest {
	pub email: String,
	#[serde(default)]
	pub referral_source: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum JoinStatus {
	Joined,
	AlreadySubscribed,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WelcomeEmailStatus {
	Sent,
	Failed,
	Skipped,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JoinWaitlistResponse {
	pub status: JoinStatus,
	pub message: String,
	pub welcome_email: WelcomeEmailStatus,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WelcomeEmailRequest {
	pub email: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WelcomeEmailResponse {
	pub success: bool,
	pub message: String,
	pub id: Option<String>,
}

impl PropcloudService {
	pub async fn join_waitlist(&self, req: JoinWaitlistRequest) -> Result<JoinWaitlistResponse> {
		let email = validate_email(&req.email)?;
		let referral_source = self.referral_source(req.referral_source.as_deref())?;

		if queries::find_waitlist_email(&self.db, email.as_str()).await?.is_some() {
			tracing::info!("Waitlist signup skipped for an existing email.");

			return Ok(already_subscribed());
		}

		match queries::insert_waitlist_entry(&self.db, email.as_str(), &referral_source).await {
			Ok(entry) => {
				tracing::info!(entry_id = %entry.id, referral_source, "Waitlist signup stored.");
			},
			Err(propcloud_storage::Error::Conflict(_)) => {
				tracing::info!("Concurrent waitlist signup resolved as existing email.");

				return Ok(already_subscribed());
			},
			Err(err) => return Err(err.into()),
		}

		let welcome_email = if self.cfg.waitlist.send_welcome_email {
			match self.deliver_welcome(&email).await {
				Ok(_) => WelcomeEmailStatus::Sent,
				Err(err) => {
					tracing::warn!(error = %err, "Welcome email failed; signup is kept.");

					WelcomeEmailStatus::Failed
				},
			}
		} else {
			WelcomeEmailStatus::Skipped
		};
		let message = match welcome_email {
			WelcomeEmailStatus::Failed =>
				"You're on the waitlist, but there was an issue sending the welcome email. We'll be in touch soon!",
			_ => "You're officially on the PropCloud waitlist!",
		};

		Ok(JoinWaitlistResponse {
			status: JoinStatus::Joined,
			message: message.to_string(),
			welcome_email,
		})
	}

	pub async fn send_welcome_email(
		&self,
		req: WelcomeEmailRequest,
	) -> Result<WelcomeEmailResponse> {
		let email = validate_email(&req.email)?;
		let receipt = self.deliver_welcome(&email).await?;

		Ok(WelcomeEmailResponse {
			success: true,
			message: "Welcome email sent.".to_string(),
			id: Some(receipt.id),
		})
	}

	async fn deliver_welcome(
		&self,
		email: &Email,
	) -> Result<propcloud_providers::email::EmailReceipt> {
		let cfg = &self.cfg.providers.email;
		let message = welcome_email(cfg, email.as_str());
		let receipt = self.providers.email.send(cfg, &message).await?;

		tracing::info!(email_id = %receipt.id, "Welcome email sent.");

		Ok(receipt)
	}

	fn referral_source(&self, raw: Option<&str>) -> Result<String> {
		let source = raw.map(str::trim).filter(|source| !source.is_empty());

		match source {
			Some(source) if source.chars().count() > MAX_REFERRAL_CHARS => Err(Error::invalid_field(
				"$.referral_source",
				format!("referral_source must be at most {MAX_REFERRAL_CHARS} characters."),
			)),
			Some(source) => Ok(source.to_string()),
			None => Ok(self.cfg.waitlist.default_referral_source.clone()),
		}
	}
}

fn validate_email(raw: &str) -> Result<Email> {
	email::validate(raw).map_err(|code| {
		let message = match code {
			RejectCode::RejectEmpty => "Email is required.",
			RejectCode::RejectMalformed => "Please enter a valid email address.",
		};

		Error::invalid_field("$.email", message)
	})
}

fn already_subscribed() -> JoinWaitlistResponse {
	JoinWaitlistResponse {
		status: JoinStatus::AlreadySubscribed,
		message: "You're already on our waitlist. We'll be in touch soon!".to_string(),
		welcome_email: WelcomeEmailStatus::Skipped,
	}
}
