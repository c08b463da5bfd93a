use serde::Deserialize;

use crate::{Error, Result};

const PROVIDER: &str = "email";

const WELCOME_HTML: &str = r#"<div style="font-family: Arial, sans-serif; max-width: 600px; margin: 0 auto; padding: 20px;">
  <h1 style="color: #333; text-align: center;">Welcome to PropCloud!</h1>
  <p style="font-size: 16px; line-height: 1.6; color: #555;">
    Thank you for joining our waitlist! We're excited to have you as one of our early supporters.
  </p>
  <p style="font-size: 16px; line-height: 1.6; color: #555;">
    PropCloud is revolutionizing the way real estate professionals manage their properties and connect with clients. You'll be among the first to experience our innovative platform when we launch.
  </p>
  <div style="background-color: #f8f9fa; padding: 20px; border-radius: 8px; margin: 30px 0;">
    <h2 style="color: #333; margin-top: 0;">What's Next?</h2>
    <ul style="color: #555; line-height: 1.6;">
      <li>We'll keep you updated on our progress</li>
      <li>You'll get early access when we launch</li>
      <li>Exclusive insights into PropCloud features</li>
    </ul>
  </div>
  <p style="font-size: 16px; line-height: 1.6; color: #555;">
    Stay tuned for more updates, and thank you for being part of the PropCloud journey!
  </p>
  <hr style="border: none; border-top: 1px solid #eee; margin: 30px 0;">
  <p style="font-size: 14px; color: #888; text-align: center;">
    Best regards,<br>
    The PropCloud Team<br>
    <a href="mailto:contact@propcloud.io" style="color: #007bff;">contact@propcloud.io</a>
  </p>
</div>"#;

#[derive(Debug, Clone)]
pub struct OutgoingEmail {
	pub to: String,
	pub subject: String,
	pub html: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct EmailReceipt {
	pub id: String,
}

pub fn welcome_email(cfg: &propcloud_config::EmailProviderConfig, to: &str) -> OutgoingEmail {
	OutgoingEmail { to: to.to_string(), subject: cfg.subject.clone(), html: WELCOME_HTML.to_string() }
}

pub async fn send(
	cfg: &propcloud_config::EmailProviderConfig,
	message: &OutgoingEmail,
) -> Result<EmailReceipt> {
	let client = crate::http_client(cfg.timeout_ms)?;
	let url = format!("{}{}", cfg.api_base, cfg.path);
	let body = serde_json::json!({
		"from": cfg.from,
		"to": [message.to],
		"subject": message.subject,
		"html": message.html,
	});
	let res = client
		.post(url)
		.headers(crate::auth_headers(&cfg.api_key, &serde_json::Map::new())?)
		.json(&body)
		.send()
		.await?;
	let receipt: EmailReceipt = crate::check_status(PROVIDER, res).await?.json().await.map_err(|err| {
		Error::InvalidResponse { message: format!("Email receipt could not be decoded: {err}.") }
	})?;

	Ok(receipt)
}
