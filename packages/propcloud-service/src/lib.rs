pub mod chat;
pub mod conversations;
pub mod embeddings;
pub mod waitlist;

mod error;

pub use chat::{ChatRequest, ChatResponse};
pub use conversations::{
	ConversationItem, ConversationsResponse, CreateConversationRequest, MessageItem,
	MessagesResponse, RenameConversationRequest,
};
pub use embeddings::{BackfillOutcome, BackfillReport, ProbeFailure};
pub use error::{Error, Result};
pub use propcloud_providers::auth::AuthUser;
pub use waitlist::{
	JoinStatus, JoinWaitlistRequest, JoinWaitlistResponse, WelcomeEmailRequest,
	WelcomeEmailResponse, WelcomeEmailStatus,
};

use std::{future::Future, pin::Pin, sync::Arc};

use propcloud_config::{
	Auth, Config, EmailProviderConfig, EmbeddingProviderConfig, GenerationProviderConfig,
};
use propcloud_providers::{
	auth, email,
	email::{EmailReceipt, OutgoingEmail},
	embedding,
	embedding::ProbeReport,
	generation,
};
use propcloud_storage::db::Db;

pub type BoxFuture<'a, T> = Pin<Box<dyn Future<Output = T> + Send + 'a>>;

pub type ProviderResult<T> = propcloud_providers::Result<T>;

pub trait AuthProvider
where
	Self: Send + Sync,
{
	fn verify<'a>(
		&'a self,
		cfg: &'a Auth,
		access_token: &'a str,
	) -> BoxFuture<'a, ProviderResult<AuthUser>>;
}

pub trait EmbeddingProvider
where
	Self: Send + Sync,
{
	fn embed<'a>(
		&'a self,
		cfg: &'a EmbeddingProviderConfig,
		text: &'a str,
	) -> BoxFuture<'a, ProviderResult<Vec<f32>>>;

	fn probe<'a>(&'a self, cfg: &'a EmbeddingProviderConfig) -> BoxFuture<'a, ProbeReport>;
}

pub trait GenerationProvider
where
	Self: Send + Sync,
{
	fn generate<'a>(
		&'a self,
		cfg: &'a GenerationProviderConfig,
		prompt: &'a str,
	) -> BoxFuture<'a, ProviderResult<String>>;
}

pub trait EmailProvider
where
	Self: Send + Sync,
{
	fn send<'a>(
		&'a self,
		cfg: &'a EmailProviderConfig,
		message: &'a OutgoingEmail,
	) -> BoxFuture<'a, ProviderResult<EmailReceipt>>;
}

#[derive(Clone)]
pub struct Providers {
	pub auth: Arc<dyn AuthProvider>,
	pub embedding: Arc<dyn EmbeddingProvider>,
	pub generation: Arc<dyn GenerationProvider>,
	pub email: Arc<dyn EmailProvider>,
}
impl Providers {
	pub fn new(
		auth: Arc<dyn AuthProvider>,
		embedding: Arc<dyn EmbeddingProvider>,
		generation: Arc<dyn GenerationProvider>,
		email: Arc<dyn EmailProvider>,
	) -> Self {
		Self { auth, embedding, generation, email }
	}
}
impl Default for Providers {
	fn default() -> Self {
		let provider = Arc::new(DefaultProviders);

		Self {
			auth: provider.clone(),
			embedding: provider.clone(),
			generation: provider.clone(),
			email: provider,
		}
	}
}

pub struct PropcloudService {
	pub cfg: Config,
	pub db: Db,
	pub providers: Providers,
}
impl PropcloudService {
	pub fn new(cfg: Config, db: Db) -> Self {
		Self { cfg, db, providers: Providers::default() }
	}

	pub fn with_providers(cfg: Config, db: Db, providers: Providers) -> Self {
		Self { cfg, db, providers }
	}

	/// Resolves the caller from the raw `Authorization` header value.
	pub async fn authenticate(&self, authorization: Option<&str>) -> Result<AuthUser> {
		let Some(raw) = authorization.map(str::trim).filter(|raw| !raw.is_empty()) else {
			return Err(Error::Unauthorized { message: "No authorization header".to_string() });
		};
		let token = bearer_token(raw).ok_or_else(|| Error::Unauthorized {
			message: "Invalid authorization".to_string(),
		})?;

		match self.providers.auth.verify(&self.cfg.auth, token).await {
			Ok(user) => Ok(user),
			Err(propcloud_providers::Error::Unauthorized { message }) =>
				Err(Error::Unauthorized { message }),
			Err(err) => {
				tracing::warn!(error = %err, "Token verification failed.");

				Err(Error::Unauthorized { message: "Invalid authorization".to_string() })
			},
		}
	}
}

struct DefaultProviders;

impl AuthProvider for DefaultProviders {
	fn verify<'a>(
		&'a self,
		cfg: &'a Auth,
		access_token: &'a str,
	) -> BoxFuture<'a, ProviderResult<AuthUser>> {
		Box::pin(auth::verify(cfg, access_token))
	}
}

impl EmbeddingProvider for DefaultProviders {
	fn embed<'a>(
		&'a self,
		cfg: &'a EmbeddingProviderConfig,
		text: &'a str,
	) -> BoxFuture<'a, ProviderResult<Vec<f32>>> {
		Box::pin(embedding::embed(cfg, text))
	}

	fn probe<'a>(&'a self, cfg: &'a EmbeddingProviderConfig) -> BoxFuture<'a, ProbeReport> {
		Box::pin(embedding::probe(cfg))
	}
}

impl GenerationProvider for DefaultProviders {
	fn generate<'a>(
		&'a self,
		cfg: &'a GenerationProviderConfig,
		prompt: &'a str,
	) -> BoxFuture<'a, ProviderResult<String>> {
		Box::pin(generation::generate(cfg, prompt))
	}
}

impl EmailProvider for DefaultProviders {
	fn send<'a>(
		&'a self,
		cfg: &'a EmailProviderConfig,
		message: &'a OutgoingEmail,
	) -> BoxFuture<'a, ProviderResult<EmailReceipt>> {
		Box::pin(email::send(cfg, message))
	}
}

/// Accepts `Bearer <token>` with a case-insensitive scheme.
pub fn bearer_token(raw: &str) -> Option<&str> {
	let (scheme, token) = raw.split_once(' ')?;
	let token = token.trim();

	(scheme.eq_ignore_ascii_case("bearer") && !token.is_empty()).then_some(token)
}
