use serde::Deserialize;
use serde_json::{Map, Value};

#[derive(Debug, Clone, Deserialize)]
pub struct Config {
	pub service: Service,
	pub storage: Storage,
	pub auth: Auth,
	pub providers: Providers,
	#[serde(default)]
	pub retrieval: Retrieval,
	#[serde(default)]
	pub embeddings: Embeddings,
	#[serde(default)]
	pub waitlist: Waitlist,
	#[serde(default)]
	pub security: Security,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Service {
	pub http_bind: String,
	pub admin_bind: String,
	#[serde(default = "default_log_level")]
	pub log_level: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Storage {
	pub postgres: Postgres,
	#[serde(default = "default_vector_dim")]
	pub vector_dim: u32,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Postgres {
	pub dsn: String,
	pub pool_max_conns: u32,
}

/// Hosted identity endpoint used to resolve bearer tokens into users.
#[derive(Debug, Clone, Deserialize)]
pub struct Auth {
	pub api_base: String,
	#[serde(default = "default_auth_path")]
	pub path: String,
	pub anon_key: String,
	#[serde(default = "default_timeout_ms")]
	pub timeout_ms: u64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Providers {
	pub embedding: EmbeddingProviderConfig,
	pub generation: GenerationProviderConfig,
	pub email: EmailProviderConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct EmbeddingProviderConfig {
	pub provider_id: String,
	pub api_base: String,
	pub api_key: String,
	pub path: String,
	pub model: String,
	pub dimensions: u32,
	#[serde(default = "default_timeout_ms")]
	pub timeout_ms: u64,
	#[serde(default = "default_true")]
	pub wait_for_model: bool,
	#[serde(default)]
	pub default_headers: Map<String, Value>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct GenerationProviderConfig {
	pub provider_id: String,
	pub api_base: String,
	pub api_key: String,
	/// Request path; `{model}` is replaced with [`GenerationProviderConfig::model`].
	pub path: String,
	pub model: String,
	#[serde(default = "default_temperature")]
	pub temperature: f32,
	#[serde(default = "default_top_k")]
	pub top_k: u32,
	#[serde(default = "default_top_p")]
	pub top_p: f32,
	#[serde(default = "default_max_output_tokens")]
	pub max_output_tokens: u32,
	#[serde(default = "default_safety_threshold")]
	pub safety_threshold: String,
	#[serde(default = "default_generation_timeout_ms")]
	pub timeout_ms: u64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct EmailProviderConfig {
	pub api_base: String,
	#[serde(default = "default_email_path")]
	pub path: String,
	pub api_key: String,
	pub from: String,
	#[serde(default = "default_email_subject")]
	pub subject: String,
	#[serde(default = "default_timeout_ms")]
	pub timeout_ms: u64,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct Retrieval {
	pub match_threshold: f32,
	pub match_count: u32,
	/// Rows loaded for keyword ranking when the vector match fails.
	pub fallback_pool: u32,
}
impl Default for Retrieval {
	fn default() -> Self {
		Self { match_threshold: 0.3, match_count: 3, fallback_pool: 5 }
	}
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct Embeddings {
	pub max_attempts: u32,
	pub warmup_ms: u64,
	pub base_backoff_ms: u64,
	pub max_backoff_ms: u64,
	pub inter_request_delay_ms: u64,
	pub poll_interval_secs: u64,
}
impl Default for Embeddings {
	fn default() -> Self {
		Self {
			max_attempts: 3,
			warmup_ms: 10_000,
			base_backoff_ms: 2_000,
			max_backoff_ms: 30_000,
			inter_request_delay_ms: 2_000,
			poll_interval_secs: 300,
		}
	}
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct Waitlist {
	pub default_referral_source: String,
	pub send_welcome_email: bool,
}
impl Default for Waitlist {
	fn default() -> Self {
		Self { default_referral_source: "direct".to_string(), send_welcome_email: true }
	}
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct Security {
	pub bind_localhost_only: bool,
	pub admin_auth_token: Option<String>,
	pub cors_allow_origins: Vec<String>,
}
impl Default for Security {
	fn default() -> Self {
		Self {
			bind_localhost_only: false,
			admin_auth_token: None,
			cors_allow_origins: vec!["*".to_string()],
		}
	}
}

fn default_log_level() -> String {
	"info".to_string()
}

fn default_vector_dim() -> u32 {
	384
}

fn default_auth_path() -> String {
	"/auth/v1/user".to_string()
}

fn default_timeout_ms() -> u64 {
	30_000
}

fn default_generation_timeout_ms() -> u64 {
	60_000
}

fn default_true() -> bool {
	true
}

fn default_temperature() -> f32 {
	0.2
}

fn default_top_k() -> u32 {
	40
}

fn default_top_p() -> f32 {
	0.8
}

fn default_max_output_tokens() -> u32 {
	1_024
}

fn default_safety_threshold() -> String {
	"BLOCK_MEDIUM_AND_ABOVE".to_string()
}

fn default_email_path() -> String {
	"/emails".to_string()
}

fn default_email_subject() -> String {
	"Welcome to PropCloud - You're on the waitlist!".to_string()
}
