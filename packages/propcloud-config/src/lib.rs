mod error;
mod types;

pub use error::{Error, Result};
pub use types::{
	Auth, Config, EmailProviderConfig, EmbeddingProviderConfig, Embeddings,
	GenerationProviderConfig, Postgres, Providers, Retrieval, Security, Service, Storage, Waitlist,
};

use std::{fs, path::Path};

const MAX_MATCH_COUNT: u32 = 100;
const MAX_FALLBACK_POOL: u32 = 1_000;

pub fn load(path: &Path) -> Result<Config> {
	let raw = fs::read_to_string(path)
		.map_err(|err| Error::ReadConfig { path: path.to_path_buf(), source: err })?;

	let mut cfg: Config = toml::from_str(&raw)
		.map_err(|err| Error::ParseConfig { path: path.to_path_buf(), source: err })?;

	normalize(&mut cfg);

	validate(&cfg)?;

	Ok(cfg)
}

pub fn validate(cfg: &Config) -> Result<()> {
	for (label, value) in [
		("service.http_bind", &cfg.service.http_bind),
		("service.admin_bind", &cfg.service.admin_bind),
		("storage.postgres.dsn", &cfg.storage.postgres.dsn),
		("auth.api_base", &cfg.auth.api_base),
		("providers.embedding.api_base", &cfg.providers.embedding.api_base),
		("providers.generation.api_base", &cfg.providers.generation.api_base),
		("providers.email.api_base", &cfg.providers.email.api_base),
	] {
		if value.trim().is_empty() {
			return Err(Error::Validation { message: format!("{label} must be non-empty.") });
		}
	}

	if cfg.storage.postgres.pool_max_conns == 0 {
		return Err(Error::Validation {
			message: "storage.postgres.pool_max_conns must be greater than zero.".to_string(),
		});
	}
	if cfg.providers.embedding.dimensions == 0 {
		return Err(Error::Validation {
			message: "providers.embedding.dimensions must be greater than zero.".to_string(),
		});
	}
	if cfg.providers.embedding.dimensions != cfg.storage.vector_dim {
		return Err(Error::Validation {
			message: "providers.embedding.dimensions must match storage.vector_dim.".to_string(),
		});
	}

	validate_retrieval(cfg)?;
	validate_generation(cfg)?;

	if cfg.embeddings.max_attempts == 0 {
		return Err(Error::Validation {
			message: "embeddings.max_attempts must be greater than zero.".to_string(),
		});
	}
	if cfg.embeddings.max_backoff_ms < cfg.embeddings.base_backoff_ms {
		return Err(Error::Validation {
			message: "embeddings.max_backoff_ms must be at least embeddings.base_backoff_ms."
				.to_string(),
		});
	}
	if cfg.embeddings.poll_interval_secs == 0 {
		return Err(Error::Validation {
			message: "embeddings.poll_interval_secs must be greater than zero.".to_string(),
		});
	}

	for (label, key) in [
		("auth", &cfg.auth.anon_key),
		("embedding", &cfg.providers.embedding.api_key),
		("generation", &cfg.providers.generation.api_key),
		("email", &cfg.providers.email.api_key),
	] {
		if key.trim().is_empty() {
			return Err(Error::Validation {
				message: format!("Provider {label} api_key must be non-empty."),
			});
		}
	}

	if !cfg.providers.email.from.contains('@') {
		return Err(Error::Validation {
			message: "providers.email.from must contain an email address.".to_string(),
		});
	}
	if cfg.waitlist.default_referral_source.trim().is_empty() {
		return Err(Error::Validation {
			message: "waitlist.default_referral_source must be non-empty.".to_string(),
		});
	}
	if cfg.security.cors_allow_origins.iter().any(|origin| origin.trim().is_empty()) {
		return Err(Error::Validation {
			message: "security.cors_allow_origins must not contain blank entries.".to_string(),
		});
	}

	Ok(())
}

fn validate_retrieval(cfg: &Config) -> Result<()> {
	let retrieval = &cfg.retrieval;

	if !retrieval.match_threshold.is_finite() {
		return Err(Error::Validation {
			message: "retrieval.match_threshold must be a finite number.".to_string(),
		});
	}
	if !(-1.0..=1.0).contains(&retrieval.match_threshold) {
		return Err(Error::Validation {
			message: "retrieval.match_threshold must be in the range -1.0-1.0.".to_string(),
		});
	}
	if retrieval.match_count == 0 {
		return Err(Error::Validation {
			message: "retrieval.match_count must be greater than zero.".to_string(),
		});
	}
	if retrieval.match_count > MAX_MATCH_COUNT {
		return Err(Error::Validation {
			message: format!("retrieval.match_count must be at most {MAX_MATCH_COUNT}."),
		});
	}
	if retrieval.fallback_pool < retrieval.match_count {
		return Err(Error::Validation {
			message: "retrieval.fallback_pool must be at least retrieval.match_count.".to_string(),
		});
	}
	if retrieval.fallback_pool > MAX_FALLBACK_POOL {
		return Err(Error::Validation {
			message: format!("retrieval.fallback_pool must be at most {MAX_FALLBACK_POOL}."),
		});
	}

	Ok(())
}

fn validate_generation(cfg: &Config) -> Result<()> {
	let generation = &cfg.providers.generation;

	if !generation.path.contains("{model}") {
		return Err(Error::Validation {
			message: "providers.generation.path must contain a {model} placeholder.".to_string(),
		});
	}
	if !generation.temperature.is_finite() || !(0.0..=2.0).contains(&generation.temperature) {
		return Err(Error::Validation {
			message: "providers.generation.temperature must be in the range 0.0-2.0.".to_string(),
		});
	}
	if !generation.top_p.is_finite() || generation.top_p <= 0.0 || generation.top_p > 1.0 {
		return Err(Error::Validation {
			message: "providers.generation.top_p must be greater than 0.0 and at most 1.0."
				.to_string(),
		});
	}
	if generation.max_output_tokens == 0 {
		return Err(Error::Validation {
			message: "providers.generation.max_output_tokens must be greater than zero."
				.to_string(),
		});
	}

	Ok(())
}

fn normalize(cfg: &mut Config) {
	if cfg.security.admin_auth_token.as_deref().is_some_and(|token| token.trim().is_empty()) {
		cfg.security.admin_auth_token = None;
	}

	cfg.auth.api_base = cfg.auth.api_base.trim_end_matches('/').to_string();
	cfg.providers.embedding.api_base =
		cfg.providers.embedding.api_base.trim_end_matches('/').to_string();
	cfg.providers.generation.api_base =
		cfg.providers.generation.api_base.trim_end_matches('/').to_string();
	cfg.providers.email.api_base = cfg.providers.email.api_base.trim_end_matches('/').to_string();
}
