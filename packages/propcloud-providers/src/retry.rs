use std::{fmt::Display, future::Future, time::Duration};

/// Exponential backoff around a single fallible call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Backoff {
	pub max_attempts: u32,
	/// Slept once before the first attempt, giving a cold model time to load.
	pub warmup: Duration,
	pub base: Duration,
	pub max: Duration,
}
impl Backoff {
	pub fn from_config(cfg: &propcloud_config::Embeddings) -> Self {
		Self {
			max_attempts: cfg.max_attempts.max(1),
			warmup: Duration::from_millis(cfg.warmup_ms),
			base: Duration::from_millis(cfg.base_backoff_ms),
			max: Duration::from_millis(cfg.max_backoff_ms),
		}
	}

	/// Delay after failed attempt `attempt` (1-based): `base * 2^attempt`, capped at `max`.
	pub fn delay_after(&self, attempt: u32) -> Duration {
		let factor = 1_u32 << attempt.min(16);

		self.base.saturating_mul(factor).min(self.max)
	}
}

/// Runs `op` until it succeeds or `policy.max_attempts` attempts have failed, returning the last
/// error. `op` receives the 1-based attempt number.
pub async fn with_backoff<T, E, F, Fut>(policy: &Backoff, label: &str, mut op: F) -> Result<T, E>
where
	F: FnMut(u32) -> Fut,
	Fut: Future<Output = Result<T, E>>,
	E: Display,
{
	let max_attempts = policy.max_attempts.max(1);

	if !policy.warmup.is_zero() {
		tracing::debug!(
			label,
			warmup_ms = policy.warmup.as_millis() as u64,
			"Waiting before first attempt."
		);

		tokio::time::sleep(policy.warmup).await;
	}

	let mut attempt = 1;

	loop {
		match op(attempt).await {
			Ok(value) => return Ok(value),
			Err(err) => {
				tracing::warn!(label, attempt, max_attempts, error = %err, "Attempt failed.");

				if attempt >= max_attempts {
					return Err(err);
				}

				let delay = policy.delay_after(attempt);

				tracing::debug!(
					label,
					delay_ms = delay.as_millis() as u64,
					"Retrying after backoff."
				);

				tokio::time::sleep(delay).await;

				attempt += 1;
			},
		}
	}
}
