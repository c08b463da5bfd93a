use std::time::Duration;

use serde::Serialize;
use serde_json::Value;

use propcloud_domain::property::{self, Property};
use propcloud_providers::retry::{self, Backoff};
use propcloud_storage::{queries, vector_to_pg};

use crate::{PropcloudService, Result};

pub const NOTHING_TO_DO: &str =
	"No properties need embeddings. All properties already have embeddings generated.";

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BackfillReport {
	pub message: String,
	pub success_count: usize,
	pub error_count: usize,
	#[serde(skip_serializing_if = "Option::is_none")]
	pub errors: Option<Vec<String>>,
}

/// Returned instead of a report when the embedding endpoint is unusable.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ProbeFailure {
	pub error: String,
	pub success_count: usize,
	pub error_count: usize,
	#[serde(skip_serializing_if = "Option::is_none")]
	pub details: Option<Value>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum BackfillOutcome {
	Completed(BackfillReport),
	ProbeFailed(ProbeFailure),
}

impl PropcloudService {
	/// Embeds every listing that has no embedding yet.
	///
	/// Per-listing failures are collected in the report; only storage failures while listing the
	/// pending rows fail the whole pass.
	pub async fn generate_embeddings(&self) -> Result<BackfillOutcome> {
		let pending = queries::properties_missing_embeddings(&self.db).await?;

		if pending.is_empty() {
			tracing::info!("No listings need embeddings.");

			return Ok(BackfillOutcome::Completed(BackfillReport {
				message: NOTHING_TO_DO.to_string(),
				success_count: 0,
				error_count: 0,
				errors: None,
			}));
		}

		tracing::info!(count = pending.len(), "Listings need embeddings.");

		if let Some(failure) = self.probe_embeddings().await {
			return Ok(BackfillOutcome::ProbeFailed(failure));
		}

		let cfg = &self.cfg.providers.embedding;
		let provider = &self.providers.embedding;
		let policy = Backoff::from_config(&self.cfg.embeddings);
		let delay = Duration::from_millis(self.cfg.embeddings.inter_request_delay_ms);
		let vector_dim = self.cfg.storage.vector_dim as usize;
		let total = pending.len();
		let mut success_count = 0;
		let mut errors = Vec::new();

		for (idx, row) in pending.into_iter().enumerate() {
			let id = row.id;
			let listing = Property::from(row);
			let text = property::embedding_text(&listing);
			let text = text.as_str();
			let embedded =
				retry::with_backoff(&policy, "property_embedding", move |_| provider.embed(cfg, text))
					.await;

			match embedded {
				Ok(vec) if vec.len() != vector_dim => {
					errors.push(format!(
						"Failed to process {}: embedding has {} dimensions, expected {vector_dim}",
						listing.address,
						vec.len()
					));
				},
				Ok(vec) => match queries::set_property_embedding(&self.db, id, &vector_to_pg(&vec))
					.await
				{
					Ok(()) => {
						tracing::info!(property_id = %id, "Stored listing embedding.");

						success_count += 1;
					},
					Err(err) => errors.push(format!("Failed to update {}: {err}", listing.address)),
				},
				Err(err) => errors.push(format!(
					"Failed to process {}: {}",
					listing.address,
					propcloud_providers::sanitize_error_text(&err.to_string())
				)),
			}

			if idx + 1 < total && !delay.is_zero() {
				tokio::time::sleep(delay).await;
			}
		}

		let error_count = errors.len();

		tracing::info!(success_count, error_count, "Embedding backfill finished.");

		for error in &errors {
			tracing::warn!(error = %error, "Listing embedding failed.");
		}

		Ok(BackfillOutcome::Completed(BackfillReport {
			message: format!(
				"Embedding generation complete. Success: {success_count}, Errors: {error_count}"
			),
			success_count,
			error_count,
			errors: (error_count > 0).then_some(errors),
		}))
	}

	async fn probe_embeddings(&self) -> Option<ProbeFailure> {
		let report = self.providers.embedding.probe(&self.cfg.providers.embedding).await;
		let expected = self.cfg.storage.vector_dim as usize;
		let error = if !report.ok {
			report.error.unwrap_or_else(|| "unknown error".to_string())
		} else {
			match report.dimensions {
				Some(dimensions) if dimensions != expected =>
					format!("endpoint returned {dimensions} dimensions, expected {expected}"),
				_ => return None,
			}
		};

		tracing::warn!(error = %error, "Embedding provider probe failed; backfill aborted.");

		Some(ProbeFailure {
			error: format!("Embedding provider probe failed: {error}."),
			success_count: 0,
			error_count: 0,
			details: report.details,
		})
	}
}
