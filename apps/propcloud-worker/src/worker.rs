use std::time::Duration;

use propcloud_service::{BackfillOutcome, PropcloudService};

use crate::Result;

/// Runs one embedding backfill and logs its outcome.
pub async fn run_pass(service: &PropcloudService) -> Result<BackfillOutcome> {
	let outcome = service.generate_embeddings().await?;

	match &outcome {
		BackfillOutcome::Completed(report) => {
			tracing::info!(
				success_count = report.success_count,
				error_count = report.error_count,
				message = %report.message,
				"Embedding backfill pass finished."
			);
		},
		BackfillOutcome::ProbeFailed(failure) => {
			tracing::warn!(error = %failure.error, "Embedding backfill pass skipped.");
		},
	}

	Ok(outcome)
}

/// Runs a pass every `poll_interval`. A failed pass is logged and retried on the next tick.
pub async fn run_worker(service: &PropcloudService, poll_interval: Duration) {
	let mut ticker = tokio::time::interval(poll_interval.max(Duration::from_secs(1)));

	ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);

	loop {
		ticker.tick().await;

		if let Err(err) = run_pass(service).await {
			tracing::error!(error = %err, "Embedding backfill pass failed.");
		}
	}
}
