use std::sync::Arc;

use propcloud_service::{BackfillOutcome, embeddings::NOTHING_TO_DO};
use propcloud_storage::queries;
use propcloud_testkit::TestDatabase;

use super::support::{self, FakeEmbedding, Fakes};

#[tokio::test]
#[ignore = "Requires external Postgres with pgvector. Set PROPCLOUD_PG_DSN to run."]
async fn backfill_embeds_pending_listings_once() {
	let Some(base_dsn) = propcloud_testkit::env_dsn() else {
		eprintln!("Skipping backfill_embeds_pending_listings_once; set PROPCLOUD_PG_DSN to run.");

		return;
	};
	let test_db = TestDatabase::new(&base_dsn).await.expect("Failed to create test database.");
	let db = super::bootstrap(&test_db).await;

	super::seed_listing(&db, "1 Brickell Key", "Bay views").await;
	super::seed_listing(&db, "9 Ocean Dr", "Beachfront studio").await;

	let fakes = Fakes::new();
	let service = fakes.service(support::test_config(test_db.dsn()), db);
	let BackfillOutcome::Completed(report) =
		service.generate_embeddings().await.expect("Backfill failed.")
	else {
		panic!("Probe unexpectedly failed.");
	};

	assert_eq!(report.success_count, 2);
	assert_eq!(report.error_count, 0);
	assert_eq!(report.errors, None);
	assert_eq!(report.message, "Embedding generation complete. Success: 2, Errors: 0");
	assert!(
		queries::properties_missing_embeddings(&service.db).await.expect("List failed.").is_empty()
	);

	let BackfillOutcome::Completed(report) =
		service.generate_embeddings().await.expect("Backfill failed.")
	else {
		panic!("Probe unexpectedly failed.");
	};

	assert_eq!(report.message, NOTHING_TO_DO);
	assert_eq!(report.success_count, 0);

	test_db.cleanup().await.expect("Failed to cleanup test database.");
}

#[tokio::test]
#[ignore = "Requires external Postgres with pgvector. Set PROPCLOUD_PG_DSN to run."]
async fn failed_probe_aborts_before_any_listing() {
	let Some(base_dsn) = propcloud_testkit::env_dsn() else {
		eprintln!("Skipping failed_probe_aborts_before_any_listing; set PROPCLOUD_PG_DSN to run.");

		return;
	};
	let test_db = TestDatabase::new(&base_dsn).await.expect("Failed to create test database.");
	let db = super::bootstrap(&test_db).await;

	super::seed_listing(&db, "1 Brickell Key", "Bay views").await;

	let fakes = Fakes { embedding: Arc::new(FakeEmbedding::failing()), ..Fakes::new() };
	let service = fakes.service(support::test_config(test_db.dsn()), db);
	let BackfillOutcome::ProbeFailed(failure) =
		service.generate_embeddings().await.expect("Backfill failed.")
	else {
		panic!("Expected the probe to fail.");
	};

	assert!(failure.error.starts_with("Embedding provider probe failed:"));
	assert_eq!(failure.details.as_ref().map(|details| details["status"].clone()), Some(401.into()));
	assert_eq!(fakes.embedding.count(), 0);
	assert_eq!(
		queries::properties_missing_embeddings(&service.db).await.expect("List failed.").len(),
		1
	);

	test_db.cleanup().await.expect("Failed to cleanup test database.");
}

#[tokio::test]
#[ignore = "Requires external Postgres with pgvector. Set PROPCLOUD_PG_DSN to run."]
async fn probe_rejects_wrong_dimension_vectors() {
	let Some(base_dsn) = propcloud_testkit::env_dsn() else {
		eprintln!("Skipping probe_rejects_wrong_dimension_vectors; set PROPCLOUD_PG_DSN to run.");

		return;
	};
	let test_db = TestDatabase::new(&base_dsn).await.expect("Failed to create test database.");
	let db = super::bootstrap(&test_db).await;

	super::seed_listing(&db, "1 Brickell Key", "Bay views").await;

	let fakes = Fakes { embedding: Arc::new(FakeEmbedding::new(3)), ..Fakes::new() };
	let service = fakes.service(support::test_config(test_db.dsn()), db);
	let BackfillOutcome::ProbeFailed(failure) =
		service.generate_embeddings().await.expect("Backfill failed.")
	else {
		panic!("Expected a dimension mismatch to fail the probe.");
	};

	assert!(
		failure.error.contains("3 dimensions, expected 4"),
		"Unexpected error: {}",
		failure.error
	);

	test_db.cleanup().await.expect("Failed to cleanup test database.");
}
