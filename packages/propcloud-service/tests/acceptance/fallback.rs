use std::sync::Arc;

use propcloud_service::ChatRequest;
use propcloud_storage::{queries, vector_to_pg};
use propcloud_testkit::TestDatabase;

use super::support::{self, FakeEmbedding, Fakes};

#[tokio::test]
#[ignore = "Requires external Postgres with pgvector. Set PROPCLOUD_PG_DSN to run."]
async fn keyword_fallback_ranks_embedded_listings_when_vector_match_fails() {
	let Some(base_dsn) = propcloud_testkit::env_dsn() else {
		eprintln!(
			"Skipping keyword_fallback_ranks_embedded_listings_when_vector_match_fails; set \
			 PROPCLOUD_PG_DSN to run."
		);

		return;
	};
	let test_db = TestDatabase::new(&base_dsn).await.expect("Failed to create test database.");
	let db = super::bootstrap(&test_db).await;
	let embedded = [
		("10 Ocean Dr", "Studio near the beach"),
		("5 Grove Isle", "Condo with pool access"),
		("22 Main Hwy, Coconut Grove", "Villa with private pool"),
	];

	for (address, description) in embedded {
		let id = super::seed_listing(&db, address, description).await;

		queries::set_property_embedding(&db, id, &vector_to_pg(&[1.0, 0.0, 0.0, 0.0]))
			.await
			.expect("Failed to store embedding.");
	}

	super::seed_listing(&db, "3 Coconut Grove Villa", "Pool villa without an embedding").await;

	let mut fakes = Fakes::new();

	// A query vector of the wrong width cannot be matched, so retrieval falls back to keywords.
	fakes.embedding = Arc::new(FakeEmbedding::new(support::VECTOR_DIM as usize + 1));

	let service = fakes.service(support::test_config(test_db.dsn()), db);
	let res = service
		.chat(&fakes.user, ChatRequest {
			message: "Any pool villa in Coconut Grove?".to_string(),
			conversation_id: None,
		})
		.await
		.expect("Chat turn failed.");

	assert_eq!(res.message, "Property 1 is the strongest STR candidate.");
	assert_eq!(fakes.generation.count(), 1);

	let prompt = fakes.generation.last_prompt().expect("Generation must receive a prompt.");
	let first = prompt
		.find("**Property 1: 22 Main Hwy, Coconut Grove**")
		.expect("Best keyword match must come first.");
	let second =
		prompt.find("**Property 2: 5 Grove Isle**").expect("Partial match must come second.");

	assert!(first < second);
	assert!(prompt.contains("**Property 3: 10 Ocean Dr**"));
	assert!(!prompt.contains("3 Coconut Grove Villa"));

	test_db.cleanup().await.expect("Failed to cleanup test database.");
}
