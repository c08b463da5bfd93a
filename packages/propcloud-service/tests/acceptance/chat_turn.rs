use propcloud_domain::prompt::NO_CONTEXT_REPLY;
use propcloud_service::{
	ChatRequest, CreateConversationRequest, Error, RenameConversationRequest,
};
use propcloud_storage::{queries, vector_to_pg};
use propcloud_testkit::TestDatabase;

use super::support::{self, Fakes};

#[tokio::test]
#[ignore = "Requires external Postgres with pgvector. Set PROPCLOUD_PG_DSN to run."]
async fn first_turn_creates_and_titles_the_conversation() {
	let Some(base_dsn) = propcloud_testkit::env_dsn() else {
		eprintln!(
			"Skipping first_turn_creates_and_titles_the_conversation; set PROPCLOUD_PG_DSN to run."
		);

		return;
	};
	let test_db = TestDatabase::new(&base_dsn).await.expect("Failed to create test database.");
	let db = super::bootstrap(&test_db).await;
	let listing =
		super::seed_listing(&db, "1 Brickell Key", "Bay-view condo near Mary Brickell Village")
			.await;

	queries::set_property_embedding(&db, listing, &vector_to_pg(&[1.0, 0.0, 0.0, 0.0]))
		.await
		.expect("Failed to store embedding.");

	let fakes = Fakes::new();
	let service = fakes.service(support::test_config(test_db.dsn()), db);
	let question = "Which listing would make the best short-term rental near Brickell for a family?";
	let first = service
		.chat(&fakes.user, ChatRequest { message: question.to_string(), conversation_id: None })
		.await
		.expect("Chat turn failed.");

	assert_eq!(first.message, "Property 1 is the strongest STR candidate.");
	assert_eq!(first.title, format!("{}...", question.chars().take(50).collect::<String>()));
	assert_eq!(fakes.generation.count(), 1);
	assert!(
		fakes
			.generation
			.last_prompt()
			.is_some_and(|prompt| prompt.contains("**Property 1: 1 Brickell Key**"))
	);

	let second = service
		.chat(&fakes.user, ChatRequest {
			message: "And the cap rate?".to_string(),
			conversation_id: Some(first.conversation_id),
		})
		.await
		.expect("Follow-up turn failed.");

	assert_eq!(second.conversation_id, first.conversation_id);
	assert_eq!(second.title, first.title);

	let history = service
		.list_messages(&fakes.user, first.conversation_id)
		.await
		.expect("Failed to list messages.");

	assert_eq!(
		history.messages.iter().map(|message| message.role.as_str()).collect::<Vec<_>>(),
		vec!["user", "assistant", "user", "assistant"]
	);

	let listed = service.list_conversations(&fakes.user).await.expect("Failed to list.");

	assert_eq!(listed.conversations.len(), 1);

	test_db.cleanup().await.expect("Failed to cleanup test database.");
}

#[tokio::test]
#[ignore = "Requires external Postgres with pgvector. Set PROPCLOUD_PG_DSN to run."]
async fn first_turn_retitles_a_custom_named_conversation() {
	let Some(base_dsn) = propcloud_testkit::env_dsn() else {
		eprintln!(
			"Skipping first_turn_retitles_a_custom_named_conversation; set PROPCLOUD_PG_DSN to run."
		);

		return;
	};
	let test_db = TestDatabase::new(&base_dsn).await.expect("Failed to create test database.");
	let db = super::bootstrap(&test_db).await;
	let fakes = Fakes::new();
	let service = fakes.service(support::test_config(test_db.dsn()), db);
	let created = service
		.create_conversation(&fakes.user, CreateConversationRequest {
			title: Some("Brickell research".to_string()),
		})
		.await
		.expect("Failed to create conversation.");

	assert_eq!(created.title, "Brickell research");

	let first = service
		.chat(&fakes.user, ChatRequest {
			message: "Best two-bed in Edgewater?".to_string(),
			conversation_id: Some(created.id),
		})
		.await
		.expect("Chat turn failed.");

	assert_eq!(first.title, "Best two-bed in Edgewater?");

	let second = service
		.chat(&fakes.user, ChatRequest {
			message: "What about parking?".to_string(),
			conversation_id: Some(created.id),
		})
		.await
		.expect("Follow-up turn failed.");

	assert_eq!(second.title, "Best two-bed in Edgewater?");

	let listed = service.list_conversations(&fakes.user).await.expect("Failed to list.");

	assert_eq!(listed.conversations[0].title, "Best two-bed in Edgewater?");

	test_db.cleanup().await.expect("Failed to cleanup test database.");
}

#[tokio::test]
#[ignore = "Requires external Postgres with pgvector. Set PROPCLOUD_PG_DSN to run."]
async fn empty_catalog_replies_without_the_model() {
	let Some(base_dsn) = propcloud_testkit::env_dsn() else {
		eprintln!("Skipping empty_catalog_replies_without_the_model; set PROPCLOUD_PG_DSN to run.");

		return;
	};
	let test_db = TestDatabase::new(&base_dsn).await.expect("Failed to create test database.");
	let db = super::bootstrap(&test_db).await;
	let fakes = Fakes::new();
	let service = fakes.service(support::test_config(test_db.dsn()), db);
	let res = service
		.chat(&fakes.user, ChatRequest {
			message: "Anything in Wynwood?".to_string(),
			conversation_id: None,
		})
		.await
		.expect("Chat turn failed.");

	assert_eq!(res.message, NO_CONTEXT_REPLY);
	assert_eq!(res.title, "Anything in Wynwood?");
	assert_eq!(fakes.generation.count(), 0);

	test_db.cleanup().await.expect("Failed to cleanup test database.");
}

#[tokio::test]
#[ignore = "Requires external Postgres with pgvector. Set PROPCLOUD_PG_DSN to run."]
async fn conversations_of_other_users_are_not_found() {
	let Some(base_dsn) = propcloud_testkit::env_dsn() else {
		eprintln!(
			"Skipping conversations_of_other_users_are_not_found; set PROPCLOUD_PG_DSN to run."
		);

		return;
	};
	let test_db = TestDatabase::new(&base_dsn).await.expect("Failed to create test database.");
	let db = super::bootstrap(&test_db).await;
	let fakes = Fakes::new();
	let service = fakes.service(support::test_config(test_db.dsn()), db);
	let owned = service
		.create_conversation(&fakes.user, Default::default())
		.await
		.expect("Failed to create conversation.");
	let stranger = support::user();

	assert_eq!(owned.title, "New Conversation");

	let err = service
		.chat(&stranger, ChatRequest {
			message: "hello".to_string(),
			conversation_id: Some(owned.id),
		})
		.await
		.expect_err("Stranger must not write to the conversation.");

	assert!(matches!(err, Error::NotFound { .. }));

	let err = service
		.rename_conversation(&stranger, owned.id, RenameConversationRequest {
			title: "Mine".to_string(),
		})
		.await
		.expect_err("Stranger must not rename the conversation.");

	assert!(matches!(err, Error::NotFound { .. }));

	let err = service
		.delete_conversation(&stranger, owned.id)
		.await
		.expect_err("Stranger must not delete the conversation.");

	assert!(matches!(err, Error::NotFound { .. }));

	service.delete_conversation(&fakes.user, owned.id).await.expect("Owner delete failed.");

	let listed = service.list_conversations(&fakes.user).await.expect("List failed.");

	assert!(listed.conversations.is_empty());

	test_db.cleanup().await.expect("Failed to cleanup test database.");
}
