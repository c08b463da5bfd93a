use std::sync::Arc;

use propcloud_service::{JoinStatus, JoinWaitlistRequest, WelcomeEmailStatus};
use propcloud_storage::queries;
use propcloud_testkit::TestDatabase;

use super::support::{self, FakeEmail, Fakes};

fn request(email: &str, referral_source: Option<&str>) -> JoinWaitlistRequest {
	JoinWaitlistRequest {
		email: email.to_string(),
		referral_source: referral_source.map(str::to_string),
	}
}

#[tokio::test]
#[ignore = "Requires external Postgres with pgvector. Set PROPCLOUD_PG_DSN to run."]
async fn duplicate_signup_is_already_subscribed() {
	let Some(base_dsn) = propcloud_testkit::env_dsn() else {
		eprintln!("Skipping duplicate_signup_is_already_subscribed; set PROPCLOUD_PG_DSN to run.");

		return;
	};
	let test_db = TestDatabase::new(&base_dsn).await.expect("Failed to create test database.");
	let db = super::bootstrap(&test_db).await;
	let fakes = Fakes::new();
	let service = fakes.service(support::test_config(test_db.dsn()), db);
	let first = service
		.join_waitlist(request("Investor@Example.com", None))
		.await
		.expect("Signup failed.");

	assert_eq!(first.status, JoinStatus::Joined);
	assert_eq!(first.welcome_email, WelcomeEmailStatus::Sent);
	assert_eq!(fakes.email.recipients(), vec!["investor@example.com".to_string()]);

	let entry = queries::find_waitlist_email(&service.db, "investor@example.com")
		.await
		.expect("Lookup failed.")
		.expect("Signup was not stored.");

	assert_eq!(entry.referral_source, "direct");

	let second = service
		.join_waitlist(request("investor@example.com", Some("twitter")))
		.await
		.expect("Repeat signup failed.");

	assert_eq!(second.status, JoinStatus::AlreadySubscribed);
	assert_eq!(second.welcome_email, WelcomeEmailStatus::Skipped);
	assert_eq!(queries::count_waitlist(&service.db).await.expect("Count failed."), 1);
	assert_eq!(fakes.email.recipients().len(), 1);

	test_db.cleanup().await.expect("Failed to cleanup test database.");
}

#[tokio::test]
#[ignore = "Requires external Postgres with pgvector. Set PROPCLOUD_PG_DSN to run."]
async fn failed_welcome_email_keeps_the_signup() {
	let Some(base_dsn) = propcloud_testkit::env_dsn() else {
		eprintln!("Skipping failed_welcome_email_keeps_the_signup; set PROPCLOUD_PG_DSN to run.");

		return;
	};
	let test_db = TestDatabase::new(&base_dsn).await.expect("Failed to create test database.");
	let db = super::bootstrap(&test_db).await;
	let fakes =
		Fakes { email: Arc::new(FakeEmail { fail: true, ..Default::default() }), ..Fakes::new() };
	let service = fakes.service(support::test_config(test_db.dsn()), db);
	let res = service
		.join_waitlist(request("new@investor.com", Some("  newsletter ")))
		.await
		.expect("Signup must not fail on email errors.");

	assert_eq!(res.status, JoinStatus::Joined);
	assert_eq!(res.welcome_email, WelcomeEmailStatus::Failed);

	let entry = queries::find_waitlist_email(&service.db, "new@investor.com")
		.await
		.expect("Lookup failed.")
		.expect("Signup was not stored.");

	assert_eq!(entry.referral_source, "newsletter");

	test_db.cleanup().await.expect("Failed to cleanup test database.");
}
