use uuid::Uuid;

use crate::{
	Error, Result,
	db::Db,
	models::{Conversation, MatchedProperty, Message, NewProperty, PropertyRow, WaitlistEntry},
};

const UNIQUE_VIOLATION: &str = "23505";

const PROPERTY_COLUMNS: &str = "id, address, listing_price, beds, baths, sqft, description, \
	sales_history, tax_history, permit_history, market_comps, listing_url, image_url, created_at";

pub fn is_unique_violation(err: &sqlx::Error) -> bool {
	err.as_database_error()
		.and_then(|db_err| db_err.code())
		.is_some_and(|code| code == UNIQUE_VIOLATION)
}

pub async fn find_waitlist_email(db: &Db, email: &str) -> Result<Option<WaitlistEntry>> {
	let entry = sqlx::query_as::<_, WaitlistEntry>(
		"SELECT id, email, referral_source, created_at FROM waitlist WHERE email = $1",
	)
	.bind(email)
	.fetch_optional(&db.pool)
	.await?;

	Ok(entry)
}

/// Inserts a signup. A concurrent insert of the same email surfaces as [`Error::Conflict`].
pub async fn insert_waitlist_entry(
	db: &Db,
	email: &str,
	referral_source: &str,
) -> Result<WaitlistEntry> {
	let res = sqlx::query_as::<_, WaitlistEntry>(
		"\
INSERT INTO waitlist (id, email, referral_source)
VALUES ($1, $2, $3)
RETURNING id, email, referral_source, created_at",
	)
	.bind(Uuid::new_v4())
	.bind(email)
	.bind(referral_source)
	.fetch_one(&db.pool)
	.await;

	match res {
		Ok(entry) => Ok(entry),
		Err(err) if is_unique_violation(&err) =>
			Err(Error::Conflict(format!("waitlist email already exists; email={email}"))),
		Err(err) => Err(err.into()),
	}
}

pub async fn count_waitlist(db: &Db) -> Result<i64> {
	let count = sqlx::query_scalar("SELECT count(*) FROM waitlist").fetch_one(&db.pool).await?;

	Ok(count)
}

pub async fn list_conversations(db: &Db, user_id: Uuid) -> Result<Vec<Conversation>> {
	let rows = sqlx::query_as::<_, Conversation>(
		"\
SELECT id, user_id, title, created_at, updated_at
FROM conversations
WHERE user_id = $1
ORDER BY updated_at DESC, created_at DESC",
	)
	.bind(user_id)
	.fetch_all(&db.pool)
	.await?;

	Ok(rows)
}

pub async fn insert_conversation(db: &Db, user_id: Uuid, title: &str) -> Result<Conversation> {
	let row = sqlx::query_as::<_, Conversation>(
		"\
INSERT INTO conversations (id, user_id, title)
VALUES ($1, $2, $3)
RETURNING id, user_id, title, created_at, updated_at",
	)
	.bind(Uuid::new_v4())
	.bind(user_id)
	.bind(title)
	.fetch_one(&db.pool)
	.await?;

	Ok(row)
}

/// Loads a conversation owned by `user_id`. Conversations of other users are reported as missing.
pub async fn get_conversation(db: &Db, user_id: Uuid, id: Uuid) -> Result<Option<Conversation>> {
	let row = sqlx::query_as::<_, Conversation>(
		"\
SELECT id, user_id, title, created_at, updated_at
FROM conversations
WHERE id = $1 AND user_id = $2",
	)
	.bind(id)
	.bind(user_id)
	.fetch_optional(&db.pool)
	.await?;

	Ok(row)
}

pub async fn rename_conversation(
	db: &Db,
	user_id: Uuid,
	id: Uuid,
	title: &str,
) -> Result<Conversation> {
	sqlx::query_as::<_, Conversation>(
		"\
UPDATE conversations
SET title = $1, updated_at = now()
WHERE id = $2 AND user_id = $3
RETURNING id, user_id, title, created_at, updated_at",
	)
	.bind(title)
	.bind(id)
	.bind(user_id)
	.fetch_optional(&db.pool)
	.await?
	.ok_or_else(|| Error::NotFound(format!("conversation not found; conversation_id={id}")))
}

pub async fn touch_conversation(db: &Db, id: Uuid) -> Result<()> {
	sqlx::query("UPDATE conversations SET updated_at = now() WHERE id = $1")
		.bind(id)
		.execute(&db.pool)
		.await?;

	Ok(())
}

/// Deletes a conversation and, through the foreign key cascade, its messages.
pub async fn delete_conversation(db: &Db, user_id: Uuid, id: Uuid) -> Result<()> {
	let res = sqlx::query("DELETE FROM conversations WHERE id = $1 AND user_id = $2")
		.bind(id)
		.bind(user_id)
		.execute(&db.pool)
		.await?;

	if res.rows_affected() == 0 {
		return Err(Error::NotFound(format!("conversation not found; conversation_id={id}")));
	}

	Ok(())
}

pub async fn list_messages(db: &Db, conversation_id: Uuid) -> Result<Vec<Message>> {
	let rows = sqlx::query_as::<_, Message>(
		"\
SELECT id, conversation_id, role, content, created_at
FROM messages
WHERE conversation_id = $1
ORDER BY created_at ASC, id ASC",
	)
	.bind(conversation_id)
	.fetch_all(&db.pool)
	.await?;

	Ok(rows)
}

pub async fn insert_message(
	db: &Db,
	conversation_id: Uuid,
	role: &str,
	content: &str,
) -> Result<Message> {
	let row = sqlx::query_as::<_, Message>(
		"\
INSERT INTO messages (id, conversation_id, role, content, created_at)
VALUES ($1, $2, $3, $4, clock_timestamp())
RETURNING id, conversation_id, role, content, created_at",
	)
	.bind(Uuid::new_v4())
	.bind(conversation_id)
	.bind(role)
	.bind(content)
	.fetch_one(&db.pool)
	.await?;

	Ok(row)
}

pub async fn count_messages(db: &Db, conversation_id: Uuid) -> Result<i64> {
	let count = sqlx::query_scalar("SELECT count(*) FROM messages WHERE conversation_id = $1")
		.bind(conversation_id)
		.fetch_one(&db.pool)
		.await?;

	Ok(count)
}

/// Nearest listings by cosine similarity, most similar first.
pub async fn match_properties(
	db: &Db,
	query_vec: &str,
	match_threshold: f64,
	match_count: i32,
) -> Result<Vec<MatchedProperty>> {
	let rows = sqlx::query_as::<_, MatchedProperty>(
		"SELECT * FROM match_properties($1::text::vector, $2, $3)",
	)
	.bind(query_vec)
	.bind(match_threshold)
	.bind(match_count)
	.fetch_all(&db.pool)
	.await?;

	Ok(rows)
}

pub async fn properties_with_embeddings(db: &Db, limit: i64) -> Result<Vec<PropertyRow>> {
	let sql = format!(
		"\
SELECT {PROPERTY_COLUMNS}
FROM properties
WHERE embedding IS NOT NULL
ORDER BY created_at ASC, id ASC
LIMIT $1"
	);
	let rows = sqlx::query_as::<_, PropertyRow>(&sql).bind(limit).fetch_all(&db.pool).await?;

	Ok(rows)
}

pub async fn properties_missing_embeddings(db: &Db) -> Result<Vec<PropertyRow>> {
	let sql = format!(
		"\
SELECT {PROPERTY_COLUMNS}
FROM properties
WHERE embedding IS NULL
ORDER BY created_at ASC, id ASC"
	);
	let rows = sqlx::query_as::<_, PropertyRow>(&sql).fetch_all(&db.pool).await?;

	Ok(rows)
}

pub async fn set_property_embedding(db: &Db, id: Uuid, vec_text: &str) -> Result<()> {
	let res = sqlx::query("UPDATE properties SET embedding = $1::text::vector WHERE id = $2")
		.bind(vec_text)
		.bind(id)
		.execute(&db.pool)
		.await?;

	if res.rows_affected() == 0 {
		return Err(Error::NotFound(format!("property not found; property_id={id}")));
	}

	Ok(())
}

pub async fn insert_property(db: &Db, property: &NewProperty) -> Result<Uuid> {
	if property.address.trim().is_empty() {
		return Err(Error::InvalidArgument("property address must not be empty".to_string()));
	}

	let id = Uuid::new_v4();

	sqlx::query(
		"\
INSERT INTO properties (
	id,
	address,
	listing_price,
	beds,
	baths,
	sqft,
	description,
	sales_history,
	tax_history,
	permit_history,
	market_comps,
	listing_url,
	image_url
)
VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13)",
	)
	.bind(id)
	.bind(property.address.as_str())
	.bind(property.listing_price)
	.bind(property.beds)
	.bind(property.baths)
	.bind(property.sqft)
	.bind(property.description.as_deref())
	.bind(&property.sales_history)
	.bind(&property.tax_history)
	.bind(&property.permit_history)
	.bind(&property.market_comps)
	.bind(property.listing_url.as_deref())
	.bind(property.image_url.as_deref())
	.execute(&db.pool)
	.await?;

	Ok(id)
}
