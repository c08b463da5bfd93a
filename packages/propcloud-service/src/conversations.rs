use serde::{Deserialize, Serialize};
use time::OffsetDateTime;
use uuid::Uuid;

use propcloud_domain::conversation::DEFAULT_TITLE;
use propcloud_storage::{
	models::{Conversation, Message},
	queries,
};

use crate::{AuthUser, Error, PropcloudService, Result};

const MAX_TITLE_CHARS: usize = 200;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConversationItem {
	pub id: Uuid,
	pub title: String,
	#[serde(with = "time::serde::rfc3339")]
	pub created_at: OffsetDateTime,
	#[serde(with = "time::serde::rfc3339")]
	pub updated_at: OffsetDateTime,
}
impl From<Conversation> for ConversationItem {
	fn from(row: Conversation) -> Self {
		Self { id: row.id, title: row.title, created_at: row.created_at, updated_at: row.updated_at }
	}
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConversationsResponse {
	pub conversations: Vec<ConversationItem>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CreateConversationRequest {
	#[serde(default)]
	pub title: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RenameConversationRequest {
	pub title: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MessageItem {
	pub id: Uuid,
	pub role: String,
	pub content: String,
	#[serde(with = "time::serde::rfc3339")]
	pub created_at: OffsetDateTime,
}
impl From<Message> for MessageItem {
	fn from(row: Message) -> Self {
		Self { id: row.id, role: row.role, content: row.content, created_at: row.created_at }
	}
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MessagesResponse {
	pub conversation_id: Uuid,
	pub messages: Vec<MessageItem>,
}

impl PropcloudService {
	/// Conversations of `user`, most recently active first.
	pub async fn list_conversations(&self, user: &AuthUser) -> Result<ConversationsResponse> {
		let rows = queries::list_conversations(&self.db, user.id).await?;

		Ok(ConversationsResponse { conversations: rows.into_iter().map(Into::into).collect() })
	}

	pub async fn create_conversation(
		&self,
		user: &AuthUser,
		req: CreateConversationRequest,
	) -> Result<ConversationItem> {
		let title = match req.title.as_deref().map(str::trim).filter(|title| !title.is_empty()) {
			Some(title) => validate_title(title)?,
			None => DEFAULT_TITLE.to_string(),
		};
		let row = queries::insert_conversation(&self.db, user.id, &title).await?;

		tracing::info!(conversation_id = %row.id, "Conversation created.");

		Ok(row.into())
	}

	pub async fn list_messages(
		&self,
		user: &AuthUser,
		conversation_id: Uuid,
	) -> Result<MessagesResponse> {
		if queries::get_conversation(&self.db, user.id, conversation_id).await?.is_none() {
			return Err(conversation_not_found());
		}

		let rows = queries::list_messages(&self.db, conversation_id).await?;

		Ok(MessagesResponse { conversation_id, messages: rows.into_iter().map(Into::into).collect() })
	}

	pub async fn rename_conversation(
		&self,
		user: &AuthUser,
		conversation_id: Uuid,
		req: RenameConversationRequest,
	) -> Result<ConversationItem> {
		let title = validate_title(req.title.trim())?;
		let row = queries::rename_conversation(&self.db, user.id, conversation_id, &title)
			.await
			.map_err(|err| match err {
				propcloud_storage::Error::NotFound(_) => conversation_not_found(),
				other => other.into(),
			})?;

		Ok(row.into())
	}

	/// Deletes the conversation together with its messages.
	pub async fn delete_conversation(&self, user: &AuthUser, conversation_id: Uuid) -> Result<()> {
		queries::delete_conversation(&self.db, user.id, conversation_id).await.map_err(|err| {
			match err {
				propcloud_storage::Error::NotFound(_) => conversation_not_found(),
				other => other.into(),
			}
		})?;

		tracing::info!(conversation_id = %conversation_id, "Conversation deleted.");

		Ok(())
	}
}

fn validate_title(title: &str) -> Result<String> {
	if title.is_empty() {
		return Err(Error::invalid_field("$.title", "Title must not be empty."));
	}
	if title.chars().count() > MAX_TITLE_CHARS {
		return Err(Error::invalid_field(
			"$.title",
			format!("Title must be at most {MAX_TITLE_CHARS} characters."),
		));
	}

	Ok(title.to_string())
}

fn conversation_not_found() -> Error {
	Error::NotFound { message: "Conversation not found.".to_string() }
}
