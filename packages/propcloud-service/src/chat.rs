use serde::{Deserialize, Serialize};
use uuid::Uuid;

use propcloud_domain::{
	chat::{self, MAX_MESSAGE_CHARS, RejectCode},
	conversation::{self, DEFAULT_TITLE, Role},
	fallback,
	prompt::{self, NO_CONTEXT_REPLY},
	property::Property,
};
use propcloud_storage::{queries, vector_to_pg};

use crate::{AuthUser, Error, PropcloudService, Result};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatRequest {
	pub message: String,
	#[serde(default)]
	pub conversation_id: Option<Uuid>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatResponse {
	pub conversation_id: Uuid,
	pub message: String,
	pub title: String,
}

impl PropcloudService {
	/// One full chat turn: both messages are persisted and the reply is returned.
	pub async fn chat(&self, user: &AuthUser, req: ChatRequest) -> Result<ChatResponse> {
		let message = chat::validate_message(&req.message).map_err(|code| {
			let message = match code {
				RejectCode::RejectEmpty => "Message is required.".to_string(),
				RejectCode::RejectTooLong =>
					format!("Message must be at most {MAX_MESSAGE_CHARS} characters."),
			};

			Error::invalid_field("$.message", message)
		})?;
		let conversation = match req.conversation_id {
			Some(id) => queries::get_conversation(&self.db, user.id, id)
				.await?
				.ok_or_else(|| Error::NotFound { message: "Conversation not found.".to_string() })?,
			None => queries::insert_conversation(&self.db, user.id, DEFAULT_TITLE).await?,
		};
		let first_exchange = queries::count_messages(&self.db, conversation.id).await? == 0;

		queries::insert_message(&self.db, conversation.id, Role::User.as_str(), message).await?;

		let reply = self.answer(message).await?;

		queries::insert_message(&self.db, conversation.id, Role::Assistant.as_str(), &reply)
			.await?;

		let title = if first_exchange {
			let title = conversation::title_for(message);

			queries::rename_conversation(&self.db, user.id, conversation.id, &title).await?.title
		} else {
			queries::touch_conversation(&self.db, conversation.id).await?;

			conversation.title
		};

		tracing::info!(conversation_id = %conversation.id, first_exchange, "Chat turn completed.");

		Ok(ChatResponse { conversation_id: conversation.id, message: reply, title })
	}

	/// Answers `question` from the listings most similar to it.
	///
	/// The model is only called when at least one listing was retrieved.
	pub async fn answer(&self, question: &str) -> Result<String> {
		let vec = self
			.providers
			.embedding
			.embed(&self.cfg.providers.embedding, question)
			.await
			.map_err(|err| ai_failure(&err))?;
		let properties = self.retrieve(question, &vec).await;

		if properties.is_empty() {
			tracing::info!("No listings matched the question.");

			return Ok(NO_CONTEXT_REPLY.to_string());
		}

		let prompt = prompt::master_prompt(question, &properties);
		let reply = self
			.providers
			.generation
			.generate(&self.cfg.providers.generation, &prompt)
			.await
			.map_err(|err| ai_failure(&err))?;

		tracing::info!(context_count = properties.len(), "Generated grounded reply.");

		Ok(reply)
	}

	async fn retrieve(&self, question: &str, vec: &[f32]) -> Vec<Property> {
		let retrieval = &self.cfg.retrieval;
		let matched = if vec.len() == self.cfg.storage.vector_dim as usize {
			queries::match_properties(
				&self.db,
				&vector_to_pg(vec),
				f64::from(retrieval.match_threshold),
				i32::try_from(retrieval.match_count).unwrap_or(i32::MAX),
			)
			.await
			.map_err(|err| err.to_string())
		} else {
			Err(format!(
				"query embedding has {} dimensions, expected {}",
				vec.len(),
				self.cfg.storage.vector_dim
			))
		};

		match matched {
			Ok(rows) => {
				tracing::debug!(count = rows.len(), "Vector match returned listings.");

				return rows.into_iter().map(|row| Property::from(row.property)).collect();
			},
			Err(err) => tracing::warn!(error = %err, "Vector match failed; using keyword fallback."),
		}

		match queries::properties_with_embeddings(&self.db, i64::from(retrieval.fallback_pool)).await
		{
			Ok(rows) => fallback::rank(
				question,
				rows.into_iter().map(Property::from).collect(),
				retrieval.match_count as usize,
			),
			Err(err) => {
				tracing::warn!(error = %err, "Fallback listing query failed.");

				Vec::new()
			},
		}
	}
}

fn ai_failure(err: &propcloud_providers::Error) -> Error {
	Error::Provider {
		message: format!(
			"AI processing failed: {}",
			propcloud_providers::sanitize_error_text(&err.to_string())
		),
	}
}
