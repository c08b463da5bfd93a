use axum::{
	Json, Router,
	extract::{Path, State, rejection::JsonRejection},
	http::{
		HeaderMap, HeaderName, HeaderValue, Method, StatusCode,
		header::{AUTHORIZATION, CONTENT_TYPE},
	},
	response::{IntoResponse, Response},
	routing::{get, patch, post},
};
use serde::Serialize;
use tower_http::cors::{AllowOrigin, Any, CorsLayer};
use uuid::Uuid;

use crate::state::AppState;
use propcloud_service::{
	AuthUser, BackfillOutcome, ChatRequest, ChatResponse, ConversationItem, ConversationsResponse,
	CreateConversationRequest, Error as ServiceError, JoinStatus, JoinWaitlistRequest,
	JoinWaitlistResponse, MessagesResponse, RenameConversationRequest, WelcomeEmailRequest,
	WelcomeEmailResponse,
};

pub fn router(state: AppState) -> Router {
	let cors = cors_layer(&state.service.cfg.security.cors_allow_origins);

	Router::new()
		.route("/health", get(health))
		.route("/v1/waitlist", post(join_waitlist))
		.route("/v1/waitlist/welcome-email", post(send_welcome_email))
		.route("/v1/chat", post(chat))
		.route("/v1/conversations", get(list_conversations).post(create_conversation))
		.route("/v1/conversations/{id}", patch(rename_conversation).delete(delete_conversation))
		.route("/v1/conversations/{id}/messages", get(list_messages))
		.layer(cors)
		.with_state(state)
}

pub fn admin_router(state: AppState) -> Router {
	Router::new()
		.route("/v1/admin/embeddings/generate", post(generate_embeddings))
		.with_state(state)
}

fn cors_layer(origins: &[String]) -> CorsLayer {
	let layer = CorsLayer::new()
		.allow_methods([Method::GET, Method::POST, Method::PATCH, Method::DELETE, Method::OPTIONS])
		.allow_headers([
			AUTHORIZATION,
			CONTENT_TYPE,
			HeaderName::from_static("apikey"),
			HeaderName::from_static("x-client-info"),
		]);

	if origins.iter().any(|origin| origin == "*") {
		return layer.allow_origin(Any);
	}

	let allowed = origins
		.iter()
		.filter_map(|origin| match HeaderValue::from_str(origin) {
			Ok(value) => Some(value),
			Err(_) => {
				tracing::warn!(origin, "Ignoring CORS origin that is not a valid header value.");

				None
			},
		})
		.collect::<Vec<_>>();

	layer.allow_origin(AllowOrigin::list(allowed))
}

async fn health() -> StatusCode {
	StatusCode::OK
}

async fn join_waitlist(
	State(state): State<AppState>,
	payload: Result<Json<JoinWaitlistRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<JoinWaitlistResponse>), ApiError> {
	let Json(payload) = payload?;
	let response = state.service.join_waitlist(payload).await?;
	let status = match response.status {
		JoinStatus::Joined => StatusCode::CREATED,
		JoinStatus::AlreadySubscribed => StatusCode::OK,
	};

	Ok((status, Json(response)))
}

async fn send_welcome_email(
	State(state): State<AppState>,
	payload: Result<Json<WelcomeEmailRequest>, JsonRejection>,
) -> Result<Json<WelcomeEmailResponse>, ApiError> {
	let Json(payload) = payload?;
	let response = state.service.send_welcome_email(payload).await?;

	Ok(Json(response))
}

async fn chat(
	State(state): State<AppState>,
	headers: HeaderMap,
	payload: Result<Json<ChatRequest>, JsonRejection>,
) -> Result<Json<ChatResponse>, ApiError> {
	let user = current_user(&state, &headers).await?;
	let Json(payload) = payload?;
	let response = state.service.chat(&user, payload).await?;

	Ok(Json(response))
}

async fn list_conversations(
	State(state): State<AppState>,
	headers: HeaderMap,
) -> Result<Json<ConversationsResponse>, ApiError> {
	let user = current_user(&state, &headers).await?;
	let response = state.service.list_conversations(&user).await?;

	Ok(Json(response))
}

async fn create_conversation(
	State(state): State<AppState>,
	headers: HeaderMap,
	payload: Option<Json<CreateConversationRequest>>,
) -> Result<(StatusCode, Json<ConversationItem>), ApiError> {
	let user = current_user(&state, &headers).await?;
	let payload = payload.map(|Json(payload)| payload).unwrap_or_default();
	let response = state.service.create_conversation(&user, payload).await?;

	Ok((StatusCode::CREATED, Json(response)))
}

async fn list_messages(
	State(state): State<AppState>,
	headers: HeaderMap,
	Path(id): Path<String>,
) -> Result<Json<MessagesResponse>, ApiError> {
	let user = current_user(&state, &headers).await?;
	let response = state.service.list_messages(&user, parse_conversation_id(&id)?).await?;

	Ok(Json(response))
}

async fn rename_conversation(
	State(state): State<AppState>,
	headers: HeaderMap,
	Path(id): Path<String>,
	payload: Result<Json<RenameConversationRequest>, JsonRejection>,
) -> Result<Json<ConversationItem>, ApiError> {
	let user = current_user(&state, &headers).await?;
	let id = parse_conversation_id(&id)?;
	let Json(payload) = payload?;
	let response = state.service.rename_conversation(&user, id, payload).await?;

	Ok(Json(response))
}

async fn delete_conversation(
	State(state): State<AppState>,
	headers: HeaderMap,
	Path(id): Path<String>,
) -> Result<StatusCode, ApiError> {
	let user = current_user(&state, &headers).await?;

	state.service.delete_conversation(&user, parse_conversation_id(&id)?).await?;

	Ok(StatusCode::NO_CONTENT)
}

async fn generate_embeddings(
	State(state): State<AppState>,
	headers: HeaderMap,
) -> Result<Response, ApiError> {
	require_admin(&state, &headers)?;

	let response = match state.service.generate_embeddings().await? {
		BackfillOutcome::Completed(report) => (StatusCode::OK, Json(report)).into_response(),
		BackfillOutcome::ProbeFailed(failure) =>
			(StatusCode::BAD_REQUEST, Json(failure)).into_response(),
	};

	Ok(response)
}

async fn current_user(state: &AppState, headers: &HeaderMap) -> Result<AuthUser, ApiError> {
	let authorization = headers.get(AUTHORIZATION).and_then(|value| value.to_str().ok());

	Ok(state.service.authenticate(authorization).await?)
}

fn require_admin(state: &AppState, headers: &HeaderMap) -> Result<(), ApiError> {
	let Some(expected) = state.service.cfg.security.admin_auth_token.as_deref() else {
		return Ok(());
	};
	let provided = headers
		.get(AUTHORIZATION)
		.and_then(|value| value.to_str().ok())
		.and_then(propcloud_service::bearer_token);

	if provided.is_some_and(|token| tokens_match(token, expected)) {
		return Ok(());
	}

	Err(json_error(StatusCode::UNAUTHORIZED, "UNAUTHORIZED", "Invalid admin token.", None))
}

/// Compares in time independent of where the first differing byte is.
fn tokens_match(provided: &str, expected: &str) -> bool {
	let (provided, expected) = (provided.as_bytes(), expected.as_bytes());

	provided.len() == expected.len()
		&& provided.iter().zip(expected).fold(0_u8, |acc, (a, b)| acc | (a ^ b)) == 0
}

fn parse_conversation_id(raw: &str) -> Result<Uuid, ApiError> {
	Uuid::parse_str(raw).map_err(|_| {
		json_error(
			StatusCode::UNPROCESSABLE_ENTITY,
			"INVALID_REQUEST",
			"Conversation id must be a UUID.",
			Some(vec!["$.conversation_id".to_string()]),
		)
	})
}

#[derive(Serialize)]
struct ErrorBody {
	error_code: String,
	message: String,
	#[serde(skip_serializing_if = "Option::is_none")]
	fields: Option<Vec<String>>,
}

#[derive(Debug)]
pub struct ApiError {
	status: StatusCode,
	error_code: String,
	message: String,
	fields: Option<Vec<String>>,
}
impl ApiError {
	fn new(
		status: StatusCode,
		error_code: impl Into<String>,
		message: impl Into<String>,
		fields: Option<Vec<String>>,
	) -> Self {
		Self { status, error_code: error_code.into(), message: message.into(), fields }
	}
}

impl From<ServiceError> for ApiError {
	fn from(err: ServiceError) -> Self {
		match err {
			ServiceError::InvalidRequest { message, field } => json_error(
				StatusCode::UNPROCESSABLE_ENTITY,
				"INVALID_REQUEST",
				message,
				field.map(|field| vec![field]),
			),
			ServiceError::Unauthorized { message } =>
				json_error(StatusCode::UNAUTHORIZED, "UNAUTHORIZED", message, None),
			ServiceError::NotFound { message } =>
				json_error(StatusCode::NOT_FOUND, "NOT_FOUND", message, None),
			ServiceError::Conflict { message } =>
				json_error(StatusCode::CONFLICT, "CONFLICT", message, None),
			ServiceError::Provider { message } => {
				tracing::error!(error = %message, "Provider call failed.");

				json_error(StatusCode::BAD_GATEWAY, "PROVIDER_ERROR", message, None)
			},
			ServiceError::Storage { message } => {
				tracing::error!(error = %message, "Storage call failed.");

				json_error(
					StatusCode::INTERNAL_SERVER_ERROR,
					"STORAGE_ERROR",
					"Internal error.".to_string(),
					None,
				)
			},
		}
	}
}

impl From<JsonRejection> for ApiError {
	fn from(err: JsonRejection) -> Self {
		json_error(StatusCode::UNPROCESSABLE_ENTITY, "INVALID_REQUEST", err.body_text(), None)
	}
}

impl IntoResponse for ApiError {
	fn into_response(self) -> Response {
		let body =
			ErrorBody { error_code: self.error_code, message: self.message, fields: self.fields };

		(self.status, Json(body)).into_response()
	}
}

pub fn json_error(
	status: StatusCode,
	code: &str,
	message: impl Into<String>,
	fields: Option<Vec<String>>,
) -> ApiError {
	ApiError::new(status, code, message, fields)
}
