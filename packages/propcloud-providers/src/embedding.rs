use serde_json::Value;

use crate::{Error, Result};

const PROVIDER: &str = "embedding";
const PROBE_TEXT: &str = "test embedding generation";

/// Outcome of a single probe request against the embedding endpoint.
#[derive(Debug, Clone, PartialEq, serde::Serialize)]
pub struct ProbeReport {
	pub ok: bool,
	pub dimensions: Option<usize>,
	#[serde(skip_serializing_if = "Option::is_none")]
	pub error: Option<String>,
	#[serde(skip_serializing_if = "Option::is_none")]
	pub details: Option<Value>,
}

pub async fn embed(
	cfg: &propcloud_config::EmbeddingProviderConfig,
	text: &str,
) -> Result<Vec<f32>> {
	let client = crate::http_client(cfg.timeout_ms)?;
	let url = format!("{}{}", cfg.api_base, cfg.path);
	let body = serde_json::json!({
		"inputs": text,
		"options": { "wait_for_model": cfg.wait_for_model },
	});
	let res = client
		.post(url)
		.headers(crate::auth_headers(&cfg.api_key, &cfg.default_headers)?)
		.json(&body)
		.send()
		.await?;
	let json: Value = crate::check_status(PROVIDER, res).await?.json().await?;

	parse_embedding_response(&json)
}

/// Checks that the endpoint answers with a usable vector. Never fails; problems are reported in
/// the returned [`ProbeReport`].
pub async fn probe(cfg: &propcloud_config::EmbeddingProviderConfig) -> ProbeReport {
	match embed(cfg, PROBE_TEXT).await {
		Ok(vec) => {
			tracing::info!(dimensions = vec.len(), "Embedding provider probe succeeded.");

			ProbeReport { ok: true, dimensions: Some(vec.len()), error: None, details: None }
		},
		Err(err) => {
			let details = match &err {
				Error::Status { status, body, .. } => Some(serde_json::json!({
					"status": status,
					"body": serde_json::from_str::<Value>(body)
						.unwrap_or_else(|_| Value::String(body.clone())),
				})),
				_ => None,
			};
			let error = crate::sanitize_error_text(&err.to_string());

			tracing::warn!(error = %error, "Embedding provider probe failed.");

			ProbeReport { ok: false, dimensions: None, error: Some(error), details }
		},
	}
}

/// Accepts a pooled vector, or token-level rows that are mean-pooled into one vector.
pub fn parse_embedding_response(json: &Value) -> Result<Vec<f32>> {
	let rows = json.as_array().ok_or_else(|| invalid("Embedding response is not an array."))?;

	if rows.is_empty() {
		return Err(invalid("Embedding response is empty."));
	}
	if rows.iter().all(Value::is_number) {
		return to_vector(rows);
	}
	// Batched responses wrap the per-input output in one more array.
	if rows.len() == 1
		&& let Some(inner) = rows[0].as_array()
		&& inner.iter().all(Value::is_array)
	{
		return parse_embedding_response(&rows[0]);
	}

	let mut vectors = Vec::with_capacity(rows.len());

	for row in rows {
		let row = row.as_array().ok_or_else(|| invalid("Embedding rows must be arrays."))?;

		vectors.push(to_vector(row)?);
	}

	mean_pool(&vectors)
}

fn to_vector(values: &[Value]) -> Result<Vec<f32>> {
	if values.is_empty() {
		return Err(invalid("Embedding vector is empty."));
	}

	let mut vec = Vec::with_capacity(values.len());

	for value in values {
		let number = value.as_f64().ok_or_else(|| invalid("Embedding value must be numeric."))?;

		vec.push(number as f32);
	}

	Ok(vec)
}

fn mean_pool(rows: &[Vec<f32>]) -> Result<Vec<f32>> {
	let dim = rows.first().map(Vec::len).ok_or_else(|| invalid("Embedding response is empty."))?;

	if rows.iter().any(|row| row.len() != dim) {
		return Err(invalid("Embedding rows have mismatched dimensions."));
	}

	let mut out = vec![0.0_f32; dim];

	for row in rows {
		for (idx, value) in row.iter().enumerate() {
			out[idx] += value;
		}
	}
	for value in &mut out {
		*value /= rows.len() as f32;
	}

	Ok(out)
}

fn invalid(message: &str) -> Error {
	Error::InvalidResponse { message: message.to_string() }
}
