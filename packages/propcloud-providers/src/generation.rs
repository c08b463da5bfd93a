use serde_json::Value;

use crate::{Error, Result};

const PROVIDER: &str = "generation";
const SAFETY_CATEGORIES: [&str; 4] = [
	"HARM_CATEGORY_HARASSMENT",
	"HARM_CATEGORY_HATE_SPEECH",
	"HARM_CATEGORY_SEXUALLY_EXPLICIT",
	"HARM_CATEGORY_DANGEROUS_CONTENT",
];

pub async fn generate(
	cfg: &propcloud_config::GenerationProviderConfig,
	prompt: &str,
) -> Result<String> {
	let client = crate::http_client(cfg.timeout_ms)?;
	let url = format!("{}{}", cfg.api_base, cfg.path.replace("{model}", &cfg.model));
	let res = client
		.post(url)
		.query(&[("key", cfg.api_key.as_str())])
		.json(&request_body(cfg, prompt))
		.send()
		.await?;
	let json: Value = crate::check_status(PROVIDER, res).await?.json().await?;

	parse_generation_response(&json)
}

pub fn request_body(cfg: &propcloud_config::GenerationProviderConfig, prompt: &str) -> Value {
	let safety_settings: Vec<Value> = SAFETY_CATEGORIES
		.iter()
		.map(|category| {
			serde_json::json!({ "category": category, "threshold": cfg.safety_threshold })
		})
		.collect();

	serde_json::json!({
		"contents": [{ "parts": [{ "text": prompt }] }],
		"generationConfig": {
			"temperature": cfg.temperature,
			"topK": cfg.top_k,
			"topP": cfg.top_p,
			"maxOutputTokens": cfg.max_output_tokens,
		},
		"safetySettings": safety_settings,
	})
}

/// Joins the text parts of the first candidate.
pub fn parse_generation_response(json: &Value) -> Result<String> {
	let Some(candidate) =
		json.get("candidates").and_then(Value::as_array).and_then(|candidates| candidates.first())
	else {
		let message = match json
			.get("promptFeedback")
			.and_then(|feedback| feedback.get("blockReason"))
			.and_then(Value::as_str)
		{
			Some(reason) => format!("No response generated (blocked: {reason})."),
			None => "No response generated.".to_string(),
		};

		return Err(Error::InvalidResponse { message });
	};
	let text = candidate
		.get("content")
		.and_then(|content| content.get("parts"))
		.and_then(Value::as_array)
		.map(|parts| {
			parts.iter().filter_map(|part| part.get("text").and_then(Value::as_str)).collect::<String>()
		})
		.unwrap_or_default();

	if text.trim().is_empty() {
		return Err(Error::InvalidResponse {
			message: "Empty response from generation provider.".to_string(),
		});
	}

	Ok(text)
}
