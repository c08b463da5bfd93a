pub const MAX_MESSAGE_CHARS: usize = 4_000;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RejectCode {
	RejectEmpty,
	RejectTooLong,
}

/// Returns the trimmed message when it can be sent to the assistant.
pub fn validate_message(raw: &str) -> Result<&str, RejectCode> {
	let trimmed = raw.trim();

	if trimmed.is_empty() {
		return Err(RejectCode::RejectEmpty);
	}
	if trimmed.chars().count() > MAX_MESSAGE_CHARS {
		return Err(RejectCode::RejectTooLong);
	}

	Ok(trimmed)
}
