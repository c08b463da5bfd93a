pub const DEFAULT_TITLE: &str = "New Conversation";

const TITLE_MAX_CHARS: usize = 50;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Role {
	User,
	Assistant,
}
impl Role {
	pub fn as_str(self) -> &'static str {
		match self {
			Self::User => "user",
			Self::Assistant => "assistant",
		}
	}
}

/// Title derived from the first message of a conversation.
pub fn title_for(first_message: &str) -> String {
	let trimmed = first_message.trim();

	if trimmed.chars().count() <= TITLE_MAX_CHARS {
		return trimmed.to_string();
	}

	let mut title: String = trimmed.chars().take(TITLE_MAX_CHARS).collect();

	title.push_str("...");

	title
}
