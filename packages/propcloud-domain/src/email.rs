use regex::Regex;

const EMAIL_PATTERN: &str = r"^[^\s@]+@[^\s@]+\.[^\s@]+$";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RejectCode {
	RejectEmpty,
	RejectMalformed,
}

/// A trimmed, lower-cased address that passed [`validate`].
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Email(String);
impl Email {
	pub fn as_str(&self) -> &str {
		&self.0
	}
}
impl std::fmt::Display for Email {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		f.write_str(&self.0)
	}
}

pub fn validate(raw: &str) -> Result<Email, RejectCode> {
	let trimmed = raw.trim();

	if trimmed.is_empty() {
		return Err(RejectCode::RejectEmpty);
	}
	if !is_well_formed(trimmed) {
		return Err(RejectCode::RejectMalformed);
	}

	Ok(Email(trimmed.to_lowercase()))
}

fn is_well_formed(text: &str) -> bool {
	Regex::new(EMAIL_PATTERN).map(|re| re.is_match(text)).unwrap_or(false)
}
