pub mod chat;
pub mod conversation;
pub mod email;
pub mod fallback;
pub mod format;
pub mod prompt;
pub mod property;
