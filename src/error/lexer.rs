/// A lexical error at a byte offset in the input.
#[derive(thiserror::Error, Debug, PartialEq, Eq)]
#[error("index {index}: {kind}")]
pub struct LexError {
	/// The kind of lexical error.
	kind:  LexErrorKind,
	/// Byte offset of the invalid or missing character.
	index: usize,
}

impl LexError {
	pub fn new(kind: LexErrorKind, index: usize) -> Self { Self { kind, index } }

	/// Byte offset of the invalid or missing character.
	pub fn index(&self) -> usize { self.index }

	pub fn kind(&self) -> &LexErrorKind { &self.kind }
}

/// Types of lexical errors.
#[derive(Debug, PartialEq, Eq)]
pub enum LexErrorKind {
	/// The body of a character literal is missing or unlexable.
	InvalidCharacter,
	/// A character literal held more than one character.
	CharacterTooLong,
	/// A character literal reached end of input before its closing quote.
	UnterminatedCharacter,
	/// A backslash was followed by something other than `b n r t ' " \`.
	InvalidEscape,
	/// A string literal ran into a line break or the end of input.
	UnterminatedString,
}

impl std::fmt::Display for LexErrorKind {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		use LexErrorKind::*;
		match self {
			InvalidCharacter => write!(f, "invalid character literal"),
			CharacterTooLong => write!(f, "character literal holds more than one character"),
			UnterminatedCharacter => write!(f, "missing closing ' for character literal"),
			InvalidEscape => write!(f, "invalid escape sequence"),
			UnterminatedString => write!(f, "unterminated string"),
		}
	}
}
