/// A syntax error at a byte offset in the input.
///
/// The index is the offending token's first byte, or the position just past
/// the input when the token stream ran out.
#[derive(thiserror::Error, Debug, PartialEq, Eq)]
#[error("index {index}: {kind}")]
pub struct ParseError {
	/// The kind of syntax error.
	kind:  ParseErrorKind,
	/// Byte offset of the offending token.
	index: usize,
}

impl ParseError {
	pub fn new(kind: ParseErrorKind, index: usize) -> Self { Self { kind, index } }

	/// Byte offset of the offending token, or just past the input at EOF.
	pub fn index(&self) -> usize { self.index }

	pub fn kind(&self) -> &ParseErrorKind { &self.kind }
}

/// Types of syntax errors.
#[derive(Debug, PartialEq, Eq)]
pub enum ParseErrorKind {
	/// A specific token was required and something else was found.
	Expected(String),
	/// No expression starts at the current token.
	InvalidExpression,
	/// A literal token failed conversion; the lexer makes this unreachable.
	InvalidLiteral,
}

impl std::fmt::Display for ParseErrorKind {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		use ParseErrorKind::*;
		match self {
			Expected(what) => write!(f, "expected {what}"),
			InvalidExpression => write!(f, "invalid expression"),
			InvalidLiteral => write!(f, "invalid literal"),
		}
	}
}
