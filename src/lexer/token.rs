/// A token produced by the lexer
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Token {
	pub kind:    TokenKind,
	/// The exact input text the token spans.
	pub literal: String,
	/// 0-based byte offset of the token's first character.
	pub index:   usize,
}

impl Token {
	pub fn new(kind: TokenKind, literal: impl Into<String>, index: usize) -> Self {
		Self { kind, literal: literal.into(), index }
	}
}

/// The kinds of Ember tokens.
///
/// Keywords are not their own kind: `LET`, `DEF` and friends lex as plain
/// identifiers, and the parser matches them by literal. That keeps the lexer
/// free of a reserved-word table and lets keyword-shaped names appear where
/// the grammar allows identifiers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenKind {
	/// Identifier or keyword, e.g. `total` or `LET`.
	Identifier,
	/// Integer literal, e.g. `123` or `-5`.
	Integer,
	/// Decimal literal, e.g. `123.45`.
	Decimal,
	/// Character literal, e.g. `'a'`.
	Character,
	/// String literal, e.g. `"hello"`.
	String,
	/// Operator or punctuation, e.g. `<=` or `;`.
	Operator,
}
