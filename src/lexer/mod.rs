//! The lexer turns raw source text into a flat sequence of [`Token`]s.
//!
//! It works through three pieces: [`Lexer::lex`], which repeatedly lexes the
//! next token while skipping whitespace; `lex_token`, which dispatches on one
//! character of lookahead without changing stream state; and [`CharStream`],
//! which owns the two cursors -- `index`, the position of the next unread
//! character, and `length`, the number of characters accumulated since the
//! last token boundary.
//!
//! Everything is driven by `peek`/`take` over single-character patterns: a
//! call with N patterns inspects (and on `take`, consumes) at most N
//! characters. When lexing fails the error carries the byte offset of the
//! invalid or missing character.

mod token;

pub use token::{Token, TokenKind};

use crate::error::lexer::{LexError, LexErrorKind};

/// A single-character pattern for [`Lexer::peek`] and [`Lexer::take`].
#[derive(Clone, Copy)]
enum Pattern {
	/// Exactly this character.
	Char(char),
	/// Any character except these.
	AnyExcept(&'static [char]),
	/// Any character the predicate accepts.
	Matching(fn(char) -> bool),
}

impl Pattern {
	fn matches(self, c: char) -> bool {
		match self {
			Pattern::Char(expected) => c == expected,
			Pattern::AnyExcept(rejected) => !rejected.contains(&c),
			Pattern::Matching(predicate) => predicate(c),
		}
	}
}

fn is_whitespace(c: char) -> bool { matches!(c, ' ' | '\u{8}' | '\n' | '\r' | '\t') }

fn is_not_whitespace(c: char) -> bool { !is_whitespace(c) }

fn is_digit(c: char) -> bool { c.is_ascii_digit() }

fn is_sign(c: char) -> bool { c == '+' || c == '-' }

fn is_identifier_start(c: char) -> bool { c.is_ascii_alphabetic() || c == '_' }

fn is_identifier_part(c: char) -> bool { c.is_ascii_alphanumeric() || c == '_' || c == '-' }

fn is_escape_follower(c: char) -> bool { matches!(c, 'b' | 'n' | 'r' | 't' | '\'' | '"' | '\\') }

fn is_comparison_start(c: char) -> bool { matches!(c, '<' | '>' | '!' | '=') }

const DIGIT: Pattern = Pattern::Matching(is_digit);

/// A lexer for Ember source text
pub struct Lexer<'a> {
	chars: CharStream<'a>,
}

impl<'a> Lexer<'a> {
	pub fn new(input: &'a str) -> Self { Self { chars: CharStream::new(input) } }

	/// Lexes the whole input, skipping whitespace between tokens.
	pub fn lex(mut self) -> Result<Vec<Token>, LexError> {
		let mut tokens = Vec::new();
		while self.chars.has(0) {
			if self.take(&[Pattern::Matching(is_whitespace)]) {
				self.chars.skip();
			} else {
				tokens.push(self.lex_token()?);
			}
		}
		Ok(tokens)
	}

	/// Routes to the right lexing method on one character of lookahead. Only
	/// peeks, so the stream is untouched when the route is taken.
	fn lex_token(&mut self) -> Result<Token, LexError> {
		if self.peek(&[Pattern::Matching(is_identifier_start)]) {
			Ok(self.lex_identifier())
		} else if self.peek(&[DIGIT]) || self.peek(&[Pattern::Matching(is_sign), DIGIT]) {
			Ok(self.lex_number())
		} else if self.peek(&[Pattern::Char('\'')]) {
			self.lex_character()
		} else if self.peek(&[Pattern::Char('"')]) {
			self.lex_string()
		} else {
			Ok(self.lex_operator())
		}
	}

	/// `[A-Za-z_][A-Za-z0-9_-]*`
	fn lex_identifier(&mut self) -> Token {
		self.take(&[Pattern::Matching(is_identifier_start)]);
		while self.take(&[Pattern::Matching(is_identifier_part)]) {}
		self.chars.emit(TokenKind::Identifier)
	}

	/// An optional sign, digits, and at most one `.` that is directly
	/// followed by a digit. A trailing `.` is not part of the number: `1.`
	/// lexes as the integer `1` and leaves the dot for the operator lexer.
	fn lex_number(&mut self) -> Token {
		let mut kind = TokenKind::Integer;
		if !self.take(&[Pattern::Matching(is_sign), DIGIT]) {
			self.take(&[DIGIT]);
		}
		loop {
			if self.take(&[DIGIT]) {
				continue;
			}
			if kind == TokenKind::Integer && self.take(&[Pattern::Char('.'), DIGIT]) {
				kind = TokenKind::Decimal;
				continue;
			}
			break;
		}
		self.chars.emit(kind)
	}

	/// `'`, one character or escape, `'`.
	fn lex_character(&mut self) -> Result<Token, LexError> {
		self.take(&[Pattern::Char('\'')]);
		if self.peek(&[Pattern::Char('\\')]) {
			self.lex_escape()?;
		} else if !self.take(&[Pattern::AnyExcept(&['\'', '\n', '\r'])]) {
			return Err(LexError::new(LexErrorKind::InvalidCharacter, self.chars.byte_index()));
		}
		if self.take(&[Pattern::Char('\'')]) {
			Ok(self.chars.emit(TokenKind::Character))
		} else if self.take(&[Pattern::AnyExcept(&['\''])]) {
			Err(LexError::new(LexErrorKind::CharacterTooLong, self.chars.byte_index()))
		} else {
			Err(LexError::new(LexErrorKind::UnterminatedCharacter, self.chars.byte_index()))
		}
	}

	/// `"`, a run of characters and escapes, `"`. Raw line breaks end the
	/// literal with an error.
	fn lex_string(&mut self) -> Result<Token, LexError> {
		self.take(&[Pattern::Char('"')]);
		loop {
			if self.peek(&[Pattern::Char('\\')]) {
				self.lex_escape()?;
			} else if !self.take(&[Pattern::AnyExcept(&['"', '\n', '\r'])]) {
				break;
			}
		}
		if self.take(&[Pattern::Char('"')]) {
			Ok(self.chars.emit(TokenKind::String))
		} else {
			Err(LexError::new(LexErrorKind::UnterminatedString, self.chars.byte_index()))
		}
	}

	/// The two-character sequence `\` + one of `b n r t ' " \`. The error
	/// points at the bad follower, not the backslash.
	fn lex_escape(&mut self) -> Result<(), LexError> {
		if !self.take(&[Pattern::Char('\\'), Pattern::Matching(is_escape_follower)]) {
			return Err(LexError::new(LexErrorKind::InvalidEscape, self.chars.byte_index_at(1)));
		}
		Ok(())
	}

	/// `<=`, `>=`, `==` and `!=` are single tokens; any other non-whitespace
	/// character stands alone.
	fn lex_operator(&mut self) -> Token {
		if !self.take(&[Pattern::Matching(is_comparison_start), Pattern::Char('=')]) {
			self.take(&[Pattern::Matching(is_not_whitespace)]);
		}
		self.chars.emit(TokenKind::Operator)
	}

	/// True when the next characters match the given patterns, one character
	/// per pattern.
	fn peek(&self, patterns: &[Pattern]) -> bool {
		patterns
			.iter()
			.enumerate()
			.all(|(offset, pattern)| self.chars.has(offset) && pattern.matches(self.chars.get(offset)))
	}

	/// Like [`Lexer::peek`], but advances past all matched characters when
	/// the whole pattern list matches.
	fn take(&mut self, patterns: &[Pattern]) -> bool {
		let matched = self.peek(patterns);
		if matched {
			for _ in patterns {
				self.chars.advance();
			}
		}
		matched
	}
}

/// The lexer's two-cursor view of the input: `index` points at the next
/// unread character, `length` counts the characters accumulated since the
/// last boundary. `emit` turns the accumulated run `[index - length, index)`
/// into a token and resets the boundary.
struct CharStream<'a> {
	input:  &'a str,
	chars:  Vec<(usize, char)>,
	index:  usize,
	length: usize,
}

impl<'a> CharStream<'a> {
	fn new(input: &'a str) -> Self {
		Self { input, chars: input.char_indices().collect(), index: 0, length: 0 }
	}

	fn has(&self, offset: usize) -> bool { self.index + offset < self.chars.len() }

	fn get(&self, offset: usize) -> char { self.chars[self.index + offset].1 }

	fn advance(&mut self) {
		self.index += 1;
		self.length += 1;
	}

	/// Drops the accumulated run, e.g. after whitespace.
	fn skip(&mut self) { self.length = 0; }

	/// Byte offset of the next unread character, or just past the input.
	fn byte_index(&self) -> usize { self.byte_index_at(0) }

	fn byte_index_at(&self, offset: usize) -> usize {
		self.chars.get(self.index + offset).map_or(self.input.len(), |&(byte, _)| byte)
	}

	fn emit(&mut self, kind: TokenKind) -> Token {
		let start = self.index - self.length;
		let start_byte = self.chars.get(start).map_or(self.input.len(), |&(byte, _)| byte);
		let end_byte = self.byte_index();
		self.skip();
		Token::new(kind, &self.input[start_byte..end_byte], start_byte)
	}
}
