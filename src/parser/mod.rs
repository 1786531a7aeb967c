//! Recursive-descent parser from tokens to the untyped AST.
//!
//! Each grammar rule is one method, and rules reference each other by plain
//! calls. The token-level helpers mirror the lexer's: `peek` inspects,
//! `take` consumes on a match, and `require` consumes or fails with the
//! offending token's byte index. Patterns match a token either by
//! [`TokenKind`] or by exact literal, so `peek("LET")` and
//! `peek(TokenKind::Identifier)` both work -- keywords are just identifier
//! tokens with a known literal.
//!
//! Grammar, lowest precedence first, all binary operators left-associative:
//!
//! ```text
//! source      := field* method*
//! field       := 'LET' IDENT (':' IDENT)? ('=' expr)? ';'
//! method      := 'DEF' IDENT '(' params? ')' (':' IDENT)? 'DO' stmt* 'END'
//! stmt        := 'LET' decl | 'IF' if | 'FOR' for | 'WHILE' while
//!              | 'RETURN' expr ';' | expr ('=' expr)? ';'
//! expr        := logical
//! logical     := comparison (('AND' | 'OR') comparison)*
//! comparison  := additive (('<' | '<=' | '>' | '>=' | '==' | '!=') additive)*
//! additive    := multiplicative (('+' | '-') multiplicative)*
//! multiplicative := secondary (('*' | '/') secondary)*
//! secondary   := primary ('.' IDENT ('(' args? ')')?)*
//! primary     := 'NIL' | 'TRUE' | 'FALSE' | INT | DEC | CHAR | STR
//!              | '(' expr ')' | IDENT ('(' args? ')')?
//! ```
//!
//! The first error ends the parse; there is no recovery.

use crate::{
	ast::{Expr, Field, Literal, Method, Source, Stmt},
	error::parser::{ParseError, ParseErrorKind},
	lexer::{Token, TokenKind},
};

/// A single-token pattern: match by kind or by exact literal.
#[derive(Clone, Copy)]
enum Pattern<'a> {
	Kind(TokenKind),
	Literal(&'a str),
}

impl Pattern<'_> {
	fn matches(self, token: &Token) -> bool {
		match self {
			Pattern::Kind(kind) => token.kind == kind,
			Pattern::Literal(literal) => token.literal == literal,
		}
	}

	fn describe(self) -> String {
		match self {
			Pattern::Kind(TokenKind::Identifier) => "an identifier".to_string(),
			Pattern::Kind(TokenKind::Integer) => "an integer".to_string(),
			Pattern::Kind(TokenKind::Decimal) => "a decimal".to_string(),
			Pattern::Kind(TokenKind::Character) => "a character".to_string(),
			Pattern::Kind(TokenKind::String) => "a string".to_string(),
			Pattern::Kind(TokenKind::Operator) => "an operator".to_string(),
			Pattern::Literal(literal) => format!("'{literal}'"),
		}
	}
}

impl From<TokenKind> for Pattern<'static> {
	fn from(kind: TokenKind) -> Self { Pattern::Kind(kind) }
}

impl<'a> From<&'a str> for Pattern<'a> {
	fn from(literal: &'a str) -> Self { Pattern::Literal(literal) }
}

/// A recursive-descent parser over a token stream.
pub struct Parser {
	tokens: TokenStream,
}

impl Parser {
	pub fn new(tokens: Vec<Token>) -> Self { Self { tokens: TokenStream { tokens, index: 0 } } }

	/// Parses a whole compilation unit and requires the input to end there.
	pub fn parse(mut self) -> Result<Source, ParseError> {
		let source = self.parse_source()?;
		if self.tokens.has(0) {
			return Err(self.expected("'DEF' or end of input"));
		}
		Ok(source)
	}

	/// Parses a single expression spanning the whole input. Test entry
	/// point.
	pub fn parse_expression(mut self) -> Result<Expr, ParseError> {
		let expression = self.expression()?;
		if self.tokens.has(0) {
			return Err(self.expected("end of input"));
		}
		Ok(expression)
	}

	fn parse_source(&mut self) -> Result<Source, ParseError> {
		let mut fields = Vec::new();
		while self.peek("LET") {
			fields.push(self.parse_field()?);
		}
		let mut methods = Vec::new();
		while self.peek("DEF") {
			methods.push(self.parse_method()?);
		}
		Ok(Source { fields, methods })
	}

	fn parse_field(&mut self) -> Result<Field, ParseError> {
		self.require("LET")?;
		let name = self.require(TokenKind::Identifier)?;
		let type_name = self.parse_annotation()?;
		let value = if self.take("=") { Some(self.expression()?) } else { None };
		self.require(";")?;
		Ok(Field { name, type_name, value, variable: None })
	}

	fn parse_method(&mut self) -> Result<Method, ParseError> {
		self.require("DEF")?;
		let name = self.require(TokenKind::Identifier)?;
		self.require("(")?;
		let mut parameters = Vec::new();
		let mut parameter_type_names = Vec::new();
		if !self.peek(")") {
			loop {
				parameters.push(self.require(TokenKind::Identifier)?);
				parameter_type_names.push(self.parse_annotation()?);
				if !self.take(",") {
					break;
				}
			}
		}
		self.require(")")?;
		let return_type_name = self.parse_annotation()?;
		self.require("DO")?;
		let body = self.parse_body(&["END"])?;
		self.require("END")?;
		Ok(Method { name, parameters, parameter_type_names, return_type_name, body, function: None })
	}

	/// The optional `: IDENT` type annotation.
	fn parse_annotation(&mut self) -> Result<Option<String>, ParseError> {
		if self.take(":") { Ok(Some(self.require(TokenKind::Identifier)?)) } else { Ok(None) }
	}

	/// Statements until (but not through) one of the terminator literals.
	fn parse_body(&mut self, terminators: &[&str]) -> Result<Vec<Stmt>, ParseError> {
		let mut body = Vec::new();
		loop {
			if !self.tokens.has(0) {
				return Err(self.expected("'END'"));
			}
			if terminators.iter().any(|terminator| self.peek(*terminator)) {
				return Ok(body);
			}
			body.push(self.parse_statement()?);
		}
	}

	fn parse_statement(&mut self) -> Result<Stmt, ParseError> {
		if self.peek("LET") {
			self.parse_declaration()
		} else if self.peek("IF") {
			self.parse_if()
		} else if self.peek("FOR") {
			self.parse_for()
		} else if self.peek("WHILE") {
			self.parse_while()
		} else if self.peek("RETURN") {
			self.parse_return()
		} else {
			let expression = self.expression()?;
			let statement = if self.take("=") {
				Stmt::Assignment { receiver: expression, value: self.expression()? }
			} else {
				Stmt::Expression(expression)
			};
			self.require(";")?;
			Ok(statement)
		}
	}

	fn parse_declaration(&mut self) -> Result<Stmt, ParseError> {
		self.require("LET")?;
		let name = self.require(TokenKind::Identifier)?;
		let type_name = self.parse_annotation()?;
		let value = if self.take("=") { Some(self.expression()?) } else { None };
		self.require(";")?;
		Ok(Stmt::Declaration { name, type_name, value, variable: None })
	}

	fn parse_if(&mut self) -> Result<Stmt, ParseError> {
		self.require("IF")?;
		let condition = self.expression()?;
		self.require("DO")?;
		let then_body = self.parse_body(&["ELSE", "END"])?;
		let else_body = if self.take("ELSE") { self.parse_body(&["END"])? } else { Vec::new() };
		self.require("END")?;
		Ok(Stmt::If { condition, then_body, else_body })
	}

	fn parse_for(&mut self) -> Result<Stmt, ParseError> {
		self.require("FOR")?;
		let name = self.require(TokenKind::Identifier)?;
		self.require("IN")?;
		let iterable = self.expression()?;
		self.require("DO")?;
		let body = self.parse_body(&["END"])?;
		self.require("END")?;
		Ok(Stmt::For { name, iterable, body })
	}

	fn parse_while(&mut self) -> Result<Stmt, ParseError> {
		self.require("WHILE")?;
		let condition = self.expression()?;
		self.require("DO")?;
		let body = self.parse_body(&["END"])?;
		self.require("END")?;
		Ok(Stmt::While { condition, body })
	}

	fn parse_return(&mut self) -> Result<Stmt, ParseError> {
		self.require("RETURN")?;
		let value = self.expression()?;
		self.require(";")?;
		Ok(Stmt::Return { value })
	}

	fn expression(&mut self) -> Result<Expr, ParseError> { self.logical() }

	fn logical(&mut self) -> Result<Expr, ParseError> {
		let mut result = self.comparison()?;
		while self.take("AND") || self.take("OR") {
			let op = self.tokens.previous_literal();
			result = Expr::binary(op, result, self.comparison()?);
		}
		Ok(result)
	}

	fn comparison(&mut self) -> Result<Expr, ParseError> {
		let mut result = self.additive()?;
		while self.take("<")
			|| self.take("<=")
			|| self.take(">")
			|| self.take(">=")
			|| self.take("==")
			|| self.take("!=")
		{
			let op = self.tokens.previous_literal();
			result = Expr::binary(op, result, self.additive()?);
		}
		Ok(result)
	}

	fn additive(&mut self) -> Result<Expr, ParseError> {
		let mut result = self.multiplicative()?;
		while self.take("+") || self.take("-") {
			let op = self.tokens.previous_literal();
			result = Expr::binary(op, result, self.multiplicative()?);
		}
		Ok(result)
	}

	fn multiplicative(&mut self) -> Result<Expr, ParseError> {
		let mut result = self.secondary()?;
		while self.take("*") || self.take("/") {
			let op = self.tokens.previous_literal();
			result = Expr::binary(op, result, self.secondary()?);
		}
		Ok(result)
	}

	/// Field reads and method calls chained off a primary with `.`.
	fn secondary(&mut self) -> Result<Expr, ParseError> {
		let mut result = self.primary()?;
		while self.take(".") {
			let name = self.require(TokenKind::Identifier)?;
			result = if self.take("(") {
				Expr::function(Some(result), name, self.parse_arguments()?)
			} else {
				Expr::access(Some(result), name)
			};
		}
		Ok(result)
	}

	fn primary(&mut self) -> Result<Expr, ParseError> {
		if self.take("NIL") {
			Ok(Expr::literal(Literal::Nil))
		} else if self.take("TRUE") {
			Ok(Expr::literal(Literal::Boolean(true)))
		} else if self.take("FALSE") {
			Ok(Expr::literal(Literal::Boolean(false)))
		} else if self.take(TokenKind::Integer) {
			let value = self.tokens.previous_literal().parse().map_err(|_| self.invalid_literal())?;
			Ok(Expr::literal(Literal::Integer(value)))
		} else if self.take(TokenKind::Decimal) {
			let value = self.tokens.previous_literal().parse().map_err(|_| self.invalid_literal())?;
			Ok(Expr::literal(Literal::Decimal(value)))
		} else if self.take(TokenKind::Character) {
			let body = unquote(&self.tokens.previous_literal());
			let mut chars = body.chars();
			match (chars.next(), chars.next()) {
				(Some(value), None) => Ok(Expr::literal(Literal::Character(value))),
				_ => Err(self.invalid_literal()),
			}
		} else if self.take(TokenKind::String) {
			let value = unquote(&self.tokens.previous_literal());
			Ok(Expr::literal(Literal::Str(value)))
		} else if self.take("(") {
			let inner = self.expression()?;
			self.require(")")?;
			Ok(Expr::group(inner))
		} else if self.take(TokenKind::Identifier) {
			let name = self.tokens.previous_literal();
			if self.take("(") {
				Ok(Expr::function(None, name, self.parse_arguments()?))
			} else {
				Ok(Expr::access(None, name))
			}
		} else {
			Err(ParseError::new(ParseErrorKind::InvalidExpression, self.tokens.error_index()))
		}
	}

	/// Comma-separated arguments through the closing `)`; the opening `(` is
	/// already consumed.
	fn parse_arguments(&mut self) -> Result<Vec<Expr>, ParseError> {
		let mut arguments = Vec::new();
		if !self.peek(")") {
			loop {
				arguments.push(self.expression()?);
				if !self.take(",") {
					break;
				}
			}
		}
		self.require(")")?;
		Ok(arguments)
	}

	fn peek<'a>(&self, pattern: impl Into<Pattern<'a>>) -> bool {
		self.tokens.has(0) && pattern.into().matches(self.tokens.get(0))
	}

	fn take<'a>(&mut self, pattern: impl Into<Pattern<'a>>) -> bool {
		let matched = self.peek(pattern);
		if matched {
			self.tokens.advance();
		}
		matched
	}

	/// Consumes a token matching the pattern and returns its literal, or
	/// fails at the offending token.
	fn require<'a>(&mut self, pattern: impl Into<Pattern<'a>>) -> Result<String, ParseError> {
		let pattern = pattern.into();
		if self.take(pattern) {
			Ok(self.tokens.previous_literal())
		} else {
			Err(self.expected(&pattern.describe()))
		}
	}

	fn expected(&self, what: &str) -> ParseError {
		ParseError::new(ParseErrorKind::Expected(what.to_string()), self.tokens.error_index())
	}

	fn invalid_literal(&self) -> ParseError {
		ParseError::new(ParseErrorKind::InvalidLiteral, self.tokens.previous().index)
	}
}

/// Strips the surrounding quotes from a character or string literal and
/// resolves its escapes in one left-to-right pass.
fn unquote(literal: &str) -> String {
	let body = &literal[1..literal.len() - 1];
	let mut result = String::with_capacity(body.len());
	let mut chars = body.chars();
	while let Some(c) = chars.next() {
		if c == '\\' {
			match chars.next() {
				Some('b') => result.push('\u{8}'),
				Some('n') => result.push('\n'),
				Some('r') => result.push('\r'),
				Some('t') => result.push('\t'),
				// the lexer only lets ' " \ through here
				Some(other) => result.push(other),
				None => {}
			}
		} else {
			result.push(c);
		}
	}
	result
}

/// The parser's cursor over the lexed tokens.
struct TokenStream {
	tokens: Vec<Token>,
	index:  usize,
}

impl TokenStream {
	fn has(&self, offset: usize) -> bool { self.index + offset < self.tokens.len() }

	fn get(&self, offset: usize) -> &Token { &self.tokens[self.index + offset] }

	fn advance(&mut self) { self.index += 1; }

	fn previous(&self) -> &Token { &self.tokens[self.index - 1] }

	fn previous_literal(&self) -> String { self.previous().literal.clone() }

	/// Byte index for error reporting: the current token's start, or just
	/// past the final token once the stream ran out.
	fn error_index(&self) -> usize {
		if self.has(0) {
			self.get(0).index
		} else {
			self.tokens.last().map_or(0, |token| token.index + token.literal.len())
		}
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::lexer::Lexer;

	fn parse(input: &str, expected: &str) {
		let tokens = Lexer::new(input).lex().unwrap();
		let expression = Parser::new(tokens).parse_expression().unwrap();
		assert_eq!(expression.to_string(), expected, "for {input:?}");
	}

	fn parse_source(input: &str) -> Result<Source, ParseError> {
		let tokens = Lexer::new(input).lex().unwrap();
		Parser::new(tokens).parse()
	}

	fn fails_at(input: &str, index: usize) {
		match parse_source(input) {
			Err(error) => assert_eq!(error.index(), index, "error index for {input:?}"),
			Ok(source) => panic!("expected {input:?} to fail, parsed {source:?}"),
		}
	}

	#[test]
	fn parse_literals() {
		parse("NIL", "nil");
		parse("TRUE", "true");
		parse("FALSE", "false");
		parse("42", "42");
		parse("3.14", "3.14");
		parse("'a'", "'a'");
		parse(r"'\n'", "'\n'");
		parse(r#""hello""#, "\"hello\"");
		parse(r#""a\tb""#, "\"a\tb\"");
	}

	#[test]
	fn parse_precedence() {
		parse("1 + 2 * 3", "(+ 1 (* 2 3))");
		parse("1 * 2 + 3", "(+ (* 1 2) 3)");
		parse("1 < 2 + 3", "(< 1 (+ 2 3))");
		parse("a AND b == c", "(AND a (== b c))");
		parse("a OR b AND c", "(AND (OR a b) c)");
	}

	#[test]
	fn parse_associativity() {
		parse("1 - 2 - 3", "(- (- 1 2) 3)");
		parse("8 / 4 / 2", "(/ (/ 8 4) 2)");
		parse("1 < 2 < 3", "(< (< 1 2) 3)");
		parse("a AND b AND c", "(AND (AND a b) c)");
	}

	#[test]
	fn parse_comparisons() {
		parse("1 < 2", "(< 1 2)");
		parse("1 <= 2", "(<= 1 2)");
		parse("1 > 2", "(> 1 2)");
		parse("1 >= 2", "(>= 1 2)");
		parse("1 == 2", "(== 1 2)");
		parse("1 != 2", "(!= 1 2)");
	}

	#[test]
	fn parse_grouping() {
		parse("(1 + 2) * 3", "(* (group (+ 1 2)) 3)");
		parse("1 * (2 + 3)", "(* 1 (group (+ 2 3)))");
	}

	#[test]
	fn parse_calls_and_access() {
		parse("name", "name");
		parse("f()", "(f)");
		parse("f(1, 2)", "(f 1 2)");
		parse("range(1, 4)", "(range 1 4)");
		parse("obj.field", "(. obj field)");
		parse("obj.method(1)", "(. obj (method 1))");
		parse("a.b.c", "(. (. a b) c)");
	}

	#[test]
	fn parse_source_shapes() {
		let source = parse_source(
			"LET x: Integer = 1; \
			 DEF main(): Integer DO RETURN x; END",
		)
		.unwrap();
		assert_eq!(source.fields.len(), 1);
		assert_eq!(source.fields[0].name, "x");
		assert_eq!(source.fields[0].type_name.as_deref(), Some("Integer"));
		assert_eq!(source.methods.len(), 1);
		assert_eq!(source.methods[0].name, "main");
		assert_eq!(source.methods[0].return_type_name.as_deref(), Some("Integer"));
		assert_eq!(source.methods[0].body.len(), 1);
	}

	#[test]
	fn parse_annotations_are_optional() {
		let source = parse_source("LET x = 1; DEF f(a, b: Integer) DO f(a, b); END").unwrap();
		assert_eq!(source.fields[0].type_name, None);
		let method = &source.methods[0];
		assert_eq!(method.parameters, ["a", "b"]);
		assert_eq!(method.parameter_type_names, [None, Some("Integer".to_string())]);
		assert_eq!(method.return_type_name, None);
	}

	#[test]
	fn parse_statements() {
		let source = parse_source(
			"DEF main(): Integer DO \
			   LET s = 0; \
			   FOR i IN range(1, 4) DO s = s + i; END \
			   WHILE s > 10 DO s = s - 1; END \
			   IF s == 6 DO print(s); ELSE print(0); END \
			   RETURN s; \
			 END",
		)
		.unwrap();
		let body = &source.methods[0].body;
		assert_eq!(body.len(), 5);
		assert!(matches!(body[0], Stmt::Declaration { .. }));
		assert!(matches!(body[1], Stmt::For { .. }));
		assert!(matches!(body[2], Stmt::While { .. }));
		assert!(matches!(&body[3], Stmt::If { else_body, .. } if else_body.len() == 1));
		assert!(matches!(body[4], Stmt::Return { .. }));
	}

	#[test]
	fn parse_assignment_statement() {
		let source = parse_source("DEF main(): Integer DO x = 1; RETURN x; END").unwrap();
		assert!(matches!(&source.methods[0].body[0], Stmt::Assignment { receiver, .. }
			if matches!(receiver, Expr::Access { .. })));
	}

	#[test]
	fn parse_empty_bodies() {
		// the parser permits empty loop bodies; the analyzer rejects them
		let source = parse_source("DEF main(): Integer DO FOR i IN range(0, 0) DO END RETURN 0; END");
		assert!(source.is_ok());
	}

	#[test]
	fn parse_failures() {
		// missing semicolon after the field initializer
		fails_at("LET x = 1", 9);
		// statement in field position
		fails_at("RETURN 1;", 0);
		// unterminated method body
		fails_at("DEF main() DO RETURN 1;", 23);
		// missing right paren
		fails_at("DEF main() DO f(1; END", 17);
		// trailing tokens after the method list
		fails_at("DEF main(): Integer DO RETURN 0; END LET x = 1;", 37);
	}
}
