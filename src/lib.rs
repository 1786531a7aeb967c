//! # Ember
//!
//! A small statically typed, imperative language: one compilation unit of
//! fields followed by methods, with a required `main` method returning
//! `Integer`. This crate is its whole front end and execution core, four
//! phases over one tree-shaped IR.
//!
//! ## Lexing
//!
//! [`lexer::Lexer`] turns raw text into [`lexer::Token`]s -- identifiers,
//! integer/decimal/character/string literals, and operators. Keywords stay
//! identifiers; the parser tells them apart by literal. Each token records
//! the byte offset where it starts, which is also where errors point.
//!
//! ## Parsing
//!
//! [`parser::Parser`] is a recursive descent over the tokens producing the
//! untyped [`ast`] -- `Source` at the top, `Stmt` and `Expr` variants below.
//! One method per grammar rule, left-associative binary operators layered by
//! precedence. The first error aborts; there is no recovery.
//!
//! ## Analysis
//!
//! [`analyzer::Analyzer`] walks the tree once, resolving every name against
//! the scope chain and typing every expression against the fixed
//! [`environment::Type`] registry. It fills the `Option` annotations in
//! place and changes nothing else, so after it succeeds the same tree is a
//! typed AST.
//!
//! ## Evaluation
//!
//! Two back ends share the typed tree. [`interpreter::Interpreter`] walks it
//! directly: scopes live in an arena, `RETURN` travels as a result value to
//! the invoking frame, and arithmetic keeps arbitrary precision.
//! [`translator::Translator`] instead writes the program back out as a Java
//! `class Main` for the host toolchain to compile.

pub mod analyzer;
pub mod ast;
pub mod cli;
mod ember;
pub mod environment;
pub mod error;
pub mod interpreter;
pub mod lexer;
pub mod parser;
pub mod translator;

pub use ember::Ember;
pub use error::{
	EmberError, analyzer::AnalyzeError, interpreter::RuntimeError, lexer::LexError, parser::ParseError,
};

/// Crate-wide result over the top-level error.
pub type Result<T> = std::result::Result<T, EmberError>;
