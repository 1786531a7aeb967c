pub mod analyzer;
pub mod interpreter;
pub mod lexer;
pub mod parser;

use crate::error::{analyzer::AnalyzeError, interpreter::RuntimeError, lexer::LexError, parser::ParseError};

/// EmberError is the top-level error type for the Ember pipeline.
///
/// Lex and parse errors carry the byte offset of the offending character or
/// token; analysis and runtime errors carry only a message. Every error is
/// fatal to the current run.
#[derive(thiserror::Error, Debug)]
pub enum EmberError {
	/// Internal error, should never happen on any input
	#[error("internal error: {0}")]
	InternalError(#[from] anyhow::Error),
	#[error("lex error: {0}")]
	Lex(#[from] LexError),
	#[error("parse error: {0}")]
	Parse(#[from] ParseError),
	#[error("analyze error: {0}")]
	Analyze(#[from] AnalyzeError),
	#[error("runtime error: {0}")]
	Runtime(#[from] RuntimeError),
}
