use std::{
	fs::read_to_string,
	io::{self, Write},
	path::Path,
};

use anyhow::Context;
use num_traits::ToPrimitive;

use crate::{
	analyzer::Analyzer, ast::Source, interpreter::{Interpreter, Value}, lexer::Lexer, parser::Parser,
	translator::Translator,
};

/// The pipeline driver: lex, parse, analyze, then interpret or translate.
pub struct Ember;

impl Ember {
	/// Interprets the program at `path`; the result of `main` becomes the
	/// process exit code.
	pub fn run_file(&self, path: &Path) -> crate::Result<i32> {
		let source = read_to_string(path).context("failed to read source file")?;
		self.run(&source, io::stdout())
	}

	/// Interprets `source`, with `print` writing through `out`.
	pub fn run(&self, source: &str, out: impl Write) -> crate::Result<i32> {
		let source = self.compile(source)?;
		match Interpreter::new(out).interpret(&source)? {
			Value::Integer(code) => {
				Ok(code.to_i32().context("main returned an integer outside the exit-code range")?)
			}
			other => Err(anyhow::anyhow!("main returned a {} value instead of an Integer", other.kind()).into()),
		}
	}

	/// Emits the Java rendition of the program at `path` to stdout.
	pub fn translate_file(&self, path: &Path) -> crate::Result<()> {
		let source = read_to_string(path).context("failed to read source file")?;
		self.translate(&source, io::stdout())
	}

	/// Emits the Java rendition of `source` through `out`.
	pub fn translate(&self, source: &str, out: impl Write) -> crate::Result<()> {
		let source = self.compile(source)?;
		Translator::new(out).translate(&source)?;
		Ok(())
	}

	/// The front half of the pipeline; every caller shares it.
	fn compile(&self, source: &str) -> crate::Result<Source> {
		let tokens = Lexer::new(source).lex()?;
		let mut source = Parser::new(tokens).parse()?;
		Analyzer::new().analyze(&mut source)?;
		Ok(source)
	}
}
