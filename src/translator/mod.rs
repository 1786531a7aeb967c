//! The source-emitting back end: a typed Ember tree out as Java.
//!
//! The whole program becomes one `class Main` -- fields as instance fields,
//! methods as instance methods, and a `public static void main` entry point
//! that exits the process with `new Main().main()`. Statements emit line by
//! line at four spaces per indent level; expressions render to strings and
//! are emitted verbatim inside them. Only literal emission quotes and
//! escapes; everything else trusts the resolved symbols' JVM names.

use std::io::Write;

use anyhow::{Context, Result};

use crate::ast::{Expr, Field, Literal, Method, Source, Stmt};

/// Emits a Java rendition of a typed source tree to a line-oriented sink.
pub struct Translator<W> {
	out:    W,
	indent: usize,
}

impl<W: Write> Translator<W> {
	pub fn new(out: W) -> Self { Self { out, indent: 0 } }

	pub fn translate(&mut self, source: &Source) -> Result<()> {
		self.line("class Main {")?;
		self.indent += 1;
		for field in &source.fields {
			self.field(field)?;
		}
		if !source.fields.is_empty() {
			self.blank()?;
		}
		self.line("public static void main(String[] args) {")?;
		self.indent += 1;
		self.line("System.exit(new Main().main());")?;
		self.indent -= 1;
		self.line("}")?;
		for method in &source.methods {
			self.blank()?;
			self.method(method)?;
		}
		self.indent -= 1;
		self.line("}")?;
		Ok(())
	}

	fn field(&mut self, field: &Field) -> Result<()> {
		let variable = field.variable.as_ref().context("field missing its resolved symbol")?;
		let mut declaration = format!("{} {}", variable.ty.jvm_name(), variable.jvm_name);
		if let Some(value) = &field.value {
			declaration.push_str(" = ");
			declaration.push_str(&expression(value)?);
		}
		declaration.push(';');
		self.line(&declaration)
	}

	fn method(&mut self, method: &Method) -> Result<()> {
		let function = method.function.as_ref().context("method missing its resolved symbol")?;
		let parameters = method
			.parameters
			.iter()
			.zip(&function.parameter_types)
			.map(|(name, ty)| format!("{} {name}", ty.jvm_name()))
			.collect::<Vec<_>>()
			.join(", ");
		let header = format!("{} {}({parameters})", function.return_type.jvm_name(), function.jvm_name);
		if method.body.is_empty() {
			return self.line(&format!("{header} {{}}"));
		}
		self.line(&format!("{header} {{"))?;
		self.body(&method.body)?;
		self.line("}")
	}

	fn statement(&mut self, statement: &Stmt) -> Result<()> {
		match statement {
			Stmt::Expression(value) => self.line(&format!("{};", expression(value)?)),
			Stmt::Declaration { value, variable, .. } => {
				let variable = variable.as_ref().context("declaration missing its resolved symbol")?;
				let mut declaration = format!("{} {}", variable.ty.jvm_name(), variable.jvm_name);
				if let Some(value) = value {
					declaration.push_str(" = ");
					declaration.push_str(&expression(value)?);
				}
				declaration.push(';');
				self.line(&declaration)
			}
			Stmt::Assignment { receiver, value } => {
				self.line(&format!("{} = {};", expression(receiver)?, expression(value)?))
			}
			Stmt::If { condition, then_body, else_body } => {
				self.line(&format!("if ({}) {{", expression(condition)?))?;
				self.body(then_body)?;
				if else_body.is_empty() {
					self.line("}")
				} else {
					self.line("} else {")?;
					self.body(else_body)?;
					self.line("}")
				}
			}
			Stmt::For { name, iterable, body } => {
				self.line(&format!("for (int {name} : {}) {{", expression(iterable)?))?;
				self.body(body)?;
				self.line("}")
			}
			Stmt::While { condition, body } => {
				self.line(&format!("while ({}) {{", expression(condition)?))?;
				self.body(body)?;
				self.line("}")
			}
			Stmt::Return { value } => self.line(&format!("return {};", expression(value)?)),
		}
	}

	fn body(&mut self, statements: &[Stmt]) -> Result<()> {
		self.indent += 1;
		for statement in statements {
			self.statement(statement)?;
		}
		self.indent -= 1;
		Ok(())
	}

	fn line(&mut self, text: &str) -> Result<()> {
		for _ in 0..self.indent {
			write!(self.out, "    ")?;
		}
		writeln!(self.out, "{text}")?;
		Ok(())
	}

	fn blank(&mut self) -> Result<()> {
		writeln!(self.out)?;
		Ok(())
	}
}

/// Renders an expression to Java text. Pure; statements splice the result
/// into their lines.
fn expression(expression: &Expr) -> Result<String> {
	Ok(match expression {
		Expr::Literal { value, .. } => literal(value),
		Expr::Group { inner, .. } => format!("({})", self::expression(inner)?),
		Expr::Binary { op, left, right, .. } => {
			let op = match op.as_str() {
				"AND" => "&&",
				"OR" => "||",
				other => other,
			};
			format!("{} {op} {}", self::expression(left)?, self::expression(right)?)
		}
		Expr::Access { receiver, variable, .. } => {
			let variable = variable.as_ref().context("access missing its resolved symbol")?;
			match receiver {
				Some(receiver) => format!("{}.{}", self::expression(receiver)?, variable.jvm_name),
				None => variable.jvm_name.clone(),
			}
		}
		Expr::Function { receiver, arguments, function, .. } => {
			let function = function.as_ref().context("call missing its resolved symbol")?;
			let arguments =
				arguments.iter().map(self::expression).collect::<Result<Vec<_>>>()?.join(", ");
			match receiver {
				Some(receiver) => format!("{}.{}({arguments})", self::expression(receiver)?, function.jvm_name),
				None => format!("{}({arguments})", function.jvm_name),
			}
		}
	})
}

/// Literal emission adds the quotes and escapes; everything else emits
/// values by their decimal or keyword form.
fn literal(value: &Literal) -> String {
	match value {
		Literal::Nil => "null".to_string(),
		Literal::Boolean(value) => value.to_string(),
		Literal::Integer(value) => value.to_string(),
		Literal::Decimal(value) => value.to_string(),
		Literal::Character(value) => format!("'{}'", escape(&value.to_string())),
		Literal::Str(value) => format!("\"{}\"", escape(value)),
	}
}

/// Escapes exactly the seven sequences the lexer accepts.
fn escape(text: &str) -> String {
	let mut escaped = String::with_capacity(text.len());
	for c in text.chars() {
		match c {
			'\u{8}' => escaped.push_str("\\b"),
			'\n' => escaped.push_str("\\n"),
			'\r' => escaped.push_str("\\r"),
			'\t' => escaped.push_str("\\t"),
			'\'' => escaped.push_str("\\'"),
			'"' => escaped.push_str("\\\""),
			'\\' => escaped.push_str("\\\\"),
			other => escaped.push(other),
		}
	}
	escaped
}
