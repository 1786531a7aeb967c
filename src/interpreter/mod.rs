//! The tree-walking back end.
//!
//! The interpreter evaluates the typed AST directly: statements execute for
//! effect, expressions evaluate to [`Value`]s, and `RETURN` travels as a
//! [`Flow`] result -- not an unwinding mechanism -- until the invoking
//! method frame absorbs it. Every block runs in a child scope that is
//! restored on all exit paths, and a method body runs in a child of its
//! *defining* scope, which is what makes methods close over the fields
//! above them rather than over their caller.
//!
//! `print` writes through the `Write` sink the interpreter was built with;
//! the driver hands it stdout, tests hand it a buffer.

pub mod value;

pub use value::{IntegerRange, Value};

use std::io::Write;

use crate::{
	ast::{Expr, Source, Stmt},
	environment::Scopes,
	error::interpreter::RuntimeError,
};

/// What a statement produced: fall-through, or a `RETURN` transfer on its
/// way to the enclosing method invocation.
enum Flow {
	Normal,
	Returned(Value),
}

/// A function bound in the runtime environment.
#[derive(Clone, Copy)]
enum Callable<'a> {
	Builtin(Builtin),
	/// A `DEF`: parameters, body, and the scope it closes over.
	Declared {
		parameters: &'a [String],
		body:       &'a [Stmt],
		defining:   usize,
	},
}

#[derive(Clone, Copy)]
enum Builtin {
	Print,
	Range,
}

/// Interpreter that evaluates typed Ember trees.
pub struct Interpreter<'a, W> {
	scopes: Scopes<Value, Callable<'a>>,
	out:    W,
}

impl<'a, W: Write> Interpreter<'a, W> {
	pub fn new(out: W) -> Self {
		let mut scopes = Scopes::new();
		// the root scope is empty, so the builtin defines cannot collide
		let _ = scopes.define_variable("nil", Value::Nil);
		let _ = scopes.define_function("print", 1, Callable::Builtin(Builtin::Print));
		let _ = scopes.define_function("range", 2, Callable::Builtin(Builtin::Range));
		Self { scopes, out }
	}

	/// Defines all fields (evaluating initializers in order), registers all
	/// methods, then invokes `main/0` and returns its result.
	pub fn interpret(&mut self, source: &'a Source) -> Result<Value, RuntimeError> {
		for field in &source.fields {
			let value = match &field.value {
				Some(value) => self.expression(value)?,
				None => Value::Nil,
			};
			self.scopes.define_variable(&field.name, value)?;
		}
		for method in &source.methods {
			let defining = self.scopes.current();
			self.scopes.define_function(&method.name, method.parameters.len(), Callable::Declared {
				parameters: &method.parameters,
				body: &method.body,
				defining,
			})?;
		}
		let main = *self
			.scopes
			.lookup_function("main", 0)
			.ok_or_else(|| RuntimeError::UndefinedFunction("main".to_string(), 0))?;
		self.invoke(main, Vec::new())
	}

	/// Calls a callable with already-evaluated arguments.
	fn invoke(&mut self, callable: Callable<'a>, arguments: Vec<Value>) -> Result<Value, RuntimeError> {
		match callable {
			Callable::Builtin(builtin) => self.builtin(builtin, arguments),
			Callable::Declared { parameters, body, defining } => {
				// the child of the defining scope, not the caller's
				let saved = self.scopes.enter_child_of(defining);
				let result = self.bind_and_run(parameters, body, arguments);
				self.scopes.restore(saved);
				match result? {
					Flow::Returned(value) => Ok(value),
					Flow::Normal => Ok(Value::Nil),
				}
			}
		}
	}

	fn bind_and_run(
		&mut self,
		parameters: &[String],
		body: &'a [Stmt],
		arguments: Vec<Value>,
	) -> Result<Flow, RuntimeError> {
		for (parameter, argument) in parameters.iter().zip(arguments) {
			self.scopes.define_variable(parameter, argument)?;
		}
		self.block(body)
	}

	fn builtin(&mut self, builtin: Builtin, arguments: Vec<Value>) -> Result<Value, RuntimeError> {
		// arity was part of the lookup key, so the argument count fits
		let mut arguments = arguments.into_iter();
		match builtin {
			Builtin::Print => {
				let value = arguments.next().unwrap_or(Value::Nil);
				writeln!(self.out, "{value}")?;
				Ok(Value::Nil)
			}
			Builtin::Range => {
				let start = arguments.next().unwrap_or(Value::Nil).into_integer()?;
				let end = arguments.next().unwrap_or(Value::Nil).into_integer()?;
				Ok(Value::Iterable(IntegerRange::new(start, end)))
			}
		}
	}

	/// Runs statements in the current scope, stopping at a return transfer.
	fn block(&mut self, statements: &'a [Stmt]) -> Result<Flow, RuntimeError> {
		for statement in statements {
			match self.statement(statement)? {
				Flow::Normal => {}
				returned => return Ok(returned),
			}
		}
		Ok(Flow::Normal)
	}

	/// Runs statements in a fresh child scope, releasing it on every path.
	fn child_block(&mut self, statements: &'a [Stmt]) -> Result<Flow, RuntimeError> {
		let saved = self.scopes.enter_child();
		let result = self.block(statements);
		self.scopes.restore(saved);
		result
	}

	fn statement(&mut self, statement: &'a Stmt) -> Result<Flow, RuntimeError> {
		match statement {
			Stmt::Expression(expression) => {
				self.expression(expression)?;
			}
			Stmt::Declaration { name, value, .. } => {
				let value = match value {
					Some(value) => self.expression(value)?,
					None => Value::Nil,
				};
				self.scopes.define_variable(name, value)?;
			}
			Stmt::Assignment { receiver, value } => {
				let Expr::Access { receiver: target, name, .. } = receiver else {
					return Err(RuntimeError::InvalidAssignmentTarget);
				};
				// the right-hand side is evaluated exactly once
				let value = self.expression(value)?;
				match target {
					Some(target) => {
						let object = self.expression(target)?;
						return Err(RuntimeError::UnknownField { kind: object.kind(), name: name.clone() });
					}
					None => {
						let variable = self
							.scopes
							.lookup_variable_mut(name)
							.ok_or_else(|| RuntimeError::UndefinedVariable(name.clone()))?;
						*variable = value;
					}
				}
			}
			Stmt::If { condition, then_body, else_body } => {
				let condition = self.expression(condition)?.as_boolean()?;
				let body = if condition { then_body } else { else_body };
				return self.child_block(body);
			}
			Stmt::For { name, iterable, body } => {
				let range = match self.expression(iterable)? {
					Value::Iterable(range) => range,
					other => {
						return Err(RuntimeError::ExpectedType {
							expected: "IntegerIterable",
							found:    other.kind(),
						});
					}
				};
				for element in range {
					let saved = self.scopes.enter_child();
					let result = match self.scopes.define_variable(name, Value::Integer(element)) {
						Ok(()) => self.block(body),
						Err(error) => Err(error.into()),
					};
					self.scopes.restore(saved);
					match result? {
						Flow::Normal => {}
						returned => return Ok(returned),
					}
				}
			}
			Stmt::While { condition, body } => {
				while self.expression(condition)?.as_boolean()? {
					match self.child_block(body)? {
						Flow::Normal => {}
						returned => return Ok(returned),
					}
				}
			}
			Stmt::Return { value } => {
				return Ok(Flow::Returned(self.expression(value)?));
			}
		}
		Ok(Flow::Normal)
	}

	fn expression(&mut self, expression: &'a Expr) -> Result<Value, RuntimeError> {
		match expression {
			Expr::Literal { value, .. } => Ok(Value::from(value)),
			Expr::Group { inner, .. } => self.expression(inner),
			Expr::Binary { op, left, right, .. } => self.binary(op, left, right),
			Expr::Access { receiver, name, .. } => match receiver {
				Some(receiver) => {
					let object = self.expression(receiver)?;
					Err(RuntimeError::UnknownField { kind: object.kind(), name: name.clone() })
				}
				None => self
					.scopes
					.lookup_variable(name)
					.cloned()
					.ok_or_else(|| RuntimeError::UndefinedVariable(name.clone())),
			},
			Expr::Function { receiver, name, arguments, .. } => {
				let mut values = Vec::with_capacity(arguments.len());
				for argument in arguments {
					values.push(self.expression(argument)?);
				}
				match receiver {
					Some(receiver) => {
						let object = self.expression(receiver)?;
						Err(RuntimeError::UnknownMethod {
							kind:  object.kind(),
							name:  name.clone(),
							arity: arguments.len(),
						})
					}
					None => {
						let callable = *self
							.scopes
							.lookup_function(name, arguments.len())
							.ok_or_else(|| RuntimeError::UndefinedFunction(name.clone(), arguments.len()))?;
						self.invoke(callable, values)
					}
				}
			}
		}
	}

	fn binary(&mut self, op: &str, left: &'a Expr, right: &'a Expr) -> Result<Value, RuntimeError> {
		let left = self.expression(left)?;
		// OR and AND decide on the left value alone when they can
		match op {
			"OR" => {
				if left.as_boolean()? {
					return Ok(Value::Boolean(true));
				}
				return Ok(Value::Boolean(self.expression(right)?.as_boolean()?));
			}
			"AND" => {
				if !left.as_boolean()? {
					return Ok(Value::Boolean(false));
				}
				return Ok(Value::Boolean(self.expression(right)?.as_boolean()?));
			}
			_ => {}
		}
		let right = self.expression(right)?;
		match op {
			"<" => Ok(Value::Boolean(left.compare(op, &right)?.is_lt())),
			"<=" => Ok(Value::Boolean(left.compare(op, &right)?.is_le())),
			">" => Ok(Value::Boolean(left.compare(op, &right)?.is_gt())),
			">=" => Ok(Value::Boolean(left.compare(op, &right)?.is_ge())),
			"==" => Ok(Value::Boolean(left == right)),
			"!=" => Ok(Value::Boolean(left != right)),
			"+" => left.add(&right),
			"-" => left.subtract(&right),
			"*" => left.multiply(&right),
			"/" => left.divide(&right),
			_ => Err(RuntimeError::UnknownOperator(op.to_string())),
		}
	}
}
