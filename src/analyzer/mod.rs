//! Static analysis: one top-down walk that types every expression and binds
//! every name.
//!
//! The walk never changes the tree's shape; it only fills in the `Option`
//! annotations the parser left empty. Names resolve in document order --
//! a method may only call methods defined above it, matching the order the
//! interpreter defines fields and the translator emits members.
//!
//! The base scope predefines the variable `nil`, `print(Any): Nil` (emitted
//! as `System.out.println`), and `range(Integer, Integer): IntegerIterable`.

use bigdecimal::BigDecimal;
use num_traits::ToPrimitive;

use crate::{
	ast::{Expr, Field, Literal, Method, Source, Stmt},
	environment::{Function, Scopes, Type, Variable},
	error::analyzer::AnalyzeError,
};

/// The static analyzer. Consumed by [`Analyzer::analyze`].
pub struct Analyzer {
	scopes: Scopes<Variable, Function>,
	/// Return type of the method whose body is being analyzed.
	method: Option<Type>,
}

impl Default for Analyzer {
	fn default() -> Self { Self::new() }
}

impl Analyzer {
	pub fn new() -> Self {
		let mut scopes = Scopes::new();
		// the root scope is empty, so the builtin defines cannot collide
		let _ = scopes.define_variable("nil", Variable {
			name:     "nil".to_string(),
			jvm_name: "null".to_string(),
			ty:       Type::Nil,
		});
		let _ = scopes.define_function(
			"print",
			1,
			Function::new("print", vec![Type::Any], Type::Nil).with_jvm_name("System.out.println"),
		);
		let _ = scopes.define_function(
			"range",
			2,
			Function::new("range", vec![Type::Integer, Type::Integer], Type::IntegerIterable),
		);
		Self { scopes, method: None }
	}

	/// Types and resolves the tree in place, turning it into a typed AST.
	pub fn analyze(mut self, source: &mut Source) -> Result<(), AnalyzeError> { self.source(source) }

	fn source(&mut self, source: &mut Source) -> Result<(), AnalyzeError> {
		for field in &mut source.fields {
			self.field(field)?;
		}
		for method in &mut source.methods {
			self.method(method)?;
		}
		let main = self.scopes.lookup_function("main", 0).ok_or(AnalyzeError::MissingMain)?;
		if main.return_type != Type::Integer {
			return Err(AnalyzeError::MainMustReturnInteger(main.return_type));
		}
		Ok(())
	}

	fn field(&mut self, field: &mut Field) -> Result<(), AnalyzeError> {
		let ty = self.declared_or_inferred(&field.name, &field.type_name, &mut field.value)?;
		let variable = Variable::new(field.name.clone(), ty);
		self.scopes.define_variable(&field.name, variable.clone())?;
		field.variable = Some(variable);
		Ok(())
	}

	/// Resolves a field's or declaration's type from its annotation, its
	/// initializer, or both -- at least one is required, and when both are
	/// present the initializer must be assignable to the annotation.
	fn declared_or_inferred(
		&mut self,
		name: &str,
		type_name: &Option<String>,
		value: &mut Option<Expr>,
	) -> Result<Type, AnalyzeError> {
		let declared = type_name.as_deref().map(resolve_type).transpose()?;
		let found = match value {
			Some(value) => Some(self.expression(value)?),
			None => None,
		};
		match (declared, found) {
			(Some(declared), Some(found)) => {
				require_assignable(declared, found)?;
				Ok(declared)
			}
			(Some(declared), None) => Ok(declared),
			(None, Some(found)) => Ok(found),
			(None, None) => Err(AnalyzeError::MissingTypeOrValue(name.to_string())),
		}
	}

	fn method(&mut self, method: &mut Method) -> Result<(), AnalyzeError> {
		let mut parameter_types = Vec::with_capacity(method.parameters.len());
		for (parameter, type_name) in method.parameters.iter().zip(&method.parameter_type_names) {
			let type_name = type_name.as_deref().ok_or_else(|| AnalyzeError::MissingParameterType {
				method:    method.name.clone(),
				parameter: parameter.clone(),
			})?;
			parameter_types.push(resolve_type(type_name)?);
		}
		let return_type = match &method.return_type_name {
			Some(type_name) => resolve_type(type_name)?,
			None => Type::Nil,
		};
		let function = Function::new(method.name.clone(), parameter_types.clone(), return_type);
		self.scopes.define_function(&method.name, method.parameters.len(), function.clone())?;
		method.function = Some(function);

		let saved = self.scopes.enter_child();
		let enclosing = self.method.replace(return_type);
		let result = self.method_body(method, &parameter_types);
		self.method = enclosing;
		self.scopes.restore(saved);
		result
	}

	fn method_body(&mut self, method: &mut Method, parameter_types: &[Type]) -> Result<(), AnalyzeError> {
		for (parameter, ty) in method.parameters.iter().zip(parameter_types) {
			self.scopes.define_variable(parameter, Variable::new(parameter.clone(), *ty))?;
		}
		self.block(&mut method.body)
	}

	fn block(&mut self, body: &mut [Stmt]) -> Result<(), AnalyzeError> {
		for statement in body {
			self.statement(statement)?;
		}
		Ok(())
	}

	/// Analyzes statements in a child scope, releasing it on every path.
	fn child_block(&mut self, body: &mut [Stmt]) -> Result<(), AnalyzeError> {
		let saved = self.scopes.enter_child();
		let result = self.block(body);
		self.scopes.restore(saved);
		result
	}

	fn statement(&mut self, statement: &mut Stmt) -> Result<(), AnalyzeError> {
		match statement {
			Stmt::Expression(expression) => {
				if !matches!(expression, Expr::Function { .. }) {
					return Err(AnalyzeError::ExpressionStatementNotCall);
				}
				self.expression(expression)?;
			}
			Stmt::Declaration { name, type_name, value, variable } => {
				let ty = self.declared_or_inferred(name, type_name, value)?;
				let symbol = Variable::new(name.clone(), ty);
				self.scopes.define_variable(name, symbol.clone())?;
				*variable = Some(symbol);
			}
			Stmt::Assignment { receiver, value } => {
				if !matches!(receiver, Expr::Access { .. }) {
					return Err(AnalyzeError::AssignmentTargetNotAccess);
				}
				let target = self.expression(receiver)?;
				let found = self.expression(value)?;
				require_assignable(target, found)?;
			}
			Stmt::If { condition, then_body, else_body } => {
				let found = self.expression(condition)?;
				require_assignable(Type::Boolean, found)?;
				if then_body.is_empty() {
					return Err(AnalyzeError::EmptyBody("IF"));
				}
				self.child_block(then_body)?;
				self.child_block(else_body)?;
			}
			Stmt::For { name, iterable, body } => {
				let found = self.expression(iterable)?;
				require_assignable(Type::IntegerIterable, found)?;
				if body.is_empty() {
					return Err(AnalyzeError::EmptyBody("FOR"));
				}
				let saved = self.scopes.enter_child();
				let result = match self.scopes.define_variable(name, Variable::new(name.clone(), Type::Integer)) {
					Ok(()) => self.block(body),
					Err(error) => Err(error.into()),
				};
				self.scopes.restore(saved);
				result?;
			}
			Stmt::While { condition, body } => {
				let found = self.expression(condition)?;
				require_assignable(Type::Boolean, found)?;
				self.child_block(body)?;
			}
			Stmt::Return { value } => {
				let found = self.expression(value)?;
				let expected = self.method.ok_or(AnalyzeError::ReturnOutsideMethod)?;
				require_assignable(expected, found)?;
			}
		}
		Ok(())
	}

	/// Types an expression, stores the annotation, and returns the type.
	fn expression(&mut self, expression: &mut Expr) -> Result<Type, AnalyzeError> {
		match expression {
			Expr::Literal { value, ty } => {
				let found = literal_type(value)?;
				*ty = Some(found);
				Ok(found)
			}
			Expr::Group { inner, ty } => {
				if !matches!(inner.as_ref(), Expr::Binary { .. }) {
					return Err(AnalyzeError::GroupNotBinary);
				}
				let found = self.expression(inner)?;
				*ty = Some(found);
				Ok(found)
			}
			Expr::Binary { op, left, right, ty } => {
				let left = self.expression(left)?;
				let right = self.expression(right)?;
				let found = binary_type(op, left, right)?;
				*ty = Some(found);
				Ok(found)
			}
			Expr::Access { receiver, name, variable } => {
				let symbol = match receiver {
					Some(receiver) => {
						let receiver = self.expression(receiver)?;
						receiver
							.field(name)
							.ok_or_else(|| AnalyzeError::UnknownField { ty: receiver, name: name.clone() })?
					}
					None => self
						.scopes
						.lookup_variable(name)
						.cloned()
						.ok_or_else(|| AnalyzeError::UnknownVariable(name.clone()))?,
				};
				let found = symbol.ty;
				*variable = Some(symbol);
				Ok(found)
			}
			Expr::Function { receiver, name, arguments, function } => {
				let symbol = match receiver {
					Some(receiver) => {
						let receiver = self.expression(receiver)?;
						receiver.method(name, arguments.len()).ok_or_else(|| AnalyzeError::UnknownMethod {
							ty:    receiver,
							name:  name.clone(),
							arity: arguments.len(),
						})?
					}
					None => self
						.scopes
						.lookup_function(name, arguments.len())
						.cloned()
						.ok_or_else(|| AnalyzeError::UnknownFunction(name.clone(), arguments.len()))?,
				};
				// parameter 0 of a declared method is its receiver, so a
				// receiver-based call checks arguments from parameter 1 on
				let offset = usize::from(receiver.is_some());
				let parameter_types: Vec<Type> =
					symbol.parameter_types.iter().skip(offset).copied().collect();
				for (argument, expected) in arguments.iter_mut().zip(parameter_types) {
					let found = self.expression(argument)?;
					require_assignable(expected, found)?;
				}
				let found = symbol.return_type;
				*function = Some(symbol);
				Ok(found)
			}
		}
	}
}

/// The type of a literal. Integers must fit 32 signed bits; decimals must
/// survive the round trip through the shortest `f64` form.
fn literal_type(value: &Literal) -> Result<Type, AnalyzeError> {
	Ok(match value {
		Literal::Nil => Type::Nil,
		Literal::Boolean(_) => Type::Boolean,
		Literal::Character(_) => Type::Character,
		Literal::Str(_) => Type::Str,
		Literal::Integer(value) => {
			if value.to_i32().is_none() {
				return Err(AnalyzeError::IntegerOutOfRange(value.clone()));
			}
			Type::Integer
		}
		Literal::Decimal(value) => {
			if !fits_double(value) {
				return Err(AnalyzeError::DecimalOutOfRange(value.clone()));
			}
			Type::Decimal
		}
	})
}

/// True when the decimal equals the value parsed back from its nearest
/// double's shortest decimal form.
fn fits_double(value: &BigDecimal) -> bool {
	let Some(double) = value.to_f64() else {
		return false;
	};
	if !double.is_finite() {
		return false;
	}
	match format!("{double}").parse::<BigDecimal>() {
		Ok(round_trip) => round_trip.normalized() == value.normalized(),
		Err(_) => false,
	}
}

fn binary_type(op: &str, left: Type, right: Type) -> Result<Type, AnalyzeError> {
	match op {
		"AND" | "OR" => {
			require_assignable(Type::Boolean, left)?;
			require_assignable(Type::Boolean, right)?;
			Ok(Type::Boolean)
		}
		"<" | "<=" | ">" | ">=" | "==" | "!=" => {
			require_assignable(Type::Comparable, left)?;
			require_assignable(Type::Comparable, right)?;
			if left != right {
				return Err(AnalyzeError::OperandMismatch { op: op.to_string(), left, right });
			}
			Ok(Type::Boolean)
		}
		// `+` concatenates when either side is a string; the other side is
		// coerced at runtime
		"+" if left == Type::Str || right == Type::Str => Ok(Type::Str),
		"+" | "-" | "*" | "/" => arithmetic_type(op, left, right),
		_ => Err(AnalyzeError::UnknownOperator(op.to_string())),
	}
}

fn arithmetic_type(op: &str, left: Type, right: Type) -> Result<Type, AnalyzeError> {
	if !matches!(left, Type::Integer | Type::Decimal) || left != right {
		return Err(AnalyzeError::OperandMismatch { op: op.to_string(), left, right });
	}
	Ok(left)
}

fn require_assignable(target: Type, found: Type) -> Result<(), AnalyzeError> {
	if found.assignable_to(target) { Ok(()) } else { Err(AnalyzeError::NotAssignable { target, found }) }
}

fn resolve_type(name: &str) -> Result<Type, AnalyzeError> {
	Type::from_name(name).ok_or_else(|| AnalyzeError::UnknownType(name.to_string()))
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::{lexer::Lexer, parser::Parser};

	fn analyze(input: &str) -> Result<Source, AnalyzeError> {
		let tokens = Lexer::new(input).lex().unwrap();
		let mut source = Parser::new(tokens).parse().unwrap();
		Analyzer::new().analyze(&mut source).map(|()| source)
	}

	fn accepts(input: &str) -> Source {
		match analyze(input) {
			Ok(source) => source,
			Err(error) => panic!("expected {input:?} to analyze, got: {error}"),
		}
	}

	fn rejects(input: &str) -> AnalyzeError {
		match analyze(input) {
			Err(error) => error,
			Ok(_) => panic!("expected {input:?} to fail analysis"),
		}
	}

	fn expression_type(input: &str) -> Result<Type, AnalyzeError> {
		let tokens = Lexer::new(input).lex().unwrap();
		let mut expression = Parser::new(tokens).parse_expression().unwrap();
		Analyzer::new().expression(&mut expression)
	}

	#[test]
	fn main_is_required() {
		assert_eq!(rejects(""), AnalyzeError::MissingMain);
		assert_eq!(rejects("DEF go(): Integer DO RETURN 0; END"), AnalyzeError::MissingMain);
		assert_eq!(
			rejects("DEF main(): Decimal DO RETURN 1.0; END"),
			AnalyzeError::MainMustReturnInteger(Type::Decimal)
		);
		// main with parameters is not main/0
		assert_eq!(rejects("DEF main(x: Integer): Integer DO RETURN x; END"), AnalyzeError::MissingMain);
	}

	#[test]
	fn integer_literal_bounds() {
		accepts("DEF main(): Integer DO RETURN 2147483647; END");
		accepts("DEF main(): Integer DO RETURN -2147483648; END");
		assert!(matches!(
			rejects("DEF main(): Integer DO RETURN 2147483648; END"),
			AnalyzeError::IntegerOutOfRange(_)
		));
		assert!(matches!(
			rejects("DEF main(): Integer DO RETURN -2147483649; END"),
			AnalyzeError::IntegerOutOfRange(_)
		));
	}

	#[test]
	fn decimal_literals_round_trip_through_doubles() {
		assert_eq!(expression_type("1.0"), Ok(Type::Decimal));
		assert_eq!(expression_type("0.5"), Ok(Type::Decimal));
		assert_eq!(expression_type("123.456"), Ok(Type::Decimal));
		// more precision than a double can carry
		assert!(matches!(
			expression_type("1.00000000000000000001"),
			Err(AnalyzeError::DecimalOutOfRange(_))
		));
	}

	#[test]
	fn binary_typing() {
		assert_eq!(expression_type("1 + 2"), Ok(Type::Integer));
		assert_eq!(expression_type("1.5 * 2.0"), Ok(Type::Decimal));
		assert_eq!(expression_type("1 < 2"), Ok(Type::Boolean));
		assert_eq!(expression_type("'a' == 'b'"), Ok(Type::Boolean));
		assert_eq!(expression_type("TRUE AND FALSE"), Ok(Type::Boolean));
		assert_eq!(expression_type("TRUE OR FALSE"), Ok(Type::Boolean));
		// either side being a string makes `+` concatenation
		assert_eq!(expression_type(r#""a" + 1"#), Ok(Type::Str));
		assert_eq!(expression_type(r#"1 + "a""#), Ok(Type::Str));
	}

	#[test]
	fn binary_rejections() {
		// mixed numeric operands never coerce
		assert!(matches!(expression_type("1 + 2.0"), Err(AnalyzeError::OperandMismatch { .. })));
		assert!(matches!(expression_type("1 - 'a'"), Err(AnalyzeError::OperandMismatch { .. })));
		// comparisons need the same comparable type on both sides
		assert!(matches!(expression_type("1 < 2.0"), Err(AnalyzeError::OperandMismatch { .. })));
		assert!(matches!(expression_type("TRUE < FALSE"), Err(AnalyzeError::NotAssignable { .. })));
		// logic needs booleans
		assert!(matches!(expression_type("1 AND 2"), Err(AnalyzeError::NotAssignable { .. })));
	}

	#[test]
	fn group_must_wrap_binary() {
		assert_eq!(expression_type("(1 + 2)"), Ok(Type::Integer));
		assert_eq!(expression_type("(1)"), Err(AnalyzeError::GroupNotBinary));
	}

	#[test]
	fn string_concatenation_still_checks_the_return_type() {
		// scenario: `1 + "x"` types as String, so returning it from an
		// Integer method fails on assignability, not on the `+` itself
		assert_eq!(
			rejects(r#"DEF main(): Integer DO RETURN 1 + "x"; END"#),
			AnalyzeError::NotAssignable { target: Type::Integer, found: Type::Str }
		);
	}

	#[test]
	fn fields_and_declarations_need_type_or_value() {
		accepts("LET x: Integer; DEF main(): Integer DO RETURN x; END");
		accepts("LET x = 1; DEF main(): Integer DO RETURN x; END");
		assert_eq!(
			rejects("LET x; DEF main(): Integer DO RETURN 0; END"),
			AnalyzeError::MissingTypeOrValue("x".to_string())
		);
		assert_eq!(
			rejects("DEF main(): Integer DO LET y; RETURN 0; END"),
			AnalyzeError::MissingTypeOrValue("y".to_string())
		);
		// both present: the initializer must be assignable
		assert_eq!(
			rejects(r#"LET x: Integer = "s"; DEF main(): Integer DO RETURN 0; END"#),
			AnalyzeError::NotAssignable { target: Type::Integer, found: Type::Str }
		);
		// Any accepts anything
		accepts(r#"LET x: Any = "s"; DEF main(): Integer DO RETURN 0; END"#);
	}

	#[test]
	fn parameters_need_annotations() {
		assert_eq!(
			rejects("DEF f(a) DO print(a); END DEF main(): Integer DO RETURN 0; END"),
			AnalyzeError::MissingParameterType { method: "f".to_string(), parameter: "a".to_string() }
		);
	}

	#[test]
	fn names_resolve_in_document_order() {
		accepts(
			"DEF helper(): Integer DO RETURN 1; END \
			 DEF main(): Integer DO RETURN helper(); END",
		);
		// a forward reference fails: helper is not defined yet
		assert_eq!(
			rejects(
				"DEF main(): Integer DO RETURN helper(); END \
				 DEF helper(): Integer DO RETURN 1; END",
			),
			AnalyzeError::UnknownFunction("helper".to_string(), 0)
		);
	}

	#[test]
	fn scopes_nest_and_shadow() {
		accepts(
			"DEF main(): Integer DO \
			   LET x = 1; \
			   IF TRUE DO LET y = 2; print(y); END \
			   RETURN x; \
			 END",
		);
		// a branch-local name is gone after the branch
		assert_eq!(
			rejects(
				"DEF main(): Integer DO \
				   IF TRUE DO LET y = 2; END \
				   RETURN y; \
				 END",
			),
			AnalyzeError::UnknownVariable("y".to_string())
		);
		// same-scope redefinition is an error
		assert_eq!(
			rejects("DEF main(): Integer DO LET x = 1; LET x = 2; RETURN x; END"),
			AnalyzeError::Redefined("x".to_string())
		);
	}

	#[test]
	fn statement_position_requires_a_call() {
		accepts(r#"DEF main(): Integer DO print("hi"); RETURN 0; END"#);
		assert_eq!(
			rejects("DEF main(): Integer DO 1 + 2; RETURN 0; END"),
			AnalyzeError::ExpressionStatementNotCall
		);
	}

	#[test]
	fn control_flow_contracts() {
		assert_eq!(
			rejects("DEF main(): Integer DO IF 1 DO RETURN 1; END RETURN 0; END"),
			AnalyzeError::NotAssignable { target: Type::Boolean, found: Type::Integer }
		);
		assert_eq!(
			rejects("DEF main(): Integer DO IF TRUE DO END RETURN 0; END"),
			AnalyzeError::EmptyBody("IF")
		);
		assert_eq!(
			rejects("DEF main(): Integer DO FOR i IN range(1, 3) DO END RETURN 0; END"),
			AnalyzeError::EmptyBody("FOR")
		);
		assert_eq!(
			rejects("DEF main(): Integer DO FOR i IN 1 DO print(i); END RETURN 0; END"),
			AnalyzeError::NotAssignable { target: Type::IntegerIterable, found: Type::Integer }
		);
		assert_eq!(
			rejects("DEF main(): Integer DO WHILE 'a' DO print(0); END RETURN 0; END"),
			AnalyzeError::NotAssignable { target: Type::Boolean, found: Type::Character }
		);
		// the loop variable is an Integer inside the body
		accepts("DEF main(): Integer DO LET s = 0; FOR i IN range(1, 4) DO s = s + i; END RETURN s; END");
	}

	#[test]
	fn returns_check_the_declared_type() {
		assert_eq!(
			rejects("DEF f(): Integer DO RETURN 1.0; END DEF main(): Integer DO RETURN f(); END"),
			AnalyzeError::NotAssignable { target: Type::Integer, found: Type::Decimal }
		);
		// no annotation means Nil, so returning a value fails
		assert_eq!(
			rejects("DEF f() DO RETURN 1; END DEF main(): Integer DO RETURN 0; END"),
			AnalyzeError::NotAssignable { target: Type::Nil, found: Type::Integer }
		);
		accepts("DEF f() DO RETURN nil; END DEF main(): Integer DO RETURN 0; END");
	}

	#[test]
	fn calls_check_argument_types() {
		assert_eq!(
			rejects(r#"DEF main(): Integer DO FOR i IN range(1, "x") DO print(i); END RETURN 0; END"#),
			AnalyzeError::NotAssignable { target: Type::Integer, found: Type::Str }
		);
		assert_eq!(
			rejects("DEF main(): Integer DO missing(); RETURN 0; END"),
			AnalyzeError::UnknownFunction("missing".to_string(), 0)
		);
		// arity is part of the key
		assert_eq!(
			rejects("DEF f(a: Integer): Integer DO RETURN a; END \
				 DEF main(): Integer DO RETURN f(); END"),
			AnalyzeError::UnknownFunction("f".to_string(), 0)
		);
	}

	#[test]
	fn receiver_members_do_not_exist() {
		assert_eq!(
			rejects("LET x = 1; DEF main(): Integer DO RETURN x.size; END"),
			AnalyzeError::UnknownField { ty: Type::Integer, name: "size".to_string() }
		);
		assert_eq!(
			rejects("LET x = 1; DEF main(): Integer DO x.grow(2); RETURN 0; END"),
			AnalyzeError::UnknownMethod { ty: Type::Integer, name: "grow".to_string(), arity: 1 }
		);
	}

	#[test]
	fn analysis_annotates_every_expression() {
		let source = accepts("LET x: Integer = 1; DEF main(): Integer DO RETURN x + 2; END");
		assert_eq!(source.fields[0].variable.as_ref().map(|v| v.ty), Some(Type::Integer));
		let function = source.methods[0].function.as_ref().unwrap();
		assert_eq!(function.return_type, Type::Integer);
		match &source.methods[0].body[0] {
			Stmt::Return { value } => {
				assert_eq!(value.ty(), Some(Type::Integer));
				match value {
					Expr::Binary { left, right, .. } => {
						assert_eq!(left.ty(), Some(Type::Integer));
						assert_eq!(right.ty(), Some(Type::Integer));
					}
					other => panic!("expected a binary return value, got {other:?}"),
				}
			}
			other => panic!("expected a return statement, got {other:?}"),
		}
	}

	#[test]
	fn return_outside_a_method_cannot_happen_but_nested_returns_check() {
		// every grammar path to RETURN is inside a method; the nested cases
		// still check against the enclosing method's type
		assert_eq!(
			rejects(
				"DEF main(): Integer DO \
				   IF TRUE DO RETURN 1.0; END \
				   RETURN 0; \
				 END",
			),
			AnalyzeError::NotAssignable { target: Type::Integer, found: Type::Decimal }
		);
	}
}
