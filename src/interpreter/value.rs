use std::{cmp::Ordering, fmt::Display};

use bigdecimal::{BigDecimal, RoundingMode};
use num_bigint::BigInt;
use num_traits::Zero;

use crate::{ast::Literal, error::interpreter::RuntimeError};

/// A runtime value. Equality is structural on the underlying host value;
/// arithmetic keeps arbitrary precision.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
	Nil,
	Boolean(bool),
	Character(char),
	Str(String),
	Integer(BigInt),
	Decimal(BigDecimal),
	Iterable(IntegerRange),
}

impl Value {
	/// A short name for error messages.
	pub fn kind(&self) -> &'static str {
		match self {
			Value::Nil => "Nil",
			Value::Boolean(_) => "Boolean",
			Value::Character(_) => "Character",
			Value::Str(_) => "String",
			Value::Integer(_) => "Integer",
			Value::Decimal(_) => "Decimal",
			Value::Iterable(_) => "IntegerIterable",
		}
	}

	pub fn as_boolean(&self) -> Result<bool, RuntimeError> {
		match self {
			Value::Boolean(value) => Ok(*value),
			other => Err(RuntimeError::ExpectedType { expected: "Boolean", found: other.kind() }),
		}
	}

	pub fn into_integer(self) -> Result<BigInt, RuntimeError> {
		match self {
			Value::Integer(value) => Ok(value),
			other => Err(RuntimeError::ExpectedType { expected: "Integer", found: other.kind() }),
		}
	}

	/// `+`: concatenation when either side is a string (the other side is
	/// coerced through its display form), exact numeric addition otherwise.
	pub fn add(&self, other: &Value) -> Result<Value, RuntimeError> {
		match (self, other) {
			(Value::Str(_), _) | (_, Value::Str(_)) => Ok(Value::Str(format!("{self}{other}"))),
			(Value::Integer(left), Value::Integer(right)) => Ok(Value::Integer(left + right)),
			(Value::Decimal(left), Value::Decimal(right)) => Ok(Value::Decimal(left + right)),
			_ => Err(self.invalid_operands("+", other)),
		}
	}

	pub fn subtract(&self, other: &Value) -> Result<Value, RuntimeError> {
		match (self, other) {
			(Value::Integer(left), Value::Integer(right)) => Ok(Value::Integer(left - right)),
			(Value::Decimal(left), Value::Decimal(right)) => Ok(Value::Decimal(left - right)),
			_ => Err(self.invalid_operands("-", other)),
		}
	}

	pub fn multiply(&self, other: &Value) -> Result<Value, RuntimeError> {
		match (self, other) {
			(Value::Integer(left), Value::Integer(right)) => Ok(Value::Integer(left * right)),
			(Value::Decimal(left), Value::Decimal(right)) => Ok(Value::Decimal(left * right)),
			_ => Err(self.invalid_operands("*", other)),
		}
	}

	/// `/`: integer division truncates toward zero; decimal division rounds
	/// half-to-even at the dividend's scale. Zero divisors fail.
	pub fn divide(&self, other: &Value) -> Result<Value, RuntimeError> {
		match (self, other) {
			(Value::Integer(left), Value::Integer(right)) => {
				if right.is_zero() {
					return Err(RuntimeError::DivisionByZero);
				}
				Ok(Value::Integer(left / right))
			}
			(Value::Decimal(left), Value::Decimal(right)) => {
				if right.is_zero() {
					return Err(RuntimeError::DivisionByZero);
				}
				let quotient = left / right;
				Ok(Value::Decimal(
					quotient.with_scale_round(left.fractional_digit_count(), RoundingMode::HalfEven),
				))
			}
			_ => Err(self.invalid_operands("/", other)),
		}
	}

	/// Orders two values of the same runtime kind; anything else is a
	/// dispatch failure.
	pub fn compare(&self, op: &str, other: &Value) -> Result<Ordering, RuntimeError> {
		Ok(match (self, other) {
			(Value::Integer(left), Value::Integer(right)) => left.cmp(right),
			(Value::Decimal(left), Value::Decimal(right)) => left.cmp(right),
			(Value::Character(left), Value::Character(right)) => left.cmp(right),
			(Value::Str(left), Value::Str(right)) => left.cmp(right),
			_ => return Err(self.invalid_operands(op, other)),
		})
	}

	fn invalid_operands(&self, op: &str, other: &Value) -> RuntimeError {
		RuntimeError::InvalidOperands { op: op.to_string(), left: self.kind(), right: other.kind() }
	}
}

impl From<&Literal> for Value {
	fn from(literal: &Literal) -> Self {
		match literal {
			Literal::Nil => Value::Nil,
			Literal::Boolean(value) => Value::Boolean(*value),
			Literal::Character(value) => Value::Character(*value),
			Literal::Str(value) => Value::Str(value.clone()),
			Literal::Integer(value) => Value::Integer(value.clone()),
			Literal::Decimal(value) => Value::Decimal(value.clone()),
		}
	}
}

impl Display for Value {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		match self {
			Value::Nil => write!(f, "nil"),
			Value::Boolean(value) => write!(f, "{value}"),
			Value::Character(value) => write!(f, "{value}"),
			Value::Str(value) => write!(f, "{value}"),
			Value::Integer(value) => write!(f, "{value}"),
			Value::Decimal(value) => write!(f, "{value}"),
			Value::Iterable(range) => write!(f, "range({}, {})", range.next, range.end),
		}
	}
}

/// A finite, non-restartable sequence of integers, as produced by the
/// `range` builtin. The `FOR` driver pulls one element at a time.
#[derive(Debug, Clone, PartialEq)]
pub struct IntegerRange {
	next: BigInt,
	end:  BigInt,
}

impl IntegerRange {
	/// The half-open range `[start, end)`.
	pub fn new(start: BigInt, end: BigInt) -> Self { Self { next: start, end } }
}

impl Iterator for IntegerRange {
	type Item = BigInt;

	fn next(&mut self) -> Option<BigInt> {
		if self.next >= self.end {
			return None;
		}
		let value = self.next.clone();
		self.next += 1;
		Some(value)
	}
}
