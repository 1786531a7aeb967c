use bigdecimal::BigDecimal;
use num_bigint::BigInt;

use crate::environment::{AlreadyDefined, Type};

/// Errors raised while resolving and type-checking a source tree.
///
/// Analysis errors carry no input position; the analyzer works on the tree,
/// not the text.
#[derive(thiserror::Error, Debug, PartialEq)]
pub enum AnalyzeError {
	#[error("unknown type '{0}'")]
	UnknownType(String),
	#[error("unknown variable '{0}'")]
	UnknownVariable(String),
	#[error("unknown function '{0}/{1}'")]
	UnknownFunction(String, usize),
	#[error("type {ty} has no field '{name}'")]
	UnknownField { ty: Type, name: String },
	#[error("type {ty} has no method '{name}/{arity}'")]
	UnknownMethod { ty: Type, name: String, arity: usize },
	#[error("'{0}' is already defined in this scope")]
	Redefined(String),
	#[error("expected {target}, found {found}")]
	NotAssignable { target: Type, found: Type },
	#[error("operator '{op}' cannot combine {left} and {right}")]
	OperandMismatch { op: String, left: Type, right: Type },
	#[error("unknown operator '{0}'")]
	UnknownOperator(String),
	#[error("a main method of zero parameters is required")]
	MissingMain,
	#[error("the main method must return Integer, not {0}")]
	MainMustReturnInteger(Type),
	#[error("integer literal {0} does not fit a 32-bit integer")]
	IntegerOutOfRange(BigInt),
	#[error("decimal literal {0} does not fit a 64-bit double")]
	DecimalOutOfRange(BigDecimal),
	#[error("only calls may stand alone as statements")]
	ExpressionStatementNotCall,
	#[error("only a variable or field may be assigned")]
	AssignmentTargetNotAccess,
	#[error("a group must wrap a binary expression")]
	GroupNotBinary,
	#[error("the body of {0} must not be empty")]
	EmptyBody(&'static str),
	#[error("'{0}' needs a declared type or an initial value")]
	MissingTypeOrValue(String),
	#[error("parameter '{parameter}' of method '{method}' needs a declared type")]
	MissingParameterType { method: String, parameter: String },
	#[error("RETURN is only allowed inside a method")]
	ReturnOutsideMethod,
}

impl From<AlreadyDefined> for AnalyzeError {
	fn from(error: AlreadyDefined) -> Self { AnalyzeError::Redefined(error.0) }
}
