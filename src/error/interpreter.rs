use crate::environment::AlreadyDefined;

/// Errors that can occur during interpretation
#[derive(thiserror::Error, Debug)]
pub enum RuntimeError {
	/// A value of the wrong runtime kind reached an operation
	#[error("expected a {expected} value, found {found}")]
	ExpectedType { expected: &'static str, found: &'static str },
	/// Error for invalid binary operations
	#[error("operator '{op}' cannot combine {left} and {right} values")]
	InvalidOperands {
		op:    String,
		left:  &'static str,
		right: &'static str,
	},
	#[error("division by zero")]
	DivisionByZero,
	#[error("undefined variable '{0}'")]
	UndefinedVariable(String),
	#[error("undefined function '{0}/{1}'")]
	UndefinedFunction(String, usize),
	#[error("a {kind} value has no field '{name}'")]
	UnknownField { kind: &'static str, name: String },
	#[error("a {kind} value has no method '{name}/{arity}'")]
	UnknownMethod {
		kind:  &'static str,
		name:  String,
		arity: usize,
	},
	#[error("'{0}' is already defined in this scope")]
	Redefined(String),
	#[error("only a variable or field may be assigned")]
	InvalidAssignmentTarget,
	#[error("unknown operator '{0}'")]
	UnknownOperator(String),
	#[error("failed to write output")]
	Io(#[from] std::io::Error),
}

impl From<AlreadyDefined> for RuntimeError {
	fn from(error: AlreadyDefined) -> Self { RuntimeError::Redefined(error.0) }
}
