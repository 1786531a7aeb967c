//! The tree the whole pipeline shares.
//!
//! The parser builds these nodes untyped; the analyzer fills in the
//! `Option` type and symbol annotations and never touches the shape. After
//! analysis every expression has a type and every name-bearing node has its
//! resolved symbol, and both back ends read the same tree.
//!
//! `Expr` renders as a parenthesized prefix form, e.g. `(+ 1 (* 2 3))`,
//! which the parser tests assert against.

use bigdecimal::BigDecimal;
use num_bigint::BigInt;

use crate::environment::{Function, Type, Variable};

/// A complete compilation unit: fields first, then methods.
#[derive(Debug, PartialEq)]
pub struct Source {
	pub fields:  Vec<Field>,
	pub methods: Vec<Method>,
}

/// A top-level `LET`, e.g. `LET x: Integer = 1;`.
#[derive(Debug, PartialEq)]
pub struct Field {
	pub name:      String,
	pub type_name: Option<String>,
	pub value:     Option<Expr>,
	/// Resolved by the analyzer.
	pub variable:  Option<Variable>,
}

/// A `DEF`, e.g. `DEF area(w: Integer, h: Integer): Integer DO ... END`.
#[derive(Debug, PartialEq)]
pub struct Method {
	pub name:                 String,
	pub parameters:           Vec<String>,
	/// One entry per parameter; the grammar makes each optional, the
	/// analyzer requires them all.
	pub parameter_type_names: Vec<Option<String>>,
	pub return_type_name:     Option<String>,
	pub body:                 Vec<Stmt>,
	/// Resolved by the analyzer.
	pub function:             Option<Function>,
}

/// A statement.
#[derive(Debug, PartialEq)]
pub enum Stmt {
	/// A call in statement position; anything else there is a static error.
	Expression(Expr),
	/// `LET name: Type = value;`
	Declaration {
		name:      String,
		type_name: Option<String>,
		value:     Option<Expr>,
		variable:  Option<Variable>,
	},
	/// `receiver = value;` -- the receiver must be an access expression.
	Assignment { receiver: Expr, value: Expr },
	/// `IF condition DO ... ELSE ... END`
	If {
		condition: Expr,
		then_body: Vec<Stmt>,
		else_body: Vec<Stmt>,
	},
	/// `FOR name IN iterable DO ... END`
	For {
		name:     String,
		iterable: Expr,
		body:     Vec<Stmt>,
	},
	/// `WHILE condition DO ... END`
	While { condition: Expr, body: Vec<Stmt> },
	/// `RETURN value;`
	Return { value: Expr },
}

/// An expression. Every variant carries its resolved type after analysis;
/// `Access` and `Function` carry it through their resolved symbol.
#[derive(Debug, PartialEq)]
pub enum Expr {
	Literal {
		value: Literal,
		ty:    Option<Type>,
	},
	/// A parenthesized expression; must wrap a `Binary`.
	Group { inner: Box<Expr>, ty: Option<Type> },
	Binary {
		op:    String,
		left:  Box<Expr>,
		right: Box<Expr>,
		ty:    Option<Type>,
	},
	/// A variable read, or a field read off a receiver.
	Access {
		receiver: Option<Box<Expr>>,
		name:     String,
		variable: Option<Variable>,
	},
	/// A function call, or a method call off a receiver.
	Function {
		receiver:  Option<Box<Expr>>,
		name:      String,
		arguments: Vec<Expr>,
		function:  Option<Function>,
	},
}

impl Expr {
	pub fn literal(value: Literal) -> Expr { Expr::Literal { value, ty: None } }

	pub fn group(inner: Expr) -> Expr { Expr::Group { inner: Box::new(inner), ty: None } }

	pub fn binary(op: impl Into<String>, left: Expr, right: Expr) -> Expr {
		Expr::Binary { op: op.into(), left: Box::new(left), right: Box::new(right), ty: None }
	}

	pub fn access(receiver: Option<Expr>, name: impl Into<String>) -> Expr {
		Expr::Access { receiver: receiver.map(Box::new), name: name.into(), variable: None }
	}

	pub fn function(receiver: Option<Expr>, name: impl Into<String>, arguments: Vec<Expr>) -> Expr {
		Expr::Function { receiver: receiver.map(Box::new), name: name.into(), arguments, function: None }
	}

	/// The resolved type of this expression; `None` until analysis.
	pub fn ty(&self) -> Option<Type> {
		match self {
			Expr::Literal { ty, .. } | Expr::Group { ty, .. } | Expr::Binary { ty, .. } => *ty,
			Expr::Access { variable, .. } => variable.as_ref().map(|variable| variable.ty),
			Expr::Function { function, .. } => function.as_ref().map(|function| function.return_type),
		}
	}
}

/// A literal value as parsed from source. Numbers keep arbitrary precision
/// here; range checks happen in the analyzer.
#[derive(Debug, Clone, PartialEq)]
pub enum Literal {
	Nil,
	Boolean(bool),
	Character(char),
	Str(String),
	Integer(BigInt),
	Decimal(BigDecimal),
}

impl std::fmt::Display for Expr {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		match self {
			Expr::Literal { value, .. } => write!(f, "{value}"),
			Expr::Group { inner, .. } => write!(f, "(group {inner})"),
			Expr::Binary { op, left, right, .. } => write!(f, "({op} {left} {right})"),
			Expr::Access { receiver: Some(receiver), name, .. } => write!(f, "(. {receiver} {name})"),
			Expr::Access { receiver: None, name, .. } => write!(f, "{name}"),
			Expr::Function { receiver, name, arguments, .. } => {
				if let Some(receiver) = receiver {
					write!(f, "(. {receiver} ")?;
				}
				write!(f, "({name}")?;
				for argument in arguments {
					write!(f, " {argument}")?;
				}
				write!(f, ")")?;
				if receiver.is_some() {
					write!(f, ")")?;
				}
				Ok(())
			}
		}
	}
}

impl std::fmt::Display for Literal {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		match self {
			Literal::Nil => write!(f, "nil"),
			Literal::Boolean(value) => write!(f, "{value}"),
			Literal::Character(value) => write!(f, "'{value}'"),
			Literal::Str(value) => write!(f, "\"{value}\""),
			Literal::Integer(value) => write!(f, "{value}"),
			Literal::Decimal(value) => write!(f, "{value}"),
		}
	}
}
