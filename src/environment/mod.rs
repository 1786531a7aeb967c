//! Lexical scopes, resolved symbols, and the fixed type registry.
//!
//! Scopes form a chain from the innermost block out to the root. Instead of
//! parent pointers the chain lives in an arena: every scope is a record in a
//! single `Vec`, a child carries its parent's index, and "entering" a scope
//! just moves the current index. Leaving restores the saved index, which
//! works the same on normal exits, return transfers, and errors, and keeps
//! closure invocation cheap -- a method body only needs the index of its
//! defining scope.

use std::collections::HashMap;

/// The process-wide registry of predefined types. User code cannot extend
/// it, so a closed enum is the whole registry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Type {
	Any,
	Nil,
	Comparable,
	Boolean,
	Integer,
	Decimal,
	Character,
	Str,
	IntegerIterable,
}

impl Type {
	/// Resolves a surface type name, e.g. `Integer`.
	pub fn from_name(name: &str) -> Option<Type> {
		Some(match name {
			"Any" => Type::Any,
			"Nil" => Type::Nil,
			"Comparable" => Type::Comparable,
			"Boolean" => Type::Boolean,
			"Integer" => Type::Integer,
			"Decimal" => Type::Decimal,
			"Character" => Type::Character,
			"String" => Type::Str,
			"IntegerIterable" => Type::IntegerIterable,
			_ => return None,
		})
	}

	/// The name this type has in Ember source.
	pub fn name(self) -> &'static str {
		match self {
			Type::Any => "Any",
			Type::Nil => "Nil",
			Type::Comparable => "Comparable",
			Type::Boolean => "Boolean",
			Type::Integer => "Integer",
			Type::Decimal => "Decimal",
			Type::Character => "Character",
			Type::Str => "String",
			Type::IntegerIterable => "IntegerIterable",
		}
	}

	/// The Java name the translator emits for this type.
	pub fn jvm_name(self) -> &'static str {
		match self {
			Type::Any => "Object",
			Type::Nil => "Void",
			Type::Comparable => "Comparable",
			Type::Boolean => "boolean",
			Type::Integer => "int",
			Type::Decimal => "double",
			Type::Character => "char",
			Type::Str => "String",
			Type::IntegerIterable => "Iterable<Integer>",
		}
	}

	/// True when a value of this type may be bound where `target` is
	/// expected: same type, `Any`, or `Comparable` over the four comparable
	/// primitives.
	pub fn assignable_to(self, target: Type) -> bool {
		target == self
			|| target == Type::Any
			|| (target == Type::Comparable
				&& matches!(self, Type::Integer | Type::Decimal | Type::Character | Type::Str))
	}

	/// Looks up a declared field on this type. None of the predefined types
	/// declares fields, so receiver-based access resolves to an error
	/// upstream; the seam is where a richer registry would hang members.
	pub fn field(self, _name: &str) -> Option<Variable> { None }

	/// Looks up a declared method by name and arity. Parameter 0 of a
	/// declared method is its receiver.
	pub fn method(self, _name: &str, _arity: usize) -> Option<Function> { None }
}

impl std::fmt::Display for Type {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result { f.write_str(self.name()) }
}

/// A resolved variable symbol.
#[derive(Debug, Clone, PartialEq)]
pub struct Variable {
	pub name:     String,
	/// The name the translator emits, e.g. `null` for `nil`.
	pub jvm_name: String,
	pub ty:       Type,
}

impl Variable {
	pub fn new(name: impl Into<String>, ty: Type) -> Self {
		let name = name.into();
		Self { jvm_name: name.clone(), name, ty }
	}
}

/// A resolved function symbol; functions are keyed by name and arity.
#[derive(Debug, Clone, PartialEq)]
pub struct Function {
	pub name:            String,
	/// The name the translator emits, e.g. `System.out.println` for `print`.
	pub jvm_name:        String,
	pub parameter_types: Vec<Type>,
	pub return_type:     Type,
}

impl Function {
	pub fn new(name: impl Into<String>, parameter_types: Vec<Type>, return_type: Type) -> Self {
		let name = name.into();
		Self { jvm_name: name.clone(), name, parameter_types, return_type }
	}

	pub fn with_jvm_name(mut self, jvm_name: impl Into<String>) -> Self {
		self.jvm_name = jvm_name.into();
		self
	}
}

/// Raised when a name is defined twice in the same scope.
#[derive(thiserror::Error, Debug, PartialEq, Eq)]
#[error("'{0}' is already defined in this scope")]
pub struct AlreadyDefined(pub String);

/// The scope arena. `V` is whatever a variable binds to and `F` whatever a
/// function binds to, so the analyzer stores symbols and the interpreter
/// stores runtime values and callables in the same structure.
pub struct Scopes<V, F> {
	arena:   Vec<Scope<V, F>>,
	current: usize,
}

struct Scope<V, F> {
	parent:    Option<usize>,
	variables: HashMap<String, V>,
	functions: HashMap<(String, usize), F>,
}

impl<V, F> Scope<V, F> {
	fn new(parent: Option<usize>) -> Self {
		Self { parent, variables: HashMap::new(), functions: HashMap::new() }
	}
}

impl<V, F> Default for Scopes<V, F> {
	fn default() -> Self { Self::new() }
}

impl<V, F> Scopes<V, F> {
	/// A fresh arena holding only the root scope.
	pub fn new() -> Self { Self { arena: vec![Scope::new(None)], current: 0 } }

	/// Index of the scope that defines and looks up next.
	pub fn current(&self) -> usize { self.current }

	/// Opens a child of the current scope and makes it current. Returns the
	/// previous current index for [`Scopes::restore`].
	pub fn enter_child(&mut self) -> usize { self.enter_child_of(self.current) }

	/// Opens a child of an arbitrary scope -- how a method body runs under
	/// its defining scope rather than its caller's. Returns the previous
	/// current index.
	pub fn enter_child_of(&mut self, parent: usize) -> usize {
		let previous = self.current;
		self.arena.push(Scope::new(Some(parent)));
		self.current = self.arena.len() - 1;
		previous
	}

	/// Makes a previously saved index current again. Callers invoke this on
	/// every exit path out of a child scope.
	pub fn restore(&mut self, saved: usize) { self.current = saved; }

	/// Binds a variable in the current scope only.
	pub fn define_variable(&mut self, name: &str, value: V) -> Result<(), AlreadyDefined> {
		let scope = &mut self.arena[self.current];
		if scope.variables.contains_key(name) {
			return Err(AlreadyDefined(name.to_string()));
		}
		scope.variables.insert(name.to_string(), value);
		Ok(())
	}

	/// Binds a function under (name, arity) in the current scope only.
	pub fn define_function(&mut self, name: &str, arity: usize, function: F) -> Result<(), AlreadyDefined> {
		let scope = &mut self.arena[self.current];
		let key = (name.to_string(), arity);
		if scope.functions.contains_key(&key) {
			return Err(AlreadyDefined(format!("{name}/{arity}")));
		}
		scope.functions.insert(key, function);
		Ok(())
	}

	/// Walks the chain root-ward for a variable binding.
	pub fn lookup_variable(&self, name: &str) -> Option<&V> {
		self.arena[self.containing_scope(name)?].variables.get(name)
	}

	/// Like [`Scopes::lookup_variable`], but for assignment.
	pub fn lookup_variable_mut(&mut self, name: &str) -> Option<&mut V> {
		let scope = self.containing_scope(name)?;
		self.arena[scope].variables.get_mut(name)
	}

	/// Walks the chain root-ward for a function binding.
	pub fn lookup_function(&self, name: &str, arity: usize) -> Option<&F> {
		let key = (name.to_string(), arity);
		let mut next = Some(self.current);
		while let Some(index) = next {
			let scope = &self.arena[index];
			if let Some(function) = scope.functions.get(&key) {
				return Some(function);
			}
			next = scope.parent;
		}
		None
	}

	fn containing_scope(&self, name: &str) -> Option<usize> {
		let mut next = Some(self.current);
		while let Some(index) = next {
			let scope = &self.arena[index];
			if scope.variables.contains_key(name) {
				return Some(index);
			}
			next = scope.parent;
		}
		None
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn define_and_lookup() {
		let mut scopes: Scopes<i32, ()> = Scopes::new();
		scopes.define_variable("x", 1).unwrap();
		assert_eq!(scopes.lookup_variable("x"), Some(&1));
		assert_eq!(scopes.lookup_variable("y"), None);
	}

	#[test]
	fn redefinition_is_an_error() {
		let mut scopes: Scopes<i32, ()> = Scopes::new();
		scopes.define_variable("x", 1).unwrap();
		assert_eq!(scopes.define_variable("x", 2), Err(AlreadyDefined("x".to_string())));
	}

	#[test]
	fn child_scopes_shadow_and_release() {
		let mut scopes: Scopes<i32, ()> = Scopes::new();
		scopes.define_variable("x", 1).unwrap();
		let saved = scopes.enter_child();
		scopes.define_variable("x", 2).unwrap();
		scopes.define_variable("y", 3).unwrap();
		assert_eq!(scopes.lookup_variable("x"), Some(&2));
		assert_eq!(scopes.lookup_variable("y"), Some(&3));
		scopes.restore(saved);
		assert_eq!(scopes.lookup_variable("x"), Some(&1));
		assert_eq!(scopes.lookup_variable("y"), None);
	}

	#[test]
	fn assignment_writes_the_defining_scope() {
		let mut scopes: Scopes<i32, ()> = Scopes::new();
		scopes.define_variable("x", 1).unwrap();
		let saved = scopes.enter_child();
		*scopes.lookup_variable_mut("x").unwrap() = 9;
		scopes.restore(saved);
		assert_eq!(scopes.lookup_variable("x"), Some(&9));
	}

	#[test]
	fn functions_resolve_by_name_and_arity() {
		let mut scopes: Scopes<(), i32> = Scopes::new();
		scopes.define_function("f", 0, 10).unwrap();
		scopes.define_function("f", 2, 20).unwrap();
		assert_eq!(scopes.lookup_function("f", 0), Some(&10));
		assert_eq!(scopes.lookup_function("f", 2), Some(&20));
		assert_eq!(scopes.lookup_function("f", 1), None);
		assert_eq!(scopes.define_function("f", 0, 30), Err(AlreadyDefined("f/0".to_string())));
	}

	#[test]
	fn closure_scopes_chain_to_their_parent() {
		let mut scopes: Scopes<i32, ()> = Scopes::new();
		scopes.define_variable("global", 1).unwrap();
		let defining = scopes.current();
		// simulate a caller frame that defines its own name
		let saved = scopes.enter_child();
		scopes.define_variable("local", 2).unwrap();
		// a method invoked from here still chains to its defining scope
		let inner = scopes.enter_child_of(defining);
		assert_eq!(scopes.lookup_variable("global"), Some(&1));
		assert_eq!(scopes.lookup_variable("local"), None);
		scopes.restore(inner);
		assert_eq!(scopes.lookup_variable("local"), Some(&2));
		scopes.restore(saved);
	}

	#[test]
	fn type_names_round_trip() {
		for ty in [
			Type::Any,
			Type::Nil,
			Type::Comparable,
			Type::Boolean,
			Type::Integer,
			Type::Decimal,
			Type::Character,
			Type::Str,
			Type::IntegerIterable,
		] {
			assert_eq!(Type::from_name(ty.name()), Some(ty));
		}
		assert_eq!(Type::from_name("Object"), None);
	}

	#[test]
	fn assignability() {
		assert!(Type::Integer.assignable_to(Type::Integer));
		assert!(Type::Integer.assignable_to(Type::Any));
		assert!(Type::Integer.assignable_to(Type::Comparable));
		assert!(Type::Str.assignable_to(Type::Comparable));
		assert!(!Type::Boolean.assignable_to(Type::Comparable));
		assert!(!Type::Nil.assignable_to(Type::Comparable));
		assert!(!Type::Integer.assignable_to(Type::Decimal));
		assert!(!Type::Any.assignable_to(Type::Integer));
	}
}
