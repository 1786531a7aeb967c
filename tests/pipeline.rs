//! End-to-end runs of the whole pipeline through the public driver.

use ember::{Ember, EmberError};

/// Interprets a program, returning the exit code and captured output.
fn run(source: &str) -> ember::Result<(i32, String)> {
	let mut out = Vec::new();
	let code = Ember.run(source, &mut out)?;
	Ok((code, String::from_utf8(out).expect("print emits UTF-8")))
}

fn translate(source: &str) -> String {
	let mut out = Vec::new();
	Ember.translate(source, &mut out).expect("translation should succeed");
	String::from_utf8(out).expect("the translator emits UTF-8")
}

#[test]
fn field_initializer_feeds_main() {
	let source = "LET x: Integer = 1; DEF main(): Integer DO RETURN x + 2; END";
	let (code, output) = run(source).unwrap();
	assert_eq!(code, 3);
	assert_eq!(output, "");

	let java = translate(source);
	assert!(java.contains("    int x = 1;\n"), "got:\n{java}");
	assert!(java.contains("    int main() {\n        return x + 2;\n    }\n"), "got:\n{java}");
}

#[test]
fn if_statement_picks_the_then_branch() {
	let (code, _) = run("DEF main(): Integer DO IF TRUE DO RETURN 1; ELSE RETURN 0; END END").unwrap();
	assert_eq!(code, 1);
}

#[test]
fn for_loop_sums_a_range() {
	let (code, _) = run(
		"DEF main(): Integer DO \
		   LET s = 0; \
		   FOR i IN range(1, 4) DO LET t = i; s = s + t; END \
		   RETURN s; \
		 END",
	)
	.unwrap();
	assert_eq!(code, 6);
}

#[test]
fn print_writes_a_line() {
	let source = r#"DEF main(): Integer DO print("hi"); RETURN 0; END"#;
	let (code, output) = run(source).unwrap();
	assert_eq!(code, 0);
	assert_eq!(output, "hi\n");
	assert!(translate(source).contains(r#"System.out.println("hi");"#));
}

#[test]
fn decimal_main_is_rejected_but_division_rounds_half_even() {
	// a Decimal main fails the main/0 contract
	assert!(matches!(
		run("DEF main(): Decimal DO RETURN 1.0 / 2.0; END"),
		Err(EmberError::Analyze(_))
	));
	// the same division behind an Integer main shows the rounding
	let (code, output) = run(
		"DEF half(): Decimal DO RETURN 1.0 / 2.0; END \
		 DEF main(): Integer DO print(half()); RETURN 0; END",
	)
	.unwrap();
	assert_eq!(code, 0);
	assert_eq!(output, "0.5\n");
}

#[test]
fn integer_plus_string_fails_on_the_return_type() {
	assert!(matches!(
		run(r#"DEF main(): Integer DO RETURN 1 + "x"; END"#),
		Err(EmberError::Analyze(_))
	));
}

#[test]
fn every_phase_reports_its_own_error() {
	assert!(matches!(run("LET bad = 'ab';"), Err(EmberError::Lex(_))));
	assert!(matches!(run("DEF main( DO END"), Err(EmberError::Parse(_))));
	assert!(matches!(run("DEF main(): Integer DO RETURN missing; END"), Err(EmberError::Analyze(_))));
	assert!(matches!(
		run("DEF main(): Integer DO RETURN 1 / 0; END"),
		Err(EmberError::Runtime(_))
	));
}

#[test]
fn translated_and_interpreted_views_agree_on_shape() {
	let source = "LET limit: Integer = 10; \
		 DEF twice(n: Integer): Integer DO RETURN n * 2; END \
		 DEF main(): Integer DO \
		   LET total = 0; \
		   WHILE total < limit DO total = total + twice(1); END \
		   RETURN total; \
		 END";
	let (code, _) = run(source).unwrap();
	assert_eq!(code, 10);

	let java = translate(source);
	assert!(java.contains("    int limit = 10;\n"), "got:\n{java}");
	assert!(java.contains("    int twice(int n) {\n"), "got:\n{java}");
	assert!(java.contains("        while (total < limit) {\n"), "got:\n{java}");
	assert!(java.contains("            total = total + twice(1);\n"), "got:\n{java}");
}

#[test]
fn exit_codes_flow_from_main() {
	let (code, _) = run("DEF main(): Integer DO RETURN 42; END").unwrap();
	assert_eq!(code, 42);
	let (code, _) = run("DEF main(): Integer DO RETURN 0 - 7; END").unwrap();
	assert_eq!(code, -7);
}
