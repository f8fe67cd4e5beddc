//! End-to-end pipeline tests: source text in, stdout bytes out, exercised
//! both directly against the library and (for the CLI-shaped scenarios)
//! against the built `cmmc` binary through its actual `-c`/`-o`/`-r` surface.

use cmmc::{codegen, isa, lexer, parser, symtab, vm::Vm};

fn run(src: &str, stdin: &str) -> String {
    let tokens = lexer::tokenize(src).unwrap();
    let program = parser::parse(&tokens).unwrap();
    let table = symtab::build(&program);
    let code = codegen::generate(&program, &table);

    let mut input = std::io::BufReader::new(stdin.as_bytes());
    let mut output = Vec::new();
    Vm::new().run(&code, &mut input, &mut output);
    String::from_utf8(output).unwrap()
}

#[test]
fn scenario_arithmetic() {
    assert_eq!(run("void main(void) { output(1 + 2); }", ""), "3\n");
}

#[test]
fn scenario_global_assignment() {
    assert_eq!(run("int x; void main(void) { x = 5; output(x); }", ""), "5\n");
}

#[test]
fn scenario_recursive_factorial() {
    let src = "int fact(int n) { if (n <= 1) { return 1; } else { return n * fact(n - 1); } } void main(void) { output(fact(5)); }";
    assert_eq!(run(src, ""), "120\n");
}

#[test]
fn scenario_array_sum() {
    let src = "void main(void) { int a[3]; a[0]=1; a[1]=2; a[2]=3; output(a[0]+a[1]+a[2]); }";
    assert_eq!(run(src, ""), "6\n");
}

#[test]
fn scenario_while_loop_sum() {
    let src = "void main(void) { int i; int s; i=1; s=0; while (i<=10) { s=s+i; i=i+1; } output(s); }";
    assert_eq!(run(src, ""), "55\n");
}

#[test]
fn scenario_input_doubling() {
    let src = "void main(void) { int x; x = input(); output(x + x); }";
    assert_eq!(run(src, "7\n"), "14\n");
}

#[test]
fn lexical_error_is_reported_with_line_number() {
    let err = lexer::tokenize("void main(void) {\n  int x;\n  x = 1 @ 2;\n}").unwrap_err();
    let message = err.to_string();
    assert!(message.contains("line: 3"), "{message}");
}

#[test]
fn syntax_error_is_reported_with_line_number() {
    let tokens = lexer::tokenize("void main(void) {\n  int x;\n  x = ;\n}").unwrap();
    let err = parser::parse(&tokens).unwrap_err();
    assert!(err.to_string().contains("line 3"), "{err}");
}

#[test]
fn instruction_stream_round_trips_through_text_format() {
    let tokens = lexer::tokenize("void main(void) { output(1 + 2); }").unwrap();
    let program = parser::parse(&tokens).unwrap();
    let table = symtab::build(&program);
    let code = codegen::generate(&program, &table);

    let text = isa::serialize(&code);
    let decoded = isa::deserialize(&text).unwrap();
    assert_eq!(code, decoded);
}

#[test]
fn cli_compiles_and_executes_round_trip() {
    use assert_cmd::Command;
    use predicates::str::contains;
    use std::io::Write;

    let dir = tempfile::tempdir().unwrap();
    let source_path = dir.path().join("prog.cmm");
    let out_path = dir.path().join("prog.out");

    let mut source_file = std::fs::File::create(&source_path).unwrap();
    writeln!(source_file, "void main(void) {{ output(40 + 2); }}").unwrap();

    Command::cargo_bin("cmmc")
        .unwrap()
        .arg("-c")
        .arg(&source_path)
        .arg("-o")
        .arg(&out_path)
        .assert()
        .success();

    assert!(out_path.exists());

    Command::cargo_bin("cmmc")
        .unwrap()
        .arg("-r")
        .arg(&out_path)
        .assert()
        .success()
        .stdout(contains("42"));
}

#[test]
fn cli_compile_and_run_in_one_invocation() {
    use assert_cmd::Command;
    use predicates::str::contains;
    use std::io::Write;

    let dir = tempfile::tempdir().unwrap();
    let source_path = dir.path().join("prog.cmm");
    let out_path = dir.path().join("prog.out");

    let mut source_file = std::fs::File::create(&source_path).unwrap();
    writeln!(source_file, "void main(void) {{ output(1 + 2); }}").unwrap();

    Command::cargo_bin("cmmc")
        .unwrap()
        .arg("-c")
        .arg(&source_path)
        .arg("-o")
        .arg(&out_path)
        .arg("-r")
        .arg(&out_path)
        .assert()
        .success()
        .stdout(contains("3"));
}

#[test]
fn cli_reports_lexical_error_and_exits_nonzero() {
    use assert_cmd::Command;
    use std::io::Write;

    let dir = tempfile::tempdir().unwrap();
    let source_path = dir.path().join("bad.cmm");
    let mut source_file = std::fs::File::create(&source_path).unwrap();
    writeln!(source_file, "void main(void) {{ int x; x = 1 @ 2; }}").unwrap();

    Command::cargo_bin("cmmc")
        .unwrap()
        .arg("-c")
        .arg(&source_path)
        .assert()
        .failure()
        .code(1);
}

#[test]
fn cli_missing_source_file_exits_nonzero() {
    use assert_cmd::Command;

    Command::cargo_bin("cmmc")
        .unwrap()
        .arg("-c")
        .arg("/nonexistent/path/does/not/exist.cmm")
        .assert()
        .failure()
        .code(1);
}
