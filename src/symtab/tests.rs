use super::{build, GLOBAL_SCOPE};
use crate::lexer::tokenize;
use crate::parser::parse;

fn table_for(src: &str) -> super::SymbolTable {
    let tokens = tokenize(src).unwrap();
    let program = parse(&tokens).unwrap();
    build(&program)
}

#[test]
fn globals_get_ascending_slots_by_declaration_order() {
    let table = table_for("int a; int b[3]; int c; void main(void) { }");
    let globals = table.function(GLOBAL_SCOPE).unwrap();
    assert_eq!(globals.get("a").unwrap().slot, 0);
    assert_eq!(globals.get("b").unwrap().slot, 1);
    assert_eq!(globals.get("b").unwrap().array_len, 3);
    // b occupies slots 1..=4 (pointer + 3 elements), so c starts at 5.
    assert_eq!(globals.get("c").unwrap().slot, 5);
}

#[test]
fn params_precede_locals_in_same_function() {
    let table = table_for("int f(int a, int b) { int c; return a + b + c; }");
    let scope = table.function("f").unwrap();
    assert_eq!(scope.get("a").unwrap().slot, 0);
    assert_eq!(scope.get("b").unwrap().slot, 1);
    assert_eq!(scope.get("c").unwrap().slot, 2);
}

#[test]
fn array_local_reserves_length_plus_one_slots() {
    let table = table_for("void f(void) { int arr[4]; int after; return; }");
    let scope = table.function("f").unwrap();
    assert_eq!(scope.get("arr").unwrap().slot, 0);
    assert_eq!(scope.get("arr").unwrap().array_len, 4);
    assert_eq!(scope.get("after").unwrap().slot, 5);
}

#[test]
fn local_shadows_global_on_resolve() {
    let table = table_for("int x; void f(void) { int x; return; } void main(void) { }");
    let (slot, is_global) = table.resolve("f", "x").unwrap();
    assert!(!is_global);
    assert_eq!(slot.slot, 0);

    let (_, is_global) = table.resolve("main", "x").unwrap();
    assert!(is_global);
}

#[test]
fn array_param_is_scalar_pointer_slot() {
    let table = table_for("void f(int a[]) { return; }");
    let scope = table.function("f").unwrap();
    assert_eq!(scope.get("a").unwrap().array_len, 0);
}
