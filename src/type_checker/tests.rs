//! Unit tests for the binding table and the analyzer.

use std::rc::Rc;

use super::{
    table::Table,
    type_checker::{declared_type, type_check, Intrinsics},
};
use crate::{
    ast::ast::{NodeId, NodeKind, Symbol, Tree},
    errors::errors::{Error, ErrorImpl},
    lexer::lexer::tokenize,
    parser::parser::parse,
};

fn parse_tree(source: &str) -> Tree {
    let tokens = tokenize(source.to_string(), Some("test.x".to_string())).unwrap();
    let (_, result) = parse(tokens, Rc::new("test.x".to_string()));
    result.unwrap()
}

fn analyze(source: &str) -> (Tree, Result<Intrinsics, Error>) {
    let mut tree = parse_tree(source);
    let result = type_check(&mut tree);
    (tree, result)
}

fn analyze_ok(source: &str) -> (Tree, Intrinsics) {
    let (tree, result) = analyze(source);
    match result {
        Ok(intrinsics) => (tree, intrinsics),
        Err(error) => panic!("analysis of {:?} failed: {}", source, error),
    }
}

fn analyze_err(source: &str) -> Error {
    match analyze(source).1 {
        Ok(_) => panic!("expected analysis of {:?} to fail", source),
        Err(error) => error,
    }
}

fn outer_block(tree: &Tree) -> NodeId {
    tree.kid(tree.root().unwrap(), 0)
}

#[test]
fn test_table_scope_restores_bindings() {
    let mut table = Table::new();
    let x = Symbol::new("x");
    let y = Symbol::new("y");

    table.begin_scope();
    table.enter(x.clone(), NodeId(1));
    assert_eq!(table.lookup(&x), Some(NodeId(1)));
    assert_eq!(table.lookup(&y), None);

    table.begin_scope();
    table.enter(x.clone(), NodeId(2));
    table.enter(x.clone(), NodeId(3));
    table.enter(y.clone(), NodeId(4));
    assert_eq!(table.lookup(&x), Some(NodeId(3)));
    assert_eq!(table.lookup(&y), Some(NodeId(4)));
    table.end_scope();

    assert_eq!(table.lookup(&x), Some(NodeId(1)));
    assert_eq!(table.lookup(&y), None);
    assert_eq!(table.depth(), 1);

    table.end_scope();
    assert!(table.is_empty());
}

#[test]
fn test_table_end_scope_without_scope_is_noop() {
    let mut table = Table::new();
    table.end_scope();
    assert_eq!(table.depth(), 0);
    assert!(table.is_empty());
}

#[test]
fn test_literals_share_intrinsic_types() {
    let (tree, intrinsics) = analyze_ok("program { int x x = 1 + 2 x = 3 }");
    let block = outer_block(&tree);

    let sum = tree.kid(tree.kid(block, 1), 1);
    let three = tree.kid(tree.kid(block, 2), 1);
    assert_eq!(tree.decoration(sum), Some(intrinsics.int_type));
    assert_eq!(tree.decoration(three), Some(intrinsics.int_type));
    assert_eq!(tree.decoration(sum), tree.decoration(three));
}

#[test]
fn test_intrinsic_types_are_self_referential() {
    let (tree, intrinsics) = analyze_ok("program { }");

    for ty in [intrinsics.int_type, intrinsics.bool_type, intrinsics.string_type, intrinsics.hex_type] {
        assert_eq!(tree.kind(ty), &NodeKind::Decl);
        assert_eq!(declared_type(&tree, ty), ty);
    }
    assert_eq!(intrinsics.type_name(intrinsics.hex_type), "hex");
}

#[test]
fn test_uses_are_decorated_with_declarations() {
    let (tree, intrinsics) = analyze_ok("program { int x boolean b x = 5 b = x < 3 }");
    let block = outer_block(&tree);
    let (x_decl, b_decl) = (tree.kid(block, 0), tree.kid(block, 1));

    assert_eq!(tree.decoration(tree.kid(x_decl, 1)), Some(intrinsics.int_type));
    assert_eq!(tree.decoration(tree.kid(b_decl, 1)), Some(intrinsics.bool_type));

    let assign = tree.kid(block, 3);
    assert_eq!(tree.decoration(tree.kid(assign, 0)), Some(b_decl));
    let rel = tree.kid(assign, 1);
    assert_eq!(tree.decoration(rel), Some(intrinsics.bool_type));
    assert_eq!(tree.decoration(tree.kid(rel, 0)), Some(x_decl));
}

#[test]
fn test_shadowing_resolves_to_innermost() {
    let (tree, _) = analyze_ok("program { int x { int x x = 5 } x = 6 }");
    let block = outer_block(&tree);
    let outer_x = tree.kid(block, 0);
    let inner = tree.kid(block, 1);
    let inner_x = tree.kid(inner, 0);

    assert_ne!(outer_x, inner_x);
    assert_eq!(tree.decoration(tree.kid(tree.kid(inner, 1), 0)), Some(inner_x));
    assert_eq!(tree.decoration(tree.kid(tree.kid(block, 2), 0)), Some(outer_x));
}

#[test]
fn test_calls_and_returns_are_decorated() {
    let (tree, intrinsics) = analyze_ok("program { int f(int a) { return a + 1 } int y y = f(2) }");
    let block = outer_block(&tree);
    let function = tree.kid(block, 0);

    assert_eq!(tree.decoration(tree.kid(function, 0)), Some(intrinsics.int_type));
    let ret = tree.kid(tree.kid(function, 3), 0);
    assert_eq!(tree.decoration(ret), Some(function));

    let call = tree.kid(tree.kid(block, 2), 1);
    assert_eq!(tree.decoration(call), Some(intrinsics.int_type));
    assert_eq!(tree.decoration(tree.kid(call, 0)), Some(function));
}

#[test]
fn test_recursive_call_resolves() {
    analyze_ok("program { int f(int n) { if n < 1 then { return 0 } return f(n - 1) } }");
}

#[test]
fn test_intrinsic_functions_and_constants() {
    let (tree, intrinsics) = analyze_ok("program { int x boolean b x = read() x = write(x) b = true b = false }");
    let block = outer_block(&tree);

    let read_call = tree.kid(tree.kid(block, 2), 1);
    assert_eq!(tree.decoration(tree.kid(read_call, 0)), Some(intrinsics.read));
    let write_call = tree.kid(tree.kid(block, 3), 1);
    assert_eq!(tree.decoration(tree.kid(write_call, 0)), Some(intrinsics.write));

    let true_use = tree.kid(tree.kid(block, 4), 1);
    assert_eq!(tree.decoration(true_use), Some(intrinsics.true_value));
}

#[test]
fn test_select_decorations() {
    let (tree, intrinsics) = analyze_ok("program { int x select x { [1] -> { } [2] -> { x = 3 } } }");
    let block = outer_block(&tree);
    let select = tree.kid(block, 1);

    assert_eq!(tree.decoration(select), Some(intrinsics.int_type));
    for selector in tree.kids(tree.kid(select, 1)) {
        assert_eq!(tree.decoration(*selector), Some(intrinsics.int_type));
    }
}

#[test]
fn test_bad_conditional() {
    let error = analyze_err("program { if (5) then {} }");
    assert_eq!(
        error.kind(),
        &ErrorImpl::BadConditional {
            received: String::from("int")
        }
    );

    let error = analyze_err("program { int x while x { } }");
    assert_eq!(error.get_error_name(), "BadConditional");

    let error = analyze_err("program { unless @s@ then { } }");
    assert_eq!(error.get_error_name(), "BadConditional");
}

#[test]
fn test_number_actuals_formals_differ() {
    let error = analyze_err("program { int x int f(int a) { return a } x = f(1, 2) }");
    assert_eq!(
        error.kind(),
        &ErrorImpl::NumberActualsFormalsDiffer {
            expected: 1,
            received: 2
        }
    );
}

#[test]
fn test_actual_formal_type_mismatch() {
    let error = analyze_err("program { int x int f(int a) { return a } x = f(@no@) }");
    assert_eq!(
        error.kind(),
        &ErrorImpl::ActualFormalTypeMismatch {
            expected: String::from("int"),
            received: String::from("string")
        }
    );
}

#[test]
fn test_return_not_in_function() {
    let error = analyze_err("program { return 5 }");
    assert_eq!(error.kind(), &ErrorImpl::ReturnNotInFunction);
}

#[test]
fn test_bad_return_expr() {
    let error = analyze_err("program { int f() { return @s@ } }");
    assert_eq!(error.get_error_name(), "BadReturnExpr");
}

#[test]
fn test_selector_type_mismatch() {
    let error = analyze_err("program { int x select x { [true] -> {} } }");
    assert_eq!(
        error.kind(),
        &ErrorImpl::SelectorTypeMismatch {
            expected: String::from("int"),
            received: String::from("boolean")
        }
    );
}

#[test]
fn test_unbound_name() {
    let error = analyze_err("program { int x x = y }");
    assert_eq!(
        error.kind(),
        &ErrorImpl::UnboundName {
            name: String::from("y")
        }
    );
    assert_eq!(error.get_position().0, 20);
}

#[test]
fn test_inner_declarations_leave_scope() {
    let error = analyze_err("program { { int y } y = 1 }");
    assert_eq!(error.get_error_name(), "UnboundName");
}

#[test]
fn test_calling_non_function() {
    let error = analyze_err("program { int x x = x(1) }");
    assert_eq!(error.get_error_name(), "CallingNonFunction");
}

#[test]
fn test_function_used_as_variable() {
    let error = analyze_err("program { int x int f() { return 1 } x = f }");
    assert_eq!(error.get_error_name(), "NotAVariable");

    let error = analyze_err("program { int f() { return 1 } f = 2 }");
    assert_eq!(error.get_error_name(), "NotAVariable");
}

#[test]
fn test_boolean_constants_are_not_assignable() {
    let error = analyze_err("program { true = false }");
    assert_eq!(
        error.kind(),
        &ErrorImpl::NotAVariable {
            name: String::from("true")
        }
    );
    assert_eq!(error.get_position().0, 10);

    let error = analyze_err("program { boolean b b = true false = b }");
    assert_eq!(error.get_error_name(), "NotAVariable");
}

#[test]
fn test_boolean_constants_can_be_shadowed() {
    let (tree, intrinsics) =
        analyze_ok("program { boolean b { int true int y true = 3 y = true } b = true }");
    let block = outer_block(&tree);
    let inner = tree.kid(block, 1);
    let shadow = tree.kid(inner, 0);

    // Inside the block `true` is the local int
    let store = tree.kid(inner, 2);
    assert_eq!(tree.decoration(tree.kid(store, 0)), Some(shadow));
    let load = tree.kid(tree.kid(inner, 3), 1);
    assert_eq!(tree.decoration(load), Some(shadow));
    assert_eq!(declared_type(&tree, shadow), intrinsics.int_type);

    // and the constant is back once the block closes
    let outer_use = tree.kid(tree.kid(block, 2), 1);
    assert_eq!(tree.decoration(outer_use), Some(intrinsics.true_value));
}

#[test]
fn test_type_mismatch_in_expr() {
    let error = analyze_err("program { int x x = 1 + 0x1 }");
    assert_eq!(
        error.kind(),
        &ErrorImpl::TypeMismatchInExpr {
            left: String::from("int"),
            right: String::from("hex")
        }
    );
}

#[test]
fn test_boolean_expr_expected() {
    let error = analyze_err("program { int x x = x & 1 }");
    assert_eq!(
        error.kind(),
        &ErrorImpl::BooleanExprExpected {
            received: String::from("int")
        }
    );

    analyze_ok("program { boolean b b = true | b & false }");
}

#[test]
fn test_bad_assignment_type() {
    let error = analyze_err("program { string s s = 5 }");
    assert_eq!(error.get_error_name(), "BadAssignmentType");

    analyze_ok("program { string s s = @fine@ }");
}

#[test]
fn test_second_analysis_rejected() {
    let (mut tree, _) = analyze_ok("program { int x x = 1 }");
    let nodes = tree.len();

    let error = type_check(&mut tree).unwrap_err();
    assert_eq!(error.kind(), &ErrorImpl::AlreadyConstrained);
    assert_eq!(tree.len(), nodes);
}
