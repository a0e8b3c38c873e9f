//! Unit tests for frame bookkeeping and bytecode emission.

use std::rc::Rc;

use super::{
    bytecode::{Code, Literal, Program},
    compiler::compile,
    frame::Frames,
};
use crate::{
    ast::ast::{NodeId, Operator, Tree},
    lexer::lexer::tokenize,
    parser::parser::parse,
    type_checker::type_checker::type_check,
};

fn compile_source(source: &str) -> (Tree, Program) {
    let tokens = tokenize(source.to_string(), Some("test.x".to_string())).unwrap();
    let (_, result) = parse(tokens, Rc::new("test.x".to_string()));
    let mut tree = result.unwrap();
    let intrinsics = type_check(&mut tree).unwrap();
    let program = compile(&mut tree, &intrinsics);
    (tree, program)
}

/// Listing lines after the program's entry label.
fn body_listing(program: &Program) -> Vec<String> {
    let lines: Vec<String> = program.codes().iter().map(|code| code.to_string()).collect();
    let start = lines
        .iter()
        .position(|line| line == "LABEL start<<1>>")
        .expect("program has an entry label");
    lines[start + 1..].to_vec()
}

fn outer_block(tree: &Tree) -> NodeId {
    tree.kid(tree.root().unwrap(), 0)
}

#[test]
fn test_frames_track_nested_blocks() {
    let mut frames = Frames::new();
    frames.open_frame();
    frames.change(2);

    frames.open_block();
    frames.change(1);
    assert_eq!(frames.size(), 3);

    frames.open_block();
    frames.change(1);
    assert_eq!(frames.size(), 4);
    assert_eq!(frames.block_size(), 1);

    assert_eq!(frames.close_block(), 1);
    assert_eq!(frames.size(), 3);
    assert_eq!(frames.block_size(), 1);

    frames.close_frame();
    assert!(frames.is_empty());
}

#[test]
fn test_frames_are_independent() {
    let mut frames = Frames::new();
    frames.open_frame();
    frames.change(3);

    frames.open_frame();
    assert_eq!(frames.size(), 0);
    frames.change(1);
    frames.close_frame();

    assert_eq!(frames.size(), 3);
}

#[test]
#[should_panic(expected = "frame size went negative")]
fn test_negative_frame_size_is_fatal() {
    let mut frames = Frames::new();
    frames.open_frame();
    frames.change(-1);
    frames.size();
}

#[test]
fn test_code_stack_effects() {
    assert_eq!(Code::Pop(3).frame_change(), -3);
    assert_eq!(Code::Args(2).frame_change(), -2);
    assert_eq!(Code::Lit(Literal::Int(7)).frame_change(), 1);
    assert_eq!(Code::Bop(Operator::Plus).frame_change(), -1);
    assert_eq!(Code::Call(String::from("f<<2>>")).frame_change(), 1);
    assert_eq!(Code::Write.frame_change(), 0);
    assert_eq!(Code::Label(String::from("x")).frame_change(), 0);
}

#[test]
fn test_code_display() {
    let codes = vec![
        (Code::Lit(Literal::Named { value: 0, name: String::from("x") }), "LIT 0 x"),
        (Code::Lit(Literal::Str(String::from("hi"))), "LIT \"hi\""),
        (Code::Lit(Literal::Int(-4)), "LIT -4"),
        (Code::Store { offset: 2, name: String::from("y") }, "STORE 2 y"),
        (Code::Call(String::from("f<<3>>")), "CALL f<<3>>"),
        (Code::Bop(Operator::NotEqual), "BOP !="),
        (Code::Pop(0), "POP 0"),
        (Code::Halt, "HALT"),
    ];

    for (code, expected) in codes {
        assert_eq!(code.to_string(), expected);
    }
}

#[test]
fn test_empty_program_layout() {
    let (_, program) = compile_source("program { }");

    assert_eq!(
        program.to_string(),
        "GOTO start<<1>>\n\
         LABEL Read\n\
         READ\n\
         RETURN Read\n\
         LABEL Write\n\
         LOAD 0 dummyFormal\n\
         WRITE\n\
         RETURN Write\n\
         LABEL start<<1>>\n\
         POP 0\n\
         HALT\n"
    );
}

#[test]
fn test_declaration_and_assignment() {
    let (_, program) = compile_source("program { int x string s x = 5 s = @hi@ }");

    assert_eq!(
        body_listing(&program),
        vec!["LIT 0 x", "LIT 0 s", "LIT 5", "STORE 0 x", "LIT \"hi\"", "STORE 1 s", "POP 2", "HALT"]
    );
}

#[test]
fn test_offsets_follow_declaration_order() {
    let (tree, program) =
        compile_source("program { int f(int a, int b) { int c { int d d = a } return c } }");
    let function = tree.kid(outer_block(&tree), 0);
    let formals = tree.kid(function, 2);
    let body = tree.kid(function, 3);
    let inner = tree.kid(body, 1);

    let offset = |decl: NodeId| tree.frame_offset(tree.kid(decl, 1));
    assert_eq!(offset(tree.kid(formals, 0)), Some(0));
    assert_eq!(offset(tree.kid(formals, 1)), Some(1));
    assert_eq!(offset(tree.kid(body, 0)), Some(2));
    assert_eq!(offset(tree.kid(inner, 0)), Some(3));

    assert_eq!(
        body_listing(&program),
        vec![
            "GOTO continue<<3>>",
            "LABEL f<<2>>",
            "LIT 0 c",
            "LIT 0 d",
            "LOAD 0 a",
            "STORE 3 d",
            "POP 1",
            "LOAD 2 c",
            "RETURN f<<2>>",
            "POP 1",
            "LABEL continue<<3>>",
            "POP 0",
            "HALT",
        ]
    );
}

#[test]
fn test_while_shape() {
    let (_, program) = compile_source("program { int x while (x < 10) { x = x + 1 } }");

    assert_eq!(
        body_listing(&program),
        vec![
            "LIT 0 x",
            "LABEL while<<3>>",
            "LOAD 0 x",
            "LIT 10",
            "BOP <",
            "FALSEBRANCH continue<<2>>",
            "LOAD 0 x",
            "LIT 1",
            "BOP +",
            "STORE 0 x",
            "POP 0",
            "GOTO while<<3>>",
            "LABEL continue<<2>>",
            "POP 1",
            "HALT",
        ]
    );
}

#[test]
fn test_if_else_shape() {
    let (_, program) = compile_source("program { int x if x == 0 then { x = 1 } else { x = 0x1F } }");

    assert_eq!(
        body_listing(&program),
        vec![
            "LIT 0 x",
            "LOAD 0 x",
            "LIT 0",
            "BOP ==",
            "FALSEBRANCH else<<2>>",
            "LIT 1",
            "STORE 0 x",
            "POP 0",
            "GOTO continue<<3>>",
            "LABEL else<<2>>",
            "LIT 31",
            "STORE 0 x",
            "POP 0",
            "LABEL continue<<3>>",
            "POP 1",
            "HALT",
        ]
    );
}

#[test]
fn test_if_without_else_branches_to_continue() {
    let (_, program) = compile_source("program { boolean b if b then { b = false } }");

    let listing = body_listing(&program);
    assert_eq!(listing[2], "FALSEBRANCH continue<<3>>");
    assert!(!listing.iter().any(|line| line.starts_with("LABEL else")));
    assert_eq!(listing[3], "LIT 0 false");
}

#[test]
fn test_unless_runs_block_when_false() {
    let (_, program) = compile_source("program { boolean b unless b then { b = true } }");

    assert_eq!(
        body_listing(&program),
        vec![
            "LIT 0 b",
            "LOAD 0 b",
            "FALSEBRANCH unless<<2>>",
            "GOTO continue<<3>>",
            "LABEL unless<<2>>",
            "LIT 1 true",
            "STORE 0 b",
            "POP 0",
            "LABEL continue<<3>>",
            "POP 1",
            "HALT",
        ]
    );
}

#[test]
fn test_select_compares_each_guard() {
    let (_, program) = compile_source("program { int x select x { [1] -> { x = 2 } [2] -> { } } }");

    assert_eq!(
        body_listing(&program),
        vec![
            "LIT 0 x",
            "LOAD 0 x",
            "LIT 1",
            "BOP ==",
            "FALSEBRANCH next<<3>>",
            "LIT 2",
            "STORE 0 x",
            "POP 0",
            "GOTO end<<2>>",
            "LABEL next<<3>>",
            "LOAD 0 x",
            "LIT 2",
            "BOP ==",
            "FALSEBRANCH next<<4>>",
            "POP 0",
            "GOTO end<<2>>",
            "LABEL next<<4>>",
            "LABEL end<<2>>",
            "POP 1",
            "HALT",
        ]
    );
}

#[test]
fn test_calls_to_user_and_intrinsic_functions() {
    let (_, program) = compile_source("program { int x int f(int a) { return a } x = f(read()) x = write(x) }");

    assert_eq!(
        body_listing(&program),
        vec![
            "LIT 0 x",
            "GOTO continue<<3>>",
            "LABEL f<<2>>",
            "LOAD 0 a",
            "RETURN f<<2>>",
            "POP 0",
            "LABEL continue<<3>>",
            "ARGS 0",
            "CALL Read",
            "ARGS 1",
            "CALL f<<2>>",
            "STORE 0 x",
            "LOAD 0 x",
            "ARGS 1",
            "CALL Write",
            "STORE 0 x",
            "POP 1",
            "HALT",
        ]
    );
}

#[test]
fn test_trailing_return_only_when_needed() {
    let (_, program) = compile_source("program { int f(int a) { if a < 1 then { return 1 } } }");
    let listing = body_listing(&program);
    let end = listing.iter().position(|line| line == "LABEL continue<<3>>").unwrap();
    assert_eq!(listing[end - 2], "LIT 0");
    assert_eq!(listing[end - 1], "RETURN f<<2>>");

    let (_, program) =
        compile_source("program { int f(int a) { if a < 1 then { return 1 } else { return 2 } } }");
    let listing = body_listing(&program);
    assert!(!listing.iter().any(|line| line == "LIT 0"));
}

#[test]
fn test_same_named_functions_get_distinct_labels() {
    let (tree, program) = compile_source("program { { int f() { return 1 } } { int f() { return 2 } } }");
    let block = outer_block(&tree);
    let first = tree.kid(tree.kid(block, 0), 0);
    let second = tree.kid(tree.kid(block, 1), 0);

    assert_eq!(tree.label(first), Some("f<<2>>"));
    assert_eq!(tree.label(second), Some("f<<4>>"));
    assert!(program.codes().contains(&Code::Label(String::from("f<<4>>"))));
}

#[test]
fn test_recursive_call_uses_own_label() {
    let (_, program) = compile_source("program { int f(int n) { return f(n - 1) } }");

    assert!(program.codes().contains(&Code::Call(String::from("f<<2>>"))));
}

#[test]
fn test_shadowed_constant_is_a_variable() {
    let (_, program) =
        compile_source("program { boolean b { int true int y true = 3 y = true } b = true }");

    assert_eq!(
        body_listing(&program),
        vec![
            "LIT 0 b",
            "LIT 0 true",
            "LIT 0 y",
            "LIT 3",
            "STORE 1 true",
            "LOAD 1 true",
            "STORE 2 y",
            "POP 2",
            "LIT 1 true",
            "STORE 0 b",
            "POP 1",
            "HALT",
        ]
    );
}
