//! Unit tests for the tree arena and its renderer.

use super::{
    ast::{NodeKind, Operator, Symbol, Tree},
    printer::render,
};

fn decl(tree: &mut Tree, name: &str) -> (super::ast::NodeId, super::ast::NodeId) {
    let ty = tree.add(NodeKind::IntType, None);
    let id = tree.add(NodeKind::Id(Symbol::new(name)), None);
    (tree.add_with_kids(NodeKind::Decl, &[ty, id]), id)
}

#[test]
fn test_kids_keep_insertion_order() {
    let mut tree = Tree::new();
    let block = tree.add(NodeKind::Block, None);
    let (first, _) = decl(&mut tree, "a");
    let (second, _) = decl(&mut tree, "b");
    tree.add_kid(block, first);
    tree.add_kid(block, second);

    assert_eq!(tree.kids(block), &[first, second]);
    assert_eq!(tree.kid(block, 1), second);
    assert_eq!(tree.kid_count(block), 2);
}

#[test]
fn test_annotation_slots_start_empty() {
    let mut tree = Tree::new();
    let (decl, id) = decl(&mut tree, "x");

    assert_eq!(tree.decoration(id), None);
    assert_eq!(tree.label(decl), None);
    assert_eq!(tree.frame_offset(id), None);

    tree.decorate(id, decl);
    tree.set_label(decl, "x".to_string());
    tree.set_frame_offset(id, 3);

    assert_eq!(tree.decoration(id), Some(decl));
    assert_eq!(tree.label(decl), Some("x"));
    assert_eq!(tree.frame_offset(id), Some(3));
}

#[test]
#[should_panic(expected = "decorated twice")]
#[cfg(debug_assertions)]
fn test_decoration_is_write_once() {
    let mut tree = Tree::new();
    let (decl, id) = decl(&mut tree, "x");

    tree.decorate(id, decl);
    tree.decorate(id, decl);
}

#[test]
fn test_symbols_compare_by_value() {
    assert_eq!(Symbol::new("abc"), Symbol::from("abc"));
    assert_ne!(Symbol::new("abc"), Symbol::new("abd"));
    assert_eq!(tree_symbol(), Some(Symbol::new("x")));
}

fn tree_symbol() -> Option<Symbol> {
    let mut tree = Tree::new();
    let (_, id) = decl(&mut tree, "x");
    tree.symbol(id).cloned()
}

#[test]
fn test_render_shows_annotations() {
    let mut tree = Tree::new();
    let (decl, id) = decl(&mut tree, "x");
    let block = tree.add_with_kids(NodeKind::Block, &[decl]);
    let one = tree.add(NodeKind::Int(1), None);
    let two = tree.add(NodeKind::Int(2), None);
    let sum = tree.add_with_kids(NodeKind::AddOp(Operator::Plus), &[one, two]);
    tree.add_kid(block, sum);
    let program = tree.add_with_kids(NodeKind::Program, &[block]);
    tree.set_root(program);
    tree.decorate(id, decl);
    tree.set_frame_offset(id, 0);

    let rendered = render(&tree);
    let lines: Vec<&str> = rendered.lines().collect();

    assert_eq!(lines.len(), 8);
    assert_eq!(lines[0], "   7: Program");
    assert_eq!(lines[1], "   3:   Block");
    assert_eq!(lines[3], "   0:       IntType");
    assert_eq!(lines[4], "   1:       Id x  Dec: 2  Addr: 0");
    assert_eq!(lines[5], "   6:     AddOp +");
    assert_eq!(lines[7], "   5:       Int 2");
}
