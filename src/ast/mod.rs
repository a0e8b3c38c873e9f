//! Abstract Syntax Tree (AST) module.
//!
//! The tree is stored in a single arena ([`ast::Tree`]) and nodes refer
//! to each other by [`ast::NodeId`]. This includes the non-owning links
//! written by later passes:
//!
//! - decorations (a use points at its declaration, an expression at its type)
//! - labels assigned during code generation
//! - frame offsets of declared variables

pub mod ast;
pub mod printer;

#[cfg(test)]
mod tests;
