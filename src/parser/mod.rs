//! Parser module for building the raw tree.
//!
//! Transforms the token stream into a [`Tree`](crate::ast::ast::Tree)
//! rooted at a `Program` node. Expressions are parsed with a Pratt
//! parser (NUD/LED handlers plus binding powers for precedence), while
//! declarations and statements are recursive descent dispatched on the
//! leading token.

pub mod expr;
pub mod lookups;
pub mod parser;
pub mod stmt;
pub mod types;
