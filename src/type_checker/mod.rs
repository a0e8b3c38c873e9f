//! Semantic analysis.
//!
//! Walks the parsed tree once, resolving every name through a scoped
//! [`table::Table`] and checking types. Results are written into the
//! tree's decoration slots:
//!
//! - names and calls point at their declarations
//! - expressions point at one of the intrinsic type declarations
//! - `return` statements point at their enclosing function
//!
//! The first error aborts the walk.

pub mod table;
pub mod type_checker;

#[cfg(test)]
mod tests;
