//! Bytecode generation.
//!
//! Walks an analyzed tree a second time and emits a flat [`bytecode::Program`]
//! for the stack machine. It handles:
//!
//! - frame offsets for every variable and formal ([`frame`])
//! - unique labels for functions and branch targets
//! - the bodies of the intrinsic `read`/`write` functions
//!
//! The emitter assumes its input passed analysis; a malformed tree is a
//! bug, not a user error, and panics.

pub mod bytecode;
pub mod compiler;
pub mod expr;
pub mod frame;
pub mod intrinsics;
pub mod stmt;

#[cfg(test)]
mod tests;
