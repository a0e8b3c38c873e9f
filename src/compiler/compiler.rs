//! Main compiler module.
//!
//! Holds the state of one code generation run and the [`compile`] entry
//! point that turns an analyzed tree into a [`Program`].

use tracing::{debug, trace};

use crate::{
    ast::ast::{NodeId, Tree},
    type_checker::type_checker::Intrinsics,
};

use super::{
    bytecode::{Code, Program},
    frame::Frames,
    stmt::gen_statement,
};

/// The state of one code generation run.
///
/// Besides emitting instructions, the compiler writes labels and frame
/// offsets back into the tree as it goes, so later uses of a function or
/// variable can find them.
pub struct Compiler<'a> {
    /// The analyzed tree being compiled
    pub tree: &'a mut Tree,
    /// Intrinsic declarations produced by analysis
    pub intrinsics: Intrinsics,
    /// Instructions emitted so far
    pub program: Program,
    /// Stack layout of the functions being compiled
    pub frames: Frames,
    label_count: usize,
}

impl<'a> Compiler<'a> {
    /// Creates a compiler with no open frames and an empty program.
    ///
    /// # Arguments
    ///
    /// * `tree` - The analyzed tree to compile
    /// * `intrinsics` - Intrinsic declarations, used to recognize `read`, `write` and the boolean constants
    pub fn new(tree: &'a mut Tree, intrinsics: Intrinsics) -> Self {
        Compiler {
            tree,
            intrinsics,
            program: Program::new(),
            frames: Frames::new(),
            label_count: 0,
        }
    }

    /// Mints a label no other call returns, e.g. `while<<4>>`.
    pub fn new_label(&mut self, base: &str) -> String {
        self.label_count += 1;
        let label = format!("{}<<{}>>", base, self.label_count);
        trace!(%label, "new label");
        label
    }

    /// Appends `code` and records its effect on the current frame.
    pub fn storeop(&mut self, code: Code) {
        let change = code.frame_change();
        trace!(code = %code, change, size = self.frames.size(), "emit");
        self.program.push(code);
        self.frames.change(change);
    }

    /// Frame offset of the variable declared by `decl`.
    pub fn offset_of(&self, decl: NodeId) -> usize {
        let id = self.tree.kid(decl, 1);
        match self.tree.frame_offset(id) {
            Some(offset) => offset,
            None => unreachable!("variable {} used before it was laid out", decl),
        }
    }

    /// Label assigned to a function declaration.
    pub fn label_of(&self, function: NodeId) -> String {
        match self.tree.label(function) {
            Some(label) => label.to_string(),
            None => unreachable!("function {} referenced before it was labelled", function),
        }
    }

    /// The declaration a use was resolved to during analysis.
    pub fn declaration_of(&self, id: NodeId) -> NodeId {
        match self.tree.decoration(id) {
            Some(decl) => decl,
            None => unreachable!("node {} was never resolved", id),
        }
    }

    /// Source name carried by an `Id` node.
    pub fn name_of(&self, id: NodeId) -> String {
        match self.tree.symbol(id) {
            Some(symbol) => symbol.to_string(),
            None => unreachable!("node {} is not a name", id),
        }
    }
}

/// Generates bytecode for a tree that has passed analysis.
///
/// Walks the program once, laying out every variable in its function's
/// frame and labelling every function. The offsets and labels are also
/// written into the tree, so a decorated rendering shows them.
///
/// # Arguments
///
/// * `tree` - The analyzed tree; its frame offset and label slots must still be empty
/// * `intrinsics` - The intrinsic declarations returned by analysis
///
/// # Returns
///
/// The flat instruction listing, starting with a `GOTO` to the entry label
/// and ending in `HALT`.
///
/// # Panics
///
/// Panics if the tree was not successfully analyzed, for example when a
/// name was never resolved. Emission has no recoverable errors.
pub fn compile(tree: &mut Tree, intrinsics: &Intrinsics) -> Program {
    debug_assert!(tree.is_constrained(), "compiling a tree that was never analyzed");
    let Some(root) = tree.root() else {
        unreachable!("compiling a tree without a program");
    };

    let mut compiler = Compiler::new(tree, *intrinsics);
    gen_statement(&mut compiler, root);

    debug_assert!(compiler.frames.is_empty(), "unbalanced frames after compilation");
    debug!(codes = compiler.program.len(), labels = compiler.label_count, "compiled");
    compiler.program
}
