use tracing::debug;

use crate::ast::ast::{NodeId, NodeKind, Operator, Tree};

use super::{
    bytecode::{Code, Literal},
    compiler::Compiler,
    expr::gen_expression,
    intrinsics::gen_intrinsics,
};

/// Emits the code for a declaration or statement.
///
/// Every instruction goes through [`Compiler::storeop`], so the current
/// frame always matches the runtime stack. Declarations take the frame
/// size as their offset; blocks pop whatever they declared on exit.
///
/// # Arguments
///
/// * `compiler` - The code generation state
/// * `id` - A `Program`, `Block`, `Decl`, `FunctionDecl` or statement node
///
/// # Panics
///
/// Panics when `id` is an expression node or a use was never resolved.
pub fn gen_statement(compiler: &mut Compiler, id: NodeId) {
    let kind = compiler.tree.kind(id).clone();

    match kind {
        NodeKind::Program => {
            let start = compiler.new_label("start");
            compiler.frames.open_frame();

            // Jump over the intrinsic bodies
            compiler.storeop(Code::Goto(start.clone()));
            gen_intrinsics(compiler);
            compiler.storeop(Code::Label(start));

            let block = compiler.tree.kid(id, 0);
            gen_statement(compiler, block);
            compiler.storeop(Code::Halt);
            compiler.frames.close_frame();
        }
        NodeKind::Block => {
            compiler.frames.open_block();
            for kid in compiler.tree.kids(id).to_vec() {
                gen_statement(compiler, kid);
            }
            // Release this block's locals
            let size = compiler.frames.block_size();
            compiler.storeop(Code::Pop(size));
            compiler.frames.close_block();
        }
        NodeKind::Decl => {
            let name_id = compiler.tree.kid(id, 1);
            let name = compiler.name_of(name_id);
            let offset = compiler.frames.size();

            compiler.tree.set_frame_offset(name_id, offset);
            compiler.tree.set_label(id, name.clone());
            compiler.storeop(Code::Lit(Literal::Named { value: 0, name }));
        }
        NodeKind::FunctionDecl => gen_function(compiler, id),
        NodeKind::If => {
            let else_label = compiler.new_label("else");
            let continue_label = compiler.new_label("continue");
            let has_else = compiler.tree.kid_count(id) == 3;

            let condition = compiler.tree.kid(id, 0);
            gen_expression(compiler, condition);
            let target = if has_else { else_label.clone() } else { continue_label.clone() };
            compiler.storeop(Code::FalseBranch(target));
            let then_block = compiler.tree.kid(id, 1);
            gen_statement(compiler, then_block);
            compiler.storeop(Code::Goto(continue_label.clone()));

            if has_else {
                compiler.storeop(Code::Label(else_label));
                let else_block = compiler.tree.kid(id, 2);
                gen_statement(compiler, else_block);
            }
            compiler.storeop(Code::Label(continue_label));
        }
        NodeKind::Unless => {
            let unless_label = compiler.new_label("unless");
            let continue_label = compiler.new_label("continue");

            // The block runs only when the condition is false
            let condition = compiler.tree.kid(id, 0);
            gen_expression(compiler, condition);
            compiler.storeop(Code::FalseBranch(unless_label.clone()));
            compiler.storeop(Code::Goto(continue_label.clone()));
            compiler.storeop(Code::Label(unless_label));
            let body = compiler.tree.kid(id, 1);
            gen_statement(compiler, body);
            compiler.storeop(Code::Label(continue_label));
        }
        NodeKind::While => {
            let continue_label = compiler.new_label("continue");
            let while_label = compiler.new_label("while");

            compiler.storeop(Code::Label(while_label.clone()));
            let condition = compiler.tree.kid(id, 0);
            gen_expression(compiler, condition);
            compiler.storeop(Code::FalseBranch(continue_label.clone()));
            let body = compiler.tree.kid(id, 1);
            gen_statement(compiler, body);
            compiler.storeop(Code::Goto(while_label));
            compiler.storeop(Code::Label(continue_label));
        }
        NodeKind::Select => gen_select(compiler, id),
        NodeKind::Return => {
            let value = compiler.tree.kid(id, 0);
            gen_expression(compiler, value);
            let function = compiler.declaration_of(id);
            let label = compiler.label_of(function);
            compiler.storeop(Code::Return(label));
        }
        NodeKind::Assign => {
            let target = compiler.tree.kid(id, 0);
            let name = compiler.name_of(target);
            let offset = compiler.offset_of(compiler.declaration_of(target));

            let value = compiler.tree.kid(id, 1);
            gen_expression(compiler, value);
            compiler.storeop(Code::Store { offset, name });
        }
        _ => unreachable!("node {} is a {}, expected a statement", id, kind.name()),
    }
}

fn gen_function(compiler: &mut Compiler, id: NodeId) {
    let name = compiler.name_of(compiler.tree.kid(id, 1));
    let (formals, body) = (compiler.tree.kid(id, 2), compiler.tree.kid(id, 3));

    let label = compiler.new_label(&name);
    compiler.tree.set_label(id, label.clone());
    let continue_label = compiler.new_label("continue");
    debug!(function = %name, %label, "compiling function");

    // Straight-line execution skips over the body
    compiler.storeop(Code::Goto(continue_label.clone()));

    compiler.frames.open_frame();
    compiler.storeop(Code::Label(label.clone()));
    layout_formals(compiler, formals);
    gen_statement(compiler, body);

    if !definitely_returns(&*compiler.tree, body) {
        compiler.storeop(Code::Lit(Literal::Int(0)));
        compiler.storeop(Code::Return(label));
    }
    compiler.frames.close_frame();

    compiler.storeop(Code::Label(continue_label));
}

/// Gives each formal the next offset in the freshly opened frame.
pub fn layout_formals(compiler: &mut Compiler, formals: NodeId) {
    for decl in compiler.tree.kids(formals).to_vec() {
        let name_id = compiler.tree.kid(decl, 1);
        let name = compiler.name_of(name_id);
        let offset = compiler.frames.size();

        compiler.tree.set_frame_offset(name_id, offset);
        compiler.tree.set_label(decl, name);
        // the caller pushed the actual
        compiler.frames.change(1);
    }
}

/// Each arm compares the selected value against its guard; the first
/// match runs and control leaves the statement.
fn gen_select(compiler: &mut Compiler, id: NodeId) {
    let name = compiler.tree.kid(id, 0);
    let selectors = compiler.tree.kids(compiler.tree.kid(id, 1)).to_vec();
    let end_label = compiler.new_label("end");

    for selector in selectors {
        let next_label = compiler.new_label("next");

        gen_expression(compiler, name);
        let guard = compiler.tree.kid(selector, 0);
        gen_expression(compiler, guard);
        compiler.storeop(Code::Bop(Operator::Equal));
        compiler.storeop(Code::FalseBranch(next_label.clone()));
        let arm = compiler.tree.kid(selector, 1);
        gen_statement(compiler, arm);
        compiler.storeop(Code::Goto(end_label.clone()));
        compiler.storeop(Code::Label(next_label));
    }

    compiler.storeop(Code::Label(end_label));
}

/// True when every path through `id` ends in a `return`.
pub fn definitely_returns(tree: &Tree, id: NodeId) -> bool {
    match tree.kind(id) {
        NodeKind::Return => true,
        NodeKind::Block => tree.kids(id).iter().any(|kid| definitely_returns(tree, *kid)),
        NodeKind::If => {
            tree.kid_count(id) == 3
                && definitely_returns(tree, tree.kid(id, 1))
                && definitely_returns(tree, tree.kid(id, 2))
        }
        _ => false,
    }
}
