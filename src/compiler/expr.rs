use crate::ast::ast::{NodeId, NodeKind};

use super::{
    bytecode::{Code, Literal},
    compiler::Compiler,
};

/// Emits code leaving the value of expression `id` on top of the stack.
///
/// Operands are evaluated left to right. A call pushes its actuals in
/// order, then `ARGS n` and `CALL label`. References to the boolean
/// constants become literals instead of loads.
///
/// # Arguments
///
/// * `compiler` - The code generation state
/// * `id` - A literal, name, call or operator node
pub fn gen_expression(compiler: &mut Compiler, id: NodeId) {
    let kind = compiler.tree.kind(id).clone();

    match kind {
        NodeKind::Int(value) => compiler.storeop(Code::Lit(Literal::Int(value))),
        NodeKind::Hex { value, .. } => compiler.storeop(Code::Lit(Literal::Int(value))),
        NodeKind::Str(value) => compiler.storeop(Code::Lit(Literal::Str(value.to_string()))),
        NodeKind::Id(name) => {
            let decl = compiler.declaration_of(id);
            let name = name.to_string();

            let code = if decl == compiler.intrinsics.true_value {
                Code::Lit(Literal::Named { value: 1, name })
            } else if decl == compiler.intrinsics.false_value {
                Code::Lit(Literal::Named { value: 0, name })
            } else {
                Code::Load {
                    offset: compiler.offset_of(decl),
                    name,
                }
            };
            compiler.storeop(code);
        }
        NodeKind::Call => {
            let function = compiler.declaration_of(compiler.tree.kid(id, 0));
            let label = compiler.label_of(function);
            let actuals = compiler.tree.kids(id)[1..].to_vec();

            for actual in &actuals {
                gen_expression(compiler, *actual);
            }
            compiler.storeop(Code::Args(actuals.len()));
            compiler.storeop(Code::Call(label));
        }
        NodeKind::RelOp(op) | NodeKind::AddOp(op) | NodeKind::MultOp(op) => {
            let (left, right) = (compiler.tree.kid(id, 0), compiler.tree.kid(id, 1));
            gen_expression(compiler, left);
            gen_expression(compiler, right);
            compiler.storeop(Code::Bop(op));
        }
        _ => unreachable!("node {} is a {}, expected an expression", id, kind.name()),
    }
}
