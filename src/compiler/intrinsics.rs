use super::{
    bytecode::Code,
    compiler::Compiler,
    stmt::layout_formals,
};

pub const READ_LABEL: &str = "Read";
pub const WRITE_LABEL: &str = "Write";

/// Emits the bodies of `read` and `write`, each in its own frame.
pub fn gen_intrinsics(compiler: &mut Compiler) {
    let read = compiler.intrinsics.read;
    compiler.tree.set_label(read, READ_LABEL.to_string());
    compiler.frames.open_frame();
    compiler.storeop(Code::Label(READ_LABEL.to_string()));
    compiler.storeop(Code::Read);
    compiler.storeop(Code::Return(READ_LABEL.to_string()));
    compiler.frames.close_frame();

    let write = compiler.intrinsics.write;
    compiler.tree.set_label(write, WRITE_LABEL.to_string());
    compiler.frames.open_frame();
    compiler.storeop(Code::Label(WRITE_LABEL.to_string()));

    // The single actual is the only value in the callee's frame
    let formals = compiler.tree.kid(write, 2);
    layout_formals(compiler, formals);
    let formal = compiler.tree.kid(formals, 0);
    let name = compiler.name_of(compiler.tree.kid(formal, 1));
    let offset = compiler.offset_of(formal);

    compiler.storeop(Code::Load { offset, name });
    compiler.storeop(Code::Write);
    compiler.storeop(Code::Return(WRITE_LABEL.to_string()));
    compiler.frames.close_frame();
}
