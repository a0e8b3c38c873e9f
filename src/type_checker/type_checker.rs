use tracing::{debug, trace};

use crate::{
    ast::ast::{NodeId, NodeKind, Symbol, Tree},
    errors::errors::{Error, ErrorImpl},
    Position,
};

use super::table::Table;

/// Synthesized declarations every program is analyzed against.
///
/// Types are compared by identity: two expressions share a type exactly
/// when their types are the same one of these four declaration nodes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Intrinsics {
    pub int_type: NodeId,
    pub bool_type: NodeId,
    pub string_type: NodeId,
    pub hex_type: NodeId,
    pub read: NodeId,
    pub write: NodeId,
    pub true_value: NodeId,
    pub false_value: NodeId,
}

impl Intrinsics {
    /// Allocates the intrinsic declarations in `tree`, outside the program.
    pub fn build(tree: &mut Tree) -> Self {
        let int_type = type_decl(tree, NodeKind::IntType, "<<int>>");
        let bool_type = type_decl(tree, NodeKind::BoolType, "<<bool>>");
        let string_type = type_decl(tree, NodeKind::StringType, "<<string>>");
        let hex_type = type_decl(tree, NodeKind::HexType, "<<hex>>");

        let read = function_decl(tree, "read", &[]);
        let write = function_decl(tree, "write", &["dummyFormal"]);

        let true_value = variable_decl(tree, NodeKind::BoolType, "true");
        let false_value = variable_decl(tree, NodeKind::BoolType, "false");

        Intrinsics {
            int_type,
            bool_type,
            string_type,
            hex_type,
            read,
            write,
            true_value,
            false_value,
        }
    }

    /// Name used for `ty` in diagnostics.
    pub fn type_name(&self, ty: NodeId) -> &'static str {
        match ty {
            ty if ty == self.int_type => "int",
            ty if ty == self.bool_type => "boolean",
            ty if ty == self.string_type => "string",
            ty if ty == self.hex_type => "hex",
            _ => "<unknown>",
        }
    }

    /// Whether `decl` is one of the built-in boolean constants, which have
    /// no frame slot and cannot be assigned.
    pub fn is_constant(&self, decl: NodeId) -> bool {
        decl == self.true_value || decl == self.false_value
    }

    /// The intrinsic type declaration for a type keyword node kind.
    fn for_type_kind(&self, kind: &NodeKind) -> Option<NodeId> {
        match kind {
            NodeKind::IntType => Some(self.int_type),
            NodeKind::BoolType => Some(self.bool_type),
            NodeKind::StringType => Some(self.string_type),
            NodeKind::HexType => Some(self.hex_type),
            _ => None,
        }
    }
}

/// `Decl[ty, Id]` whose `Id` is decorated with the declaration itself.
fn type_decl(tree: &mut Tree, kind: NodeKind, name: &str) -> NodeId {
    let decl = variable_decl(tree, kind, name);
    let id = tree.kid(decl, 1);
    tree.decorate(id, decl);
    decl
}

fn variable_decl(tree: &mut Tree, kind: NodeKind, name: &str) -> NodeId {
    let ty = tree.add(kind, None);
    let id = tree.add(NodeKind::Id(Symbol::new(name)), None);
    tree.add_with_kids(NodeKind::Decl, &[ty, id])
}

/// `int name(int formal...) {}`
fn function_decl(tree: &mut Tree, name: &str, formals: &[&str]) -> NodeId {
    let params: Vec<NodeId> = formals
        .iter()
        .map(|formal| variable_decl(tree, NodeKind::IntType, formal))
        .collect();

    let ty = tree.add(NodeKind::IntType, None);
    let id = tree.add(NodeKind::Id(Symbol::new(name)), None);
    let formals = tree.add_with_kids(NodeKind::Formals, &params);
    let body = tree.add_with_kids(NodeKind::Block, &[]);
    tree.add_with_kids(NodeKind::FunctionDecl, &[ty, id, formals, body])
}

#[derive(Debug)]
pub struct TypeChecker {
    pub table: Table,
    pub intrinsics: Intrinsics,
    /// Enclosing function declarations, innermost last
    functions: Vec<NodeId>,
}

impl TypeChecker {
    pub fn new(intrinsics: Intrinsics) -> Self {
        TypeChecker {
            table: Table::new(),
            intrinsics,
            functions: vec![],
        }
    }

    fn lookup(&self, tree: &Tree, id: NodeId) -> Result<NodeId, Error> {
        let name = symbol_of(tree, id);
        self.table
            .lookup(name)
            .ok_or_else(|| error_at(tree, id, ErrorImpl::UnboundName { name: name.to_string() }))
    }

    fn enter(&mut self, tree: &Tree, id: NodeId, declaration: NodeId) {
        self.table.enter(symbol_of(tree, id).clone(), declaration);
    }

    fn type_name(&self, ty: NodeId) -> String {
        self.intrinsics.type_name(ty).to_string()
    }
}

fn symbol_of(tree: &Tree, id: NodeId) -> &Symbol {
    match tree.symbol(id) {
        Some(symbol) => symbol,
        None => unreachable!("node {} is a {}, expected a name", id, tree.kind(id).name()),
    }
}

fn error_at(tree: &Tree, id: NodeId, error: ErrorImpl) -> Error {
    let position = tree
        .span(id)
        .map(|span| span.start.clone())
        .unwrap_or_else(Position::null);
    Error::new(error, position)
}

/// Declared type of a variable declaration, read off its name.
pub fn declared_type(tree: &Tree, decl: NodeId) -> NodeId {
    let id = tree.kid(decl, 1);
    match tree.decoration(id) {
        Some(ty) => ty,
        None => unreachable!("declaration {} was bound before being typed", decl),
    }
}

/// Declared return type of a function declaration.
pub fn return_type(tree: &Tree, function: NodeId) -> NodeId {
    let ty = tree.kid(function, 0);
    match tree.decoration(ty) {
        Some(ty) => ty,
        None => unreachable!("function {} was bound before its return type", function),
    }
}

/// Resolves names, checks types and decorates `tree`.
///
/// The intrinsic declarations are added to the tree and bound in an outer
/// scope around the program. Then the program is walked once. Every name
/// use is decorated with its declaration and every expression with its
/// type declaration.
///
/// # Arguments
///
/// * `tree` - A freshly parsed tree with a program root
///
/// # Returns
///
/// The intrinsic declarations on success. On failure, the first error
/// found; the decorations made before it stay in the tree.
///
/// # Errors
///
/// A tree can only be analyzed once; a second call fails with
/// `AlreadyConstrained` and leaves the tree untouched.
pub fn type_check(tree: &mut Tree) -> Result<Intrinsics, Error> {
    let Some(root) = tree.root() else {
        unreachable!("analysis requires a parsed program");
    };

    if tree.is_constrained() {
        return Err(error_at(tree, root, ErrorImpl::AlreadyConstrained));
    }
    tree.mark_constrained();

    let intrinsics = Intrinsics::build(tree);
    let mut type_checker = TypeChecker::new(intrinsics);

    type_checker.table.begin_scope();
    for intrinsic in [intrinsics.read, intrinsics.write, intrinsics.true_value, intrinsics.false_value] {
        type_check_stmt(&mut type_checker, tree, intrinsic)?;
    }

    type_check_stmt(&mut type_checker, tree, root)?;
    type_checker.table.end_scope();

    debug!(nodes = tree.len(), "analysis finished");
    Ok(intrinsics)
}

/// Checks a declaration or statement node.
///
/// Blocks and function bodies open a scope in the binding table and
/// close it on the way out. Declarations are entered in the current
/// scope after their name is decorated with the declared type.
///
/// # Arguments
///
/// * `type_checker` - The binding table and the enclosing functions
/// * `tree` - The tree being decorated
/// * `id` - A `Program`, `Block`, `Formals`, declaration or statement node
///
/// # Returns
///
/// `Ok(())`, or the first error found under `id`.
pub fn type_check_stmt(type_checker: &mut TypeChecker, tree: &mut Tree, id: NodeId) -> Result<(), Error> {
    let kind = tree.kind(id).clone();

    match kind {
        NodeKind::Program => {
            let block = tree.kid(id, 0);
            type_check_stmt(type_checker, tree, block)
        }
        NodeKind::Block => {
            type_checker.table.begin_scope();
            for kid in tree.kids(id).to_vec() {
                type_check_stmt(type_checker, tree, kid)?;
            }
            type_checker.table.end_scope();
            Ok(())
        }
        NodeKind::Decl => {
            let name = tree.kid(id, 1);
            let ty = type_checker
                .intrinsics
                .for_type_kind(tree.kind(tree.kid(id, 0)))
                .unwrap_or_else(|| unreachable!("declaration {} has no type keyword", id));

            tree.decorate(name, ty);
            type_checker.enter(tree, name, id);
            trace!(name = %symbol_of(tree, name), "declared variable");
            Ok(())
        }
        NodeKind::FunctionDecl => type_check_function(type_checker, tree, id),
        NodeKind::Formals => {
            for kid in tree.kids(id).to_vec() {
                type_check_stmt(type_checker, tree, kid)?;
            }
            Ok(())
        }
        NodeKind::If | NodeKind::While | NodeKind::Unless => {
            let condition = tree.kid(id, 0);
            let ty = type_check_expr(type_checker, tree, condition)?;
            if ty != type_checker.intrinsics.bool_type {
                return Err(error_at(
                    tree,
                    condition,
                    ErrorImpl::BadConditional {
                        received: type_checker.type_name(ty),
                    },
                ));
            }

            for kid in tree.kids(id)[1..].to_vec() {
                type_check_stmt(type_checker, tree, kid)?;
            }
            Ok(())
        }
        NodeKind::Select => type_check_select(type_checker, tree, id),
        NodeKind::Return => {
            let Some(function) = type_checker.functions.last().copied() else {
                return Err(error_at(tree, id, ErrorImpl::ReturnNotInFunction));
            };
            tree.decorate(id, function);

            let value = tree.kid(id, 0);
            let expected = return_type(tree, function);
            let received = type_check_expr(type_checker, tree, value)?;
            if received != expected {
                return Err(error_at(
                    tree,
                    value,
                    ErrorImpl::BadReturnExpr {
                        expected: type_checker.type_name(expected),
                        received: type_checker.type_name(received),
                    },
                ));
            }
            Ok(())
        }
        NodeKind::Assign => {
            let target = tree.kid(id, 0);
            let decl = type_checker.lookup(tree, target)?;
            if *tree.kind(decl) == NodeKind::FunctionDecl || type_checker.intrinsics.is_constant(decl) {
                return Err(error_at(
                    tree,
                    target,
                    ErrorImpl::NotAVariable {
                        name: symbol_of(tree, target).to_string(),
                    },
                ));
            }
            tree.decorate(target, decl);

            let expected = declared_type(tree, decl);
            let value = tree.kid(id, 1);
            let received = type_check_expr(type_checker, tree, value)?;
            if received != expected {
                return Err(error_at(
                    tree,
                    value,
                    ErrorImpl::BadAssignmentType {
                        expected: type_checker.type_name(expected),
                        received: type_checker.type_name(received),
                    },
                ));
            }
            Ok(())
        }
        _ => unreachable!("node {} is a {}, expected a statement", id, kind.name()),
    }
}

fn type_check_function(type_checker: &mut TypeChecker, tree: &mut Tree, id: NodeId) -> Result<(), Error> {
    let (ret, name, formals, body) = (tree.kid(id, 0), tree.kid(id, 1), tree.kid(id, 2), tree.kid(id, 3));

    // The name goes in the enclosing scope so the body and later siblings can call it
    type_checker.enter(tree, name, id);

    let ty = type_checker
        .intrinsics
        .for_type_kind(tree.kind(ret))
        .unwrap_or_else(|| unreachable!("function {} has no return type keyword", id));
    tree.decorate(ret, ty);

    debug!(function = %symbol_of(tree, name), "checking function");
    type_checker.table.begin_scope();
    type_checker.functions.push(id);

    let result = type_check_stmt(type_checker, tree, formals)
        .and_then(|_| type_check_stmt(type_checker, tree, body));

    type_checker.functions.pop();
    type_checker.table.end_scope();
    result
}

fn type_check_select(type_checker: &mut TypeChecker, tree: &mut Tree, id: NodeId) -> Result<(), Error> {
    let name = tree.kid(id, 0);
    let expected = type_check_expr(type_checker, tree, name)?;

    for selector in tree.kids(tree.kid(id, 1)).to_vec() {
        let guard = tree.kid(selector, 0);
        let received = type_check_expr(type_checker, tree, guard)?;
        if received != expected {
            return Err(error_at(
                tree,
                guard,
                ErrorImpl::SelectorTypeMismatch {
                    expected: type_checker.type_name(expected),
                    received: type_checker.type_name(received),
                },
            ));
        }
        tree.decorate(selector, received);

        let block = tree.kid(selector, 1);
        type_check_stmt(type_checker, tree, block)?;
    }

    tree.decorate(id, expected);
    Ok(())
}

/// Checks an expression node and returns its type.
///
/// # Returns
///
/// One of the intrinsic type declarations. Types are compared by node
/// identity, never by name.
pub fn type_check_expr(type_checker: &mut TypeChecker, tree: &mut Tree, id: NodeId) -> Result<NodeId, Error> {
    let kind = tree.kind(id).clone();
    let intrinsics = type_checker.intrinsics;

    let ty = match kind {
        NodeKind::Int(_) => intrinsics.int_type,
        NodeKind::Str(_) => intrinsics.string_type,
        NodeKind::Hex { .. } => intrinsics.hex_type,
        NodeKind::Id(ref name) => {
            let decl = type_checker.lookup(tree, id)?;
            if *tree.kind(decl) == NodeKind::FunctionDecl {
                return Err(error_at(tree, id, ErrorImpl::NotAVariable { name: name.to_string() }));
            }
            tree.decorate(id, decl);
            return Ok(declared_type(tree, decl));
        }
        NodeKind::Call => return type_check_call(type_checker, tree, id),
        NodeKind::RelOp(_) => {
            type_check_operands(type_checker, tree, id)?;
            intrinsics.bool_type
        }
        NodeKind::AddOp(op) | NodeKind::MultOp(op) => {
            let ty = type_check_operands(type_checker, tree, id)?;
            if op.is_logical() && ty != intrinsics.bool_type {
                return Err(error_at(
                    tree,
                    id,
                    ErrorImpl::BooleanExprExpected {
                        received: type_checker.type_name(ty),
                    },
                ));
            }
            ty
        }
        _ => unreachable!("node {} is a {}, expected an expression", id, kind.name()),
    };

    tree.decorate(id, ty);
    Ok(ty)
}

/// Both operands must have the same type, which is returned.
fn type_check_operands(type_checker: &mut TypeChecker, tree: &mut Tree, id: NodeId) -> Result<NodeId, Error> {
    let (left, right) = (tree.kid(id, 0), tree.kid(id, 1));
    let left = type_check_expr(type_checker, tree, left)?;
    let right = type_check_expr(type_checker, tree, right)?;

    if left != right {
        return Err(error_at(
            tree,
            id,
            ErrorImpl::TypeMismatchInExpr {
                left: type_checker.type_name(left),
                right: type_checker.type_name(right),
            },
        ));
    }
    Ok(left)
}

fn type_check_call(type_checker: &mut TypeChecker, tree: &mut Tree, id: NodeId) -> Result<NodeId, Error> {
    let callee = tree.kid(id, 0);
    let actuals = tree.kids(id)[1..].to_vec();

    let mut actual_types = Vec::with_capacity(actuals.len());
    for actual in &actuals {
        actual_types.push(type_check_expr(type_checker, tree, *actual)?);
    }

    let function = type_checker.lookup(tree, callee)?;
    if *tree.kind(function) != NodeKind::FunctionDecl {
        return Err(error_at(
            tree,
            callee,
            ErrorImpl::CallingNonFunction {
                name: symbol_of(tree, callee).to_string(),
            },
        ));
    }

    let formals = tree.kids(tree.kid(function, 2)).to_vec();
    if formals.len() != actuals.len() {
        return Err(error_at(
            tree,
            id,
            ErrorImpl::NumberActualsFormalsDiffer {
                expected: formals.len(),
                received: actuals.len(),
            },
        ));
    }

    for ((formal, actual), received) in formals.iter().zip(&actuals).zip(actual_types) {
        let expected = declared_type(tree, *formal);
        if expected != received {
            return Err(error_at(
                tree,
                *actual,
                ErrorImpl::ActualFormalTypeMismatch {
                    expected: type_checker.type_name(expected),
                    received: type_checker.type_name(received),
                },
            ));
        }
    }

    let ty = return_type(tree, function);
    tree.decorate(id, ty);
    tree.decorate(callee, function);
    Ok(ty)
}
