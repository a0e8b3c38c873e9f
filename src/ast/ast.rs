use std::{fmt::Display, rc::Rc};

use crate::Span;

/// Interned identifier text; compares by value.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Symbol(Rc<str>);

impl Symbol {
    pub fn new(name: &str) -> Self {
        Symbol(Rc::from(name))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for Symbol {
    fn from(name: &str) -> Self {
        Symbol::new(name)
    }
}

impl Display for Symbol {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Binary operators, grouped by precedence level in the grammar.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Operator {
    // relational
    Equal,
    NotEqual,
    Less,
    LessEqual,
    Greater,
    GreaterEqual,
    // adding
    Plus,
    Minus,
    Or,
    // multiplying
    Multiply,
    Divide,
    And,
    Modulo,
}

impl Operator {
    pub fn symbol(&self) -> &'static str {
        match self {
            Operator::Equal => "==",
            Operator::NotEqual => "!=",
            Operator::Less => "<",
            Operator::LessEqual => "<=",
            Operator::Greater => ">",
            Operator::GreaterEqual => ">=",
            Operator::Plus => "+",
            Operator::Minus => "-",
            Operator::Or => "|",
            Operator::Multiply => "*",
            Operator::Divide => "/",
            Operator::And => "&",
            Operator::Modulo => "%",
        }
    }

    /// `|` and `&` only accept boolean operands.
    pub fn is_logical(&self) -> bool {
        matches!(self, Operator::Or | Operator::And)
    }
}

impl Display for Operator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.symbol())
    }
}

/// Index of a node inside its [`Tree`] arena.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(pub u32);

impl NodeId {
    pub fn index(&self) -> usize {
        self.0 as usize
    }
}

impl Display for NodeId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Node kinds and the children each one owns (0-based).
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NodeKind {
    /// `[block]`
    Program,
    /// `[decl..., stmt...]`
    Block,
    /// `[return type, name, formals, block]`
    FunctionDecl,
    /// `[type, name]`
    Decl,
    /// `[decl...]`
    Formals,
    /// `[name, actual...]`
    Call,
    /// `[condition, then block, else block?]`
    If,
    /// `[condition, block]`
    While,
    /// `[condition, block]`
    Unless,
    /// `[name, select block]`
    Select,
    /// `[selector...]`
    SelectBlock,
    /// `[guard, block]`
    Selector,
    /// `[expression]`
    Return,
    /// `[name, expression]`
    Assign,
    Id(Symbol),
    Int(i64),
    Str(Symbol),
    Hex { text: Symbol, value: i64 },
    RelOp(Operator),
    AddOp(Operator),
    MultOp(Operator),
    BoolType,
    IntType,
    StringType,
    HexType,
}

impl NodeKind {
    pub fn name(&self) -> &'static str {
        match self {
            NodeKind::Program => "Program",
            NodeKind::Block => "Block",
            NodeKind::FunctionDecl => "FunctionDecl",
            NodeKind::Decl => "Decl",
            NodeKind::Formals => "Formals",
            NodeKind::Call => "Call",
            NodeKind::If => "If",
            NodeKind::While => "While",
            NodeKind::Unless => "Unless",
            NodeKind::Select => "Select",
            NodeKind::SelectBlock => "SelectBlock",
            NodeKind::Selector => "Selector",
            NodeKind::Return => "Return",
            NodeKind::Assign => "Assign",
            NodeKind::Id(_) => "Id",
            NodeKind::Int(_) => "Int",
            NodeKind::Str(_) => "String",
            NodeKind::Hex { .. } => "Hex",
            NodeKind::RelOp(_) => "RelOp",
            NodeKind::AddOp(_) => "AddOp",
            NodeKind::MultOp(_) => "MultOp",
            NodeKind::BoolType => "BoolType",
            NodeKind::IntType => "IntType",
            NodeKind::StringType => "StringType",
            NodeKind::HexType => "HexType",
        }
    }

    pub fn is_type(&self) -> bool {
        matches!(
            self,
            NodeKind::BoolType | NodeKind::IntType | NodeKind::StringType | NodeKind::HexType
        )
    }
}

#[derive(Debug, Clone)]
pub struct Node {
    pub kind: NodeKind,
    pub kids: Vec<NodeId>,
    /// `None` for nodes synthesized by the compiler.
    pub span: Option<Span>,
    decoration: Option<NodeId>,
    label: Option<String>,
    frame_offset: Option<usize>,
}

impl Node {
    fn new(kind: NodeKind, span: Option<Span>) -> Self {
        Node {
            kind,
            kids: vec![],
            span,
            decoration: None,
            label: None,
            frame_offset: None,
        }
    }
}

/// Arena holding every node of one compilation unit.
///
/// The shape (kinds and kids) is fixed once the parser is done. The
/// decoration, label and frame offset slots are filled in later by
/// analysis and code generation, each at most once.
#[derive(Debug, Clone, Default)]
pub struct Tree {
    nodes: Vec<Node>,
    root: Option<NodeId>,
    constrained: bool,
}

impl Tree {
    pub fn new() -> Self {
        Tree::default()
    }

    pub fn add(&mut self, kind: NodeKind, span: Option<Span>) -> NodeId {
        let id = NodeId(self.nodes.len() as u32);
        self.nodes.push(Node::new(kind, span));
        id
    }

    /// Adds a synthesized node with the given kids.
    pub fn add_with_kids(&mut self, kind: NodeKind, kids: &[NodeId]) -> NodeId {
        let id = self.add(kind, None);
        self.nodes[id.index()].kids.extend_from_slice(kids);
        id
    }

    pub fn add_kid(&mut self, parent: NodeId, kid: NodeId) {
        self.nodes[parent.index()].kids.push(kid);
    }

    pub fn set_root(&mut self, root: NodeId) {
        self.root = Some(root);
    }

    pub fn root(&self) -> Option<NodeId> {
        self.root
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn node(&self, id: NodeId) -> &Node {
        &self.nodes[id.index()]
    }

    pub fn kind(&self, id: NodeId) -> &NodeKind {
        &self.nodes[id.index()].kind
    }

    pub fn kids(&self, id: NodeId) -> &[NodeId] {
        &self.nodes[id.index()].kids
    }

    /// The `n`th (0-based) kid of `id`.
    pub fn kid(&self, id: NodeId, n: usize) -> NodeId {
        self.nodes[id.index()].kids[n]
    }

    pub fn kid_count(&self, id: NodeId) -> usize {
        self.nodes[id.index()].kids.len()
    }

    pub fn span(&self, id: NodeId) -> Option<&Span> {
        self.nodes[id.index()].span.as_ref()
    }

    /// Name carried by an `Id` node.
    pub fn symbol(&self, id: NodeId) -> Option<&Symbol> {
        match self.kind(id) {
            NodeKind::Id(symbol) => Some(symbol),
            _ => None,
        }
    }

    pub fn decoration(&self, id: NodeId) -> Option<NodeId> {
        self.nodes[id.index()].decoration
    }

    pub fn decorate(&mut self, id: NodeId, decoration: NodeId) {
        let slot = &mut self.nodes[id.index()].decoration;
        debug_assert!(slot.is_none(), "node {} decorated twice", id);
        *slot = Some(decoration);
    }

    pub fn label(&self, id: NodeId) -> Option<&str> {
        self.nodes[id.index()].label.as_deref()
    }

    pub fn set_label(&mut self, id: NodeId, label: String) {
        let slot = &mut self.nodes[id.index()].label;
        debug_assert!(slot.is_none(), "node {} labelled twice", id);
        *slot = Some(label);
    }

    pub fn frame_offset(&self, id: NodeId) -> Option<usize> {
        self.nodes[id.index()].frame_offset
    }

    pub fn set_frame_offset(&mut self, id: NodeId, offset: usize) {
        let slot = &mut self.nodes[id.index()].frame_offset;
        debug_assert!(slot.is_none(), "node {} assigned two frame offsets", id);
        *slot = Some(offset);
    }

    pub fn is_constrained(&self) -> bool {
        self.constrained
    }

    pub(crate) fn mark_constrained(&mut self) {
        self.constrained = true;
    }
}
