use std::{collections::HashMap, fmt::Display};

use lazy_static::lazy_static;

use crate::ast::ast::Operator;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ByteCode {
    Halt,
    Pop,
    FalseBranch,
    Goto,
    Store,
    Load,
    Lit,
    Args,
    Call,
    Return,
    Bop,
    Read,
    Write,
    Label,
}

impl ByteCode {
    pub fn mnemonic(&self) -> &'static str {
        match self {
            ByteCode::Halt => "HALT",
            ByteCode::Pop => "POP",
            ByteCode::FalseBranch => "FALSEBRANCH",
            ByteCode::Goto => "GOTO",
            ByteCode::Store => "STORE",
            ByteCode::Load => "LOAD",
            ByteCode::Lit => "LIT",
            ByteCode::Args => "ARGS",
            ByteCode::Call => "CALL",
            ByteCode::Return => "RETURN",
            ByteCode::Bop => "BOP",
            ByteCode::Read => "READ",
            ByteCode::Write => "WRITE",
            ByteCode::Label => "LABEL",
        }
    }
}

lazy_static! {
    /// Net effect of each instruction on the runtime stack.
    ///
    /// `None` marks the instructions whose effect is their count operand.
    pub static ref FRAME_CHANGE: HashMap<ByteCode, Option<i64>> = {
        let mut map = HashMap::new();
        map.insert(ByteCode::Halt, Some(0));
        map.insert(ByteCode::Pop, None);
        // pops the condition
        map.insert(ByteCode::FalseBranch, Some(-1));
        map.insert(ByteCode::Goto, Some(0));
        map.insert(ByteCode::Store, Some(-1));
        map.insert(ByteCode::Load, Some(1));
        map.insert(ByteCode::Lit, Some(1));
        map.insert(ByteCode::Args, None);
        // the callee's result
        map.insert(ByteCode::Call, Some(1));
        map.insert(ByteCode::Return, Some(-1));
        map.insert(ByteCode::Bop, Some(-1));
        map.insert(ByteCode::Read, Some(1));
        // the written value stays on top
        map.insert(ByteCode::Write, Some(0));
        map.insert(ByteCode::Label, Some(0));
        map
    };
}

/// Operand of a `LIT` instruction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Literal {
    Int(i64),
    Str(String),
    /// A value pushed on behalf of a name: a variable's initial slot or
    /// one of the boolean constants.
    Named { value: i64, name: String },
}

impl Display for Literal {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Literal::Int(value) => write!(f, "{}", value),
            Literal::Str(value) => write!(f, "\"{}\"", value),
            Literal::Named { value, name } => write!(f, "{} {}", value, name),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Code {
    Halt,
    Pop(usize),
    FalseBranch(String),
    Goto(String),
    Store { offset: usize, name: String },
    Load { offset: usize, name: String },
    Lit(Literal),
    Args(usize),
    Call(String),
    Return(String),
    Bop(Operator),
    Read,
    Write,
    Label(String),
}

impl Code {
    pub fn bytecode(&self) -> ByteCode {
        match self {
            Code::Halt => ByteCode::Halt,
            Code::Pop(_) => ByteCode::Pop,
            Code::FalseBranch(_) => ByteCode::FalseBranch,
            Code::Goto(_) => ByteCode::Goto,
            Code::Store { .. } => ByteCode::Store,
            Code::Load { .. } => ByteCode::Load,
            Code::Lit(_) => ByteCode::Lit,
            Code::Args(_) => ByteCode::Args,
            Code::Call(_) => ByteCode::Call,
            Code::Return(_) => ByteCode::Return,
            Code::Bop(_) => ByteCode::Bop,
            Code::Read => ByteCode::Read,
            Code::Write => ByteCode::Write,
            Code::Label(_) => ByteCode::Label,
        }
    }

    /// How executing this instruction changes the stack depth.
    pub fn frame_change(&self) -> i64 {
        match FRAME_CHANGE.get(&self.bytecode()) {
            Some(Some(change)) => *change,
            _ => match self {
                Code::Pop(count) | Code::Args(count) => -(*count as i64),
                _ => unreachable!("no stack effect recorded for {}", self.bytecode().mnemonic()),
            },
        }
    }
}

impl Display for Code {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let mnemonic = self.bytecode().mnemonic();

        match self {
            Code::Halt | Code::Read | Code::Write => write!(f, "{}", mnemonic),
            Code::Pop(count) | Code::Args(count) => write!(f, "{} {}", mnemonic, count),
            Code::FalseBranch(label)
            | Code::Goto(label)
            | Code::Call(label)
            | Code::Return(label)
            | Code::Label(label) => write!(f, "{} {}", mnemonic, label),
            Code::Store { offset, name } | Code::Load { offset, name } => {
                write!(f, "{} {} {}", mnemonic, offset, name)
            }
            Code::Lit(literal) => write!(f, "{} {}", mnemonic, literal),
            Code::Bop(op) => write!(f, "{} {}", mnemonic, op),
        }
    }
}

/// Emitted instructions, in execution order. Only ever appended to.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Program {
    codes: Vec<Code>,
}

impl Program {
    pub fn new() -> Self {
        Program::default()
    }

    pub(crate) fn push(&mut self, code: Code) {
        self.codes.push(code);
    }

    pub fn codes(&self) -> &[Code] {
        &self.codes
    }

    pub fn len(&self) -> usize {
        self.codes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.codes.is_empty()
    }
}

impl Display for Program {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        for code in &self.codes {
            writeln!(f, "{}", code)?;
        }
        Ok(())
    }
}
