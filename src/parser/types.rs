use crate::{
    ast::ast::{NodeId, NodeKind},
    errors::errors::{Error, ErrorImpl},
    lexer::tokens::TokenKind,
};

use super::parser::Parser;

/// Maps a type keyword to the node kind marking it in the tree.
pub fn type_kind(kind: TokenKind) -> Option<NodeKind> {
    match kind {
        TokenKind::Int => Some(NodeKind::IntType),
        TokenKind::Boolean => Some(NodeKind::BoolType),
        TokenKind::StringType => Some(NodeKind::StringType),
        TokenKind::HexType => Some(NodeKind::HexType),
        _ => None,
    }
}

/// `TYPE -> 'int' | 'boolean' | 'string' | 'hex'`
pub fn parse_type(parser: &mut Parser) -> Result<NodeId, Error> {
    let token = parser.current_token().clone();

    match type_kind(token.kind) {
        Some(kind) => {
            parser.advance();
            Ok(parser.leaf(kind, &token))
        }
        None => Err(Error::new(
            ErrorImpl::UnexpectedTokenDetailed {
                token: token.value,
                message: String::from("expected a type"),
            },
            token.span.start,
        )),
    }
}
