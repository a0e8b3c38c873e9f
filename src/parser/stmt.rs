use crate::{
    ast::ast::{NodeId, NodeKind, Symbol},
    errors::errors::{Error, ErrorImpl},
    lexer::tokens::TokenKind,
    parser::{expr::parse_expr, lookups::BindingPower},
};

use super::{parser::Parser, types::parse_type};

/// `PROGRAM -> 'program' BLOCK`, followed by end of input.
pub fn parse_program(parser: &mut Parser) -> Result<NodeId, Error> {
    let start = parser.expect_detailed(TokenKind::Program, "a source file starts with `program`")?;
    let block = parse_block(parser)?;

    if parser.current_token_kind() != TokenKind::EOF {
        return Err(Error::new(
            ErrorImpl::UnexpectedTokenDetailed {
                token: parser.current_token().value.clone(),
                message: String::from("expected end of input after the program block"),
            },
            parser.get_position(),
        ));
    }

    let program = parser.node(NodeKind::Program, start.span.start);
    parser.tree_mut().add_kid(program, block);
    Ok(program)
}

/// `BLOCK -> '{' D* S* '}'`
pub fn parse_block(parser: &mut Parser) -> Result<NodeId, Error> {
    let start = parser.expect_detailed(TokenKind::OpenCurly, "expected `{` to open a block")?;
    let mut kids = vec![];

    while parser.current_token_kind().is_type() {
        kids.push(parse_decl(parser)?);
    }

    while parser.get_stmt_lookup().contains_key(&parser.current_token_kind()) {
        kids.push(parse_stmt(parser)?);
    }

    parser.expect(TokenKind::CloseCurly)?;

    let block = parser.node(NodeKind::Block, start.span.start);
    for kid in kids {
        parser.tree_mut().add_kid(block, kid);
    }
    Ok(block)
}

pub fn parse_stmt(parser: &mut Parser) -> Result<NodeId, Error> {
    let kind = parser.current_token_kind();
    match parser.get_stmt_lookup().get(&kind).copied() {
        Some(stmt_fn) => stmt_fn(parser),
        None => Err(Error::new(
            ErrorImpl::UnexpectedTokenDetailed {
                token: parser.current_token().value.clone(),
                message: String::from("expected a statement"),
            },
            parser.get_position(),
        )),
    }
}

/// `D -> TYPE NAME | TYPE NAME '(' (D (',' D)*)? ')' BLOCK`
pub fn parse_decl(parser: &mut Parser) -> Result<NodeId, Error> {
    let start = parser.get_position();
    let ty = parse_type(parser)?;
    let name = parse_name(parser, "expected a name after the type")?;

    if parser.current_token_kind() != TokenKind::OpenParen {
        let decl = parser.node(NodeKind::Decl, start);
        parser.tree_mut().add_kid(decl, ty);
        parser.tree_mut().add_kid(decl, name);
        return Ok(decl);
    }

    let formals_start = parser.advance().span.start.clone();
    let mut params = vec![];

    if parser.current_token_kind() != TokenKind::CloseParen {
        params.push(parse_formal(parser)?);
        while parser.current_token_kind() == TokenKind::Comma {
            parser.advance();
            params.push(parse_formal(parser)?);
        }
    }

    parser.expect_detailed(TokenKind::CloseParen, "expected `,` or `)` in parameter list")?;

    let formals = parser.node(NodeKind::Formals, formals_start);
    for param in params {
        parser.tree_mut().add_kid(formals, param);
    }

    let body = parse_block(parser)?;

    let function = parser.node(NodeKind::FunctionDecl, start);
    for kid in [ty, name, formals, body] {
        parser.tree_mut().add_kid(function, kid);
    }
    Ok(function)
}

/// A formal parameter is a plain `TYPE NAME` declaration.
fn parse_formal(parser: &mut Parser) -> Result<NodeId, Error> {
    let start = parser.get_position();
    let ty = parse_type(parser)?;
    let name = parse_name(parser, "expected a parameter name")?;

    let decl = parser.node(NodeKind::Decl, start);
    parser.tree_mut().add_kid(decl, ty);
    parser.tree_mut().add_kid(decl, name);
    Ok(decl)
}

fn parse_name(parser: &mut Parser, message: &str) -> Result<NodeId, Error> {
    let token = parser.expect_detailed(TokenKind::Identifier, message)?;
    Ok(parser.leaf(NodeKind::Id(Symbol::new(&token.value)), &token))
}

/// `'if' E 'then' BLOCK ('else' BLOCK)?`
pub fn parse_if_stmt(parser: &mut Parser) -> Result<NodeId, Error> {
    let start = parser.advance().span.start.clone();

    let condition = parse_expr(parser, BindingPower::Default)?;
    parser.expect_detailed(TokenKind::Then, "expected `then` after the condition")?;
    let then_block = parse_block(parser)?;

    let else_block = if parser.current_token_kind() == TokenKind::Else {
        parser.advance();
        Some(parse_block(parser)?)
    } else {
        None
    };

    let stmt = parser.node(NodeKind::If, start);
    parser.tree_mut().add_kid(stmt, condition);
    parser.tree_mut().add_kid(stmt, then_block);
    if let Some(else_block) = else_block {
        parser.tree_mut().add_kid(stmt, else_block);
    }
    Ok(stmt)
}

/// `'while' E BLOCK`
pub fn parse_while_stmt(parser: &mut Parser) -> Result<NodeId, Error> {
    let start = parser.advance().span.start.clone();

    let condition = parse_expr(parser, BindingPower::Default)?;
    let body = parse_block(parser)?;

    let stmt = parser.node(NodeKind::While, start);
    parser.tree_mut().add_kid(stmt, condition);
    parser.tree_mut().add_kid(stmt, body);
    Ok(stmt)
}

/// `'unless' E 'then' BLOCK`
pub fn parse_unless_stmt(parser: &mut Parser) -> Result<NodeId, Error> {
    let start = parser.advance().span.start.clone();

    let condition = parse_expr(parser, BindingPower::Default)?;
    parser.expect_detailed(TokenKind::Then, "expected `then` after the condition")?;
    let body = parse_block(parser)?;

    let stmt = parser.node(NodeKind::Unless, start);
    parser.tree_mut().add_kid(stmt, condition);
    parser.tree_mut().add_kid(stmt, body);
    Ok(stmt)
}

/// `'select' NAME '{' SELECTOR+ '}'` with `SELECTOR -> '[' E ']' '->' BLOCK`
pub fn parse_select_stmt(parser: &mut Parser) -> Result<NodeId, Error> {
    let start = parser.advance().span.start.clone();

    let name = parse_name(parser, "expected the name to select on")?;
    let block_start = parser
        .expect_detailed(TokenKind::OpenCurly, "expected `{` after the selected name")?
        .span
        .start;

    let mut selectors = vec![];
    loop {
        let selector_start = parser
            .expect_detailed(TokenKind::OpenBracket, "expected `[` to open a selector")?
            .span
            .start;
        let guard = parse_expr(parser, BindingPower::Default)?;
        parser.expect_detailed(TokenKind::CloseBracket, "expected `]` after the selector guard")?;
        parser.expect_detailed(TokenKind::Arrow, "expected `->` after the selector guard")?;
        let body = parse_block(parser)?;

        let selector = parser.node(NodeKind::Selector, selector_start);
        parser.tree_mut().add_kid(selector, guard);
        parser.tree_mut().add_kid(selector, body);
        selectors.push(selector);

        if parser.current_token_kind() != TokenKind::OpenBracket {
            break;
        }
    }

    parser.expect(TokenKind::CloseCurly)?;

    let select_block = parser.node(NodeKind::SelectBlock, block_start);
    for selector in selectors {
        parser.tree_mut().add_kid(select_block, selector);
    }

    let stmt = parser.node(NodeKind::Select, start);
    parser.tree_mut().add_kid(stmt, name);
    parser.tree_mut().add_kid(stmt, select_block);
    Ok(stmt)
}

/// `'return' E`
pub fn parse_return_stmt(parser: &mut Parser) -> Result<NodeId, Error> {
    let start = parser.advance().span.start.clone();
    let value = parse_expr(parser, BindingPower::Default)?;

    let stmt = parser.node(NodeKind::Return, start);
    parser.tree_mut().add_kid(stmt, value);
    Ok(stmt)
}

pub fn parse_block_stmt(parser: &mut Parser) -> Result<NodeId, Error> {
    parse_block(parser)
}

/// `NAME '=' E`
pub fn parse_assign_stmt(parser: &mut Parser) -> Result<NodeId, Error> {
    let start = parser.get_position();
    let name = parse_name(parser, "expected a name")?;
    parser.expect_detailed(TokenKind::Assignment, "expected `=` in assignment")?;
    let value = parse_expr(parser, BindingPower::Default)?;

    let stmt = parser.node(NodeKind::Assign, start);
    parser.tree_mut().add_kid(stmt, name);
    parser.tree_mut().add_kid(stmt, value);
    Ok(stmt)
}
