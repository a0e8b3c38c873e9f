use crate::{
    ast::ast::{NodeId, NodeKind, Operator, Symbol},
    errors::errors::{Error, ErrorImpl},
    lexer::tokens::{Token, TokenKind},
    Span,
};

use super::{lookups::BindingPower, parser::Parser};

pub fn parse_expr(parser: &mut Parser, bp: BindingPower) -> Result<NodeId, Error> {
    // First parse NUD
    let token_kind = parser.current_token_kind();
    let nud_fn = match parser.get_nud_lookup().get(&token_kind) {
        Some(nud_fn) => *nud_fn,
        None => {
            return Err(Error::new(
                ErrorImpl::UnexpectedTokenDetailed {
                    token: parser.current_token().value.clone(),
                    message: String::from("expected an expression"),
                },
                parser.get_position(),
            ))
        }
    };

    let mut left = nud_fn(parser)?;

    // While the next operator binds tighter than the caller, keep extending lhs
    while parser.current_bp() > bp {
        let token_kind = parser.current_token_kind();
        let led_bp = parser.current_bp();
        let led_fn = match parser.get_led_lookup().get(&token_kind) {
            Some(led_fn) => *led_fn,
            None => break,
        };

        left = led_fn(parser, left, led_bp)?;
    }

    Ok(left)
}

pub fn parse_primary_expr(parser: &mut Parser) -> Result<NodeId, Error> {
    let token = parser.current_token().clone();

    let kind = match token.kind {
        TokenKind::Number => {
            let value = token.value.parse::<i64>().map_err(|_| number_error(&token))?;
            NodeKind::Int(value)
        }
        TokenKind::Hex => {
            let value = i64::from_str_radix(&token.value[2..], 16).map_err(|_| number_error(&token))?;
            NodeKind::Hex {
                text: Symbol::new(&token.value),
                value,
            }
        }
        TokenKind::String => NodeKind::Str(Symbol::new(&token.value)),
        TokenKind::Identifier => NodeKind::Id(Symbol::new(&token.value)),
        _ => {
            return Err(Error::new(
                ErrorImpl::UnexpectedToken {
                    token: token.value.clone(),
                },
                token.span.start.clone(),
            ))
        }
    };

    parser.advance();
    Ok(parser.leaf(kind, &token))
}

fn number_error(token: &Token) -> Error {
    Error::new(
        ErrorImpl::NumberParseError {
            token: token.value.clone(),
        },
        token.span.start.clone(),
    )
}

pub fn parse_binary_expr(parser: &mut Parser, left: NodeId, bp: BindingPower) -> Result<NodeId, Error> {
    let operator_token = parser.advance().clone();
    let kind = operator_kind(&operator_token)?;
    let relational = matches!(kind, NodeKind::RelOp(_));

    let right = parse_expr(parser, bp)?;

    // `a < b < c` is not part of the grammar
    if relational && parser.current_bp() == BindingPower::Relational {
        return Err(Error::new(
            ErrorImpl::UnexpectedTokenDetailed {
                token: parser.current_token().value.clone(),
                message: String::from("relational operators cannot be chained"),
            },
            parser.get_position(),
        ));
    }

    let start = node_start(parser, left, &operator_token);
    let op = parser.node(kind, start);
    parser.tree_mut().add_kid(op, left);
    parser.tree_mut().add_kid(op, right);
    Ok(op)
}

fn operator_kind(token: &Token) -> Result<NodeKind, Error> {
    let kind = match token.kind {
        TokenKind::Equals => NodeKind::RelOp(Operator::Equal),
        TokenKind::NotEquals => NodeKind::RelOp(Operator::NotEqual),
        TokenKind::Less => NodeKind::RelOp(Operator::Less),
        TokenKind::LessEquals => NodeKind::RelOp(Operator::LessEqual),
        TokenKind::Greater => NodeKind::RelOp(Operator::Greater),
        TokenKind::GreaterEquals => NodeKind::RelOp(Operator::GreaterEqual),
        TokenKind::Plus => NodeKind::AddOp(Operator::Plus),
        TokenKind::Dash => NodeKind::AddOp(Operator::Minus),
        TokenKind::Or => NodeKind::AddOp(Operator::Or),
        TokenKind::Star => NodeKind::MultOp(Operator::Multiply),
        TokenKind::Slash => NodeKind::MultOp(Operator::Divide),
        TokenKind::And => NodeKind::MultOp(Operator::And),
        TokenKind::Percent => NodeKind::MultOp(Operator::Modulo),
        _ => {
            return Err(Error::new(
                ErrorImpl::UnexpectedToken {
                    token: token.value.clone(),
                },
                token.span.start.clone(),
            ))
        }
    };

    Ok(kind)
}

pub fn parse_grouping_expr(parser: &mut Parser) -> Result<NodeId, Error> {
    parser.advance();
    let expr = parse_expr(parser, BindingPower::Default)?;
    parser.expect_detailed(TokenKind::CloseParen, "expected `)` to close the group")?;

    Ok(expr)
}

/// `NAME '(' (E (',' E)*)? ')'`, entered with the callee already parsed.
pub fn parse_call_expr(parser: &mut Parser, left: NodeId, _bp: BindingPower) -> Result<NodeId, Error> {
    let open = parser.advance().clone();

    if !matches!(parser.tree().kind(left), NodeKind::Id(_)) {
        return Err(Error::new(
            ErrorImpl::UnexpectedTokenDetailed {
                token: open.value,
                message: String::from("only a name can be called"),
            },
            open.span.start,
        ));
    }

    let mut args = vec![];

    if parser.current_token_kind() != TokenKind::CloseParen {
        args.push(parse_expr(parser, BindingPower::Default)?);
        while parser.current_token_kind() == TokenKind::Comma {
            parser.advance();
            args.push(parse_expr(parser, BindingPower::Default)?);
        }
    }

    parser.expect_detailed(TokenKind::CloseParen, "expected `,` or `)` in argument list")?;

    let start = node_start(parser, left, &open);
    let call = parser.node(NodeKind::Call, start);
    parser.tree_mut().add_kid(call, left);
    for arg in args {
        parser.tree_mut().add_kid(call, arg);
    }

    Ok(call)
}

fn node_start(parser: &Parser, left: NodeId, fallback: &Token) -> crate::Position {
    parser
        .tree()
        .span(left)
        .map(|span: &Span| span.start.clone())
        .unwrap_or_else(|| fallback.span.start.clone())
}
