use std::fmt::Display;

use thiserror::Error;

use crate::Position;

#[derive(Error, Debug, Clone)]
#[error("{internal_error}")]
pub struct Error {
    internal_error: ErrorImpl,
    position: Position,
}

impl Error {
    pub fn new(error_impl: ErrorImpl, position: Position) -> Self {
        Error {
            internal_error: error_impl,
            position,
        }
    }

    pub fn get_position(&self) -> &Position {
        &self.position
    }

    pub fn kind(&self) -> &ErrorImpl {
        &self.internal_error
    }

    /// True for errors raised by semantic analysis rather than the front end.
    pub fn is_constraint_error(&self) -> bool {
        !matches!(
            self.internal_error,
            ErrorImpl::UnrecognisedToken { .. }
                | ErrorImpl::UnexpectedToken { .. }
                | ErrorImpl::UnexpectedTokenDetailed { .. }
                | ErrorImpl::NumberParseError { .. }
        )
    }

    pub fn get_error_name(&self) -> &str {
        match &self.internal_error {
            ErrorImpl::UnrecognisedToken { .. } => "UnrecognisedToken",
            ErrorImpl::UnexpectedToken { .. } => "UnexpectedToken",
            ErrorImpl::UnexpectedTokenDetailed { .. } => "UnexpectedTokenDetailed",
            ErrorImpl::NumberParseError { .. } => "NumberParseError",
            ErrorImpl::UnboundName { .. } => "UnboundName",
            ErrorImpl::CallingNonFunction { .. } => "CallingNonFunction",
            ErrorImpl::ActualFormalTypeMismatch { .. } => "ActualFormalTypeMismatch",
            ErrorImpl::NumberActualsFormalsDiffer { .. } => "NumberActualsFormalsDiffer",
            ErrorImpl::TypeMismatchInExpr { .. } => "TypeMismatchInExpr",
            ErrorImpl::BooleanExprExpected { .. } => "BooleanExprExpected",
            ErrorImpl::BadConditional { .. } => "BadConditional",
            ErrorImpl::ReturnNotInFunction => "ReturnNotInFunction",
            ErrorImpl::BadReturnExpr { .. } => "BadReturnExpr",
            ErrorImpl::SelectorTypeMismatch { .. } => "SelectorTypeMismatch",
            ErrorImpl::BadAssignmentType { .. } => "BadAssignmentType",
            ErrorImpl::NotAVariable { .. } => "NotAVariable",
            ErrorImpl::AlreadyConstrained => "AlreadyConstrained",
        }
    }

    pub fn get_tip(&self) -> ErrorTip {
        match &self.internal_error {
            ErrorImpl::UnrecognisedToken { .. } => ErrorTip::None,
            ErrorImpl::UnexpectedToken { token } => {
                ErrorTip::Suggestion(format!("Unexpected token: `{}`", token))
            }
            ErrorImpl::UnexpectedTokenDetailed { token, message } => {
                ErrorTip::Suggestion(format!("Unexpected token: `{}`, {}", token, message))
            }
            ErrorImpl::NumberParseError { token } => ErrorTip::Suggestion(format!(
                "Invalid number: `{}`, is it above the integer limit?",
                token
            )),
            ErrorImpl::UnboundName { name } => {
                ErrorTip::Suggestion(format!("`{}` is not declared in this scope", name))
            }
            ErrorImpl::CallingNonFunction { name } => {
                ErrorTip::Suggestion(format!("`{}` is a variable, not a function", name))
            }
            ErrorImpl::ActualFormalTypeMismatch { expected, received } => {
                ErrorTip::Suggestion(format!(
                    "Expected argument type `{}`, received `{}`",
                    expected, received
                ))
            }
            ErrorImpl::NumberActualsFormalsDiffer { expected, received } => {
                ErrorTip::Suggestion(format!(
                    "Expected {} arguments, received {}",
                    expected, received
                ))
            }
            ErrorImpl::TypeMismatchInExpr { left, right } => ErrorTip::Suggestion(format!(
                "Operands have different types: `{}` and `{}`",
                left, right
            )),
            ErrorImpl::BooleanExprExpected { received } => ErrorTip::Suggestion(format!(
                "Logical operators need `boolean` operands, received `{}`",
                received
            )),
            ErrorImpl::BadConditional { received } => ErrorTip::Suggestion(format!(
                "Conditions must be `boolean`, received `{}`",
                received
            )),
            ErrorImpl::ReturnNotInFunction => {
                ErrorTip::Suggestion(String::from("`return` is only allowed inside a function"))
            }
            ErrorImpl::BadReturnExpr { expected, received } => ErrorTip::Suggestion(format!(
                "Function returns `{}`, received `{}`",
                expected, received
            )),
            ErrorImpl::SelectorTypeMismatch { expected, received } => {
                ErrorTip::Suggestion(format!(
                    "Selector guard should be `{}`, received `{}`",
                    expected, received
                ))
            }
            ErrorImpl::BadAssignmentType { expected, received } => ErrorTip::Suggestion(
                format!("Expected type `{}`, received `{}`", expected, received),
            ),
            ErrorImpl::NotAVariable { name } => {
                ErrorTip::Suggestion(format!("`{}` is a function or constant, not a variable", name))
            }
            ErrorImpl::AlreadyConstrained => ErrorTip::None,
        }
    }
}

pub enum ErrorTip {
    None,
    Suggestion(String),
}

impl Display for ErrorTip {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ErrorTip::None => write!(f, ""),
            ErrorTip::Suggestion(suggestion) => write!(f, "{}", suggestion),
        }
    }
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ErrorImpl {
    #[error("unrecognised token: {token:?}")]
    UnrecognisedToken { token: String },
    #[error("unexpected token: {token:?}")]
    UnexpectedToken { token: String },
    #[error("unexpected token ({message:?}): {token:?}")]
    UnexpectedTokenDetailed { token: String, message: String },
    #[error("error parsing number: {token:?}")]
    NumberParseError { token: String },

    #[error("name {name:?} is not bound")]
    UnboundName { name: String },
    #[error("calling non-function {name:?}")]
    CallingNonFunction { name: String },
    #[error("actual/formal types differ: expected {expected:?}, received {received:?}")]
    ActualFormalTypeMismatch { expected: String, received: String },
    #[error("number of actuals and formals differ: expected {expected:?}, received {received:?}")]
    NumberActualsFormalsDiffer { expected: usize, received: usize },
    #[error("type mismatch in expression: {left:?} and {right:?}")]
    TypeMismatchInExpr { left: String, right: String },
    #[error("boolean expression expected, received {received:?}")]
    BooleanExprExpected { received: String },
    #[error("conditional is not boolean: {received:?}")]
    BadConditional { received: String },
    #[error("return outside of a function")]
    ReturnNotInFunction,
    #[error("bad return expression: expected {expected:?}, received {received:?}")]
    BadReturnExpr { expected: String, received: String },
    #[error("selector type mismatch: expected {expected:?}, received {received:?}")]
    SelectorTypeMismatch { expected: String, received: String },
    #[error("bad assignment type: expected {expected:?}, received {received:?}")]
    BadAssignmentType { expected: String, received: String },
    #[error("{name:?} is not a variable")]
    NotAVariable { name: String },
    #[error("tree has already been constrained")]
    AlreadyConstrained,
}
