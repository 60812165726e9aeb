//! Error types for date-expression parsing and resolution.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum DateExprError {
    #[error("Malformed expression: {0}")]
    MalformedExpression(String),

    #[error("Date out of range: {0}")]
    DateRange(String),
}

pub type Result<T> = std::result::Result<T, DateExprError>;
