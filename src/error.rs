use thiserror::Error;

use crate::codegen::UnsupportedConstructError;
use crate::lexer::{LexError, Position};
use crate::parser::ParseError;
use crate::signatures::SignatureResolutionError;
use crate::symbols::DeclarationError;

/// Any failure of a translation. The first error aborts the whole
/// compilation; there is never partial output.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TranslateError {
    #[error(transparent)]
    Lex(#[from] LexError),

    #[error(transparent)]
    Parse(#[from] ParseError),

    #[error(transparent)]
    Declaration(#[from] DeclarationError),

    #[error(transparent)]
    Unsupported(#[from] UnsupportedConstructError),

    #[error(transparent)]
    SignatureResolution(#[from] SignatureResolutionError),
}

impl TranslateError {
    pub fn position(&self) -> Position {
        match self {
            TranslateError::Lex(e) => e.position(),
            TranslateError::Parse(e) => e.position,
            TranslateError::Declaration(e) => e.position,
            TranslateError::Unsupported(e) => e.position,
            TranslateError::SignatureResolution(e) => e.position,
        }
    }

    /// Short stable name of the error class, used in JSON reports.
    pub fn category(&self) -> &'static str {
        match self {
            TranslateError::Lex(_) => "lex",
            TranslateError::Parse(_) => "parse",
            TranslateError::Declaration(_) => "declaration",
            TranslateError::Unsupported(_) => "unsupported",
            TranslateError::SignatureResolution(_) => "signature",
        }
    }
}
