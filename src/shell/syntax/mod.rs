pub mod ast;
pub mod lexer;
pub mod parser;
pub mod tokens;

use self::ast::Pipeline;
use thiserror::Error;

#[derive(Error, Debug, PartialEq, Eq)]
pub enum ParseError {
    /// Nothing to run: blank or comment-only input.
    #[error("empty command")]
    Empty,
    #[error("missing file name after `{0}`")]
    MissingOperand(String),
}

/// Lexes and parses one line.
pub fn compile(line: &str) -> Result<Pipeline, ParseError> {
    parser::parse(&lexer::tokenize(line))
}
