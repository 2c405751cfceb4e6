use std::result;

use thiserror::Error as ThisError;

use crate::token::Token;

pub type Result<T> = result::Result<T, Error>;

#[derive(Debug)]
#[non_exhaustive]
pub enum ErrorKind {
    Lexical { line: usize, column: usize },
    Syntactic { token: Token },
    Runtime { token: Token },
    Unexpected,
    Io(std::io::Error),
}

#[derive(Debug, ThisError)]
#[error("{}: {}", .kind.header(), .message)]
pub struct Error {
    kind: ErrorKind,
    message: String,
}

impl Error {
    pub fn lexical<S: Into<String>>(line: usize, column: usize, message: S) -> Error {
        let kind = ErrorKind::Lexical { line, column };
        Error { kind, message: message.into() }
    }

    pub fn syntactic<S: Into<String>>(token: Token, message: S) -> Error {
        let kind = ErrorKind::Syntactic { token };
        Error { kind, message: message.into() }
    }

    pub fn runtime<S: Into<String>>(token: Token, message: S) -> Error {
        let kind = ErrorKind::Runtime { token };
        Error { kind, message: message.into() }
    }

    pub fn unexpected() -> Error {
        let kind = ErrorKind::Unexpected;
        Error { kind, message: "Unexpected end of input.".into() }
    }

    pub fn kind(&self) -> &ErrorKind {
        &self.kind
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    pub fn is_lexical_error(&self) -> bool {
        matches!(self.kind(), ErrorKind::Lexical { .. })
    }

    pub fn is_syntax_error(&self) -> bool {
        matches!(self.kind(), ErrorKind::Syntactic { .. } | ErrorKind::Unexpected)
    }

    pub fn is_runtime_error(&self) -> bool {
        matches!(self.kind(), ErrorKind::Runtime { .. })
    }
}

impl ErrorKind {
    fn header(&self) -> String {
        use ErrorKind::*;
        match self {
            Lexical { line, column } => format!("[line {}, column {}] Error", line, column),
            Syntactic { token } | Runtime { token } => {
                let loc = if token.is_end() {
                    " at end".to_string()
                } else {
                    format!(" at '{}'", token.lexeme)
                };
                format!("[line {}, column {}] Error{}", token.line, token.column, loc)
            },
            Unexpected | Io(_) => "Error".to_string(),
        }
    }
}

impl From<std::io::Error> for Error {
    fn from(e: std::io::Error) -> Error {
        let message = e.to_string();
        Error { kind: ErrorKind::Io(e), message }
    }
}
