//! A tree-walking interpreter for a small Lox-like scripting language.
//!
//! Source text goes through three stages: the [`scanner::Scanner`] turns it
//! into tokens, the [`parser::Parser`] builds statements from those, and the
//! [`interpreter::Interpreter`] executes them against its environment.

pub mod environment;
pub mod error;
pub mod expr;
pub mod interpreter;
pub mod parser;
pub mod printer;
pub mod scanner;
mod stack;
pub mod stmt;
pub mod token;
pub mod value;

pub use crate::error::{Error, ErrorKind, Result};
