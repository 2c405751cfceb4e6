use std::fmt::{self, Display};

use crate::value::Value;

#[derive(Debug, PartialEq, Clone)]
pub struct Token {
    pub(crate) kind: TokenKind,
    pub(crate) lexeme: String,
    pub(crate) line: usize,
    pub(crate) column: usize,
}

#[derive(Debug, PartialEq, Clone)]
pub enum TokenKind {
    LeftParen, RightParen, LeftBrace, RightBrace,
    Comma, Dot, Minus, Plus, Semicolon, Slash, Star,

    Bang, BangEqual,
    Equal, EqualEqual,
    Greater, GreaterEqual,
    Less, LessEqual,

    Identifier, String(String), Number(f64),

    And, Class, Else, False, Fun, For, If, Nil, Or,
    Print, Return, Super, This, True, Var, While,

    EndOfFile,
}

impl Token {
    pub fn new<S: Into<String>>(kind: TokenKind, lexeme: S, line: usize, column: usize) -> Self {
        Token { kind, lexeme: lexeme.into(), line, column }
    }

    pub fn kind(&self) -> &TokenKind {
        &self.kind
    }

    pub fn lexeme(&self) -> &str {
        &self.lexeme
    }

    pub fn line(&self) -> usize {
        self.line
    }

    pub fn column(&self) -> usize {
        self.column
    }

    /// The value a number or string token denotes, `None` for every other kind.
    pub fn literal(&self) -> Option<Value> {
        match &self.kind {
            TokenKind::Number(n) => Some(Value::Number(*n)),
            TokenKind::String(s) => Some(Value::String(s.clone())),
            _ => None,
        }
    }

    pub fn is_end(&self) -> bool {
        self.kind == TokenKind::EndOfFile
    }
}

/// Renders `<lexeme> <KIND> line:<line> column:<column>`, the token dump format.
impl Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} {} line:{} column:{}",
            self.lexeme,
            self.kind.name(),
            self.line,
            self.column
        )
    }
}

impl TokenKind {
    pub fn name(&self) -> &'static str {
        use TokenKind::*;
        match self {
            LeftParen => "LEFT_PAREN",
            RightParen => "RIGHT_PAREN",
            LeftBrace => "LEFT_BRACE",
            RightBrace => "RIGHT_BRACE",
            Comma => "COMMA",
            Dot => "DOT",
            Minus => "MINUS",
            Plus => "PLUS",
            Semicolon => "SEMICOLON",
            Slash => "SLASH",
            Star => "STAR",
            Bang => "BANG",
            BangEqual => "BANG_EQUAL",
            Equal => "EQUAL",
            EqualEqual => "EQUAL_EQUAL",
            Greater => "GREATER",
            GreaterEqual => "GREATER_EQUAL",
            Less => "LESS",
            LessEqual => "LESS_EQUAL",
            Identifier => "IDENTIFIER",
            String(_) => "STRING",
            Number(_) => "NUMBER",
            And => "AND",
            Class => "CLASS",
            Else => "ELSE",
            False => "FALSE",
            Fun => "FUN",
            For => "FOR",
            If => "IF",
            Nil => "NIL",
            Or => "OR",
            Print => "PRINT",
            Return => "RETURN",
            Super => "SUPER",
            This => "THIS",
            True => "TRUE",
            Var => "VAR",
            While => "WHILE",
            EndOfFile => "EOF",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_matches_dump_format() {
        let token = Token::new(TokenKind::Identifier, "answer", 3, 7);
        assert_eq!("answer IDENTIFIER line:3 column:7", token.to_string());
    }

    #[test]
    fn end_of_file_has_empty_lexeme_in_dump() {
        let token = Token::new(TokenKind::EndOfFile, "", 1, 1);
        assert_eq!(" EOF line:1 column:1", token.to_string());
    }

    #[test]
    fn literal_only_for_numbers_and_strings() {
        assert_eq!(
            Some(Value::Number(1.5)),
            Token::new(TokenKind::Number(1.5), "1.5", 1, 1).literal()
        );
        assert_eq!(
            Some(Value::String("hi".into())),
            Token::new(TokenKind::String("hi".into()), "\"hi\"", 1, 1).literal()
        );
        assert_eq!(None, Token::new(TokenKind::Plus, "+", 1, 1).literal());
    }
}
