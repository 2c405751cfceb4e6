use crate::{
    error::{Error, Result},
    token::{Token, TokenKind},
};
use peekmore::{PeekMore, PeekMoreIterator};
use phf::phf_map;
use std::str::Chars;
use tracing::{debug, trace};

static KEYWORDS: phf::Map<&'static str, TokenKind> = phf_map! {
    "and" => TokenKind::And,
    "class" => TokenKind::Class,
    "else" => TokenKind::Else,
    "false" => TokenKind::False,
    "for" => TokenKind::For,
    "fun" => TokenKind::Fun,
    "if" => TokenKind::If,
    "nil" => TokenKind::Nil,
    "or" => TokenKind::Or,
    "print" => TokenKind::Print,
    "return" => TokenKind::Return,
    "super" => TokenKind::Super,
    "this" => TokenKind::This,
    "true" => TokenKind::True,
    "var" => TokenKind::Var,
    "while" => TokenKind::While,
};

/// Turns source text into tokens, one at a time.
///
/// Iterating yields every token or lexical error in source order; a bad
/// character never stops the scan. The iterator does not produce the final
/// `EndOfFile` token, `scan_tokens` appends it.
pub struct Scanner<'a> {
    src: PeekMoreIterator<Chars<'a>>,
    lexeme_buffer: String,
    line: usize,
    column: usize,
    start_line: usize,
    start_column: usize,
}

impl <'a> Iterator for Scanner<'a> {
    type Item = Result<Token>;

    fn next(&mut self) -> Option<Result<Token>> {
        loop {
            self.start_line = self.line;
            self.start_column = self.column;

            let kind = self.next_token_kind()?;

            let lexeme = self.lexeme_buffer.clone();
            self.lexeme_buffer.clear();

            if let Some(kind) = kind {
                return Some(kind.map(|kind| Token {
                    kind,
                    lexeme,
                    line: self.start_line,
                    column: self.start_column,
                }))
            }
        }
    }
}

impl <'a> Scanner<'a> {
    pub fn new(src: &'a str) -> Self {
        Self {
            src: src.chars().peekmore(),
            lexeme_buffer: String::new(),
            line: 1,
            column: 1,
            start_line: 1,
            start_column: 1,
        }
    }

    /// Scans the whole source. Tokens for everything that scanned cleanly
    /// come back in order, terminated by `EndOfFile`, alongside every
    /// lexical error met on the way.
    pub fn scan_tokens(mut self) -> (Vec<Token>, Vec<Error>) {
        let mut tokens = Vec::new();
        let mut errors = Vec::new();

        for result in &mut self {
            match result {
                Ok(token) => {
                    trace!(%token, "scanned");
                    tokens.push(token)
                },
                Err(e) => {
                    debug!(error = %e, "lexical error");
                    errors.push(e)
                },
            }
        }

        tokens.push(Token {
            kind: TokenKind::EndOfFile,
            lexeme: "".to_string(),
            line: self.line,
            column: self.column,
        });
        debug!(tokens = tokens.len(), errors = errors.len(), "scan finished");
        (tokens, errors)
    }

    /// `None` once the source is exhausted, `Some(None)` for skipped input
    /// such as whitespace and comments.
    fn next_token_kind(&mut self) -> Option<Option<Result<TokenKind>>> {
        let next_char = self.advance()?;

        use TokenKind::*;
        let kind = match next_char {
            '(' => Some(Ok(LeftParen)),
            ')' => Some(Ok(RightParen)),
            '{' => Some(Ok(LeftBrace)),
            '}' => Some(Ok(RightBrace)),
            ',' => Some(Ok(Comma)),
            '.' => Some(Ok(Dot)),
            '-' => Some(Ok(Minus)),
            '+' => Some(Ok(Plus)),
            ';' => Some(Ok(Semicolon)),
            '*' => Some(Ok(Star)),
            '!' => Some(Ok(if self.does_next_match('=') { BangEqual } else { Bang })),
            '=' => Some(Ok(if self.does_next_match('=') { EqualEqual } else { Equal })),
            '<' => Some(Ok(if self.does_next_match('=') { LessEqual } else { Less })),
            '>' => Some(Ok(if self.does_next_match('=') { GreaterEqual } else { Greater })),
            '/' => {
                if self.does_next_match('/') { // is this a comment?
                    self.advance_until_match('\n');
                    None
                } else {
                    Some(Ok(Slash))
                }
            },
            ' ' | '\r' | '\t' | '\n' => None,
            '"' => Some(self.extract_string()),
            c if c.is_ascii_digit() => Some(self.extract_number()),
            c if can_start_identifier(&c) => Some(self.extract_identifier()),
            c => Some(Err(Error::lexical(
                self.start_line,
                self.start_column,
                format!("Unexpected character '{}'.", c),
            ))),
        };
        Some(kind)
    }

    /// Consumes one character, keeping the line and column counters current.
    fn advance(&mut self) -> Option<char> {
        let c = self.src.next()?;
        self.lexeme_buffer.push(c);
        if c == '\n' {
            self.line += 1;
            self.column = 1;
        } else {
            self.column += 1;
        }
        Some(c)
    }

    fn peek_second(&mut self) -> Option<char> {
        let second = self.src.peek_next().copied();
        self.src.reset_cursor();
        second
    }

    fn does_next_match(&mut self, c: char) -> bool {
        match self.src.peek() {
            Some(next) if c == *next => {
                self.advance();
                true
            }
            _ => false,
        }
    }

    fn extract_string(&mut self) -> Result<TokenKind> {
        self.advance_until_match('"');
        match self.advance() {
            None => Err(Error::lexical(
                self.start_line,
                self.start_column,
                "Unterminated string literal.",
            )),
            Some(_) => { // must be the closing quote due to advance_until_match
                let contents = &self.lexeme_buffer[1..self.lexeme_buffer.len() - 1];
                Ok(TokenKind::String(contents.to_string()))
            },
        }
    }

    fn extract_number(&mut self) -> Result<TokenKind> {
        self.advance_until(|n| !n.is_ascii_digit());

        if let Some(&'.') = self.src.peek() {
            if let Some(maybe_digit) = self.peek_second() {
                if maybe_digit.is_ascii_digit() {
                    self.advance();
                    self.advance_until(|n| !n.is_ascii_digit());
                }
            }
        }

        match self.lexeme_buffer.parse() {
            Err(_) => Err(Error::lexical(
                self.start_line,
                self.start_column,
                format!("Could not convert {} into a number.", self.lexeme_buffer),
            )),
            Ok(number) => Ok(TokenKind::Number(number)),
        }
    }

    fn extract_identifier(&mut self) -> Result<TokenKind> {
        self.advance_until(|n| !is_part_of_valid_identifier(n));

        let text = self.lexeme_buffer.as_str();
        match KEYWORDS.get(text) {
            Some(token) => Ok(token.clone()),
            None => Ok(TokenKind::Identifier)
        }
    }

    fn advance_until_match(&mut self, c: char) {
        self.advance_until(|n| n == &c)
    }

    fn advance_until(&mut self, should_stop: impl Fn(&char) -> bool) {
        while let Some(next) = self.src.peek() {
            if should_stop(next) { break }
            self.advance();
        }
    }
}

fn can_start_identifier(c: &char) -> bool {
    c.is_ascii_alphabetic() || c == &'_'
}

fn is_part_of_valid_identifier(c: &char) -> bool {
    can_start_identifier(c) || c.is_ascii_digit()
}
