use std::iter::Peekable;

use tracing::{debug, trace};

use crate::{
    error::{Error, Result},
    expr::Expr,
    stmt::Stmt,
    stack::ensure_sufficient_stack,
    token::*,
    value::Value,
};

const EQUALITY_TOKENS: &[&TokenKind] = &[
    &TokenKind::BangEqual,
    &TokenKind::EqualEqual,
];

const COMPARISON_TOKENS: &[&TokenKind] = &[
    &TokenKind::Greater,
    &TokenKind::GreaterEqual,
    &TokenKind::Less,
    &TokenKind::LessEqual,
];

const TERM_TOKENS: &[&TokenKind] = &[
    &TokenKind::Minus,
    &TokenKind::Plus,
];

const FACTOR_TOKENS: &[&TokenKind] = &[
    &TokenKind::Star,
    &TokenKind::Slash,
];

const UNARY_TOKENS: &[&TokenKind] = &[
    &TokenKind::Bang,
    &TokenKind::Minus,
];

pub struct Parser<T> {
    tokens: T,
}

impl <T: Iterator<Item = Token>> Parser<Peekable<T>> {
    pub fn new<I: IntoIterator<IntoIter = T>>(tokens: I) -> Self {
        let tokens = tokens.into_iter().peekable();
        Parser { tokens }
    }

    /// Parses every statement up to the end of input. After a syntax error
    /// the parser skips ahead to the next statement boundary and carries on,
    /// so all errors in the source are reported in one go.
    pub fn parse(&mut self) -> Vec<Result<Stmt>> {
        let mut statements = Vec::new();
        while !self.is_end() {
            let result = self.parse_statement();
            if let Err(e) = &result {
                debug!(error = %e, "syntax error, resynchronising");
                self.synchronise();
            }
            statements.push(result);
        }
        statements
    }

    /// Parses exactly one statement. The first token that does not fit the
    /// grammar aborts the statement with a syntax error.
    pub fn parse_statement(&mut self) -> Result<Stmt> {
        let statement = ensure_sufficient_stack(|| self.statement())?;
        trace!(?statement, "parsed");
        Ok(statement)
    }

    fn statement(&mut self) -> Result<Stmt> {
        if self.match_single(&TokenKind::Var).is_some() {
            self.var_declaration()
        } else if self.match_single(&TokenKind::Print).is_some() {
            self.print_statement()
        } else if self.match_single(&TokenKind::LeftBrace).is_some() {
            self.block().map(Stmt::new_block)
        } else if self.is_end() {
            Err(self.error_at_next("Expected statement."))
        } else {
            self.expression_statement()
        }
    }

    /// True once nothing but the end-of-input marker is left.
    pub fn is_end(&mut self) -> bool {
        self.tokens.peek()
            .map(|t| t.kind == TokenKind::EndOfFile)
            .unwrap_or(true)
    }

    fn var_declaration(&mut self) -> Result<Stmt> {
        let name = self.consume(&TokenKind::Identifier, "Expected variable name.")?;

        let initializer = if self.match_single(&TokenKind::Equal).is_some() {
            Some(self.expression()?)
        } else {
            None
        };

        self.consume(&TokenKind::Semicolon, "Expected ';' after variable declaration.")?;
        Ok(Stmt::new_declare(name, initializer))
    }

    fn print_statement(&mut self) -> Result<Stmt> {
        let expression = self.expression()?;
        self.consume(&TokenKind::Semicolon, "Expected ';' after value.")?;
        Ok(Stmt::new_print(expression))
    }

    fn block(&mut self) -> Result<Vec<Stmt>> {
        let mut statements = Vec::new();

        while !self.check_next(&TokenKind::RightBrace) && !self.is_end() {
            statements.push(self.parse_statement()?);
        }

        self.consume(&TokenKind::RightBrace, "Expected '}' after block.")?;
        Ok(statements)
    }

    fn expression_statement(&mut self) -> Result<Stmt> {
        let expression = self.expression()?;
        self.consume(&TokenKind::Semicolon, "Expected ';' after expression.")?;
        Ok(Stmt::new_expression(expression))
    }

    pub(crate) fn expression(&mut self) -> Result<Expr> {
        ensure_sufficient_stack(|| self.assignment())
    }

    fn assignment(&mut self) -> Result<Expr> {
        let expr = self.equality()?;
        if let Some(equals) = self.match_single(&TokenKind::Equal) {
            if let Expr::Variable(lhs) = &expr {
                let name = lhs.name.clone();
                let value = self.assignment()?;
                Ok(Expr::new_assign(name, Box::new(value)))
            } else {
                Err(Error::syntactic(equals, "Invalid assignment target."))
            }
        } else {
            Ok(expr)
        }
    }

    fn equality(&mut self) -> Result<Expr> {
        self.match_binary_precedence_with_tokens(
            Self::comparison,
            EQUALITY_TOKENS
        )
    }

    fn comparison(&mut self) -> Result<Expr> {
        self.match_binary_precedence_with_tokens(
            Self::term,
            COMPARISON_TOKENS
        )
    }

    fn term(&mut self) -> Result<Expr> {
        self.match_binary_precedence_with_tokens(
            Self::factor,
            TERM_TOKENS
        )
    }

    fn factor(&mut self) -> Result<Expr> {
        self.match_binary_precedence_with_tokens(
            Self::unary,
            FACTOR_TOKENS
        )
    }

    fn unary(&mut self) -> Result<Expr> {
        if let Some(token) = self.match_any(UNARY_TOKENS) {
            let right = Box::new(ensure_sufficient_stack(|| self.unary())?);
            Ok(Expr::new_unary(token, right))
        } else {
            self.primary()
        }
    }

    /// A token that cannot start an expression is left in place for
    /// `synchronise` to deal with.
    fn primary(&mut self) -> Result<Expr> {
        let kind = self.tokens.peek()
            .map(|t| t.kind.clone())
            .ok_or_else(Error::unexpected)?;

        let literal = match kind {
            TokenKind::True => Value::Bool(true),
            TokenKind::False => Value::Bool(false),
            TokenKind::Nil => Value::Nil,
            TokenKind::Number(n) => n.into(),
            TokenKind::String(s) => s.into(),
            TokenKind::Identifier => {
                let name = self.tokens.next().ok_or_else(Error::unexpected)?;
                return Ok(Expr::new_variable(name))
            },
            TokenKind::LeftParen => {
                self.tokens.next();
                let expression = Box::new(self.expression()?);
                self.consume(&TokenKind::RightParen, "Expected ')' after expression.")?;
                return Ok(Expr::new_grouping(expression))
            },
            _ => return Err(self.error_at_next("Expected expression.")),
        };
        self.tokens.next();
        Ok(Expr::new_literal(literal))
    }

    fn check_next(&mut self, kind: &TokenKind) -> bool {
        self.tokens.peek()
            .map(|t| &t.kind == kind)
            .unwrap_or(false)
    }

    fn consume(&mut self, kind: &TokenKind, error_msg: &str) -> Result<Token> {
        if let Some(token) = self.match_single(kind) {
            Ok(token)
        } else {
            Err(self.error_at_next(error_msg))
        }
    }

    /// Builds a syntax error pointing at the next token without consuming it.
    fn error_at_next(&mut self, error_msg: &str) -> Error {
        match self.tokens.peek().cloned() {
            Some(t) => Error::syntactic(t, error_msg),
            None => Error::unexpected(),
        }
    }

    fn match_binary_precedence_with_tokens(
        &mut self,
        parse: impl Fn(&mut Self) -> Result<Expr>,
        kinds: &[&TokenKind]
    ) -> Result<Expr> {
        let mut e = parse(self)?;

        while let Some(token) = self.match_any(kinds) {
            let right = Box::new(parse(self)?);
            e = Expr::new_binary(Box::new(e), token, right)
        }

        Ok(e)
    }

    fn match_single(&mut self, kind: &TokenKind) -> Option<Token> {
        if self.check_next(kind) {
            self.tokens.next()
        } else {
            None
        }
    }

    fn match_any(&mut self, kinds: &[&TokenKind]) -> Option<Token> {
        kinds.iter().find_map(|k| self.match_single(k))
    }

    /// Skips to just after the next `;`, or up to the next token that starts
    /// a statement, whichever comes first.
    fn synchronise(&mut self) {
        use TokenKind::*;
        loop {
            match self.tokens.peek().map(|t| &t.kind) {
                None | Some(EndOfFile) => break,
                Some(Var) | Some(Print) | Some(LeftBrace) => break,
                Some(Semicolon) => {
                    self.tokens.next();
                    break
                },
                _ => {
                    self.tokens.next();
                },
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scanner::Scanner;
    use pretty_assertions::assert_eq;

    fn assert_tokens_parse_to_expr(tokens: Vec<Token>, expr: Expr) -> Result<()> {
        let mut parser = Parser::new(tokens);
        let parsed = parser.expression()?;
        assert_eq!(expr, parsed);
        Ok(())
    }

    fn parse_source(src: &str) -> Vec<Result<Stmt>> {
        let (tokens, errors) = Scanner::new(src).scan_tokens();
        assert!(errors.is_empty());
        Parser::new(tokens).parse()
    }

    fn parse_one(src: &str) -> Result<Stmt> {
        let (tokens, _) = Scanner::new(src).scan_tokens();
        Parser::new(tokens).parse_statement()
    }

    #[test]
    fn string_literal_token() -> Result<()> {
        assert_tokens_parse_to_expr(
            vec![
                Token::make(TokenKind::String("abc".into())),
            ],
            Expr::new_literal(Value::String("abc".into()))
        )
    }

    #[test]
    fn number_literal_token() -> Result<()> {
        assert_tokens_parse_to_expr(
            vec![
                Token::make(TokenKind::Number(5.1)),
            ],
            Expr::new_literal(Value::Number(5.1))
        )
    }

    #[test]
    fn nil_literal_token() -> Result<()> {
        assert_tokens_parse_to_expr(
            vec![
                Token::make(TokenKind::Nil),
            ],
            Expr::new_literal(Value::Nil)
        )
    }

    #[test]
    fn bool_literal_tokens() -> Result<()> {
        for (kind, expected) in [(TokenKind::True, true), (TokenKind::False, false)].iter() {
            assert_tokens_parse_to_expr(
                vec![
                    Token::make(kind.clone()),
                ],
                Expr::make(*expected)
            )?;
        }
        Ok(())
    }

    #[test]
    fn unary_op_tokens() -> Result<()> {
        let not = Token::make(TokenKind::Bang);
        assert_tokens_parse_to_expr(
            vec![
                not.clone(),
                Token::make(TokenKind::True),
            ],
            Expr::new_unary(not, Box::new(Expr::make(true)))
        )
    }

    #[test]
    fn binary_operators_are_left_associative() -> Result<()> {
        let one = Token::make(TokenKind::Number(1.0));
        let minus = Token::make(TokenKind::Minus);
        let two = Token::make(TokenKind::Number(2.0));
        let three = Token::make(TokenKind::Number(3.0));
        assert_tokens_parse_to_expr(
            vec![one, minus.clone(), two, minus.clone(), three],
            Expr::new_binary(
                Box::new(Expr::new_binary(
                    Box::new(Expr::new_literal(Value::Number(1.0))),
                    minus.clone(),
                    Box::new(Expr::new_literal(Value::Number(2.0))),
                )),
                minus,
                Box::new(Expr::new_literal(Value::Number(3.0))),
            )
        )
    }

    #[test]
    fn factor_binds_tighter_than_term() {
        let stmt = parse_one("1 + 2 * 3;").unwrap();
        let Stmt::Expression(e) = stmt else { panic!("expected expression statement") };
        let Expr::Binary(plus) = &e.expression else { panic!("expected binary") };
        assert_eq!(TokenKind::Plus, plus.op.kind);
        assert!(matches!(*plus.right, Expr::Binary(ref b) if b.op.kind == TokenKind::Star));
    }

    #[test]
    fn assignment_is_right_associative() {
        let stmt = parse_one("a = b = 1;").unwrap();
        let Stmt::Expression(e) = stmt else { panic!("expected expression statement") };
        let Expr::Assign(outer) = &e.expression else { panic!("expected assignment") };
        assert_eq!("a", outer.name.lexeme);
        assert!(matches!(*outer.value, Expr::Assign(ref inner) if inner.name.lexeme == "b"));
    }

    #[test]
    fn invalid_assignment_target() {
        let e = parse_one("1 = 2;").unwrap_err();
        assert!(e.is_syntax_error());
        assert_eq!("Invalid assignment target.", e.message());
    }

    #[test]
    fn declaration_without_initializer() {
        let stmt = parse_one("var a;").unwrap();
        assert_eq!(
            Stmt::new_declare(Token::new(TokenKind::Identifier, "a", 1, 5), None),
            stmt
        );
    }

    #[test]
    fn declaration_requires_identifier() {
        let e = parse_one("var 123 = 1;").unwrap_err();
        assert_eq!("[line 1, column 5] Error at '123': Expected variable name.", e.to_string());
    }

    #[test]
    fn statement_keyword_is_not_an_expression() {
        let e = parse_one("var a = print 1;").unwrap_err();
        assert_eq!("Expected expression.", e.message());
    }

    #[test]
    fn missing_semicolon_reports_end() {
        let e = parse_one("print 1").unwrap_err();
        assert_eq!("[line 1, column 8] Error at end: Expected ';' after value.", e.to_string());
    }

    #[test]
    fn unclosed_grouping() {
        let e = parse_one("(1 + 2;").unwrap_err();
        assert_eq!("Expected ')' after expression.", e.message());
    }

    #[test]
    fn blocks_nest_statements() {
        let stmt = parse_one("{ var a = 1; { print a; } }").unwrap();
        let Stmt::Block(outer) = stmt else { panic!("expected block") };
        assert_eq!(2, outer.statements.len());
        assert!(matches!(outer.statements[1], Stmt::Block(_)));
    }

    #[test]
    fn unclosed_block() {
        let e = parse_one("{ print 1;").unwrap_err();
        assert_eq!("Expected '}' after block.", e.message());
    }

    #[test]
    fn parse_statement_stops_after_one_statement() {
        let (tokens, _) = Scanner::new("print 1; print 2;").scan_tokens();
        let mut parser = Parser::new(tokens);
        parser.parse_statement().unwrap();
        assert!(!parser.is_end());
        parser.parse_statement().unwrap();
        assert!(parser.is_end());
    }

    #[test]
    fn parse_statement_at_end_is_an_error() {
        let e = parse_one("").unwrap_err();
        assert_eq!("Expected statement.", e.message());
    }

    #[test]
    fn parse_reports_every_bad_statement() {
        let results = parse_source("var 1; print 2; 3 +; print 4;");
        let outcomes: Vec<bool> = results.iter().map(Result::is_ok).collect();
        assert_eq!(vec![false, true, false, true], outcomes);
    }

    #[test]
    fn error_on_closing_semicolon_does_not_hide_the_next_statement() {
        let results = parse_source("print (1; 1 +; print 3;");
        let errors: Vec<String> = results.iter()
            .filter_map(|r| r.as_ref().err())
            .map(ToString::to_string)
            .collect();
        assert_eq!(
            vec![
                "[line 1, column 9] Error at ';': Expected ')' after expression.".to_string(),
                "[line 1, column 14] Error at ';': Expected expression.".to_string(),
            ],
            errors
        );
        assert!(results.last().map_or(false, Result::is_ok));
    }

    #[test]
    fn failed_consume_leaves_the_offending_token() {
        let (tokens, _) = Scanner::new("var 1; print 2;").scan_tokens();
        let mut parser = Parser::new(tokens);
        assert!(parser.parse_statement().is_err());
        assert!(parser.check_next(&TokenKind::Number(1.0)));
    }

    #[test]
    fn stray_tokens_are_skipped_one_statement_at_a_time() {
        let results = parse_source(") print 1; ; print 2;");
        let outcomes: Vec<bool> = results.iter().map(Result::is_ok).collect();
        assert_eq!(vec![false, true, false, true], outcomes);
    }

    #[test]
    fn deeply_nested_groupings_parse() {
        let depth = 10_000;
        let src = format!("{}1{};", "(".repeat(depth), ")".repeat(depth));
        let results = parse_source(&src);
        assert_eq!(1, results.len());
        assert!(results[0].is_ok());
    }

    #[test]
    fn long_unary_chains_parse() {
        let src = format!("print {}1;", "-".repeat(10_000));
        let results = parse_source(&src);
        assert!(matches!(results[0], Ok(Stmt::Print(_))));
    }

    #[test]
    fn parse_empty_program() {
        assert!(parse_source("  // nothing here\n").is_empty());
    }

    impl Token {
        fn make(kind: TokenKind) -> Token {
            Token { kind, lexeme: "".into(), line: 0, column: 0 }
        }
    }

    impl Expr {
        fn make(b: bool) -> Expr {
            Expr::new_literal(Value::Bool(b))
        }
    }
}
