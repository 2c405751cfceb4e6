use astgen::generate_ast;
use crate::expr::Expr;
use crate::token::Token;

generate_ast!(
    Stmt,
    [
        Block      => { statements: Vec<Stmt> };
        Declare    => { name: Token, initializer: Option<Expr> };
        Expression => { expression: Expr };
        Print      => { expression: Expr };
    ]
);
