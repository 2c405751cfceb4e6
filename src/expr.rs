use crate::token::Token;
use crate::stack::ensure_sufficient_stack;
use crate::value::Value;
use astgen::generate_ast;

generate_ast!(
    Expr,
    [
        Assign   => { name: Token, value: Box<Expr> };
        Binary   => { left: Box<Expr>, op: Token, right: Box<Expr> };
        Grouping => { expression: Box<Expr> };
        Literal  => { value: Value };
        Unary    => { op: Token, right: Box<Expr> };
        Variable => { name: Token };
    ]
);

// The derived drop glue recurses once per nesting level, so a long `-` chain
// or a deep stack of groupings would overflow while being freed.
impl Drop for Expr {
    fn drop(&mut self) {
        ensure_sufficient_stack(|| match self {
            Expr::Assign(a) => take_child(&mut a.value),
            Expr::Binary(b) => {
                take_child(&mut b.left);
                take_child(&mut b.right);
            },
            Expr::Grouping(g) => take_child(&mut g.expression),
            Expr::Unary(u) => take_child(&mut u.right),
            Expr::Literal(_) | Expr::Variable(_) => {},
        })
    }
}

/// Frees a child subtree here, on the guarded stack, leaving a leaf behind.
fn take_child(child: &mut Box<Expr>) {
    drop(std::mem::replace(child.as_mut(), Expr::new_literal(Value::Nil)));
}
