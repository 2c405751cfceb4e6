use crate::{
    expr::Expr,
    stmt::Stmt,
    value::Value,
};

/// Renders an expression as a parenthesised prefix tree, e.g.
/// `(* (- 123) (group 45.67))`.
pub fn print(e: &Expr) -> String {
    match e {
        Expr::Assign(a) => parenthesize(&format!("= {}", a.name.lexeme), &[a.value.as_ref()]),
        Expr::Binary(b) => parenthesize(&b.op.lexeme, &[b.left.as_ref(), b.right.as_ref()]),
        Expr::Grouping(g) => parenthesize("group", &[g.expression.as_ref()]),
        Expr::Literal(l) => match &l.value {
            Value::String(s) => format!("{:?}", s),
            value => value.to_string(),
        },
        Expr::Unary(u) => parenthesize(&u.op.lexeme, &[u.right.as_ref()]),
        Expr::Variable(v) => v.name.lexeme.clone(),
    }
}

pub fn print_stmt(s: &Stmt) -> String {
    match s {
        Stmt::Block(b) => {
            let mut out = String::from("(block");
            for statement in &b.statements {
                out.push(' ');
                out.push_str(&print_stmt(statement));
            }
            out.push(')');
            out
        },
        Stmt::Declare(d) => match &d.initializer {
            Some(initializer) => format!("(var {} {})", d.name.lexeme, print(initializer)),
            None => format!("(var {})", d.name.lexeme),
        },
        Stmt::Expression(e) => format!("(; {})", print(&e.expression)),
        Stmt::Print(p) => format!("(print {})", print(&p.expression)),
    }
}

fn parenthesize(name: &str, exprs: &[&Expr]) -> String {
    let mut s = String::new();
    s.push('(');
    s.push_str(name);

    for e in exprs.iter() {
        s.push(' ');
        s.push_str(print(e).as_str());
    }

    s.push(')');
    s
}
