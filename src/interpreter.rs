use std::io::Write;

use tracing::{debug, trace};

use crate::{
    environment::Environment,
    error::{Error, Result},
    expr::{self, Expr},
    stack::ensure_sufficient_stack,
    stmt::{self, Stmt},
    token::{TokenKind, Token},
    value::Value,
};

/// Walks statements and expressions, keeping variables in one environment
/// that outlives every call. Printed output goes to `writer`.
pub struct Interpreter<W> {
    environment: Environment,
    writer: W,
}

impl <W: Write> Interpreter<W> {
    pub fn new(writer: W) -> Self {
        Interpreter { environment: Environment::new(), writer }
    }

    pub fn environment(&self) -> &Environment {
        &self.environment
    }

    pub fn writer(&self) -> &W {
        &self.writer
    }

    pub fn writer_mut(&mut self) -> &mut W {
        &mut self.writer
    }

    /// Runs statements in order, stopping at the first runtime error.
    /// Bindings made by the statements before it are kept.
    pub fn interpret(&mut self, statements: &[Stmt]) -> Result<()> {
        for s in statements.iter() {
            self.execute(s)?;
        }
        Ok(())
    }

    #[tracing::instrument(level = "trace", skip(self))]
    pub fn execute(&mut self, s: &Stmt) -> Result<()> {
        ensure_sufficient_stack(|| match s {
            Stmt::Block(b) => self.execute_block(&b.statements),
            Stmt::Declare(d) => self.execute_declare(d),
            Stmt::Expression(e) => {
                self.evaluate(&e.expression)?;
                Ok(())
            },
            Stmt::Print(p) => {
                let value = self.evaluate(&p.expression)?;
                writeln!(self.writer, "{}", value)?;
                Ok(())
            },
        })
    }

    pub fn evaluate(&mut self, e: &Expr) -> Result<Value> {
        let value = ensure_sufficient_stack(|| match e {
            Expr::Assign(a) => self.evaluate_assign(a),
            Expr::Binary(b) => self.evaluate_binary(b),
            Expr::Grouping(g) => self.evaluate(&g.expression),
            Expr::Literal(l) => Ok(l.value.clone()),
            Expr::Unary(u) => self.evaluate_unary(u),
            Expr::Variable(v) => self.environment.get(&v.name),
        })?;
        trace!(%value, "evaluated");
        Ok(value)
    }

    fn execute_block(&mut self, statements: &[Stmt]) -> Result<()> {
        self.environment.push_child_env();
        let result = self.interpret(statements);
        // The scope is popped on the error path as well.
        self.environment.pop_child_env();
        result
    }

    fn execute_declare(&mut self, d: &stmt::Declare) -> Result<()> {
        let value = if let Some(initializer) = &d.initializer {
            self.evaluate(initializer)?
        } else {
            Value::Nil
        };

        debug!(name = %d.name.lexeme, %value, "declare");
        self.environment.define(d.name.lexeme.clone(), value);
        Ok(())
    }

    fn evaluate_assign(&mut self, a: &expr::Assign) -> Result<Value> {
        let value = self.evaluate(&a.value)?;
        self.environment.assign(&a.name, value.clone())?;
        Ok(value)
    }

    fn evaluate_binary(&mut self, e: &expr::Binary) -> Result<Value> {
        let left = self.evaluate(e.left.as_ref())?;
        let right = self.evaluate(e.right.as_ref())?;

        use Value::{Number, String, Bool};
        match e.op.kind {
            TokenKind::Minus => compute_if_numbers(&e.op, left, right, |l, r| l - r),
            TokenKind::Plus => match (left, right) {
                (Number(left), Number(right)) => Ok(Number(left + right)),
                (String(mut left), right) => {
                    left.push_str(&right.to_string());
                    Ok(String(left))
                },
                (left, String(right)) => Ok(String(format!("{}{}", left, right))),
                (left, right) => Err(Error::runtime(
                    e.op.clone(),
                    format!(
                        "Operands of '+' must be two numbers or include a string, got {} and {}.",
                        left.type_name(),
                        right.type_name(),
                    )
                )),
            },
            TokenKind::Slash => compute_if_numbers(&e.op, left, right, |l, r| l / r),
            TokenKind::Star => compute_if_numbers(&e.op, left, right, |l, r| l * r),
            TokenKind::Greater => compute_if_numbers(&e.op, left, right, |l, r| l > r),
            TokenKind::GreaterEqual => compute_if_numbers(&e.op, left, right, |l, r| l >= r),
            TokenKind::Less => compute_if_numbers(&e.op, left, right, |l, r| l < r),
            TokenKind::LessEqual => compute_if_numbers(&e.op, left, right, |l, r| l <= r),
            TokenKind::EqualEqual => Ok(Bool(left.is_equal(&right))),
            TokenKind::BangEqual => Ok(Bool(!left.is_equal(&right))),
            _ => unreachable!("The parser only builds binary expressions from binary operators."),
        }
    }

    fn evaluate_unary(&mut self, e: &expr::Unary) -> Result<Value> {
        let right = self.evaluate(e.right.as_ref())?;

        use Value::*;
        match (&e.op.kind, right) {
            (TokenKind::Minus, Number(right)) => Ok(Number(-right)),
            (TokenKind::Minus, right) => Err(Error::runtime(
                e.op.clone(),
                format!("Operand of '-' must be a number, got {}.", right.type_name())
            )),
            (TokenKind::Bang, right) => Ok(Bool(!right.is_truthy())),
            _ => unreachable!("The parser only builds unary expressions from '!' and '-'."),
        }
    }
}

fn compute_if_numbers<T: Into<Value>>(
    op: &Token,
    left: Value,
    right: Value,
    f: impl Fn(f64, f64) -> T
) -> Result<Value> {
    match (left, right) {
        (Value::Number(left), Value::Number(right)) => Ok(f(left, right).into()),
        (left, right) => Err(Error::runtime(
            op.clone(),
            format!(
                "Operands of '{}' must be numbers, got {} and {}.",
                op.lexeme,
                left.type_name(),
                right.type_name(),
            )
        )),
    }
}
