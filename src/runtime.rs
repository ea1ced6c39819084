use tracing::{debug, trace};

use crate::{
    ast::{BinaryOp, Expr, ExprKind, Literal, LogicalOp, UnaryOp},
    diagnostics::{Diagnostic, DiagnosticKind, EepError, Result},
    environment::Environment,
    parser,
    value::{Value, ValueKind},
};

/// Tree-walking evaluator over a borrowed, read-only environment.
///
/// Holds no state of its own between calls, so one interpreter can evaluate
/// any number of expressions.
pub struct Interpreter<'env> {
    env: &'env Environment,
}

impl<'env> Interpreter<'env> {
    pub fn new(env: &'env Environment) -> Self {
        Self { env }
    }

    /// Scans, parses and evaluates `source`, stopping at the first failing stage.
    pub fn eval_source(&self, source: &str) -> Result<Value> {
        let expr = parser::parse_source(source).map_err(|diag| {
            debug!(kind = %diag.kind, message = %diag.message, "front end rejected expression");
            EepError::from(diag)
        })?;
        self.evaluate(&expr).map_err(|err| {
            debug!(error = %err, "evaluation failed");
            err
        })
    }

    /// Evaluates an already parsed tree.
    ///
    /// Recursion depth follows expression nesting; pathologically deep trees
    /// can exhaust the stack.
    pub fn evaluate(&self, expr: &Expr) -> Result<Value> {
        match &expr.kind {
            ExprKind::Literal(lit) => Ok(literal(lit)),
            ExprKind::Variable(name) => {
                let value = self.env.get(name);
                trace!(name = %name, found = !value.is_nil(), "resolved variable");
                Ok(value)
            }
            ExprKind::Group(inner) => self.evaluate(inner),
            ExprKind::Unary { op, expr: right } => {
                let value = self.evaluate(right)?;
                unary(*op, value, expr)
            }
            ExprKind::Binary { op, left, right } => {
                let left_value = self.evaluate(left)?;
                let right_value = self.evaluate(right)?;
                binary(*op, left_value, right_value, expr)
            }
            ExprKind::Logical { op, left, right } => {
                let left_value = self.evaluate(left)?;
                let short_circuits = match op {
                    LogicalOp::Or => left_value.is_truthy(),
                    LogicalOp::And => !left_value.is_truthy(),
                };
                if short_circuits {
                    Ok(left_value)
                } else {
                    self.evaluate(right)
                }
            }
            ExprKind::Call { callee, args, paren } => {
                let callee_value = self.evaluate(callee)?;
                let mut eval_args = Vec::with_capacity(args.len());
                for arg in args {
                    eval_args.push(self.evaluate(arg)?);
                }
                match &*callee_value.0 {
                    ValueKind::Function(fun) => {
                        trace!(function = %fun.name, args = eval_args.len(), "calling host");
                        fun.call(&eval_args)
                    }
                    _ => Err(runtime_error(
                        format!(
                            "callee `{callee_value}` ({}) is an illegal function type",
                            callee_value.type_name()
                        ),
                        expr,
                    )
                    .with_note(format!("call closed at line {}", paren.line))
                    .into()),
                }
            }
        }
    }
}

fn literal(literal: &Literal) -> Value {
    match literal {
        Literal::Number(n) => Value::number(*n),
        Literal::String(s) => Value::string(s.clone()),
        Literal::Bool(b) => Value::bool(*b),
        Literal::Nil => Value::nil(),
    }
}

fn unary(op: UnaryOp, value: Value, expr: &Expr) -> Result<Value> {
    match op {
        UnaryOp::Not => Ok(Value::bool(!value.is_truthy())),
        UnaryOp::Negate => match &*value.0 {
            ValueKind::Number(n) => Ok(Value::number(-n)),
            _ => Err(runtime_error(
                format!(
                    "`{op}` operand must be a number, found {}",
                    value.type_name()
                ),
                expr,
            )
            .into()),
        },
    }
}

fn binary(op: BinaryOp, left: Value, right: Value, expr: &Expr) -> Result<Value> {
    use BinaryOp::*;
    match op {
        Add => match (&*left.0, &*right.0) {
            (ValueKind::Number(a), ValueKind::Number(b)) => Ok(Value::number(a + b)),
            (ValueKind::String(a), ValueKind::String(b)) => {
                let mut joined = String::with_capacity(a.len() + b.len());
                joined.push_str(a);
                joined.push_str(b);
                Ok(Value::string(joined))
            }
            _ => Err(runtime_error(
                format!(
                    "`{op}` operands must be two numbers or two strings, found {} and {}",
                    left.type_name(),
                    right.type_name()
                ),
                expr,
            )
            .into()),
        },
        Sub => numeric(op, &left, &right, expr, |a, b| a - b),
        Mul => numeric(op, &left, &right, expr, |a, b| a * b),
        Div => numeric(op, &left, &right, expr, |a, b| a / b),
        Greater => comparison(op, &left, &right, expr, |a, b| a > b),
        GreaterEqual => comparison(op, &left, &right, expr, |a, b| a >= b),
        Less => comparison(op, &left, &right, expr, |a, b| a < b),
        LessEqual => comparison(op, &left, &right, expr, |a, b| a <= b),
        Equal => Ok(Value::bool(left == right)),
        NotEqual => Ok(Value::bool(left != right)),
    }
}

fn numeric<F>(op: BinaryOp, left: &Value, right: &Value, expr: &Expr, func: F) -> Result<Value>
where
    F: Fn(f64, f64) -> f64,
{
    let (a, b) = numbers(op, left, right, expr)?;
    Ok(Value::number(func(a, b)))
}

fn comparison<F>(op: BinaryOp, left: &Value, right: &Value, expr: &Expr, cmp: F) -> Result<Value>
where
    F: Fn(f64, f64) -> bool,
{
    let (a, b) = numbers(op, left, right, expr)?;
    Ok(Value::bool(cmp(a, b)))
}

fn numbers(op: BinaryOp, left: &Value, right: &Value, expr: &Expr) -> Result<(f64, f64)> {
    match (left.as_number(), right.as_number()) {
        (Some(a), Some(b)) => Ok((a, b)),
        _ => Err(runtime_error(
            format!(
                "`{op}` operands must be numbers, found {} and {}",
                left.type_name(),
                right.type_name()
            ),
            expr,
        )
        .into()),
    }
}

fn runtime_error(message: String, expr: &Expr) -> Diagnostic {
    Diagnostic::new(DiagnosticKind::Runtime, message)
        .with_line(expr.line)
        .with_span(expr.span)
}
