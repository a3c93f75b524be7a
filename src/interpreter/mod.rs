pub mod environment;
pub mod input;
pub mod value;

use std::cell::RefCell;
use std::io::{self, BufRead, BufReader, Write};
use std::rc::Rc;

use tracing::trace;

use crate::ast::*;
use crate::error::RuntimeError;
use crate::interpreter::environment::Environment;
use crate::interpreter::value::Value;
use crate::scanner::token::Span;

type Scope = Rc<RefCell<Environment>>;

pub struct Interpreter {
    globals: Scope,
    /// Every line produced by `DISPLAY`, in order.
    output: Vec<String>,
    /// Source of `SCAN` lines
    reader: Box<dyn BufRead>,
    /// Sink for `DISPLAY` lines (allows testing without stdout)
    writer: Box<dyn Write>,
}

impl Default for Interpreter {
    fn default() -> Self {
        Self::new()
    }
}

impl Interpreter {
    pub fn new() -> Self {
        Self::with_io(BufReader::new(io::stdin()), io::stdout())
    }

    pub fn with_io(reader: impl BufRead + 'static, writer: impl Write + 'static) -> Self {
        Self {
            globals: Rc::new(RefCell::new(Environment::new())),
            output: Vec::new(),
            reader: Box::new(reader),
            writer: Box::new(writer),
        }
    }

    /// Create an interpreter that reads `input` for SCAN and captures output.
    pub fn capturing(input: impl Into<String>) -> Self {
        Self::with_io(io::Cursor::new(input.into()), io::sink())
    }

    /// Run a program in the global scope. Globals survive between calls.
    pub fn interpret(&mut self, program: &Program) -> Result<(), RuntimeError> {
        let globals = Rc::clone(&self.globals);
        program
            .statements
            .iter()
            .try_for_each(|stmt| self.execute(stmt, &globals))
    }

    pub fn output(&self) -> &[String] {
        &self.output
    }

    pub fn globals(&self) -> &Scope {
        &self.globals
    }

    fn execute(&mut self, stmt: &Stmt, env: &Scope) -> Result<(), RuntimeError> {
        match stmt {
            Stmt::Expression(e) => {
                self.evaluate(&e.expression, env)?;
                Ok(())
            }
            Stmt::Print(p) => {
                let text = self.evaluate(&p.expression, env)?.to_string();
                self.emit(text, p.span)
            }
            Stmt::Scan(s) => self.scan(s, env),
            Stmt::Var(v) => self.declare(v, env),
            Stmt::Block(b) => {
                let scope = Rc::new(RefCell::new(Environment::with_enclosing(Rc::clone(env))));
                self.execute_block(&b.statements, &scope, b.span)
            }
            Stmt::If(i) => {
                if self.condition(&i.condition, env, "IF")? {
                    self.execute(&i.then_branch, env)
                } else if let Some(ref else_branch) = i.else_branch {
                    self.execute(else_branch, env)
                } else {
                    Ok(())
                }
            }
            Stmt::While(w) => {
                while self.condition(&w.condition, env, "WHILE")? {
                    self.execute(&w.body, env)?;
                }
                Ok(())
            }
        }
    }

    fn execute_block(
        &mut self,
        statements: &[Stmt],
        scope: &Scope,
        span: Span,
    ) -> Result<(), RuntimeError> {
        trace!(line = span.line, "enter block scope");
        let result = statements
            .iter()
            .try_for_each(|stmt| self.execute(stmt, scope));
        trace!(line = span.line, ok = result.is_ok(), "leave block scope");
        result
    }

    fn declare(&mut self, decl: &VarDecl, env: &Scope) -> Result<(), RuntimeError> {
        if env.borrow().is_defined(&decl.name) {
            return Err(RuntimeError::AlreadyDeclared {
                name: decl.name.clone(),
                span: decl.name_span,
            });
        }
        let value = match &decl.initializer {
            Some(init) => {
                let value = self.evaluate(init, env)?;
                if !value.conforms_to(decl.declared_type) {
                    return Err(RuntimeError::type_mismatch(
                        format!(
                            "cannot initialize {} variable '{}' with a {} value",
                            decl.declared_type,
                            decl.name,
                            value.type_name()
                        ),
                        init.span(),
                    ));
                }
                value
            }
            None => Value::Nil,
        };
        env.borrow_mut()
            .define(decl.name.clone(), value, decl.declared_type);
        Ok(())
    }

    fn emit(&mut self, text: String, span: Span) -> Result<(), RuntimeError> {
        writeln!(self.writer, "{text}")
            .and_then(|()| self.writer.flush())
            .map_err(|e| RuntimeError::Output {
                message: e.to_string(),
                span,
            })?;
        self.output.push(text);
        Ok(())
    }

    /// Read one line, decode every field against its target's declared
    /// type, and only then assign. A failure leaves all targets untouched.
    fn scan(&mut self, stmt: &ScanStmt, env: &Scope) -> Result<(), RuntimeError> {
        let mut targets = Vec::with_capacity(stmt.targets.len());
        for target in &stmt.targets {
            let declared = env
                .borrow()
                .get_type(&target.name)
                .ok_or_else(|| RuntimeError::undefined(&target.name, target.span))?;
            targets.push((target, declared));
        }

        let line = input::read_line_from(&mut *self.reader)
            .ok_or(RuntimeError::InputExhausted { span: stmt.span })?;
        trace!(line = stmt.span.line, input = %line, "SCAN read");

        let fields: Vec<&str> = line.split(',').collect();
        if fields.len() != targets.len() {
            return Err(RuntimeError::ScanFieldCount {
                expected: targets.len(),
                found: fields.len(),
                span: stmt.span,
            });
        }

        let decoded = targets
            .iter()
            .zip(&fields)
            .map(|((target, declared), field)| {
                input::decode_field(*declared, field).ok_or_else(|| RuntimeError::ScanDecode {
                    name: target.name.clone(),
                    input: field.to_string(),
                    declared: *declared,
                    span: target.span,
                })
            })
            .collect::<Result<Vec<_>, _>>()?;

        targets
            .iter()
            .zip(decoded)
            .try_for_each(|((target, _), value)| assign(env, &target.name, value, target.span))
    }

    fn condition(&self, expr: &Expr, env: &Scope, context: &str) -> Result<bool, RuntimeError> {
        match self.evaluate(expr, env)? {
            Value::Bool(b) => Ok(b),
            other => Err(RuntimeError::type_mismatch(
                format!("{context} condition must be BOOL, found {}", other.type_name()),
                expr.span(),
            )),
        }
    }

    fn evaluate(&self, expr: &Expr, env: &Scope) -> Result<Value, RuntimeError> {
        match expr {
            Expr::Literal(l) => Ok(Value::from(&l.value)),
            Expr::Grouping(g) => self.evaluate(&g.expression, env),
            Expr::Variable(v) => env
                .borrow()
                .get(&v.name)
                .ok_or_else(|| RuntimeError::undefined(&v.name, v.span)),
            Expr::Unary(u) => {
                let operand = self.evaluate(&u.operand, env)?;
                match (u.operator, operand) {
                    (UnaryOp::Not, Value::Bool(b)) => Ok(Value::Bool(!b)),
                    (UnaryOp::Negate, Value::Int(n)) => Ok(Value::Int(n.wrapping_neg())),
                    (UnaryOp::Negate, Value::Float(n)) => Ok(Value::Float(-n)),
                    (UnaryOp::Identity, n @ (Value::Int(_) | Value::Float(_))) => Ok(n),
                    (UnaryOp::Not, other) => Err(RuntimeError::type_mismatch(
                        format!("operand of 'NOT' must be BOOL, found {}", other.type_name()),
                        u.span,
                    )),
                    (op, other) => Err(RuntimeError::type_mismatch(
                        format!(
                            "operand of '{op}' must be INT or FLOAT, found {}",
                            other.type_name()
                        ),
                        u.span,
                    )),
                }
            }
            Expr::Binary(b) => self.evaluate_binary(b, env),
            Expr::Logical(l) => {
                let left = self.logical_operand(&l.left, env, l.operator)?;
                let short_circuit = match l.operator {
                    LogicalOp::Or => left,
                    LogicalOp::And => !left,
                };
                if short_circuit {
                    return Ok(Value::Bool(left));
                }
                self.logical_operand(&l.right, env, l.operator)
                    .map(Value::Bool)
            }
            Expr::Assign(a) => {
                let value = self.evaluate(&a.value, env)?;
                let declared = env
                    .borrow()
                    .get_type(&a.name)
                    .ok_or_else(|| RuntimeError::undefined(&a.name, a.span))?;
                if !value.conforms_to(declared) {
                    return Err(RuntimeError::type_mismatch(
                        format!(
                            "cannot assign a {} value to {declared} variable '{}'",
                            value.type_name(),
                            a.name
                        ),
                        a.span,
                    ));
                }
                assign(env, &a.name, value.clone(), a.span)?;
                Ok(value)
            }
        }
    }

    fn logical_operand(
        &self,
        expr: &Expr,
        env: &Scope,
        operator: LogicalOp,
    ) -> Result<bool, RuntimeError> {
        match self.evaluate(expr, env)? {
            Value::Bool(b) => Ok(b),
            other => Err(RuntimeError::type_mismatch(
                format!(
                    "operands of '{operator}' must be BOOL, found {}",
                    other.type_name()
                ),
                expr.span(),
            )),
        }
    }

    fn evaluate_binary(&self, b: &BinaryExpr, env: &Scope) -> Result<Value, RuntimeError> {
        let left = self.evaluate(&b.left, env)?;
        let right = self.evaluate(&b.right, env)?;

        match b.operator {
            BinaryOp::Concat => Ok(Value::Str(format!("{left}{right}"))),
            BinaryOp::Equal => Ok(Value::Bool(left.is_equal(&right))),
            BinaryOp::NotEqual => Ok(Value::Bool(!left.is_equal(&right))),
            op => match (left, right) {
                (Value::Int(l), Value::Int(r)) => int_op(op, l, r, b.span),
                (Value::Float(l), Value::Float(r)) => Ok(float_op(op, l, r)),
                (l @ (Value::Int(_) | Value::Float(_)), r @ (Value::Int(_) | Value::Float(_))) => {
                    Err(RuntimeError::MixedNumeric {
                        operator: op.to_string(),
                        left: l.type_name(),
                        right: r.type_name(),
                        span: b.span,
                    })
                }
                (l, r) => Err(RuntimeError::type_mismatch(
                    format!(
                        "operands of '{op}' must be INT or FLOAT, found {} and {}",
                        l.type_name(),
                        r.type_name()
                    ),
                    b.span,
                )),
            },
        }
    }
}

/// Update the nearest binding of `name`; assignment never creates one.
fn assign(env: &Scope, name: &str, value: Value, span: Span) -> Result<(), RuntimeError> {
    if env.borrow_mut().assign(name, value) {
        Ok(())
    } else {
        Err(RuntimeError::undefined(name, span))
    }
}

fn int_op(op: BinaryOp, l: i32, r: i32, span: Span) -> Result<Value, RuntimeError> {
    Ok(match op {
        BinaryOp::Add => Value::Int(l.wrapping_add(r)),
        BinaryOp::Subtract => Value::Int(l.wrapping_sub(r)),
        BinaryOp::Multiply => Value::Int(l.wrapping_mul(r)),
        BinaryOp::Divide | BinaryOp::Modulo if r == 0 => {
            return Err(RuntimeError::DivisionByZero { span });
        }
        BinaryOp::Divide => Value::Int(l.wrapping_div(r)),
        BinaryOp::Modulo => Value::Int(l.wrapping_rem(r)),
        BinaryOp::Less => Value::Bool(l < r),
        BinaryOp::LessEqual => Value::Bool(l <= r),
        BinaryOp::Greater => Value::Bool(l > r),
        BinaryOp::GreaterEqual => Value::Bool(l >= r),
        BinaryOp::Concat | BinaryOp::Equal | BinaryOp::NotEqual => {
            unreachable!("handled before numeric dispatch")
        }
    })
}

fn float_op(op: BinaryOp, l: f64, r: f64) -> Value {
    match op {
        BinaryOp::Add => Value::Float(l + r),
        BinaryOp::Subtract => Value::Float(l - r),
        BinaryOp::Multiply => Value::Float(l * r),
        BinaryOp::Divide => Value::Float(l / r),
        BinaryOp::Modulo => Value::Float(l % r),
        BinaryOp::Less => Value::Bool(l < r),
        BinaryOp::LessEqual => Value::Bool(l <= r),
        BinaryOp::Greater => Value::Bool(l > r),
        BinaryOp::GreaterEqual => Value::Bool(l >= r),
        BinaryOp::Concat | BinaryOp::Equal | BinaryOp::NotEqual => {
            unreachable!("handled before numeric dispatch")
        }
    }
}
