use crate::ast::*;

pub fn to_sexp(program: &Program) -> String {
    let mut buf = String::new();
    for stmt in &program.statements {
        sexp_stmt(&mut buf, stmt);
        buf.push('\n');
    }
    buf
}

pub fn to_json(program: &Program) -> String {
    serde_json::to_string_pretty(program).unwrap_or_else(|e| format!("{{\"error\": \"{e}\"}}"))
}

fn sexp_stmt(buf: &mut String, stmt: &Stmt) {
    match stmt {
        Stmt::Expression(e) => sexp_expr(buf, &e.expression),
        Stmt::Print(p) => {
            buf.push_str("(display ");
            sexp_expr(buf, &p.expression);
            buf.push(')');
        }
        Stmt::Scan(s) => {
            buf.push_str("(scan");
            for target in &s.targets {
                buf.push(' ');
                buf.push_str(&target.name);
            }
            buf.push(')');
        }
        Stmt::Var(v) => {
            buf.push_str(&format!("({} {}", v.declared_type, v.name));
            if let Some(ref init) = v.initializer {
                buf.push(' ');
                sexp_expr(buf, init);
            }
            buf.push(')');
        }
        Stmt::Block(b) => {
            buf.push_str("(block");
            for stmt in &b.statements {
                buf.push(' ');
                sexp_stmt(buf, stmt);
            }
            buf.push(')');
        }
        Stmt::If(i) => {
            buf.push_str("(if ");
            sexp_expr(buf, &i.condition);
            buf.push(' ');
            sexp_stmt(buf, &i.then_branch);
            if let Some(ref else_branch) = i.else_branch {
                buf.push(' ');
                sexp_stmt(buf, else_branch);
            }
            buf.push(')');
        }
        Stmt::While(w) => {
            buf.push_str("(while ");
            sexp_expr(buf, &w.condition);
            buf.push(' ');
            sexp_stmt(buf, &w.body);
            buf.push(')');
        }
    }
}

fn sexp_expr(buf: &mut String, expr: &Expr) {
    match expr {
        Expr::Binary(b) => {
            buf.push('(');
            buf.push_str(&b.operator.to_string());
            buf.push(' ');
            sexp_expr(buf, &b.left);
            buf.push(' ');
            sexp_expr(buf, &b.right);
            buf.push(')');
        }
        Expr::Unary(u) => {
            buf.push('(');
            buf.push_str(&u.operator.to_string());
            buf.push(' ');
            sexp_expr(buf, &u.operand);
            buf.push(')');
        }
        Expr::Literal(l) => match &l.value {
            LiteralValue::Int(n) => buf.push_str(&n.to_string()),
            LiteralValue::Float(n) => buf.push_str(&format!("{n:?}")),
            LiteralValue::Char(c) => buf.push_str(&format!("'{c}'")),
            LiteralValue::Str(s) => {
                buf.push('"');
                buf.push_str(s);
                buf.push('"');
            }
            LiteralValue::Bool(b) => buf.push_str(if *b { "TRUE" } else { "FALSE" }),
            LiteralValue::Nil => buf.push_str("NIL"),
        },
        Expr::Grouping(g) => {
            buf.push_str("(group ");
            sexp_expr(buf, &g.expression);
            buf.push(')');
        }
        Expr::Variable(v) => buf.push_str(&v.name),
        Expr::Assign(a) => {
            buf.push_str("(= ");
            buf.push_str(&a.name);
            buf.push(' ');
            sexp_expr(buf, &a.value);
            buf.push(')');
        }
        Expr::Logical(l) => {
            buf.push('(');
            buf.push_str(&l.operator.to_string());
            buf.push(' ');
            sexp_expr(buf, &l.left);
            buf.push(' ');
            sexp_expr(buf, &l.right);
            buf.push(')');
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scanner::token::Span;

    fn literal(value: LiteralValue, offset: usize) -> Box<Expr> {
        Box::new(Expr::Literal(LiteralExpr {
            value,
            span: Span::new(offset, 1, 2),
        }))
    }

    #[test]
    fn sexp_binary_expression() {
        let program = Program {
            statements: vec![Stmt::Expression(ExprStmt {
                expression: Expr::Binary(BinaryExpr {
                    left: literal(LiteralValue::Int(1), 0),
                    operator: BinaryOp::Add,
                    right: Box::new(Expr::Binary(BinaryExpr {
                        left: literal(LiteralValue::Float(2.0), 4),
                        operator: BinaryOp::Multiply,
                        right: literal(LiteralValue::Float(3.5), 8),
                        span: Span::new(4, 5, 2),
                    })),
                    span: Span::new(0, 9, 2),
                }),
                span: Span::new(0, 9, 2),
            })],
        };
        let result = to_sexp(&program);
        assert_eq!(result.trim(), "(+ 1 (* 2.0 3.5))");
    }

    #[test]
    fn sexp_declaration_and_scan() {
        let program = Program {
            statements: vec![
                Stmt::Var(VarDecl {
                    name: "c".to_string(),
                    name_span: Span::new(5, 1, 2),
                    declared_type: DeclaredType::Char,
                    initializer: Some(*literal(LiteralValue::Char('x'), 9)),
                    span: Span::new(0, 12, 2),
                }),
                Stmt::Scan(ScanStmt {
                    targets: vec![VariableExpr {
                        name: "c".to_string(),
                        span: Span::new(19, 1, 3),
                    }],
                    span: Span::new(13, 7, 3),
                }),
            ],
        };
        assert_eq!(to_sexp(&program), "(CHAR c 'x')\n(scan c)\n");
    }

    #[test]
    fn json_output_is_valid() {
        let program = Program {
            statements: vec![Stmt::Var(VarDecl {
                name: "x".to_string(),
                name_span: Span::new(4, 1, 2),
                declared_type: DeclaredType::Int,
                initializer: Some(*literal(LiteralValue::Int(42), 8)),
                span: Span::new(0, 10, 2),
            })],
        };
        let json = to_json(&program);
        let parsed: serde_json::Value =
            serde_json::from_str(&json).expect("JSON output should be valid");
        assert_eq!(parsed["statements"][0]["name"], "x");
        assert_eq!(parsed["statements"][0]["declared_type"], "Int");
        assert_eq!(parsed["statements"][0]["span"]["line"], 2);
    }
}
