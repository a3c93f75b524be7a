use crate::ast::*;
use crate::error::CompileError;
use crate::scanner::token::{Span, Token, TokenKind};

type ParseResult<T> = Result<T, CompileError>;

pub struct Parser {
    tokens: Vec<Token>,
    current: usize,
    errors: Vec<CompileError>,
}

impl Parser {
    pub fn new(tokens: Vec<Token>) -> Self {
        Self {
            tokens,
            current: 0,
            errors: Vec::new(),
        }
    }

    /// Parse a whole program. Every recoverable error is collected; a
    /// missing `BEGIN CODE` stops parsing immediately.
    pub fn parse(mut self) -> Result<Program, Vec<CompileError>> {
        if !self.check(TokenKind::BeginCode) {
            let token = self.peek();
            return Err(vec![CompileError::parse(
                format!(
                    "expected 'BEGIN CODE' at start of program, found {}",
                    describe(token)
                ),
                token.span,
            )]);
        }
        self.advance();

        let statements = self.block_body(TokenKind::EndCode);

        if self.match_token(TokenKind::EndCode) {
            if !self.is_at_end() {
                let token = self.peek();
                let error = CompileError::parse(
                    format!("unexpected {} after 'END CODE'", describe(token)),
                    token.span,
                );
                self.errors.push(error);
            }
        } else {
            let token = self.peek();
            let error = CompileError::parse(
                format!(
                    "expected 'END CODE' at end of program, found {}",
                    describe(token)
                ),
                token.span,
            );
            self.errors.push(error);
        }

        tracing::debug!(
            statements = statements.len(),
            errors = self.errors.len(),
            "parsed program"
        );

        if self.errors.is_empty() {
            Ok(Program { statements })
        } else {
            Err(self.errors)
        }
    }

    /// Statements up to (not including) `end`, recovering from errors
    /// inside the block.
    fn block_body(&mut self, end: TokenKind) -> Vec<Stmt> {
        let mut statements = Vec::new();
        while !self.check(end) && !self.check(TokenKind::EndCode) && !self.is_at_end() {
            match self.declaration() {
                Ok(mut parsed) => statements.append(&mut parsed),
                Err(e) => {
                    self.errors.push(e);
                    self.synchronize(end);
                }
            }
        }
        statements
    }

    fn block(&mut self, begin: TokenKind, end: TokenKind, context: &str) -> ParseResult<Stmt> {
        let start = self.consume(begin, &format!("'{begin}' {context}"))?.span;
        let statements = self.block_body(end);
        self.consume(end, &format!("'{end}' to close '{begin}'"))?;
        Ok(Stmt::Block(BlockStmt {
            statements,
            span: start.to(self.previous_span()),
        }))
    }

    fn declaration(&mut self) -> ParseResult<Vec<Stmt>> {
        match DeclaredType::from_token(self.peek().kind) {
            Some(declared_type) => {
                self.advance(); // consume the type keyword
                self.var_declaration(declared_type)
            }
            None => self.statement().map(|stmt| vec![stmt]),
        }
    }

    /// `TYPE name [= init] (, name [= init])*`, one `VarDecl` per name.
    fn var_declaration(&mut self, declared_type: DeclaredType) -> ParseResult<Vec<Stmt>> {
        let start = self.previous_span();
        let mut declarations = Vec::new();
        loop {
            let (name, name_span) = self.expect_identifier("variable name")?;
            let initializer = if self.match_token(TokenKind::Equal) {
                let init = self.expression()?;
                if let Expr::Literal(ref literal) = init {
                    if !declared_type.accepts(&literal.value) {
                        self.errors.push(CompileError::parse(
                            format!(
                                "type mismatch: cannot initialize {declared_type} variable '{name}' with a {} literal",
                                literal.value.type_name()
                            ),
                            literal.span,
                        ));
                    }
                }
                Some(init)
            } else {
                None
            };
            declarations.push(Stmt::Var(VarDecl {
                name,
                name_span,
                declared_type,
                initializer,
                span: start.to(self.previous_span()),
            }));
            if !self.match_token(TokenKind::Comma) {
                break;
            }
        }
        Ok(declarations)
    }

    fn statement(&mut self) -> ParseResult<Stmt> {
        match self.peek().kind {
            TokenKind::Display => self.print_statement(),
            TokenKind::Scan => self.scan_statement(),
            TokenKind::If => self.if_statement(),
            TokenKind::While => self.while_statement(),
            TokenKind::For => self.for_statement(),
            TokenKind::Fun | TokenKind::Return => {
                let token = self.peek();
                Err(CompileError::parse(
                    format!("'{}' is reserved and not supported", token.lexeme),
                    token.span,
                ))
            }
            _ => self.expression_statement(),
        }
    }

    fn print_statement(&mut self) -> ParseResult<Stmt> {
        let start = self.current_span();
        self.advance(); // consume 'DISPLAY'
        self.consume(TokenKind::Colon, "':' after 'DISPLAY'")?;
        let expression = self.expression()?;
        let span = start.to(expression.span());
        Ok(Stmt::Print(PrintStmt { expression, span }))
    }

    fn scan_statement(&mut self) -> ParseResult<Stmt> {
        let start = self.current_span();
        self.advance(); // consume 'SCAN'
        self.consume(TokenKind::Colon, "':' after 'SCAN'")?;
        let mut targets = Vec::new();
        loop {
            let (name, span) = self.expect_identifier("variable name after 'SCAN:'")?;
            targets.push(VariableExpr { name, span });
            if !self.match_token(TokenKind::Comma) {
                break;
            }
        }
        let span = start.to(self.previous_span());
        Ok(Stmt::Scan(ScanStmt { targets, span }))
    }

    fn if_statement(&mut self) -> ParseResult<Stmt> {
        let start = self.current_span();
        self.advance(); // consume 'IF'
        self.consume(TokenKind::LeftParen, "'(' after 'IF'")?;
        let condition = self.expression()?;
        self.consume(TokenKind::RightParen, "')' after IF condition")?;

        let then_branch = Box::new(self.block(
            TokenKind::BeginIf,
            TokenKind::EndIf,
            "after IF condition",
        )?);
        // An ELSE branch may be a single statement, which is how ELSE IF chains.
        let else_branch = if self.match_token(TokenKind::Else) {
            let branch = if self.check(TokenKind::BeginIf) {
                self.block(TokenKind::BeginIf, TokenKind::EndIf, "after 'ELSE'")?
            } else {
                self.statement()?
            };
            Some(Box::new(branch))
        } else {
            None
        };

        let span = start.to(self.previous_span());
        Ok(Stmt::If(IfStmt {
            condition,
            then_branch,
            else_branch,
            span,
        }))
    }

    fn while_statement(&mut self) -> ParseResult<Stmt> {
        let start = self.current_span();
        self.advance(); // consume 'WHILE'
        self.consume(TokenKind::LeftParen, "'(' after 'WHILE'")?;
        let condition = self.expression()?;
        self.consume(TokenKind::RightParen, "')' after WHILE condition")?;
        let body = Box::new(self.block(
            TokenKind::BeginWhile,
            TokenKind::EndWhile,
            "after WHILE condition",
        )?);
        let span = start.to(self.previous_span());
        Ok(Stmt::While(WhileStmt {
            condition,
            body,
            span,
        }))
    }

    /// `FOR (init; cond; incr) BEGIN FOR ... END FOR`, rewritten as
    /// `{ init  WHILE (cond) { { body } incr } }`. Every clause is optional;
    /// a missing condition loops forever.
    fn for_statement(&mut self) -> ParseResult<Stmt> {
        let start = self.current_span();
        self.advance(); // consume 'FOR'
        self.consume(TokenKind::LeftParen, "'(' after 'FOR'")?;

        let initializer = if self.match_token(TokenKind::Semicolon) {
            Vec::new()
        } else if let Some(declared_type) = DeclaredType::from_token(self.peek().kind) {
            self.advance();
            let declarations = self.var_declaration(declared_type)?;
            self.consume(TokenKind::Semicolon, "';' after FOR initializer")?;
            declarations
        } else {
            let init = self.expression_statement()?;
            self.consume(TokenKind::Semicolon, "';' after FOR initializer")?;
            vec![init]
        };

        let condition = if self.check(TokenKind::Semicolon) {
            None
        } else {
            Some(self.expression()?)
        };
        let condition_end = self
            .consume(TokenKind::Semicolon, "';' after FOR condition")?
            .span;

        let increment = if self.check(TokenKind::RightParen) {
            None
        } else {
            Some(self.expression()?)
        };
        self.consume(TokenKind::RightParen, "')' after FOR clauses")?;

        let mut body = self.block(TokenKind::BeginFor, TokenKind::EndFor, "after FOR clauses")?;
        let span = start.to(self.previous_span());

        if let Some(increment) = increment {
            let increment_span = increment.span();
            body = Stmt::Block(BlockStmt {
                statements: vec![
                    body,
                    Stmt::Expression(ExprStmt {
                        expression: increment,
                        span: increment_span,
                    }),
                ],
                span,
            });
        }

        let condition = condition.unwrap_or(Expr::Literal(LiteralExpr {
            value: LiteralValue::Bool(true),
            span: condition_end,
        }));
        let looped = Stmt::While(WhileStmt {
            condition,
            body: Box::new(body),
            span,
        });

        if initializer.is_empty() {
            return Ok(looped);
        }
        let mut statements = initializer;
        statements.push(looped);
        Ok(Stmt::Block(BlockStmt { statements, span }))
    }

    fn expression_statement(&mut self) -> ParseResult<Stmt> {
        let expression = self.expression()?;
        let span = expression.span();
        Ok(Stmt::Expression(ExprStmt { expression, span }))
    }

    fn expression(&mut self) -> ParseResult<Expr> {
        self.assignment()
    }

    fn assignment(&mut self) -> ParseResult<Expr> {
        let expr = self.or()?;

        if self.match_token(TokenKind::Equal) {
            let equals = self.previous_span();
            let value = self.assignment()?;
            let span = expr.span().to(value.span());

            return match expr {
                Expr::Variable(v) => Ok(Expr::Assign(AssignExpr {
                    name: v.name,
                    value: Box::new(value),
                    span,
                })),
                _ => {
                    // Reported but not fatal: the right-hand side stands in.
                    self.errors
                        .push(CompileError::parse("invalid assignment target", equals));
                    Ok(value)
                }
            };
        }

        Ok(expr)
    }

    fn or(&mut self) -> ParseResult<Expr> {
        let mut expr = self.and()?;
        while self.match_token(TokenKind::Or) {
            let right = self.and()?;
            let span = expr.span().to(right.span());
            expr = Expr::Logical(LogicalExpr {
                left: Box::new(expr),
                operator: LogicalOp::Or,
                right: Box::new(right),
                span,
            });
        }
        Ok(expr)
    }

    fn and(&mut self) -> ParseResult<Expr> {
        let mut expr = self.equality()?;
        while self.match_token(TokenKind::And) {
            let right = self.equality()?;
            let span = expr.span().to(right.span());
            expr = Expr::Logical(LogicalExpr {
                left: Box::new(expr),
                operator: LogicalOp::And,
                right: Box::new(right),
                span,
            });
        }
        Ok(expr)
    }

    fn equality(&mut self) -> ParseResult<Expr> {
        self.binary_chain(
            &[TokenKind::LessGreater, TokenKind::EqualEqual],
            Self::comparison,
        )
    }

    fn comparison(&mut self) -> ParseResult<Expr> {
        self.binary_chain(
            &[
                TokenKind::Greater,
                TokenKind::GreaterEqual,
                TokenKind::Less,
                TokenKind::LessEqual,
            ],
            Self::term,
        )
    }

    fn term(&mut self) -> ParseResult<Expr> {
        self.binary_chain(
            &[TokenKind::Plus, TokenKind::Minus, TokenKind::Ampersand],
            Self::factor,
        )
    }

    fn factor(&mut self) -> ParseResult<Expr> {
        self.binary_chain(
            &[TokenKind::Star, TokenKind::Slash, TokenKind::Percent],
            Self::unary,
        )
    }

    /// Left-associative run of `operand (op operand)*` for the given operators.
    fn binary_chain(
        &mut self,
        kinds: &[TokenKind],
        operand: fn(&mut Self) -> ParseResult<Expr>,
    ) -> ParseResult<Expr> {
        let mut expr = operand(self)?;
        while let Some(op) = self.match_binary_op(kinds) {
            let right = operand(self)?;
            let span = expr.span().to(right.span());
            expr = Expr::Binary(BinaryExpr {
                left: Box::new(expr),
                operator: op,
                right: Box::new(right),
                span,
            });
        }
        Ok(expr)
    }

    fn unary(&mut self) -> ParseResult<Expr> {
        let operator = match self.peek().kind {
            TokenKind::Not => UnaryOp::Not,
            TokenKind::Minus => UnaryOp::Negate,
            TokenKind::Plus => UnaryOp::Identity,
            _ => return self.primary(),
        };
        let start = self.current_span();
        self.advance();
        let operand = self.unary()?;
        let span = start.to(operand.span());
        Ok(Expr::Unary(UnaryExpr {
            operator,
            operand: Box::new(operand),
            span,
        }))
    }

    fn primary(&mut self) -> ParseResult<Expr> {
        let token = self.peek().clone();
        let value = match token.kind {
            TokenKind::IntLiteral
            | TokenKind::FloatLiteral
            | TokenKind::CharLiteral
            | TokenKind::StringLiteral => match token.literal {
                Some(literal) => LiteralValue::from(literal),
                None => {
                    return Err(CompileError::parse(
                        format!("malformed literal '{}'", token.lexeme),
                        token.span,
                    ));
                }
            },
            TokenKind::True => LiteralValue::Bool(true),
            TokenKind::False => LiteralValue::Bool(false),
            TokenKind::Nil => LiteralValue::Nil,
            TokenKind::Identifier => {
                self.advance();
                return Ok(Expr::Variable(VariableExpr {
                    name: token.lexeme,
                    span: token.span,
                }));
            }
            TokenKind::LeftParen => {
                self.advance();
                let expr = self.expression()?;
                self.consume(TokenKind::RightParen, "')' after expression")?;
                return Ok(Expr::Grouping(GroupingExpr {
                    expression: Box::new(expr),
                    span: token.span.to(self.previous_span()),
                }));
            }
            _ => {
                return Err(CompileError::parse(
                    format!("expected expression, found {}", describe(&token)),
                    token.span,
                ));
            }
        };
        self.advance();
        Ok(Expr::Literal(LiteralExpr {
            value,
            span: token.span,
        }))
    }

    // --- Helper methods ---

    fn peek(&self) -> &Token {
        &self.tokens[self.current]
    }

    fn is_at_end(&self) -> bool {
        self.peek().kind == TokenKind::Eof
    }

    fn advance(&mut self) -> &Token {
        if !self.is_at_end() {
            self.current += 1;
        }
        &self.tokens[self.current.saturating_sub(1)]
    }

    fn check(&self, kind: TokenKind) -> bool {
        self.peek().kind == kind
    }

    fn match_token(&mut self, kind: TokenKind) -> bool {
        if self.check(kind) {
            self.advance();
            true
        } else {
            false
        }
    }

    fn match_binary_op(&mut self, kinds: &[TokenKind]) -> Option<BinaryOp> {
        let kind = self.peek().kind;
        let op = kinds.contains(&kind).then(|| token_to_binary_op(kind)).flatten()?;
        self.advance();
        Some(op)
    }

    fn consume(&mut self, kind: TokenKind, message: &str) -> ParseResult<&Token> {
        if self.check(kind) {
            Ok(self.advance())
        } else {
            let token = self.peek();
            Err(CompileError::parse(
                format!("expected {message}, found {}", describe(token)),
                token.span,
            ))
        }
    }

    fn expect_identifier(&mut self, context: &str) -> ParseResult<(String, Span)> {
        let token = self.consume(TokenKind::Identifier, context)?;
        Ok((token.lexeme.clone(), token.span))
    }

    fn current_span(&self) -> Span {
        self.peek().span
    }

    fn previous_span(&self) -> Span {
        self.tokens[self.current.saturating_sub(1)].span
    }

    /// Skip to a likely statement start. Never consumes `END CODE` or the
    /// enclosing block's `end` delimiter.
    fn synchronize(&mut self, end: TokenKind) {
        if !self.check(end) && !self.check(TokenKind::EndCode) {
            self.advance();
        }
        while !self.is_at_end() && !self.check(end) && !self.check(TokenKind::EndCode) {
            let kind = self.peek().kind;
            if kind.is_type_keyword()
                || matches!(
                    kind,
                    TokenKind::While
                        | TokenKind::For
                        | TokenKind::If
                        | TokenKind::Display
                        | TokenKind::Scan
                        | TokenKind::Fun
                        | TokenKind::Return
                )
            {
                return;
            }
            self.advance();
        }
    }
}

fn describe(token: &Token) -> String {
    match token.kind {
        TokenKind::Eof => "end of input".to_string(),
        _ => format!("'{}'", token.lexeme),
    }
}

fn token_to_binary_op(kind: TokenKind) -> Option<BinaryOp> {
    Some(match kind {
        TokenKind::Plus => BinaryOp::Add,
        TokenKind::Minus => BinaryOp::Subtract,
        TokenKind::Star => BinaryOp::Multiply,
        TokenKind::Slash => BinaryOp::Divide,
        TokenKind::Percent => BinaryOp::Modulo,
        TokenKind::Ampersand => BinaryOp::Concat,
        TokenKind::EqualEqual => BinaryOp::Equal,
        TokenKind::LessGreater => BinaryOp::NotEqual,
        TokenKind::Less => BinaryOp::Less,
        TokenKind::LessEqual => BinaryOp::LessEqual,
        TokenKind::Greater => BinaryOp::Greater,
        TokenKind::GreaterEqual => BinaryOp::GreaterEqual,
        _ => return None,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scanner;
    use rstest::rstest;

    fn wrap(body: &str) -> String {
        format!("BEGIN CODE\n{body}\nEND CODE\n")
    }

    fn parse_ok(body: &str) -> Program {
        let tokens = scanner::scan(&wrap(body)).expect("scan should succeed");
        Parser::new(tokens).parse().expect("parse should succeed")
    }

    fn parse_raw_err(source: &str) -> Vec<CompileError> {
        let tokens = scanner::scan(source).expect("scan should succeed");
        Parser::new(tokens).parse().unwrap_err()
    }

    fn parse_err(body: &str) -> Vec<CompileError> {
        parse_raw_err(&wrap(body))
    }

    fn parse_sexp(body: &str) -> String {
        let program = parse_ok(body);
        crate::ast::printer::to_sexp(&program).trim().to_string()
    }

    #[rstest]
    #[case("1 + 2 * 3", "(+ 1 (* 2 3))")]
    #[case("(1 + 2) * 3", "(* (group (+ 1 2)) 3)")]
    #[case("7 % 2 * 3", "(* (% 7 2) 3)")]
    #[case("a & b + c", "(+ (& a b) c)")]
    #[case("a <> b == c", "(== (<> a b) c)")]
    #[case("a < b == b >= c", "(== (< a b) (>= b c))")]
    #[case("TRUE AND FALSE OR TRUE", "(OR (AND TRUE FALSE) TRUE)")]
    #[case("NOT a AND b", "(AND (NOT a) b)")]
    #[case("-1", "(- 1)")]
    #[case("+x", "(+ x)")]
    #[case("- -2.5", "(- (- 2.5))")]
    fn expression_precedence(#[case] body: &str, #[case] expected: &str) {
        assert_eq!(parse_sexp(body), expected);
    }

    #[rstest]
    #[case(0)]
    #[case(7)]
    #[case(42)]
    #[case(2147483647)]
    fn integer_literal_decodes_as_int(#[case] n: i32) {
        let program = parse_ok(&n.to_string());
        match &program.statements[..] {
            [Stmt::Expression(ExprStmt {
                expression: Expr::Literal(literal),
                ..
            })] => assert_eq!(literal.value, LiteralValue::Int(n)),
            other => panic!("unexpected statements: {other:?}"),
        }
    }

    #[test]
    fn literal_kinds() {
        assert_eq!(
            parse_sexp("'c' & \"s\" & NIL & 1.5"),
            "(& (& (& 'c' \"s\") NIL) 1.5)"
        );
    }

    #[test]
    fn assignment_is_right_associative() {
        assert_eq!(parse_sexp("a = b = 3"), "(= a (= b 3))");
    }

    #[test]
    fn statements_need_no_separator() {
        assert_eq!(parse_sexp("x = 1 y = 2"), "(= x 1)\n(= y 2)");
    }

    #[test]
    fn declaration_list_shares_type() {
        assert_eq!(
            parse_sexp("INT a, b = 2, c"),
            "(INT a)\n(INT b 2)\n(INT c)"
        );
    }

    #[test]
    fn declaration_with_expression_initializer() {
        assert_eq!(parse_sexp("FLOAT f = 1 + 2"), "(FLOAT f (+ 1 2))");
    }

    #[test]
    fn display_and_scan() {
        assert_eq!(
            parse_sexp("SCAN: a, b\nDISPLAY: a & \"!\""),
            "(scan a b)\n(display (& a \"!\"))"
        );
    }

    #[test]
    fn if_else_blocks() {
        assert_eq!(
            parse_sexp(
                "IF (x > 1) BEGIN IF DISPLAY: 1 END IF ELSE BEGIN IF DISPLAY: 2 END IF"
            ),
            "(if (> x 1) (block (display 1)) (block (display 2)))"
        );
    }

    #[test]
    fn else_if_chain() {
        assert_eq!(
            parse_sexp(
                "IF (a) BEGIN IF DISPLAY: 1 END IF\nELSE IF (b) BEGIN IF DISPLAY: 2 END IF"
            ),
            "(if a (block (display 1)) (if b (block (display 2))))"
        );
    }

    #[test]
    fn while_loop() {
        assert_eq!(
            parse_sexp("WHILE (i < 3) BEGIN WHILE i = i + 1 END WHILE"),
            "(while (< i 3) (block (= i (+ i 1))))"
        );
    }

    #[test]
    fn for_loop_desugars_to_while() {
        assert_eq!(
            parse_sexp("FOR (INT i = 0; i < 3; i = i + 1) BEGIN FOR DISPLAY: i END FOR"),
            "(block (INT i 0) (while (< i 3) (block (block (display i)) (= i (+ i 1)))))"
        );
    }

    #[test]
    fn for_loop_clauses_are_optional() {
        assert_eq!(
            parse_sexp("FOR (;;) BEGIN FOR DISPLAY: 1 END FOR"),
            "(while TRUE (block (display 1)))"
        );
        assert_eq!(
            parse_sexp("FOR (i = 0; i < 2;) BEGIN FOR END FOR"),
            "(block (= i 0) (while (< i 2) (block)))"
        );
    }

    #[test]
    fn for_requires_begin_for() {
        let errors = parse_err("FOR (;;) DISPLAY: 1");
        assert!(errors[0].message().contains("'BEGIN FOR'"), "{errors:?}");
    }

    #[test]
    fn missing_end_for_reports_single_error() {
        let errors = parse_err("FOR (;;) BEGIN FOR\nDISPLAY: 1");
        assert_eq!(errors.len(), 1, "{errors:?}");
        assert!(errors[0].message().contains("'END FOR'"));
    }

    #[test]
    fn empty_program() {
        assert!(parse_ok("").statements.is_empty());
    }

    #[rstest]
    #[case("INT x = 3.0", "INT", "FLOAT")]
    #[case("FLOAT f = 3", "FLOAT", "INT")]
    #[case("CHAR c = \"a\"", "CHAR", "STRING")]
    #[case("STRING s = 'a'", "STRING", "CHAR")]
    #[case("BOOL b = NIL", "BOOL", "NIL")]
    #[case("INT a = 1, b = TRUE", "INT", "BOOL")]
    fn literal_type_mismatch(#[case] body: &str, #[case] declared: &str, #[case] found: &str) {
        let errors = parse_err(body);
        assert_eq!(errors.len(), 1, "{errors:?}");
        let message = errors[0].message();
        assert!(message.starts_with("type mismatch"), "{message}");
        assert!(message.contains(declared) && message.contains(found), "{message}");
    }

    #[test]
    fn matching_literal_initializers_parse() {
        let program = parse_ok(
            "INT x = 3\nFLOAT f = 3.0\nCHAR c = 'c'\nBOOL b = TRUE\nSTRING s = \"s\"",
        );
        assert_eq!(program.statements.len(), 5);
    }

    #[test]
    fn missing_begin_code_is_fatal() {
        let errors = parse_raw_err("DISPLAY: 1\nEND CODE");
        assert_eq!(errors.len(), 1);
        assert!(errors[0].message().contains("'BEGIN CODE'"));
    }

    #[test]
    fn missing_end_code_reports_single_error() {
        let errors = parse_raw_err("BEGIN CODE\nINT x = 1\nDISPLAY: x\n");
        assert_eq!(errors.len(), 1, "{errors:?}");
        assert!(errors[0].message().contains("'END CODE'"));
        assert_eq!(errors[0].line(), 4);
    }

    #[test]
    fn tokens_after_end_code() {
        let errors = parse_raw_err("BEGIN CODE\nEND CODE\nDISPLAY: 1");
        assert_eq!(errors.len(), 1);
        assert!(errors[0].message().contains("after 'END CODE'"));
    }

    #[test]
    fn invalid_assignment_target() {
        let errors = parse_err("1 + a = 2");
        assert_eq!(errors.len(), 1);
        assert_eq!(errors[0].message(), "invalid assignment target");
    }

    #[test]
    fn if_requires_begin_if() {
        let errors = parse_err("IF (TRUE) DISPLAY: 1");
        assert!(errors[0].message().contains("'BEGIN IF'"), "{errors:?}");
    }

    #[test]
    fn while_requires_begin_while() {
        let errors = parse_err("WHILE (TRUE) DISPLAY: 1 END WHILE");
        assert!(errors[0].message().contains("'BEGIN WHILE'"), "{errors:?}");
    }

    #[rstest]
    #[case("FUN")]
    #[case("RETURN")]
    fn reserved_keywords_are_rejected(#[case] keyword: &str) {
        let errors = parse_err(keyword);
        assert_eq!(errors.len(), 1);
        assert!(errors[0].message().contains("reserved"));
    }

    #[test]
    fn error_recovery_continues_with_next_statement() {
        let errors = parse_err("DISPLAY 1\nINT x = 2\nDISPLAY: x");
        assert_eq!(errors.len(), 1, "{errors:?}");
        assert!(errors[0].message().contains("':'"));
    }

    #[test]
    fn error_inside_block_is_recovered_inside_block() {
        let errors = parse_err(
            "IF (TRUE) BEGIN IF\nDISPLAY 1\nDISPLAY: 2\nEND IF\nDISPLAY: 3",
        );
        assert_eq!(errors.len(), 1, "{errors:?}");
        assert_eq!(errors[0].line(), 3);
    }

    #[test]
    fn missing_end_if_reports_single_error() {
        let errors = parse_err("IF (TRUE) BEGIN IF\nDISPLAY: 1");
        assert_eq!(errors.len(), 1, "{errors:?}");
        assert!(errors[0].message().contains("'END IF'"));
    }

    #[test]
    fn independent_errors_all_reported() {
        let errors = parse_err("SCAN a\nINT x = 1\nDISPLAY x\nINT y = 2.5");
        assert_eq!(errors.len(), 3, "{errors:?}");
    }
}
