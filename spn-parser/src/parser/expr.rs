use super::*;

const ASSIGNMENT: &[(Token, AssignOp)] = &[
    (Token::Equals, AssignOp::Assign),
    (Token::PlusEquals, AssignOp::Add),
    (Token::MinusEquals, AssignOp::Sub),
    (Token::AsteriskEquals, AssignOp::Mul),
    (Token::SlashEquals, AssignOp::Div),
    (Token::PercentEquals, AssignOp::Mod),
    (Token::AmpersandEquals, AssignOp::BitAnd),
    (Token::PipeEquals, AssignOp::BitOr),
    (Token::CaretEquals, AssignOp::BitXor),
    (Token::ShiftLeftEquals, AssignOp::ShiftLeft),
    (Token::ShiftRightEquals, AssignOp::ShiftRight),
    (Token::DotDotEquals, AssignOp::Concat),
];

const CONCAT: &[(Token, BinaryOp)] = &[(Token::DotDot, BinaryOp::Concat)];

/// Binding power of the binary operators from `||` (loosest) to `*` (tightest).
fn binop_bp(token: &Token) -> Option<(BinaryOp, u8)> {
    let binop = match token {
        /* Logical */
        Token::LogicalOr => (BinaryOp::LogicalOr, 1),
        Token::LogicalAnd => (BinaryOp::LogicalAnd, 2),
        /* Comparison */
        Token::EqualsEquals => (BinaryOp::Equal, 3),
        Token::NotEquals => (BinaryOp::NotEqual, 3),
        Token::LessThan => (BinaryOp::Less, 3),
        Token::GreaterThan => (BinaryOp::Greater, 3),
        Token::LessThanEquals => (BinaryOp::LessEqual, 3),
        Token::GreaterThanEquals => (BinaryOp::GreaterEqual, 3),
        /* Bitwise */
        Token::Pipe => (BinaryOp::BitOr, 4),
        Token::Caret => (BinaryOp::BitXor, 5),
        Token::Ampersand => (BinaryOp::BitAnd, 6),
        Token::ShiftLeft => (BinaryOp::ShiftLeft, 7),
        Token::ShiftRight => (BinaryOp::ShiftRight, 7),
        /* Additive */
        Token::Plus => (BinaryOp::Add, 8),
        Token::Minus => (BinaryOp::Sub, 8),
        /* Multiplicative */
        Token::Asterisk => (BinaryOp::Mul, 9),
        Token::Slash => (BinaryOp::Div, 9),
        Token::Percent => (BinaryOp::Mod, 9),
        _ => return None,
    };
    Some(binop)
}

const PREFIX: &[(Token, UnaryOp)] = &[
    (Token::PlusPlus, UnaryOp::PreIncrement),
    (Token::MinusMinus, UnaryOp::PreDecrement),
    (Token::Plus, UnaryOp::Plus),
    (Token::Minus, UnaryOp::Minus),
    (Token::LogicalNot, UnaryOp::LogicalNot),
    (Token::Tilde, UnaryOp::BitNot),
    (Token::Sizeof, UnaryOp::Sizeof),
    (Token::Typeof, UnaryOp::Typeof),
    (Token::Hash, UnaryOp::NthArg),
];

type SubExpr<'a> = fn(&mut Descent<'a>) -> ParseResult<Expr>;

impl<'a> Descent<'a> {
    /* Expressions */
    /// Parses any expression.
    /// Every call counts as one level of nesting.
    pub(crate) fn parse_expr(&mut self) -> ParseResult<Expr> {
        self.enter()?;
        let expr = self.parse_binary_right_assoc(
            ASSIGNMENT,
            Self::parse_concat,
            |target: Expr, op: AssignOp, value: Expr, line: usize| {
                Expr::new(
                    ExprKind::Assign {
                        target: Box::new(target),
                        op,
                        value: Box::new(value),
                    },
                    line,
                )
            },
        )?;
        self.leave();
        Ok(expr)
    }

    fn parse_concat(&mut self) -> ParseResult<Expr> {
        self.parse_binary_left_assoc(CONCAT, Self::parse_conditional)
    }

    /// Parses `cond ? a : b`. The false branch may itself be a conditional (`a ? b : c ? d : e`), which nests to the
    /// right; the chain is collected in a loop instead of recursing.
    fn parse_conditional(&mut self) -> ParseResult<Expr> {
        let mut expr = self.parse_binary(1)?;

        let mut arms = Vec::new();
        loop {
            let line = self.line;
            if !self.eat(Token::Question)? {
                break;
            }
            let then_expr = self.parse_expr()?;
            self.expect(
                Token::Colon,
                ErrorKind::MissingDelimiter,
                "expected ':' in conditional expression",
            )?;
            arms.push((expr, then_expr, line));
            expr = self.parse_binary(1)?;
        }

        // `expr` is now the innermost false branch
        for (cond, then_expr, line) in arms.into_iter().rev() {
            expr = Expr::new(
                ExprKind::Conditional {
                    cond: Box::new(cond),
                    then_expr: Box::new(then_expr),
                    else_expr: Box::new(expr),
                },
                line,
            );
        }
        Ok(expr)
    }

    /// Parses the binary levels from `||` to `*` by precedence climbing.
    /// Operators binding tighter than `min_bp` are folded here; all levels are left-associative, so the right operand
    /// is parsed one power above the operator. Recursion only happens when the binding power increases.
    fn parse_binary(&mut self, min_bp: u8) -> ParseResult<Expr> {
        let mut lhs = self.parse_prefix()?;

        loop {
            let (op, bp) = match binop_bp(&self.current_token) {
                Some((op, bp)) if bp >= min_bp => (op, bp),
                _ => break,
            };
            let line = self.line;
            self.next()?;
            let rhs = self.parse_binary(bp + 1)?;
            lhs = Expr::new(
                ExprKind::Binary {
                    lhs: Box::new(lhs),
                    op,
                    rhs: Box::new(rhs),
                },
                line,
            );
        }

        Ok(lhs)
    }

    /// Parses a stack of prefix operators followed by a postfix expression.
    fn parse_prefix(&mut self) -> ParseResult<Expr> {
        let mut ops = Vec::new();
        loop {
            let line = self.line;
            match self.eat_any(PREFIX)? {
                Some(op) => ops.push((op, line)),
                None => break,
            }
        }

        let mut expr = self.parse_postfix()?;
        for (op, line) in ops.into_iter().rev() {
            expr = Expr::new(
                ExprKind::Unary {
                    op,
                    operand: Box::new(expr),
                },
                line,
            );
        }
        Ok(expr)
    }

    /// Parses a term followed by any number of `[index]`, `(args)`, `.member`, `->member`, `++` and `--`.
    fn parse_postfix(&mut self) -> ParseResult<Expr> {
        let mut expr = self.parse_term()?;

        loop {
            let line = self.line;
            let kind = match self.current_token {
                Token::PlusPlus | Token::MinusMinus => {
                    let op = if self.check(&Token::PlusPlus) {
                        UnaryOp::PostIncrement
                    } else {
                        UnaryOp::PostDecrement
                    };
                    self.next()?;
                    ExprKind::Unary {
                        op,
                        operand: Box::new(expr),
                    }
                }
                Token::OpenBracket => {
                    self.next()?;
                    let index = self.parse_expr()?;
                    self.expect(
                        Token::CloseBracket,
                        ErrorKind::MissingDelimiter,
                        "expected ']' after expression in array subscript",
                    )?;
                    ExprKind::Subscript {
                        object: Box::new(expr),
                        index: Box::new(index),
                    }
                }
                Token::OpenParen => {
                    self.next()?;
                    let args = if self.check(&Token::CloseParen) {
                        Vec::new()
                    } else {
                        self.parse_call_args()?
                    };
                    self.expect(
                        Token::CloseParen,
                        ErrorKind::MissingDelimiter,
                        "expected ')' after expression in function call",
                    )?;
                    ExprKind::Call {
                        callee: Box::new(expr),
                        args,
                    }
                }
                Token::Dot | Token::Arrow => {
                    let access = if self.check(&Token::Dot) {
                        MemberAccess::Dot
                    } else {
                        MemberAccess::Arrow
                    };
                    self.next()?;
                    let member = self.expect_ident("expected identifier after . or -> operator")?;
                    ExprKind::Member {
                        object: Box::new(expr),
                        member,
                        access,
                    }
                }
                _ => break,
            };
            expr = Expr::new(kind, line);
        }

        Ok(expr)
    }

    /// Parses `expr (, expr)*`.
    fn parse_call_args(&mut self) -> ParseResult<Vec<Expr>> {
        let mut args = vec![self.parse_expr()?];
        while self.eat(Token::Comma)? {
            args.push(self.parse_expr()?);
        }
        Ok(args)
    }

    /* Expressions.Term */
    /// Parses a parenthesized expression, a function expression, an identifier or a literal.
    fn parse_term(&mut self) -> ParseResult<Expr> {
        let line = self.line;
        let kind = match self.current_token {
            Token::OpenParen => {
                self.next()?;
                let expr = self.parse_expr()?;
                self.expect(
                    Token::CloseParen,
                    ErrorKind::MissingDelimiter,
                    "expected ')' after parenthesized expression",
                )?;
                return Ok(expr);
            }
            Token::Function => {
                self.next()?;
                let function = self.parse_function_rest()?;
                return Ok(Expr::new(ExprKind::Function(Box::new(function)), line));
            }
            Token::Identifier(ref mut name) => ExprKind::Ident(mem::take(name)),
            Token::True => ExprKind::Literal(Literal::Bool(true)),
            Token::False => ExprKind::Literal(Literal::Bool(false)),
            Token::Nil => ExprKind::Literal(Literal::Nil),
            Token::Nan => ExprKind::Literal(Literal::Float(f64::NAN)),
            Token::IntLit(val) => ExprKind::Literal(Literal::Int(val)),
            Token::FloatLit(val) => ExprKind::Literal(Literal::Float(val)),
            Token::StringLit(ref mut val) => ExprKind::Literal(Literal::Str(mem::take(val))),
            Token::Eof => return Err(self.error(ErrorKind::UnexpectedToken, "unexpected end of input")),
            _ => {
                return Err(self.error(
                    ErrorKind::UnexpectedToken,
                    format!("unexpected token {}", self.current_token),
                ))
            }
        };
        self.next()?; // eat parsed token
        Ok(Expr::new(kind, line))
    }

    /// Left-associative binary level: `sub (op sub)*`, folded iteratively into `((a op b) op c)`.
    fn parse_binary_left_assoc(
        &mut self,
        table: &[(Token, BinaryOp)],
        subexpr: SubExpr<'a>,
    ) -> ParseResult<Expr> {
        let mut lhs = subexpr(self)?;

        loop {
            let line = self.line;
            let op = match self.eat_any(table)? {
                Some(op) => op,
                None => break,
            };
            let rhs = subexpr(self)?;
            lhs = Expr::new(
                ExprKind::Binary {
                    lhs: Box::new(lhs),
                    op,
                    rhs: Box::new(rhs),
                },
                line,
            );
        }

        Ok(lhs)
    }

    /// Right-associative binary level: `sub (op sub)*`, folded into `(a op (b op c))`.
    /// Operands are collected first and folded from the right, so the call stack does not grow with the chain.
    fn parse_binary_right_assoc<Op: Copy>(
        &mut self,
        table: &[(Token, Op)],
        subexpr: SubExpr<'a>,
        make: fn(Expr, Op, Expr, usize) -> Expr,
    ) -> ParseResult<Expr> {
        let first = subexpr(self)?;

        let mut chain = Vec::new();
        loop {
            let line = self.line;
            let op = match self.eat_any(table)? {
                Some(op) => op,
                None => break,
            };
            chain.push((op, line, subexpr(self)?));
        }

        let mut chain = chain.into_iter().rev();
        let (mut op, mut line, mut rhs) = match chain.next() {
            Some(last) => last,
            None => return Ok(first),
        };
        for (prev_op, prev_line, lhs) in chain {
            rhs = make(lhs, op, rhs, line);
            op = prev_op;
            line = prev_line;
        }
        Ok(make(first, op, rhs, line))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::node::Node;
    use insta::assert_snapshot;

    fn parse_expr(source: &str) -> Expr {
        // parenthesized, so that a leading `function` is not taken for a function statement
        let source = format!("({});", source);
        let mut program = Parser::new().parse(&source.as_str().into()).unwrap();
        match program.body.pop().map(|stmt| stmt.kind) {
            Some(StmtKind::Expr(expr)) => expr,
            kind => panic!("expected expression statement, got {:?}", kind),
        }
    }

    fn expr(source: &str) -> String {
        Node::from(&parse_expr(source)).to_string()
    }

    fn error(source: &str) -> SyntaxError {
        Parser::new().parse(&source.into()).unwrap_err()
    }

    #[test]
    fn test_literal() {
        assert_snapshot!(expr("true"), @"(LITERAL true)");
        assert_snapshot!(expr("false"), @"(LITERAL false)");
        assert_snapshot!(expr("nil"), @"(LITERAL nil)");
        assert_snapshot!(expr("1"), @"(LITERAL 1)");
        assert_snapshot!(expr("2.5"), @"(LITERAL 2.5)");
        assert_snapshot!(expr("\"hi\\n\""), @r#"(LITERAL "hi\n")"#);

        match parse_expr("nan").kind {
            ExprKind::Literal(Literal::Float(val)) => assert!(val.is_nan()),
            kind => panic!("expected float literal, got {:?}", kind),
        }
    }

    #[test]
    fn test_binary_expr() {
        assert_snapshot!(expr("1 + 1"), @"(ADD (LITERAL 1) (LITERAL 1))");
        assert_snapshot!(expr("1 == 2 - 1"), @"(EQUAL (LITERAL 1) (SUB (LITERAL 2) (LITERAL 1)))");
        // should be (2 * 2) * 2
        assert_snapshot!(expr("2 * 2 * 2"), @"(MUL (MUL (LITERAL 2) (LITERAL 2)) (LITERAL 2))");
        // should be a = (b = c)
        assert_snapshot!(expr("a = b = c"), @"(ASSIGN (IDENT a) (ASSIGN (IDENT b) (IDENT c)))");
        assert_snapshot!(expr("a .. b .. c"), @"(CONCAT (CONCAT (IDENT a) (IDENT b)) (IDENT c))");
        assert_snapshot!(
            expr("a < b < c"),
            @"(LESS (LESS (IDENT a) (IDENT b)) (IDENT c))"
        );
        assert_snapshot!(
            expr("a | b ^ c & d << e"),
            @"(BITOR (IDENT a) (BITXOR (IDENT b) (BITAND (IDENT c) (SHL (IDENT d) (IDENT e)))))"
        );
        assert_snapshot!(
            expr("a || b && c == d"),
            @"(LOGOR (IDENT a) (LOGAND (IDENT b) (EQUAL (IDENT c) (IDENT d))))"
        );
    }

    #[test]
    fn test_compound_assignment() {
        assert_snapshot!(
            expr("a += b -= c ..= d"),
            @"(ASSIGN_ADD (IDENT a) (ASSIGN_SUB (IDENT b) (ASSIGN_CONCAT (IDENT c) (IDENT d))))"
        );
        assert_snapshot!(expr("a <<= 1"), @"(ASSIGN_SHL (IDENT a) (LITERAL 1))");
        assert_snapshot!(expr("a %= 1"), @"(ASSIGN_MOD (IDENT a) (LITERAL 1))");
    }

    #[test]
    fn test_conditional() {
        assert_snapshot!(
            expr("a ? b : c ? d : e"),
            @"(CONDEXPR (IDENT a) (BRANCHES (IDENT b) (CONDEXPR (IDENT c) (BRANCHES (IDENT d) (IDENT e)))))"
        );
        assert_snapshot!(
            expr("a ? b = 1 : c"),
            @"(CONDEXPR (IDENT a) (BRANCHES (ASSIGN (IDENT b) (LITERAL 1)) (IDENT c)))"
        );
        assert_snapshot!(
            expr("a || b ? c : d .. e"),
            @"(CONCAT (CONDEXPR (LOGOR (IDENT a) (IDENT b)) (BRANCHES (IDENT c) (IDENT d))) (IDENT e))"
        );

        let err = error("a ? b;");
        assert_eq!(err.kind(), ErrorKind::MissingDelimiter);
        assert_eq!(err.message(), "expected ':' in conditional expression");
    }

    #[test]
    fn test_prefix() {
        assert_snapshot!(expr("-a"), @"(UNMINUS (IDENT a))");
        assert_snapshot!(expr("!-~a"), @"(LOGNOT (UNMINUS (BITNOT (IDENT a))))");
        assert_snapshot!(expr("sizeof typeof #0"), @"(SIZEOF (TYPEOF (NTHARG (LITERAL 0))))");
        assert_snapshot!(expr("++a + --b"), @"(ADD (PREINCRMT (IDENT a)) (PREDECRMT (IDENT b)))");
        assert_snapshot!(expr("-a * +b"), @"(MUL (UNMINUS (IDENT a)) (UNPLUS (IDENT b)))");
        assert_snapshot!(expr("-a[0]"), @"(UNMINUS (ARRSUB (IDENT a) (LITERAL 0)))");
    }

    #[test]
    fn test_postfix() {
        assert_snapshot!(expr("a++"), @"(POSTINCRMT (IDENT a))");
        assert_snapshot!(expr("a--"), @"(POSTDECRMT (IDENT a))");
        assert_snapshot!(expr("a[1][2]"), @"(ARRSUB (ARRSUB (IDENT a) (LITERAL 1)) (LITERAL 2))");
        assert_snapshot!(expr("a.b->c"), @"(MEMBEROF (MEMBEROF (IDENT a) (IDENT b)) (IDENT c))");
        assert_snapshot!(expr("f()"), @"(FUNCCALL (IDENT f))");
        assert_snapshot!(
            expr("f(1, g(), h)"),
            @"(FUNCCALL (IDENT f) (CALLARGS (CALLARGS (CALLARGS _ (LITERAL 1)) (FUNCCALL (IDENT g))) (IDENT h)))"
        );
        assert_snapshot!(expr("f(a)(b)"), @"(FUNCCALL (FUNCCALL (IDENT f) (CALLARGS _ (IDENT a))) (CALLARGS _ (IDENT b)))");

        match parse_expr("a->b").kind {
            ExprKind::Member { access, member, .. } => {
                assert_eq!(access, MemberAccess::Arrow);
                assert_eq!(member.name, "b");
            }
            kind => panic!("expected member access, got {:?}", kind),
        }

        assert_eq!(error("a[1;").message(), "expected ']' after expression in array subscript");
        assert_eq!(error("f(1;").message(), "expected ')' after expression in function call");
        assert_eq!(error("a.1;").message(), "expected identifier after . or -> operator");
        assert_eq!(error("a->;").kind(), ErrorKind::MissingIdentifier);
    }

    #[test]
    fn test_term() {
        assert_snapshot!(expr("(1 + 2) * 3"), @"(MUL (ADD (LITERAL 1) (LITERAL 2)) (LITERAL 3))");
        assert_snapshot!(
            expr("function (a, b) { return a; }"),
            @"(FUNCEXPR (DECLARGS a (DECLARGS b)) (BLOCK (RETURN (IDENT a))))"
        );
        assert_snapshot!(expr("function () {}()"), @"(FUNCCALL (FUNCEXPR _ (EMPTY)))");

        assert_eq!(error("(1 + 2;").message(), "expected ')' after parenthesized expression");
        assert_eq!(error("1 + ;").message(), "unexpected token `;`");
        assert_eq!(error("1 +").message(), "unexpected end of input");
        assert_eq!(error("a = }").kind(), ErrorKind::UnexpectedToken);
    }

    #[test]
    fn test_expr_lines() {
        let expr = parse_expr("a\n+\nb");
        assert_eq!(expr.line, 2);
        match expr.kind {
            ExprKind::Binary { lhs, rhs, .. } => {
                assert_eq!(lhs.line, 1);
                assert_eq!(rhs.line, 3);
            }
            kind => panic!("expected binary expression, got {:?}", kind),
        }
    }
}
