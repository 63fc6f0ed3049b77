use super::*;

impl<'a> Descent<'a> {
    /// Parses a statement.
    /// At file scope (`is_global`) a leading `function` starts a function statement; elsewhere it starts a function
    /// expression statement.
    pub(crate) fn parse_stmt(&mut self, is_global: bool) -> ParseResult<Stmt> {
        log::trace!("statement at line {}: {}", self.line, self.current_token);
        let line = self.line;
        match self.current_token {
            Token::If => Ok(Stmt::new(StmtKind::If(self.parse_if_stmt()?), line)),
            Token::While => self.parse_while_stmt(),
            Token::Do => self.parse_do_stmt(),
            Token::For => self.parse_for_stmt(),
            Token::Foreach => self.parse_foreach_stmt(),
            Token::Break => {
                self.next()?;
                self.expect(Token::Semi, ErrorKind::MissingDelimiter, "expected ';' after 'break'")?;
                Ok(Stmt::new(StmtKind::Break, line))
            }
            Token::Continue => {
                self.next()?;
                self.expect(Token::Semi, ErrorKind::MissingDelimiter, "expected ';' after 'continue'")?;
                Ok(Stmt::new(StmtKind::Continue, line))
            }
            Token::Return => self.parse_return_stmt(),
            Token::Semi => {
                self.next()?;
                Ok(Stmt::new(StmtKind::Empty, line))
            }
            Token::OpenBrace => Ok(Stmt::new(StmtKind::Block(self.parse_block()?), line)),
            Token::Var => self.parse_var_decl(),
            Token::Function if is_global => self.parse_function_stmt(),
            _ => {
                // expression statement
                let expr = self.parse_expr()?;
                self.expect(Token::Semi, ErrorKind::MissingDelimiter, "expected ';' after expression")?;
                Ok(Stmt::new(StmtKind::Expr(expr), line))
            }
        }
    }

    /// Parses `{ stmt* }`.
    pub(crate) fn parse_block(&mut self) -> ParseResult<Block> {
        let line = self.line;
        self.expect(Token::OpenBrace, ErrorKind::MissingDelimiter, "expected '{' in block statement")?;
        self.enter()?;

        let mut stmts = Vec::new();
        while !self.eat(Token::CloseBrace)? {
            if self.check(&Token::Eof) {
                return Err(self.error(
                    ErrorKind::MissingDelimiter,
                    "expected '}' at end of block statement",
                ));
            }
            stmts.push(self.parse_stmt(false)?);
        }

        self.leave();
        Ok(Block { stmts, line })
    }

    /// Parses an `if` statement with its `else if` / `else` chain.
    /// The chain is collected in a loop and nested afterwards, so long chains do not recurse.
    fn parse_if_stmt(&mut self) -> ParseResult<IfStmt> {
        let (line, cond, then_branch) = self.parse_if_arm()?;

        let mut arms = Vec::new();
        let mut else_branch = None;
        while self.eat(Token::Else)? {
            match self.current_token {
                Token::If => arms.push(self.parse_if_arm()?),
                Token::OpenBrace => {
                    else_branch = Some(ElseBranch::Block(self.parse_block()?));
                    break;
                }
                _ => {
                    return Err(self.error(ErrorKind::Structural, "expected block or 'if' after 'else'"));
                }
            }
        }

        for (line, cond, then_branch) in arms.into_iter().rev() {
            else_branch = Some(ElseBranch::If(Box::new(IfStmt {
                cond,
                then_branch,
                else_branch,
                line,
            })));
        }

        Ok(IfStmt {
            cond,
            then_branch,
            else_branch,
            line,
        })
    }

    /// Parses `if cond { ... }` up to, but not including, a following `else`.
    fn parse_if_arm(&mut self) -> ParseResult<(usize, Expr, Block)> {
        let line = self.line;
        self.next()?; // eat 'if'
        let cond = self.parse_expr()?;
        let then_branch = self.parse_block()?;
        Ok((line, cond, then_branch))
    }

    fn parse_while_stmt(&mut self) -> ParseResult<Stmt> {
        let line = self.line;
        self.next()?; // eat 'while'
        let cond = self.parse_expr()?;
        let body = self.parse_block()?;
        Ok(Stmt::new(StmtKind::While { cond, body }, line))
    }

    fn parse_do_stmt(&mut self) -> ParseResult<Stmt> {
        let line = self.line;
        self.next()?; // eat 'do'
        let body = self.parse_block()?;
        self.expect(
            Token::While,
            ErrorKind::MissingKeyword,
            "expected 'while' after body of do-while statement",
        )?;
        let cond = self.parse_expr()?;
        self.expect(
            Token::Semi,
            ErrorKind::MissingDelimiter,
            "expected ';' after condition of do-while statement",
        )?;
        Ok(Stmt::new(StmtKind::DoWhile { body, cond }, line))
    }

    fn parse_for_stmt(&mut self) -> ParseResult<Stmt> {
        let line = self.line;
        self.next()?; // eat 'for'
        let init = self.parse_expr()?;
        self.expect(
            Token::Semi,
            ErrorKind::MissingDelimiter,
            "expected ';' after initialization of for loop",
        )?;
        let cond = self.parse_expr()?;
        self.expect(
            Token::Semi,
            ErrorKind::MissingDelimiter,
            "expected ';' after condition of for loop",
        )?;
        let step = self.parse_expr()?;
        let body = self.parse_block()?;
        Ok(Stmt::new(
            StmtKind::For {
                init,
                cond,
                step,
                body,
            },
            line,
        ))
    }

    fn parse_foreach_stmt(&mut self) -> ParseResult<Stmt> {
        let line = self.line;
        self.next()?; // eat 'foreach'
        let key = self.expect_ident("key in foreach loop must be a variable")?;
        self.expect(Token::As, ErrorKind::MissingKeyword, "expected 'as' after key in foreach loop")?;
        let value = self.expect_ident("value in foreach loop must be a variable")?;
        self.expect(Token::In, ErrorKind::MissingKeyword, "expected 'in' after value in foreach loop")?;
        let iterable = self.parse_expr()?;
        let body = self.parse_block()?;
        Ok(Stmt::new(
            StmtKind::Foreach {
                key,
                value,
                iterable,
                body,
            },
            line,
        ))
    }

    fn parse_return_stmt(&mut self) -> ParseResult<Stmt> {
        let line = self.line;
        self.next()?; // eat 'return'
        if self.eat(Token::Semi)? {
            return Ok(Stmt::new(StmtKind::Return(None), line));
        }
        let expr = self.parse_expr()?;
        self.expect(
            Token::Semi,
            ErrorKind::MissingDelimiter,
            "expected ';' after expression in return statement",
        )?;
        Ok(Stmt::new(StmtKind::Return(Some(expr)), line))
    }

    /// Parses `var a = 1, b, c = a;`.
    fn parse_var_decl(&mut self) -> ParseResult<Stmt> {
        let line = self.line;
        self.next()?; // eat 'var'

        let mut declarators = Vec::new();
        loop {
            let name = self.expect_ident("expected identifier in declaration")?;
            let init = if self.eat(Token::Equals)? {
                Some(self.parse_expr()?)
            } else {
                None
            };
            declarators.push(VarDeclarator { name, init });

            if !self.eat(Token::Comma)? {
                break;
            }
        }

        self.expect(
            Token::Semi,
            ErrorKind::MissingDelimiter,
            "expected ';' after variable declaration",
        )?;
        Ok(Stmt::new(StmtKind::VarDecl(declarators), line))
    }

    fn parse_function_stmt(&mut self) -> ParseResult<Stmt> {
        let line = self.line;
        self.next()?; // eat 'function'
        let name = self.expect_ident("expected function name in function statement")?;
        let function = self.parse_function_rest()?;
        Ok(Stmt::new(StmtKind::Function { name, function }, line))
    }

    /// Parses the parameter list and body of a function, after `function` and the optional name.
    pub(crate) fn parse_function_rest(&mut self) -> ParseResult<Function> {
        self.expect(Token::OpenParen, ErrorKind::MissingDelimiter, "expected '(' in function header")?;

        let mut params = Vec::new();
        if !self.eat(Token::CloseParen)? {
            loop {
                params.push(self.expect_ident("expected identifier in function argument list")?);
                if !self.eat(Token::Comma)? {
                    break;
                }
            }
            self.expect(
                Token::CloseParen,
                ErrorKind::MissingDelimiter,
                "expected ')' after function argument list",
            )?;
        }

        let body = self.parse_block()?;
        Ok(Function { params, body })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::node::Node;
    use insta::assert_snapshot;

    fn program(source: &str) -> String {
        let program = Parser::new().parse(&source.into()).unwrap();
        Node::from(&program).to_string()
    }

    fn error(source: &str) -> SyntaxError {
        Parser::new().parse(&source.into()).unwrap_err()
    }

    #[test]
    fn test_statement_sequences() {
        assert_snapshot!(program(""), @"(PROGRAM)");
        assert_snapshot!(program("a;"), @"(PROGRAM (IDENT a))");
        assert_snapshot!(program("a; b; c;"), @"(PROGRAM (COMPOUND (IDENT a) (IDENT b)) (IDENT c))");
        assert_snapshot!(program("{}"), @"(PROGRAM (EMPTY))");
        assert_snapshot!(program("{ a; }"), @"(PROGRAM (BLOCK (IDENT a)))");
        assert_snapshot!(program("{ a; b; }"), @"(PROGRAM (BLOCK (IDENT a) (IDENT b)))");
        assert_snapshot!(program(";"), @"(PROGRAM (EMPTY))");
    }

    #[test]
    fn test_if() {
        assert_snapshot!(program("if a { b; }"), @"(PROGRAM (IF (IDENT a) (BRANCHES (BLOCK (IDENT b)))))");
        assert_snapshot!(
            program("if a { b; } else { c; }"),
            @"(PROGRAM (IF (IDENT a) (BRANCHES (BLOCK (IDENT b)) (BLOCK (IDENT c)))))"
        );
        assert_snapshot!(
            program("if a {} else if b {} else if c {}"),
            @"(PROGRAM (IF (IDENT a) (BRANCHES (EMPTY) (IF (IDENT b) (BRANCHES (EMPTY) (IF (IDENT c) (BRANCHES (EMPTY))))))))"
        );

        let err = error("if a {} else b;");
        assert_eq!(err.kind(), ErrorKind::Structural);
        assert_eq!(err.message(), "expected block or 'if' after 'else'");

        let err = error("if a b;");
        assert_eq!(err.message(), "expected '{' in block statement");
    }

    #[test]
    fn test_loops() {
        assert_snapshot!(program("while a { b; }"), @"(PROGRAM (WHILE (IDENT a) (BLOCK (IDENT b))))");
        assert_snapshot!(program("do { b; } while a;"), @"(PROGRAM (DO (IDENT a) (BLOCK (IDENT b))))");
        assert_snapshot!(
            program("for i = 0; i < n; ++i { }"),
            @"(PROGRAM (FOR (FORHEADER (ASSIGN (IDENT i) (LITERAL 0)) (FORHEADER (LESS (IDENT i) (IDENT n)) (FORHEADER (PREINCRMT (IDENT i))))) (EMPTY)))"
        );
        assert_snapshot!(
            program("foreach k as v in t { }"),
            @"(PROGRAM (FOREACH (FORHEADER (IDENT k) (FORHEADER (IDENT v) (FORHEADER (IDENT t)))) (EMPTY)))"
        );
        assert_snapshot!(
            program("while 1 { break; continue; }"),
            @"(PROGRAM (WHILE (LITERAL 1) (BLOCK (BREAK) (CONTINUE))))"
        );

        assert_eq!(
            error("do { } a;").message(),
            "expected 'while' after body of do-while statement"
        );
        assert_eq!(error("do { } while a").message(), "expected ';' after condition of do-while statement");
        assert_eq!(error("for a; b { }").message(), "expected ';' after condition of for loop");
        assert_eq!(error("for ; a; b { }").message(), "unexpected token `;`");
        assert_eq!(error("foreach 1 as v in t {}").message(), "key in foreach loop must be a variable");
        assert_eq!(error("foreach k v in t {}").kind(), ErrorKind::MissingKeyword);
        assert_eq!(error("foreach k as v t {}").message(), "expected 'in' after value in foreach loop");
        assert_eq!(error("while 1 { break }").message(), "expected ';' after 'break'");
    }

    #[test]
    fn test_return() {
        assert_snapshot!(program("return;"), @"(PROGRAM (RETURN))");
        assert_snapshot!(program("return a + 1;"), @"(PROGRAM (RETURN (ADD (IDENT a) (LITERAL 1))))");

        let err = error("return 1");
        assert_eq!(err.kind(), ErrorKind::MissingDelimiter);
        assert!(err.to_string().contains("syntax error near line 1"));
        assert!(err.to_string().contains("expected ';'"));
    }

    #[test]
    fn test_var_decl() {
        assert_snapshot!(program("var a;"), @"(PROGRAM (VARDECL a))");
        assert_snapshot!(
            program("var a = 1, b, c = a;"),
            @"(PROGRAM (VARDECL a (LITERAL 1) (VARDECL b _ (VARDECL c (IDENT a)))))"
        );

        assert_eq!(error("var 1;").kind(), ErrorKind::MissingIdentifier);
        assert_eq!(error("var a = 1").message(), "expected ';' after variable declaration");
    }

    #[test]
    fn test_function_stmt() {
        assert_snapshot!(program("function f() {}"), @"(PROGRAM (FUNCSTMT f _ (EMPTY)))");
        assert_snapshot!(
            program("function add(a, b) { return a + b; }"),
            @"(PROGRAM (FUNCSTMT add (DECLARGS a (DECLARGS b)) (BLOCK (RETURN (ADD (IDENT a) (IDENT b))))))"
        );

        // only an expression statement inside a block
        assert_snapshot!(
            program("{ function (x) { return x; }; }"),
            @"(PROGRAM (BLOCK (FUNCEXPR (DECLARGS x) (BLOCK (RETURN (IDENT x))))))"
        );

        assert_eq!(
            error("function (x) {}").message(),
            "expected function name in function statement"
        );
        assert_eq!(error("function f(a,) {}").message(), "expected identifier in function argument list");
        assert_eq!(error("function f(a b) {}").message(), "expected ')' after function argument list");
        assert_eq!(error("function f {}").message(), "expected '(' in function header");
    }

    #[test]
    fn test_unterminated_block() {
        let err = error("{\n a;\n");
        assert_eq!(err.message(), "expected '}' at end of block statement");
        assert_eq!(err.line(), 3);
    }

    #[test]
    fn test_statement_lines() {
        let program = Parser::new()
            .parse(&"var a;\n\nwhile a {\n  a -= 1;\n}\n".into())
            .unwrap();
        assert_eq!(program.body[0].line, 1);
        assert_eq!(program.body[1].line, 3);
        match &program.body[1].kind {
            StmtKind::While { body, .. } => {
                assert_eq!(body.line, 3);
                assert_eq!(body.stmts[0].line, 4);
            }
            kind => panic!("expected while, got {:?}", kind),
        }
    }
}
