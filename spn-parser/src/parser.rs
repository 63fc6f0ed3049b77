use crate::ast::*;
use crate::config::ParserConfig;
use crate::lexer::{Lexer, Token};
use spn_source::{ErrorKind, ErrorReporter, Source, SyntaxError};
use std::mem;

mod expr;
mod stmt;

pub type ParseResult<T> = Result<T, SyntaxError>;

/// Reusable parser handle.
/// Every call to [`Parser::parse`] starts from a clean state; only the last error survives between parses.
#[derive(Debug, Default)]
pub struct Parser {
    config: ParserConfig,
    errors: ErrorReporter,
}

impl Parser {
    pub fn new() -> Self {
        Self::with_config(ParserConfig::default())
    }

    pub fn with_config(config: ParserConfig) -> Self {
        Self {
            config,
            errors: ErrorReporter::new(),
        }
    }

    pub fn config(&self) -> &ParserConfig {
        &self.config
    }

    /// Parses a whole program. Parsing stops at the first error.
    pub fn parse(&mut self, source: &Source<'_>) -> ParseResult<Program> {
        self.errors.clear();
        log::debug!("parsing {} bytes", source.content.len());

        let result = Descent::new(source.content, &self.config).parse_program();
        match &result {
            Ok(program) => log::debug!("parsed {} top-level statements", program.body.len()),
            Err(error) => {
                log::debug!("parse failed: {}", error);
                if self.config.echo_errors {
                    eprintln!("{}", error);
                }
                self.errors.report(error.clone());
            }
        }
        result
    }

    /// The error of the most recent [`Parser::parse`], if it failed.
    pub fn last_error(&self) -> Option<&SyntaxError> {
        self.errors.first()
    }
}

/// Recursive descent over a single source.
pub(crate) struct Descent<'a> {
    /// Cached token for peeking.
    current_token: Token,
    /// Line of `current_token`.
    line: usize,
    lexer: Lexer<'a>,
    /// Current syntactic nesting, bounded by `max_depth`.
    depth: usize,
    max_depth: usize,
}

impl<'a> Descent<'a> {
    pub(crate) fn new(source: &'a str, config: &ParserConfig) -> Self {
        let mut lexer = Lexer::new(source);
        let current_token = lexer.next_token();
        Self {
            current_token,
            line: lexer.line(),
            lexer,
            depth: 0,
            max_depth: config.max_depth,
        }
    }

    /// Parses statements until the end of input.
    pub(crate) fn parse_program(&mut self) -> ParseResult<Program> {
        if self.current_token == Token::Error {
            return Err(self.lexical_error());
        }

        let mut body = Vec::new();
        while !self.check(&Token::Eof) {
            if self.check(&Token::CloseBrace) {
                return Err(self.error(ErrorKind::Structural, "garbage after input"));
            }
            body.push(self.parse_stmt(true)?);
        }

        Ok(Program { body })
    }
}

/// Parse utilities
impl<'a> Descent<'a> {
    /// Advances to the next token and returns the one that was current, handing its payload to the caller.
    fn next(&mut self) -> ParseResult<Token> {
        let token = self.lexer.next_token();
        if token == Token::Error {
            return Err(self.lexical_error());
        }
        self.line = self.lexer.line();
        Ok(mem::replace(&mut self.current_token, token))
    }

    /// Predicate that tests whether the current token has the same discriminant as `tok`.
    fn check(&self, tok: &Token) -> bool {
        mem::discriminant(&self.current_token) == mem::discriminant(tok)
    }

    /// Eats the current token if it matches `tok`.
    fn eat(&mut self, tok: Token) -> ParseResult<bool> {
        if self.check(&tok) {
            self.next()?;
            Ok(true)
        } else {
            Ok(false)
        }
    }

    /// Eats the current token if it matches any token of `table` and returns the associated operator.
    fn eat_any<Op: Copy>(&mut self, table: &[(Token, Op)]) -> ParseResult<Option<Op>> {
        let matched = table
            .iter()
            .find(|(tok, _)| self.check(tok))
            .map(|&(_, op)| op);
        if matched.is_some() {
            self.next()?;
        }
        Ok(matched)
    }

    fn expect(&mut self, tok: Token, kind: ErrorKind, message: &str) -> ParseResult<()> {
        if self.eat(tok)? {
            Ok(())
        } else {
            Err(self.error(kind, message))
        }
    }

    /// Eats an identifier, taking its name out of the current token.
    fn expect_ident(&mut self, message: &str) -> ParseResult<Ident> {
        let line = self.line;
        match self.current_token {
            Token::Identifier(ref mut name) => {
                let name = mem::take(name);
                self.next()?;
                Ok(Ident { name, line })
            }
            _ => Err(self.error(ErrorKind::MissingIdentifier, message)),
        }
    }

    /// Enters one level of nesting.
    fn enter(&mut self) -> ParseResult<()> {
        self.depth += 1;
        if self.depth > self.max_depth {
            Err(self.error(ErrorKind::Structural, "nesting too deep"))
        } else {
            Ok(())
        }
    }

    fn leave(&mut self) {
        self.depth -= 1;
    }

    fn error(&self, kind: ErrorKind, message: impl ToString) -> SyntaxError {
        SyntaxError::new(kind, message, self.line)
    }

    fn lexical_error(&self) -> SyntaxError {
        SyntaxError::new(ErrorKind::Lexical, self.lexer.error_message(), self.lexer.line())
    }
}
