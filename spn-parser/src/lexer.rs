use std::fmt;

use logos::Logos;

#[derive(Debug, Logos, Clone, PartialEq)]
pub enum Token {
    // literals
    #[regex(r"[1-9][0-9]*", |lex| lex.slice().parse())]
    #[regex(r"0[0-7]*", |lex| i64::from_str_radix(lex.slice(), 8))]
    #[regex(r"0[xX][0-9a-fA-F]+", |lex| i64::from_str_radix(&lex.slice()[2..], 16))]
    IntLit(i64),
    #[regex(r"[0-9]+\.[0-9]+([eE][+-]?[0-9]+)?", |lex| lex.slice().parse())]
    #[regex(r"[0-9]+[eE][+-]?[0-9]+", |lex| lex.slice().parse())]
    FloatLit(f64),
    #[regex(r#""([^"\\]|\\.)*""#, |lex| unescape(&lex.slice()[1..lex.slice().len() - 1]))]
    StringLit(String),

    // identifiers
    #[regex("[a-zA-Z_][a-zA-Z0-9_]*", |lex| lex.slice().to_string())]
    Identifier(String),

    // punctuation
    #[token("(")]
    OpenParen,
    #[token(")")]
    CloseParen,
    #[token("[")]
    OpenBracket,
    #[token("]")]
    CloseBracket,
    #[token("{")]
    OpenBrace,
    #[token("}")]
    CloseBrace,
    #[token(",")]
    Comma,
    #[token(";")]
    Semi,
    #[token(":")]
    Colon,
    #[token("?")]
    Question,
    #[token(".")]
    Dot,
    #[token("->")]
    Arrow,
    #[token("..")]
    DotDot,

    // binary operators
    // - arithmetics
    #[token("+")]
    Plus, // NOTE: can also be unary
    #[token("-")]
    Minus, // NOTE: can also be unary
    #[token("*")]
    Asterisk,
    #[token("/")]
    Slash,
    #[token("%")]
    Percent,
    // - bitwise
    #[token("&")]
    Ampersand,
    #[token("|")]
    Pipe,
    #[token("^")]
    Caret,
    #[token("<<")]
    ShiftLeft,
    #[token(">>")]
    ShiftRight,
    // - equality
    #[token("==")]
    EqualsEquals,
    #[token("!=")]
    NotEquals,
    // - ordering
    #[token("<")]
    LessThan,
    #[token(">")]
    GreaterThan,
    #[token("<=")]
    LessThanEquals,
    #[token(">=")]
    GreaterThanEquals,
    // - logical
    #[token("&&")]
    LogicalAnd,
    #[token("||")]
    LogicalOr,
    // - assignment
    #[token("=")]
    Equals,
    #[token("+=")]
    PlusEquals,
    #[token("-=")]
    MinusEquals,
    #[token("*=")]
    AsteriskEquals,
    #[token("/=")]
    SlashEquals,
    #[token("%=")]
    PercentEquals,
    #[token("&=")]
    AmpersandEquals,
    #[token("|=")]
    PipeEquals,
    #[token("^=")]
    CaretEquals,
    #[token("<<=")]
    ShiftLeftEquals,
    #[token(">>=")]
    ShiftRightEquals,
    #[token("..=")]
    DotDotEquals,

    // unary operators
    #[token("!")]
    LogicalNot,
    #[token("~")]
    Tilde,
    #[token("++")]
    PlusPlus,
    #[token("--")]
    MinusMinus,
    #[token("#")]
    Hash,
    #[token("sizeof")]
    Sizeof,
    #[token("typeof")]
    Typeof,

    // keywords
    #[token("if")]
    If,
    #[token("else")]
    Else,
    #[token("while")]
    While,
    #[token("do")]
    Do,
    #[token("for")]
    For,
    #[token("foreach")]
    Foreach,
    #[token("as")]
    As,
    #[token("in")]
    In,
    #[token("break")]
    Break,
    #[token("continue")]
    Continue,
    #[token("return")]
    Return,
    #[token("function")]
    Function,
    #[token("var")]
    Var,
    #[token("true")]
    True,
    #[token("false")]
    False,
    #[token("nil")]
    Nil,
    #[token("nan")]
    Nan,

    // misc
    #[regex(r"[ \t\n\r\f]+", logos::skip)]
    #[regex(r"//[^\n]*", logos::skip)] // single line comments
    #[regex(r"/\*([^*]|\*+[^*/])*\*+/", logos::skip)] // block comments
    #[error]
    Error,

    /// Only generated by [`Lexer::next_token`] when the logos stream is exhausted.
    Eof,
}

/// Resolves the escape sequences of a string literal body.
/// Returns `None` for an unknown or truncated escape, which turns the literal into [`Token::Error`].
fn unescape(body: &str) -> Option<String> {
    let mut out = String::with_capacity(body.len());
    let mut chars = body.chars();

    while let Some(c) = chars.next() {
        if c != '\\' {
            out.push(c);
            continue;
        }

        let escaped = match chars.next()? {
            '\\' => '\\',
            '"' => '"',
            '\'' => '\'',
            'n' => '\n',
            'r' => '\r',
            't' => '\t',
            '0' => '\0',
            'a' => '\x07',
            'b' => '\x08',
            'f' => '\x0c',
            'v' => '\x0b',
            'x' => {
                let hi = chars.next()?.to_digit(16)?;
                let lo = chars.next()?.to_digit(16)?;
                char::from_u32(hi * 16 + lo)?
            }
            _ => return None,
        };
        out.push(escaped);
    }

    Some(out)
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let lexeme = match self {
            Token::IntLit(val) => return write!(f, "integer literal `{}`", val),
            Token::FloatLit(val) => return write!(f, "float literal `{}`", val),
            Token::StringLit(val) => return write!(f, "string literal {:?}", val),
            Token::Identifier(ident) => return write!(f, "identifier `{}`", ident),
            Token::Error => return f.write_str("invalid token"),
            Token::Eof => return f.write_str("end of input"),
            Token::OpenParen => "(",
            Token::CloseParen => ")",
            Token::OpenBracket => "[",
            Token::CloseBracket => "]",
            Token::OpenBrace => "{",
            Token::CloseBrace => "}",
            Token::Comma => ",",
            Token::Semi => ";",
            Token::Colon => ":",
            Token::Question => "?",
            Token::Dot => ".",
            Token::Arrow => "->",
            Token::DotDot => "..",
            Token::Plus => "+",
            Token::Minus => "-",
            Token::Asterisk => "*",
            Token::Slash => "/",
            Token::Percent => "%",
            Token::Ampersand => "&",
            Token::Pipe => "|",
            Token::Caret => "^",
            Token::ShiftLeft => "<<",
            Token::ShiftRight => ">>",
            Token::EqualsEquals => "==",
            Token::NotEquals => "!=",
            Token::LessThan => "<",
            Token::GreaterThan => ">",
            Token::LessThanEquals => "<=",
            Token::GreaterThanEquals => ">=",
            Token::LogicalAnd => "&&",
            Token::LogicalOr => "||",
            Token::Equals => "=",
            Token::PlusEquals => "+=",
            Token::MinusEquals => "-=",
            Token::AsteriskEquals => "*=",
            Token::SlashEquals => "/=",
            Token::PercentEquals => "%=",
            Token::AmpersandEquals => "&=",
            Token::PipeEquals => "|=",
            Token::CaretEquals => "^=",
            Token::ShiftLeftEquals => "<<=",
            Token::ShiftRightEquals => ">>=",
            Token::DotDotEquals => "..=",
            Token::LogicalNot => "!",
            Token::Tilde => "~",
            Token::PlusPlus => "++",
            Token::MinusMinus => "--",
            Token::Hash => "#",
            Token::Sizeof => "sizeof",
            Token::Typeof => "typeof",
            Token::If => "if",
            Token::Else => "else",
            Token::While => "while",
            Token::Do => "do",
            Token::For => "for",
            Token::Foreach => "foreach",
            Token::As => "as",
            Token::In => "in",
            Token::Break => "break",
            Token::Continue => "continue",
            Token::Return => "return",
            Token::Function => "function",
            Token::Var => "var",
            Token::True => "true",
            Token::False => "false",
            Token::Nil => "nil",
            Token::Nan => "nan",
        };
        write!(f, "`{}`", lexeme)
    }
}

/// Pull-style wrapper around the logos lexer that tracks line numbers.
pub struct Lexer<'a> {
    inner: logos::Lexer<'a, Token>,
    /// Line of the most recently produced token (1-based).
    line: usize,
    /// Byte offset up to which newlines have been counted.
    counted: usize,
}

impl<'a> Lexer<'a> {
    pub fn new(source: &'a str) -> Self {
        Self {
            inner: Token::lexer(source),
            line: 1,
            counted: 0,
        }
    }

    /// Produces the next token, or [`Token::Eof`] once the input is exhausted.
    /// Lexical errors surface as [`Token::Error`]; see [`Lexer::error_message`].
    pub fn next_token(&mut self) -> Token {
        match self.inner.next() {
            Some(token) => {
                let start = self.inner.span().start;
                self.count_lines_to(start);
                match token {
                    Token::IntLit(_) | Token::FloatLit(_) => self.check_number_end(token),
                    token => token,
                }
            }
            None => {
                self.count_lines_to(self.inner.source().len());
                Token::Eof
            }
        }
    }

    /// Line of the most recently produced token.
    pub fn line(&self) -> usize {
        self.line
    }

    /// Text of the most recently produced token.
    pub fn slice(&self) -> &'a str {
        self.inner.slice()
    }

    /// Describes the most recent [`Token::Error`].
    pub fn error_message(&self) -> String {
        let slice = self.slice();
        if slice.starts_with("/*") {
            return "unterminated comment".to_string();
        }
        match slice.chars().next() {
            Some('"') => "malformed string literal".to_string(),
            Some(c) if c.is_ascii_digit() => format!("invalid numeric literal `{}`", slice),
            _ => format!("unexpected character `{}`", slice),
        }
    }

    /// A numeric literal running into identifier characters (`0x`, `1e`, `12ab`) is malformed as a whole.
    fn check_number_end(&mut self, token: Token) -> Token {
        let tail = self
            .inner
            .remainder()
            .find(|c: char| !(c.is_ascii_alphanumeric() || c == '_'))
            .unwrap_or_else(|| self.inner.remainder().len());
        if tail == 0 {
            token
        } else {
            self.inner.bump(tail);
            Token::Error
        }
    }

    fn count_lines_to(&mut self, offset: usize) {
        let source = self.inner.source();
        if offset > self.counted {
            self.line += source[self.counted..offset]
                .bytes()
                .filter(|&b| b == b'\n')
                .count();
            self.counted = offset;
        }
    }
}

impl<'a> Iterator for Lexer<'a> {
    type Item = Token;

    fn next(&mut self) -> Option<Token> {
        match self.next_token() {
            Token::Eof => None,
            token => Some(token),
        }
    }
}
