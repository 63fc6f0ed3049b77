//! Parser for the Sparkling scripting language.
//!
//! [`Parser::parse`] turns source text into a typed [`ast::Program`]. [`node::Node`] offers the same tree as uniform
//! cons cells, [`printer`] turns it back into source.

pub mod ast;
pub mod config;
pub mod lexer;
pub mod node;
pub mod parser;
pub mod printer;
pub mod visitor;

pub use config::ParserConfig;
pub use parser::{ParseResult, Parser};
pub use spn_source::{ErrorKind, Source, SyntaxError};
