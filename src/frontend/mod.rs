//! Tree-sitter front-end for C and C++.
//!
//! Parses input with the grammars shipped by ast-grep-language and lowers the
//! concrete syntax tree into the engine's tagged [`AstNode`](crate::ast::AstNode)
//! representation. Nothing outside this module sees tree-sitter types.

pub mod errors;
pub mod lang;
pub mod lower;
pub mod parser;

pub use errors::FrontendError;
pub use lang::Dialect;
pub use lower::lower;
pub use parser::{CParser, ParsedSource};

use crate::ast::AstNode;
use crate::span::SourceText;

/// Parse `source` and lower it, rejecting input with syntax errors.
pub fn parse(source: &SourceText, dialect: Dialect) -> Result<AstNode, FrontendError> {
    let mut parser = CParser::new(dialect)?;
    let parsed = parser.parse_with_source(source.as_str())?;
    parsed.ensure_clean()?;
    Ok(lower(&parsed))
}
