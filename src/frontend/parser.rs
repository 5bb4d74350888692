use crate::frontend::errors::FrontendError;
use crate::frontend::lang::Dialect;
use std::path::Path;
use tracing::debug;
use tree_sitter::{Parser, Tree};

/// Tree-sitter parser wrapper for C and C++ source code.
pub struct CParser {
    parser: Parser,
    dialect: Dialect,
}

impl CParser {
    pub fn new(dialect: Dialect) -> Result<Self, FrontendError> {
        let mut parser = Parser::new();
        parser
            .set_language(&dialect.ts_language())
            .map_err(|_| FrontendError::LanguageSet {
                dialect: dialect.as_str(),
            })?;

        Ok(Self { parser, dialect })
    }

    /// Parse source code into a tree-sitter Tree.
    pub fn parse(&mut self, source: &str) -> Result<Tree, FrontendError> {
        self.parser
            .parse(source, None)
            .ok_or(FrontendError::ParseFailed)
    }

    /// Parse source code and return the tree along with the source.
    pub fn parse_with_source<'a>(
        &mut self,
        source: &'a str,
    ) -> Result<ParsedSource<'a>, FrontendError> {
        let tree = self.parse(source)?;
        debug!(dialect = %self.dialect, bytes = source.len(), "parsed source");
        Ok(ParsedSource { source, tree })
    }
}

/// A parsed source file with its tree-sitter tree.
pub struct ParsedSource<'a> {
    pub source: &'a str,
    pub tree: Tree,
}

impl<'a> ParsedSource<'a> {
    pub fn root_node(&self) -> tree_sitter::Node<'_> {
        self.tree.root_node()
    }

    /// Check if the tree contains any ERROR or MISSING nodes.
    pub fn has_errors(&self) -> bool {
        self.tree.root_node().has_error()
    }

    /// All ERROR and MISSING nodes, in source order.
    pub fn error_nodes(&self) -> Vec<ErrorNode> {
        let mut errors = Vec::new();
        collect_error_nodes(self.tree.root_node(), &mut errors);
        errors
    }

    /// Fail with the first syntax error, if any.
    pub fn ensure_clean(&self) -> Result<(), FrontendError> {
        if !self.has_errors() {
            return Ok(());
        }
        let errors = self.error_nodes();
        match errors.as_slice() {
            [] => Ok(()),
            [only] => Err(FrontendError::SyntaxError {
                byte_start: only.byte_start,
                byte_end: only.byte_end,
                line: only.start_point.row + 1,
                column: only.start_point.column + 1,
            }),
            [first, ..] => Err(FrontendError::MultipleSyntaxErrors {
                count: errors.len(),
                line: first.start_point.row + 1,
                column: first.start_point.column + 1,
            }),
        }
    }
}

/// Location of an ERROR or MISSING node.
#[derive(Debug, Clone)]
pub struct ErrorNode {
    pub byte_start: usize,
    pub byte_end: usize,
    pub start_point: tree_sitter::Point,
}

fn collect_error_nodes(node: tree_sitter::Node<'_>, errors: &mut Vec<ErrorNode>) {
    if node.is_error() || node.is_missing() {
        errors.push(ErrorNode {
            byte_start: node.start_byte(),
            byte_end: node.end_byte(),
            start_point: node.start_position(),
        });
    }

    if !node.has_error() {
        return;
    }

    let mut cursor = node.walk();
    for child in node.children(&mut cursor) {
        collect_error_nodes(child, errors);
    }
}

/// Read a source file for parsing.
pub fn read_source(path: &Path) -> Result<String, FrontendError> {
    let bytes = std::fs::read(path).map_err(|source| FrontendError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    String::from_utf8(bytes).map_err(|_| FrontendError::NotUtf8 {
        path: path.to_path_buf(),
    })
}
