use crate::ast::{AstNode, NodeKind, Role};
use std::fmt;
use thiserror::Error;

/// Byte index into a [`SourceText`]. Valid range is `[0, len]`.
pub type SourceOffset = usize;

/// Immutable original input text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceText {
    text: String,
}

impl SourceText {
    pub fn new(text: impl Into<String>) -> Self {
        Self { text: text.into() }
    }

    pub fn as_str(&self) -> &str {
        &self.text
    }

    pub fn len(&self) -> usize {
        self.text.len()
    }

    pub fn is_empty(&self) -> bool {
        self.text.is_empty()
    }

    /// Whether `offset` lies in `[0, len]` on a character boundary.
    pub fn is_valid_offset(&self, offset: SourceOffset) -> bool {
        self.text.is_char_boundary(offset)
    }

    /// Leading spaces and tabs of the line containing `offset`.
    pub fn line_indent(&self, offset: SourceOffset) -> &str {
        let bytes = self.text.as_bytes();
        let offset = offset.min(bytes.len());
        let line_start = bytes[..offset]
            .iter()
            .rposition(|&b| b == b'\n')
            .map_or(0, |nl| nl + 1);
        let indent_len = bytes[line_start..]
            .iter()
            .take_while(|&&b| b == b' ' || b == b'\t')
            .count();
        &self.text[line_start..line_start + indent_len]
    }

    /// Re-indent `text` for insertion at `offset`: every newline is followed
    /// by the indentation of the line `offset` sits on.
    pub fn indent_new_lines(&self, offset: SourceOffset, text: &str) -> String {
        let indent = self.line_indent(offset);
        if indent.is_empty() || !text.contains('\n') {
            return text.to_string();
        }
        text.split('\n').collect::<Vec<_>>().join(&format!("\n{indent}"))
    }
}

impl From<String> for SourceText {
    fn from(text: String) -> Self {
        Self::new(text)
    }
}

impl From<&str> for SourceText {
    fn from(text: &str) -> Self {
        Self::new(text)
    }
}

/// Which end of a node's span to resolve.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Anchor {
    Start,
    End,
}

impl fmt::Display for Anchor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Anchor::Start => f.write_str("start"),
            Anchor::End => f.write_str("end"),
        }
    }
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SpanError {
    #[error("{kind} node has no literal location for its {anchor}")]
    Unresolved { kind: NodeKind, anchor: Anchor },

    #[error("{kind} node has no '{role}' child")]
    MissingChild { kind: NodeKind, role: Role },

    #[error("offset {offset} is outside the source text (length {len})")]
    OutOfRange { offset: usize, len: usize },
}

/// Resolves nodes to concrete offsets in one [`SourceText`].
#[derive(Debug, Clone, Copy)]
pub struct SourceSpanMap<'src> {
    source: &'src SourceText,
}

impl<'src> SourceSpanMap<'src> {
    pub fn new(source: &'src SourceText) -> Self {
        Self { source }
    }

    pub fn source(&self) -> &'src SourceText {
        self.source
    }

    pub fn resolve(&self, node: &AstNode, anchor: Anchor) -> Result<SourceOffset, SpanError> {
        self.resolve_with_offset(node, anchor, 0)
    }

    /// Resolve `anchor` of `node`, shifted forward by `k` bytes.
    pub fn resolve_with_offset(
        &self,
        node: &AstNode,
        anchor: Anchor,
        k: usize,
    ) -> Result<SourceOffset, SpanError> {
        let span = node.span.ok_or(SpanError::Unresolved {
            kind: node.kind,
            anchor,
        })?;
        let base = match anchor {
            Anchor::Start => span.start,
            Anchor::End => span.end,
        };
        let len = self.source.len();
        match base.checked_add(k) {
            Some(offset) if offset <= len => Ok(offset),
            Some(offset) => Err(SpanError::OutOfRange { offset, len }),
            None => Err(SpanError::OutOfRange {
                offset: usize::MAX,
                len,
            }),
        }
    }

    /// Resolve the child of `node` playing `role`.
    pub fn resolve_child(
        &self,
        node: &AstNode,
        role: Role,
        anchor: Anchor,
        k: usize,
    ) -> Result<SourceOffset, SpanError> {
        let child = node.child(role).ok_or(SpanError::MissingChild {
            kind: node.kind,
            role,
        })?;
        self.resolve_with_offset(child, anchor, k)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ast::Span;

    #[test]
    fn resolves_start_end_and_adjustment() {
        let source = SourceText::new("a + b");
        let spans = SourceSpanMap::new(&source);
        let rhs = AstNode::new(NodeKind::Expr, Span::new(4, 5));

        assert_eq!(spans.resolve(&rhs, Anchor::Start).unwrap(), 4);
        assert_eq!(spans.resolve(&rhs, Anchor::End).unwrap(), 5);
        assert_eq!(spans.resolve_with_offset(&rhs, Anchor::Start, 1).unwrap(), 5);
    }

    #[test]
    fn unresolved_node_is_an_error() {
        let source = SourceText::new("a + b");
        let spans = SourceSpanMap::new(&source);
        let synthesized = AstNode::unresolved(NodeKind::Expr);

        let err = spans.resolve(&synthesized, Anchor::Start).unwrap_err();
        assert_eq!(
            err,
            SpanError::Unresolved {
                kind: NodeKind::Expr,
                anchor: Anchor::Start
            }
        );
    }

    #[test]
    fn adjustment_past_end_is_out_of_range() {
        let source = SourceText::new("a + b");
        let spans = SourceSpanMap::new(&source);
        let rhs = AstNode::new(NodeKind::Expr, Span::new(4, 5));

        let err = spans.resolve_with_offset(&rhs, Anchor::End, 1).unwrap_err();
        assert_eq!(err, SpanError::OutOfRange { offset: 6, len: 5 });
    }

    #[test]
    fn missing_child_is_reported_with_role() {
        let source = SourceText::new("a + b");
        let spans = SourceSpanMap::new(&source);
        let node = AstNode::new(NodeKind::BinaryOp, Span::new(0, 5));

        let err = spans
            .resolve_child(&node, Role::Rhs, Anchor::Start, 0)
            .unwrap_err();
        assert!(matches!(err, SpanError::MissingChild { role: Role::Rhs, .. }));
    }

    #[test]
    fn line_indent_and_reindent() {
        let source = SourceText::new("int f() {\n    if (x)\n\treturn 1;\n}");
        let if_pos = source.as_str().find("if").unwrap();
        let ret_pos = source.as_str().find("return").unwrap();

        assert_eq!(source.line_indent(0), "");
        assert_eq!(source.line_indent(if_pos), "    ");
        assert_eq!(source.line_indent(ret_pos), "\t");
        assert_eq!(
            source.indent_new_lines(if_pos, "// note\n"),
            "// note\n    "
        );
        assert_eq!(source.indent_new_lines(0, "// note\n"), "// note\n");
        assert_eq!(source.indent_new_lines(if_pos, "no newline"), "no newline");
    }
}
