use crate::ast::{AstNode, NodeKind, Role};
use crate::config::OperatorSettings;
use crate::edit::Edit;
use crate::rules::Rule;
use crate::span::{Anchor, SourceSpanMap, SpanError};

/// Marks arithmetic in binary operations.
///
/// Additive: `a + b` becomes `a + b * d`. Multiplicative: `a * b` becomes
/// `(a * b) + d`. The right-hand anchor is one byte past the start of the
/// right operand.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OperatorRewrite {
    pub additive_marker: String,
    pub multiplicative_open: String,
    pub multiplicative_close: String,
}

impl OperatorRewrite {
    pub fn from_settings(settings: &OperatorSettings) -> Self {
        Self {
            additive_marker: settings.additive_marker.clone(),
            multiplicative_open: settings.multiplicative_open.clone(),
            multiplicative_close: settings.multiplicative_close.clone(),
        }
    }
}

impl Default for OperatorRewrite {
    fn default() -> Self {
        Self::from_settings(&OperatorSettings::default())
    }
}

impl Rule for OperatorRewrite {
    fn name(&self) -> &'static str {
        "operator-rewrite"
    }

    fn matches(&self, node: &AstNode) -> bool {
        node.kind == NodeKind::BinaryOp
            && node
                .attrs
                .operator
                .is_some_and(|op| op.is_additive() || op.is_multiplicative())
    }

    fn generate(&self, node: &AstNode, spans: &SourceSpanMap<'_>) -> Result<Vec<Edit>, SpanError> {
        let Some(op) = node.attrs.operator else {
            return Ok(Vec::new());
        };

        if op.is_additive() {
            let at = spans.resolve_child(node, Role::Rhs, Anchor::Start, 1)?;
            return Ok(vec![Edit::after(at, self.additive_marker.as_str())]);
        }

        if op.is_multiplicative() {
            // Resolve both anchors before emitting either edit
            let open_at = spans.resolve_child(node, Role::Lhs, Anchor::Start, 0)?;
            let close_at = spans.resolve_child(node, Role::Rhs, Anchor::Start, 1)?;
            return Ok(vec![
                Edit::after(open_at, self.multiplicative_open.as_str()),
                Edit::after(close_at, self.multiplicative_close.as_str()),
            ]);
        }

        Ok(Vec::new())
    }
}
