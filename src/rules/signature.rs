use crate::ast::{AstNode, NodeKind, Role};
use crate::config::SignatureSettings;
use crate::edit::Edit;
use crate::rules::Rule;
use crate::span::{Anchor, SourceSpanMap, SpanError};

/// Appends a trailing parameter to every function declaration.
///
/// Definitions and prototypes are treated alike, and each redeclaration is
/// rewritten on its own.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SignatureAugmentation {
    pub parameter: String,
}

impl SignatureAugmentation {
    pub fn from_settings(settings: &SignatureSettings) -> Self {
        Self {
            parameter: settings.parameter.clone(),
        }
    }

    fn fragment(&self, param_count: usize) -> String {
        if param_count == 0 {
            self.parameter.clone()
        } else {
            format!(", {}", self.parameter)
        }
    }
}

impl Default for SignatureAugmentation {
    fn default() -> Self {
        Self::from_settings(&SignatureSettings::default())
    }
}

impl Rule for SignatureAugmentation {
    fn name(&self) -> &'static str {
        "signature-augmentation"
    }

    fn matches(&self, node: &AstNode) -> bool {
        node.kind == NodeKind::FunctionDecl
    }

    fn generate(&self, node: &AstNode, spans: &SourceSpanMap<'_>) -> Result<Vec<Edit>, SpanError> {
        let params = node.child(Role::Params).ok_or(SpanError::MissingChild {
            kind: node.kind,
            role: Role::Params,
        })?;
        let close_paren = spans.resolve_child(params, Role::CloseParen, Anchor::Start, 0)?;
        let count = node.attrs.param_count.unwrap_or(0);

        Ok(vec![Edit::after(close_paren, self.fragment(count))])
    }
}
