use crate::ast::{AstNode, NodeKind, Role};
use crate::config::AnnotationSettings;
use crate::edit::Edit;
use crate::rules::Rule;
use crate::span::{Anchor, SourceSpanMap, SpanError};

/// Comments conditional branches and function definitions.
///
/// Branch comments go ahead of the `then`/`else` statement. Function
/// definitions get a `Begin function` line ahead of the definition and an
/// `End function` line just past the closing brace of the body.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Annotation {
    pub indent_new_lines: bool,
}

impl Annotation {
    pub fn from_settings(settings: &AnnotationSettings) -> Self {
        Self {
            indent_new_lines: settings.indent_new_lines,
        }
    }

    fn branch_comment(role: Role) -> Option<&'static str> {
        match role {
            Role::Then => Some("// the 'if' part\n"),
            Role::Else => Some("// the 'else' part\n"),
            _ => None,
        }
    }

    fn is_definition(node: &AstNode) -> bool {
        node.kind == NodeKind::FunctionDecl && node.attrs.has_body
    }
}

impl Default for Annotation {
    fn default() -> Self {
        Self::from_settings(&AnnotationSettings::default())
    }
}

impl Rule for Annotation {
    fn name(&self) -> &'static str {
        "annotation"
    }

    fn matches(&self, node: &AstNode) -> bool {
        Self::branch_comment(node.role).is_some() || Self::is_definition(node)
    }

    fn generate(&self, node: &AstNode, spans: &SourceSpanMap<'_>) -> Result<Vec<Edit>, SpanError> {
        let mut edits = Vec::new();

        if let Some(comment) = Self::branch_comment(node.role) {
            let at = spans.resolve(node, Anchor::Start)?;
            edits.push(Edit::before(at, comment).indented(self.indent_new_lines));
        }

        if Self::is_definition(node) {
            let name = node.attrs.name.as_deref().unwrap_or("<anonymous>");
            let result_type = node.attrs.result_type.as_deref().unwrap_or("void");

            let begin_at = spans.resolve(node, Anchor::Start)?;
            let end_at = spans.resolve_child(node, Role::Body, Anchor::End, 0)?;

            edits.push(
                Edit::before(
                    begin_at,
                    format!("// Begin function {name} returning {result_type}\n"),
                )
                .indented(self.indent_new_lines),
            );
            edits.push(
                Edit::after(end_at, format!("\n// End function {name}\n"))
                    .indented(self.indent_new_lines),
            );
        }

        Ok(edits)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ast::{Attributes, Span};
    use crate::edit::Placement;
    use crate::span::SourceText;

    #[test]
    fn branches_get_comment_before_start() {
        let source = SourceText::new("if (x) a(); else b();");
        let spans = SourceSpanMap::new(&source);
        let then = AstNode::new(NodeKind::Stmt, Span::new(7, 11)).with_role(Role::Then);
        let other = AstNode::new(NodeKind::Stmt, Span::new(17, 21)).with_role(Role::Else);
        let rule = Annotation::default();

        let then_edits = rule.generate(&then, &spans).unwrap();
        assert_eq!(then_edits.len(), 1);
        assert_eq!(then_edits[0].offset, 7);
        assert_eq!(then_edits[0].text, "// the 'if' part\n");
        assert_eq!(then_edits[0].placement, Placement::BeforeExisting);

        let else_edits = rule.generate(&other, &spans).unwrap();
        assert_eq!(else_edits[0].text, "// the 'else' part\n");
    }

    #[test]
    fn definition_gets_begin_and_end_comments() {
        let text = "int foo() { return 1; }";
        let source = SourceText::new(text);
        let spans = SourceSpanMap::new(&source);
        let body_start = text.find('{').unwrap();
        let node = AstNode::new(NodeKind::FunctionDecl, Span::new(0, text.len()))
            .with_attrs(Attributes {
                name: Some("foo".to_string()),
                result_type: Some("int".to_string()),
                param_count: Some(0),
                has_body: true,
                ..Attributes::default()
            })
            .with_child(
                AstNode::new(NodeKind::CompoundStmt, Span::new(body_start, text.len()))
                    .with_role(Role::Body),
            );

        let rule = Annotation::default();
        assert!(rule.matches(&node));
        let edits = rule.generate(&node, &spans).unwrap();
        assert_eq!(edits.len(), 2);
        assert_eq!(edits[0].offset, 0);
        assert_eq!(edits[0].text, "// Begin function foo returning int\n");
        assert_eq!(edits[1].offset, text.len());
        assert_eq!(edits[1].text, "\n// End function foo\n");
        assert_eq!(edits[1].placement, Placement::AfterExisting);
    }

    #[test]
    fn prototypes_are_not_annotated() {
        let node = AstNode::new(NodeKind::FunctionDecl, Span::new(0, 8)).with_attrs(Attributes {
            name: Some("f".to_string()),
            has_body: false,
            ..Attributes::default()
        });
        assert!(!Annotation::default().matches(&node));
    }

    #[test]
    fn definition_without_body_child_fails() {
        let source = SourceText::new("int foo() {}");
        let spans = SourceSpanMap::new(&source);
        let node = AstNode::new(NodeKind::FunctionDecl, Span::new(0, 12)).with_attrs(Attributes {
            has_body: true,
            ..Attributes::default()
        });

        let err = Annotation::default().generate(&node, &spans).unwrap_err();
        assert!(matches!(err, SpanError::MissingChild { role: Role::Body, .. }));
    }
}
