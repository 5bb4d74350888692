use crate::ast::AstNode;
use crate::edit::EditBuffer;
use crate::rewrite::{NodeRef, RewriteError};
use crate::rules::RuleSet;
use crate::span::SourceSpanMap;
use serde::Serialize;
use tracing::{debug, trace};

/// Counters collected during one traversal.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct TraversalStats {
    pub nodes_visited: usize,
    pub rule_matches: usize,
    pub edits_inserted: usize,
}

/// Single pre-order walk applying every rule to every node.
///
/// Nodes are visited before their children and siblings left to right, so
/// edit emission order is fully determined by the tree. Rules run in the
/// rule set's declaration order.
pub struct TraversalDispatcher<'r> {
    rules: &'r RuleSet,
}

impl<'r> TraversalDispatcher<'r> {
    pub fn new(rules: &'r RuleSet) -> Self {
        Self { rules }
    }

    /// Walk `root` once, appending every generated edit to `buffer`.
    ///
    /// Stops at the first structural error; the partially filled buffer is
    /// dropped with it.
    pub fn dispatch<'src>(
        &self,
        root: &AstNode,
        mut buffer: EditBuffer<'src>,
    ) -> Result<(EditBuffer<'src>, TraversalStats), RewriteError> {
        let spans = SourceSpanMap::new(buffer.source());
        let mut stats = TraversalStats::default();

        for node in root.preorder() {
            stats.nodes_visited += 1;

            for rule in self.rules.iter() {
                if !rule.matches(node) {
                    continue;
                }
                stats.rule_matches += 1;
                trace!(rule = rule.name(), node = %NodeRef::of(node), "rule matched");

                let edits = rule
                    .generate(node, &spans)
                    .map_err(|source| RewriteError::from_span(rule.name(), node, source))?;

                for edit in edits {
                    let offset = edit.offset;
                    buffer
                        .insert(edit)
                        .map_err(|source| RewriteError::from_edit(rule.name(), node, offset, source))?;
                    stats.edits_inserted += 1;
                }
            }
        }

        debug!(
            nodes = stats.nodes_visited,
            matches = stats.rule_matches,
            edits = stats.edits_inserted,
            "traversal complete"
        );
        Ok((buffer, stats))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ast::{Attributes, BinaryOperator, NodeKind, Role, Span};
    use crate::edit::Edit;
    use crate::rules::{OperatorRewrite, Rule};
    use crate::span::{SourceText, SpanError};

    /// Records the start offset of every node it sees.
    struct StartMarker;

    impl Rule for StartMarker {
        fn name(&self) -> &'static str {
            "start-marker"
        }

        fn matches(&self, _node: &AstNode) -> bool {
            true
        }

        fn generate(
            &self,
            node: &AstNode,
            spans: &SourceSpanMap<'_>,
        ) -> Result<Vec<Edit>, SpanError> {
            let at = spans.resolve(node, crate::span::Anchor::Start)?;
            Ok(vec![Edit::after(at, format!("<{}>", node.kind))])
        }
    }

    fn sum_tree() -> AstNode {
        AstNode::new(NodeKind::TranslationUnit, Span::new(0, 5)).with_child(
            AstNode::new(NodeKind::BinaryOp, Span::new(0, 5))
                .with_attrs(Attributes {
                    operator: Some(BinaryOperator::Add),
                    ..Attributes::default()
                })
                .with_child(AstNode::new(NodeKind::Expr, Span::new(0, 1)).with_role(Role::Lhs))
                .with_child(AstNode::new(NodeKind::Expr, Span::new(4, 5)).with_role(Role::Rhs)),
        )
    }

    #[test]
    fn visits_every_node_in_preorder() {
        let source = SourceText::new("a + b");
        let rules = RuleSet::empty().with_rule(StartMarker);
        let (buffer, stats) = TraversalDispatcher::new(&rules)
            .dispatch(&sum_tree(), EditBuffer::new(&source))
            .unwrap();

        assert_eq!(stats.nodes_visited, 4);
        assert_eq!(stats.edits_inserted, 4);
        assert_eq!(
            buffer.materialize(),
            "<translation-unit><binary-op><expr>a + <expr>b"
        );
    }

    #[test]
    fn empty_rule_set_produces_no_edits() {
        let source = SourceText::new("a + b");
        let rules = RuleSet::empty();
        let (buffer, stats) = TraversalDispatcher::new(&rules)
            .dispatch(&sum_tree(), EditBuffer::new(&source))
            .unwrap();

        assert!(buffer.is_empty());
        assert_eq!(stats.rule_matches, 0);
        assert_eq!(buffer.materialize(), "a + b");
    }

    #[test]
    fn rule_order_is_declaration_order() {
        let source = SourceText::new("a + b");
        let rules = RuleSet::empty()
            .with_rule(OperatorRewrite::default())
            .with_rule(StartMarker);
        let (buffer, _) = TraversalDispatcher::new(&rules)
            .dispatch(&sum_tree(), EditBuffer::new(&source))
            .unwrap();

        assert_eq!(
            buffer.materialize(),
            "<translation-unit><binary-op><expr>a + <expr>b * d"
        );
    }

    #[test]
    fn structural_error_names_rule_and_node() {
        let source = SourceText::new("a + b");
        let tree = AstNode::new(NodeKind::TranslationUnit, Span::new(0, 5))
            .with_child(AstNode::unresolved(NodeKind::Expr));
        let rules = RuleSet::empty().with_rule(StartMarker);

        let err = TraversalDispatcher::new(&rules)
            .dispatch(&tree, EditBuffer::new(&source))
            .unwrap_err();
        match err {
            RewriteError::UnresolvedLocation { rule, node, .. } => {
                assert_eq!(rule, "start-marker");
                assert_eq!(node.kind, NodeKind::Expr);
            }
            other => panic!("unexpected error: {other}"),
        }
    }
}
