use crate::ast::{AstNode, NodeKind, Role, Span};
use crate::edit::{EditBuffer, EditError, PlannedInsertion};
use crate::frontend::{self, Dialect, FrontendError};
use crate::rules::RuleSet;
use crate::span::{Anchor, SourceText, SpanError};
use crate::traverse::{TraversalDispatcher, TraversalStats};
use std::fmt;
use thiserror::Error;
use tracing::{debug, info};

/// Kind and location of a node, for diagnostics.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NodeRef {
    pub kind: NodeKind,
    pub span: Option<Span>,
}

impl NodeRef {
    pub fn of(node: &AstNode) -> Self {
        Self {
            kind: node.kind,
            span: node.span,
        }
    }
}

impl fmt::Display for NodeRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.span {
            Some(span) => write!(f, "{} node at {}", self.kind, span),
            None => write!(f, "{} node without location", self.kind),
        }
    }
}

/// Any failure that aborts a rewrite. No output is produced alongside one.
#[derive(Error, Debug)]
pub enum RewriteError {
    #[error("rule '{rule}' on {node}: {part} has no literal location for its {anchor}")]
    UnresolvedLocation {
        rule: &'static str,
        node: NodeRef,
        part: NodeKind,
        anchor: Anchor,
    },

    #[error("rule '{rule}' on {node}: missing '{role}' child")]
    MissingChild {
        rule: &'static str,
        node: NodeRef,
        role: Role,
    },

    #[error("rule '{rule}' on {node}: offset {offset} is outside the source text (length {len})")]
    OutOfRange {
        rule: &'static str,
        node: NodeRef,
        offset: usize,
        len: usize,
    },

    #[error("rule '{rule}' on {node}: offset {offset} falls inside a UTF-8 character")]
    NotCharBoundary {
        rule: &'static str,
        node: NodeRef,
        offset: usize,
    },

    #[error(transparent)]
    Frontend(#[from] FrontendError),
}

impl RewriteError {
    pub(crate) fn from_span(rule: &'static str, node: &AstNode, error: SpanError) -> Self {
        let node_ref = NodeRef::of(node);
        match error {
            SpanError::Unresolved { kind, anchor } => RewriteError::UnresolvedLocation {
                rule,
                node: node_ref,
                part: kind,
                anchor,
            },
            SpanError::MissingChild { role, .. } => RewriteError::MissingChild {
                rule,
                node: node_ref,
                role,
            },
            SpanError::OutOfRange { offset, len } => RewriteError::OutOfRange {
                rule,
                node: node_ref,
                offset,
                len,
            },
        }
    }

    pub(crate) fn from_edit(
        rule: &'static str,
        node: &AstNode,
        offset: usize,
        error: EditError,
    ) -> Self {
        let node_ref = NodeRef::of(node);
        match error {
            EditError::OutOfRange { len, .. } => RewriteError::OutOfRange {
                rule,
                node: node_ref,
                offset,
                len,
            },
            EditError::NotCharBoundary { .. } => RewriteError::NotCharBoundary {
                rule,
                node: node_ref,
                offset,
            },
        }
    }

    /// Name of the rule that failed, if a rule failed.
    pub fn rule(&self) -> Option<&'static str> {
        match self {
            RewriteError::UnresolvedLocation { rule, .. }
            | RewriteError::MissingChild { rule, .. }
            | RewriteError::OutOfRange { rule, .. }
            | RewriteError::NotCharBoundary { rule, .. } => Some(*rule),
            RewriteError::Frontend(_) => None,
        }
    }
}

/// Traversal finished, output not yet produced.
#[derive(Debug)]
pub struct RewritePlan<'src> {
    buffer: EditBuffer<'src>,
    stats: TraversalStats,
}

impl<'src> RewritePlan<'src> {
    pub fn stats(&self) -> TraversalStats {
        self.stats
    }

    pub fn edits(&self) -> Vec<PlannedInsertion> {
        self.buffer.planned_edits()
    }

    /// Produce the rewritten text. Consumes the plan.
    pub fn materialize(self) -> String {
        let output = self.buffer.materialize();
        debug!(bytes = output.len(), "materialized rewrite");
        output
    }
}

/// Drives one rewrite: traversal into a fresh buffer, then materialization.
pub struct MaterializationStep<'r> {
    rules: &'r RuleSet,
}

impl<'r> MaterializationStep<'r> {
    pub fn new(rules: &'r RuleSet) -> Self {
        Self { rules }
    }

    /// Run the traversal and return the pending edits.
    pub fn plan<'src>(
        &self,
        source: &'src SourceText,
        root: &AstNode,
    ) -> Result<RewritePlan<'src>, RewriteError> {
        let (buffer, stats) =
            TraversalDispatcher::new(self.rules).dispatch(root, EditBuffer::new(source))?;
        info!(
            rules = self.rules.len(),
            nodes = stats.nodes_visited,
            edits = stats.edits_inserted,
            "rewrite planned"
        );
        Ok(RewritePlan { buffer, stats })
    }

    /// Run the traversal and materialize the output in one step.
    pub fn run(&self, source: &SourceText, root: &AstNode) -> Result<String, RewriteError> {
        Ok(self.plan(source, root)?.materialize())
    }
}

/// Rewrite `source` given an already-built tree.
pub fn rewrite(source: &SourceText, root: &AstNode, rules: &RuleSet) -> Result<String, RewriteError> {
    MaterializationStep::new(rules).run(source, root)
}

/// Parse `source` as `dialect` and rewrite it.
pub fn rewrite_source(
    source: &SourceText,
    dialect: Dialect,
    rules: &RuleSet,
) -> Result<String, RewriteError> {
    let root = frontend::parse(source, dialect)?;
    rewrite(source, &root, rules)
}
