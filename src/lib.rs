//! Span Rewriter: insert-only source-to-source rewriting
//!
//! Rewrites C and C++ source by splicing text into the original buffer at
//! offsets computed from a syntax tree. Everything that is not inserted stays
//! byte-identical.
//!
//! # Architecture
//!
//! All rules compile down to a single primitive: [`Edit`], an insertion of
//! text at a byte offset with a [`Placement`] relative to other insertions at
//! the same offset. Intelligence lives in offset acquisition
//! ([`SourceSpanMap`]), not in application ([`EditBuffer`]).
//!
//! 1. A front-end ([`frontend`]) lowers a tree-sitter tree into tagged
//!    [`AstNode`]s.
//! 2. [`TraversalDispatcher`] walks the tree once, pre-order, and evaluates
//!    every rule of a [`RuleSet`] on every node.
//! 3. [`MaterializationStep`] splices the accumulated edits into the original
//!    text, or reports the first structural error with no output at all.
//!
//! # Example
//!
//! ```no_run
//! use span_rewriter::{rewrite_source, Dialect, RuleProfile, RuleSet, SourceText};
//!
//! let source = SourceText::new("int f(int x) { return x + 1; }\n");
//! let rules = RuleSet::from_profile(&RuleProfile::default()).unwrap();
//!
//! match rewrite_source(&source, Dialect::C, &rules) {
//!     Ok(output) => print!("{output}"),
//!     Err(e) => eprintln!("Rewrite failed: {e}"),
//! }
//! ```

pub mod ast;
pub mod config;
pub mod edit;
pub mod frontend;
pub mod rewrite;
pub mod rules;
pub mod span;
pub mod traverse;

// Re-exports
pub use ast::{AstNode, Attributes, BinaryOperator, NodeKind, Role, Span};
pub use config::{
    load_from_path, load_from_str, resolve_profile, ConfigError, Preset, RuleProfile,
    ValidationError,
};
pub use edit::{write_atomic, Edit, EditBuffer, EditError, Placement, PlannedInsertion};
pub use frontend::{Dialect, FrontendError};
pub use rewrite::{
    rewrite, rewrite_source, MaterializationStep, NodeRef, RewriteError, RewritePlan,
};
pub use rules::{Annotation, OperatorRewrite, Rule, RuleId, RuleSet, SignatureAugmentation};
pub use span::{Anchor, SourceOffset, SourceSpanMap, SourceText, SpanError};
pub use traverse::{TraversalDispatcher, TraversalStats};
