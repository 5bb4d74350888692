//! Declarative rewrite rules.
//!
//! A [`Rule`] is a predicate plus an edit generator over a single node. Rules
//! are pure: they see only the node they are handed and the span map, never
//! the edits produced by other rules. A [`RuleSet`] is the flat table the
//! traversal evaluates, in declaration order, against every node.

pub mod annotation;
pub mod operator;
pub mod signature;

pub use annotation::Annotation;
pub use operator::OperatorRewrite;
pub use signature::SignatureAugmentation;

use crate::ast::AstNode;
use crate::config::{RuleProfile, ValidationError};
use crate::edit::Edit;
use crate::span::{SourceSpanMap, SpanError};
use serde::Serialize;
use std::fmt;
use std::str::FromStr;

/// A structural match rule.
pub trait Rule {
    /// Stable identifier used in diagnostics.
    fn name(&self) -> &'static str;

    fn matches(&self, node: &AstNode) -> bool;

    /// Edits for a matched node. Either every edit for the node is returned or
    /// an error is; never a partial set.
    fn generate(&self, node: &AstNode, spans: &SourceSpanMap<'_>) -> Result<Vec<Edit>, SpanError>;
}

/// Built-in rule families.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum RuleId {
    OperatorRewrite,
    SignatureAugmentation,
    Annotation,
}

impl RuleId {
    pub const ALL: [RuleId; 3] = [
        RuleId::OperatorRewrite,
        RuleId::SignatureAugmentation,
        RuleId::Annotation,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            RuleId::OperatorRewrite => "operator-rewrite",
            RuleId::SignatureAugmentation => "signature-augmentation",
            RuleId::Annotation => "annotation",
        }
    }
}

impl fmt::Display for RuleId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for RuleId {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        RuleId::ALL
            .into_iter()
            .find(|id| id.as_str() == s)
            .ok_or_else(|| format!("unknown rule '{s}'"))
    }
}

/// Ordered table of rules.
#[derive(Default)]
pub struct RuleSet {
    rules: Vec<Box<dyn Rule>>,
}

impl RuleSet {
    /// A rule set that matches nothing.
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn with_rule(mut self, rule: impl Rule + 'static) -> Self {
        self.push(rule);
        self
    }

    pub fn push(&mut self, rule: impl Rule + 'static) {
        self.rules.push(Box::new(rule));
    }

    /// Build the rules a profile enables, in the profile's order.
    pub fn from_profile(profile: &RuleProfile) -> Result<Self, ValidationError> {
        let mut set = RuleSet::empty();
        for id in profile.rule_ids()? {
            match id {
                RuleId::OperatorRewrite => set.push(OperatorRewrite::from_settings(&profile.operator)),
                RuleId::SignatureAugmentation => {
                    set.push(SignatureAugmentation::from_settings(&profile.signature))
                }
                RuleId::Annotation => set.push(Annotation::from_settings(&profile.annotation)),
            }
        }
        Ok(set)
    }

    pub fn iter(&self) -> impl Iterator<Item = &dyn Rule> {
        self.rules.iter().map(|rule| rule.as_ref())
    }

    pub fn len(&self) -> usize {
        self.rules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    pub fn names(&self) -> Vec<&'static str> {
        self.iter().map(|rule| rule.name()).collect()
    }
}

impl fmt::Debug for RuleSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RuleSet")
            .field("rules", &self.names())
            .finish()
    }
}
