//! Tagged syntax tree consumed by the rewrite engine.
//!
//! The engine never sees grammar-specific node types. A front-end lowers its
//! own tree into [`AstNode`] values: a [`NodeKind`] tag, an optional [`Span`],
//! a [`Role`] describing the node's position inside its parent, an
//! [`Attributes`] bag for the handful of facts rules need, and ordered
//! children.

use serde::Serialize;
use std::fmt;

/// Half-open byte range `[start, end)` in the original text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub struct Span {
    pub start: usize,
    pub end: usize,
}

impl Span {
    pub fn new(start: usize, end: usize) -> Self {
        Self { start, end }
    }

    pub fn len(&self) -> usize {
        self.end.saturating_sub(self.start)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl fmt::Display for Span {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}..{}", self.start, self.end)
    }
}

/// Category tag of a node.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum NodeKind {
    TranslationUnit,
    /// Function definition or prototype.
    FunctionDecl,
    ParamList,
    Param,
    /// A single punctuation token kept for its location (e.g. `)`).
    Token,
    CompoundStmt,
    IfStmt,
    BinaryOp,
    Expr,
    Stmt,
    Decl,
    Other,
}

impl NodeKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            NodeKind::TranslationUnit => "translation-unit",
            NodeKind::FunctionDecl => "function-decl",
            NodeKind::ParamList => "param-list",
            NodeKind::Param => "param",
            NodeKind::Token => "token",
            NodeKind::CompoundStmt => "compound-stmt",
            NodeKind::IfStmt => "if-stmt",
            NodeKind::BinaryOp => "binary-op",
            NodeKind::Expr => "expr",
            NodeKind::Stmt => "stmt",
            NodeKind::Decl => "decl",
            NodeKind::Other => "other",
        }
    }
}

impl fmt::Display for NodeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Position of a node inside its parent.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum Role {
    #[default]
    None,
    Lhs,
    Rhs,
    Params,
    CloseParen,
    Body,
    Condition,
    Then,
    Else,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::None => "none",
            Role::Lhs => "lhs",
            Role::Rhs => "rhs",
            Role::Params => "params",
            Role::CloseParen => "close-paren",
            Role::Body => "body",
            Role::Condition => "condition",
            Role::Then => "then",
            Role::Else => "else",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Binary operator of a [`NodeKind::BinaryOp`] node.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum BinaryOperator {
    Add,
    Sub,
    Mul,
    Div,
    Rem,
    Shl,
    Shr,
    Lt,
    Gt,
    Le,
    Ge,
    Eq,
    Ne,
    BitAnd,
    BitXor,
    BitOr,
    LogicalAnd,
    LogicalOr,
    Other,
}

impl BinaryOperator {
    /// Map an operator token to its operator. Unknown tokens map to `Other`.
    pub fn from_token(token: &str) -> Self {
        match token {
            "+" => BinaryOperator::Add,
            "-" => BinaryOperator::Sub,
            "*" => BinaryOperator::Mul,
            "/" => BinaryOperator::Div,
            "%" => BinaryOperator::Rem,
            "<<" => BinaryOperator::Shl,
            ">>" => BinaryOperator::Shr,
            "<" => BinaryOperator::Lt,
            ">" => BinaryOperator::Gt,
            "<=" => BinaryOperator::Le,
            ">=" => BinaryOperator::Ge,
            "==" => BinaryOperator::Eq,
            "!=" | "not_eq" => BinaryOperator::Ne,
            "&" | "bitand" => BinaryOperator::BitAnd,
            "^" | "xor" => BinaryOperator::BitXor,
            "|" | "bitor" => BinaryOperator::BitOr,
            "&&" | "and" => BinaryOperator::LogicalAnd,
            "||" | "or" => BinaryOperator::LogicalOr,
            _ => BinaryOperator::Other,
        }
    }

    pub fn is_additive(&self) -> bool {
        matches!(self, BinaryOperator::Add | BinaryOperator::Sub)
    }

    pub fn is_multiplicative(&self) -> bool {
        matches!(
            self,
            BinaryOperator::Mul | BinaryOperator::Div | BinaryOperator::Rem
        )
    }
}

/// Kind-specific facts supplied by the front-end.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Attributes {
    pub operator: Option<BinaryOperator>,
    /// Declared name, as displayed to users (unqualified).
    pub name: Option<String>,
    /// Display string of a function's result type.
    pub result_type: Option<String>,
    pub param_count: Option<usize>,
    pub has_body: bool,
}

/// One node of the tagged tree.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AstNode {
    pub kind: NodeKind,
    pub role: Role,
    /// `None` when the node has no literal location in the original text.
    pub span: Option<Span>,
    pub attrs: Attributes,
    pub children: Vec<AstNode>,
}

impl AstNode {
    /// Create a node anchored to `span`.
    pub fn new(kind: NodeKind, span: Span) -> Self {
        Self {
            kind,
            role: Role::None,
            span: Some(span),
            attrs: Attributes::default(),
            children: Vec::new(),
        }
    }

    /// Create a node with no literal location (synthesized or macro-only).
    pub fn unresolved(kind: NodeKind) -> Self {
        Self {
            kind,
            role: Role::None,
            span: None,
            attrs: Attributes::default(),
            children: Vec::new(),
        }
    }

    pub fn with_role(mut self, role: Role) -> Self {
        self.role = role;
        self
    }

    pub fn with_attrs(mut self, attrs: Attributes) -> Self {
        self.attrs = attrs;
        self
    }

    pub fn with_child(mut self, child: AstNode) -> Self {
        self.children.push(child);
        self
    }

    pub fn with_children(mut self, children: impl IntoIterator<Item = AstNode>) -> Self {
        self.children.extend(children);
        self
    }

    /// First child playing `role`.
    pub fn child(&self, role: Role) -> Option<&AstNode> {
        self.children.iter().find(|c| c.role == role)
    }

    /// Pre-order iterator: node before its children, children left to right.
    pub fn preorder(&self) -> Preorder<'_> {
        Preorder { stack: vec![self] }
    }
}

/// Iterator returned by [`AstNode::preorder`].
pub struct Preorder<'a> {
    stack: Vec<&'a AstNode>,
}

impl<'a> Iterator for Preorder<'a> {
    type Item = &'a AstNode;

    fn next(&mut self) -> Option<Self::Item> {
        let node = self.stack.pop()?;
        self.stack.extend(node.children.iter().rev());
        Some(node)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn leaf(kind: NodeKind, start: usize, end: usize, role: Role) -> AstNode {
        AstNode::new(kind, Span::new(start, end)).with_role(role)
    }

    #[test]
    fn child_lookup_by_role() {
        let node = AstNode::new(NodeKind::BinaryOp, Span::new(0, 5))
            .with_child(leaf(NodeKind::Expr, 0, 1, Role::Lhs))
            .with_child(leaf(NodeKind::Expr, 4, 5, Role::Rhs));

        assert_eq!(node.child(Role::Rhs).and_then(|c| c.span), Some(Span::new(4, 5)));
        assert!(node.child(Role::Body).is_none());
    }

    #[test]
    fn preorder_visits_parent_first_then_children_in_order() {
        let tree = AstNode::new(NodeKind::TranslationUnit, Span::new(0, 20))
            .with_child(
                AstNode::new(NodeKind::FunctionDecl, Span::new(0, 10))
                    .with_child(leaf(NodeKind::ParamList, 5, 7, Role::Params))
                    .with_child(leaf(NodeKind::CompoundStmt, 8, 10, Role::Body)),
            )
            .with_child(leaf(NodeKind::Decl, 11, 20, Role::None));

        let kinds: Vec<_> = tree.preorder().map(|n| n.kind).collect();
        assert_eq!(
            kinds,
            vec![
                NodeKind::TranslationUnit,
                NodeKind::FunctionDecl,
                NodeKind::ParamList,
                NodeKind::CompoundStmt,
                NodeKind::Decl,
            ]
        );
    }

    #[test]
    fn operator_categories() {
        assert!(BinaryOperator::from_token("+").is_additive());
        assert!(BinaryOperator::from_token("-").is_additive());
        assert!(BinaryOperator::from_token("%").is_multiplicative());
        assert!(!BinaryOperator::from_token("<<").is_additive());
        assert!(!BinaryOperator::from_token("&&").is_multiplicative());
        assert_eq!(BinaryOperator::from_token("<=>"), BinaryOperator::Other);
    }

    #[test]
    fn kind_names_are_kebab_case() {
        assert_eq!(NodeKind::BinaryOp.to_string(), "binary-op");
        assert_eq!(NodeKind::FunctionDecl.to_string(), "function-decl");
        assert_eq!(Role::CloseParen.to_string(), "close-paren");
    }
}
