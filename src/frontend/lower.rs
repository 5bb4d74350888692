//! Lowering from the tree-sitter C/C++ concrete syntax tree to [`AstNode`].
//!
//! Only named nodes are kept, plus the closing parenthesis of parameter lists
//! (signature rules anchor on it). Function declarators are flattened into a
//! single `function-decl` node carrying name, result type, parameter count and
//! body presence.

use crate::ast::{AstNode, Attributes, BinaryOperator, NodeKind, Role, Span};
use crate::frontend::parser::ParsedSource;
use tree_sitter::Node;

/// Lower a parsed file. The root becomes a `translation-unit` node whose
/// children are the top-level declarations in source order.
pub fn lower(parsed: &ParsedSource<'_>) -> AstNode {
    let lowerer = Lowerer {
        source: parsed.source,
    };
    lowerer.node(parsed.root_node(), Role::None)
}

struct Lowerer<'a> {
    source: &'a str,
}

impl<'a> Lowerer<'a> {
    fn text(&self, node: Node<'_>) -> &'a str {
        &self.source[node.byte_range()]
    }

    fn node(&self, node: Node<'_>, role: Role) -> AstNode {
        match node.kind() {
            "function_definition" => self.function_definition(node, role),
            "declaration" | "field_declaration" => self.declaration(node, role),
            "binary_expression" => self.binary(node, role),
            "if_statement" => self.if_statement(node, role),
            "parameter_list" => self.parameter_list(node, role),
            "preproc_if" | "preproc_elif" => self.preproc_conditional(node, role),
            kind => self.generic(node, classify(kind), role),
        }
    }

    fn generic(&self, node: Node<'_>, kind: NodeKind, role: Role) -> AstNode {
        AstNode::new(kind, span_of(node))
            .with_role(role)
            .with_children(self.named_children(node))
    }

    fn named_children(&self, node: Node<'_>) -> Vec<AstNode> {
        let mut cursor = node.walk();
        let children: Vec<Node<'_>> = node.named_children(&mut cursor).collect();
        children
            .into_iter()
            .map(|child| self.node(child, Role::None))
            .collect()
    }

    fn function_definition(&self, node: Node<'_>, role: Role) -> AstNode {
        let declarator = node.child_by_field_name("declarator");
        let Some(function) = declarator.and_then(function_declarator) else {
            return self.generic(node, NodeKind::Decl, role);
        };
        let body = node.child_by_field_name("body");

        let span = Span::new(extent_start(node), node.end_byte());
        let mut lowered = AstNode::new(NodeKind::FunctionDecl, span)
            .with_role(role)
            .with_attrs(Attributes {
                has_body: body.is_some(),
                ..self.signature_attrs(node, declarator, function)
            });

        let mut cursor = node.walk();
        let children: Vec<Node<'_>> = node.named_children(&mut cursor).collect();
        for child in children {
            if Some(child) == declarator {
                if let Some(params) = function.child_by_field_name("parameters") {
                    lowered.children.push(self.parameter_list(params, Role::Params));
                }
            } else if Some(child) == body {
                lowered.children.push(self.node(child, Role::Body));
            } else {
                lowered.children.push(self.node(child, Role::None));
            }
        }
        lowered
    }

    /// A declaration holds one `function-decl` child per function declarator.
    fn declaration(&self, node: Node<'_>, role: Role) -> AstNode {
        let mut lowered = AstNode::new(classify(node.kind()), span_of(node)).with_role(role);

        let mut cursor = node.walk();
        let children: Vec<Node<'_>> = node.named_children(&mut cursor).collect();
        for child in children {
            match function_declarator(child) {
                Some(function) => {
                    let span = Span::new(extent_start(node), child.end_byte());
                    let mut prototype = AstNode::new(NodeKind::FunctionDecl, span)
                        .with_attrs(self.signature_attrs(node, Some(child), function));
                    if let Some(params) = function.child_by_field_name("parameters") {
                        prototype
                            .children
                            .push(self.parameter_list(params, Role::Params));
                    }
                    lowered.children.push(prototype);
                }
                None => lowered.children.push(self.node(child, Role::None)),
            }
        }
        lowered
    }

    fn signature_attrs(
        &self,
        decl: Node<'_>,
        declarator: Option<Node<'_>>,
        function: Node<'_>,
    ) -> Attributes {
        let name = function
            .child_by_field_name("declarator")
            .map(|name| self.text(unqualified(name)).to_string());
        let param_count = function
            .child_by_field_name("parameters")
            .map(|params| self.param_count(params));

        Attributes {
            name,
            result_type: Some(self.result_type(decl, declarator)),
            param_count,
            ..Attributes::default()
        }
    }

    /// Display string of the declared result type, e.g. `const char *`.
    fn result_type(&self, decl: Node<'_>, declarator: Option<Node<'_>>) -> String {
        let mut parts: Vec<&str> = Vec::new();
        let mut cursor = decl.walk();
        for child in decl.named_children(&mut cursor) {
            if child.kind() == "type_qualifier" {
                parts.push(self.text(child));
            }
        }
        match decl.child_by_field_name("type") {
            Some(ty) => parts.push(self.text(ty)),
            // Constructors and destructors
            None => parts.push("void"),
        }
        let mut result = parts.join(" ");

        let mut current = declarator;
        while let Some(node) = current {
            match node.kind() {
                "pointer_declarator" => result.push_str(" *"),
                "reference_declarator" => result.push_str(" &"),
                _ => break,
            }
            current = node.child_by_field_name("declarator").or_else(|| node.named_child(0));
        }
        result
    }

    fn param_count(&self, params: Node<'_>) -> usize {
        let mut cursor = params.walk();
        let declared: Vec<Node<'_>> = params
            .named_children(&mut cursor)
            .filter(|child| {
                matches!(
                    child.kind(),
                    "parameter_declaration"
                        | "optional_parameter_declaration"
                        | "variadic_parameter_declaration"
                )
            })
            .collect();

        // `(void)` declares no parameters
        if let [only] = declared.as_slice() {
            if only.child_by_field_name("declarator").is_none() && self.text(*only).trim() == "void"
            {
                return 0;
            }
        }
        declared.len()
    }

    fn parameter_list(&self, node: Node<'_>, role: Role) -> AstNode {
        let mut lowered = AstNode::new(NodeKind::ParamList, span_of(node)).with_role(role);

        let mut cursor = node.walk();
        let children: Vec<Node<'_>> = node.children(&mut cursor).collect();
        for child in children {
            if child.is_named() {
                let kind = match child.kind() {
                    "parameter_declaration"
                    | "optional_parameter_declaration"
                    | "variadic_parameter_declaration" => NodeKind::Param,
                    other => classify(other),
                };
                lowered.children.push(self.generic(child, kind, Role::None));
            } else if child.kind() == ")" && !child.is_missing() {
                lowered.children.push(
                    AstNode::new(NodeKind::Token, span_of(child)).with_role(Role::CloseParen),
                );
            }
        }
        lowered
    }

    /// `#if`/`#elif` conditions are not code; only the guarded items are.
    fn preproc_conditional(&self, node: Node<'_>, role: Role) -> AstNode {
        let condition = node.child_by_field_name("condition");
        let mut lowered = AstNode::new(NodeKind::Other, span_of(node)).with_role(role);

        let mut cursor = node.walk();
        let children: Vec<Node<'_>> = node.named_children(&mut cursor).collect();
        for child in children {
            if Some(child) == condition {
                lowered.children.push(AstNode::new(NodeKind::Other, span_of(child)));
            } else {
                lowered.children.push(self.node(child, Role::None));
            }
        }
        lowered
    }

    fn binary(&self, node: Node<'_>, role: Role) -> AstNode {
        let operator = node
            .child_by_field_name("operator")
            .map(|op| BinaryOperator::from_token(op.kind()));

        let mut lowered = AstNode::new(NodeKind::BinaryOp, span_of(node))
            .with_role(role)
            .with_attrs(Attributes {
                operator,
                ..Attributes::default()
            });
        if let Some(left) = node.child_by_field_name("left") {
            lowered.children.push(self.node(left, Role::Lhs));
        }
        if let Some(right) = node.child_by_field_name("right") {
            lowered.children.push(self.node(right, Role::Rhs));
        }
        lowered
    }

    fn if_statement(&self, node: Node<'_>, role: Role) -> AstNode {
        let mut lowered = AstNode::new(NodeKind::IfStmt, span_of(node)).with_role(role);

        if let Some(condition) = node.child_by_field_name("condition") {
            lowered.children.push(self.node(condition, Role::Condition));
        }
        if let Some(consequence) = node.child_by_field_name("consequence") {
            lowered.children.push(self.node(consequence, Role::Then));
        }
        if let Some(alternative) = node.child_by_field_name("alternative") {
            // Newer grammars wrap the else arm in an `else_clause`
            let arm = if alternative.kind() == "else_clause" {
                alternative.named_child(0)
            } else {
                Some(alternative)
            };
            if let Some(arm) = arm {
                lowered.children.push(self.node(arm, Role::Else));
            }
        }
        lowered
    }
}

fn span_of(node: Node<'_>) -> Span {
    Span::new(node.start_byte(), node.end_byte())
}

/// Start of a declaration including any `template <...>` heads around it.
fn extent_start(node: Node<'_>) -> usize {
    let mut start = node.start_byte();
    let mut current = node;
    while let Some(parent) = current.parent() {
        if parent.kind() != "template_declaration" {
            break;
        }
        start = parent.start_byte();
        current = parent;
    }
    start
}

/// Follow declarator wrappers down to the function declarator that binds a
/// name. `int (*get(int))(char)` declares `get`; `int (*fp)(int)` declares
/// a pointer variable and yields nothing.
fn function_declarator(node: Node<'_>) -> Option<Node<'_>> {
    let mut current = node;
    loop {
        match current.kind() {
            "function_declarator" => {
                let inner = current.child_by_field_name("declarator")?;
                if names_declaration(inner) {
                    return Some(current);
                }
                current = inner;
            }
            "pointer_declarator" | "reference_declarator" | "parenthesized_declarator" => {
                current = current
                    .child_by_field_name("declarator")
                    .or_else(|| current.named_child(0))?;
            }
            _ => return None,
        }
    }
}

fn names_declaration(node: Node<'_>) -> bool {
    matches!(
        node.kind(),
        "identifier"
            | "field_identifier"
            | "qualified_identifier"
            | "destructor_name"
            | "operator_name"
            | "template_function"
    )
}

/// `ns::Type::method` names `method`.
fn unqualified(node: Node<'_>) -> Node<'_> {
    let mut current = node;
    while current.kind() == "qualified_identifier" {
        match current.child_by_field_name("name") {
            Some(name) => current = name,
            None => break,
        }
    }
    current
}

fn classify(kind: &str) -> NodeKind {
    match kind {
        "translation_unit" => NodeKind::TranslationUnit,
        "compound_statement" => NodeKind::CompoundStmt,
        "identifier" | "field_identifier" | "number_literal" | "string_literal"
        | "char_literal" | "true" | "false" | "null" | "nullptr" | "this" => NodeKind::Expr,
        k if k.ends_with("_expression") => NodeKind::Expr,
        k if k.ends_with("_statement") => NodeKind::Stmt,
        k if k.ends_with("_declaration")
            || k.ends_with("_definition")
            || k.ends_with("_specifier")
            || k == "declaration" =>
        {
            NodeKind::Decl
        }
        _ => NodeKind::Other,
    }
}
