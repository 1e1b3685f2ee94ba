/*
 * Copyright (c) 2026. The wasmpas authors.
 *
 * Licensed under the Apache License, Version 2.0 (the "License");
 * you may not use this file except in compliance with the License.
 * You may obtain a copy of the License at
 *
 *     http://www.apache.org/licenses/LICENSE-2.0
 *
 * Unless required by applicable law or agreed to in writing, software
 * distributed under the License is distributed on an "AS IS" BASIS,
 * WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
 * See the License for the specific language governing permissions and
 * limitations under the License.
 */

//! Shared AST data model.
//!
//! The tree is homogeneous: every node is a [`Node`] carrying a [`NodeKind`]
//! tag, an optional textual value (identifier name, literal text, operator
//! symbol), and an ordered list of children. Parents own their children
//! outright, which lets the semantic passes rewrite and delete subtrees in
//! place without any shared-ownership machinery.
//!
//! Child-shape conventions (relied on by both the analyzer and the emitter):
//!
//! - `Program`: variable, type, and routine declarations in source order.
//! - `VarDecl` (value = name): type expression, then optional initializer.
//! - `TypeDecl` (value = name): the aliased type expression.
//! - `RoutineDecl` / `RoutineForwardDecl` (value = name): optional
//!   `ParameterList`, optional return type node, and (full decls only) a
//!   `Body`.
//! - `Parameter` (value = name): the parameter's type expression.
//! - `ArrayType`: optional size expression and the element type, matched by
//!   kind rather than by position.
//! - `RecordType`: a single `Body` whose children are the field `VarDecl`s.
//! - `Assignment`: target, then value.
//! - `If`: condition, then-`Body`, optional else-`Body`.
//! - `While`: condition, `Body`.
//! - `For` (value = loop variable): `Range`, `Body`, and optionally an
//!   `Identifier` child with the literal value `"reverse"`.
//! - `Print`: one `ExpressionList` child holding the printed items.
//! - `Return`: optional value expression.
//! - `ArrayAccess`: base, then index. `MemberAccess` (value = field name):
//!   base. `SizeExpression`: the array-valued base.
//! - `RoutineCall` (value = callee): optional `ArgumentList`.
//! - `Range`: low bound, high bound.

mod kind;

pub use kind::NodeKind;

use std::fmt;

/// One AST node: a kind tag, an optional textual value, and owned children.
#[derive(Debug, Clone, PartialEq)]
pub struct Node {
    pub kind: NodeKind,
    pub value: String,
    pub children: Vec<Node>,
}

impl Node {
    pub fn new(kind: NodeKind) -> Self {
        Self {
            kind,
            value: String::new(),
            children: Vec::new(),
        }
    }

    pub fn with_value(kind: NodeKind, value: impl Into<String>) -> Self {
        Self {
            kind,
            value: value.into(),
            children: Vec::new(),
        }
    }

    pub fn with_children(kind: NodeKind, children: Vec<Node>) -> Self {
        Self {
            kind,
            value: String::new(),
            children,
        }
    }

    /// Append a child, returning `self` for builder-style construction.
    pub fn child(mut self, node: Node) -> Self {
        self.children.push(node);
        self
    }

    pub fn add_child(&mut self, node: Node) {
        self.children.push(node);
    }

    /// First child of the given kind, if any.
    pub fn find_child(&self, kind: NodeKind) -> Option<&Node> {
        self.children.iter().find(|c| c.kind == kind)
    }

    pub fn find_child_mut(&mut self, kind: NodeKind) -> Option<&mut Node> {
        self.children.iter_mut().find(|c| c.kind == kind)
    }

    /// True for the literal kinds the constant folder produces.
    pub fn is_literal(&self) -> bool {
        matches!(
            self.kind,
            NodeKind::IntLiteral
                | NodeKind::RealLiteral
                | NodeKind::BoolLiteral
                | NodeKind::StringLiteral
        )
    }

    pub fn as_int(&self) -> Option<i64> {
        (self.kind == NodeKind::IntLiteral)
            .then(|| self.value.parse().ok())
            .flatten()
    }

    pub fn as_real(&self) -> Option<f64> {
        (self.kind == NodeKind::RealLiteral)
            .then(|| self.value.parse().ok())
            .flatten()
    }

    pub fn as_bool(&self) -> Option<bool> {
        match (self.kind, self.value.as_str()) {
            (NodeKind::BoolLiteral, "true") => Some(true),
            (NodeKind::BoolLiteral, "false") => Some(false),
            _ => None,
        }
    }

    /// Indented tree dump used by the driver's `--dump-ast` flag and by
    /// tests diagnosing pass rewrites.
    pub fn dump(&self) -> String {
        let mut out = String::new();
        self.dump_into(&mut out, 0);
        out
    }

    fn dump_into(&self, out: &mut String, depth: usize) {
        for _ in 0..depth {
            out.push_str("  ");
        }
        out.push_str(&self.kind.to_string());
        if !self.value.is_empty() {
            out.push_str(" (");
            out.push_str(&self.value);
            out.push(')');
        }
        out.push('\n');
        for c in &self.children {
            c.dump_into(out, depth + 1);
        }
    }
}

impl fmt::Display for Node {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.dump())
    }
}

// ─── Factories ───────────────────────────────────────────────────────────────

/// `l <op> r`
pub fn binary_op(op: impl Into<String>, l: Node, r: Node) -> Node {
    Node {
        kind: NodeKind::BinaryOp,
        value: op.into(),
        children: vec![l, r],
    }
}

/// `<op> operand`
pub fn unary_op(op: impl Into<String>, operand: Node) -> Node {
    Node {
        kind: NodeKind::UnaryOp,
        value: op.into(),
        children: vec![operand],
    }
}

pub fn int_lit(v: i64) -> Node {
    Node::with_value(NodeKind::IntLiteral, v.to_string())
}

pub fn real_lit(v: f64) -> Node {
    Node::with_value(NodeKind::RealLiteral, format_real(v))
}

pub fn bool_lit(v: bool) -> Node {
    Node::with_value(NodeKind::BoolLiteral, if v { "true" } else { "false" })
}

pub fn identifier(name: impl Into<String>) -> Node {
    Node::with_value(NodeKind::Identifier, name)
}

/// Real literals keep a decimal point so a refolded tree still parses as a
/// real (`2.0`, not `2`).
pub fn format_real(v: f64) -> String {
    let s = v.to_string();
    if s.contains('.') || s.contains('e') || s.contains("inf") || s.contains("NaN") {
        s
    } else {
        format!("{s}.0")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn literal_accessors() {
        assert_eq!(int_lit(42).as_int(), Some(42));
        assert_eq!(real_lit(1.5).as_real(), Some(1.5));
        assert_eq!(bool_lit(true).as_bool(), Some(true));
        assert_eq!(identifier("x").as_int(), None);
    }

    #[test]
    fn real_literals_keep_a_decimal_point() {
        assert_eq!(real_lit(2.0).value, "2.0");
        assert_eq!(real_lit(0.25).value, "0.25");
    }

    #[test]
    fn dump_shows_kind_and_value() {
        let tree = binary_op("+", int_lit(1), identifier("x"));
        let dump = tree.dump();
        assert!(dump.starts_with("BINARY_OP (+)"));
        assert!(dump.contains("LITERAL_INT (1)"));
        assert!(dump.contains("IDENTIFIER (x)"));
    }
}
