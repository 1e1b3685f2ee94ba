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

//! Constant folding.
//!
//! Bottom-up rewrite of expression subtrees into literal nodes wherever all
//! operands reduce to literals of compatible kinds. Integer arithmetic wraps
//! in the 64-bit domain. Integer division is deliberately not folded (its
//! trap-on-zero semantics belong to the runtime); `%` and real division fold
//! only for nonzero divisors. Folding runs once, before dead-code
//! elimination, and is idempotent.

use ast::{bool_lit, int_lit, real_lit, Node, NodeKind};

/// Fold every expression in the tree in place.
pub fn fold(node: &mut Node) {
    for child in &mut node.children {
        fold(child);
    }
    match node.kind {
        NodeKind::UnaryOp => {
            if let Some(folded) = fold_unary(node) {
                *node = folded;
            }
        }
        NodeKind::BinaryOp => {
            if let Some(folded) = fold_binary(node) {
                *node = folded;
            }
        }
        _ => {}
    }
}

fn fold_unary(node: &Node) -> Option<Node> {
    let operand = node.children.first()?;
    match node.value.as_str() {
        "not" => operand.as_bool().map(|b| bool_lit(!b)),
        "+" => match operand.kind {
            NodeKind::IntLiteral | NodeKind::RealLiteral => Some(operand.clone()),
            _ => None,
        },
        "-" => {
            if let Some(i) = operand.as_int() {
                Some(int_lit(i.wrapping_neg()))
            } else {
                operand.as_real().map(|r| real_lit(-r))
            }
        }
        _ => None,
    }
}

fn fold_binary(node: &Node) -> Option<Node> {
    let [l, r] = node.children.as_slice() else {
        return None;
    };
    let op = node.value.as_str();

    // Boolean connectives.
    if let (Some(a), Some(b)) = (l.as_bool(), r.as_bool()) {
        return match op {
            "and" => Some(bool_lit(a && b)),
            "or" => Some(bool_lit(a || b)),
            "xor" => Some(bool_lit(a ^ b)),
            "=" => Some(bool_lit(a == b)),
            "/=" => Some(bool_lit(a != b)),
            _ => None,
        };
    }

    // Pure integer arithmetic and comparison.
    if let (Some(a), Some(b)) = (l.as_int(), r.as_int()) {
        return match op {
            "+" => Some(int_lit(a.wrapping_add(b))),
            "-" => Some(int_lit(a.wrapping_sub(b))),
            "*" => Some(int_lit(a.wrapping_mul(b))),
            // `/` keeps its runtime division (and division-by-zero trap).
            "%" if b != 0 => Some(int_lit(a.wrapping_rem(b))),
            "<" => Some(bool_lit(a < b)),
            "<=" => Some(bool_lit(a <= b)),
            ">" => Some(bool_lit(a > b)),
            ">=" => Some(bool_lit(a >= b)),
            "=" => Some(bool_lit(a == b)),
            "/=" => Some(bool_lit(a != b)),
            _ => None,
        };
    }

    // Real arithmetic, promoting an integer operand when the other side is
    // real.
    let a = numeric_as_real(l)?;
    let b = numeric_as_real(r)?;
    if l.kind != NodeKind::RealLiteral && r.kind != NodeKind::RealLiteral {
        return None;
    }
    match op {
        "+" => Some(real_lit(a + b)),
        "-" => Some(real_lit(a - b)),
        "*" => Some(real_lit(a * b)),
        "/" if b != 0.0 => Some(real_lit(a / b)),
        "<" => Some(bool_lit(a < b)),
        "<=" => Some(bool_lit(a <= b)),
        ">" => Some(bool_lit(a > b)),
        ">=" => Some(bool_lit(a >= b)),
        "=" => Some(bool_lit(a == b)),
        "/=" => Some(bool_lit(a != b)),
        _ => None,
    }
}

fn numeric_as_real(node: &Node) -> Option<f64> {
    node.as_real().or_else(|| node.as_int().map(|i| i as f64))
}
