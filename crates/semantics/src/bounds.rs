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

//! Static array-bounds analysis.
//!
//! Arrays are 1-indexed: valid subscripts are `1..=length`. For-loops whose
//! range endpoints are both integer literals register a value range for the
//! loop variable, valid for the duration of the loop body. Every array
//! access the analyzer can reason about either passes or produces an error;
//! accesses it cannot reason about produce a warning. Multi-dimensional
//! accesses are checked per indexed level.

use std::collections::HashMap;

use ast::{Node, NodeKind};

use crate::collect::{ArraySize, SymbolTable};
use crate::Diagnostic;

pub fn check(program: &Node, symbols: &SymbolTable, diagnostics: &mut Vec<Diagnostic>) {
    let mut checker = BoundsChecker {
        symbols,
        ranges: HashMap::new(),
        diagnostics,
    };
    checker.visit(program);
}

struct BoundsChecker<'a> {
    symbols: &'a SymbolTable,
    /// Loop variable → (low, high), normalized so `low <= high`.
    ranges: HashMap<String, (i64, i64)>,
    diagnostics: &'a mut Vec<Diagnostic>,
}

impl BoundsChecker<'_> {
    fn visit(&mut self, node: &Node) {
        if node.kind == NodeKind::For {
            self.visit_for(node);
            return;
        }
        if node.kind == NodeKind::ArrayAccess {
            self.check_access(node);
        }
        for child in &node.children {
            self.visit(child);
        }
    }

    fn visit_for(&mut self, node: &Node) {
        let tracked = node
            .find_child(NodeKind::Range)
            .and_then(|range| match range.children.as_slice() {
                [low, high] => Some((low.as_int()?, high.as_int()?)),
                _ => None,
            })
            .map(|(a, b)| (a.min(b), a.max(b)));

        // Save any shadowed outer-loop entry before registering this one.
        let shadowed = match tracked {
            Some(range) => self.ranges.insert(node.value.clone(), range),
            None => self.ranges.remove(&node.value),
        };

        for child in &node.children {
            self.visit(child);
        }

        match shadowed {
            Some(prev) => {
                self.ranges.insert(node.value.clone(), prev);
            }
            None => {
                self.ranges.remove(&node.value);
            }
        }
    }

    fn check_access(&mut self, access: &Node) {
        let [base, index] = access.children.as_slice() else {
            return;
        };
        let name = lvalue_name(base);
        let size = match self.symbols.type_of_lvalue(base) {
            Some(ty) => self.symbols.array_size(ty),
            None => ArraySize::NotArray,
        };

        match size {
            ArraySize::Static(length) => self.check_static(index, &name, length),
            ArraySize::Dynamic | ArraySize::NotArray => {
                // An illegal literal index is wrong no matter the size.
                if let Some(i) = index.as_int() {
                    if i < 1 {
                        self.diagnostics.push(Diagnostic::error(format!(
                            "Array index {i} out of bounds for array '{name}' (indices start at 1)"
                        )));
                        return;
                    }
                }
                let detail = if size == ArraySize::Dynamic {
                    "has dynamic size"
                } else {
                    "has unknown size"
                };
                self.diagnostics.push(Diagnostic::warning(format!(
                    "array '{name}' {detail}; cannot verify bounds at compile time"
                )));
            }
        }
    }

    fn check_static(&mut self, index: &Node, name: &str, length: i64) {
        if let Some(i) = index.as_int() {
            if i < 1 || i > length {
                self.diagnostics.push(Diagnostic::error(format!(
                    "Array index {i} out of bounds for array '{name}' of size {length}"
                )));
            }
            return;
        }

        if index.kind == NodeKind::Identifier {
            if let Some(&(low, high)) = self.ranges.get(&index.value) {
                if low < 1 || high > length {
                    self.diagnostics.push(Diagnostic::error(format!(
                        "Loop variable '{}' range [{low}..{high}] out of bounds for array \
                         '{name}' of size {length}",
                        index.value
                    )));
                }
                return;
            }
        }

        self.diagnostics.push(Diagnostic::warning(format!(
            "cannot verify index into array '{name}' of size {length} at compile time"
        )));
    }
}

/// Short printable name for an indexed l-value chain.
fn lvalue_name(expr: &Node) -> String {
    match expr.kind {
        NodeKind::Identifier => expr.value.clone(),
        NodeKind::MemberAccess => match expr.children.first() {
            Some(base) => format!("{}.{}", lvalue_name(base), expr.value),
            None => expr.value.clone(),
        },
        NodeKind::ArrayAccess => match expr.children.first() {
            Some(base) => format!("{}[]", lvalue_name(base)),
            None => "<array>".to_string(),
        },
        _ => "<expression>".to_string(),
    }
}
