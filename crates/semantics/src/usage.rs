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

//! Usage tracking.
//!
//! Reads come from every value position: assignment right-hand sides,
//! if/while conditions, for-loop ranges, return values, print arguments, and
//! call arguments. Writes come from assignment targets, where a dotted chain
//! contributes a write for every named component. Routine calls anywhere land
//! in the called set. A variable referenced from inside a routine or loop
//! body but declared in an enclosing frame is recorded as outer-scope; the
//! eliminator treats such variables as side-effect-escaping.

use std::collections::HashSet;

use ast::{Node, NodeKind};

use crate::collect::SymbolTable;

pub fn track(program: &Node, symbols: &mut SymbolTable) {
    let mut tracker = Tracker {
        symbols,
        frames: vec![HashSet::new()],
    };
    tracker.visit(program);
}

struct Tracker<'a> {
    symbols: &'a mut SymbolTable,
    /// One declaration set per routine/loop boundary (program frame at the
    /// bottom).
    frames: Vec<HashSet<String>>,
}

impl Tracker<'_> {
    fn declare(&mut self, name: &str) {
        self.frames
            .last_mut()
            .expect("frame stack is never empty")
            .insert(name.to_string());
    }

    /// Record that `name` was referenced here; if it resolves to an
    /// enclosing frame rather than the innermost one, it escapes.
    fn reference(&mut self, name: &str) {
        let Some((top, outer)) = self.frames.split_last() else {
            return;
        };
        if top.contains(name) {
            return;
        }
        if outer.iter().any(|f| f.contains(name)) {
            self.symbols.outer_scope.insert(name.to_string());
        }
    }

    fn visit(&mut self, node: &Node) {
        match node.kind {
            NodeKind::Program | NodeKind::Body => {
                for child in &node.children {
                    self.visit(child);
                }
            }

            NodeKind::VarDecl => {
                self.declare(&node.value);
                if let Some(init) = node.children.get(1) {
                    self.read_expr(init);
                }
            }

            // Field declarations inside a record type are not variable usage.
            NodeKind::TypeDecl => {}

            NodeKind::RoutineDecl => {
                self.frames.push(HashSet::new());
                if let Some(params) = node.find_child(NodeKind::ParameterList) {
                    for param in &params.children {
                        self.declare(&param.value);
                    }
                }
                if let Some(body) = node.find_child(NodeKind::Body) {
                    self.visit(body);
                }
                self.frames.pop();
            }

            NodeKind::Assignment => {
                if let [target, value] = node.children.as_slice() {
                    self.write_target(target);
                    self.read_expr(value);
                }
            }

            NodeKind::If => {
                if let Some(cond) = node.children.first() {
                    self.read_expr(cond);
                }
                for body in node.children.iter().skip(1) {
                    self.visit(body);
                }
            }

            NodeKind::While => {
                if let Some(cond) = node.children.first() {
                    self.read_expr(cond);
                }
                if let Some(body) = node.find_child(NodeKind::Body) {
                    self.frames.push(HashSet::new());
                    self.visit(body);
                    self.frames.pop();
                }
            }

            NodeKind::For => {
                if let Some(range) = node.find_child(NodeKind::Range) {
                    for bound in &range.children {
                        self.read_expr(bound);
                    }
                }
                self.frames.push(HashSet::new());
                self.declare(&node.value);
                if let Some(body) = node.find_child(NodeKind::Body) {
                    self.visit(body);
                }
                self.frames.pop();
            }

            NodeKind::Print => {
                if let Some(list) = node.children.first() {
                    for item in &list.children {
                        self.read_expr(item);
                    }
                }
            }

            NodeKind::Return => {
                if let Some(value) = node.children.first() {
                    self.read_expr(value);
                }
            }

            NodeKind::RoutineCall => self.read_expr(node),

            // Promoted expression statements and anything else.
            _ => {
                if node.kind.is_expression() {
                    self.read_expr(node);
                } else {
                    for child in &node.children {
                        self.visit(child);
                    }
                }
            }
        }
    }

    fn read_expr(&mut self, expr: &Node) {
        match expr.kind {
            NodeKind::Identifier => {
                self.symbols.reads.insert(expr.value.clone());
                self.reference(&expr.value);
            }
            NodeKind::MemberAccess => {
                self.symbols.reads.insert(expr.value.clone());
                for child in &expr.children {
                    self.read_expr(child);
                }
            }
            NodeKind::RoutineCall => {
                self.symbols.called.insert(expr.value.clone());
                for child in &expr.children {
                    self.read_expr(child);
                }
            }
            _ => {
                for child in &expr.children {
                    self.read_expr(child);
                }
            }
        }
    }

    fn write_target(&mut self, target: &Node) {
        match target.kind {
            NodeKind::Identifier => {
                self.symbols.writes.insert(target.value.clone());
                self.reference(&target.value);
            }
            NodeKind::MemberAccess => {
                self.symbols.writes.insert(target.value.clone());
                if let Some(base) = target.children.first() {
                    self.write_target(base);
                }
            }
            NodeKind::ArrayAccess => {
                if let [base, index] = target.children.as_slice() {
                    self.write_target(base);
                    self.read_expr(index);
                }
            }
            _ => self.read_expr(target),
        }
    }
}
