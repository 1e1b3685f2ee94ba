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

//! Scope-visibility checking.
//!
//! A stack of frames, each holding three name sets (variables, types,
//! routines). Frames are pushed on program/body/routine/for-loop entry and
//! popped on exit; visibility walks the stack tip to root. Declaration order
//! matters: a type body is checked before its name becomes visible (so
//! self-referential aliases are rejected), while a variable name is added
//! before its type and initializer are checked.

use std::collections::HashSet;

use ast::{Node, NodeKind};

use crate::Diagnostic;

#[derive(Debug, Default)]
struct Frame {
    vars: HashSet<String>,
    types: HashSet<String>,
    routines: HashSet<String>,
}

#[derive(Debug, Default)]
struct ScopeStack {
    frames: Vec<Frame>,
}

impl ScopeStack {
    fn push(&mut self) {
        self.frames.push(Frame::default());
    }

    fn pop(&mut self) {
        self.frames.pop();
    }

    fn top(&mut self) -> &mut Frame {
        self.frames.last_mut().expect("scope stack is never empty")
    }

    fn declare_var(&mut self, name: &str) {
        self.top().vars.insert(name.to_string());
    }

    fn declare_type(&mut self, name: &str) {
        self.top().types.insert(name.to_string());
    }

    fn declare_routine(&mut self, name: &str) {
        self.top().routines.insert(name.to_string());
    }

    fn var_visible(&self, name: &str) -> bool {
        self.frames.iter().rev().any(|f| f.vars.contains(name))
    }

    fn type_visible(&self, name: &str) -> bool {
        matches!(name, "integer" | "real" | "boolean")
            || self.frames.iter().rev().any(|f| f.types.contains(name))
    }

    fn routine_visible(&self, name: &str) -> bool {
        self.frames.iter().rev().any(|f| f.routines.contains(name))
    }
}

/// Check every reference in `program` against the scope discipline above.
pub fn check(program: &Node, diagnostics: &mut Vec<Diagnostic>) {
    let mut checker = Checker {
        scopes: ScopeStack::default(),
        diagnostics,
    };
    checker.scopes.push();
    checker.visit(program);
    checker.scopes.pop();
}

struct Checker<'a> {
    scopes: ScopeStack,
    diagnostics: &'a mut Vec<Diagnostic>,
}

impl Checker<'_> {
    fn undeclared(&mut self, what: &str, name: &str) {
        self.diagnostics.push(Diagnostic::error(format!(
            "use of undeclared {what} '{name}'"
        )));
    }

    fn visit(&mut self, node: &Node) {
        match node.kind {
            NodeKind::Program => {
                for child in &node.children {
                    self.visit(child);
                }
            }

            NodeKind::TypeDecl => {
                // Body first: `type T is array [n] of T` must not resolve.
                for child in &node.children {
                    self.visit(child);
                }
                self.scopes.declare_type(&node.value);
            }

            NodeKind::VarDecl => {
                self.scopes.declare_var(&node.value);
                for child in &node.children {
                    self.visit(child);
                }
            }

            NodeKind::RoutineForwardDecl => {
                self.scopes.declare_routine(&node.value);
                self.scopes.push();
                for child in &node.children {
                    self.visit(child);
                }
                self.scopes.pop();
            }

            NodeKind::RoutineDecl => {
                self.scopes.declare_routine(&node.value);
                self.scopes.push();
                for child in &node.children {
                    self.visit(child);
                }
                self.scopes.pop();
            }

            NodeKind::Parameter => {
                self.scopes.declare_var(&node.value);
                for child in &node.children {
                    self.visit(child);
                }
            }

            NodeKind::Body => {
                self.scopes.push();
                for child in &node.children {
                    self.visit(child);
                }
                self.scopes.pop();
            }

            NodeKind::For => {
                self.scopes.push();
                self.scopes.declare_var(&node.value);
                for child in &node.children {
                    // The reverse marker is not a variable reference.
                    if child.kind == NodeKind::Identifier && child.value == "reverse" {
                        continue;
                    }
                    self.visit(child);
                }
                self.scopes.pop();
            }

            NodeKind::UserType => {
                if !self.scopes.type_visible(&node.value) {
                    self.undeclared("type", &node.value);
                }
            }

            NodeKind::RoutineCall => {
                if !self.scopes.routine_visible(&node.value) {
                    self.undeclared("routine", &node.value);
                }
                for child in &node.children {
                    self.visit(child);
                }
            }

            NodeKind::Identifier => {
                if !self.scopes.var_visible(&node.value) {
                    self.undeclared("variable", &node.value);
                }
            }

            NodeKind::MemberAccess => {
                // Field names resolve against the record layout, not the
                // scope stack; only the base is a scoped reference.
                for child in &node.children {
                    self.visit(child);
                }
            }

            _ => {
                for child in &node.children {
                    self.visit(child);
                }
            }
        }
    }
}
