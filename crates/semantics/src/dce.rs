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

//! Dead-code elimination.
//!
//! Removal rules, applied to the program root and to every body:
//!
//! 1. a routine goes iff it is uncalled and not an entry point (`main`,
//!    plus `testRunner` when present);
//! 2. a global variable goes iff it is neither read nor written;
//! 3. an assignment to a write-only local goes; a side-effecting right-hand
//!    side is promoted to a standalone expression statement so the effect
//!    survives;
//! 4. a local variable declaration goes iff nothing reads it, no surviving
//!    statement still writes it, it does not escape its scope, and its
//!    initializer is effect-free;
//! 5. assignments to globals and outer-scope variables are never removed;
//! 6. type declarations and type expressions are never removed.
//!
//! Everything removed is tallied in the [`RemovalReport`].

use std::collections::HashSet;
use std::fmt;

use ast::{Node, NodeKind};
use tracing::debug;

use crate::collect::SymbolTable;

/// Routines kept even when nothing calls them.
const ENTRY_POINTS: [&str; 2] = ["main", "testRunner"];

/// Counts of removed constructs, by category.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct RemovalReport {
    pub routines: usize,
    pub globals: usize,
    pub locals: usize,
    pub assignments: usize,
}

impl RemovalReport {
    pub fn total(&self) -> usize {
        self.routines + self.globals + self.locals + self.assignments
    }
}

impl fmt::Display for RemovalReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "removed {} routine(s), {} global variable(s), {} local variable(s), \
             {} assignment(s)",
            self.routines, self.globals, self.locals, self.assignments
        )
    }
}

/// Run every elimination rule over the tree, in place.
pub fn eliminate(program: &mut Node, symbols: &SymbolTable) -> RemovalReport {
    let mut report = RemovalReport::default();

    remove_dead_routines(program, symbols, &mut report);
    remove_dead_assignments(program, symbols, &mut report);

    // Writes that survived assignment elimination keep their targets alive.
    let mut surviving_writes = HashSet::new();
    collect_surviving_writes(program, &mut surviving_writes);

    remove_dead_globals(program, symbols, &mut report);
    remove_dead_locals(program, symbols, &surviving_writes, &mut report);

    report
}

fn remove_dead_routines(program: &mut Node, symbols: &SymbolTable, report: &mut RemovalReport) {
    program.children.retain(|child| {
        if !matches!(
            child.kind,
            NodeKind::RoutineDecl | NodeKind::RoutineForwardDecl
        ) {
            return true;
        }
        let keep =
            symbols.called.contains(&child.value) || ENTRY_POINTS.contains(&child.value.as_str());
        if !keep {
            debug!(routine = %child.value, "removing uncalled routine");
            report.routines += 1;
        }
        keep
    });
}

fn remove_dead_globals(program: &mut Node, symbols: &SymbolTable, report: &mut RemovalReport) {
    program.children.retain(|child| {
        if child.kind != NodeKind::VarDecl {
            return true;
        }
        let keep =
            symbols.reads.contains(&child.value) || symbols.writes.contains(&child.value);
        if !keep {
            debug!(global = %child.value, "removing unused global");
            report.globals += 1;
        }
        keep
    });
}

/// Rewrite every body: assignments to write-only locals disappear, with
/// side-effecting right-hand sides left behind as expression statements.
fn remove_dead_assignments(node: &mut Node, symbols: &SymbolTable, report: &mut RemovalReport) {
    // Record bodies hold field declarations, not statements.
    if matches!(node.kind, NodeKind::TypeDecl | NodeKind::RecordType) {
        return;
    }
    if node.kind == NodeKind::Body {
        let statements = std::mem::take(&mut node.children);
        for mut stmt in statements {
            remove_dead_assignments(&mut stmt, symbols, report);
            if let Some(target) = dead_assignment_target(&stmt, symbols) {
                debug!(variable = %target, "removing assignment to write-only local");
                report.assignments += 1;
                let rhs = stmt.children.pop().expect("assignment has two children");
                if has_side_effects(&rhs, symbols) {
                    node.children.push(rhs);
                }
                continue;
            }
            node.children.push(stmt);
        }
        return;
    }
    for child in &mut node.children {
        remove_dead_assignments(child, symbols, report);
    }
}

/// Name of the write-only local a removable assignment targets, if this
/// statement is one. Only simple identifier targets qualify; element and
/// field stores are left alone.
fn dead_assignment_target<'a>(stmt: &'a Node, symbols: &SymbolTable) -> Option<&'a str> {
    if stmt.kind != NodeKind::Assignment {
        return None;
    }
    let target = stmt.children.first()?;
    if target.kind != NodeKind::Identifier {
        return None;
    }
    let name = target.value.as_str();
    let removable = symbols.locals.contains(name)
        && !symbols.globals.contains(name)
        && !symbols.reads.contains(name)
        && !symbols.outer_scope.contains(name);
    removable.then_some(name)
}

/// An expression has observable effects if it calls a routine or reads a
/// global or scope-escaping variable.
pub fn has_side_effects(expr: &Node, symbols: &SymbolTable) -> bool {
    match expr.kind {
        NodeKind::RoutineCall => true,
        NodeKind::Identifier => {
            symbols.globals.contains(&expr.value) || symbols.outer_scope.contains(&expr.value)
        }
        _ => expr
            .children
            .iter()
            .any(|child| has_side_effects(child, symbols)),
    }
}

fn collect_surviving_writes(node: &Node, writes: &mut HashSet<String>) {
    if node.kind == NodeKind::Assignment {
        if let Some(target) = node.children.first() {
            collect_target_names(target, writes);
        }
    }
    for child in &node.children {
        collect_surviving_writes(child, writes);
    }
}

fn collect_target_names(target: &Node, writes: &mut HashSet<String>) {
    match target.kind {
        NodeKind::Identifier => {
            writes.insert(target.value.clone());
        }
        NodeKind::MemberAccess | NodeKind::ArrayAccess => {
            if let Some(base) = target.children.first() {
                collect_target_names(base, writes);
            }
        }
        _ => {}
    }
}

fn remove_dead_locals(
    node: &mut Node,
    symbols: &SymbolTable,
    surviving_writes: &HashSet<String>,
    report: &mut RemovalReport,
) {
    // Record fields are part of a type, never dead code.
    if matches!(node.kind, NodeKind::TypeDecl | NodeKind::RecordType) {
        return;
    }
    if node.kind == NodeKind::Body {
        node.children.retain(|child| {
            if child.kind != NodeKind::VarDecl {
                return true;
            }
            let name = child.value.as_str();
            let initializer_pure = child
                .children
                .get(1)
                .map_or(true, |init| !has_side_effects(init, symbols));
            let removable = !symbols.reads.contains(name)
                && !symbols.outer_scope.contains(name)
                && !surviving_writes.contains(name)
                && initializer_pure;
            if removable {
                debug!(variable = %name, "removing unused local");
                report.locals += 1;
            }
            !removable
        });
    }
    for child in &mut node.children {
        remove_dead_locals(child, symbols, surviving_writes, report);
    }
}
