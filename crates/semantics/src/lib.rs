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

//! Multi-pass semantic analyzer.
//!
//! The passes run in a fixed order over the shared AST, each annotating the
//! symbol table or rewriting the tree in place:
//!
//! 1. collection: index type aliases/records, enumerate declarations,
//!    separate globals from locals;
//! 2. scope visibility: every identifier/type/routine reference must resolve
//!    to a visible, previously declared name;
//! 3. constant folding: pure literal expressions are rewritten bottom-up;
//! 4. array bounds: statically checkable accesses are verified against the
//!    1-based valid range;
//! 5. usage tracking: read/write/called sets plus outer-scope detection;
//! 6. dead-code elimination: unused variables, routines, and assignments are
//!    deleted, preserving anything with observable effect.
//!
//! The analyzer owns all of its tables as fields and returns an [`Analysis`]
//! carrying the success flag, the accumulated diagnostics, the removal
//! report, and the frozen symbol table the emitter borrows.

pub mod bounds;
pub mod collect;
pub mod dce;
pub mod fold;
pub mod scope;
pub mod usage;

#[cfg(test)]
mod tests;

use std::fmt;

use ast::Node;
use tracing::{debug, info};

pub use collect::{ArraySize, SymbolTable};
pub use dce::RemovalReport;

// ─── Diagnostics ─────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    Error,
    Warning,
}

/// One analyzer finding. Warnings are reported but never fail the build.
#[derive(Debug, Clone)]
pub struct Diagnostic {
    pub severity: Severity,
    pub message: String,
}

impl Diagnostic {
    pub fn error(message: impl Into<String>) -> Self {
        Self {
            severity: Severity::Error,
            message: message.into(),
        }
    }

    pub fn warning(message: impl Into<String>) -> Self {
        Self {
            severity: Severity::Warning,
            message: message.into(),
        }
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.severity {
            Severity::Error => write!(f, "error: {}", self.message),
            Severity::Warning => write!(f, "warning: {}", self.message),
        }
    }
}

// ─── Analysis outcome ────────────────────────────────────────────────────────

/// Everything the analyzer produced: the verdict, the findings, the removal
/// report, and the symbol table the emitter reads.
#[derive(Debug)]
pub struct Analysis {
    pub success: bool,
    pub diagnostics: Vec<Diagnostic>,
    pub removal: RemovalReport,
    pub symbols: SymbolTable,
}

impl Analysis {
    pub fn errors(&self) -> impl Iterator<Item = &Diagnostic> {
        self.diagnostics
            .iter()
            .filter(|d| d.severity == Severity::Error)
    }

    pub fn warnings(&self) -> impl Iterator<Item = &Diagnostic> {
        self.diagnostics
            .iter()
            .filter(|d| d.severity == Severity::Warning)
    }
}

// ─── Analyzer ────────────────────────────────────────────────────────────────

/// The pass driver. Owns the symbol table and the diagnostics list; each pass
/// borrows what it needs.
#[derive(Default)]
pub struct Analyzer {
    symbols: SymbolTable,
    diagnostics: Vec<Diagnostic>,
}

impl Analyzer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Run every pass over `program`, rewriting it in place. Dead-code
    /// elimination only runs on a tree that passed the checking passes, so
    /// the emitter never sees a partially validated program.
    pub fn analyze(mut self, program: &mut Node) -> Analysis {
        debug!("collecting types and declarations");
        collect::collect(program, &mut self.symbols);

        debug!("checking scope visibility");
        scope::check(program, &mut self.diagnostics);

        debug!("folding constant expressions");
        fold::fold(program);

        debug!("checking array bounds");
        bounds::check(program, &self.symbols, &mut self.diagnostics);

        debug!("tracking usage");
        usage::track(program, &mut self.symbols);

        let success = !self
            .diagnostics
            .iter()
            .any(|d| d.severity == Severity::Error);

        let removal = if success {
            let removal = dce::eliminate(program, &self.symbols);
            info!(
                routines = removal.routines,
                globals = removal.globals,
                locals = removal.locals,
                assignments = removal.assignments,
                "dead-code elimination: {removal}"
            );
            removal
        } else {
            RemovalReport::default()
        };

        Analysis {
            success,
            diagnostics: self.diagnostics,
            removal,
            symbols: self.symbols,
        }
    }
}
