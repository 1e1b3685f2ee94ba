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

//! WebAssembly 1.0 binary emitter.
//!
//! [`compile`] is the whole back end in one call: it runs the semantic
//! analyzer over the AST (rewriting it in place) and, if analysis succeeds,
//! emits a standalone module with the section order type, function, memory,
//! export, code. [`emit`] is the emission half alone, for callers that drive
//! the analyzer themselves.

pub mod compiler;
pub mod functions;
pub mod layout;
pub mod types;

#[cfg(test)]
mod tests;

use std::fmt;

use ast::Node;
use semantics::{Analyzer, Diagnostic, SymbolTable};

/// Analyze and emit in one step.
pub fn compile(program: &mut Node) -> Result<Vec<u8>, CompileError> {
    let analysis = Analyzer::new().analyze(program);
    if !analysis.success {
        return Err(CompileError::Semantic(analysis.diagnostics));
    }
    emit(program, &analysis.symbols).map_err(CompileError::Emit)
}

/// Emit a module from an already-analyzed program. The symbol table is the
/// frozen outcome of the analyzer; the emitter only reads it.
pub fn emit(program: &Node, symbols: &SymbolTable) -> Result<Vec<u8>, EmitError> {
    compiler::Compiler::new(symbols).compile_program(program)
}

/// Structural or type failures the emitter cannot paper over with a
/// placeholder (missing `main`, illegal conversions).
#[derive(Debug, Clone)]
pub struct EmitError {
    pub messages: Vec<String>,
}

impl EmitError {
    pub(crate) fn new(message: impl Into<String>) -> Self {
        Self {
            messages: vec![message.into()],
        }
    }
}

impl fmt::Display for EmitError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "emit error")?;
        for message in &self.messages {
            write!(f, ": {message}")?;
        }
        Ok(())
    }
}

impl std::error::Error for EmitError {}

/// Failure of the combined [`compile`] pipeline.
#[derive(Debug)]
pub enum CompileError {
    /// The analyzer reported errors; the emitter did not run.
    Semantic(Vec<Diagnostic>),
    Emit(EmitError),
}

impl fmt::Display for CompileError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CompileError::Semantic(diags) => {
                let errors: Vec<String> = diags
                    .iter()
                    .filter(|d| d.severity == semantics::Severity::Error)
                    .map(ToString::to_string)
                    .collect();
                write!(f, "semantic analysis failed: {}", errors.join("; "))
            }
            CompileError::Emit(e) => write!(f, "{e}"),
        }
    }
}

impl std::error::Error for CompileError {}
