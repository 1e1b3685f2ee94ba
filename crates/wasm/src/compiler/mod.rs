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

//! The binary code generator.
//!
//! Per function: collect the signature, compute record/array layouts,
//! allocate locals (parameters first, body locals after, the two scratch
//! locals last), emit the global initializers (in `main` only), emit local
//! initializers, emit the body statements, synthesize a trailing default
//! return when the body lacks one, and close with `end`.
//!
//! Scalar locals live in WASM locals. Everything else (record and array
//! variables, and global variables of any shape) lives in linear memory at
//! compile-time offsets packed in declaration order from 0.

mod control_flow;
mod data_access;
mod op;

pub(crate) use data_access::VarStorage;

use std::collections::HashMap;

use ast::{Node, NodeKind};
use semantics::SymbolTable;
use tracing::warn;
use wasm_encoder::{
    CodeSection, ExportKind, ExportSection, FunctionSection, Instruction, MemorySection,
    MemoryType, Module as WasmModule, TypeSection,
};

use crate::functions::FunctionContext;
use crate::layout;
use crate::types::ValueType;
use crate::EmitError;

/// Metadata for a collected routine (used for signatures and call
/// resolution). Type indices equal function indices, one-to-one.
#[derive(Debug, Clone)]
pub(crate) struct FuncMeta {
    pub func_index: u32,
    pub params: Vec<(String, ValueType)>,
    pub result: ValueType,
}

/// A variable slot in linear memory: its byte offset and declared type.
#[derive(Debug, Clone)]
pub(crate) struct MemSlot {
    pub offset: u32,
    pub ty: Node,
}

pub struct Compiler<'a> {
    symbols: &'a SymbolTable,
    type_section: TypeSection,
    function_section: FunctionSection,
    export_section: ExportSection,
    code_section: CodeSection,
    /// Routine name → signature and index.
    func_table: HashMap<String, FuncMeta>,
    /// Global variable name → memory slot (scalars included).
    globals: HashMap<String, MemSlot>,
    /// Aggregate locals of the function being compiled.
    mem_locals: HashMap<String, MemSlot>,
    /// Running top of linear memory, across the whole program.
    memory_top: u32,
    /// Result type of the function being compiled.
    current_result: ValueType,
    current: Option<FunctionContext>,
    /// Unrecoverable findings (illegal conversions); placeholders keep the
    /// module shape valid but the compilation fails.
    errors: Vec<String>,
}

impl<'a> Compiler<'a> {
    pub fn new(symbols: &'a SymbolTable) -> Self {
        Self {
            symbols,
            type_section: TypeSection::new(),
            function_section: FunctionSection::new(),
            export_section: ExportSection::new(),
            code_section: CodeSection::new(),
            func_table: HashMap::new(),
            globals: HashMap::new(),
            mem_locals: HashMap::new(),
            memory_top: 0,
            current_result: ValueType::Integer,
            current: None,
            errors: Vec::new(),
        }
    }

    pub(crate) fn ctx(&mut self) -> &mut FunctionContext {
        self.current.as_mut().expect("no active function context")
    }

    pub(crate) fn symbols(&self) -> &'a SymbolTable {
        self.symbols
    }

    pub(crate) fn error(&mut self, message: impl Into<String>) {
        let message = message.into();
        warn!("{message}");
        self.errors.push(message);
    }

    /// Compile the whole program into module bytes.
    ///
    /// Pass 1 lays out global variables. Pass 2 registers every routine
    /// signature so calls resolve regardless of declaration order. Pass 3
    /// compiles the bodies. The memory section is sized afterwards, once the
    /// running memory top covers every aggregate in the program.
    pub fn compile_program(mut self, program: &Node) -> Result<Vec<u8>, EmitError> {
        self.layout_globals(program);

        for child in &program.children {
            if child.kind == NodeKind::RoutineDecl {
                self.register_function(child);
            }
        }

        let Some(main_index) = self.func_table.get("main").map(|m| m.func_index) else {
            return Err(EmitError::new("main routine not found"));
        };
        self.export_section
            .export("main", ExportKind::Func, main_index);

        for child in &program.children {
            if child.kind == NodeKind::RoutineDecl {
                self.compile_function(child, program);
            }
        }

        if !self.errors.is_empty() {
            return Err(EmitError {
                messages: self.errors,
            });
        }

        let mut memory_section = MemorySection::new();
        memory_section.memory(MemoryType {
            minimum: layout::page_count(self.memory_top),
            maximum: None,
            memory64: false,
            shared: false,
            page_size_log2: None,
        });

        let mut module = WasmModule::new();
        module.section(&self.type_section);
        module.section(&self.function_section);
        module.section(&memory_section);
        module.section(&self.export_section);
        module.section(&self.code_section);
        Ok(module.finish())
    }

    /// Assign packed linear-memory offsets to every global, in declaration
    /// order from 0.
    fn layout_globals(&mut self, program: &Node) {
        for child in &program.children {
            if child.kind != NodeKind::VarDecl {
                continue;
            }
            let Some(ty) = child.children.first() else {
                continue;
            };
            let slot = MemSlot {
                offset: self.memory_top,
                ty: ty.clone(),
            };
            self.memory_top += layout::byte_size(ty, self.symbols);
            self.globals.insert(child.value.clone(), slot);
        }
    }

    fn register_function(&mut self, routine: &Node) {
        let params: Vec<(String, ValueType)> = routine
            .find_child(NodeKind::ParameterList)
            .map(|list| {
                list.children
                    .iter()
                    .filter(|p| p.kind == NodeKind::Parameter)
                    .map(|p| {
                        let ty = p
                            .children
                            .first()
                            .map_or(ValueType::Integer, |t| layout::value_type(t, self.symbols));
                        (p.value.clone(), ty)
                    })
                    .collect()
            })
            .unwrap_or_default();

        // The result defaults to i32 when no return type is declared.
        let result = routine
            .children
            .iter()
            .find(|c| matches!(c.kind, NodeKind::PrimitiveType | NodeKind::UserType))
            .map_or(ValueType::Integer, |t| layout::value_type(t, self.symbols));

        let func_index = self.func_table.len() as u32;
        self.type_section.ty().function(
            params.iter().map(|(_, t)| t.to_val_type()),
            [result.to_val_type()],
        );
        self.function_section.function(func_index);

        self.func_table.insert(
            routine.value.clone(),
            FuncMeta {
                func_index,
                params,
                result,
            },
        );
    }

    fn compile_function(&mut self, routine: &Node, program: &Node) {
        let meta = self.func_table[&routine.value].clone();
        self.current_result = meta.result;
        self.mem_locals.clear();

        let mut ctx = FunctionContext::new(&meta.params);
        if let Some(body) = routine.find_child(NodeKind::Body) {
            self.allocate_locals(body, &mut ctx);
        }
        ctx.append_scratch_locals();
        self.current = Some(ctx);

        if routine.value == "main" {
            self.emit_global_initializers(program);
        }

        if let Some(body) = routine.find_child(NodeKind::Body) {
            // Top-level local initializers run before the statements.
            for child in &body.children {
                if child.kind == NodeKind::VarDecl {
                    self.emit_var_initializer(child);
                }
            }
            for child in &body.children {
                if child.kind != NodeKind::VarDecl {
                    self.compile_stmt(child);
                }
            }

            let ends_with_return = body
                .children
                .last()
                .is_some_and(|s| s.kind == NodeKind::Return);
            if !ends_with_return {
                self.emit_default_value(meta.result);
                self.ctx().emit(&Instruction::Return);
            }
        } else {
            self.emit_default_value(meta.result);
            self.ctx().emit(&Instruction::Return);
        }

        let mut ctx = self.current.take().expect("function context in progress");
        ctx.emit_end();
        self.code_section.function(&ctx.build());
    }

    /// Register every local of the routine body: scalars become WASM locals,
    /// aggregates get packed linear-memory slots, and each for-loop variable
    /// becomes an i32 local.
    fn allocate_locals(&mut self, node: &Node, ctx: &mut FunctionContext) {
        match node.kind {
            NodeKind::VarDecl => {
                // Record fields inside the type expression are not locals.
                if let Some(ty) = node.children.first() {
                    if layout::is_aggregate(ty, self.symbols) {
                        let slot = MemSlot {
                            offset: self.memory_top,
                            ty: ty.clone(),
                        };
                        self.memory_top += layout::byte_size(ty, self.symbols);
                        self.mem_locals.insert(node.value.clone(), slot);
                    } else {
                        ctx.declare_local(&node.value, layout::value_type(ty, self.symbols));
                    }
                }
                return;
            }
            NodeKind::TypeDecl => return,
            NodeKind::For => {
                ctx.declare_local(&node.value, ValueType::Integer);
            }
            _ => {}
        }
        for child in &node.children {
            self.allocate_locals(child, ctx);
        }
    }

    pub(crate) fn emit_default_value(&mut self, ty: ValueType) {
        match ty {
            ValueType::Real => self.ctx().emit(&Instruction::F64Const(0.0.into())),
            _ => self.ctx().emit(&Instruction::I32Const(0)),
        }
    }

    /// Compile the statements of a nested body (if/while/for). Variable
    /// declarations met here initialize in place; their locals were already
    /// allocated.
    pub(crate) fn compile_body(&mut self, body: &Node) {
        for child in &body.children {
            if child.kind == NodeKind::VarDecl {
                self.emit_var_initializer(child);
            } else {
                self.compile_stmt(child);
            }
        }
    }

    pub(crate) fn compile_stmt(&mut self, stmt: &Node) {
        match stmt.kind {
            NodeKind::Assignment => self.compile_assignment(stmt),
            NodeKind::If => self.compile_if(stmt),
            NodeKind::While => self.compile_while(stmt),
            NodeKind::For => self.compile_for(stmt),
            NodeKind::Print => self.compile_print(stmt),
            NodeKind::Return => self.compile_return(stmt),
            NodeKind::TypeDecl => {}
            // Calls and promoted right-hand sides used as statements:
            // evaluate, then discard the value.
            _ if stmt.kind.is_expression() => {
                self.compile_expr(stmt);
                self.ctx().emit(&Instruction::Drop);
            }
            _ => warn!(kind = %stmt.kind, "unhandled statement kind"),
        }
    }

    /// Evaluate each printed expression, then drop it; literal strings are
    /// consumed at compile time (print performs no host I/O).
    fn compile_print(&mut self, stmt: &Node) {
        let Some(list) = stmt.children.first() else {
            return;
        };
        for item in &list.children {
            if item.kind == NodeKind::StringLiteral {
                continue;
            }
            self.compile_expr(item);
            self.ctx().emit(&Instruction::Drop);
        }
    }

    fn compile_return(&mut self, stmt: &Node) {
        match stmt.children.first() {
            Some(value) => {
                let ty = self.compile_expr(value);
                self.emit_conversion(ty, self.current_result);
            }
            None => self.emit_default_value(self.current_result),
        }
        self.ctx().emit(&Instruction::Return);
    }
}
