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

//! Variable storage, element addressing, and stores.
//!
//! Element addresses follow the 1-based indexing convention:
//! `address(A[i]) = base(A) + (i - 1) * element_stride(A)`, and
//! `address(R.f) = base(R) + field_offset(f)`.

use ast::{Node, NodeKind};
use tracing::warn;
use wasm_encoder::{Instruction, MemArg};

use super::Compiler;
use crate::layout;
use crate::types::ValueType;

/// Where a named variable lives.
pub(crate) enum VarStorage {
    /// Scalar local or parameter.
    Local(u32, ValueType),
    /// Scalar global in linear memory.
    GlobalScalar { offset: u32, ty: ValueType },
    /// Array or record (local or global) in linear memory.
    Memory { offset: u32, ty: Node },
}

fn memarg(ty: ValueType) -> MemArg {
    MemArg {
        offset: 0,
        align: match ty {
            ValueType::Real => 3,
            _ => 2,
        },
        memory_index: 0,
    }
}

impl Compiler<'_> {
    pub(crate) fn lookup_var(&self, name: &str) -> Option<VarStorage> {
        if let Some(ctx) = self.current.as_ref() {
            if let Some(idx) = ctx.get_local(name) {
                let ty = ctx.get_local_type(name).unwrap_or(ValueType::Integer);
                return Some(VarStorage::Local(idx, ty));
            }
        }
        if let Some(slot) = self.mem_locals.get(name) {
            return Some(VarStorage::Memory {
                offset: slot.offset,
                ty: slot.ty.clone(),
            });
        }
        if let Some(slot) = self.globals.get(name) {
            if layout::is_aggregate(&slot.ty, self.symbols()) {
                return Some(VarStorage::Memory {
                    offset: slot.offset,
                    ty: slot.ty.clone(),
                });
            }
            return Some(VarStorage::GlobalScalar {
                offset: slot.offset,
                ty: layout::value_type(&slot.ty, self.symbols()),
            });
        }
        None
    }

    pub(crate) fn emit_load(&mut self, ty: ValueType) {
        let arg = memarg(ty);
        match ty {
            ValueType::Real => self.ctx().emit(&Instruction::F64Load(arg)),
            _ => self.ctx().emit(&Instruction::I32Load(arg)),
        }
    }

    pub(crate) fn emit_store(&mut self, ty: ValueType) {
        let arg = memarg(ty);
        match ty {
            ValueType::Real => self.ctx().emit(&Instruction::F64Store(arg)),
            _ => self.ctx().emit(&Instruction::I32Store(arg)),
        }
    }

    /// Load the value of a named variable, leaving it (or, for aggregates,
    /// its base address) on the stack.
    pub(crate) fn compile_identifier_load(&mut self, name: &str) -> ValueType {
        match self.lookup_var(name) {
            Some(VarStorage::Local(idx, ty)) => {
                self.ctx().emit(&Instruction::LocalGet(idx));
                ty
            }
            Some(VarStorage::GlobalScalar { offset, ty }) => {
                self.ctx().emit(&Instruction::I32Const(offset as i32));
                self.emit_load(ty);
                ty
            }
            Some(VarStorage::Memory { offset, .. }) => {
                self.ctx().emit(&Instruction::I32Const(offset as i32));
                ValueType::Integer
            }
            None => {
                warn!("unresolved local '{name}', pushing zero");
                self.ctx().emit(&Instruction::I32Const(0));
                ValueType::Integer
            }
        }
    }

    /// Push the address of an l-value chain and return the type expression
    /// of the addressed value. `None` means nothing was pushed (the chain
    /// did not resolve to a memory location).
    pub(crate) fn emit_address(&mut self, expr: &Node) -> Option<Node> {
        match expr.kind {
            NodeKind::Identifier => match self.lookup_var(&expr.value) {
                Some(VarStorage::Memory { offset, ty }) => {
                    self.ctx().emit(&Instruction::I32Const(offset as i32));
                    Some(ty)
                }
                Some(VarStorage::GlobalScalar { offset, ty }) => {
                    self.ctx().emit(&Instruction::I32Const(offset as i32));
                    Some(Node::with_value(NodeKind::PrimitiveType, ty.to_string()))
                }
                _ => None,
            },
            NodeKind::ArrayAccess => {
                let [base, index] = expr.children.as_slice() else {
                    return None;
                };
                let array_ty = self.emit_address(base)?;
                let stride = layout::element_stride(&array_ty, self.symbols());
                let element = self
                    .symbols()
                    .array_element_type(self.symbols().resolve_alias(&array_ty))
                    .cloned();

                // base + (index - 1) * stride
                let it = self.compile_expr(index);
                self.emit_conversion(it, ValueType::Integer);
                self.ctx().emit(&Instruction::I32Const(1));
                self.ctx().emit(&Instruction::I32Sub);
                self.ctx().emit(&Instruction::I32Const(stride as i32));
                self.ctx().emit(&Instruction::I32Mul);
                self.ctx().emit(&Instruction::I32Add);

                match element {
                    Some(ty) => Some(ty),
                    None => {
                        warn!("indexing a non-array value, dropping address");
                        self.ctx().emit(&Instruction::Drop);
                        None
                    }
                }
            }
            NodeKind::MemberAccess => {
                let base = expr.children.first()?;
                let record_ty = self.emit_address(base)?;
                match layout::field_offset(&record_ty, &expr.value, self.symbols()) {
                    Some((offset, field_ty)) => {
                        let field_ty = field_ty.clone();
                        self.ctx().emit(&Instruction::I32Const(offset as i32));
                        self.ctx().emit(&Instruction::I32Add);
                        Some(field_ty)
                    }
                    None => {
                        warn!(field = %expr.value, "unknown record field, dropping address");
                        self.ctx().emit(&Instruction::Drop);
                        None
                    }
                }
            }
            _ => None,
        }
    }

    /// Array/record element or field read: address, then load (aggregates
    /// stay as their address).
    pub(crate) fn compile_access(&mut self, expr: &Node) -> ValueType {
        match self.emit_address(expr) {
            Some(ty) if layout::is_aggregate(&ty, self.symbols()) => ValueType::Integer,
            Some(ty) => {
                let vt = layout::value_type(&ty, self.symbols());
                self.emit_load(vt);
                vt
            }
            None => {
                warn!("unresolvable element access, pushing zero");
                self.ctx().emit(&Instruction::I32Const(0));
                ValueType::Integer
            }
        }
    }

    pub(crate) fn compile_assignment(&mut self, stmt: &Node) {
        let [target, value] = stmt.children.as_slice() else {
            warn!("malformed assignment node");
            return;
        };

        match target.kind {
            NodeKind::Identifier => match self.lookup_var(&target.value) {
                Some(VarStorage::Local(idx, ty)) => {
                    let vt = self.compile_expr(value);
                    self.emit_conversion(vt, ty);
                    self.ctx().emit(&Instruction::LocalSet(idx));
                }
                Some(VarStorage::GlobalScalar { offset, ty }) => {
                    self.store_global_scalar(offset, ty, value);
                }
                Some(VarStorage::Memory { .. }) => {
                    warn!(
                        variable = %target.value,
                        "whole-aggregate assignment is not supported, discarding value"
                    );
                    self.compile_expr(value);
                    self.ctx().emit(&Instruction::Drop);
                }
                None => {
                    warn!(variable = %target.value, "unresolved assignment target");
                    self.compile_expr(value);
                    self.ctx().emit(&Instruction::Drop);
                }
            },
            NodeKind::ArrayAccess | NodeKind::MemberAccess => {
                match self.emit_address(target) {
                    Some(ty) if !layout::is_aggregate(&ty, self.symbols()) => {
                        let target_ty = layout::value_type(&ty, self.symbols());
                        let vt = self.compile_expr(value);
                        self.emit_conversion(vt, target_ty);
                        self.emit_store(target_ty);
                    }
                    Some(_) => {
                        warn!("aggregate element assignment is not supported");
                        self.ctx().emit(&Instruction::Drop);
                        self.compile_expr(value);
                        self.ctx().emit(&Instruction::Drop);
                    }
                    None => {
                        self.compile_expr(value);
                        self.ctx().emit(&Instruction::Drop);
                    }
                }
            }
            _ => {
                warn!(kind = %target.kind, "unsupported assignment target");
                self.compile_expr(value);
                self.ctx().emit(&Instruction::Drop);
            }
        }
    }

    /// Store an evaluated value into a scalar global.
    ///
    /// i32-valued stores evaluate the value first and then swap it with the
    /// address through the two scratch locals; f64-valued stores push the
    /// address before the value, which needs no swap (the scratch pair is
    /// i32-only).
    fn store_global_scalar(&mut self, offset: u32, ty: ValueType, value: &Node) {
        if ty == ValueType::Real {
            self.ctx().emit(&Instruction::I32Const(offset as i32));
            let vt = self.compile_expr(value);
            self.emit_conversion(vt, ty);
            self.emit_store(ty);
            return;
        }

        let vt = self.compile_expr(value);
        self.emit_conversion(vt, ty);

        let scratch_value = self.ctx().scratch_value();
        let scratch_addr = self.ctx().scratch_addr();
        self.ctx().emit(&Instruction::LocalSet(scratch_value));
        self.ctx().emit(&Instruction::I32Const(offset as i32));
        self.ctx().emit(&Instruction::LocalSet(scratch_addr));
        self.ctx().emit(&Instruction::LocalGet(scratch_addr));
        self.ctx().emit(&Instruction::LocalGet(scratch_value));
        self.emit_store(ty);
    }

    /// Local variable initializer (`var x : integer is 2 + 3`).
    pub(crate) fn emit_var_initializer(&mut self, decl: &Node) {
        let Some(init) = decl.children.get(1) else {
            return;
        };
        match self.lookup_var(&decl.value) {
            Some(VarStorage::Local(idx, ty)) => {
                let vt = self.compile_expr(init);
                self.emit_conversion(vt, ty);
                self.ctx().emit(&Instruction::LocalSet(idx));
            }
            Some(VarStorage::GlobalScalar { offset, ty }) => {
                self.store_global_scalar(offset, ty, init);
            }
            _ => warn!(
                variable = %decl.value,
                "initializer on an aggregate variable is not supported"
            ),
        }
    }

    /// Evaluate and assign every initialized global. Runs at the top of
    /// `main`, before its own local initializers.
    pub(crate) fn emit_global_initializers(&mut self, program: &Node) {
        for decl in &program.children {
            if decl.kind == NodeKind::VarDecl && decl.children.len() > 1 {
                self.emit_var_initializer(decl);
            }
        }
    }
}
