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

use std::collections::HashMap;

use wasm_encoder::{Encode, Function, Instruction, ValType};

use crate::types::ValueType;

/// Per-function emission context.
///
/// `wasm_encoder::Function` wants every local declaration up front, so the
/// context records locals first (parameters at indices `0..n`, body locals
/// after, two i32 scratch locals last) and buffers the raw instruction bytes
/// until [`FunctionContext::build`].
///
/// The scratch pair implements the store-to-global swap: a computed i32 value
/// is stashed in the first scratch, the target address in the second, and the
/// two are pushed back in the order `i32.store` expects.
pub struct FunctionContext {
    /// Variable name → WASM local index.
    locals: HashMap<String, u32>,
    /// Variable name → scalar type.
    local_types: HashMap<String, ValueType>,
    /// Declared types of non-parameter locals, in index order.
    extra_local_types: Vec<ValType>,
    param_count: u32,
    next_local_idx: u32,
    /// Index of the scratch local holding a stashed value.
    scratch_value: u32,
    /// Index of the scratch local holding a stashed address.
    scratch_addr: u32,
    /// Buffered instruction bytes for the body.
    instruction_bytes: Vec<u8>,
}

impl FunctionContext {
    /// Create a context with the given parameters pre-registered as locals
    /// `0..n`.
    pub fn new(params: &[(String, ValueType)]) -> Self {
        let mut locals = HashMap::new();
        let mut local_types = HashMap::new();
        for (i, (name, ty)) in params.iter().enumerate() {
            locals.insert(name.clone(), i as u32);
            local_types.insert(name.clone(), *ty);
        }
        let param_count = params.len() as u32;
        Self {
            locals,
            local_types,
            extra_local_types: Vec::new(),
            param_count,
            next_local_idx: param_count,
            scratch_value: 0,
            scratch_addr: 0,
            instruction_bytes: Vec::new(),
        }
    }

    /// Declare a body local and return its index. A name collision returns
    /// the existing index (the analyzer treats names as program-unique).
    pub fn declare_local(&mut self, name: &str, ty: ValueType) -> u32 {
        if let Some(&existing) = self.locals.get(name) {
            return existing;
        }
        let idx = self.next_local_idx;
        self.extra_local_types.push(ty.to_val_type());
        self.locals.insert(name.to_string(), idx);
        self.local_types.insert(name.to_string(), ty);
        self.next_local_idx += 1;
        idx
    }

    /// Append the two i32 scratch locals. Must be called once, after every
    /// named local has been declared and before the body is emitted.
    pub fn append_scratch_locals(&mut self) {
        self.scratch_value = self.next_local_idx;
        self.scratch_addr = self.next_local_idx + 1;
        self.extra_local_types.push(ValType::I32);
        self.extra_local_types.push(ValType::I32);
        self.next_local_idx += 2;
    }

    pub fn scratch_value(&self) -> u32 {
        self.scratch_value
    }

    pub fn scratch_addr(&self) -> u32 {
        self.scratch_addr
    }

    pub fn get_local(&self, name: &str) -> Option<u32> {
        self.locals.get(name).copied()
    }

    pub fn get_local_type(&self, name: &str) -> Option<ValueType> {
        self.local_types.get(name).copied()
    }

    pub fn param_count(&self) -> u32 {
        self.param_count
    }

    /// Append one instruction to the buffered body.
    pub fn emit(&mut self, instr: &Instruction) {
        instr.encode(&mut self.instruction_bytes);
    }

    pub fn emit_end(&mut self) {
        self.emit(&Instruction::End);
    }

    /// Produce the final function, grouping consecutive locals of the same
    /// type for the compact declaration encoding.
    pub fn build(self) -> Function {
        let mut grouped: Vec<(u32, ValType)> = Vec::new();
        for vt in &self.extra_local_types {
            if let Some((count, last)) = grouped.last_mut() {
                if *last == *vt {
                    *count += 1;
                    continue;
                }
            }
            grouped.push((1, *vt));
        }
        let mut func = Function::new(grouped);
        func.raw(self.instruction_bytes);
        func
    }
}
