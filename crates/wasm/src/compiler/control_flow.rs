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

use ast::{Node, NodeKind};
use tracing::warn;
use wasm_encoder::{BlockType, Instruction};

use super::Compiler;
use crate::types::ValueType;

impl Compiler<'_> {
    pub(crate) fn compile_if(&mut self, stmt: &Node) {
        let Some(cond) = stmt.children.first() else {
            warn!("malformed if node");
            return;
        };
        let ty = self.compile_expr(cond);
        self.emit_conversion(ty, ValueType::Boolean);
        self.ctx().emit(&Instruction::If(BlockType::Empty));
        if let Some(then_body) = stmt.children.get(1) {
            self.compile_body(then_body);
        }
        if let Some(else_body) = stmt.children.get(2) {
            self.ctx().emit(&Instruction::Else);
            self.compile_body(else_body);
        }
        self.ctx().emit(&Instruction::End);
    }

    /// ```text
    /// block            ;; exit target (br_if 1)
    ///   loop           ;; repeat target (br 0)
    ///     <cond> i32.eqz br_if 1
    ///     <body>
    ///     br 0
    ///   end
    /// end
    /// ```
    pub(crate) fn compile_while(&mut self, stmt: &Node) {
        let [cond, body] = stmt.children.as_slice() else {
            warn!("malformed while node");
            return;
        };
        self.ctx().emit(&Instruction::Block(BlockType::Empty));
        self.ctx().emit(&Instruction::Loop(BlockType::Empty));

        let ty = self.compile_expr(cond);
        self.emit_conversion(ty, ValueType::Boolean);
        self.ctx().emit(&Instruction::I32Eqz);
        self.ctx().emit(&Instruction::BrIf(1));

        self.compile_body(body);

        self.ctx().emit(&Instruction::Br(0));
        self.ctx().emit(&Instruction::End);
        self.ctx().emit(&Instruction::End);
    }

    /// Forward loops step `+1` and break once the variable exceeds the high
    /// bound (`i32.gt_s`); reverse loops step `-1` and break below it
    /// (`i32.lt_s`). Either way an already-out-of-range start runs the body
    /// zero times.
    pub(crate) fn compile_for(&mut self, stmt: &Node) {
        let Some(var_idx) = self.ctx().get_local(&stmt.value) else {
            warn!(variable = %stmt.value, "loop variable has no local slot");
            return;
        };
        let Some(range) = stmt.find_child(NodeKind::Range) else {
            warn!("for loop without a range");
            return;
        };
        let [low, high] = range.children.as_slice() else {
            warn!("malformed range node");
            return;
        };
        let reverse = stmt
            .children
            .iter()
            .any(|c| c.kind == NodeKind::Identifier && c.value == "reverse");

        let ty = self.compile_expr(low);
        self.emit_conversion(ty, ValueType::Integer);
        self.ctx().emit(&Instruction::LocalSet(var_idx));

        self.ctx().emit(&Instruction::Block(BlockType::Empty));
        self.ctx().emit(&Instruction::Loop(BlockType::Empty));

        self.ctx().emit(&Instruction::LocalGet(var_idx));
        let ty = self.compile_expr(high);
        self.emit_conversion(ty, ValueType::Integer);
        self.ctx().emit(if reverse {
            &Instruction::I32LtS
        } else {
            &Instruction::I32GtS
        });
        self.ctx().emit(&Instruction::BrIf(1));

        if let Some(body) = stmt.find_child(NodeKind::Body) {
            self.compile_body(body);
        }

        self.ctx().emit(&Instruction::LocalGet(var_idx));
        self.ctx().emit(&Instruction::I32Const(1));
        self.ctx().emit(if reverse {
            &Instruction::I32Sub
        } else {
            &Instruction::I32Add
        });
        self.ctx().emit(&Instruction::LocalSet(var_idx));

        self.ctx().emit(&Instruction::Br(0));
        self.ctx().emit(&Instruction::End);
        self.ctx().emit(&Instruction::End);
    }
}
