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

//! Expression emission: literals, operators, calls, conversions.

use ast::{Node, NodeKind};
use semantics::ArraySize;
use tracing::warn;
use wasm_encoder::Instruction;

use super::{Compiler, VarStorage};
use crate::layout;
use crate::types::ValueType;

impl Compiler<'_> {
    /// Compile an expression, leaving its value on the operand stack, and
    /// return the value's type.
    pub(crate) fn compile_expr(&mut self, expr: &Node) -> ValueType {
        match expr.kind {
            NodeKind::IntLiteral => {
                let v = expr.value.parse::<i64>().unwrap_or(0) as i32;
                self.ctx().emit(&Instruction::I32Const(v));
                ValueType::Integer
            }
            NodeKind::BoolLiteral => {
                let v = i32::from(expr.value == "true");
                self.ctx().emit(&Instruction::I32Const(v));
                ValueType::Boolean
            }
            NodeKind::RealLiteral => {
                let v = expr.value.parse::<f64>().unwrap_or(0.0);
                self.ctx().emit(&Instruction::F64Const(v.into()));
                ValueType::Real
            }
            NodeKind::StringLiteral => {
                warn!("string literal outside print, pushing zero");
                self.ctx().emit(&Instruction::I32Const(0));
                ValueType::Integer
            }
            NodeKind::Identifier => self.compile_identifier_load(&expr.value),
            NodeKind::BinaryOp => self.compile_binary(expr),
            NodeKind::UnaryOp => self.compile_unary(expr),
            NodeKind::RoutineCall => self.compile_call(expr),
            NodeKind::ArrayAccess | NodeKind::MemberAccess => self.compile_access(expr),
            NodeKind::SizeExpression => self.compile_size_expression(expr),
            _ => {
                warn!(kind = %expr.kind, "unhandled expression kind, pushing zero");
                self.ctx().emit(&Instruction::I32Const(0));
                ValueType::Integer
            }
        }
    }

    /// Type an expression without emitting any code. Used to pick the
    /// promoted operand type before the operands are compiled.
    pub(crate) fn type_of_expr(&self, expr: &Node) -> ValueType {
        match expr.kind {
            NodeKind::IntLiteral => ValueType::Integer,
            NodeKind::RealLiteral => ValueType::Real,
            NodeKind::BoolLiteral => ValueType::Boolean,
            NodeKind::Identifier => match self.lookup_var(&expr.value) {
                Some(VarStorage::Local(_, ty)) => ty,
                Some(VarStorage::GlobalScalar { ty, .. }) => ty,
                _ => ValueType::Integer,
            },
            NodeKind::BinaryOp => match expr.value.as_str() {
                "<" | "<=" | ">" | ">=" | "=" | "/=" | "and" | "or" | "xor" => ValueType::Boolean,
                _ => match expr.children.as_slice() {
                    [l, r] => self.type_of_expr(l).promote(self.type_of_expr(r)),
                    _ => ValueType::Integer,
                },
            },
            NodeKind::UnaryOp => match expr.value.as_str() {
                "not" => ValueType::Boolean,
                _ => match expr.children.first().map(|c| self.type_of_expr(c)) {
                    Some(ValueType::Real) => ValueType::Real,
                    Some(ValueType::Integer) | Some(ValueType::Boolean) => ValueType::Integer,
                    None => ValueType::Integer,
                },
            },
            NodeKind::RoutineCall => self
                .func_table
                .get(&expr.value)
                .map_or(ValueType::Integer, |m| m.result),
            NodeKind::ArrayAccess | NodeKind::MemberAccess => {
                match self.symbols().type_of_lvalue(expr) {
                    Some(ty) if !layout::is_aggregate(ty, self.symbols()) => {
                        layout::value_type(ty, self.symbols())
                    }
                    _ => ValueType::Integer,
                }
            }
            _ => ValueType::Integer,
        }
    }

    /// Insert the numeric conversion that turns a `from`-typed stack value
    /// into a `to`-typed one.
    pub(crate) fn emit_conversion(&mut self, from: ValueType, to: ValueType) {
        use ValueType::{Boolean, Integer, Real};
        match (from, to) {
            (Integer, Real) | (Boolean, Real) => {
                self.ctx().emit(&Instruction::F64ConvertI32S);
            }
            (Real, Integer) => {
                // Round to nearest, ties toward +inf: add 0.5, then truncate.
                self.ctx().emit(&Instruction::F64Const(0.5.into()));
                self.ctx().emit(&Instruction::F64Add);
                self.ctx().emit(&Instruction::I32TruncF64S);
            }
            (Integer, Boolean) => {
                // Nonzero collapses to 1.
                self.ctx().emit(&Instruction::I32Const(0));
                self.ctx().emit(&Instruction::I32Ne);
            }
            (Real, Boolean) => {
                self.error("illegal conversion from real to boolean");
                self.ctx().emit(&Instruction::Unreachable);
            }
            // Identity pairs, and boolean→integer (both i32).
            _ => {}
        }
    }

    fn compile_binary(&mut self, expr: &Node) -> ValueType {
        let [l, r] = expr.children.as_slice() else {
            warn!("malformed binary operator node, pushing zero");
            self.ctx().emit(&Instruction::I32Const(0));
            return ValueType::Integer;
        };

        match expr.value.as_str() {
            "and" | "or" | "xor" => {
                let lt = self.compile_expr(l);
                self.emit_conversion(lt, ValueType::Boolean);
                let rt = self.compile_expr(r);
                self.emit_conversion(rt, ValueType::Boolean);
                match expr.value.as_str() {
                    "and" => self.ctx().emit(&Instruction::I32And),
                    "or" => self.ctx().emit(&Instruction::I32Or),
                    _ => self.ctx().emit(&Instruction::I32Xor),
                }
                ValueType::Boolean
            }
            "<" | "<=" | ">" | ">=" | "=" | "/=" => self.compile_comparison(expr, l, r),
            _ => self.compile_arithmetic(expr, l, r),
        }
    }

    /// Comparison and equality always produce boolean; operands are promoted
    /// to their common type first.
    fn compile_comparison(&mut self, expr: &Node, l: &Node, r: &Node) -> ValueType {
        let cmp = self.type_of_expr(l).promote(self.type_of_expr(r));
        let lt = self.compile_expr(l);
        self.emit_conversion(lt, cmp);
        let rt = self.compile_expr(r);
        self.emit_conversion(rt, cmp);

        let instr = if cmp == ValueType::Real {
            match expr.value.as_str() {
                "=" => Instruction::F64Eq,
                "/=" => Instruction::F64Ne,
                "<" => Instruction::F64Lt,
                "<=" => Instruction::F64Le,
                ">" => Instruction::F64Gt,
                _ => Instruction::F64Ge,
            }
        } else {
            match expr.value.as_str() {
                "=" => Instruction::I32Eq,
                "/=" => Instruction::I32Ne,
                "<" => Instruction::I32LtS,
                "<=" => Instruction::I32LeS,
                ">" => Instruction::I32GtS,
                _ => Instruction::I32GeS,
            }
        };
        self.ctx().emit(&instr);
        ValueType::Boolean
    }

    fn compile_arithmetic(&mut self, expr: &Node, l: &Node, r: &Node) -> ValueType {
        let result = self.type_of_expr(l).promote(self.type_of_expr(r));
        let lt = self.compile_expr(l);
        self.emit_conversion(lt, result);
        let rt = self.compile_expr(r);
        self.emit_conversion(rt, result);

        if result == ValueType::Real {
            match expr.value.as_str() {
                "+" => self.ctx().emit(&Instruction::F64Add),
                "-" => self.ctx().emit(&Instruction::F64Sub),
                "*" => self.ctx().emit(&Instruction::F64Mul),
                "/" => self.ctx().emit(&Instruction::F64Div),
                op => {
                    self.error(format!("operator '{op}' is not defined for real operands"));
                    self.ctx().emit(&Instruction::Unreachable);
                }
            }
            return ValueType::Real;
        }

        match expr.value.as_str() {
            "+" => self.ctx().emit(&Instruction::I32Add),
            "-" => self.ctx().emit(&Instruction::I32Sub),
            "*" => self.ctx().emit(&Instruction::I32Mul),
            // Integer division and remainder keep their runtime semantics,
            // including the trap on a zero divisor.
            "/" => self.ctx().emit(&Instruction::I32DivS),
            "%" => self.ctx().emit(&Instruction::I32RemS),
            op => {
                warn!("unhandled binary operator '{op}'");
                self.ctx().emit(&Instruction::Drop);
                self.ctx().emit(&Instruction::Drop);
                self.ctx().emit(&Instruction::I32Const(0));
            }
        }
        result
    }

    fn compile_unary(&mut self, expr: &Node) -> ValueType {
        let Some(operand) = expr.children.first() else {
            warn!("malformed unary operator node, pushing zero");
            self.ctx().emit(&Instruction::I32Const(0));
            return ValueType::Integer;
        };

        match expr.value.as_str() {
            "not" => {
                let ty = self.compile_expr(operand);
                self.emit_conversion(ty, ValueType::Boolean);
                self.ctx().emit(&Instruction::I32Eqz);
                ValueType::Boolean
            }
            "-" => {
                // The folder usually eliminates this; the runtime form
                // negates in the operand's own domain.
                let ty = self.compile_expr(operand);
                if ty == ValueType::Real {
                    self.ctx().emit(&Instruction::F64Neg);
                    ValueType::Real
                } else {
                    self.ctx().emit(&Instruction::I32Const(-1));
                    self.ctx().emit(&Instruction::I32Mul);
                    ValueType::Integer
                }
            }
            _ => self.compile_expr(operand),
        }
    }

    /// Arguments are evaluated in order (converted to the parameter types),
    /// then the callee index is emitted. An unknown callee is logged and
    /// replaced by a zero constant.
    fn compile_call(&mut self, call: &Node) -> ValueType {
        let Some(meta) = self.func_table.get(&call.value).cloned() else {
            warn!(callee = %call.value, "unknown callee, pushing zero");
            self.ctx().emit(&Instruction::I32Const(0));
            return ValueType::Integer;
        };

        let args: Vec<&Node> = match call.find_child(NodeKind::ArgumentList) {
            Some(list) => list.children.iter().collect(),
            None => call.children.iter().collect(),
        };
        for (i, &arg) in args.iter().enumerate() {
            let at = self.compile_expr(arg);
            if let Some((_, expected)) = meta.params.get(i) {
                self.emit_conversion(at, *expected);
            }
        }

        self.ctx().emit(&Instruction::Call(meta.func_index));
        meta.result
    }

    /// `a.size`: the declared logical length, folded to a constant.
    fn compile_size_expression(&mut self, expr: &Node) -> ValueType {
        let size = expr
            .children
            .first()
            .and_then(|base| self.symbols().type_of_lvalue(base))
            .map(|ty| self.symbols().array_size(ty));
        match size {
            Some(ArraySize::Static(n)) => {
                self.ctx().emit(&Instruction::I32Const(n as i32));
            }
            _ => {
                warn!("size of a dynamic or non-array value, pushing zero");
                self.ctx().emit(&Instruction::I32Const(0));
            }
        }
        ValueType::Integer
    }
}
