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

use std::fmt;

use wasm_encoder::ValType;

/// Scalar value type of the source language.
///
/// `integer` and `boolean` share the WASM `i32` representation; `real` is
/// `f64`. Aggregates never appear as operand values; an array or record
/// expression evaluates to its `i32` base address in linear memory.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ValueType {
    Integer,
    Real,
    Boolean,
}

impl ValueType {
    pub fn from_primitive(name: &str) -> Option<ValueType> {
        match name {
            "integer" => Some(ValueType::Integer),
            "real" => Some(ValueType::Real),
            "boolean" => Some(ValueType::Boolean),
            _ => None,
        }
    }

    pub fn to_val_type(self) -> ValType {
        match self {
            ValueType::Integer | ValueType::Boolean => ValType::I32,
            ValueType::Real => ValType::F64,
        }
    }

    /// Result type of a binary numeric operation, by the promotion lattice
    /// `real > integer > boolean`.
    pub fn promote(self, other: ValueType) -> ValueType {
        if self == ValueType::Real || other == ValueType::Real {
            ValueType::Real
        } else if self == ValueType::Integer || other == ValueType::Integer {
            ValueType::Integer
        } else {
            ValueType::Boolean
        }
    }

    /// Byte footprint of one value of this type in linear memory.
    pub fn byte_size(self) -> u32 {
        match self {
            ValueType::Integer | ValueType::Boolean => 4,
            ValueType::Real => 8,
        }
    }
}

impl fmt::Display for ValueType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ValueType::Integer => write!(f, "integer"),
            ValueType::Real => write!(f, "real"),
            ValueType::Boolean => write!(f, "boolean"),
        }
    }
}
