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

//! Linear-memory layout.
//!
//! Records are packed in field declaration order with no padding: i32 fields
//! take 4 bytes, f64 fields 8, nested records their total size, array fields
//! `length * element size`. Offsets are a running sum starting at 0, so a
//! layout is deterministic and stable once the type table is frozen.

use ast::{Node, NodeKind};
use semantics::{ArraySize, SymbolTable};

use crate::types::ValueType;

/// WASM page size (64 KiB).
pub const PAGE_SIZE: u32 = 65536;

/// One field of a record layout: name, resolved type expression, byte offset.
#[derive(Debug, Clone)]
pub struct Field<'a> {
    pub name: &'a str,
    pub ty: &'a Node,
    pub offset: u32,
}

/// Byte size of a value of the given type expression. Dynamic arrays have no
/// static footprint and report 0; unresolvable types fall back to one i32.
pub fn byte_size(ty: &Node, symbols: &SymbolTable) -> u32 {
    let ty = symbols.resolve_alias(ty);
    match ty.kind {
        NodeKind::PrimitiveType => ValueType::from_primitive(&ty.value)
            .map_or(4, ValueType::byte_size),
        NodeKind::RecordType => fields(ty, symbols)
            .last()
            .map_or(0, |f| f.offset + byte_size(f.ty, symbols)),
        NodeKind::ArrayType => {
            let len = match symbols.array_size(ty) {
                ArraySize::Static(n) if n > 0 => n as u32,
                _ => 0,
            };
            let elem = symbols
                .array_element_type(ty)
                .map_or(4, |e| byte_size(e, symbols));
            len * elem
        }
        _ => 4,
    }
}

/// The packed field list of a record type expression.
pub fn fields<'a>(record: &'a Node, symbols: &'a SymbolTable) -> Vec<Field<'a>> {
    let record = symbols.resolve_alias(record);
    let mut out = Vec::new();
    if record.kind != NodeKind::RecordType {
        return out;
    }
    let Some(body) = record.children.first() else {
        return out;
    };
    let mut offset = 0;
    for field in &body.children {
        if field.kind != NodeKind::VarDecl {
            continue;
        }
        let Some(ty) = field.children.first() else {
            continue;
        };
        out.push(Field {
            name: &field.value,
            ty,
            offset,
        });
        offset += byte_size(ty, symbols);
    }
    out
}

/// Byte offset and type of a named field, or `None` for an unknown field.
pub fn field_offset<'a>(
    record: &'a Node,
    name: &str,
    symbols: &'a SymbolTable,
) -> Option<(u32, &'a Node)> {
    fields(record, symbols)
        .into_iter()
        .find(|f| f.name == name)
        .map(|f| (f.offset, f.ty))
}

/// Distance in bytes between consecutive elements of an array type.
pub fn element_stride(array_ty: &Node, symbols: &SymbolTable) -> u32 {
    symbols
        .array_element_type(symbols.resolve_alias(array_ty))
        .map_or(4, |e| byte_size(e, symbols))
}

/// True when values of this type live in linear memory rather than in a
/// WASM local.
pub fn is_aggregate(ty: &Node, symbols: &SymbolTable) -> bool {
    matches!(
        symbols.resolve_alias(ty).kind,
        NodeKind::ArrayType | NodeKind::RecordType
    )
}

/// Scalar value type of a type expression; aggregates read as their i32 base
/// address.
pub fn value_type(ty: &Node, symbols: &SymbolTable) -> ValueType {
    let ty = symbols.resolve_alias(ty);
    match ty.kind {
        NodeKind::PrimitiveType => {
            ValueType::from_primitive(&ty.value).unwrap_or(ValueType::Integer)
        }
        _ => ValueType::Integer,
    }
}

/// Number of memory pages covering `total_bytes`, clamped to `1..=1024`.
pub fn page_count(total_bytes: u32) -> u64 {
    let pages = total_bytes.div_ceil(PAGE_SIZE).clamp(1, 1024);
    u64::from(pages)
}
