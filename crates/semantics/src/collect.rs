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

//! Type and declaration collection (single pass over the tree).

use std::collections::{HashMap, HashSet};

use ast::{Node, NodeKind};

/// Statically resolved logical length of an array type.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ArraySize {
    /// Declared with an integer-literal size.
    Static(i64),
    /// Declared without a size, or with a non-literal size expression.
    Dynamic,
    /// The type does not resolve to an array at all.
    NotArray,
}

/// Program-wide symbol tables. Declaration facts are filled by [`collect`];
/// the usage sets are filled later by the usage tracker.
#[derive(Debug, Default)]
pub struct SymbolTable {
    /// User type name → its defining type expression.
    pub type_table: HashMap<String, Node>,
    /// Every declared identifier (variables, parameters, routines).
    pub declared: HashSet<String>,
    /// Variable declarations that are direct children of the program root.
    pub globals: HashSet<String>,
    /// Variable declarations inside any body.
    pub locals: HashSet<String>,
    /// Routine names, from both full and forward declarations.
    pub routines: HashSet<String>,
    /// Variable/parameter name → its declared type expression.
    pub var_types: HashMap<String, Node>,
    /// Names read in value position.
    pub reads: HashSet<String>,
    /// Names written by assignments (whole target chains).
    pub writes: HashSet<String>,
    /// Routines that are called somewhere.
    pub called: HashSet<String>,
    /// Variables referenced from a scope inner to their declaration.
    pub outer_scope: HashSet<String>,
}

impl SymbolTable {
    /// Resolve a type expression to its array length, traversing user-type
    /// aliases. Alias chains are capped so a (rejected-elsewhere) cyclic
    /// alias cannot hang the analyzer.
    pub fn array_size(&self, ty: &Node) -> ArraySize {
        let mut ty = ty;
        for _ in 0..32 {
            match ty.kind {
                NodeKind::ArrayType => {
                    let size = ty.children.iter().find(|c| c.kind != NodeKind::PrimitiveType
                        && c.kind != NodeKind::ArrayType
                        && c.kind != NodeKind::RecordType
                        && c.kind != NodeKind::UserType);
                    return match size.and_then(Node::as_int) {
                        Some(n) => ArraySize::Static(n),
                        None => ArraySize::Dynamic,
                    };
                }
                NodeKind::UserType => match self.type_table.get(&ty.value) {
                    Some(aliased) => ty = aliased,
                    None => return ArraySize::NotArray,
                },
                _ => return ArraySize::NotArray,
            }
        }
        ArraySize::NotArray
    }

    /// Element type of an array type expression, traversing aliases.
    pub fn array_element_type<'a>(&'a self, ty: &'a Node) -> Option<&'a Node> {
        let mut ty = ty;
        for _ in 0..32 {
            match ty.kind {
                NodeKind::ArrayType => {
                    return ty.children.iter().find(|c| {
                        matches!(
                            c.kind,
                            NodeKind::PrimitiveType
                                | NodeKind::ArrayType
                                | NodeKind::RecordType
                                | NodeKind::UserType
                        )
                    });
                }
                NodeKind::UserType => ty = self.type_table.get(&ty.value)?,
                _ => return None,
            }
        }
        None
    }

    /// Resolve aliases until a non-`UserType` type expression is reached.
    pub fn resolve_alias<'a>(&'a self, ty: &'a Node) -> &'a Node {
        let mut ty = ty;
        for _ in 0..32 {
            match ty.kind {
                NodeKind::UserType => match self.type_table.get(&ty.value) {
                    Some(aliased) => ty = aliased,
                    None => return ty,
                },
                _ => return ty,
            }
        }
        ty
    }

    /// Declared type expression of an l-value chain (identifier, member
    /// access, array access), or `None` when it cannot be resolved.
    pub fn type_of_lvalue(&self, expr: &Node) -> Option<&Node> {
        match expr.kind {
            NodeKind::Identifier => self.var_types.get(&expr.value),
            NodeKind::MemberAccess => {
                let base_ty = self.type_of_lvalue(expr.children.first()?)?;
                let record = self.resolve_alias(base_ty);
                if record.kind != NodeKind::RecordType {
                    return None;
                }
                let fields = record.children.first()?;
                fields
                    .children
                    .iter()
                    .find(|f| f.kind == NodeKind::VarDecl && f.value == expr.value)
                    .and_then(|f| f.children.first())
            }
            NodeKind::ArrayAccess => {
                let base_ty = self.type_of_lvalue(expr.children.first()?)?;
                self.array_element_type(self.resolve_alias(base_ty))
            }
            _ => None,
        }
    }
}

/// Walk the tree once, indexing types and enumerating declarations. Globals
/// are variable declarations that are direct children of the program root;
/// the walk does not descend into routines when classifying them.
pub fn collect(program: &Node, symbols: &mut SymbolTable) {
    if program.kind == NodeKind::Program {
        for child in &program.children {
            if child.kind == NodeKind::VarDecl {
                symbols.globals.insert(child.value.clone());
            }
        }
    }
    walk(program, symbols, true);
}

fn walk(node: &Node, symbols: &mut SymbolTable, at_top: bool) {
    match node.kind {
        NodeKind::TypeDecl => {
            if let Some(ty) = node.children.first() {
                symbols
                    .type_table
                    .insert(node.value.clone(), ty.clone());
            }
        }
        NodeKind::VarDecl => {
            symbols.declared.insert(node.value.clone());
            if !at_top {
                symbols.locals.insert(node.value.clone());
            }
            if let Some(ty) = node.children.first() {
                if !ty.kind.is_expression() {
                    symbols.var_types.insert(node.value.clone(), ty.clone());
                }
            }
        }
        NodeKind::Parameter => {
            symbols.declared.insert(node.value.clone());
            if let Some(ty) = node.children.first() {
                symbols.var_types.insert(node.value.clone(), ty.clone());
            }
        }
        NodeKind::RoutineDecl | NodeKind::RoutineForwardDecl => {
            symbols.declared.insert(node.value.clone());
            symbols.routines.insert(node.value.clone());
        }
        NodeKind::For => {
            // The loop variable is an implicit integer declaration.
            symbols.declared.insert(node.value.clone());
            symbols.locals.insert(node.value.clone());
        }
        _ => {}
    }

    let descend_top = at_top && node.kind == NodeKind::Program;
    for child in &node.children {
        // Only direct children of the program root keep top-level status.
        walk(
            child,
            symbols,
            descend_top && matches!(child.kind, NodeKind::VarDecl | NodeKind::TypeDecl),
        );
    }
}
