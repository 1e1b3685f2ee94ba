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

/// Node kind tag. Every pass dispatches on this with an exhaustive match.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NodeKind {
    Program,

    // Declarations
    VarDecl,
    TypeDecl,
    RoutineDecl,
    RoutineForwardDecl,
    Parameter,
    ParameterList,
    ArgumentList,

    // Type expressions
    PrimitiveType,
    ArrayType,
    RecordType,
    UserType,

    // Statements
    Assignment,
    If,
    While,
    For,
    Print,
    Return,
    Body,
    ExpressionList,

    // Expressions
    BinaryOp,
    UnaryOp,
    IntLiteral,
    RealLiteral,
    BoolLiteral,
    StringLiteral,
    Identifier,
    RoutineCall,
    ArrayAccess,
    MemberAccess,
    SizeExpression,

    Range,
}

impl NodeKind {
    /// True for kinds that may appear in expression position.
    pub fn is_expression(self) -> bool {
        matches!(
            self,
            NodeKind::BinaryOp
                | NodeKind::UnaryOp
                | NodeKind::IntLiteral
                | NodeKind::RealLiteral
                | NodeKind::BoolLiteral
                | NodeKind::StringLiteral
                | NodeKind::Identifier
                | NodeKind::RoutineCall
                | NodeKind::ArrayAccess
                | NodeKind::MemberAccess
                | NodeKind::SizeExpression
        )
    }
}

impl fmt::Display for NodeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            NodeKind::Program => "PROGRAM",
            NodeKind::VarDecl => "VAR_DECL",
            NodeKind::TypeDecl => "TYPE_DECL",
            NodeKind::RoutineDecl => "ROUTINE_DECL",
            NodeKind::RoutineForwardDecl => "ROUTINE_FORWARD_DECL",
            NodeKind::Parameter => "PARAMETER",
            NodeKind::ParameterList => "PARAMETER_LIST",
            NodeKind::ArgumentList => "ARGUMENT_LIST",
            NodeKind::PrimitiveType => "PRIMITIVE_TYPE",
            NodeKind::ArrayType => "ARRAY_TYPE",
            NodeKind::RecordType => "RECORD_TYPE",
            NodeKind::UserType => "USER_TYPE",
            NodeKind::Assignment => "ASSIGNMENT",
            NodeKind::If => "IF_STMT",
            NodeKind::While => "WHILE_LOOP",
            NodeKind::For => "FOR_LOOP",
            NodeKind::Print => "PRINT_STMT",
            NodeKind::Return => "RETURN_STMT",
            NodeKind::Body => "BODY",
            NodeKind::ExpressionList => "EXPRESSION_LIST",
            NodeKind::BinaryOp => "BINARY_OP",
            NodeKind::UnaryOp => "UNARY_OP",
            NodeKind::IntLiteral => "LITERAL_INT",
            NodeKind::RealLiteral => "LITERAL_REAL",
            NodeKind::BoolLiteral => "LITERAL_BOOL",
            NodeKind::StringLiteral => "LITERAL_STRING",
            NodeKind::Identifier => "IDENTIFIER",
            NodeKind::RoutineCall => "ROUTINE_CALL",
            NodeKind::ArrayAccess => "ARRAY_ACCESS",
            NodeKind::MemberAccess => "MEMBER_ACCESS",
            NodeKind::SizeExpression => "SIZE_EXPRESSION",
            NodeKind::Range => "RANGE",
        };
        f.write_str(s)
    }
}
