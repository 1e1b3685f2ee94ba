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

use super::{ParseResult, Parser};
use crate::lexer::{SpannedToken, Token};

impl<I: Iterator<Item = SpannedToken>> Parser<I> {
    /// `Type ::= "integer" | "real" | "boolean" | ArrayType | RecordType | Ident`
    pub(crate) fn parse_type(&mut self) -> ParseResult<Node> {
        match self.peek_token() {
            Token::Integer | Token::Real | Token::Boolean => {
                self.advance();
                Ok(Node::with_value(NodeKind::PrimitiveType, self.last_text()))
            }
            Token::Array => self.parse_array_type(),
            Token::Record => self.parse_record_type(),
            Token::Ident => {
                self.advance();
                Ok(Node::with_value(NodeKind::UserType, self.last_text()))
            }
            got => {
                self.advance();
                Err(self.error(format!("expected a type, found {got:?}")))
            }
        }
    }

    /// `ArrayType ::= "array" "[" [ Expr ] "]" "of" Type`
    ///
    /// An omitted size expression declares a dynamically-sized array (legal
    /// for parameters; the bounds analyzer treats it as unverifiable).
    fn parse_array_type(&mut self) -> ParseResult<Node> {
        self.expect(Token::Array, "'array'")?;
        self.expect(Token::LBracket, "'[' after 'array'")?;
        let mut node = Node::new(NodeKind::ArrayType);
        if self.peek_token() != Token::RBracket {
            node.add_child(self.parse_expression()?);
        }
        self.expect(Token::RBracket, "']' closing array size")?;
        self.expect(Token::Of, "'of' after array size")?;
        node.add_child(self.parse_type()?);
        Ok(node)
    }

    /// `RecordType ::= "record" { VarDecl [";"] } "end"`
    fn parse_record_type(&mut self) -> ParseResult<Node> {
        self.expect(Token::Record, "'record'")?;
        let mut fields = Node::new(NodeKind::Body);
        loop {
            match self.peek_token() {
                Token::Var => fields.add_child(self.parse_var_decl()?),
                Token::Semicolon => {
                    self.advance();
                }
                Token::End => break,
                got => {
                    self.advance();
                    return Err(self.error(format!(
                        "expected a field declaration or 'end' in record, found {got:?}"
                    )));
                }
            }
        }
        self.expect(Token::End, "'end' closing record")?;
        let mut node = Node::new(NodeKind::RecordType);
        node.add_child(fields);
        Ok(node)
    }

    /// Routine return types are restricted to primitive or user type names.
    pub(crate) fn parse_return_type(&mut self) -> ParseResult<Node> {
        match self.peek_token() {
            Token::Integer | Token::Real | Token::Boolean => {
                self.advance();
                Ok(Node::with_value(NodeKind::PrimitiveType, self.last_text()))
            }
            Token::Ident => {
                self.advance();
                Ok(Node::with_value(NodeKind::UserType, self.last_text()))
            }
            got => {
                self.advance();
                Err(self.error(format!(
                    "expected a primitive or named return type, found {got:?}"
                )))
            }
        }
    }
}
