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

use ast::{binary_op, unary_op, Node, NodeKind};

use super::{ParseResult, Parser};
use crate::lexer::{SpannedToken, Token};

impl<I: Iterator<Item = SpannedToken>> Parser<I> {
    /// `Expr ::= Relation { ("and" | "or" | "xor") Relation }`
    pub(crate) fn parse_expression(&mut self) -> ParseResult<Node> {
        let mut left = self.parse_relation()?;
        loop {
            let op = match self.peek_token() {
                Token::And => "and",
                Token::Or => "or",
                Token::Xor => "xor",
                _ => break,
            };
            self.advance();
            let right = self.parse_relation()?;
            left = binary_op(op, left, right);
        }
        Ok(left)
    }

    /// `Relation ::= Simple [ ("<"|"<="|">"|">="|"="|"/=") Simple ]`
    fn parse_relation(&mut self) -> ParseResult<Node> {
        let left = self.parse_simple()?;
        let op = match self.peek_token() {
            Token::Lt => "<",
            Token::Le => "<=",
            Token::Gt => ">",
            Token::Ge => ">=",
            Token::Eq => "=",
            Token::Ne => "/=",
            _ => return Ok(left),
        };
        self.advance();
        let right = self.parse_simple()?;
        Ok(binary_op(op, left, right))
    }

    /// `Simple ::= Factor { ("+" | "-") Factor }`
    fn parse_simple(&mut self) -> ParseResult<Node> {
        let mut left = self.parse_factor()?;
        loop {
            let op = match self.peek_token() {
                Token::Plus => "+",
                Token::Minus => "-",
                _ => break,
            };
            self.advance();
            let right = self.parse_factor()?;
            left = binary_op(op, left, right);
        }
        Ok(left)
    }

    /// `Factor ::= Unary { ("*" | "/" | "%") Unary }`
    fn parse_factor(&mut self) -> ParseResult<Node> {
        let mut left = self.parse_unary()?;
        loop {
            let op = match self.peek_token() {
                Token::Star => "*",
                Token::Slash => "/",
                Token::Percent => "%",
                _ => break,
            };
            self.advance();
            let right = self.parse_unary()?;
            left = binary_op(op, left, right);
        }
        Ok(left)
    }

    /// `Unary ::= [ "+" | "-" | "not" ] Primary`
    fn parse_unary(&mut self) -> ParseResult<Node> {
        let op = match self.peek_token() {
            Token::Plus => Some("+"),
            Token::Minus => Some("-"),
            Token::Not => Some("not"),
            _ => None,
        };
        if let Some(op) = op {
            self.advance();
            let operand = self.parse_unary()?;
            return Ok(unary_op(op, operand));
        }
        self.parse_primary()
    }

    fn parse_primary(&mut self) -> ParseResult<Node> {
        match self.advance() {
            Token::IntLit => Ok(Node::with_value(NodeKind::IntLiteral, self.last_text())),
            Token::RealLit => Ok(Node::with_value(NodeKind::RealLiteral, self.last_text())),
            Token::True => Ok(ast::bool_lit(true)),
            Token::False => Ok(ast::bool_lit(false)),
            Token::LParen => {
                let inner = self.parse_expression()?;
                self.expect(Token::RParen, "')' closing parenthesized expression")?;
                Ok(inner)
            }
            Token::Ident => {
                let name = self.last_text().to_string();
                if self.peek_token() == Token::LParen {
                    self.parse_call(name)
                } else {
                    self.parse_postfix(ast::identifier(name))
                }
            }
            got => Err(self.error(format!("expected an expression, found {got:?}"))),
        }
    }

    /// `RoutineCall ::= Ident "(" [ Expr { "," Expr } ] ")"`
    pub(crate) fn parse_call(&mut self, name: String) -> ParseResult<Node> {
        self.expect(Token::LParen, "'(' opening argument list")?;
        let mut args = Node::new(NodeKind::ArgumentList);
        if self.peek_token() != Token::RParen {
            loop {
                args.add_child(self.parse_expression()?);
                if self.peek_token() != Token::Comma {
                    break;
                }
                self.advance();
            }
        }
        self.expect(Token::RParen, "')' closing argument list")?;
        let mut call = Node::with_value(NodeKind::RoutineCall, name);
        call.add_child(args);
        Ok(call)
    }

    /// Postfix chain over a modifiable primary: `.field`, `[index]`, `.size`.
    pub(crate) fn parse_postfix(&mut self, mut base: Node) -> ParseResult<Node> {
        loop {
            match self.peek_token() {
                Token::Dot => {
                    self.advance();
                    let field = self.expect_ident("field name after '.'")?;
                    if field == "size" {
                        let mut node = Node::new(NodeKind::SizeExpression);
                        node.add_child(base);
                        base = node;
                    } else {
                        let mut node = Node::with_value(NodeKind::MemberAccess, field);
                        node.add_child(base);
                        base = node;
                    }
                }
                Token::LBracket => {
                    self.advance();
                    let index = self.parse_expression()?;
                    self.expect(Token::RBracket, "']' closing index")?;
                    let mut node = Node::new(NodeKind::ArrayAccess);
                    node.add_child(base);
                    node.add_child(index);
                    base = node;
                }
                _ => break,
            }
        }
        Ok(base)
    }
}
