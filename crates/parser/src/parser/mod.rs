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

mod expr;
mod statement;
mod type_expr;

use logos::Span;
use std::iter::Peekable;

use ast::{Node, NodeKind};

use crate::lexer::{tokenize, SpannedToken, Token};

#[derive(Debug, Clone)]
pub struct ParseError {
    pub message: String,
    pub span: Span,
}

impl std::fmt::Display for ParseError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "parse error at {}..{}: {}",
            self.span.start, self.span.end, self.message
        )
    }
}

impl std::error::Error for ParseError {}

pub(crate) type ParseResult<T> = Result<T, ParseError>;

/// Parse a complete source file into a `Program` node.
pub fn parse(source: &str) -> Result<Node, ParseError> {
    let tokens = tokenize(source);
    Parser::new(source, tokens.into_iter()).parse_program()
}

pub struct Parser<I: Iterator<Item = SpannedToken>> {
    tokens: Peekable<I>,
    current_span: Span,
    /// Source text, kept for slicing identifier and literal lexemes.
    source: String,
}

impl<I: Iterator<Item = SpannedToken>> Parser<I> {
    pub fn new(source: &str, iterator: I) -> Self {
        Self {
            tokens: iterator.peekable(),
            current_span: 0..0,
            source: source.to_string(),
        }
    }

    // ─── Token stream helpers ────────────────────────────────────────────

    pub(crate) fn peek_token(&mut self) -> Token {
        self.tokens
            .peek()
            .map(|(t, _)| t.clone())
            .unwrap_or(Token::Eof)
    }

    pub(crate) fn advance(&mut self) -> Token {
        if let Some((token, span)) = self.tokens.next() {
            self.current_span = span;
            token
        } else {
            Token::Eof
        }
    }

    /// Source text of the last consumed token.
    pub(crate) fn last_text(&self) -> &str {
        &self.source[self.current_span.start..self.current_span.end]
    }

    pub(crate) fn error(&self, message: impl Into<String>) -> ParseError {
        ParseError {
            message: message.into(),
            span: self.current_span.clone(),
        }
    }

    pub(crate) fn expect(&mut self, expected: Token, what: &str) -> ParseResult<()> {
        let got = self.advance();
        if got == expected {
            Ok(())
        } else {
            Err(self.error(format!("expected {what}, found {got:?}")))
        }
    }

    /// Consume an identifier token and return its lexeme.
    pub(crate) fn expect_ident(&mut self, what: &str) -> ParseResult<String> {
        match self.advance() {
            Token::Ident => Ok(self.last_text().to_string()),
            got => Err(self.error(format!("expected {what}, found {got:?}"))),
        }
    }

    fn eat(&mut self, token: Token) -> bool {
        if self.peek_token() == token {
            self.advance();
            return true;
        }
        false
    }

    // ─── Top level ───────────────────────────────────────────────────────

    /// `Program ::= { VarDecl | TypeDecl | RoutineDecl }`
    pub fn parse_program(&mut self) -> ParseResult<Node> {
        let mut program = Node::new(NodeKind::Program);
        loop {
            match self.peek_token() {
                Token::Eof => break,
                Token::Semicolon => {
                    self.advance();
                }
                Token::Var => program.add_child(self.parse_var_decl()?),
                Token::Type => program.add_child(self.parse_type_decl()?),
                Token::Routine => program.add_child(self.parse_routine_decl()?),
                got => {
                    self.advance();
                    return Err(self.error(format!(
                        "expected a declaration at top level, found {got:?}"
                    )));
                }
            }
        }
        Ok(program)
    }

    /// `VarDecl ::= "var" Ident ":" Type [ "is" Expr ]`
    pub(crate) fn parse_var_decl(&mut self) -> ParseResult<Node> {
        self.expect(Token::Var, "'var'")?;
        let name = self.expect_ident("variable name")?;
        self.expect(Token::Colon, "':' after variable name")?;
        let ty = self.parse_type()?;
        let mut decl = Node::with_value(NodeKind::VarDecl, name);
        decl.add_child(ty);
        if self.eat(Token::Is) {
            decl.add_child(self.parse_expression()?);
        }
        Ok(decl)
    }

    /// `TypeDecl ::= "type" Ident "is" Type`
    pub(crate) fn parse_type_decl(&mut self) -> ParseResult<Node> {
        self.expect(Token::Type, "'type'")?;
        let name = self.expect_ident("type name")?;
        self.expect(Token::Is, "'is' after type name")?;
        let ty = self.parse_type()?;
        let mut decl = Node::with_value(NodeKind::TypeDecl, name);
        decl.add_child(ty);
        Ok(decl)
    }

    /// `RoutineDecl ::= "routine" Ident [ "(" Params ")" ] [ ":" Type ]
    ///                  ( "is" Body "end" | ε )`
    ///
    /// Without an `is`-body the declaration is a forward declaration.
    fn parse_routine_decl(&mut self) -> ParseResult<Node> {
        self.expect(Token::Routine, "'routine'")?;
        let name = self.expect_ident("routine name")?;

        let mut params = None;
        if self.eat(Token::LParen) {
            params = Some(self.parse_parameter_list()?);
            self.expect(Token::RParen, "')' after parameters")?;
        }

        let mut ret = None;
        if self.eat(Token::Colon) {
            ret = Some(self.parse_return_type()?);
        }

        if self.eat(Token::Is) {
            let body = self.parse_body()?;
            self.expect(Token::End, "'end' closing routine body")?;
            let mut decl = Node::with_value(NodeKind::RoutineDecl, name);
            if let Some(p) = params {
                decl.add_child(p);
            }
            if let Some(r) = ret {
                decl.add_child(r);
            }
            decl.add_child(body);
            Ok(decl)
        } else {
            let mut decl = Node::with_value(NodeKind::RoutineForwardDecl, name);
            if let Some(p) = params {
                decl.add_child(p);
            }
            if let Some(r) = ret {
                decl.add_child(r);
            }
            Ok(decl)
        }
    }

    fn parse_parameter_list(&mut self) -> ParseResult<Node> {
        let mut list = Node::new(NodeKind::ParameterList);
        if self.peek_token() == Token::RParen {
            return Ok(list);
        }
        loop {
            let name = self.expect_ident("parameter name")?;
            self.expect(Token::Colon, "':' after parameter name")?;
            let ty = self.parse_type()?;
            let mut param = Node::with_value(NodeKind::Parameter, name);
            param.add_child(ty);
            list.add_child(param);
            if !self.eat(Token::Comma) {
                break;
            }
        }
        Ok(list)
    }
}
