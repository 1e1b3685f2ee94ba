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

use logos::{Logos, Span};

#[derive(Logos, Debug, PartialEq, Clone)]
#[logos(skip r"[ \t\r\n\f]+")] // newlines are not significant
#[logos(skip r"//[^\n]*")] // line comments
pub enum Token {
    // Keywords
    #[token("var")] Var,
    #[token("type")] Type,
    #[token("routine")] Routine,
    #[token("record")] Record,
    #[token("array")] Array,
    #[token("of")] Of,
    #[token("is")] Is,
    #[token("end")] End,
    #[token("while")] While,
    #[token("for")] For,
    #[token("in")] In,
    #[token("reverse")] Reverse,
    #[token("loop")] Loop,
    #[token("if")] If,
    #[token("then")] Then,
    #[token("else")] Else,
    #[token("print")] Print,
    #[token("return")] Return,
    #[token("not")] Not,
    #[token("and")] And,
    #[token("or")] Or,
    #[token("xor")] Xor,
    #[token("true")] True,
    #[token("false")] False,
    #[token("integer")] Integer,
    #[token("real")] Real,
    #[token("boolean")] Boolean,

    // Multi-char operators
    #[token(":=")] Assign,
    #[token("..")] DotDot,
    #[token("<=")] Le,
    #[token(">=")] Ge,
    #[token("/=")] Ne,

    // Single-char operators / punctuation
    #[token("+")] Plus,
    #[token("-")] Minus,
    #[token("*")] Star,
    #[token("/")] Slash,
    #[token("%")] Percent,
    #[token("<")] Lt,
    #[token(">")] Gt,
    #[token("=")] Eq,
    #[token(":")] Colon,
    #[token(";")] Semicolon,
    #[token(",")] Comma,
    #[token(".")] Dot,
    #[token("(")] LParen,
    #[token(")")] RParen,
    #[token("[")] LBracket,
    #[token("]")] RBracket,

    // Literals and identifiers
    #[regex(r"[A-Za-z_][A-Za-z0-9_]*")]
    Ident,

    // A real literal requires digits on both sides of the dot so that the
    // range token `1..5` still lexes as Int DotDot Int.
    #[regex(r"[0-9]+\.[0-9]+")]
    RealLit,

    #[regex(r"[0-9]+")]
    IntLit,

    #[regex(r#""([^"\\\n]|\\.)*""#)]
    StringLit,

    Eof,

    Error,
}

pub type SpannedToken = (Token, Span);

/// Run the whole source through logos, mapping lex failures to the `Error`
/// token so the parser can report them with a span.
pub fn tokenize(source: &str) -> Vec<SpannedToken> {
    Token::lexer(source)
        .spanned()
        .map(|(token, span)| match token {
            Ok(token) => (token, span),
            Err(()) => (Token::Error, span),
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn range_does_not_lex_as_real() {
        let toks: Vec<Token> = tokenize("1..5").into_iter().map(|(t, _)| t).collect();
        assert_eq!(toks, vec![Token::IntLit, Token::DotDot, Token::IntLit]);
    }

    #[test]
    fn keywords_and_identifiers() {
        let toks: Vec<Token> = tokenize("var xs : array [3] of integer // c")
            .into_iter()
            .map(|(t, _)| t)
            .collect();
        assert_eq!(
            toks,
            vec![
                Token::Var,
                Token::Ident,
                Token::Colon,
                Token::Array,
                Token::LBracket,
                Token::IntLit,
                Token::RBracket,
                Token::Of,
                Token::Integer,
            ]
        );
    }

    #[test]
    fn real_literal_lexes() {
        let toks: Vec<Token> = tokenize("3.25").into_iter().map(|(t, _)| t).collect();
        assert_eq!(toks, vec![Token::RealLit]);
    }
}
