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

//! Front end: logos lexer and recursive-descent parser for the source
//! language. The parser produces the homogeneous `ast::Node` tree that the
//! semantic analyzer and the WASM emitter operate on.

pub mod lexer;
mod parser;

pub use parser::{parse, ParseError, Parser};

#[cfg(test)]
mod tests;
