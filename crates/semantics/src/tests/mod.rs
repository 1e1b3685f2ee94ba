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

mod dce_tests;

use ast::Node;

use crate::{Analysis, Analyzer};

/// Parse, analyze, and hand back both the rewritten tree and the outcome.
pub(crate) fn analyze_source(source: &str) -> (Node, Analysis) {
    let mut program = parser::parse(source).expect("test source must parse");
    let analysis = Analyzer::new().analyze(&mut program);
    (program, analysis)
}

pub(crate) fn error_messages(analysis: &Analysis) -> Vec<String> {
    analysis.errors().map(|d| d.message.clone()).collect()
}

pub(crate) fn warning_messages(analysis: &Analysis) -> Vec<String> {
    analysis.warnings().map(|d| d.message.clone()).collect()
}
