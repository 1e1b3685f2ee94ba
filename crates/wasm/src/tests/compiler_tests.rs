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

//! Module-shape tests: header, section order, exports, memory limits, and
//! the emitter's failure modes.

use wasmparser::{ExternalKind, Parser, Payload};

use super::compile_source;
use crate::CompileError;

const TRIVIAL: &str = "routine main : integer is return 0 end";

#[test]
fn module_header_has_magic_and_version() {
    let bytes = compile_source(TRIVIAL);
    assert_eq!(&bytes[0..4], b"\0asm");
    assert_eq!(&bytes[4..8], &[1, 0, 0, 0]);
}

#[test]
fn sections_appear_in_required_order() {
    let bytes = compile_source(TRIVIAL);
    let mut sections = Vec::new();
    for payload in Parser::new(0).parse_all(&bytes) {
        match payload.expect("module must parse") {
            Payload::TypeSection(_) => sections.push("type"),
            Payload::FunctionSection(_) => sections.push("function"),
            Payload::MemorySection(_) => sections.push("memory"),
            Payload::ExportSection(_) => sections.push("export"),
            Payload::CodeSectionStart { .. } => sections.push("code"),
            _ => {}
        }
    }
    assert_eq!(sections, ["type", "function", "memory", "export", "code"]);
}

#[test]
fn only_main_is_exported_as_a_function() {
    let bytes = compile_source(
        "routine helper : integer is return 1 end
         routine main : integer is return helper() end",
    );
    let mut exports = Vec::new();
    for payload in Parser::new(0).parse_all(&bytes) {
        if let Payload::ExportSection(reader) = payload.expect("module must parse") {
            for export in reader {
                let export = export.expect("export entry");
                exports.push((export.name.to_string(), export.kind));
            }
        }
    }
    assert_eq!(exports.len(), 1);
    assert_eq!(exports[0].0, "main");
    assert_eq!(exports[0].1, ExternalKind::Func);
}

#[test]
fn memory_declares_at_least_one_page() {
    let bytes = compile_source(TRIVIAL);
    let mut initial = None;
    for payload in Parser::new(0).parse_all(&bytes) {
        if let Payload::MemorySection(reader) = payload.expect("module must parse") {
            for memory in reader {
                initial = Some(memory.expect("memory entry").initial);
            }
        }
    }
    assert_eq!(initial, Some(1));
}

#[test]
fn every_routine_gets_a_function_body() {
    let bytes = compile_source(
        "routine a : integer is return 1 end
         routine b : integer is return a() end
         routine main : integer is return b() end",
    );
    let mut declared = 0;
    let mut bodies = 0;
    for payload in Parser::new(0).parse_all(&bytes) {
        match payload.expect("module must parse") {
            Payload::FunctionSection(reader) => declared = reader.count(),
            Payload::CodeSectionStart { count, .. } => bodies = count,
            _ => {}
        }
    }
    assert_eq!(declared, 3);
    assert_eq!(bodies, 3);
}

#[test]
fn missing_main_is_a_fatal_emit_error() {
    let mut program = parser::parse(
        "routine testRunner : integer is return 1 end",
    )
    .expect("parse");
    let err = crate::compile(&mut program).unwrap_err();
    match err {
        CompileError::Emit(e) => {
            assert!(e.messages.iter().any(|m| m.contains("main routine not found")));
        }
        other => panic!("expected an emit error, got {other}"),
    }
}

#[test]
fn semantic_failure_stops_before_emission() {
    // Scenario 3: the out-of-bounds access fails analysis, so no bytes are
    // produced at all.
    let mut program = parser::parse(
        "routine main : integer is
           var a : array [5] of integer
           return a[6]
         end",
    )
    .expect("parse");
    let err = crate::compile(&mut program).unwrap_err();
    match err {
        CompileError::Semantic(diags) => {
            assert!(diags
                .iter()
                .any(|d| d.message.contains("Array index 6 out of bounds")));
        }
        other => panic!("expected a semantic error, got {other}"),
    }
}

#[test]
fn real_to_boolean_conversion_is_rejected_at_emit_time() {
    let mut program = parser::parse(
        "var flag : boolean
         routine main : integer is
           flag := 1.5
           return 0
         end",
    )
    .expect("parse");
    let err = crate::compile(&mut program).unwrap_err();
    match err {
        CompileError::Emit(e) => {
            assert!(e
                .messages
                .iter()
                .any(|m| m.contains("illegal conversion from real to boolean")));
        }
        other => panic!("expected an emit error, got {other}"),
    }
}

#[test]
fn aggregates_grow_the_memory_section() {
    // 3 pages of f64s: 3 * 8192 elements * 8 bytes = 196608 bytes.
    let bytes = compile_source(
        "var big : array [24576] of real
         routine main : integer is
           big[1] := 1.5
           return 0
         end",
    );
    let mut initial = None;
    for payload in Parser::new(0).parse_all(&bytes) {
        if let Payload::MemorySection(reader) = payload.expect("module must parse") {
            for memory in reader {
                initial = Some(memory.expect("memory entry").initial);
            }
        }
    }
    assert_eq!(initial, Some(3));
}
