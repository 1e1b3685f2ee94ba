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

//! Driver exit codes and output behaviour.

use std::fs;

use assert_cmd::Command;
use predicates::prelude::*;
use tempfile::TempDir;

fn wasmpas() -> Command {
    Command::cargo_bin("wasmpas").expect("binary builds")
}

fn write_source(dir: &TempDir, name: &str, source: &str) -> std::path::PathBuf {
    let path = dir.path().join(name);
    fs::write(&path, source).expect("write source");
    path
}

#[test]
fn successful_compile_writes_a_module_and_exits_zero() {
    let dir = TempDir::new().unwrap();
    let input = write_source(&dir, "ok.pas", "routine main : integer is return 42 end");
    let output = dir.path().join("ok.wasm");

    wasmpas()
        .arg(&input)
        .arg(&output)
        .assert()
        .success();

    let bytes = fs::read(&output).expect("module written");
    assert_eq!(&bytes[0..4], b"\0asm");
}

#[test]
fn parse_error_exits_one() {
    let dir = TempDir::new().unwrap();
    let input = write_source(&dir, "bad.pas", "routine main : integer is return 42");
    let output = dir.path().join("bad.wasm");

    wasmpas()
        .arg(&input)
        .arg(&output)
        .assert()
        .failure()
        .code(1);
    assert!(!output.exists());
}

#[test]
fn semantic_error_exits_one_and_reports_it() {
    let dir = TempDir::new().unwrap();
    let input = write_source(
        &dir,
        "oob.pas",
        "routine main : integer is
           var a : array [5] of integer
           return a[6]
         end",
    );
    let output = dir.path().join("oob.wasm");

    wasmpas()
        .arg(&input)
        .arg(&output)
        .assert()
        .failure()
        .code(1)
        .stderr(predicate::str::contains(
            "Array index 6 out of bounds for array 'a' of size 5",
        ));
    assert!(!output.exists());
}

#[test]
fn emit_error_exits_two() {
    // Analysis passes, but there is no main to export.
    let dir = TempDir::new().unwrap();
    let input = write_source(
        &dir,
        "nomain.pas",
        "routine testRunner : integer is return 1 end",
    );
    let output = dir.path().join("nomain.wasm");

    wasmpas()
        .arg(&input)
        .arg(&output)
        .assert()
        .failure()
        .code(2)
        .stderr(predicate::str::contains("main routine not found"));
}

#[test]
fn missing_input_exits_three() {
    let dir = TempDir::new().unwrap();
    let output = dir.path().join("out.wasm");

    wasmpas()
        .arg(dir.path().join("nope.pas"))
        .arg(&output)
        .assert()
        .failure()
        .code(3);
}

#[test]
fn warnings_do_not_fail_the_build() {
    let dir = TempDir::new().unwrap();
    let input = write_source(
        &dir,
        "warn.pas",
        "routine main : integer is
           var a : array [5] of integer
           var j : integer is 2
           a[j] := 1
           return a[j]
         end",
    );
    let output = dir.path().join("warn.wasm");

    wasmpas()
        .arg(&input)
        .arg(&output)
        .assert()
        .success()
        .stderr(predicate::str::contains("cannot verify index"));
    assert!(output.exists());
}
