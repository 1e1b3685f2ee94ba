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

//! Usage tracking and dead-code elimination.

use ast::{Node, NodeKind};

use super::{analyze_source, error_messages};

fn main_body(program: &Node) -> &Node {
    program
        .children
        .iter()
        .find(|c| c.kind == NodeKind::RoutineDecl && c.value == "main")
        .and_then(|r| r.find_child(NodeKind::Body))
        .expect("main with a body")
}

#[test]
fn write_only_local_and_its_assignment_are_removed() {
    // Scenario 4.
    let (program, analysis) = analyze_source(
        "routine main : integer is
           var unused : integer is 7
           var x : integer is 1
           unused := 9
           return x
         end",
    );
    assert!(analysis.success, "errors: {:?}", error_messages(&analysis));
    assert_eq!(analysis.removal.locals, 1);
    assert_eq!(analysis.removal.assignments, 1);

    let body = main_body(&program);
    assert_eq!(body.children.len(), 2);
    assert_eq!(body.children[0].kind, NodeKind::VarDecl);
    assert_eq!(body.children[0].value, "x");
    assert_eq!(body.children[1].kind, NodeKind::Return);
}

#[test]
fn side_effecting_rhs_is_promoted_to_expression_statement() {
    // Scenario 5: the call must survive the removal of `r`.
    let (program, analysis) = analyze_source(
        "routine foo : integer is return 3 end
         routine main : integer is
           var r : integer
           r := foo()
           return 0
         end",
    );
    assert!(analysis.success, "errors: {:?}", error_messages(&analysis));
    assert_eq!(analysis.removal.locals, 1);
    assert_eq!(analysis.removal.assignments, 1);
    assert_eq!(analysis.removal.routines, 0);

    // foo is still there: it is called.
    assert!(program
        .children
        .iter()
        .any(|c| c.kind == NodeKind::RoutineDecl && c.value == "foo"));

    let body = main_body(&program);
    assert_eq!(body.children.len(), 2);
    assert_eq!(body.children[0].kind, NodeKind::RoutineCall);
    assert_eq!(body.children[0].value, "foo");
    assert_eq!(body.children[1].kind, NodeKind::Return);
}

#[test]
fn uncalled_routine_is_removed_but_entry_points_stay() {
    let (program, analysis) = analyze_source(
        "routine orphan : integer is return 1 end
         routine testRunner : integer is return 2 end
         routine main : integer is return 0 end",
    );
    assert!(analysis.success);
    assert_eq!(analysis.removal.routines, 1);

    let names: Vec<&str> = program
        .children
        .iter()
        .map(|c| c.value.as_str())
        .collect();
    assert_eq!(names, vec!["testRunner", "main"]);
}

#[test]
fn uncalled_forward_declaration_is_removed() {
    let (program, analysis) = analyze_source(
        "routine orphan : integer
         routine main : integer is return 0 end",
    );
    assert!(analysis.success);
    assert_eq!(analysis.removal.routines, 1);
    assert!(!program
        .children
        .iter()
        .any(|c| c.kind == NodeKind::RoutineForwardDecl));
}

#[test]
fn unused_global_is_removed_and_used_global_kept() {
    let (program, analysis) = analyze_source(
        "var dead : integer is 3
         var live : integer is 4
         routine main : integer is return live end",
    );
    assert!(analysis.success);
    assert_eq!(analysis.removal.globals, 1);

    let globals: Vec<&str> = program
        .children
        .iter()
        .filter(|c| c.kind == NodeKind::VarDecl)
        .map(|c| c.value.as_str())
        .collect();
    assert_eq!(globals, vec!["live"]);
}

#[test]
fn assignment_to_global_is_never_removed() {
    let (program, analysis) = analyze_source(
        "var counter : integer is 0
         routine main : integer is
           counter := 5
           return 0
         end",
    );
    assert!(analysis.success);
    assert_eq!(analysis.removal.assignments, 0);
    assert_eq!(analysis.removal.globals, 0);

    let body = main_body(&program);
    assert_eq!(body.children[0].kind, NodeKind::Assignment);
}

#[test]
fn write_only_local_escaping_into_loop_body_is_kept() {
    // The assignment sits in an inner loop body, so `sink` escapes its
    // declaring scope and both the assignment and the declaration survive.
    let (program, analysis) = analyze_source(
        "routine main : integer is
           var sink : integer is 0
           for i in 1..3 loop sink := i end
           return 0
         end",
    );
    assert!(analysis.success);
    assert_eq!(analysis.removal.locals, 0);
    assert_eq!(analysis.removal.assignments, 0);

    let body = main_body(&program);
    assert!(body
        .children
        .iter()
        .any(|c| c.kind == NodeKind::VarDecl && c.value == "sink"));
}

#[test]
fn type_declarations_are_never_removed() {
    let (program, analysis) = analyze_source(
        "type Pair is record var a : integer; var b : integer end
         routine main : integer is return 0 end",
    );
    assert!(analysis.success);
    assert!(program
        .children
        .iter()
        .any(|c| c.kind == NodeKind::TypeDecl && c.value == "Pair"));
}

#[test]
fn element_stores_keep_their_array_alive() {
    let (program, analysis) = analyze_source(
        "routine main : integer is
           var a : array [3] of integer
           a[1] := 5
           return 0
         end",
    );
    assert!(analysis.success);
    assert_eq!(analysis.removal.locals, 0);

    let body = main_body(&program);
    assert!(body
        .children
        .iter()
        .any(|c| c.kind == NodeKind::VarDecl && c.value == "a"));
}

#[test]
fn removal_report_formats_counts() {
    let (_, analysis) = analyze_source(
        "routine orphan : integer is return 1 end
         routine main : integer is
           var unused : integer is 7
           unused := 9
           return 0
         end",
    );
    assert!(analysis.success);
    let text = analysis.removal.to_string();
    assert!(text.contains("1 routine(s)"));
    assert!(text.contains("1 local variable(s)"));
    assert!(text.contains("1 assignment(s)"));
}
