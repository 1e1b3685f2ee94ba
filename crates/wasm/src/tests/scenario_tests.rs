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

//! End-to-end behaviour: compiled modules are validated and then executed
//! with wasmtime.

use super::{compile_source, eval_main, run_main};

#[test]
fn simple_return() {
    assert_eq!(eval_main("routine main : integer is return 42 end"), 42);
}

#[test]
fn folded_initializer() {
    // 2 + 3 * 4 folds to 14 before emission.
    assert_eq!(
        eval_main(
            "routine main : integer is
               var x : integer is 2 + 3 * 4
               return x
             end"
        ),
        14
    );
}

#[test]
fn dead_code_elimination_preserves_result() {
    assert_eq!(
        eval_main(
            "routine main : integer is
               var unused : integer is 7
               var x : integer is 1
               unused := 9
               return x
             end"
        ),
        1
    );
}

#[test]
fn promoted_call_still_runs_for_its_effect() {
    // The assignment to `r` dies, but foo's write to the global must happen.
    assert_eq!(
        eval_main(
            "var g : integer is 0
             routine foo : integer is
               g := g + 3
               return g
             end
             routine main : integer is
               var r : integer
               r := foo()
               return g
             end"
        ),
        3
    );
}

#[test]
fn record_in_array_field_write() {
    // Layout: a@0, b@4, record size 8; xs[2].b lands at byte 12.
    assert_eq!(
        eval_main(
            "type Pair is record var a : integer; var b : integer end
             routine main : integer is
               var xs : array [3] of Pair
               xs[2].b := 99
               return xs[2].b
             end"
        ),
        99
    );
}

#[test]
fn parameters_and_calls() {
    assert_eq!(
        eval_main(
            "routine add(a : integer, b : integer) : integer is return a + b end
             routine main : integer is return add(19, 23) end"
        ),
        42
    );
}

#[test]
fn while_loop_counts_down() {
    assert_eq!(
        eval_main(
            "routine main : integer is
               var total : integer is 0
               var i : integer is 5
               while i > 0 loop
                 total := total + i
                 i := i - 1
               end
               return total
             end"
        ),
        15
    );
}

#[test]
fn for_loop_sums_range() {
    assert_eq!(
        eval_main(
            "var total : integer is 0
             routine main : integer is
               for i in 1..5 loop total := total + i end
               return total
             end"
        ),
        15
    );
}

#[test]
fn reverse_for_loop_sums_range() {
    assert_eq!(
        eval_main(
            "var total : integer is 0
             routine main : integer is
               for i in reverse 5..1 loop total := total + i end
               return total
             end"
        ),
        15
    );
}

#[test]
fn empty_forward_range_runs_zero_iterations() {
    assert_eq!(
        eval_main(
            "var total : integer is 0
             routine main : integer is
               for i in 5..1 loop total := total + 1 end
               return total
             end"
        ),
        0
    );
}

#[test]
fn empty_reverse_range_runs_zero_iterations() {
    assert_eq!(
        eval_main(
            "var total : integer is 0
             routine main : integer is
               for i in reverse 1..5 loop total := total + 1 end
               return total
             end"
        ),
        0
    );
}

#[test]
fn global_initializer_runs_before_main_body() {
    assert_eq!(
        eval_main(
            "var g : integer is 42
             routine main : integer is
               g := g + 1
               return g
             end"
        ),
        43
    );
}

#[test]
fn real_global_store_and_rounding_conversion() {
    // r = 1.25 + 1.25 = 2.5; real→integer adds 0.5 and truncates: 3.
    assert_eq!(
        eval_main(
            "var r : real is 1.25
             routine main : integer is
               r := r + 1.25
               return r
             end"
        ),
        3
    );
}

#[test]
fn integer_to_boolean_collapses_nonzero() {
    let source = |n: i32| {
        format!(
            "routine main : integer is
               var b : boolean
               b := {n}
               if b then return 1 else return 0 end
             end"
        )
    };
    assert_eq!(eval_main(&source(0)), 0);
    assert_eq!(eval_main(&source(1)), 1);
    assert_eq!(eval_main(&source(5)), 1);
}

#[test]
fn division_by_zero_traps_at_runtime() {
    // Folding leaves `/` alone, so the trap is observable.
    let bytes = compile_source(
        "routine main : integer is
           var zero : integer is 0
           return 1 / zero
         end",
    );
    assert!(run_main(&bytes).is_err());
}

#[test]
fn literal_division_is_not_folded_away() {
    let bytes = compile_source("routine main : integer is return 1 / 0 end");
    assert!(run_main(&bytes).is_err());
}

#[test]
fn print_arguments_are_evaluated_then_dropped() {
    // The printed call mutates the global even though print emits nothing.
    assert_eq!(
        eval_main(
            r#"var g : integer is 0
               routine bump : integer is
                 g := g + 1
                 return g
               end
               routine main : integer is
                 print "bumping", bump()
                 return g
               end"#
        ),
        1
    );
}

#[test]
fn global_record_fields() {
    assert_eq!(
        eval_main(
            "type Point is record var x : integer; var y : real end
             var p : Point
             routine main : integer is
               p.x := 7
               p.y := 0.5
               return p.x
             end"
        ),
        7
    );
}

#[test]
fn nested_record_field_offsets() {
    // inner: a@0, b@4 (size 8); Outer: lead@0, pair@4..12, tail@12.
    assert_eq!(
        eval_main(
            "type Inner is record var a : integer; var b : integer end
             type Outer is record
               var lead : integer
               var pair : Inner
               var tail : integer
             end
             var o : Outer
             routine main : integer is
               o.lead := 1
               o.pair.b := 50
               o.tail := 9
               return o.pair.b - o.tail
             end"
        ),
        41
    );
}

#[test]
fn array_of_reals_roundtrips_through_memory() {
    assert_eq!(
        eval_main(
            "routine main : integer is
               var xs : array [4] of real
               xs[1] := 0.25
               xs[4] := 2.25
               return xs[1] + xs[4]
             end"
        ),
        3 // 2.5 rounds up through the +0.5 conversion
    );
}

#[test]
fn size_expression_folds_to_declared_length() {
    assert_eq!(
        eval_main(
            "routine main : integer is
               var a : array [5] of integer
               a[1] := 0
               return a.size
             end"
        ),
        5
    );
}

#[test]
fn boundary_indices_read_and_write() {
    assert_eq!(
        eval_main(
            "routine main : integer is
               var a : array [5] of integer
               a[1] := 11
               a[5] := 31
               return a[1] + a[5]
             end"
        ),
        42
    );
}

#[test]
fn multidimensional_array_access() {
    assert_eq!(
        eval_main(
            "type Row is array [3] of integer
             routine main : integer is
               var m : array [2] of Row
               m[2][3] := 77
               return m[2][3]
             end"
        ),
        77
    );
}

#[test]
fn outer_scope_write_from_loop_survives() {
    assert_eq!(
        eval_main(
            "routine main : integer is
               var last : integer is 0
               for i in 1..4 loop last := i end
               return last
             end"
        ),
        4
    );
}

#[test]
fn if_without_else_falls_through() {
    assert_eq!(
        eval_main(
            "routine main : integer is
               var x : integer is 10
               if x > 5 then x := x + 1 end
               if x > 100 then x := 0 end
               return x
             end"
        ),
        11
    );
}

#[test]
fn missing_trailing_return_yields_default_value() {
    assert_eq!(
        eval_main(
            "var g : integer is 5
             routine main : integer is
               g := g + 1
             end"
        ),
        0
    );
}
