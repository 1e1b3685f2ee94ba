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

mod compiler_tests;
mod scenario_tests;

use wasmparser::Validator;
use wasmtime::{Engine, Instance, Module, Store};

/// Parse, compile, and validate: every test module goes through the real
/// WASM validator before anything executes it.
pub(crate) fn compile_source(source: &str) -> Vec<u8> {
    let mut program = parser::parse(source).expect("test source must parse");
    let bytes = crate::compile(&mut program)
        .unwrap_or_else(|e| panic!("compilation failed: {e}\nsource:\n{source}"));
    Validator::new()
        .validate_all(&bytes)
        .unwrap_or_else(|e| panic!("emitted module is invalid: {e}"));
    bytes
}

/// Instantiate the module and invoke its exported `main: () -> i32`.
pub(crate) fn run_main(bytes: &[u8]) -> Result<i32, wasmtime::Error> {
    let engine = Engine::default();
    let module = Module::from_binary(&engine, bytes)?;
    let mut store = Store::new(&engine, ());
    let instance = Instance::new(&mut store, &module, &[])?;
    let main = instance.get_typed_func::<(), i32>(&mut store, "main")?;
    main.call(&mut store, ())
}

/// Compile and run in one step, panicking on any failure along the way.
pub(crate) fn eval_main(source: &str) -> i32 {
    let bytes = compile_source(source);
    run_main(&bytes).expect("main should not trap")
}
