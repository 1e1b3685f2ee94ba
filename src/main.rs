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

//! Command-line driver: parse, analyze, emit, write.
//!
//! Exit codes: 0 success, 1 parse or semantic error, 2 emit error, 3 I/O
//! error. Warnings are always reported and never affect the exit code.

use std::fs;
use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;
use thiserror::Error;
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Path to the input source file
    input: PathBuf,
    /// Path for the emitted WebAssembly module
    output: PathBuf,
    /// Dump the AST after semantic analysis
    #[arg(long)]
    dump_ast: bool,
}

#[derive(Debug, Error)]
enum DriverError {
    #[error("{0}")]
    Parse(#[from] parser::ParseError),
    #[error("semantic analysis failed with {0} error(s)")]
    Semantic(usize),
    #[error(transparent)]
    Emit(#[from] wasm::EmitError),
    #[error("{0}")]
    Io(#[from] std::io::Error),
}

impl DriverError {
    fn exit_code(&self) -> u8 {
        match self {
            DriverError::Parse(_) | DriverError::Semantic(_) => 1,
            DriverError::Emit(_) => 2,
            DriverError::Io(_) => 3,
        }
    }
}

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let args = Args::parse();
    match run(&args) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!("{e}");
            ExitCode::from(e.exit_code())
        }
    }
}

fn run(args: &Args) -> Result<(), DriverError> {
    let source = fs::read_to_string(&args.input)?;
    let mut program = parser::parse(&source)?;

    let analysis = semantics::Analyzer::new().analyze(&mut program);
    for warning in analysis.warnings() {
        warn!("{}", warning.message);
    }
    for finding in analysis.errors() {
        error!("{}", finding.message);
    }
    if !analysis.success {
        return Err(DriverError::Semantic(analysis.errors().count()));
    }

    if args.dump_ast {
        print!("{program}");
    }

    let bytes = wasm::emit(&program, &analysis.symbols)?;
    fs::write(&args.output, &bytes)?;
    info!(
        bytes = bytes.len(),
        "wrote {}", args.output.display()
    );
    Ok(())
}
