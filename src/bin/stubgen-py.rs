//! Python stub generator binary
//!
//! Usage: `stubgen-py <input.yaml> <output.py>`

use mrpc_stubgen::cli;
use mrpc_stubgen::codegen::python::PythonTarget;
use std::process::ExitCode;

fn main() -> ExitCode {
    cli::run_target(&PythonTarget)
}
