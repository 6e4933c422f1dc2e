//! C++ stub generator binary
//!
//! Usage: `stubgen-cpp <input.yaml> <output.h>`

use mrpc_stubgen::cli;
use mrpc_stubgen::codegen::cpp::CppTarget;
use std::process::ExitCode;

fn main() -> ExitCode {
    cli::run_target(&CppTarget)
}
