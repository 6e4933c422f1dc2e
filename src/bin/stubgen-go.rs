//! Go stub generator binary
//!
//! Usage: `stubgen-go <input.yaml> <output.go>`

use mrpc_stubgen::cli;
use mrpc_stubgen::codegen::go::GoTarget;
use std::process::ExitCode;

fn main() -> ExitCode {
    cli::run_target(&GoTarget)
}
