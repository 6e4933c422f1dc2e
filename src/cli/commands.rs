//! CLI commands implementation

use crate::codegen::{self, DemoTemplate, DemoTemplates, GenContext, GenerateError, Target};
use crate::schema::loader::{self, SchemaError};
use clap::Parser;
use std::path::PathBuf;
use std::process::ExitCode;
use thiserror::Error;

/// Stub generator for mrpc service descriptions
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Path to the YAML service description
    pub input: PathBuf,

    /// Path of the stub source file to generate
    pub output: PathBuf,

    /// Demo-template association `METHOD=PREFIX`: the named method gets an
    /// illustrative greeting body in targets that support inline handler
    /// bodies (may be repeated)
    #[arg(long = "demo", value_name = "METHOD=PREFIX")]
    pub demos: Vec<String>,
}

/// Generate one target's stub from the parsed arguments.
///
/// # Errors
///
/// Returns a [`CliError`] if the schema cannot be loaded, a demo
/// association is malformed, or generation fails.
pub fn run(target: &dyn Target, cli: &Cli) -> Result<(), CliError> {
    let service = loader::load(&cli.input)?;
    let demos = parse_demos(&cli.demos)?;

    let ctx = GenContext {
        service: &service,
        demos: &demos,
    };
    codegen::generate(target, &ctx, &cli.output)?;

    println!(
        "Generated {} stub at: {}",
        target.name(),
        cli.output.display()
    );

    Ok(())
}

/// Run one target's binary end to end: parse arguments, generate, report.
///
/// Any failure (usage, schema, generation, write) exits 1 with diagnostics
/// on stderr; `--help` and `--version` exit 0.
#[must_use]
pub fn run_target(target: &dyn Target) -> ExitCode {
    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(e) => {
            let _ = e.print();
            return if e.use_stderr() {
                ExitCode::FAILURE
            } else {
                ExitCode::SUCCESS
            };
        }
    };

    match run(target, &cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {e}");
            ExitCode::FAILURE
        }
    }
}

fn parse_demos(args: &[String]) -> Result<DemoTemplates, CliError> {
    let mut demos = DemoTemplates::new();

    for arg in args {
        let (method, prefix) = arg
            .split_once('=')
            .filter(|(m, p)| !m.is_empty() && !p.is_empty())
            .ok_or_else(|| CliError::InvalidDemo(arg.clone()))?;

        demos.insert(
            method.into(),
            DemoTemplate::Greeting {
                prefix: prefix.into(),
            },
        );
    }

    Ok(demos)
}

/// CLI errors
#[derive(Debug, Error)]
pub enum CliError {
    /// The service description could not be loaded
    #[error(transparent)]
    Schema(#[from] SchemaError),

    /// Generation or writing failed
    #[error(transparent)]
    Generate(#[from] GenerateError),

    /// A `--demo` association is not of the form `METHOD=PREFIX`
    #[error("invalid --demo association `{0}`, expected METHOD=PREFIX")]
    InvalidDemo(String),
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::codegen::go::GoTarget;
    use std::fs;

    const GREETER: &str = r"
service:
  name: Greeter
  methods:
    SayHello:
      request:
        name: string
      response:
        message: string
";

    #[test]
    fn test_run_generates_artifact() {
        let dir = tempfile::TempDir::new().unwrap();
        let input = dir.path().join("greet.yaml");
        let output = dir.path().join("greet.go");
        fs::write(&input, GREETER).unwrap();

        let cli = Cli {
            input,
            output: output.clone(),
            demos: vec![],
        };
        run(&GoTarget, &cli).unwrap();

        let artifact = fs::read_to_string(&output).unwrap();
        assert!(artifact.contains("/greet.Greeter/SayHello"));
    }

    #[test]
    fn test_run_missing_input_is_schema_error() {
        let dir = tempfile::TempDir::new().unwrap();
        let cli = Cli {
            input: dir.path().join("absent.yaml"),
            output: dir.path().join("out.go"),
            demos: vec![],
        };

        let result = run(&GoTarget, &cli);
        assert!(matches!(result, Err(CliError::Schema(_))));
        assert!(!dir.path().join("out.go").exists());
    }

    #[test]
    fn test_run_schema_error_writes_nothing() {
        let dir = tempfile::TempDir::new().unwrap();
        let input = dir.path().join("bad.yaml");
        let output = dir.path().join("out.go");
        fs::write(
            &input,
            "service:\n  name: S\n  methods:\n    M:\n      request:\n        x: int\n",
        )
        .unwrap();

        let cli = Cli {
            input,
            output: output.clone(),
            demos: vec![],
        };
        let result = run(&GoTarget, &cli);

        assert!(matches!(result, Err(CliError::Schema(_))));
        assert!(!output.exists());
    }

    #[test]
    fn test_parse_demos() {
        let demos = parse_demos(&["SayHello=Hello".to_string()]).unwrap();
        assert!(matches!(
            demos.get("SayHello"),
            Some(DemoTemplate::Greeting { prefix }) if prefix == "Hello"
        ));

        assert!(matches!(
            parse_demos(&["SayHello".to_string()]),
            Err(CliError::InvalidDemo(_))
        ));
        assert!(matches!(
            parse_demos(&["=Hello".to_string()]),
            Err(CliError::InvalidDemo(_))
        ));
    }

    #[test]
    fn test_cli_parses_positional_arguments() {
        let cli =
            Cli::try_parse_from(["stubgen-go", "in.yaml", "out.go", "--demo", "SayHello=Hello"])
                .unwrap();

        assert_eq!(cli.input, PathBuf::from("in.yaml"));
        assert_eq!(cli.output, PathBuf::from("out.go"));
        assert_eq!(cli.demos, vec!["SayHello=Hello".to_string()]);
    }

    #[test]
    fn test_cli_rejects_missing_arguments() {
        assert!(Cli::try_parse_from(["stubgen-go", "in.yaml"]).is_err());
    }
}
