//! Code generation
//!
//! This module provides stub generation for mrpc service descriptions:
//!
//! - `cpp`: C++ header stubs over the `mrpcpp` runtime
//! - `go`: Go source stubs over the `mrpc` package
//! - `python`: Python source stubs over the `mrpc` module
//!
//! Every target implements the same four-phase [`Target`] contract
//! (identifiers, structures, client, service) and is driven by the shared
//! [`generate`] pipeline, which owns the output buffer and the write-once
//! guarantee: the destination is written in a single operation after all
//! phases succeed, or not at all.

pub mod cpp;
pub mod go;
pub mod python;

use crate::schema::{Method, Parameter, SemanticType, Service};
use indexmap::IndexMap;
use smol_str::SmolStr;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// An illustrative handler body for a declared demo method.
///
/// Demo bodies are driven by an explicit association supplied with the
/// schema, never by matching on a method's business name.
#[derive(Debug, Clone)]
pub enum DemoTemplate {
    /// Set the first string response field to `"{prefix} {first string
    /// request field}"`.
    Greeting {
        /// Greeting word, e.g. `Hello`
        prefix: SmolStr,
    },
}

/// Demo-template associations, keyed by method name
pub type DemoTemplates = IndexMap<SmolStr, DemoTemplate>;

/// Shared immutable inputs for one generation run
#[derive(Debug, Clone, Copy)]
pub struct GenContext<'a> {
    /// The loaded service description
    pub service: &'a Service,
    /// Demo-template associations for this run
    pub demos: &'a DemoTemplates,
}

/// One target ecosystem's stub generator.
///
/// The four phase methods are pure string builders; the pipeline validates
/// the schema's construction-time invariants before any phase runs, so the
/// emitters never fail. Prelude and epilogue are per-target framing
/// (package/imports, namespace braces) around the fixed phase order.
pub trait Target {
    /// Target name as used by the registry and diagnostics
    fn name(&self) -> &'static str;

    /// Emit target framing before the first phase
    fn emit_prelude(&self, _ctx: &GenContext<'_>, _out: &mut String) {}

    /// Phase 1: the wire-identifier table, in schema order.
    ///
    /// This table is the single source of truth; generated code in later
    /// phases references it by index and never re-derives the strings.
    fn emit_identifiers(&self, ctx: &GenContext<'_>, out: &mut String);

    /// Phase 2: request/response types with default and fully-parameterized
    /// construction plus JSON serialize/deserialize
    fn emit_structures(&self, ctx: &GenContext<'_>, out: &mut String);

    /// Phase 3: the client stub with synchronous, asynchronous and callback
    /// calling conventions per method, plus the receive-by-key operation
    fn emit_client(&self, ctx: &GenContext<'_>, out: &mut String);

    /// Phase 4: the abstract service type that registers one handler per
    /// method and delegates to per-method extension points
    fn emit_service(&self, ctx: &GenContext<'_>, out: &mut String);

    /// Emit target framing after the last phase
    fn emit_epilogue(&self, _ctx: &GenContext<'_>, _out: &mut String) {}
}

/// Look up a target generator by name.
#[must_use]
pub fn by_name(name: &str) -> Option<Box<dyn Target>> {
    match name {
        "cpp" => Some(Box::new(cpp::CppTarget)),
        "go" => Some(Box::new(go::GoTarget)),
        "python" => Some(Box::new(python::PythonTarget)),
        _ => None,
    }
}

/// Run the four-phase pipeline for one target and write the artifact.
///
/// All generated text accumulates in an internal buffer; the destination is
/// written only after every phase has run, as a single operation. If
/// validation fails or the destination cannot be written, nothing is
/// written at all.
///
/// # Errors
///
/// Returns a [`GenerateError`] if a construction-time invariant is violated
/// or the destination cannot be written.
pub fn generate(
    target: &dyn Target,
    ctx: &GenContext<'_>,
    dest: &Path,
) -> Result<(), GenerateError> {
    validate(ctx)?;

    let mut out = String::new();
    target.emit_prelude(ctx, &mut out);
    target.emit_identifiers(ctx, &mut out);
    target.emit_structures(ctx, &mut out);
    target.emit_client(ctx, &mut out);
    target.emit_service(ctx, &mut out);
    target.emit_epilogue(ctx, &mut out);

    write_artifact(dest, &out)?;
    Ok(())
}

fn validate(ctx: &GenContext<'_>) -> Result<(), GenerateError> {
    for method in &ctx.service.methods {
        if method.response.is_empty() {
            return Err(GenerateError::EmptyResponse {
                method: method.name.clone(),
            });
        }
    }

    for name in ctx.demos.keys() {
        if !ctx.service.methods.iter().any(|m| m.name == *name) {
            return Err(GenerateError::UnknownDemoMethod {
                method: name.clone(),
            });
        }
    }

    Ok(())
}

fn write_artifact(path: &Path, contents: &str) -> Result<(), WriteError> {
    std::fs::write(path, contents).map_err(|e| WriteError {
        path: path.to_path_buf(),
        source: e,
    })
}

/// Capitalize the first character of an identifier.
///
/// Deterministic and total: the empty string maps to itself. Used by
/// targets whose convention requires exported-field capitalization.
#[must_use]
pub fn capitalize(name: &str) -> String {
    let mut chars = name.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

/// Fields a greeting demo body reads and writes.
pub(crate) struct GreetingFields<'a> {
    /// First string response field, assigned the greeting
    pub response: &'a Parameter,
    /// First string request field, appended to the prefix (if any)
    pub request: Option<&'a Parameter>,
}

/// Resolve the fields a greeting body for `method` would use.
///
/// Returns `None` when the response has no string field; the method then
/// keeps its unimplemented extension-point body.
pub(crate) fn greeting_fields(method: &Method) -> Option<GreetingFields<'_>> {
    let response = method
        .response
        .iter()
        .find(|p| p.ty == SemanticType::String)?;
    let request = method.request.iter().find(|p| p.ty == SemanticType::String);

    Some(GreetingFields { response, request })
}

/// Errors raised while generating an artifact
#[derive(Debug, Error)]
pub enum GenerateError {
    /// A method's response parameter list is empty
    #[error("method `{method}` has an empty response parameter list")]
    EmptyResponse {
        /// Method with the empty response
        method: SmolStr,
    },

    /// A demo template names a method the service does not declare
    #[error("demo template names unknown method `{method}`")]
    UnknownDemoMethod {
        /// The unknown method name
        method: SmolStr,
    },

    /// The destination could not be written
    #[error(transparent)]
    Write(#[from] WriteError),
}

/// The destination artifact could not be created or written
#[derive(Debug, Error)]
#[error("failed to write {}", path.display())]
pub struct WriteError {
    /// Destination path
    pub path: PathBuf,
    /// Underlying IO error
    #[source]
    pub source: std::io::Error,
}
