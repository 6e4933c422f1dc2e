//! Schema loader
//!
//! Converts a raw YAML service description into a [`Service`] model, or
//! fails with a [`SchemaError`]. A failure aborts the entire load; no
//! partial model is ever produced.
//!
//! Document parsing is delegated to `serde_yaml`, whose mapping type is
//! insertion-ordered: method and parameter authoring order survives
//! parsing and is copied into the model's ordered sequences. Duplicate
//! method or parameter names are duplicate mapping keys, which the parser
//! rejects, so uniqueness needs no second check here.

use crate::schema::{Method, Parameter, SemanticType, Service};
use miette::Diagnostic;
use serde_yaml::Value;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Errors raised while loading a service description
#[derive(Debug, Error, Diagnostic)]
pub enum SchemaError {
    /// The document could not be read
    #[error("failed to read {}", path.display())]
    #[diagnostic(code(stubgen::schema::io))]
    Io {
        /// Path that could not be read
        path: PathBuf,
        /// Underlying IO error
        #[source]
        source: std::io::Error,
    },

    /// The document is not parseable YAML
    #[error("failed to parse service description")]
    #[diagnostic(code(stubgen::schema::parse))]
    Parse(#[from] serde_yaml::Error),

    /// The top-level `service` entry is absent
    #[error("document has no `service` entry")]
    #[diagnostic(
        code(stubgen::schema::missing_service),
        help("the top-level document must be a mapping with a `service` entry")
    )]
    MissingService,

    /// `service.name` is absent or not a string
    #[error("`service.name` is missing or not a string")]
    #[diagnostic(code(stubgen::schema::missing_name))]
    MissingName,

    /// `service.methods` is absent or not a mapping
    #[error("`service.methods` is missing or not a mapping")]
    #[diagnostic(code(stubgen::schema::missing_methods))]
    MissingMethods,

    /// `service.methods` declares no methods
    #[error("`service.methods` declares no methods")]
    #[diagnostic(
        code(stubgen::schema::no_methods),
        help("declare at least one method")
    )]
    NoMethods,

    /// A method name is not a plain string key
    #[error("method name is not a string")]
    #[diagnostic(code(stubgen::schema::bad_method_name))]
    BadMethodName,

    /// A method lacks its `request` or `response` block
    #[error("method `{method}` has no `{block}` block")]
    #[diagnostic(code(stubgen::schema::missing_block))]
    MissingBlock {
        /// Method missing the block
        method: String,
        /// Which block is missing (`request` or `response`)
        block: &'static str,
    },

    /// A parameter name is not a plain string key
    #[error("a parameter name in method `{method}` is not a string")]
    #[diagnostic(code(stubgen::schema::bad_parameter_name))]
    BadParameterName {
        /// Method containing the parameter
        method: String,
    },

    /// A parameter value is not a type token
    #[error("parameter `{name}` of method `{method}` is not a type token")]
    #[diagnostic(
        code(stubgen::schema::bad_parameter),
        help("parameter values must be plain type tokens such as `string` or `int`")
    )]
    BadParameter {
        /// Method containing the parameter
        method: String,
        /// Parameter name
        name: String,
    },
}

/// Load a service description from `path`.
///
/// The model's `namespace` is the document's base filename with directory
/// and extension stripped.
///
/// # Errors
///
/// Returns a [`SchemaError`] if the file cannot be read or the document is
/// structurally invalid.
pub fn load(path: &Path) -> Result<Service, SchemaError> {
    let text = std::fs::read_to_string(path).map_err(|e| SchemaError::Io {
        path: path.to_path_buf(),
        source: e,
    })?;

    let namespace = path
        .file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or("unnamed");

    parse_document(&text, namespace)
}

/// Parse a service description from already-read text.
///
/// # Errors
///
/// Returns a [`SchemaError`] if the document is structurally invalid.
pub fn parse_document(text: &str, namespace: &str) -> Result<Service, SchemaError> {
    let doc: Value = serde_yaml::from_str(text)?;

    let service = doc.get("service").ok_or(SchemaError::MissingService)?;

    let name = service
        .get("name")
        .and_then(Value::as_str)
        .ok_or(SchemaError::MissingName)?;

    let method_entries = service
        .get("methods")
        .and_then(Value::as_mapping)
        .ok_or(SchemaError::MissingMethods)?;

    if method_entries.is_empty() {
        return Err(SchemaError::NoMethods);
    }

    let mut methods = Vec::with_capacity(method_entries.len());
    for (key, body) in method_entries {
        let method_name = key.as_str().ok_or(SchemaError::BadMethodName)?;

        methods.push(Method {
            name: method_name.into(),
            request: parameter_list(body, method_name, "request")?,
            response: parameter_list(body, method_name, "response")?,
        });
    }

    Ok(Service {
        namespace: namespace.into(),
        name: name.into(),
        methods,
    })
}

fn parameter_list(
    body: &Value,
    method_name: &str,
    block: &'static str,
) -> Result<Vec<Parameter>, SchemaError> {
    let missing = || SchemaError::MissingBlock {
        method: method_name.to_string(),
        block,
    };

    let node = body.get(block).ok_or_else(missing)?;

    // An explicitly empty block (`request:` with no entries) is a present,
    // empty parameter list, not a structural error.
    if node.is_null() {
        return Ok(Vec::new());
    }

    let entries = node.as_mapping().ok_or_else(missing)?;

    let mut params = Vec::with_capacity(entries.len());
    for (key, token) in entries {
        let name = key.as_str().ok_or_else(|| SchemaError::BadParameterName {
            method: method_name.to_string(),
        })?;

        let token = token.as_str().ok_or_else(|| SchemaError::BadParameter {
            method: method_name.to_string(),
            name: name.to_string(),
        })?;

        params.push(Parameter {
            name: name.into(),
            ty: SemanticType::resolve(token),
        });
    }

    Ok(params)
}

#[cfg(test)]
mod tests {
    use super::*;

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
    fn test_parse_greeter() {
        let service = parse_document(GREETER, "greet").unwrap();

        assert_eq!(service.namespace, "greet");
        assert_eq!(service.name, "Greeter");
        assert_eq!(service.methods.len(), 1);

        let method = &service.methods[0];
        assert_eq!(method.name, "SayHello");
        assert_eq!(method.request.len(), 1);
        assert_eq!(method.request[0].name, "name");
        assert_eq!(method.request[0].ty, SemanticType::String);
        assert_eq!(method.response[0].name, "message");

        assert_eq!(service.wire_ids(), vec!["/greet.Greeter/SayHello"]);
    }

    #[test]
    fn test_parse_preserves_authoring_order() {
        let source = r"
service:
  name: Calc
  methods:
    Add:
      request:
        b: int
        a: int
        flag: bool
      response:
        sum: int
    Sub:
      request:
        a: int
        b: int
      response:
        diff: int
";
        let service = parse_document(source, "calc").unwrap();

        let names: Vec<_> = service.methods.iter().map(|m| m.name.as_str()).collect();
        assert_eq!(names, vec!["Add", "Sub"]);

        let params: Vec<_> = service.methods[0]
            .request
            .iter()
            .map(|p| p.name.as_str())
            .collect();
        assert_eq!(params, vec!["b", "a", "flag"]);
    }

    #[test]
    fn test_unrecognized_type_token_is_not_an_error() {
        let source = r"
service:
  name: Files
  methods:
    Stat:
      request:
        path: filepath
      response:
        size: int
";
        let service = parse_document(source, "files").unwrap();
        assert_eq!(service.methods[0].request[0].ty, SemanticType::String);
    }

    #[test]
    fn test_missing_service_entry() {
        let result = parse_document("methods: {}", "x");
        assert!(matches!(result, Err(SchemaError::MissingService)));
    }

    #[test]
    fn test_missing_name() {
        let result = parse_document("service:\n  methods: {}\n", "x");
        assert!(matches!(result, Err(SchemaError::MissingName)));
    }

    #[test]
    fn test_missing_methods() {
        let result = parse_document("service:\n  name: S\n", "x");
        assert!(matches!(result, Err(SchemaError::MissingMethods)));
    }

    #[test]
    fn test_empty_methods_rejected() {
        let result = parse_document("service:\n  name: S\n  methods: {}\n", "x");
        assert!(matches!(result, Err(SchemaError::NoMethods)));
    }

    #[test]
    fn test_missing_response_block() {
        let source = r"
service:
  name: Greeter
  methods:
    SayHello:
      request:
        name: string
";
        let result = parse_document(source, "greet");
        assert!(matches!(
            result,
            Err(SchemaError::MissingBlock { block: "response", .. })
        ));
    }

    #[test]
    fn test_empty_request_block_is_valid() {
        let source = r"
service:
  name: Pinger
  methods:
    Ping:
      request:
      response:
        pong: bool
";
        let service = parse_document(source, "ping").unwrap();
        assert!(service.methods[0].request.is_empty());
        assert_eq!(service.methods[0].response.len(), 1);
    }

    #[test]
    fn test_unparseable_document() {
        let result = parse_document("service: [unclosed", "x");
        assert!(matches!(result, Err(SchemaError::Parse(_))));
    }

    #[test]
    fn test_non_token_parameter_value() {
        let source = r"
service:
  name: S
  methods:
    M:
      request:
        nested:
          inner: string
      response:
        ok: bool
";
        let result = parse_document(source, "x");
        assert!(matches!(result, Err(SchemaError::BadParameter { .. })));
    }

    #[test]
    fn test_load_derives_namespace_from_file_stem() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("greet.yaml");
        std::fs::write(&path, GREETER).unwrap();

        let service = load(&path).unwrap();
        assert_eq!(service.namespace, "greet");
    }

    #[test]
    fn test_load_missing_file() {
        let result = load(Path::new("/nonexistent/greet.yaml"));
        assert!(matches!(result, Err(SchemaError::Io { .. })));
    }
}
