//! Schema model
//!
//! The immutable Service/Method/Parameter tree built from a service
//! description document. The model is constructed once per run by the
//! [`loader`], consumed read-only by exactly one target generator, and
//! discarded after the artifact is written.

pub mod loader;

use smol_str::SmolStr;

/// One of the logical parameter kinds, independent of any target
/// ecosystem's native spelling.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SemanticType {
    /// A text value
    String,
    /// An integer value
    Int,
    /// A floating-point value
    Float,
    /// A boolean value
    Bool,
}

impl SemanticType {
    /// Resolve a raw type token from the source document.
    ///
    /// Total by contract: an unrecognized token is a valid input that
    /// resolves to [`SemanticType::String`], not an error. Every target
    /// applies this fallback identically.
    #[must_use]
    pub fn resolve(token: &str) -> Self {
        match token {
            "int" => SemanticType::Int,
            "float" => SemanticType::Float,
            "bool" => SemanticType::Bool,
            _ => SemanticType::String,
        }
    }
}

/// A named, typed parameter in a request or response list
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Parameter {
    /// Parameter name as authored in the document
    pub name: SmolStr,
    /// Resolved semantic type
    pub ty: SemanticType,
}

/// A service method with ordered request and response parameter lists
#[derive(Debug, Clone)]
pub struct Method {
    /// Method name as authored in the document
    pub name: SmolStr,
    /// Request parameters, in authoring order
    pub request: Vec<Parameter>,
    /// Response parameters, in authoring order
    pub response: Vec<Parameter>,
}

impl Method {
    /// The sole response parameter, if the response has exactly one.
    ///
    /// Client operations unwrap a single-field response to its bare value;
    /// multi-field responses get a compound return instead.
    #[must_use]
    pub fn single_response(&self) -> Option<&Parameter> {
        match self.response.as_slice() {
            [only] => Some(only),
            _ => None,
        }
    }
}

/// A complete service description
///
/// Method order is the authoring order in the source document and is
/// preserved end-to-end: it determines wire-identifier table order and
/// dispatch-index assignment.
#[derive(Debug, Clone)]
pub struct Service {
    /// Namespace identifier, derived from the document's base filename
    pub namespace: SmolStr,
    /// Service name from the document
    pub name: SmolStr,
    /// Methods in authoring order
    pub methods: Vec<Method>,
}

impl Service {
    /// The `{namespace}.{service}` pair used to register the service with
    /// the runtime.
    #[must_use]
    pub fn qualified_name(&self) -> String {
        format!("{}.{}", self.namespace, self.name)
    }

    /// The wire identifier addressing `method` at runtime:
    /// `/{namespace}.{service}/{method}`.
    ///
    /// Byte-identical regardless of which target generated the client or
    /// server side; this is what makes stubs from different targets
    /// interoperable against the same runtime.
    #[must_use]
    pub fn wire_id(&self, method: &Method) -> String {
        format!("/{}.{}/{}", self.namespace, self.name, method.name)
    }

    /// Wire identifiers for all methods, in schema order.
    #[must_use]
    pub fn wire_ids(&self) -> Vec<String> {
        self.methods.iter().map(|m| self.wire_id(m)).collect()
    }
}
