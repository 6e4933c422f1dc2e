//! mrpc-stubgen: client/server stub generation for mrpc services
//!
//! A service description (YAML) enumerates methods, each with named, typed
//! request and response parameter lists. From one immutable schema the
//! generators emit ready-to-compile stub source for three target ecosystems
//! (C++, Go, Python): a wire-identifier table, request/response types with
//! JSON serialize/deserialize, a client stub with synchronous, asynchronous
//! (correlation-key) and callback calling conventions, and an abstract
//! service type that registers one handler per method.
//!
//! # Example
//!
//! ```yaml
//! service:
//!   name: Greeter
//!   methods:
//!     SayHello:
//!       request:
//!         name: string
//!       response:
//!         message: string
//! ```
//!
//! For an input file named `greet.yaml`, every target emits the wire
//! identifier `/greet.Greeter/SayHello`, a `SayHelloRequest`/`SayHelloResponse`
//! pair, a `GreeterClient` stub and an abstract `GreeterService`.

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]

pub mod cli;
pub mod codegen;
pub mod schema;
