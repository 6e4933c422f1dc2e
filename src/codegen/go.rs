//! Go stub generator
//!
//! Emits one Go source file over the `mrpc` runtime package: the method-name
//! table, request/response structs with a JSON string codec, a client with
//! the three calling conventions plus `Receive`, and a service type whose
//! constructor registers a delegating handler per method. Exported struct
//! fields are capitalized per Go convention; json tags keep the authored
//! spelling.

use super::{capitalize, greeting_fields, DemoTemplate, GenContext, Target};
use crate::schema::{Method, Parameter, SemanticType};
use std::fmt::Write;

/// Go target generator
#[derive(Debug, Clone, Copy)]
pub struct GoTarget;

fn go_type(ty: SemanticType) -> &'static str {
    match ty {
        SemanticType::String => "string",
        SemanticType::Int => "int",
        SemanticType::Float => "float64",
        SemanticType::Bool => "bool",
    }
}

/// Comma-joined native types of a response list, for return signatures and
/// callback types.
fn response_types(method: &Method) -> String {
    method
        .response
        .iter()
        .map(|p| go_type(p.ty))
        .collect::<Vec<_>>()
        .join(", ")
}

/// Comma-joined `response.Field` accessors of a response list.
fn response_values(method: &Method) -> String {
    method
        .response
        .iter()
        .map(|p| format!("response.{}", capitalize(&p.name)))
        .collect::<Vec<_>>()
        .join(", ")
}

/// The first response field as a `string` expression, for `Receive`.
///
/// One `Receive` signature serves every method, so non-string fields go
/// through `fmt.Sprint`.
fn first_response_as_string(method: &Method) -> String {
    let first = &method.response[0];
    let accessor = format!("response.{}", capitalize(&first.name));
    if first.ty == SemanticType::String {
        accessor
    } else {
        format!("fmt.Sprint({accessor})")
    }
}

fn emit_struct(out: &mut String, method: &Method, kind: &str, params: &[Parameter]) {
    let type_name = format!("{}{kind}", method.name);

    writeln!(out, "type {type_name} struct {{").unwrap();
    for param in params {
        writeln!(
            out,
            "\t{} {} `json:\"{}\"`",
            capitalize(&param.name),
            go_type(param.ty),
            param.name
        )
        .unwrap();
    }
    writeln!(out, "}}\n").unwrap();

    // The zero value is the default constructor; New* supplies the
    // fully-parameterized one.
    let args = params
        .iter()
        .map(|p| format!("{} {}", p.name, go_type(p.ty)))
        .collect::<Vec<_>>()
        .join(", ");
    writeln!(out, "func New{type_name}({args}) *{type_name} {{").unwrap();
    if params.is_empty() {
        writeln!(out, "\treturn &{type_name}{{}}").unwrap();
    } else {
        writeln!(out, "\treturn &{type_name}{{").unwrap();
        for param in params {
            writeln!(out, "\t\t{}: {},", capitalize(&param.name), param.name).unwrap();
        }
        writeln!(out, "\t}}").unwrap();
    }
    writeln!(out, "}}\n").unwrap();

    writeln!(out, "func (r *{type_name}) ToString() (string, error) {{").unwrap();
    writeln!(out, "\tdata, err := json.Marshal(r)").unwrap();
    writeln!(out, "\tif err != nil {{").unwrap();
    writeln!(out, "\t\treturn \"\", err").unwrap();
    writeln!(out, "\t}}").unwrap();
    writeln!(out, "\treturn string(data), nil").unwrap();
    writeln!(out, "}}\n").unwrap();

    writeln!(out, "func (r *{type_name}) FromString(data string) error {{").unwrap();
    writeln!(out, "\treturn json.Unmarshal([]byte(data), r)").unwrap();
    writeln!(out, "}}\n").unwrap();
}

impl Target for GoTarget {
    fn name(&self) -> &'static str {
        "go"
    }

    fn emit_prelude(&self, ctx: &GenContext<'_>, out: &mut String) {
        writeln!(out, "package {}\n", ctx.service.namespace).unwrap();
        writeln!(out, "import (").unwrap();
        writeln!(out, "\t\"encoding/json\"").unwrap();
        writeln!(out, "\t\"fmt\"").unwrap();
        writeln!(out, "\t\"mrpc\"").unwrap();
        writeln!(out, ")\n").unwrap();
    }

    fn emit_identifiers(&self, ctx: &GenContext<'_>, out: &mut String) {
        writeln!(
            out,
            "var {}_method_names = []string{{",
            ctx.service.name
        )
        .unwrap();
        for method in &ctx.service.methods {
            writeln!(out, "\t\"{}\",", ctx.service.wire_id(method)).unwrap();
        }
        writeln!(out, "}}\n").unwrap();
    }

    fn emit_structures(&self, ctx: &GenContext<'_>, out: &mut String) {
        for method in &ctx.service.methods {
            emit_struct(out, method, "Request", &method.request);
            emit_struct(out, method, "Response", &method.response);
        }
    }

    fn emit_client(&self, ctx: &GenContext<'_>, out: &mut String) {
        let service = ctx.service.name.as_str();

        writeln!(out, "type {service}Client struct {{").unwrap();
        writeln!(out, "\tclient *mrpc.Client").unwrap();
        writeln!(out, "}}\n").unwrap();

        writeln!(out, "func New{service}Client(s string) *{service}Client {{").unwrap();
        writeln!(out, "\treturn &{service}Client{{").unwrap();
        writeln!(out, "\t\tclient: mrpc.NewClient(s),").unwrap();
        writeln!(out, "\t}}").unwrap();
        writeln!(out, "}}\n").unwrap();

        for (index, method) in ctx.service.methods.iter().enumerate() {
            let name = method.name.as_str();

            // Synchronous: single-field responses unwrap, larger ones
            // return a compound value.
            writeln!(
                out,
                "func (h *{service}Client) {name}(request *{name}Request) ({}, error) {{",
                response_types(method)
            )
            .unwrap();
            writeln!(out, "\tresponse := &{name}Response{{}}").unwrap();
            writeln!(
                out,
                "\terr := h.client.Send({service}_method_names[{index}], request, response)"
            )
            .unwrap();
            writeln!(out, "\treturn {}, err", response_values(method)).unwrap();
            writeln!(out, "}}\n").unwrap();

            writeln!(
                out,
                "func (h *{service}Client) Async{name}(request *{name}Request) (string, error) {{"
            )
            .unwrap();
            writeln!(
                out,
                "\treturn h.client.AsyncSend({service}_method_names[{index}], request)"
            )
            .unwrap();
            writeln!(out, "}}\n").unwrap();

            writeln!(
                out,
                "func (h *{service}Client) Callback{name}(request *{name}Request, callback func({}, error)) {{",
                response_types(method)
            )
            .unwrap();
            writeln!(out, "\tresponse := &{name}Response{{}}").unwrap();
            writeln!(
                out,
                "\th.client.CallbackSend({service}_method_names[{index}], request, response, func(err error) {{"
            )
            .unwrap();
            writeln!(out, "\t\tcallback({}, err)", response_values(method)).unwrap();
            writeln!(out, "\t}})").unwrap();
            writeln!(out, "}}\n").unwrap();
        }

        Self::emit_receive(ctx, out);

        writeln!(out, "func (h *{service}Client) Close() {{").unwrap();
        writeln!(out, "\th.client.Close()").unwrap();
        writeln!(out, "}}\n").unwrap();
    }

    fn emit_service(&self, ctx: &GenContext<'_>, out: &mut String) {
        let service = ctx.service.name.as_str();

        writeln!(out, "type {service}Service struct {{").unwrap();
        writeln!(out, "\t*mrpc.MrpcService").unwrap();
        writeln!(out, "}}\n").unwrap();

        writeln!(out, "func New{service}Service() *{service}Service {{").unwrap();
        writeln!(
            out,
            "\tsvc := &{service}Service{{mrpc.NewMrpcService(\"{}\")}}",
            ctx.service.qualified_name()
        )
        .unwrap();
        for (index, method) in ctx.service.methods.iter().enumerate() {
            let name = method.name.as_str();
            writeln!(out, "\tsvc.AddHandler(").unwrap();
            writeln!(out, "\t\t{service}_method_names[{index}],").unwrap();
            writeln!(out, "\t\tfunc() mrpc.Parser {{ return &{name}Request{{}} }},").unwrap();
            writeln!(out, "\t\tfunc() mrpc.Parser {{ return &{name}Response{{}} }},").unwrap();
            writeln!(
                out,
                "\t\tfunc(request mrpc.Parser, response mrpc.Parser) error {{"
            )
            .unwrap();
            writeln!(
                out,
                "\t\t\treturn svc.{name}(request.(*{name}Request), response.(*{name}Response))"
            )
            .unwrap();
            writeln!(out, "\t\t}},").unwrap();
            writeln!(out, "\t)").unwrap();
        }
        writeln!(out, "\treturn svc").unwrap();
        writeln!(out, "}}\n").unwrap();

        for method in &ctx.service.methods {
            let name = method.name.as_str();
            writeln!(
                out,
                "func (s *{service}Service) {name}(request *{name}Request, response *{name}Response) error {{"
            )
            .unwrap();
            match demo_body(ctx, method) {
                Some(body) => {
                    writeln!(out, "\t{body}").unwrap();
                    writeln!(out, "\treturn nil").unwrap();
                }
                None => {
                    writeln!(out, "\treturn fmt.Errorf(\"method {name} not implemented\")")
                        .unwrap();
                }
            }
            writeln!(out, "}}\n").unwrap();
        }

        writeln!(out, "type {service}Server struct {{").unwrap();
        writeln!(out, "\t*mrpc.Server").unwrap();
        writeln!(out, "}}\n").unwrap();

        writeln!(out, "func New{service}Server(addr string) *{service}Server {{").unwrap();
        writeln!(out, "\treturn &{service}Server{{mrpc.NewServer(addr)}}").unwrap();
        writeln!(out, "}}").unwrap();
    }
}

impl GoTarget {
    /// The receive-by-key operation. A one-method service takes only the
    /// correlation key; with two or more methods a discriminator selects the
    /// response type, and an out-of-range index is a dispatch error.
    fn emit_receive(ctx: &GenContext<'_>, out: &mut String) {
        let service = ctx.service.name.as_str();

        if let [method] = ctx.service.methods.as_slice() {
            writeln!(
                out,
                "func (h *{service}Client) Receive(key string) (string, error) {{"
            )
            .unwrap();
            writeln!(out, "\tresponse := &{}Response{{}}", method.name).unwrap();
            writeln!(out, "\terr := h.client.Receive(key, response)").unwrap();
            writeln!(out, "\treturn {}, err", first_response_as_string(method)).unwrap();
            writeln!(out, "}}\n").unwrap();
            return;
        }

        writeln!(
            out,
            "func (h *{service}Client) Receive(key string, methodIndex int) (string, error) {{"
        )
        .unwrap();
        writeln!(out, "\tswitch methodIndex {{").unwrap();
        for (index, method) in ctx.service.methods.iter().enumerate() {
            writeln!(out, "\tcase {index}:").unwrap();
            writeln!(out, "\t\tresponse := &{}Response{{}}", method.name).unwrap();
            writeln!(out, "\t\terr := h.client.Receive(key, response)").unwrap();
            writeln!(out, "\t\treturn {}, err", first_response_as_string(method)).unwrap();
        }
        writeln!(out, "\tdefault:").unwrap();
        writeln!(
            out,
            "\t\treturn \"\", fmt.Errorf(\"unknown method index: %d\", methodIndex)"
        )
        .unwrap();
        writeln!(out, "\t}}").unwrap();
        writeln!(out, "}}\n").unwrap();
    }
}

/// The demo greeting body for `method`, if one is associated and the
/// response has a string field to greet into.
fn demo_body(ctx: &GenContext<'_>, method: &Method) -> Option<String> {
    let DemoTemplate::Greeting { prefix } = ctx.demos.get(&method.name)?;
    let fields = greeting_fields(method)?;

    let target = format!("response.{}", capitalize(&fields.response.name));
    Some(match fields.request {
        Some(req) => format!(
            "{target} = \"{prefix} \" + request.{}",
            capitalize(&req.name)
        ),
        None => format!("{target} = \"{prefix}\""),
    })
}
