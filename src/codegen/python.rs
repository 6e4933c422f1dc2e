//! Python stub generator
//!
//! Emits one Python source file over the `mrpc` module: the method-name
//! list, `mrpc.Parser` subclasses with a JSON string codec, a client
//! subclass with the three calling conventions plus `Receive`, and an
//! abstract service subclass whose `__init__` registers a delegating
//! handler per method. Identifiers keep their authored casing.

use super::{greeting_fields, DemoTemplate, GenContext, Target};
use crate::schema::{Method, Parameter, SemanticType};
use std::fmt::Write;

/// Python target generator
#[derive(Debug, Clone, Copy)]
pub struct PythonTarget;

fn py_type(ty: SemanticType) -> &'static str {
    match ty {
        SemanticType::String => "str",
        SemanticType::Int => "int",
        SemanticType::Float => "float",
        SemanticType::Bool => "bool",
    }
}

fn py_default(ty: SemanticType) -> &'static str {
    match ty {
        SemanticType::String => "\"\"",
        SemanticType::Int => "0",
        SemanticType::Float => "0.0",
        SemanticType::Bool => "False",
    }
}

/// The response side of a return annotation: a bare type for single-field
/// responses, `tuple[...]` for compound ones.
fn response_annotation(method: &Method) -> String {
    if let Some(only) = method.single_response() {
        py_type(only.ty).to_string()
    } else {
        let types = method
            .response
            .iter()
            .map(|p| py_type(p.ty))
            .collect::<Vec<_>>()
            .join(", ");
        format!("tuple[{types}]")
    }
}

/// The expression handed back to the caller: a bare field for single-field
/// responses, a tuple for compound ones.
fn response_value(method: &Method) -> String {
    if let Some(only) = method.single_response() {
        format!("response.{}", only.name)
    } else {
        let fields = method
            .response
            .iter()
            .map(|p| format!("response.{}", p.name))
            .collect::<Vec<_>>()
            .join(", ");
        format!("({fields})")
    }
}

fn emit_parser_class(out: &mut String, method: &Method, kind: &str, params: &[Parameter]) {
    let class = format!("{}{kind}", method.name);

    writeln!(out, "class {class}(mrpc.Parser):").unwrap();

    // Default-valued parameters double as the no-argument and the
    // fully-parameterized constructor; defaults come from the type table.
    let mut init = String::from("self");
    for param in params {
        write!(
            init,
            ", {}: {} = {}",
            param.name,
            py_type(param.ty),
            py_default(param.ty)
        )
        .unwrap();
    }
    writeln!(out, "    def __init__({init}):").unwrap();
    if params.is_empty() {
        writeln!(out, "        pass").unwrap();
    } else {
        for param in params {
            writeln!(out, "        self.{} = {}", param.name, param.name).unwrap();
        }
    }
    writeln!(out).unwrap();

    let dump_fields = params
        .iter()
        .map(|p| format!("\"{}\": self.{}", p.name, p.name))
        .collect::<Vec<_>>()
        .join(", ");
    writeln!(out, "    def toString(self) -> str:").unwrap();
    writeln!(out, "        return json.dumps({{{dump_fields}}})").unwrap();
    writeln!(out).unwrap();

    writeln!(out, "    def fromString(self, data: str):").unwrap();
    writeln!(out, "        obj = json.loads(data)").unwrap();
    for param in params {
        writeln!(
            out,
            "        self.{} = obj.get(\"{}\", {})",
            param.name,
            param.name,
            py_default(param.ty)
        )
        .unwrap();
    }
    writeln!(out, "\n").unwrap();
}

impl Target for PythonTarget {
    fn name(&self) -> &'static str {
        "python"
    }

    fn emit_prelude(&self, _ctx: &GenContext<'_>, out: &mut String) {
        writeln!(out, "import mrpc").unwrap();
        writeln!(out, "import json").unwrap();
        writeln!(out, "from typing import Callable\n").unwrap();
        writeln!(out, "Callback = Callable[[str, Exception | None], None]\n\n").unwrap();
    }

    fn emit_identifiers(&self, ctx: &GenContext<'_>, out: &mut String) {
        writeln!(out, "{}_METHOD_NAMES = [", ctx.service.name).unwrap();
        for method in &ctx.service.methods {
            writeln!(out, "    \"{}\",", ctx.service.wire_id(method)).unwrap();
        }
        writeln!(out, "]\n\n").unwrap();
    }

    fn emit_structures(&self, ctx: &GenContext<'_>, out: &mut String) {
        for method in &ctx.service.methods {
            emit_parser_class(out, method, "Request", &method.request);
            emit_parser_class(out, method, "Response", &method.response);
        }
    }

    fn emit_client(&self, ctx: &GenContext<'_>, out: &mut String) {
        let service = ctx.service.name.as_str();

        writeln!(out, "class {service}Client(mrpc.Client):").unwrap();
        writeln!(out, "    def __init__(self, server_address: str):").unwrap();
        writeln!(out, "        super().__init__(server_address)").unwrap();
        writeln!(out).unwrap();

        for (index, method) in ctx.service.methods.iter().enumerate() {
            let name = method.name.as_str();

            writeln!(
                out,
                "    def {name}(self, request: {name}Request) -> tuple[{}, Exception | None]:",
                response_annotation(method)
            )
            .unwrap();
            writeln!(out, "        response = {name}Response()").unwrap();
            writeln!(
                out,
                "        err = super().Send({service}_METHOD_NAMES[{index}], request, response)"
            )
            .unwrap();
            writeln!(out, "        return {}, err", response_value(method)).unwrap();
            writeln!(out).unwrap();

            writeln!(
                out,
                "    def Async{name}(self, request: {name}Request) -> tuple[str, Exception | None]:"
            )
            .unwrap();
            writeln!(
                out,
                "        return super().AsyncSend({service}_METHOD_NAMES[{index}], request)"
            )
            .unwrap();
            writeln!(out).unwrap();

            let callback_types = method
                .response
                .iter()
                .map(|p| py_type(p.ty))
                .collect::<Vec<_>>()
                .join(", ");
            writeln!(
                out,
                "    def Callback{name}(self, request: {name}Request, callback: Callable[[{callback_types}, Exception | None], None]):"
            )
            .unwrap();
            writeln!(out, "        response = {name}Response()").unwrap();
            writeln!(out, "        super().CallbackSend(").unwrap();
            writeln!(out, "            {service}_METHOD_NAMES[{index}],").unwrap();
            writeln!(out, "            request,").unwrap();
            writeln!(out, "            response,").unwrap();
            let callback_values = method
                .response
                .iter()
                .map(|p| format!("response.{}", p.name))
                .collect::<Vec<_>>()
                .join(", ");
            writeln!(
                out,
                "            lambda err: callback({callback_values}, err),"
            )
            .unwrap();
            writeln!(out, "        )").unwrap();
            writeln!(out).unwrap();
        }

        Self::emit_receive(ctx, out);
        writeln!(out).unwrap();
    }

    fn emit_service(&self, ctx: &GenContext<'_>, out: &mut String) {
        let service = ctx.service.name.as_str();

        writeln!(out, "class {service}Service(mrpc.MrpcService):").unwrap();
        writeln!(out, "    def __init__(self):").unwrap();
        writeln!(
            out,
            "        super().__init__(\"{}\")",
            ctx.service.qualified_name()
        )
        .unwrap();
        for (index, method) in ctx.service.methods.iter().enumerate() {
            let name = method.name.as_str();
            writeln!(out, "        self.AddHandler(").unwrap();
            writeln!(
                out,
                "            {service}_METHOD_NAMES[{index}], {name}Request, {name}Response,"
            )
            .unwrap();
            writeln!(
                out,
                "            lambda request, response: self.{name}(request, response)"
            )
            .unwrap();
            writeln!(out, "        )").unwrap();
        }
        writeln!(out).unwrap();

        for method in &ctx.service.methods {
            let name = method.name.as_str();
            writeln!(
                out,
                "    def {name}(self, request: '{name}Request', response: '{name}Response') -> mrpc.MrpcError | None:"
            )
            .unwrap();
            match demo_body(ctx, method) {
                Some(body) => {
                    writeln!(out, "        {body}").unwrap();
                    writeln!(out, "        return None").unwrap();
                }
                None => writeln!(out, "        pass").unwrap(),
            }
            writeln!(out).unwrap();
        }

        writeln!(out, "\nclass {service}Server(mrpc.Server):").unwrap();
        writeln!(out, "    def __init__(self, server_address: str):").unwrap();
        writeln!(out, "        super().__init__(server_address)").unwrap();
    }
}

impl PythonTarget {
    /// The receive-by-key operation. A one-method service takes only the
    /// correlation key; with two or more methods a discriminator selects the
    /// response type, and an out-of-range index is a dispatch error.
    fn emit_receive(ctx: &GenContext<'_>, out: &mut String) {
        if let [method] = ctx.service.methods.as_slice() {
            writeln!(
                out,
                "    def Receive(self, key: str) -> tuple[{}, Exception | None]:",
                response_annotation(method)
            )
            .unwrap();
            writeln!(out, "        response = {}Response()", method.name).unwrap();
            writeln!(out, "        err = super().Receive(key, response)").unwrap();
            writeln!(out, "        return {}, err", response_value(method)).unwrap();
            return;
        }

        writeln!(out, "    def Receive(self, key: str, method_index: int):").unwrap();
        for (index, method) in ctx.service.methods.iter().enumerate() {
            writeln!(out, "        if method_index == {index}:").unwrap();
            writeln!(out, "            response = {}Response()", method.name).unwrap();
            writeln!(out, "            err = super().Receive(key, response)").unwrap();
            writeln!(out, "            return {}, err", response_value(method)).unwrap();
        }
        writeln!(
            out,
            "        return None, Exception(f\"unknown method index: {{method_index}}\")"
        )
        .unwrap();
    }
}

/// The demo greeting body for `method`, if one is associated and the
/// response has a string field to greet into.
fn demo_body(ctx: &GenContext<'_>, method: &Method) -> Option<String> {
    let DemoTemplate::Greeting { prefix } = ctx.demos.get(&method.name)?;
    let fields = greeting_fields(method)?;

    let target = format!("response.{}", fields.response.name);
    Some(match fields.request {
        Some(req) => format!("{target} = \"{prefix} \" + request.{}", req.name),
        None => format!("{target} = \"{prefix}\""),
    })
}
