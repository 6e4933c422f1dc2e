//! C++ stub generator
//!
//! Emits one C++ header over the `mrpcpp` runtime: the method-name array,
//! `mrpc::Parser` classes with an nlohmann-json codec, an `XStub` client
//! with the three calling conventions plus `Receive`, and an abstract
//! `XService` whose constructor registers a handler per method against a
//! pure-virtual extension point. Everything lives in a namespace named
//! after the input document; identifiers keep their authored casing.
//!
//! Demo-template associations are ignored here: the service methods are
//! pure virtual, so there is no place for an illustrative body that would
//! still force the subclass to implement the method.

use super::{GenContext, Target};
use crate::schema::{Method, Parameter, SemanticType};
use std::fmt::Write;

/// C++ target generator
#[derive(Debug, Clone, Copy)]
pub struct CppTarget;

fn cpp_type(ty: SemanticType) -> &'static str {
    match ty {
        SemanticType::String => "std::string",
        SemanticType::Int => "int",
        SemanticType::Float => "float",
        SemanticType::Bool => "bool",
    }
}

fn cpp_default(ty: SemanticType) -> &'static str {
    match ty {
        SemanticType::String => "\"\"",
        SemanticType::Int => "0",
        SemanticType::Float => "0.0f",
        SemanticType::Bool => "false",
    }
}

/// `j.value(...)` assignments restoring each field, with the type-table
/// default for absent fields.
fn from_json_body(params: &[Parameter]) -> String {
    let mut body = String::new();
    for param in params {
        write!(
            body,
            "{} = j.value(\"{}\", {}); ",
            param.name,
            param.name,
            cpp_default(param.ty)
        )
        .unwrap();
    }
    body
}

fn to_json_body(params: &[Parameter]) -> String {
    let pairs = params
        .iter()
        .map(|p| format!("{{\"{}\", {}}}", p.name, p.name))
        .collect::<Vec<_>>()
        .join(",");
    format!("return json{{{pairs}}};")
}

fn constructor_params(params: &[Parameter]) -> String {
    params
        .iter()
        .map(|p| format!("{} {}", cpp_type(p.ty), p.name))
        .collect::<Vec<_>>()
        .join(", ")
}

fn initializer_list(params: &[Parameter]) -> String {
    params
        .iter()
        .map(|p| format!("{}({})", p.name, p.name))
        .collect::<Vec<_>>()
        .join(", ")
}

fn emit_parser_class(out: &mut String, method: &Method, kind: &str, params: &[Parameter]) {
    let class = format!("{}{kind}", method.name);

    writeln!(out, "class {class} : public mrpc::Parser {{").unwrap();
    writeln!(out, "public:").unwrap();
    writeln!(out, "  {class}() {{}}").unwrap();
    // With no parameters the default constructor already covers this.
    if !params.is_empty() {
        writeln!(
            out,
            "  {class}({}) : {} {{}}",
            constructor_params(params),
            initializer_list(params)
        )
        .unwrap();
    }
    writeln!(out).unwrap();

    writeln!(out, "private:").unwrap();
    writeln!(
        out,
        "  json toJson() const override {{ {} }}",
        to_json_body(params)
    )
    .unwrap();
    writeln!(
        out,
        "  void fromJson(const json &j) override {{ {}}}",
        from_json_body(params)
    )
    .unwrap();
    writeln!(out).unwrap();

    writeln!(out, "public:").unwrap();
    for param in params {
        writeln!(out, "  {} {};", cpp_type(param.ty), param.name).unwrap();
    }
    writeln!(out, "}};\n").unwrap();
}

impl Target for CppTarget {
    fn name(&self) -> &'static str {
        "cpp"
    }

    fn emit_prelude(&self, ctx: &GenContext<'_>, out: &mut String) {
        writeln!(out, "#pragma once\n").unwrap();
        writeln!(out, "#include \"mrpcpp/server.h\"").unwrap();
        writeln!(out, "#include \"mrpcpp/client.h\"").unwrap();
        writeln!(out, "#include <string>\n").unwrap();
        writeln!(out, "using json = nlohmann::json;\n").unwrap();
        writeln!(out, "namespace {} {{\n", ctx.service.namespace).unwrap();
    }

    fn emit_identifiers(&self, ctx: &GenContext<'_>, out: &mut String) {
        writeln!(
            out,
            "static const char *{}_method_names[] = {{",
            ctx.service.name
        )
        .unwrap();
        for method in &ctx.service.methods {
            writeln!(out, "    \"{}\",", ctx.service.wire_id(method)).unwrap();
        }
        writeln!(out, "}};\n").unwrap();
    }

    fn emit_structures(&self, ctx: &GenContext<'_>, out: &mut String) {
        for method in &ctx.service.methods {
            emit_parser_class(out, method, "Request", &method.request);
            emit_parser_class(out, method, "Response", &method.response);
        }
    }

    fn emit_client(&self, ctx: &GenContext<'_>, out: &mut String) {
        let service = ctx.service.name.as_str();

        writeln!(out, "class {service}Stub : mrpc::client::MrpcClient {{").unwrap();
        writeln!(out, "public:").unwrap();
        writeln!(
            out,
            "  {service}Stub(const std::string &addr) : mrpc::client::MrpcClient(addr) {{}}\n"
        )
        .unwrap();

        for (index, method) in ctx.service.methods.iter().enumerate() {
            let name = method.name.as_str();

            writeln!(
                out,
                "  mrpc::Status {name}({name}Request &request, {name}Response &response) {{"
            )
            .unwrap();
            writeln!(
                out,
                "    return Send({service}_method_names[{index}], request, response);"
            )
            .unwrap();
            writeln!(out, "  }}\n").unwrap();

            writeln!(
                out,
                "  mrpc::Status Async{name}({name}Request &request, std::string &key) {{"
            )
            .unwrap();
            writeln!(
                out,
                "    return AsyncSend({service}_method_names[{index}], request, key);"
            )
            .unwrap();
            writeln!(out, "  }}\n").unwrap();

            writeln!(
                out,
                "  void Callback{name}({name}Request &request, {name}Response &response,"
            )
            .unwrap();
            writeln!(
                out,
                "                        std::function<void(mrpc::Status)> callback) {{"
            )
            .unwrap();
            writeln!(
                out,
                "    CallbackSend({service}_method_names[{index}], request, response, callback);"
            )
            .unwrap();
            writeln!(out, "  }}\n").unwrap();
        }

        Self::emit_receive(ctx, out);
        writeln!(out, "}};\n").unwrap();
    }

    fn emit_service(&self, ctx: &GenContext<'_>, out: &mut String) {
        let service = ctx.service.name.as_str();

        writeln!(
            out,
            "class {service}Service : public mrpc::server::MrpcService {{"
        )
        .unwrap();
        writeln!(out, "public:").unwrap();
        writeln!(
            out,
            "  {service}Service() : mrpc::server::MrpcService(\"{}\") {{",
            ctx.service.qualified_name()
        )
        .unwrap();
        for (index, method) in ctx.service.methods.iter().enumerate() {
            let name = method.name.as_str();
            writeln!(out, "    AddHandler<{name}Request, {name}Response>(").unwrap();
            writeln!(out, "        {service}_method_names[{index}],").unwrap();
            writeln!(
                out,
                "        [this](const {name}Request &request, {name}Response &response) {{"
            )
            .unwrap();
            writeln!(out, "          return this->{name}(request, response);").unwrap();
            writeln!(out, "        }});").unwrap();
        }
        writeln!(out, "  }}\n").unwrap();

        for method in &ctx.service.methods {
            let name = method.name.as_str();
            writeln!(
                out,
                "  virtual mrpc::Status {name}(const {name}Request &request,"
            )
            .unwrap();
            writeln!(
                out,
                "                                {name}Response &response) = 0;"
            )
            .unwrap();
        }
        writeln!(out, "}};\n").unwrap();
    }

    fn emit_epilogue(&self, ctx: &GenContext<'_>, out: &mut String) {
        writeln!(out, "}} // namespace {}", ctx.service.namespace).unwrap();
    }
}

impl CppTarget {
    /// The receive-by-key operation. A one-method service takes only the
    /// correlation key; with two or more methods a discriminator selects the
    /// response type, and an out-of-range index is a dispatch error. The
    /// first response field is handed back through a string out-parameter,
    /// one signature serving every method.
    fn emit_receive(ctx: &GenContext<'_>, out: &mut String) {
        if let [method] = ctx.service.methods.as_slice() {
            writeln!(
                out,
                "  mrpc::Status Receive(const std::string &key, std::string &value) {{"
            )
            .unwrap();
            Self::emit_receive_body(out, method, "    ");
            writeln!(out, "  }}").unwrap();
            return;
        }

        writeln!(
            out,
            "  mrpc::Status Receive(const std::string &key, int method_index, std::string &value) {{"
        )
        .unwrap();
        writeln!(out, "    switch (method_index) {{").unwrap();
        for (index, method) in ctx.service.methods.iter().enumerate() {
            writeln!(out, "    case {index}: {{").unwrap();
            Self::emit_receive_body(out, method, "      ");
            writeln!(out, "    }}").unwrap();
        }
        writeln!(out, "    default:").unwrap();
        writeln!(
            out,
            "      return mrpc::Status::Error(\"unknown method index\");"
        )
        .unwrap();
        writeln!(out, "    }}").unwrap();
        writeln!(out, "  }}").unwrap();
    }

    fn emit_receive_body(out: &mut String, method: &Method, indent: &str) {
        let first = &method.response[0];
        let value = if first.ty == SemanticType::String {
            format!("response.{}", first.name)
        } else {
            format!("std::to_string(response.{})", first.name)
        };

        writeln!(out, "{indent}{}Response response;", method.name).unwrap();
        writeln!(
            out,
            "{indent}mrpc::Status status = mrpc::client::MrpcClient::Receive(key, response);"
        )
        .unwrap();
        writeln!(out, "{indent}value = {value};").unwrap();
        writeln!(out, "{indent}return status;").unwrap();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::codegen::{generate, DemoTemplates};
    use crate::schema::loader::parse_document;

    fn render(source: &str, namespace: &str) -> String {
        let service = parse_document(source, namespace).unwrap();
        let demos = DemoTemplates::new();
        let ctx = GenContext {
            service: &service,
            demos: &demos,
        };
        let dir = tempfile::TempDir::new().unwrap();
        let dest = dir.path().join("out.h");
        generate(&CppTarget, &ctx, &dest).unwrap();
        std::fs::read_to_string(&dest).unwrap()
    }

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

    const TWO_METHODS: &str = r"
service:
  name: Greeter
  methods:
    SayHello:
      request:
        name: string
      response:
        message: string
    SayGoodbye:
      request:
        name: string
      response:
        message: string
";

    #[test]
    fn test_greeter_scenario() {
        let out = render(GREETER, "greet");

        assert!(out.starts_with("#pragma once"));
        assert!(out.contains("namespace greet {"));
        assert!(out.contains("static const char *Greeter_method_names[] = {"));
        assert!(out.contains("    \"/greet.Greeter/SayHello\","));
        assert!(out.contains("class SayHelloRequest : public mrpc::Parser {"));
        assert!(out.contains("  SayHelloRequest(std::string name) : name(name) {}"));
        assert!(out.contains("class SayHelloResponse : public mrpc::Parser {"));
        assert!(out.contains("class GreeterStub : mrpc::client::MrpcClient {"));
        assert!(out.contains(
            "  mrpc::Status SayHello(SayHelloRequest &request, SayHelloResponse &response) {"
        ));
        assert!(out.contains("    return Send(Greeter_method_names[0], request, response);"));
        assert!(out.contains("class GreeterService : public mrpc::server::MrpcService {"));
        assert!(out.contains("mrpc::server::MrpcService(\"greet.Greeter\")"));
        assert!(out.contains("  virtual mrpc::Status SayHello(const SayHelloRequest &request,"));
        assert!(out.contains("= 0;"));
        assert!(out.trim_end().ends_with("} // namespace greet"));
    }

    #[test]
    fn test_codec_uses_type_defaults() {
        let source = r"
service:
  name: Stats
  methods:
    Report:
      request:
        label: string
        total: int
        ratio: float
        ok: bool
      response:
        done: bool
";
        let out = render(source, "stats");

        assert!(out.contains("label = j.value(\"label\", \"\");"));
        assert!(out.contains("total = j.value(\"total\", 0);"));
        assert!(out.contains("ratio = j.value(\"ratio\", 0.0f);"));
        assert!(out.contains("ok = j.value(\"ok\", false);"));
        assert!(out.contains("return json{{\"done\", done}};"));
    }

    #[test]
    fn test_unknown_type_token_maps_to_string_field() {
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
        let out = render(source, "files");

        assert!(out.contains("  std::string path;"));
        assert!(out.contains("path = j.value(\"path\", \"\");"));
        assert!(out.contains("value = std::to_string(response.size);"));
    }

    #[test]
    fn test_single_method_receive_has_no_discriminator() {
        let out = render(GREETER, "greet");
        assert!(out.contains(
            "  mrpc::Status Receive(const std::string &key, std::string &value) {"
        ));
        assert!(!out.contains("method_index"));
    }

    #[test]
    fn test_multi_method_receive_dispatches_on_discriminator() {
        let out = render(TWO_METHODS, "greet");

        assert!(out.contains(
            "  mrpc::Status Receive(const std::string &key, int method_index, std::string &value) {"
        ));
        assert!(out.contains("    case 0: {"));
        assert!(out.contains("    case 1: {"));
        assert!(!out.contains("    case 2: {"));
        assert!(out.contains("mrpc::Status::Error(\"unknown method index\")"));
    }

    #[test]
    fn test_empty_request_skips_parameterized_constructor() {
        let source = r"
service:
  name: Pinger
  methods:
    Ping:
      request:
      response:
        pong: bool
";
        let out = render(source, "ping");

        assert!(out.contains("  PingRequest() {}"));
        assert!(!out.contains("PingRequest() : "));
        assert!(out.contains("json toJson() const override { return json{}; }"));
    }
}
