//! Device firmware generator.
//!
//! Produces a dispatcher for the text encoding: a `Client` base class with a
//! pure-virtual handler per exchange, a wrapper per exchange that extracts
//! the typed arguments, calls the handler, and prints the response, and a
//! sketch with a `Device` subclass to fill in. Templates are written in
//! generic C++ and rewritten by the chosen dialect.

use crate::case::to_camel_case;
use crate::output::{render, GeneratedFile, FIRMWARE_DIR};
use crate::{GenerateError, GenerateResult};
use hardsync_codec::{
    ARGUMENT_ASSIGNER, ARGUMENT_BEGINNER, ARGUMENT_DELIMITER, ARGUMENT_ENDER, EXCHANGE_TERMINATOR,
};
use hardsync_contract::{
    Contract, Exchange, Field, SemanticType, TypeMapping, ERROR_MESSAGE_FIELD,
};
use hardsync_transpiler::{replacements, CompiledDialect, Replacements};
use std::fmt::Write;
use std::path::Path;

const PARSER_H: &str = include_str!("../templates/parser.h");
const PARSER_CPP: &str = include_str!("../templates/parser.cpp");
const CLIENT_H: &str = include_str!("../templates/client.h");
const CLIENT_CPP: &str = include_str!("../templates/client.cpp");
const FIRMWARE_INO: &str = include_str!("../templates/firmware.ino");

/// Arguments the device parser holds at minimum.
pub const DEFAULT_MAX_ARGS: usize = 10;
/// Decimal places printed for floating-point responses.
pub const FLOAT_PRECISION: u32 = 6;

/// Escape a character for a C string or character literal.
fn c_escape(c: char) -> String {
    match c {
        '\n' => "\\n".to_string(),
        '\r' => "\\r".to_string(),
        '\t' => "\\t".to_string(),
        '"' => "\\\"".to_string(),
        '\'' => "\\'".to_string(),
        '\\' => "\\\\".to_string(),
        other => other.to_string(),
    }
}

// ============================================================================
// Per-exchange Signatures
// ============================================================================

/// The C++ shape of one exchange.
struct Signature<'a> {
    exchange: &'a Exchange,
    camel: String,
    /// Request fields carrying a value, with their target type.
    params: Vec<(&'a Field, &'a str)>,
    /// Response fields carrying a value, with their target type.
    results: Vec<(&'a Field, &'a str)>,
    return_type: String,
}

impl<'a> Signature<'a> {
    fn new(exchange: &'a Exchange, mapping: &'a TypeMapping) -> GenerateResult<Self> {
        let typed = |field: &'a Field| -> GenerateResult<Option<(&'a Field, &'a str)>> {
            if field.ty == SemanticType::None {
                return Ok(None);
            }
            let name = mapping
                .get(field.ty)
                .ok_or(GenerateError::UnmappedType(field.ty))?;
            Ok(Some((field, name)))
        };

        let mut params = Vec::new();
        for field in exchange.request() {
            params.extend(typed(field)?);
        }
        let mut results = Vec::new();
        for field in exchange.response() {
            results.extend(typed(field)?);
        }

        let return_type = match results.as_slice() {
            [] => mapping
                .get(SemanticType::None)
                .ok_or(GenerateError::UnmappedType(SemanticType::None))?
                .to_string(),
            [(_, ty)] => ty.to_string(),
            _ => exchange.message_name(false),
        };

        Ok(Signature {
            exchange,
            camel: to_camel_case(exchange.name()),
            params,
            results,
            return_type,
        })
    }

    fn parameter_list(&self) -> String {
        self.params
            .iter()
            .map(|(field, ty)| format!("{} {}", ty, field.name))
            .collect::<Vec<_>>()
            .join(", ")
    }

    fn argument_list(&self) -> String {
        self.params
            .iter()
            .map(|(field, _)| field.name.as_str())
            .collect::<Vec<_>>()
            .join(", ")
    }

    fn returns_struct(&self) -> bool {
        self.results.len() > 1
    }

    fn default_return(&self) -> Option<String> {
        match self.results.as_slice() {
            [] => None,
            [(field, _)] => Some(
                match field.ty {
                    SemanticType::Float => "0.0",
                    SemanticType::Integer => "0",
                    SemanticType::Text | SemanticType::None => "\"\"",
                }
                .to_string(),
            ),
            _ => Some(format!("{}()", self.return_type)),
        }
    }

    fn response_struct(&self) -> String {
        let mut out = format!("\nstruct {} {{\n", self.return_type);
        for (field, ty) in &self.results {
            let _ = writeln!(out, "    {} {};", ty, field.name);
        }
        out.push_str("};\n");
        out
    }

    fn virtual_declaration(&self) -> String {
        format!(
            "    virtual {} {}({}) const = 0;\n",
            self.return_type,
            self.camel,
            self.parameter_list()
        )
    }

    fn wrapper_declaration(&self) -> String {
        format!(
            "    void {}Wrapper(const ParsedFunction& parsed) const;\n",
            self.camel
        )
    }

    fn respond_invocation(&self) -> String {
        format!(
            "    }} else if (parsed.name == \"{}\") {{\n        this->{}Wrapper(parsed);\n",
            self.exchange.message_name(true),
            self.camel
        )
    }

    fn extractor(field: &Field, ty: &str) -> &'static str {
        match field.ty {
            SemanticType::Float if ty == "float" => "extractFloat",
            SemanticType::Float => "extractDouble",
            SemanticType::Integer => "extractInt",
            SemanticType::Text | SemanticType::None => "extractString",
        }
    }

    fn print_value(out: &mut String, field: &Field, expr: &str) {
        let _ = match field.ty {
            SemanticType::Float => writeln!(out, "    Serial.print({}, FLOAT_PRECISION);", expr),
            SemanticType::Integer => writeln!(out, "    Serial.print({});", expr),
            SemanticType::Text => writeln!(out, "    Serial.print({}.c_str());", expr),
            SemanticType::None => Ok(()),
        };
    }

    fn wrapper_implementation(&self) -> String {
        let mut out = format!(
            "\nvoid Client::{}Wrapper(const ParsedFunction& parsed) const {{\n",
            self.camel
        );
        for (field, ty) in &self.params {
            let _ = writeln!(
                out,
                "    {} {} = {}(parsed, \"{}\");",
                ty,
                field.name,
                Self::extractor(field, ty),
                field.name
            );
        }

        let call = format!("this->{}({});", self.camel, self.argument_list());
        if self.results.is_empty() {
            let _ = writeln!(out, "    {}", call);
        } else {
            let _ = writeln!(out, "    {} result_ = {}", self.return_type, call);
        }

        let _ = writeln!(
            out,
            "    Serial.print(\"{}\");",
            self.exchange.message_name(false)
        );
        out.push_str("    Serial.print(ARGUMENT_BEGINNER);\n");
        for (index, field) in self.exchange.response().iter().enumerate() {
            if index > 0 {
                out.push_str("    Serial.print(ARGUMENT_DELIMITER);\n");
            }
            let _ = writeln!(out, "    Serial.print(\"{}\");", field.name);
            out.push_str("    Serial.print(ARGUMENT_ASSIGNER);\n");
            let expr = if self.returns_struct() {
                format!("result_.{}", field.name)
            } else {
                "result_".to_string()
            };
            Self::print_value(&mut out, field, &expr);
        }
        out.push_str("    Serial.print(ARGUMENT_ENDER);\n");
        out.push_str("    Serial.print(EXCHANGE_TERMINATOR);\n");
        out.push_str("}\n");
        out
    }

    fn handler_stub(&self) -> String {
        let mut out = format!(
            "    {} {}({}) const override {{\n",
            self.return_type,
            self.camel,
            self.parameter_list()
        );
        if let Some(value) = self.default_return() {
            let _ = writeln!(out, "        return {};", value);
        }
        out.push_str("    }\n");
        out
    }
}

// ============================================================================
// Generator
// ============================================================================

/// Generates the device firmware bundle for one contract.
pub struct FirmwareGenerator<'a> {
    contract: &'a Contract,
    dialect: &'a CompiledDialect,
}

impl<'a> FirmwareGenerator<'a> {
    /// Create a generator rewriting its output with `dialect`.
    pub fn new(contract: &'a Contract, dialect: &'a CompiledDialect) -> Self {
        FirmwareGenerator { contract, dialect }
    }

    fn signatures(&self) -> GenerateResult<Vec<Signature<'a>>> {
        self.contract
            .exchanges()
            .iter()
            .map(|exchange| Signature::new(exchange, self.contract.type_mapping()))
            .collect()
    }

    fn replacements(&self, signatures: &[Signature<'_>]) -> Replacements {
        let max_args = self
            .contract
            .exchanges()
            .iter()
            .map(|exchange| exchange.request().len())
            .max()
            .unwrap_or(0)
            .max(DEFAULT_MAX_ARGS);

        let mut response_structs = String::new();
        let mut virtual_declarations = String::new();
        let mut wrapper_declarations = String::new();
        let mut respond_invocations = String::new();
        let mut wrapper_implementations = String::new();
        let mut handler_stubs = Vec::new();
        for signature in signatures {
            if signature.returns_struct() {
                response_structs.push_str(&signature.response_struct());
            }
            virtual_declarations.push_str(&signature.virtual_declaration());
            wrapper_declarations.push_str(&signature.wrapper_declaration());
            respond_invocations.push_str(&signature.respond_invocation());
            wrapper_implementations.push_str(&signature.wrapper_implementation());
            handler_stubs.push(signature.handler_stub());
        }

        replacements([
            ("max_args", max_args.to_string()),
            ("float_precision", FLOAT_PRECISION.to_string()),
            ("argument_beginner", c_escape(ARGUMENT_BEGINNER)),
            ("argument_ender", c_escape(ARGUMENT_ENDER)),
            ("argument_delimiter", c_escape(ARGUMENT_DELIMITER)),
            ("argument_assigner", c_escape(ARGUMENT_ASSIGNER)),
            ("exchange_terminator", c_escape(EXCHANGE_TERMINATOR)),
            ("error_field", ERROR_MESSAGE_FIELD.to_string()),
            (
                "baud_rate",
                self.contract.channel().baud_rate().get().to_string(),
            ),
            ("response_structs", response_structs),
            ("virtual_declarations", virtual_declarations),
            ("wrapper_declarations", wrapper_declarations),
            ("respond_invocations", respond_invocations),
            ("wrapper_implementations", wrapper_implementations),
            ("handler_stubs", handler_stubs.join("\n")),
        ])
    }

    /// Render every firmware file, in a fixed order.
    pub fn generate(&self) -> GenerateResult<Vec<GeneratedFile>> {
        let signatures = self.signatures()?;
        let replacements = self.replacements(&signatures);

        [
            ("parser.h", PARSER_H),
            ("parser.cpp", PARSER_CPP),
            ("client.h", CLIENT_H),
            ("client.cpp", CLIENT_CPP),
            ("firmware.ino", FIRMWARE_INO),
        ]
        .into_iter()
        .map(|(name, template)| {
            let contents = render(name, template, &replacements, Some(self.dialect))?;
            Ok(GeneratedFile::new(Path::new(FIRMWARE_DIR).join(name), contents))
        })
        .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use hardsync_contract::{FieldSet, RawChannel, RawContract, RawExchange};
    use hardsync_transpiler::Target;

    fn contract() -> Contract {
        let raw = RawContract::new()
            .exchange(
                RawExchange::new("MeasureVoltage")
                    .request_field("integration_time", SemanticType::Float)
                    .request_field("channel", SemanticType::Integer)
                    .response_field("voltage", SemanticType::Float),
            )
            .exchange(
                RawExchange::new("Identify")
                    .request(FieldSet::new())
                    .response_field("name", SemanticType::Text)
                    .response_field("revision", SemanticType::Integer),
            )
            .exchange(
                RawExchange::new("Blink")
                    .request_field("count", SemanticType::Integer)
                    .response(FieldSet::new()),
            )
            .channel(RawChannel::new(115_200, ""));
        Contract::load(raw).unwrap()
    }

    fn generate(target: Target) -> Vec<GeneratedFile> {
        let contract = contract();
        let dialect = target.dialect().compile().unwrap();
        FirmwareGenerator::new(&contract, &dialect).generate().unwrap()
    }

    fn file<'f>(files: &'f [GeneratedFile], name: &str) -> &'f str {
        &files
            .iter()
            .find(|file| file.file_name() == name)
            .unwrap()
            .contents
    }

    #[test]
    fn test_c_escape() {
        assert_eq!(c_escape('\n'), "\\n");
        assert_eq!(c_escape('('), "(");
    }

    #[test]
    fn test_file_names_fixed() {
        let names: Vec<_> = generate(Target::Cpp)
            .iter()
            .map(|file| file.path.to_string_lossy().replace('\\', "/"))
            .collect();
        assert_eq!(
            names,
            vec![
                "firmware/parser.h",
                "firmware/parser.cpp",
                "firmware/client.h",
                "firmware/client.cpp",
                "firmware/firmware.ino",
            ]
        );
    }

    #[test]
    fn test_parser_constants_from_codec() {
        let files = generate(Target::Cpp);
        let parser = file(&files, "parser.h");
        assert!(parser.contains("#define ARGUMENT_BEGINNER \"(\""));
        assert!(parser.contains("#define ARGUMENT_ASSIGNER \"=\""));
        assert!(parser.contains("#define EXCHANGE_TERMINATOR \"\\n\""));
        assert!(parser.contains("#define MAX_ARGS 10"));
    }

    #[test]
    fn test_declarations() {
        let files = generate(Target::Cpp);
        let header = file(&files, "client.h");
        assert!(header
            .contains("virtual double measureVoltage(double integration_time, int channel) const = 0;"));
        assert!(header.contains("virtual IdentifyResponse identify() const = 0;"));
        assert!(header.contains("virtual void blink(int count) const = 0;"));
        assert!(header.contains("struct IdentifyResponse {\n    std::string name;\n    int revision;\n};"));
        assert!(header.contains("void measureVoltageWrapper(const ParsedFunction& parsed) const;"));
    }

    #[test]
    fn test_dispatch_covers_every_exchange() {
        let files = generate(Target::Cpp);
        let body = file(&files, "client.cpp");
        assert!(body.contains("Serial.begin(115200);"));
        assert!(body.contains("if (parsed.name == \"PingRequest\")"));
        for (name, wrapper) in [
            ("MeasureVoltageRequest", "measureVoltageWrapper"),
            ("IdentifyRequest", "identifyWrapper"),
            ("BlinkRequest", "blinkWrapper"),
        ] {
            assert!(body.contains(&format!(
                "}} else if (parsed.name == \"{}\") {{\n        this->{}(parsed);",
                name, wrapper
            )));
        }
        assert!(body.contains("this->unidentifiedCommand(parsed.name);"));
    }

    #[test]
    fn test_wrapper_prints_response() {
        let files = generate(Target::Cpp);
        let body = file(&files, "client.cpp");
        assert!(body.contains("double integration_time = extractDouble(parsed, \"integration_time\");"));
        assert!(body.contains("double result_ = this->measureVoltage(integration_time, channel);"));
        assert!(body.contains("Serial.print(result_, FLOAT_PRECISION);"));
        assert!(body.contains("Serial.print(result_.name.c_str());"));
        assert!(body.contains("Serial.print(result_.revision);"));
        assert!(body.contains("    this->blink(count);\n    Serial.print(\"BlinkResponse\");"));
    }

    #[test]
    fn test_sketch_stubs() {
        let files = generate(Target::Cpp);
        let sketch = file(&files, "firmware.ino");
        assert!(sketch.contains("class Device : public Client {"));
        assert!(sketch.contains(
            "    double measureVoltage(double integration_time, int channel) const override {\n        return 0.0;\n    }"
        ));
        assert!(sketch.contains("        return IdentifyResponse();"));
        assert!(sketch.contains("    void blink(int count) const override {\n    }"));
    }

    #[test]
    fn test_arduino_output_has_no_std() {
        for file in generate(Target::Arduino) {
            assert!(!file.contents.contains("std::"), "{}", file.file_name());
            assert!(!file.contents.contains(".substr("), "{}", file.file_name());
            assert!(!file.contents.contains(".find("), "{}", file.file_name());
            assert!(!file.contents.contains("{{"), "{}", file.file_name());
        }
        let files = generate(Target::Arduino);
        let parser = file(&files, "parser.cpp");
        assert!(parser.contains("#include <WString.h>"));
        assert!(parser.contains("return input.substring(start + 1, start + 1 + count);"));
        assert!(parser.contains("return raw.toInt();"));
        assert!(file(&files, "client.h").contains("    String name;"));
    }

    #[test]
    fn test_generation_is_idempotent() {
        assert_eq!(generate(Target::Arduino), generate(Target::Arduino));
    }

    #[test]
    fn test_float_mapping_uses_extract_float() {
        let raw = RawContract::new()
            .exchange(
                RawExchange::new("SetLevel")
                    .request_field("level", SemanticType::Float)
                    .response(FieldSet::new()),
            )
            .type_mapping(TypeMapping::default().with(SemanticType::Float, "float"));
        let contract = Contract::load(raw).unwrap();
        let dialect = Target::Cpp.dialect().compile().unwrap();
        let files = FirmwareGenerator::new(&contract, &dialect).generate().unwrap();
        assert!(file(&files, "client.cpp").contains("float level = extractFloat(parsed, \"level\");"));
    }
}
