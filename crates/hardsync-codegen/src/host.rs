//! Host client generator.
//!
//! Emits a Rust module with the contract's exchanges, channel constants,
//! and a `DeviceClient` with one typed `request_*` method per exchange.

use crate::case::{rust_ident, to_snake_case};
use crate::output::{render, GeneratedFile, HOST_CLIENT_FILE};
use crate::GenerateResult;
use hardsync_contract::{Contract, Exchange, Field, FieldSet, SemanticType};
use hardsync_transpiler::replacements;
use std::fmt::Write;

const CLIENT_RS: &str = include_str!("../templates/client.rs.tmpl");

fn rust_param_type(ty: SemanticType) -> &'static str {
    match ty {
        SemanticType::Float => "f64",
        SemanticType::Integer => "i64",
        SemanticType::Text => "&str",
        SemanticType::None => "()",
    }
}

fn rust_return_type(ty: SemanticType) -> &'static str {
    match ty {
        SemanticType::Text => "String",
        other => rust_param_type(other),
    }
}

fn getter(ty: SemanticType) -> &'static str {
    match ty {
        SemanticType::Float => "float",
        SemanticType::Integer => "integer",
        SemanticType::Text => "text",
        SemanticType::None => "none",
    }
}

fn escape_str(text: &str) -> String {
    text.escape_default().to_string()
}

fn field_set_constructor(fields: &FieldSet) -> String {
    let mut out = String::from("FieldSet::new()");
    for field in fields {
        let _ = write!(
            out,
            "\n                .with(\"{}\", SemanticType::{:?})",
            field.name, field.ty
        );
    }
    out
}

fn exchange_constructor(exchange: &Exchange) -> String {
    let mut out = format!(
        "        Exchange::new(\n            \"{}\",\n            {},\n            {},\n        )",
        exchange.name(),
        field_set_constructor(exchange.request()),
        field_set_constructor(exchange.response())
    );
    if let Some(id) = exchange.binary_id() {
        let bytes: Vec<String> = id.iter().map(|byte| format!("0x{:02X}", byte)).collect();
        let _ = write!(out, "\n        .with_binary_id(vec![{}])", bytes.join(", "));
    }
    out.push_str(",\n");
    out
}

fn valued(fields: &FieldSet) -> Vec<&Field> {
    fields
        .iter()
        .filter(|field| field.ty != SemanticType::None)
        .collect()
}

fn response_struct(exchange: &Exchange) -> Option<String> {
    let results = valued(exchange.response());
    if results.len() < 2 {
        return None;
    }
    let mut out = format!(
        "\n/// Response of the `{}` exchange.\n#[derive(Debug, Clone, PartialEq)]\npub struct {} {{\n",
        exchange.name(),
        exchange.message_name(false)
    );
    for field in results {
        let _ = writeln!(
            out,
            "    pub {}: {},",
            rust_ident(&field.name),
            rust_return_type(field.ty)
        );
    }
    out.push_str("}\n");
    Some(out)
}

fn request_method(exchange: &Exchange) -> String {
    let params = valued(exchange.request());
    let results = valued(exchange.response());

    let signature: Vec<String> = params
        .iter()
        .map(|field| format!("{}: {}", rust_ident(&field.name), rust_param_type(field.ty)))
        .collect();
    let return_type = match results.as_slice() {
        [] => "()".to_string(),
        [field] => rust_return_type(field.ty).to_string(),
        _ => exchange.message_name(false),
    };

    let mut out = format!(
        "\n    /// Perform the `{}` exchange.\n    pub fn request_{}(&mut self{}{}) -> ClientResult<{}> {{\n",
        exchange.name(),
        to_snake_case(exchange.name()),
        if signature.is_empty() { "" } else { ", " },
        signature.join(", "),
        return_type
    );

    let values = if exchange.request().is_empty() {
        "FieldValues::new()".to_string()
    } else {
        let mut entries = String::from("[\n");
        for field in exchange.request() {
            let value = match field.ty {
                SemanticType::None => "FieldValue::None".to_string(),
                _ => format!("FieldValue::from({})", rust_ident(&field.name)),
            };
            let _ = writeln!(
                entries,
                "                (\"{}\".to_string(), {}),",
                field.name, value
            );
        }
        entries.push_str("            ]\n            .into_iter()\n            .collect()");
        entries
    };

    let binding = if results.is_empty() { "" } else { "let response = " };
    let _ = write!(
        out,
        "        {}self.client.request(\n            \"{}\",\n            {},\n        )?;\n",
        binding,
        exchange.name(),
        values
    );

    match results.as_slice() {
        [] => out.push_str("        Ok(())\n"),
        [field] => {
            let _ = writeln!(out, "        response.{}(\"{}\")", getter(field.ty), field.name);
        }
        _ => {
            let _ = writeln!(out, "        Ok({} {{", exchange.message_name(false));
            for field in &results {
                let _ = writeln!(
                    out,
                    "            {}: response.{}(\"{}\")?,",
                    rust_ident(&field.name),
                    getter(field.ty),
                    field.name
                );
            }
            out.push_str("        })\n");
        }
    }
    out.push_str("    }\n");
    out
}

/// Render the host client module.
pub fn generate_host_client(contract: &Contract) -> GenerateResult<GeneratedFile> {
    let exchanges = contract.exchanges();
    let replacements = replacements([
        (
            "baud_rate",
            contract.channel().baud_rate().get().to_string(),
        ),
        ("identifier", escape_str(contract.channel().identifier())),
        ("encoding", format!("{:?}", contract.encoding())),
        (
            "exchange_constructors",
            exchanges.iter().map(exchange_constructor).collect(),
        ),
        (
            "response_structs",
            exchanges.iter().filter_map(response_struct).collect(),
        ),
        (
            "request_methods",
            exchanges.iter().map(request_method).collect(),
        ),
    ]);

    let contents = render(HOST_CLIENT_FILE, CLIENT_RS, &replacements, None)?;
    Ok(GeneratedFile::new(HOST_CLIENT_FILE, contents))
}

#[cfg(test)]
mod tests {
    use super::*;
    use hardsync_contract::{RawChannel, RawContract, RawExchange};

    fn contract() -> Contract {
        let raw = RawContract::new()
            .exchange(
                RawExchange::new("MeasureVoltage")
                    .request_field("integration_time", SemanticType::Float)
                    .request_field("channel", SemanticType::Integer)
                    .response_field("voltage", SemanticType::Float)
                    .binary_id(vec![0x02]),
            )
            .exchange(
                RawExchange::new("Identify")
                    .request(FieldSet::new())
                    .response_field("name", SemanticType::Text)
                    .response_field("type", SemanticType::Integer),
            )
            .exchange(
                RawExchange::new("Blink")
                    .request_field("count", SemanticType::Integer)
                    .response(FieldSet::new()),
            )
            .channel(RawChannel::new(57_600, "A50285BI"));
        Contract::load(raw).unwrap()
    }

    fn client() -> String {
        generate_host_client(&contract()).unwrap().contents
    }

    #[test]
    fn test_constants() {
        let client = client();
        assert!(client.contains("pub const BAUD_RATE: u32 = 57600;"));
        assert!(client.contains("pub const DEVICE_IDENTIFIER: &str = \"A50285BI\";"));
        assert!(client.contains("pub const ENCODING: EncodingKind = EncodingKind::Text;"));
    }

    #[test]
    fn test_exchange_constructors() {
        let client = client();
        assert!(client.contains(
            "        Exchange::new(\n            \"MeasureVoltage\",\n            FieldSet::new()\n                .with(\"integration_time\", SemanticType::Float)\n                .with(\"channel\", SemanticType::Integer),"
        ));
        assert!(client.contains(".with_binary_id(vec![0x02]),"));
    }

    #[test]
    fn test_request_methods() {
        let client = client();
        assert!(client.contains(
            "pub fn request_measure_voltage(&mut self, integration_time: f64, channel: i64) -> ClientResult<f64> {"
        ));
        assert!(client.contains("(\"integration_time\".to_string(), FieldValue::from(integration_time)),"));
        assert!(client.contains("response.float(\"voltage\")"));
        assert!(client.contains("pub fn request_identify(&mut self) -> ClientResult<IdentifyResponse> {"));
        assert!(client.contains("            r#type: response.integer(\"type\")?,"));
        assert!(client.contains("pub fn request_blink(&mut self, count: i64) -> ClientResult<()> {"));
        assert!(client.contains("        Ok(())\n"));
    }

    #[test]
    fn test_response_struct() {
        let client = client();
        assert!(client.contains("pub struct IdentifyResponse {\n    pub name: String,\n    pub r#type: i64,\n}"));
        assert!(!client.contains("pub struct MeasureVoltageResponse"));
    }

    #[test]
    fn test_no_placeholders_left() {
        assert!(!client().contains("{{"));
    }

    #[test]
    fn test_generation_is_idempotent() {
        assert_eq!(client(), client());
    }
}
