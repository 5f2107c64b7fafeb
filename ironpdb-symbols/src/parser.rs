//! Symbol-file parser.
//!
//! Parses an XML symbol dump (the portable export of a PDB's type records)
//! into the in-memory symbol model. The expected shape:
//!
//! ```xml
//! <symbols>
//!     <module name="mymodule">
//!         <udt name="Point" size="8">
//!             <field name="x" type="int32" offset="0"/>
//!             <field name="y" type="int32" offset="4"/>
//!         </udt>
//!         <enum name="Color" basicType="uint" size="4">
//!             <value name="Red">0</value>
//!         </enum>
//!         <global name="origin" type="Point*"/>
//!     </module>
//! </symbols>
//! ```
//!
//! Field `type` attributes accept type expressions: a primitive name
//! (`int32`, `uint8`, `float64`, ...), a named type, and `*` / `[N]`
//! suffixes. Names referenced before their definition become placeholder
//! symbols that the later definition fills in.

use crate::error::ParseError;
use crate::provider::{MemorySymbolProvider, ModuleBuilder, SymbolProvider};
use crate::types::{BasicType, Module, SymbolId};
use quick_xml::Reader;
use quick_xml::events::{BytesStart, Event};
use std::path::Path;
use tracing::{debug, trace};

/// Symbol-file-backed provider.
///
/// Interchangeable with the engine-backed provider behind
/// [`SymbolProvider`]; generators never learn which one answered.
#[derive(Debug)]
pub struct XmlSymbolProvider {
    inner: MemorySymbolProvider,
}

impl XmlSymbolProvider {
    /// Parses a symbol file from a string.
    ///
    /// # Errors
    /// Returns `ParseError` if the XML is malformed or contains invalid
    /// symbol elements.
    pub fn from_str(xml: &str) -> Result<Self, ParseError> {
        Ok(Self {
            inner: parse_symbols(xml)?,
        })
    }

    /// Parses a symbol file from disk.
    ///
    /// # Errors
    /// Returns `ParseError` if reading or parsing fails.
    pub fn from_file(path: &Path) -> Result<Self, ParseError> {
        let xml = std::fs::read_to_string(path)?;
        Self::from_str(&xml)
    }
}

impl SymbolProvider for XmlSymbolProvider {
    fn module_names(&self) -> Vec<String> {
        self.inner.module_names()
    }

    fn module(&self, name: &str) -> Result<&Module, crate::error::SymbolError> {
        self.inner.module(name)
    }
}

/// Parses a symbol file into an in-memory provider.
///
/// # Errors
/// Returns `ParseError` if the XML is malformed or contains invalid symbol
/// elements.
pub fn parse_symbols(xml: &str) -> Result<MemorySymbolProvider, ParseError> {
    let mut reader = Reader::from_str(xml);
    reader.config_mut().trim_text(true);

    let mut provider: Option<MemorySymbolProvider> = None;
    let mut buf = Vec::new();

    loop {
        match reader.read_event_into(&mut buf) {
            Ok(Event::Start(ref e)) => {
                let name_bytes = e.name().as_ref().to_vec();
                let name = std::str::from_utf8(&name_bytes)?;
                match name {
                    "symbols" => {
                        provider = Some(MemorySymbolProvider::new());
                    }
                    "module" => {
                        let provider = provider
                            .as_mut()
                            .ok_or_else(|| ParseError::unknown_element("module", "document root"))?;
                        let module = parse_module(&mut reader, e)?;
                        debug!(module = %module.name, symbols = module.len(), "parsed module");
                        provider.insert_module(module);
                    }
                    other => return Err(ParseError::unknown_element(other, "symbols")),
                }
            }
            Ok(Event::Eof) => break,
            Err(e) => return Err(ParseError::Xml(e)),
            _ => {}
        }
        buf.clear();
    }

    provider.ok_or_else(|| ParseError::InvalidStructure {
        message: "no symbols element found".to_string(),
    })
}

/// Parses one module element.
fn parse_module(reader: &mut Reader<&[u8]>, e: &BytesStart<'_>) -> Result<Module, ParseError> {
    let name = require_attr(e, "module", "name")?;
    let mut builder = ModuleBuilder::new(name);
    let mut buf = Vec::new();

    loop {
        match reader.read_event_into(&mut buf) {
            Ok(Event::Start(ref e)) => {
                let name_bytes = e.name().as_ref().to_vec();
                let name = std::str::from_utf8(&name_bytes)?;
                match name {
                    "udt" => parse_udt(reader, e, &mut builder)?,
                    "enum" => parse_enum(reader, e, &mut builder)?,
                    other => return Err(ParseError::unknown_element(other, "module")),
                }
            }
            Ok(Event::Empty(ref e)) => {
                let name_bytes = e.name().as_ref().to_vec();
                let name = std::str::from_utf8(&name_bytes)?;
                match name {
                    "udt" => {
                        // Empty UDT: a definition with no members.
                        let udt_name = require_attr(e, "udt", "name")?;
                        let size = parse_numeric_attr(e, "udt", "size")?.unwrap_or(0);
                        builder.udt(udt_name, size);
                    }
                    "global" => parse_global(e, &mut builder)?,
                    other => return Err(ParseError::unknown_element(other, "module")),
                }
            }
            Ok(Event::End(ref e)) if e.name().as_ref() == b"module" => break,
            Ok(Event::Eof) => {
                return Err(ParseError::InvalidStructure {
                    message: "unterminated module element".to_string(),
                });
            }
            Err(e) => return Err(ParseError::Xml(e)),
            _ => {}
        }
        buf.clear();
    }

    Ok(builder.finish())
}

/// Parses a udt element with its members.
fn parse_udt(
    reader: &mut Reader<&[u8]>,
    e: &BytesStart<'_>,
    builder: &mut ModuleBuilder,
) -> Result<(), ParseError> {
    let name = require_attr(e, "udt", "name")?;
    let size = parse_numeric_attr(e, "udt", "size")?.unwrap_or(0);
    let udt = builder.udt(name.clone(), size);
    trace!(udt = %name, size, "parsed udt");

    let mut buf = Vec::new();
    loop {
        match reader.read_event_into(&mut buf) {
            Ok(Event::Empty(ref e)) | Ok(Event::Start(ref e)) => {
                let name_bytes = e.name().as_ref().to_vec();
                let element = std::str::from_utf8(&name_bytes)?;
                match element {
                    "field" => parse_field(e, builder, udt)?,
                    "base" => {
                        let type_expr = require_attr(e, "base", "type")?;
                        let offset = parse_numeric_attr(e, "base", "offset")?.unwrap_or(0);
                        let base = resolve_type_expr(builder, &type_expr)?;
                        builder.base_class(udt, base, offset);
                    }
                    other => return Err(ParseError::unknown_element(other, "udt")),
                }
            }
            Ok(Event::End(ref e)) if e.name().as_ref() == b"udt" => break,
            Ok(Event::Eof) => {
                return Err(ParseError::InvalidStructure {
                    message: format!("unterminated udt element '{name}'"),
                });
            }
            Err(e) => return Err(ParseError::Xml(e)),
            _ => {}
        }
        buf.clear();
    }

    Ok(())
}

/// Parses one field element into a data, static-data or bit-field member.
fn parse_field(
    e: &BytesStart<'_>,
    builder: &mut ModuleBuilder,
    udt: SymbolId,
) -> Result<(), ParseError> {
    let name = require_attr(e, "field", "name")?;
    let type_expr = require_attr(e, "field", "type")?;
    let field_type = resolve_type_expr(builder, &type_expr)?;
    let offset = parse_numeric_attr(e, "field", "offset")?.unwrap_or(0);
    let bit_position = parse_numeric_attr(e, "field", "bitPosition")?;
    let bit_length = parse_numeric_attr(e, "field", "bitLength")?;
    let is_static = attr(e, "static")?.is_some_and(|v| v == "true");
    let const_value = attr(e, "value")?;

    match (bit_position, bit_length) {
        (Some(position), Some(length)) => {
            builder.bit_field(udt, name, field_type, offset, position as u32, length as u32);
        }
        (None, None) if const_value.is_some() => {
            let value = const_value.unwrap_or_default();
            builder.constant(udt, name, field_type, value);
        }
        (None, None) if is_static => {
            builder.static_field(udt, name, field_type);
        }
        (None, None) => {
            builder.field(udt, name, field_type, offset);
        }
        _ => {
            return Err(ParseError::invalid_attr(
                "field",
                "bitPosition/bitLength",
                "both attributes are required for a bit-field",
            ));
        }
    }

    Ok(())
}

/// Parses an enum element with its literal values.
fn parse_enum(
    reader: &mut Reader<&[u8]>,
    e: &BytesStart<'_>,
    builder: &mut ModuleBuilder,
) -> Result<(), ParseError> {
    let name = require_attr(e, "enum", "name")?;
    let basic_attr = require_attr(e, "enum", "basicType")?;
    let basic = BasicType::parse(&basic_attr)
        .ok_or_else(|| ParseError::invalid_attr("enum", "basicType", basic_attr.clone()))?;
    let size = parse_numeric_attr(e, "enum", "size")?.unwrap_or(0);

    let mut values: Vec<(String, i128)> = Vec::new();
    let mut pending: Option<String> = None;
    let mut buf = Vec::new();

    loop {
        match reader.read_event_into(&mut buf) {
            Ok(Event::Start(ref e)) => {
                let name_bytes = e.name().as_ref().to_vec();
                let element = std::str::from_utf8(&name_bytes)?;
                if element == "value" {
                    pending = Some(require_attr(e, "value", "name")?);
                } else {
                    return Err(ParseError::unknown_element(element, "enum"));
                }
            }
            Ok(Event::Text(ref t)) => {
                if let Some(value_name) = pending.take() {
                    let text = std::str::from_utf8(t.as_ref())?.trim();
                    let value: i128 = text
                        .parse()
                        .map_err(|_| ParseError::invalid_attr("value", "text", text))?;
                    values.push((value_name, value));
                }
            }
            Ok(Event::End(ref e)) if e.name().as_ref() == b"enum" => break,
            Ok(Event::Eof) => {
                return Err(ParseError::InvalidStructure {
                    message: format!("unterminated enum element '{name}'"),
                });
            }
            Err(e) => return Err(ParseError::Xml(e)),
            _ => {}
        }
        buf.clear();
    }

    let value_refs: Vec<(&str, i128)> = values.iter().map(|(n, v)| (n.as_str(), *v)).collect();
    builder.enum_type(name, basic, size, &value_refs);
    Ok(())
}

/// Parses a global element into a module-scope datum.
fn parse_global(e: &BytesStart<'_>, builder: &mut ModuleBuilder) -> Result<(), ParseError> {
    let name = require_attr(e, "global", "name")?;
    let type_expr = require_attr(e, "global", "type")?;
    let datum_type = resolve_type_expr(builder, &type_expr)?;
    builder.global(name, datum_type);
    Ok(())
}

/// Resolves a type expression (`T`, `T*`, `T[N]` and nestings) to a symbol,
/// synthesizing pointer and array symbols as needed.
fn resolve_type_expr(builder: &mut ModuleBuilder, expr: &str) -> Result<SymbolId, ParseError> {
    let expr = expr.trim();
    if expr.is_empty() {
        return Err(ParseError::invalid_type_expr(expr, "empty expression"));
    }

    if let Some(stripped) = expr.strip_suffix('*') {
        let pointee = resolve_type_expr(builder, stripped)?;
        return Ok(builder.pointer(pointee));
    }

    if expr.ends_with(']') {
        let open = expr
            .rfind('[')
            .ok_or_else(|| ParseError::invalid_type_expr(expr, "unmatched ']'"))?;
        let count: u64 = expr[open + 1..expr.len() - 1]
            .trim()
            .parse()
            .map_err(|_| ParseError::invalid_type_expr(expr, "invalid array length"))?;
        let element = resolve_type_expr(builder, &expr[..open])?;
        return Ok(builder.array(element, count));
    }

    if let Some((basic, size)) = primitive_spec(expr) {
        return Ok(builder.basic_type(basic, size));
    }

    Ok(builder.forward_type(expr))
}

/// Maps a primitive type-expression name to its (basic type, size) pair.
fn primitive_spec(name: &str) -> Option<(BasicType, u64)> {
    match name {
        "int8" => Some((BasicType::Int, 1)),
        "int16" => Some((BasicType::Int, 2)),
        "int32" => Some((BasicType::Int, 4)),
        "int64" => Some((BasicType::Int, 8)),
        "uint8" => Some((BasicType::UInt, 1)),
        "uint16" => Some((BasicType::UInt, 2)),
        "uint32" => Some((BasicType::UInt, 4)),
        "uint64" => Some((BasicType::UInt, 8)),
        "long" => Some((BasicType::Long, 4)),
        "ulong" => Some((BasicType::ULong, 4)),
        "long64" => Some((BasicType::Long, 8)),
        "ulong64" => Some((BasicType::ULong, 8)),
        "float32" => Some((BasicType::Float, 4)),
        "float64" => Some((BasicType::Float, 8)),
        "bool" => Some((BasicType::Bool, 1)),
        "char" => Some((BasicType::Char, 1)),
        "wchar" => Some((BasicType::WChar, 2)),
        "void" => Some((BasicType::Void, 0)),
        "hresult" => Some((BasicType::Hresult, 4)),
        _ => None,
    }
}

/// Reads an optional attribute as a string.
fn attr(e: &BytesStart<'_>, name: &str) -> Result<Option<String>, ParseError> {
    for attr in e.attributes().flatten() {
        if attr.key.as_ref() == name.as_bytes() {
            let value = std::str::from_utf8(&attr.value)?;
            return Ok(Some(value.to_string()));
        }
    }
    Ok(None)
}

/// Reads a required attribute as a string.
fn require_attr(e: &BytesStart<'_>, element: &str, name: &str) -> Result<String, ParseError> {
    attr(e, name)?.ok_or_else(|| ParseError::missing_attr(element, name))
}

/// Reads an optional numeric attribute.
fn parse_numeric_attr(
    e: &BytesStart<'_>,
    element: &str,
    name: &str,
) -> Result<Option<u64>, ParseError> {
    match attr(e, name)? {
        Some(value) => {
            let parsed = value
                .parse()
                .map_err(|_| ParseError::invalid_attr(element, name, value))?;
            Ok(Some(parsed))
        }
        None => Ok(None),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{BitRange, SymTag};

    const POINT_XML: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<symbols>
    <module name="mymodule">
        <udt name="Point" size="8">
            <field name="x" type="int32" offset="0"/>
            <field name="y" type="int32" offset="4"/>
        </udt>
        <enum name="Color" basicType="uint" size="4">
            <value name="Red">0</value>
            <value name="Green">1</value>
            <value name="Blue">2</value>
        </enum>
        <global name="origin" type="Point*"/>
    </module>
</symbols>"#;

    #[test]
    fn test_parse_point_module() {
        let provider = parse_symbols(POINT_XML).expect("failed to parse");
        let module = provider.module("mymodule").unwrap();

        let point = module.type_by_name("Point").unwrap();
        let symbol = module.symbol(point).unwrap();
        assert!(symbol.is_udt());
        assert_eq!(symbol.size, 8);
        assert_eq!(symbol.children.len(), 2);

        let y = module.symbol(symbol.children[1]).unwrap();
        assert_eq!(y.name, "y");
        assert_eq!(y.offset, 4);
        let y_type = module.symbol(y.type_id.unwrap()).unwrap();
        assert_eq!(y_type.basic_type, Some(BasicType::Int));
        assert_eq!(y_type.size, 4);
    }

    #[test]
    fn test_parse_enum_values() {
        let provider = parse_symbols(POINT_XML).expect("failed to parse");
        let module = provider.module("mymodule").unwrap();

        let color = module.type_by_name("Color").unwrap();
        let symbol = module.symbol(color).unwrap();
        assert!(symbol.is_enum());
        assert_eq!(symbol.basic_type, Some(BasicType::UInt));
        assert_eq!(symbol.size, 4);
        let names: Vec<&str> = symbol.enum_values.iter().map(|v| v.name.as_str()).collect();
        assert_eq!(names, vec!["Red", "Green", "Blue"]);
        assert_eq!(symbol.enum_values[2].value, 2);
    }

    #[test]
    fn test_parse_global_pointer() {
        let provider = parse_symbols(POINT_XML).expect("failed to parse");
        let module = provider.module("mymodule").unwrap();

        let scope = module.global_scope().unwrap();
        let scope_symbol = module.symbol(scope).unwrap();
        assert_eq!(scope_symbol.children.len(), 1);

        let origin = module.symbol(scope_symbol.children[0]).unwrap();
        assert_eq!(origin.name, "origin");
        let pointer = module.symbol(origin.type_id.unwrap()).unwrap();
        assert_eq!(pointer.tag, SymTag::Pointer);
        let pointee = module.symbol(pointer.type_id.unwrap()).unwrap();
        assert_eq!(pointee.name, "Point");
    }

    #[test]
    fn test_parse_forward_reference() {
        let xml = r#"<symbols>
    <module name="m">
        <udt name="List" size="8">
            <field name="head" type="Node*" offset="0"/>
        </udt>
        <udt name="Node" size="16">
            <field name="next" type="Node*" offset="0"/>
            <field name="value" type="int32" offset="8"/>
        </udt>
    </module>
</symbols>"#;
        let provider = parse_symbols(xml).expect("failed to parse");
        let module = provider.module("m").unwrap();

        let node = module.type_by_name("Node").unwrap();
        let symbol = module.symbol(node).unwrap();
        assert_eq!(symbol.size, 16);
        assert_eq!(symbol.children.len(), 2);

        // The forward reference from List resolved to the same symbol.
        let list = module.type_by_name("List").unwrap();
        let head = module.symbol(module.symbol(list).unwrap().children[0]).unwrap();
        let pointer = module.symbol(head.type_id.unwrap()).unwrap();
        assert_eq!(pointer.type_id, Some(node));
    }

    #[test]
    fn test_parse_bit_field() {
        let xml = r#"<symbols>
    <module name="m">
        <udt name="Flags" size="4">
            <field name="enabled" type="uint32" offset="0" bitPosition="0" bitLength="1"/>
            <field name="mode" type="uint32" offset="0" bitPosition="1" bitLength="3"/>
        </udt>
    </module>
</symbols>"#;
        let provider = parse_symbols(xml).expect("failed to parse");
        let module = provider.module("m").unwrap();

        let flags = module.type_by_name("Flags").unwrap();
        let symbol = module.symbol(flags).unwrap();
        let mode = module.symbol(symbol.children[1]).unwrap();
        assert_eq!(mode.tag, SymTag::BitField);
        assert_eq!(mode.bit_range, Some(BitRange::new(1, 3)));
    }

    #[test]
    fn test_parse_array_expression() {
        let xml = r#"<symbols>
    <module name="m">
        <udt name="Buffer" size="16">
            <field name="data" type="int32[4]" offset="0"/>
        </udt>
    </module>
</symbols>"#;
        let provider = parse_symbols(xml).expect("failed to parse");
        let module = provider.module("m").unwrap();

        let buffer = module.type_by_name("Buffer").unwrap();
        let data = module
            .symbol(module.symbol(buffer).unwrap().children[0])
            .unwrap();
        let array = module.symbol(data.type_id.unwrap()).unwrap();
        assert_eq!(array.tag, SymTag::Array);
        assert_eq!(array.element_count, Some(4));
        assert_eq!(array.size, 16);
    }

    #[test]
    fn test_parse_base_class() {
        let xml = r#"<symbols>
    <module name="m">
        <udt name="Shape" size="4">
            <field name="id" type="int32" offset="0"/>
        </udt>
        <udt name="Circle" size="12">
            <base type="Shape" offset="0"/>
            <field name="radius" type="float32" offset="4"/>
        </udt>
    </module>
</symbols>"#;
        let provider = parse_symbols(xml).expect("failed to parse");
        let module = provider.module("m").unwrap();

        let circle = module.type_by_name("Circle").unwrap();
        let symbol = module.symbol(circle).unwrap();
        let base = module.symbol(symbol.children[0]).unwrap();
        assert_eq!(base.tag, SymTag::BaseClass);
        assert_eq!(base.name, "Shape");
    }

    #[test]
    fn test_parse_constant_field() {
        let xml = r#"<symbols>
    <module name="m">
        <udt name="Limits" size="4">
            <field name="max_depth" type="int32" value="16"/>
        </udt>
    </module>
</symbols>"#;
        let provider = parse_symbols(xml).expect("failed to parse");
        let module = provider.module("m").unwrap();

        let limits = module.type_by_name("Limits").unwrap();
        let field = module
            .symbol(module.symbol(limits).unwrap().children[0])
            .unwrap();
        assert!(field.is_static);
        assert_eq!(field.const_value.as_deref(), Some("16"));
    }

    #[test]
    fn test_missing_attribute() {
        let xml = r#"<symbols><module name="m"><udt size="4"></udt></module></symbols>"#;
        let err = parse_symbols(xml).unwrap_err();
        assert!(matches!(err, ParseError::MissingAttribute { .. }));
    }

    #[test]
    fn test_unknown_element() {
        let xml = r#"<symbols><module name="m"><bogus/></module></symbols>"#;
        let err = parse_symbols(xml).unwrap_err();
        assert!(matches!(err, ParseError::UnknownElement { .. }));
    }

    #[test]
    fn test_no_symbols_element() {
        let err = parse_symbols("<other></other>").unwrap_err();
        assert!(matches!(err, ParseError::UnknownElement { .. }));

        let err = parse_symbols("<other/>").unwrap_err();
        assert!(matches!(err, ParseError::InvalidStructure { .. }));
    }

    #[test]
    fn test_invalid_type_expression() {
        let xml = r#"<symbols>
    <module name="m">
        <udt name="Bad" size="4">
            <field name="f" type="int32[x]" offset="0"/>
        </udt>
    </module>
</symbols>"#;
        let err = parse_symbols(xml).unwrap_err();
        assert!(matches!(err, ParseError::InvalidTypeExpression { .. }));
    }

    #[test]
    fn test_xml_symbol_provider_from_str() {
        let provider = XmlSymbolProvider::from_str(POINT_XML).expect("failed to parse");
        assert_eq!(provider.module_names(), vec!["mymodule".to_string()]);
        assert!(provider.module("mymodule").is_ok());
    }
}
