//! Naming-override mappings.
//!
//! An optional XML document supplies explicit
//! `(module, native name) -> (target name, target namespace)` overrides so a
//! caller can rename or relocate a generated type independent of its native
//! name:
//!
//! ```xml
//! <mappings>
//!     <type module="mymodule" name="std::vector&lt;int&gt;"
//!           rename="IntVector" namespace="MyLib.Containers"/>
//! </mappings>
//! ```

use crate::error::ParseError;
use quick_xml::Reader;
use quick_xml::events::{BytesStart, Event};
use std::collections::HashMap;
use tracing::debug;

/// Externally-supplied naming override for one generated type.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct XmlType {
    /// Explicit target type name.
    pub name: String,
    /// Target namespace, if relocated.
    pub namespace: Option<String>,
}

impl XmlType {
    /// Creates an override carrying only a target name.
    #[must_use]
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            namespace: None,
        }
    }
}

/// Override table keyed by `(module, native name)`.
#[derive(Debug, Clone, Default)]
pub struct TypeMappings {
    map: HashMap<(String, String), XmlType>,
}

impl TypeMappings {
    /// Creates an empty mapping table.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserts one override.
    pub fn insert(
        &mut self,
        module: impl Into<String>,
        native_name: impl Into<String>,
        xml_type: XmlType,
    ) {
        self.map
            .insert((module.into(), native_name.into()), xml_type);
    }

    /// Looks up the override for a native type, if any.
    #[must_use]
    pub fn lookup(&self, module: &str, native_name: &str) -> Option<&XmlType> {
        self.map
            .get(&(module.to_string(), native_name.to_string()))
    }

    /// Returns true if no overrides were supplied.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.map.is_empty()
    }

    /// Returns the number of overrides.
    #[must_use]
    pub fn len(&self) -> usize {
        self.map.len()
    }
}

/// Parses a naming-override document.
///
/// # Errors
/// Returns `ParseError` if the XML is malformed or an entry lacks a required
/// attribute.
pub fn parse_mappings(xml: &str) -> Result<TypeMappings, ParseError> {
    let mut reader = Reader::from_str(xml);
    reader.config_mut().trim_text(true);

    let mut mappings: Option<TypeMappings> = None;
    let mut buf = Vec::new();

    loop {
        match reader.read_event_into(&mut buf) {
            Ok(Event::Start(ref e)) | Ok(Event::Empty(ref e)) => {
                let name_bytes = e.name().as_ref().to_vec();
                let name = std::str::from_utf8(&name_bytes)?;
                match name {
                    "mappings" => {
                        mappings = Some(TypeMappings::new());
                    }
                    "type" => {
                        let mappings = mappings
                            .as_mut()
                            .ok_or_else(|| ParseError::unknown_element("type", "document root"))?;
                        parse_mapping_entry(e, mappings)?;
                    }
                    other => return Err(ParseError::unknown_element(other, "mappings")),
                }
            }
            Ok(Event::Eof) => break,
            Err(e) => return Err(ParseError::Xml(e)),
            _ => {}
        }
        buf.clear();
    }

    let mappings = mappings.ok_or_else(|| ParseError::InvalidStructure {
        message: "no mappings element found".to_string(),
    })?;
    debug!(entries = mappings.len(), "parsed naming overrides");
    Ok(mappings)
}

/// Parses one override entry.
fn parse_mapping_entry(e: &BytesStart<'_>, mappings: &mut TypeMappings) -> Result<(), ParseError> {
    let mut module = None;
    let mut native_name = None;
    let mut rename = None;
    let mut namespace = None;

    for attr in e.attributes().flatten() {
        let key = std::str::from_utf8(attr.key.as_ref())?;
        let value = std::str::from_utf8(&attr.value)?.to_string();
        match key {
            "module" => module = Some(value),
            "name" => native_name = Some(value),
            "rename" => rename = Some(value),
            "namespace" => namespace = Some(value),
            _ => {}
        }
    }

    let module = module.ok_or_else(|| ParseError::missing_attr("type", "module"))?;
    let native_name = native_name.ok_or_else(|| ParseError::missing_attr("type", "name"))?;
    let rename = rename.ok_or_else(|| ParseError::missing_attr("type", "rename"))?;

    mappings.insert(
        module,
        native_name,
        XmlType {
            name: rename,
            namespace,
        },
    );
    Ok(())
}
