//! Generated user-type model.
//!
//! A [`UserType`] is one generated target-language declaration, created once
//! per unique (module, qualified name) by the factory and mutated only while
//! the factory pass resolves names; code emission treats it as immutable.

use crate::typetree::TypeTree;
use ironpdb_symbols::{BitRange, SymbolId, XmlType};

/// Identifier of a user type within the factory registry.
///
/// Type references between generated declarations are registry lookups, not
/// owned values, so cyclic native type graphs never require recursive
/// ownership.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct UserTypeId(pub u32);

impl UserTypeId {
    /// Returns the id as an index.
    #[must_use]
    pub const fn index(self) -> usize {
        self.0 as usize
    }
}

/// Generator variant of a user type.
///
/// The set is closed: the factory's ordered policy picks exactly one variant
/// at creation time.
#[derive(Debug, Clone)]
pub enum UserTypeKind {
    /// Plain struct/class wrapper.
    Plain,
    /// Enumeration.
    Enum,
    /// Template specialization; all specializations of one base template
    /// share a single generated generic declaration.
    Template(TemplateData),
    /// Module-globals holder: every member static.
    Globals,
}

/// Template-specific data of one specialization.
#[derive(Debug, Clone)]
pub struct TemplateData {
    /// Native base template name (scope-qualified, without arguments).
    pub base_name: String,
    /// Native argument strings of this specialization, in order.
    pub args: Vec<String>,
}

/// One generated declaration.
#[derive(Debug, Clone)]
pub struct UserType {
    /// Enclosing module name.
    pub module: String,
    /// Backing symbol.
    pub symbol: SymbolId,
    /// Naming override, if supplied.
    pub xml_type: Option<XmlType>,
    /// Target namespace (may be empty).
    pub namespace: String,
    /// Enclosing generated type, for nested declarations.
    pub declared_in: Option<UserTypeId>,
    /// Computed class name, unique within its namespace scope.
    pub class_name: String,
    /// Native (symbol) name.
    pub native_name: String,
    /// Generator variant.
    pub kind: UserTypeKind,
}

impl UserType {
    /// Returns true if this is the enum variant.
    #[must_use]
    pub const fn is_enum(&self) -> bool {
        matches!(self.kind, UserTypeKind::Enum)
    }

    /// Returns true if this is a template specialization.
    #[must_use]
    pub const fn is_template(&self) -> bool {
        matches!(self.kind, UserTypeKind::Template(_))
    }

    /// Returns true if this is the globals variant.
    #[must_use]
    pub const fn is_globals(&self) -> bool {
        matches!(self.kind, UserTypeKind::Globals)
    }

    /// Returns the template data for template specializations.
    #[must_use]
    pub fn template_data(&self) -> Option<&TemplateData> {
        match &self.kind {
            UserTypeKind::Template(data) => Some(data),
            _ => None,
        }
    }
}

/// One emitted member.
#[derive(Debug, Clone)]
pub struct UserTypeField {
    /// Sanitized field name.
    pub field_name: String,
    /// Sanitized, capitalized, collision-resolved property name.
    pub property_name: String,
    /// Backing native field name.
    pub native_name: String,
    /// Byte offset within the enclosing type.
    pub offset: u64,
    /// Bit range for bit-field members.
    pub bit_range: Option<BitRange>,
    /// Resolved type expression.
    pub type_tree: TypeTree,
    /// True for static members.
    pub is_static: bool,
    /// Literal value for constant members.
    pub const_value: Option<String>,
}

/// Replaces every character not allowed in a target identifier with `_`,
/// prefixing an underscore when the result would start with a digit.
#[must_use]
pub fn sanitize_identifier(name: &str) -> String {
    let mut out = String::with_capacity(name.len());
    for c in name.chars() {
        if c.is_ascii_alphanumeric() || c == '_' {
            out.push(c);
        } else {
            out.push('_');
        }
    }
    if out.chars().next().is_some_and(|c| c.is_ascii_digit()) {
        out.insert(0, '_');
    }
    if out.is_empty() {
        out.push('_');
    }
    out
}

/// Uppercases the first character.
#[must_use]
pub fn capitalize(name: &str) -> String {
    let mut chars = name.chars();
    match chars.next() {
        Some(first) => first.to_ascii_uppercase().to_string() + chars.as_str(),
        None => String::new(),
    }
}

/// Splits a scope-qualified native name at its last top-level `::`,
/// ignoring separators inside template argument lists.
#[must_use]
pub fn split_scoped_name(name: &str) -> Option<(&str, &str)> {
    let bytes = name.as_bytes();
    let mut depth = 0i32;
    let mut split = None;
    let mut i = 0;
    while i < bytes.len() {
        match bytes[i] {
            b'<' => depth += 1,
            b'>' => depth -= 1,
            b':' if depth == 0 && i + 1 < bytes.len() && bytes[i + 1] == b':' => {
                split = Some(i);
                i += 1;
            }
            _ => {}
        }
        i += 1;
    }
    split.map(|i| (&name[..i], &name[i + 2..]))
}

/// Splits a template instantiation name into its base name and top-level
/// argument strings. Returns `None` for non-template names.
#[must_use]
pub fn parse_template_name(name: &str) -> Option<(String, Vec<String>)> {
    if !name.ends_with('>') {
        return None;
    }
    let open = name.find('<')?;
    let base = name[..open].to_string();
    let inner = &name[open + 1..name.len() - 1];

    let mut args = Vec::new();
    let mut depth = 0i32;
    let mut start = 0;
    for (i, c) in inner.char_indices() {
        match c {
            '<' => depth += 1,
            '>' => depth -= 1,
            ',' if depth == 0 => {
                args.push(inner[start..i].trim().to_string());
                start = i + 1;
            }
            _ => {}
        }
    }
    let last = inner[start..].trim();
    if !last.is_empty() {
        args.push(last.to_string());
    }
    Some((base, args))
}
