//! Symbol model definitions.
//!
//! This module contains the data structures representing native debug symbols
//! as read from a PDB-backed source: user-defined types, enums, fields, base
//! classes, bit-fields and module globals.

use crate::error::SymbolError;
use std::collections::HashMap;

/// Identifier of a symbol within its enclosing [`Module`].
///
/// Symbol graphs contain reference cycles (a type may point to itself or to a
/// mutually-referencing type), so symbols refer to each other by id rather
/// than by ownership.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct SymbolId(pub u32);

impl SymbolId {
    /// Returns the id as an index.
    #[must_use]
    pub const fn index(self) -> usize {
        self.0 as usize
    }
}

/// Symbol tag, mirroring the record kinds a debug-information reader exposes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SymTag {
    /// Module scope symbol; its children are the module globals.
    Exe,
    /// User-defined type (struct/class/union).
    Udt,
    /// Base-class edge within a UDT.
    BaseClass,
    /// Enumeration type.
    Enum,
    /// Function type.
    Function,
    /// Pointer type.
    Pointer,
    /// Fixed-size array type.
    Array,
    /// Built-in primitive type.
    BaseType,
    /// Data member (field or global datum).
    Data,
    /// Bit-field data member.
    BitField,
}

impl SymTag {
    /// Returns true if this tag describes a type rather than a member.
    #[must_use]
    pub const fn is_type(&self) -> bool {
        matches!(
            self,
            Self::Udt | Self::Enum | Self::Pointer | Self::Array | Self::BaseType | Self::Function
        )
    }
}

/// Basic (built-in) type classification of a symbol.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BasicType {
    /// No basic type information.
    NoType,
    /// `void`.
    Void,
    /// Narrow character.
    Char,
    /// Wide character.
    WChar,
    /// Signed integer.
    Int,
    /// Unsigned integer.
    UInt,
    /// Floating point.
    Float,
    /// Boolean.
    Bool,
    /// Signed long integer.
    Long,
    /// Unsigned long integer.
    ULong,
    /// HRESULT-style status code.
    Hresult,
}

impl BasicType {
    /// Parses a basic type from its symbol-file name.
    #[must_use]
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "notype" => Some(Self::NoType),
            "void" => Some(Self::Void),
            "char" => Some(Self::Char),
            "wchar" => Some(Self::WChar),
            "int" => Some(Self::Int),
            "uint" => Some(Self::UInt),
            "float" => Some(Self::Float),
            "bool" => Some(Self::Bool),
            "long" => Some(Self::Long),
            "ulong" => Some(Self::ULong),
            "hresult" => Some(Self::Hresult),
            _ => None,
        }
    }

    /// Returns true if this is a signed integral classification.
    #[must_use]
    pub const fn is_signed(&self) -> bool {
        matches!(self, Self::Int | Self::Long)
    }

    /// Returns true if this is an unsigned integral classification.
    #[must_use]
    pub const fn is_unsigned(&self) -> bool {
        matches!(self, Self::UInt | Self::ULong)
    }

    /// Returns true if this classification can underlie an enum.
    #[must_use]
    pub const fn is_integral(&self) -> bool {
        self.is_signed() || self.is_unsigned()
    }
}

/// Bit range of a bit-field member within its storage unit.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BitRange {
    /// Starting bit position (0-based).
    pub position: u32,
    /// Number of bits.
    pub length: u32,
}

impl BitRange {
    /// Creates a new bit range.
    #[must_use]
    pub const fn new(position: u32, length: u32) -> Self {
        Self { position, length }
    }
}

/// One enum literal: name plus its integral value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EnumValue {
    /// Literal name.
    pub name: String,
    /// Integral value, wide enough for any 64-bit signed or unsigned literal.
    pub value: i128,
}

impl EnumValue {
    /// Creates a new enum value.
    #[must_use]
    pub fn new(name: impl Into<String>, value: i128) -> Self {
        Self {
            name: name.into(),
            value,
        }
    }
}

/// One native type or member descriptor.
///
/// A symbol is a plain record: type references (`type_id`, `children`) are
/// ids into the owning [`Module`], never owned sub-symbols, so cyclic type
/// graphs need no recursive ownership.
#[derive(Debug, Clone)]
pub struct Symbol {
    /// Symbol name (may be empty for synthetic symbols such as pointers).
    pub name: String,
    /// Symbol tag.
    pub tag: SymTag,
    /// Basic type classification, for `BaseType` symbols and enum underlying
    /// types.
    pub basic_type: Option<BasicType>,
    /// Size in bytes.
    pub size: u64,
    /// Byte offset within the enclosing type (members and base classes).
    pub offset: u64,
    /// Bit range for bit-field members.
    pub bit_range: Option<BitRange>,
    /// Referenced type: a member's type, a pointer's pointee, an array's
    /// element type.
    pub type_id: Option<SymbolId>,
    /// Element count for array types.
    pub element_count: Option<u64>,
    /// Children in declaration order: fields and base classes for UDTs,
    /// globals for the module scope symbol.
    pub children: Vec<SymbolId>,
    /// Enum literals in declaration order.
    pub enum_values: Vec<EnumValue>,
    /// True for static data members.
    pub is_static: bool,
    /// Literal value for constant data members.
    pub const_value: Option<String>,
}

impl Symbol {
    /// Creates a new symbol with the given name and tag.
    #[must_use]
    pub fn new(name: impl Into<String>, tag: SymTag) -> Self {
        Self {
            name: name.into(),
            tag,
            basic_type: None,
            size: 0,
            offset: 0,
            bit_range: None,
            type_id: None,
            element_count: None,
            children: Vec::new(),
            enum_values: Vec::new(),
            is_static: false,
            const_value: None,
        }
    }

    /// Returns true if this symbol is an enumeration type.
    #[must_use]
    pub const fn is_enum(&self) -> bool {
        matches!(self.tag, SymTag::Enum)
    }

    /// Returns true if this symbol is a user-defined type.
    #[must_use]
    pub const fn is_udt(&self) -> bool {
        matches!(self.tag, SymTag::Udt)
    }

    /// Returns true if the symbol name carries template argument syntax.
    #[must_use]
    pub fn is_template(&self) -> bool {
        self.name.contains('<') && self.name.ends_with('>')
    }

    /// Looks up an enum literal by name.
    #[must_use]
    pub fn enum_value(&self, name: &str) -> Option<&EnumValue> {
        self.enum_values.iter().find(|v| v.name == name)
    }
}

/// One module's symbols: an arena of [`Symbol`] records plus the set of
/// top-level types and the module-scope symbol holding globals.
#[derive(Debug, Clone)]
pub struct Module {
    /// Module name.
    pub name: String,
    symbols: Vec<Symbol>,
    top_level: Vec<SymbolId>,
    by_name: HashMap<String, SymbolId>,
    global_scope: Option<SymbolId>,
}

impl Module {
    /// Creates a new empty module.
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            symbols: Vec::new(),
            top_level: Vec::new(),
            by_name: HashMap::new(),
            global_scope: None,
        }
    }

    /// Adds a symbol to the module, returning its id.
    pub fn add_symbol(&mut self, symbol: Symbol) -> SymbolId {
        let id = SymbolId(self.symbols.len() as u32);
        self.symbols.push(symbol);
        id
    }

    /// Returns the symbol with the given id.
    ///
    /// # Errors
    /// Returns `SymbolError::SymbolNotFound` if the id does not resolve.
    pub fn symbol(&self, id: SymbolId) -> Result<&Symbol, SymbolError> {
        self.symbols
            .get(id.index())
            .ok_or_else(|| SymbolError::SymbolNotFound {
                id: id.0,
                module: self.name.clone(),
            })
    }

    /// Returns a mutable reference to the symbol with the given id.
    ///
    /// # Errors
    /// Returns `SymbolError::SymbolNotFound` if the id does not resolve.
    pub fn symbol_mut(&mut self, id: SymbolId) -> Result<&mut Symbol, SymbolError> {
        let module = self.name.clone();
        self.symbols
            .get_mut(id.index())
            .ok_or(SymbolError::SymbolNotFound { id: id.0, module })
    }

    /// Registers a symbol as a top-level type, addressable by name.
    pub fn add_top_level(&mut self, id: SymbolId) {
        if let Some(symbol) = self.symbols.get(id.index()) {
            self.by_name.insert(symbol.name.clone(), id);
        }
        self.top_level.push(id);
    }

    /// Returns the top-level type symbols in registration order.
    #[must_use]
    pub fn top_level_types(&self) -> &[SymbolId] {
        &self.top_level
    }

    /// Looks up a top-level type by name.
    #[must_use]
    pub fn type_by_name(&self, name: &str) -> Option<SymbolId> {
        self.by_name.get(name).copied()
    }

    /// Sets the module-scope symbol whose children are the module globals.
    pub fn set_global_scope(&mut self, id: SymbolId) {
        self.global_scope = Some(id);
    }

    /// Returns the module-scope symbol, if one was recorded.
    #[must_use]
    pub fn global_scope(&self) -> Option<SymbolId> {
        self.global_scope
    }

    /// Returns the number of symbols in the module.
    #[must_use]
    pub fn len(&self) -> usize {
        self.symbols.len()
    }

    /// Returns true if the module holds no symbols.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.symbols.is_empty()
    }

    /// Iterates over all symbol ids in the module.
    pub fn ids(&self) -> impl Iterator<Item = SymbolId> + '_ {
        (0..self.symbols.len() as u32).map(SymbolId)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_basic_type_parse() {
        assert_eq!(BasicType::parse("int"), Some(BasicType::Int));
        assert_eq!(BasicType::parse("ulong"), Some(BasicType::ULong));
        assert_eq!(BasicType::parse("bool"), Some(BasicType::Bool));
        assert_eq!(BasicType::parse("unknown"), None);
    }

    #[test]
    fn test_basic_type_signedness() {
        assert!(BasicType::Int.is_signed());
        assert!(BasicType::Long.is_signed());
        assert!(BasicType::UInt.is_unsigned());
        assert!(BasicType::ULong.is_unsigned());
        assert!(!BasicType::Float.is_signed());
        assert!(BasicType::Int.is_integral());
        assert!(!BasicType::Bool.is_integral());
    }

    #[test]
    fn test_sym_tag_is_type() {
        assert!(SymTag::Udt.is_type());
        assert!(SymTag::Enum.is_type());
        assert!(SymTag::Pointer.is_type());
        assert!(!SymTag::Data.is_type());
        assert!(!SymTag::BaseClass.is_type());
    }

    #[test]
    fn test_symbol_is_template() {
        let plain = Symbol::new("Point", SymTag::Udt);
        assert!(!plain.is_template());

        let template = Symbol::new("vector<int>", SymTag::Udt);
        assert!(template.is_template());

        let nested = Symbol::new("map<int,pair<int,int> >", SymTag::Udt);
        assert!(nested.is_template());
    }

    #[test]
    fn test_symbol_enum_value_lookup() {
        let mut symbol = Symbol::new("Color", SymTag::Enum);
        symbol.enum_values.push(EnumValue::new("Red", 0));
        symbol.enum_values.push(EnumValue::new("Green", 1));

        assert_eq!(symbol.enum_value("Green").map(|v| v.value), Some(1));
        assert!(symbol.enum_value("Blue").is_none());
    }

    #[test]
    fn test_module_add_and_lookup() {
        let mut module = Module::new("mymodule");
        let id = module.add_symbol(Symbol::new("Point", SymTag::Udt));
        module.add_top_level(id);

        assert_eq!(module.type_by_name("Point"), Some(id));
        assert!(module.type_by_name("Missing").is_none());
        assert_eq!(module.top_level_types(), &[id]);
        assert_eq!(module.symbol(id).unwrap().name, "Point");
    }

    #[test]
    fn test_module_symbol_not_found() {
        let module = Module::new("mymodule");
        let err = module.symbol(SymbolId(7)).unwrap_err();
        assert!(matches!(err, SymbolError::SymbolNotFound { id: 7, .. }));
    }

    #[test]
    fn test_module_global_scope() {
        let mut module = Module::new("mymodule");
        assert!(module.global_scope().is_none());

        let scope = module.add_symbol(Symbol::new("mymodule", SymTag::Exe));
        module.set_global_scope(scope);
        assert_eq!(module.global_scope(), Some(scope));
    }

    #[test]
    fn test_cyclic_reference_through_ids() {
        // Node holds a Node* field; the cycle is ids, not ownership.
        let mut module = Module::new("mymodule");
        let node = module.add_symbol(Symbol::new("Node", SymTag::Udt));
        let pointer = {
            let mut p = Symbol::new("", SymTag::Pointer);
            p.type_id = Some(node);
            p.size = 8;
            module.add_symbol(p)
        };
        let field = {
            let mut f = Symbol::new("next", SymTag::Data);
            f.type_id = Some(pointer);
            module.add_symbol(f)
        };
        module.symbol_mut(node).unwrap().children.push(field);

        let via_field = module.symbol(field).unwrap().type_id.unwrap();
        let pointee = module.symbol(via_field).unwrap().type_id.unwrap();
        assert_eq!(pointee, node);
    }
}
