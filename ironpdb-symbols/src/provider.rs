//! Symbol provider abstraction.
//!
//! A [`SymbolProvider`] hands the generator one module's complete set of
//! top-level type symbols and, per symbol, its children. Two implementations
//! exist behind the same trait: [`MemorySymbolProvider`], the in-memory store
//! a native-engine adapter populates, and the symbol-file-backed provider in
//! [`crate::parser`]. The generator never special-cases which backend
//! answered.

use crate::error::SymbolError;
use crate::types::{BasicType, BitRange, EnumValue, Module, SymTag, Symbol, SymbolId};
use std::collections::HashMap;

/// Capability abstraction over a debug-information backend.
pub trait SymbolProvider {
    /// Returns the names of all modules the provider knows about.
    fn module_names(&self) -> Vec<String>;

    /// Returns the symbols of one module.
    ///
    /// # Errors
    /// Returns `SymbolError::ModuleNotFound` if the module is unknown.
    fn module(&self, name: &str) -> Result<&Module, SymbolError>;
}

/// In-memory symbol provider.
///
/// Holds fully-materialized [`Module`]s; a native-engine binding fills one of
/// these from its own enumeration APIs, and tests build one directly through
/// [`ModuleBuilder`].
#[derive(Debug, Default)]
pub struct MemorySymbolProvider {
    modules: HashMap<String, Module>,
}

impl MemorySymbolProvider {
    /// Creates an empty provider.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserts a module, replacing any module with the same name.
    pub fn insert_module(&mut self, module: Module) {
        self.modules.insert(module.name.clone(), module);
    }
}

impl SymbolProvider for MemorySymbolProvider {
    fn module_names(&self) -> Vec<String> {
        let mut names: Vec<String> = self.modules.keys().cloned().collect();
        names.sort();
        names
    }

    fn module(&self, name: &str) -> Result<&Module, SymbolError> {
        self.modules
            .get(name)
            .ok_or_else(|| SymbolError::module_not_found(name))
    }
}

/// Builder assembling one [`Module`]'s symbol graph.
///
/// Primitive types are interned per (basic type, size) pair so repeated
/// requests reuse the same synthetic symbol.
#[derive(Debug)]
pub struct ModuleBuilder {
    module: Module,
    primitives: HashMap<(BasicType, u64), SymbolId>,
    global_scope: SymbolId,
}

impl ModuleBuilder {
    /// Creates a builder for a module with the given name.
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        let mut module = Module::new(name);
        let scope = module.add_symbol(Symbol::new(module.name.clone(), SymTag::Exe));
        module.set_global_scope(scope);
        Self {
            module,
            primitives: HashMap::new(),
            global_scope: scope,
        }
    }

    /// Returns (creating on first use) the primitive type symbol for the
    /// given basic type and byte size.
    pub fn basic_type(&mut self, basic: BasicType, size: u64) -> SymbolId {
        if let Some(&id) = self.primitives.get(&(basic, size)) {
            return id;
        }
        let mut symbol = Symbol::new("", SymTag::BaseType);
        symbol.basic_type = Some(basic);
        symbol.size = size;
        let id = self.module.add_symbol(symbol);
        self.primitives.insert((basic, size), id);
        id
    }

    /// Adds a top-level user-defined type.
    ///
    /// A forward-declared placeholder with the same name (see
    /// [`ModuleBuilder::forward_type`]) is filled in rather than duplicated.
    pub fn udt(&mut self, name: impl Into<String>, size: u64) -> SymbolId {
        let name = name.into();
        if let Some(id) = self.module.type_by_name(&name) {
            if let Ok(symbol) = self.module.symbol_mut(id) {
                symbol.tag = SymTag::Udt;
                symbol.size = size;
            }
            return id;
        }
        let mut symbol = Symbol::new(name, SymTag::Udt);
        symbol.size = size;
        let id = self.module.add_symbol(symbol);
        self.module.add_top_level(id);
        id
    }

    /// Adds a top-level enumeration type with its literals in order.
    ///
    /// A forward-declared placeholder with the same name is filled in rather
    /// than duplicated.
    pub fn enum_type(
        &mut self,
        name: impl Into<String>,
        basic: BasicType,
        size: u64,
        values: &[(&str, i128)],
    ) -> SymbolId {
        let name = name.into();
        let enum_values: Vec<EnumValue> = values
            .iter()
            .map(|(name, value)| EnumValue::new(*name, *value))
            .collect();
        if let Some(id) = self.module.type_by_name(&name) {
            if let Ok(symbol) = self.module.symbol_mut(id) {
                symbol.tag = SymTag::Enum;
                symbol.basic_type = Some(basic);
                symbol.size = size;
                symbol.enum_values = enum_values;
            }
            return id;
        }
        let mut symbol = Symbol::new(name, SymTag::Enum);
        symbol.basic_type = Some(basic);
        symbol.size = size;
        symbol.enum_values = enum_values;
        let id = self.module.add_symbol(symbol);
        self.module.add_top_level(id);
        id
    }

    /// Returns the top-level type with the given name, creating an
    /// unresolved placeholder UDT on first reference.
    ///
    /// Used for forward references: a field may name a type whose definition
    /// arrives later; the later [`ModuleBuilder::udt`] or
    /// [`ModuleBuilder::enum_type`] call fills the placeholder in.
    pub fn forward_type(&mut self, name: impl Into<String>) -> SymbolId {
        let name = name.into();
        if let Some(id) = self.module.type_by_name(&name) {
            return id;
        }
        let id = self.module.add_symbol(Symbol::new(name, SymTag::Udt));
        self.module.add_top_level(id);
        id
    }

    /// Adds a pointer type to the given pointee.
    pub fn pointer(&mut self, pointee: SymbolId) -> SymbolId {
        let mut symbol = Symbol::new("", SymTag::Pointer);
        symbol.type_id = Some(pointee);
        symbol.size = 8;
        self.module.add_symbol(symbol)
    }

    /// Adds a fixed-size array type of the given element.
    pub fn array(&mut self, element: SymbolId, count: u64) -> SymbolId {
        let element_size = self
            .module
            .symbol(element)
            .map(|s| s.size)
            .unwrap_or_default();
        let mut symbol = Symbol::new("", SymTag::Array);
        symbol.type_id = Some(element);
        symbol.element_count = Some(count);
        symbol.size = element_size * count;
        self.module.add_symbol(symbol)
    }

    /// Adds a data member to a UDT.
    pub fn field(
        &mut self,
        parent: SymbolId,
        name: impl Into<String>,
        field_type: SymbolId,
        offset: u64,
    ) -> SymbolId {
        let mut symbol = Symbol::new(name, SymTag::Data);
        symbol.type_id = Some(field_type);
        symbol.offset = offset;
        let id = self.module.add_symbol(symbol);
        self.attach_child(parent, id);
        id
    }

    /// Adds a static data member to a UDT.
    pub fn static_field(
        &mut self,
        parent: SymbolId,
        name: impl Into<String>,
        field_type: SymbolId,
    ) -> SymbolId {
        let mut symbol = Symbol::new(name, SymTag::Data);
        symbol.type_id = Some(field_type);
        symbol.is_static = true;
        let id = self.module.add_symbol(symbol);
        self.attach_child(parent, id);
        id
    }

    /// Adds a constant data member to a UDT.
    pub fn constant(
        &mut self,
        parent: SymbolId,
        name: impl Into<String>,
        field_type: SymbolId,
        value: impl Into<String>,
    ) -> SymbolId {
        let mut symbol = Symbol::new(name, SymTag::Data);
        symbol.type_id = Some(field_type);
        symbol.is_static = true;
        symbol.const_value = Some(value.into());
        let id = self.module.add_symbol(symbol);
        self.attach_child(parent, id);
        id
    }

    /// Adds a bit-field member to a UDT.
    pub fn bit_field(
        &mut self,
        parent: SymbolId,
        name: impl Into<String>,
        storage: SymbolId,
        offset: u64,
        position: u32,
        length: u32,
    ) -> SymbolId {
        let mut symbol = Symbol::new(name, SymTag::BitField);
        symbol.type_id = Some(storage);
        symbol.offset = offset;
        symbol.bit_range = Some(BitRange::new(position, length));
        let id = self.module.add_symbol(symbol);
        self.attach_child(parent, id);
        id
    }

    /// Adds a base-class edge to a UDT.
    pub fn base_class(&mut self, derived: SymbolId, base: SymbolId, offset: u64) -> SymbolId {
        let (name, size) = self
            .module
            .symbol(base)
            .map(|s| (s.name.clone(), s.size))
            .unwrap_or_default();
        let mut symbol = Symbol::new(name, SymTag::BaseClass);
        symbol.type_id = Some(base);
        symbol.offset = offset;
        symbol.size = size;
        let id = self.module.add_symbol(symbol);
        self.attach_child(derived, id);
        id
    }

    /// Adds a global datum to the module scope.
    pub fn global(&mut self, name: impl Into<String>, datum_type: SymbolId) -> SymbolId {
        let mut symbol = Symbol::new(name, SymTag::Data);
        symbol.type_id = Some(datum_type);
        symbol.is_static = true;
        let id = self.module.add_symbol(symbol);
        let scope = self.global_scope;
        self.attach_child(scope, id);
        id
    }

    /// Returns the module-scope symbol id.
    #[must_use]
    pub fn global_scope(&self) -> SymbolId {
        self.global_scope
    }

    /// Consumes the builder and returns the assembled module.
    #[must_use]
    pub fn finish(self) -> Module {
        self.module
    }

    /// Consumes the builder and returns a provider holding the module.
    #[must_use]
    pub fn into_provider(self) -> MemorySymbolProvider {
        let mut provider = MemorySymbolProvider::new();
        provider.insert_module(self.finish());
        provider
    }

    fn attach_child(&mut self, parent: SymbolId, child: SymbolId) {
        if let Ok(symbol) = self.module.symbol_mut(parent) {
            symbol.children.push(child);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builder_point_struct() {
        let mut builder = ModuleBuilder::new("mymodule");
        let int4 = builder.basic_type(BasicType::Int, 4);
        let point = builder.udt("Point", 8);
        builder.field(point, "x", int4, 0);
        builder.field(point, "y", int4, 4);
        let module = builder.finish();

        let point_symbol = module.symbol(point).unwrap();
        assert_eq!(point_symbol.children.len(), 2);
        let x = module.symbol(point_symbol.children[0]).unwrap();
        assert_eq!(x.name, "x");
        assert_eq!(x.offset, 0);
        assert_eq!(x.type_id, Some(int4));
    }

    #[test]
    fn test_builder_interns_primitives() {
        let mut builder = ModuleBuilder::new("mymodule");
        let a = builder.basic_type(BasicType::Int, 4);
        let b = builder.basic_type(BasicType::Int, 4);
        let c = builder.basic_type(BasicType::UInt, 4);
        assert_eq!(a, b);
        assert_ne!(a, c);
    }

    #[test]
    fn test_builder_enum() {
        let mut builder = ModuleBuilder::new("mymodule");
        let color = builder.enum_type(
            "Color",
            BasicType::UInt,
            4,
            &[("Red", 0), ("Green", 1), ("Blue", 2)],
        );
        let module = builder.finish();

        let symbol = module.symbol(color).unwrap();
        assert!(symbol.is_enum());
        assert_eq!(symbol.enum_values.len(), 3);
        assert_eq!(symbol.enum_values[2].name, "Blue");
        assert_eq!(symbol.enum_values[2].value, 2);
    }

    #[test]
    fn test_builder_globals() {
        let mut builder = ModuleBuilder::new("mymodule");
        let int4 = builder.basic_type(BasicType::Int, 4);
        builder.global("count", int4);
        let module = builder.finish();

        let scope = module.global_scope().unwrap();
        let scope_symbol = module.symbol(scope).unwrap();
        assert_eq!(scope_symbol.tag, SymTag::Exe);
        assert_eq!(scope_symbol.children.len(), 1);
        let count = module.symbol(scope_symbol.children[0]).unwrap();
        assert_eq!(count.name, "count");
        assert!(count.is_static);
    }

    #[test]
    fn test_builder_bit_field() {
        let mut builder = ModuleBuilder::new("mymodule");
        let uint4 = builder.basic_type(BasicType::UInt, 4);
        let flags = builder.udt("Flags", 4);
        builder.bit_field(flags, "enabled", uint4, 0, 0, 1);
        builder.bit_field(flags, "mode", uint4, 0, 1, 3);
        let module = builder.finish();

        let symbol = module.symbol(flags).unwrap();
        let mode = module.symbol(symbol.children[1]).unwrap();
        assert_eq!(mode.tag, SymTag::BitField);
        assert_eq!(mode.bit_range, Some(BitRange::new(1, 3)));
    }

    #[test]
    fn test_provider_module_lookup() {
        let provider = ModuleBuilder::new("mymodule").into_provider();
        assert_eq!(provider.module_names(), vec!["mymodule".to_string()]);
        assert!(provider.module("mymodule").is_ok());
        assert!(matches!(
            provider.module("other"),
            Err(SymbolError::ModuleNotFound { .. })
        ));
    }

    #[test]
    fn test_forward_type_filled_in_by_definition() {
        let mut builder = ModuleBuilder::new("mymodule");
        let forward = builder.forward_type("Node");
        let defined = builder.udt("Node", 16);
        assert_eq!(forward, defined);

        let module = builder.finish();
        assert_eq!(module.symbol(forward).unwrap().size, 16);
    }

    #[test]
    fn test_forward_type_filled_in_by_enum() {
        let mut builder = ModuleBuilder::new("mymodule");
        let forward = builder.forward_type("Color");
        let defined = builder.enum_type("Color", BasicType::UInt, 4, &[("Red", 0)]);
        assert_eq!(forward, defined);

        let module = builder.finish();
        let symbol = module.symbol(forward).unwrap();
        assert!(symbol.is_enum());
        assert_eq!(symbol.enum_values.len(), 1);
    }

    #[test]
    fn test_array_size() {
        let mut builder = ModuleBuilder::new("mymodule");
        let int4 = builder.basic_type(BasicType::Int, 4);
        let arr = builder.array(int4, 4);
        let module = builder.finish();

        let symbol = module.symbol(arr).unwrap();
        assert_eq!(symbol.size, 16);
        assert_eq!(symbol.element_count, Some(4));
    }
}
