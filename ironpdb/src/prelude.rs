//! Prelude module for convenient imports.
//!
//! This module re-exports the most commonly used types and traits.
//!
//! ```
//! use ironpdb::prelude::*;
//! ```

// Symbol model
pub use ironpdb_symbols::{
    BasicType, BitRange, EnumValue, Module, ParseError, SymTag, Symbol, SymbolError, SymbolId,
};

// Providers
pub use ironpdb_symbols::{
    MemorySymbolProvider, ModuleBuilder, SymbolProvider, XmlSymbolProvider, parse_symbols,
};

// Overrides and validation
pub use ironpdb_symbols::{TypeMappings, XmlType, parse_mappings, validate_module};

// Code generation
pub use ironpdb_codegen::{
    CodegenError, ErrorLog, GeneratedCode, GenerationOptions, IndentedWriter, TypeTree, UserType,
    UserTypeFactory, UserTypeField, UserTypeId, UserTypeKind, generate_from_file,
    generate_from_xml, generate_module,
};
