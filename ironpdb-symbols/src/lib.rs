//! # IronPDB Symbols
//!
//! Debug-symbol model and symbol providers.
//!
//! This crate provides:
//! - A plain-record symbol model (types, fields, enums, bit-fields, globals)
//! - The [`SymbolProvider`] capability abstraction with in-memory and
//!   symbol-file-backed implementations
//! - XML symbol-file parsing
//! - Naming-override mappings
//! - Symbol graph validation

pub mod error;
pub mod parser;
pub mod provider;
pub mod transform;
pub mod types;
pub mod validation;

pub use error::{ParseError, SymbolError};
pub use parser::{XmlSymbolProvider, parse_symbols};
pub use provider::{MemorySymbolProvider, ModuleBuilder, SymbolProvider};
pub use transform::{TypeMappings, XmlType, parse_mappings};
pub use types::{BasicType, BitRange, EnumValue, Module, SymTag, Symbol, SymbolId};
pub use validation::validate_module;
