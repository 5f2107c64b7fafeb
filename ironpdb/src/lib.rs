//! # IronPDB
//!
//! Typed wrapper generation from native debug symbols.
//!
//! IronPDB reads PDB-style type records through a symbol-provider
//! abstraction and emits statically-typed C# wrapper classes, so debugger
//! scripts address native memory through named fields instead of raw
//! offsets.
//!
//! ## Quick Start
//!
//! ```
//! use ironpdb::prelude::*;
//!
//! let mut builder = ModuleBuilder::new("mymodule");
//! let int4 = builder.basic_type(BasicType::Int, 4);
//! let point = builder.udt("Point", 8);
//! builder.field(point, "x", int4, 0);
//! builder.field(point, "y", int4, 4);
//! let provider = builder.into_provider();
//!
//! let generated = generate_module(
//!     &provider,
//!     "mymodule",
//!     &TypeMappings::new(),
//!     &GenerationOptions::new(),
//! )
//! .expect("generation failed");
//! assert!(generated.source.contains("class Point"));
//! ```
//!
//! ## Crate Organization
//!
//! - [`symbols`] - Symbol model, providers, symbol-file parsing, validation
//! - [`codegen`] - Type trees, the user-type factory and generator variants

pub mod prelude;

/// Symbol model and providers.
pub mod symbols {
    pub use ironpdb_symbols::*;
}

/// Wrapper code generation.
pub mod codegen {
    pub use ironpdb_codegen::*;
}

// Re-export commonly used items at the crate root
pub use ironpdb_codegen::{
    CodegenError, GeneratedCode, GenerationOptions, UserTypeFactory, generate_from_file,
    generate_from_xml, generate_module,
};
pub use ironpdb_symbols::{
    BasicType, MemorySymbolProvider, Module, ModuleBuilder, SymTag, Symbol, SymbolProvider,
    TypeMappings, XmlSymbolProvider, validate_module,
};
