//! Error types for code generation.

use thiserror::Error;

/// Error type for code generation operations.
#[derive(Debug, Error)]
pub enum CodegenError {
    /// Symbol model error.
    #[error("symbol error: {0}")]
    Symbol(#[from] ironpdb_symbols::SymbolError),

    /// Symbol file parsing error.
    #[error("symbol parse error: {0}")]
    Parse(#[from] ironpdb_symbols::ParseError),

    /// IO error.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Enum underlying type outside the supported basic-type/size table.
    ///
    /// Fatal: the input symbols are not addressable by the generator's type
    /// table.
    #[error("enum '{type_name}' has unsupported underlying type {basic_type:?} of size {size}")]
    UnsupportedEnumType {
        /// Enum type name.
        type_name: String,
        /// Basic type classification.
        basic_type: ironpdb_symbols::BasicType,
        /// Declared size in bytes.
        size: u64,
    },

    /// Basic type/size combination with no target-language equivalent.
    #[error("no target type for basic type {basic_type:?} of size {size}")]
    UnsupportedBasicType {
        /// Basic type classification.
        basic_type: ironpdb_symbols::BasicType,
        /// Size in bytes.
        size: u64,
    },

    /// Referenced type has no generated counterpart.
    #[error("unknown type '{type_name}'")]
    UnknownType {
        /// Type name.
        type_name: String,
    },

    /// Code generation error.
    #[error("generation error: {message}")]
    Generation {
        /// Error message.
        message: String,
    },
}

impl CodegenError {
    /// Creates a generation error with the given message.
    pub fn generation(message: impl Into<String>) -> Self {
        Self::Generation {
            message: message.into(),
        }
    }

    /// Creates an unknown type error.
    pub fn unknown_type(type_name: impl Into<String>) -> Self {
        Self::UnknownType {
            type_name: type_name.into(),
        }
    }
}
