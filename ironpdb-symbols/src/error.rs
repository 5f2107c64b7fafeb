//! Error types for symbol parsing and validation.

use thiserror::Error;

/// Error type for symbol-file parsing operations.
#[derive(Debug, Error)]
pub enum ParseError {
    /// XML parsing error.
    #[error("XML parsing error: {0}")]
    Xml(#[from] quick_xml::Error),

    /// Missing required attribute.
    #[error("missing required attribute '{attribute}' on element '{element}'")]
    MissingAttribute {
        /// Element name.
        element: String,
        /// Attribute name.
        attribute: String,
    },

    /// Invalid attribute value.
    #[error("invalid value '{value}' for attribute '{attribute}' on element '{element}'")]
    InvalidAttribute {
        /// Element name.
        element: String,
        /// Attribute name.
        attribute: String,
        /// Invalid value.
        value: String,
    },

    /// Unknown element encountered.
    #[error("unknown element '{element}' in context '{context}'")]
    UnknownElement {
        /// Element name.
        element: String,
        /// Parent context.
        context: String,
    },

    /// Malformed type expression in a `type` attribute.
    #[error("invalid type expression '{expression}': {reason}")]
    InvalidTypeExpression {
        /// The offending expression.
        expression: String,
        /// What made it invalid.
        reason: String,
    },

    /// Invalid symbol-file structure.
    #[error("invalid symbol file structure: {message}")]
    InvalidStructure {
        /// Error message.
        message: String,
    },

    /// IO error.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// UTF-8 decoding error.
    #[error("UTF-8 error: {0}")]
    Utf8(#[from] std::str::Utf8Error),
}

impl ParseError {
    /// Creates a missing attribute error.
    pub fn missing_attr(element: impl Into<String>, attribute: impl Into<String>) -> Self {
        Self::MissingAttribute {
            element: element.into(),
            attribute: attribute.into(),
        }
    }

    /// Creates an invalid attribute error.
    pub fn invalid_attr(
        element: impl Into<String>,
        attribute: impl Into<String>,
        value: impl Into<String>,
    ) -> Self {
        Self::InvalidAttribute {
            element: element.into(),
            attribute: attribute.into(),
            value: value.into(),
        }
    }

    /// Creates an unknown element error.
    pub fn unknown_element(element: impl Into<String>, context: impl Into<String>) -> Self {
        Self::UnknownElement {
            element: element.into(),
            context: context.into(),
        }
    }

    /// Creates an invalid type expression error.
    pub fn invalid_type_expr(expression: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::InvalidTypeExpression {
            expression: expression.into(),
            reason: reason.into(),
        }
    }
}

/// Error type for symbol lookup and validation.
#[derive(Debug, Error)]
pub enum SymbolError {
    /// Parsing error.
    #[error("parse error: {0}")]
    Parse(#[from] ParseError),

    /// Module not found in the provider.
    #[error("module '{name}' not found")]
    ModuleNotFound {
        /// Module name.
        name: String,
    },

    /// Symbol id does not resolve within its module.
    #[error("symbol id {id} not found in module '{module}'")]
    SymbolNotFound {
        /// Symbol id value.
        id: u32,
        /// Module name.
        module: String,
    },

    /// A symbol references another symbol id that does not exist.
    #[error("symbol '{symbol}' references missing symbol id {referenced}")]
    DanglingReference {
        /// Referencing symbol name.
        symbol: String,
        /// Missing id value.
        referenced: u32,
    },

    /// Bit-field range does not fit in its storage unit.
    #[error(
        "bit-field '{symbol}' spans bits {position}..{position}+{length} outside its {storage_bits}-bit storage"
    )]
    InvalidBitField {
        /// Field name.
        symbol: String,
        /// Starting bit position.
        position: u32,
        /// Bit length.
        length: u32,
        /// Storage width in bits.
        storage_bits: u32,
    },

    /// Enum underlying width outside the supported set.
    #[error("enum '{name}' has unsupported underlying size {size}")]
    InvalidEnumWidth {
        /// Enum name.
        name: String,
        /// Declared size in bytes.
        size: u64,
    },

    /// Field lies outside the enclosing type.
    #[error("field '{field}' at offset {offset} lies outside its {size}-byte enclosing type")]
    FieldOutsideType {
        /// Field name.
        field: String,
        /// Field offset.
        offset: u64,
        /// Enclosing type size.
        size: u64,
    },

    /// Validation error.
    #[error("validation error: {message}")]
    Validation {
        /// Error message.
        message: String,
    },
}

impl SymbolError {
    /// Creates a module-not-found error.
    pub fn module_not_found(name: impl Into<String>) -> Self {
        Self::ModuleNotFound { name: name.into() }
    }

    /// Creates a validation error with the given message.
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation {
            message: message.into(),
        }
    }
}
