//! Type-tree construction.
//!
//! Converts one native type reference, as seen from a field or base-class
//! edge, into a target type expression: primitive keyword, pointer, fixed
//! array, template parameter or a reference to another generated user type.
//! User-type references are factory lookup keys, so cycles through pointer
//! fields resolve lazily instead of recursing into ownership.

use crate::error::CodegenError;
use crate::factory::UserTypeFactory;
use crate::usertype::UserTypeId;
use ironpdb_symbols::{BasicType, Module, SymTag, SymbolId};

/// Target type expression.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TypeTree {
    /// Primitive keyword (or runtime handle type).
    Basic(&'static str),
    /// Explicit marker for a zero-size numeric type; never rendered.
    Empty,
    /// Pointer to the inner type.
    Pointer(Box<TypeTree>),
    /// Fixed-size array of the inner type.
    Array(Box<TypeTree>, u64),
    /// Reference to a generated user type, resolved through the factory.
    UserType(UserTypeId),
    /// Reference to an enclosing template's type parameter.
    TemplateParam(usize),
    /// Base marker for static-only holder types.
    StaticClass,
}

impl TypeTree {
    /// Returns true if this is the zero-size marker.
    #[must_use]
    pub const fn is_empty_marker(&self) -> bool {
        matches!(self, Self::Empty)
    }

    /// Renders the target-language spelling of this type expression.
    #[must_use]
    pub fn render(&self, factory: &UserTypeFactory) -> String {
        match self {
            Self::Basic(keyword) => (*keyword).to_string(),
            Self::Empty | Self::StaticClass => String::new(),
            Self::Pointer(inner) => match inner.as_ref() {
                // Pointers to user types auto-deref to the wrapper itself.
                Self::UserType(id) => factory.reference_name(*id),
                Self::Basic("void") | Self::Empty => "NakedPointer".to_string(),
                other => format!("CodePointer<{}>", other.render(factory)),
            },
            Self::Array(element, _) => format!("CodeArray<{}>", element.render(factory)),
            Self::UserType(id) => factory.reference_name(*id),
            Self::TemplateParam(index) => template_param_name(*index),
        }
    }
}

/// Maps a basic type and size to a target type expression.
///
/// Signedness and size together select the exact primitive; a zero-size
/// numeric maps to the explicit [`TypeTree::Empty`] marker rather than
/// guessing a width.
///
/// # Errors
/// Returns `CodegenError::UnsupportedBasicType` for combinations with no
/// target equivalent.
pub fn basic_type_tree(basic: BasicType, size: u64) -> Result<TypeTree, CodegenError> {
    let unsupported = || CodegenError::UnsupportedBasicType {
        basic_type: basic,
        size,
    };

    match basic {
        BasicType::NoType => Ok(TypeTree::Empty),
        BasicType::Void => Ok(TypeTree::Basic("void")),
        BasicType::Bool => Ok(TypeTree::Basic("bool")),
        BasicType::Char | BasicType::WChar => Ok(TypeTree::Basic("char")),
        BasicType::Int | BasicType::Long => match size {
            8 => Ok(TypeTree::Basic("long")),
            4 => Ok(TypeTree::Basic("int")),
            2 => Ok(TypeTree::Basic("short")),
            1 => Ok(TypeTree::Basic("sbyte")),
            0 => Ok(TypeTree::Empty),
            _ => Err(unsupported()),
        },
        BasicType::UInt | BasicType::ULong => match size {
            8 => Ok(TypeTree::Basic("ulong")),
            4 => Ok(TypeTree::Basic("uint")),
            2 => Ok(TypeTree::Basic("ushort")),
            1 => Ok(TypeTree::Basic("byte")),
            0 => Ok(TypeTree::Empty),
            _ => Err(unsupported()),
        },
        BasicType::Float => match size {
            4 => Ok(TypeTree::Basic("float")),
            8 => Ok(TypeTree::Basic("double")),
            _ => Err(unsupported()),
        },
        BasicType::Hresult => Ok(TypeTree::Basic("uint")),
    }
}

/// Builds the type expression for a native type reference.
///
/// `template_args` carries the enclosing template specialization's native
/// argument strings; a type whose name matches one becomes a
/// [`TypeTree::TemplateParam`].
///
/// # Errors
/// Returns `CodegenError` when the native type has no target mapping or no
/// generated counterpart; callers treat these as recoverable and drop the
/// offending member.
pub fn build_type_tree(
    module: &Module,
    type_id: SymbolId,
    factory: &UserTypeFactory,
    template_args: &[String],
) -> Result<TypeTree, CodegenError> {
    let symbol = module.symbol(type_id)?;
    match symbol.tag {
        SymTag::BaseType => {
            let tree = basic_type_tree(symbol.basic_type.unwrap_or(BasicType::NoType), symbol.size)?;
            // A primitive matching one of the enclosing template's arguments
            // reads back as that type parameter.
            if let TypeTree::Basic(keyword) = &tree {
                if let Some(index) = template_args
                    .iter()
                    .position(|arg| native_primitive_keyword(arg) == Some(*keyword))
                {
                    return Ok(TypeTree::TemplateParam(index));
                }
            }
            Ok(tree)
        }
        SymTag::Pointer => {
            let pointee = symbol
                .type_id
                .ok_or_else(|| CodegenError::generation("pointer symbol without pointee"))?;
            Ok(TypeTree::Pointer(Box::new(build_type_tree(
                module,
                pointee,
                factory,
                template_args,
            )?)))
        }
        SymTag::Array => {
            let element = symbol
                .type_id
                .ok_or_else(|| CodegenError::generation("array symbol without element type"))?;
            let count = symbol.element_count.unwrap_or(0);
            Ok(TypeTree::Array(
                Box::new(build_type_tree(module, element, factory, template_args)?),
                count,
            ))
        }
        SymTag::Udt | SymTag::Enum => {
            if let Some(index) = template_args.iter().position(|arg| *arg == symbol.name) {
                return Ok(TypeTree::TemplateParam(index));
            }
            factory
                .lookup(&module.name, &symbol.name)
                .map(TypeTree::UserType)
                .ok_or_else(|| CodegenError::unknown_type(&symbol.name))
        }
        SymTag::Function => Err(CodegenError::generation(format!(
            "function type '{}' has no data accessor",
            symbol.name
        ))),
        other => Err(CodegenError::generation(format!(
            "symbol tag {other:?} is not a type"
        ))),
    }
}

/// Returns the generic parameter name for the given argument position.
#[must_use]
pub fn template_param_name(index: usize) -> String {
    if index == 0 {
        "T".to_string()
    } else {
        format!("T{}", index + 1)
    }
}

/// Renders a native template-argument string as a target type name.
///
/// Named types resolve through the factory; common native primitive
/// spellings map to their target keywords; anything else passes through
/// unchanged.
#[must_use]
pub fn native_arg_to_csharp(factory: &UserTypeFactory, module: &str, arg: &str) -> String {
    if let Some(id) = factory.lookup(module, arg) {
        return factory.reference_name(id);
    }
    native_primitive_keyword(arg)
        .map(str::to_string)
        .unwrap_or_else(|| arg.to_string())
}

/// Maps a native primitive spelling to its target keyword.
#[must_use]
pub fn native_primitive_keyword(arg: &str) -> Option<&'static str> {
    match arg {
        "int" | "signed int" => Some("int"),
        "unsigned" | "unsigned int" => Some("uint"),
        "short" | "signed short" => Some("short"),
        "unsigned short" => Some("ushort"),
        "long long" | "__int64" => Some("long"),
        "unsigned long long" | "unsigned __int64" => Some("ulong"),
        // LLP64: native long stays 32-bit.
        "long" => Some("int"),
        "unsigned long" => Some("uint"),
        "char" | "wchar_t" => Some("char"),
        "signed char" => Some("sbyte"),
        "unsigned char" => Some("byte"),
        "bool" => Some("bool"),
        "float" => Some("float"),
        "double" => Some("double"),
        "void" => Some("void"),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_signed_mapping_by_size() {
        for (size, expected) in [(8, "long"), (4, "int"), (2, "short"), (1, "sbyte")] {
            for basic in [BasicType::Int, BasicType::Long] {
                assert_eq!(
                    basic_type_tree(basic, size).unwrap(),
                    TypeTree::Basic(expected)
                );
            }
        }
    }

    #[test]
    fn test_unsigned_mapping_by_size() {
        for (size, expected) in [(8, "ulong"), (4, "uint"), (2, "ushort"), (1, "byte")] {
            for basic in [BasicType::UInt, BasicType::ULong] {
                assert_eq!(
                    basic_type_tree(basic, size).unwrap(),
                    TypeTree::Basic(expected)
                );
            }
        }
    }

    #[test]
    fn test_zero_size_numeric_is_empty_marker() {
        assert!(basic_type_tree(BasicType::Int, 0).unwrap().is_empty_marker());
        assert!(
            basic_type_tree(BasicType::ULong, 0)
                .unwrap()
                .is_empty_marker()
        );
    }

    #[test]
    fn test_unsupported_size_is_fatal() {
        let err = basic_type_tree(BasicType::Int, 3).unwrap_err();
        assert!(matches!(
            err,
            CodegenError::UnsupportedBasicType { size: 3, .. }
        ));

        let err = basic_type_tree(BasicType::Float, 2).unwrap_err();
        assert!(matches!(err, CodegenError::UnsupportedBasicType { .. }));
    }

    #[test]
    fn test_template_param_names() {
        assert_eq!(template_param_name(0), "T");
        assert_eq!(template_param_name(1), "T2");
        assert_eq!(template_param_name(2), "T3");
    }
}
