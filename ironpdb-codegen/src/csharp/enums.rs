//! Enum emission.

use crate::csharp::{close_namespace, open_namespace};
use crate::error::CodegenError;
use crate::factory::UserTypeFactory;
use crate::options::GenerationOptions;
use crate::usertype::UserTypeId;
use crate::writer::{ErrorLog, IndentedWriter};
use ironpdb_symbols::{BasicType, Module, Symbol};

/// Selects the underlying integral keyword for an enum symbol.
///
/// Size zero yields `None`: the declaration omits the underlying-type clause
/// entirely. Any basic-type/size combination outside the table is a fatal
/// mapping error, since it means the input symbols are not addressable by
/// the generator's type table.
///
/// # Errors
/// Returns `CodegenError::UnsupportedEnumType` for unmapped combinations.
pub fn enum_underlying_type(symbol: &Symbol) -> Result<Option<&'static str>, CodegenError> {
    let basic = symbol.basic_type.unwrap_or(BasicType::NoType);
    let unsupported = || CodegenError::UnsupportedEnumType {
        type_name: symbol.name.clone(),
        basic_type: basic,
        size: symbol.size,
    };

    match basic {
        BasicType::Int | BasicType::Long => match symbol.size {
            8 => Ok(Some("long")),
            4 => Ok(Some("int")),
            2 => Ok(Some("short")),
            1 => Ok(Some("sbyte")),
            0 => Ok(None),
            _ => Err(unsupported()),
        },
        BasicType::UInt | BasicType::ULong => match symbol.size {
            8 => Ok(Some("ulong")),
            4 => Ok(Some("uint")),
            2 => Ok(Some("ushort")),
            1 => Ok(Some("byte")),
            0 => Ok(None),
            _ => Err(unsupported()),
        },
        _ => Err(unsupported()),
    }
}

/// Writes an enum declaration with its literals in declaration order.
///
/// # Errors
/// Returns `CodegenError::UnsupportedEnumType` if the underlying type has no
/// mapping; nothing is written in that case.
pub fn write_code(
    factory: &UserTypeFactory,
    module: &Module,
    id: UserTypeId,
    writer: &mut IndentedWriter,
    _errors: &mut ErrorLog,
    options: &GenerationOptions,
    indentation: usize,
) -> Result<(), CodegenError> {
    let user_type = factory.get(id);
    let symbol = module.symbol(user_type.symbol)?;

    // Resolve the underlying type before any output so a fatal mapping
    // error leaves the sink untouched.
    let underlying = enum_underlying_type(symbol)?;

    let mut indent = open_namespace(user_type, writer, indentation);

    if options.field_type_info_comments {
        writer.write_line(
            indent,
            &format!(
                "// {} (original name: \"{}\")",
                user_type.class_name, user_type.native_name
            ),
        );
    }

    match underlying {
        Some(keyword) => writer.write_line(
            indent,
            &format!("public enum {} : {keyword}", user_type.class_name),
        ),
        None => writer.write_line(indent, &format!("public enum {}", user_type.class_name)),
    }
    writer.write_line(indent, "{");
    indent += 1;

    for value in &symbol.enum_values {
        writer.write_line(indent, &format!("{} = {},", value.name, value.value));
    }

    indent -= 1;
    writer.write_line(indent, "}");
    close_namespace(user_type, writer, indentation);
    Ok(())
}
