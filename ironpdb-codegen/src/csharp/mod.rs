//! C# code emission.
//!
//! One module per generator variant, sharing the member-property rendering
//! and naming helpers here. All variants follow the same two-phase contract:
//! extract fields under the variant's filtering policy, then write the
//! declaration through the indented writer. Emission is a pure function of
//! the user-type state and options; recoverable member failures go to the
//! error sink and skip only the offending member.

pub mod enums;
pub mod globals;
pub mod plain;
pub mod template;

use crate::error::CodegenError;
use crate::factory::UserTypeFactory;
use crate::options::GenerationOptions;
use crate::usertype::{UserType, UserTypeField, UserTypeId, UserTypeKind, capitalize};
use crate::writer::{ErrorLog, IndentedWriter};
use ironpdb_symbols::Module;
use std::collections::HashMap;

/// Writes one user type through the variant dispatch.
///
/// Returns false (writing nothing) for template specializations that are not
/// the canonical one, since all specializations of a base share a single
/// generated declaration.
///
/// # Errors
/// Returns `CodegenError` on a fatal mapping error for this type; the caller
/// decides whether to abort the run or skip the type.
pub fn write_user_type(
    factory: &UserTypeFactory,
    module: &Module,
    id: UserTypeId,
    writer: &mut IndentedWriter,
    errors: &mut ErrorLog,
    options: &GenerationOptions,
    indentation: usize,
) -> Result<bool, CodegenError> {
    let user_type = factory.get(id);
    match &user_type.kind {
        UserTypeKind::Plain => {
            plain::write_code(factory, module, id, writer, errors, options, indentation)?;
            Ok(true)
        }
        UserTypeKind::Enum => {
            enums::write_code(factory, module, id, writer, errors, options, indentation)?;
            Ok(true)
        }
        UserTypeKind::Globals => {
            globals::write_code(factory, module, id, writer, errors, options, indentation)?;
            Ok(true)
        }
        UserTypeKind::Template(data) => {
            if !factory.expand_specializations()
                && factory.canonical_specialization(&user_type.module, &data.base_name) != Some(id)
            {
                return Ok(false);
            }
            template::write_code(factory, module, id, writer, errors, options, indentation)?;
            Ok(true)
        }
    }
}

/// Allocates collision-free property names within one declaration.
pub(crate) struct PropertyNamer {
    class_name: String,
    used: HashMap<String, u32>,
}

impl PropertyNamer {
    pub(crate) fn new(class_name: impl Into<String>) -> Self {
        Self {
            class_name: class_name.into(),
            used: HashMap::new(),
        }
    }

    /// Returns the property name for a sanitized field name: capitalized,
    /// kept away from the class name, ordinal-suffixed on collision.
    pub(crate) fn name_for(&mut self, field_name: &str) -> String {
        let mut candidate = capitalize(field_name);
        if candidate == self.class_name {
            candidate.push('_');
        }
        let count = self.used.entry(candidate.clone()).or_insert(0);
        *count += 1;
        if *count == 1 {
            candidate
        } else {
            format!("{candidate}_{count}")
        }
    }
}

/// Writes the namespace wrapper opening if the type needs one, returning the
/// body indentation.
pub(crate) fn open_namespace(
    user_type: &UserType,
    writer: &mut IndentedWriter,
    indentation: usize,
) -> usize {
    if user_type.declared_in.is_none() && !user_type.namespace.is_empty() {
        writer.write_line(indentation, &format!("namespace {}", user_type.namespace));
        writer.write_line(indentation, "{");
        indentation + 1
    } else {
        indentation
    }
}

/// Closes the namespace wrapper opened by [`open_namespace`].
pub(crate) fn close_namespace(
    user_type: &UserType,
    writer: &mut IndentedWriter,
    indentation: usize,
) {
    if user_type.declared_in.is_none() && !user_type.namespace.is_empty() {
        writer.write_line(indentation, "}");
    }
}

/// Writes one member property.
pub(crate) fn write_field_property(
    factory: &UserTypeFactory,
    user_type: &UserType,
    field: &UserTypeField,
    writer: &mut IndentedWriter,
    options: &GenerationOptions,
    indentation: usize,
) {
    let rendered = field.type_tree.render(factory);

    if options.field_type_info_comments {
        let origin = match field.bit_range {
            Some(range) => format!(
                "// {} {}; // bits: {}..{}",
                rendered,
                field.native_name,
                range.position,
                range.position + range.length
            ),
            None if field.is_static => format!("// {} {}; // static", rendered, field.native_name),
            None => format!(
                "// {} {}; // offset: {}",
                rendered, field.native_name, field.offset
            ),
        };
        writer.write_line(indentation, &origin);
    }

    // Constants carry their value straight into the declaration.
    if let Some(value) = &field.const_value {
        writer.write_line(
            indentation,
            &format!(
                "public const {rendered} {} = {value};",
                field.property_name
            ),
        );
        return;
    }

    let accessor = render_accessor(user_type, field, &rendered, options);
    let modifier = if field.is_static { "static " } else { "" };
    writer.write_line(
        indentation,
        &format!(
            "public {modifier}{rendered} {} {{ get {{ return {accessor}; }} }}",
            field.property_name
        ),
    );
}

/// Renders the accessor expression for one member.
fn render_accessor(
    user_type: &UserType,
    field: &UserTypeField,
    rendered_type: &str,
    options: &GenerationOptions,
) -> String {
    if field.is_static {
        let qualified = if user_type.is_globals() {
            field.native_name.clone()
        } else {
            format!("{}::{}", user_type.native_name, field.native_name)
        };
        return format!("Module.GetStatic<{rendered_type}>(\"{qualified}\")");
    }

    if let Some(range) = field.bit_range {
        if options.raw_bit_shift_accessors {
            let mask = if range.length >= 64 {
                u64::MAX
            } else {
                (1u64 << range.length) - 1
            };
            return format!(
                "({rendered_type})((variable.GetField<{rendered_type}>(\"{}\") >> {}) & 0x{mask:X})",
                field.native_name, range.position
            );
        }
        return format!(
            "variable.GetBitField<{rendered_type}>(\"{}\", {}, {})",
            field.native_name, range.position, range.length
        );
    }

    format!(
        "variable.GetField<{rendered_type}>(\"{}\")",
        field.native_name
    )
}
