//! Plain struct/class wrapper emission.

use crate::csharp::{
    PropertyNamer, close_namespace, open_namespace, write_field_property, write_user_type,
};
use crate::error::CodegenError;
use crate::factory::UserTypeFactory;
use crate::options::GenerationOptions;
use crate::typetree::build_type_tree;
use crate::usertype::{UserType, UserTypeField, UserTypeId, sanitize_identifier, split_scoped_name};
use crate::writer::{ErrorLog, IndentedWriter};
use ironpdb_symbols::{Module, SymTag};
use std::collections::HashSet;
use tracing::warn;

/// Extracts the fields of a plain or template user type.
///
/// Declaration order is preserved. Fields are dropped when their type has no
/// target mapping (silently for unresolved references, with an error line
/// for unsupported basic-type combinations), when their name duplicates an
/// earlier field, or when their name matches the enclosing type's own name.
///
/// # Errors
/// Returns `CodegenError` if the backing symbol graph is inconsistent.
pub fn extract_fields(
    factory: &UserTypeFactory,
    module: &Module,
    id: UserTypeId,
    errors: &mut ErrorLog,
    _options: &GenerationOptions,
) -> Result<Vec<UserTypeField>, CodegenError> {
    let user_type = factory.get(id);
    let symbol = module.symbol(user_type.symbol)?;

    let template_args: Vec<String> = match user_type.template_data() {
        Some(data) if !factory.expand_specializations() => data.args.clone(),
        _ => Vec::new(),
    };
    let native_leaf = native_leaf_name(user_type);

    let mut fields = Vec::new();
    let mut seen: HashSet<String> = HashSet::new();
    let mut namer = PropertyNamer::new(user_type.class_name.clone());

    for &child_id in &symbol.children {
        let child = module.symbol(child_id)?;
        if !matches!(child.tag, SymTag::Data | SymTag::BitField) {
            continue;
        }
        if child.name.is_empty() {
            continue;
        }
        // Self-shadowing members are dropped, not renamed.
        if child.name == native_leaf {
            continue;
        }
        if !seen.insert(child.name.clone()) {
            continue;
        }
        let Some(type_id) = child.type_id else {
            continue;
        };

        let type_tree = match build_type_tree(module, type_id, factory, &template_args) {
            Ok(tree) => tree,
            Err(error @ CodegenError::UnsupportedBasicType { .. }) => {
                errors.push(format!(
                    "field '{}' of '{}' skipped: {error}",
                    child.name, user_type.native_name
                ));
                continue;
            }
            Err(_) => continue,
        };
        if type_tree.is_empty_marker() {
            continue;
        }

        let field_name = sanitize_identifier(&child.name);
        let property_name = namer.name_for(&field_name);
        fields.push(UserTypeField {
            field_name,
            property_name,
            native_name: child.name.clone(),
            offset: child.offset,
            bit_range: child.bit_range,
            type_tree,
            is_static: child.is_static,
            const_value: child.const_value.clone(),
        });
    }

    Ok(fields)
}

/// Writes a plain class declaration.
///
/// # Errors
/// Returns `CodegenError` if the backing symbol graph is inconsistent.
pub fn write_code(
    factory: &UserTypeFactory,
    module: &Module,
    id: UserTypeId,
    writer: &mut IndentedWriter,
    errors: &mut ErrorLog,
    options: &GenerationOptions,
    indentation: usize,
) -> Result<(), CodegenError> {
    let user_type = factory.get(id);
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

    let base = base_type_string(factory, module, user_type, errors, &[])?;
    writer.write_line(
        indent,
        &format!("public partial class {} : {}", user_type.class_name, base),
    );
    writer.write_line(indent, "{");
    indent += 1;

    write_constructor(&user_type.class_name, writer, indent);

    let fields = extract_fields(factory, module, id, errors, options)?;
    for field in &fields {
        writer.blank_line();
        write_field_property(factory, user_type, field, writer, options, indent);
    }

    write_nested_types(
        factory,
        module,
        &factory.nested_types(id),
        writer,
        errors,
        options,
        indent,
    );

    indent -= 1;
    writer.write_line(indent, "}");
    close_namespace(user_type, writer, indentation);
    Ok(())
}

/// Writes the wrapping constructor shared by plain and template classes.
pub(crate) fn write_constructor(class_name: &str, writer: &mut IndentedWriter, indentation: usize) {
    writer.write_line(indentation, &format!("public {class_name}(Variable variable)"));
    writer.write_line(indentation + 1, ": base(variable)");
    writer.write_line(indentation, "{");
    writer.write_line(indentation, "}");
}

/// Resolves the base-class clause: the first resolvable base edge, falling
/// back to the runtime wrapper base.
pub(crate) fn base_type_string(
    factory: &UserTypeFactory,
    module: &Module,
    user_type: &UserType,
    errors: &mut ErrorLog,
    template_args: &[String],
) -> Result<String, CodegenError> {
    let symbol = module.symbol(user_type.symbol)?;
    for &child_id in &symbol.children {
        let child = module.symbol(child_id)?;
        if child.tag != SymTag::BaseClass {
            continue;
        }
        let Some(type_id) = child.type_id else {
            continue;
        };
        match build_type_tree(module, type_id, factory, template_args) {
            Ok(tree) => return Ok(tree.render(factory)),
            Err(error) => {
                errors.push(format!(
                    "base class of '{}' skipped: {error}",
                    user_type.native_name
                ));
            }
        }
    }
    Ok("UserType".to_string())
}

/// Writes nested declarations, isolating each: a fatal error in one nested
/// type is logged and skips only that type.
pub(crate) fn write_nested_types(
    factory: &UserTypeFactory,
    module: &Module,
    nested: &[UserTypeId],
    writer: &mut IndentedWriter,
    errors: &mut ErrorLog,
    options: &GenerationOptions,
    indentation: usize,
) {
    for &nested_id in nested {
        let mut sub = IndentedWriter::new();
        match write_user_type(
            factory, module, nested_id, &mut sub, errors, options, indentation,
        ) {
            Ok(true) if !sub.is_empty() => {
                writer.blank_line();
                writer.append_raw(sub.as_str());
            }
            Ok(_) => {}
            Err(error) => {
                let name = &factory.get(nested_id).native_name;
                warn!(nested = %name, %error, "nested type skipped");
                errors.push(format!("nested type '{name}' skipped: {error}"));
            }
        }
    }
}

/// Returns the unqualified native name used for self-shadow filtering.
fn native_leaf_name(user_type: &UserType) -> String {
    let source = match user_type.template_data() {
        Some(data) => &data.base_name,
        None => &user_type.native_name,
    };
    split_scoped_name(source)
        .map(|(_, leaf)| leaf)
        .unwrap_or(source)
        .to_string()
}
