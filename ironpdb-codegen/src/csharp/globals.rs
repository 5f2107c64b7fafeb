//! Module-globals emission.
//!
//! The globals holder is a static-only type: every member reads a
//! module-scope datum. Fields are sorted by name for deterministic output.

use crate::csharp::{PropertyNamer, close_namespace, open_namespace, write_field_property};
use crate::error::CodegenError;
use crate::factory::UserTypeFactory;
use crate::options::GenerationOptions;
use crate::typetree::build_type_tree;
use crate::usertype::{UserTypeField, UserTypeId, sanitize_identifier};
use crate::writer::{ErrorLog, IndentedWriter};
use ironpdb_symbols::{Module, SymTag};

/// Extracts the global data members.
///
/// Fields are sorted by name, then dropped when empty-named, when
/// duplicating the previous name, when shadowed by a generated user type of
/// the same name, or when they duplicate one of their own enum type's
/// literal names. Every surviving member is forced static.
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

    let mut children: Vec<(String, ironpdb_symbols::SymbolId)> = Vec::new();
    for &child_id in &symbol.children {
        let child = module.symbol(child_id)?;
        if matches!(child.tag, SymTag::Data | SymTag::BitField) {
            children.push((child.name.clone(), child_id));
        }
    }
    children.sort();

    let mut fields = Vec::new();
    let mut namer = PropertyNamer::new(user_type.class_name.clone());
    let mut previous_name = String::new();

    for (name, child_id) in children {
        if name.is_empty() || name == previous_name {
            continue;
        }
        // A generated type with the same name would shadow the member.
        if factory.lookup(&module.name, &name).is_some() {
            previous_name = name;
            continue;
        }
        let child = module.symbol(child_id)?;
        let Some(type_id) = child.type_id else {
            continue;
        };
        // Data that restates one of its own enum's literals carries no
        // information of its own.
        if let Ok(field_type) = module.symbol(type_id) {
            if field_type.tag == SymTag::Enum && field_type.enum_value(&name).is_some() {
                previous_name = name;
                continue;
            }
        }

        let type_tree = match build_type_tree(module, type_id, factory, &[]) {
            Ok(tree) => tree,
            Err(error @ CodegenError::UnsupportedBasicType { .. }) => {
                errors.push(format!("global '{name}' skipped: {error}"));
                previous_name = name;
                continue;
            }
            Err(_) => {
                previous_name = name;
                continue;
            }
        };
        if type_tree.is_empty_marker() {
            previous_name = name;
            continue;
        }

        let field_name = sanitize_identifier(&name);
        let property_name = namer.name_for(&field_name);
        fields.push(UserTypeField {
            field_name,
            property_name,
            native_name: name.clone(),
            offset: child.offset,
            bit_range: child.bit_range,
            type_tree,
            is_static: true,
            const_value: child.const_value.clone(),
        });
        previous_name = name;
    }

    Ok(fields)
}

/// Writes the static globals holder.
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
                "// {} (module: \"{}\")",
                user_type.class_name, user_type.module
            ),
        );
    }

    writer.write_line(
        indent,
        &format!("public static class {}", user_type.class_name),
    );
    writer.write_line(indent, "{");
    indent += 1;

    let fields = extract_fields(factory, module, id, errors, options)?;
    let mut first = true;
    for field in &fields {
        if !first {
            writer.blank_line();
        }
        first = false;
        write_field_property(factory, user_type, field, writer, options, indent);
    }

    if options.provider_generated_fields {
        if !first {
            writer.blank_line();
        }
        writer.write_line(
            indent,
            "public static Variable thisClass { get { return Module.GetGlobalScope(); } }",
        );
    }

    indent -= 1;
    writer.write_line(indent, "}");
    close_namespace(user_type, writer, indentation);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use ironpdb_symbols::{BasicType, ModuleBuilder, TypeMappings};

    fn factory_for(module: &Module) -> UserTypeFactory {
        let mut factory = UserTypeFactory::new(TypeMappings::new(), &GenerationOptions::new());
        factory.populate(module).expect("populate failed");
        factory
    }

    fn globals_id(factory: &UserTypeFactory) -> UserTypeId {
        factory
            .ids()
            .find(|&id| factory.get(id).is_globals())
            .expect("no globals type")
    }

    #[test]
    fn test_fields_sorted_and_static() {
        let mut builder = ModuleBuilder::new("m");
        let int4 = builder.basic_type(BasicType::Int, 4);
        builder.global("zeta", int4);
        builder.global("alpha", int4);
        let module = builder.finish();

        let factory = factory_for(&module);
        let id = globals_id(&factory);
        let mut errors = ErrorLog::new();
        let fields =
            extract_fields(&factory, &module, id, &mut errors, &GenerationOptions::new()).unwrap();

        assert_eq!(fields.len(), 2);
        assert_eq!(fields[0].native_name, "alpha");
        assert_eq!(fields[1].native_name, "zeta");
        assert!(fields.iter().all(|f| f.is_static));
    }

    #[test]
    fn test_duplicate_names_keep_first() {
        let mut builder = ModuleBuilder::new("m");
        let int4 = builder.basic_type(BasicType::Int, 4);
        let short2 = builder.basic_type(BasicType::Int, 2);
        builder.global("count", int4);
        builder.global("count", short2);
        let module = builder.finish();

        let factory = factory_for(&module);
        let id = globals_id(&factory);
        let mut errors = ErrorLog::new();
        let fields =
            extract_fields(&factory, &module, id, &mut errors, &GenerationOptions::new()).unwrap();

        assert_eq!(fields.len(), 1);
        assert_eq!(fields[0].native_name, "count");
    }

    #[test]
    fn test_field_shadowed_by_type_dropped() {
        let mut builder = ModuleBuilder::new("m");
        let int4 = builder.basic_type(BasicType::Int, 4);
        builder.udt("Config", 8);
        builder.global("Config", int4);
        builder.global("other", int4);
        let module = builder.finish();

        let factory = factory_for(&module);
        let id = globals_id(&factory);
        let mut errors = ErrorLog::new();
        let fields =
            extract_fields(&factory, &module, id, &mut errors, &GenerationOptions::new()).unwrap();

        assert_eq!(fields.len(), 1);
        assert_eq!(fields[0].native_name, "other");
    }

    #[test]
    fn test_enum_literal_duplicate_dropped() {
        let mut builder = ModuleBuilder::new("m");
        let color = builder.enum_type("Color", BasicType::UInt, 4, &[("Red", 0), ("Green", 1)]);
        builder.global("Red", color);
        builder.global("shade", color);
        let module = builder.finish();

        let factory = factory_for(&module);
        let id = globals_id(&factory);
        let mut errors = ErrorLog::new();
        let fields =
            extract_fields(&factory, &module, id, &mut errors, &GenerationOptions::new()).unwrap();

        assert_eq!(fields.len(), 1);
        assert_eq!(fields[0].native_name, "shade");
    }

    #[test]
    fn test_sanitized_names() {
        let mut builder = ModuleBuilder::new("m");
        let int4 = builder.basic_type(BasicType::Int, 4);
        builder.global("Foo Bar@Baz", int4);
        let module = builder.finish();

        let factory = factory_for(&module);
        let id = globals_id(&factory);
        let mut errors = ErrorLog::new();
        let fields =
            extract_fields(&factory, &module, id, &mut errors, &GenerationOptions::new()).unwrap();

        assert_eq!(fields[0].field_name, "Foo_Bar_Baz");
        assert_eq!(fields[0].property_name, "Foo_Bar_Baz");
    }

    #[test]
    fn test_write_globals_class() {
        let mut builder = ModuleBuilder::new("m");
        let int4 = builder.basic_type(BasicType::Int, 4);
        builder.global("count", int4);
        let module = builder.finish();

        let factory = factory_for(&module);
        let id = globals_id(&factory);
        let mut writer = IndentedWriter::new();
        let mut errors = ErrorLog::new();
        write_code(
            &factory,
            &module,
            id,
            &mut writer,
            &mut errors,
            &GenerationOptions::new(),
            0,
        )
        .unwrap();

        let text = writer.into_inner();
        assert!(text.contains("public static class ModuleGlobals"));
        assert!(text.contains(
            "public static int Count { get { return Module.GetStatic<int>(\"count\"); } }"
        ));
        assert!(!text.contains("thisClass"));
    }

    #[test]
    fn test_provider_generated_fields_option() {
        let mut builder = ModuleBuilder::new("m");
        let int4 = builder.basic_type(BasicType::Int, 4);
        builder.global("count", int4);
        let module = builder.finish();

        let factory = factory_for(&module);
        let id = globals_id(&factory);
        let mut options = GenerationOptions::new();
        options.provider_generated_fields = true;
        let mut writer = IndentedWriter::new();
        let mut errors = ErrorLog::new();
        write_code(&factory, &module, id, &mut writer, &mut errors, &options, 0).unwrap();

        assert!(
            writer
                .as_str()
                .contains("public static Variable thisClass { get { return Module.GetGlobalScope(); } }")
        );
    }
}
