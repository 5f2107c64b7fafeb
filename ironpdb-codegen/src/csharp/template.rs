//! Template emission.
//!
//! All specializations of one base template share a single generated generic
//! declaration, written from the canonical (first) specialization with its
//! arguments substituted by type parameters. With
//! `expand_template_specializations` set, each specialization instead
//! becomes its own closed class.

use crate::csharp::plain::{
    base_type_string, extract_fields, write_constructor, write_nested_types,
};
use crate::csharp::{close_namespace, open_namespace, write_field_property};
use crate::error::CodegenError;
use crate::factory::UserTypeFactory;
use crate::options::GenerationOptions;
use crate::typetree::template_param_name;
use crate::usertype::UserTypeId;
use crate::writer::{ErrorLog, IndentedWriter};
use ironpdb_symbols::Module;
use std::collections::HashSet;

/// Writes a template declaration.
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
    let data = user_type
        .template_data()
        .ok_or_else(|| CodegenError::generation("template writer invoked on non-template"))?;
    let expand = factory.expand_specializations();

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

    let template_args: Vec<String> = if expand { Vec::new() } else { data.args.clone() };
    let declared_name = if expand {
        user_type.class_name.clone()
    } else {
        generic_declaration_name(&user_type.class_name, data.args.len())
    };

    let base = base_type_string(factory, module, user_type, errors, &template_args)?;
    writer.write_line(
        indent,
        &format!("public partial class {declared_name} : {base}"),
    );
    writer.write_line(indent, "{");
    indent += 1;

    write_constructor(&user_type.class_name, writer, indent);

    let fields = extract_fields(factory, module, id, errors, options)?;
    for field in &fields {
        writer.blank_line();
        write_field_property(factory, user_type, field, writer, options, indent);
    }

    // Nested declarations come from every specialization of the base, since
    // the symbol source scatters them across instantiations; one per class
    // name suffices in the shared generic.
    let nested = if expand {
        factory.nested_types(id)
    } else {
        let mut collected = Vec::new();
        let mut seen: HashSet<String> = HashSet::new();
        for &specialization in factory.specializations(&user_type.module, &data.base_name) {
            for nested_id in factory.nested_types(specialization) {
                let class_name = factory.get(nested_id).class_name.clone();
                if seen.insert(class_name) {
                    collected.push(nested_id);
                }
            }
        }
        collected
    };
    write_nested_types(factory, module, &nested, writer, errors, options, indent);

    indent -= 1;
    writer.write_line(indent, "}");
    close_namespace(user_type, writer, indentation);
    Ok(())
}

/// Renders the generic declaration name, `Base<T, T2, ...>`.
fn generic_declaration_name(class_name: &str, arity: usize) -> String {
    if arity == 0 {
        return class_name.to_string();
    }
    let params: Vec<String> = (0..arity).map(template_param_name).collect();
    format!("{class_name}<{}>", params.join(", "))
}

#[cfg(test)]
mod tests {
    use super::*;
    use ironpdb_symbols::{BasicType, ModuleBuilder, SymTag, TypeMappings};

    fn factory_for(module: &Module, options: &GenerationOptions) -> UserTypeFactory {
        let mut factory = UserTypeFactory::new(TypeMappings::new(), options);
        factory.populate(module).expect("populate failed");
        factory
    }

    #[test]
    fn test_generic_declaration_name() {
        assert_eq!(generic_declaration_name("vector", 1), "vector<T>");
        assert_eq!(generic_declaration_name("map", 2), "map<T, T2>");
        assert_eq!(generic_declaration_name("odd", 0), "odd");
    }

    #[test]
    fn test_write_generic_class_with_substituted_field() {
        let mut builder = ModuleBuilder::new("m");
        let int4 = builder.basic_type(BasicType::Int, 4);
        let uint8 = builder.basic_type(BasicType::UInt, 8);
        let vector = builder.udt("vector<int>", 16);
        let int_ptr = builder.pointer(int4);
        builder.field(vector, "data", int_ptr, 0);
        builder.field(vector, "size", uint8, 8);
        let module = builder.finish();

        let options = GenerationOptions::new();
        let factory = factory_for(&module, &options);
        let id = factory.lookup("m", "vector<int>").unwrap();

        let mut writer = IndentedWriter::new();
        let mut errors = ErrorLog::new();
        write_code(&factory, &module, id, &mut writer, &mut errors, &options, 0).unwrap();

        let text = writer.into_inner();
        assert!(text.contains("public partial class vector<T> : UserType"));
        // The int argument substitutes as the type parameter.
        assert!(text.contains("CodePointer<T>"));
        assert!(text.contains("public ulong Size"));
    }

    #[test]
    fn test_only_canonical_specialization_written() {
        let mut builder = ModuleBuilder::new("m");
        builder.udt("vector<char>", 16);
        builder.udt("vector<int>", 16);
        let module = builder.finish();

        let options = GenerationOptions::new();
        let factory = factory_for(&module, &options);
        let canonical = factory.canonical_specialization("m", "vector").unwrap();
        let other = factory
            .specializations("m", "vector")
            .iter()
            .copied()
            .find(|&id| id != canonical)
            .unwrap();

        let mut writer = IndentedWriter::new();
        let mut errors = ErrorLog::new();
        let written = crate::csharp::write_user_type(
            &factory,
            &module,
            canonical,
            &mut writer,
            &mut errors,
            &options,
            0,
        )
        .unwrap();
        assert!(written);

        let mut writer = IndentedWriter::new();
        let written = crate::csharp::write_user_type(
            &factory, &module, other, &mut writer, &mut errors, &options, 0,
        )
        .unwrap();
        assert!(!written);
        assert!(writer.as_str().is_empty());
    }

    #[test]
    fn test_expanded_specializations_each_written() {
        let mut builder = ModuleBuilder::new("m");
        let int4 = builder.basic_type(BasicType::Int, 4);
        let vec_int = builder.udt("vector<int>", 16);
        builder.field(vec_int, "first", int4, 0);
        builder.udt("vector<char>", 16);
        let module = builder.finish();

        let mut options = GenerationOptions::new();
        options.expand_template_specializations = true;
        let factory = factory_for(&module, &options);

        for native in ["vector<int>", "vector<char>"] {
            let id = factory.lookup("m", native).unwrap();
            let mut writer = IndentedWriter::new();
            let mut errors = ErrorLog::new();
            let written = crate::csharp::write_user_type(
                &factory, &module, id, &mut writer, &mut errors, &options, 0,
            )
            .unwrap();
            assert!(written);
        }

        // Closed classes carry mangled names and concrete field types.
        let id = factory.lookup("m", "vector<int>").unwrap();
        let mut writer = IndentedWriter::new();
        let mut errors = ErrorLog::new();
        write_code(&factory, &module, id, &mut writer, &mut errors, &options, 0).unwrap();
        let text = writer.into_inner();
        assert!(text.contains("public partial class vector_int_ : UserType"));
        assert!(text.contains("public int First"));
    }

    #[test]
    fn test_nested_enum_written_inside_generic() {
        let mut builder = ModuleBuilder::new("m");
        builder.udt("list<char>", 16);
        builder.udt("list<int>", 16);
        let mut module = builder.finish();
        let mut nested = ironpdb_symbols::Symbol::new("list<int>::State", SymTag::Enum);
        nested.basic_type = Some(BasicType::Int);
        nested.size = 4;
        nested
            .enum_values
            .push(ironpdb_symbols::EnumValue::new("Idle", 0));
        let nested_id = module.add_symbol(nested);
        module.add_top_level(nested_id);

        let options = GenerationOptions::new();
        let factory = factory_for(&module, &options);
        let canonical = factory.canonical_specialization("m", "list").unwrap();

        let mut writer = IndentedWriter::new();
        let mut errors = ErrorLog::new();
        write_code(
            &factory, &module, canonical, &mut writer, &mut errors, &options, 0,
        )
        .unwrap();

        let text = writer.into_inner();
        assert!(text.contains("public partial class list<T> : UserType"));
        assert!(text.contains("public enum State : int"));
        assert!(text.contains("Idle = 0,"));
    }
}
