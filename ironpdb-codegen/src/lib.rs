//! # IronPDB Codegen
//!
//! Typed C# wrapper generation from debug symbols.
//!
//! This crate provides:
//! - The user-type factory mapping native symbols to generated declarations
//! - Type-tree construction from native type references
//! - Generator variants for plain types, enums, templates and module globals
//! - The indented writer and error sinks

pub mod csharp;
pub mod error;
pub mod factory;
pub mod options;
pub mod typetree;
pub mod usertype;
pub mod writer;

pub use error::CodegenError;
pub use factory::UserTypeFactory;
pub use options::GenerationOptions;
pub use typetree::TypeTree;
pub use usertype::{UserType, UserTypeField, UserTypeId, UserTypeKind};
pub use writer::{ErrorLog, IndentedWriter};

use ironpdb_symbols::{SymbolProvider, TypeMappings, parse_symbols, validate_module};
use tracing::warn;

/// Output of one generation run: the emitted source plus one line per
/// recoverable failure.
#[derive(Debug)]
pub struct GeneratedCode {
    /// Generated source text.
    pub source: String,
    /// Recoverable failures: skipped members and skipped types.
    pub errors: Vec<String>,
}

/// Generates the wrapper source for one module.
///
/// The factory is populated first, then each top-level user type is emitted
/// in class-name order with the globals holder last. A type whose code path
/// raises a fatal mapping error is skipped with an error line; the remaining
/// types still generate.
///
/// # Errors
/// Returns `CodegenError` if the module is unknown or its symbol graph is
/// inconsistent.
pub fn generate_module(
    provider: &dyn SymbolProvider,
    module_name: &str,
    mappings: &TypeMappings,
    options: &GenerationOptions,
) -> Result<GeneratedCode, CodegenError> {
    let module = provider.module(module_name)?;
    let mut factory = UserTypeFactory::new(mappings.clone(), options);
    factory.populate(module)?;

    let mut tops: Vec<UserTypeId> = factory
        .ids()
        .filter(|&id| {
            let user_type = factory.get(id);
            user_type.declared_in.is_none() && !user_type.is_globals()
        })
        .collect();
    tops.sort_by(|&a, &b| {
        let left = factory.get(a);
        let right = factory.get(b);
        left.class_name
            .cmp(&right.class_name)
            .then_with(|| left.native_name.cmp(&right.native_name))
    });
    let globals: Vec<UserTypeId> = factory.ids().filter(|&id| factory.get(id).is_globals()).collect();

    let mut writer = IndentedWriter::new();
    let mut errors = ErrorLog::new();

    for id in tops.into_iter().chain(globals) {
        let mut type_writer = IndentedWriter::new();
        match csharp::write_user_type(
            &factory,
            module,
            id,
            &mut type_writer,
            &mut errors,
            options,
            0,
        ) {
            Ok(true) => {
                if !writer.is_empty() {
                    writer.blank_line();
                }
                writer.append_raw(type_writer.as_str());
            }
            Ok(false) => {}
            Err(error) => {
                let name = &factory.get(id).native_name;
                warn!(module = %module_name, %name, %error, "type skipped");
                errors.push(format!("type '{name}' skipped: {error}"));
            }
        }
    }

    Ok(GeneratedCode {
        source: writer.into_inner(),
        errors: errors.into_lines(),
    })
}

/// Generates wrapper source from a symbol file, module by module.
///
/// Each module is validated before generation.
///
/// # Errors
/// Returns `CodegenError` if parsing, validation or generation fails.
pub fn generate_from_xml(
    xml: &str,
    options: &GenerationOptions,
) -> Result<GeneratedCode, CodegenError> {
    let provider = parse_symbols(xml)?;
    let mappings = TypeMappings::new();

    let mut source = String::new();
    let mut errors = Vec::new();
    for module_name in provider.module_names() {
        validate_module(provider.module(&module_name)?)?;
        let generated = generate_module(&provider, &module_name, &mappings, options)?;
        if !source.is_empty() && !generated.source.is_empty() {
            source.push('\n');
        }
        source.push_str(&generated.source);
        errors.extend(generated.errors);
    }

    Ok(GeneratedCode { source, errors })
}

/// Generates wrapper source from a symbol file on disk.
///
/// # Errors
/// Returns `CodegenError` if reading, parsing, validation or generation
/// fails.
pub fn generate_from_file(
    path: &std::path::Path,
    options: &GenerationOptions,
) -> Result<GeneratedCode, CodegenError> {
    let xml = std::fs::read_to_string(path)?;
    generate_from_xml(&xml, options)
}
