//! Symbol validation utilities.
//!
//! Checks a parsed or engine-provided module for internal consistency before
//! code generation begins.

use crate::error::SymbolError;
use crate::types::{Module, SymTag, Symbol};

/// Validates a module's symbol graph.
///
/// # Arguments
/// * `module` - The module to validate
///
/// # Returns
/// Ok(()) if consistent, or the first `SymbolError` found.
///
/// # Errors
/// Returns `SymbolError` if a symbol references a missing id, a bit-field
/// exceeds its storage, an enum declares an unsupported underlying width, or
/// a field lies outside its enclosing type.
pub fn validate_module(module: &Module) -> Result<(), SymbolError> {
    for id in module.ids() {
        let symbol = module.symbol(id)?;
        validate_references(module, symbol)?;

        match symbol.tag {
            SymTag::Enum => validate_enum(symbol)?,
            SymTag::Udt => validate_udt(module, symbol)?,
            _ => {}
        }
    }
    Ok(())
}

/// Checks that all ids a symbol references resolve within the module.
fn validate_references(module: &Module, symbol: &Symbol) -> Result<(), SymbolError> {
    if let Some(type_id) = symbol.type_id {
        if module.symbol(type_id).is_err() {
            return Err(SymbolError::DanglingReference {
                symbol: symbol.name.clone(),
                referenced: type_id.0,
            });
        }
    }
    for &child in &symbol.children {
        if module.symbol(child).is_err() {
            return Err(SymbolError::DanglingReference {
                symbol: symbol.name.clone(),
                referenced: child.0,
            });
        }
    }
    Ok(())
}

/// Checks an enum's underlying width.
fn validate_enum(symbol: &Symbol) -> Result<(), SymbolError> {
    if !matches!(symbol.size, 0 | 1 | 2 | 4 | 8) {
        return Err(SymbolError::InvalidEnumWidth {
            name: symbol.name.clone(),
            size: symbol.size,
        });
    }
    Ok(())
}

/// Checks a UDT's members: offsets within the type, bit ranges within their
/// storage units.
fn validate_udt(module: &Module, symbol: &Symbol) -> Result<(), SymbolError> {
    for &child in &symbol.children {
        let member = module.symbol(child)?;
        match member.tag {
            SymTag::Data if !member.is_static => {
                if symbol.size != 0 && member.offset >= symbol.size {
                    return Err(SymbolError::FieldOutsideType {
                        field: member.name.clone(),
                        offset: member.offset,
                        size: symbol.size,
                    });
                }
            }
            SymTag::BitField => {
                let storage_bits = member
                    .type_id
                    .and_then(|id| module.symbol(id).ok())
                    .map(|storage| storage.size as u32 * 8)
                    .unwrap_or(0);
                if let Some(range) = member.bit_range {
                    if range.position + range.length > storage_bits {
                        return Err(SymbolError::InvalidBitField {
                            symbol: member.name.clone(),
                            position: range.position,
                            length: range.length,
                            storage_bits,
                        });
                    }
                }
            }
            _ => {}
        }
    }
    Ok(())
}
