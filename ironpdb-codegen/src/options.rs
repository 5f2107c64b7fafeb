//! Generation options.

/// Configuration flags for one generation run.
///
/// All flags default to off; the defaults reproduce the plainest output.
#[derive(Debug, Clone, Default)]
pub struct GenerationOptions {
    /// Emit a comment above each declaration naming its native origin
    /// (type name, field type and offset).
    pub field_type_info_comments: bool,
    /// Include provider-sourced auto-generated accessor fields in the
    /// globals type.
    pub provider_generated_fields: bool,
    /// Render bit-field accessors as explicit shift/mask expressions instead
    /// of `GetBitField` calls.
    pub raw_bit_shift_accessors: bool,
    /// Emit every template specialization as its own closed class instead of
    /// one generic class per template.
    pub expand_template_specializations: bool,
    /// Namespace wrapped around generated top-level types when no naming
    /// override relocates them.
    pub default_namespace: Option<String>,
}

impl GenerationOptions {
    /// Creates the default option set.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_are_off() {
        let options = GenerationOptions::new();
        assert!(!options.field_type_info_comments);
        assert!(!options.provider_generated_fields);
        assert!(!options.raw_bit_shift_accessors);
        assert!(!options.expand_template_specializations);
        assert!(options.default_namespace.is_none());
    }
}
