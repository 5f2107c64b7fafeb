//! User-type factory.
//!
//! The factory is the generation-run context: a registry mapping
//! `(module, native name)` to one [`UserType`] instance, populated once per
//! run and discarded (or explicitly [cleared](UserTypeFactory::clear))
//! afterwards. Generators resolve field types through [`lookup`] so the same
//! native type always maps to the same generated declaration.
//!
//! [`lookup`]: UserTypeFactory::lookup

use crate::error::CodegenError;
use crate::options::GenerationOptions;
use crate::typetree::native_arg_to_csharp;
use crate::usertype::{
    TemplateData, UserType, UserTypeId, UserTypeKind, parse_template_name, sanitize_identifier,
    split_scoped_name,
};
use ironpdb_symbols::{Module, SymTag, SymbolId, TypeMappings};
use std::collections::HashMap;
use tracing::debug;

/// Default class name of the module-globals holder.
const GLOBALS_CLASS_NAME: &str = "ModuleGlobals";

/// Registry of generated user types for one generation run.
#[derive(Debug)]
pub struct UserTypeFactory {
    types: Vec<UserType>,
    index: HashMap<(String, String), UserTypeId>,
    template_partitions: HashMap<(String, String), Vec<UserTypeId>>,
    template_class_names: HashMap<(String, String), String>,
    name_uses: HashMap<(String, Option<u32>, String, String), u32>,
    mappings: TypeMappings,
    expand_specializations: bool,
    default_namespace: String,
}

impl UserTypeFactory {
    /// Creates a factory for one generation run.
    #[must_use]
    pub fn new(mappings: TypeMappings, options: &GenerationOptions) -> Self {
        Self {
            types: Vec::new(),
            index: HashMap::new(),
            template_partitions: HashMap::new(),
            template_class_names: HashMap::new(),
            name_uses: HashMap::new(),
            mappings,
            expand_specializations: options.expand_template_specializations,
            default_namespace: options.default_namespace.clone().unwrap_or_default(),
        }
    }

    /// Exact-match lookup by module and native name.
    #[must_use]
    pub fn lookup(&self, module: &str, native_name: &str) -> Option<UserTypeId> {
        self.index
            .get(&(module.to_string(), native_name.to_string()))
            .copied()
    }

    /// Returns the user type with the given factory-issued id.
    #[must_use]
    pub fn get(&self, id: UserTypeId) -> &UserType {
        &self.types[id.index()]
    }

    /// Returns the number of registered user types.
    #[must_use]
    pub fn len(&self) -> usize {
        self.types.len()
    }

    /// Returns true if no user types are registered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.types.is_empty()
    }

    /// Iterates over all registered ids in creation order.
    pub fn ids(&self) -> impl Iterator<Item = UserTypeId> + '_ {
        (0..self.types.len() as u32).map(UserTypeId)
    }

    /// Returns true if specializations expand to closed classes.
    #[must_use]
    pub fn expand_specializations(&self) -> bool {
        self.expand_specializations
    }

    /// Returns the user types declared inside the given type, ordered by
    /// class name.
    #[must_use]
    pub fn nested_types(&self, id: UserTypeId) -> Vec<UserTypeId> {
        let mut nested: Vec<UserTypeId> = self
            .ids()
            .filter(|&candidate| self.get(candidate).declared_in == Some(id))
            .collect();
        nested.sort_by(|&a, &b| self.get(a).class_name.cmp(&self.get(b).class_name));
        nested
    }

    /// Returns all specializations of a template base name, in creation
    /// order.
    #[must_use]
    pub fn specializations(&self, module: &str, base_name: &str) -> &[UserTypeId] {
        self.template_partitions
            .get(&(module.to_string(), base_name.to_string()))
            .map(Vec::as_slice)
            .unwrap_or_default()
    }

    /// Returns the canonical (first-created) specialization of a template
    /// base, used for contexts that cannot address an unbound generic.
    #[must_use]
    pub fn canonical_specialization(&self, module: &str, base_name: &str) -> Option<UserTypeId> {
        self.specializations(module, base_name).first().copied()
    }

    /// Creates the user type for a symbol, or returns the existing instance.
    ///
    /// Idempotent: the same `(module, symbol)` pair always yields the same
    /// id. Variant selection follows the ordered policy: enum tag first,
    /// template syntax second, module scope third, plain otherwise.
    ///
    /// # Errors
    /// Returns `CodegenError` if a referenced symbol id does not resolve.
    pub fn create_or_get(
        &mut self,
        module: &Module,
        symbol_id: SymbolId,
    ) -> Result<UserTypeId, CodegenError> {
        let symbol = module.symbol(symbol_id)?;
        let key = (module.name.clone(), symbol.name.clone());
        if let Some(&id) = self.index.get(&key) {
            return Ok(id);
        }

        let native_name = symbol.name.clone();
        let tag = symbol.tag;
        let is_template = symbol.is_template();

        // Nesting: a scope-qualified name declares the type inside its
        // parent. The parent never owns the child; both live in the
        // registry.
        let declared_in = match split_scoped_name(&native_name) {
            Some((parent, _)) if tag != SymTag::Exe => match module.type_by_name(parent) {
                Some(parent_symbol) => Some(self.create_or_get(module, parent_symbol)?),
                None => None,
            },
            _ => None,
        };

        let xml_type = self.mappings.lookup(&module.name, &native_name).cloned();
        let namespace = xml_type
            .as_ref()
            .and_then(|x| x.namespace.clone())
            .unwrap_or_else(|| self.default_namespace.clone());

        let leaf = split_scoped_name(&native_name)
            .map(|(_, leaf)| leaf)
            .unwrap_or(&native_name)
            .to_string();

        let (kind, class_name) = if tag == SymTag::Enum {
            let candidate = xml_type
                .as_ref()
                .map(|x| x.name.clone())
                .unwrap_or_else(|| sanitize_identifier(&leaf));
            let class_name =
                self.resolve_collision(&module.name, declared_in, &namespace, candidate);
            (UserTypeKind::Enum, class_name)
        } else if is_template {
            let (base_name, args) =
                parse_template_name(&native_name).unwrap_or((native_name.clone(), Vec::new()));
            let class_name = self.template_class_name(
                module,
                declared_in,
                &namespace,
                &base_name,
                &native_name,
                xml_type.as_ref().map(|x| x.name.as_str()),
            );
            (
                UserTypeKind::Template(TemplateData { base_name, args }),
                class_name,
            )
        } else if tag == SymTag::Exe {
            let candidate = xml_type
                .as_ref()
                .map(|x| x.name.clone())
                .unwrap_or_else(|| GLOBALS_CLASS_NAME.to_string());
            let class_name =
                self.resolve_collision(&module.name, declared_in, &namespace, candidate);
            (UserTypeKind::Globals, class_name)
        } else {
            let candidate = xml_type
                .as_ref()
                .map(|x| x.name.clone())
                .unwrap_or_else(|| sanitize_identifier(&leaf));
            let class_name =
                self.resolve_collision(&module.name, declared_in, &namespace, candidate);
            (UserTypeKind::Plain, class_name)
        };

        let id = UserTypeId(self.types.len() as u32);
        debug!(
            module = %module.name,
            name = %native_name,
            class = %class_name,
            variant = kind_name(&kind),
            "created user type"
        );

        if let UserTypeKind::Template(data) = &kind {
            self.template_partitions
                .entry((module.name.clone(), data.base_name.clone()))
                .or_default()
                .push(id);
        }

        self.types.push(UserType {
            module: module.name.clone(),
            symbol: symbol_id,
            xml_type,
            namespace,
            declared_in,
            class_name,
            native_name,
            kind,
        });
        self.index.insert(key, id);
        Ok(id)
    }

    /// Populates the factory with every top-level type of a module plus its
    /// globals holder.
    ///
    /// Types are created in name order so canonical template specializations
    /// and collision suffixes are deterministic.
    ///
    /// # Errors
    /// Returns `CodegenError` if a symbol reference does not resolve.
    pub fn populate(&mut self, module: &Module) -> Result<(), CodegenError> {
        let mut tops: Vec<(String, SymbolId)> = module
            .top_level_types()
            .iter()
            .filter_map(|&id| {
                let symbol = module.symbol(id).ok()?;
                if !matches!(symbol.tag, SymTag::Udt | SymTag::Enum) || symbol.name.is_empty() {
                    return None;
                }
                Some((symbol.name.clone(), id))
            })
            .collect();
        tops.sort();

        for (_, symbol_id) in tops {
            self.create_or_get(module, symbol_id)?;
        }
        if let Some(scope) = module.global_scope() {
            self.create_or_get(module, scope)?;
        }
        debug!(module = %module.name, types = self.types.len(), "factory populated");
        Ok(())
    }

    /// Returns the fully-qualified generated name of a user type.
    ///
    /// Nested declarations chain through their parent; an enum nested in a
    /// template routes through the canonical specialization, since an enum
    /// cannot be addressed through an unbound generic.
    #[must_use]
    pub fn full_class_name(&self, id: UserTypeId) -> String {
        let user_type = self.get(id);
        match user_type.declared_in {
            Some(parent_id) => {
                let parent = self.get(parent_id);
                let prefix = if user_type.is_enum()
                    && parent.is_template()
                    && !self.expand_specializations
                {
                    self.specialized_instance_name(parent_id)
                } else {
                    self.full_class_name(parent_id)
                };
                format!("{prefix}.{}", user_type.class_name)
            }
            None => {
                if user_type.namespace.is_empty() {
                    user_type.class_name.clone()
                } else {
                    format!("{}.{}", user_type.namespace, user_type.class_name)
                }
            }
        }
    }

    /// Returns the spelling used when another declaration references this
    /// type: closed generic form for template specializations, the full
    /// class name otherwise.
    #[must_use]
    pub fn reference_name(&self, id: UserTypeId) -> String {
        let user_type = self.get(id);
        match user_type.template_data() {
            Some(data) if !self.expand_specializations => {
                let args: Vec<String> = data
                    .args
                    .iter()
                    .map(|arg| native_arg_to_csharp(self, &user_type.module, arg))
                    .collect();
                format!("{}<{}>", self.full_class_name(id), args.join(", "))
            }
            _ => self.full_class_name(id),
        }
    }

    /// Returns the concrete closed form of a template, using the canonical
    /// specialization.
    #[must_use]
    pub fn specialized_instance_name(&self, template_id: UserTypeId) -> String {
        let user_type = self.get(template_id);
        let canonical = user_type
            .template_data()
            .and_then(|data| self.canonical_specialization(&user_type.module, &data.base_name))
            .unwrap_or(template_id);
        self.reference_name(canonical)
    }

    /// Clears the registry, resetting the factory for a fresh run.
    pub fn clear(&mut self) {
        self.types.clear();
        self.index.clear();
        self.template_partitions.clear();
        self.template_class_names.clear();
        self.name_uses.clear();
    }

    /// Computes the shared class name of a template base, reserving it on
    /// first use so every specialization of the base maps to the same
    /// generated declaration.
    fn template_class_name(
        &mut self,
        module: &Module,
        declared_in: Option<UserTypeId>,
        namespace: &str,
        base_name: &str,
        native_name: &str,
        override_name: Option<&str>,
    ) -> String {
        if self.expand_specializations {
            let candidate = override_name
                .map(str::to_string)
                .unwrap_or_else(|| sanitize_identifier(native_name));
            return self.resolve_collision(&module.name, declared_in, namespace, candidate);
        }

        let partition_key = (module.name.clone(), base_name.to_string());
        if let Some(existing) = self.template_class_names.get(&partition_key) {
            return existing.clone();
        }

        let base_leaf = split_scoped_name(base_name)
            .map(|(_, leaf)| leaf)
            .unwrap_or(base_name);
        let candidate = override_name
            .map(str::to_string)
            .unwrap_or_else(|| sanitize_identifier(base_leaf));
        let class_name = self.resolve_collision(&module.name, declared_in, namespace, candidate);
        self.template_class_names
            .insert(partition_key, class_name.clone());
        class_name
    }

    /// Reserves a class name within its namespace scope, appending an
    /// ordinal suffix when two sanitized names collide.
    fn resolve_collision(
        &mut self,
        module: &str,
        declared_in: Option<UserTypeId>,
        namespace: &str,
        candidate: String,
    ) -> String {
        let key = (
            module.to_string(),
            declared_in.map(|id| id.0),
            namespace.to_string(),
            candidate.clone(),
        );
        let count = self.name_uses.entry(key).or_insert(0);
        *count += 1;
        if *count == 1 {
            candidate
        } else {
            format!("{candidate}_{count}")
        }
    }
}

/// Short variant name for logging.
fn kind_name(kind: &UserTypeKind) -> &'static str {
    match kind {
        UserTypeKind::Plain => "plain",
        UserTypeKind::Enum => "enum",
        UserTypeKind::Template(_) => "template",
        UserTypeKind::Globals => "globals",
    }
}
