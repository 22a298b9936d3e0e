//! Modules: named collections of type and value definitions.
//!
//! A module owns two ordered resolvers (types, values), its import tables and
//! its export list. Name lookup through a module lives in [`resolve`];
//! locating the module an import names is delegated to a pluggable
//! [`ModuleResolver`].
//!
//! # Validation
//!
//! `Schema::validate_module` checks the import tables, then validates every
//! non-parameterized definition in declaration order. Definitions reached
//! earlier through references are already terminal and are skipped.

mod core;
mod resolve;
mod resolver;
mod values;

pub use self::core::{CoreEntry, CoreRegistry};
pub use resolver::{DefaultModuleResolver, ModuleResolver};

use asn_diagnostic::ErrorCode;
use asn_ir::{ModuleId, ModuleRef, Name, TypeId};
use rustc_hash::FxHashMap;

use crate::config::ModuleOptions;
use crate::error::{Result, SchemaError};
use crate::refs::TypeRef;
use crate::schema::Schema;
use crate::scope::Scope;
use crate::template::Template;
use crate::types::{TypeKind, ValidationState};
use crate::value::Value;

/// Handle to a value definition: its module and position.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub struct ValueDefId {
    pub module: ModuleId,
    pub index: u32,
}

/// A value assignment: `name Type ::= value`, or `name{params} Type ::= value`.
#[derive(Clone, Debug, PartialEq)]
pub struct DefinedValue {
    pub name: Name,
    pub module: ModuleId,
    /// Declared type; may name a template parameter.
    pub ty: TypeRef,
    /// Value as written.
    pub value: Value,
    pub template: Option<Template>,
    pub state: ValidationState,
    pub resolved_type: Option<TypeId>,
    /// Optimized form, once valid.
    pub optimized: Option<Value>,
}

impl DefinedValue {
    pub fn new(name: Name, module: ModuleId, ty: TypeRef, value: Value) -> Self {
        DefinedValue {
            name,
            module,
            ty,
            value,
            template: None,
            state: ValidationState::Unvalidated,
            resolved_type: None,
            optimized: None,
        }
    }
}

/// Ordered name → definition map.
#[derive(Clone, Debug)]
pub struct Resolver<T> {
    entries: Vec<(Name, T)>,
    index: FxHashMap<Name, usize>,
}

impl<T> Default for Resolver<T> {
    fn default() -> Self {
        Resolver {
            entries: Vec::new(),
            index: FxHashMap::default(),
        }
    }
}

impl<T> Resolver<T> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a definition; names are unique per resolver.
    ///
    /// Returns the position of the new entry.
    pub fn define(&mut self, name: Name, item: T) -> Result<usize> {
        if self.index.contains_key(&name) {
            return Err(SchemaError::validation(
                ErrorCode::E2002,
                "duplicate definition in module",
            ));
        }
        let position = self.entries.len();
        self.entries.push((name, item));
        self.index.insert(name, position);
        Ok(position)
    }

    pub fn get(&self, name: Name) -> Option<&T> {
        self.position(name).map(|i| &self.entries[i].1)
    }

    pub fn position(&self, name: Name) -> Option<usize> {
        self.index.get(&name).copied()
    }

    pub fn at(&self, position: usize) -> Option<&T> {
        self.entries.get(position).map(|(_, item)| item)
    }

    pub fn at_mut(&mut self, position: usize) -> Option<&mut T> {
        self.entries.get_mut(position).map(|(_, item)| item)
    }

    pub fn contains(&self, name: Name) -> bool {
        self.index.contains_key(&name)
    }

    /// Definitions in declaration order.
    pub fn iter(&self) -> impl Iterator<Item = &(Name, T)> {
        self.entries.iter()
    }

    pub fn names(&self) -> impl Iterator<Item = Name> + '_ {
        self.entries.iter().map(|(name, _)| *name)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn clear(&mut self) {
        self.entries.clear();
        self.index.clear();
    }
}

/// `EXPORTS`.
#[derive(Clone, Debug, PartialEq, Eq, Default)]
pub enum Exports {
    /// No EXPORTS clause, or `EXPORTS ALL`.
    #[default]
    All,
    /// `EXPORTS a, B, ...`.
    Only(Vec<Name>),
}

impl Exports {
    pub fn exports(&self, name: Name) -> bool {
        match self {
            Exports::All => true,
            Exports::Only(names) => names.contains(&name),
        }
    }
}

/// `a, B FROM Other-Module`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ImportTable {
    pub from: ModuleRef,
    pub symbols: Vec<Name>,
}

impl ImportTable {
    pub fn new(from: ModuleRef, symbols: Vec<Name>) -> Self {
        ImportTable { from, symbols }
    }

    pub fn imports(&self, name: Name) -> bool {
        self.symbols.contains(&name)
    }
}

/// A module.
#[derive(Clone, Debug)]
pub struct Module {
    pub name: Name,
    pub options: ModuleOptions,
    /// Imports every symbol any other module exports.
    pub dummy: bool,
    pub exports: Exports,
    pub imports: Vec<ImportTable>,
    pub types: Resolver<TypeId>,
    pub values: Resolver<DefinedValue>,
    pub state: ValidationState,
}

impl Module {
    pub fn new(name: Name, options: ModuleOptions) -> Self {
        Module {
            name,
            options,
            dummy: false,
            exports: Exports::All,
            imports: Vec::new(),
            types: Resolver::new(),
            values: Resolver::new(),
            state: ValidationState::Unvalidated,
        }
    }

    /// Whether `name` is defined here as a type or a value.
    pub fn defines(&self, name: Name) -> bool {
        self.types.contains(name) || self.values.contains(name)
    }
}

impl Schema {
    /// Validate every definition of module `id`.
    ///
    /// Runs once; a failed module keeps its error and later calls return Ok.
    #[tracing::instrument(level = "debug", skip(self))]
    pub fn validate_module(&mut self, id: ModuleId) -> Result<()> {
        match &self.module(id)?.state {
            ValidationState::Unvalidated => {}
            ValidationState::Validating | ValidationState::Valid | ValidationState::Invalid(_) => {
                return Ok(())
            }
            ValidationState::Disposed => {
                return Err(SchemaError::illegal_state("module validated after disposal"))
            }
        }
        self.module_mut(id)?.state = ValidationState::Validating;
        let result = self.validate_definitions(id);
        self.module_mut(id)?.state = match &result {
            Ok(()) => ValidationState::Valid,
            Err(err) => ValidationState::Invalid(err.clone()),
        };
        result
    }

    fn validate_definitions(&mut self, id: ModuleId) -> Result<()> {
        self.check_imports(id)?;

        let scope = Scope::module(id);
        let module = self.module(id)?;
        let types: Vec<TypeId> = module.types.iter().map(|(_, ty)| *ty).collect();
        let values = module.values.len();

        for ty in types {
            if let TypeKind::Defined(defined) = self.types.kind(ty)? {
                if defined.template.is_some() {
                    continue;
                }
            }
            self.validate_type(ty, &scope)?;
            self.ensure_usable(ty)?;
        }
        for index in 0..values {
            let def = ValueDefId {
                module: id,
                index: u32::try_from(index)
                    .map_err(|_| SchemaError::unsupported("too many value definitions"))?,
            };
            self.validate_defined_value(def)?;
            if self.value_def(def)?.template.is_none() {
                self.value_of(def)?;
            }
        }
        Ok(())
    }

    /// Every import table names a known module that exports the symbols.
    fn check_imports(&self, id: ModuleId) -> Result<()> {
        for table in &self.module(id)?.imports {
            let from = self.resolve_module_ref(&table.from)?;
            for symbol in &table.symbols {
                self.exported_symbol(from, *symbol, 0)?;
            }
        }
        Ok(())
    }

    /// Validate all modules in creation order.
    pub fn validate_all(&mut self) -> Result<()> {
        for index in 0..self.modules.len() {
            let id = ModuleId::from_raw(
                u32::try_from(index).map_err(|_| SchemaError::unsupported("too many modules"))?,
            );
            if self.modules[index].state != ValidationState::Disposed {
                self.validate_module(id)?;
            }
        }
        Ok(())
    }

    /// Dispose the definitions of module `id` and clear its maps. Idempotent.
    pub fn dispose_module(&mut self, id: ModuleId) -> Result<()> {
        if self.module_mut(id)?.state == ValidationState::Disposed {
            return Ok(());
        }
        let types: Vec<TypeId> = self.module(id)?.types.iter().map(|(_, ty)| *ty).collect();
        for ty in types {
            self.dispose_type(ty)?;
        }
        let module = self.module_mut(id)?;
        module.types.clear();
        module.values.clear();
        module.imports.clear();
        module.state = ValidationState::Disposed;
        Ok(())
    }

    /// Module `id`.
    pub fn module(&self, id: ModuleId) -> Result<&Module> {
        self.modules
            .get(id.index())
            .ok_or_else(|| SchemaError::illegal_state(format!("unknown module handle {id:?}")))
    }

    pub(crate) fn module_mut(&mut self, id: ModuleId) -> Result<&mut Module> {
        self.modules
            .get_mut(id.index())
            .ok_or_else(|| SchemaError::illegal_state(format!("unknown module handle {id:?}")))
    }

    /// All modules, indexed by `ModuleId`.
    pub fn modules(&self) -> &[Module] {
        &self.modules
    }

    /// Type defined as `name` in module `id`, without import resolution.
    pub fn defined_type(&self, id: ModuleId, name: Name) -> Option<TypeId> {
        self.module(id).ok()?.types.get(name).copied()
    }

    /// Value defined as `name` in module `id`, without import resolution.
    pub fn defined_value(&self, id: ModuleId, name: Name) -> Option<ValueDefId> {
        let position = self.module(id).ok()?.values.position(name)?;
        Some(ValueDefId {
            module: id,
            index: u32::try_from(position).ok()?,
        })
    }
}
