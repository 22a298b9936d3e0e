//! Name lookup through modules.
//!
//! Unqualified names resolve in this order:
//!
//! 1. definitions of the module itself;
//! 2. the import table naming the symbol, followed to the module that
//!    actually defines it (re-exports are followed up to
//!    `SchemaConfig::max_import_depth` hops, and every hop must export it);
//! 3. for a dummy module only, any other module exporting the name;
//! 4. the core module.
//!
//! Qualified names (`Module.name`) go straight to step 2 for the named module.

use asn_ir::{ModuleId, ModuleRef, Name, RefName, TypeId};

use super::{Module, ValueDefId};
use crate::error::{Result, SchemaError};
use crate::schema::Schema;
use crate::suggest::similar_names;
use crate::types::ValidationState;

const MAX_SUGGESTIONS: usize = 3;

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
enum Namespace {
    Type,
    Value,
}

impl Namespace {
    #[cold]
    fn unresolved(self, name: impl Into<String>) -> SchemaError {
        match self {
            Namespace::Type => SchemaError::unresolved_type(name),
            Namespace::Value => SchemaError::unresolved_value(name),
        }
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
enum Symbol {
    Type(TypeId),
    Value(ValueDefId),
}

impl Schema {
    /// Resolve an unqualified type name as seen from module `module`.
    pub fn lookup_type_in(&self, module: ModuleId, name: Name) -> Result<TypeId> {
        match self.lookup(module, Namespace::Type, name)? {
            Symbol::Type(id) => Ok(id),
            Symbol::Value(_) => Err(Namespace::Type.unresolved(self.name_str(name))),
        }
    }

    /// Resolve an unqualified value name as seen from module `module`.
    pub fn lookup_value_in(&self, module: ModuleId, name: Name) -> Result<ValueDefId> {
        match self.lookup(module, Namespace::Value, name)? {
            Symbol::Value(def) => Ok(def),
            Symbol::Type(_) => Err(Namespace::Value.unresolved(self.name_str(name))),
        }
    }

    /// Resolve `Module.Type`.
    pub fn lookup_qualified_type(&self, name: &RefName) -> Result<TypeId> {
        match self.lookup_qualified(Namespace::Type, name)? {
            Symbol::Type(id) => Ok(id),
            Symbol::Value(_) => Err(Namespace::Type.unresolved(self.name_str(name.name))),
        }
    }

    /// Resolve `Module.value`.
    pub fn lookup_qualified_value(&self, name: &RefName) -> Result<ValueDefId> {
        match self.lookup_qualified(Namespace::Value, name)? {
            Symbol::Value(def) => Ok(def),
            Symbol::Type(_) => Err(Namespace::Value.unresolved(self.name_str(name.name))),
        }
    }

    /// Find the module an import or qualified reference names.
    pub fn resolve_module_ref(&self, target: &ModuleRef) -> Result<ModuleId> {
        self.resolver.resolve(&self.modules, target).ok_or_else(|| {
            let name = self.name_str(target.name);
            let known = self.modules.iter().map(|m| self.name_str(m.name));
            SchemaError::unresolved_module(name)
                .with_similar(similar_names(name, known, MAX_SUGGESTIONS))
        })
    }

    fn lookup(&self, module: ModuleId, ns: Namespace, name: Name) -> Result<Symbol> {
        let current = self.module(module)?;
        if let Some(symbol) = self.local_symbol(module, ns, name) {
            return Ok(symbol);
        }

        if let Some(table) = current.imports.iter().find(|t| t.imports(name)) {
            let from = self.resolve_module_ref(&table.from)?;
            let defining = self.exported_symbol(from, name, 0)?;
            return self
                .local_symbol(defining, ns, name)
                .ok_or_else(|| ns.unresolved(self.name_str(name)));
        }

        if current.dummy {
            if let Some((found, symbol)) = self.dummy_fallback(module, ns, name) {
                tracing::debug!(
                    name = self.name_str(name),
                    from = self.name_str(self.modules[found.index()].name),
                    "dummy module resolved name by exhaustive search"
                );
                return Ok(symbol);
            }
        }

        if let Some(core) = self.core_module().filter(|core| *core != module) {
            if let Some(symbol) = self.local_symbol(core, ns, name) {
                return Ok(symbol);
            }
        }

        let target = self.name_str(name);
        Err(ns
            .unresolved(target)
            .with_similar(similar_names(target, self.visible_names(current, ns), MAX_SUGGESTIONS)))
    }

    fn lookup_qualified(&self, ns: Namespace, name: &RefName) -> Result<Symbol> {
        let Some(module_name) = name.module else {
            return Err(SchemaError::illegal_state("qualified lookup of a local name"));
        };
        let module = self.resolve_module_ref(&ModuleRef::named(module_name))?;
        let defining = self.exported_symbol(module, name.name, 0)?;
        self.local_symbol(defining, ns, name.name).ok_or_else(|| {
            ns.unresolved(format!(
                "{}.{}",
                self.name_str(module_name),
                self.name_str(name.name)
            ))
        })
    }

    /// Module that defines `name` as exported by `module`, following
    /// re-exports.
    pub(crate) fn exported_symbol(
        &self,
        module: ModuleId,
        name: Name,
        depth: usize,
    ) -> Result<ModuleId> {
        let exporting = self.module(module)?;
        let qualified = || format!("{}.{}", self.name_str(exporting.name), self.name_str(name));
        if depth > self.config.max_import_depth || !exporting.exports.exports(name) {
            return Err(SchemaError::not_exported(qualified()));
        }
        if exporting.defines(name) {
            return Ok(module);
        }
        match exporting.imports.iter().find(|t| t.imports(name)) {
            Some(table) => {
                let next = self.resolve_module_ref(&table.from)?;
                self.exported_symbol(next, name, depth + 1)
            }
            None => Err(SchemaError::unresolved(
                asn_diagnostic::ErrorCode::E1001,
                crate::error::SymbolKind::Symbol,
                qualified(),
            )),
        }
    }

    fn local_symbol(&self, module: ModuleId, ns: Namespace, name: Name) -> Option<Symbol> {
        match ns {
            Namespace::Type => self.defined_type(module, name).map(Symbol::Type),
            Namespace::Value => self.defined_value(module, name).map(Symbol::Value),
        }
    }

    /// First other (non-dummy, live) module exporting `name`.
    fn dummy_fallback(
        &self,
        module: ModuleId,
        ns: Namespace,
        name: Name,
    ) -> Option<(ModuleId, Symbol)> {
        self.modules
            .iter()
            .enumerate()
            .filter(|(index, other)| {
                *index != module.index()
                    && !other.dummy
                    && other.state != ValidationState::Disposed
                    && other.exports.exports(name)
            })
            .find_map(|(index, _)| {
                let id = ModuleId::from_raw(u32::try_from(index).ok()?);
                self.local_symbol(id, ns, name).map(|symbol| (id, symbol))
            })
    }

    /// Names a lookup from `module` could have found, for suggestions.
    fn visible_names<'a>(
        &'a self,
        module: &'a Module,
        ns: Namespace,
    ) -> impl Iterator<Item = &'a str> + 'a {
        let core = self.core_module().and_then(|core| self.module(core).ok());
        let defined = move |m: &'a Module| -> Box<dyn Iterator<Item = Name> + 'a> {
            match ns {
                Namespace::Type => Box::new(m.types.names()),
                Namespace::Value => Box::new(m.values.names()),
            }
        };
        defined(module)
            .chain(module.imports.iter().flat_map(|t| t.symbols.iter().copied()))
            .chain(core.into_iter().flat_map(defined))
            .map(|name| self.name_str(name))
    }
}
