//! The schema: arena of types, modules and the services they share.
//!
//! ```text
//! Schema
//!   ├── StringInterner      names
//!   ├── TypePool            every type, addressed by TypeId
//!   ├── Vec<Module>         addressed by ModuleId; the core module first
//!   ├── ModuleResolver      import → module
//!   └── SchemaConfig        defaults for new modules, import depth
//! ```
//!
//! The engine is single threaded and synchronous. Validation takes
//! `&mut self`; the codec-facing queries (`optimize`, `family`, `encoding`,
//! ...) take `&self`.

use std::cell::OnceCell;

use asn_ir::{FieldPath, ModuleId, Name, StringInterner, TypeId};
use rustc_hash::FxHashMap;

use crate::config::SchemaConfig;
use crate::error::{Result, SchemaError};
use crate::module::{CoreRegistry, DefaultModuleResolver, Module, ModuleResolver};
use crate::template::ArgumentKey;
use crate::types::{TimeFormats, TypePool};

/// A schema under construction or validated.
pub struct Schema {
    pub(crate) interner: StringInterner,
    pub(crate) types: TypePool,
    pub(crate) modules: Vec<Module>,
    pub(crate) config: SchemaConfig,
    core: Option<ModuleId>,
    pub(crate) resolver: Box<dyn ModuleResolver>,
    time_formats: OnceCell<TimeFormats>,
    /// Instances being validated, keyed by template and argument identity.
    pub(crate) instantiating: FxHashMap<(TypeId, Vec<ArgumentKey>), TypeId>,
}

impl Schema {
    /// A schema with the standard core module (unless `config` disables it).
    pub fn new(config: SchemaConfig) -> Result<Self> {
        Self::with_registry(config, &CoreRegistry::standard())
    }

    /// A schema whose core module holds the definitions of `registry`.
    pub fn with_registry(config: SchemaConfig, registry: &CoreRegistry) -> Result<Self> {
        let install = config.install_core;
        let mut schema = Schema {
            interner: StringInterner::new(),
            types: TypePool::new(),
            modules: Vec::new(),
            config,
            core: None,
            resolver: Box::new(DefaultModuleResolver),
            time_formats: OnceCell::new(),
            instantiating: FxHashMap::default(),
        };
        if install {
            schema.core = Some(registry.install(&mut schema)?);
        }
        Ok(schema)
    }

    /// Replace the module resolver.
    #[must_use]
    pub fn with_resolver(mut self, resolver: impl ModuleResolver + 'static) -> Self {
        self.resolver = Box::new(resolver);
        self
    }

    pub fn config(&self) -> &SchemaConfig {
        &self.config
    }

    /// The built-in registry module, when installed.
    pub fn core_module(&self) -> Option<ModuleId> {
        self.core
    }

    pub fn interner(&self) -> &StringInterner {
        &self.interner
    }

    pub fn intern(&self, name: &str) -> Name {
        self.interner.intern(name)
    }

    pub fn name_str(&self, name: Name) -> &str {
        self.interner.lookup(name)
    }

    pub fn types(&self) -> &TypePool {
        &self.types
    }

    /// `&a.&b` for messages.
    pub fn render_path(&self, path: &FieldPath) -> String {
        let parts: Vec<&str> = path.fields().iter().map(|n| self.name_str(*n)).collect();
        parts.join(".")
    }

    /// Compiled ISO 8601 recognizers, built on first use.
    pub(crate) fn time_formats(&self) -> Result<&TimeFormats> {
        if let Some(formats) = self.time_formats.get() {
            return Ok(formats);
        }
        let formats = TimeFormats::new()
            .map_err(|err| SchemaError::illegal_state(format!("time format table: {err}")))?;
        Ok(self.time_formats.get_or_init(|| formats))
    }

    /// Dispose every module. Idempotent.
    pub fn dispose(&mut self) -> Result<()> {
        for index in 0..self.modules.len() {
            let id = ModuleId::from_raw(
                u32::try_from(index).map_err(|_| SchemaError::unsupported("too many modules"))?,
            );
            self.dispose_module(id)?;
        }
        self.instantiating.clear();
        Ok(())
    }
}

impl std::fmt::Debug for Schema {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Schema")
            .field("types", &self.types.len())
            .field("modules", &self.modules.len())
            .field("core", &self.core)
            .finish_non_exhaustive()
    }
}
