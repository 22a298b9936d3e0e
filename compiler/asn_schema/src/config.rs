//! Engine and module configuration.

use crate::encoding::TagMethod;

/// Environment variable overriding [`SchemaConfig::max_import_depth`].
pub const MAX_IMPORT_DEPTH_ENV: &str = "ASN_MAX_IMPORT_DEPTH";

/// Environment variable disabling the core module when set to `0`.
pub const INSTALL_CORE_ENV: &str = "ASN_INSTALL_CORE";

/// Schema-wide settings.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SchemaConfig {
    /// Install the built-in registry module on construction.
    pub install_core: bool,
    /// Name of the built-in registry module.
    pub core_module_name: String,
    /// Tag default for modules that do not state one.
    pub default_tag_method: TagMethod,
    /// Default for `EXTENSIBILITY IMPLIED` on new modules.
    pub extensibility_implied: bool,
    /// Maximum number of re-export hops followed while resolving an import.
    pub max_import_depth: usize,
}

impl Default for SchemaConfig {
    fn default() -> Self {
        SchemaConfig {
            install_core: true,
            core_module_name: "ASN1-CORE".to_owned(),
            default_tag_method: TagMethod::Explicit,
            extensibility_implied: false,
            max_import_depth: 16,
        }
    }
}

impl SchemaConfig {
    /// Defaults, overridden by `ASN_*` environment variables when present.
    ///
    /// Unparseable values are ignored.
    pub fn from_env() -> Self {
        let mut config = Self::default();
        if let Some(depth) = std::env::var(MAX_IMPORT_DEPTH_ENV)
            .ok()
            .and_then(|v| v.trim().parse().ok())
        {
            config.max_import_depth = depth;
        }
        if let Ok(v) = std::env::var(INSTALL_CORE_ENV) {
            config.install_core = !matches!(v.trim(), "0" | "false");
        }
        config
    }

    #[must_use]
    pub fn with_install_core(mut self, install: bool) -> Self {
        self.install_core = install;
        self
    }

    #[must_use]
    pub fn with_core_module_name(mut self, name: impl Into<String>) -> Self {
        self.core_module_name = name.into();
        self
    }

    #[must_use]
    pub fn with_default_tag_method(mut self, method: TagMethod) -> Self {
        self.default_tag_method = method;
        self
    }

    #[must_use]
    pub fn with_extensibility_implied(mut self, implied: bool) -> Self {
        self.extensibility_implied = implied;
        self
    }

    #[must_use]
    pub fn with_max_import_depth(mut self, depth: usize) -> Self {
        self.max_import_depth = depth;
        self
    }

    /// Module options seeded from these defaults.
    pub fn module_options(&self) -> ModuleOptions {
        ModuleOptions {
            tag_method: self.default_tag_method,
            extensibility_implied: self.extensibility_implied,
            oid: None,
        }
    }
}

/// Header settings of one module.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ModuleOptions {
    /// `EXPLICIT TAGS`, `IMPLICIT TAGS` or `AUTOMATIC TAGS`.
    pub tag_method: TagMethod,
    /// `EXTENSIBILITY IMPLIED`.
    pub extensibility_implied: bool,
    /// Module identifier OID.
    pub oid: Option<Vec<u64>>,
}

impl Default for ModuleOptions {
    fn default() -> Self {
        SchemaConfig::default().module_options()
    }
}

impl ModuleOptions {
    #[must_use]
    pub fn with_tag_method(mut self, method: TagMethod) -> Self {
        self.tag_method = method;
        self
    }

    #[must_use]
    pub fn with_extensibility_implied(mut self, implied: bool) -> Self {
        self.extensibility_implied = implied;
        self
    }

    #[must_use]
    pub fn with_oid(mut self, oid: impl Into<Vec<u64>>) -> Self {
        self.oid = Some(oid.into());
        self
    }
}
