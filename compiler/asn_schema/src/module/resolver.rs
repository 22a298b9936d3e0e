//! Locating modules named by imports.

use asn_ir::{ModuleId, ModuleRef};

use super::Module;
use crate::types::ValidationState;

/// Maps a module reference to one of the schema's modules.
///
/// Hosts that load modules lazily or alias them install their own resolver
/// with `Schema::with_resolver`.
pub trait ModuleResolver {
    fn resolve(&self, modules: &[Module], target: &ModuleRef) -> Option<ModuleId>;
}

/// OID match first, then name match. Disposed modules are skipped.
#[derive(Copy, Clone, Debug, Default)]
pub struct DefaultModuleResolver;

impl ModuleResolver for DefaultModuleResolver {
    fn resolve(&self, modules: &[Module], target: &ModuleRef) -> Option<ModuleId> {
        let live = || {
            modules
                .iter()
                .enumerate()
                .filter(|(_, m)| m.state != ValidationState::Disposed)
        };
        let by_oid = target.oid.as_ref().and_then(|oid| {
            live().find(|(_, m)| m.options.oid.as_ref() == Some(oid))
        });
        let (index, _) = by_oid.or_else(|| live().find(|(_, m)| m.name == target.name))?;
        u32::try_from(index).ok().map(ModuleId::from_raw)
    }
}
