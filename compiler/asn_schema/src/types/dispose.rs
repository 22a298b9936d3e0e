//! Disposal of types.

use asn_ir::TypeId;

use super::{CollectionEntry, FieldKind, TypeKind, ValidationState};
use crate::error::Result;
use crate::refs::TypeRef;
use crate::schema::Schema;

impl Schema {
    /// Dispose type `id` and the types it owns. Idempotent.
    ///
    /// Shared and named references are left alone, so a type reachable
    /// through several owners is torn down once.
    pub fn dispose_type(&mut self, id: TypeId) -> Result<()> {
        let mut pending = vec![id];
        while let Some(current) = pending.pop() {
            if *self.types.state(current)? == ValidationState::Disposed {
                continue;
            }
            pending.extend(self.owned_types(current)?);
            self.types.set_state(current, ValidationState::Disposed)?;
        }
        Ok(())
    }

    /// Types owned by `id`: inline siblings and the ones validation created.
    fn owned_types(&self, id: TypeId) -> Result<Vec<TypeId>> {
        let owned = |ty: &TypeRef| ty.owned();
        let mut out = Vec::new();
        match self.types.kind(id)? {
            TypeKind::Builtin(_) | TypeKind::ObjectField(_) => {}
            TypeKind::Defined(defined) => out.extend(owned(&defined.sibling)),
            TypeKind::Tagged(tagged) => out.extend(owned(&tagged.sibling)),
            TypeKind::Constrained(constrained) => out.extend(owned(&constrained.sibling)),
            TypeKind::Selection(selection) => out.extend(owned(&selection.sibling)),
            TypeKind::Instance(instance) => out.extend(instance.resolved),
            TypeKind::Collection(collection) => {
                for entry in &collection.entries {
                    match entry {
                        CollectionEntry::Component(component) => out.extend(owned(&component.ty)),
                        CollectionEntry::ComponentsOf { ty, .. } => out.extend(owned(ty)),
                    }
                }
                // Automatic tag wrappers.
                out.extend(
                    collection
                        .components
                        .iter()
                        .filter(|c| c.resolved != c.base)
                        .filter_map(|c| c.resolved),
                );
            }
            TypeKind::CollectionOf(of) => out.extend(owned(&of.element)),
            TypeKind::Class(class) => {
                for field in &class.fields {
                    match &field.kind {
                        FieldKind::FixedValue { ty, .. } | FieldKind::FixedValueSet { ty } => {
                            out.extend(owned(ty));
                        }
                        FieldKind::Object { class } | FieldKind::ObjectSet { class } => {
                            out.extend(owned(class));
                        }
                        FieldKind::Type
                        | FieldKind::VariableValue { .. }
                        | FieldKind::VariableValueSet { .. } => {}
                    }
                }
            }
            TypeKind::ClassField(field) => out.extend(owned(&field.class)),
        }
        Ok(out)
    }
}
