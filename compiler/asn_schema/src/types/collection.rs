//! SEQUENCE, SET, CHOICE, SEQUENCE OF and SET OF.

use std::rc::Rc;

use asn_diagnostic::ErrorCode;
use asn_ir::{Name, TypeId};
use rustc_hash::FxHashSet;

use super::{not_validated, wrong_kind, TaggedType, TypeKind};
use crate::encoding::{TagEncoding, TagMethod};
use crate::error::{Result, SchemaError};
use crate::family::Family;
use crate::refs::TypeRef;
use crate::schema::Schema;
use crate::scope::Scope;
use crate::value::Value;

#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum CollectionKind {
    Sequence,
    Set,
    Choice,
}

impl CollectionKind {
    pub fn family(self) -> Family {
        match self {
            CollectionKind::Sequence => Family::Sequence,
            CollectionKind::Set => Family::Set,
            CollectionKind::Choice => Family::Choice,
        }
    }
}

/// Where a component sits relative to the extension markers.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum ComponentKind {
    /// Root components before the first extension marker.
    Primary,
    /// Root components after the second extension marker.
    Secondary,
    /// Extension additions.
    Extension,
}

/// A named component of a SEQUENCE/SET or alternative of a CHOICE.
#[derive(Clone, Debug, PartialEq)]
pub struct ComponentType {
    /// Position after COMPONENTS OF expansion.
    pub index: usize,
    pub name: Name,
    /// Version number of an extension addition group.
    pub version: Option<u32>,
    pub optional: bool,
    pub default: Option<Value>,
    pub kind: ComponentKind,
    pub ty: TypeRef,
    /// Brought in by COMPONENTS OF.
    pub inherited: bool,
    /// Resolved component type, before automatic tagging.
    pub base: Option<TypeId>,
    /// Effective component type (the automatic tag wrapper, if any).
    pub resolved: Option<TypeId>,
    /// Optimized default value.
    pub default_value: Option<Value>,
}

impl ComponentType {
    /// A primary component. `OPTIONAL` and `DEFAULT` exclude each other.
    pub fn new(name: Name, ty: TypeRef, optional: bool, default: Option<Value>) -> Result<Self> {
        if optional && default.is_some() {
            return Err(SchemaError::validation(
                ErrorCode::E2003,
                "a component cannot be both OPTIONAL and DEFAULT",
            ));
        }
        Ok(ComponentType {
            index: 0,
            name,
            version: None,
            optional,
            default,
            kind: ComponentKind::Primary,
            ty,
            inherited: false,
            base: None,
            resolved: None,
            default_value: None,
        })
    }

    /// A mandatory primary component.
    pub fn required(name: Name, ty: TypeRef) -> Self {
        ComponentType {
            index: 0,
            name,
            version: None,
            optional: false,
            default: None,
            kind: ComponentKind::Primary,
            ty,
            inherited: false,
            base: None,
            resolved: None,
            default_value: None,
        }
    }

    #[must_use]
    pub fn with_kind(mut self, kind: ComponentKind) -> Self {
        self.kind = kind;
        self
    }

    #[must_use]
    pub fn with_version(mut self, version: u32) -> Self {
        self.version = Some(version);
        self
    }

    pub fn is_root(&self) -> bool {
        self.kind != ComponentKind::Extension
    }

    /// Whether a value may leave this component out.
    pub fn may_be_absent(&self) -> bool {
        self.optional || self.default.is_some() || self.kind == ComponentKind::Extension
    }
}

/// One entry of a component list as written.
#[derive(Clone, Debug, PartialEq)]
pub enum CollectionEntry {
    Component(ComponentType),
    /// `COMPONENTS OF Type`, expanded in place during validation.
    ComponentsOf { ty: TypeRef, kind: ComponentKind },
}

/// SEQUENCE, SET or CHOICE.
#[derive(Clone, Debug, PartialEq)]
pub struct CollectionType {
    pub kind: CollectionKind,
    pub entries: Vec<CollectionEntry>,
    pub extensible: bool,
    /// Expanded components, filled by validation.
    pub components: Vec<ComponentType>,
    /// Whether automatic tagging was applied.
    pub automatic: bool,
}

impl CollectionType {
    pub fn new(kind: CollectionKind, entries: Vec<CollectionEntry>, extensible: bool) -> Self {
        let has_extensions = entries.iter().any(|e| match e {
            CollectionEntry::Component(c) => c.kind == ComponentKind::Extension,
            CollectionEntry::ComponentsOf { kind, .. } => *kind == ComponentKind::Extension,
        });
        CollectionType {
            kind,
            entries,
            extensible: extensible || has_extensions,
            components: Vec::new(),
            automatic: false,
        }
    }

    pub fn component(&self, name: Name) -> Option<&ComponentType> {
        self.components.iter().find(|c| c.name == name)
    }

    fn is_expanded(&self) -> bool {
        !self.components.is_empty() || self.entries.is_empty()
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum CollectionOfKind {
    SequenceOf,
    SetOf,
}

/// `SEQUENCE OF [name] Type` / `SET OF [name] Type`.
#[derive(Clone, Debug, PartialEq)]
pub struct CollectionOfType {
    pub kind: CollectionOfKind,
    pub element_name: Option<Name>,
    pub element: TypeRef,
    pub resolved: Option<TypeId>,
}

impl CollectionOfType {
    pub fn new(kind: CollectionOfKind, element_name: Option<Name>, element: TypeRef) -> Self {
        CollectionOfType {
            kind,
            element_name,
            element,
            resolved: None,
        }
    }

    pub fn family(&self) -> Family {
        match self.kind {
            CollectionOfKind::SequenceOf => Family::SequenceOf,
            CollectionOfKind::SetOf => Family::SetOf,
        }
    }
}

impl Schema {
    pub(crate) fn validate_collection(&mut self, id: TypeId, scope: &Scope) -> Result<()> {
        let TypeKind::Collection(collection) = self.types.kind(id)? else {
            return Err(wrong_kind(id, "collection"));
        };
        let kind = collection.kind;
        let entries = collection.entries.clone();
        let inner = scope.child_type(id);

        let mut components = self.expand_components(kind, &entries, &inner)?;

        let mut names = FxHashSet::default();
        for (index, component) in components.iter_mut().enumerate() {
            component.index = index;
            if !names.insert(component.name) {
                return Err(SchemaError::validation(
                    ErrorCode::E2002,
                    format!(
                        "duplicate component `{}` in {}",
                        self.name_str(component.name),
                        self.type_label(id)
                    ),
                ));
            }
        }

        let automatic = self.module_tag_method(scope) == TagMethod::Automatic
            && !components
                .iter()
                .filter(|c| c.is_root() && !c.inherited)
                .any(|c| self.is_textually_tagged(&c.ty));
        let auto_numbers = if automatic {
            tracing::debug!(ty = ?id, "applying automatic tagging");
            automatic_tag_numbers(&components)
        } else {
            Vec::new()
        };

        for (position, component) in components.iter_mut().enumerate() {
            let base = self.resolve_and_validate(&component.ty, &inner)?;
            component.base = Some(base);
            component.resolved = Some(match auto_numbers.get(position) {
                Some(number) => {
                    let wrapper = self.types.push(TypeKind::Tagged(TaggedType {
                        tag: TagEncoding::context(*number),
                        sibling: TypeRef::Shared(base),
                        resolved: None,
                        effective: None,
                    }))?;
                    self.validate_type(wrapper, &inner)?;
                    wrapper
                }
                None => base,
            });
        }

        for component in &mut components {
            if let (Some(default), Some(ty)) = (&component.default, component.resolved) {
                component.default_value = Some(self.validate_value(&inner, ty, default)?);
            }
        }

        if kind != CollectionKind::Sequence {
            self.check_distinct_tags(id, &components)?;
        }

        let implied = self.module_extensibility_implied(scope);
        if let TypeKind::Collection(collection) = self.types.kind_mut(id)? {
            collection.components = components;
            collection.automatic = automatic;
            collection.extensible |= implied;
        }
        Ok(())
    }

    /// Flatten COMPONENTS OF entries into plain components.
    fn expand_components(
        &mut self,
        kind: CollectionKind,
        entries: &[CollectionEntry],
        scope: &Scope,
    ) -> Result<Vec<ComponentType>> {
        let mut components = Vec::with_capacity(entries.len());
        for entry in entries {
            match entry {
                CollectionEntry::Component(component) => components.push(component.clone()),
                CollectionEntry::ComponentsOf { ty, kind: target } => {
                    let source = self.resolve_and_validate(ty, scope)?;
                    let concrete = self.unwrap_concrete(source)?;
                    let TypeKind::Collection(from) = self.types.kind(concrete)? else {
                        return Err(SchemaError::validation(
                            ErrorCode::E2001,
                            format!(
                                "COMPONENTS OF requires a SEQUENCE or SET, found {}",
                                self.type_label(source)
                            ),
                        ));
                    };
                    if kind == CollectionKind::Choice || from.kind != kind {
                        return Err(SchemaError::validation(
                            ErrorCode::E2001,
                            format!(
                                "COMPONENTS OF {} cannot appear in a {}",
                                self.type_label(source),
                                kind.family()
                            ),
                        ));
                    }
                    for component in from.components.iter().filter(|c| c.is_root()) {
                        let base = component.base.ok_or_else(|| not_validated(source))?;
                        let mut copy = component.clone();
                        copy.kind = *target;
                        copy.ty = TypeRef::Shared(base);
                        copy.inherited = true;
                        copy.base = None;
                        copy.resolved = None;
                        copy.default_value = None;
                        components.push(copy);
                    }
                }
            }
        }
        Ok(components)
    }

    /// Whether a component type is written with a tag (`[0] T`).
    fn is_textually_tagged(&self, ty: &TypeRef) -> bool {
        ty.handle()
            .and_then(|id| self.types.kind(id).ok())
            .is_some_and(|kind| matches!(kind, TypeKind::Tagged(_)))
    }

    /// Outermost tags a component can start with; empty when undeterminable.
    fn outermost_tags(&self, id: TypeId) -> Vec<TagEncoding> {
        match self.tag_of(id) {
            Ok(Some(tag)) => vec![tag],
            Ok(None) => {
                let Ok(concrete) = self.unwrap_concrete(id) else {
                    return Vec::new();
                };
                match self.types.kind(concrete) {
                    Ok(TypeKind::Collection(choice)) if choice.kind == CollectionKind::Choice => {
                        choice
                            .components
                            .iter()
                            .filter_map(|c| c.resolved)
                            .flat_map(|c| self.outermost_tags(c))
                            .collect()
                    }
                    _ => Vec::new(),
                }
            }
            // Recursive references still being validated.
            Err(_) => Vec::new(),
        }
    }

    fn check_distinct_tags(&self, id: TypeId, components: &[ComponentType]) -> Result<()> {
        let mut seen: Vec<(TagEncoding, Name)> = Vec::new();
        for component in components {
            let Some(ty) = component.resolved else {
                continue;
            };
            for tag in self.outermost_tags(ty) {
                if let Some((_, other)) = seen.iter().find(|(t, _)| t.same_tag(&tag)) {
                    return Err(SchemaError::validation(
                        ErrorCode::E2011,
                        format!(
                            "components `{}` and `{}` of {} share tag {tag}",
                            self.name_str(*other),
                            self.name_str(component.name),
                            self.type_label(id)
                        ),
                    ));
                }
                seen.push((tag, component.name));
            }
        }
        Ok(())
    }

    pub(crate) fn validate_collection_of(&mut self, id: TypeId, scope: &Scope) -> Result<()> {
        let TypeKind::CollectionOf(of) = self.types.kind(id)? else {
            return Err(wrong_kind(id, "collection-of"));
        };
        let element = of.element.clone();
        let resolved = self.resolve_and_validate(&element, &scope.child_type(id))?;
        if let TypeKind::CollectionOf(of) = self.types.kind_mut(id)? {
            of.resolved = Some(resolved);
        }
        Ok(())
    }

    pub(crate) fn optimize_collection(
        &self,
        id: TypeId,
        collection: &CollectionType,
        scope: &Scope,
        value: &Value,
    ) -> Result<Value> {
        if !collection.is_expanded() {
            return Err(not_validated(id));
        }
        let level = scope.child_value(id, Rc::new(value.clone()));

        if collection.kind == CollectionKind::Choice {
            let Value::Named(named) = value else {
                return Err(self.value_mismatch(id, value));
            };
            let component = collection
                .component(named.name)
                .ok_or_else(|| self.unknown_component(id, named.name))?;
            let ty = component.resolved.ok_or_else(|| not_validated(id))?;
            let optimized = self.optimize(ty, &level, &named.value)?;
            return Ok(Value::named(component.name, optimized));
        }

        let Value::Collection(items) = value else {
            return Err(self.value_mismatch(id, value));
        };
        let mut given: Vec<Option<&Value>> = vec![None; collection.components.len()];
        let mut cursor = 0;
        for item in items {
            let Value::Named(named) = item else {
                return Err(self.value_mismatch(id, value));
            };
            let position = collection
                .components
                .iter()
                .position(|c| c.name == named.name)
                .ok_or_else(|| self.unknown_component(id, named.name))?;
            if given[position].is_some() {
                return Err(SchemaError::validation(
                    ErrorCode::E2009,
                    format!("component `{}` given twice", self.name_str(named.name)),
                ));
            }
            if collection.kind == CollectionKind::Sequence && position < cursor {
                return Err(SchemaError::validation(
                    ErrorCode::E2009,
                    format!(
                        "component `{}` out of order in {}",
                        self.name_str(named.name),
                        self.type_label(id)
                    ),
                ));
            }
            cursor = position + 1;
            given[position] = Some(&named.value);
        }

        let mut optimized = Vec::with_capacity(items.len());
        for (component, given) in collection.components.iter().zip(given) {
            match given {
                Some(raw) => {
                    let ty = component.resolved.ok_or_else(|| not_validated(id))?;
                    optimized.push(Value::named(component.name, self.optimize(ty, &level, raw)?));
                }
                None if component.may_be_absent() => {}
                None => {
                    return Err(SchemaError::validation(
                        ErrorCode::E2005,
                        format!(
                            "missing component `{}` of {}",
                            self.name_str(component.name),
                            self.type_label(id)
                        ),
                    ))
                }
            }
        }
        Ok(Value::Collection(optimized))
    }

    pub(crate) fn optimize_collection_of(
        &self,
        id: TypeId,
        of: &CollectionOfType,
        scope: &Scope,
        value: &Value,
    ) -> Result<Value> {
        let element = of.resolved.ok_or_else(|| not_validated(id))?;
        let Value::Collection(items) = value else {
            return Err(self.value_mismatch(id, value));
        };
        items
            .iter()
            .map(|item| {
                let raw = match item {
                    Value::Named(named) if Some(named.name) == of.element_name => &named.value,
                    other => other,
                };
                self.optimize(element, scope, raw)
            })
            .collect::<Result<Vec<_>>>()
            .map(Value::Collection)
    }

    #[cold]
    fn unknown_component(&self, id: TypeId, name: Name) -> SchemaError {
        SchemaError::validation(
            ErrorCode::E2006,
            format!(
                "{} has no component `{}`",
                self.type_label(id),
                self.name_str(name)
            ),
        )
    }
}

/// Context tag numbers for automatic tagging, indexed by component position.
///
/// Root components are numbered first (primary, then secondary), then the
/// extension additions.
fn automatic_tag_numbers(components: &[ComponentType]) -> Vec<u32> {
    let mut numbers = vec![0; components.len()];
    let order = [
        ComponentKind::Primary,
        ComponentKind::Secondary,
        ComponentKind::Extension,
    ];
    let mut next = 0;
    for kind in order {
        for (position, component) in components.iter().enumerate() {
            if component.kind == kind {
                numbers[position] = next;
                next += 1;
            }
        }
    }
    numbers
}

#[cfg(test)]
#[expect(clippy::unwrap_used, reason = "Tests use unwrap for brevity")]
mod tests {
    use super::*;
    use asn_ir::StringInterner;
    use pretty_assertions::assert_eq;

    fn component(interner: &StringInterner, name: &str, kind: ComponentKind) -> ComponentType {
        ComponentType::required(interner.intern(name), TypeRef::Shared(TypeId::from_raw(0)))
            .with_kind(kind)
    }

    #[test]
    fn optional_and_default_exclusive() {
        let interner = StringInterner::new();
        let err = ComponentType::new(
            interner.intern("a"),
            TypeRef::Shared(TypeId::from_raw(0)),
            true,
            Some(Value::Integer(1)),
        )
        .unwrap_err();
        assert_eq!(err.code(), ErrorCode::E2003);
    }

    #[test]
    fn automatic_numbers_root_first() {
        let interner = StringInterner::new();
        let components = vec![
            component(&interner, "a", ComponentKind::Primary),
            component(&interner, "x", ComponentKind::Extension),
            component(&interner, "b", ComponentKind::Secondary),
            component(&interner, "c", ComponentKind::Primary),
        ];
        assert_eq!(automatic_tag_numbers(&components), vec![0, 3, 2, 1]);
    }

    #[test]
    fn extension_entries_imply_extensibility() {
        let interner = StringInterner::new();
        let entries = vec![CollectionEntry::Component(component(
            &interner,
            "x",
            ComponentKind::Extension,
        ))];
        assert!(CollectionType::new(CollectionKind::Sequence, entries, false).extensible);
        assert!(!CollectionType::new(CollectionKind::Sequence, Vec::new(), false).extensible);
    }
}
