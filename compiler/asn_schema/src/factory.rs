//! Construction API.
//!
//! The grammar collaborator (or a test) builds the reference graph through
//! these methods: modules and their import/export tables, definitions, and
//! inline types. Nothing is resolved here; names stay names until
//! validation.
//!
//! Inline constructors return [`TypeRef::Inline`]: the type is owned by
//! whatever it is handed to, and copied with it.

use asn_diagnostic::ErrorCode;
use asn_ir::{FieldPath, ModuleId, ModuleRef, Name, RefName, TypeId};

use crate::config::ModuleOptions;
use crate::constraint::{ConstraintTemplate, RelationItem};
use crate::encoding::{TagEncoding, TagMethod};
use crate::error::{Result, SchemaError};
use crate::module::{DefinedValue, Exports, ImportTable, Module, ValueDefId};
use crate::refs::TypeRef;
use crate::schema::Schema;
use crate::template::{Template, TemplateArg};
use crate::types::{
    BuiltinType, ClassFieldType, ClassType, CollectionEntry, CollectionKind, CollectionOfType,
    CollectionType, ComponentType, ConstrainedType, DefinedType, InstanceType, ObjectFieldType,
    SelectionType, TaggedType, TypeKind,
};
use crate::value::Value;

impl Schema {
    // Modules

    /// Add a module. A name may repeat only with distinct OIDs.
    pub fn add_module(&mut self, name: &str, options: ModuleOptions) -> Result<ModuleId> {
        let name = self.intern(name);
        let clash = self
            .modules
            .iter()
            .any(|m| m.name == name && (m.options.oid.is_none() || m.options.oid == options.oid));
        if clash {
            return Err(SchemaError::validation(
                ErrorCode::E2002,
                format!("duplicate module `{}`", self.name_str(name)),
            ));
        }
        let id = ModuleId::from_raw(
            u32::try_from(self.modules.len())
                .map_err(|_| SchemaError::unsupported("too many modules"))?,
        );
        self.modules.push(Module::new(name, options));
        Ok(id)
    }

    /// Add a module that sees every exported symbol of every other module.
    pub fn add_dummy_module(&mut self, name: &str) -> Result<ModuleId> {
        let options = self.config.module_options();
        let id = self.add_module(name, options)?;
        self.module_mut(id)?.dummy = true;
        Ok(id)
    }

    pub fn set_exports(&mut self, module: ModuleId, exports: Exports) -> Result<()> {
        self.module_mut(module)?.exports = exports;
        Ok(())
    }

    /// `symbols FROM from`.
    pub fn add_import(
        &mut self,
        module: ModuleId,
        from: ModuleRef,
        symbols: Vec<Name>,
    ) -> Result<()> {
        self.module_mut(module)?
            .imports
            .push(ImportTable::new(from, symbols));
        Ok(())
    }

    // Definitions

    /// `Name ::= Type`.
    pub fn define_type(&mut self, module: ModuleId, name: Name, ty: TypeRef) -> Result<TypeId> {
        self.define_type_with(module, name, ty, None)
    }

    /// `Name{params} ::= Type`.
    pub fn define_template_type(
        &mut self,
        module: ModuleId,
        name: Name,
        template: Template,
        ty: TypeRef,
    ) -> Result<TypeId> {
        self.define_type_with(module, name, ty, Some(template))
    }

    /// `Name Governor ::= { set }`: a value set, or an object set when the
    /// governor is a class.
    pub fn define_value_set(
        &mut self,
        module: ModuleId,
        name: Name,
        governor: TypeRef,
        set: ConstraintTemplate,
    ) -> Result<TypeId> {
        let set = self.value_set(governor, set)?;
        self.define_type(module, name, set)
    }

    fn define_type_with(
        &mut self,
        module: ModuleId,
        name: Name,
        sibling: TypeRef,
        template: Option<Template>,
    ) -> Result<TypeId> {
        if self.module(module)?.types.contains(name) {
            return Err(self.duplicate(module, name));
        }
        let id = self.types.push(TypeKind::Defined(DefinedType {
            name,
            module,
            sibling,
            template,
            namespace: None,
            bindings: None,
            resolved: None,
        }))?;
        self.module_mut(module)?.types.define(name, id)?;
        Ok(id)
    }

    /// `name Type ::= value`.
    pub fn define_value(
        &mut self,
        module: ModuleId,
        name: Name,
        ty: TypeRef,
        value: Value,
    ) -> Result<ValueDefId> {
        self.define_value_with(DefinedValue::new(name, module, ty, value))
    }

    /// `name{params} Type ::= value`.
    pub fn define_template_value(
        &mut self,
        module: ModuleId,
        name: Name,
        template: Template,
        ty: TypeRef,
        value: Value,
    ) -> Result<ValueDefId> {
        let mut def = DefinedValue::new(name, module, ty, value);
        def.template = Some(template);
        self.define_value_with(def)
    }

    fn define_value_with(&mut self, def: DefinedValue) -> Result<ValueDefId> {
        let (module, name) = (def.module, def.name);
        if self.module(module)?.values.contains(name) {
            return Err(self.duplicate(module, name));
        }
        let index = self.module_mut(module)?.values.define(name, def)?;
        Ok(ValueDefId {
            module,
            index: u32::try_from(index)
                .map_err(|_| SchemaError::unsupported("too many value definitions"))?,
        })
    }

    #[cold]
    fn duplicate(&self, module: ModuleId, name: Name) -> SchemaError {
        let module = self.module(module).map_or("?", |m| self.name_str(m.name));
        SchemaError::validation(
            ErrorCode::E2002,
            format!("`{}` is defined twice in {module}", self.name_str(name)),
        )
    }

    // Inline types

    /// A reference by name: `T` or `Module.T`.
    pub fn type_ref(&self, name: &str) -> TypeRef {
        match name.split_once('.') {
            Some((module, symbol)) => {
                TypeRef::Named(RefName::qualified(self.intern(module), self.intern(symbol)))
            }
            None => TypeRef::Named(RefName::local(self.intern(name))),
        }
    }

    fn inline(&mut self, kind: TypeKind) -> Result<TypeRef> {
        self.types.push(kind).map(TypeRef::Inline)
    }

    pub fn builtin(&mut self, builtin: BuiltinType) -> Result<TypeRef> {
        self.inline(TypeKind::Builtin(builtin))
    }

    /// `[tag] Type`.
    pub fn tagged(&mut self, tag: TagEncoding, sibling: TypeRef) -> Result<TypeRef> {
        self.inline(TypeKind::Tagged(TaggedType {
            tag,
            sibling,
            resolved: None,
            effective: None,
        }))
    }

    /// `Type (constraint)`.
    pub fn constrained(
        &mut self,
        sibling: TypeRef,
        template: ConstraintTemplate,
    ) -> Result<TypeRef> {
        self.inline(TypeKind::Constrained(ConstrainedType {
            sibling,
            template,
            value_set: false,
            resolved: None,
            constraint: None,
        }))
    }

    /// `{ set }` over `governor`, usable where a value set or object set is
    /// expected.
    pub fn value_set(&mut self, governor: TypeRef, set: ConstraintTemplate) -> Result<TypeRef> {
        self.inline(TypeKind::Constrained(ConstrainedType {
            sibling: governor,
            template: set,
            value_set: true,
            resolved: None,
            constraint: None,
        }))
    }

    /// `alternative < Choice`.
    pub fn selection(&mut self, name: Name, choice: TypeRef) -> Result<TypeRef> {
        self.inline(TypeKind::Selection(SelectionType {
            name,
            sibling: choice,
            resolved: None,
        }))
    }

    /// `Template{args}`.
    pub fn instance(&mut self, template: RefName, args: Vec<TemplateArg>) -> Result<TypeRef> {
        self.inline(TypeKind::Instance(InstanceType {
            template,
            args,
            resolved: None,
        }))
    }

    /// SEQUENCE, SET or CHOICE.
    pub fn collection(&mut self, collection: CollectionType) -> Result<TypeRef> {
        self.inline(TypeKind::Collection(collection))
    }

    /// SEQUENCE OF or SET OF.
    pub fn collection_of(&mut self, of: CollectionOfType) -> Result<TypeRef> {
        self.inline(TypeKind::CollectionOf(of))
    }

    /// `CLASS { fields }`.
    pub fn class(&mut self, class: ClassType) -> Result<TypeRef> {
        self.inline(TypeKind::Class(class))
    }

    /// `Class.&field`.
    pub fn class_field(&mut self, class: TypeRef, path: FieldPath) -> Result<TypeRef> {
        self.inline(TypeKind::ClassField(ClassFieldType {
            class,
            path,
            class_id: None,
            target: None,
        }))
    }

    /// `object.&Field`.
    pub fn object_field(&mut self, object: RefName, path: FieldPath) -> Result<TypeRef> {
        self.inline(TypeKind::ObjectField(ObjectFieldType {
            object,
            path,
            resolved: None,
        }))
    }

    /// `INSTANCE OF Class`:
    /// `SEQUENCE { type-id Class.&id, value [0] EXPLICIT Class.&Type }`.
    ///
    /// The class fields are referenced by name, so they bind to the class
    /// when the sequence is validated.
    pub fn instance_of(&mut self, class: TypeRef) -> Result<TypeRef> {
        self.instance_of_with(class, None)
    }

    /// `INSTANCE OF Class ({ObjectSet})`: `type-id` is drawn from the object
    /// set and `value` must match the type of the object it selects.
    pub fn instance_of_set(&mut self, class: TypeRef, object_set: TypeRef) -> Result<TypeRef> {
        self.instance_of_with(class, Some(object_set))
    }

    fn instance_of_with(&mut self, class: TypeRef, object_set: Option<TypeRef>) -> Result<TypeRef> {
        let type_id_name = self.intern("type-id");
        let mut type_id = self.class_field(class.clone(), FieldPath::single(self.intern("&id")))?;
        let mut open = self.class_field(class, FieldPath::single(self.intern("&Type")))?;
        if let Some(object_set) = object_set {
            type_id = self.constrained(
                type_id,
                ConstraintTemplate::Table {
                    object_set: object_set.clone(),
                    relations: Vec::new(),
                },
            )?;
            open = self.constrained(
                open,
                ConstraintTemplate::Table {
                    object_set,
                    relations: vec![RelationItem::absolute(vec![type_id_name])],
                },
            )?;
        }
        let value = self.tagged(TagEncoding::context(0).with_method(TagMethod::Explicit), open)?;
        let components = vec![
            CollectionEntry::Component(ComponentType::required(type_id_name, type_id)),
            CollectionEntry::Component(ComponentType::required(self.intern("value"), value)),
        ];
        self.collection(CollectionType::new(CollectionKind::Sequence, components, false))
    }

    /// Validate a free-standing type reference in module `module`'s scope
    /// and return its handle.
    pub fn resolve_in(&mut self, module: ModuleId, ty: &TypeRef) -> Result<TypeId> {
        let scope = crate::scope::Scope::module(module);
        self.resolve_and_validate(ty, &scope)
    }
}
