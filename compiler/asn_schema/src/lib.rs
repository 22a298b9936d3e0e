//! ASN.1 schema engine.
//!
//! Builds, resolves, validates and constrains a graph of type and value
//! definitions organised into modules, and exposes the validated model that
//! encoders and decoders work against.
//!
//! # Pipeline
//!
//! ```text
//! factory (names only)
//!     └── Schema::validate_module / validate_all
//!           └── validate_type(scope)      resolve siblings through the scope chain
//!                 ├── instantiate templates into fresh copies
//!                 └── build constraints against the resolved sibling
//! validated model
//!     └── family / named_type / encoding / optimize / accept   (codec side)
//! ```
//!
//! # Design
//!
//! - **Arena + handles**: every type lives in one [`TypePool`] and is named by a
//!   [`TypeId`]; recursive schemas refer to themselves by handle.
//! - **Decorators forward**: tagged, constrained, selection, instance and
//!   defined types own one sibling and delegate queries to it;
//!   [`Schema::unwrap_concrete`] follows the chain.
//! - **Validate once**: explicit [`ValidationState`]; re-entry returns early,
//!   terminal states never change.
//! - **Fail fast**: the first [`SchemaError`] is returned unchanged.
//!
//! The textual grammar and the codecs live elsewhere.

mod config;
mod constraint;
mod encoding;
mod error;
mod factory;
mod family;
mod logging;
mod module;
mod refs;
mod schema;
mod scope;
mod stack;
mod suggest;
mod template;
mod types;
mod value;

pub use asn_diagnostic::{Diagnostic, ErrorCode};
pub use asn_ir::{FieldPath, ModuleId, ModuleRef, Name, RefName, StringInterner, TypeId};

pub use config::{ModuleOptions, SchemaConfig, INSTALL_CORE_ENV, MAX_IMPORT_DEPTH_ENV};
pub use constraint::{
    Bound, ComponentConstraint, ComponentConstraintTemplate, Constraint, ConstraintTemplate,
    InnerTypes, Pattern, Presence, RangeEndpoint, RangeLimit, RelationItem, TableConstraint,
    TimeSettings, ValueRange,
};
pub use encoding::{Encoding, EncodingKind, TagClass, TagEncoding, TagMethod};
pub use error::{Result, SchemaError, SymbolKind};
pub use family::{Family, FamilySet};
pub use logging::{init_tracing, LOG_ENV, LOG_TREE_ENV};
pub use module::{
    CoreEntry, CoreRegistry, DefaultModuleResolver, DefinedValue, Exports, ImportTable, Module,
    ModuleResolver, Resolver, ValueDefId,
};
pub use refs::TypeRef;
pub use schema::Schema;
pub use scope::{Scope, ScopeKind, ValueSymbol};
pub use template::{
    Binding, ParameterKind, Template, TemplateArg, TemplateBindings, TemplateParameter,
};
pub use types::{
    BuiltinType, ClassField, ClassFieldType, ClassType, CollectionEntry, CollectionKind,
    CollectionOfKind, CollectionOfType, CollectionType, ComponentKind, ComponentType,
    ConstrainedType, DefinedType, EnumItem, EnumeratedType, Enumeration, FieldKind, FieldTarget,
    InstanceType, NamedNumber, NamedNumberList, ObjectFieldType, SelectionType, StringKind,
    TaggedType, TimeKind, TypeEntry, TypeKind, TypePool, ValidationState,
};
pub use value::{
    compare_values, BitString, FieldValue, NamedValue, ObjectValue, OpenTypeValue, Setting, Value,
    ValueDisplay, ValueInstance,
};
