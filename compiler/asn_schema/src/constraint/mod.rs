//! Constraints and element-set algebra.
//!
//! A [`ConstraintTemplate`] is a constraint as written; building it against
//! the resolved type it constrains yields an immutable [`Constraint`]. Built
//! constraints hold optimized values and resolved handles only, so checking a
//! value never mutates the schema.
//!
//! # Element-set semantics
//!
//! - `(root)` admits what `root` admits.
//! - `(root, ...)` and `(root, ..., additional)` admit every value the
//!   constrained type accepts. Values outside the root and the additions are
//!   taken as additions of a later version.
//! - `A | B` admits what either admits, `A ^ B` what both admit,
//!   `A EXCEPT B` what `A` admits and `B` does not.

mod build;
mod settings;
mod table;
mod template;

pub(crate) use build::BuildTarget;
pub use settings::TimeSettings;
pub use table::TableConstraint;
pub use template::{
    Bound, ComponentConstraintTemplate, ConstraintTemplate, Presence, RangeEndpoint, RelationItem,
};

use std::cmp::Ordering;

use asn_diagnostic::ErrorCode;
use asn_ir::{Name, TypeId};
use regex::Regex;

use crate::error::{Result, SchemaError};
use crate::schema::Schema;
use crate::scope::Scope;
use crate::value::{compare_values, Value, ValueDisplay};

/// A built constraint.
#[derive(Clone, Debug, PartialEq)]
pub enum Constraint {
    ElementSet {
        root: Option<Box<Constraint>>,
        extensible: bool,
        additional: Option<Box<Constraint>>,
    },
    Union(Vec<Constraint>),
    Intersection(Vec<Constraint>),
    Except {
        base: Box<Constraint>,
        exception: Box<Constraint>,
    },
    All {
        exception: Option<Box<Constraint>>,
    },
    /// A single (optimized) value.
    Value(Value),
    Range(ValueRange),
    /// Constraint on the length, applied to `Value::Integer(len)`.
    Size(Box<Constraint>),
    /// Constraint on each character, applied to one-character strings.
    Alphabet(Box<Constraint>),
    Pattern(Pattern),
    /// Values of another type: contained subtype or included value set.
    Type(TypeId),
    /// Constraint on every element of a SEQUENCE OF / SET OF value.
    InnerType(Box<Constraint>),
    InnerTypes(InnerTypes),
    Table(TableConstraint),
    Settings(TimeSettings),
}

/// Bounds of a value range; `None` is `MIN` / `MAX`.
#[derive(Clone, Debug, PartialEq)]
pub struct ValueRange {
    pub min: Option<RangeLimit>,
    pub max: Option<RangeLimit>,
}

#[derive(Clone, Debug, PartialEq)]
pub struct RangeLimit {
    pub value: Value,
    pub exclusive: bool,
}

impl ValueRange {
    pub fn contains(&self, value: &Value) -> bool {
        let within = |limit: &Option<RangeLimit>, wanted: Ordering| match limit {
            None => true,
            Some(limit) => match compare_values(value, &limit.value) {
                Some(Ordering::Equal) => !limit.exclusive,
                Some(order) => order == wanted,
                None => false,
            },
        };
        within(&self.min, Ordering::Greater) && within(&self.max, Ordering::Less)
    }
}

/// A compiled `PATTERN`; compares by source.
#[derive(Clone, Debug)]
pub struct Pattern {
    pub source: String,
    regex: Regex,
}

impl Pattern {
    /// Compile `source`, anchored at both ends.
    pub fn new(source: &str) -> std::result::Result<Self, regex::Error> {
        Ok(Pattern {
            source: source.to_owned(),
            regex: Regex::new(&format!("^(?:{source})$"))?,
        })
    }

    pub fn is_match(&self, text: &str) -> bool {
        self.regex.is_match(text)
    }
}

impl PartialEq for Pattern {
    fn eq(&self, other: &Self) -> bool {
        self.source == other.source
    }
}

/// `WITH COMPONENTS { ... }`.
#[derive(Clone, Debug, PartialEq)]
pub struct InnerTypes {
    /// `...` given: unmentioned components are unconstrained.
    pub partial: bool,
    pub components: Vec<ComponentConstraint>,
}

/// One component of a `WITH COMPONENTS` constraint.
#[derive(Clone, Debug, PartialEq)]
pub struct ComponentConstraint {
    pub name: Name,
    pub presence: Presence,
    pub constraint: Option<Constraint>,
}

/// Whether two optimized values are the same value.
pub(crate) fn values_equal(a: &Value, b: &Value) -> bool {
    a == b || compare_values(a, b) == Some(Ordering::Equal)
}

impl Constraint {
    /// Check `value`; a violation is a `ConstraintViolation` error.
    pub fn check(&self, schema: &Schema, scope: &Scope, value: &Value) -> Result<()> {
        match self {
            Constraint::ElementSet {
                root,
                extensible,
                additional,
            } => match (root, extensible, additional) {
                (None, false, _) => Ok(()),
                (Some(root), false, _) => root.check(schema, scope, value),
                (root, true, additional) => {
                    for term in root.iter().chain(additional) {
                        if term.contains(schema, scope, value)? {
                            return Ok(());
                        }
                    }
                    tracing::trace!(
                        value = %ValueDisplay::new(value, &schema.interner),
                        "admitted as an unknown extension"
                    );
                    Ok(())
                }
            },
            Constraint::Union(members) => {
                for member in members {
                    if member.contains(schema, scope, value)? {
                        return Ok(());
                    }
                }
                Err(violation(schema, value, "is in none of the alternatives"))
            }
            Constraint::Intersection(members) => members
                .iter()
                .try_for_each(|member| member.check(schema, scope, value)),
            Constraint::Except { base, exception } => {
                base.check(schema, scope, value)?;
                if exception.contains(schema, scope, value)? {
                    return Err(violation(schema, value, "is excluded"));
                }
                Ok(())
            }
            Constraint::All { exception } => match exception {
                Some(exception) if exception.contains(schema, scope, value)? => {
                    Err(violation(schema, value, "is excluded"))
                }
                _ => Ok(()),
            },
            Constraint::Value(permitted) => {
                if values_equal(value, permitted) {
                    Ok(())
                } else {
                    Err(violation(schema, value, "is not the permitted value"))
                }
            }
            Constraint::Range(range) => {
                if range.contains(value) {
                    Ok(())
                } else {
                    Err(violation(schema, value, "is out of range"))
                }
            }
            Constraint::Size(inner) => {
                let len = value_size(value)
                    .ok_or_else(|| violation(schema, value, "has no size"))?;
                let len = i64::try_from(len).map_err(|_| violation(schema, value, "is too large"))?;
                inner.check(schema, scope, &Value::Integer(len)).map_err(|err| {
                    if err.is_violation() {
                        let reason = format!("has size {len} outside the permitted sizes");
                        violation(schema, value, &reason)
                    } else {
                        err
                    }
                })
            }
            Constraint::Alphabet(inner) => {
                let Value::String(text) = value else {
                    return Err(violation(schema, value, "is not a character string"));
                };
                for c in text.chars() {
                    if !inner.permits_char(schema, scope, c)? {
                        return Err(SchemaError::violation(
                            ErrorCode::E3001,
                            format!("character {c:?} is not in the permitted alphabet"),
                        ));
                    }
                }
                Ok(())
            }
            Constraint::Pattern(pattern) => match value {
                Value::String(text) if pattern.is_match(text) => Ok(()),
                _ => Err(violation(
                    schema,
                    value,
                    &format!("does not match pattern \"{}\"", pattern.source),
                )),
            },
            Constraint::Type(ty) => match schema.accept(*ty, scope, value) {
                Ok(()) => Ok(()),
                Err(err) if err.is_internal() => Err(err),
                Err(_) => Err(violation(
                    schema,
                    value,
                    &format!("is not a value of {}", schema.type_label(*ty)),
                )),
            },
            Constraint::InnerType(inner) => match value {
                Value::Collection(items) => items
                    .iter()
                    .try_for_each(|item| inner.check(schema, scope, item)),
                _ => Err(violation(schema, value, "is not a list of elements")),
            },
            Constraint::InnerTypes(inner) => inner.check(schema, scope, value),
            Constraint::Table(table) => table.apply(schema, scope, value).map(|_| ()),
            Constraint::Settings(settings) => {
                let Value::String(text) = value else {
                    return Err(violation(schema, value, "is not a time value"));
                };
                let matches = schema
                    .time_formats()?
                    .properties(text)
                    .is_some_and(|properties| settings.matches(&properties));
                if matches {
                    Ok(())
                } else {
                    Err(violation(schema, value, "does not have the required time settings"))
                }
            }
        }
    }

    /// Whether `value` passes. Only internal errors are returned as errors.
    pub fn contains(&self, schema: &Schema, scope: &Scope, value: &Value) -> Result<bool> {
        match self.check(schema, scope, value) {
            Ok(()) => Ok(true),
            Err(err) if err.is_internal() => Err(err),
            Err(_) => Ok(false),
        }
    }

    /// Check `value` and return it, refined where the constraint determines
    /// more than the type did (open types under a table constraint).
    pub fn apply(&self, schema: &Schema, scope: &Scope, value: &Value) -> Result<Value> {
        match self.as_table() {
            Some(table) => table.apply(schema, scope, value),
            None => {
                self.check(schema, scope, value)?;
                Ok(value.clone())
            }
        }
    }

    /// The table constraint this constraint consists of, if any.
    fn as_table(&self) -> Option<&TableConstraint> {
        match self {
            Constraint::Table(table) => Some(table),
            Constraint::ElementSet {
                root: Some(root),
                additional: None,
                ..
            } => root.as_table(),
            _ => None,
        }
    }

    /// Whether an extension marker appears at the top of this element set.
    pub fn is_extensible(&self, schema: &Schema) -> bool {
        match self {
            Constraint::ElementSet {
                root, extensible, ..
            } => *extensible || root.as_ref().is_some_and(|r| r.is_extensible(schema)),
            Constraint::Union(members) => members.iter().any(|m| m.is_extensible(schema)),
            Constraint::Type(ty) => schema.element_set_is_extensible(*ty).unwrap_or(false),
            _ => false,
        }
    }

    /// The finite set of values this constraint admits, when it is one.
    pub fn collect_values(&self, schema: &Schema, scope: &Scope) -> Result<Option<Vec<Value>>> {
        Ok(match self {
            Constraint::Value(value) => Some(vec![value.clone()]),
            Constraint::ElementSet {
                root, additional, ..
            } => {
                let mut values = Vec::new();
                for part in [root, additional].into_iter().flatten() {
                    match part.collect_values(schema, scope)? {
                        Some(part_values) => values.extend(part_values),
                        None => return Ok(None),
                    }
                }
                Some(values)
            }
            Constraint::Union(members) => {
                let mut values = Vec::new();
                for member in members {
                    match member.collect_values(schema, scope)? {
                        Some(member_values) => values.extend(member_values),
                        None => return Ok(None),
                    }
                }
                Some(values)
            }
            Constraint::Intersection(members) => {
                let Some((first, rest)) = members.split_first() else {
                    return Ok(Some(Vec::new()));
                };
                let Some(values) = first.collect_values(schema, scope)? else {
                    return Ok(None);
                };
                let mut kept = Vec::with_capacity(values.len());
                for value in values {
                    let mut all = true;
                    for member in rest {
                        all &= member.contains(schema, scope, &value)?;
                    }
                    if all {
                        kept.push(value);
                    }
                }
                Some(kept)
            }
            Constraint::Except { base, exception } => {
                let Some(values) = base.collect_values(schema, scope)? else {
                    return Ok(None);
                };
                let mut kept = Vec::with_capacity(values.len());
                for value in values {
                    if !exception.contains(schema, scope, &value)? {
                        kept.push(value);
                    }
                }
                Some(kept)
            }
            Constraint::Type(ty) => match schema.element_set_values(*ty) {
                Ok(values) => Some(values),
                Err(SchemaError::Unsupported(_)) => None,
                Err(err) => return Err(err),
            },
            _ => None,
        })
    }

    /// Whether character `c` is in this permitted alphabet.
    fn permits_char(&self, schema: &Schema, scope: &Scope, c: char) -> Result<bool> {
        let single = Value::String(c.to_string());
        Ok(match self {
            Constraint::Value(Value::String(chars)) => chars.contains(c),
            Constraint::Value(_) => false,
            Constraint::Range(range) => range.contains(&single),
            Constraint::ElementSet {
                root,
                extensible,
                additional,
            } => {
                let in_root = match root {
                    Some(root) => root.permits_char(schema, scope, c)?,
                    None => !extensible,
                };
                in_root
                    || match additional {
                        Some(additional) if *extensible => {
                            additional.permits_char(schema, scope, c)?
                        }
                        _ => false,
                    }
            }
            Constraint::Union(members) => {
                let mut any = false;
                for member in members {
                    any = any || member.permits_char(schema, scope, c)?;
                }
                any
            }
            Constraint::Intersection(members) => {
                let mut all = true;
                for member in members {
                    all = all && member.permits_char(schema, scope, c)?;
                }
                all
            }
            Constraint::Except { base, exception } => {
                base.permits_char(schema, scope, c)? && !exception.permits_char(schema, scope, c)?
            }
            Constraint::All { exception } => match exception {
                Some(exception) => !exception.permits_char(schema, scope, c)?,
                None => true,
            },
            Constraint::Type(ty) => match schema.accept(*ty, scope, &single) {
                Ok(()) => true,
                Err(err) if err.is_internal() => return Err(err),
                Err(_) => false,
            },
            _ => self.contains(schema, scope, &single)?,
        })
    }
}

impl InnerTypes {
    fn check(&self, schema: &Schema, scope: &Scope, value: &Value) -> Result<()> {
        let present: Vec<Name> = match value {
            Value::Named(named) => vec![named.name],
            Value::Collection(items) => items
                .iter()
                .filter_map(|item| item.as_named().map(|named| named.name))
                .collect(),
            _ => return Err(violation(schema, value, "has no components")),
        };

        for component in &self.components {
            let given = value.component(component.name);
            let name = schema.name_str(component.name);
            match (component.presence, given) {
                (Presence::Present, None) => {
                    return Err(SchemaError::violation(
                        ErrorCode::E3003,
                        format!("component `{name}` must be present"),
                    ))
                }
                (Presence::Absent, Some(_)) => {
                    return Err(SchemaError::violation(
                        ErrorCode::E3003,
                        format!("component `{name}` must be absent"),
                    ))
                }
                _ => {}
            }
            if let (Some(constraint), Some(given)) = (&component.constraint, given) {
                constraint.check(schema, scope, given)?;
            }
        }

        if !self.partial {
            if let Some(extra) = present
                .iter()
                .find(|name| !self.components.iter().any(|c| c.name == **name))
            {
                return Err(SchemaError::violation(
                    ErrorCode::E3003,
                    format!("component `{}` is not permitted", schema.name_str(*extra)),
                ));
            }
        }
        Ok(())
    }
}

/// Length of a value for size constraints.
fn value_size(value: &Value) -> Option<usize> {
    match value {
        Value::String(text) => Some(text.chars().count()),
        Value::BitString(bits) => Some(bits.len()),
        Value::OctetString(bytes) => Some(bytes.len()),
        Value::Collection(items) => Some(items.len()),
        _ => None,
    }
}

#[cold]
fn violation(schema: &Schema, value: &Value, what: &str) -> SchemaError {
    SchemaError::violation(
        ErrorCode::E3001,
        format!("value {} {what}", ValueDisplay::new(value, &schema.interner)),
    )
}
