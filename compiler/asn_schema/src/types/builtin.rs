//! Builtin (non-constructed) types.

use asn_diagnostic::ErrorCode;
use asn_ir::{Name, TypeId};
use rustc_hash::FxHashSet;

use super::{not_validated, wrong_kind, StringKind, TimeKind, TypeKind};
use crate::error::{Result, SchemaError};
use crate::family::Family;
use crate::schema::Schema;
use crate::scope::{Scope, ValueSymbol};
use crate::value::{BitString, Value};

/// `name(number)` in an INTEGER or BIT STRING definition.
#[derive(Clone, Debug, PartialEq)]
pub struct NamedNumber {
    pub name: Name,
    /// An integer or a reference to an INTEGER value.
    pub value: Value,
}

impl NamedNumber {
    pub fn new(name: Name, value: Value) -> Self {
        NamedNumber { name, value }
    }
}

/// Named numbers (INTEGER) or named bits (BIT STRING).
#[derive(Clone, Debug, PartialEq, Default)]
pub struct NamedNumberList {
    pub declared: Vec<NamedNumber>,
    /// Filled by validation.
    pub resolved: Vec<(Name, i64)>,
}

impl NamedNumberList {
    pub fn new(declared: Vec<NamedNumber>) -> Self {
        NamedNumberList {
            declared,
            resolved: Vec::new(),
        }
    }

    pub fn number(&self, name: Name) -> Option<i64> {
        self.resolved
            .iter()
            .find(|(n, _)| *n == name)
            .map(|(_, v)| *v)
    }
}

/// An enumeration item as written.
#[derive(Clone, Debug, PartialEq)]
pub struct EnumItem {
    pub name: Name,
    pub number: Option<Value>,
}

impl EnumItem {
    pub fn new(name: Name) -> Self {
        EnumItem { name, number: None }
    }

    pub fn numbered(name: Name, number: Value) -> Self {
        EnumItem {
            name,
            number: Some(number),
        }
    }
}

/// An enumeration item with its assigned number.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub struct Enumeration {
    pub name: Name,
    pub number: i64,
    /// Declared after the extension marker.
    pub extension: bool,
}

/// `ENUMERATED { root, ..., additions }`.
#[derive(Clone, Debug, PartialEq, Default)]
pub struct EnumeratedType {
    pub root: Vec<EnumItem>,
    pub extensible: bool,
    pub additions: Vec<EnumItem>,
    /// Filled by validation, root items first.
    pub items: Vec<Enumeration>,
}

impl EnumeratedType {
    pub fn new(root: Vec<EnumItem>, extensible: bool, additions: Vec<EnumItem>) -> Self {
        EnumeratedType {
            root,
            extensible: extensible || !additions.is_empty(),
            additions,
            items: Vec::new(),
        }
    }

    pub fn by_name(&self, name: Name) -> Option<&Enumeration> {
        self.items.iter().find(|e| e.name == name)
    }

    pub fn by_number(&self, number: i64) -> Option<&Enumeration> {
        self.items.iter().find(|e| e.number == number)
    }
}

/// A type that needs no composition.
#[derive(Clone, Debug, PartialEq)]
pub enum BuiltinType {
    Boolean,
    Null,
    Integer(NamedNumberList),
    Real,
    Enumerated(EnumeratedType),
    BitString(NamedNumberList),
    OctetString,
    ObjectIdentifier,
    RelativeOid,
    OidIri,
    RelativeOidIri,
    String(StringKind),
    Time(TimeKind),
    /// A type field or otherwise unconstrained open type.
    OpenType,
}

impl BuiltinType {
    pub fn integer() -> Self {
        BuiltinType::Integer(NamedNumberList::default())
    }

    pub fn bit_string() -> Self {
        BuiltinType::BitString(NamedNumberList::default())
    }

    pub fn family(&self) -> Family {
        match self {
            BuiltinType::Boolean => Family::Boolean,
            BuiltinType::Null => Family::Null,
            BuiltinType::Integer(_) => Family::Integer,
            BuiltinType::Real => Family::Real,
            BuiltinType::Enumerated(_) => Family::Enumerated,
            BuiltinType::BitString(_) => Family::BitString,
            BuiltinType::OctetString => Family::OctetString,
            BuiltinType::ObjectIdentifier => Family::ObjectIdentifier,
            BuiltinType::RelativeOid => Family::RelativeOid,
            BuiltinType::OidIri => Family::OidIri,
            BuiltinType::RelativeOidIri => Family::RelativeOidIri,
            BuiltinType::String(_) => Family::RestrictedString,
            BuiltinType::Time(kind) => kind.family(),
            BuiltinType::OpenType => Family::OpenType,
        }
    }

    /// ASN.1 spelling.
    pub fn name(&self) -> &'static str {
        match self {
            BuiltinType::String(kind) => kind.name(),
            BuiltinType::Time(kind) => kind.name(),
            other => other.family().name(),
        }
    }
}

/// Assign enumeration numbers.
///
/// Root items: explicit numbers first (duplicates rejected), then each
/// unnumbered item takes the smallest unused non-negative number in
/// declaration order. Additions: an explicit number must be unused and exceed
/// the previous addition; an unnumbered addition takes the smallest unused
/// number above the previous addition.
pub(crate) fn number_enumeration(
    root: &[(Name, Option<i64>)],
    additions: &[(Name, Option<i64>)],
) -> Result<Vec<Enumeration>> {
    let mut names = FxHashSet::default();
    for (name, _) in root.iter().chain(additions) {
        if !names.insert(*name) {
            return Err(SchemaError::validation(
                ErrorCode::E2010,
                "duplicate enumeration item name",
            ));
        }
    }

    let mut used = FxHashSet::default();
    for number in root.iter().filter_map(|(_, n)| *n) {
        if !used.insert(number) {
            return Err(SchemaError::validation(
                ErrorCode::E2010,
                format!("duplicate enumeration number {number}"),
            ));
        }
    }

    let mut items = Vec::with_capacity(root.len() + additions.len());
    let mut next = 0;
    for (name, number) in root {
        let number = match number {
            Some(n) => *n,
            None => {
                next = next_free(&used, next)?;
                used.insert(next);
                next
            }
        };
        items.push(Enumeration {
            name: *name,
            number,
            extension: false,
        });
    }

    let mut previous: Option<i64> = None;
    for (name, number) in additions {
        let number = match number {
            Some(n) => {
                if used.contains(n) {
                    return Err(SchemaError::validation(
                        ErrorCode::E2010,
                        format!("duplicate enumeration number {n}"),
                    ));
                }
                if previous.is_some_and(|p| *n <= p) {
                    return Err(SchemaError::validation(
                        ErrorCode::E2010,
                        format!("enumeration addition {n} must exceed the previous addition"),
                    ));
                }
                *n
            }
            None => {
                let start = match previous {
                    Some(p) => p.checked_add(1).ok_or_else(|| numbering_overflow(p))?,
                    None => 0,
                };
                next_free(&used, start)?
            }
        };
        used.insert(number);
        previous = Some(number);
        items.push(Enumeration {
            name: *name,
            number,
            extension: true,
        });
    }

    Ok(items)
}

/// Smallest number at or above `candidate` not yet in `used`.
fn next_free(used: &FxHashSet<i64>, mut candidate: i64) -> Result<i64> {
    while used.contains(&candidate) {
        candidate = candidate
            .checked_add(1)
            .ok_or_else(|| numbering_overflow(candidate))?;
    }
    Ok(candidate)
}

#[cold]
fn numbering_overflow(after: i64) -> SchemaError {
    SchemaError::validation(
        ErrorCode::E2010,
        format!("no enumeration number left after {after}"),
    )
}

/// Top-level OID arcs and the well-known arcs beneath them (X.660 Annex A).
fn well_known_arc(parent: Option<u64>, name: &str) -> Option<u64> {
    match (parent, name) {
        (None, "itu-t" | "ccitt") => Some(0),
        (None, "iso") => Some(1),
        (None, "joint-iso-itu-t" | "joint-iso-ccitt") => Some(2),
        (Some(0), "recommendation") => Some(0),
        (Some(0), "question") => Some(1),
        (Some(0), "administration") => Some(2),
        (Some(0), "network-operator") => Some(3),
        (Some(0), "identified-organization") => Some(4),
        (Some(1), "standard") => Some(0),
        (Some(1), "registration-authority") => Some(1),
        (Some(1), "member-body") => Some(2),
        (Some(1), "identified-organization") => Some(3),
        _ => None,
    }
}

impl Schema {
    pub(crate) fn validate_builtin(&mut self, id: TypeId, scope: &Scope) -> Result<()> {
        let TypeKind::Builtin(builtin) = self.types.kind(id)? else {
            return Err(wrong_kind(id, "builtin"));
        };
        match builtin {
            BuiltinType::Integer(list) | BuiltinType::BitString(list) => {
                let bits = matches!(builtin, BuiltinType::BitString(_));
                let declared = list.declared.clone();
                let resolved = self.resolve_named_numbers(scope, &declared, bits)?;
                if let TypeKind::Builtin(
                    BuiltinType::Integer(list) | BuiltinType::BitString(list),
                ) = self.types.kind_mut(id)?
                {
                    list.resolved = resolved;
                }
            }
            BuiltinType::Enumerated(enumerated) => {
                let root = enumerated.root.clone();
                let additions = enumerated.additions.clone();
                let root = self.resolve_enum_items(scope, &root)?;
                let additions = self.resolve_enum_items(scope, &additions)?;
                let items = number_enumeration(&root, &additions)?;
                let implied = self.module_extensibility_implied(scope);
                if let TypeKind::Builtin(BuiltinType::Enumerated(enumerated)) =
                    self.types.kind_mut(id)?
                {
                    enumerated.items = items;
                    enumerated.extensible |= implied;
                }
            }
            _ => {}
        }
        Ok(())
    }

    fn resolve_named_numbers(
        &mut self,
        scope: &Scope,
        declared: &[NamedNumber],
        bits: bool,
    ) -> Result<Vec<(Name, i64)>> {
        let mut names = FxHashSet::default();
        let mut numbers = FxHashSet::default();
        let mut resolved = Vec::with_capacity(declared.len());
        for named in declared {
            let number = self.resolve_integer(scope, &named.value)?;
            if bits && number < 0 {
                return Err(SchemaError::validation(
                    ErrorCode::E2009,
                    format!(
                        "named bit `{}` has negative position {number}",
                        self.name_str(named.name)
                    ),
                ));
            }
            if !names.insert(named.name) || !numbers.insert(number) {
                return Err(SchemaError::validation(
                    ErrorCode::E2010,
                    format!(
                        "duplicate named {} `{}` ({number})",
                        if bits { "bit" } else { "number" },
                        self.name_str(named.name)
                    ),
                ));
            }
            resolved.push((named.name, number));
        }
        Ok(resolved)
    }

    fn resolve_enum_items(
        &mut self,
        scope: &Scope,
        items: &[EnumItem],
    ) -> Result<Vec<(Name, Option<i64>)>> {
        items
            .iter()
            .map(|item| {
                let number = match &item.number {
                    Some(value) => Some(self.resolve_integer(scope, value)?),
                    None => None,
                };
                Ok((item.name, number))
            })
            .collect()
    }

    pub(crate) fn optimize_builtin(
        &self,
        id: TypeId,
        builtin: &BuiltinType,
        scope: &Scope,
        value: &Value,
    ) -> Result<Value> {
        match (builtin, value) {
            (BuiltinType::Boolean, Value::Boolean(_))
            | (BuiltinType::Null, Value::Null)
            | (BuiltinType::Integer(_), Value::Integer(_))
            | (BuiltinType::Real, Value::Real(_))
            | (BuiltinType::BitString(_), Value::BitString(_))
            | (BuiltinType::OctetString, Value::OctetString(_)) => Ok(value.clone()),

            #[expect(
                clippy::cast_precision_loss,
                reason = "integer notation for REAL values is exact for typical magnitudes"
            )]
            (BuiltinType::Real, Value::Integer(n)) => Ok(Value::Real(*n as f64)),
            (BuiltinType::Real, Value::Collection(_)) => self.optimize_real_sequence(id, value),

            (BuiltinType::Enumerated(enumerated), _) => {
                self.optimize_enumerated(id, enumerated, value)
            }

            (BuiltinType::BitString(named), Value::Collection(items)) => {
                let mut bits = BitString::new();
                for item in items {
                    let Value::Ref(name) = item else {
                        return Err(self.value_mismatch(id, value));
                    };
                    let position = named
                        .number(name.name)
                        .and_then(|n| usize::try_from(n).ok())
                        .ok_or_else(|| {
                            SchemaError::unresolved_component(self.name_str(name.name))
                        })?;
                    bits.set(position, true);
                }
                Ok(Value::BitString(bits.trimmed()))
            }

            (BuiltinType::OctetString, Value::BitString(bits)) if bits.len() % 8 == 0 => {
                Ok(Value::OctetString(bits.as_bytes().to_vec()))
            }

            (BuiltinType::ObjectIdentifier | BuiltinType::RelativeOid, _) => {
                let relative = matches!(builtin, BuiltinType::RelativeOid);
                let arcs = self.optimize_oid(id, scope, value, relative)?;
                Ok(Value::Oid(arcs))
            }

            (BuiltinType::OidIri | BuiltinType::RelativeOidIri, Value::String(iri)) => {
                let relative = matches!(builtin, BuiltinType::RelativeOidIri);
                if valid_iri(iri, relative) {
                    Ok(value.clone())
                } else {
                    Err(self.value_mismatch(id, value))
                }
            }

            (BuiltinType::String(kind), Value::String(s)) => {
                match s.chars().find(|c| !kind.permits(*c)) {
                    None => Ok(value.clone()),
                    Some(c) => Err(SchemaError::validation(
                        ErrorCode::E2009,
                        format!("character {c:?} is not in the {} repertoire", kind.name()),
                    )),
                }
            }

            (BuiltinType::Time(kind), Value::String(s)) => {
                if self.time_formats()?.accepts(*kind, s) {
                    Ok(value.clone())
                } else {
                    Err(SchemaError::validation(
                        ErrorCode::E2009,
                        format!("\"{s}\" is not a valid {} value", kind.name()),
                    ))
                }
            }

            (BuiltinType::OpenType, Value::OpenType(open)) => {
                let inner = self.optimize(open.ty, scope, &open.value)?;
                Ok(Value::open_type(open.ty, inner))
            }
            (BuiltinType::OpenType, _) => Ok(value.clone()),

            _ => Err(self.value_mismatch(id, value)),
        }
    }

    fn optimize_enumerated(
        &self,
        id: TypeId,
        enumerated: &EnumeratedType,
        value: &Value,
    ) -> Result<Value> {
        let item = match value {
            Value::Named(named) => enumerated.by_name(named.name),
            Value::Integer(n) => match enumerated.by_number(*n) {
                Some(item) => Some(item),
                // An unknown number may be an addition from a later version.
                None if enumerated.extensible => return Ok(value.clone()),
                None => None,
            },
            _ => None,
        };
        if enumerated.items.is_empty() && !enumerated.root.is_empty() {
            return Err(not_validated(id));
        }
        match item {
            Some(item) => Ok(Value::named(item.name, Value::Integer(item.number))),
            None => Err(self.value_mismatch(id, value)),
        }
    }

    /// `{ mantissa m, base b, exponent e }`.
    fn optimize_real_sequence(&self, id: TypeId, value: &Value) -> Result<Value> {
        let part = |name: &str| {
            self.interner
                .get(name)
                .and_then(|n| value.component(n))
                .and_then(Value::as_integer)
        };
        let (Some(mantissa), Some(base), Some(exponent)) =
            (part("mantissa"), part("base"), part("exponent"))
        else {
            return Err(self.value_mismatch(id, value));
        };
        if base != 2 && base != 10 {
            return Err(SchemaError::validation(
                ErrorCode::E2009,
                format!("REAL base must be 2 or 10, found {base}"),
            ));
        }
        let exponent = i32::try_from(exponent).map_err(|_| self.value_mismatch(id, value))?;
        #[expect(
            clippy::cast_precision_loss,
            reason = "REAL values are represented as f64"
        )]
        let real = mantissa as f64 * (base as f64).powi(exponent);
        Ok(Value::Real(real))
    }

    fn optimize_oid(
        &self,
        id: TypeId,
        scope: &Scope,
        value: &Value,
        relative: bool,
    ) -> Result<Vec<u64>> {
        let arcs = match value {
            Value::Oid(arcs) => arcs.clone(),
            Value::Collection(items) => {
                let mut arcs: Vec<u64> = Vec::with_capacity(items.len());
                for (position, item) in items.iter().enumerate() {
                    match item {
                        Value::Integer(n) => arcs.push(self.arc(id, item, *n)?),
                        Value::Named(named) => {
                            let number = match &named.value {
                                Value::Integer(n) => *n,
                                other => self
                                    .resolve_value_ref(scope, other)?
                                    .as_integer()
                                    .ok_or_else(|| self.value_mismatch(id, value))?,
                            };
                            arcs.push(self.arc(id, item, number)?);
                        }
                        Value::Ref(name) => {
                            let resolved = match scope.resolve_value(self, name) {
                                Ok(ValueSymbol::Literal(v)) => Some(v),
                                Ok(ValueSymbol::Defined(def)) => Some(self.value_of(def)?),
                                Err(_) => None,
                            };
                            match resolved {
                                Some(Value::Oid(prefix)) if position == 0 => arcs.extend(prefix),
                                Some(Value::Integer(n)) => arcs.push(self.arc(id, item, n)?),
                                Some(_) => return Err(self.value_mismatch(id, value)),
                                None => {
                                    let parent = if position == 0 {
                                        None
                                    } else {
                                        arcs.last().copied()
                                    };
                                    let known = (arcs.len() == position)
                                        .then(|| well_known_arc(parent, self.name_str(name.name)))
                                        .flatten();
                                    match known {
                                        Some(arc) if !relative => arcs.push(arc),
                                        _ => return Err(SchemaError::unresolved_value(
                                            self.name_str(name.name),
                                        )),
                                    }
                                }
                            }
                        }
                        _ => return Err(self.value_mismatch(id, value)),
                    }
                }
                arcs
            }
            _ => return Err(self.value_mismatch(id, value)),
        };

        if !relative {
            match arcs.as_slice() {
                [] => {
                    return Err(SchemaError::validation(
                        ErrorCode::E2009,
                        "object identifier has no arcs",
                    ))
                }
                [first, ..] if *first > 2 => {
                    return Err(SchemaError::validation(
                        ErrorCode::E2009,
                        format!("object identifier root arc {first} is not 0, 1 or 2"),
                    ))
                }
                [first, second, ..] if *first < 2 && *second > 39 => {
                    return Err(SchemaError::validation(
                        ErrorCode::E2009,
                        format!("object identifier second arc {second} exceeds 39"),
                    ))
                }
                _ => {}
            }
        }
        Ok(arcs)
    }

    fn arc(&self, id: TypeId, item: &Value, number: i64) -> Result<u64> {
        u64::try_from(number).map_err(|_| self.value_mismatch(id, item))
    }
}

/// Check OID-IRI syntax: `/arc/arc` (absolute) or `arc/arc` (relative).
fn valid_iri(iri: &str, relative: bool) -> bool {
    let body = if relative {
        if iri.starts_with('/') {
            return false;
        }
        iri
    } else {
        match iri.strip_prefix('/') {
            Some(body) => body,
            None => return false,
        }
    };
    !body.is_empty()
        && body.split('/').all(|arc| {
            !arc.is_empty()
                && arc
                    .chars()
                    .all(|c| c.is_alphanumeric() || matches!(c, '-' | '.' | '_' | '~'))
        })
}
