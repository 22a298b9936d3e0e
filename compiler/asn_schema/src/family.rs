//! Type families.
//!
//! A family is what a type *is* once every decorator has been peeled off.
//! Codecs switch on it, and constraints use [`FamilySet`] to declare which
//! families they apply to.

use bitflags::bitflags;

/// The family of a (validated) type.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum Family {
    Boolean,
    Integer,
    Real,
    Enumerated,
    BitString,
    OctetString,
    Null,
    ObjectIdentifier,
    RelativeOid,
    OidIri,
    RelativeOidIri,
    RestrictedString,
    UtcTime,
    GeneralizedTime,
    Time,
    Date,
    TimeOfDay,
    DateTime,
    Duration,
    Sequence,
    SequenceOf,
    Set,
    SetOf,
    Choice,
    OpenType,
    /// Information object class (its values are objects).
    Class,
}

bitflags! {
    /// A set of families.
    #[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
    pub struct FamilySet: u32 {
        const BOOLEAN = 1 << 0;
        const INTEGER = 1 << 1;
        const REAL = 1 << 2;
        const ENUMERATED = 1 << 3;
        const BIT_STRING = 1 << 4;
        const OCTET_STRING = 1 << 5;
        const NULL = 1 << 6;
        const OBJECT_IDENTIFIER = 1 << 7;
        const RELATIVE_OID = 1 << 8;
        const OID_IRI = 1 << 9;
        const RELATIVE_OID_IRI = 1 << 10;
        const RESTRICTED_STRING = 1 << 11;
        const UTC_TIME = 1 << 12;
        const GENERALIZED_TIME = 1 << 13;
        const TIME = 1 << 14;
        const DATE = 1 << 15;
        const TIME_OF_DAY = 1 << 16;
        const DATE_TIME = 1 << 17;
        const DURATION = 1 << 18;
        const SEQUENCE = 1 << 19;
        const SEQUENCE_OF = 1 << 20;
        const SET = 1 << 21;
        const SET_OF = 1 << 22;
        const CHOICE = 1 << 23;
        const OPEN_TYPE = 1 << 24;
        const CLASS = 1 << 25;

        /// Families whose values are ordered (value ranges apply).
        const ORDERED = Self::INTEGER.bits() | Self::REAL.bits() | Self::RESTRICTED_STRING.bits()
            | Self::TIME_FAMILIES.bits();
        /// ISO 8601 time types (property settings apply).
        const TIME_FAMILIES = Self::TIME.bits() | Self::DATE.bits() | Self::TIME_OF_DAY.bits()
            | Self::DATE_TIME.bits() | Self::DURATION.bits();
        /// Families with a length (size constraints apply).
        const SIZED = Self::BIT_STRING.bits() | Self::OCTET_STRING.bits()
            | Self::RESTRICTED_STRING.bits() | Self::SEQUENCE_OF.bits() | Self::SET_OF.bits();
        /// Families with named components.
        const COMPONENTS = Self::SEQUENCE.bits() | Self::SET.bits() | Self::CHOICE.bits();
        /// Families with a single element type.
        const ELEMENTS = Self::SEQUENCE_OF.bits() | Self::SET_OF.bits();
    }
}

impl Family {
    /// This family as a singleton set.
    pub fn as_set(self) -> FamilySet {
        match self {
            Family::Boolean => FamilySet::BOOLEAN,
            Family::Integer => FamilySet::INTEGER,
            Family::Real => FamilySet::REAL,
            Family::Enumerated => FamilySet::ENUMERATED,
            Family::BitString => FamilySet::BIT_STRING,
            Family::OctetString => FamilySet::OCTET_STRING,
            Family::Null => FamilySet::NULL,
            Family::ObjectIdentifier => FamilySet::OBJECT_IDENTIFIER,
            Family::RelativeOid => FamilySet::RELATIVE_OID,
            Family::OidIri => FamilySet::OID_IRI,
            Family::RelativeOidIri => FamilySet::RELATIVE_OID_IRI,
            Family::RestrictedString => FamilySet::RESTRICTED_STRING,
            Family::UtcTime => FamilySet::UTC_TIME,
            Family::GeneralizedTime => FamilySet::GENERALIZED_TIME,
            Family::Time => FamilySet::TIME,
            Family::Date => FamilySet::DATE,
            Family::TimeOfDay => FamilySet::TIME_OF_DAY,
            Family::DateTime => FamilySet::DATE_TIME,
            Family::Duration => FamilySet::DURATION,
            Family::Sequence => FamilySet::SEQUENCE,
            Family::SequenceOf => FamilySet::SEQUENCE_OF,
            Family::Set => FamilySet::SET,
            Family::SetOf => FamilySet::SET_OF,
            Family::Choice => FamilySet::CHOICE,
            Family::OpenType => FamilySet::OPEN_TYPE,
            Family::Class => FamilySet::CLASS,
        }
    }

    /// Whether this family belongs to `set`.
    #[inline]
    pub fn is_in(self, set: FamilySet) -> bool {
        set.contains(self.as_set())
    }

    /// Whether an implicit tag on this family must be promoted to explicit.
    pub fn requires_explicit_tag(self) -> bool {
        matches!(self, Family::Choice | Family::OpenType)
    }

    /// ASN.1 spelling of the family.
    pub fn name(self) -> &'static str {
        match self {
            Family::Boolean => "BOOLEAN",
            Family::Integer => "INTEGER",
            Family::Real => "REAL",
            Family::Enumerated => "ENUMERATED",
            Family::BitString => "BIT STRING",
            Family::OctetString => "OCTET STRING",
            Family::Null => "NULL",
            Family::ObjectIdentifier => "OBJECT IDENTIFIER",
            Family::RelativeOid => "RELATIVE-OID",
            Family::OidIri => "OID-IRI",
            Family::RelativeOidIri => "RELATIVE-OID-IRI",
            Family::RestrictedString => "character string",
            Family::UtcTime => "UTCTime",
            Family::GeneralizedTime => "GeneralizedTime",
            Family::Time => "TIME",
            Family::Date => "DATE",
            Family::TimeOfDay => "TIME-OF-DAY",
            Family::DateTime => "DATE-TIME",
            Family::Duration => "DURATION",
            Family::Sequence => "SEQUENCE",
            Family::SequenceOf => "SEQUENCE OF",
            Family::Set => "SET",
            Family::SetOf => "SET OF",
            Family::Choice => "CHOICE",
            Family::OpenType => "open type",
            Family::Class => "CLASS",
        }
    }
}

impl std::fmt::Display for Family {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}
