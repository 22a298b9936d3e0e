//! Encoding instructions attached to types.
//!
//! The only instruction the engine computes is the tag. Codecs ask for it via
//! `Schema::encoding(ty, EncodingKind::Tag)`.

use crate::family::Family;

/// Tag class.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum TagClass {
    Universal,
    Application,
    Context,
    Private,
}

/// Tagging method of a tag or a module default.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum TagMethod {
    Explicit,
    Implicit,
    /// Module default only; positional context tags for untagged collections.
    Automatic,
    /// Not stated; the module default decides.
    Unknown,
}

impl TagMethod {
    /// Method a tag with `self` gets inside a module whose default is `module`.
    ///
    /// AUTOMATIC modules tag implicitly.
    pub fn effective(self, module: TagMethod) -> TagMethod {
        match self {
            TagMethod::Explicit | TagMethod::Implicit => self,
            TagMethod::Automatic | TagMethod::Unknown => match module {
                TagMethod::Explicit | TagMethod::Unknown => TagMethod::Explicit,
                TagMethod::Implicit | TagMethod::Automatic => TagMethod::Implicit,
            },
        }
    }
}

/// A tag: `[APPLICATION 3 IMPLICIT]`.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub struct TagEncoding {
    pub class: TagClass,
    pub number: u32,
    pub method: TagMethod,
}

impl TagEncoding {
    pub const fn new(class: TagClass, number: u32, method: TagMethod) -> Self {
        TagEncoding {
            class,
            number,
            method,
        }
    }

    /// A context-specific tag with an unstated method.
    pub const fn context(number: u32) -> Self {
        Self::new(TagClass::Context, number, TagMethod::Unknown)
    }

    /// A universal tag; universal tags are never explicit.
    pub const fn universal(number: u32) -> Self {
        Self::new(TagClass::Universal, number, TagMethod::Implicit)
    }

    /// Same tag with another method.
    #[must_use]
    pub const fn with_method(self, method: TagMethod) -> Self {
        Self::new(self.class, self.number, method)
    }

    /// Whether two tags collide (class and number, method ignored).
    pub fn same_tag(&self, other: &TagEncoding) -> bool {
        self.class == other.class && self.number == other.number
    }
}

impl std::fmt::Display for TagEncoding {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let class = match self.class {
            TagClass::Universal => "UNIVERSAL ",
            TagClass::Application => "APPLICATION ",
            TagClass::Context => "",
            TagClass::Private => "PRIVATE ",
        };
        let method = match self.method {
            TagMethod::Explicit => " EXPLICIT",
            TagMethod::Implicit => " IMPLICIT",
            TagMethod::Automatic | TagMethod::Unknown => "",
        };
        write!(f, "[{class}{}]{method}", self.number)
    }
}

/// Kinds of encoding instruction a codec may request.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum EncodingKind {
    Tag,
}

/// An encoding instruction.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum Encoding {
    Tag(TagEncoding),
}

impl Encoding {
    pub fn kind(&self) -> EncodingKind {
        match self {
            Encoding::Tag(_) => EncodingKind::Tag,
        }
    }

    pub fn as_tag(&self) -> Option<&TagEncoding> {
        match self {
            Encoding::Tag(tag) => Some(tag),
        }
    }
}

/// Universal tag numbers (X.680 clause 8.4).
pub mod universal {
    pub const BOOLEAN: u32 = 1;
    pub const INTEGER: u32 = 2;
    pub const BIT_STRING: u32 = 3;
    pub const OCTET_STRING: u32 = 4;
    pub const NULL: u32 = 5;
    pub const OBJECT_IDENTIFIER: u32 = 6;
    pub const OBJECT_DESCRIPTOR: u32 = 7;
    pub const REAL: u32 = 9;
    pub const ENUMERATED: u32 = 10;
    pub const UTF8_STRING: u32 = 12;
    pub const RELATIVE_OID: u32 = 13;
    pub const TIME: u32 = 14;
    pub const SEQUENCE: u32 = 16;
    pub const SET: u32 = 17;
    pub const NUMERIC_STRING: u32 = 18;
    pub const PRINTABLE_STRING: u32 = 19;
    pub const TELETEX_STRING: u32 = 20;
    pub const VIDEOTEX_STRING: u32 = 21;
    pub const IA5_STRING: u32 = 22;
    pub const UTC_TIME: u32 = 23;
    pub const GENERALIZED_TIME: u32 = 24;
    pub const GRAPHIC_STRING: u32 = 25;
    pub const VISIBLE_STRING: u32 = 26;
    pub const GENERAL_STRING: u32 = 27;
    pub const UNIVERSAL_STRING: u32 = 28;
    pub const BMP_STRING: u32 = 30;
    pub const DATE: u32 = 31;
    pub const TIME_OF_DAY: u32 = 32;
    pub const DATE_TIME: u32 = 33;
    pub const DURATION: u32 = 34;
    pub const OID_IRI: u32 = 35;
    pub const RELATIVE_OID_IRI: u32 = 36;
}

/// Universal tag of a family, when the family alone determines it.
///
/// Character strings are excluded: their tag depends on the string kind.
pub(crate) fn universal_tag(family: Family) -> Option<TagEncoding> {
    let number = match family {
        Family::Boolean => universal::BOOLEAN,
        Family::Integer => universal::INTEGER,
        Family::Real => universal::REAL,
        Family::Enumerated => universal::ENUMERATED,
        Family::BitString => universal::BIT_STRING,
        Family::OctetString => universal::OCTET_STRING,
        Family::Null => universal::NULL,
        Family::ObjectIdentifier => universal::OBJECT_IDENTIFIER,
        Family::RelativeOid => universal::RELATIVE_OID,
        Family::OidIri => universal::OID_IRI,
        Family::RelativeOidIri => universal::RELATIVE_OID_IRI,
        Family::UtcTime => universal::UTC_TIME,
        Family::GeneralizedTime => universal::GENERALIZED_TIME,
        Family::Time => universal::TIME,
        Family::Date => universal::DATE,
        Family::TimeOfDay => universal::TIME_OF_DAY,
        Family::DateTime => universal::DATE_TIME,
        Family::Duration => universal::DURATION,
        Family::Sequence | Family::SequenceOf => universal::SEQUENCE,
        Family::Set | Family::SetOf => universal::SET,
        Family::RestrictedString | Family::Choice | Family::OpenType | Family::Class => {
            return None
        }
    };
    Some(TagEncoding::universal(number))
}
