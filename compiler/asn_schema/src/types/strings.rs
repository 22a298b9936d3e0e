//! Restricted character string kinds and their repertoires.

use crate::encoding::universal;

/// Restricted character string types (X.680 clause 41).
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum StringKind {
    Utf8,
    Numeric,
    Printable,
    /// Also spelled `T61String`.
    Teletex,
    Videotex,
    Ia5,
    Graphic,
    /// Also spelled `ISO646String`.
    Visible,
    General,
    Universal,
    Bmp,
    ObjectDescriptor,
}

impl StringKind {
    pub const ALL: &[StringKind] = &[
        StringKind::Utf8,
        StringKind::Numeric,
        StringKind::Printable,
        StringKind::Teletex,
        StringKind::Videotex,
        StringKind::Ia5,
        StringKind::Graphic,
        StringKind::Visible,
        StringKind::General,
        StringKind::Universal,
        StringKind::Bmp,
        StringKind::ObjectDescriptor,
    ];

    pub fn name(self) -> &'static str {
        match self {
            StringKind::Utf8 => "UTF8String",
            StringKind::Numeric => "NumericString",
            StringKind::Printable => "PrintableString",
            StringKind::Teletex => "TeletexString",
            StringKind::Videotex => "VideotexString",
            StringKind::Ia5 => "IA5String",
            StringKind::Graphic => "GraphicString",
            StringKind::Visible => "VisibleString",
            StringKind::General => "GeneralString",
            StringKind::Universal => "UniversalString",
            StringKind::Bmp => "BMPString",
            StringKind::ObjectDescriptor => "ObjectDescriptor",
        }
    }

    /// Look a kind up by its ASN.1 spelling, including the legacy aliases.
    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "T61String" => Some(StringKind::Teletex),
            "ISO646String" => Some(StringKind::Visible),
            _ => Self::ALL.iter().copied().find(|k| k.name() == name),
        }
    }

    pub fn universal_tag(self) -> u32 {
        match self {
            StringKind::Utf8 => universal::UTF8_STRING,
            StringKind::Numeric => universal::NUMERIC_STRING,
            StringKind::Printable => universal::PRINTABLE_STRING,
            StringKind::Teletex => universal::TELETEX_STRING,
            StringKind::Videotex => universal::VIDEOTEX_STRING,
            StringKind::Ia5 => universal::IA5_STRING,
            StringKind::Graphic => universal::GRAPHIC_STRING,
            StringKind::Visible => universal::VISIBLE_STRING,
            StringKind::General => universal::GENERAL_STRING,
            StringKind::Universal => universal::UNIVERSAL_STRING,
            StringKind::Bmp => universal::BMP_STRING,
            StringKind::ObjectDescriptor => universal::OBJECT_DESCRIPTOR,
        }
    }

    /// Whether `c` belongs to this kind's character repertoire.
    ///
    /// The ISO 2022 based kinds (Teletex, Videotex, Graphic, General,
    /// ObjectDescriptor) accept any character; their repertoires depend on
    /// escape sequences a schema cannot see.
    pub fn permits(self, c: char) -> bool {
        match self {
            StringKind::Numeric => c.is_ascii_digit() || c == ' ',
            StringKind::Printable => {
                c.is_ascii_alphanumeric() || " '()+,-./:=?".contains(c)
            }
            StringKind::Ia5 => c.is_ascii(),
            StringKind::Visible => (' '..='~').contains(&c),
            StringKind::Bmp => u32::from(c) <= 0xFFFF,
            StringKind::Utf8
            | StringKind::Universal
            | StringKind::Teletex
            | StringKind::Videotex
            | StringKind::Graphic
            | StringKind::General
            | StringKind::ObjectDescriptor => true,
        }
    }
}
