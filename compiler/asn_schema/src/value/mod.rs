//! Values.
//!
//! A [`Value`] is either *raw* (as written in a schema or handed in by a
//! codec: references, named-bit lists, object settings still carrying element
//! sets) or *optimized*, the native form a type's `optimize` returns. The two
//! share one representation; optimization only rewrites.

mod compare;
mod display;
mod prepare;

pub use compare::compare_values;
pub use display::ValueDisplay;

use asn_ir::{FieldPath, Name, RefName, TypeId};

use crate::constraint::ConstraintTemplate;
use crate::refs::TypeRef;
use crate::template::TemplateArg;

/// A schema or codec value.
#[derive(Clone, Debug, PartialEq)]
pub enum Value {
    Null,
    Boolean(bool),
    Integer(i64),
    Real(f64),
    /// Character string, also the form of time values.
    String(String),
    BitString(BitString),
    OctetString(Vec<u8>),
    /// Object identifier or relative OID arcs.
    Oid(Vec<u64>),
    /// `name value`: CHOICE alternatives, SEQUENCE/SET components, named OID
    /// arcs, enumeration items.
    Named(Box<NamedValue>),
    /// `{ ... }`: SEQUENCE/SET component lists, SEQUENCE OF/SET OF elements,
    /// OID component lists, named-bit lists.
    Collection(Vec<Value>),
    /// Information object.
    Object(ObjectValue),
    /// Value of an open type, with the type it was matched against.
    OpenType(Box<OpenTypeValue>),
    /// Reference to a defined value, named number or enumeration item.
    Ref(RefName),
    /// `object.&field` reference to a value setting of an object.
    ObjectField { object: RefName, path: FieldPath },
    /// Reference to a parameterized value with arguments.
    Instance(Box<ValueInstance>),
}

impl Value {
    pub fn named(name: Name, value: Value) -> Self {
        Value::Named(Box::new(NamedValue { name, value }))
    }

    pub fn reference(name: Name) -> Self {
        Value::Ref(RefName::local(name))
    }

    pub fn open_type(ty: TypeId, value: Value) -> Self {
        Value::OpenType(Box::new(OpenTypeValue { ty, value }))
    }

    pub fn as_integer(&self) -> Option<i64> {
        match self {
            Value::Integer(n) => Some(*n),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::String(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_named(&self) -> Option<&NamedValue> {
        match self {
            Value::Named(named) => Some(named),
            _ => None,
        }
    }

    pub fn as_collection(&self) -> Option<&[Value]> {
        match self {
            Value::Collection(items) => Some(items),
            _ => None,
        }
    }

    pub fn as_object(&self) -> Option<&ObjectValue> {
        match self {
            Value::Object(object) => Some(object),
            _ => None,
        }
    }

    /// Value of component `name` in a SEQUENCE/SET value or CHOICE value.
    pub fn component(&self, name: Name) -> Option<&Value> {
        match self {
            Value::Named(named) if named.name == name => Some(&named.value),
            Value::Collection(items) => items.iter().find_map(|item| match item {
                Value::Named(named) if named.name == name => Some(&named.value),
                _ => None,
            }),
            _ => None,
        }
    }

    /// Whether this value still needs resolution before it can be compared.
    pub fn is_reference(&self) -> bool {
        matches!(
            self,
            Value::Ref(_) | Value::ObjectField { .. } | Value::Instance(_)
        )
    }
}

/// A named value: `name value`.
#[derive(Clone, Debug, PartialEq)]
pub struct NamedValue {
    pub name: Name,
    pub value: Value,
}

/// Value of an open type.
#[derive(Clone, Debug, PartialEq)]
pub struct OpenTypeValue {
    /// The type the value was optimized against.
    pub ty: TypeId,
    pub value: Value,
}

/// A parameterized value reference: `value{arg, ...}`.
#[derive(Clone, Debug, PartialEq)]
pub struct ValueInstance {
    pub template: RefName,
    pub args: Vec<TemplateArg>,
}

/// A bit string, most significant bit first.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Default)]
pub struct BitString {
    bytes: Vec<u8>,
    len: usize,
}

impl BitString {
    /// An empty bit string.
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_bits(bits: &[bool]) -> Self {
        let mut out = BitString::new();
        for (i, &bit) in bits.iter().enumerate() {
            out.set(i, bit);
        }
        out.len = bits.len();
        out
    }

    /// Parse a binary string body (`'0101'B`). Whitespace is ignored.
    pub fn from_binary(digits: &str) -> Option<Self> {
        let mut bits = Vec::with_capacity(digits.len());
        for c in digits.chars().filter(|c| !c.is_whitespace()) {
            match c {
                '0' => bits.push(false),
                '1' => bits.push(true),
                _ => return None,
            }
        }
        Some(Self::from_bits(&bits))
    }

    /// Parse a hex string body (`'A0F'H`), four bits per digit.
    pub fn from_hex(digits: &str) -> Option<Self> {
        let mut bits = Vec::with_capacity(digits.len() * 4);
        for c in digits.chars().filter(|c| !c.is_whitespace()) {
            let nibble = c.to_digit(16)?;
            for shift in (0..4).rev() {
                bits.push(nibble >> shift & 1 == 1);
            }
        }
        Some(Self::from_bits(&bits))
    }

    /// Number of bits.
    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Bit at `index`; bits past the end read as zero.
    pub fn bit(&self, index: usize) -> bool {
        index < self.len && self.bytes[index / 8] & (0x80 >> (index % 8)) != 0
    }

    /// Set bit `index`, extending the string as needed.
    pub fn set(&mut self, index: usize, bit: bool) {
        if index >= self.len {
            self.len = index + 1;
            self.bytes.resize(self.len.div_ceil(8), 0);
        }
        let mask = 0x80 >> (index % 8);
        if bit {
            self.bytes[index / 8] |= mask;
        } else {
            self.bytes[index / 8] &= !mask;
        }
    }

    /// Packed bytes; trailing pad bits are zero.
    pub fn as_bytes(&self) -> &[u8] {
        &self.bytes
    }

    /// Drop trailing zero bits (named-bit lists encode without them).
    #[must_use]
    pub fn trimmed(&self) -> Self {
        let mut len = self.len;
        while len > 0 && !self.bit(len - 1) {
            len -= 1;
        }
        let mut bytes = self.bytes.clone();
        bytes.truncate(len.div_ceil(8));
        BitString { bytes, len }
    }
}

/// An information object: `{ &id 1, &Type INTEGER }`.
#[derive(Clone, Debug, PartialEq, Default)]
pub struct ObjectValue {
    pub fields: Vec<FieldValue>,
}

impl ObjectValue {
    pub fn new(fields: Vec<FieldValue>) -> Self {
        ObjectValue { fields }
    }

    /// Setting of field `name`.
    pub fn field(&self, name: Name) -> Option<&Setting> {
        self.fields
            .iter()
            .find(|f| f.name == name)
            .map(|f| &f.setting)
    }

    /// Setting reached by following `path` through nested object settings.
    pub fn setting_at(&self, path: &[Name]) -> Option<&Setting> {
        let (first, rest) = path.split_first()?;
        let setting = self.field(*first)?;
        if rest.is_empty() {
            return Some(setting);
        }
        match setting {
            Setting::Value(Value::Object(inner)) => inner.setting_at(rest),
            _ => None,
        }
    }
}

/// One field setting of an object.
#[derive(Clone, Debug, PartialEq)]
pub struct FieldValue {
    pub name: Name,
    pub setting: Setting,
}

impl FieldValue {
    pub fn new(name: Name, setting: Setting) -> Self {
        FieldValue { name, setting }
    }
}

/// What an object field is set to.
#[derive(Clone, Debug, PartialEq)]
pub enum Setting {
    /// Type field setting.
    Type(TypeRef),
    /// Fixed- or variable-type value field, or object field.
    Value(Value),
    /// Value-set or object-set field, as the constrained type holding the set.
    ValueSet(TypeRef),
    /// Value-set or object-set field as written; becomes `ValueSet` during
    /// validation once the governing type is known.
    ElementSet(Box<ConstraintTemplate>),
}
