//! Human-readable rendering of values for error messages.

use std::fmt;

use asn_ir::StringLookup;

use super::{Setting, Value};

/// Renders a [`Value`] in ASN.1 value notation.
pub struct ValueDisplay<'a> {
    value: &'a Value,
    names: &'a dyn StringLookup,
}

impl<'a> ValueDisplay<'a> {
    pub fn new(value: &'a Value, names: &'a dyn StringLookup) -> Self {
        ValueDisplay { value, names }
    }

    fn nested(&self, value: &'a Value) -> Self {
        ValueDisplay {
            value,
            names: self.names,
        }
    }
}

impl fmt::Display for ValueDisplay<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.value {
            Value::Null => f.write_str("NULL"),
            Value::Boolean(true) => f.write_str("TRUE"),
            Value::Boolean(false) => f.write_str("FALSE"),
            Value::Integer(n) => write!(f, "{n}"),
            Value::Real(r) => write!(f, "{r}"),
            Value::String(s) => write!(f, "\"{s}\""),
            Value::BitString(bits) => {
                f.write_str("'")?;
                for i in 0..bits.len() {
                    f.write_str(if bits.bit(i) { "1" } else { "0" })?;
                }
                f.write_str("'B")
            }
            Value::OctetString(bytes) => {
                f.write_str("'")?;
                for b in bytes {
                    write!(f, "{b:02X}")?;
                }
                f.write_str("'H")
            }
            Value::Oid(arcs) => {
                f.write_str("{")?;
                for arc in arcs {
                    write!(f, " {arc}")?;
                }
                f.write_str(" }")
            }
            Value::Named(named) => write!(
                f,
                "{} {}",
                self.names.lookup(named.name),
                self.nested(&named.value)
            ),
            Value::Collection(items) => {
                f.write_str("{")?;
                for (i, item) in items.iter().enumerate() {
                    f.write_str(if i == 0 { " " } else { ", " })?;
                    write!(f, "{}", self.nested(item))?;
                }
                f.write_str(" }")
            }
            Value::Object(object) => {
                f.write_str("{")?;
                for (i, field) in object.fields.iter().enumerate() {
                    f.write_str(if i == 0 { " " } else { ", " })?;
                    write!(f, "{} ", self.names.lookup(field.name))?;
                    match &field.setting {
                        Setting::Value(v) => write!(f, "{}", self.nested(v))?,
                        Setting::Type(_) => f.write_str("<type>")?,
                        Setting::ValueSet(_) | Setting::ElementSet(_) => f.write_str("{...}")?,
                    }
                }
                f.write_str(" }")
            }
            Value::OpenType(open) => write!(f, "{}", self.nested(&open.value)),
            Value::Ref(name) => {
                if let Some(module) = name.module {
                    write!(f, "{}.", self.names.lookup(module))?;
                }
                f.write_str(self.names.lookup(name.name))
            }
            Value::ObjectField { object, path } => {
                f.write_str(self.names.lookup(object.name))?;
                for field in path.fields() {
                    write!(f, ".{}", self.names.lookup(*field))?;
                }
                Ok(())
            }
            Value::Instance(instance) => {
                write!(f, "{}{{...}}", self.names.lookup(instance.template.name))
            }
        }
    }
}
