//! Property settings of TIME types: `SETTINGS "Basic=Date Date=YMD"`.

use asn_diagnostic::ErrorCode;

use crate::error::{Result, SchemaError};
use crate::types::{BasicForm, DateForm, LocalOrUtc, TimeProperties};

/// One required property value.
#[derive(Clone, Debug, PartialEq, Eq)]
enum Requirement {
    Basic(BasicForm),
    Date(DateForm),
    /// `H`, `HM`, `HMS`, optionally followed by `F<n>`.
    Time(String),
    LocalOrUtc(LocalOrUtc),
    /// A property this engine does not classify (`Year`, `Midnight`, ...).
    Other,
}

/// Parsed property settings.
#[derive(Clone, Debug, PartialEq, Eq, Default)]
pub struct TimeSettings {
    source: String,
    requirements: Vec<Requirement>,
}

impl TimeSettings {
    /// Parse a settings string: whitespace-separated `Property=Value` pairs.
    pub fn parse(text: &str) -> Result<Self> {
        let invalid = |pair: &str| {
            SchemaError::validation(
                ErrorCode::E2009,
                format!("invalid property setting `{pair}`"),
            )
        };
        let mut requirements = Vec::new();
        for pair in text.split_whitespace() {
            let (property, value) = pair.split_once('=').ok_or_else(|| invalid(pair))?;
            let requirement = match property {
                "Basic" => Requirement::Basic(match value {
                    "Date" => BasicForm::Date,
                    "Time" => BasicForm::Time,
                    "Date-Time" => BasicForm::DateTime,
                    "Interval" => BasicForm::Interval,
                    "Rec-Interval" => BasicForm::RecInterval,
                    _ => return Err(invalid(pair)),
                }),
                "Date" => Requirement::Date(match value {
                    "C" => DateForm::C,
                    "Y" => DateForm::Y,
                    "YM" => DateForm::YM,
                    "YMD" => DateForm::YMD,
                    "YD" => DateForm::YD,
                    "YW" => DateForm::YW,
                    "YWD" => DateForm::YWD,
                    _ => return Err(invalid(pair)),
                }),
                "Time" => {
                    let base = value.split_once('F').map_or(value, |(base, _)| base);
                    if !matches!(base, "H" | "HM" | "HMS") {
                        return Err(invalid(pair));
                    }
                    Requirement::Time(value.to_owned())
                }
                "Local-or-UTC" => Requirement::LocalOrUtc(match value {
                    "L" => LocalOrUtc::L,
                    "Z" => LocalOrUtc::Z,
                    "LD" => LocalOrUtc::LD,
                    _ => return Err(invalid(pair)),
                }),
                "Year" | "Interval-type" | "SE-point" | "Recurrence" | "Midnight" => {
                    Requirement::Other
                }
                _ => return Err(invalid(pair)),
            };
            requirements.push(requirement);
        }
        Ok(TimeSettings {
            source: text.to_owned(),
            requirements,
        })
    }

    pub fn as_str(&self) -> &str {
        &self.source
    }

    /// Whether a value with `properties` satisfies every setting.
    pub(crate) fn matches(&self, properties: &TimeProperties) -> bool {
        self.requirements.iter().all(|requirement| match requirement {
            Requirement::Basic(basic) => properties.basic == *basic,
            Requirement::Date(date) => properties.date == Some(*date),
            Requirement::Time(time) => properties.time.as_deref() == Some(time.as_str()),
            Requirement::LocalOrUtc(local) => properties.local_or_utc == Some(*local),
            Requirement::Other => true,
        })
    }
}
