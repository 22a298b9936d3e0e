//! Time types and ISO 8601 value formats.

use regex::Regex;

use crate::encoding::universal;
use crate::family::Family;

/// Time types (X.680 clauses 38, 46, 47).
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum TimeKind {
    UtcTime,
    GeneralizedTime,
    Time,
    Date,
    TimeOfDay,
    DateTime,
    Duration,
}

impl TimeKind {
    pub fn family(self) -> Family {
        match self {
            TimeKind::UtcTime => Family::UtcTime,
            TimeKind::GeneralizedTime => Family::GeneralizedTime,
            TimeKind::Time => Family::Time,
            TimeKind::Date => Family::Date,
            TimeKind::TimeOfDay => Family::TimeOfDay,
            TimeKind::DateTime => Family::DateTime,
            TimeKind::Duration => Family::Duration,
        }
    }

    pub fn name(self) -> &'static str {
        self.family().name()
    }

    pub fn universal_tag(self) -> u32 {
        match self {
            TimeKind::UtcTime => universal::UTC_TIME,
            TimeKind::GeneralizedTime => universal::GENERALIZED_TIME,
            TimeKind::Time => universal::TIME,
            TimeKind::Date => universal::DATE,
            TimeKind::TimeOfDay => universal::TIME_OF_DAY,
            TimeKind::DateTime => universal::DATE_TIME,
            TimeKind::Duration => universal::DURATION,
        }
    }
}

/// `Basic` property of a TIME value.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub(crate) enum BasicForm {
    Date,
    Time,
    DateTime,
    Interval,
    RecInterval,
}

/// `Date` property: which date components are present.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub(crate) enum DateForm {
    C,
    Y,
    YM,
    YMD,
    YD,
    YW,
    YWD,
}

/// `Local-or-UTC` property.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub(crate) enum LocalOrUtc {
    /// No designator.
    L,
    /// `Z`.
    Z,
    /// Local time with a difference from UTC.
    LD,
}

/// Property values of one TIME value, as far as they are determined.
#[derive(Clone, Debug, PartialEq, Eq)]
pub(crate) struct TimeProperties {
    pub basic: BasicForm,
    pub date: Option<DateForm>,
    /// Time components: `H`, `HM`, `HMS`, with `F<n>` for `n` fraction digits.
    pub time: Option<String>,
    pub local_or_utc: Option<LocalOrUtc>,
}

/// Compiled ISO 8601 recognizers, built on first use by each schema.
pub(crate) struct TimeFormats {
    date: Regex,
    time: Regex,
    duration: Regex,
    utc_time: Regex,
    generalized_time: Regex,
}

impl std::fmt::Debug for TimeFormats {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TimeFormats").finish_non_exhaustive()
    }
}

impl TimeFormats {
    pub(crate) fn new() -> Result<Self, regex::Error> {
        Ok(TimeFormats {
            date: Regex::new(
                r"^(?:(?P<c>\d{2})|(?P<y>[+-]?\d{4,})(?:-(?:(?P<w>W\d{2})(?:-(?P<wd>[1-7]))?|(?P<m>\d{2})(?:-(?P<d>\d{2}))?|(?P<yd>\d{3})))?)$",
            )?,
            time: Regex::new(
                r"^(?P<h>\d{2})(?::(?P<m>\d{2})(?::(?P<s>\d{2}))?)?(?:[.,](?P<f>\d+))?(?P<z>Z|[+-]\d{2}(?::?\d{2})?)?$",
            )?,
            duration: Regex::new(
                r"^P(?:\d+(?:[.,]\d+)?W|(?:\d+Y)?(?:\d+M)?(?:\d+D)?(?:T(?:\d+H)?(?:\d+M)?(?:\d+(?:[.,]\d+)?S)?)?)$",
            )?,
            utc_time: Regex::new(r"^\d{10}(?:\d{2})?(?:Z|[+-]\d{4})$")?,
            generalized_time: Regex::new(
                r"^\d{10}(?:\d{2}(?:\d{2})?)?(?:[.,]\d+)?(?:Z|[+-]\d{4})?$",
            )?,
        })
    }

    /// Whether `text` is a value of `kind`.
    pub(crate) fn accepts(&self, kind: TimeKind, text: &str) -> bool {
        match kind {
            TimeKind::UtcTime => self.utc_time.is_match(text),
            TimeKind::GeneralizedTime => self.generalized_time.is_match(text),
            TimeKind::Duration => self.is_duration(text),
            TimeKind::Time => self.properties(text).is_some(),
            TimeKind::Date => self
                .properties(text)
                .is_some_and(|p| p.basic == BasicForm::Date && p.date == Some(DateForm::YMD)),
            TimeKind::TimeOfDay => self.properties(text).is_some_and(|p| {
                p.basic == BasicForm::Time
                    && p.time.as_deref() == Some("HMS")
                    && p.local_or_utc == Some(LocalOrUtc::L)
            }),
            TimeKind::DateTime => self.properties(text).is_some_and(|p| {
                p.basic == BasicForm::DateTime
                    && p.date == Some(DateForm::YMD)
                    && p.time.as_deref() == Some("HMS")
                    && p.local_or_utc == Some(LocalOrUtc::L)
            }),
        }
    }

    fn is_duration(&self, text: &str) -> bool {
        text != "P" && !text.ends_with('T') && self.duration.is_match(text)
    }

    /// Classify a TIME value; `None` if it is not ISO 8601.
    pub(crate) fn properties(&self, text: &str) -> Option<TimeProperties> {
        if let Some(rest) = text.strip_prefix('R') {
            let (_, interval) = rest.split_once('/')?;
            self.interval(interval)?;
            return Some(TimeProperties {
                basic: BasicForm::RecInterval,
                date: None,
                time: None,
                local_or_utc: None,
            });
        }
        if text.contains('/') {
            self.interval(text)?;
            return Some(TimeProperties {
                basic: BasicForm::Interval,
                date: None,
                time: None,
                local_or_utc: None,
            });
        }
        if self.is_duration(text) {
            return Some(TimeProperties {
                basic: BasicForm::Interval,
                date: None,
                time: None,
                local_or_utc: None,
            });
        }
        if let Some((date, time)) = text.split_once('T') {
            let date = self.date_form(date)?;
            let (time, local) = self.time_form(time)?;
            return Some(TimeProperties {
                basic: BasicForm::DateTime,
                date: Some(date),
                time: Some(time),
                local_or_utc: Some(local),
            });
        }
        if let Some(date) = self.date_form(text) {
            return Some(TimeProperties {
                basic: BasicForm::Date,
                date: Some(date),
                time: None,
                local_or_utc: None,
            });
        }
        let (time, local) = self.time_form(text)?;
        Some(TimeProperties {
            basic: BasicForm::Time,
            date: None,
            time: Some(time),
            local_or_utc: Some(local),
        })
    }

    /// `start/end`, `start/duration`, `duration/end` or `duration`.
    fn interval(&self, text: &str) -> Option<()> {
        let point = |p: &str| self.is_duration(p) || self.properties(p).is_some();
        match text.split_once('/') {
            Some((start, end)) => (point(start) && point(end)).then_some(()),
            None => self.is_duration(text).then_some(()),
        }
    }

    fn date_form(&self, text: &str) -> Option<DateForm> {
        let caps = self.date.captures(text)?;
        let form = if caps.name("c").is_some() {
            DateForm::C
        } else if caps.name("wd").is_some() {
            DateForm::YWD
        } else if caps.name("w").is_some() {
            DateForm::YW
        } else if caps.name("d").is_some() {
            DateForm::YMD
        } else if caps.name("m").is_some() {
            DateForm::YM
        } else if caps.name("yd").is_some() {
            DateForm::YD
        } else {
            DateForm::Y
        };
        Some(form)
    }

    fn time_form(&self, text: &str) -> Option<(String, LocalOrUtc)> {
        let caps = self.time.captures(text)?;
        let mut form = String::from("H");
        if caps.name("m").is_some() {
            form.push('M');
        }
        if caps.name("s").is_some() {
            form.push('S');
        }
        if let Some(fraction) = caps.name("f") {
            form.push('F');
            form.push_str(&fraction.as_str().len().to_string());
        }
        let local = match caps.name("z").map(|m| m.as_str()) {
            None => LocalOrUtc::L,
            Some("Z") => LocalOrUtc::Z,
            Some(_) => LocalOrUtc::LD,
        };
        Some((form, local))
    }
}

#[cfg(test)]
#[expect(clippy::unwrap_used, reason = "Tests use unwrap for brevity")]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn formats() -> TimeFormats {
        TimeFormats::new().unwrap()
    }

    #[test]
    fn fixed_kinds() {
        let f = formats();
        assert!(f.accepts(TimeKind::Date, "2024-02-29"));
        assert!(!f.accepts(TimeKind::Date, "2024-02"));
        assert!(f.accepts(TimeKind::TimeOfDay, "23:59:01"));
        assert!(!f.accepts(TimeKind::TimeOfDay, "23:59:01Z"));
        assert!(f.accepts(TimeKind::DateTime, "2024-02-29T23:59:01"));
        assert!(f.accepts(TimeKind::Duration, "P1Y2M3DT4H5M6.5S"));
        assert!(f.accepts(TimeKind::Duration, "P3W"));
        assert!(!f.accepts(TimeKind::Duration, "P"));
        assert!(!f.accepts(TimeKind::Duration, "P1DT"));
    }

    #[test]
    fn legacy_kinds() {
        let f = formats();
        assert!(f.accepts(TimeKind::UtcTime, "9912312359Z"));
        assert!(f.accepts(TimeKind::UtcTime, "991231235959+0100"));
        assert!(!f.accepts(TimeKind::UtcTime, "991231235959"));
        assert!(f.accepts(TimeKind::GeneralizedTime, "20240229235959.123Z"));
        assert!(f.accepts(TimeKind::GeneralizedTime, "2024022923"));
    }

    #[test]
    fn time_properties() {
        let f = formats();
        let p = f.properties("2024-W05-3").unwrap();
        assert_eq!(p.basic, BasicForm::Date);
        assert_eq!(p.date, Some(DateForm::YWD));

        let p = f.properties("12:30:00.25Z").unwrap();
        assert_eq!(p.basic, BasicForm::Time);
        assert_eq!(p.time.as_deref(), Some("HMSF2"));
        assert_eq!(p.local_or_utc, Some(LocalOrUtc::Z));

        let p = f.properties("2024-001T10+02:00").unwrap();
        assert_eq!(p.basic, BasicForm::DateTime);
        assert_eq!(p.date, Some(DateForm::YD));
        assert_eq!(p.local_or_utc, Some(LocalOrUtc::LD));

        assert_eq!(
            f.properties("2024-01-01/P1D").map(|p| p.basic),
            Some(BasicForm::Interval)
        );
        assert_eq!(
            f.properties("R5/2024-01-01/P1D").map(|p| p.basic),
            Some(BasicForm::RecInterval)
        );
        assert_eq!(
            f.properties("PT5M").map(|p| p.basic),
            Some(BasicForm::Interval)
        );
        assert!(f.properties("not a time").is_none());
    }
}
