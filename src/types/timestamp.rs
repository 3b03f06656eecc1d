//! Record timestamps as they appear in the data files.
//!
//! Files keep the offset they were written with, so values are held as
//! `DateTime<FixedOffset>` and written back as RFC 3339 with `Z` for a zero
//! offset and the fractional second trimmed of trailing zeros. A file loaded
//! and saved again keeps its timestamp text.

use chrono::{DateTime, FixedOffset, SecondsFormat, Utc};

pub type Timestamp = DateTime<FixedOffset>;

/// Current time, UTC offset.
pub fn now() -> Timestamp {
    Utc::now().fixed_offset()
}

/// Formats `ts` as RFC 3339 with the shortest exact fractional second.
pub fn format_rfc3339(ts: &Timestamp) -> String {
    let full = ts.to_rfc3339_opts(SecondsFormat::Nanos, true);
    let Some(dot) = full.find('.') else {
        return full;
    };
    let offset_start = dot + 1 + 9;
    let fraction = full[dot + 1..offset_start].trim_end_matches('0');
    let mut out = String::with_capacity(full.len());
    out.push_str(&full[..dot]);
    if !fraction.is_empty() {
        out.push('.');
        out.push_str(fraction);
    }
    out.push_str(&full[offset_start..]);
    out
}

/// `#[serde(with = "rfc3339")]` for a required timestamp.
pub mod rfc3339 {
    use serde::{Deserialize, Deserializer, Serializer};

    use super::{format_rfc3339, Timestamp};

    pub fn serialize<S: Serializer>(ts: &Timestamp, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&format_rfc3339(ts))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Timestamp, D::Error> {
        let raw = String::deserialize(deserializer)?;
        Timestamp::parse_from_rfc3339(&raw).map_err(serde::de::Error::custom)
    }
}

/// `#[serde(with = "rfc3339_opt")]` for an optional timestamp.
pub mod rfc3339_opt {
    use serde::{Deserialize, Deserializer, Serializer};

    use super::{format_rfc3339, Timestamp};

    pub fn serialize<S: Serializer>(ts: &Option<Timestamp>, serializer: S) -> Result<S::Ok, S::Error> {
        match ts {
            Some(ts) => serializer.serialize_str(&format_rfc3339(ts)),
            None => serializer.serialize_none(),
        }
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<Timestamp>, D::Error> {
        Option::<String>::deserialize(deserializer)?
            .map(|raw| Timestamp::parse_from_rfc3339(&raw).map_err(serde::de::Error::custom))
            .transpose()
    }
}
