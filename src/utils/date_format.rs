use serde::{self, Deserialize, Deserializer, Serializer};
use time::{Date, OffsetDateTime, PrimitiveDateTime, format_description::well_known::Rfc3339, macros::format_description};

// Xero XML writes dates as local midnight timestamps ("2015-06-10T00:00:00") and accepts
// plain ISO dates on input.
pub fn parse_xero_date(date_str: &str) -> Result<Date, String> {
    let format = format_description!("[year]-[month]-[day]");
    let date_part = date_str.split('T').next().unwrap_or(date_str);
    Date::parse(date_part.trim(), &format).map_err(|e| format!("Failed to parse date '{date_str}': {e}"))
}

// Envelope timestamps carry up to seven fractional digits, with or without a zone.
pub fn parse_xero_datetime(datetime_str: &str) -> Result<OffsetDateTime, String> {
    if let Ok(dt) = OffsetDateTime::parse(datetime_str, &Rfc3339) {
        return Ok(dt);
    }

    // No timezone means UTC, e.g. "2015-06-10T05:22:32.5137373"
    if datetime_str.contains('.') {
        let format = format_description!("[year]-[month]-[day]T[hour]:[minute]:[second].[subsecond]");
        if let Ok(dt) = PrimitiveDateTime::parse(datetime_str, &format) {
            return Ok(dt.assume_utc());
        }
    }

    let format = format_description!("[year]-[month]-[day]T[hour]:[minute]:[second]");
    PrimitiveDateTime::parse(datetime_str, &format)
        .map(PrimitiveDateTime::assume_utc)
        .map_err(|e| format!("Failed to parse datetime '{datetime_str}': {e}"))
}

// Optional date serialization module
pub mod xero_date_format_option {
    use super::{Date, Deserialize, Deserializer, Serializer, format_description, serde};

    #[allow(clippy::ref_option)]
    pub fn serialize<S>(date: &Option<Date>, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        match date {
            Some(date) => {
                let formatted = date
                    .format(&format_description!("[year]-[month]-[day]"))
                    .map_err(serde::ser::Error::custom)?;
                serializer.serialize_str(&formatted)
            }
            None => serializer.serialize_none(),
        }
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Option<Date>, D::Error>
    where
        D: Deserializer<'de>,
    {
        match Option::<String>::deserialize(deserializer)? {
            Some(s) if !s.trim().is_empty() => super::parse_xero_date(&s)
                .map(Some)
                .map_err(serde::de::Error::custom),
            _ => Ok(None),
        }
    }
}

// Optional OffsetDateTime serialization
pub mod xero_datetime_format_option {
    use super::{Deserialize, Deserializer, OffsetDateTime, Rfc3339, Serializer, serde};

    #[allow(clippy::ref_option)]
    pub fn serialize<S>(datetime: &Option<OffsetDateTime>, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        match datetime {
            Some(dt) => {
                let formatted = dt.format(&Rfc3339).map_err(serde::ser::Error::custom)?;
                serializer.serialize_str(&formatted)
            }
            None => serializer.serialize_none(),
        }
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Option<OffsetDateTime>, D::Error>
    where
        D: Deserializer<'de>,
    {
        match Option::<String>::deserialize(deserializer)? {
            Some(s) if !s.trim().is_empty() => super::parse_xero_datetime(s.trim())
                .map(Some)
                .map_err(serde::de::Error::custom),
            _ => Ok(None),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use time::macros::{date, datetime};

    #[test]
    fn parses_dates_with_and_without_time() {
        assert_eq!(parse_xero_date("2015-06-10T00:00:00").unwrap(), date!(2015 - 06 - 10));
        assert_eq!(parse_xero_date("2015-06-10").unwrap(), date!(2015 - 06 - 10));
        assert!(parse_xero_date("10/06/2015").is_err());
    }

    #[test]
    fn parses_envelope_timestamps() {
        assert_eq!(
            parse_xero_datetime("2015-06-10T05:22:32Z").unwrap(),
            datetime!(2015-06-10 05:22:32 UTC)
        );
        assert_eq!(
            parse_xero_datetime("2015-06-10T05:22:32").unwrap(),
            datetime!(2015-06-10 05:22:32 UTC)
        );
        let fractional = parse_xero_datetime("2015-06-10T05:22:32.5137373").unwrap();
        assert_eq!(fractional.date(), date!(2015 - 06 - 10));
        assert_eq!(fractional.second(), 32);
    }
}
