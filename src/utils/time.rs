use serde::{Deserialize, Deserializer, Serializer};
use time::OffsetDateTime;
use time::PrimitiveDateTime;
use time::format_description::BorrowedFormatItem;
use time::format_description::well_known::Rfc3339;
use time::macros::format_description;

// The server stores naive UTC datetimes and serializes them without an
// offset, with or without fractional seconds.
const NAIVE: &[BorrowedFormatItem<'static>] =
    format_description!("[year]-[month]-[day]T[hour]:[minute]:[second]");
const NAIVE_SUBSEC: &[BorrowedFormatItem<'static>] =
    format_description!("[year]-[month]-[day]T[hour]:[minute]:[second].[subsecond]");

/// Parse a server timestamp: RFC 3339, or a naive datetime taken as UTC.
pub fn parse_timestamp(s: &str) -> Option<OffsetDateTime> {
    if let Ok(parsed) = OffsetDateTime::parse(s, &Rfc3339) {
        return Some(parsed);
    }
    PrimitiveDateTime::parse(s, NAIVE_SUBSEC)
        .or_else(|_| PrimitiveDateTime::parse(s, NAIVE))
        .ok()
        .map(PrimitiveDateTime::assume_utc)
}

/// Deserialize an optional server timestamp.  Timestamps are display-only,
/// so a value that parses as none of the accepted shapes becomes `None`
/// rather than failing the containing response.
pub fn deserialize<'de, D>(deserializer: D) -> Result<Option<OffsetDateTime>, D::Error>
where
    D: Deserializer<'de>,
{
    let s = Option::<String>::deserialize(deserializer)?;
    Ok(s.as_deref().and_then(parse_timestamp))
}

/// Serialize an optional timestamp as an RFC 3339 formatted string.
pub fn serialize<S>(datetime: &Option<OffsetDateTime>, serializer: S) -> Result<S::Ok, S::Error>
where
    S: Serializer,
{
    match datetime {
        Some(datetime) => {
            let s = datetime.format(&Rfc3339).map_err(serde::ser::Error::custom)?;
            serializer.serialize_str(&s)
        }
        None => serializer.serialize_none(),
    }
}

/////////////////////////////////////////////// tests //////////////////////////////////////////////
