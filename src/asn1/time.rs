use der::asn1::AnyRef;
use der::{Choice, Decode, EncodeValue, Length, Reader, Tag, Tagged, Writer};
use time::{Date, Month, OffsetDateTime, PrimitiveDateTime, Time, UtcOffset};

/// An X.509 `Time` value.
///
/// Encodes as `UTCTime` for years 1950 through 2049 and as `GeneralizedTime`
/// otherwise (RFC 5280 section 4.1.2.5). Values are held in UTC with
/// sub-second precision removed.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord)]
pub struct X509Time(OffsetDateTime);

impl X509Time {
    pub fn new(value: OffsetDateTime) -> Self {
        X509Time(truncate_to_seconds(value))
    }

    pub fn to_offset_date_time(self) -> OffsetDateTime {
        self.0
    }

    fn uses_utc_time(&self) -> bool {
        (1950..2050).contains(&self.0.year())
    }

    fn text(&self) -> der::Result<String> {
        let t = self.0;
        if self.uses_utc_time() {
            Ok(format!(
                "{:02}{:02}{:02}{:02}{:02}{:02}Z",
                t.year() % 100,
                u8::from(t.month()),
                t.day(),
                t.hour(),
                t.minute(),
                t.second()
            ))
        } else if (0..=9999).contains(&t.year()) {
            Ok(format!(
                "{:04}{:02}{:02}{:02}{:02}{:02}Z",
                t.year(),
                u8::from(t.month()),
                t.day(),
                t.hour(),
                t.minute(),
                t.second()
            ))
        } else {
            Err(Tag::GeneralizedTime.value_error())
        }
    }

    fn parse(tag: Tag, text: &[u8]) -> der::Result<Self> {
        let (year, rest) = match (tag, text.len()) {
            (Tag::UtcTime, 13) => {
                let yy = i32::from(two_digits(tag, &text[0..2])?);
                (if yy >= 50 { 1900 + yy } else { 2000 + yy }, &text[2..])
            }
            (Tag::GeneralizedTime, 15) => {
                let hi = i32::from(two_digits(tag, &text[0..2])?);
                let lo = i32::from(two_digits(tag, &text[2..4])?);
                (hi * 100 + lo, &text[4..])
            }
            _ => return Err(tag.length_error()),
        };

        if rest[10] != b'Z' {
            return Err(tag.value_error());
        }

        let month = Month::try_from(two_digits(tag, &rest[0..2])?).map_err(|_| tag.value_error())?;
        let day = two_digits(tag, &rest[2..4])?;
        let date = Date::from_calendar_date(year, month, day).map_err(|_| tag.value_error())?;
        let time = Time::from_hms(
            two_digits(tag, &rest[4..6])?,
            two_digits(tag, &rest[6..8])?,
            two_digits(tag, &rest[8..10])?,
        )
        .map_err(|_| tag.value_error())?;

        Ok(X509Time(PrimitiveDateTime::new(date, time).assume_utc()))
    }
}

impl From<OffsetDateTime> for X509Time {
    fn from(value: OffsetDateTime) -> Self {
        X509Time::new(value)
    }
}

impl From<X509Time> for OffsetDateTime {
    fn from(value: X509Time) -> Self {
        value.0
    }
}

/// Converts to UTC and drops the sub-second part.
pub fn truncate_to_seconds(value: OffsetDateTime) -> OffsetDateTime {
    let utc = value.to_offset(UtcOffset::UTC);
    utc.replace_nanosecond(0).unwrap_or(utc)
}

fn two_digits(tag: Tag, digits: &[u8]) -> der::Result<u8> {
    match digits {
        [hi @ b'0'..=b'9', lo @ b'0'..=b'9'] => Ok((hi - b'0') * 10 + (lo - b'0')),
        _ => Err(tag.value_error()),
    }
}

impl Tagged for X509Time {
    fn tag(&self) -> Tag {
        if self.uses_utc_time() {
            Tag::UtcTime
        } else {
            Tag::GeneralizedTime
        }
    }
}

impl EncodeValue for X509Time {
    fn value_len(&self) -> der::Result<Length> {
        Length::try_from(self.text()?.len())
    }

    fn encode_value(&self, writer: &mut impl Writer) -> der::Result<()> {
        writer.write(self.text()?.as_bytes())
    }
}

impl<'a> Decode<'a> for X509Time {
    fn decode<R: Reader<'a>>(reader: &mut R) -> der::Result<Self> {
        let any = AnyRef::decode(reader)?;
        match any.tag() {
            tag @ (Tag::UtcTime | Tag::GeneralizedTime) => Self::parse(tag, any.value()),
            other => Err(other.unexpected_error(Some(Tag::UtcTime))),
        }
    }
}

impl<'a> Choice<'a> for X509Time {
    fn can_decode(tag: Tag) -> bool {
        matches!(tag, Tag::UtcTime | Tag::GeneralizedTime)
    }
}
