use std::borrow::Cow;

use der::{DecodeValue, EncodeValue, FixedTag, Header, Length, Reader, Tag, Writer};

use crate::error::{Result, X509Error};

/// Rejects serial numbers that are empty or carry a redundant leading byte.
///
/// `{0x00, b}` with `b < 0x80` and `{0xFF, b}` with `b >= 0x80` are not
/// minimal two's-complement encodings.
pub fn validate_serial(serial: &[u8]) -> Result<()> {
    match serial {
        [] => Err(X509Error::invalid_argument(
            "serial_number",
            "serial number must not be empty",
        )),
        [0x00, next, ..] if *next < 0x80 => Err(X509Error::invalid_argument(
            "serial_number",
            "serial number has a redundant leading 0x00 byte",
        )),
        [0xFF, next, ..] if *next >= 0x80 => Err(X509Error::invalid_argument(
            "serial_number",
            "serial number has a redundant leading 0xFF byte",
        )),
        _ => Ok(()),
    }
}

/// Produces the minimal DER INTEGER content for a big-endian serial number,
/// always interpreted as non-negative.
///
/// A `0x00` is prepended when the top bit of the first byte is set; redundant
/// leading zeros are stripped otherwise. Only the prepend case allocates.
pub fn canonicalize_serial(serial: &[u8]) -> Cow<'_, [u8]> {
    match serial.first() {
        None => Cow::Owned(vec![0x00]),
        Some(first) if first & 0x80 != 0 => {
            let mut prefixed = Vec::with_capacity(serial.len() + 1);
            prefixed.push(0x00);
            prefixed.extend_from_slice(serial);
            Cow::Owned(prefixed)
        }
        Some(_) => {
            let mut start = 0;
            while start + 1 < serial.len()
                && serial[start] == 0x00
                && serial[start + 1] & 0x80 == 0
            {
                start += 1;
            }
            Cow::Borrowed(&serial[start..])
        }
    }
}

/// Content octets of a DER `INTEGER` serial number, kept verbatim.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub(crate) struct RawSerial(pub Vec<u8>);

impl FixedTag for RawSerial {
    const TAG: Tag = Tag::Integer;
}

impl EncodeValue for RawSerial {
    fn value_len(&self) -> der::Result<Length> {
        Length::try_from(self.0.len())
    }

    fn encode_value(&self, writer: &mut impl Writer) -> der::Result<()> {
        writer.write(&self.0)
    }
}

impl<'a> DecodeValue<'a> for RawSerial {
    fn decode_value<R: Reader<'a>>(reader: &mut R, header: Header) -> der::Result<Self> {
        let bytes = reader.read_vec(header.length)?;
        if validate_serial(&bytes).is_err() {
            return Err(Tag::Integer.non_canonical_error());
        }
        Ok(RawSerial(bytes))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn unsigned_value(bytes: &[u8]) -> u128 {
        bytes.iter().fold(0u128, |acc, b| (acc << 8) | u128::from(*b))
    }

    #[test]
    fn test_prepends_zero_when_sign_bit_set() {
        assert_eq!(canonicalize_serial(&[0x80]).as_ref(), &[0x00, 0x80]);
        assert_eq!(
            canonicalize_serial(&[0xFF, 0x80]).as_ref(),
            &[0x00, 0xFF, 0x80]
        );
    }

    #[test]
    fn test_strips_redundant_zeros() {
        assert_eq!(canonicalize_serial(&[0x00, 0x00, 0x01]).as_ref(), &[0x01]);
        assert_eq!(canonicalize_serial(&[0x00, 0x00, 0x80]).as_ref(), &[0x00, 0x80]);
        assert_eq!(canonicalize_serial(&[0x00]).as_ref(), &[0x00]);
        assert_eq!(canonicalize_serial(&[0x00, 0x00]).as_ref(), &[0x00]);
    }

    #[test]
    fn test_minimal_input_is_borrowed() {
        let serial = [0x01, 0x02, 0x03];
        assert!(matches!(canonicalize_serial(&serial), Cow::Borrowed(_)));
    }

    #[test]
    fn test_minimality_and_value_preserved() {
        let samples: &[&[u8]] = &[
            &[0x00],
            &[0x7F],
            &[0x80],
            &[0x00, 0x00, 0x00, 0x7F],
            &[0x00, 0x00, 0xFF],
            &[0xFF, 0xFF],
            &[0x01, 0x00, 0x00],
            &[0x00, 0x12, 0x34, 0x56, 0x78, 0x9A, 0xBC, 0xDE],
        ];
        for sample in samples {
            let out = canonicalize_serial(sample);
            assert_eq!(unsigned_value(&out), unsigned_value(sample));
            assert_eq!(out[0] & 0x80, 0, "output must be non-negative");
            if out.len() > 1 {
                assert!(
                    !(out[0] == 0x00 && out[1] < 0x80),
                    "redundant leading zero in {out:02X?}"
                );
            }
        }
    }

    #[test]
    fn test_validate_serial() {
        assert!(validate_serial(&[0x01]).is_ok());
        assert!(validate_serial(&[0x00, 0x80]).is_ok());
        assert!(validate_serial(&[0xFF, 0x7F]).is_ok());
        assert!(validate_serial(&[0x80]).is_ok());

        for bad in [&[][..], &[0x00, 0x01], &[0xFF, 0x80]] {
            match validate_serial(bad) {
                Err(X509Error::InvalidArgument { param, .. }) => assert_eq!(param, "serial_number"),
                other => panic!("unexpected result {other:?}"),
            }
        }
    }
}
