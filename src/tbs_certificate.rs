use der::asn1::BitString;
use der::{Decode, Encode, Sequence};
use time::OffsetDateTime;
use x509_cert::Version;
use x509_cert::name::Name;
use x509_cert::spki::{AlgorithmIdentifierOwned, SubjectPublicKeyInfoOwned};

use crate::asn1::{RawSerial, X509Time};
use crate::cert::params::{DistinguishedName, Extension, encode_extensions};
use crate::error::{Result, X509Error};
use crate::key::PublicKeyInfo;

/// `Validity ::= SEQUENCE { notBefore Time, notAfter Time }`
#[derive(Clone, Debug, PartialEq, Eq, Sequence)]
pub(crate) struct ValidityInner {
    pub not_before: X509Time,
    pub not_after: X509Time,
}

/// The wire form of `TBSCertificate` (RFC 5280 section 4.1).
///
/// Times use [`X509Time`] rather than `x509_cert::time::Time` so dates before
/// 1970 survive a round trip.
#[derive(Clone, Debug, PartialEq, Eq, Sequence)]
pub(crate) struct TbsCertificateInner {
    #[asn1(context_specific = "0", default = "Default::default")]
    pub version: Version,
    pub serial_number: RawSerial,
    pub signature: AlgorithmIdentifierOwned,
    pub issuer: Name,
    pub validity: ValidityInner,
    pub subject: Name,
    pub subject_public_key_info: SubjectPublicKeyInfoOwned,
    #[asn1(context_specific = "1", tag_mode = "IMPLICIT", optional = "true")]
    pub issuer_unique_id: Option<BitString>,
    #[asn1(context_specific = "2", tag_mode = "IMPLICIT", optional = "true")]
    pub subject_unique_id: Option<BitString>,
    #[asn1(context_specific = "3", tag_mode = "EXPLICIT", optional = "true")]
    pub extensions: Option<Vec<x509_cert::ext::Extension>>,
}

/// Represents the "To Be Signed" (TBS) portion of an X.509 certificate.
/// This struct contains all the fields required to generate a valid X.509 certificate.
///
/// # Fields
/// * `serial_number` - Minimal two's-complement serial number content.
/// * `signature_algorithm` - DER of the signature `AlgorithmIdentifier` from the signer.
/// * `issuer` - The distinguished name of the certificate issuer.
/// * `not_before` - The start of the certificate's validity period.
/// * `not_after` - The end of the certificate's validity period.
/// * `subject` - The distinguished name of the certificate subject.
/// * `subject_public_key` - The public key of the certificate subject.
/// * `extensions` - Additional X.509 extensions for the certificate.
pub struct TbsCertificate<'a> {
    pub serial_number: &'a [u8],
    pub signature_algorithm: &'a [u8],
    pub issuer: &'a DistinguishedName,
    pub not_before: OffsetDateTime,
    pub not_after: OffsetDateTime,
    pub subject: &'a DistinguishedName,
    pub subject_public_key: &'a PublicKeyInfo,
    pub extensions: &'a [Extension],
}

impl TbsCertificate<'_> {
    /// Encodes a version 3 `TBSCertificate`; the extensions field is left out
    /// when there are none.
    pub fn to_der(&self) -> Result<Vec<u8>> {
        let extensions = encode_extensions(self.extensions)?;
        let inner = TbsCertificateInner {
            version: Version::V3,
            serial_number: RawSerial(self.serial_number.to_vec()),
            signature: AlgorithmIdentifierOwned::from_der(self.signature_algorithm)?,
            issuer: self.issuer.as_x509_name()?,
            validity: ValidityInner {
                not_before: X509Time::new(self.not_before),
                not_after: X509Time::new(self.not_after),
            },
            subject: self.subject.as_x509_name()?,
            subject_public_key_info: self.subject_public_key.to_spki()?,
            issuer_unique_id: None,
            subject_unique_id: None,
            extensions: (!extensions.is_empty()).then_some(extensions),
        };

        inner.to_der().map_err(X509Error::encoding)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::key::KeyPair;
    use crate::signer::{HashAlgorithm, RsaPadding, SignatureGenerator};
    use time::macros::datetime;

    #[test]
    fn test_tbs_certificate_encoding_round_trip() {
        let key = KeyPair::generate_ecdsa_p256();
        let public_key = key.public_key_info().unwrap();
        let name = DistinguishedName::parse("CN=tbs.example").unwrap();
        let algorithm = key
            .signature_generator(RsaPadding::default())
            .signature_algorithm_identifier(HashAlgorithm::Sha256)
            .unwrap();

        let tbs = TbsCertificate {
            serial_number: &[0x01, 0x02],
            signature_algorithm: &algorithm,
            issuer: &name,
            not_before: datetime!(1960-01-01 00:00:00 UTC),
            not_after: datetime!(2060-01-01 00:00:00 UTC),
            subject: &name,
            subject_public_key: &public_key,
            extensions: &[],
        };
        let der = tbs.to_der().unwrap();
        let inner = TbsCertificateInner::from_der(&der).unwrap();

        assert_eq!(inner.version, Version::V3);
        assert_eq!(inner.serial_number, RawSerial(vec![0x01, 0x02]));
        assert_eq!(
            inner.validity.not_before.to_offset_date_time(),
            datetime!(1960-01-01 00:00:00 UTC)
        );
        assert_eq!(
            inner.validity.not_after.to_offset_date_time(),
            datetime!(2060-01-01 00:00:00 UTC)
        );
        assert!(inner.extensions.is_none());
        assert_eq!(
            PublicKeyInfo::from_spki(&inner.subject_public_key_info).unwrap(),
            public_key
        );
    }
}
