use der::{Decode, Encode, Sequence};
use time::OffsetDateTime;

use crate::asn1::time::truncate_to_seconds;
use crate::asn1::{RawSerial, X509Time};
use crate::cert::extensions::{CrlReason, RevocationReason, ToAndFromX509Extension};
use crate::cert::params::Extension;
use crate::error::{Result, X509Error};

/// `revokedCertificates` element of a `TBSCertList` (RFC 5280 section 5.1).
#[derive(Clone, Debug, PartialEq, Eq, Sequence)]
pub(crate) struct RevokedCertificateInner {
    pub serial_number: RawSerial,
    pub revocation_date: X509Time,
    pub crl_entry_extensions: Option<Vec<x509_cert::ext::Extension>>,
}

/// One revoked certificate held by a
/// [`CertificateRevocationListBuilder`](super::CertificateRevocationListBuilder).
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RevokedCertificateEntry {
    serial_number: Vec<u8>,
    revocation_time: OffsetDateTime,
    /// DER `SEQUENCE OF Extension`.
    extensions: Option<Vec<u8>>,
}

impl RevokedCertificateEntry {
    pub(crate) fn new(
        serial_number: &[u8],
        revocation_time: OffsetDateTime,
        reason: Option<RevocationReason>,
    ) -> Result<Self> {
        let extensions = match reason {
            None => None,
            Some(RevocationReason::RemoveFromCrl) => {
                return Err(X509Error::invalid_argument(
                    "reason",
                    "removeFromCRL is only meaningful in delta CRLs",
                ));
            }
            Some(reason) => {
                let ext = Extension::from_extension(&CrlReason(reason), false)?.to_x509()?;
                Some(vec![ext].to_der().map_err(X509Error::encoding)?)
            }
        };

        Ok(Self {
            serial_number: serial_number.to_vec(),
            revocation_time: truncate_to_seconds(revocation_time),
            extensions,
        })
    }

    pub(crate) fn from_inner(inner: RevokedCertificateInner) -> Result<Self> {
        let extensions = inner
            .crl_entry_extensions
            .map(|exts| exts.to_der())
            .transpose()?;
        Ok(Self {
            serial_number: inner.serial_number.0,
            revocation_time: inner.revocation_date.to_offset_date_time(),
            extensions,
        })
    }

    pub(crate) fn to_inner(&self) -> Result<RevokedCertificateInner> {
        let crl_entry_extensions = self
            .extensions
            .as_deref()
            .map(Vec::<x509_cert::ext::Extension>::from_der)
            .transpose()?;
        Ok(RevokedCertificateInner {
            serial_number: RawSerial(self.serial_number.clone()),
            revocation_date: X509Time::new(self.revocation_time),
            crl_entry_extensions,
        })
    }

    pub fn serial_number(&self) -> &[u8] {
        &self.serial_number
    }

    pub fn revocation_time(&self) -> OffsetDateTime {
        self.revocation_time
    }

    /// Raw DER of the entry's extensions, if it has any.
    pub fn raw_extensions(&self) -> Option<&[u8]> {
        self.extensions.as_deref()
    }

    pub fn extensions(&self) -> Result<Vec<Extension>> {
        let Some(raw) = self.extensions.as_deref() else {
            return Ok(Vec::new());
        };
        Ok(Vec::<x509_cert::ext::Extension>::from_der(raw)?
            .iter()
            .map(Extension::from_x509)
            .collect())
    }

    /// The reason code, when the entry carries one.
    pub fn reason(&self) -> Result<Option<RevocationReason>> {
        self.extensions()?
            .iter()
            .find(|ext| ext.oid == CrlReason::OID)
            .map(|ext| ext.to_extension::<CrlReason>().map(|reason| reason.0))
            .transpose()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use time::macros::datetime;

    #[test]
    fn test_entry_truncates_revocation_time() {
        let entry = RevokedCertificateEntry::new(
            &[0x01],
            datetime!(2024-05-01 10:20:30.999 UTC),
            None,
        )
        .unwrap();
        assert_eq!(entry.revocation_time(), datetime!(2024-05-01 10:20:30 UTC));
        assert!(entry.raw_extensions().is_none());
        assert_eq!(entry.reason().unwrap(), None);
    }

    #[test]
    fn test_entry_with_reason() {
        let entry = RevokedCertificateEntry::new(
            &[0x42],
            datetime!(2024-05-01 00:00:00 UTC),
            Some(RevocationReason::Superseded),
        )
        .unwrap();
        assert_eq!(entry.reason().unwrap(), Some(RevocationReason::Superseded));

        let inner = entry.to_inner().unwrap();
        assert_eq!(RevokedCertificateEntry::from_inner(inner).unwrap(), entry);
    }

    #[test]
    fn test_remove_from_crl_is_rejected() {
        assert!(matches!(
            RevokedCertificateEntry::new(
                &[0x01],
                datetime!(2024-05-01 00:00:00 UTC),
                Some(RevocationReason::RemoveFromCrl),
            ),
            Err(X509Error::InvalidArgument { param: "reason", .. })
        ));
    }
}
