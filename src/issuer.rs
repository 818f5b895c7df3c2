use time::OffsetDateTime;

use crate::asn1::time::truncate_to_seconds;
use crate::cert::Certificate;
use crate::cert::extensions::{BasicConstraints, KeyUsage, KeyUsages};
use crate::cert::params::DistinguishedName;
use crate::error::{Result, X509Error};
use crate::key::KeyPair;

/// What an issuer is about to sign.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IssuerPurpose {
    Certificates,
    Crls,
}

impl IssuerPurpose {
    fn key_usage(self) -> KeyUsages {
        match self {
            IssuerPurpose::Certificates => KeyUsages::KeyCertSign,
            IssuerPurpose::Crls => KeyUsages::CRLSign,
        }
    }
}

/// Represents an entity capable of issuing certificates and CRLs.
pub trait Issuer {
    /// Returns the distinguished name of the issuer.
    fn issuer_name(&self) -> &DistinguishedName;

    /// Returns the signing key of the issuer.
    fn signing_key(&self) -> Result<&KeyPair>;

    /// Checks that the issuer may sign for `purpose` and returns its key.
    fn authorize(&self, purpose: IssuerPurpose) -> Result<&KeyPair>;

    /// Checks that `[not_before, not_after]` lies within the issuer's validity.
    fn check_validity_nesting(
        &self,
        not_before: OffsetDateTime,
        not_after: OffsetDateTime,
    ) -> Result<()>;
}

impl Issuer for Certificate {
    fn issuer_name(&self) -> &DistinguishedName {
        // The name of the issuer is the subject of the certificate
        self.subject()
    }

    fn signing_key(&self) -> Result<&KeyPair> {
        self.private_key().ok_or_else(|| {
            X509Error::IssuerPreconditionFailed(
                "issuer certificate has no associated private key".to_string(),
            )
        })
    }

    fn authorize(&self, purpose: IssuerPurpose) -> Result<&KeyPair> {
        let key = self.signing_key()?;

        let is_ca = match self.typed_extension::<BasicConstraints>() {
            Some(bc) => bc.get()?.is_ca,
            None => false,
        };
        if !is_ca {
            return Err(X509Error::IssuerPreconditionFailed(
                "issuer certificate is not a certificate authority".to_string(),
            ));
        }

        if let Some(usage) = self.typed_extension::<KeyUsage>() {
            if !usage.get()?.contains(purpose.key_usage()) {
                return Err(X509Error::IssuerPreconditionFailed(format!(
                    "issuer key usage does not permit {:?}",
                    purpose.key_usage()
                )));
            }
        }

        Ok(key)
    }

    fn check_validity_nesting(
        &self,
        not_before: OffsetDateTime,
        not_after: OffsetDateTime,
    ) -> Result<()> {
        if not_before < self.not_before() {
            return Err(X509Error::invalid_argument(
                "not_before",
                format!(
                    "{not_before} is earlier than the issuer's notBefore {}",
                    self.not_before()
                ),
            ));
        }
        if truncate_to_seconds(not_after) > self.not_after() {
            return Err(X509Error::invalid_argument(
                "not_after",
                format!(
                    "{not_after} is later than the issuer's notAfter {}",
                    self.not_after()
                ),
            ));
        }
        Ok(())
    }
}
