pub mod extensions;
pub mod params;
pub mod request;

use der::Decode;
use extensions::{KnownExtension, KnownExtensionType, TypedExtension};
use params::{DistinguishedName, Extension};
use time::OffsetDateTime;
use x509_cert::spki::AlgorithmIdentifierOwned;

use crate::asn1::SignedEnvelope;
use crate::error::{Result, X509Error};
use crate::key::{KeyPair, PublicKeyInfo};
use crate::pem_utils;
use crate::tbs_certificate::TbsCertificateInner;
use crate::verify::verify_signature;

/// Represents an X.509 certificate.
///
/// A parsed, immutable view over the encoded certificate. The original DER is
/// kept and returned unchanged by [`Certificate::to_der`]. A private key can be
/// attached with [`Certificate::copy_with_private_key`], which is what lets a
/// certificate act as an issuer.
#[derive(Debug, Clone)]
pub struct Certificate {
    der: Vec<u8>,
    serial_number: Vec<u8>,
    signature_algorithm: AlgorithmIdentifierOwned,
    issuer: DistinguishedName,
    subject: DistinguishedName,
    not_before: OffsetDateTime,
    not_after: OffsetDateTime,
    public_key: PublicKeyInfo,
    extensions: Vec<Extension>,
    known_extensions: Vec<KnownExtension>,
    private_key: Option<KeyPair>,
}

impl Certificate {
    /// Parses a DER-encoded certificate.
    ///
    /// The signature is not verified; use [`Certificate::verify_signed_by`].
    pub fn from_der(der: &[u8]) -> Result<Self> {
        let envelope = SignedEnvelope::decode(der)?;
        envelope.signature_bytes()?;
        let tbs = TbsCertificateInner::from_der(envelope.tbs)?;
        if tbs.signature != envelope.algorithm {
            return Err(X509Error::InvalidEncoding(
                "inner and outer signature algorithms differ".to_string(),
            ));
        }

        let extensions: Vec<Extension> = tbs
            .extensions
            .unwrap_or_default()
            .iter()
            .map(Extension::from_x509)
            .collect();
        let known_extensions = extensions.iter().cloned().map(KnownExtension::new).collect();

        Ok(Self {
            der: der.to_vec(),
            serial_number: tbs.serial_number.0,
            signature_algorithm: envelope.algorithm,
            issuer: DistinguishedName::from_x509_name(&tbs.issuer)?,
            subject: DistinguishedName::from_x509_name(&tbs.subject)?,
            not_before: tbs.validity.not_before.to_offset_date_time(),
            not_after: tbs.validity.not_after.to_offset_date_time(),
            public_key: PublicKeyInfo::from_spki(&tbs.subject_public_key_info)?,
            extensions,
            known_extensions,
            private_key: None,
        })
    }

    /// Parses the first `CERTIFICATE` block of a PEM document.
    pub fn from_pem(pem: &str) -> Result<Self> {
        Self::from_der(&pem_utils::pem_to_der(pem, pem_utils::CERTIFICATE_LABEL)?)
    }

    /// Encodes the certificate into DER format.
    pub fn to_der(&self) -> &[u8] {
        &self.der
    }

    /// Encodes the certificate into PEM format.
    pub fn to_pem(&self) -> String {
        pem_utils::der_to_pem(&self.der, pem_utils::CERTIFICATE_LABEL)
    }

    pub fn serial_number(&self) -> &[u8] {
        &self.serial_number
    }

    pub fn signature_algorithm(&self) -> &AlgorithmIdentifierOwned {
        &self.signature_algorithm
    }

    pub fn issuer(&self) -> &DistinguishedName {
        &self.issuer
    }

    pub fn subject(&self) -> &DistinguishedName {
        &self.subject
    }

    pub fn not_before(&self) -> OffsetDateTime {
        self.not_before
    }

    pub fn not_after(&self) -> OffsetDateTime {
        self.not_after
    }

    pub fn public_key_info(&self) -> &PublicKeyInfo {
        &self.public_key
    }

    pub fn extensions(&self) -> &[Extension] {
        &self.extensions
    }

    pub fn known_extensions(&self) -> &[KnownExtension] {
        &self.known_extensions
    }

    /// The cached typed view of the extension of type `E`, if the
    /// certificate carries it.
    pub fn typed_extension<E: KnownExtensionType>(&self) -> Option<&TypedExtension<E>> {
        self.known_extensions.iter().find_map(E::typed)
    }

    /// Decodes the extension of type `E`, if the certificate carries it.
    pub fn find_extension<E: KnownExtensionType + Clone>(&self) -> Result<Option<E>> {
        self.typed_extension::<E>()
            .map(|typed| typed.get().cloned())
            .transpose()
    }

    pub fn has_private_key(&self) -> bool {
        self.private_key.is_some()
    }

    pub fn private_key(&self) -> Option<&KeyPair> {
        self.private_key.as_ref()
    }

    /// Returns a copy of this certificate holding `key`.
    ///
    /// Fails when the key's public half is not the certificate's public key.
    pub fn copy_with_private_key(&self, key: KeyPair) -> Result<Self> {
        if key.public_key_info()? != self.public_key {
            return Err(X509Error::invalid_argument(
                "private_key",
                "the key does not match the certificate's public key",
            ));
        }
        Ok(Self {
            private_key: Some(key),
            ..self.clone()
        })
    }

    /// Verifies the certificate's signature with `issuer_key`.
    pub fn verify_signed_by(&self, issuer_key: &PublicKeyInfo) -> Result<()> {
        let envelope = SignedEnvelope::decode(&self.der)?;
        verify_signature(
            issuer_key,
            &envelope.algorithm,
            envelope.tbs,
            envelope.signature_bytes()?,
        )
    }

    pub fn is_self_issued(&self) -> bool {
        self.issuer == self.subject
    }
}

impl PartialEq for Certificate {
    fn eq(&self, other: &Self) -> bool {
        self.der == other.der
    }
}

impl Eq for Certificate {}
