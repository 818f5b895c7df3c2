//! PKCS#10 certificate signing requests and certificate issuance.

use std::collections::HashSet;

use bon::Builder;
use der::asn1::{Any, SetOfVec};
use der::{Decode, Encode, Sequence};
use time::OffsetDateTime;
use x509_cert::attr::{Attribute, Attributes};
use x509_cert::name::Name;
use x509_cert::spki::SubjectPublicKeyInfoOwned;

use super::Certificate;
use super::extensions::KnownExtension;
use super::params::{DistinguishedName, Extension, RequestAttribute, encode_extensions};
use crate::asn1::{SignedEnvelope, canonicalize_serial, validate_der, validate_serial};
use crate::error::{Result, X509Error};
use crate::issuer::{Issuer, IssuerPurpose};
use crate::key::{KeyPair, PublicKeyInfo};
use crate::oids;
use crate::pem_utils;
use crate::signer::{
    HashAlgorithm, RsaPadding, SignatureGenerator, checked_algorithm_identifier, sign_and_wrap,
};
use crate::tbs_certificate::TbsCertificate;
use crate::verify::verify_signature;

/// `CertificationRequestInfo` (RFC 2986 section 4.1).
#[derive(Clone, Debug, Sequence)]
struct CertReqInfoInner {
    version: i64,
    subject: Name,
    subject_public_key_info: SubjectPublicKeyInfoOwned,
    #[asn1(context_specific = "0", tag_mode = "IMPLICIT")]
    attributes: Attributes,
}

/// Options for [`CertificateRequest::load_signing_request`].
#[derive(Clone, Copy, Debug, Default, Builder)]
pub struct RequestLoadOptions {
    /// Accept the request without checking its self-signature.
    #[builder(default)]
    pub skip_signature_validation: bool,
    /// Expose every requested extension as a [`KnownExtension`].
    ///
    /// The extension contents come from whoever produced the request, so the
    /// typed views decode untrusted input when they are read.
    #[builder(default)]
    pub unsafe_load_certificate_extensions: bool,
}

/// A certificate request: the subject, public key and extensions that a
/// PKCS#10 request carries, plus the parameters used when a certificate is
/// issued from it.
///
/// # Example
/// ```rust,no_run
/// use x509forge::cert::params::DistinguishedName;
/// use x509forge::cert::request::CertificateRequest;
/// use x509forge::key::KeyPair;
/// use x509forge::signer::RsaPadding;
///
/// # fn main() -> Result<(), x509forge::error::X509Error> {
/// let key = KeyPair::generate_ecdsa_p256();
/// let request = CertificateRequest::builder()
///     .subject(DistinguishedName::builder().add_common_name("example.com").build()?)
///     .public_key(key.public_key_info()?)
///     .build();
/// let csr_pem = request.create_signing_request_pem(&key.signature_generator(RsaPadding::default()))?;
/// # Ok(())
/// # }
/// ```
#[derive(Clone, Debug, Builder)]
pub struct CertificateRequest {
    subject: DistinguishedName,
    public_key: PublicKeyInfo,
    #[builder(default)]
    hash_algorithm: HashAlgorithm,
    /// Required when an RSA key signs a certificate issued from this request.
    rsa_padding: Option<RsaPadding>,
    #[builder(default)]
    certificate_extensions: Vec<Extension>,
    #[builder(default)]
    other_request_attributes: Vec<RequestAttribute>,
    #[builder(skip)]
    known_extensions: Option<Vec<KnownExtension>>,
}

impl CertificateRequest {
    pub fn subject(&self) -> &DistinguishedName {
        &self.subject
    }

    pub fn public_key(&self) -> &PublicKeyInfo {
        &self.public_key
    }

    pub fn hash_algorithm(&self) -> HashAlgorithm {
        self.hash_algorithm
    }

    pub fn rsa_padding(&self) -> Option<RsaPadding> {
        self.rsa_padding
    }

    pub fn certificate_extensions(&self) -> &[Extension] {
        &self.certificate_extensions
    }

    pub fn other_request_attributes(&self) -> &[RequestAttribute] {
        &self.other_request_attributes
    }

    /// Typed views of the loaded extensions, present only when the request was
    /// loaded with `unsafe_load_certificate_extensions`.
    pub fn known_extensions(&self) -> Option<&[KnownExtension]> {
        self.known_extensions.as_deref()
    }

    fn encode_attributes(&self) -> Result<Attributes> {
        let mut attributes = Vec::with_capacity(self.other_request_attributes.len() + 1);
        let mut seen = HashSet::new();
        for attribute in &self.other_request_attributes {
            if attribute.oid == oids::EXTENSION_REQUEST {
                return Err(X509Error::invalid_argument(
                    "other_request_attributes",
                    "the extension request attribute is built from certificate_extensions",
                ));
            }
            if !seen.insert(attribute) {
                return Err(X509Error::DuplicateAttribute(oids::describe(&attribute.oid)));
            }
            validate_der(&attribute.value).map_err(|e| {
                X509Error::invalid_argument("other_request_attributes", e.to_string())
            })?;
            let value = Any::from_der(&attribute.value)?;
            attributes.push(Attribute {
                oid: attribute.oid,
                values: SetOfVec::try_from(vec![value]).map_err(X509Error::encoding)?,
            });
        }

        if !self.certificate_extensions.is_empty() {
            let extensions = encode_extensions(&self.certificate_extensions)?;
            let value = Any::from_der(&extensions.to_der().map_err(X509Error::encoding)?)?;
            attributes.push(Attribute {
                oid: oids::EXTENSION_REQUEST,
                values: SetOfVec::try_from(vec![value]).map_err(X509Error::encoding)?,
            });
        }

        SetOfVec::try_from(attributes).map_err(X509Error::encoding)
    }

    /// Creates a DER-encoded PKCS#10 request signed by `signer`.
    pub fn create_signing_request(&self, signer: &dyn SignatureGenerator) -> Result<Vec<u8>> {
        let attributes = self.encode_attributes()?;
        let algorithm = checked_algorithm_identifier(signer, self.hash_algorithm)?;

        let info = CertReqInfoInner {
            version: 0,
            subject: self.subject.as_x509_name()?,
            subject_public_key_info: self.public_key.to_spki()?,
            attributes,
        };
        let tbs = info.to_der().map_err(X509Error::encoding)?;

        log::debug!(
            "creating signing request for `{}` with {} attribute(s)",
            self.subject,
            info.attributes.len()
        );
        sign_and_wrap(signer, self.hash_algorithm, &tbs, &algorithm)
    }

    /// Same as [`create_signing_request`](Self::create_signing_request), as a
    /// `CERTIFICATE REQUEST` PEM block.
    pub fn create_signing_request_pem(&self, signer: &dyn SignatureGenerator) -> Result<String> {
        let der = self.create_signing_request(signer)?;
        Ok(pem_utils::der_to_pem(
            &der,
            pem_utils::CERTIFICATE_REQUEST_LABEL,
        ))
    }

    /// Loads a DER-encoded PKCS#10 request.
    ///
    /// The signature is checked with the algorithm named in the request
    /// itself. `hash_algorithm` and `rsa_padding` only configure certificates
    /// later issued from the loaded request.
    pub fn load_signing_request(
        der: &[u8],
        hash_algorithm: HashAlgorithm,
        options: RequestLoadOptions,
        rsa_padding: Option<RsaPadding>,
    ) -> Result<Self> {
        let envelope = SignedEnvelope::decode(der)?;
        let info = CertReqInfoInner::from_der(envelope.tbs)?;
        if info.version != 0 {
            return Err(X509Error::UnsupportedVersion(info.version));
        }
        let signature = envelope.signature_bytes()?;
        let public_key = PublicKeyInfo::from_spki(&info.subject_public_key_info)?;

        if options.skip_signature_validation {
            log::debug!("loading signing request without checking its signature");
        } else {
            verify_signature(&public_key, &envelope.algorithm, envelope.tbs, signature)?;
        }

        let mut certificate_extensions = None;
        let mut other_request_attributes = Vec::new();
        for attribute in info.attributes.iter() {
            if attribute.oid != oids::EXTENSION_REQUEST {
                for value in attribute.values.iter() {
                    other_request_attributes.push(RequestAttribute::new(
                        attribute.oid,
                        value.to_der()?,
                    ));
                }
                continue;
            }

            if certificate_extensions.is_some() {
                return Err(X509Error::DuplicateExtension(oids::describe(
                    &oids::EXTENSION_REQUEST,
                )));
            }
            let [value] = attribute.values.as_slice() else {
                return Err(X509Error::InvalidEncoding(
                    "extension request attribute must hold exactly one value".to_string(),
                ));
            };
            certificate_extensions = Some(decode_requested_extensions(&value.to_der()?)?);
        }
        let certificate_extensions = certificate_extensions.unwrap_or_default();

        let known_extensions = if options.unsafe_load_certificate_extensions {
            log::warn!(
                "exposing {} requested extension(s) from untrusted request content",
                certificate_extensions.len()
            );
            Some(
                certificate_extensions
                    .iter()
                    .cloned()
                    .map(KnownExtension::new)
                    .collect(),
            )
        } else {
            None
        };

        let subject = DistinguishedName::from_x509_name(&info.subject)?;
        log::debug!(
            "loaded signing request for `{subject}` with {} extension(s) and {} other attribute(s)",
            certificate_extensions.len(),
            other_request_attributes.len()
        );

        Ok(Self {
            subject,
            public_key,
            hash_algorithm,
            rsa_padding,
            certificate_extensions,
            other_request_attributes,
            known_extensions,
        })
    }

    /// Loads the first `CERTIFICATE REQUEST` block of a PEM document.
    pub fn load_signing_request_pem(
        pem: &str,
        hash_algorithm: HashAlgorithm,
        options: RequestLoadOptions,
        rsa_padding: Option<RsaPadding>,
    ) -> Result<Self> {
        let der = pem_utils::pem_to_der(pem, pem_utils::CERTIFICATE_REQUEST_LABEL)?;
        Self::load_signing_request(&der, hash_algorithm, options, rsa_padding)
    }

    fn padding_for(&self, key: &KeyPair) -> Result<RsaPadding> {
        match (key.is_rsa(), self.rsa_padding) {
            (true, None) => Err(X509Error::invalid_argument(
                "rsa_padding",
                "an RSA signing key requires a padding mode",
            )),
            (_, padding) => Ok(padding.unwrap_or_default()),
        }
    }

    /// Creates a self-signed certificate with `key`, which must be the
    /// private half of this request's public key.
    pub fn create_self_signed(
        &self,
        key: &KeyPair,
        not_before: OffsetDateTime,
        not_after: OffsetDateTime,
    ) -> Result<Certificate> {
        check_validity_order(not_before, not_after)?;
        if key.public_key_info()? != self.public_key {
            return Err(X509Error::invalid_argument(
                "key",
                "the key does not match the request's public key",
            ));
        }

        let signer = key.signature_generator(self.padding_for(key)?);
        let serial: [u8; 8] = rand::random();
        let certificate = self.create_with_generator(
            &self.subject,
            &signer,
            not_before,
            not_after,
            &canonicalize_serial(&serial),
        )?;
        certificate.copy_with_private_key(key.clone())
    }

    /// Creates a certificate signed by `issuer`, which must hold its private
    /// key, be a CA permitted to sign certificates, and have a validity period
    /// enclosing `[not_before, not_after]`.
    pub fn create(
        &self,
        issuer: &Certificate,
        not_before: OffsetDateTime,
        not_after: OffsetDateTime,
        serial_number: &[u8],
    ) -> Result<Certificate> {
        check_validity_order(not_before, not_after)?;
        let key = issuer.authorize(IssuerPurpose::Certificates)?;
        issuer.check_validity_nesting(not_before, not_after)?;

        let signer = key.signature_generator(self.padding_for(key)?);
        self.create_with_generator(
            issuer.issuer_name(),
            &signer,
            not_before,
            not_after,
            serial_number,
        )
    }

    /// Creates a certificate naming `issuer_name` as its issuer, signed by
    /// `signer`.
    pub fn create_with_generator(
        &self,
        issuer_name: &DistinguishedName,
        signer: &dyn SignatureGenerator,
        not_before: OffsetDateTime,
        not_after: OffsetDateTime,
        serial_number: &[u8],
    ) -> Result<Certificate> {
        check_validity_order(not_before, not_after)?;
        validate_serial(serial_number)?;
        let serial_number = canonicalize_serial(serial_number);
        let algorithm = checked_algorithm_identifier(signer, self.hash_algorithm)?;

        let tbs = TbsCertificate {
            serial_number: &serial_number,
            signature_algorithm: &algorithm,
            issuer: issuer_name,
            not_before,
            not_after,
            subject: &self.subject,
            subject_public_key: &self.public_key,
            extensions: &self.certificate_extensions,
        }
        .to_der()?;

        log::debug!(
            "issuing certificate {} for `{}` signed by `{issuer_name}`",
            hex(&serial_number),
            self.subject
        );
        let der = sign_and_wrap(signer, self.hash_algorithm, &tbs, &algorithm)?;
        Certificate::from_der(&der)
    }
}

fn check_validity_order(not_before: OffsetDateTime, not_after: OffsetDateTime) -> Result<()> {
    if not_after < not_before {
        return Err(X509Error::invalid_argument(
            "not_after",
            "notAfter must not be earlier than notBefore",
        ));
    }
    Ok(())
}

fn decode_requested_extensions(value: &[u8]) -> Result<Vec<Extension>> {
    let extensions = Vec::<x509_cert::ext::Extension>::from_der(value)?;
    let mut seen = HashSet::new();
    extensions
        .iter()
        .map(|ext| {
            if !seen.insert(ext.extn_id) {
                return Err(X509Error::DuplicateExtension(oids::describe(&ext.extn_id)));
            }
            Ok(Extension::from_x509(ext))
        })
        .collect()
}

fn hex(bytes: &[u8]) -> String {
    bytes.iter().map(|b| format!("{b:02X}")).collect()
}
