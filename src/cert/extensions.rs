use std::net::IpAddr;
use std::sync::OnceLock;

use der::{
    Decode, Encode, Tag, Tagged,
    asn1::{AnyRef, Ia5String, OctetString},
    oid::ObjectIdentifier,
};
use sha1::{Digest, Sha1};
use x509_cert::ext::pkix::crl::CrlDistributionPoints as X509CrlDistributionPoints;
use x509_cert::ext::pkix::crl::dp::DistributionPoint;
use x509_cert::ext::pkix::name::{DistributionPointName, GeneralName};
use x509_cert::ext::pkix::{AccessDescription, AuthorityInfoAccessSyntax};

pub use der::flagset::FlagSet;
use x509_cert::ext::pkix::KeyUsage as X509KeyUsage;
pub use x509_cert::ext::pkix::KeyUsages;

use super::Certificate;
use super::params::{DistinguishedName, Extension};
use crate::asn1::{tlv, validate_serial};
use crate::error::{Result, X509Error};
use crate::key::PublicKeyInfo;
use crate::oids;

/// Trait for converting to and from X.509 extensions.
///
/// This trait provides methods to encode and decode X.509 extension values.
///
/// # Example
/// ```
/// use x509forge::cert::extensions::{BasicConstraints, ToAndFromX509Extension};
/// let bc = BasicConstraints { is_ca: true, max_path_length: Some(0) };
/// let encoded = bc.to_x509_extension_value().unwrap();
/// let decoded = BasicConstraints::from_x509_extension_value(&encoded).unwrap();
/// assert_eq!(bc, decoded);
/// ```
pub trait ToAndFromX509Extension {
    /// The Object Identifier (OID) for the extension.
    const OID: ObjectIdentifier;

    /// Encodes the extension into a DER-encoded byte vector.
    fn to_x509_extension_value(&self) -> Result<Vec<u8>>;

    /// Decodes the extension from a DER-encoded byte slice.
    fn from_x509_extension_value(extension: &[u8]) -> Result<Self>
    where
        Self: Sized;
}

fn ia5(value: &str, param: &'static str) -> Result<Ia5String> {
    Ia5String::new(value).map_err(|e| X509Error::invalid_argument(param, e.to_string()))
}

/// Represents the Subject Alternative Name (SAN) extension.
///
/// Only DNS names, e-mail addresses, URIs and IP addresses are carried; other
/// general name forms are skipped on decode.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SubjectAltName {
    pub dns_names: Vec<String>,
    pub email_addresses: Vec<String>,
    pub uris: Vec<String>,
    pub ip_addresses: Vec<IpAddr>,
}

impl ToAndFromX509Extension for SubjectAltName {
    const OID: ObjectIdentifier = oids::ID_CE_SUBJECT_ALT_NAME;

    fn to_x509_extension_value(&self) -> Result<Vec<u8>> {
        let mut names = Vec::new();
        for dns in &self.dns_names {
            names.push(GeneralName::DnsName(ia5(dns, "dns_names")?));
        }
        for email in &self.email_addresses {
            names.push(GeneralName::Rfc822Name(ia5(email, "email_addresses")?));
        }
        for uri in &self.uris {
            names.push(GeneralName::UniformResourceIdentifier(ia5(uri, "uris")?));
        }
        for ip in &self.ip_addresses {
            let octets = match ip {
                IpAddr::V4(v4) => v4.octets().to_vec(),
                IpAddr::V6(v6) => v6.octets().to_vec(),
            };
            names.push(GeneralName::IpAddress(
                OctetString::new(octets).map_err(X509Error::encoding)?,
            ));
        }
        if names.is_empty() {
            return Err(X509Error::invalid_argument(
                "subject_alt_name",
                "at least one name is required",
            ));
        }

        x509_cert::ext::pkix::SubjectAltName(names)
            .to_der()
            .map_err(X509Error::encoding)
    }

    fn from_x509_extension_value(extension: &[u8]) -> Result<Self> {
        let san = x509_cert::ext::pkix::SubjectAltName::from_der(extension)?;
        let mut out = Self::default();
        for name in san.0 {
            match name {
                GeneralName::DnsName(dns) => out.dns_names.push(dns.to_string()),
                GeneralName::Rfc822Name(email) => out.email_addresses.push(email.to_string()),
                GeneralName::UniformResourceIdentifier(uri) => out.uris.push(uri.to_string()),
                GeneralName::IpAddress(ip) => match ip.as_bytes().len() {
                    4 | 16 => {
                        let mut buf = [0u8; 16];
                        let bytes = ip.as_bytes();
                        buf[..bytes.len()].copy_from_slice(bytes);
                        out.ip_addresses.push(if bytes.len() == 4 {
                            IpAddr::from([buf[0], buf[1], buf[2], buf[3]])
                        } else {
                            IpAddr::from(buf)
                        });
                    }
                    _ => {
                        return Err(X509Error::InvalidEncoding(
                            "IP address must be 4 or 16 bytes".to_string(),
                        ));
                    }
                },
                other => log::trace!("skipping general name {other:?}"),
            }
        }
        Ok(out)
    }
}

/// Represents the Basic Constraints extension.
///
/// This extension indicates whether the certificate is a CA certificate and its path length.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BasicConstraints {
    pub is_ca: bool,
    pub max_path_length: Option<u8>,
}

impl ToAndFromX509Extension for BasicConstraints {
    const OID: ObjectIdentifier = oids::ID_CE_BASIC_CONSTRAINTS;

    fn to_x509_extension_value(&self) -> Result<Vec<u8>> {
        if !self.is_ca && self.max_path_length.is_some() {
            return Err(X509Error::invalid_argument(
                "max_path_length",
                "a path length constraint requires a CA",
            ));
        }
        let bc = x509_cert::ext::pkix::BasicConstraints {
            ca: self.is_ca,
            path_len_constraint: self.max_path_length,
        };

        bc.to_der().map_err(X509Error::encoding)
    }

    fn from_x509_extension_value(der_bytes: &[u8]) -> Result<Self> {
        let bc = x509_cert::ext::pkix::BasicConstraints::from_der(der_bytes)?;
        Ok(Self {
            is_ca: bc.ca,
            max_path_length: bc.path_len_constraint,
        })
    }
}

/// Represents the Key Usage extension.
///
/// This extension defines the purpose of the key contained in the certificate.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct KeyUsage(pub FlagSet<KeyUsages>);

impl KeyUsage {
    pub fn contains(&self, usage: KeyUsages) -> bool {
        self.0.contains(usage)
    }
}

impl ToAndFromX509Extension for KeyUsage {
    const OID: ObjectIdentifier = oids::ID_CE_KEY_USAGE;

    fn to_x509_extension_value(&self) -> Result<Vec<u8>> {
        X509KeyUsage(self.0).to_der().map_err(X509Error::encoding)
    }

    fn from_x509_extension_value(extension: &[u8]) -> Result<Self> {
        let ku = X509KeyUsage::from_der(extension)?;
        Ok(Self(ku.0))
    }
}

/// The Subject Key Identifier extension.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubjectKeyIdentifier(pub Vec<u8>);

impl SubjectKeyIdentifier {
    /// SHA-1 of the `subjectPublicKey` bits (RFC 5280 section 4.2.1.2, method 1).
    pub fn from_public_key(public_key: &PublicKeyInfo) -> Self {
        Self(Sha1::digest(&public_key.key).to_vec())
    }
}

impl ToAndFromX509Extension for SubjectKeyIdentifier {
    const OID: ObjectIdentifier = oids::ID_CE_SUBJECT_KEY_IDENTIFIER;

    fn to_x509_extension_value(&self) -> Result<Vec<u8>> {
        let id = OctetString::new(self.0.as_slice()).map_err(X509Error::encoding)?;
        x509_cert::ext::pkix::SubjectKeyIdentifier(id)
            .to_der()
            .map_err(X509Error::encoding)
    }

    fn from_x509_extension_value(extension: &[u8]) -> Result<Self> {
        let ski = x509_cert::ext::pkix::SubjectKeyIdentifier::from_der(extension)?;
        Ok(Self(ski.0.as_bytes().to_vec()))
    }
}

/// Represents the Authority Key Identifier (AKI) extension.
///
/// This extension identifies the public key corresponding to the private key used to sign the
/// certificate or CRL. `authority_cert_issuer` and `authority_cert_serial_number` must be given
/// together or not at all.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AuthorityKeyIdentifier {
    pub key_identifier: Option<Vec<u8>>,
    pub authority_cert_issuer: Option<DistinguishedName>,
    pub authority_cert_serial_number: Option<Vec<u8>>,
}

impl AuthorityKeyIdentifier {
    pub fn from_key_identifier(key_identifier: impl Into<Vec<u8>>) -> Self {
        Self {
            key_identifier: Some(key_identifier.into()),
            ..Default::default()
        }
    }

    /// Identifies `issuer` by its Subject Key Identifier, falling back to the
    /// SHA-1 of its public key when the certificate carries none.
    pub fn from_certificate(issuer: &Certificate) -> Result<Self> {
        let key_identifier = match issuer.find_extension::<SubjectKeyIdentifier>()? {
            Some(ski) => ski.0,
            None => SubjectKeyIdentifier::from_public_key(issuer.public_key_info()).0,
        };
        Ok(Self::from_key_identifier(key_identifier))
    }
}

impl ToAndFromX509Extension for AuthorityKeyIdentifier {
    const OID: ObjectIdentifier = oids::ID_CE_AUTHORITY_KEY_IDENTIFIER;

    fn to_x509_extension_value(&self) -> Result<Vec<u8>> {
        if self.authority_cert_issuer.is_some() != self.authority_cert_serial_number.is_some() {
            return Err(X509Error::invalid_argument(
                "authority_key_identifier",
                "issuer and serial number must be present together",
            ));
        }

        let authority_cert_issuer = self
            .authority_cert_issuer
            .as_ref()
            .map(|dn| Ok::<_, X509Error>(vec![GeneralName::DirectoryName(dn.as_x509_name()?)]))
            .transpose()?;
        let authority_cert_serial_number = self
            .authority_cert_serial_number
            .as_deref()
            .map(|serial| {
                validate_serial(serial)?;
                x509_cert::serial_number::SerialNumber::new(serial).map_err(X509Error::encoding)
            })
            .transpose()?;

        let aki = x509_cert::ext::pkix::AuthorityKeyIdentifier {
            key_identifier: self
                .key_identifier
                .as_deref()
                .map(OctetString::new)
                .transpose()
                .map_err(X509Error::encoding)?,
            authority_cert_issuer,
            authority_cert_serial_number,
        };

        aki.to_der().map_err(X509Error::encoding)
    }

    fn from_x509_extension_value(extension: &[u8]) -> Result<Self> {
        let aki = x509_cert::ext::pkix::AuthorityKeyIdentifier::from_der(extension)?;

        let authority_cert_issuer = aki
            .authority_cert_issuer
            .as_ref()
            .and_then(|names| {
                names.iter().find_map(|name| match name {
                    GeneralName::DirectoryName(dn) => Some(DistinguishedName::from_x509_name(dn)),
                    _ => None,
                })
            })
            .transpose()?;

        Ok(Self {
            key_identifier: aki.key_identifier.map(|id| id.as_bytes().to_vec()),
            authority_cert_issuer,
            authority_cert_serial_number: aki
                .authority_cert_serial_number
                .map(|sn| sn.as_bytes().to_vec()),
        })
    }
}

/// Represents the Extended Key Usage extension.
///
/// This extension indicates purposes for which the public key may be used.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ExtendedKeyUsage {
    pub usage: Vec<ExtendedKeyUsageOption>,
}

impl ToAndFromX509Extension for ExtendedKeyUsage {
    const OID: ObjectIdentifier = oids::ID_CE_EXT_KEY_USAGE;

    fn to_x509_extension_value(&self) -> Result<Vec<u8>> {
        let oids: Vec<ObjectIdentifier> = self.usage.iter().map(|v| (*v).into()).collect();
        x509_cert::ext::pkix::ExtendedKeyUsage(oids)
            .to_der()
            .map_err(X509Error::encoding)
    }

    fn from_x509_extension_value(extension: &[u8]) -> Result<Self> {
        let eku = x509_cert::ext::pkix::ExtendedKeyUsage::from_der(extension)?;
        Ok(Self {
            usage: eku.0.into_iter().map(ExtendedKeyUsageOption::from).collect(),
        })
    }
}

/// Represents an option for the Extended Key Usage extension.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExtendedKeyUsageOption {
    ServerAuth,
    ClientAuth,
    CodeSigning,
    EmailProtection,
    TimeStamping,
    OcspSigning,
    Other(ObjectIdentifier),
}

impl From<ExtendedKeyUsageOption> for ObjectIdentifier {
    fn from(value: ExtendedKeyUsageOption) -> Self {
        match value {
            ExtendedKeyUsageOption::OcspSigning => const_oid::db::rfc5912::ID_KP_OCSP_SIGNING,
            ExtendedKeyUsageOption::ServerAuth => const_oid::db::rfc5912::ID_KP_SERVER_AUTH,
            ExtendedKeyUsageOption::ClientAuth => const_oid::db::rfc5912::ID_KP_CLIENT_AUTH,
            ExtendedKeyUsageOption::CodeSigning => const_oid::db::rfc5912::ID_KP_CODE_SIGNING,
            ExtendedKeyUsageOption::EmailProtection => {
                const_oid::db::rfc5912::ID_KP_EMAIL_PROTECTION
            }
            ExtendedKeyUsageOption::TimeStamping => const_oid::db::rfc5912::ID_KP_TIME_STAMPING,
            ExtendedKeyUsageOption::Other(oid) => oid,
        }
    }
}

impl From<ObjectIdentifier> for ExtendedKeyUsageOption {
    fn from(oid: ObjectIdentifier) -> Self {
        match oid {
            const_oid::db::rfc5912::ID_KP_OCSP_SIGNING => ExtendedKeyUsageOption::OcspSigning,
            const_oid::db::rfc5912::ID_KP_SERVER_AUTH => ExtendedKeyUsageOption::ServerAuth,
            const_oid::db::rfc5912::ID_KP_CLIENT_AUTH => ExtendedKeyUsageOption::ClientAuth,
            const_oid::db::rfc5912::ID_KP_CODE_SIGNING => ExtendedKeyUsageOption::CodeSigning,
            const_oid::db::rfc5912::ID_KP_EMAIL_PROTECTION => {
                ExtendedKeyUsageOption::EmailProtection
            }
            const_oid::db::rfc5912::ID_KP_TIME_STAMPING => ExtendedKeyUsageOption::TimeStamping,
            other => ExtendedKeyUsageOption::Other(other),
        }
    }
}

/// The Authority Information Access extension, restricted to URI locations.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AuthorityInformationAccess {
    pub ocsp_uris: Vec<String>,
    pub ca_issuer_uris: Vec<String>,
}

impl ToAndFromX509Extension for AuthorityInformationAccess {
    const OID: ObjectIdentifier = oids::ID_PE_AUTHORITY_INFO_ACCESS;

    fn to_x509_extension_value(&self) -> Result<Vec<u8>> {
        let described = |method: ObjectIdentifier, uri: &String| {
            Ok::<_, X509Error>(AccessDescription {
                access_method: method,
                access_location: GeneralName::UniformResourceIdentifier(ia5(uri, "uri")?),
            })
        };
        let descriptions = self
            .ocsp_uris
            .iter()
            .map(|uri| described(oids::ID_AD_OCSP, uri))
            .chain(
                self.ca_issuer_uris
                    .iter()
                    .map(|uri| described(oids::ID_AD_CA_ISSUERS, uri)),
            )
            .collect::<Result<Vec<_>>>()?;
        if descriptions.is_empty() {
            return Err(X509Error::invalid_argument(
                "authority_information_access",
                "at least one access location is required",
            ));
        }

        AuthorityInfoAccessSyntax(descriptions)
            .to_der()
            .map_err(X509Error::encoding)
    }

    fn from_x509_extension_value(extension: &[u8]) -> Result<Self> {
        let aia = AuthorityInfoAccessSyntax::from_der(extension)?;
        let mut out = Self::default();
        for description in aia.0 {
            let GeneralName::UniformResourceIdentifier(uri) = description.access_location else {
                continue;
            };
            if description.access_method == oids::ID_AD_OCSP {
                out.ocsp_uris.push(uri.to_string());
            } else if description.access_method == oids::ID_AD_CA_ISSUERS {
                out.ca_issuer_uris.push(uri.to_string());
            }
        }
        Ok(out)
    }
}

/// The CRL Number extension.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct CrlNumber(pub i128);

impl ToAndFromX509Extension for CrlNumber {
    const OID: ObjectIdentifier = oids::ID_CE_CRL_NUMBER;

    fn to_x509_extension_value(&self) -> Result<Vec<u8>> {
        let bytes = self.0.to_be_bytes();
        let mut start = 0;
        while start + 1 < bytes.len() {
            let redundant = match bytes[start] {
                0x00 => bytes[start + 1] & 0x80 == 0,
                0xFF => bytes[start + 1] & 0x80 != 0,
                _ => false,
            };
            if !redundant {
                break;
            }
            start += 1;
        }
        tlv(Tag::Integer, &bytes[start..])
    }

    fn from_x509_extension_value(extension: &[u8]) -> Result<Self> {
        let value = AnyRef::from_der(extension)?;
        if value.tag() != Tag::Integer {
            return Err(X509Error::InvalidEncoding(
                "CRL number is not an INTEGER".to_string(),
            ));
        }
        let bytes = value.value();
        validate_serial(bytes)
            .map_err(|_| X509Error::InvalidEncoding("CRL number is not minimal".to_string()))?;
        if bytes.len() > 16 {
            return Err(X509Error::InvalidEncoding(
                "CRL number does not fit in 128 bits".to_string(),
            ));
        }
        let fill = if bytes[0] & 0x80 != 0 { 0xFF } else { 0x00 };
        let mut buf = [fill; 16];
        buf[16 - bytes.len()..].copy_from_slice(bytes);
        Ok(Self(i128::from_be_bytes(buf)))
    }
}

/// CRLReason codes (RFC 5280 section 5.3.1). Value 7 is unassigned.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum RevocationReason {
    Unspecified = 0,
    KeyCompromise = 1,
    CaCompromise = 2,
    AffiliationChanged = 3,
    Superseded = 4,
    CessationOfOperation = 5,
    CertificateHold = 6,
    RemoveFromCrl = 8,
    PrivilegeWithdrawn = 9,
    AaCompromise = 10,
}

impl TryFrom<u8> for RevocationReason {
    type Error = X509Error;

    fn try_from(value: u8) -> Result<Self> {
        Ok(match value {
            0 => RevocationReason::Unspecified,
            1 => RevocationReason::KeyCompromise,
            2 => RevocationReason::CaCompromise,
            3 => RevocationReason::AffiliationChanged,
            4 => RevocationReason::Superseded,
            5 => RevocationReason::CessationOfOperation,
            6 => RevocationReason::CertificateHold,
            8 => RevocationReason::RemoveFromCrl,
            9 => RevocationReason::PrivilegeWithdrawn,
            10 => RevocationReason::AaCompromise,
            other => {
                return Err(X509Error::InvalidEncoding(format!(
                    "unknown CRL reason code {other}"
                )));
            }
        })
    }
}

/// The CRL entry reason code extension.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CrlReason(pub RevocationReason);

impl ToAndFromX509Extension for CrlReason {
    const OID: ObjectIdentifier = oids::ID_CE_CRL_REASONS;

    fn to_x509_extension_value(&self) -> Result<Vec<u8>> {
        tlv(Tag::Enumerated, &[self.0 as u8])
    }

    fn from_x509_extension_value(extension: &[u8]) -> Result<Self> {
        let value = AnyRef::from_der(extension)?;
        match (value.tag(), value.value()) {
            (Tag::Enumerated, [code]) => Ok(Self(RevocationReason::try_from(*code)?)),
            _ => Err(X509Error::InvalidEncoding(
                "CRL reason is not a single-byte ENUMERATED".to_string(),
            )),
        }
    }
}

/// The CRL Distribution Points extension as a single distribution point
/// whose full name lists every URI.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CrlDistributionPoints {
    pub uris: Vec<String>,
}

impl ToAndFromX509Extension for CrlDistributionPoints {
    const OID: ObjectIdentifier = oids::ID_CE_CRL_DISTRIBUTION_POINTS;

    fn to_x509_extension_value(&self) -> Result<Vec<u8>> {
        if self.uris.is_empty() {
            return Err(X509Error::invalid_argument(
                "uris",
                "at least one distribution point URI is required",
            ));
        }
        let names = self
            .uris
            .iter()
            .map(|uri| {
                if uri.is_empty() {
                    return Err(X509Error::invalid_argument(
                        "uris",
                        "distribution point URIs must not be empty",
                    ));
                }
                Ok(GeneralName::UniformResourceIdentifier(ia5(uri, "uris")?))
            })
            .collect::<Result<Vec<_>>>()?;

        let point = DistributionPoint {
            distribution_point: Some(DistributionPointName::FullName(names)),
            reasons: None,
            crl_issuer: None,
        };
        X509CrlDistributionPoints(vec![point])
            .to_der()
            .map_err(X509Error::encoding)
    }

    fn from_x509_extension_value(extension: &[u8]) -> Result<Self> {
        let points = X509CrlDistributionPoints::from_der(extension)?;
        let mut uris = Vec::new();
        for point in &points.0 {
            if let Some(DistributionPointName::FullName(names)) = &point.distribution_point {
                for name in names {
                    if let GeneralName::UniformResourceIdentifier(uri) = name {
                        uris.push(uri.to_string());
                    }
                }
            }
        }
        Ok(Self { uris })
    }
}

/// A raw extension with its typed view decoded on first access and cached.
///
/// Construction only checks the OID; a malformed value is reported by
/// [`TypedExtension::get`].
#[derive(Debug, Clone)]
pub struct TypedExtension<E> {
    raw: Extension,
    decoded: OnceLock<E>,
}

impl<E: ToAndFromX509Extension> TypedExtension<E> {
    pub fn new(raw: Extension) -> Result<Self> {
        if raw.oid != E::OID {
            return Err(X509Error::invalid_argument(
                "extension",
                format!("expected {}, got {}", E::OID, raw.oid),
            ));
        }
        Ok(Self::wrap(raw))
    }

    fn wrap(raw: Extension) -> Self {
        Self {
            raw,
            decoded: OnceLock::new(),
        }
    }

    pub fn from_value(value: &E, critical: bool) -> Result<Self> {
        Self::new(Extension::from_extension(value, critical)?)
    }

    pub fn raw(&self) -> &Extension {
        &self.raw
    }

    pub fn critical(&self) -> bool {
        self.raw.critical
    }

    pub fn get(&self) -> Result<&E> {
        if let Some(decoded) = self.decoded.get() {
            return Ok(decoded);
        }
        let decoded = E::from_x509_extension_value(&self.raw.value)?;
        Ok(self.decoded.get_or_init(|| decoded))
    }
}

// Equality is on the encoded extension; the cache does not take part.
impl<E> PartialEq for TypedExtension<E> {
    fn eq(&self, other: &Self) -> bool {
        self.raw == other.raw
    }
}

impl<E> Eq for TypedExtension<E> {}

/// Typed views for the extensions this crate understands.
///
/// Certificates keep one per extension, and so do requests loaded with
/// [`RequestLoadOptions::unsafe_load_certificate_extensions`](crate::cert::request::RequestLoadOptions).
/// Values are decoded when first read, never while loading.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum KnownExtension {
    BasicConstraints(TypedExtension<BasicConstraints>),
    KeyUsage(TypedExtension<KeyUsage>),
    SubjectKeyIdentifier(TypedExtension<SubjectKeyIdentifier>),
    AuthorityKeyIdentifier(TypedExtension<AuthorityKeyIdentifier>),
    ExtendedKeyUsage(TypedExtension<ExtendedKeyUsage>),
    AuthorityInformationAccess(TypedExtension<AuthorityInformationAccess>),
    SubjectAltName(TypedExtension<SubjectAltName>),
    CrlDistributionPoints(TypedExtension<CrlDistributionPoints>),
    /// An extension with no typed view.
    Unknown(Extension),
}

impl KnownExtension {
    pub fn new(extension: Extension) -> Self {
        match extension.oid {
            BasicConstraints::OID => Self::BasicConstraints(TypedExtension::wrap(extension)),
            KeyUsage::OID => Self::KeyUsage(TypedExtension::wrap(extension)),
            SubjectKeyIdentifier::OID => {
                Self::SubjectKeyIdentifier(TypedExtension::wrap(extension))
            }
            AuthorityKeyIdentifier::OID => {
                Self::AuthorityKeyIdentifier(TypedExtension::wrap(extension))
            }
            ExtendedKeyUsage::OID => Self::ExtendedKeyUsage(TypedExtension::wrap(extension)),
            AuthorityInformationAccess::OID => {
                Self::AuthorityInformationAccess(TypedExtension::wrap(extension))
            }
            SubjectAltName::OID => Self::SubjectAltName(TypedExtension::wrap(extension)),
            CrlDistributionPoints::OID => {
                Self::CrlDistributionPoints(TypedExtension::wrap(extension))
            }
            _ => Self::Unknown(extension),
        }
    }

    pub fn raw(&self) -> &Extension {
        match self {
            Self::BasicConstraints(ext) => ext.raw(),
            Self::KeyUsage(ext) => ext.raw(),
            Self::SubjectKeyIdentifier(ext) => ext.raw(),
            Self::AuthorityKeyIdentifier(ext) => ext.raw(),
            Self::ExtendedKeyUsage(ext) => ext.raw(),
            Self::AuthorityInformationAccess(ext) => ext.raw(),
            Self::SubjectAltName(ext) => ext.raw(),
            Self::CrlDistributionPoints(ext) => ext.raw(),
            Self::Unknown(ext) => ext,
        }
    }
}

/// Extensions with a [`KnownExtension`] variant.
pub trait KnownExtensionType: ToAndFromX509Extension + Sized {
    /// The typed view held by `extension`, if it is of this type.
    fn typed(extension: &KnownExtension) -> Option<&TypedExtension<Self>>;
}

macro_rules! known_extension_type {
    ($($ty:ident),* $(,)?) => {
        $(
            impl KnownExtensionType for $ty {
                fn typed(extension: &KnownExtension) -> Option<&TypedExtension<Self>> {
                    match extension {
                        KnownExtension::$ty(typed) => Some(typed),
                        _ => None,
                    }
                }
            }
        )*
    };
}

known_extension_type!(
    BasicConstraints,
    KeyUsage,
    SubjectKeyIdentifier,
    AuthorityKeyIdentifier,
    ExtendedKeyUsage,
    AuthorityInformationAccess,
    SubjectAltName,
    CrlDistributionPoints,
);
