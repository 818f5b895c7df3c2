use core::fmt;
use core::str::FromStr;

use const_oid::ObjectIdentifier;
use der::asn1::{Any, Ia5StringRef, OctetString, PrintableStringRef, SetOfVec};
use der::{Decode, Encode, Tag, Tagged};
use x509_cert::attr::AttributeTypeAndValue;
use x509_cert::name::{Name, RdnSequence, RelativeDistinguishedName};

use super::extensions::ToAndFromX509Extension;
use crate::error::{Result, X509Error};
use crate::oids;

/// A distinguished name held as its DER encoding.
///
/// Construct one with [`DistinguishedName::builder`], [`DistinguishedName::parse`]
/// or [`DistinguishedName::from_der`]. The value is immutable once built.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct DistinguishedName {
    der: Vec<u8>,
}

impl DistinguishedName {
    pub fn builder() -> DistinguishedNameBuilder {
        DistinguishedNameBuilder::default()
    }

    /// Validates and wraps an encoded `Name`.
    pub fn from_der(der: &[u8]) -> Result<Self> {
        Name::from_der(der)?;
        Ok(Self { der: der.to_vec() })
    }

    /// Parses an RFC 4514 string such as `CN=example.com,O=Example`.
    pub fn parse(rfc4514: &str) -> Result<Self> {
        let name = RdnSequence::from_str(rfc4514)
            .map_err(|e| X509Error::invalid_argument("name", e.to_string()))?;
        Self::from_x509_name(&name)
    }

    pub fn from_x509_name(name: &Name) -> Result<Self> {
        Ok(Self {
            der: name.to_der().map_err(X509Error::encoding)?,
        })
    }

    pub fn as_x509_name(&self) -> Result<Name> {
        Ok(Name::from_der(&self.der)?)
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.der
    }

    /// `(oid, value)` pairs in encoded order; values that are not strings are
    /// reported as hex.
    pub fn components(&self) -> Result<Vec<(ObjectIdentifier, String)>> {
        let name = self.as_x509_name()?;
        let mut out = Vec::new();
        for rdn in name.0.iter() {
            for atv in rdn.0.iter() {
                out.push((atv.oid, attribute_text(&atv.value)));
            }
        }
        Ok(out)
    }

    /// Value of the first component with `oid`.
    pub fn find(&self, oid: ObjectIdentifier) -> Result<Option<String>> {
        Ok(self
            .components()?
            .into_iter()
            .find(|(candidate, _)| *candidate == oid)
            .map(|(_, value)| value))
    }

    pub fn common_name(&self) -> Result<Option<String>> {
        self.find(oids::AT_COMMON_NAME)
    }
}

impl fmt::Display for DistinguishedName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.as_x509_name() {
            Ok(name) => write!(f, "{name}"),
            Err(_) => f.write_str("<invalid name>"),
        }
    }
}

fn attribute_text(value: &Any) -> String {
    match value.tag() {
        Tag::Utf8String
        | Tag::PrintableString
        | Tag::Ia5String
        | Tag::TeletexString
        | Tag::VisibleString => String::from_utf8_lossy(value.value()).into_owned(),
        _ => value
            .value()
            .iter()
            .map(|b| format!("{b:02X}"))
            .collect::<String>(),
    }
}

/// String type used for a name component value.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum DirectoryStringType {
    Utf8,
    Printable,
    Ia5,
}

/// Collects name components; [`build`](Self::build) emits them in reverse
/// order of addition, so the last component added comes first in the
/// encoded `RDNSequence`.
#[derive(Clone, Debug, Default)]
pub struct DistinguishedNameBuilder {
    components: Vec<(ObjectIdentifier, String, DirectoryStringType)>,
}

impl DistinguishedNameBuilder {
    pub fn add(
        mut self,
        oid: ObjectIdentifier,
        value: impl Into<String>,
        string_type: DirectoryStringType,
    ) -> Self {
        self.components.push((oid, value.into(), string_type));
        self
    }

    pub fn add_common_name(self, value: impl Into<String>) -> Self {
        self.add(oids::AT_COMMON_NAME, value, DirectoryStringType::Utf8)
    }

    pub fn add_organization(self, value: impl Into<String>) -> Self {
        self.add(oids::AT_ORGANIZATION_NAME, value, DirectoryStringType::Utf8)
    }

    pub fn add_organizational_unit(self, value: impl Into<String>) -> Self {
        self.add(oids::AT_ORGANIZATIONAL_UNIT_NAME, value, DirectoryStringType::Utf8)
    }

    pub fn add_locality_name(self, value: impl Into<String>) -> Self {
        self.add(oids::AT_LOCALITY_NAME, value, DirectoryStringType::Utf8)
    }

    pub fn add_state_or_province_name(self, value: impl Into<String>) -> Self {
        self.add(oids::AT_STATE_OR_PROVINCE_NAME, value, DirectoryStringType::Utf8)
    }

    /// Two-letter ISO 3166 code, encoded as PrintableString.
    pub fn add_country_or_region(self, value: impl Into<String>) -> Self {
        self.add(oids::AT_COUNTRY_NAME, value, DirectoryStringType::Printable)
    }

    pub fn add_email_address(self, value: impl Into<String>) -> Self {
        self.add(oids::AT_EMAIL_ADDRESS, value, DirectoryStringType::Ia5)
    }

    pub fn add_domain_component(self, value: impl Into<String>) -> Self {
        self.add(oids::AT_DOMAIN_COMPONENT, value, DirectoryStringType::Ia5)
    }

    pub fn build(&self) -> Result<DistinguishedName> {
        let mut rdns = Vec::with_capacity(self.components.len());
        for (oid, value, string_type) in self.components.iter().rev() {
            if *oid == oids::AT_COUNTRY_NAME && value.len() != 2 {
                return Err(X509Error::invalid_argument(
                    "country",
                    "country code must be two characters",
                ));
            }
            let value = encode_directory_string(value, *string_type)?;
            let atv = AttributeTypeAndValue { oid: *oid, value };
            let set = SetOfVec::try_from(vec![atv]).map_err(X509Error::encoding)?;
            rdns.push(RelativeDistinguishedName(set));
        }
        DistinguishedName::from_x509_name(&RdnSequence(rdns))
    }
}

fn encode_directory_string(value: &str, string_type: DirectoryStringType) -> Result<Any> {
    let tag = match string_type {
        DirectoryStringType::Utf8 => Tag::Utf8String,
        DirectoryStringType::Printable => {
            PrintableStringRef::new(value).map_err(|_| {
                X509Error::invalid_argument("name", "not a PrintableString value")
            })?;
            Tag::PrintableString
        }
        DirectoryStringType::Ia5 => {
            Ia5StringRef::new(value)
                .map_err(|_| X509Error::invalid_argument("name", "not an IA5String value"))?;
            Tag::Ia5String
        }
    };
    Any::new(tag, value.as_bytes().to_vec()).map_err(X509Error::encoding)
}

/// Represents an X.509 extension.
///
/// This struct contains the OID, criticality, and DER-encoded value of an extension.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Extension {
    pub oid: ObjectIdentifier,
    pub critical: bool,
    /// DER-encoded extension value
    pub value: Vec<u8>,
}

impl Extension {
    pub fn new(oid: ObjectIdentifier, critical: bool, value: Vec<u8>) -> Self {
        Self {
            oid,
            critical,
            value,
        }
    }

    /// Creates an `Extension` from a typed extension.
    pub fn from_extension<E: ToAndFromX509Extension>(extension: &E, critical: bool) -> Result<Self> {
        Ok(Self {
            oid: E::OID,
            critical,
            value: extension.to_x509_extension_value()?,
        })
    }

    /// Decodes the value as a typed extension.
    pub fn to_extension<E: ToAndFromX509Extension>(&self) -> Result<E> {
        if self.oid != E::OID {
            return Err(X509Error::invalid_argument(
                "extension",
                format!("extension {} is not {}", self.oid, E::OID),
            ));
        }
        E::from_x509_extension_value(&self.value)
    }

    pub(crate) fn to_x509(&self) -> Result<x509_cert::ext::Extension> {
        Ok(x509_cert::ext::Extension {
            extn_id: self.oid,
            critical: self.critical,
            extn_value: OctetString::new(self.value.clone()).map_err(X509Error::encoding)?,
        })
    }

    pub(crate) fn from_x509(ext: &x509_cert::ext::Extension) -> Self {
        Self {
            oid: ext.extn_id,
            critical: ext.critical,
            value: ext.extn_value.as_bytes().to_vec(),
        }
    }
}

/// Encodes `extensions` as a `SEQUENCE OF Extension`, rejecting repeated OIDs.
pub(crate) fn encode_extensions(extensions: &[Extension]) -> Result<Vec<x509_cert::ext::Extension>> {
    let mut seen = std::collections::HashSet::new();
    extensions
        .iter()
        .map(|ext| {
            if !seen.insert(ext.oid) {
                return Err(X509Error::DuplicateExtension(oids::describe(&ext.oid)));
            }
            ext.to_x509()
        })
        .collect()
}

/// One value of a PKCS#10 request attribute other than the extension request.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct RequestAttribute {
    pub oid: ObjectIdentifier,
    /// DER of a single attribute value.
    pub value: Vec<u8>,
}

impl RequestAttribute {
    pub fn new(oid: ObjectIdentifier, value: Vec<u8>) -> Self {
        Self { oid, value }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builder_reverses_component_order() {
        let name = DistinguishedName::builder()
            .add_country_or_region("US")
            .add_organization("Crab widgits SE")
            .add_common_name("crabs.crabs")
            .build()
            .unwrap();

        let components = name.components().unwrap();
        assert_eq!(
            components,
            vec![
                (oids::AT_COMMON_NAME, "crabs.crabs".to_string()),
                (oids::AT_ORGANIZATION_NAME, "Crab widgits SE".to_string()),
                (oids::AT_COUNTRY_NAME, "US".to_string()),
            ]
        );
        assert_eq!(name.common_name().unwrap().as_deref(), Some("crabs.crabs"));
    }

    #[test]
    fn test_country_uses_printable_string() {
        let name = DistinguishedName::builder()
            .add_country_or_region("DE")
            .build()
            .unwrap();
        let x509 = name.as_x509_name().unwrap();
        let value = &x509.0[0].0.iter().next().unwrap().value;
        assert_eq!(value.tag(), Tag::PrintableString);
    }

    #[test]
    fn test_rejects_bad_component_values() {
        assert!(
            DistinguishedName::builder()
                .add_country_or_region("USA")
                .build()
                .is_err()
        );
        assert!(
            DistinguishedName::builder()
                .add_email_address("crab@exämple.com")
                .build()
                .is_err()
        );
    }

    #[test]
    fn test_der_round_trip() {
        let name = DistinguishedName::parse("CN=myca.local,O=Example").unwrap();
        let again = DistinguishedName::from_der(name.as_bytes()).unwrap();
        assert_eq!(name, again);
        assert!(DistinguishedName::from_der(&[0x31, 0x00]).is_err());
    }

    #[test]
    fn test_duplicate_extension_oids_rejected() {
        let ext = Extension::new(oids::ID_CE_BASIC_CONSTRAINTS, true, vec![0x30, 0x00]);
        assert!(encode_extensions(&[ext.clone()]).is_ok());
        assert!(matches!(
            encode_extensions(&[ext.clone(), ext]),
            Err(X509Error::DuplicateExtension(_))
        ));
    }
}
