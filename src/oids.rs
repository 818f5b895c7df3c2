//! Object identifiers used by the builders and the signature verifier.

use const_oid::ObjectIdentifier;

pub use const_oid::db::rfc3280::EMAIL_ADDRESS as AT_EMAIL_ADDRESS;
pub use const_oid::db::rfc4519::{
    C as AT_COUNTRY_NAME, CN as AT_COMMON_NAME, DC as AT_DOMAIN_COMPONENT,
    L as AT_LOCALITY_NAME, O as AT_ORGANIZATION_NAME, OU as AT_ORGANIZATIONAL_UNIT_NAME,
    ST as AT_STATE_OR_PROVINCE_NAME,
};
pub use const_oid::db::rfc5911::{ID_DATA as PKCS7_DATA, ID_SIGNED_DATA as PKCS7_SIGNED_DATA};
pub use const_oid::db::rfc5912::{
    ECDSA_WITH_SHA_256 as ECDSA_WITH_SHA256, ECDSA_WITH_SHA_384 as ECDSA_WITH_SHA384,
    ECDSA_WITH_SHA_512 as ECDSA_WITH_SHA512, ID_AD_CA_ISSUERS, ID_AD_OCSP,
    ID_CE_AUTHORITY_KEY_IDENTIFIER, ID_CE_BASIC_CONSTRAINTS, ID_CE_CRL_DISTRIBUTION_POINTS,
    ID_CE_CRL_NUMBER, ID_CE_CRL_REASONS, ID_CE_EXT_KEY_USAGE, ID_CE_KEY_USAGE,
    ID_CE_SUBJECT_ALT_NAME, ID_CE_SUBJECT_KEY_IDENTIFIER, ID_EC_PUBLIC_KEY as EC_PUBLIC_KEY,
    ID_EXTENSION_REQ as EXTENSION_REQUEST, ID_MGF_1 as MGF1, ID_PE_AUTHORITY_INFO_ACCESS,
    ID_RSASSA_PSS as RSASSA_PSS, ID_SHA_1 as SHA1, ID_SHA_256 as SHA256, ID_SHA_384 as SHA384,
    ID_SHA_512 as SHA512, RSA_ENCRYPTION, SECP_256_R_1 as SECP256R1, SECP_384_R_1 as SECP384R1,
    SHA_1_WITH_RSA_ENCRYPTION as SHA1_WITH_RSA, SHA_256_WITH_RSA_ENCRYPTION as SHA256_WITH_RSA,
    SHA_384_WITH_RSA_ENCRYPTION as SHA384_WITH_RSA,
    SHA_512_WITH_RSA_ENCRYPTION as SHA512_WITH_RSA,
};

/// `ecdsa-with-SHA1` (RFC 3279), absent from the OID database.
pub const ECDSA_WITH_SHA1: ObjectIdentifier = ObjectIdentifier::new_unwrap("1.2.840.10045.4.1");

/// Returns a readable name for `oid` when the OID database knows it.
pub fn describe(oid: &ObjectIdentifier) -> String {
    match const_oid::db::DB.by_oid(oid) {
        Some(name) => format!("{name} ({oid})"),
        None => oid.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_database_names_resolve_to_expected_arcs() {
        assert_eq!(SHA1.to_string(), "1.3.14.3.2.26");
        assert_eq!(SECP384R1.to_string(), "1.3.132.0.34");
        assert_eq!(RSASSA_PSS.to_string(), "1.2.840.113549.1.1.10");
        assert_eq!(EXTENSION_REQUEST.to_string(), "1.2.840.113549.1.9.14");
        assert_eq!(PKCS7_SIGNED_DATA.to_string(), "1.2.840.113549.1.7.2");
        assert_eq!(AT_EMAIL_ADDRESS.to_string(), "1.2.840.113549.1.9.1");
        assert_eq!(AT_DOMAIN_COMPONENT.to_string(), "0.9.2342.19200300.100.1.25");
        assert_eq!(ECDSA_WITH_SHA1.to_string(), "1.2.840.10045.4.1");
    }
}
