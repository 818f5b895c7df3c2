#![allow(dead_code)]

use std::sync::OnceLock;

use time::{Duration, OffsetDateTime};
use x509forge::cert::Certificate;
use x509forge::cert::extensions::{BasicConstraints, KeyUsage, KeyUsages, SubjectKeyIdentifier};
use x509forge::cert::params::{DistinguishedName, Extension};
use x509forge::cert::request::CertificateRequest;
use x509forge::key::KeyPair;
use x509forge::signer::RsaPadding;

/// RSA key generation is slow, so every test shares one key.
pub fn rsa_key() -> &'static KeyPair {
    static KEY: OnceLock<KeyPair> = OnceLock::new();
    KEY.get_or_init(|| KeyPair::generate_rsa(2048).unwrap())
}

pub fn dn(common_name: &str) -> DistinguishedName {
    // Added leaf first; encoded as C, O, CN.
    DistinguishedName::builder()
        .add_common_name(common_name)
        .add_organization("Crab widgits SE")
        .add_country_or_region("US")
        .build()
        .unwrap()
}

pub fn ca_extensions(key: &KeyPair, usages: KeyUsage) -> Vec<Extension> {
    let ski = SubjectKeyIdentifier::from_public_key(&key.public_key_info().unwrap());
    vec![
        Extension::from_extension(
            &BasicConstraints {
                is_ca: true,
                max_path_length: None,
            },
            true,
        )
        .unwrap(),
        Extension::from_extension(&usages, true).unwrap(),
        Extension::from_extension(&ski, false).unwrap(),
    ]
}

/// A self-signed CA valid from one day ago for thirty days.
pub fn generate_ca_cert_with(key: &KeyPair, padding: Option<RsaPadding>) -> Certificate {
    let now = OffsetDateTime::now_utc();
    CertificateRequest::builder()
        .subject(dn("myca.local"))
        .public_key(key.public_key_info().unwrap())
        .maybe_rsa_padding(padding)
        .certificate_extensions(ca_extensions(
            key,
            KeyUsage(KeyUsages::KeyCertSign | KeyUsages::CRLSign),
        ))
        .build()
        .create_self_signed(key, now - Duration::days(1), now + Duration::days(30))
        .unwrap()
}

pub fn generate_ca_cert() -> Certificate {
    generate_ca_cert_with(&KeyPair::generate_ecdsa_p256(), None)
}

pub fn leaf_request(common_name: &str, key: &KeyPair) -> CertificateRequest {
    CertificateRequest::builder()
        .subject(dn(common_name))
        .public_key(key.public_key_info().unwrap())
        .build()
}
