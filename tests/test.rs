mod util;

use time::{Duration, OffsetDateTime};
use x509forge::cert::Certificate;
use x509forge::cert::extensions::{
    AuthorityKeyIdentifier, BasicConstraints, ExtendedKeyUsage, ExtendedKeyUsageOption,
    KeyUsage, KeyUsages, RevocationReason, SubjectAltName,
};
use x509forge::cert::params::Extension;
use x509forge::cert::request::{CertificateRequest, RequestLoadOptions};
use x509forge::crl::{CertificateRevocationListBuilder, CrlBuildParams, crl_to_pem};
use x509forge::error::X509Error;
use x509forge::key::KeyPair;
use x509forge::pkcs7;
use x509forge::signer::{HashAlgorithm, RsaPadding};

pub type Result<T> = std::result::Result<T, X509Error>;

fn crl_params(crl_number: i128) -> CrlBuildParams {
    CrlBuildParams::builder()
        .crl_number(crl_number)
        .next_update(OffsetDateTime::now_utc() + Duration::days(7))
        .build()
}

/// Issues a server certificate from a PKCS#10 request that went over the wire.
#[test]
fn issue_server_cert_from_signing_request() -> Result<()> {
    let ca = util::generate_ca_cert();

    let server_key = KeyPair::generate_ecdsa_p256();
    let san = SubjectAltName {
        dns_names: vec!["server.myca.local".to_string()],
        ..Default::default()
    };
    let eku = ExtendedKeyUsage {
        usage: vec![ExtendedKeyUsageOption::ServerAuth],
    };
    let csr = CertificateRequest::builder()
        .subject(util::dn("server.myca.local"))
        .public_key(server_key.public_key_info()?)
        .certificate_extensions(vec![
            Extension::from_extension(&san, false)?,
            Extension::from_extension(&eku, false)?,
        ])
        .build()
        .create_signing_request_pem(&server_key.signature_generator(RsaPadding::default()))?;

    let request = CertificateRequest::load_signing_request_pem(
        &csr,
        HashAlgorithm::Sha256,
        RequestLoadOptions::default(),
        None,
    )?;
    let now = OffsetDateTime::now_utc();
    let server = request.create(&ca, now, now + Duration::days(7), &[0x01])?;

    assert_eq!(server.serial_number(), &[0x01]);
    assert_eq!(server.issuer(), ca.subject());
    assert_eq!(server.subject().common_name()?.as_deref(), Some("server.myca.local"));
    assert_eq!(server.find_extension::<SubjectAltName>()?, Some(san));
    assert_eq!(server.find_extension::<ExtendedKeyUsage>()?, Some(eku));
    assert!(!server.has_private_key());
    server.verify_signed_by(ca.public_key_info())?;

    let reparsed = Certificate::from_pem(&server.to_pem())?;
    assert_eq!(reparsed, server);
    Ok(())
}

/// A self-signed CA carries its key and verifies under its own public key.
#[test]
fn self_signed_ca() -> Result<()> {
    let ca = util::generate_ca_cert();

    assert!(ca.has_private_key());
    assert!(ca.is_self_issued());
    assert_eq!(
        ca.find_extension::<BasicConstraints>()?,
        Some(BasicConstraints {
            is_ca: true,
            max_path_length: None
        })
    );
    ca.verify_signed_by(ca.public_key_info())?;
    Ok(())
}

/// The issued certificate's validity must lie inside the issuer's.
#[test]
fn issued_validity_must_nest_in_issuer() -> Result<()> {
    let ca = util::generate_ca_cert();
    let leaf_key = KeyPair::generate_ecdsa_p256();
    let request = util::leaf_request("leaf.myca.local", &leaf_key);

    let early = request.create(
        &ca,
        ca.not_before() - Duration::seconds(1),
        ca.not_after(),
        &[0x02],
    );
    assert!(matches!(
        early,
        Err(X509Error::InvalidArgument {
            param: "not_before",
            ..
        })
    ));

    let late = request.create(
        &ca,
        ca.not_before(),
        ca.not_after() + Duration::seconds(1),
        &[0x02],
    );
    assert!(matches!(
        late,
        Err(X509Error::InvalidArgument {
            param: "not_after",
            ..
        })
    ));

    // The exact issuer bounds are allowed.
    request.create(&ca, ca.not_before(), ca.not_after(), &[0x02])?;
    Ok(())
}

#[test]
fn issuer_preconditions() -> Result<()> {
    let now = OffsetDateTime::now_utc();
    let leaf_key = KeyPair::generate_ecdsa_p256();
    let request = util::leaf_request("leaf.myca.local", &leaf_key);

    // No private key attached.
    let ca = util::generate_ca_cert();
    let public_only = Certificate::from_der(ca.to_der())?;
    assert!(matches!(
        request.create(&public_only, now, now + Duration::days(1), &[0x03]),
        Err(X509Error::IssuerPreconditionFailed(_))
    ));

    // Not a CA.
    let plain_key = KeyPair::generate_ecdsa_p256();
    let plain = util::leaf_request("plain.myca.local", &plain_key).create_self_signed(
        &plain_key,
        now - Duration::days(1),
        now + Duration::days(1),
    )?;
    assert!(matches!(
        request.create(&plain, now, now + Duration::hours(1), &[0x03]),
        Err(X509Error::IssuerPreconditionFailed(_))
    ));

    // A CA whose key usage allows certificates but not CRLs.
    let cert_only_key = KeyPair::generate_ecdsa_p256();
    let cert_only = CertificateRequest::builder()
        .subject(util::dn("certs-only CA"))
        .public_key(cert_only_key.public_key_info()?)
        .certificate_extensions(util::ca_extensions(
            &cert_only_key,
            KeyUsage(KeyUsages::KeyCertSign.into()),
        ))
        .build()
        .create_self_signed(&cert_only_key, now - Duration::days(1), now + Duration::days(1))?;
    request.create(&cert_only, now, now + Duration::hours(1), &[0x03])?;
    assert!(matches!(
        CertificateRevocationListBuilder::new().build_for_issuer(&cert_only, &crl_params(1)),
        Err(X509Error::IssuerPreconditionFailed(_))
    ));
    Ok(())
}

/// Revocations made against a CA certificate survive an encode and load.
#[test]
fn crl_for_issuer_round_trip() -> Result<()> {
    let ca = util::generate_ca_cert();
    let now = OffsetDateTime::now_utc();
    let leaf_key = KeyPair::generate_ecdsa_p256();
    let leaf = util::leaf_request("leaf.myca.local", &leaf_key).create(
        &ca,
        now,
        now + Duration::days(1),
        &[0x00, 0xFF, 0x10],
    )?;

    let mut builder = CertificateRevocationListBuilder::new();
    builder.add_entry_for_certificate(&leaf, None, Some(RevocationReason::KeyCompromise))?;
    builder.add_entry(&[0x7F], Some(now - Duration::hours(2)), None)?;

    let crl = builder.build_for_issuer(&ca, &crl_params(12))?;
    let (loaded, crl_number) = CertificateRevocationListBuilder::load_pem(&crl_to_pem(&crl))?;
    assert_eq!(crl_number, 12);
    assert_eq!(loaded.entries(), builder.entries());
    assert_eq!(loaded.entries()[0].serial_number(), leaf.serial_number());
    assert_eq!(
        loaded.entries()[0].reason()?,
        Some(RevocationReason::KeyCompromise)
    );
    assert_eq!(loaded.entries()[1].reason()?, None);
    Ok(())
}

#[test]
fn crl_this_update_outside_issuer_validity() -> Result<()> {
    let ca = util::generate_ca_cert();
    let params = CrlBuildParams::builder()
        .crl_number(1)
        .this_update(ca.not_after() + Duration::days(1))
        .next_update(ca.not_after() + Duration::days(8))
        .build();
    assert!(matches!(
        CertificateRevocationListBuilder::new().build_for_issuer(&ca, &params),
        Err(X509Error::InvalidArgument {
            param: "this_update",
            ..
        })
    ));
    Ok(())
}

/// CRLs signed with an explicit generator carry the supplied key identifier.
#[test]
fn empty_crl_with_generator() -> Result<()> {
    let key = KeyPair::generate_ecdsa_p384();
    let crl = CertificateRevocationListBuilder::new().build(
        &util::dn("detached CA"),
        &key.signature_generator(RsaPadding::default()),
        &CrlBuildParams::builder()
            .crl_number(u64::MAX as i128 + 1)
            .next_update(OffsetDateTime::now_utc() + Duration::days(1))
            .hash_algorithm(HashAlgorithm::Sha384)
            .build(),
        &AuthorityKeyIdentifier::from_key_identifier(vec![0x11; 20]),
    )?;

    let (loaded, crl_number) = CertificateRevocationListBuilder::load(&crl)?;
    assert!(loaded.entries().is_empty());
    assert_eq!(crl_number, u64::MAX as i128 + 1);
    Ok(())
}

/// RSA issuers sign with whichever padding the caller asks for.
#[test]
fn rsa_issuer_with_pss() -> Result<()> {
    let key = util::rsa_key();
    let ca = util::generate_ca_cert_with(key, Some(RsaPadding::Pss));
    ca.verify_signed_by(ca.public_key_info())?;

    let now = OffsetDateTime::now_utc();
    let leaf_key = KeyPair::generate_ecdsa_p256();
    let without_padding = util::leaf_request("leaf.myca.local", &leaf_key);
    assert!(matches!(
        without_padding.create(&ca, now, now + Duration::days(1), &[0x04]),
        Err(X509Error::InvalidArgument {
            param: "rsa_padding",
            ..
        })
    ));

    let leaf = CertificateRequest::builder()
        .subject(util::dn("leaf.myca.local"))
        .public_key(leaf_key.public_key_info()?)
        .hash_algorithm(HashAlgorithm::Sha512)
        .rsa_padding(RsaPadding::Pss)
        .build()
        .create(&ca, now, now + Duration::days(1), &[0x04])?;
    leaf.verify_signed_by(ca.public_key_info())?;

    let crl_params = CrlBuildParams::builder()
        .crl_number(1)
        .next_update(now + Duration::days(1))
        .rsa_padding(RsaPadding::Pkcs1v15)
        .build();
    let crl = CertificateRevocationListBuilder::new().build_for_issuer(&ca, &crl_params)?;
    CertificateRevocationListBuilder::load(&crl)?;
    Ok(())
}

/// An RSA-signed request is checked with the algorithm named in the request.
#[test]
fn rsa_signing_request_round_trip() -> Result<()> {
    let key = util::rsa_key();
    for padding in [RsaPadding::Pkcs1v15, RsaPadding::Pss] {
        let der = util::leaf_request("rsa.myca.local", key)
            .create_signing_request(&key.signature_generator(padding))?;
        let loaded = CertificateRequest::load_signing_request(
            &der,
            HashAlgorithm::Sha256,
            RequestLoadOptions::default(),
            Some(padding),
        )?;
        assert_eq!(loaded.public_key(), &key.public_key_info()?);
        assert_eq!(loaded.rsa_padding(), Some(padding));
    }
    Ok(())
}

#[test]
fn duplicate_extension_in_certificate() -> Result<()> {
    let key = KeyPair::generate_ecdsa_p256();
    let bc = Extension::from_extension(&BasicConstraints::default(), true)?;
    let request = CertificateRequest::builder()
        .subject(util::dn("dup.myca.local"))
        .public_key(key.public_key_info()?)
        .certificate_extensions(vec![bc.clone(), bc])
        .build();
    let now = OffsetDateTime::now_utc();
    assert!(matches!(
        request.create_self_signed(&key, now, now + Duration::days(1)),
        Err(X509Error::DuplicateExtension(_))
    ));
    Ok(())
}

#[test]
fn pkcs7_chain_export() -> Result<()> {
    let ca = util::generate_ca_cert();
    let now = OffsetDateTime::now_utc();
    let leaf_key = KeyPair::generate_ecdsa_p256();
    let leaf = util::leaf_request("leaf.myca.local", &leaf_key).create(
        &ca,
        now,
        now + Duration::days(1),
        &[0x05],
    )?;

    let bundle = pkcs7::export_certificates(&[leaf.clone(), ca.clone()])?;
    let imported = pkcs7::import_certificates(&bundle)?;
    assert_eq!(imported.len(), 2);
    assert!(imported.contains(&leaf));
    assert!(imported.contains(&ca));
    Ok(())
}
