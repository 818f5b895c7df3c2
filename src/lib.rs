//! # x509forge - X.509 Requests, Certificates and Revocation Lists in Pure Rust
//!
//! x509forge builds and loads the signed structures of an X.509 PKI on top of the
//! RustCrypto crates: PKCS#10 certificate signing requests, self-signed and
//! CA-issued certificates, and version 2 certificate revocation lists.
//!
//! Every structure is produced the same way: the to-be-signed part is encoded,
//! a [`SignatureGenerator`](signer::SignatureGenerator) signs exactly those bytes,
//! and the result is wrapped with the signature algorithm and signature value.
//! Loading reverses this and checks the signature against the encoded bytes
//! found on the wire.
//!
//! ## Supported Key Types
//!
//! - **RSA**: PKCS#1 v1.5 and RSASSA-PSS signatures
//! - **ECDSA**: P-256 and P-384 curves
//!
//! Digests: SHA-1 (loading only recommended), SHA-256, SHA-384 and SHA-512.
//!
//! ## Quick Start
//!
//! ### Requesting and Issuing a Certificate
//!
//! ```rust,no_run
//! use time::{Duration, OffsetDateTime};
//! use x509forge::cert::extensions::{BasicConstraints, KeyUsage, KeyUsages};
//! use x509forge::cert::params::{DistinguishedName, Extension};
//! use x509forge::cert::request::{CertificateRequest, RequestLoadOptions};
//! use x509forge::key::KeyPair;
//! use x509forge::signer::{HashAlgorithm, RsaPadding};
//!
//! # fn main() -> Result<(), x509forge::error::X509Error> {
//! let now = OffsetDateTime::now_utc();
//!
//! // A self-signed CA
//! let ca_key = KeyPair::generate_ecdsa_p384();
//! let ca = CertificateRequest::builder()
//!     .subject(DistinguishedName::builder().add_common_name("Example CA").build()?)
//!     .public_key(ca_key.public_key_info()?)
//!     .certificate_extensions(vec![
//!         Extension::from_extension(&BasicConstraints { is_ca: true, max_path_length: None }, true)?,
//!         Extension::from_extension(&KeyUsage(KeyUsages::KeyCertSign | KeyUsages::CRLSign), true)?,
//!     ])
//!     .build()
//!     .create_self_signed(&ca_key, now, now + Duration::days(3650))?;
//!
//! // A PKCS#10 request from the server, checked and issued by the CA
//! let server_key = KeyPair::generate_ecdsa_p256();
//! let csr = CertificateRequest::builder()
//!     .subject(DistinguishedName::builder().add_common_name("server.example.com").build()?)
//!     .public_key(server_key.public_key_info()?)
//!     .build()
//!     .create_signing_request(&server_key.signature_generator(RsaPadding::default()))?;
//!
//! let request = CertificateRequest::load_signing_request(
//!     &csr,
//!     HashAlgorithm::Sha384,
//!     RequestLoadOptions::default(),
//!     None,
//! )?;
//! let server = request.create(&ca, now, now + Duration::days(365), &[0x01, 0x02, 0x03])?;
//! println!("{}", server.to_pem());
//! # Ok(())
//! # }
//! ```
//!
//! ### Revoking It
//!
//! ```rust,no_run
//! # use time::{Duration, OffsetDateTime};
//! # use x509forge::cert::Certificate;
//! use x509forge::cert::extensions::RevocationReason;
//! use x509forge::crl::{CertificateRevocationListBuilder, CrlBuildParams, crl_to_pem};
//!
//! # fn revoke(ca: &Certificate, server: &Certificate) -> Result<(), x509forge::error::X509Error> {
//! let mut crl = CertificateRevocationListBuilder::new();
//! crl.add_entry_for_certificate(server, None, Some(RevocationReason::KeyCompromise))?;
//!
//! let params = CrlBuildParams::builder()
//!     .crl_number(1)
//!     .next_update(OffsetDateTime::now_utc() + Duration::days(7))
//!     .build();
//! let der = crl.build_for_issuer(ca, &params)?;
//! println!("{}", crl_to_pem(&der));
//! # Ok(())
//! # }
//! ```
//!
//! ## Error Handling
//!
//! Every operation returns [`error::X509Error`]. Argument problems name the
//! offending parameter and are reported before anything is encoded; malformed
//! input always surfaces as [`InvalidEncoding`](error::X509Error::InvalidEncoding):
//!
//! ```rust
//! use x509forge::crl::CertificateRevocationListBuilder;
//! use x509forge::error::X509Error;
//!
//! match CertificateRevocationListBuilder::load(&[0x30, 0x00]) {
//!     Ok(_) => println!("loaded"),
//!     Err(X509Error::InvalidEncoding(msg)) => println!("not a CRL: {msg}"),
//!     Err(e) => println!("Other error: {e}"),
//! }
//! ```
//!
//! ## Module Organization
//!
//! - [`key`]: Key generation, PKCS#8 import/export and public key info
//! - [`signer`]: Digests, RSA padding modes and the signature generator abstraction
//! - [`verify`]: Signature verification keyed by the algorithm found on the wire
//! - [`cert`]: Certificates, requests, names and typed extensions
//! - [`crl`]: Revocation list building and loading
//! - [`issuer`]: Issuer precondition checks
//! - [`pkcs7`]: Certs-only PKCS#7 export and import
//! - [`asn1`]: Serial numbers, X.509 times and signed-structure framing
//! - [`error`]: Error type

pub mod asn1;
pub mod cert;
pub mod crl;
pub mod error;
pub mod issuer;
pub mod key;
pub mod oids;
pub mod pem_utils;
pub mod pkcs7;
pub mod signer;
pub mod tbs_certificate;
pub mod verify;
