//! Certificate revocation list construction and loading.

pub mod entry;

use bon::Builder;
use der::{Decode, Encode, Sequence};
use time::OffsetDateTime;
use x509_cert::name::Name;
use x509_cert::spki::AlgorithmIdentifierOwned;

use crate::asn1::time::truncate_to_seconds;
use crate::asn1::{SignedEnvelope, X509Time, validate_serial};
use crate::cert::Certificate;
use crate::cert::extensions::{
    AuthorityKeyIdentifier, CrlDistributionPoints, CrlNumber, RevocationReason,
    ToAndFromX509Extension,
};
use crate::cert::params::{DistinguishedName, Extension};
use crate::error::{Result, X509Error};
use crate::issuer::{Issuer, IssuerPurpose};
use crate::pem_utils;
use crate::signer::{
    HashAlgorithm, RsaPadding, SignatureGenerator, checked_algorithm_identifier, sign_and_wrap,
};
use entry::{RevokedCertificateEntry, RevokedCertificateInner};

/// `TBSCertList` (RFC 5280 section 5.1).
#[derive(Clone, Debug, Sequence)]
pub(crate) struct TbsCertListInner {
    pub version: Option<i64>,
    pub signature: AlgorithmIdentifierOwned,
    pub issuer: Name,
    pub this_update: X509Time,
    pub next_update: Option<X509Time>,
    pub revoked_certificates: Option<Vec<RevokedCertificateInner>>,
    #[asn1(context_specific = "0", tag_mode = "EXPLICIT", optional = "true")]
    pub crl_extensions: Option<Vec<x509_cert::ext::Extension>>,
}

const CRL_V2: i64 = 1;

/// Parameters for [`CertificateRevocationListBuilder::build`].
#[derive(Clone, Debug, Builder)]
pub struct CrlBuildParams {
    /// Must not be negative.
    pub crl_number: i128,
    /// Defaults to the current time.
    pub this_update: Option<OffsetDateTime>,
    /// Must be later than `this_update`.
    pub next_update: OffsetDateTime,
    #[builder(default)]
    pub hash_algorithm: HashAlgorithm,
    /// Required when an issuer certificate with an RSA key signs the list.
    pub rsa_padding: Option<RsaPadding>,
}

/// Accumulates revoked certificates and signs them into a version 2 CRL.
///
/// Entries keep their insertion order. The same serial number may be added
/// more than once and each addition is emitted.
///
/// # Example
/// ```rust,no_run
/// use time::{Duration, OffsetDateTime};
/// use x509forge::cert::extensions::{AuthorityKeyIdentifier, RevocationReason};
/// use x509forge::cert::params::DistinguishedName;
/// use x509forge::crl::{CertificateRevocationListBuilder, CrlBuildParams};
/// use x509forge::key::KeyPair;
/// use x509forge::signer::RsaPadding;
///
/// # fn main() -> Result<(), x509forge::error::X509Error> {
/// let key = KeyPair::generate_ecdsa_p256();
/// let mut builder = CertificateRevocationListBuilder::new();
/// builder.add_entry(&[0x01, 0x02], None, Some(RevocationReason::KeyCompromise))?;
///
/// let params = CrlBuildParams::builder()
///     .crl_number(1)
///     .next_update(OffsetDateTime::now_utc() + Duration::days(7))
///     .build();
/// let crl = builder.build(
///     &DistinguishedName::parse("CN=Example CA")?,
///     &key.signature_generator(RsaPadding::default()),
///     &params,
///     &AuthorityKeyIdentifier::from_key_identifier(vec![1, 2, 3]),
/// )?;
/// # Ok(())
/// # }
/// ```
#[derive(Clone, Debug, Default)]
pub struct CertificateRevocationListBuilder {
    entries: Vec<RevokedCertificateEntry>,
}

impl CertificateRevocationListBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn entries(&self) -> &[RevokedCertificateEntry] {
        &self.entries
    }

    /// Adds a revoked serial number.
    ///
    /// `serial_number` must be a minimal two's-complement encoding. The
    /// revocation time defaults to now and is kept to whole seconds.
    pub fn add_entry(
        &mut self,
        serial_number: &[u8],
        revocation_time: Option<OffsetDateTime>,
        reason: Option<RevocationReason>,
    ) -> Result<()> {
        validate_serial(serial_number)?;
        let revocation_time = revocation_time.unwrap_or_else(OffsetDateTime::now_utc);
        self.entries.push(RevokedCertificateEntry::new(
            serial_number,
            revocation_time,
            reason,
        )?);
        Ok(())
    }

    /// Adds `certificate`'s serial number.
    pub fn add_entry_for_certificate(
        &mut self,
        certificate: &Certificate,
        revocation_time: Option<OffsetDateTime>,
        reason: Option<RevocationReason>,
    ) -> Result<()> {
        self.add_entry(certificate.serial_number(), revocation_time, reason)
    }

    /// Removes the most recently added entry for `serial_number`.
    ///
    /// Returns `false` when no entry matches.
    pub fn remove_entry(&mut self, serial_number: &[u8]) -> bool {
        match self
            .entries
            .iter()
            .rposition(|entry| entry.serial_number() == serial_number)
        {
            Some(index) => {
                self.entries.remove(index);
                true
            }
            None => false,
        }
    }

    /// Loads the entries of an encoded CRL, returning them with the CRL's
    /// number (zero when the CRL has none).
    ///
    /// The CRL's signature is not checked.
    pub fn load(crl: &[u8]) -> Result<(Self, i128)> {
        let envelope = SignedEnvelope::decode(crl)?;
        let tbs = TbsCertListInner::from_der(envelope.tbs)?;

        let is_v2 = match tbs.version {
            None | Some(0) => false,
            Some(CRL_V2) => true,
            Some(other) => return Err(X509Error::UnsupportedVersion(other)),
        };

        let mut entries = Vec::new();
        for revoked in tbs.revoked_certificates.unwrap_or_default() {
            if !is_v2 && revoked.crl_entry_extensions.is_some() {
                return Err(X509Error::InvalidEncoding(
                    "version 1 CRL entries cannot carry extensions".to_string(),
                ));
            }
            entries.push(RevokedCertificateEntry::from_inner(revoked)?);
        }

        let mut crl_number = 0;
        if let Some(extensions) = &tbs.crl_extensions {
            if !is_v2 {
                return Err(X509Error::InvalidEncoding(
                    "version 1 CRLs cannot carry extensions".to_string(),
                ));
            }
            if let Some(ext) = extensions.iter().find(|ext| ext.extn_id == CrlNumber::OID) {
                crl_number = CrlNumber::from_x509_extension_value(ext.extn_value.as_bytes())?.0;
            }
        }

        log::debug!("loaded CRL number {crl_number} with {} entries", entries.len());
        Ok((Self { entries }, crl_number))
    }

    /// Loads the first `X509 CRL` block of a PEM document.
    pub fn load_pem(pem: &str) -> Result<(Self, i128)> {
        Self::load(&pem_utils::pem_to_der(pem, pem_utils::CRL_LABEL)?)
    }

    /// Signs the current entries into a DER-encoded version 2 CRL.
    ///
    /// The list carries exactly two extensions, the Authority Key Identifier
    /// followed by the CRL Number. The revoked certificates field is left out
    /// when there are no entries.
    pub fn build(
        &self,
        issuer_name: &DistinguishedName,
        signer: &dyn SignatureGenerator,
        params: &CrlBuildParams,
        authority_key_identifier: &AuthorityKeyIdentifier,
    ) -> Result<Vec<u8>> {
        let this_update = params.this_update.unwrap_or_else(OffsetDateTime::now_utc);
        check_update_window(this_update, params.next_update)?;
        if params.crl_number < 0 {
            return Err(X509Error::invalid_argument(
                "crl_number",
                "CRL number must not be negative",
            ));
        }

        let algorithm = checked_algorithm_identifier(signer, params.hash_algorithm)?;
        let crl_extensions = vec![
            Extension::from_extension(authority_key_identifier, false)?.to_x509()?,
            Extension::from_extension(&CrlNumber(params.crl_number), false)?.to_x509()?,
        ];
        let revoked = self
            .entries
            .iter()
            .map(RevokedCertificateEntry::to_inner)
            .collect::<Result<Vec<_>>>()?;

        let tbs = TbsCertListInner {
            version: Some(CRL_V2),
            signature: AlgorithmIdentifierOwned::from_der(&algorithm)?,
            issuer: issuer_name.as_x509_name()?,
            this_update: X509Time::new(this_update),
            next_update: Some(X509Time::new(params.next_update)),
            revoked_certificates: (!revoked.is_empty()).then_some(revoked),
            crl_extensions: Some(crl_extensions),
        }
        .to_der()
        .map_err(X509Error::encoding)?;

        log::debug!(
            "signing CRL number {} for `{issuer_name}` with {} entries",
            params.crl_number,
            self.entries.len()
        );
        sign_and_wrap(signer, params.hash_algorithm, &tbs, &algorithm)
    }

    /// Signs the current entries with `issuer`'s private key.
    ///
    /// The issuer must be a CA permitted to sign CRLs and `this_update` must
    /// fall within its validity period. The Authority Key Identifier is taken
    /// from the issuer certificate.
    pub fn build_for_issuer(&self, issuer: &Certificate, params: &CrlBuildParams) -> Result<Vec<u8>> {
        let this_update = truncate_to_seconds(
            params.this_update.unwrap_or_else(OffsetDateTime::now_utc),
        );
        check_update_window(this_update, params.next_update)?;
        let key = issuer.authorize(IssuerPurpose::Crls)?;
        if this_update < issuer.not_before() || this_update > issuer.not_after() {
            return Err(X509Error::invalid_argument(
                "this_update",
                "thisUpdate must fall within the issuer's validity period",
            ));
        }

        let padding = match (key.is_rsa(), params.rsa_padding) {
            (true, None) => {
                return Err(X509Error::invalid_argument(
                    "rsa_padding",
                    "an RSA issuer key requires a padding mode",
                ));
            }
            (_, padding) => padding.unwrap_or_default(),
        };
        let aki = AuthorityKeyIdentifier::from_certificate(issuer)?;
        let params = CrlBuildParams {
            this_update: Some(this_update),
            ..params.clone()
        };

        self.build(
            issuer.issuer_name(),
            &key.signature_generator(padding),
            &params,
            &aki,
        )
    }

    /// Builds a CRL Distribution Points extension with one distribution point
    /// listing every URI.
    pub fn build_crl_distribution_point_extension<S: AsRef<str>>(
        uris: &[S],
        critical: bool,
    ) -> Result<Extension> {
        let cdp = CrlDistributionPoints {
            uris: uris.iter().map(|uri| uri.as_ref().to_string()).collect(),
        };
        Extension::from_extension(&cdp, critical)
    }
}

fn check_update_window(this_update: OffsetDateTime, next_update: OffsetDateTime) -> Result<()> {
    if next_update <= this_update {
        return Err(X509Error::invalid_argument(
            "next_update",
            "nextUpdate must be later than thisUpdate",
        ));
    }
    Ok(())
}

/// PEM-encodes a DER CRL with the `X509 CRL` label.
pub fn crl_to_pem(crl: &[u8]) -> String {
    pem_utils::der_to_pem(crl, pem_utils::CRL_LABEL)
}
