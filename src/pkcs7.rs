//! Certs-only PKCS#7 `SignedData` (RFC 2315 degenerate case), the usual way
//! to ship a certificate chain in one blob.

use cms::cert::CertificateChoices;
use cms::content_info::{CmsVersion, ContentInfo};
use cms::signed_data::{CertificateSet, EncapsulatedContentInfo, SignedData, SignerInfos};
use der::asn1::{Any, SetOfVec};
use der::{Decode, Encode};

use crate::cert::Certificate;
use crate::error::{Result, X509Error};
use crate::oids;
use crate::pem_utils;

/// Encodes `certificates` as a `ContentInfo` holding a `SignedData` with no
/// signers and no content.
pub fn export_certificates(certificates: &[Certificate]) -> Result<Vec<u8>> {
    let choices = certificates
        .iter()
        .map(|cert| {
            x509_cert::Certificate::from_der(cert.to_der()).map(CertificateChoices::Certificate)
        })
        .collect::<der::Result<Vec<_>>>()?;
    let certificates = SetOfVec::try_from(choices)
        .map_err(|e| X509Error::invalid_argument("certificates", e.to_string()))?;

    let signed_data = SignedData {
        version: CmsVersion::V1,
        digest_algorithms: SetOfVec::new(),
        encap_content_info: EncapsulatedContentInfo {
            econtent_type: oids::PKCS7_DATA,
            econtent: None,
        },
        certificates: Some(CertificateSet(certificates)),
        crls: None,
        signer_infos: SignerInfos(SetOfVec::new()),
    };
    let content_info = ContentInfo {
        content_type: oids::PKCS7_SIGNED_DATA,
        content: Any::encode_from(&signed_data).map_err(X509Error::encoding)?,
    };
    content_info.to_der().map_err(X509Error::encoding)
}

/// Same as [`export_certificates`], as a `PKCS7` PEM block.
pub fn export_certificates_pem(certificates: &[Certificate]) -> Result<String> {
    Ok(pem_utils::der_to_pem(
        &export_certificates(certificates)?,
        pem_utils::PKCS7_LABEL,
    ))
}

/// Reads the certificates out of a `ContentInfo` holding a `SignedData`.
/// Signer information and non-X.509 certificate choices are ignored.
pub fn import_certificates(der: &[u8]) -> Result<Vec<Certificate>> {
    let content_info = ContentInfo::from_der(der)?;
    if content_info.content_type != oids::PKCS7_SIGNED_DATA {
        return Err(X509Error::UnsupportedAlgorithm(format!(
            "PKCS#7 content {}",
            oids::describe(&content_info.content_type)
        )));
    }
    let signed_data = SignedData::from_der(&content_info.content.to_der()?)?;

    let mut certificates = Vec::new();
    for choice in signed_data.certificates.iter().flat_map(|set| set.0.iter()) {
        match choice {
            CertificateChoices::Certificate(cert) => {
                certificates.push(Certificate::from_der(&cert.to_der()?)?);
            }
            _ => {
                log::trace!("skipping non-X.509 certificate in PKCS#7 bundle");
            }
        }
    }
    Ok(certificates)
}

/// Reads the first `PKCS7` PEM block.
pub fn import_certificates_pem(pem: &str) -> Result<Vec<Certificate>> {
    import_certificates(&pem_utils::pem_to_der(pem, pem_utils::PKCS7_LABEL)?)
}
