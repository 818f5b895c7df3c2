use crate::error::{Result, X509Error};

pub const CERTIFICATE_LABEL: &str = "CERTIFICATE";
pub const CERTIFICATE_REQUEST_LABEL: &str = "CERTIFICATE REQUEST";
pub const CRL_LABEL: &str = "X509 CRL";
pub const PKCS7_LABEL: &str = "PKCS7";
pub const PRIVATE_KEY_LABEL: &str = "PRIVATE KEY";

/// Convert DER‑encoded data into a PEM‑encoded string with the provided label.
pub fn der_to_pem(der: &[u8], label: &str) -> String {
    let pem = pem::Pem::new(label, der);
    pem::encode_config(
        &pem,
        pem::EncodeConfig::new().set_line_ending(pem::LineEnding::LF),
    )
}

/// Returns the contents of the first PEM block labelled `label`.
///
/// Blocks with other labels are skipped, so a bundle holding a key and a
/// certificate can be fed to either loader.
pub fn pem_to_der(pem_str: &str, label: &str) -> Result<Vec<u8>> {
    pem::parse_many(pem_str)?
        .into_iter()
        .find(|block| block.tag() == label)
        .map(|block| block.into_contents())
        .ok_or_else(|| X509Error::InvalidEncoding(format!("no PEM block labelled `{label}`")))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pem_round_trip_with_label() {
        let pem = der_to_pem(&[0x30, 0x00], CRL_LABEL);
        assert!(pem.starts_with("-----BEGIN X509 CRL-----\n"));
        assert_eq!(pem_to_der(&pem, CRL_LABEL).unwrap(), vec![0x30, 0x00]);
    }

    #[test]
    fn test_pem_skips_other_labels() {
        let bundle = format!(
            "{}{}",
            der_to_pem(&[0x05, 0x00], PRIVATE_KEY_LABEL),
            der_to_pem(&[0x30, 0x00], CERTIFICATE_LABEL)
        );
        assert_eq!(
            pem_to_der(&bundle, CERTIFICATE_LABEL).unwrap(),
            vec![0x30, 0x00]
        );
        assert!(matches!(
            pem_to_der(&bundle, CRL_LABEL),
            Err(X509Error::InvalidEncoding(_))
        ));
    }
}
