//! DER plumbing shared by the certificate, request and CRL builders.
//!
//! The structures themselves are encoded with `der`/`x509-cert` types; this
//! module holds the pieces those crates leave to the caller: capturing the
//! exact to-be-signed bytes of a signed structure, wrapping raw encodings,
//! and strict validation of caller-provided DER.

pub mod serial;
pub mod time;

use der::asn1::{AnyRef, BitStringRef};
use der::{Decode, Encode, Reader, SliceReader, Tag, Tagged};
use x509_cert::spki::AlgorithmIdentifierOwned;

use crate::error::{Result, X509Error};

pub use self::serial::{canonicalize_serial, validate_serial};
pub(crate) use self::serial::RawSerial;
pub use self::time::X509Time;

/// The DER encoding of `NULL`.
pub(crate) const DER_NULL: [u8; 2] = [0x05, 0x00];

/// A decoded `SEQUENCE { toBeSigned, signatureAlgorithm, signatureValue }`.
///
/// `tbs` borrows the exact encoded bytes from the input; signatures are
/// verified against those bytes, never a re-encoding.
pub(crate) struct SignedEnvelope<'a> {
    pub tbs: &'a [u8],
    pub algorithm: AlgorithmIdentifierOwned,
    pub signature: BitStringRef<'a>,
}

impl<'a> SignedEnvelope<'a> {
    pub fn decode(input: &'a [u8]) -> der::Result<Self> {
        let mut reader = SliceReader::new(input)?;
        let envelope = reader.sequence(|nested| {
            let header = nested.peek_header()?;
            let tbs_len = (header.encoded_len()? + header.length)?;
            let tbs = nested.read_slice(tbs_len)?;
            let algorithm = AlgorithmIdentifierOwned::decode(nested)?;
            let signature = BitStringRef::decode(nested)?;
            Ok(SignedEnvelope {
                tbs,
                algorithm,
                signature,
            })
        })?;
        reader.finish(envelope)
    }

    /// Emits the outer structure around already-encoded `tbs` and
    /// `algorithm` bytes.
    pub fn encode(tbs: &[u8], algorithm: &[u8], signature: &[u8]) -> Result<Vec<u8>> {
        let signature = BitStringRef::from_bytes(signature)
            .and_then(|bits| bits.to_der())
            .map_err(X509Error::encoding)?;
        let mut body = Vec::with_capacity(tbs.len() + algorithm.len() + signature.len());
        body.extend_from_slice(tbs);
        body.extend_from_slice(algorithm);
        body.extend_from_slice(&signature);
        tlv(Tag::Sequence, &body)
    }

    /// Signature bytes, rejecting BIT STRINGs with unused bits.
    pub fn signature_bytes(&self) -> Result<&'a [u8]> {
        self.signature.as_bytes().ok_or_else(|| {
            X509Error::InvalidEncoding("signature BIT STRING has unused bits".to_string())
        })
    }
}

/// Wraps `value` in a tag-length header.
pub(crate) fn tlv(tag: Tag, value: &[u8]) -> Result<Vec<u8>> {
    AnyRef::new(tag, value)
        .and_then(|any| any.to_der())
        .map_err(X509Error::encoding)
}

/// Splits the contents of a constructed value into its child TLVs.
pub(crate) fn children(contents: &[u8]) -> der::Result<Vec<AnyRef<'_>>> {
    let mut reader = SliceReader::new(contents)?;
    let mut out = Vec::new();
    while !reader.is_finished() {
        out.push(AnyRef::decode(&mut reader)?);
    }
    Ok(out)
}

/// Checks that `bytes` is exactly one well-formed DER value, descending into
/// every constructed value.
pub fn validate_der(bytes: &[u8]) -> Result<()> {
    let value = AnyRef::from_der(bytes)?;
    validate_value(value)?;
    Ok(())
}

fn validate_value(value: AnyRef<'_>) -> der::Result<()> {
    if value.tag().is_constructed() {
        for child in children(value.value())? {
            validate_value(child)?;
        }
    }
    Ok(())
}

/// True when the parameters of `algorithm` are absent or an explicit `NULL`.
pub fn has_null_equivalent_parameters(algorithm: &AlgorithmIdentifierOwned) -> bool {
    match &algorithm.parameters {
        None => true,
        Some(params) => params.tag() == Tag::Null && params.value().is_empty(),
    }
}
