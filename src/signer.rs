//! Signature generation: the signer abstraction the builders consume, and its
//! implementation over [`KeyPair`].

use std::fmt;
use std::str::FromStr;

use const_oid::ObjectIdentifier;
use der::asn1::Any;
use der::{Decode, Encode, Sequence};
use p256::ecdsa::signature::hazmat::PrehashSigner;
use rand_core::OsRng;
use rsa::{Pkcs1v15Sign, Pss};
use sha1::Sha1;
use sha2::{Digest, Sha256, Sha384, Sha512};
use x509_cert::spki::AlgorithmIdentifierOwned;

use crate::asn1::{DER_NULL, SignedEnvelope, validate_der};
use crate::error::{Result, X509Error};
use crate::key::{KeyPair, PublicKeyInfo};
use crate::oids;

pub(crate) const P256_FIELD_LEN: usize = 32;
pub(crate) const P384_FIELD_LEN: usize = 48;

/// Digest algorithms usable for signatures.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum HashAlgorithm {
    Sha1,
    #[default]
    Sha256,
    Sha384,
    Sha512,
}

impl HashAlgorithm {
    pub fn name(self) -> &'static str {
        match self {
            HashAlgorithm::Sha1 => "SHA1",
            HashAlgorithm::Sha256 => "SHA256",
            HashAlgorithm::Sha384 => "SHA384",
            HashAlgorithm::Sha512 => "SHA512",
        }
    }

    pub fn oid(self) -> ObjectIdentifier {
        match self {
            HashAlgorithm::Sha1 => oids::SHA1,
            HashAlgorithm::Sha256 => oids::SHA256,
            HashAlgorithm::Sha384 => oids::SHA384,
            HashAlgorithm::Sha512 => oids::SHA512,
        }
    }

    pub fn from_oid(oid: &ObjectIdentifier) -> Option<Self> {
        [
            HashAlgorithm::Sha1,
            HashAlgorithm::Sha256,
            HashAlgorithm::Sha384,
            HashAlgorithm::Sha512,
        ]
        .into_iter()
        .find(|hash| hash.oid() == *oid)
    }

    /// Digest length in bytes.
    pub fn output_len(self) -> usize {
        match self {
            HashAlgorithm::Sha1 => 20,
            HashAlgorithm::Sha256 => 32,
            HashAlgorithm::Sha384 => 48,
            HashAlgorithm::Sha512 => 64,
        }
    }

    pub fn digest(self, data: &[u8]) -> Vec<u8> {
        match self {
            HashAlgorithm::Sha1 => Sha1::digest(data).to_vec(),
            HashAlgorithm::Sha256 => Sha256::digest(data).to_vec(),
            HashAlgorithm::Sha384 => Sha384::digest(data).to_vec(),
            HashAlgorithm::Sha512 => Sha512::digest(data).to_vec(),
        }
    }

    /// Digest of `data` as an ECDSA prehash for a curve with `field_len`
    /// byte scalars. Digests shorter than the field are left-padded with
    /// zeros, which leaves their integer value unchanged.
    pub(crate) fn ecdsa_prehash(self, data: &[u8], field_len: usize) -> Vec<u8> {
        let digest = self.digest(data);
        if digest.len() >= field_len {
            return digest;
        }
        let mut padded = vec![0u8; field_len - digest.len()];
        padded.extend_from_slice(&digest);
        padded
    }

    pub(crate) fn pkcs1v15(self) -> Pkcs1v15Sign {
        match self {
            HashAlgorithm::Sha1 => Pkcs1v15Sign::new::<Sha1>(),
            HashAlgorithm::Sha256 => Pkcs1v15Sign::new::<Sha256>(),
            HashAlgorithm::Sha384 => Pkcs1v15Sign::new::<Sha384>(),
            HashAlgorithm::Sha512 => Pkcs1v15Sign::new::<Sha512>(),
        }
    }

    pub(crate) fn pss_with_salt(self, salt_len: usize) -> Pss {
        match self {
            HashAlgorithm::Sha1 => Pss::new_with_salt::<Sha1>(salt_len),
            HashAlgorithm::Sha256 => Pss::new_with_salt::<Sha256>(salt_len),
            HashAlgorithm::Sha384 => Pss::new_with_salt::<Sha384>(salt_len),
            HashAlgorithm::Sha512 => Pss::new_with_salt::<Sha512>(salt_len),
        }
    }

    /// `AlgorithmIdentifier` for the digest itself, with `NULL` parameters.
    pub(crate) fn algorithm_identifier(self) -> Result<AlgorithmIdentifierOwned> {
        Ok(AlgorithmIdentifierOwned {
            oid: self.oid(),
            parameters: Some(Any::from_der(&DER_NULL)?),
        })
    }
}

impl FromStr for HashAlgorithm {
    type Err = X509Error;

    /// Accepts `SHA256`, `sha-256`, `SHA_256` and the like.
    fn from_str(name: &str) -> Result<Self> {
        if name.trim().is_empty() {
            return Err(X509Error::invalid_argument(
                "hash_algorithm",
                "hash algorithm name must not be empty",
            ));
        }
        let normalized: String = name
            .chars()
            .filter(|c| !matches!(c, '-' | '_' | ' '))
            .collect::<String>()
            .to_ascii_uppercase();
        match normalized.as_str() {
            "SHA1" => Ok(HashAlgorithm::Sha1),
            "SHA256" => Ok(HashAlgorithm::Sha256),
            "SHA384" => Ok(HashAlgorithm::Sha384),
            "SHA512" => Ok(HashAlgorithm::Sha512),
            _ => Err(X509Error::UnsupportedAlgorithm(format!(
                "hash algorithm `{name}`"
            ))),
        }
    }
}

impl fmt::Display for HashAlgorithm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Padding mode for RSA signatures.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum RsaPadding {
    #[default]
    Pkcs1v15,
    /// RSASSA-PSS with MGF1 over the signing hash and a salt as long as the digest.
    Pss,
}

/// `RSASSA-PSS-params` from RFC 4055.
#[derive(Clone, Debug, Default, Sequence)]
pub(crate) struct RsaPssParameters {
    #[asn1(context_specific = "0", tag_mode = "EXPLICIT", optional = "true")]
    pub hash_algorithm: Option<AlgorithmIdentifierOwned>,
    #[asn1(context_specific = "1", tag_mode = "EXPLICIT", optional = "true")]
    pub mask_gen_algorithm: Option<AlgorithmIdentifierOwned>,
    #[asn1(context_specific = "2", tag_mode = "EXPLICIT", optional = "true")]
    pub salt_length: Option<u32>,
    #[asn1(context_specific = "3", tag_mode = "EXPLICIT", optional = "true")]
    pub trailer_field: Option<u32>,
}

impl RsaPssParameters {
    /// Parameters for `hash`, leaving DEFAULT values out as DER requires.
    pub fn for_hash(hash: HashAlgorithm) -> Result<Self> {
        if hash == HashAlgorithm::Sha1 {
            return Ok(Self::default());
        }
        let hash_id = hash.algorithm_identifier()?;
        let mgf = AlgorithmIdentifierOwned {
            oid: oids::MGF1,
            parameters: Some(Any::from_der(&hash_id.to_der()?)?),
        };
        Ok(Self {
            hash_algorithm: Some(hash_id),
            mask_gen_algorithm: Some(mgf),
            salt_length: Some(hash.output_len() as u32),
            trailer_field: None,
        })
    }

    pub fn hash(&self) -> Result<HashAlgorithm> {
        match &self.hash_algorithm {
            None => Ok(HashAlgorithm::Sha1),
            Some(id) => HashAlgorithm::from_oid(&id.oid)
                .ok_or_else(|| X509Error::UnsupportedAlgorithm(oids::describe(&id.oid))),
        }
    }

    /// Digest used by MGF1; other mask generation functions are unsupported.
    pub fn mgf1_hash(&self) -> Result<HashAlgorithm> {
        let Some(mgf) = &self.mask_gen_algorithm else {
            return Ok(HashAlgorithm::Sha1);
        };
        if mgf.oid != oids::MGF1 {
            return Err(X509Error::UnsupportedAlgorithm(oids::describe(&mgf.oid)));
        }
        let params = mgf.parameters.as_ref().ok_or_else(|| {
            X509Error::InvalidEncoding("MGF1 parameters are missing".to_string())
        })?;
        let inner = AlgorithmIdentifierOwned::from_der(&params.to_der()?)?;
        HashAlgorithm::from_oid(&inner.oid)
            .ok_or_else(|| X509Error::UnsupportedAlgorithm(oids::describe(&inner.oid)))
    }

    pub fn salt_length(&self) -> usize {
        self.salt_length.unwrap_or(20) as usize
    }
}

/// Produces signatures for the certificate, request and CRL builders.
///
/// Implementations decide the signature scheme; the builders only ask for
/// the `AlgorithmIdentifier` to embed and a signature over the exact bytes
/// they encoded.
pub trait SignatureGenerator {
    /// The public half of the signing key.
    fn public_key(&self) -> Result<PublicKeyInfo>;

    /// DER of the `AlgorithmIdentifier` describing signatures made with `hash`.
    fn signature_algorithm_identifier(&self, hash: HashAlgorithm) -> Result<Vec<u8>>;

    /// Signs `data` using `hash`.
    fn sign_data(&self, data: &[u8], hash: HashAlgorithm) -> Result<Vec<u8>>;
}

/// [`SignatureGenerator`] over a local [`KeyPair`].
#[derive(Clone, Copy, Debug)]
pub struct KeySigner<'a> {
    key: &'a KeyPair,
    padding: RsaPadding,
}

impl<'a> KeySigner<'a> {
    pub fn new(key: &'a KeyPair, padding: RsaPadding) -> Self {
        Self { key, padding }
    }
}

impl SignatureGenerator for KeySigner<'_> {
    fn public_key(&self) -> Result<PublicKeyInfo> {
        self.key.public_key_info()
    }

    fn signature_algorithm_identifier(&self, hash: HashAlgorithm) -> Result<Vec<u8>> {
        let identifier = match (self.key, self.padding) {
            (KeyPair::Rsa { .. }, RsaPadding::Pkcs1v15) => AlgorithmIdentifierOwned {
                oid: match hash {
                    HashAlgorithm::Sha1 => oids::SHA1_WITH_RSA,
                    HashAlgorithm::Sha256 => oids::SHA256_WITH_RSA,
                    HashAlgorithm::Sha384 => oids::SHA384_WITH_RSA,
                    HashAlgorithm::Sha512 => oids::SHA512_WITH_RSA,
                },
                parameters: Some(Any::from_der(&DER_NULL)?),
            },
            (KeyPair::Rsa { .. }, RsaPadding::Pss) => AlgorithmIdentifierOwned {
                oid: oids::RSASSA_PSS,
                parameters: Some(Any::from_der(
                    &RsaPssParameters::for_hash(hash)?.to_der()?,
                )?),
            },
            (KeyPair::EcdsaP256 { .. } | KeyPair::EcdsaP384 { .. }, _) => {
                AlgorithmIdentifierOwned {
                    oid: match hash {
                        HashAlgorithm::Sha1 => oids::ECDSA_WITH_SHA1,
                        HashAlgorithm::Sha256 => oids::ECDSA_WITH_SHA256,
                        HashAlgorithm::Sha384 => oids::ECDSA_WITH_SHA384,
                        HashAlgorithm::Sha512 => oids::ECDSA_WITH_SHA512,
                    },
                    parameters: None,
                }
            }
        };
        identifier.to_der().map_err(X509Error::encoding)
    }

    fn sign_data(&self, data: &[u8], hash: HashAlgorithm) -> Result<Vec<u8>> {
        match self.key {
            KeyPair::Rsa { private, .. } => {
                let digest = hash.digest(data);
                match self.padding {
                    RsaPadding::Pkcs1v15 => Ok(private.sign(hash.pkcs1v15(), &digest)?),
                    RsaPadding::Pss => Ok(private.sign_with_rng(
                        &mut OsRng,
                        hash.pss_with_salt(hash.output_len()),
                        &digest,
                    )?),
                }
            }
            KeyPair::EcdsaP256 { signing_key, .. } => {
                let signature: p256::ecdsa::Signature = signing_key
                    .sign_prehash(&hash.ecdsa_prehash(data, P256_FIELD_LEN))
                    .map_err(|e| X509Error::KeyError(e.to_string()))?;
                Ok(signature.to_der().as_bytes().to_vec())
            }
            KeyPair::EcdsaP384 { signing_key, .. } => {
                let signature: p384::ecdsa::Signature = signing_key
                    .sign_prehash(&hash.ecdsa_prehash(data, P384_FIELD_LEN))
                    .map_err(|e| X509Error::KeyError(e.to_string()))?;
                Ok(signature.to_der().as_bytes().to_vec())
            }
        }
    }
}

/// Asks `signer` for its algorithm identifier and checks that it, and any
/// parameters it carries, are well-formed DER.
pub(crate) fn checked_algorithm_identifier(
    signer: &dyn SignatureGenerator,
    hash: HashAlgorithm,
) -> Result<Vec<u8>> {
    let encoded = signer.signature_algorithm_identifier(hash)?;
    let identifier = AlgorithmIdentifierOwned::from_der(&encoded).map_err(|e| {
        X509Error::InvalidEncoding(format!("signer returned a bad algorithm identifier: {e}"))
    })?;
    if let Some(params) = &identifier.parameters {
        validate_der(&params.to_der()?)?;
    }
    Ok(encoded)
}

/// Signs the exact `tbs` bytes and emits the signed envelope.
pub(crate) fn sign_and_wrap(
    signer: &dyn SignatureGenerator,
    hash: HashAlgorithm,
    tbs: &[u8],
    algorithm: &[u8],
) -> Result<Vec<u8>> {
    let signature = signer.sign_data(tbs, hash)?;
    SignedEnvelope::encode(tbs, algorithm, &signature)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hash_algorithm_from_name() {
        assert_eq!("SHA256".parse::<HashAlgorithm>().unwrap(), HashAlgorithm::Sha256);
        assert_eq!("sha-384".parse::<HashAlgorithm>().unwrap(), HashAlgorithm::Sha384);
        assert_eq!("Sha_512".parse::<HashAlgorithm>().unwrap(), HashAlgorithm::Sha512);
        assert!(matches!(
            "".parse::<HashAlgorithm>(),
            Err(X509Error::InvalidArgument {
                param: "hash_algorithm",
                ..
            })
        ));
        assert!(matches!(
            "MD5".parse::<HashAlgorithm>(),
            Err(X509Error::UnsupportedAlgorithm(_))
        ));
    }

    #[test]
    fn test_pss_parameters_round_trip() {
        let params = RsaPssParameters::for_hash(HashAlgorithm::Sha384).unwrap();
        let der = params.to_der().unwrap();
        let decoded = RsaPssParameters::from_der(&der).unwrap();
        assert_eq!(decoded.hash().unwrap(), HashAlgorithm::Sha384);
        assert_eq!(decoded.mgf1_hash().unwrap(), HashAlgorithm::Sha384);
        assert_eq!(decoded.salt_length(), 48);
    }

    #[test]
    fn test_pss_sha1_parameters_are_all_defaults() {
        let der = RsaPssParameters::for_hash(HashAlgorithm::Sha1)
            .unwrap()
            .to_der()
            .unwrap();
        assert_eq!(der, vec![0x30, 0x00]);
        let decoded = RsaPssParameters::from_der(&der).unwrap();
        assert_eq!(decoded.hash().unwrap(), HashAlgorithm::Sha1);
        assert_eq!(decoded.salt_length(), 20);
    }

    #[test]
    fn test_ecdsa_identifier_has_no_parameters() {
        let key = KeyPair::generate_ecdsa_p256();
        let signer = key.signature_generator(RsaPadding::Pss);
        let der = checked_algorithm_identifier(&signer, HashAlgorithm::Sha256).unwrap();
        let identifier = AlgorithmIdentifierOwned::from_der(&der).unwrap();
        assert_eq!(identifier.oid, oids::ECDSA_WITH_SHA256);
        assert!(identifier.parameters.is_none());
    }

    struct BrokenSigner;

    impl SignatureGenerator for BrokenSigner {
        fn public_key(&self) -> Result<PublicKeyInfo> {
            KeyPair::generate_ecdsa_p256().public_key_info()
        }

        fn signature_algorithm_identifier(&self, _hash: HashAlgorithm) -> Result<Vec<u8>> {
            // SEQUENCE { OID ecdsa-with-SHA256, SEQUENCE { INTEGER (length overruns) } }
            let mut der = vec![0x30, 0x10, 0x06, 0x08];
            der.extend_from_slice(&[0x2A, 0x86, 0x48, 0xCE, 0x3D, 0x04, 0x03, 0x02]);
            der.extend_from_slice(&[0x30, 0x04, 0x02, 0x05, 0x00, 0x00]);
            Ok(der)
        }

        fn sign_data(&self, _data: &[u8], _hash: HashAlgorithm) -> Result<Vec<u8>> {
            Ok(vec![0; 8])
        }
    }

    #[test]
    fn test_malformed_algorithm_parameters_are_rejected() {
        assert!(matches!(
            checked_algorithm_identifier(&BrokenSigner, HashAlgorithm::Sha256),
            Err(X509Error::InvalidEncoding(_))
        ));
    }
}
