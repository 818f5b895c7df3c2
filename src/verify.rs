//! Signature verification for loaded structures.
//!
//! The algorithm is taken from the `AlgorithmIdentifier` found on the wire,
//! never from what the caller intends to use afterwards.

use der::{Decode, Encode};
use p256::ecdsa::signature::hazmat::PrehashVerifier;
use rsa::RsaPublicKey;
use rsa::pkcs1::DecodeRsaPublicKey;
use x509_cert::spki::AlgorithmIdentifierOwned;

use crate::asn1::has_null_equivalent_parameters;
use crate::error::{Result, X509Error};
use crate::key::PublicKeyInfo;
use crate::oids;
use crate::signer::{HashAlgorithm, P256_FIELD_LEN, P384_FIELD_LEN, RsaPssParameters};

/// Signature scheme resolved from a signature `AlgorithmIdentifier`.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Scheme {
    RsaPkcs1v15(HashAlgorithm),
    RsaPss { hash: HashAlgorithm, salt_len: usize },
    Ecdsa(HashAlgorithm),
}

const RSA_PKCS1_TABLE: [(const_oid::ObjectIdentifier, HashAlgorithm); 4] = [
    (oids::SHA1_WITH_RSA, HashAlgorithm::Sha1),
    (oids::SHA256_WITH_RSA, HashAlgorithm::Sha256),
    (oids::SHA384_WITH_RSA, HashAlgorithm::Sha384),
    (oids::SHA512_WITH_RSA, HashAlgorithm::Sha512),
];

const ECDSA_TABLE: [(const_oid::ObjectIdentifier, HashAlgorithm); 4] = [
    (oids::ECDSA_WITH_SHA1, HashAlgorithm::Sha1),
    (oids::ECDSA_WITH_SHA256, HashAlgorithm::Sha256),
    (oids::ECDSA_WITH_SHA384, HashAlgorithm::Sha384),
    (oids::ECDSA_WITH_SHA512, HashAlgorithm::Sha512),
];

fn lookup(
    table: &[(const_oid::ObjectIdentifier, HashAlgorithm)],
    oid: &const_oid::ObjectIdentifier,
) -> Option<HashAlgorithm> {
    table
        .iter()
        .find(|(candidate, _)| candidate == oid)
        .map(|(_, hash)| *hash)
}

fn resolve_scheme(algorithm: &AlgorithmIdentifierOwned) -> Result<Scheme> {
    if algorithm.oid == oids::RSASSA_PSS {
        let params = algorithm.parameters.as_ref().ok_or_else(|| {
            X509Error::InvalidEncoding("RSASSA-PSS parameters are missing".to_string())
        })?;
        let params = RsaPssParameters::from_der(&params.to_der()?)?;
        let hash = params.hash()?;
        if params.mgf1_hash()? != hash {
            return Err(X509Error::UnsupportedAlgorithm(
                "RSASSA-PSS with an MGF1 digest different from the message digest".to_string(),
            ));
        }
        if params.trailer_field.is_some_and(|trailer| trailer != 1) {
            return Err(X509Error::UnsupportedAlgorithm(
                "RSASSA-PSS trailer field other than 1".to_string(),
            ));
        }
        return Ok(Scheme::RsaPss {
            hash,
            salt_len: params.salt_length(),
        });
    }

    let scheme = if let Some(hash) = lookup(&RSA_PKCS1_TABLE, &algorithm.oid) {
        Scheme::RsaPkcs1v15(hash)
    } else if let Some(hash) = lookup(&ECDSA_TABLE, &algorithm.oid) {
        Scheme::Ecdsa(hash)
    } else {
        return Err(X509Error::UnsupportedAlgorithm(oids::describe(&algorithm.oid)));
    };

    if !has_null_equivalent_parameters(algorithm) {
        log::debug!(
            "rejecting {} signature with unexpected algorithm parameters",
            oids::describe(&algorithm.oid)
        );
        return Err(X509Error::VerificationFailed);
    }
    Ok(scheme)
}

/// Verifies `signature` over the exact `data` bytes with `public_key`.
///
/// Unknown algorithms are [`X509Error::UnsupportedAlgorithm`]; a signature
/// that does not match, or a key of the wrong family, is
/// [`X509Error::VerificationFailed`].
pub fn verify_signature(
    public_key: &PublicKeyInfo,
    algorithm: &AlgorithmIdentifierOwned,
    data: &[u8],
    signature: &[u8],
) -> Result<()> {
    let scheme = resolve_scheme(algorithm)?;
    let verified = match scheme {
        Scheme::RsaPkcs1v15(hash) => {
            let key = rsa_key(public_key)?;
            key.verify(hash.pkcs1v15(), &hash.digest(data), signature)
                .is_ok()
        }
        Scheme::RsaPss { hash, salt_len } => {
            let key = rsa_key(public_key)?;
            key.verify(hash.pss_with_salt(salt_len), &hash.digest(data), signature)
                .is_ok()
        }
        Scheme::Ecdsa(hash) => verify_ecdsa(public_key, hash, data, signature)?,
    };

    if verified {
        Ok(())
    } else {
        Err(X509Error::VerificationFailed)
    }
}

fn rsa_key(public_key: &PublicKeyInfo) -> Result<RsaPublicKey> {
    if public_key.algorithm != oids::RSA_ENCRYPTION && public_key.algorithm != oids::RSASSA_PSS {
        return Err(X509Error::VerificationFailed);
    }
    RsaPublicKey::from_pkcs1_der(&public_key.key).map_err(|e| {
        X509Error::InvalidEncoding(format!("RSA public key: {e}"))
    })
}

fn verify_ecdsa(
    public_key: &PublicKeyInfo,
    hash: HashAlgorithm,
    data: &[u8],
    signature: &[u8],
) -> Result<bool> {
    if public_key.algorithm != oids::EC_PUBLIC_KEY {
        return Err(X509Error::VerificationFailed);
    }
    match public_key.curve() {
        Some(curve) if curve == oids::SECP256R1 => {
            let key = p256::ecdsa::VerifyingKey::from_sec1_bytes(&public_key.key)
                .map_err(|_| X509Error::InvalidEncoding("P-256 public key".to_string()))?;
            let Ok(signature) = p256::ecdsa::Signature::from_der(signature) else {
                return Ok(false);
            };
            let prehash = hash.ecdsa_prehash(data, P256_FIELD_LEN);
            Ok(key.verify_prehash(&prehash, &signature).is_ok())
        }
        Some(curve) if curve == oids::SECP384R1 => {
            let key = p384::ecdsa::VerifyingKey::from_sec1_bytes(&public_key.key)
                .map_err(|_| X509Error::InvalidEncoding("P-384 public key".to_string()))?;
            let Ok(signature) = p384::ecdsa::Signature::from_der(signature) else {
                return Ok(false);
            };
            let prehash = hash.ecdsa_prehash(data, P384_FIELD_LEN);
            Ok(key.verify_prehash(&prehash, &signature).is_ok())
        }
        Some(curve) => Err(X509Error::UnsupportedAlgorithm(format!(
            "elliptic curve {}",
            oids::describe(&curve)
        ))),
        None => Err(X509Error::InvalidEncoding(
            "EC public key without a named curve".to_string(),
        )),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::key::KeyPair;
    use crate::signer::{RsaPadding, SignatureGenerator};
    use der::asn1::Any;
    use p256::ecdsa::signature::hazmat::PrehashSigner;

    fn algorithm_of(signer: &dyn SignatureGenerator, hash: HashAlgorithm) -> AlgorithmIdentifierOwned {
        AlgorithmIdentifierOwned::from_der(&signer.signature_algorithm_identifier(hash).unwrap())
            .unwrap()
    }

    #[test]
    fn test_ecdsa_sign_and_verify_each_hash() {
        for key in [KeyPair::generate_ecdsa_p256(), KeyPair::generate_ecdsa_p384()] {
            let signer = key.signature_generator(RsaPadding::default());
            let public_key = key.public_key_info().unwrap();
            for hash in [
                HashAlgorithm::Sha1,
                HashAlgorithm::Sha256,
                HashAlgorithm::Sha384,
                HashAlgorithm::Sha512,
            ] {
                let signature = signer.sign_data(b"payload", hash).unwrap();
                let algorithm = algorithm_of(&signer, hash);
                verify_signature(&public_key, &algorithm, b"payload", &signature).unwrap();
                assert_eq!(
                    verify_signature(&public_key, &algorithm, b"tampered", &signature),
                    Err(X509Error::VerificationFailed)
                );
            }
        }
    }

    #[test]
    fn test_p384_sha1_matches_zero_padded_prehash() {
        let key = KeyPair::generate_ecdsa_p384();
        let KeyPair::EcdsaP384 { signing_key, .. } = &key else {
            unreachable!()
        };
        let mut prehash = vec![0u8; 28];
        prehash.extend_from_slice(&HashAlgorithm::Sha1.digest(b"payload"));
        let signature: p384::ecdsa::Signature = signing_key.sign_prehash(&prehash).unwrap();

        let algorithm = AlgorithmIdentifierOwned {
            oid: oids::ECDSA_WITH_SHA1,
            parameters: None,
        };
        verify_signature(
            &key.public_key_info().unwrap(),
            &algorithm,
            b"payload",
            signature.to_der().as_bytes(),
        )
        .unwrap();
    }

    #[test]
    fn test_unexpected_parameters_fail_verification() {
        let key = KeyPair::generate_ecdsa_p256();
        let signer = key.signature_generator(RsaPadding::default());
        let signature = signer.sign_data(b"payload", HashAlgorithm::Sha256).unwrap();
        let mut algorithm = algorithm_of(&signer, HashAlgorithm::Sha256);
        algorithm.parameters = Some(Any::from_der(&[0x02, 0x01, 0x05]).unwrap());

        assert_eq!(
            verify_signature(
                &key.public_key_info().unwrap(),
                &algorithm,
                b"payload",
                &signature
            ),
            Err(X509Error::VerificationFailed)
        );
    }

    #[test]
    fn test_rsa_parameter_rules() {
        let key = KeyPair::generate_rsa(1024).unwrap();
        let public_key = key.public_key_info().unwrap();

        let pss = key.signature_generator(RsaPadding::Pss);
        let signature = pss.sign_data(b"payload", HashAlgorithm::Sha256).unwrap();
        let mut algorithm = algorithm_of(&pss, HashAlgorithm::Sha256);
        verify_signature(&public_key, &algorithm, b"payload", &signature).unwrap();
        algorithm.parameters = None;
        assert!(matches!(
            verify_signature(&public_key, &algorithm, b"payload", &signature),
            Err(X509Error::InvalidEncoding(_))
        ));

        let pkcs1 = key.signature_generator(RsaPadding::Pkcs1v15);
        let signature = pkcs1.sign_data(b"payload", HashAlgorithm::Sha256).unwrap();
        let mut algorithm = algorithm_of(&pkcs1, HashAlgorithm::Sha256);
        verify_signature(&public_key, &algorithm, b"payload", &signature).unwrap();
        algorithm.parameters = Some(Any::from_der(&[0x04, 0x00]).unwrap());
        assert_eq!(
            verify_signature(&public_key, &algorithm, b"payload", &signature),
            Err(X509Error::VerificationFailed)
        );
    }

    #[test]
    fn test_unknown_algorithm_is_not_a_verification_failure() {
        let key = KeyPair::generate_ecdsa_p256();
        let algorithm = AlgorithmIdentifierOwned {
            oid: const_oid::ObjectIdentifier::new_unwrap("1.3.101.112"),
            parameters: None,
        };
        assert!(matches!(
            verify_signature(&key.public_key_info().unwrap(), &algorithm, b"x", &[0; 64]),
            Err(X509Error::UnsupportedAlgorithm(_))
        ));
    }

    #[test]
    fn test_key_family_mismatch_fails_verification() {
        let key = KeyPair::generate_ecdsa_p256();
        let algorithm = AlgorithmIdentifierOwned {
            oid: oids::SHA256_WITH_RSA,
            parameters: None,
        };
        assert_eq!(
            verify_signature(&key.public_key_info().unwrap(), &algorithm, b"x", &[0; 64]),
            Err(X509Error::VerificationFailed)
        );
    }
}
