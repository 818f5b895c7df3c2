use const_oid::ObjectIdentifier;
use der::asn1::{Any, BitString};
use der::{Decode, Encode};
use p256::ecdsa::{SigningKey as P256SigningKey, VerifyingKey as P256VerifyingKey};
use p384::ecdsa::{SigningKey as P384SigningKey, VerifyingKey as P384VerifyingKey};
use pkcs8::{DecodePrivateKey, EncodePrivateKey};
use rand_core::OsRng;
use rsa::{RsaPrivateKey, RsaPublicKey, pkcs1::EncodeRsaPublicKey};
use x509_cert::spki::{AlgorithmIdentifierOwned, SubjectPublicKeyInfoOwned};

use crate::asn1::DER_NULL;
use crate::error::{Result, X509Error};
use crate::oids;
use crate::pem_utils;
use crate::signer::{KeySigner, RsaPadding};

/// Supported key types for signing certificates, requests and CRLs.
#[derive(Clone, Debug)]
pub enum KeyPair {
    Rsa {
        private: Box<RsaPrivateKey>,
        public: RsaPublicKey,
    },
    EcdsaP256 {
        signing_key: P256SigningKey,
        verifying_key: P256VerifyingKey,
    },
    EcdsaP384 {
        signing_key: P384SigningKey,
        verifying_key: P384VerifyingKey,
    },
}

impl KeyPair {
    /// Generate an RSA key pair with the specified number of bits.
    pub fn generate_rsa(bits: usize) -> Result<Self> {
        let private = RsaPrivateKey::new(&mut OsRng, bits)?;
        let public = RsaPublicKey::from(&private);
        Ok(KeyPair::Rsa {
            private: Box::new(private),
            public,
        })
    }

    /// Generate an ECDSA P-256 key pair.
    pub fn generate_ecdsa_p256() -> Self {
        let signing_key = P256SigningKey::random(&mut OsRng);
        let verifying_key = signing_key.verifying_key().to_owned();
        KeyPair::EcdsaP256 {
            signing_key,
            verifying_key,
        }
    }

    /// Generate an ECDSA P-384 key pair.
    pub fn generate_ecdsa_p384() -> Self {
        let signing_key = P384SigningKey::random(&mut OsRng);
        let verifying_key = signing_key.verifying_key().to_owned();
        KeyPair::EcdsaP384 {
            signing_key,
            verifying_key,
        }
    }

    /// Import an unencrypted PKCS#8 private key.
    pub fn import_from_pkcs8_der(der: &[u8]) -> Result<Self> {
        if let Ok(private) = RsaPrivateKey::from_pkcs8_der(der) {
            let public = RsaPublicKey::from(&private);
            return Ok(KeyPair::Rsa {
                private: Box::new(private),
                public,
            });
        }
        if let Ok(signing_key) = P256SigningKey::from_pkcs8_der(der) {
            let verifying_key = signing_key.verifying_key().to_owned();
            return Ok(KeyPair::EcdsaP256 {
                signing_key,
                verifying_key,
            });
        }
        let signing_key = P384SigningKey::from_pkcs8_der(der)?;
        let verifying_key = signing_key.verifying_key().to_owned();
        Ok(KeyPair::EcdsaP384 {
            signing_key,
            verifying_key,
        })
    }

    /// Import a `PRIVATE KEY` PEM block.
    pub fn import_from_pkcs8_pem(pem: &str) -> Result<Self> {
        let der = pem_utils::pem_to_der(pem, pem_utils::PRIVATE_KEY_LABEL)?;
        Self::import_from_pkcs8_der(&der)
    }

    /// Export the private key as unencrypted PKCS#8 DER.
    pub fn to_pkcs8_der(&self) -> Result<Vec<u8>> {
        let document = match self {
            KeyPair::Rsa { private, .. } => private.to_pkcs8_der()?,
            KeyPair::EcdsaP256 { signing_key, .. } => signing_key.to_pkcs8_der()?,
            KeyPair::EcdsaP384 { signing_key, .. } => signing_key.to_pkcs8_der()?,
        };
        Ok(document.as_bytes().to_vec())
    }

    /// The SubjectPublicKeyInfo content for this key.
    pub fn public_key_info(&self) -> Result<PublicKeyInfo> {
        match self {
            KeyPair::Rsa { public, .. } => Ok(PublicKeyInfo {
                algorithm: oids::RSA_ENCRYPTION,
                parameters: Some(DER_NULL.to_vec()),
                key: public.to_pkcs1_der()?.as_bytes().to_vec(),
            }),
            KeyPair::EcdsaP256 { verifying_key, .. } => Ok(PublicKeyInfo {
                algorithm: oids::EC_PUBLIC_KEY,
                parameters: Some(oids::SECP256R1.to_der().map_err(X509Error::encoding)?),
                key: verifying_key.to_encoded_point(false).as_bytes().to_vec(),
            }),
            KeyPair::EcdsaP384 { verifying_key, .. } => Ok(PublicKeyInfo {
                algorithm: oids::EC_PUBLIC_KEY,
                parameters: Some(oids::SECP384R1.to_der().map_err(X509Error::encoding)?),
                key: verifying_key.to_encoded_point(false).as_bytes().to_vec(),
            }),
        }
    }

    /// A signature generator over this key. `padding` is ignored for ECDSA keys.
    pub fn signature_generator(&self, padding: RsaPadding) -> KeySigner<'_> {
        KeySigner::new(self, padding)
    }

    pub fn is_rsa(&self) -> bool {
        matches!(self, KeyPair::Rsa { .. })
    }
}

/// The `SubjectPublicKeyInfo` of a key, kept as raw DER pieces.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PublicKeyInfo {
    /// Key algorithm, e.g. `rsaEncryption` or `id-ecPublicKey`.
    pub algorithm: ObjectIdentifier,
    /// DER of the algorithm parameters, when present.
    pub parameters: Option<Vec<u8>>,
    /// Content of the `subjectPublicKey` BIT STRING.
    pub key: Vec<u8>,
}

impl PublicKeyInfo {
    pub fn from_spki(spki: &SubjectPublicKeyInfoOwned) -> Result<Self> {
        let key = spki.subject_public_key.as_bytes().ok_or_else(|| {
            X509Error::InvalidEncoding("subjectPublicKey has unused bits".to_string())
        })?;
        let parameters = spki
            .algorithm
            .parameters
            .as_ref()
            .map(|params| params.to_der())
            .transpose()?;
        Ok(Self {
            algorithm: spki.algorithm.oid,
            parameters,
            key: key.to_vec(),
        })
    }

    pub fn to_spki(&self) -> Result<SubjectPublicKeyInfoOwned> {
        let parameters = self
            .parameters
            .as_deref()
            .map(Any::from_der)
            .transpose()?;
        Ok(SubjectPublicKeyInfoOwned {
            algorithm: AlgorithmIdentifierOwned {
                oid: self.algorithm,
                parameters,
            },
            subject_public_key: BitString::from_bytes(&self.key).map_err(X509Error::encoding)?,
        })
    }

    pub fn from_der(der: &[u8]) -> Result<Self> {
        Self::from_spki(&SubjectPublicKeyInfoOwned::from_der(der)?)
    }

    pub fn to_der(&self) -> Result<Vec<u8>> {
        self.to_spki()?.to_der().map_err(X509Error::encoding)
    }

    /// Named curve of an EC key, if the parameters carry one.
    pub(crate) fn curve(&self) -> Option<ObjectIdentifier> {
        self.parameters
            .as_deref()
            .and_then(|params| ObjectIdentifier::from_der(params).ok())
    }
}
