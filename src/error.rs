//! use x509forge::error::X509Error;

use thiserror::Error;

/// Represents errors that can occur while building or loading X.509 structures.
///
/// Argument errors are reported before any DER work happens. Every failure to
/// parse caller-supplied bytes collapses to [`X509Error::InvalidEncoding`].
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum X509Error {
    /// A required argument was empty, out of range or otherwise unusable.
    #[error("Invalid argument `{param}`: {reason}")]
    InvalidArgument { param: &'static str, reason: String },

    /// Input bytes are not a valid DER encoding of the expected structure.
    #[error("Invalid DER encoding: {0}")]
    InvalidEncoding(String),

    /// The structure declares a version this crate does not understand.
    #[error("Unsupported structure version: {0}")]
    UnsupportedVersion(i64),

    /// A signature did not verify against the embedded public key.
    #[error("Signature verification failed")]
    VerificationFailed,

    /// The algorithm identifier is not one this crate can process.
    #[error("Unsupported algorithm: {0}")]
    UnsupportedAlgorithm(String),

    /// The same extension (or extension request attribute) was supplied twice.
    #[error("Duplicate extension: {0}")]
    DuplicateExtension(String),

    /// The same request attribute value was supplied twice.
    #[error("Duplicate request attribute: {0}")]
    DuplicateAttribute(String),

    /// The issuer certificate cannot be used for the requested operation.
    #[error("Issuer precondition failed: {0}")]
    IssuerPreconditionFailed(String),

    /// Error while producing an encoding.
    #[error("Failed to encode data: {0}")]
    EncodingError(String),

    /// Error from the key provider (generation, import, signing).
    #[error("Key error: {0}")]
    KeyError(String),
}

impl X509Error {
    pub(crate) fn invalid_argument(param: &'static str, reason: impl Into<String>) -> Self {
        X509Error::InvalidArgument {
            param,
            reason: reason.into(),
        }
    }

    pub(crate) fn encoding(err: der::Error) -> Self {
        X509Error::EncodingError(err.to_string())
    }
}

impl From<der::Error> for X509Error {
    /// Converts a `der::Error` into an `X509Error`.
    fn from(err: der::Error) -> Self {
        X509Error::InvalidEncoding(err.to_string())
    }
}

impl From<rsa::Error> for X509Error {
    fn from(err: rsa::Error) -> Self {
        X509Error::KeyError(err.to_string())
    }
}

impl From<rsa::pkcs1::Error> for X509Error {
    fn from(err: rsa::pkcs1::Error) -> Self {
        X509Error::KeyError(err.to_string())
    }
}

impl From<pkcs8::Error> for X509Error {
    fn from(err: pkcs8::Error) -> Self {
        X509Error::KeyError(err.to_string())
    }
}

impl From<pem::PemError> for X509Error {
    fn from(err: pem::PemError) -> Self {
        X509Error::InvalidEncoding(err.to_string())
    }
}

/// Result type used throughout the crate.
pub type Result<T> = std::result::Result<T, X509Error>;
