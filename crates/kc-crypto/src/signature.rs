//! Raw signature verification.

use aws_lc_rs::signature::{self, UnparsedPublicKey, VerificationAlgorithm};
use thiserror::Error;

use crate::algorithm::SignatureAlgorithm;

/// Error type for signature operations.
#[derive(Debug, Error)]
pub enum SignatureError {
    /// Algorithm not supported or not allowed.
    #[error("algorithm not supported: {0}")]
    UnsupportedAlgorithm(String),

    /// Invalid key format.
    #[error("invalid key format: {0}")]
    InvalidKey(String),

    /// Verification failed.
    #[error("signature verification failed")]
    Verification,
}

/// Verifies `sig` over `data` with a public key.
///
/// `public_key` is the key encoding accepted by aws-lc-rs for the algorithm
/// family: an RSA `RSAPublicKey` / `SubjectPublicKeyInfo` DER, or an
/// uncompressed EC point. ECDSA signatures use the fixed-width `r || s`
/// encoding mandated by XML-DSig.
///
/// Returns `Ok(false)` when the signature does not verify. Errors are
/// reserved for inputs that cannot be evaluated at all.
///
/// # Errors
///
/// Returns an error if the key is empty or the algorithm is SHA-1 based and
/// `allow_sha1` is not set.
pub fn verify_signature(
    algorithm: SignatureAlgorithm,
    public_key: &[u8],
    data: &[u8],
    sig: &[u8],
    allow_sha1: bool,
) -> Result<bool, SignatureError> {
    if public_key.is_empty() {
        return Err(SignatureError::InvalidKey("empty public key".to_string()));
    }
    if algorithm.is_deprecated() && !allow_sha1 {
        return Err(SignatureError::UnsupportedAlgorithm(
            "SHA-1 signatures are not allowed".to_string(),
        ));
    }

    let verification_alg: &'static dyn VerificationAlgorithm = match algorithm {
        SignatureAlgorithm::RsaSha256 => &signature::RSA_PKCS1_2048_8192_SHA256,
        SignatureAlgorithm::RsaSha384 => &signature::RSA_PKCS1_2048_8192_SHA384,
        SignatureAlgorithm::RsaSha512 => &signature::RSA_PKCS1_2048_8192_SHA512,
        SignatureAlgorithm::RsaSha1 => &signature::RSA_PKCS1_2048_8192_SHA1_FOR_LEGACY_USE_ONLY,
        SignatureAlgorithm::EcdsaSha256 => &signature::ECDSA_P256_SHA256_FIXED,
        SignatureAlgorithm::EcdsaSha384 => &signature::ECDSA_P384_SHA384_FIXED,
        SignatureAlgorithm::EcdsaSha512 => &signature::ECDSA_P521_SHA512_FIXED,
    };

    let key = UnparsedPublicKey::new(verification_alg, public_key);
    Ok(key.verify(data, sig).is_ok())
}
