//! Digest functions.
//!
//! SHA-1 is only exposed because the SAML 2.0 artifact format fixes the
//! source ID as the SHA-1 digest of the issuer entity ID. It must not be
//! used for signatures.

use aws_lc_rs::digest;

/// Computes a SHA-1 digest of the input data.
#[must_use]
pub fn sha1(data: &[u8]) -> [u8; 20] {
    let mut out = [0u8; 20];
    out.copy_from_slice(digest::digest(&digest::SHA1_FOR_LEGACY_USE_ONLY, data).as_ref());
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sha1_known_vector() {
        // FIPS 180-1 "abc" test vector
        let expected = [
            0xa9, 0x99, 0x3e, 0x36, 0x47, 0x06, 0x81, 0x6a, 0xba, 0x3e, 0x25, 0x71, 0x78, 0x50,
            0xc2, 0x6c, 0x9c, 0xd0, 0xd8, 0x9d,
        ];
        assert_eq!(sha1(b"abc"), expected);
    }

    #[test]
    fn sha1_is_deterministic() {
        assert_eq!(sha1(b"https://idp.example.org"), sha1(b"https://idp.example.org"));
        assert_ne!(sha1(b"a"), sha1(b"b"));
    }
}
