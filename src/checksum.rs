//! Component B: the trailing SHA-1 checksum over a bundle's bytes (§4.B).

use crate::error::{GitError, Result};
use sha1::{Digest, Sha1};

/// Verify that `buf[len-20..]` equals the SHA-1 of `buf[..len-20]`.
///
/// Fails with `CorruptBundle` if `buf` is shorter than 20 bytes, so callers
/// don't need to pre-check the length themselves.
pub fn verify(buf: &[u8]) -> Result<()> {
    if buf.len() < 20 {
        return Err(GitError::CorruptBundle(
            "bundle shorter than the 20-byte trailing checksum".into(),
        ));
    }

    let split = buf.len() - 20;
    let (body, trailer) = buf.split_at(split);

    let mut hasher = Sha1::new();
    hasher.update(body);
    let computed: [u8; 20] = hasher.finalize().into();

    if computed.as_slice() != trailer {
        return Err(GitError::ChecksumMismatch {
            expected: hex(trailer),
            actual: hex(&computed),
        });
    }

    Ok(())
}

fn hex(bytes: &[u8]) -> String {
    bytes.iter().map(|b| format!("{:02x}", b)).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accepts_a_correctly_appended_checksum() {
        let body = b"some bundle bytes".to_vec();
        let mut hasher = Sha1::new();
        hasher.update(&body);
        let digest: [u8; 20] = hasher.finalize().into();

        let mut buf = body;
        buf.extend_from_slice(&digest);

        verify(&buf).unwrap();
    }

    #[test]
    fn rejects_a_flipped_byte() {
        let body = b"some bundle bytes".to_vec();
        let mut hasher = Sha1::new();
        hasher.update(&body);
        let digest: [u8; 20] = hasher.finalize().into();

        let mut buf = body;
        buf.extend_from_slice(&digest);
        buf[0] ^= 0xff;

        let err = verify(&buf).unwrap_err();
        assert!(matches!(err, GitError::ChecksumMismatch { .. }));
    }

    #[test]
    fn buffer_shorter_than_the_trailer_is_corrupt_bundle() {
        let err = verify(&[0u8; 19]).unwrap_err();
        assert!(matches!(err, GitError::CorruptBundle(_)));
    }
}
