// PKCS#1 v1.5 Padding
// Encryption (type 2) padding for RSA blocks of modulus width

use crate::error::{CryptoError, Engine, Result};
use crate::random::{random_nonzero_byte, SecureRandomSource};

/// Fixed overhead of a padded block: 0x00 || 0x02 || ... || 0x00
const MARKER_BYTES: usize = 3;

/// Padding profile: how many random filler bytes a block must carry.
///
/// The standard profile requires at least 8 filler bytes, which gives the
/// familiar `L <= K - 11` payload limit. A 64-bit modulus is only 8 bytes
/// wide, so narrow educational keys use the compact profile instead.
///
/// The filler is drawn from whatever [`SecureRandomSource`] the caller
/// injects. Nothing here checks that the source is actually unpredictable;
/// with a seeded or weak generator the padding is deterministic and the
/// scheme offers no semantic security.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RsaPadding {
    pub min_filler: usize,
}

impl RsaPadding {
    /// PKCS#1 v1.5: at least 8 non-zero filler bytes
    pub const PKCS1: RsaPadding = RsaPadding { min_filler: 8 };

    /// Narrow-modulus profile: at least 2 non-zero filler bytes
    pub const COMPACT: RsaPadding = RsaPadding { min_filler: 2 };

    /// Standard PKCS#1 when the modulus is wide enough for it, compact otherwise
    pub fn for_key_size(key_size: usize) -> RsaPadding {
        if RsaPadding::PKCS1.capacity(key_size) > 0 {
            RsaPadding::PKCS1
        } else {
            RsaPadding::COMPACT
        }
    }

    /// Total bytes of overhead per block
    pub fn overhead(&self) -> usize {
        MARKER_BYTES + self.min_filler
    }

    /// Largest payload that fits a block of `key_size` bytes
    pub fn capacity(&self, key_size: usize) -> usize {
        key_size.saturating_sub(self.overhead())
    }

    /// Pad `data` into exactly `key_size` bytes:
    /// `0x00 || 0x02 || PS || 0x00 || data` with PS random and non-zero
    pub fn pad<R>(&self, data: &[u8], key_size: usize, rng: &mut R) -> Result<Vec<u8>>
    where
        R: SecureRandomSource + ?Sized,
    {
        // A modulus narrower than the overhead has no room even for an empty payload
        let capacity = self.capacity(key_size);
        if data.len() + self.overhead() > key_size {
            return Err(CryptoError::InvalidInputLength {
                engine: Engine::Rsa,
                context: "payload",
                expected: capacity,
                actual: data.len(),
            });
        }

        let ps_len = key_size - data.len() - MARKER_BYTES;

        let mut block = Vec::with_capacity(key_size);
        block.push(0x00);
        block.push(0x02);
        for _ in 0..ps_len {
            block.push(random_nonzero_byte(rng));
        }
        block.push(0x00);
        block.extend_from_slice(data);

        debug_assert_eq!(block.len(), key_size);
        Ok(block)
    }

    /// Validate the markers and return everything after the delimiter
    pub fn unpad(&self, block: &[u8]) -> Result<Vec<u8>> {
        if block.len() < self.overhead() {
            return Err(CryptoError::rsa_padding("block shorter than padding overhead"));
        }

        if block[0] != 0x00 {
            return Err(CryptoError::rsa_padding("first byte must be 0x00"));
        }

        if block[1] != 0x02 {
            return Err(CryptoError::rsa_padding("second byte must be 0x02"));
        }

        // Find the delimiter after the filler
        let separator_pos = match block[2..].iter().position(|&b| b == 0x00) {
            Some(pos) => pos + 2,
            None => return Err(CryptoError::rsa_padding("no delimiter byte found")),
        };

        if separator_pos - 2 < self.min_filler {
            return Err(CryptoError::rsa_padding("filler shorter than minimum"));
        }

        Ok(block[separator_pos + 1..].to_vec())
    }
}

impl Default for RsaPadding {
    fn default() -> Self {
        RsaPadding::PKCS1
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand_chacha::ChaCha20Rng;

    fn rng() -> ChaCha20Rng {
        ChaCha20Rng::seed_from_u64(42)
    }

    #[test]
    fn test_pad_structure() {
        let data = b"Hello";
        let padded = RsaPadding::PKCS1.pad(data, 64, &mut rng()).unwrap();
        assert_eq!(padded.len(), 64);

        assert_eq!(padded[0], 0x00);
        assert_eq!(padded[1], 0x02);
        assert_eq!(padded[padded.len() - data.len() - 1], 0x00);

        // Filler must be non-zero
        for &byte in &padded[2..padded.len() - data.len() - 1] {
            assert_ne!(byte, 0x00);
        }
    }

    #[test]
    fn test_pad_max_size() {
        // K - 11 bytes fits exactly
        let data = vec![0xAAu8; 53];
        let padded = RsaPadding::PKCS1.pad(&data, 64, &mut rng()).unwrap();
        assert_eq!(padded.len(), 64);
        assert_eq!(RsaPadding::PKCS1.unpad(&padded).unwrap(), data);
    }

    #[test]
    fn test_pad_too_large() {
        let data = vec![0u8; 54];
        let result = RsaPadding::PKCS1.pad(&data, 64, &mut rng());
        assert_eq!(
            result,
            Err(CryptoError::InvalidInputLength {
                engine: Engine::Rsa,
                context: "payload",
                expected: 53,
                actual: 54,
            })
        );
    }

    #[test]
    fn test_compact_profile_fits_64_bit_modulus() {
        assert_eq!(RsaPadding::COMPACT.capacity(8), 3);
        assert_eq!(RsaPadding::PKCS1.capacity(8), 0);

        let padded = RsaPadding::COMPACT.pad(b"key", 8, &mut rng()).unwrap();
        assert_eq!(padded.len(), 8);
        assert_eq!(RsaPadding::COMPACT.unpad(&padded).unwrap(), b"key");
    }

    #[test]
    fn test_modulus_narrower_than_overhead() {
        for (padding, key_size) in [(RsaPadding::COMPACT, 2), (RsaPadding::COMPACT, 4)] {
            assert_eq!(
                padding.pad(b"", key_size, &mut rng()),
                Err(CryptoError::InvalidInputLength {
                    engine: Engine::Rsa,
                    context: "payload",
                    expected: 0,
                    actual: 0,
                })
            );
        }

        // Exactly the overhead fits an empty payload with minimum filler
        let padded = RsaPadding::COMPACT.pad(b"", 5, &mut rng()).unwrap();
        assert_eq!(RsaPadding::COMPACT.unpad(&padded).unwrap(), b"");
    }

    #[test]
    fn test_profile_selection() {
        assert_eq!(RsaPadding::for_key_size(8), RsaPadding::COMPACT);
        assert_eq!(RsaPadding::for_key_size(11), RsaPadding::COMPACT);
        assert_eq!(RsaPadding::for_key_size(12), RsaPadding::PKCS1);
        assert_eq!(RsaPadding::for_key_size(256), RsaPadding::PKCS1);
    }

    #[test]
    fn test_empty_payload() {
        let padded = RsaPadding::PKCS1.pad(b"", 16, &mut rng()).unwrap();
        assert_eq!(padded[15], 0x00);
        assert!(RsaPadding::PKCS1.unpad(&padded).unwrap().is_empty());
    }

    #[test]
    fn test_invalid_markers() {
        let mut padded = RsaPadding::PKCS1.pad(b"Test", 32, &mut rng()).unwrap();
        padded[1] = 0x01;
        assert_eq!(
            RsaPadding::PKCS1.unpad(&padded),
            Err(CryptoError::rsa_padding("second byte must be 0x02"))
        );

        padded[0] = 0x01;
        assert!(RsaPadding::PKCS1.unpad(&padded).is_err());
    }

    #[test]
    fn test_missing_delimiter() {
        let block = vec![0x00, 0x02, 0xFF, 0xFF, 0x01, 0x02, 0x03, 0x04, 0x05, 0x06, 0x07, 0x08];
        assert_eq!(
            RsaPadding::PKCS1.unpad(&block),
            Err(CryptoError::rsa_padding("no delimiter byte found"))
        );
    }

    #[test]
    fn test_short_filler_rejected() {
        let block = vec![0x00, 0x02, 0x11, 0x22, 0x00, 0x41, 0x42, 0x43, 0x44, 0x45, 0x46, 0x47];
        assert!(RsaPadding::PKCS1.unpad(&block).is_err());
        assert_eq!(RsaPadding::COMPACT.unpad(&block).unwrap(), b"ABCDEFG");
    }
}
