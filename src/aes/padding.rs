// PKCS7 padding to the AES block size

use subtle::{ConstantTimeEq, ConstantTimeLess};

use super::BLOCK_SIZE;
use crate::error::{CryptoError, Result};

/// Append 1..=16 bytes, each equal to the pad count.
/// A block-aligned input gains a full block of 0x10.
pub fn pkcs7_pad(data: &[u8]) -> Vec<u8> {
    let pad_len = BLOCK_SIZE - (data.len() % BLOCK_SIZE);
    let mut padded = Vec::with_capacity(data.len() + pad_len);
    padded.extend_from_slice(data);
    padded.resize(data.len() + pad_len, pad_len as u8);
    padded
}

/// Validate and strip PKCS7 padding.
///
/// Every trailing byte is inspected regardless of where the first mismatch
/// is, and all failures report the same reason.
pub fn pkcs7_unpad(data: &[u8]) -> Result<Vec<u8>> {
    if data.is_empty() || data.len() % BLOCK_SIZE != 0 {
        return Err(CryptoError::aes_padding("padded data is not block aligned"));
    }

    let last_block = &data[data.len() - BLOCK_SIZE..];
    let pad_len = last_block[BLOCK_SIZE - 1];

    // 1 <= pad_len <= 16
    let mut valid = !pad_len.ct_eq(&0) & pad_len.ct_lt(&(BLOCK_SIZE as u8 + 1));

    for (i, &byte) in last_block.iter().enumerate() {
        let distance_from_end = (BLOCK_SIZE - i) as u8;
        // Only bytes inside the claimed padding must match
        let in_padding = !pad_len.ct_lt(&distance_from_end);
        valid &= !in_padding | byte.ct_eq(&pad_len);
    }

    if !bool::from(valid) {
        return Err(CryptoError::aes_padding("inconsistent padding bytes"));
    }

    Ok(data[..data.len() - pad_len as usize].to_vec())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pad_lengths() {
        assert_eq!(pkcs7_pad(b"").len(), 16);
        assert_eq!(pkcs7_pad(b"").as_slice(), &[16u8; 16]);
        assert_eq!(pkcs7_pad(&[1u8; 15]).len(), 16);
        assert_eq!(pkcs7_pad(&[1u8; 16]).len(), 32);
        assert_eq!(pkcs7_pad(&[1u8; 17]).len(), 32);

        let padded = pkcs7_pad(b"HELLO WORLD");
        assert_eq!(&padded[11..], &[5u8; 5]);
    }

    #[test]
    fn test_unpad_roundtrip() {
        for len in 0..40 {
            let data: Vec<u8> = (0..len as u8).collect();
            assert_eq!(pkcs7_unpad(&pkcs7_pad(&data)).unwrap(), data);
        }
    }

    #[test]
    fn test_unpad_rejects_zero_and_oversized() {
        let mut block = [0u8; 16];
        assert!(pkcs7_unpad(&block).is_err());

        block[15] = 17;
        assert!(pkcs7_unpad(&block).is_err());
    }

    #[test]
    fn test_unpad_rejects_short_run() {
        // Last byte claims 4, but only 3 bytes match
        let mut block = [0xAAu8; 16];
        block[13] = 4;
        block[14] = 4;
        block[15] = 4;
        assert_eq!(
            pkcs7_unpad(&block),
            Err(CryptoError::aes_padding("inconsistent padding bytes"))
        );

        block[12] = 4;
        assert_eq!(pkcs7_unpad(&block).unwrap(), vec![0xAAu8; 12]);
    }

    #[test]
    fn test_unpad_rejects_misaligned() {
        assert!(pkcs7_unpad(b"").is_err());
        assert!(pkcs7_unpad(&[1u8; 15]).is_err());
    }
}
