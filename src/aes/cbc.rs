// Cipher Block Chaining mode over the AES-128 block cipher
//
// Each plaintext block is XORed with the previous ciphertext block (the IV
// for the first) before encryption. Blocks are processed strictly in order.

use tracing::trace;

use super::block::{decrypt_block, encrypt_block};
use super::key_schedule::RoundKeySchedule;
use super::keys::{InitializationVector, SymmetricKey};
use super::padding::{pkcs7_pad, pkcs7_unpad};
use super::{Block, BLOCK_SIZE};
use crate::error::{CryptoError, Engine, Result};

fn xor_in_place(block: &mut Block, other: &Block) {
    for (b, o) in block.iter_mut().zip(other.iter()) {
        *b ^= o;
    }
}

/// Encrypt block-aligned data without padding
fn encrypt_blocks(data: &[u8], schedule: &RoundKeySchedule, iv: &InitializationVector) -> Vec<u8> {
    let mut ciphertext = Vec::with_capacity(data.len());
    let mut prev_block = *iv.as_bytes();

    for chunk in data.chunks_exact(BLOCK_SIZE) {
        let mut block = [0u8; BLOCK_SIZE];
        block.copy_from_slice(chunk);

        xor_in_place(&mut block, &prev_block);
        let encrypted = encrypt_block(&block, schedule);

        ciphertext.extend_from_slice(&encrypted);
        prev_block = encrypted;
    }

    ciphertext
}

/// Decrypt block-aligned data without unpadding
fn decrypt_blocks(data: &[u8], schedule: &RoundKeySchedule, iv: &InitializationVector) -> Vec<u8> {
    let mut plaintext = Vec::with_capacity(data.len());
    let mut prev_block = *iv.as_bytes();

    for chunk in data.chunks_exact(BLOCK_SIZE) {
        let mut current = [0u8; BLOCK_SIZE];
        current.copy_from_slice(chunk);

        let mut block = decrypt_block(&current, schedule);
        xor_in_place(&mut block, &prev_block);

        plaintext.extend_from_slice(&block);
        prev_block = current;
    }

    plaintext
}

fn check_aligned(len: usize) -> Result<()> {
    if len == 0 || len % BLOCK_SIZE != 0 {
        return Err(CryptoError::InvalidInputLength {
            engine: Engine::Aes,
            context: "CBC ciphertext",
            expected: (len / BLOCK_SIZE + 1) * BLOCK_SIZE,
            actual: len,
        });
    }
    Ok(())
}

/// PKCS7-pad and encrypt `plaintext` of any length
pub fn encrypt(plaintext: &[u8], key: &SymmetricKey, iv: &InitializationVector) -> Vec<u8> {
    let schedule = RoundKeySchedule::expand(key);
    let padded = pkcs7_pad(plaintext);
    trace!(blocks = padded.len() / BLOCK_SIZE, "AES-CBC encrypt");
    encrypt_blocks(&padded, &schedule, iv)
}

/// Decrypt and strip PKCS7 padding.
///
/// Fails with `InvalidInputLength` when the ciphertext is empty or not a
/// multiple of 16 bytes, and with a padding error when the trailing bytes
/// do not form valid PKCS7 padding.
pub fn decrypt(
    ciphertext: &[u8],
    key: &SymmetricKey,
    iv: &InitializationVector,
) -> Result<Vec<u8>> {
    check_aligned(ciphertext.len())?;

    let schedule = RoundKeySchedule::expand(key);
    trace!(blocks = ciphertext.len() / BLOCK_SIZE, "AES-CBC decrypt");
    let padded = decrypt_blocks(ciphertext, &schedule, iv);

    pkcs7_unpad(&padded)
}

/// Encrypt block-aligned data with no padding (raw NIST mode)
pub fn encrypt_unpadded(
    data: &[u8],
    key: &SymmetricKey,
    iv: &InitializationVector,
) -> Result<Vec<u8>> {
    check_aligned(data.len())?;
    Ok(encrypt_blocks(data, &RoundKeySchedule::expand(key), iv))
}

/// Decrypt block-aligned data with no unpadding (raw NIST mode)
pub fn decrypt_unpadded(
    data: &[u8],
    key: &SymmetricKey,
    iv: &InitializationVector,
) -> Result<Vec<u8>> {
    check_aligned(data.len())?;
    Ok(decrypt_blocks(data, &RoundKeySchedule::expand(key), iv))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Stage;

    fn sequential_key() -> SymmetricKey {
        SymmetricKey::new(core::array::from_fn(|i| i as u8))
    }

    fn sequential_iv() -> InitializationVector {
        InitializationVector::new(core::array::from_fn(|i| 0x10 + i as u8))
    }

    #[test]
    fn test_nist_sp800_38a_f21_f22() {
        let key_bytes = hex::decode("2b7e151628aed2a6abf7158809cf4f3c").unwrap();
        let iv_bytes = hex::decode("000102030405060708090a0b0c0d0e0f").unwrap();
        let key = SymmetricKey::from_slice(&key_bytes).unwrap();
        let iv = InitializationVector::from_slice(&iv_bytes).unwrap();
        let plaintext = hex::decode(
            "6bc1bee22e409f96e93d7e117393172a\
             ae2d8a571e03ac9c9eb76fac45af8e51\
             30c81c46a35ce411e5fbc1191a0a52ef\
             f69f2445df4f9b17ad2b417be66c3710",
        )
        .unwrap();
        let expected = "7649abac8119b246cee98e9b12e9197d\
                        5086cb9b507219ee95db113a917678b2\
                        73bed6b8e3c1743b7116e69e22229516\
                        3ff1caa1681fac09120eca307586e1a7";

        let ciphertext = encrypt_unpadded(&plaintext, &key, &iv).unwrap();
        assert_eq!(hex::encode(&ciphertext), expected);

        let recovered = decrypt_unpadded(&ciphertext, &key, &iv).unwrap();
        assert_eq!(recovered, plaintext);
    }

    #[test]
    fn test_hello_world_single_block() {
        let ciphertext = encrypt(b"HELLO WORLD", &sequential_key(), &sequential_iv());
        assert_eq!(ciphertext.len(), 16);
        assert_eq!(hex::encode(&ciphertext), "dc3c4af31e3d7c40b10c7c3879ecdaa3");

        let plaintext = decrypt(&ciphertext, &sequential_key(), &sequential_iv()).unwrap();
        assert_eq!(plaintext, b"HELLO WORLD");
    }

    #[test]
    fn test_empty_plaintext() {
        let ciphertext = encrypt(b"", &sequential_key(), &sequential_iv());
        assert_eq!(hex::encode(&ciphertext), "0a940bb5416ef045f1c39458c653ea5a");
        assert!(decrypt(&ciphertext, &sequential_key(), &sequential_iv())
            .unwrap()
            .is_empty());
    }

    #[test]
    fn test_misaligned_ciphertext() {
        let err = decrypt(&[0u8; 17], &sequential_key(), &sequential_iv()).unwrap_err();
        assert!(matches!(
            err,
            CryptoError::InvalidInputLength { engine: Engine::Aes, actual: 17, .. }
        ));
        assert!(decrypt(&[], &sequential_key(), &sequential_iv()).is_err());
    }

    #[test]
    fn test_corrupted_padding_detected() {
        let key = sequential_key();
        let iv = sequential_iv();
        let ciphertext = encrypt(b"HELLO WORLD", &key, &iv);

        // Flipping the IV's last byte flips the last plaintext byte of block one
        let mut tampered_iv = *iv.as_bytes();
        tampered_iv[15] ^= 0x01;
        let err = decrypt(&ciphertext, &key, &InitializationVector::new(tampered_iv)).unwrap_err();
        assert_eq!(err.stage(), Stage::PaddingValidation);
        assert_eq!(err.engine(), Some(Engine::Aes));
    }

    #[test]
    fn test_chaining_hides_repeated_blocks() {
        let plaintext = [0x41u8; 48];
        let ciphertext = encrypt(&plaintext, &sequential_key(), &sequential_iv());
        assert_eq!(ciphertext.len(), 64);
        assert_ne!(ciphertext[0..16], ciphertext[16..32]);
        assert_ne!(ciphertext[16..32], ciphertext[32..48]);
    }
}
