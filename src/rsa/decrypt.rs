// RSA Decryption Implementation
// m = c^d mod n, serialized to K bytes and unpadded

use super::bigint::{mod_exp, to_bytes_fixed, RsaBigInt};
use super::keygen::RsaPrivateKey;
use super::padding::RsaPadding;
use crate::error::{CryptoError, Result};

/// Decrypt one ciphertext integer and strip its padding
pub fn decrypt_block(
    ciphertext: &RsaBigInt,
    private_key: &RsaPrivateKey,
    padding: RsaPadding,
) -> Result<Vec<u8>> {
    if ciphertext >= &private_key.n {
        return Err(CryptoError::InvalidKeyMaterial(
            "ciphertext integer not below modulus".to_string(),
        ));
    }

    let m = mod_exp(ciphertext, &private_key.d, &private_key.n);

    // Restore the leading zero bytes dropped by the integer form
    let block = to_bytes_fixed(&m, private_key.key_size())?;

    padding.unpad(&block)
}

/// Decrypt a block sequence produced by `encrypt_chunked`
pub fn decrypt_chunked(
    blocks: &[RsaBigInt],
    private_key: &RsaPrivateKey,
    padding: RsaPadding,
) -> Result<Vec<u8>> {
    if blocks.is_empty() {
        return Err(CryptoError::InvalidKeyMaterial(
            "no ciphertext blocks to decrypt".to_string(),
        ));
    }

    let mut plaintext = Vec::new();
    for block in blocks {
        plaintext.extend(decrypt_block(block, private_key, padding)?);
    }
    Ok(plaintext)
}
