// RSA Encryption Implementation
// Implements RSA encryption with PKCS#1 v1.5 padding

use super::bigint::{from_bytes, mod_exp, RsaBigInt};
use super::keygen::RsaPublicKey;
use super::padding::RsaPadding;
use crate::error::{CryptoError, Engine, Result};
use crate::random::SecureRandomSource;

/// Encrypt one padded block: c = pad(payload)^e mod n
///
/// Fails with `InvalidInputLength` when the payload exceeds the block
/// capacity of the padding profile (K - 11 bytes for PKCS#1).
pub fn encrypt_block<R>(
    payload: &[u8],
    public_key: &RsaPublicKey,
    padding: RsaPadding,
    rng: &mut R,
) -> Result<RsaBigInt>
where
    R: SecureRandomSource + ?Sized,
{
    let key_size = public_key.key_size();

    // Apply PKCS#1 v1.5 padding
    let padded = padding.pad(payload, key_size, rng)?;

    // Leading 0x00 keeps m below 2^(8(K-1)) <= n
    let m = from_bytes(&padded);
    if m >= public_key.n {
        return Err(CryptoError::InvalidKeyMaterial(
            "padded message not below modulus".to_string(),
        ));
    }

    Ok(mod_exp(&m, &public_key.e, &public_key.n))
}

/// Encrypt a payload of any length as a sequence of padded blocks.
///
/// Each block carries at most `padding.capacity(K)` bytes. An empty
/// payload still produces one block so decryption has something to
/// recover.
pub fn encrypt_chunked<R>(
    payload: &[u8],
    public_key: &RsaPublicKey,
    padding: RsaPadding,
    rng: &mut R,
) -> Result<Vec<RsaBigInt>>
where
    R: SecureRandomSource + ?Sized,
{
    let capacity = padding.capacity(public_key.key_size());
    if capacity == 0 {
        return Err(CryptoError::InvalidInputLength {
            engine: Engine::Rsa,
            context: "modulus",
            expected: padding.overhead() + 1,
            actual: public_key.key_size(),
        });
    }

    if payload.is_empty() {
        return Ok(vec![encrypt_block(payload, public_key, padding, rng)?]);
    }

    payload
        .chunks(capacity)
        .map(|chunk| encrypt_block(chunk, public_key, padding, rng))
        .collect()
}
