// Hybrid Encryption Library
// Hand-written AES-128-CBC for messages, textbook RSA for the AES key

//! An educational hybrid encryption engine.
//!
//! Messages are encrypted with AES-128 in CBC mode under a fresh random key,
//! and that key is encrypted with RSA using PKCS#1 v1.5 style padding. Both
//! primitives are implemented from first principles on top of `num-bigint`.
//!
//! This crate is for learning. It makes no attempt at constant-time
//! execution, the default 64-bit RSA modulus can be factored instantly, and
//! nothing here should protect real data.

pub mod aes;
pub mod error;
pub mod hybrid;
pub mod observe;
pub mod random;
pub mod rsa;
pub mod util;

pub use aes::{InitializationVector, SymmetricKey};
pub use error::{CryptoError, Engine, Result, Stage};
pub use hybrid::{
    hybrid_decrypt, hybrid_encrypt, run_hybrid, EncryptedKey, HybridConfig, HybridOutcome,
    HybridWorkflow, SymmetricEnvelope, WorkflowState,
};
pub use observe::{Event, NullObserver, Observer, TracingObserver};
pub use random::{system_rng, SecureRandomSource};
pub use rsa::{KeyGenConfig, RsaBigInt, RsaKeyPair, RsaPadding, RsaPrivateKey, RsaPublicKey};

/// Draw a fresh 128-bit AES key
pub fn generate_symmetric_key<R: SecureRandomSource + ?Sized>(rng: &mut R) -> SymmetricKey {
    SymmetricKey::generate(rng)
}

/// Encrypt under a freshly drawn IV and return it alongside the ciphertext
pub fn aes_encrypt<R: SecureRandomSource + ?Sized>(
    plaintext: &[u8],
    key: &SymmetricKey,
    rng: &mut R,
) -> (InitializationVector, Vec<u8>) {
    let iv = InitializationVector::generate(rng);
    let ciphertext = aes::cbc::encrypt(plaintext, key, &iv);
    (iv, ciphertext)
}

pub fn aes_decrypt(
    ciphertext: &[u8],
    key: &SymmetricKey,
    iv: &InitializationVector,
) -> Result<Vec<u8>> {
    aes::cbc::decrypt(ciphertext, key, iv)
}

/// Key pair with a `bit_width`-bit modulus and E = 65537
pub fn rsa_generate_keypair<R: SecureRandomSource + ?Sized>(
    bit_width: u32,
    rng: &mut R,
) -> Result<RsaKeyPair> {
    rsa::generate_keypair(bit_width, rng)
}

/// Single-block RSA encryption; the padding profile follows the modulus width
pub fn rsa_encrypt<R: SecureRandomSource + ?Sized>(
    payload: &[u8],
    public_key: &RsaPublicKey,
    rng: &mut R,
) -> Result<RsaBigInt> {
    let padding = RsaPadding::for_key_size(public_key.key_size());
    rsa::encrypt_block(payload, public_key, padding, rng)
}

pub fn rsa_decrypt(ciphertext: &RsaBigInt, private_key: &RsaPrivateKey) -> Result<Vec<u8>> {
    let padding = RsaPadding::for_key_size(private_key.key_size());
    rsa::decrypt_block(ciphertext, private_key, padding)
}
