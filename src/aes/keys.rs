// AES key material: the 128-bit symmetric key and the CBC initialization vector

use std::fmt;

use zeroize::{Zeroize, ZeroizeOnDrop};

use super::{BLOCK_SIZE, KEY_SIZE};
use crate::error::{CryptoError, Engine, Result};
use crate::random::{random_array, SecureRandomSource};

/// AES-128 key, wiped from memory on drop
#[derive(Clone, PartialEq, Eq, Zeroize, ZeroizeOnDrop)]
pub struct SymmetricKey([u8; KEY_SIZE]);

impl SymmetricKey {
    /// Creates a key from raw bytes
    pub fn new(bytes: [u8; KEY_SIZE]) -> Self {
        Self(bytes)
    }

    /// Creates a fresh random key
    pub fn generate<R: SecureRandomSource + ?Sized>(rng: &mut R) -> Self {
        Self(random_array(rng))
    }

    /// Creates a key from a slice, rejecting anything but 16 bytes
    pub fn from_slice(bytes: &[u8]) -> Result<Self> {
        let array: [u8; KEY_SIZE] = bytes.try_into().map_err(|_| CryptoError::InvalidInputLength {
            engine: Engine::Aes,
            context: "key",
            expected: KEY_SIZE,
            actual: bytes.len(),
        })?;
        Ok(Self(array))
    }

    /// Returns a reference to the raw key bytes
    pub fn as_bytes(&self) -> &[u8; KEY_SIZE] {
        &self.0
    }
}

impl fmt::Debug for SymmetricKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "SymmetricKey([REDACTED])")
    }
}

/// CBC initialization vector; not secret, travels with the ciphertext
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct InitializationVector([u8; BLOCK_SIZE]);

impl InitializationVector {
    pub fn new(bytes: [u8; BLOCK_SIZE]) -> Self {
        Self(bytes)
    }

    /// Creates a fresh random IV
    pub fn generate<R: SecureRandomSource + ?Sized>(rng: &mut R) -> Self {
        Self(random_array(rng))
    }

    pub fn from_slice(bytes: &[u8]) -> Result<Self> {
        let array: [u8; BLOCK_SIZE] =
            bytes.try_into().map_err(|_| CryptoError::InvalidInputLength {
                engine: Engine::Aes,
                context: "initialization vector",
                expected: BLOCK_SIZE,
                actual: bytes.len(),
            })?;
        Ok(Self(array))
    }

    pub fn as_bytes(&self) -> &[u8; BLOCK_SIZE] {
        &self.0
    }
}
