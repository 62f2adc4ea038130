// Error types for the hybrid encryption engine
// Every failure names the engine and the stage that raised it

use std::fmt;

use thiserror::Error;

/// Cryptographic engine that raised an error
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Engine {
    Aes,
    Rsa,
}

impl fmt::Display for Engine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Engine::Aes => write!(f, "AES"),
            Engine::Rsa => write!(f, "RSA"),
        }
    }
}

/// Stage of an operation at which an error was raised
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    PaddingValidation,
    Computation,
    KeyGeneration,
    Framing,
}

/// Errors produced by the AES and RSA engines and the hybrid workflow
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CryptoError {
    /// Malformed PKCS7 padding (AES) or PKCS#1 markers (RSA)
    #[error("{engine} padding error: {reason}")]
    Padding { engine: Engine, reason: &'static str },

    /// gcd(a, m) != 1, so no modular inverse exists
    #[error("no modular inverse exists")]
    NoInverse,

    /// The key generation retry loop hit its configured bound
    #[error("key generation exhausted after {attempts} attempts")]
    KeyGenerationExhausted { attempts: u32 },

    /// Input length not accepted by an engine
    #[error("{engine} invalid {context} length: expected {expected}, got {actual}")]
    InvalidInputLength {
        engine: Engine,
        context: &'static str,
        expected: usize,
        actual: usize,
    },

    /// Key parameters are unusable (bad exponent, ciphertext >= modulus, ...)
    #[error("invalid key material: {0}")]
    InvalidKeyMaterial(String),

    /// Recovered plaintext differs from the original
    #[error("hybrid self-check failed: recovered plaintext differs from original")]
    SelfCheckFailed,

    /// A workflow transition ran without the artifact an earlier one produces
    #[error("hybrid workflow is missing its {0}")]
    MissingArtifact(&'static str),

    /// Serialized envelope or key file could not be decoded
    #[error("encoding error: {0}")]
    Encoding(String),
}

impl CryptoError {
    /// Stage of the operation that raised this error
    pub fn stage(&self) -> Stage {
        match self {
            CryptoError::Padding { .. } => Stage::PaddingValidation,
            CryptoError::NoInverse | CryptoError::KeyGenerationExhausted { .. } => {
                Stage::KeyGeneration
            }
            CryptoError::InvalidInputLength { .. }
            | CryptoError::InvalidKeyMaterial(_)
            | CryptoError::SelfCheckFailed
            | CryptoError::MissingArtifact(_) => Stage::Computation,
            CryptoError::Encoding(_) => Stage::Framing,
        }
    }

    /// Engine that raised this error, if it came from one
    pub fn engine(&self) -> Option<Engine> {
        match self {
            CryptoError::Padding { engine, .. }
            | CryptoError::InvalidInputLength { engine, .. } => Some(*engine),
            CryptoError::NoInverse
            | CryptoError::KeyGenerationExhausted { .. }
            | CryptoError::InvalidKeyMaterial(_) => Some(Engine::Rsa),
            CryptoError::SelfCheckFailed
            | CryptoError::MissingArtifact(_)
            | CryptoError::Encoding(_) => None,
        }
    }

    pub(crate) fn aes_padding(reason: &'static str) -> Self {
        CryptoError::Padding {
            engine: Engine::Aes,
            reason,
        }
    }

    pub(crate) fn rsa_padding(reason: &'static str) -> Self {
        CryptoError::Padding {
            engine: Engine::Rsa,
            reason,
        }
    }
}

/// Result type for engine operations
pub type Result<T> = std::result::Result<T, CryptoError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_padding() {
        let err = CryptoError::aes_padding("inconsistent padding bytes");
        assert_eq!(
            format!("{}", err),
            "AES padding error: inconsistent padding bytes"
        );
    }

    #[test]
    fn test_display_invalid_length() {
        let err = CryptoError::InvalidInputLength {
            engine: Engine::Rsa,
            context: "payload",
            expected: 5,
            actual: 16,
        };
        assert_eq!(
            format!("{}", err),
            "RSA invalid payload length: expected 5, got 16"
        );
    }

    #[test]
    fn test_stage_classification() {
        assert_eq!(
            CryptoError::rsa_padding("missing delimiter").stage(),
            Stage::PaddingValidation
        );
        assert_eq!(CryptoError::NoInverse.stage(), Stage::KeyGeneration);
        assert_eq!(
            CryptoError::KeyGenerationExhausted { attempts: 3 }.stage(),
            Stage::KeyGeneration
        );
        assert_eq!(
            CryptoError::Encoding("bad base64".into()).stage(),
            Stage::Framing
        );
    }

    #[test]
    fn test_engine_attribution() {
        assert_eq!(
            CryptoError::aes_padding("x").engine(),
            Some(Engine::Aes)
        );
        assert_eq!(CryptoError::NoInverse.engine(), Some(Engine::Rsa));
        assert_eq!(CryptoError::SelfCheckFailed.engine(), None);
    }
}
