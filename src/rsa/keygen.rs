// RSA Key Generation
// Produces (N, E, D) from two random primes, retrying until the key is usable

use num_traits::One;
use tracing::{debug, info};

use super::bigint::{byte_width, from_u64, gcd, lcm, mod_inverse, RsaBigInt};
use super::padding::RsaPadding;
use super::prime::{random_prime, DEFAULT_ROUNDS};
use crate::error::{CryptoError, Result};
use crate::random::SecureRandomSource;

/// RSA Public Key
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RsaPublicKey {
    pub n: RsaBigInt, // Modulus
    pub e: RsaBigInt, // Public exponent
}

/// RSA Private Key
#[derive(Clone, PartialEq, Eq)]
pub struct RsaPrivateKey {
    pub n: RsaBigInt, // Modulus (same as public)
    pub d: RsaBigInt, // Private exponent
}

impl std::fmt::Debug for RsaPrivateKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RsaPrivateKey")
            .field("n", &self.n)
            .field("d", &"<redacted>")
            .finish()
    }
}

/// RSA Key Pair (both keys plus the factors they were built from)
#[derive(Debug, Clone)]
pub struct RsaKeyPair {
    pub public_key: RsaPublicKey,
    pub private_key: RsaPrivateKey,
    pub p: RsaBigInt,
    pub q: RsaBigInt,
    pub bit_length: u32,
}

impl RsaPublicKey {
    /// Bit length of the modulus
    pub fn bit_length(&self) -> u64 {
        self.n.bits()
    }

    /// Modulus width K in bytes
    pub fn key_size(&self) -> usize {
        byte_width(&self.n)
    }
}

impl RsaPrivateKey {
    /// Bit length of the modulus
    pub fn bit_length(&self) -> u64 {
        self.n.bits()
    }

    /// Modulus width K in bytes
    pub fn key_size(&self) -> usize {
        byte_width(&self.n)
    }
}

impl RsaKeyPair {
    /// Carmichael totient λ(N) = lcm(p-1, q-1)
    pub fn lambda(&self) -> RsaBigInt {
        lcm(&(&self.p - 1u8), &(&self.q - 1u8))
    }

    /// Check the pair against its defining invariants:
    /// N = p*q, gcd(E, λ) = 1 and E*D ≡ 1 (mod λ)
    pub fn is_consistent(&self) -> bool {
        let lambda = self.lambda();
        self.public_key.n == &self.p * &self.q
            && self.public_key.n == self.private_key.n
            && gcd(&self.public_key.e, &lambda).is_one()
            && ((&self.public_key.e * &self.private_key.d) % &lambda).is_one()
    }
}

/// Configuration for RSA key generation
#[derive(Clone, Debug)]
pub struct KeyGenConfig {
    pub bit_width: u32,
    pub public_exponent: u64,
    pub primality_rounds: u32,
    pub max_attempts: u32,
    pub padding: RsaPadding,
}

impl Default for KeyGenConfig {
    fn default() -> Self {
        Self {
            bit_width: 64,
            public_exponent: 65537,
            primality_rounds: DEFAULT_ROUNDS,
            max_attempts: 10_000,
            padding: RsaPadding::COMPACT,
        }
    }
}

impl KeyGenConfig {
    /// Config for a wider modulus using standard PKCS#1 v1.5 padding
    pub fn standard(bit_width: u32) -> Self {
        Self {
            bit_width,
            padding: RsaPadding::PKCS1,
            ..Self::default()
        }
    }

    pub fn with_bit_width(mut self, bits: u32) -> Self {
        self.bit_width = bits;
        self
    }

    pub fn with_public_exponent(mut self, e: u64) -> Self {
        self.public_exponent = e;
        self
    }

    pub fn with_primality_rounds(mut self, rounds: u32) -> Self {
        self.primality_rounds = rounds;
        self
    }

    pub fn with_max_attempts(mut self, attempts: u32) -> Self {
        self.max_attempts = attempts;
        self
    }

    pub fn with_padding(mut self, padding: RsaPadding) -> Self {
        self.padding = padding;
        self
    }

    /// Smallest modulus bit width whose blocks carry at least one payload byte
    pub fn min_bit_width(&self) -> u32 {
        (self.padding.overhead() * 8 + 1) as u32
    }

    fn validate(&self) -> Result<()> {
        if self.bit_width % 2 != 0 {
            return Err(CryptoError::InvalidKeyMaterial(
                "bit width must be even (p and q have equal bit length)".to_string(),
            ));
        }
        if self.bit_width < self.min_bit_width() {
            return Err(CryptoError::InvalidKeyMaterial(format!(
                "bit width {} below minimum {} for the configured padding",
                self.bit_width,
                self.min_bit_width()
            )));
        }
        if self.public_exponent < 3 || self.public_exponent % 2 == 0 {
            return Err(CryptoError::InvalidKeyMaterial(format!(
                "public exponent {} must be odd and at least 3",
                self.public_exponent
            )));
        }
        if self.primality_rounds == 0 {
            return Err(CryptoError::InvalidKeyMaterial(
                "primality_rounds must be positive".to_string(),
            ));
        }
        if self.max_attempts == 0 {
            return Err(CryptoError::InvalidKeyMaterial(
                "max_attempts must be positive".to_string(),
            ));
        }
        Ok(())
    }
}

/// Generate an RSA key pair of `bit_width` bits with default settings
pub fn generate_keypair<R>(bit_width: u32, rng: &mut R) -> Result<RsaKeyPair>
where
    R: SecureRandomSource + ?Sized,
{
    let key_size = bit_width.div_ceil(8) as usize;
    let config = KeyGenConfig::default()
        .with_bit_width(bit_width)
        .with_padding(RsaPadding::for_key_size(key_size));
    generate_keypair_with(&config, rng)
}

/// Generate an RSA key pair according to `config`.
///
/// p and q are resampled until they are distinct, gcd(E, λ) = 1, the
/// modulus is wide enough for the configured padding and D exists. Each
/// failed candidate counts as one attempt.
pub fn generate_keypair_with<R>(config: &KeyGenConfig, rng: &mut R) -> Result<RsaKeyPair>
where
    R: SecureRandomSource + ?Sized,
{
    config.validate()?;

    let e = from_u64(config.public_exponent);
    let half_bits = config.bit_width / 2;
    let rounds = config.primality_rounds;

    // Step 1: Generate p
    let mut p = random_prime(half_bits, rounds, rng)?;
    let mut attempts = 0u32;

    loop {
        if attempts >= config.max_attempts {
            return Err(CryptoError::KeyGenerationExhausted { attempts });
        }
        attempts += 1;

        // e must be coprime with p-1 for it to be coprime with λ
        if !gcd(&e, &(&p - 1u8)).is_one() {
            debug!(attempt = attempts, "gcd(e, p-1) != 1, resampling p");
            p = random_prime(half_bits, rounds, rng)?;
            continue;
        }

        // Step 2: Generate q distinct from p
        let q = random_prime(half_bits, rounds, rng)?;
        if p == q {
            debug!(attempt = attempts, "p == q, resampling q");
            continue;
        }

        // Step 3: Compute n = p * q and check it fits the padding scheme
        let n = &p * &q;
        if n.bits() < u64::from(config.min_bit_width()) {
            debug!(attempt = attempts, bits = n.bits(), "modulus too narrow, resampling q");
            continue;
        }

        // Step 4: Compute λ(n) = lcm(p-1, q-1) and check e
        let lambda = lcm(&(&p - 1u8), &(&q - 1u8));
        if !gcd(&e, &lambda).is_one() {
            debug!(attempt = attempts, "gcd(e, λ) != 1, resampling q");
            continue;
        }

        // Step 5: Compute d = e^(-1) mod λ(n)
        let d = match mod_inverse(&e, &lambda) {
            Ok(d) => d,
            Err(CryptoError::NoInverse) => {
                debug!(attempt = attempts, "no inverse for e, resampling q");
                continue;
            }
            Err(other) => return Err(other),
        };

        info!(bits = n.bits(), attempts, "RSA key pair generated");

        return Ok(RsaKeyPair {
            public_key: RsaPublicKey { n: n.clone(), e: e.clone() },
            private_key: RsaPrivateKey { n, d },
            p,
            q,
            bit_length: config.bit_width,
        });
    }
}
