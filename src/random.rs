// Randomness capability
// Engines never reach for a global generator; callers inject one of these

use rand::rngs::StdRng;
use rand::{CryptoRng, RngCore, SeedableRng};

/// A source of uniformly distributed bytes suitable for key material.
///
/// Any `RngCore + CryptoRng` qualifies, so `OsRng`, `StdRng` and seeded
/// ChaCha generators can all be handed to key generation, padding and the
/// hybrid workflow. Tests use seeded generators to get reproducible keys.
pub trait SecureRandomSource: RngCore + CryptoRng {}

impl<T: RngCore + CryptoRng + ?Sized> SecureRandomSource for T {}

/// Default generator for callers that do not need reproducibility
pub fn system_rng() -> StdRng {
    StdRng::from_entropy()
}

/// Fill a fixed-size array from the source
pub fn random_array<const N: usize, R: SecureRandomSource + ?Sized>(rng: &mut R) -> [u8; N] {
    let mut out = [0u8; N];
    rng.fill_bytes(&mut out);
    out
}

/// Produce one non-zero byte, resampling on zero
pub fn random_nonzero_byte<R: SecureRandomSource + ?Sized>(rng: &mut R) -> u8 {
    loop {
        let mut byte = [0u8; 1];
        rng.fill_bytes(&mut byte);
        if byte[0] != 0 {
            return byte[0];
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand_chacha::ChaCha20Rng;

    #[test]
    fn test_seeded_sources_are_reproducible() {
        let mut a = ChaCha20Rng::seed_from_u64(7);
        let mut b = ChaCha20Rng::seed_from_u64(7);
        assert_eq!(random_array::<16, _>(&mut a), random_array::<16, _>(&mut b));
    }

    #[test]
    fn test_nonzero_byte() {
        let mut rng = ChaCha20Rng::seed_from_u64(1);
        for _ in 0..1000 {
            assert_ne!(random_nonzero_byte(&mut rng), 0);
        }
    }

    #[test]
    fn test_system_rng_usable_as_trait_object() {
        let mut rng = system_rng();
        let source: &mut dyn SecureRandomSource = &mut rng;
        let bytes: [u8; 32] = random_array(source);
        assert_eq!(bytes.len(), 32);
    }
}
