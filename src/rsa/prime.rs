// Prime generation and Miller-Rabin primality testing

use num_bigint::RandBigInt;
use num_integer::Integer;
use num_traits::{One, Zero};

use super::bigint::{mod_exp, RsaBigInt};
use crate::error::{CryptoError, Result};
use crate::random::SecureRandomSource;

/// Default number of Miller-Rabin rounds (error probability <= 4^-20)
pub const DEFAULT_ROUNDS: u32 = 20;

/// Small primes used for trial division before Miller-Rabin
const SMALL_PRIMES: [u32; 24] = [
    3, 5, 7, 11, 13, 17, 19, 23, 29, 31, 37, 41, 43, 47, 53, 59, 61, 67, 71, 73, 79, 83, 89, 97,
];

/// Miller-Rabin primality test
/// Returns true if n is probably prime
pub fn is_probable_prime<R>(n: &RsaBigInt, rounds: u32, rng: &mut R) -> bool
where
    R: SecureRandomSource + ?Sized,
{
    let two = RsaBigInt::from(2u8);
    if n < &two {
        return false;
    }
    if n == &two {
        return true;
    }
    if n.is_even() {
        return false;
    }

    // Trial division pre-filter
    for &p in SMALL_PRIMES.iter() {
        let p = RsaBigInt::from(p);
        if n == &p {
            return true;
        }
        if (n % &p).is_zero() {
            return false;
        }
    }

    // Write n-1 as d * 2^s with d odd
    let n_minus_one = n - 1u8;
    let mut d = n_minus_one.clone();
    let mut s = 0u32;
    while d.is_even() {
        d >>= 1;
        s += 1;
    }

    for _ in 0..rounds {
        // Random witness a in [2, n-2]
        let a = rng.gen_biguint_range(&two, &n_minus_one);

        let mut x = mod_exp(&a, &d, n);
        if x.is_one() || x == n_minus_one {
            continue;
        }

        let mut witness_passed = false;
        for _ in 1..s {
            x = (&x * &x) % n;
            if x == n_minus_one {
                witness_passed = true;
                break;
            }
        }

        if !witness_passed {
            // Composite
            return false;
        }
    }

    // Probably prime
    true
}

/// Generate a random probable prime of exactly `bit_length` bits.
///
/// The top two bits are forced so that the product of two such primes has
/// exactly `2 * bit_length` bits. Widths below 3 bits are rejected.
pub fn random_prime<R>(bit_length: u32, rounds: u32, rng: &mut R) -> Result<RsaBigInt>
where
    R: SecureRandomSource + ?Sized,
{
    if bit_length < 3 {
        return Err(CryptoError::InvalidKeyMaterial(format!(
            "prime width {} too small to force the top two bits",
            bit_length
        )));
    }

    let top_bits = (RsaBigInt::one() << (bit_length - 1)) | (RsaBigInt::one() << (bit_length - 2));

    loop {
        let candidate = rng.gen_biguint(u64::from(bit_length)) | &top_bits | RsaBigInt::one();

        if is_probable_prime(&candidate, rounds, rng) {
            return Ok(candidate);
        }
    }
}
