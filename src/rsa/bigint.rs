// RSA Big Integer Operations
// Modular arithmetic over num-bigint used by key generation and the RSA engine

use num_bigint::{BigInt, BigUint, Sign};
use num_integer::Integer;
use num_traits::{One, Zero};

use crate::error::{CryptoError, Result};

/// RSA Big Integer type alias
pub type RsaBigInt = BigUint;

/// Create a big integer from u64
pub fn from_u64(n: u64) -> RsaBigInt {
    RsaBigInt::from(n)
}

/// Create a big integer from bytes (big-endian)
pub fn from_bytes(bytes: &[u8]) -> RsaBigInt {
    RsaBigInt::from_bytes_be(bytes)
}

/// Serialize to exactly `width` big-endian bytes.
///
/// Fails when the value does not fit, never truncates.
pub fn to_bytes_fixed(n: &RsaBigInt, width: usize) -> Result<Vec<u8>> {
    let raw = if n.is_zero() { Vec::new() } else { n.to_bytes_be() };
    if raw.len() > width {
        return Err(CryptoError::InvalidKeyMaterial(format!(
            "integer needs {} bytes, wider than {}",
            raw.len(),
            width
        )));
    }
    let mut out = vec![0u8; width];
    out[width - raw.len()..].copy_from_slice(&raw);
    Ok(out)
}

/// Byte width of a modulus: ceil(bits / 8)
pub fn byte_width(n: &RsaBigInt) -> usize {
    ((n.bits() + 7) / 8) as usize
}

/// Modular exponentiation: base^exp mod modulus
///
/// Square-and-multiply from the most significant exponent bit down,
/// reducing after every multiplication.
pub fn mod_exp(base: &RsaBigInt, exp: &RsaBigInt, modulus: &RsaBigInt) -> RsaBigInt {
    if modulus.is_one() {
        return RsaBigInt::zero();
    }

    let base = base % modulus;
    let mut result = RsaBigInt::one();

    for byte in exp.to_bytes_be() {
        for bit in (0..8).rev() {
            result = (&result * &result) % modulus;
            if (byte >> bit) & 1 == 1 {
                result = (&result * &base) % modulus;
            }
        }
    }

    result
}

/// Extended Euclidean Algorithm
/// Returns (gcd, x, y) such that a*x + b*y = gcd
pub fn extended_gcd(a: &BigInt, b: &BigInt) -> (BigInt, BigInt, BigInt) {
    let (mut old_r, mut r) = (a.clone(), b.clone());
    let (mut old_s, mut s) = (BigInt::one(), BigInt::zero());
    let (mut old_t, mut t) = (BigInt::zero(), BigInt::one());

    while !r.is_zero() {
        let quotient = &old_r / &r;

        let next_r = &old_r - &quotient * &r;
        old_r = std::mem::replace(&mut r, next_r);

        let next_s = &old_s - &quotient * &s;
        old_s = std::mem::replace(&mut s, next_s);

        let next_t = &old_t - &quotient * &t;
        old_t = std::mem::replace(&mut t, next_t);
    }

    (old_r, old_s, old_t)
}

/// Compute modular inverse: a^(-1) mod m
pub fn mod_inverse(a: &RsaBigInt, m: &RsaBigInt) -> Result<RsaBigInt> {
    if m.is_zero() {
        return Err(CryptoError::NoInverse);
    }
    if m.is_one() {
        return Ok(RsaBigInt::zero());
    }

    let a_signed = BigInt::from_biguint(Sign::Plus, a % m);
    let m_signed = BigInt::from_biguint(Sign::Plus, m.clone());
    let (gcd, x, _) = extended_gcd(&a_signed, &m_signed);

    if !gcd.is_one() {
        return Err(CryptoError::NoInverse);
    }

    // Bring the Bezout coefficient into [0, m)
    let reduced = x.mod_floor(&m_signed);
    reduced
        .to_biguint()
        .ok_or(CryptoError::NoInverse)
}

/// Greatest common divisor
pub fn gcd(a: &RsaBigInt, b: &RsaBigInt) -> RsaBigInt {
    a.gcd(b)
}

/// Least common multiple
pub fn lcm(a: &RsaBigInt, b: &RsaBigInt) -> RsaBigInt {
    if a.is_zero() || b.is_zero() {
        return RsaBigInt::zero();
    }
    (a / gcd(a, b)) * b
}
