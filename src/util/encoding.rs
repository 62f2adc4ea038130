// PEM-like key file encoding
// Body is base64 of "<modulus>:<exponent>" in decimal

use base64::engine::general_purpose::STANDARD;
use base64::Engine as _;
use num_traits::Zero;

use crate::error::{CryptoError, Result};
use crate::rsa::{RsaBigInt, RsaPrivateKey, RsaPublicKey};

/// Which half of the pair a key file holds
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyKind {
    Public,
    Private,
}

impl KeyKind {
    fn label(self) -> &'static str {
        match self {
            KeyKind::Public => "HYBRID RSA PUBLIC KEY",
            KeyKind::Private => "HYBRID RSA PRIVATE KEY",
        }
    }
}

/// Wrap a (modulus, exponent) pair in BEGIN/END armor
pub fn encode_key(kind: KeyKind, modulus: &RsaBigInt, exponent: &RsaBigInt) -> String {
    let body = STANDARD.encode(format!("{}:{}", modulus, exponent));
    format!(
        "-----BEGIN {label}-----\n{body}\n-----END {label}-----\n",
        label = kind.label(),
        body = body
    )
}

/// Parse armor produced by [`encode_key`] back into (modulus, exponent)
pub fn decode_key(kind: KeyKind, text: &str) -> Result<(RsaBigInt, RsaBigInt)> {
    let begin = format!("-----BEGIN {}-----", kind.label());
    let end = format!("-----END {}-----", kind.label());

    let mut lines = text.lines().map(str::trim).filter(|line| !line.is_empty());
    if lines.next() != Some(begin.as_str()) {
        return Err(CryptoError::Encoding(format!("missing '{}' header", begin)));
    }

    let mut body = String::new();
    let mut terminated = false;
    for line in lines.by_ref() {
        if line == end {
            terminated = true;
            break;
        }
        body.push_str(line);
    }
    if !terminated {
        return Err(CryptoError::Encoding(format!("missing '{}' footer", end)));
    }

    let decoded = STANDARD
        .decode(body.as_bytes())
        .map_err(|e| CryptoError::Encoding(format!("invalid base64: {}", e)))?;
    let decoded = String::from_utf8(decoded)
        .map_err(|_| CryptoError::Encoding("key body is not UTF-8".to_string()))?;

    let (modulus, exponent) = decoded
        .split_once(':')
        .ok_or_else(|| CryptoError::Encoding("key body lacks ':' separator".to_string()))?;

    let modulus = parse_decimal(modulus)?;
    let exponent = parse_decimal(exponent)?;
    if modulus.is_zero() || exponent.is_zero() {
        return Err(CryptoError::InvalidKeyMaterial(
            "modulus and exponent must be positive".to_string(),
        ));
    }
    Ok((modulus, exponent))
}

fn parse_decimal(text: &str) -> Result<RsaBigInt> {
    RsaBigInt::parse_bytes(text.as_bytes(), 10)
        .ok_or_else(|| CryptoError::Encoding(format!("'{}' is not a decimal integer", text)))
}

pub fn encode_public_key(key: &RsaPublicKey) -> String {
    encode_key(KeyKind::Public, &key.n, &key.e)
}

pub fn encode_private_key(key: &RsaPrivateKey) -> String {
    encode_key(KeyKind::Private, &key.n, &key.d)
}

pub fn decode_public_key(text: &str) -> Result<RsaPublicKey> {
    let (n, e) = decode_key(KeyKind::Public, text)?;
    Ok(RsaPublicKey { n, e })
}

pub fn decode_private_key(text: &str) -> Result<RsaPrivateKey> {
    let (n, d) = decode_key(KeyKind::Private, text)?;
    Ok(RsaPrivateKey { n, d })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rsa::bigint::from_u64;

    #[test]
    fn test_public_key_armor() {
        let key = RsaPublicKey { n: from_u64(3233), e: from_u64(17) };
        let text = encode_public_key(&key);

        assert!(text.starts_with("-----BEGIN HYBRID RSA PUBLIC KEY-----\n"));
        // base64("3233:17")
        assert!(text.contains("\nMzIzMzoxNw==\n"));
        assert_eq!(decode_public_key(&text).unwrap(), key);
    }

    #[test]
    fn test_private_key_roundtrip() {
        let key = RsaPrivateKey { n: from_u64(3233), d: from_u64(413) };
        assert_eq!(decode_private_key(&encode_private_key(&key)).unwrap(), key);
    }

    #[test]
    fn test_kind_mismatch_rejected() {
        let key = RsaPublicKey { n: from_u64(3233), e: from_u64(17) };
        let text = encode_public_key(&key);
        assert!(matches!(decode_private_key(&text), Err(CryptoError::Encoding(_))));
    }

    fn armored(body: &str) -> String {
        format!(
            "-----BEGIN HYBRID RSA PUBLIC KEY-----\n{}\n-----END HYBRID RSA PUBLIC KEY-----\n",
            body
        )
    }

    #[test]
    fn test_malformed_bodies() {
        let missing_footer = "-----BEGIN HYBRID RSA PUBLIC KEY-----\nMzIzMzoxNw==\n";
        assert!(decode_public_key(missing_footer).is_err());

        let bad_base64 =
            "-----BEGIN HYBRID RSA PUBLIC KEY-----\n!!!\n-----END HYBRID RSA PUBLIC KEY-----\n";
        assert!(decode_public_key(bad_base64).is_err());

        // base64("3233")
        let no_separator = armored("MzIzMw==");
        assert!(decode_public_key(&no_separator).is_err());

        // base64("0:17")
        let zero_modulus = armored("MDoxNw==");
        assert!(matches!(
            decode_public_key(&zero_modulus),
            Err(CryptoError::InvalidKeyMaterial(_))
        ));
    }
}
