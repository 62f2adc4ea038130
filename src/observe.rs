// Observability hook for the hybrid workflow
// The engines report what happened through `record`; how it is shown is the observer's business

use sha2::{Digest, Sha256};

/// Something worth reporting during a hybrid run
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Event {
    KeyPairGenerated { modulus_bits: u64, public_fingerprint: String, private_fingerprint: String },
    SymmetricKeyGenerated { fingerprint: String },
    MessageEncrypted { plaintext_len: usize, ciphertext_len: usize },
    KeyEncrypted { blocks: usize },
    KeyDecrypted { fingerprint: String },
    MessageDecrypted { plaintext_len: usize },
    SelfCheckPassed,
}

/// Receiver of workflow events
pub trait Observer {
    fn record(&mut self, event: &Event);
}

/// Discards every event
#[derive(Debug, Default, Clone, Copy)]
pub struct NullObserver;

impl Observer for NullObserver {
    fn record(&mut self, _event: &Event) {}
}

/// Logs every event through `tracing` at info level
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingObserver;

impl Observer for TracingObserver {
    fn record(&mut self, event: &Event) {
        match event {
            Event::KeyPairGenerated { modulus_bits, public_fingerprint, private_fingerprint } => {
                tracing::info!(
                    modulus_bits,
                    public = public_fingerprint.as_str(),
                    private = private_fingerprint.as_str(),
                    "RSA key pair ready (exponents shown as SHA-256)"
                )
            }
            Event::SymmetricKeyGenerated { fingerprint } => {
                tracing::info!(key = fingerprint.as_str(), "AES key generated")
            }
            Event::MessageEncrypted { plaintext_len, ciphertext_len } => {
                tracing::info!(plaintext_len, ciphertext_len, "message encrypted with AES-CBC")
            }
            Event::KeyEncrypted { blocks } => {
                tracing::info!(blocks, "AES key encrypted with RSA public key")
            }
            Event::KeyDecrypted { fingerprint } => {
                tracing::info!(key = fingerprint.as_str(), "AES key recovered with RSA private key")
            }
            Event::MessageDecrypted { plaintext_len } => {
                tracing::info!(plaintext_len, "message decrypted")
            }
            Event::SelfCheckPassed => {
                tracing::info!("decrypted message matches the original plaintext")
            }
        }
    }
}

impl<O: Observer + ?Sized> Observer for &mut O {
    fn record(&mut self, event: &Event) {
        (**self).record(event)
    }
}

/// SHA-256 of `data` as lowercase hex, for displaying secrets without revealing them
pub fn fingerprint(data: &[u8]) -> String {
    hex::encode(Sha256::digest(data))
}
