//! Seals the access token before it reaches durable storage.
//!
//! AES-256-GCM via `ring`, key derived with PBKDF2-HMAC-SHA256. The sealed
//! form is `base64(nonce || ciphertext || tag)` so it fits a string slot.

use std::num::NonZeroU32;

use base64::{engine::general_purpose::STANDARD as BASE64, Engine as _};
use ring::aead::{self, Aad, BoundKey, Nonce, NonceSequence, UnboundKey, AES_256_GCM};
use ring::pbkdf2;
use ring::rand::{SecureRandom, SystemRandom};
use zeroize::{Zeroize, Zeroizing};

use crate::types::errors::CryptoError;

/// PBKDF2 iteration count for key derivation.
const PBKDF2_ITERATIONS: u32 = 100_000;

/// AES-256-GCM key length in bytes.
const KEY_LENGTH: usize = 32;

/// AES-256-GCM nonce length in bytes.
const NONCE_LENGTH: usize = 12;

/// AES-256-GCM authentication tag length in bytes.
const TAG_LENGTH: usize = 16;

/// A nonce sequence that yields exactly one nonce.
struct SingleNonce {
    nonce: Option<[u8; NONCE_LENGTH]>,
}

impl NonceSequence for SingleNonce {
    fn advance(&mut self) -> Result<Nonce, ring::error::Unspecified> {
        self.nonce
            .take()
            .map(Nonce::assume_unique_for_key)
            .ok_or(ring::error::Unspecified)
    }
}

/// Holds the derived sealing key. The key is wiped on drop.
pub struct TokenSealer {
    rng: SystemRandom,
    key: Zeroizing<Vec<u8>>,
}

impl TokenSealer {
    /// Derives the sealing key from a passphrase and salt.
    pub fn derive(passphrase: &str, salt: &[u8]) -> Result<Self, CryptoError> {
        let iterations = NonZeroU32::new(PBKDF2_ITERATIONS)
            .ok_or_else(|| CryptoError::KeyDerivation("Invalid iteration count".to_string()))?;

        let mut key = Zeroizing::new(vec![0u8; KEY_LENGTH]);
        pbkdf2::derive(
            pbkdf2::PBKDF2_HMAC_SHA256,
            iterations,
            salt,
            passphrase.as_bytes(),
            &mut key,
        );

        Ok(Self {
            rng: SystemRandom::new(),
            key,
        })
    }

    /// Encrypts `plaintext` and returns the base64 sealed form.
    pub fn seal(&self, plaintext: &str) -> Result<String, CryptoError> {
        let mut nonce_bytes = [0u8; NONCE_LENGTH];
        self.rng
            .fill(&mut nonce_bytes)
            .map_err(|_| CryptoError::RandomGeneration("Failed to generate nonce".to_string()))?;

        let unbound_key = UnboundKey::new(&AES_256_GCM, &self.key)
            .map_err(|_| CryptoError::Encryption("Failed to create encryption key".to_string()))?;
        let mut sealing_key = aead::SealingKey::new(
            unbound_key,
            SingleNonce {
                nonce: Some(nonce_bytes),
            },
        );

        let mut in_out = plaintext.as_bytes().to_vec();
        sealing_key
            .seal_in_place_append_tag(Aad::empty(), &mut in_out)
            .map_err(|_| CryptoError::Encryption("Encryption operation failed".to_string()))?;

        let mut sealed = Vec::with_capacity(NONCE_LENGTH + in_out.len());
        sealed.extend_from_slice(&nonce_bytes);
        sealed.extend_from_slice(&in_out);
        Ok(BASE64.encode(sealed))
    }

    /// Decrypts a value produced by [`TokenSealer::seal`].
    pub fn open(&self, sealed: &str) -> Result<Zeroizing<String>, CryptoError> {
        let raw = BASE64
            .decode(sealed.trim())
            .map_err(|e| CryptoError::Decryption(format!("base64 decode error: {}", e)))?;

        if raw.len() < NONCE_LENGTH + TAG_LENGTH {
            return Err(CryptoError::Decryption(format!(
                "Sealed value too short: {} bytes",
                raw.len()
            )));
        }

        let mut nonce_bytes = [0u8; NONCE_LENGTH];
        nonce_bytes.copy_from_slice(&raw[..NONCE_LENGTH]);

        let unbound_key = UnboundKey::new(&AES_256_GCM, &self.key)
            .map_err(|_| CryptoError::Decryption("Failed to create decryption key".to_string()))?;
        let mut opening_key = aead::OpeningKey::new(
            unbound_key,
            SingleNonce {
                nonce: Some(nonce_bytes),
            },
        );

        let mut in_out = raw[NONCE_LENGTH..].to_vec();
        let plaintext = opening_key
            .open_in_place(Aad::empty(), &mut in_out)
            .map_err(|_| CryptoError::Decryption("Authentication failed".to_string()))?;

        let text = String::from_utf8(plaintext.to_vec())
            .map_err(|e| CryptoError::Decryption(e.to_string()));
        in_out.zeroize();
        text.map(Zeroizing::new)
    }
}
