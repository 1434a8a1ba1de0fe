// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Authenticated encryption for stored blobs (AES-256-GCM via `ring`).
//!
//! ## Wire Format
//!
//! ```text
//! version (1) || nonce (12) || ciphertext (n) || tag (16)
//! ```
//!
//! A fresh random nonce is drawn for every call, so sealing the same
//! plaintext twice yields different blobs.

use std::fmt;

use ring::aead::{Aad, LessSafeKey, Nonce, UnboundKey, AES_256_GCM, NONCE_LEN};
use ring::rand::{SecureRandom, SystemRandom};

use super::{EncryptionKey, StorageError, StorageResult};

/// Leading byte of every blob produced by [`CipherCodec::encrypt`].
pub const FORMAT_VERSION: u8 = 0x01;

/// GCM authentication tag length.
pub const TAG_LEN: usize = 16;

const HEADER_LEN: usize = 1 + NONCE_LEN;

/// Encrypts and decrypts whole payloads under the storage key.
pub struct CipherCodec {
    key: LessSafeKey,
    rng: SystemRandom,
}

impl CipherCodec {
    pub fn new(key: &EncryptionKey) -> StorageResult<Self> {
        let unbound = UnboundKey::new(&AES_256_GCM, key.as_bytes())
            .map_err(|_| StorageError::InvalidKey("rejected by AES-256-GCM".to_string()))?;
        Ok(Self {
            key: LessSafeKey::new(unbound),
            rng: SystemRandom::new(),
        })
    }

    /// Bytes added to every plaintext by [`encrypt`](Self::encrypt).
    pub const fn overhead() -> usize {
        HEADER_LEN + TAG_LEN
    }

    /// Seal `plaintext`, embedding the nonce in the output.
    pub fn encrypt(&self, plaintext: &[u8]) -> StorageResult<Vec<u8>> {
        let mut nonce_bytes = [0u8; NONCE_LEN];
        self.rng
            .fill(&mut nonce_bytes)
            .map_err(|_| StorageError::Encryption("system RNG unavailable".to_string()))?;

        let mut sealed = Vec::with_capacity(plaintext.len() + Self::overhead());
        sealed.push(FORMAT_VERSION);
        sealed.extend_from_slice(&nonce_bytes);
        sealed.extend_from_slice(plaintext);

        let mut body = sealed.split_off(HEADER_LEN);
        self.key
            .seal_in_place_append_tag(
                Nonce::assume_unique_for_key(nonce_bytes),
                Aad::empty(),
                &mut body,
            )
            .map_err(|_| StorageError::Encryption("AEAD seal failed".to_string()))?;
        sealed.append(&mut body);

        Ok(sealed)
    }

    /// Open a blob produced by [`encrypt`](Self::encrypt).
    ///
    /// # Errors
    /// `StorageError::Decryption` if the blob is truncated, carries an
    /// unknown version byte, or fails authentication (tampered, or sealed
    /// under a different key).
    pub fn decrypt(&self, ciphertext: &[u8]) -> StorageResult<Vec<u8>> {
        if ciphertext.len() < Self::overhead() {
            return Err(StorageError::Decryption(format!(
                "ciphertext is {} bytes, minimum is {}",
                ciphertext.len(),
                Self::overhead()
            )));
        }
        if ciphertext[0] != FORMAT_VERSION {
            return Err(StorageError::Decryption(format!(
                "unsupported format version {:#04x}",
                ciphertext[0]
            )));
        }

        let nonce = Nonce::try_assume_unique_for_key(&ciphertext[1..HEADER_LEN])
            .map_err(|_| StorageError::Decryption("malformed nonce".to_string()))?;

        let mut buffer = ciphertext[HEADER_LEN..].to_vec();
        let plaintext_len = self
            .key
            .open_in_place(nonce, Aad::empty(), &mut buffer)
            .map_err(|_| StorageError::Decryption("authentication tag mismatch".to_string()))?
            .len();
        buffer.truncate(plaintext_len);

        Ok(buffer)
    }
}

impl fmt::Debug for CipherCodec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CipherCodec")
            .field("algorithm", &"AES-256-GCM")
            .finish_non_exhaustive()
    }
}
