//! ISO 18033-2 KDF2, wrapped as a [`Drbg`].
//!
//! The source this crate's design was distilled from swaps `key` and
//! `salt` in one `Initialize` branch while claiming ISO-18033 semantics in
//! a comment; ISO-18033-2's KDF2 has no salt input at all. Rather than
//! replicate that mismatch, `initialize` here takes `salt` for interface
//! uniformity with the other DRBGs but ignores it, and treats `key` as
//! the shared secret and `info` as `otherInfo` per the standard.

use digest_prf::DigestAlgorithm;
use symmetric_core::{Drbg, Error, ErrorKind, Result};

/// KDF2. `generate` produces `H(secret || BE32(counter) || otherInfo)`
/// concatenated over `counter = 1, 2, ...`.
pub struct Kdf2 {
    digest: DigestAlgorithm,
    secret: Vec<u8>,
    other_info: Vec<u8>,
    produced: usize,
}

impl Kdf2 {
    /// Build a KDF2 generator over `digest`.
    pub fn new(digest: DigestAlgorithm) -> Self {
        Self {
            digest,
            secret: Vec::new(),
            other_info: Vec::new(),
            produced: 0,
        }
    }
}

impl Drbg for Kdf2 {
    fn key_size(&self) -> usize {
        self.secret.len()
    }

    fn initialized(&self) -> bool {
        !self.secret.is_empty()
    }

    fn initialize(&mut self, key: &[u8], _salt: &[u8], info: &[u8]) -> Result<()> {
        self.secret = key.to_vec();
        self.other_info = info.to_vec();
        self.produced = 0;
        Ok(())
    }

    fn generate(&mut self, out: &mut [u8]) -> Result<usize> {
        if !self.initialized() {
            return Err(Error::new("kdf2", "generate", ErrorKind::NotInitialized));
        }
        let hash_len = self.digest.digest_size();
        let mut written = 0;
        while written < out.len() {
            let counter = (self.produced / hash_len) as u32 + 1;
            let mut input = Vec::with_capacity(self.secret.len() + 4 + self.other_info.len());
            input.extend_from_slice(&self.secret);
            input.extend_from_slice(&counter.to_be_bytes());
            input.extend_from_slice(&self.other_info);
            let block = digest_prf::hash(self.digest, &input);
            let offset_in_block = self.produced % hash_len;
            let take = (hash_len - offset_in_block).min(out.len() - written);
            out[written..written + take].copy_from_slice(&block[offset_in_block..offset_in_block + take]);
            written += take;
            self.produced += take;
        }
        Ok(written)
    }

    fn update(&mut self, seed: &[u8]) -> Result<()> {
        self.secret = seed.to_vec();
        self.produced = 0;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn concatenates_hash_blocks_across_counters() {
        let mut kdf2 = Kdf2::new(DigestAlgorithm::Sha256);
        kdf2.initialize(b"shared-secret", b"", b"other-info").unwrap();
        let mut long = vec![0u8; 80];
        kdf2.generate(&mut long).unwrap();

        let mut first_block_input = b"shared-secret".to_vec();
        first_block_input.extend_from_slice(&1u32.to_be_bytes());
        first_block_input.extend_from_slice(b"other-info");
        let first_block = digest_prf::hash(DigestAlgorithm::Sha256, &first_block_input);
        assert_eq!(&long[..32], &first_block[..]);
    }

    #[test]
    fn salt_argument_does_not_affect_output() {
        let mut a = Kdf2::new(DigestAlgorithm::Sha256);
        a.initialize(b"secret", b"ignored-salt-a", b"info").unwrap();
        let mut out_a = [0u8; 16];
        a.generate(&mut out_a).unwrap();

        let mut b = Kdf2::new(DigestAlgorithm::Sha256);
        b.initialize(b"secret", b"totally-different-salt", b"info").unwrap();
        let mut out_b = [0u8; 16];
        b.generate(&mut out_b).unwrap();

        assert_eq!(out_a, out_b);
    }

    #[test]
    fn generate_before_initialize_fails() {
        let mut kdf2 = Kdf2::new(DigestAlgorithm::Sha256);
        let mut out = [0u8; 16];
        let err = kdf2.generate(&mut out).unwrap_err();
        assert_eq!(err.kind, ErrorKind::NotInitialized);
    }
}
