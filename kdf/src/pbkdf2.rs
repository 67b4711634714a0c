//! RFC 2898 PBKDF2, wrapped as a [`Drbg`].

use digest_prf::DigestAlgorithm;
use symmetric_core::{Drbg, Error, ErrorKind, Result};

/// PBKDF2. `initialize(password, salt, info)` ignores `info` (PBKDF2 has
/// no third input) and stores `password`/`salt`; `generate` derives
/// `DK = T_1 || T_2 || ...` where `T_i = U_1 XOR ... XOR U_c`, `U_1 =
/// HMAC(password, salt || BE32(i))`, `U_j = HMAC(password, U_{j-1})`.
pub struct Pbkdf2 {
    digest: DigestAlgorithm,
    password: Vec<u8>,
    salt: Vec<u8>,
    iterations: u32,
    produced: usize,
}

impl Pbkdf2 {
    /// Build a PBKDF2 generator over `digest` with `iterations ≥ 1`.
    pub fn new(digest: DigestAlgorithm, iterations: u32) -> Self {
        Self {
            digest,
            password: Vec::new(),
            salt: Vec::new(),
            iterations,
            produced: 0,
        }
    }

    fn block(&self, index: u32) -> Vec<u8> {
        let mut salt_and_index = self.salt.clone();
        salt_and_index.extend_from_slice(&index.to_be_bytes());
        let mut u = digest_prf::hmac(self.digest, &self.password, &salt_and_index);
        let mut t = u.clone();
        for _ in 1..self.iterations {
            u = digest_prf::hmac(self.digest, &self.password, &u);
            for (t_byte, u_byte) in t.iter_mut().zip(u.iter()) {
                *t_byte ^= u_byte;
            }
        }
        t
    }
}

impl Drbg for Pbkdf2 {
    fn key_size(&self) -> usize {
        self.password.len()
    }

    fn initialized(&self) -> bool {
        !self.password.is_empty() || self.produced > 0
    }

    fn initialize(&mut self, key: &[u8], salt: &[u8], _info: &[u8]) -> Result<()> {
        if self.iterations == 0 {
            return Err(Error::new("pbkdf2", "initialize", ErrorKind::InvalidParameter));
        }
        self.password = key.to_vec();
        self.salt = salt.to_vec();
        self.produced = 0;
        Ok(())
    }

    fn generate(&mut self, out: &mut [u8]) -> Result<usize> {
        if self.password.is_empty() && self.salt.is_empty() && self.produced == 0 {
            return Err(Error::new("pbkdf2", "generate", ErrorKind::NotInitialized));
        }
        let hash_len = self.digest.digest_size();
        let max_len = u32::MAX as usize * hash_len;
        if self.produced + out.len() > max_len {
            return Err(Error::new("pbkdf2", "generate", ErrorKind::OutputSizeExceeded));
        }
        let mut written = 0;
        while written < out.len() {
            let block_index = (self.produced / hash_len) as u32 + 1;
            let block = self.block(block_index);
            let offset_in_block = self.produced % hash_len;
            let take = (hash_len - offset_in_block).min(out.len() - written);
            out[written..written + take].copy_from_slice(&block[offset_in_block..offset_in_block + take]);
            written += take;
            self.produced += take;
        }
        Ok(written)
    }

    fn update(&mut self, seed: &[u8]) -> Result<()> {
        self.salt = seed.to_vec();
        self.produced = 0;
        Ok(())
    }
}
