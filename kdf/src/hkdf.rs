//! RFC 5869 HKDF: `Extract` then `Expand`, wrapped as a [`Drbg`].

use digest_prf::DigestAlgorithm;
use symmetric_core::{Drbg, Error, ErrorKind, Result};

/// HKDF. `initialize(ikm, salt, info)` runs Extract (`PRK = HMAC(salt,
/// ikm)`) and stashes `info` for repeated Expand calls; `generate` runs
/// Expand (`T(i) = HMAC(PRK, T(i-1) || info || i)`), up to 255 digest
/// blocks total across the lifetime of one `initialize`.
pub struct Hkdf {
    digest: DigestAlgorithm,
    prk: Vec<u8>,
    info: Vec<u8>,
    produced: usize,
}

impl Hkdf {
    /// Build an HKDF generator over the given digest.
    pub fn new(digest: DigestAlgorithm) -> Self {
        Self {
            digest,
            prk: Vec::new(),
            info: Vec::new(),
            produced: 0,
        }
    }
}

impl Drbg for Hkdf {
    fn key_size(&self) -> usize {
        self.prk.len()
    }

    fn initialized(&self) -> bool {
        !self.prk.is_empty()
    }

    fn initialize(&mut self, key: &[u8], salt: &[u8], info: &[u8]) -> Result<()> {
        self.prk = digest_prf::hmac(self.digest, salt, key);
        self.info = info.to_vec();
        self.produced = 0;
        Ok(())
    }

    fn generate(&mut self, out: &mut [u8]) -> Result<usize> {
        if !self.initialized() {
            return Err(Error::new("hkdf", "generate", ErrorKind::NotInitialized));
        }
        let max_len = 255 * self.digest.digest_size();
        if self.produced + out.len() > max_len {
            return Err(Error::new("hkdf", "generate", ErrorKind::OutputSizeExceeded));
        }
        // HKDF-Expand is stateless in `i`; re-deriving the full prefix each
        // call and slicing the newly requested tail keeps repeated
        // `generate` calls prefix-stable without tracking `T(i-1)` here.
        let okm = digest_prf::hkdf_expand(self.digest, &self.prk, &self.info, self.produced + out.len())?;
        out.copy_from_slice(&okm[self.produced..]);
        self.produced += out.len();
        Ok(out.len())
    }

    fn update(&mut self, seed: &[u8]) -> Result<()> {
        self.prk = digest_prf::hmac(self.digest, &self.prk, seed);
        self.produced = 0;
        Ok(())
    }
}
