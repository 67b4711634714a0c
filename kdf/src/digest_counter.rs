//! Digest-counter DRBG, patterned on NIST SP 800-90A Appendix E1's
//! hash-based generator: a `seed` and a `state`, both one digest output
//! wide, advanced by two independent 64-bit counters.

use digest_prf::DigestAlgorithm;
use symmetric_core::{Drbg, Error, ErrorKind, Result};

/// Every 10 digest blocks produced, the `seed` is refreshed from itself
/// before continuing — bounding how long a single compromised `state`
/// value can influence future output.
const RESEED_INTERVAL: u64 = 10;

/// Digest-counter DRBG. `generate` advances the state counter once per
/// digest block of output requested; the locking discipline NIST
/// SP 800-90A calls for around `UpdateSeed`/`UpdateCounter`/
/// `GenerateState` is structural here rather than an explicit mutex:
/// `Drbg::generate` takes `&mut self`, so Rust's aliasing rules already
/// forbid two callers from interleaving those three steps.
pub struct DigestCounterDrbg {
    digest: DigestAlgorithm,
    seed: Vec<u8>,
    state: Vec<u8>,
    state_counter: u64,
    generate_calls: u64,
    reseed_counter: u64,
}

impl DigestCounterDrbg {
    /// Build a digest-counter DRBG over `digest`.
    pub fn new(digest: DigestAlgorithm) -> Self {
        Self {
            digest,
            seed: Vec::new(),
            state: Vec::new(),
            state_counter: 0,
            generate_calls: 0,
            reseed_counter: 0,
        }
    }
}

impl Drbg for DigestCounterDrbg {
    fn key_size(&self) -> usize {
        self.seed.len()
    }

    fn initialized(&self) -> bool {
        !self.seed.is_empty()
    }

    fn initialize(&mut self, key: &[u8], salt: &[u8], info: &[u8]) -> Result<()> {
        let mut seed_input = Vec::with_capacity(key.len() + salt.len() + info.len());
        seed_input.extend_from_slice(key);
        seed_input.extend_from_slice(salt);
        seed_input.extend_from_slice(info);
        self.seed = digest_prf::hash(self.digest, &seed_input);
        self.state = digest_prf::hash(self.digest, &self.seed);
        self.state_counter = 0;
        self.generate_calls = 0;
        self.reseed_counter = 0;
        Ok(())
    }

    fn generate(&mut self, out: &mut [u8]) -> Result<usize> {
        if !self.initialized() {
            return Err(Error::new("digest-counter-drbg", "generate", ErrorKind::NotInitialized));
        }
        let digest_size = self.digest.digest_size();
        let mut written = 0;
        while written < out.len() {
            self.state_counter += 1;
            let mut input = Vec::with_capacity(self.state.len() + self.seed.len() + 8);
            input.extend_from_slice(&self.state);
            input.extend_from_slice(&self.seed);
            input.extend_from_slice(&self.state_counter.to_le_bytes());
            self.state = digest_prf::hash(self.digest, &input);

            let take = digest_size.min(out.len() - written);
            out[written..written + take].copy_from_slice(&self.state[..take]);
            written += take;

            self.generate_calls += 1;
            if self.generate_calls % RESEED_INTERVAL == 0 {
                self.reseed_counter += 1;
                let mut reseed_input = Vec::with_capacity(self.seed.len() + 8);
                reseed_input.extend_from_slice(&self.seed);
                reseed_input.extend_from_slice(&self.reseed_counter.to_le_bytes());
                self.seed = digest_prf::hash(self.digest, &reseed_input);
            }
        }
        Ok(written)
    }

    fn update(&mut self, seed: &[u8]) -> Result<()> {
        let mut input = self.seed.clone();
        input.extend_from_slice(seed);
        self.seed = digest_prf::hash(self.digest, &input);
        Ok(())
    }
}
