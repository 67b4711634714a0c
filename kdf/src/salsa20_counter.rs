//! Salsa20-counter DRBG: runs Salsa20 as a keystream generator from a
//! seed-derived key and nonce, the same "CTR-style" discipline
//! [`BlockCipherCounterDrbg`](crate::BlockCipherCounterDrbg) uses for
//! block ciphers, just over a native stream cipher instead.

use digest_prf::DigestAlgorithm;
use salsa20::SalsaStreamCipher;
use symmetric_core::{Drbg, Error, ErrorKind, KeyParams, Result, StreamCipher};

const SALSA_KEY_LEN: usize = 32;
const SALSA_NONCE_LEN: usize = 8;

/// Salsa20-counter DRBG. `initialize(key, salt, info)` derives a 32-byte
/// Salsa20 key and 8-byte nonce via `HKDF(digest, salt, key, info)` and
/// seeds the stream cipher from them; `generate` pulls raw keystream
/// bytes (XOR of the keystream against an all-zero buffer).
pub struct Salsa20CounterDrbg {
    digest: DigestAlgorithm,
    rounds: usize,
    cipher: Option<SalsaStreamCipher>,
    key_size: usize,
}

impl Salsa20CounterDrbg {
    /// Build a Salsa20-counter DRBG with the given round count (8, 12, or
    /// 20) and digest used for key/nonce derivation.
    pub fn new(rounds: usize, digest: DigestAlgorithm) -> Self {
        Self {
            digest,
            rounds,
            cipher: None,
            key_size: 0,
        }
    }

    fn derive_and_seed(&mut self, key: &[u8], salt: &[u8], info: &[u8]) -> Result<()> {
        let prk = digest_prf::hmac(self.digest, salt, key);
        let bytes = digest_prf::hkdf_expand(self.digest, &prk, info, SALSA_KEY_LEN + SALSA_NONCE_LEN)?;
        let mut cipher = SalsaStreamCipher::new(self.rounds);
        let key_params = KeyParams::with_iv(bytes[..SALSA_KEY_LEN].to_vec(), bytes[SALSA_KEY_LEN..].to_vec());
        cipher.initialize(&key_params)?;
        self.cipher = Some(cipher);
        self.key_size = SALSA_KEY_LEN;
        Ok(())
    }
}

impl Drbg for Salsa20CounterDrbg {
    fn key_size(&self) -> usize {
        self.key_size
    }

    fn initialized(&self) -> bool {
        self.cipher.is_some()
    }

    fn initialize(&mut self, key: &[u8], salt: &[u8], info: &[u8]) -> Result<()> {
        self.derive_and_seed(key, salt, info)
    }

    fn generate(&mut self, out: &mut [u8]) -> Result<usize> {
        let cipher = self
            .cipher
            .as_mut()
            .ok_or_else(|| Error::new("salsa20-counter-drbg", "generate", ErrorKind::NotInitialized))?;
        let zeros = vec![0u8; out.len()];
        cipher.transform(&zeros, out);
        Ok(out.len())
    }

    fn update(&mut self, seed: &[u8]) -> Result<()> {
        self.derive_and_seed(seed, &[], &[])
    }
}
