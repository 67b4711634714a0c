//! Block-cipher-counter DRBG: runs any [`BlockCipher`] in CTR mode from a
//! seed-derived key and counter, the same construction
//! [`Salsa20CounterDrbg`](crate::Salsa20CounterDrbg) uses over the stream
//! cipher side.

use block_modes::Ctr;
use digest_prf::DigestAlgorithm;
use symmetric_core::{BlockCipher, Direction, Drbg, Error, ErrorKind, KeyParams, Mode, Result};

/// Block-cipher-counter DRBG over any `C: BlockCipher + Clone + Default`.
/// `initialize(key, salt, info)` derives a key (sized to `C`'s smallest
/// legal key size) and a full-block counter via
/// `HKDF(digest, salt, key, info)`, then drives `C` in [`Ctr`] mode;
/// `generate` buffers unused tail bytes of a keystream block between
/// calls so output stays contiguous regardless of the caller's chunking.
pub struct BlockCipherCounterDrbg<C> {
    digest: DigestAlgorithm,
    ctr: Option<Ctr<C>>,
    leftover: Vec<u8>,
    block_size: usize,
    key_size: usize,
}

impl<C: BlockCipher + Clone + Default> BlockCipherCounterDrbg<C> {
    /// Build a block-cipher-counter DRBG driving `C` in CTR mode, deriving
    /// key/counter material through `digest`.
    pub fn new(digest: DigestAlgorithm) -> Self {
        Self {
            digest,
            ctr: None,
            leftover: Vec::new(),
            block_size: 0,
            key_size: 0,
        }
    }

    fn derive_and_seed(&mut self, key: &[u8], salt: &[u8], info: &[u8]) -> Result<()> {
        let probe = C::default();
        let block_size = probe.block_size();
        let key_size = *probe
            .legal_key_sizes()
            .first()
            .expect("every BlockCipher has at least one legal key size");

        let prk = digest_prf::hmac(self.digest, salt, key);
        let bytes = digest_prf::hkdf_expand(self.digest, &prk, info, key_size + block_size)?;

        let mut ctr = Ctr::new(C::default());
        let key_params = KeyParams::with_iv(bytes[..key_size].to_vec(), bytes[key_size..].to_vec());
        ctr.initialize(Direction::Encrypt, &key_params)?;

        self.ctr = Some(ctr);
        self.leftover.clear();
        self.block_size = block_size;
        self.key_size = key_size;
        Ok(())
    }
}

impl<C: BlockCipher + Clone + Default> Drbg for BlockCipherCounterDrbg<C> {
    fn key_size(&self) -> usize {
        self.key_size
    }

    fn initialized(&self) -> bool {
        self.ctr.is_some()
    }

    fn initialize(&mut self, key: &[u8], salt: &[u8], info: &[u8]) -> Result<()> {
        self.derive_and_seed(key, salt, info)
    }

    fn generate(&mut self, out: &mut [u8]) -> Result<usize> {
        let ctr = self
            .ctr
            .as_mut()
            .ok_or_else(|| Error::new("block-cipher-counter-drbg", "generate", ErrorKind::NotInitialized))?;

        let mut written = 0;
        while written < out.len() {
            if !self.leftover.is_empty() {
                let take = self.leftover.len().min(out.len() - written);
                out[written..written + take].copy_from_slice(&self.leftover[..take]);
                self.leftover.drain(..take);
                written += take;
                continue;
            }
            let zeros = vec![0u8; self.block_size];
            let mut keystream = vec![0u8; self.block_size];
            ctr.transform_blocks(&zeros, &mut keystream);
            let take = keystream.len().min(out.len() - written);
            out[written..written + take].copy_from_slice(&keystream[..take]);
            if take < keystream.len() {
                self.leftover = keystream[take..].to_vec();
            }
            written += take;
        }
        Ok(written)
    }

    fn update(&mut self, seed: &[u8]) -> Result<()> {
        self.derive_and_seed(seed, &[], &[])
    }
}
