//! AES (Rijndael restricted to 128-bit blocks), the 32-byte-block Rijndael
//! variant, and RHX: an HKDF-Expand-extended key schedule over the same
//! round function.
//!
//! All four types implement [`symmetric_core::BlockCipher`]; none
//! implement encryption mode logic themselves (that's
//! [`block-modes`](https://docs.rs/block-modes)) or padding (that's
//! [`padding`](https://docs.rs/padding)).

#![warn(missing_docs, rust_2018_idioms)]

mod rijndael;
mod tables;

use digest_prf::DigestAlgorithm;
use rijndael::Word;
use symmetric_core::{BlockCipher, Direction, Error, ErrorKind, KeyParams, Result};
use zeroize::Zeroize;

#[derive(Clone)]
struct Schedule {
    words: Vec<Word>,
}

impl Drop for Schedule {
    fn drop(&mut self) {
        for w in self.words.iter_mut() {
            w.zeroize();
        }
    }
}

/// Shared state for the three fixed-`Nb = 4` AES key sizes and for
/// Rijndael-256 (`Nb = 8`, `Nk = 8`).
#[derive(Clone)]
struct RijndaelEngine {
    name: &'static str,
    nb: usize,
    legal_key_sizes: &'static [usize],
    nr: usize,
    schedule: Option<Schedule>,
    direction: Direction,
}

impl RijndaelEngine {
    fn new(name: &'static str, nb: usize, legal_key_sizes: &'static [usize]) -> Self {
        Self {
            name,
            nb,
            legal_key_sizes,
            nr: 0,
            schedule: None,
            direction: Direction::Encrypt,
        }
    }

    fn block_cipher_initialize(
        &mut self,
        direction: Direction,
        key_params: &KeyParams,
    ) -> Result<()> {
        let key = key_params.key();
        if !self.legal_key_sizes.contains(&key.len()) {
            return Err(Error::new(self.name, "initialize", ErrorKind::InvalidKeySize));
        }
        let nk = key.len() / 4;
        self.nr = rijndael::nr_for(self.nb, nk);
        self.schedule = Some(Schedule {
            words: rijndael::key_schedule(key, self.nb, nk),
        });
        self.direction = direction;
        Ok(())
    }
}

/// AES-128/192/256, Nb = 4, Nr = 10/12/14.
#[derive(Clone)]
pub struct Aes {
    engine: RijndaelEngine,
}

impl Aes {
    /// Key sizes legal for this type: 16, 24, 32 bytes.
    pub const LEGAL_KEY_SIZES: [usize; 3] = [16, 24, 32];

    /// Construct an uninitialized AES cipher; call
    /// [`BlockCipher::initialize`] before use.
    pub fn new() -> Self {
        Self {
            engine: RijndaelEngine::new("aes", 4, &Self::LEGAL_KEY_SIZES),
        }
    }
}

impl Default for Aes {
    fn default() -> Self {
        Self::new()
    }
}

/// Rijndael with a 256-bit (32-byte) block, `Nb = Nk = 8`, `Nr = 14` — the
/// variant of the original Rijndael submission that FIPS-197 did not carry
/// forward as AES.
#[derive(Clone)]
pub struct Rijndael256 {
    engine: RijndaelEngine,
}

impl Rijndael256 {
    /// The only legal key size: 32 bytes.
    pub const LEGAL_KEY_SIZES: [usize; 1] = [32];

    /// Construct an uninitialized Rijndael-256 cipher.
    pub fn new() -> Self {
        Self {
            engine: RijndaelEngine::new("rijndael-256", 8, &Self::LEGAL_KEY_SIZES),
        }
    }
}

impl Default for Rijndael256 {
    fn default() -> Self {
        Self::new()
    }
}

macro_rules! impl_block_cipher_for_rijndael {
    ($ty:ty) => {
        impl BlockCipher for $ty {
            fn block_size(&self) -> usize {
                self.engine.nb * 4
            }

            fn legal_key_sizes(&self) -> &'static [usize] {
                self.engine.legal_key_sizes
            }

            fn name(&self) -> &'static str {
                self.engine.name
            }

            fn initialized(&self) -> bool {
                self.engine.schedule.is_some()
            }

            fn initialize(&mut self, direction: Direction, key_params: &KeyParams) -> Result<()> {
                self.engine.block_cipher_initialize(direction, key_params)
            }

            fn encrypt_block(&mut self, input: &[u8], output: &mut [u8]) {
                let schedule = self
                    .engine
                    .schedule
                    .as_ref()
                    .expect("encrypt_block called before initialize");
                let ct = rijndael::encrypt_block(input, &schedule.words, self.engine.nb, self.engine.nr);
                output.copy_from_slice(&ct);
            }

            fn decrypt_block(&mut self, input: &[u8], output: &mut [u8]) {
                let schedule = self
                    .engine
                    .schedule
                    .as_ref()
                    .expect("decrypt_block called before initialize");
                let pt = rijndael::decrypt_block(input, &schedule.words, self.engine.nb, self.engine.nr);
                output.copy_from_slice(&pt);
            }

            fn direction(&self) -> Direction {
                self.engine.direction
            }
        }
    };
}

impl_block_cipher_for_rijndael!(Aes);
impl_block_cipher_for_rijndael!(Rijndael256);

/// RHX: the AES round function, run for a caller-chosen round count, driven
/// by a round-key schedule derived from HKDF-Expand (RFC 5869) instead of
/// Rijndael's native key-expansion recurrence, over `Nb = 4`. Same legal key
/// sizes as [`Aes`]; round count is the parameter HX widens.
#[derive(Clone)]
pub struct Rhx {
    digest: DigestAlgorithm,
    schedule: Option<Schedule>,
    direction: Direction,
    nr: usize,
}

impl Rhx {
    const NB: usize = 4;

    /// Round counts RHX accepts: AES's native 10/12/14, plus the widened
    /// counts the HX convention extends it to.
    pub const LEGAL_ROUNDS: [usize; 5] = [16, 24, 32, 40, 48];

    /// Build an RHX cipher that derives its round-key schedule through
    /// `digest`'s HMAC construction, running `rounds` rounds. SHA-256 is the
    /// conventional digest choice. `rounds` is validated against
    /// [`Self::LEGAL_ROUNDS`] at `initialize` time, not here.
    pub fn new(digest: DigestAlgorithm, rounds: usize) -> Self {
        Self {
            digest,
            schedule: None,
            direction: Direction::Encrypt,
            nr: rounds,
        }
    }
}

impl BlockCipher for Rhx {
    fn block_size(&self) -> usize {
        Self::NB * 4
    }

    fn legal_key_sizes(&self) -> &'static [usize] {
        &Aes::LEGAL_KEY_SIZES
    }

    fn name(&self) -> &'static str {
        "RHX"
    }

    fn initialized(&self) -> bool {
        self.schedule.is_some()
    }

    fn initialize(&mut self, direction: Direction, key_params: &KeyParams) -> Result<()> {
        if !Self::LEGAL_ROUNDS.contains(&self.nr) {
            return Err(Error::new("rhx", "initialize", ErrorKind::InvalidParameter));
        }
        let key = key_params.key();
        if !Aes::LEGAL_KEY_SIZES.contains(&key.len()) {
            return Err(Error::new("rhx", "initialize", ErrorKind::InvalidKeySize));
        }
        let total_words = Self::NB * (self.nr + 1);
        let schedule_bytes = digest_prf::hkdf_expand(
            self.digest,
            key,
            key_params.info(),
            total_words * 4,
        )
        .map_err(|_| Error::new("rhx", "initialize", ErrorKind::OutputSizeExceeded))?;

        let words = schedule_bytes
            .chunks(4)
            .map(|c| [c[0], c[1], c[2], c[3]])
            .collect();
        self.schedule = Some(Schedule { words });
        self.direction = direction;
        Ok(())
    }

    fn encrypt_block(&mut self, input: &[u8], output: &mut [u8]) {
        let schedule = self
            .schedule
            .as_ref()
            .expect("encrypt_block called before initialize");
        let ct = rijndael::encrypt_block(input, &schedule.words, Self::NB, self.nr);
        output.copy_from_slice(&ct);
    }

    fn decrypt_block(&mut self, input: &[u8], output: &mut [u8]) {
        let schedule = self
            .schedule
            .as_ref()
            .expect("decrypt_block called before initialize");
        let pt = rijndael::decrypt_block(input, &schedule.words, Self::NB, self.nr);
        output.copy_from_slice(&pt);
    }

    fn direction(&self) -> Direction {
        self.direction
    }
}
