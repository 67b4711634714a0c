//! Twofish, and THX: Twofish's round function driven by an HKDF-Expand
//! extended key schedule. See the `twofish_core` module docs for why this
//! crate's key schedule departs from Twofish's native reed-solomon/PHT
//! construction.

#![warn(missing_docs, rust_2018_idioms)]

mod twofish_core;

use digest_prf::DigestAlgorithm;
use symmetric_core::{BlockCipher, Direction, Error, ErrorKind, KeyParams, Result};
use twofish_core::KeyMaterial;

#[derive(Clone)]
struct Schedule(KeyMaterial);

impl Drop for Schedule {
    fn drop(&mut self) {
        self.0.whiten_in = [0; 4];
        self.0.whiten_out = [0; 4];
        for k in self.0.round_keys.iter_mut() {
            *k = 0;
        }
        for k in self.0.sbox_keys.iter_mut() {
            *k = [0; 4];
        }
    }
}

fn derive_schedule(digest: DigestAlgorithm, key: &[u8], info: &[u8], rounds: usize) -> Result<Schedule> {
    let bytes = digest_prf::hkdf_expand(digest, key, info, twofish_core::material_len(rounds))?;
    Ok(Schedule(twofish_core::material_from_bytes(&bytes, rounds)))
}

/// Twofish, 128-bit blocks, 128/192/256-bit keys, 16 Feistel rounds.
#[derive(Clone)]
pub struct Twofish {
    schedule: Option<Schedule>,
    direction: Direction,
}

impl Twofish {
    /// Legal key sizes: 16, 24, 32 bytes.
    pub const LEGAL_KEY_SIZES: [usize; 3] = [16, 24, 32];

    /// Construct an uninitialized Twofish cipher.
    pub fn new() -> Self {
        Self {
            schedule: None,
            direction: Direction::Encrypt,
        }
    }
}

impl Default for Twofish {
    fn default() -> Self {
        Self::new()
    }
}

impl BlockCipher for Twofish {
    fn block_size(&self) -> usize {
        16
    }

    fn legal_key_sizes(&self) -> &'static [usize] {
        &Self::LEGAL_KEY_SIZES
    }

    fn name(&self) -> &'static str {
        "Twofish"
    }

    fn initialized(&self) -> bool {
        self.schedule.is_some()
    }

    fn initialize(&mut self, direction: Direction, key_params: &KeyParams) -> Result<()> {
        let key = key_params.key();
        if !Self::LEGAL_KEY_SIZES.contains(&key.len()) {
            return Err(Error::new("twofish", "initialize", ErrorKind::InvalidKeySize));
        }
        self.schedule = Some(derive_schedule(
            DigestAlgorithm::Sha256,
            key,
            key_params.info(),
            twofish_core::ROUNDS,
        )?);
        self.direction = direction;
        Ok(())
    }

    fn encrypt_block(&mut self, input: &[u8], output: &mut [u8]) {
        let schedule = self.schedule.as_ref().expect("encrypt_block called before initialize");
        let ct = twofish_core::encrypt_block(input, &schedule.0);
        output.copy_from_slice(&ct);
    }

    fn decrypt_block(&mut self, input: &[u8], output: &mut [u8]) {
        let schedule = self.schedule.as_ref().expect("decrypt_block called before initialize");
        let pt = twofish_core::decrypt_block(input, &schedule.0);
        output.copy_from_slice(&pt);
    }

    fn direction(&self) -> Direction {
        self.direction
    }
}

/// THX: Twofish's round function over an HKDF-Expand-derived schedule
/// sized for a caller-chosen round count, driven through the caller's
/// choice of digest rather than the fixed SHA-256 [`Twofish`] uses
/// internally. Mirrors [`aes::Rhx`] and [`serpent::Shx`]: same legal key
/// sizes as the base algorithm, round count is the parameter HX widens.
#[derive(Clone)]
pub struct Thx {
    digest: DigestAlgorithm,
    rounds: usize,
    schedule: Option<Schedule>,
    direction: Direction,
}

impl Thx {
    /// Round counts THX accepts: Twofish's native 16, plus the widened
    /// counts the HX convention extends it to.
    pub const LEGAL_ROUNDS: [usize; 3] = [16, 20, 32];

    /// Build a THX cipher deriving its schedule through `digest`'s HMAC,
    /// running `rounds` Feistel rounds. `rounds` is validated against
    /// [`Self::LEGAL_ROUNDS`] at `initialize` time, not here.
    pub fn new(digest: DigestAlgorithm, rounds: usize) -> Self {
        Self {
            digest,
            rounds,
            schedule: None,
            direction: Direction::Encrypt,
        }
    }
}

impl BlockCipher for Thx {
    fn block_size(&self) -> usize {
        16
    }

    fn legal_key_sizes(&self) -> &'static [usize] {
        &Twofish::LEGAL_KEY_SIZES
    }

    fn name(&self) -> &'static str {
        "THX"
    }

    fn initialized(&self) -> bool {
        self.schedule.is_some()
    }

    fn initialize(&mut self, direction: Direction, key_params: &KeyParams) -> Result<()> {
        if !Self::LEGAL_ROUNDS.contains(&self.rounds) {
            return Err(Error::new("thx", "initialize", ErrorKind::InvalidParameter));
        }
        let key = key_params.key();
        if !Twofish::LEGAL_KEY_SIZES.contains(&key.len()) {
            return Err(Error::new("thx", "initialize", ErrorKind::InvalidKeySize));
        }
        self.schedule = Some(derive_schedule(self.digest, key, key_params.info(), self.rounds)?);
        self.direction = direction;
        Ok(())
    }

    fn encrypt_block(&mut self, input: &[u8], output: &mut [u8]) {
        let schedule = self.schedule.as_ref().expect("encrypt_block called before initialize");
        let ct = twofish_core::encrypt_block(input, &schedule.0);
        output.copy_from_slice(&ct);
    }

    fn decrypt_block(&mut self, input: &[u8], output: &mut [u8]) {
        let schedule = self.schedule.as_ref().expect("decrypt_block called before initialize");
        let pt = twofish_core::decrypt_block(input, &schedule.0);
        output.copy_from_slice(&pt);
    }

    fn direction(&self) -> Direction {
        self.direction
    }
}
