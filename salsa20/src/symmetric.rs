//! Bridges this crate's compile-time `SalsaCore<Rounds, KeySize>`
//! monomorphizations onto [`symmetric_core::StreamCipher`]'s runtime
//! contract: round count and key size are both caller-supplied parameters
//! (selected via [`symmetric_core::KeyParams`] at `initialize` time)
//! rather than generic parameters resolved at compile time.

use cipher::{KeyIvInit, StreamCipher as _};
use symmetric_core::{Error, ErrorKind, KeyParams, Result};

use crate::{Nonce, Salsa8, Salsa12, Salsa20, Salsa8_128, Salsa12_128, Salsa20_128};

enum Engine {
    R8k256(Salsa8),
    R12k256(Salsa12),
    R20k256(Salsa20),
    R8k128(Salsa8_128),
    R12k128(Salsa12_128),
    R20k128(Salsa20_128),
}

impl Engine {
    fn keystream_xor(&mut self, input: &[u8], output: &mut [u8]) {
        let mut stream = vec![0u8; input.len()];
        match self {
            Engine::R8k256(c) => c.apply_keystream(&mut stream),
            Engine::R12k256(c) => c.apply_keystream(&mut stream),
            Engine::R20k256(c) => c.apply_keystream(&mut stream),
            Engine::R8k128(c) => c.apply_keystream(&mut stream),
            Engine::R12k128(c) => c.apply_keystream(&mut stream),
            Engine::R20k128(c) => c.apply_keystream(&mut stream),
        }
        for i in 0..input.len() {
            output[i] = input[i] ^ stream[i];
        }
    }
}

/// Salsa20 driven through the symmetric cipher core's capability-set
/// contract: construct with the desired round count (8, 12, or 20), then
/// `initialize` with a [`KeyParams`] carrying a 16- or 32-byte key and an
/// 8-byte nonce.
pub struct SalsaStreamCipher {
    rounds: usize,
    engine: Option<Engine>,
}

impl SalsaStreamCipher {
    /// Build an uninitialized adapter for the given round count.
    pub fn new(rounds: usize) -> Self {
        Self {
            rounds,
            engine: None,
        }
    }
}

impl symmetric_core::StreamCipher for SalsaStreamCipher {
    fn legal_key_sizes(&self) -> &'static [usize] {
        &[16, 32]
    }

    fn legal_rounds(&self) -> &'static [usize] {
        &[8, 12, 20]
    }

    fn initialize(&mut self, key_params: &KeyParams) -> Result<()> {
        if !self.legal_rounds().contains(&self.rounds) {
            return Err(Error::new(
                "salsa20",
                "initialize",
                ErrorKind::InvalidParameter,
            ));
        }
        let key = key_params.key();
        let iv = key_params.iv();
        if iv.len() != 8 {
            return Err(Error::new("salsa20", "initialize", ErrorKind::InvalidIvSize));
        }
        let mut nonce_bytes = [0u8; 8];
        nonce_bytes.copy_from_slice(iv);
        let nonce = Nonce::from(nonce_bytes);

        self.engine = Some(match (self.rounds, key.len()) {
            (8, 32) => Engine::R8k256(Salsa8::new(&key_array_32(key).into(), &nonce)),
            (12, 32) => Engine::R12k256(Salsa12::new(&key_array_32(key).into(), &nonce)),
            (20, 32) => Engine::R20k256(Salsa20::new(&key_array_32(key).into(), &nonce)),
            (8, 16) => Engine::R8k128(Salsa8_128::new(&key_array_16(key).into(), &nonce)),
            (12, 16) => Engine::R12k128(Salsa12_128::new(&key_array_16(key).into(), &nonce)),
            (20, 16) => Engine::R20k128(Salsa20_128::new(&key_array_16(key).into(), &nonce)),
            _ => {
                return Err(Error::new(
                    "salsa20",
                    "initialize",
                    ErrorKind::InvalidKeySize,
                ))
            }
        });
        Ok(())
    }

    fn transform(&mut self, input: &[u8], output: &mut [u8]) {
        let engine = self
            .engine
            .as_mut()
            .expect("transform called before initialize");
        engine.keystream_xor(input, output);
    }
}

fn key_array_32(key: &[u8]) -> [u8; 32] {
    let mut out = [0u8; 32];
    out.copy_from_slice(key);
    out
}

fn key_array_16(key: &[u8]) -> [u8; 16] {
    let mut out = [0u8; 16];
    out.copy_from_slice(key);
    out
}
