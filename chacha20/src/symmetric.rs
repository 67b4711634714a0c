//! Bridges the legacy "djb" ChaCha variants (8-byte nonce) onto
//! [`symmetric_core::StreamCipher`]'s runtime contract, mirroring
//! [`salsa20::SalsaStreamCipher`](https://docs.rs/salsa20). The RFC 8439
//! IETF variant's 12-byte nonce does not fit `StreamCipher`'s 8-byte
//! IV contract, so the adapter is built over [`ChaCha8Legacy`] /
//! [`ChaCha12Legacy`] / [`ChaCha20Legacy`] instead.

use cipher::{KeyIvInit, StreamCipher as _};
use symmetric_core::{Error, ErrorKind, KeyParams, Result};

use crate::{ChaCha8Legacy, ChaCha12Legacy, ChaCha20Legacy, LegacyNonce};

enum Engine {
    R8(ChaCha8Legacy),
    R12(ChaCha12Legacy),
    R20(ChaCha20Legacy),
}

impl Engine {
    fn keystream_xor(&mut self, input: &[u8], output: &mut [u8]) {
        let mut stream = vec![0u8; input.len()];
        match self {
            Engine::R8(c) => c.apply_keystream(&mut stream),
            Engine::R12(c) => c.apply_keystream(&mut stream),
            Engine::R20(c) => c.apply_keystream(&mut stream),
        }
        for i in 0..input.len() {
            output[i] = input[i] ^ stream[i];
        }
    }
}

/// ChaCha driven through the symmetric cipher core's capability-set
/// contract: construct with the desired round count (8, 12, or 20), then
/// `initialize` with a [`KeyParams`] carrying a 32-byte key and an 8-byte
/// nonce (matching Salsa20's IV width, unlike RFC 8439's 96-bit nonce).
pub struct ChaChaStreamCipher {
    rounds: usize,
    engine: Option<Engine>,
}

impl ChaChaStreamCipher {
    /// Build an uninitialized adapter for the given round count.
    pub fn new(rounds: usize) -> Self {
        Self {
            rounds,
            engine: None,
        }
    }
}

impl symmetric_core::StreamCipher for ChaChaStreamCipher {
    fn legal_key_sizes(&self) -> &'static [usize] {
        &[32]
    }

    fn legal_rounds(&self) -> &'static [usize] {
        &[8, 12, 20]
    }

    fn initialize(&mut self, key_params: &KeyParams) -> Result<()> {
        if !self.legal_rounds().contains(&self.rounds) {
            return Err(Error::new(
                "chacha20",
                "initialize",
                ErrorKind::InvalidParameter,
            ));
        }
        let key = key_params.key();
        if key.len() != 32 {
            return Err(Error::new(
                "chacha20",
                "initialize",
                ErrorKind::InvalidKeySize,
            ));
        }
        let iv = key_params.iv();
        if iv.len() != 8 {
            return Err(Error::new(
                "chacha20",
                "initialize",
                ErrorKind::InvalidIvSize,
            ));
        }
        let mut key_bytes = [0u8; 32];
        key_bytes.copy_from_slice(key);
        let mut nonce_bytes = [0u8; 8];
        nonce_bytes.copy_from_slice(iv);
        let nonce = LegacyNonce::from(nonce_bytes);
        let key = key_bytes.into();

        self.engine = Some(match self.rounds {
            8 => Engine::R8(ChaCha8Legacy::new(&key, &nonce)),
            12 => Engine::R12(ChaCha12Legacy::new(&key, &nonce)),
            20 => Engine::R20(ChaCha20Legacy::new(&key, &nonce)),
            _ => unreachable!("validated against legal_rounds above"),
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
