//! [`CipherStream`]: drives a block-cipher [`Mode`] (with optional
//! [`PaddingKind`]) or a raw [`StreamCipher`] across input of arbitrary
//! length, over two surfaces — a one-shot byte-array transform, and a
//! buffered stream-to-stream transform that reports progress as it goes.
//!
//! A single orchestrator type sits in front of both backends so a caller
//! that just wants "encrypt these bytes under this configuration" never
//! has to know whether the configuration resolved to AES-CBC or ChaCha20.

#![warn(missing_docs, rust_2018_idioms)]

use std::io::{self, Read, Write};

use padding::PaddingKind;
use symmetric_core::{Direction, Error, ErrorKind, KeyParams, Mode, Result, StreamCipher};
use zeroize::Zeroize;

/// Either half of the two kinds of engine [`CipherStream`] can drive.
enum Backend {
    Mode(Box<dyn Mode>),
    Stream(Box<dyn StreamCipher>),
}

/// Progress reported by a long-running [`CipherStream::write_stream`] call.
///
/// Emitted as a side-effect callback, not a cancellation point: a caller
/// that wants to abort has to do so out of band (e.g. by erroring out of
/// its `Read`/`Write` impl). Percentages never exceed 100, but are not
/// required to be monotonic if the underlying stream misreports its
/// length.
pub type ProgressCallback<'a> = dyn FnMut(u8) + 'a;

/// Drives a (mode + padding) or a stream cipher across input of arbitrary
/// length, on either the array surface ([`write`](Self::write)) or the
/// stream surface ([`write_stream`](Self::write_stream)).
pub struct CipherStream {
    backend: Backend,
    padding: PaddingKind,
    direction: Direction,
}

impl CipherStream {
    /// Build a `CipherStream` around a block-cipher mode, with `padding`
    /// applied on encryption and stripped on decryption. `padding` must be
    /// [`PaddingKind::None`] for modes used as raw keystream-XOR (CTR,
    /// OFB) on non-block-aligned input; any other mode requires either a
    /// real padding scheme or block-aligned input.
    pub fn new_mode(mode: Box<dyn Mode>, padding: PaddingKind) -> Self {
        Self {
            backend: Backend::Mode(mode),
            padding,
            direction: Direction::Encrypt,
        }
    }

    /// Build a `CipherStream` around a raw stream cipher. Padding does not
    /// apply; the keystream is XORed over exactly as many bytes as given.
    pub fn new_stream(stream: Box<dyn StreamCipher>) -> Self {
        Self {
            backend: Backend::Stream(stream),
            padding: PaddingKind::None,
            direction: Direction::Encrypt,
        }
    }

    /// Re-key the underlying engine and reset all internal state.
    pub fn initialize(&mut self, direction: Direction, key_params: &KeyParams) -> Result<()> {
        self.direction = direction;
        match &mut self.backend {
            Backend::Mode(mode) => mode.initialize(direction, key_params),
            Backend::Stream(stream) => stream.initialize(key_params),
        }
    }

    /// Block size of the underlying engine (1 for stream ciphers, since
    /// they have no alignment requirement).
    pub fn block_size(&self) -> usize {
        match &self.backend {
            Backend::Mode(mode) => mode.block_size(),
            Backend::Stream(_) => 1,
        }
    }

    /// Whether the underlying mode can run disjoint blocks out of order.
    /// Always `false` for stream ciphers: this orchestrator drives them
    /// sequentially, since the adapters it wires together do not expose a
    /// seekable keystream position to split work across.
    pub fn is_parallelizable(&self) -> bool {
        match &self.backend {
            Backend::Mode(mode) => mode.is_parallelizable(),
            Backend::Stream(_) => false,
        }
    }

    /// Advisory parallel flag, forwarded to the underlying mode. A no-op
    /// for stream ciphers.
    pub fn is_parallel(&self) -> bool {
        match &self.backend {
            Backend::Mode(mode) => mode.is_parallel(),
            Backend::Stream(_) => false,
        }
    }

    /// Set the advisory parallel flag on the underlying mode. A no-op for
    /// stream ciphers.
    pub fn set_parallel(&mut self, parallel: bool) {
        if let Backend::Mode(mode) = &mut self.backend {
            mode.set_parallel(parallel);
        }
    }

    /// Current parallel chunk size, forwarded to the underlying mode (1
    /// for stream ciphers, which never chunk).
    pub fn parallel_block_size(&self) -> usize {
        match &self.backend {
            Backend::Mode(mode) => mode.parallel_block_size(),
            Backend::Stream(_) => self.block_size(),
        }
    }

    /// Set the parallel chunk size on the underlying mode. A no-op for
    /// stream ciphers.
    pub fn set_parallel_block_size(&mut self, size: usize) {
        if let Backend::Mode(mode) = &mut self.backend {
            mode.set_parallel_block_size(size);
        }
    }

    /// Smallest sensible parallel chunk, forwarded to the underlying mode.
    pub fn parallel_minimum_size(&self) -> usize {
        match &self.backend {
            Backend::Mode(mode) => mode.parallel_minimum_size(),
            Backend::Stream(_) => self.block_size(),
        }
    }

    /// Hard ceiling on the parallel chunk size, forwarded to the
    /// underlying mode.
    pub fn parallel_maximum_size(&self) -> usize {
        match &self.backend {
            Backend::Mode(mode) => mode.parallel_maximum_size(),
            Backend::Stream(_) => self.block_size(),
        }
    }

    /// Transform all of `input` in one call, returning the result.
    ///
    /// For a padded mode this adds (on encrypt) or strips (on decrypt)
    /// exactly one block of padding. For an
    /// unpadded mode this requires block-aligned input, except CTR and
    /// OFB, which tolerate a short final block by zero-extending it for
    /// the transform and truncating the extra keystream bytes back off
    /// (valid because both are pure per-byte keystream XOR).
    pub fn write(&mut self, input: &[u8]) -> Result<Vec<u8>> {
        match &mut self.backend {
            Backend::Stream(stream) => {
                let mut out = vec![0u8; input.len()];
                stream.transform(input, &mut out);
                Ok(out)
            }
            Backend::Mode(_) => self.process_final(input),
        }
    }

    /// Transform a full (cipher-stream) of input into a full (cipher-stream)
    /// of output, reading in chunks of at most [`parallel_block_size`]
    /// (or one stream-cipher block when there's no parallelism to bound),
    /// buffering any partial trailing block across reads, and reporting
    /// progress through `on_progress` when `total_len_hint` is known.
    ///
    /// [`parallel_block_size`]: Self::parallel_block_size
    pub fn write_stream<R: Read, W: Write>(
        &mut self,
        mut reader: R,
        mut writer: W,
        total_len_hint: Option<u64>,
        mut on_progress: Option<&mut ProgressCallback<'_>>,
    ) -> Result<()> {
        let block_size = self.block_size();
        let chunk_cap = self.parallel_block_size().max(block_size).max(4096);
        let reserve = if matches!(self.backend, Backend::Mode(_)) && self.padding != PaddingKind::None {
            block_size
        } else {
            0
        };

        let mut read_buf = vec![0u8; chunk_cap];
        let mut pending: Vec<u8> = Vec::new();
        let mut total_read: u64 = 0;

        loop {
            let n = reader
                .read(&mut read_buf)
                .map_err(|e| io_error("write", e))?;
            if n == 0 {
                break;
            }
            pending.extend_from_slice(&read_buf[..n]);
            total_read += n as u64;

            let flushable = pending.len().saturating_sub(reserve);
            let flushable = flushable - flushable % block_size.max(1);
            if flushable > 0 && matches!(self.backend, Backend::Mode(_)) {
                let chunk: Vec<u8> = pending.drain(..flushable).collect();
                let out = self.transform_aligned(&chunk)?;
                writer.write_all(&out).map_err(|e| io_error("write", e))?;
            } else if matches!(self.backend, Backend::Stream(_)) && !pending.is_empty() {
                let chunk = std::mem::take(&mut pending);
                let out = self.write(&chunk)?;
                writer.write_all(&out).map_err(|e| io_error("write", e))?;
            }

            if let (Some(hint), Some(cb)) = (total_len_hint, on_progress.as_deref_mut()) {
                if hint > 0 {
                    let pct = ((total_read.min(hint) * 100) / hint) as u8;
                    cb(pct.min(99));
                }
            }
        }

        let tail = std::mem::take(&mut pending);
        let out = self.process_final(&tail)?;
        writer.write_all(&out).map_err(|e| io_error("write", e))?;

        if let Some(cb) = on_progress.as_deref_mut() {
            cb(100);
        }
        Ok(())
    }

    /// Run a full-block-aligned interior chunk straight through the mode,
    /// with no padding add/strip (the caller guarantees it isn't the
    /// tail).
    fn transform_aligned(&mut self, chunk: &[u8]) -> Result<Vec<u8>> {
        let Backend::Mode(mode) = &mut self.backend else {
            unreachable!("transform_aligned is only called for the Mode backend")
        };
        let mut out = vec![0u8; chunk.len()];
        mode.transform_blocks(chunk, &mut out);
        Ok(out)
    }

    /// Finalize: apply padding add/strip (or the CTR/OFB short-block
    /// tolerance) to the last chunk of a transform, whether that chunk is
    /// the entire one-shot input or the held-back tail of a stream.
    fn process_final(&mut self, tail: &[u8]) -> Result<Vec<u8>> {
        if let Backend::Stream(stream) = &mut self.backend {
            let mut out = vec![0u8; tail.len()];
            stream.transform(tail, &mut out);
            return Ok(out);
        }

        let Backend::Mode(mode) = &mut self.backend else {
            unreachable!()
        };
        let block_size = mode.block_size();

        if self.padding != PaddingKind::None {
            return match self.direction {
                Direction::Encrypt => Ok(encrypt_padded(mode.as_mut(), self.padding, tail)),
                Direction::Decrypt => decrypt_padded(mode.as_mut(), self.padding, tail),
            };
        }

        if tail.is_empty() {
            return Ok(Vec::new());
        }

        if tail.len() % block_size == 0 {
            let mut out = vec![0u8; tail.len()];
            mode.transform_blocks(tail, &mut out);
            return Ok(out);
        }

        let name = mode.name();
        if name == "CTR" || name == "OFB" {
            let padded_len = symmetric_core::round_up(tail.len(), block_size);
            let mut buf = vec![0u8; padded_len];
            buf[..tail.len()].copy_from_slice(tail);
            let mut out = vec![0u8; padded_len];
            mode.transform_blocks(&buf, &mut out);
            out.truncate(tail.len());
            buf.zeroize();
            return Ok(out);
        }

        Err(Error::new("cipher-stream", "write", ErrorKind::InvalidParameter))
    }
}

fn io_error(operation: &'static str, _e: io::Error) -> Error {
    Error::new("cipher-stream", operation, ErrorKind::BufferTooSmall)
}

/// Encrypt `input` under `mode`, adding exactly one block of `padding`
/// when `input.len()` is already block-aligned.
fn encrypt_padded(mode: &mut dyn Mode, padding: PaddingKind, input: &[u8]) -> Vec<u8> {
    let block_size = mode.block_size();
    let remainder = input.len() % block_size;
    let tail_start = input.len() - remainder;
    let mut buf = vec![0u8; tail_start + block_size];
    buf[..input.len()].copy_from_slice(input);
    padding.pad(&mut buf[tail_start..], remainder);

    let mut out = vec![0u8; buf.len()];
    mode.transform_blocks(&buf, &mut out);
    buf.zeroize();
    out
}

/// Decrypt `input` under `mode`, stripping `padding` from the trailing
/// block. Zeroes the (fully decrypted but now known-invalid) output
/// before returning a [`ErrorKind::PaddingInvalid`] error, per the
/// best-effort zero-on-error-path policy.
fn decrypt_padded(mode: &mut dyn Mode, padding: PaddingKind, input: &[u8]) -> Result<Vec<u8>> {
    let block_size = mode.block_size();
    if input.is_empty() || input.len() % block_size != 0 {
        return Err(Error::new("cipher-stream", "write", ErrorKind::InvalidParameter));
    }

    let mut out = vec![0u8; input.len()];
    mode.transform_blocks(input, &mut out);

    let pad_len = padding.unpad_len(&out[out.len() - block_size..]);
    if pad_len == 0 {
        out.zeroize();
        return Err(Error::new("cipher-stream", "write", ErrorKind::PaddingInvalid));
    }
    out.truncate(out.len() - pad_len);
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;
    use aes::Aes;
    use block_modes::{Cbc, Ctr, Ecb};
    use hex_literal::hex;
    use salsa20::SalsaStreamCipher;
    use std::io::Cursor;

    fn key_params() -> KeyParams {
        KeyParams::with_iv(
            hex!("2b7e151628aed2a6abf7158809cf4f3c").to_vec()[..16].to_vec(),
            hex!("000102030405060708090a0b0c0d0e0f").to_vec(),
        )
    }

    #[test]
    fn cbc_with_pkcs7_round_trips_non_aligned_input() {
        let mut enc = CipherStream::new_mode(Box::new(Cbc::new(Aes::new())), PaddingKind::Pkcs7);
        enc.initialize(Direction::Encrypt, &key_params()).unwrap();
        let plaintext = b"a message that is not block aligned";
        let ciphertext = enc.write(plaintext).unwrap();
        assert_eq!(ciphertext.len() % 16, 0);

        let mut dec = CipherStream::new_mode(Box::new(Cbc::new(Aes::new())), PaddingKind::Pkcs7);
        dec.initialize(Direction::Decrypt, &key_params()).unwrap();
        let recovered = dec.write(&ciphertext).unwrap();
        assert_eq!(recovered, plaintext);
    }

    #[test]
    fn cbc_with_pkcs7_adds_full_block_when_input_is_aligned() {
        let mut enc = CipherStream::new_mode(Box::new(Cbc::new(Aes::new())), PaddingKind::Pkcs7);
        enc.initialize(Direction::Encrypt, &key_params()).unwrap();
        let plaintext = [0u8; 32];
        let ciphertext = enc.write(&plaintext).unwrap();
        assert_eq!(ciphertext.len(), 48);
    }

    #[test]
    fn ecb_without_padding_rejects_non_aligned_input() {
        let mut enc = CipherStream::new_mode(Box::new(Ecb::new(Aes::new())), PaddingKind::None);
        enc.initialize(Direction::Encrypt, &key_params()).unwrap();
        let err = enc.write(b"not sixteen bytes").unwrap_err();
        assert_eq!(err.kind, ErrorKind::InvalidParameter);
    }

    #[test]
    fn ctr_without_padding_tolerates_short_final_block() {
        let mut enc = CipherStream::new_mode(Box::new(Ctr::new(Aes::new())), PaddingKind::None);
        enc.initialize(Direction::Encrypt, &key_params()).unwrap();
        let plaintext = b"thirteen char";
        let ciphertext = enc.write(plaintext).unwrap();
        assert_eq!(ciphertext.len(), plaintext.len());

        let mut dec = CipherStream::new_mode(Box::new(Ctr::new(Aes::new())), PaddingKind::None);
        dec.initialize(Direction::Decrypt, &key_params()).unwrap();
        let recovered = dec.write(&ciphertext).unwrap();
        assert_eq!(recovered, plaintext);
    }

    #[test]
    fn decrypt_with_corrupted_padding_zeroes_output_and_errors() {
        let mut enc = CipherStream::new_mode(Box::new(Ecb::new(Aes::new())), PaddingKind::Pkcs7);
        enc.initialize(Direction::Encrypt, &key_params()).unwrap();
        let mut ciphertext = enc.write(b"short").unwrap();
        let last = ciphertext.len() - 1;
        ciphertext[last] ^= 0xFF;

        let mut dec = CipherStream::new_mode(Box::new(Ecb::new(Aes::new())), PaddingKind::Pkcs7);
        dec.initialize(Direction::Decrypt, &key_params()).unwrap();
        let err = dec.write(&ciphertext).unwrap_err();
        assert_eq!(err.kind, ErrorKind::PaddingInvalid);
    }

    #[test]
    fn write_stream_matches_one_shot_write_for_cbc_pkcs7() {
        let plaintext = vec![0x42u8; 10_000];

        let mut one_shot = CipherStream::new_mode(Box::new(Cbc::new(Aes::new())), PaddingKind::Pkcs7);
        one_shot.initialize(Direction::Encrypt, &key_params()).unwrap();
        let expected = one_shot.write(&plaintext).unwrap();

        let mut streamed = CipherStream::new_mode(Box::new(Cbc::new(Aes::new())), PaddingKind::Pkcs7);
        streamed.initialize(Direction::Encrypt, &key_params()).unwrap();
        let mut out = Vec::new();
        streamed
            .write_stream(Cursor::new(&plaintext), &mut out, Some(plaintext.len() as u64), None)
            .unwrap();

        assert_eq!(out, expected);
    }

    #[test]
    fn write_stream_reports_completion_progress() {
        let plaintext = vec![0x11u8; 5_000];
        let mut stream = CipherStream::new_mode(Box::new(Ctr::new(Aes::new())), PaddingKind::None);
        stream.initialize(Direction::Encrypt, &key_params()).unwrap();

        let mut last_pct = 0u8;
        let mut out = Vec::new();
        {
            let mut cb = |pct: u8| {
                assert!(pct <= 100);
                last_pct = pct;
            };
            stream
                .write_stream(Cursor::new(&plaintext), &mut out, Some(plaintext.len() as u64), Some(&mut cb))
                .unwrap();
        }
        assert_eq!(last_pct, 100);
    }

    #[test]
    fn stream_cipher_backend_round_trips_through_write_stream() {
        let key_params = KeyParams::with_iv(vec![0x5au8; 32], vec![0x00u8; 8]);
        let plaintext = vec![7u8; 2_000];

        let mut enc = CipherStream::new_stream(Box::new(SalsaStreamCipher::new(20)));
        enc.initialize(Direction::Encrypt, &key_params).unwrap();
        let mut ciphertext = Vec::new();
        enc.write_stream(Cursor::new(&plaintext), &mut ciphertext, None, None)
            .unwrap();

        let mut dec = CipherStream::new_stream(Box::new(SalsaStreamCipher::new(20)));
        dec.initialize(Direction::Decrypt, &key_params).unwrap();
        let mut recovered = Vec::new();
        dec.write_stream(Cursor::new(&ciphertext), &mut recovered, None, None)
            .unwrap();

        assert_eq!(recovered, plaintext);
    }

    #[test]
    fn cbc_decrypt_allows_parallel_opt_in() {
        let mut stream = CipherStream::new_mode(Box::new(Cbc::new(Aes::new())), PaddingKind::Pkcs7);
        stream.initialize(Direction::Decrypt, &key_params()).unwrap();
        assert!(stream.is_parallelizable());
        stream.set_parallel(true);
        assert!(stream.is_parallel());
    }

    #[test]
    fn stream_cipher_backend_is_never_parallelizable() {
        let stream = CipherStream::new_stream(Box::new(SalsaStreamCipher::new(20)));
        assert!(!stream.is_parallelizable());
    }
}
