//! Legacy version of ChaCha20 with a 64-bit nonce ("djb" construction).

use crate::{variants::Legacy, ChaChaCore, R12, R20, R8};
use cipher::{array::Array, consts::U8, StreamCipherCoreWrapper};

/// Nonce type used by [`ChaCha20Legacy`].
pub type LegacyNonce = Array<u8, U8>;

/// The ChaCha8 stream cipher (legacy "djb" construction, 8 rounds).
pub type ChaCha8Legacy = StreamCipherCoreWrapper<ChaChaCore<R8, Legacy>>;

/// The ChaCha12 stream cipher (legacy "djb" construction, 12 rounds).
pub type ChaCha12Legacy = StreamCipherCoreWrapper<ChaChaCore<R12, Legacy>>;

/// The ChaCha20 stream cipher (legacy "djb" construction with 64-bit nonce).
///
/// Unlike [`crate::ChaCha20`] (RFC 8439's 96-bit-nonce/32-bit-counter
/// variant), this layout matches the original djb construction: an 8-byte
/// nonce and a full 64-bit block counter.
pub type ChaCha20Legacy = StreamCipherCoreWrapper<ChaChaCore<R20, Legacy>>;
