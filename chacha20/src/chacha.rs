//! The IETF ChaCha variants: 96-bit nonce, 32-bit counter (RFC 8439).

pub use cipher::KeyIvInit;
use cipher::{
    array::Array,
    consts::{U12, U32},
    StreamCipherCoreWrapper,
};

use crate::{variants::Ietf, ChaChaCore, R12, R20, R8};

/// Key type used by all ChaCha variants and [`crate::XChaCha20`].
pub type Key = Array<u8, U32>;

/// Nonce type used by the IETF ChaCha variants.
pub type Nonce = Array<u8, U12>;

/// ChaCha8 stream cipher (reduced-round variant of [`ChaCha20`] with 8 rounds)
pub type ChaCha8 = StreamCipherCoreWrapper<ChaChaCore<R8, Ietf>>;

/// ChaCha12 stream cipher (reduced-round variant of [`ChaCha20`] with 12 rounds)
pub type ChaCha12 = StreamCipherCoreWrapper<ChaChaCore<R12, Ietf>>;

/// ChaCha20 stream cipher (RFC 8439 version with 96-bit nonce)
pub type ChaCha20 = StreamCipherCoreWrapper<ChaChaCore<R20, Ietf>>;
