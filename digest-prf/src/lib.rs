//! The subset of message digests the symmetric cipher core needs as a PRF:
//! inside the KDFs and inside the HX-extended block-cipher key
//! schedules. General-purpose hashing is out of scope, so this crate
//! exposes exactly the operations those two callers need: a one-shot
//! hash and a one-shot HMAC, dispatched at runtime over a
//! [`DigestAlgorithm`] enum rather than monomorphized per algorithm,
//! since both callers select the digest at construction time from a
//! caller-supplied parameter.

#![warn(missing_docs, rust_2018_idioms)]

mod skein;

use blake2::{Blake2b512, Blake2s256};
use digest::Digest as _;
use hmac::{Hmac, Mac};
use sha2::{Sha256, Sha512};
use sha3::{Keccak256, Keccak512};
use symmetric_core::{Error, ErrorKind, Result};

pub use skein::SkeinVariant;

/// The nine digests recognized as PRF backends by this crate.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum DigestAlgorithm {
    /// SHA-256 (32-byte output, 64-byte block).
    Sha256,
    /// SHA-512 (64-byte output, 128-byte block).
    Sha512,
    /// BLAKE2s-256 (32-byte output, 64-byte block).
    Blake2s256,
    /// BLAKE2b-512 (64-byte output, 128-byte block).
    Blake2b512,
    /// Keccak-256 (32-byte output, 136-byte block).
    Keccak256,
    /// Keccak-512 (64-byte output, 72-byte block).
    Keccak512,
    /// Skein-256 (32-byte output).
    Skein256,
    /// Skein-512 (64-byte output).
    Skein512,
    /// Skein-1024 (128-byte output).
    Skein1024,
}

impl DigestAlgorithm {
    /// Output size in bytes.
    pub const fn digest_size(self) -> usize {
        match self {
            DigestAlgorithm::Sha256 | DigestAlgorithm::Blake2s256 | DigestAlgorithm::Keccak256 => {
                32
            }
            DigestAlgorithm::Sha512 | DigestAlgorithm::Blake2b512 | DigestAlgorithm::Keccak512 => {
                64
            }
            DigestAlgorithm::Skein256 => 32,
            DigestAlgorithm::Skein512 => 64,
            DigestAlgorithm::Skein1024 => 128,
        }
    }

    /// Internal compression block size in bytes, used by HMAC for
    /// key-padding (the HX block-cipher schedules and the HKDF/PBKDF2
    /// KDFs both build HMAC over this).
    pub const fn block_size(self) -> usize {
        match self {
            DigestAlgorithm::Sha256 | DigestAlgorithm::Blake2s256 => 64,
            DigestAlgorithm::Sha512 | DigestAlgorithm::Blake2b512 => 128,
            DigestAlgorithm::Keccak256 => 136,
            DigestAlgorithm::Keccak512 => 72,
            DigestAlgorithm::Skein256 => 32,
            DigestAlgorithm::Skein512 => 64,
            DigestAlgorithm::Skein1024 => 128,
        }
    }
}

/// One-shot hash: `H(data)`. Used directly by KDF2, which is a
/// bare-digest counter-mode KDF with no HMAC layer.
pub fn hash(alg: DigestAlgorithm, data: &[u8]) -> Vec<u8> {
    match alg {
        DigestAlgorithm::Sha256 => Sha256::digest(data).to_vec(),
        DigestAlgorithm::Sha512 => Sha512::digest(data).to_vec(),
        DigestAlgorithm::Blake2s256 => Blake2s256::digest(data).to_vec(),
        DigestAlgorithm::Blake2b512 => Blake2b512::digest(data).to_vec(),
        DigestAlgorithm::Keccak256 => Keccak256::digest(data).to_vec(),
        DigestAlgorithm::Keccak512 => Keccak512::digest(data).to_vec(),
        DigestAlgorithm::Skein256 => skein::skein_hash(SkeinVariant::Skein256, data),
        DigestAlgorithm::Skein512 => skein::skein_hash(SkeinVariant::Skein512, data),
        DigestAlgorithm::Skein1024 => skein::skein_hash(SkeinVariant::Skein1024, data),
    }
}

/// One-shot `HMAC(key, data)`: the PRF every KDF in this workspace (HKDF's
/// Extract/Expand, PBKDF2's `U_j` chain) and every HX block-cipher key
/// schedule build on. Chooses the algorithm the digest was constructed with
/// at runtime.
pub fn hmac(alg: DigestAlgorithm, key: &[u8], data: &[u8]) -> Vec<u8> {
    macro_rules! run {
        ($Mac:ty) => {{
            let mut mac =
                <$Mac>::new_from_slice(key).expect("HMAC accepts keys of any length");
            mac.update(data);
            mac.finalize().into_bytes().to_vec()
        }};
    }
    match alg {
        DigestAlgorithm::Sha256 => run!(Hmac<Sha256>),
        DigestAlgorithm::Sha512 => run!(Hmac<Sha512>),
        DigestAlgorithm::Blake2s256 => run!(Hmac<Blake2s256>),
        DigestAlgorithm::Blake2b512 => run!(Hmac<Blake2b512>),
        DigestAlgorithm::Keccak256 => run!(Hmac<Keccak256>),
        DigestAlgorithm::Keccak512 => run!(Hmac<Keccak512>),
        DigestAlgorithm::Skein256 => skein::skein_mac(SkeinVariant::Skein256, key, data),
        DigestAlgorithm::Skein512 => skein::skein_mac(SkeinVariant::Skein512, key, data),
        DigestAlgorithm::Skein1024 => skein::skein_mac(SkeinVariant::Skein1024, key, data),
    }
}

/// RFC 5869 HKDF-Expand, independent of Extract: `T(i) = HMAC(prk, T(i-1)
/// || info || i)`, output is the first `length` bytes of `T(1) || T(2) ||
/// ...`. Shared by [`kdf`](https://docs.rs/kdf)'s public `Hkdf` DRBG and by
/// every HX-extended block cipher's key schedule, which is itself an
/// HKDF-Expand call with the user key standing in for `prk` and no
/// `info`.
pub fn hkdf_expand(
    alg: DigestAlgorithm,
    prk: &[u8],
    info: &[u8],
    length: usize,
) -> Result<Vec<u8>> {
    let hash_len = alg.digest_size();
    let max_len = 255 * hash_len;
    if length > max_len {
        return Err(Error::new(
            "digest-prf",
            "hkdf_expand",
            ErrorKind::OutputSizeExceeded,
        ));
    }

    let mut okm = Vec::with_capacity(length);
    let mut t = Vec::new();
    let mut counter: u8 = 0;
    while okm.len() < length {
        counter += 1;
        let mut input = Vec::with_capacity(t.len() + info.len() + 1);
        input.extend_from_slice(&t);
        input.extend_from_slice(info);
        input.push(counter);
        t = hmac(alg, prk, &input);
        okm.extend_from_slice(&t);
    }
    okm.truncate(length);
    Ok(okm)
}
