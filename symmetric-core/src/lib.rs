//! Shared contracts for the symmetric cipher core: secret-material carrier,
//! error taxonomy, and the small capability-set traits that block ciphers,
//! modes of operation, stream ciphers, and DRBGs/KDFs all implement.
//!
//! Every "IFoo" hierarchy the source family this crate distills from used
//! for its cipher primitives collapses here into one of four traits. None
//! of them require virtual dispatch, though `dyn` use is fine: callers that
//! resolve a cipher configuration once (as [`cipher-stream`](https://docs.rs/cipher-stream))
//! at construction pay one indirection per block, not per crate.

#![warn(missing_docs, rust_2018_idioms)]

use std::fmt;

pub use zeroize;

mod key_params;
pub use key_params::KeyParams;

/// Which half of a cipher pair an engine was initialized to run.
///
/// Frozen for the lifetime of the object that holds it: a [`BlockCipher`]
/// initialized for [`Direction::Encrypt`] never decrypts, and vice versa.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum Direction {
    /// Forward transform.
    Encrypt,
    /// Inverse transform.
    Decrypt,
}

/// The tag half of a structured error: `{ component, operation, kind }`.
///
/// Message text (the `Display` impl) is advisory — callers should match
/// on [`Error::kind`], not parse the message.
#[derive(Debug, thiserror::Error)]
#[error("{component}: {operation}: {kind}")]
pub struct Error {
    /// Name of the component that raised the error, e.g. `"aes"`, `"ctr"`.
    pub component: &'static str,
    /// Name of the operation in progress, e.g. `"initialize"`, `"generate"`.
    pub operation: &'static str,
    /// The structured, matchable error tag.
    #[source]
    pub kind: ErrorKind,
}

impl Error {
    /// Build an error tagged with the given component/operation names.
    pub fn new(component: &'static str, operation: &'static str, kind: ErrorKind) -> Self {
        Self {
            component,
            operation,
            kind,
        }
    }
}

/// Structured error kinds. None require a stack-unwinding exception
/// type; all are distinguishable by tag.
#[derive(Debug, Copy, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ErrorKind {
    /// `|key|` is not a member of the algorithm's legal key-size set.
    #[error("invalid key size")]
    InvalidKeySize,
    /// `|iv|` does not match the algorithm's required IV/nonce size.
    #[error("invalid IV size")]
    InvalidIvSize,
    /// A parameter (round count, iteration count, counter width, ...) is
    /// out of its legal range, or a required argument was missing.
    #[error("invalid parameter")]
    InvalidParameter,
    /// `Transform`/`Generate` was called before `Initialize`.
    #[error("not initialized")]
    NotInitialized,
    /// The caller-supplied output buffer is shorter than required.
    #[error("buffer too small")]
    BufferTooSmall,
    /// A KDF-specific output-size maximum was exceeded (HKDF's 255
    /// `HashLen` blocks, PBKDF2's derived-key-length ceiling).
    #[error("requested output size exceeds the algorithm's maximum")]
    OutputSizeExceeded,
    /// Padding-stripping found no validly padded trailing block where one
    /// was expected. Surfaces from `CipherStream`, never from the padding
    /// primitives themselves (they report "no padding found" as zero).
    #[error("invalid padding")]
    PaddingInvalid,
}

/// `Result` alias used throughout the symmetric cipher core.
pub type Result<T> = std::result::Result<T, Error>;

/// A fixed-size block permutation parameterized by a key: the contract
/// every block cipher (AES, Serpent, Twofish, and their HX-extended
/// variants) implements.
///
/// Per-block transforms assume correctly sized buffers; callers (modes,
/// `CipherStream`) are responsible for chunking input to `block_size()`.
/// The only operation that can fail after construction is re-`initialize`.
pub trait BlockCipher {
    /// Block size in bytes (16 for Serpent/Twofish, 16 or 32 for
    /// AES/Rijndael).
    fn block_size(&self) -> usize;

    /// Legal key sizes in bytes, ascending.
    fn legal_key_sizes(&self) -> &'static [usize];

    /// Algorithm name, e.g. `"AES-256"`, `"Serpent"`, `"RHX"`.
    fn name(&self) -> &'static str;

    /// Whether `initialize` has been called at least once.
    fn initialized(&self) -> bool;

    /// Validate `key_params.key` against `legal_key_sizes()`, expand the
    /// round-key schedule, and freeze `direction` for this object's
    /// lifetime. Any prior schedule is zeroed before the new one is
    /// computed.
    fn initialize(&mut self, direction: Direction, key_params: &KeyParams) -> Result<()>;

    /// Encrypt exactly one block. `input` and `output` must each be
    /// `block_size()` bytes; they may alias.
    fn encrypt_block(&mut self, input: &[u8], output: &mut [u8]);

    /// Decrypt exactly one block. `input` and `output` must each be
    /// `block_size()` bytes; they may alias.
    fn decrypt_block(&mut self, input: &[u8], output: &mut [u8]);

    /// Encrypt or decrypt one block per the direction frozen at
    /// `initialize` time.
    fn transform(&mut self, input: &[u8], output: &mut [u8]) {
        match self.direction() {
            Direction::Encrypt => self.encrypt_block(input, output),
            Direction::Decrypt => self.decrypt_block(input, output),
        }
    }

    /// The direction this instance was last initialized with.
    fn direction(&self) -> Direction;
}

/// A block-cipher mode of operation: ECB, CBC, CFB, OFB, CTR.
///
/// Extends [`BlockCipher`]'s per-block surface with parallelism
/// accessors and a buffered multi-block transform that `CipherStream`
/// drives.
pub trait Mode: BlockCipher {
    /// Whether this mode supports processing disjoint blocks out of
    /// order (ECB, CBC-decrypt, CFB-decrypt, CTR). Strictly sequential
    /// modes (CBC-encrypt, CFB-encrypt, OFB) return `false` always.
    fn is_parallelizable(&self) -> bool;

    /// Advisory parallel-processing flag; only takes effect when
    /// `is_parallelizable()` is `true`.
    fn is_parallel(&self) -> bool;

    /// Set the advisory parallel-processing flag.
    fn set_parallel(&mut self, parallel: bool);

    /// Current parallel chunk size in bytes; a multiple of
    /// `parallel_minimum_size()`.
    fn parallel_block_size(&self) -> usize;

    /// Set the parallel chunk size; rounded up to a multiple of
    /// `parallel_minimum_size()` and capped at `parallel_maximum_size()`.
    fn set_parallel_block_size(&mut self, size: usize);

    /// `processor_count * block_size()` — the smallest sensible chunk to
    /// hand to a single worker.
    fn parallel_minimum_size(&self) -> usize;

    /// Hard ceiling on `parallel_block_size()` (100 MiB).
    fn parallel_maximum_size(&self) -> usize {
        100 * 1024 * 1024
    }

    /// Transform a buffer whose length is a multiple of `block_size()`,
    /// honoring `is_parallel()` for parallelizable modes. `input` and
    /// `output` must have equal length; they may alias.
    fn transform_blocks(&mut self, input: &[u8], output: &mut [u8]);
}

/// A keystream generator over a nonce/counter state: Salsa20, ChaCha.
pub trait StreamCipher {
    /// Internal processing block size in bytes (64 for Salsa/ChaCha).
    fn block_size(&self) -> usize {
        64
    }

    /// Legal key sizes in bytes (16 and 32 for Salsa/ChaCha).
    fn legal_key_sizes(&self) -> &'static [usize];

    /// Legal round counts, ascending even numbers in `8..=30`.
    fn legal_rounds(&self) -> &'static [usize];

    /// Validate sizes, build the 16-word state, and select the key-size
    /// dependent constant.
    fn initialize(&mut self, key_params: &KeyParams) -> Result<()>;

    /// XOR the keystream into `input`, writing to `output` (may alias).
    /// Arbitrary length; the 64-bit block counter advances correctly
    /// even across calls that do not end on a block boundary.
    fn transform(&mut self, input: &[u8], output: &mut [u8]);
}

/// A deterministic random bit generator / key derivation function: HKDF,
/// PBKDF2, KDF2, the digest-counter DRBG, and the two CTR-mode DRBGs.
pub trait Drbg {
    /// Size, in bytes, of the `key`/seed this DRBG was constructed with,
    /// once initialized (0 before `initialize`).
    fn key_size(&self) -> usize;

    /// Whether `initialize` has been called.
    fn initialized(&self) -> bool;

    /// Seed the generator from `key`, with optional `salt` and `info`.
    fn initialize(&mut self, key: &[u8], salt: &[u8], info: &[u8]) -> Result<()>;

    /// Fill `out` with pseudo-random bytes, returning the number of bytes
    /// written (always `out.len()` on success). Fails with
    /// [`ErrorKind::NotInitialized`] before `initialize`, or
    /// [`ErrorKind::OutputSizeExceeded`] past an algorithm-specific
    /// maximum.
    fn generate(&mut self, out: &mut [u8]) -> Result<usize>;

    /// Reseed from fresh material without discarding algorithm
    /// parameters established at `initialize` time.
    fn update(&mut self, seed: &[u8]) -> Result<()>;
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Direction::Encrypt => f.write_str("encrypt"),
            Direction::Decrypt => f.write_str("decrypt"),
        }
    }
}

/// Round a `size` up to the nearest multiple of `granule` (`granule > 0`).
/// Shared by every mode/DRBG that clamps a caller-supplied chunk size to
/// `parallel_minimum_size()`.
pub fn round_up(size: usize, granule: usize) -> usize {
    if granule == 0 {
        return size;
    }
    size.div_ceil(granule) * granule
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn round_up_rounds_to_granule() {
        assert_eq!(round_up(0, 16), 0);
        assert_eq!(round_up(1, 16), 16);
        assert_eq!(round_up(16, 16), 16);
        assert_eq!(round_up(17, 16), 32);
    }

    #[test]
    fn direction_display() {
        assert_eq!(Direction::Encrypt.to_string(), "encrypt");
        assert_eq!(Direction::Decrypt.to_string(), "decrypt");
    }
}
