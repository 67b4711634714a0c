// Copyright 2018 Developers of the Rand project.
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// https://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or https://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

#![cfg_attr(not(test), forbid(unsafe_code))]
//! Block RNG based on rand_core::BlockRng
use core::fmt::Debug;

use cipher::{BlockSizeUser, StreamCipherCore, Unsigned};
use rand_core::{
    block::{BlockRng, BlockRngCore},
    CryptoRng, Error, RngCore, SeedableRng,
};

#[cfg(feature = "serde1")]
use serde::{Deserialize, Deserializer, Serialize, Serializer};

#[cfg(feature = "zeroize")]
use cipher::zeroize::{Zeroize, ZeroizeOnDrop};

use cfg_if::cfg_if;

use crate::{
    cipher::{generic_array::GenericArray, ParBlocks, ParBlocksSizeUser}, //KEY_SIZE,
    ChaChaCore,
    U10,
    U4,
    U6,
    U64,
};
use cipher::StreamCipherSeekCore;

// NB. this must remain consistent with some currently hard-coded numbers in this module
const BUF_BLOCKS: u8 = 4;
// number of 32-bit words per ChaCha block (fixed by algorithm definition)
const BLOCK_WORDS: u8 = 16;

/// Array wrapper used for `BlockRngCore::Results` associated types.
#[derive(Clone)]
pub struct BlockRngResults([u32; 64]);

impl Default for BlockRngResults {
    fn default() -> Self {
        Self([0u32; 64])
    }
}

impl AsRef<[u32]> for BlockRngResults {
    fn as_ref(&self) -> &[u32] {
        &self.0
    }
}

impl AsMut<[u32]> for BlockRngResults {
    fn as_mut(&mut self) -> &mut [u32] {
        &mut self.0
    }
}

impl BlockSizeUser for BlockRngResults {
    type BlockSize = U64;
    fn block_size() -> usize {
        256
    }
}

#[cfg(feature = "zeroize")]
impl Drop for BlockRngResults {
    fn drop(&mut self) {
        self.as_mut().zeroize();
    }
}

#[cfg(feature = "zeroize")]
impl ZeroizeOnDrop for BlockRngResults {}

// Define macro to automatically zeroize input of `From<x>` without any unused
// muts when zeroize isn't enabled
macro_rules! impl_zeroize_from {
    ($from:ty, $struct:ident) => {
        impl From<$from> for $struct {
            #[cfg(feature = "zeroize")]
            fn from(mut value: $from) -> Self {
                let input = Self(value);
                value.zeroize();
                input
            }
            #[cfg(not(feature = "zeroize"))]
            fn from(value: $from) -> Self {
                Self(value)
            }
        }
    };
}

// macro for ZeroizeOnDrop impl for wrappers
macro_rules! impl_zeroize_on_drop {
    ($struct:ident) => {
        #[cfg(feature = "zeroize")]
        impl Drop for $struct {
            fn drop(&mut self) {
                self.0.zeroize();
            }
        }
        #[cfg(feature = "zeroize")]
        impl ZeroizeOnDrop for $struct {}
    };
}

/// The seed for ChaCha20. Implements ZeroizeOnDrop when the
/// zeroize feature is enabled.
#[derive(PartialEq, Eq)]
#[cfg_attr(feature = "serde1", derive(Serialize, Deserialize))]
pub struct Seed([u8; 32]);

impl Default for Seed {
    fn default() -> Self {
        Self([0u8; 32])
    }
}
impl AsRef<[u8; 32]> for Seed {
    fn as_ref(&self) -> &[u8; 32] {
        &self.0
    }
}
impl AsMut<[u8]> for Seed {
    fn as_mut(&mut self) -> &mut [u8] {
        self.0.as_mut()
    }
}

impl_zeroize_from!([u8; 32], Seed);

impl Debug for Seed {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        self.0.fmt(f)
    }
}

impl_zeroize_on_drop!(Seed);

/// An internally used trait to help with zeroizing unsigned ints that are primarily
/// used for le bytes
trait ZeroizeToLeBytes {
    type Output;
    fn zeroize_to_le_bytes(&mut self) -> Self::Output;
}

// Define macro for ensuring zeroization of an unsigned int before it is converted to
// le bytes
#[cfg(feature = "zeroize")]
macro_rules! impl_zeroize_to_le_bytes {
    ($type:ident, $output_size:expr, $byte_wrapper:ident) => {
        struct $byte_wrapper([u8; $output_size]);

        impl_zeroize_on_drop!($byte_wrapper);

        impl ZeroizeToLeBytes for $type {
            type Output = $byte_wrapper;
            fn zeroize_to_le_bytes(&mut self) -> $byte_wrapper {
                let bytes = $byte_wrapper(self.to_le_bytes());
                self.zeroize();
                bytes
            }
        }
    };
}
#[cfg(feature = "zeroize")]
impl_zeroize_to_le_bytes!(u64, 8, Zeroizing8Bytes);
#[cfg(feature = "zeroize")]
impl_zeroize_to_le_bytes!(u128, 16, Zeroizing16Bytes);

/// A zeroizable wrapper for set_word_pos() input that can be assembled from:
/// * `u64`
/// * `[u8; 5]`
///
/// There would be a minor performance benefit from using a `[u8; 5]`, as it
/// avoids some copies, bit operations, and extra zeroizing.
pub struct WordPosInput([u8; 5]);

impl_zeroize_from!([u8; 5], WordPosInput);

impl From<u64> for WordPosInput {
    #[cfg(feature = "zeroize")]
    fn from(mut value: u64) -> Self {
        let shifted = (value >> 4).zeroize_to_le_bytes();
        let original = value.zeroize_to_le_bytes();
        let mut result = [0u8; 5];
        // copy the "index" byte to Self.0[0]
        result[4] = original.0[0];
        // copy the block_pos 32 bits to Self.0[1..5]
        result[0..4].copy_from_slice(&shifted.0[0..4]);
        Self(result)
    }
    #[cfg(not(feature = "zeroize"))]
    fn from(value: u64) -> Self {
        let shifted = (value >> 4).to_le_bytes();
        let original = value.to_le_bytes();
        let mut result = [0u8; 5];
        result[4] = original[0];
        result[0..4].copy_from_slice(&shifted[0..4]);
        Self(result)
    }
}
impl_zeroize_on_drop!(WordPosInput);

/// A zeroizing wrapper for the `stream_id`. It can be used with a `[u8; 12]` or
/// a `u128`.
///
/// There is a minor performance benefit when using a `[u8; 12]` as the input, as
/// it will avoid a copy, as well as a `u128::zeroize()` if the `zeroize` feature
/// is enabled.
pub struct StreamId([u8; 12]);

impl_zeroize_from!([u8; 12], StreamId);

impl From<u128> for StreamId {
    #[cfg(feature = "zeroize")]
    fn from(mut value: u128) -> Self {
        let mut lower_12_bytes = [0u8; 12];
        let bytes = value.zeroize_to_le_bytes();

        lower_12_bytes.copy_from_slice(&bytes.0[0..12]);

        Self(lower_12_bytes)
    }
    #[cfg(not(feature = "zeroize"))]
    fn from(value: u128) -> Self {
        let mut lower_12_bytes = [0u8; 12];
        let bytes = value.to_le_bytes();
        lower_12_bytes.copy_from_slice(&bytes[0..12]);
        Self(lower_12_bytes)
    }
}
impl_zeroize_on_drop!(StreamId);

impl<R: Unsigned> ChaChaCore<R> {
    /// Copied from ChaChaCore<R>::new() to avoid using KeyIvInit/Key/Nonce
    #[inline]
    fn from_seed(seed: Seed) -> Self {
        let mut state = [0u32; super::STATE_WORDS];
        state[0..4].copy_from_slice(&super::CONSTANTS);
        let key_chunks = seed.0.chunks_exact(4);
        for (val, chunk) in state[4..12].iter_mut().zip(key_chunks) {
            *val = u32::from_le_bytes(chunk.try_into().unwrap());
        }
        cfg_if! {
            if #[cfg(chacha20_force_soft)] {
                let tokens = ();
            } else if #[cfg(any(target_arch = "x86", target_arch = "x86_64"))] {
                cfg_if! {
                    if #[cfg(chacha20_force_avx2)] {
                        let tokens = ();
                    } else if #[cfg(chacha20_force_sse2)] {
                        let tokens = ();
                    } else {
                        let tokens = (crate::avx2_cpuid::init(), crate::sse2_cpuid::init());
                    }
                }
            } else {
                let tokens = ();
            }
        }

        Self {
            state,
            tokens,
            rounds: core::marker::PhantomData,
        }
    }
}

/// This is the internal block of ChaChaCore
#[derive(Copy, Clone)]
struct Block(GenericArray<u8, U64>);
impl AsRef<[u8]> for Block {
    fn as_ref(&self) -> &[u8] {
        &self.0
    }
}

impl BlockSizeUser for Block {
    type BlockSize = U64;
    fn block_size() -> usize {
        64
    }
}
impl ParBlocksSizeUser for Block {
    type ParBlocksSize = U4;
}

/// A trait for altering the state of ChaChaCore<R>
trait AlteredState {
    /// Set the stream identifier
    fn set_stream(&mut self, stream: &[u8; 12]);
    /// Get the stream identifier
    fn get_stream(&self) -> [u8; 12];
    /// Get the seed
    fn get_seed(&self) -> [u8; 32];
}

impl<R: Unsigned> AlteredState for ChaChaCore<R> {
    fn set_stream(&mut self, stream: &[u8; 12]) {
        for (n, chunk) in self.state[13..16]
            .as_mut()
            .iter_mut()
            .zip(stream.chunks_exact(4))
        {
            *n = u32::from_le_bytes(chunk.try_into().unwrap());
        }
    }
    fn get_stream(&self) -> [u8; 12] {
        let mut result = [0u8; 12];
        for (i, &big) in self.state[13..16].iter().enumerate() {
            let index = i * 4;
            result[index + 0] = big as u8;
            result[index + 1] = (big >> 8) as u8;
            result[index + 2] = (big >> 16) as u8;
            result[index + 3] = (big >> 24) as u8;
        }
        result
    }
    fn get_seed(&self) -> [u8; 32] {
        let mut result = [0u8; 32];
        for (i, &big) in self.state[4..12].iter().enumerate() {
            let index = i * 4;
            result[index + 0] = big as u8;
            result[index + 1] = (big >> 8) as u8;
            result[index + 2] = (big >> 16) as u8;
            result[index + 3] = (big >> 24) as u8;
        }
        result
    }
}

macro_rules! impl_chacha_rng {
    ($ChaChaXRng:ident, $ChaChaXCore:ident, $rounds:ident, $abst: ident) => {
        /// A cryptographically secure random number generator that uses the ChaCha algorithm.
        ///
        /// ChaCha is a stream cipher designed by Daniel J. Bernstein[^1], that we use as an RNG. It is
        /// an improved variant of the Salsa20 cipher family, which was selected as one of the "stream
        /// ciphers suitable for widespread adoption" by eSTREAM[^2].
        ///
        /// ChaCha uses add-rotate-xor (ARX) operations as its basis. These are safe against timing
        /// attacks, although that is mostly a concern for ciphers and not for RNGs. We provide a SIMD
        /// implementation to support high throughput on a variety of common hardware platforms.
        ///
        /// With the ChaCha algorithm it is possible to choose the number of rounds the core algorithm
        /// should run. The number of rounds is a tradeoff between performance and security, where 8
        /// rounds is the minimum potentially secure configuration, and 20 rounds is widely used as a
        /// conservative choice.
        ///
        /// We use a 32-bit counter and 32-bit stream identifier as in the IETF implementation[^3]
        /// except that we use a stream identifier in place of a nonce. A 32-bit counter over 64-byte
        /// (16 word) blocks allows 256 GiB of output before cycling, and the stream identifier allows
        /// 2<sup>96</sup> unique streams of output per seed. Both counter and stream are initialized
        /// to zero but may be set via the `set_word_pos` and `set_stream` methods.
        ///
        /// The word layout is:
        ///
        /// ```text
        /// constant  constant  constant  constant
        /// seed      seed      seed      seed
        /// seed      seed      seed      seed
        /// counter   stream_id stream_id stream_id
        /// ```
        /// This implementation uses an output buffer of sixteen `u32` words, and uses
        /// [`BlockRng`] to implement the [`RngCore`] methods.
        /// # Example for `ChaCha20Rng`
        ///
        /// ```rust
        /// use chacha20::ChaCha20Rng;
        /// // use rand_core traits
        /// use rand_core::{SeedableRng, RngCore};
        ///
        /// // the following inputs are examples and are neither recommended nor suggested values
        ///
        /// let seed = [42u8; 32];
        /// let mut rng = ChaCha20Rng::from_seed(seed);
        /// rng.set_stream(100);
        ///
        /// // you can also use a [u8; 12] in `.set_stream()`, which has a *minor*
        /// // performance benefit over a u128
        /// rng.set_stream([3u8; 12]);
        ///
        ///
        /// rng.set_word_pos(5);
        ///
        /// // you can also use a [u8; 5] in `.set_word_pos()`, which has a *minor*
        /// // performance benefit over a u64
        /// rng.set_word_pos([2u8; 5]);
        ///
        /// let x = rng.next_u32();
        /// let mut array = [0u8; 32];
        /// rng.fill_bytes(&mut array);
        /// ```
        ///
        /// The other Rngs from this crate are initialized similarly.
        ///
        /// [^1]: D. J. Bernstein, [*ChaCha, a variant of Salsa20*](
        ///       https://cr.yp.to/chacha.html)
        ///
        /// [^2]: [eSTREAM: the ECRYPT Stream Cipher Project](
        ///       http://www.ecrypt.eu.org/stream/)
        ///
        /// [^3]: Internet Research Task Force, [*ChaCha20 and Poly1305 for IETF Protocols*](
        ///       https://www.rfc-editor.org/rfc/rfc8439)
        #[cfg_attr(docsrs, doc(cfg(feature = "rng")))]
        #[derive(Clone)]
        pub struct $ChaChaXRng {
            rng: BlockRng<$ChaChaXCore>,
        }

        impl SeedableRng for $ChaChaXRng {
            type Seed = [u8; 32];

            #[inline]
            fn from_seed(seed: Self::Seed) -> Self {
                let core = $ChaChaXCore::from_seed(seed.into());
                Self {
                    rng: BlockRng::new(core),
                }
            }
        }

        impl RngCore for $ChaChaXRng {
            #[inline]
            fn next_u32(&mut self) -> u32 {
                self.rng.next_u32()
            }

            #[inline]
            fn next_u64(&mut self) -> u64 {
                self.rng.next_u64()
            }

            #[inline]
            fn fill_bytes(&mut self, bytes: &mut [u8]) {
                self.rng.fill_bytes(bytes)
            }

            #[inline]
            fn try_fill_bytes(&mut self, bytes: &mut [u8]) -> Result<(), Error> {
                self.rng.try_fill_bytes(bytes)
            }
        }

        impl CryptoRng for $ChaChaXRng {}

        // Custom Debug implementation that does not expose the internal state
        impl Debug for $ChaChaXRng {
            fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
                write!(f, "ChaChaXCore {{}}")
            }
        }

        #[doc = "Core random number generator, for use with [`rand_core::block::BlockRng`]"]
        #[cfg_attr(docsrs, doc(cfg(feature = "rng")))]
        #[derive(Clone)]
        pub struct $ChaChaXCore {
            block: ChaChaCore<$rounds>,
            parallel_blocks: ParBlocks<Block>,
            counter: u32,
        }

        impl SeedableRng for $ChaChaXCore {
            type Seed = Seed;

            #[inline]
            fn from_seed(seed: Self::Seed) -> Self {
                let block = ChaChaCore::<$rounds>::from_seed(seed);
                Self {
                    block,
                    counter: 0,
                    parallel_blocks: GenericArray::from([GenericArray::from([0u8; 64]); 4]),
                }
            }
        }

        impl BlockRngCore for $ChaChaXCore {
            type Item = u32;
            type Results = BlockRngResults;

            fn generate(&mut self, results: &mut Self::Results) {
                self.block.write_keystream_blocks(&mut self.parallel_blocks);
                let mut offset = 0;
                for block in self.parallel_blocks {
                    for (n, chunk) in results.0[offset..]
                        .as_mut()
                        .iter_mut()
                        .zip(block.chunks_exact(4))
                    {
                        *n = u32::from_le_bytes(chunk.try_into().unwrap());
                    }
                    offset += 16;
                }

                self.counter = self.counter.wrapping_add(1);
            }
        }

        impl $ChaChaXRng {
            // The buffer is a 4-block window, i.e. it is always at a block-aligned position in the
            // stream but if the stream has been sought it may not be self-aligned.

            /// Get the offset from the start of the stream, in 32-bit words.
            ///
            /// Since the generated blocks are 16 words (2<sup>4</sup>) long and the
            /// counter is 32-bits, the offset is a 36-bit number. Sub-word offsets are
            /// not supported, hence the result can simply be multiplied by 4 to get a
            /// byte-offset.
            #[inline]
            pub fn get_word_pos(&self) -> u64 {
                let buf_start_block = {
                    let buf_end_block = self.rng.core.block.get_block_pos();
                    u32::wrapping_sub(buf_end_block, BUF_BLOCKS.into())
                };
                let (buf_offset_blocks, block_offset_words) = {
                    let buf_offset_words = self.rng.index() as u32;
                    let blocks_part = buf_offset_words / u32::from(BLOCK_WORDS);
                    let words_part = buf_offset_words % u32::from(BLOCK_WORDS);
                    (blocks_part, words_part)
                };
                let pos_block = u32::wrapping_add(buf_start_block, buf_offset_blocks);
                let pos_block_words = u64::from(pos_block) * u64::from(BLOCK_WORDS);
                pos_block_words + u64::from(block_offset_words)
            }

            /// Set the offset from the start of the stream, in 32-bit words. This method
            /// takes either:
            /// * u64
            /// * [u8; 5]
            ///
            /// There would be a *minor* performance benefit from using a `[u8; 5]` instead
            /// of a `u64`, as it avoids some copies and extra zeroizing.
            ///
            /// As with `get_word_pos`, we use a 36-bit number. Since the generator
            /// simply cycles at the end of its period (256 GiB), we only use the lower
            /// 36 bits.
            #[inline]
            pub fn set_word_pos<W: Into<WordPosInput>>(&mut self, word_offset: W) {
                let word_offset: WordPosInput = word_offset.into();
                self.rng
                    .core
                    .block
                    .set_block_pos(u32::from_le_bytes(word_offset.0[0..4].try_into().unwrap()));
                self.rng
                    .generate_and_set((word_offset.0[4] & 0x0F) as usize);
            }

            /// Set the stream number. The lower 96 bits are used and the rest are
            /// discarded. This method takes either:
            /// * [u8; 12]
            /// * u128
            ///
            /// There is a *minor* performance benefit when using a `[u8; 12]` as the
            /// input, although it may be negligible.
            ///
            /// This is initialized to zero; 2<sup>96</sup> unique streams of output
            /// are available per seed/key.
            #[inline]
            pub fn set_stream<S: Into<StreamId>>(&mut self, stream: S) {
                let stream: StreamId = stream.into();
                self.rng.core.block.set_stream(&stream.0);
                if self.rng.index() != 64 {
                    let wp = self.get_word_pos();
                    self.set_word_pos(wp);
                }
            }

            /// Get the stream number.
            #[inline]
            pub fn get_stream(&self) -> u128 {
                let mut bytes = [0u8; 16];
                bytes[0..12].copy_from_slice(&self.rng.core.block.get_stream());
                u128::from_le_bytes(bytes)
            }

            /// Get the seed.
            #[inline]
            pub fn get_seed(&self) -> [u8; 32] {
                self.rng.core.block.get_seed()
            }
        }

        #[cfg(feature = "zeroize")]
        impl Drop for $ChaChaXCore {
            fn drop(&mut self) {
                self.counter.zeroize();
                self.parallel_blocks[0].zeroize();
                self.parallel_blocks[1].zeroize();
                self.parallel_blocks[2].zeroize();
                self.parallel_blocks[3].zeroize();
            }
        }

        #[cfg(feature = "zeroize")]
        impl ZeroizeOnDrop for $ChaChaXCore {}

        impl PartialEq<$ChaChaXRng> for $ChaChaXRng {
            fn eq(&self, rhs: &$ChaChaXRng) -> bool {
                let a: $abst::$ChaChaXRng = self.into();
                let b: $abst::$ChaChaXRng = rhs.into();
                a == b
            }
        }

        impl Eq for $ChaChaXRng {}

        #[cfg(feature = "serde1")]
        impl Serialize for $ChaChaXRng {
            fn serialize<S>(&self, s: S) -> Result<S::Ok, S::Error>
            where
                S: Serializer,
            {
                $abst::$ChaChaXRng::from(self).serialize(s)
            }
        }
        #[cfg(feature = "serde1")]
        impl<'de> Deserialize<'de> for $ChaChaXRng {
            fn deserialize<D>(d: D) -> Result<Self, D::Error>
            where
                D: Deserializer<'de>,
            {
                $abst::$ChaChaXRng::deserialize(d).map(|x| Self::from(&x))
            }
        }

        impl From<$ChaChaXCore> for $ChaChaXRng {
            fn from(core: $ChaChaXCore) -> Self {
                $ChaChaXRng {
                    rng: BlockRng::new(core),
                }
            }
        }

        mod $abst {
            #[cfg(feature = "serde1")]
            use serde::{Deserialize, Serialize};

            // The abstract state of a ChaCha stream, independent of implementation choices. The
            // comparison and serialization of this object is considered a semver-covered part of
            // the API.
            #[derive(Debug, PartialEq, Eq)]
            #[cfg_attr(feature = "serde1", derive(Serialize, Deserialize))]
            pub(crate) struct $ChaChaXRng {
                seed: crate::rng::Seed,
                stream: u128,
                word_pos: u64,
            }

            impl From<&super::$ChaChaXRng> for $ChaChaXRng {
                // Forget all information about the input except what is necessary to determine the
                // outputs of any sequence of pub API calls.
                fn from(r: &super::$ChaChaXRng) -> Self {
                    Self {
                        seed: r.get_seed().into(),
                        stream: r.get_stream(),
                        word_pos: r.get_word_pos(),
                    }
                }
            }

            impl From<&$ChaChaXRng> for super::$ChaChaXRng {
                // Construct one of the possible concrete RNGs realizing an abstract state.
                fn from(a: &$ChaChaXRng) -> Self {
                    use rand_core::SeedableRng;
                    let mut r = Self::from_seed(a.seed.0.into());
                    r.set_stream(a.stream);
                    r.set_word_pos(a.word_pos);
                    r
                }
            }
        }
    };
}

impl_chacha_rng!(ChaCha8Rng, ChaCha8Core, U4, abst8);

impl_chacha_rng!(ChaCha12Rng, ChaCha12Core, U6, abst12);

impl_chacha_rng!(ChaCha20Rng, ChaCha20Core, U10, abst20);
