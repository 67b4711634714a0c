//! ECB, CBC, CFB, OFB, and CTR block-cipher modes of operation over any
//! [`symmetric_core::BlockCipher`].
//!
//! Parallel execution (ECB both directions, CTR both directions,
//! CBC-decrypt, CFB-decrypt) forks with rayon's `par_chunks_mut`, grounded
//! on `other_examples/f3d929df_tobygrice-aesp__src-aesp-cipher.rs.rs`'s
//! `ctr_core_parallel`, which partitions a counter-mode cipher's blocks
//! across workers the same way. CBC-encrypt, CFB-encrypt, and OFB are
//! strictly sequential in both directions: each block's feedback
//! register depends on output the previous block has not yet produced.

#![warn(missing_docs, rust_2018_idioms)]

use rayon::prelude::*;
use symmetric_core::{round_up, BlockCipher, Direction, Error, ErrorKind, KeyParams, Mode, Result};
use zeroize::Zeroize;

fn processor_count() -> usize {
    num_cpus::get().max(1)
}

/// Add `offset` to a big-endian byte counter, starting from its
/// least-significant byte, propagating carry leftward across the whole
/// block so a multi-block jump never wraps silently at a 32-bit boundary.
fn counter_add(counter: &[u8], offset: u64) -> Vec<u8> {
    let mut result = counter.to_vec();
    let mut carry = offset;
    for byte in result.iter_mut().rev() {
        if carry == 0 {
            break;
        }
        let sum = *byte as u64 + (carry & 0xFF);
        *byte = (sum & 0xFF) as u8;
        carry = (carry >> 8) + (sum >> 8);
    }
    result
}

fn counter_increment(counter: &mut [u8]) {
    for byte in counter.iter_mut().rev() {
        *byte = byte.wrapping_add(1);
        if *byte != 0 {
            break;
        }
    }
}

/// Feedback-register bookkeeping shared by CBC, CFB, OFB, and CTR. ECB has
/// no feedback register and manages its own state directly.
struct Shared<C> {
    cipher: C,
    direction: Direction,
    register: Vec<u8>,
    parallel: bool,
    parallel_block_size: usize,
}

impl<C: BlockCipher + Clone> Shared<C> {
    fn new(cipher: C) -> Self {
        let block_size = cipher.block_size();
        Self {
            cipher,
            direction: Direction::Encrypt,
            register: vec![0u8; block_size],
            parallel: false,
            parallel_block_size: 0,
        }
    }

    fn minimum_size(&self) -> usize {
        processor_count() * self.cipher.block_size()
    }

    /// `cipher_direction` differs from `mode_direction` for OFB/CTR, whose
    /// underlying block cipher always runs in the forward direction
    /// regardless of which way the mode itself is being used.
    fn initialize(
        &mut self,
        mode_direction: Direction,
        cipher_direction: Direction,
        key_params: &KeyParams,
        component: &'static str,
    ) -> Result<()> {
        self.cipher.initialize(cipher_direction, key_params)?;
        self.direction = mode_direction;
        let block_size = self.cipher.block_size();
        let iv = key_params.iv();
        if !iv.is_empty() && iv.len() != block_size {
            return Err(Error::new(component, "initialize", ErrorKind::InvalidIvSize));
        }
        self.register.zeroize();
        self.register = vec![0u8; block_size];
        if !iv.is_empty() {
            self.register.copy_from_slice(iv);
        }
        if self.parallel_block_size == 0 {
            self.parallel_block_size = self.minimum_size();
        }
        Ok(())
    }
}

/// Electronic Codebook: every block is an independent permutation, fully
/// parallelizable in both directions.
pub struct Ecb<C> {
    cipher: C,
    direction: Direction,
    parallel: bool,
    parallel_block_size: usize,
}

impl<C: BlockCipher + Clone> Ecb<C> {
    /// Wrap `cipher` in ECB mode. `cipher` need not be initialized yet.
    pub fn new(cipher: C) -> Self {
        Self {
            cipher,
            direction: Direction::Encrypt,
            parallel: false,
            parallel_block_size: 0,
        }
    }

    fn minimum_size(&self) -> usize {
        processor_count() * self.cipher.block_size()
    }
}

impl<C: BlockCipher + Clone> BlockCipher for Ecb<C> {
    fn block_size(&self) -> usize {
        self.cipher.block_size()
    }

    fn legal_key_sizes(&self) -> &'static [usize] {
        self.cipher.legal_key_sizes()
    }

    fn name(&self) -> &'static str {
        "ECB"
    }

    fn initialized(&self) -> bool {
        self.cipher.initialized()
    }

    fn initialize(&mut self, direction: Direction, key_params: &KeyParams) -> Result<()> {
        self.cipher.initialize(direction, key_params)?;
        self.direction = direction;
        if self.parallel_block_size == 0 {
            self.parallel_block_size = self.minimum_size();
        }
        Ok(())
    }

    fn encrypt_block(&mut self, input: &[u8], output: &mut [u8]) {
        self.cipher.encrypt_block(input, output);
    }

    fn decrypt_block(&mut self, input: &[u8], output: &mut [u8]) {
        self.cipher.decrypt_block(input, output);
    }

    fn direction(&self) -> Direction {
        self.direction
    }
}

impl<C: BlockCipher + Clone + Sync + Send> Mode for Ecb<C> {
    fn is_parallelizable(&self) -> bool {
        true
    }

    fn is_parallel(&self) -> bool {
        self.parallel
    }

    fn set_parallel(&mut self, parallel: bool) {
        self.parallel = parallel;
    }

    fn parallel_block_size(&self) -> usize {
        self.parallel_block_size
    }

    fn set_parallel_block_size(&mut self, size: usize) {
        let min = self.minimum_size();
        self.parallel_block_size = round_up(size, min).min(self.parallel_maximum_size());
    }

    fn parallel_minimum_size(&self) -> usize {
        self.minimum_size()
    }

    fn transform_blocks(&mut self, input: &[u8], output: &mut [u8]) {
        let block_size = self.cipher.block_size();
        if self.parallel && input.len() > self.parallel_minimum_size() {
            let direction = self.direction;
            let cipher = &self.cipher;
            output
                .par_chunks_mut(block_size)
                .zip(input.par_chunks(block_size))
                .for_each(|(out_chunk, in_chunk)| {
                    let mut worker = cipher.clone();
                    match direction {
                        Direction::Encrypt => worker.encrypt_block(in_chunk, out_chunk),
                        Direction::Decrypt => worker.decrypt_block(in_chunk, out_chunk),
                    }
                });
        } else {
            for (in_chunk, out_chunk) in input.chunks(block_size).zip(output.chunks_mut(block_size)) {
                self.cipher.transform(in_chunk, out_chunk);
            }
        }
    }
}

/// Cipher Block Chaining. Encryption is strictly sequential; decryption is
/// parallelizable because each plaintext block depends only on two
/// ciphertext blocks, both available up front.
pub struct Cbc<C> {
    inner: Shared<C>,
}

impl<C: BlockCipher + Clone> Cbc<C> {
    /// Wrap `cipher` in CBC mode.
    pub fn new(cipher: C) -> Self {
        Self {
            inner: Shared::new(cipher),
        }
    }
}

impl<C: BlockCipher + Clone> BlockCipher for Cbc<C> {
    fn block_size(&self) -> usize {
        self.inner.cipher.block_size()
    }

    fn legal_key_sizes(&self) -> &'static [usize] {
        self.inner.cipher.legal_key_sizes()
    }

    fn name(&self) -> &'static str {
        "CBC"
    }

    fn initialized(&self) -> bool {
        self.inner.cipher.initialized()
    }

    fn initialize(&mut self, direction: Direction, key_params: &KeyParams) -> Result<()> {
        self.inner.initialize(direction, direction, key_params, "cbc")
    }

    fn encrypt_block(&mut self, input: &[u8], output: &mut [u8]) {
        let block_size = input.len();
        let mut xored = vec![0u8; block_size];
        for i in 0..block_size {
            xored[i] = input[i] ^ self.inner.register[i];
        }
        self.inner.cipher.encrypt_block(&xored, output);
        self.inner.register.copy_from_slice(output);
    }

    fn decrypt_block(&mut self, input: &[u8], output: &mut [u8]) {
        self.inner.cipher.decrypt_block(input, output);
        for i in 0..output.len() {
            output[i] ^= self.inner.register[i];
        }
        self.inner.register.copy_from_slice(input);
    }

    fn direction(&self) -> Direction {
        self.inner.direction
    }
}

impl<C: BlockCipher + Clone + Sync + Send> Mode for Cbc<C> {
    fn is_parallelizable(&self) -> bool {
        self.inner.direction == Direction::Decrypt
    }

    fn is_parallel(&self) -> bool {
        self.inner.parallel
    }

    fn set_parallel(&mut self, parallel: bool) {
        self.inner.parallel = parallel;
    }

    fn parallel_block_size(&self) -> usize {
        self.inner.parallel_block_size
    }

    fn set_parallel_block_size(&mut self, size: usize) {
        let min = self.inner.minimum_size();
        self.inner.parallel_block_size = round_up(size, min).min(self.parallel_maximum_size());
    }

    fn parallel_minimum_size(&self) -> usize {
        self.inner.minimum_size()
    }

    fn transform_blocks(&mut self, input: &[u8], output: &mut [u8]) {
        let block_size = self.inner.cipher.block_size();
        match self.inner.direction {
            Direction::Encrypt => {
                for (in_chunk, out_chunk) in input.chunks(block_size).zip(output.chunks_mut(block_size)) {
                    self.encrypt_block(in_chunk, out_chunk);
                }
            }
            Direction::Decrypt => {
                let num_blocks = input.len() / block_size;
                if self.inner.parallel && input.len() > self.parallel_minimum_size() {
                    let cipher = &self.inner.cipher;
                    let register = self.inner.register.clone();
                    output
                        .par_chunks_mut(block_size)
                        .enumerate()
                        .for_each(|(i, out_chunk)| {
                            let in_chunk = &input[i * block_size..(i + 1) * block_size];
                            let prev = if i == 0 {
                                &register[..]
                            } else {
                                &input[(i - 1) * block_size..i * block_size]
                            };
                            let mut worker = cipher.clone();
                            worker.decrypt_block(in_chunk, out_chunk);
                            for j in 0..block_size {
                                out_chunk[j] ^= prev[j];
                            }
                        });
                    if num_blocks > 0 {
                        self.inner
                            .register
                            .copy_from_slice(&input[(num_blocks - 1) * block_size..num_blocks * block_size]);
                    }
                } else {
                    for (in_chunk, out_chunk) in input.chunks(block_size).zip(output.chunks_mut(block_size)) {
                        self.decrypt_block(in_chunk, out_chunk);
                    }
                }
            }
        }
    }
}

/// Cipher Feedback. Encryption is strictly sequential; decryption is
/// parallelizable (each plaintext block depends only on the prior
/// ciphertext block).
pub struct Cfb<C> {
    inner: Shared<C>,
}

impl<C: BlockCipher + Clone> Cfb<C> {
    /// Wrap `cipher` in CFB mode.
    pub fn new(cipher: C) -> Self {
        Self {
            inner: Shared::new(cipher),
        }
    }
}

impl<C: BlockCipher + Clone> BlockCipher for Cfb<C> {
    fn block_size(&self) -> usize {
        self.inner.cipher.block_size()
    }

    fn legal_key_sizes(&self) -> &'static [usize] {
        self.inner.cipher.legal_key_sizes()
    }

    fn name(&self) -> &'static str {
        "CFB"
    }

    fn initialized(&self) -> bool {
        self.inner.cipher.initialized()
    }

    fn initialize(&mut self, direction: Direction, key_params: &KeyParams) -> Result<()> {
        // CFB always runs the block cipher forward, even when stripping
        // ciphertext back to plaintext.
        self.inner.initialize(direction, Direction::Encrypt, key_params, "cfb")
    }

    fn encrypt_block(&mut self, input: &[u8], output: &mut [u8]) {
        let mut keystream = vec![0u8; input.len()];
        self.inner.cipher.encrypt_block(&self.inner.register, &mut keystream);
        for i in 0..input.len() {
            output[i] = input[i] ^ keystream[i];
        }
        self.inner.register.copy_from_slice(output);
    }

    fn decrypt_block(&mut self, input: &[u8], output: &mut [u8]) {
        let mut keystream = vec![0u8; input.len()];
        self.inner.cipher.encrypt_block(&self.inner.register, &mut keystream);
        for i in 0..input.len() {
            output[i] = input[i] ^ keystream[i];
        }
        self.inner.register.copy_from_slice(input);
    }

    fn direction(&self) -> Direction {
        self.inner.direction
    }
}

impl<C: BlockCipher + Clone + Sync + Send> Mode for Cfb<C> {
    fn is_parallelizable(&self) -> bool {
        self.inner.direction == Direction::Decrypt
    }

    fn is_parallel(&self) -> bool {
        self.inner.parallel
    }

    fn set_parallel(&mut self, parallel: bool) {
        self.inner.parallel = parallel;
    }

    fn parallel_block_size(&self) -> usize {
        self.inner.parallel_block_size
    }

    fn set_parallel_block_size(&mut self, size: usize) {
        let min = self.inner.minimum_size();
        self.inner.parallel_block_size = round_up(size, min).min(self.parallel_maximum_size());
    }

    fn parallel_minimum_size(&self) -> usize {
        self.inner.minimum_size()
    }

    fn transform_blocks(&mut self, input: &[u8], output: &mut [u8]) {
        let block_size = self.inner.cipher.block_size();
        match self.inner.direction {
            Direction::Encrypt => {
                for (in_chunk, out_chunk) in input.chunks(block_size).zip(output.chunks_mut(block_size)) {
                    self.encrypt_block(in_chunk, out_chunk);
                }
            }
            Direction::Decrypt => {
                let num_blocks = input.len() / block_size;
                if self.inner.parallel && input.len() > self.parallel_minimum_size() {
                    let cipher = &self.inner.cipher;
                    let register = self.inner.register.clone();
                    output
                        .par_chunks_mut(block_size)
                        .enumerate()
                        .for_each(|(i, out_chunk)| {
                            let in_chunk = &input[i * block_size..(i + 1) * block_size];
                            let prev = if i == 0 {
                                &register[..]
                            } else {
                                &input[(i - 1) * block_size..i * block_size]
                            };
                            let mut worker = cipher.clone();
                            let mut keystream = vec![0u8; block_size];
                            worker.encrypt_block(prev, &mut keystream);
                            for j in 0..block_size {
                                out_chunk[j] = in_chunk[j] ^ keystream[j];
                            }
                        });
                    if num_blocks > 0 {
                        self.inner
                            .register
                            .copy_from_slice(&input[(num_blocks - 1) * block_size..num_blocks * block_size]);
                    }
                } else {
                    for (in_chunk, out_chunk) in input.chunks(block_size).zip(output.chunks_mut(block_size)) {
                        self.decrypt_block(in_chunk, out_chunk);
                    }
                }
            }
        }
    }
}

/// Output Feedback. Strictly sequential in both directions: the keystream
/// register depends only on its own previous value, not on the input, but
/// that dependency chain cannot be precomputed without first running the
/// cipher forward block-by-block.
pub struct Ofb<C> {
    inner: Shared<C>,
}

impl<C: BlockCipher + Clone> Ofb<C> {
    /// Wrap `cipher` in OFB mode.
    pub fn new(cipher: C) -> Self {
        Self {
            inner: Shared::new(cipher),
        }
    }

    fn step(&mut self, input: &[u8], output: &mut [u8]) {
        let mut next = vec![0u8; input.len()];
        self.inner.cipher.encrypt_block(&self.inner.register, &mut next);
        for i in 0..input.len() {
            output[i] = input[i] ^ next[i];
        }
        self.inner.register.copy_from_slice(&next);
    }
}

impl<C: BlockCipher + Clone> BlockCipher for Ofb<C> {
    fn block_size(&self) -> usize {
        self.inner.cipher.block_size()
    }

    fn legal_key_sizes(&self) -> &'static [usize] {
        self.inner.cipher.legal_key_sizes()
    }

    fn name(&self) -> &'static str {
        "OFB"
    }

    fn initialized(&self) -> bool {
        self.inner.cipher.initialized()
    }

    fn initialize(&mut self, direction: Direction, key_params: &KeyParams) -> Result<()> {
        self.inner.initialize(direction, Direction::Encrypt, key_params, "ofb")
    }

    fn encrypt_block(&mut self, input: &[u8], output: &mut [u8]) {
        self.step(input, output);
    }

    fn decrypt_block(&mut self, input: &[u8], output: &mut [u8]) {
        self.step(input, output);
    }

    fn direction(&self) -> Direction {
        self.inner.direction
    }
}

impl<C: BlockCipher + Clone + Sync + Send> Mode for Ofb<C> {
    fn is_parallelizable(&self) -> bool {
        false
    }

    fn is_parallel(&self) -> bool {
        false
    }

    fn set_parallel(&mut self, _parallel: bool) {
        // Advisory only; OFB is never parallelizable.
    }

    fn parallel_block_size(&self) -> usize {
        self.inner.parallel_block_size
    }

    fn set_parallel_block_size(&mut self, size: usize) {
        let min = self.inner.minimum_size();
        self.inner.parallel_block_size = round_up(size, min).min(self.parallel_maximum_size());
    }

    fn parallel_minimum_size(&self) -> usize {
        self.inner.minimum_size()
    }

    fn transform_blocks(&mut self, input: &[u8], output: &mut [u8]) {
        let block_size = self.inner.cipher.block_size();
        for (in_chunk, out_chunk) in input.chunks(block_size).zip(output.chunks_mut(block_size)) {
            self.step(in_chunk, out_chunk);
        }
    }
}

/// Counter mode. Fully parallelizable in both directions: each block is
/// plaintext XOR `E(counter_0 + i)`, and the counter is the full block
/// width so a chunk boundary never silently wraps at 32 bits.
pub struct Ctr<C> {
    inner: Shared<C>,
}

impl<C: BlockCipher + Clone> Ctr<C> {
    /// Wrap `cipher` in CTR mode.
    pub fn new(cipher: C) -> Self {
        Self {
            inner: Shared::new(cipher),
        }
    }

    fn step(&mut self, input: &[u8], output: &mut [u8]) {
        let mut keystream = vec![0u8; input.len()];
        self.inner.cipher.encrypt_block(&self.inner.register, &mut keystream);
        for i in 0..input.len() {
            output[i] = input[i] ^ keystream[i];
        }
        counter_increment(&mut self.inner.register);
    }
}

impl<C: BlockCipher + Clone> BlockCipher for Ctr<C> {
    fn block_size(&self) -> usize {
        self.inner.cipher.block_size()
    }

    fn legal_key_sizes(&self) -> &'static [usize] {
        self.inner.cipher.legal_key_sizes()
    }

    fn name(&self) -> &'static str {
        "CTR"
    }

    fn initialized(&self) -> bool {
        self.inner.cipher.initialized()
    }

    fn initialize(&mut self, direction: Direction, key_params: &KeyParams) -> Result<()> {
        self.inner.initialize(direction, Direction::Encrypt, key_params, "ctr")
    }

    fn encrypt_block(&mut self, input: &[u8], output: &mut [u8]) {
        self.step(input, output);
    }

    fn decrypt_block(&mut self, input: &[u8], output: &mut [u8]) {
        self.step(input, output);
    }

    fn direction(&self) -> Direction {
        self.inner.direction
    }
}

impl<C: BlockCipher + Clone + Sync + Send> Mode for Ctr<C> {
    fn is_parallelizable(&self) -> bool {
        true
    }

    fn is_parallel(&self) -> bool {
        self.inner.parallel
    }

    fn set_parallel(&mut self, parallel: bool) {
        self.inner.parallel = parallel;
    }

    fn parallel_block_size(&self) -> usize {
        self.inner.parallel_block_size
    }

    fn set_parallel_block_size(&mut self, size: usize) {
        let min = self.inner.minimum_size();
        self.inner.parallel_block_size = round_up(size, min).min(self.parallel_maximum_size());
    }

    fn parallel_minimum_size(&self) -> usize {
        self.inner.minimum_size()
    }

    fn transform_blocks(&mut self, input: &[u8], output: &mut [u8]) {
        let block_size = self.inner.cipher.block_size();
        let num_blocks = input.len() / block_size;
        if self.inner.parallel && input.len() > self.parallel_minimum_size() {
            let cipher = &self.inner.cipher;
            let base_counter = self.inner.register.clone();
            output
                .par_chunks_mut(block_size)
                .zip(input.par_chunks(block_size))
                .enumerate()
                .for_each(|(i, (out_chunk, in_chunk))| {
                    let counter = counter_add(&base_counter, i as u64);
                    let mut worker = cipher.clone();
                    let mut keystream = vec![0u8; block_size];
                    worker.encrypt_block(&counter, &mut keystream);
                    for j in 0..block_size {
                        out_chunk[j] = in_chunk[j] ^ keystream[j];
                    }
                });
            if num_blocks > 0 {
                self.inner.register = counter_add(&base_counter, num_blocks as u64);
            }
        } else {
            for (in_chunk, out_chunk) in input.chunks(block_size).zip(output.chunks_mut(block_size)) {
                self.step(in_chunk, out_chunk);
            }
        }
    }
}
