//! Deterministic pseudo-random generators and key-derivation functions,
//! all implementing [`symmetric_core::Drbg`]'s uniform `{ initialize,
//! generate, update }` contract: [`Hkdf`] (RFC 5869), [`Pbkdf2`] (RFC
//! 2898), [`Kdf2`] (ISO 18033-2), [`DigestCounterDrbg`] (NIST SP 800-90A
//! Appendix E1 style), and the two CTR-driven generators, [`Salsa20CounterDrbg`]
//! and [`BlockCipherCounterDrbg`].

#![warn(missing_docs, rust_2018_idioms)]

mod block_cipher_counter;
mod digest_counter;
mod hkdf;
mod kdf2;
mod pbkdf2;
mod salsa20_counter;

pub use block_cipher_counter::BlockCipherCounterDrbg;
pub use digest_counter::DigestCounterDrbg;
pub use hkdf::Hkdf;
pub use kdf2::Kdf2;
pub use pbkdf2::Pbkdf2;
pub use salsa20_counter::Salsa20CounterDrbg;
