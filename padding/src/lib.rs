//! Block-padding schemes: PKCS7, ISO7816-4, X9.23, TBC, and ZeroPad.
//!
//! Each scheme fills the tail of a partially-full block (`block[data_len..]`)
//! on encryption and reports how many trailing bytes to strip on decryption.
//! Unlike [`symmetric_core::BlockCipher`], padding primitives never fail:
//! [`Padding::unpad_len`] returns `0` when a block is not validly padded,
//! and it is the caller ([`cipher-stream`](https://docs.rs/cipher-stream))
//! that turns "zero" into a hard [`symmetric_core::ErrorKind::PaddingInvalid`]
//! error when a padded mode expected to find one.

#![warn(missing_docs, rust_2018_idioms)]

/// A scheme for padding a partial trailing block out to the cipher's block
/// size, and stripping that padding back off on decryption.
pub trait Padding {
    /// Name for diagnostics, e.g. `"PKCS7"`.
    fn name(&self) -> &'static str;

    /// Fill `block[data_len..]` with this scheme's pad bytes. `data_len` is
    /// the number of valid plaintext bytes already present in `block`
    /// (`0 <= data_len <= block.len()`).
    fn pad(&self, block: &mut [u8], data_len: usize);

    /// Number of trailing pad bytes in `block`, or `0` if `block` is not
    /// validly padded under this scheme.
    fn unpad_len(&self, block: &[u8]) -> usize;
}

/// PKCS7 (RFC 5652 §6.3): fill the `n` trailing bytes with the value `n`.
#[derive(Debug, Default, Copy, Clone)]
pub struct Pkcs7;

impl Padding for Pkcs7 {
    fn name(&self) -> &'static str {
        "PKCS7"
    }

    fn pad(&self, block: &mut [u8], data_len: usize) {
        let n = (block.len() - data_len) as u8;
        for b in &mut block[data_len..] {
            *b = n;
        }
    }

    fn unpad_len(&self, block: &[u8]) -> usize {
        let Some(&last) = block.last() else {
            return 0;
        };
        let n = last as usize;
        if n == 0 || n > block.len() {
            return 0;
        }
        if block[block.len() - n..].iter().all(|&b| b as usize == n) {
            n
        } else {
            0
        }
    }
}

/// ISO/IEC 7816-4: the first pad byte is `0x80`, the rest are zero.
#[derive(Debug, Default, Copy, Clone)]
pub struct Iso7816;

impl Padding for Iso7816 {
    fn name(&self) -> &'static str {
        "ISO7816-4"
    }

    fn pad(&self, block: &mut [u8], data_len: usize) {
        block[data_len] = 0x80;
        for b in &mut block[data_len + 1..] {
            *b = 0;
        }
    }

    fn unpad_len(&self, block: &[u8]) -> usize {
        for i in (0..block.len()).rev() {
            match block[i] {
                0x80 => return block.len() - i,
                0 => continue,
                _ => return 0,
            }
        }
        0
    }
}

/// ANSI X9.23: the last byte is the pad length; the remaining pad bytes are
/// conventionally zero here (the standard permits random filler, which this
/// implementation does not produce, so stripping only validates the length
/// byte — it cannot distinguish zero filler from random filler).
#[derive(Debug, Default, Copy, Clone)]
pub struct X923;

impl Padding for X923 {
    fn name(&self) -> &'static str {
        "X9.23"
    }

    fn pad(&self, block: &mut [u8], data_len: usize) {
        let n = block.len() - data_len;
        let last = block.len() - 1;
        for b in &mut block[data_len..last] {
            *b = 0;
        }
        block[last] = n as u8;
    }

    fn unpad_len(&self, block: &[u8]) -> usize {
        let Some(&last) = block.last() else {
            return 0;
        };
        let n = last as usize;
        if n == 0 || n > block.len() {
            0
        } else {
            n
        }
    }
}

/// Trailing Bit Complement: the fill byte is the bitwise complement of the
/// last real data byte's LSB (`0x00` when that bit is `1`, `0xFF` when it is
/// `0`); with no preceding data byte in this block (`data_len == 0`), the
/// fill defaults to `0xFF`.
#[derive(Debug, Default, Copy, Clone)]
pub struct Tbc;

impl Padding for Tbc {
    fn name(&self) -> &'static str {
        "TBC"
    }

    fn pad(&self, block: &mut [u8], data_len: usize) {
        let fill = if data_len > 0 && block[data_len - 1] & 1 == 1 {
            0x00
        } else {
            0xFF
        };
        for b in &mut block[data_len..] {
            *b = fill;
        }
    }

    fn unpad_len(&self, block: &[u8]) -> usize {
        let Some(&fill) = block.last() else {
            return 0;
        };
        if fill != 0x00 && fill != 0xFF {
            return 0;
        }
        let mut n = 0;
        for &b in block.iter().rev() {
            if b == fill {
                n += 1;
            } else {
                break;
            }
        }
        if n < block.len() {
            let boundary = block[block.len() - n - 1];
            let expected_fill = if boundary & 1 == 1 { 0x00 } else { 0xFF };
            if expected_fill != fill {
                return 0;
            }
        }
        n
    }
}

/// ZeroPad: fill the trailing bytes with zero. Ambiguous when the real
/// plaintext itself ends in a zero byte — see [`Padding::unpad_len`]'s
/// round-trip caveat in the crate-level property tests.
#[derive(Debug, Default, Copy, Clone)]
pub struct ZeroPad;

impl Padding for ZeroPad {
    fn name(&self) -> &'static str {
        "ZeroPad"
    }

    fn pad(&self, block: &mut [u8], data_len: usize) {
        for b in &mut block[data_len..] {
            *b = 0;
        }
    }

    fn unpad_len(&self, block: &[u8]) -> usize {
        let mut n = 0;
        for &b in block.iter().rev() {
            if b == 0 {
                n += 1;
            } else {
                break;
            }
        }
        n
    }
}

/// Runtime selector over the padding schemes, for callers (like
/// `cipher-stream`) that resolve a configuration at construction time
/// rather than at compile time.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum PaddingKind {
    /// No padding: the mode only accepts block-aligned input.
    None,
    /// See [`Pkcs7`].
    Pkcs7,
    /// See [`Iso7816`].
    Iso7816,
    /// See [`X923`].
    X923,
    /// See [`Tbc`].
    Tbc,
    /// See [`ZeroPad`].
    Zero,
}

impl PaddingKind {
    /// Fill `block[data_len..]` per this scheme. A no-op for [`Self::None`].
    pub fn pad(self, block: &mut [u8], data_len: usize) {
        match self {
            PaddingKind::None => {}
            PaddingKind::Pkcs7 => Pkcs7.pad(block, data_len),
            PaddingKind::Iso7816 => Iso7816.pad(block, data_len),
            PaddingKind::X923 => X923.pad(block, data_len),
            PaddingKind::Tbc => Tbc.pad(block, data_len),
            PaddingKind::Zero => ZeroPad.pad(block, data_len),
        }
    }

    /// Number of trailing pad bytes, or `0` if not validly padded. Always
    /// `0` for [`Self::None`] (there is nothing to strip).
    pub fn unpad_len(self, block: &[u8]) -> usize {
        match self {
            PaddingKind::None => 0,
            PaddingKind::Pkcs7 => Pkcs7.unpad_len(block),
            PaddingKind::Iso7816 => Iso7816.unpad_len(block),
            PaddingKind::X923 => X923.unpad_len(block),
            PaddingKind::Tbc => Tbc.unpad_len(block),
            PaddingKind::Zero => ZeroPad.unpad_len(block),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn roundtrip(padding: &dyn Padding, block_size: usize) {
        for data_len in 0..block_size {
            let mut block = vec![0u8; block_size];
            for (i, b) in block.iter_mut().enumerate().take(data_len) {
                *b = (i + 1) as u8;
            }
            let original = block[..data_len].to_vec();
            padding.pad(&mut block, data_len);
            let n = padding.unpad_len(&block);
            assert_eq!(n, block_size - data_len, "scheme {}", padding.name());
            assert_eq!(&block[..block_size - n], &original[..]);
        }
    }

    #[test]
    fn pkcs7_roundtrips() {
        roundtrip(&Pkcs7, 16);
    }

    #[test]
    fn iso7816_roundtrips() {
        roundtrip(&Iso7816, 16);
    }

    #[test]
    fn x923_roundtrips() {
        roundtrip(&X923, 16);
    }

    #[test]
    fn tbc_roundtrips() {
        roundtrip(&Tbc, 16);
    }

    #[test]
    fn zero_pad_roundtrips_when_data_does_not_end_in_zero() {
        for data_len in 1..16 {
            let mut block = vec![0u8; 16];
            for (i, b) in block.iter_mut().enumerate().take(data_len) {
                *b = (i + 7) as u8; // never zero
            }
            let original = block[..data_len].to_vec();
            ZeroPad.pad(&mut block, data_len);
            let n = ZeroPad.unpad_len(&block);
            assert_eq!(n, 16 - data_len);
            assert_eq!(&block[..16 - n], &original[..]);
        }
    }

    #[test]
    fn pkcs7_rejects_corrupted_padding() {
        let mut block = [1u8, 2, 3, 4];
        Pkcs7.pad(&mut block, 2);
        block[3] = 0xFF; // corrupt the pad length byte
        assert_eq!(Pkcs7.unpad_len(&block), 0);
    }

    #[test]
    fn iso7816_rejects_block_with_no_marker() {
        let block = [1u8, 2, 3, 4];
        assert_eq!(Iso7816.unpad_len(&block), 0);
    }

    #[test]
    fn padding_kind_none_never_strips() {
        let block = [0u8; 16];
        assert_eq!(PaddingKind::None.unpad_len(&block), 0);
    }

    #[test]
    fn padding_kind_dispatches_to_matching_scheme() {
        let mut block = [0u8; 8];
        PaddingKind::Pkcs7.pad(&mut block, 5);
        assert_eq!(PaddingKind::Pkcs7.unpad_len(&block), 3);
    }
}
