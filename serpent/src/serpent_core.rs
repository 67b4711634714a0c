//! Serpent's S-boxes, linear transformation, and key schedule, following
//! Anderson, Biham and Knudsen's original specification. Worked in 32-bit
//! words rather than the bitslice-register trick the submission's reference
//! code uses for speed: the per-bit substitution loop below is equivalent,
//! just slower, and far easier to get right by hand without a compiler.

const PHI: u32 = 0x9E37_79B9;
/// Serpent's standard, fixed round count, used by the native key schedule.
pub(crate) const ROUNDS: usize = 32;

#[rustfmt::skip]
const SBOXES: [[u8; 16]; 8] = [
    [3, 8, 15, 1, 10, 6, 5, 11, 14, 13, 4, 2, 7, 0, 9, 12],
    [15, 12, 2, 7, 9, 0, 5, 10, 1, 11, 14, 8, 6, 13, 3, 4],
    [8, 6, 7, 9, 3, 12, 10, 15, 13, 1, 14, 4, 0, 11, 5, 2],
    [0, 15, 11, 8, 12, 9, 6, 3, 13, 1, 2, 4, 10, 7, 5, 14],
    [1, 15, 8, 3, 12, 0, 11, 6, 2, 5, 4, 10, 9, 14, 7, 13],
    [15, 5, 2, 11, 4, 10, 9, 12, 0, 3, 14, 8, 13, 6, 7, 1],
    [7, 2, 12, 5, 8, 4, 6, 11, 14, 9, 1, 15, 13, 3, 10, 0],
    [1, 13, 15, 0, 14, 8, 2, 11, 7, 4, 12, 10, 9, 3, 5, 6],
];

fn inv_sboxes() -> &'static [[u8; 16]; 8] {
    use std::sync::OnceLock;
    static INV: OnceLock<[[u8; 16]; 8]> = OnceLock::new();
    INV.get_or_init(|| {
        let mut inv = [[0u8; 16]; 8];
        for (s, table) in SBOXES.iter().enumerate() {
            for (i, &v) in table.iter().enumerate() {
                inv[s][v as usize] = i as u8;
            }
        }
        inv
    })
}

/// Apply an S-box bitslice-fashion: bit `i` of each of the four words forms
/// a 4-bit input nibble, substituted independently for every `i` in 0..32.
fn sbox_apply(table: &[u8; 16], x: [u32; 4]) -> [u32; 4] {
    let mut out = [0u32; 4];
    for bit in 0..32 {
        let nibble = ((x[0] >> bit) & 1)
            | (((x[1] >> bit) & 1) << 1)
            | (((x[2] >> bit) & 1) << 2)
            | (((x[3] >> bit) & 1) << 3);
        let y = table[nibble as usize] as u32;
        for (k, word) in out.iter_mut().enumerate() {
            *word |= ((y >> k) & 1) << bit;
        }
    }
    out
}

fn lt(x: [u32; 4]) -> [u32; 4] {
    let [mut x0, mut x1, mut x2, mut x3] = x;
    x0 = x0.rotate_left(13);
    x2 = x2.rotate_left(3);
    x1 ^= x0 ^ x2;
    x3 ^= x2 ^ (x0 << 3);
    x1 = x1.rotate_left(1);
    x3 = x3.rotate_left(7);
    x0 ^= x1 ^ x3;
    x2 ^= x3 ^ (x1 << 7);
    x0 = x0.rotate_left(5);
    x2 = x2.rotate_left(22);
    [x0, x1, x2, x3]
}

fn inv_lt(x: [u32; 4]) -> [u32; 4] {
    let [mut x0, mut x1, mut x2, mut x3] = x;
    x2 = x2.rotate_right(22);
    x0 = x0.rotate_right(5);
    x2 ^= x3 ^ (x1 << 7);
    x0 ^= x1 ^ x3;
    x3 = x3.rotate_right(7);
    x1 = x1.rotate_right(1);
    x3 ^= x2 ^ (x0 << 3);
    x1 ^= x0 ^ x2;
    x2 = x2.rotate_right(3);
    x0 = x0.rotate_right(13);
    [x0, x1, x2, x3]
}

fn block_to_words(block: &[u8]) -> [u32; 4] {
    let mut w = [0u32; 4];
    for (i, word) in w.iter_mut().enumerate() {
        *word = u32::from_le_bytes(block[4 * i..4 * i + 4].try_into().unwrap());
    }
    w
}

fn words_to_block(w: [u32; 4]) -> [u8; 16] {
    let mut block = [0u8; 16];
    for (i, word) in w.iter().enumerate() {
        block[4 * i..4 * i + 4].copy_from_slice(&word.to_le_bytes());
    }
    block
}

/// Pad a 16/24/32-byte key to the full 256-bit schedule input: append a
/// single `1` bit (byte `0x01`, since all legal key lengths are whole
/// bytes) then zero-fill, per Serpent's short-key convention.
fn pad_key(key: &[u8]) -> [u8; 32] {
    let mut padded = [0u8; 32];
    padded[..key.len()].copy_from_slice(key);
    if key.len() < 32 {
        padded[key.len()] = 0x01;
    }
    padded
}

/// Expand `key` (16, 24, or 32 bytes) into 33 round-key quadwords.
pub(crate) fn key_schedule(key: &[u8]) -> Vec<[u32; 4]> {
    let padded = pad_key(key);
    let mut w = [0u32; 8];
    for (i, word) in w.iter_mut().enumerate() {
        *word = u32::from_le_bytes(padded[4 * i..4 * i + 4].try_into().unwrap());
    }

    // Generate w_0 ..= w_131 (132 words) on top of the 8 seed words
    // w_-8 ..= w_-1 already in `stream`.
    let mut stream = w.to_vec();
    for i in 8..140 {
        let v = stream[i - 8] ^ stream[i - 5] ^ stream[i - 3] ^ stream[i - 1] ^ PHI ^ (i as u32 - 8);
        stream.push(v.rotate_left(11));
    }
    let prekeys = &stream[8..140];
    debug_assert_eq!(prekeys.len(), 132);

    let mut subkeys = Vec::with_capacity(33);
    for i in 0..33 {
        let group = [
            prekeys[4 * i],
            prekeys[4 * i + 1],
            prekeys[4 * i + 2],
            prekeys[4 * i + 3],
        ];
        let sbox_index = (32 + 3 - i) % 8;
        subkeys.push(sbox_apply(&SBOXES[sbox_index], group));
    }
    subkeys
}

/// Run `rounds` rounds of the Serpent round function over `block`, using
/// `subkeys[0..=rounds]` (`rounds + 1` subkeys). `rounds` is [`ROUNDS`]
/// for native Serpent, a caller-chosen value for `Shx`.
pub(crate) fn encrypt_block(block: &[u8], subkeys: &[[u32; 4]], rounds: usize) -> [u8; 16] {
    let mut x = block_to_words(block);
    for r in 0..rounds {
        x = [
            x[0] ^ subkeys[r][0],
            x[1] ^ subkeys[r][1],
            x[2] ^ subkeys[r][2],
            x[3] ^ subkeys[r][3],
        ];
        x = sbox_apply(&SBOXES[r % 8], x);
        if r < rounds - 1 {
            x = lt(x);
        } else {
            x = [
                x[0] ^ subkeys[rounds][0],
                x[1] ^ subkeys[rounds][1],
                x[2] ^ subkeys[rounds][2],
                x[3] ^ subkeys[rounds][3],
            ];
        }
    }
    words_to_block(x)
}

/// Inverse of [`encrypt_block`], over the same `rounds` and `subkeys`.
pub(crate) fn decrypt_block(block: &[u8], subkeys: &[[u32; 4]], rounds: usize) -> [u8; 16] {
    let inv = inv_sboxes();
    let mut x = block_to_words(block);
    x = [
        x[0] ^ subkeys[rounds][0],
        x[1] ^ subkeys[rounds][1],
        x[2] ^ subkeys[rounds][2],
        x[3] ^ subkeys[rounds][3],
    ];

    for r in (0..rounds).rev() {
        x = sbox_apply(&inv[r % 8], x);
        x = [
            x[0] ^ subkeys[r][0],
            x[1] ^ subkeys[r][1],
            x[2] ^ subkeys[r][2],
            x[3] ^ subkeys[r][3],
        ];
        if r > 0 {
            x = inv_lt(x);
        }
    }
    words_to_block(x)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lt_and_inv_lt_are_inverses() {
        let x = [0x1234_5678, 0x9abc_def0, 0x0fed_cba9, 0x8765_4321];
        assert_eq!(inv_lt(lt(x)), x);
    }

    #[test]
    fn sbox_and_inverse_round_trip() {
        let inv = inv_sboxes();
        for (s, table) in SBOXES.iter().enumerate() {
            let x = [0x1111_1111, 0x2222_2222, 0x3333_3333, 0x4444_4444];
            let y = sbox_apply(table, x);
            let back = sbox_apply(&inv[s], y);
            assert_eq!(back, x);
        }
    }

    #[test]
    fn zero_key_round_trips() {
        let subkeys = key_schedule(&[0u8; 16]);
        let block = [0xAAu8; 16];
        let ct = encrypt_block(&block, &subkeys, ROUNDS);
        let pt = decrypt_block(&ct, &subkeys, ROUNDS);
        assert_eq!(pt, block);
    }

    #[test]
    fn encrypting_zero_block_changes_it() {
        let subkeys = key_schedule(&[0x42u8; 32]);
        let ct = encrypt_block(&[0u8; 16], &subkeys, ROUNDS);
        assert_ne!(ct, [0u8; 16]);
    }
}
