//! Skein-256/512/1024, built the way the Skein v1.3 specification defines
//! it: the Threefish tweakable block cipher driven through Unique Block
//! Iteration (UBI) chaining. Kept in its own module because, unlike the
//! other six digests in [`DigestAlgorithm`](crate::DigestAlgorithm), no
//! RustCrypto crate implements it — it is hand-rolled per the published
//! algorithm rather than delegated to a dependency.

const C240: u64 = 0x1BD1_1BDA_A9FC_1A22;

const TYPE_KEY: u64 = 0;
const TYPE_CFG: u64 = 4;
const TYPE_MSG: u64 = 48;
const TYPE_OUT: u64 = 63;

/// Which Skein state width to run.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum SkeinVariant {
    /// 256-bit state (4 64-bit words, 72 rounds).
    Skein256,
    /// 512-bit state (8 64-bit words, 72 rounds).
    Skein512,
    /// 1024-bit state (16 64-bit words, 80 rounds).
    Skein1024,
}

impl SkeinVariant {
    const fn words(self) -> usize {
        match self {
            SkeinVariant::Skein256 => 4,
            SkeinVariant::Skein512 => 8,
            SkeinVariant::Skein1024 => 16,
        }
    }

    const fn rounds(self) -> usize {
        match self {
            SkeinVariant::Skein256 | SkeinVariant::Skein512 => 72,
            SkeinVariant::Skein1024 => 80,
        }
    }

    const fn state_bytes(self) -> usize {
        self.words() * 8
    }

    fn rotation(self) -> &'static [[u32; 8]] {
        match self {
            SkeinVariant::Skein256 => &ROT_256,
            SkeinVariant::Skein512 => &ROT_512,
            SkeinVariant::Skein1024 => &ROT_1024,
        }
    }

    fn permutation(self) -> &'static [usize] {
        match self {
            SkeinVariant::Skein256 => &PERM_256,
            SkeinVariant::Skein512 => &PERM_512,
            SkeinVariant::Skein1024 => &PERM_1024,
        }
    }
}

// Rotation constants, indexed [round mod 8][mix-pair index]. Per-variant
// row width is words()/2.
const ROT_256: [[u32; 8]; 8] = [
    [14, 16, 0, 0, 0, 0, 0, 0],
    [52, 57, 0, 0, 0, 0, 0, 0],
    [23, 40, 0, 0, 0, 0, 0, 0],
    [5, 37, 0, 0, 0, 0, 0, 0],
    [25, 33, 0, 0, 0, 0, 0, 0],
    [46, 12, 0, 0, 0, 0, 0, 0],
    [58, 22, 0, 0, 0, 0, 0, 0],
    [32, 32, 0, 0, 0, 0, 0, 0],
];

const ROT_512: [[u32; 8]; 8] = [
    [46, 36, 19, 37, 0, 0, 0, 0],
    [33, 27, 14, 42, 0, 0, 0, 0],
    [17, 49, 36, 39, 0, 0, 0, 0],
    [44, 9, 54, 56, 0, 0, 0, 0],
    [39, 30, 34, 24, 0, 0, 0, 0],
    [13, 50, 10, 17, 0, 0, 0, 0],
    [25, 29, 39, 43, 0, 0, 0, 0],
    [8, 35, 56, 22, 0, 0, 0, 0],
];

const ROT_1024: [[u32; 8]; 8] = [
    [24, 13, 8, 47, 8, 17, 22, 37],
    [38, 19, 10, 55, 49, 18, 23, 52],
    [33, 4, 51, 13, 34, 41, 59, 17],
    [5, 20, 48, 41, 47, 28, 16, 25],
    [41, 9, 37, 31, 12, 47, 44, 30],
    [16, 34, 56, 51, 4, 53, 42, 41],
    [31, 44, 47, 46, 19, 42, 44, 25],
    [9, 48, 35, 52, 23, 31, 37, 20],
];

const PERM_256: [usize; 4] = [0, 3, 2, 1];
const PERM_512: [usize; 8] = [2, 1, 4, 7, 6, 5, 0, 3];
const PERM_1024: [usize; 16] = [0, 9, 2, 13, 6, 11, 4, 15, 10, 7, 12, 3, 14, 5, 8, 1];

fn bytes_to_words_le(bytes: &[u8]) -> Vec<u64> {
    bytes
        .chunks(8)
        .map(|chunk| {
            let mut buf = [0u8; 8];
            buf[..chunk.len()].copy_from_slice(chunk);
            u64::from_le_bytes(buf)
        })
        .collect()
}

fn words_to_bytes_le(words: &[u64]) -> Vec<u8> {
    words.iter().flat_map(|w| w.to_le_bytes()).collect()
}

fn subkey(variant: SkeinVariant, key: &[u64], tweak: &[u64; 3], s: u64, i: usize) -> u64 {
    let nw = variant.words();
    let mut word = key[(s as usize + i) % (nw + 1)];
    if i == nw - 3 {
        word = word.wrapping_add(tweak[(s % 3) as usize]);
    } else if i == nw - 2 {
        word = word.wrapping_add(tweak[((s + 1) % 3) as usize]);
    } else if i == nw - 1 {
        word = word.wrapping_add(s);
    }
    word
}

/// Threefish block encryption: the tweakable permutation UBI drives.
fn threefish_encrypt(variant: SkeinVariant, key: &[u64], tweak: [u64; 2], block: &[u64]) -> Vec<u64> {
    let nw = variant.words();
    let nr = variant.rounds();
    let rot = variant.rotation();
    let perm = variant.permutation();

    let mut extended_key = vec![0u64; nw + 1];
    extended_key[..nw].copy_from_slice(key);
    extended_key[nw] = C240 ^ key.iter().fold(0u64, |acc, k| acc ^ k);
    let ext_tweak = [tweak[0], tweak[1], tweak[0] ^ tweak[1]];

    let mut v: Vec<u64> = (0..nw)
        .map(|i| block[i].wrapping_add(subkey(variant, &extended_key, &ext_tweak, 0, i)))
        .collect();

    for d in 0..nr {
        let row = &rot[d % 8];
        for j in 0..nw / 2 {
            let (x0, x1) = (v[2 * j], v[2 * j + 1]);
            let y0 = x0.wrapping_add(x1);
            let y1 = x1.rotate_left(row[j]) ^ y0;
            v[2 * j] = y0;
            v[2 * j + 1] = y1;
        }
        let permuted: Vec<u64> = (0..nw).map(|i| v[perm[i]]).collect();
        v = permuted;

        if (d + 1) % 4 == 0 {
            let s = ((d + 1) / 4) as u64;
            for (i, word) in v.iter_mut().enumerate() {
                *word = word.wrapping_add(subkey(variant, &extended_key, &ext_tweak, s, i));
            }
        }
    }

    v
}

fn tweak_words(position: u64, first: bool, last: bool, block_type: u64) -> [u64; 2] {
    let mut t1 = block_type << 56;
    if first {
        t1 |= 1u64 << 62;
    }
    if last {
        t1 |= 1u64 << 63;
    }
    [position, t1]
}

/// One UBI pass: chain `g` (the current `words()`-word chaining value)
/// through `msg`, tagging every Threefish call with `block_type`.
fn ubi(variant: SkeinVariant, g: &[u64], msg: &[u8], block_type: u64) -> Vec<u64> {
    let state_bytes = variant.state_bytes();
    let mut g = g.to_vec();

    let chunks: Vec<&[u8]> = if msg.is_empty() {
        vec![&[][..]]
    } else {
        msg.chunks(state_bytes).collect()
    };
    let last_index = chunks.len() - 1;
    let mut processed = 0usize;

    for (i, chunk) in chunks.iter().enumerate() {
        processed += chunk.len();
        let mut padded = vec![0u8; state_bytes];
        padded[..chunk.len()].copy_from_slice(chunk);

        let tw = tweak_words(processed as u64, i == 0, i == last_index, block_type);
        let pt = bytes_to_words_le(&padded);
        let ct = threefish_encrypt(variant, &g, tw, &pt);

        g = ct
            .iter()
            .zip(pt.iter())
            .map(|(c, p)| c ^ p)
            .collect();
    }

    g
}

fn config_block(variant: SkeinVariant) -> Vec<u8> {
    let nw = variant.words();
    let mut config = vec![0u64; nw];
    config[0] = 0x0000_0001_3341_4853; // schema "SHA3" (LE) || version 1
    config[1] = (variant.digest_size() * 8) as u64; // output length, in bits
    config[2] = 0; // tree info: sequential (non-tree) mode
    words_to_bytes_le(&config)
}

impl SkeinVariant {
    fn digest_size(self) -> usize {
        self.state_bytes()
    }
}

/// Unkeyed Skein hash: `Skein(message) -> digest_size() bytes`.
pub fn skein_hash(variant: SkeinVariant, data: &[u8]) -> Vec<u8> {
    skein_mac(variant, &[], data)
}

/// Keyed Skein hash (Skein-MAC): the key is absorbed through an initial
/// UBI pass of type `KEY` ahead of the configuration block, the Skein
/// v1.3 construction for using it as an HMAC-like PRF.
pub fn skein_mac(variant: SkeinVariant, key: &[u8], data: &[u8]) -> Vec<u8> {
    let nw = variant.words();
    let zero = vec![0u64; nw];

    let g0 = if key.is_empty() {
        zero
    } else {
        ubi(variant, &zero, key, TYPE_KEY)
    };

    let g1 = ubi(variant, &g0, &config_block(variant), TYPE_CFG);
    let g2 = ubi(variant, &g1, data, TYPE_MSG);
    let g3 = ubi(variant, &g2, &0u64.to_le_bytes(), TYPE_OUT);

    words_to_bytes_le(&g3)
}
