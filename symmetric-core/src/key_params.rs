use zeroize::Zeroize;

/// An opaque carrier of the three secret byte sequences a cipher or KDF is
/// constructed from: `key`, `iv` (may be empty), and `ikm`/info (may be
/// empty).
///
/// All three are deep-copied on construction and in `Clone`. Equality is
/// value-equality over the three sequences. On drop, each sequence is
/// overwritten with zero before the backing memory is released.
#[derive(Clone, Default)]
pub struct KeyParams {
    key: Vec<u8>,
    iv: Vec<u8>,
    info: Vec<u8>,
}

impl KeyParams {
    /// Build a carrier from a key alone; `iv` and `info` are empty.
    pub fn from_key(key: impl Into<Vec<u8>>) -> Self {
        Self {
            key: key.into(),
            iv: Vec::new(),
            info: Vec::new(),
        }
    }

    /// Build a carrier from a key and IV; `info` is empty.
    pub fn with_iv(key: impl Into<Vec<u8>>, iv: impl Into<Vec<u8>>) -> Self {
        Self {
            key: key.into(),
            iv: iv.into(),
            info: Vec::new(),
        }
    }

    /// Build a carrier from all three sequences.
    pub fn new(key: impl Into<Vec<u8>>, iv: impl Into<Vec<u8>>, info: impl Into<Vec<u8>>) -> Self {
        Self {
            key: key.into(),
            iv: iv.into(),
            info: info.into(),
        }
    }

    /// The secret key bytes.
    pub fn key(&self) -> &[u8] {
        &self.key
    }

    /// The IV/nonce bytes, empty if none was supplied.
    pub fn iv(&self) -> &[u8] {
        &self.iv
    }

    /// The `ikm`/info bytes, empty if none was supplied.
    pub fn info(&self) -> &[u8] {
        &self.info
    }
}

impl PartialEq for KeyParams {
    fn eq(&self, other: &Self) -> bool {
        self.key == other.key && self.iv == other.iv && self.info == other.info
    }
}

impl Eq for KeyParams {}

impl Drop for KeyParams {
    fn drop(&mut self) {
        self.key.zeroize();
        self.iv.zeroize();
        self.info.zeroize();
    }
}

impl std::fmt::Debug for KeyParams {
    /// Deliberately does not print secret bytes.
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("KeyParams")
            .field("key_len", &self.key.len())
            .field("iv_len", &self.iv.len())
            .field("info_len", &self.info.len())
            .finish()
    }
}
