//! String obfuscation used by the name pool and inline text fields
//!
//! Every byte is XORed with a repeating 8-byte key. The transform is its own
//! inverse, so `deobfuscate` and `obfuscate` are the same operation under two
//! names that say which direction the caller means.

/// Repeating XOR key applied to string bytes
pub const HASH_KEY: [u8; 8] = [0x95, 0x3A, 0xC5, 0x2A, 0x95, 0x7A, 0x95, 0x6A];

/// Obfuscate plain bytes for storage
pub fn obfuscate(data: &[u8]) -> Vec<u8> {
    let mut out = data.to_vec();
    apply_in_place(&mut out);
    out
}

/// Recover plain bytes from stored ones
pub fn deobfuscate(data: &[u8]) -> Vec<u8> {
    obfuscate(data)
}

/// Apply the key to a buffer without allocating
pub fn apply_in_place(data: &mut [u8]) {
    for (i, byte) in data.iter_mut().enumerate() {
        *byte ^= HASH_KEY[i % HASH_KEY.len()];
    }
}
