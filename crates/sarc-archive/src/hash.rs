//! SARC name hashing.

/// Hash multiplier used by nearly every SARC producer.
pub const DEFAULT_HASH_KEY: u32 = 0x65;

/// Compute the SARC name hash of `name` with multiplier `key`.
///
/// Each byte is taken as a signed char, so non-ASCII bytes contribute their
/// sign-extended value.
pub fn name_hash(name: &str, key: u32) -> u32 {
    name.bytes().fold(0u32, |hash, byte| {
        hash.wrapping_mul(key)
            .wrapping_add(byte as i8 as i32 as u32)
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_name() {
        assert_eq!(name_hash("", DEFAULT_HASH_KEY), 0);
    }

    #[test]
    fn test_known_hash() {
        // 'a' = 0x61, 'b' = 0x62: 0x61 * 0x65 + 0x62
        assert_eq!(name_hash("ab", DEFAULT_HASH_KEY), 0x61 * 0x65 + 0x62);
    }

    #[test]
    fn test_signed_bytes() {
        // U+00E9 encodes as 0xC3 0xA9, both negative as i8
        let expected = (0xC3u8 as i8 as i32 as u32)
            .wrapping_mul(DEFAULT_HASH_KEY)
            .wrapping_add(0xA9u8 as i8 as i32 as u32);
        assert_eq!(name_hash("\u{e9}", DEFAULT_HASH_KEY), expected);
    }
}
