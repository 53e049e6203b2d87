// https://docs.oracle.com/javase/specs/jvms/se21/html/jvms-4.html#jvms-4.4.7

/// Decodes the modified UTF-8 used by `CONSTANT_Utf8_info`.
///
/// Returns `None` on a malformed byte sequence or an unpaired surrogate.
pub(crate) fn decode(bytes: &[u8]) -> Option<String> {
    if bytes.iter().all(|&b| b != 0 && b < 0x80) {
        return std::str::from_utf8(bytes).ok().map(str::to_owned);
    }

    let mut units = Vec::with_capacity(bytes.len());
    let mut i = 0;
    while i < bytes.len() {
        let x = bytes[i] as u16;
        let (unit, width) = match x {
            0x01..=0x7f => (x, 1),
            0xc0..=0xdf => {
                let y = continuation(bytes, i + 1)?;
                (((x & 0x1f) << 6) | y, 2)
            }
            0xe0..=0xef => {
                let y = continuation(bytes, i + 1)?;
                let z = continuation(bytes, i + 2)?;
                (((x & 0x0f) << 12) | (y << 6) | z, 3)
            }
            _ => return None,
        };
        units.push(unit);
        i += width;
    }

    String::from_utf16(&units).ok()
}

fn continuation(bytes: &[u8], i: usize) -> Option<u16> {
    match bytes.get(i) {
        Some(&b) if b & 0xc0 == 0x80 => Some((b & 0x3f) as u16),
        _ => None,
    }
}

/// Encodes `s` as modified UTF-8: NUL takes two bytes and supplementary
/// characters are written as surrogate pairs.
pub(crate) fn encode(s: &str) -> Vec<u8> {
    let mut out = Vec::with_capacity(s.len());
    for unit in s.encode_utf16() {
        match unit {
            0x0001..=0x007f => out.push(unit as u8),
            0x0000 | 0x0080..=0x07ff => {
                out.push(0xc0 | (unit >> 6) as u8);
                out.push(0x80 | (unit & 0x3f) as u8);
            }
            _ => {
                out.push(0xe0 | (unit >> 12) as u8);
                out.push(0x80 | ((unit >> 6) & 0x3f) as u8);
                out.push(0x80 | (unit & 0x3f) as u8);
            }
        }
    }
    out
}

#[cfg(test)]
mod mutf8_tests {
    use super::*;

    #[test]
    fn it_should_pass_ascii_through() {
        assert_eq!(encode("java.base"), b"java.base");
        assert_eq!(decode(b"java.base").as_deref(), Some("java.base"));
    }

    #[test]
    fn it_should_encode_nul_as_two_bytes() {
        assert_eq!(encode("a\0b"), [b'a', 0xc0, 0x80, b'b']);
        assert_eq!(decode(&[b'a', 0xc0, 0x80, b'b']).as_deref(), Some("a\0b"));
    }

    #[test]
    fn it_should_use_surrogate_pairs_for_supplementary_characters() {
        let encoded = encode("\u{1F600}");
        assert_eq!(encoded.len(), 6);
        assert_eq!(decode(&encoded).as_deref(), Some("\u{1F600}"));
    }

    #[test]
    fn it_should_reject_a_raw_nul_byte() {
        assert_eq!(decode(&[b'a', 0x00]), None);
    }

    #[test]
    fn it_should_reject_a_missing_continuation_byte() {
        assert_eq!(decode(&[0xe0, 0x80]), None);
    }
}
