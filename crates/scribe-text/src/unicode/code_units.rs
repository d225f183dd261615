/// Lead bytes at or above this value open a four byte sequence.
const FOUR_BYTE_LEAD: u8 = 0x80 + 0x40 + 0x20 + 0x10;
/// Lead bytes at or above this value open a three byte sequence.
const THREE_BYTE_LEAD: u8 = 0x80 + 0x40 + 0x20;
/// Any byte with the high bit set is treated as a two byte lead unless a
/// longer pattern matches. Continuation bytes fall into this bucket too.
const MULTI_BYTE_LEAD: u8 = 0x80;

/// Number of bytes in the UTF-8 sequence introduced by `lead`.
///
/// Only the lead byte is inspected, so the result is always in `1..=4`
/// even for malformed input.
#[inline]
pub fn sequence_length(lead: u8) -> usize {
    if lead >= FOUR_BYTE_LEAD {
        4
    } else if lead >= THREE_BYTE_LEAD {
        3
    } else if lead >= MULTI_BYTE_LEAD {
        2
    } else {
        1
    }
}

/// Number of UTF-16 code units occupied by a character whose UTF-8
/// encoding is `sequence_length` bytes long.
///
/// Four byte sequences encode characters outside the basic multilingual
/// plane, which a 16-bit shaping engine stores as a surrogate pair.
#[inline]
pub fn code_unit_width(sequence_length: usize) -> usize {
    if sequence_length < 4 { 1 } else { 2 }
}

/// Bytes and code units consumed by one character.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CodeUnitStep {
    pub bytes: usize,
    pub units: usize,
}

/// Classify `lead` into the bytes it spans and the code units it consumes.
#[inline]
pub fn step(lead: u8) -> CodeUnitStep {
    let bytes = sequence_length(lead);
    CodeUnitStep {
        bytes,
        units: code_unit_width(bytes),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ascii_is_single_byte() {
        assert_eq!(sequence_length(b'a'), 1);
        assert_eq!(sequence_length(0x00), 1);
        assert_eq!(sequence_length(0x7F), 1);
    }

    #[test]
    fn lead_bytes_by_range() {
        assert_eq!(sequence_length(0xC3), 2); // é
        assert_eq!(sequence_length(0xE2), 3); // €
        assert_eq!(sequence_length(0xF0), 4); // 😀
        assert_eq!(sequence_length(0xFF), 4);
    }

    #[test]
    fn continuation_byte_counts_as_two() {
        assert_eq!(sequence_length(0x80), 2);
        assert_eq!(sequence_length(0xBF), 2);
    }

    #[test]
    fn agrees_with_std_for_valid_text() {
        for ch in ['a', 'é', '€', '😀', '\u{10FFFF}'] {
            let mut buf = [0u8; 4];
            let encoded = ch.encode_utf8(&mut buf);
            let s = step(encoded.as_bytes()[0]);
            assert_eq!(s.bytes, ch.len_utf8(), "{ch:?}");
            assert_eq!(s.units, ch.len_utf16(), "{ch:?}");
        }
    }

    #[test]
    fn only_four_byte_sequences_take_a_surrogate_pair() {
        assert_eq!(code_unit_width(1), 1);
        assert_eq!(code_unit_width(2), 1);
        assert_eq!(code_unit_width(3), 1);
        assert_eq!(code_unit_width(4), 2);
    }
}
