use crate::error::Chip8Error;

/// Combine two consecutive memory bytes into a big-endian opcode word.
pub fn word_from_bytes(high: u8, low: u8) -> u16 {
    ((high as u16) << 8) | low as u16
}

/// Check that `value` fits in `len` bytes. Legitimate opcode fields are
/// always pre-masked, so a failure here means an interpreter bug or a setter
/// fed an untruncated arithmetic result.
pub fn parse_byte(value: u32, len: u8) -> Result<u32, Chip8Error> {
    let max = (1u64 << (8 * len as u64)) - 1;
    if value as u64 > max {
        return Err(Chip8Error::InvalidByteValue { value, len });
    }
    Ok(value)
}

/// The four nibbles of an opcode, most significant first.
pub fn nibbles(opcode: u16) -> (u8, u8, u8, u8) {
    (
        (opcode >> 12) as u8,
        ((opcode >> 8) & 0x0F) as u8,
        ((opcode >> 4) & 0x0F) as u8,
        (opcode & 0x0F) as u8,
    )
}

/// `nnn`: the low 12 bits of an opcode.
pub fn addr(opcode: u16) -> u16 {
    opcode & 0x0FFF
}

/// `kk`: the low byte of an opcode.
pub fn byte(opcode: u16) -> u8 {
    (opcode & 0x00FF) as u8
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_word_from_bytes() {
        assert_eq!(word_from_bytes(0x12, 0x34), 0x1234);
        assert_eq!(word_from_bytes(0x00, 0xE0), 0x00E0);
    }

    #[test]
    fn test_parse_byte_in_range() {
        assert_eq!(parse_byte(0, 1).unwrap(), 0);
        assert_eq!(parse_byte(255, 1).unwrap(), 255);
        assert_eq!(parse_byte(65535, 2).unwrap(), 65535);
    }

    #[test]
    fn test_parse_byte_out_of_range() {
        assert!(matches!(
            parse_byte(256, 1),
            Err(Chip8Error::InvalidByteValue { value: 256, len: 1 })
        ));
        assert!(matches!(
            parse_byte(65536, 2),
            Err(Chip8Error::InvalidByteValue { .. })
        ));
    }

    #[test]
    fn test_nibbles() {
        assert_eq!(nibbles(0xABCD), (0xA, 0xB, 0xC, 0xD));
    }

    #[test]
    fn test_addr_and_byte() {
        assert_eq!(addr(0x1234), 0x234);
        assert_eq!(byte(0x1234), 0x34);
    }
}
