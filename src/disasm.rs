use crate::memory::PROGRAM_START;
use crate::utils::{addr, byte, nibbles, word_from_bytes};

/// Mnemonic for a single opcode, COWGOD-style.
pub fn mnemonic(opcode: u16) -> String {
    let nnn = addr(opcode);
    let kk = byte(opcode);
    match nibbles(opcode) {
        (0x0, 0x0, 0xE, 0x0) => "CLS".to_string(),
        (0x0, 0x0, 0xE, 0xE) => "RET".to_string(),
        (0x0, _, _, _) => format!("SYS {:#05x}", nnn),
        (0x1, _, _, _) => format!("JP {:#05x}", nnn),
        (0x2, _, _, _) => format!("CALL {:#05x}", nnn),
        (0x3, x, _, _) => format!("SE V{:X}, {:#04x}", x, kk),
        (0x4, x, _, _) => format!("SNE V{:X}, {:#04x}", x, kk),
        (0x5, x, y, 0x0) => format!("SE V{:X}, V{:X}", x, y),
        (0x6, x, _, _) => format!("LD V{:X}, {:#04x}", x, kk),
        (0x7, x, _, _) => format!("ADD V{:X}, {:#04x}", x, kk),
        (0x8, x, y, 0x0) => format!("LD V{:X}, V{:X}", x, y),
        (0x8, x, y, 0x1) => format!("OR V{:X}, V{:X}", x, y),
        (0x8, x, y, 0x2) => format!("AND V{:X}, V{:X}", x, y),
        (0x8, x, y, 0x3) => format!("XOR V{:X}, V{:X}", x, y),
        (0x8, x, y, 0x4) => format!("ADD V{:X}, V{:X}", x, y),
        (0x8, x, y, 0x5) => format!("SUB V{:X}, V{:X}", x, y),
        (0x8, x, _, 0x6) => format!("SHR V{:X}", x),
        (0x8, x, y, 0x7) => format!("SUBN V{:X}, V{:X}", x, y),
        (0x8, x, _, 0xE) => format!("SHL V{:X}", x),
        (0x9, x, y, 0x0) => format!("SNE V{:X}, V{:X}", x, y),
        (0xA, _, _, _) => format!("LD I, {:#05x}", nnn),
        (0xB, _, _, _) => format!("JP V0, {:#05x}", nnn),
        (0xC, x, _, _) => format!("RND V{:X}, {:#04x}", x, kk),
        (0xD, x, y, n) => format!("DRW V{:X}, V{:X}, {}", x, y, n),
        (0xE, x, 0x9, 0xE) => format!("SKP V{:X}", x),
        (0xE, x, 0xA, 0x1) => format!("SKNP V{:X}", x),
        (0xF, x, 0x0, 0x7) => format!("LD V{:X}, DT", x),
        (0xF, x, 0x0, 0xA) => format!("LD V{:X}, K", x),
        (0xF, x, 0x1, 0x5) => format!("LD DT, V{:X}", x),
        (0xF, x, 0x1, 0x8) => format!("LD ST, V{:X}", x),
        (0xF, x, 0x1, 0xE) => format!("ADD I, V{:X}", x),
        (0xF, x, 0x2, 0x9) => format!("LD F, V{:X}", x),
        (0xF, x, 0x3, 0x3) => format!("LD B, V{:X}", x),
        (0xF, x, 0x5, 0x5) => format!("LD [I], V0..V{:X}", x),
        (0xF, x, 0x6, 0x5) => format!("LD V0..V{:X}, [I]", x),
        _ => format!("??? {:#06x}", opcode),
    }
}

/// Render a ROM image as one line per 2-byte word: the address it will be
/// loaded at, the raw opcode, and its mnemonic. A trailing odd byte is
/// listed as data.
pub fn disassemble(rom: &[u8]) -> String {
    let mut listing = String::new();
    for (offset, pair) in rom.chunks(2).enumerate() {
        let pc = PROGRAM_START + (offset * 2) as u16;
        match pair {
            [high, low] => {
                let opcode = word_from_bytes(*high, *low);
                listing.push_str(&format!("{:04x}: {:04x}  {}\n", pc, opcode, mnemonic(opcode)));
            }
            [lone] => {
                listing.push_str(&format!("{:04x}: {:02x}    .byte\n", pc, lone));
            }
            _ => unreachable!(),
        }
    }
    listing
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mnemonics() {
        assert_eq!(mnemonic(0x00E0), "CLS");
        assert_eq!(mnemonic(0x1234), "JP 0x234");
        assert_eq!(mnemonic(0x6A02), "LD VA, 0x02");
        assert_eq!(mnemonic(0x8124), "ADD V1, V2");
        assert_eq!(mnemonic(0xD015), "DRW V0, V1, 5");
        assert_eq!(mnemonic(0xF30A), "LD V3, K");
        assert_eq!(mnemonic(0xFFFF), "??? 0xffff");
    }

    #[test]
    fn test_disassemble_listing() {
        let rom = [0x00, 0xE0, 0x12, 0x00];
        let listing = disassemble(&rom);
        let lines: Vec<&str> = listing.lines().collect();
        assert_eq!(lines.len(), 2);
        assert_eq!(lines[0], "0200: 00e0  CLS");
        assert_eq!(lines[1], "0202: 1200  JP 0x200");
    }

    #[test]
    fn test_disassemble_odd_tail() {
        let rom = [0x00, 0xE0, 0xAB];
        let listing = disassemble(&rom);
        assert!(listing.lines().nth(1).unwrap().contains(".byte"));
    }
}
