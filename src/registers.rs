use crate::error::Chip8Error;
use crate::utils::parse_byte;

/// Number of general-purpose V registers.
pub const V_COUNT: usize = 16;

/// The register file: V0..VF plus the 16-bit address register I. VF doubles
/// as the flags register for carry/borrow/collision.
///
/// `set_v` deliberately rejects values wider than a byte instead of
/// truncating them: register arithmetic is expected to overflow meaningfully
/// (carry detection reads the untruncated sum), so the CPU wraps results
/// itself before storing.
pub struct Registers {
    v: [u8; V_COUNT],
    i: u16,
}

impl Registers {
    pub fn new() -> Self {
        Registers {
            v: [0; V_COUNT],
            i: 0,
        }
    }

    fn check_index(&self, index: u8) -> Result<(), Chip8Error> {
        if index as usize >= V_COUNT {
            return Err(Chip8Error::RegisterIndexOutOfBounds(index));
        }
        Ok(())
    }

    pub fn get_v(&self, index: u8) -> Result<u8, Chip8Error> {
        self.check_index(index)?;
        Ok(self.v[index as usize])
    }

    pub fn set_v(&mut self, index: u8, value: u16) -> Result<(), Chip8Error> {
        self.check_index(index)?;
        self.v[index as usize] = parse_byte(value as u32, 1)? as u8;
        Ok(())
    }

    pub fn get_i(&self) -> u16 {
        self.i
    }

    /// Store a 16-bit value in I. Decode masks `nnn` to 12 bits, so only the
    /// low 12 are architecturally meaningful.
    pub fn set_i(&mut self, value: u16) {
        self.i = value;
    }
}

impl Default for Registers {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_registers_zeroed() {
        let r = Registers::new();
        assert_eq!(r.i, 0);
        for index in 0..V_COUNT as u8 {
            assert_eq!(r.get_v(index).unwrap(), 0);
        }
    }

    #[test]
    fn test_set_get_v() {
        let mut r = Registers::new();
        r.set_v(0, 0xAB).unwrap();
        assert_eq!(r.get_v(0).unwrap(), 0xAB);
    }

    #[test]
    fn test_v_index_out_of_bounds() {
        let mut r = Registers::new();
        assert!(matches!(
            r.get_v(16),
            Err(Chip8Error::RegisterIndexOutOfBounds(16))
        ));
        assert!(matches!(
            r.set_v(16, 0xFF),
            Err(Chip8Error::RegisterIndexOutOfBounds(16))
        ));
    }

    #[test]
    fn test_set_v_rejects_wide_value() {
        let mut r = Registers::new();
        assert!(matches!(
            r.set_v(1, 300),
            Err(Chip8Error::InvalidByteValue { value: 300, len: 1 })
        ));
        // and the register is untouched
        assert_eq!(r.get_v(1).unwrap(), 0);
    }

    #[test]
    fn test_set_get_i() {
        let mut r = Registers::new();
        r.set_i(0x123);
        assert_eq!(r.get_i(), 0x123);
    }
}
