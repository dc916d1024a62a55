use crate::error::Chip8Error;

// NB. addresses are u16 as per the chip-8; lengths are usize to stop endless casting

/// How much RAM we have.
pub const MEM_SIZE: usize = 4096;

/// Where programs are loaded.
pub const PROGRAM_START: u16 = 0x200;

/// Flat addressable byte store. Allocated once, zero-initialized, and only
/// ever mutated through the bounds-checked operations below. A range
/// operation rejects before touching any byte, so there are no partial
/// writes.
pub struct Memory {
    data: [u8; MEM_SIZE],
}

impl Memory {
    pub fn new() -> Self {
        Memory {
            data: [0; MEM_SIZE],
        }
    }

    /// Check that `len` bytes starting at `addr` lie inside memory.
    fn check_range(&self, addr: u16, len: usize) -> Result<(), Chip8Error> {
        if (addr as usize)
            .checked_add(len)
            .map_or(true, |end| end > self.data.len())
        {
            return Err(Chip8Error::OutOfBounds { addr, len });
        }
        Ok(())
    }

    pub fn read_byte(&self, addr: u16) -> Result<u8, Chip8Error> {
        self.check_range(addr, 1)?;
        Ok(self.data[addr as usize])
    }

    pub fn write_byte(&mut self, addr: u16, value: u8) -> Result<(), Chip8Error> {
        self.check_range(addr, 1)?;
        self.data[addr as usize] = value;
        Ok(())
    }

    /// Write a contiguous run of bytes starting at `addr`.
    pub fn write(&mut self, addr: u16, data: &[u8]) -> Result<(), Chip8Error> {
        self.check_range(addr, data.len())?;
        let a = addr as usize;
        self.data[a..a + data.len()].copy_from_slice(data);
        Ok(())
    }

    /// Read a contiguous run of `len` bytes starting at `addr`.
    pub fn read(&self, addr: u16, len: usize) -> Result<&[u8], Chip8Error> {
        self.check_range(addr, len)?;
        let a = addr as usize;
        Ok(&self.data[a..a + len])
    }
}

impl Default for Memory {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_memory_zeroed() {
        let m = Memory::new();
        assert_eq!(m.data, [0; MEM_SIZE]);
    }

    #[test]
    fn test_byte_round_trip() {
        let mut m = Memory::new();
        m.write_byte(0x100, 0xAB).unwrap();
        assert_eq!(m.read_byte(0x100).unwrap(), 0xAB);
    }

    #[test]
    fn test_read_byte_out_of_bounds() {
        let m = Memory::new();
        assert!(matches!(
            m.read_byte(0x1000),
            Err(Chip8Error::OutOfBounds {
                addr: 0x1000,
                len: 1
            })
        ));
        assert!(m.read_byte(0xFFF).is_ok());
    }

    #[test]
    fn test_write_byte_out_of_bounds() {
        let mut m = Memory::new();
        assert!(matches!(
            m.write_byte(0x2000, 0xEF),
            Err(Chip8Error::OutOfBounds { .. })
        ));
    }

    #[test]
    fn test_write_run() {
        let mut m = Memory::new();
        m.write(0x300, &[0x01, 0x02, 0x03]).unwrap();
        assert_eq!(m.read(0x300, 3).unwrap(), &[0x01, 0x02, 0x03]);
    }

    #[test]
    fn test_write_run_out_of_bounds_is_all_or_nothing() {
        let mut m = Memory::new();
        let err = m.write(0xFFF, &[0x01, 0x02, 0x03]);
        assert!(matches!(err, Err(Chip8Error::OutOfBounds { .. })));
        // the in-range prefix must not have been written
        assert_eq!(m.read_byte(0xFFF).unwrap(), 0);
    }

    #[test]
    fn test_read_run_out_of_bounds() {
        let m = Memory::new();
        assert!(matches!(
            m.read(0xFFF, 3),
            Err(Chip8Error::OutOfBounds { .. })
        ));
        assert!(m.read(0xFFD, 3).is_ok());
    }

    #[test]
    fn test_write_at_extent() {
        let mut m = Memory::new();
        m.write(0xFFE, &[0xAA, 0xBB]).unwrap();
        assert_eq!(m.read_byte(0xFFF).unwrap(), 0xBB);
    }
}
