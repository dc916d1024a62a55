use std::io;

/// Anything that can go fatally wrong inside the interpreter. Every fallible
/// operation surfaces one of these synchronously; the run loop stops on the
/// first error and hands it to the caller rather than skipping onward.
#[derive(Debug, thiserror::Error)]
pub enum Chip8Error {
    #[error("memory access out of bounds: {addr:#06x} with length {len}")]
    OutOfBounds { addr: u16, len: usize },

    #[error("V register index out of bounds: {0:#x}")]
    RegisterIndexOutOfBounds(u8),

    #[error("{value} is not valid for {len} byte(s)")]
    InvalidByteValue { value: u32, len: u8 },

    #[error("unknown opcode {0:#06x}")]
    UnknownOpcode(u16),

    #[error("{0} rate must be nonzero")]
    ZeroRate(&'static str),

    #[error("call stack overflow")]
    StackOverflow,

    #[error("call stack underflow")]
    StackUnderflow,

    #[error(transparent)]
    Io(#[from] io::Error),

    #[error("sound device: {0}")]
    Sound(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_out_of_bounds_message() {
        let e = Chip8Error::OutOfBounds {
            addr: 0x2000,
            len: 1,
        };
        assert_eq!(
            e.to_string(),
            "memory access out of bounds: 0x2000 with length 1"
        );
    }

    #[test]
    fn test_invalid_byte_message() {
        let e = Chip8Error::InvalidByteValue { value: 300, len: 1 };
        assert_eq!(e.to_string(), "300 is not valid for 1 byte(s)");
    }

    #[test]
    fn test_zero_rate_message() {
        let e = Chip8Error::ZeroRate("timer");
        assert_eq!(e.to_string(), "timer rate must be nonzero");
    }

    #[test]
    fn test_io_conversion() {
        let io_err = io::Error::new(io::ErrorKind::UnexpectedEof, "eof");
        let e: Chip8Error = io_err.into();
        assert!(matches!(e, Chip8Error::Io(_)));
    }
}
