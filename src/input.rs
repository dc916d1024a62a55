use crossterm::event::{poll, read, Event, KeyCode};
use crossterm::terminal;
use std::collections::HashMap;
use std::io;
use std::time::Duration;

/// Map of keyboard characters to the 16-key hexadecimal keypad, using the
/// left-hand side of a qwerty keyboard.
const CONVENTIONAL_KEYMAP: [(char, u8); 16] = [
    ('x', 0x00),
    ('1', 0x01),
    ('2', 0x02),
    ('3', 0x03),
    ('q', 0x04),
    ('w', 0x05),
    ('e', 0x06),
    ('a', 0x07),
    ('s', 0x08),
    ('d', 0x09),
    ('z', 0x0a),
    ('c', 0x0b),
    ('4', 0x0c),
    ('r', 0x0d),
    ('f', 0x0e),
    ('v', 0x0f),
];

/// Most recent presses kept when nothing consumes the buffer; older ones
/// age out.
const KEY_BUFFER_CAP: usize = 16;

fn buffer_key(buffer: &mut Vec<u8>, key: u8) {
    if buffer.len() == KEY_BUFFER_CAP {
        buffer.remove(0);
    }
    buffer.push(key);
}

/// Reads keypresses. The interpreter only consults this during a
/// wait-for-key instruction or a skip-if-key instruction; everything else
/// runs without touching input.
pub trait Input {
    /// get a list of all the mapped keys that have been pressed recently,
    /// without flushing them from the buffer
    fn peek_keys(&mut self) -> Result<&[u8], io::Error>;

    /// flush all the keypresses from the buffer
    fn flush_keys(&mut self) -> Result<(), io::Error>;

    /// whether the user asked to stop the emulator
    fn quit_requested(&mut self) -> Result<bool, io::Error>;
}

/// Simple implementation of Input, using STDIN via crossterm. Esc requests
/// a clean stop of the run loop.
pub struct StdinInput {
    buffer: Vec<u8>,
    keymap: HashMap<char, u8>,
    quit: bool,
}

impl StdinInput {
    pub fn new() -> Result<Self, io::Error> {
        terminal::enable_raw_mode()?;
        Ok(StdinInput {
            buffer: Vec::new(),
            keymap: HashMap::from(CONVENTIONAL_KEYMAP),
            quit: false,
        })
    }

    fn read_stdin(&mut self) -> Result<(), io::Error> {
        while poll(Duration::from_millis(0))? {
            match read()? {
                Event::Key(evt) => match evt.code {
                    KeyCode::Char(key) => match self.keymap.get(&key) {
                        Some(mapped_key) => buffer_key(&mut self.buffer, *mapped_key),
                        None => {
                            log::warn!("can't map {:?} to a keypad key", key);
                        }
                    },
                    KeyCode::Esc => self.quit = true,
                    _ => {
                        log::warn!("unknown key event received");
                    }
                },
                _ => {
                    log::warn!("unknown event received");
                }
            }
        }
        Ok(())
    }
}

impl Drop for StdinInput {
    fn drop(&mut self) {
        let _ = terminal::disable_raw_mode();
    }
}

impl Input for StdinInput {
    fn peek_keys(&mut self) -> Result<&[u8], io::Error> {
        self.read_stdin()?;
        Ok(self.buffer.as_slice())
    }

    fn flush_keys(&mut self) -> Result<(), io::Error> {
        self.read_stdin()?;
        self.buffer.clear();
        Ok(())
    }

    fn quit_requested(&mut self) -> Result<bool, io::Error> {
        self.read_stdin()?;
        Ok(self.quit)
    }
}

/// Dummy Input implementation for testing.
pub struct DummyInput {
    bytes: Vec<u8>,
    quit: bool,
}

impl DummyInput {
    pub fn new(keys: &[u8]) -> Self {
        DummyInput {
            bytes: Vec::from(keys),
            quit: false,
        }
    }

    /// make quit_requested fire, for driving run loops in tests
    pub fn request_quit(&mut self) {
        self.quit = true;
    }
}

impl Input for DummyInput {
    fn peek_keys(&mut self) -> Result<&[u8], io::Error> {
        Ok(self.bytes.as_slice())
    }

    fn flush_keys(&mut self) -> Result<(), io::Error> {
        self.bytes.clear();
        Ok(())
    }

    fn quit_requested(&mut self) -> Result<bool, io::Error> {
        Ok(self.quit)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_dummy_peek_does_not_flush() {
        let mut input = DummyInput::new(&[0x0a, 0x01]);
        assert_eq!(input.peek_keys().unwrap(), &[0x0a, 0x01]);
        assert_eq!(input.peek_keys().unwrap(), &[0x0a, 0x01]);
    }

    #[test]
    fn test_dummy_flush_empties_buffer() {
        let mut input = DummyInput::new(&[0x0a]);
        input.flush_keys().unwrap();
        assert_eq!(input.peek_keys().unwrap(), &[]);
    }

    #[test]
    fn test_key_buffer_drops_oldest_at_cap() {
        let mut buffer = Vec::new();
        for key in 0..20u8 {
            buffer_key(&mut buffer, key % 16);
        }
        assert_eq!(buffer.len(), KEY_BUFFER_CAP);
        // the first four presses have aged out
        assert_eq!(buffer[0], 4);
    }

    #[test]
    fn test_dummy_quit_request() {
        let mut input = DummyInput::new(&[]);
        assert!(!input.quit_requested().unwrap());
        input.request_quit();
        assert!(input.quit_requested().unwrap());
    }

    #[test]
    fn test_keymap_covers_whole_keypad() {
        let mut codes: Vec<u8> = CONVENTIONAL_KEYMAP.iter().map(|&(_, c)| c).collect();
        codes.sort_unstable();
        assert_eq!(codes, (0x00..=0x0f).collect::<Vec<u8>>());
    }
}
