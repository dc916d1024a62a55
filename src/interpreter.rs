use std::io;
use std::time::Duration;

use crate::display::{DisplaySink, FrameBuffer, PixelGrid};
use crate::error::Chip8Error;
use crate::input::Input;
use crate::memory::{Memory, PROGRAM_START};
use crate::registers::Registers;
use crate::sound::Sound;
use crate::timers::{QuartzClock, Timer, Tone, TIMER_HZ};
use crate::utils::{addr, byte, nibbles, word_from_bytes};

const OPCODE_SIZE: u16 = 2;

/// Call stack depth; enough for the published instruction set.
const STACK_SIZE: usize = 16;

/// Where the hex font lives and how big one glyph is.
pub const FONT_ADDR: u16 = 0x050;
pub const FONT_GLYPH_SIZE: u16 = 5;

const FONT: [u8; 80] = [
    0xF0, 0x90, 0x90, 0x90, 0xF0, // 0
    0x20, 0x60, 0x20, 0x20, 0x70, // 1
    0xF0, 0x10, 0xF0, 0x80, 0xF0, // 2
    0xF0, 0x10, 0xF0, 0x10, 0xF0, // 3
    0x90, 0x90, 0xF0, 0x10, 0x10, // 4
    0xF0, 0x80, 0xF0, 0x10, 0xF0, // 5
    0xF0, 0x80, 0xF0, 0x90, 0xF0, // 6
    0xF0, 0x10, 0x20, 0x40, 0x40, // 7
    0xF0, 0x90, 0xF0, 0x90, 0xF0, // 8
    0xF0, 0x90, 0xF0, 0x10, 0xF0, // 9
    0xF0, 0x90, 0xF0, 0x90, 0x90, // A
    0xE0, 0x90, 0xE0, 0x90, 0xE0, // B
    0xF0, 0x80, 0x80, 0x80, 0xF0, // C
    0xE0, 0x90, 0x90, 0x90, 0xE0, // D
    0xF0, 0x80, 0xF0, 0x80, 0xF0, // E
    0xF0, 0x80, 0xF0, 0x80, 0x80, // F
];

/// Clock rates for the run loop. Explicit configuration rather than ambient
/// constants, so callers (and tests) can run at whatever rates they like.
pub struct RunConfig {
    pub instructions_per_second: u32,
    pub timer_hz: u32,
}

impl Default for RunConfig {
    fn default() -> Self {
        RunConfig {
            instructions_per_second: 700,
            timer_hz: TIMER_HZ,
        }
    }
}

/// The CHIP-8 CPU. Owns memory, registers, framebuffer, call stack and both
/// timers by composition; borrows the I/O collaborators so they can be
/// anything that renders a frame, supplies keys, or makes noise.
///
/// Instruction dispatch matches on the opcode's nibble tuple with the most
/// specific patterns first, so e.g. `00E0` resolves before the catch-all
/// `0nnn` system call.
pub struct Chip8Interpreter<'a> {
    memory: Memory,
    registers: Registers,
    frame: FrameBuffer,
    delay_timer: Timer,
    sound_timer: Timer,
    counter: u16,
    stack: [u16; STACK_SIZE],
    sp: usize,
    display: &'a mut dyn DisplaySink,
    input: &'a mut dyn Input,
    sound: &'a mut dyn Sound,
}

impl<'a> Chip8Interpreter<'a> {
    pub fn new(
        display: &'a mut dyn DisplaySink,
        input: &'a mut dyn Input,
        sound: &'a mut dyn Sound,
    ) -> Result<Chip8Interpreter<'a>, Chip8Error> {
        let mut memory = Memory::new();
        memory.write(FONT_ADDR, &FONT)?;
        Ok(Chip8Interpreter {
            memory,
            registers: Registers::new(),
            frame: FrameBuffer::new(),
            delay_timer: Timer::new(Tone::Silent),
            sound_timer: Timer::new(Tone::Chime),
            counter: PROGRAM_START,
            stack: [0; STACK_SIZE],
            sp: 0,
            display,
            input,
            sound,
        })
    }

    /// Load a chip8 program at the conventional origin.
    pub fn load_program(&mut self, reader: &mut impl io::Read) -> Result<(), Chip8Error> {
        let mut buf = Vec::new();
        reader.read_to_end(&mut buf)?;
        self.memory.write(PROGRAM_START, &buf)?;
        log::info!("loaded {} byte program at {:#05x}", buf.len(), PROGRAM_START);
        Ok(())
    }

    /// Read-only view of the framebuffer, for embedders that drive their own
    /// rendering.
    pub fn snapshot(&self) -> &PixelGrid {
        self.frame.snapshot()
    }

    /// Combine the two bytes at the program counter into one opcode,
    /// big-endian.
    fn fetch_opcode(&self) -> Result<u16, Chip8Error> {
        let high = self.memory.read_byte(self.counter)?;
        let low = self.memory.read_byte(self.counter.wrapping_add(1))?;
        Ok(word_from_bytes(high, low))
    }

    /// One fetch-decode-execute cycle, followed by a frame to the display
    /// sink. The counter advances *before* execution so that jumps and
    /// skips simply overwrite the default.
    pub fn tick(&mut self) -> Result<(), Chip8Error> {
        let opcode = self.fetch_opcode()?;
        self.counter = self.counter.wrapping_add(OPCODE_SIZE);
        self.execute_opcode(opcode)?;
        self.display.draw(self.frame.snapshot())?;
        Ok(())
    }

    /// One step of both timers, on the quartz clock's schedule rather than
    /// the instruction clock's. The sound timer's zero transition stops the
    /// tone started when it was loaded.
    pub fn tick_timers(&mut self) -> Result<(), Chip8Error> {
        self.delay_timer.tick();
        if self.sound_timer.tick() {
            self.sound
                .stop()
                .map_err(|e| Chip8Error::Sound(e.to_string()))?;
        }
        Ok(())
    }

    /// Fetch-execute until the input source requests a stop or an error
    /// propagates. Timer ticks are interleaved between instructions from a
    /// fixed-rate quartz clock, decoupled from instruction throughput. Both
    /// rates must be nonzero. The tone is silenced on every exit path.
    pub fn run(&mut self, config: &RunConfig) -> Result<(), Chip8Error> {
        if config.instructions_per_second == 0 {
            return Err(Chip8Error::ZeroRate("instruction"));
        }
        if config.timer_hz == 0 {
            return Err(Chip8Error::ZeroRate("timer"));
        }
        let pace = Duration::from_secs(1) / config.instructions_per_second;
        let mut quartz = QuartzClock::new(config.timer_hz);
        let outcome = self.run_loop(pace, &mut quartz);
        if self.sound.stop().is_err() {
            log::warn!("could not silence the sound device on exit");
        }
        outcome
    }

    fn run_loop(&mut self, pace: Duration, quartz: &mut QuartzClock) -> Result<(), Chip8Error> {
        loop {
            if self.input.quit_requested()? {
                return Ok(());
            }
            self.tick()?;
            for _ in 0..quartz.poll() {
                self.tick_timers()?;
            }
            spin_sleep::sleep(pace);
        }
    }

    fn push_stack(&mut self, value: u16) -> Result<(), Chip8Error> {
        if self.sp >= STACK_SIZE {
            return Err(Chip8Error::StackOverflow);
        }
        self.stack[self.sp] = value;
        self.sp += 1;
        Ok(())
    }

    fn pop_stack(&mut self) -> Result<u16, Chip8Error> {
        if self.sp == 0 {
            return Err(Chip8Error::StackUnderflow);
        }
        self.sp -= 1;
        Ok(self.stack[self.sp])
    }

    fn execute_opcode(&mut self, opcode: u16) -> Result<(), Chip8Error> {
        let nnn = addr(opcode);
        let kk = byte(opcode);
        log::trace!("executing {:#06x} at {:#05x}", opcode, self.counter);

        match nibbles(opcode) {
            // 00E0 - CLS
            (0x0, 0x0, 0xE, 0x0) => self.frame.clear(),
            // 00EE - RET
            (0x0, 0x0, 0xE, 0xE) => self.counter = self.pop_stack()?,
            // 0nnn - SYS addr; no machine code to run, so ignored
            (0x0, _, _, _) => log::debug!("ignoring SYS call {:#06x}", opcode),
            // 1nnn - JP addr
            (0x1, _, _, _) => self.counter = nnn,
            // 2nnn - CALL addr
            (0x2, _, _, _) => {
                self.push_stack(self.counter)?;
                self.counter = nnn;
            }
            // 3xkk - SE Vx, byte
            (0x3, x, _, _) => {
                if self.registers.get_v(x)? == kk {
                    self.counter += OPCODE_SIZE;
                }
            }
            // 4xkk - SNE Vx, byte
            (0x4, x, _, _) => {
                if self.registers.get_v(x)? != kk {
                    self.counter += OPCODE_SIZE;
                }
            }
            // 5xy0 - SE Vx, Vy
            (0x5, x, y, 0x0) => {
                if self.registers.get_v(x)? == self.registers.get_v(y)? {
                    self.counter += OPCODE_SIZE;
                }
            }
            // 6xkk - LD Vx, byte
            (0x6, x, _, _) => self.registers.set_v(x, kk as u16)?,
            // 7xkk - ADD Vx, byte; wraps, carry flag untouched
            (0x7, x, _, _) => {
                let vx = self.registers.get_v(x)?;
                self.registers.set_v(x, vx.wrapping_add(kk) as u16)?;
            }
            // 8xy0 - LD Vx, Vy
            (0x8, x, y, 0x0) => {
                let vy = self.registers.get_v(y)?;
                self.registers.set_v(x, vy as u16)?;
            }
            // 8xy1 - OR Vx, Vy
            (0x8, x, y, 0x1) => {
                let value = self.registers.get_v(x)? | self.registers.get_v(y)?;
                self.registers.set_v(x, value as u16)?;
            }
            // 8xy2 - AND Vx, Vy
            (0x8, x, y, 0x2) => {
                let value = self.registers.get_v(x)? & self.registers.get_v(y)?;
                self.registers.set_v(x, value as u16)?;
            }
            // 8xy3 - XOR Vx, Vy
            (0x8, x, y, 0x3) => {
                let value = self.registers.get_v(x)? ^ self.registers.get_v(y)?;
                self.registers.set_v(x, value as u16)?;
            }
            // 8xy4 - ADD Vx, Vy; carry from the untruncated sum.
            // Vx is stored first: when x is 0xF the carry flag must win.
            (0x8, x, y, 0x4) => {
                let sum = self.registers.get_v(x)? as u16 + self.registers.get_v(y)? as u16;
                self.registers.set_v(x, sum & 0x00FF)?;
                self.registers.set_v(0xF, (sum > 0xFF) as u16)?;
            }
            // 8xy5 - SUB Vx, Vy; VF = 1 on no borrow
            (0x8, x, y, 0x5) => {
                let vx = self.registers.get_v(x)?;
                let vy = self.registers.get_v(y)?;
                self.registers.set_v(x, vx.wrapping_sub(vy) as u16)?;
                self.registers.set_v(0xF, (vx >= vy) as u16)?;
            }
            // 8xy6 - SHR Vx; VF = shifted-out bit
            (0x8, x, _, 0x6) => {
                let vx = self.registers.get_v(x)?;
                self.registers.set_v(x, (vx >> 1) as u16)?;
                self.registers.set_v(0xF, (vx & 1) as u16)?;
            }
            // 8xy7 - SUBN Vx, Vy; VF = 1 on no borrow
            (0x8, x, y, 0x7) => {
                let vx = self.registers.get_v(x)?;
                let vy = self.registers.get_v(y)?;
                self.registers.set_v(x, vy.wrapping_sub(vx) as u16)?;
                self.registers.set_v(0xF, (vy >= vx) as u16)?;
            }
            // 8xyE - SHL Vx; VF = shifted-out bit
            (0x8, x, _, 0xE) => {
                let vx = self.registers.get_v(x)?;
                self.registers.set_v(x, (vx << 1) as u16)?;
                self.registers.set_v(0xF, (vx >> 7) as u16)?;
            }
            // 9xy0 - SNE Vx, Vy
            (0x9, x, y, 0x0) => {
                if self.registers.get_v(x)? != self.registers.get_v(y)? {
                    self.counter += OPCODE_SIZE;
                }
            }
            // Annn - LD I, addr
            (0xA, _, _, _) => self.registers.set_i(nnn),
            // Bnnn - JP V0, addr
            (0xB, _, _, _) => {
                self.counter = nnn + self.registers.get_v(0)? as u16;
            }
            // Cxkk - RND Vx, byte
            (0xC, x, _, _) => {
                let value = rand::random::<u8>() & kk;
                self.registers.set_v(x, value as u16)?;
            }
            // Dxyn - DRW Vx, Vy, nibble; VF = collision
            (0xD, x, y, n) => {
                let origin_x = self.registers.get_v(x)?;
                let origin_y = self.registers.get_v(y)?;
                let sprite = self.memory.read(self.registers.get_i(), n as usize)?;
                let collision = self.frame.draw_sprite(sprite, origin_x, origin_y);
                self.registers.set_v(0xF, collision as u16)?;
            }
            // Ex9E - SKP Vx
            (0xE, x, 0x9, 0xE) => {
                let vx = self.registers.get_v(x)?;
                if self.input.peek_keys()?.contains(&vx) {
                    self.counter += OPCODE_SIZE;
                }
            }
            // ExA1 - SKNP Vx
            (0xE, x, 0xA, 0x1) => {
                let vx = self.registers.get_v(x)?;
                if !self.input.peek_keys()?.contains(&vx) {
                    self.counter += OPCODE_SIZE;
                }
            }
            // Fx07 - LD Vx, DT
            (0xF, x, 0x0, 0x7) => {
                let value = self.delay_timer.value();
                self.registers.set_v(x, value as u16)?;
            }
            // Fx0A - LD Vx, K; the one suspension point in the core.
            // With no key captured yet, rewind the counter so this
            // instruction runs again next cycle: a cooperative wait that
            // keeps the run loop (and its stop signal) responsive.
            (0xF, x, 0x0, 0xA) => {
                let key = self.input.peek_keys()?.iter().find(|&&k| k < 0x10).copied();
                match key {
                    Some(key) => {
                        self.registers.set_v(x, key as u16)?;
                        self.input.flush_keys()?;
                    }
                    None => self.counter -= OPCODE_SIZE,
                }
            }
            // Fx15 - LD DT, Vx
            (0xF, x, 0x1, 0x5) => {
                let vx = self.registers.get_v(x)?;
                self.delay_timer.reload(vx);
            }
            // Fx18 - LD ST, Vx; a nonzero load starts the tone, a zero
            // load silences it (zeroing the timer never chimes)
            (0xF, x, 0x1, 0x8) => {
                let vx = self.registers.get_v(x)?;
                self.sound_timer.reload(vx);
                let signal = if vx > 0 {
                    self.sound.beep()
                } else {
                    self.sound.stop()
                };
                signal.map_err(|e| Chip8Error::Sound(e.to_string()))?;
            }
            // Fx1E - ADD I, Vx; I stays within the 12-bit address space
            (0xF, x, 0x1, 0xE) => {
                let vx = self.registers.get_v(x)?;
                self.registers
                    .set_i((self.registers.get_i() + vx as u16) & 0x0FFF);
            }
            // Fx29 - LD F, Vx
            (0xF, x, 0x2, 0x9) => {
                let digit = self.registers.get_v(x)? & 0xF;
                self.registers
                    .set_i(FONT_ADDR + FONT_GLYPH_SIZE * digit as u16);
            }
            // Fx33 - LD B, Vx; BCD of Vx at I, I+1, I+2, written as one
            // all-or-nothing run
            (0xF, x, 0x3, 0x3) => {
                let vx = self.registers.get_v(x)?;
                let digits = [vx / 100, vx / 10 % 10, vx % 10];
                self.memory.write(self.registers.get_i(), &digits)?;
            }
            // Fx55 - LD [I], V0..Vx; I itself is left alone, and the run is
            // written all-or-nothing
            (0xF, x, 0x5, 0x5) => {
                let mut values = Vec::with_capacity(x as usize + 1);
                for r in 0..=x {
                    values.push(self.registers.get_v(r)?);
                }
                self.memory.write(self.registers.get_i(), &values)?;
            }
            // Fx65 - LD V0..Vx, [I]
            (0xF, x, 0x6, 0x5) => {
                let i = self.registers.get_i();
                for r in 0..=x {
                    let value = self.memory.read_byte(i.wrapping_add(r as u16))?;
                    self.registers.set_v(r, value as u16)?;
                }
            }
            _ => return Err(Chip8Error::UnknownOpcode(opcode)),
        }
        Ok(())
    }
}
