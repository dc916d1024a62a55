//! # quartz8
//!
//! A CHIP-8 virtual machine with the classic split between a deterministic
//! core and pluggable I/O.
//!
//! The core ([`memory`], [`registers`], [`timers`], the framebuffer in
//! [`display`] and the fetch-decode-execute loop in [`interpreter`]) owns
//! all emulator state and fails loudly through [`error::Chip8Error`]. The
//! edges are the [`display::DisplaySink`], [`input::Input`] and
//! [`sound::Sound`] traits: thin collaborators, so a TUI terminal, a test
//! buffer, or nothing at all can stand in for real hardware.
//!
//! Timers run on their own fixed-rate quartz clock (60 Hz by default),
//! decoupled from instruction throughput; the run loop interleaves their
//! ticks between instructions.

pub mod disasm;
pub mod display;
pub mod error;
pub mod input;
pub mod interpreter;
pub mod memory;
pub mod registers;
pub mod sound;
pub mod timers;
pub mod utils;
