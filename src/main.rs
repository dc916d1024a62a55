use std::error::Error;
use std::fs::File;
use std::path::PathBuf;

use clap::Parser;

use quartz8::disasm;
use quartz8::display::MonoTermDisplay;
use quartz8::input::StdinInput;
use quartz8::interpreter::{Chip8Interpreter, RunConfig};
use quartz8::sound::{Mute, SimpleBeep, Sound};
use quartz8::timers::TIMER_HZ;

#[derive(Parser, Debug)]
#[command(version, about = "CHIP-8 emulator for the terminal", long_about = None)]
struct Args {
    /// Path to the ROM file to run
    rom: PathBuf,

    /// Instructions per second
    #[arg(long, default_value_t = 700)]
    ips: u32,

    /// Timer rate in Hz
    #[arg(long, default_value_t = TIMER_HZ)]
    timer_hz: u32,

    /// Silence the sound timer's tone
    #[arg(long)]
    mute: bool,

    /// Print a disassembly of the ROM instead of running it
    #[arg(long)]
    disassemble: bool,
}

fn main() -> Result<(), Box<dyn Error>> {
    env_logger::init();
    let args = Args::parse();

    if args.disassemble {
        let rom = std::fs::read(&args.rom)?;
        print!("{}", disasm::disassemble(&rom));
        return Ok(());
    }

    let mut display = MonoTermDisplay::new()?;
    let mut input = StdinInput::new()?;
    let mut sound: Box<dyn Sound> = if args.mute {
        Box::new(Mute::new())
    } else {
        Box::new(SimpleBeep::new())
    };
    let mut interpreter = Chip8Interpreter::new(&mut display, &mut input, sound.as_mut())?;

    let mut f = File::open(&args.rom)?;
    interpreter.load_program(&mut f)?;

    let config = RunConfig {
        instructions_per_second: args.ips,
        timer_hz: args.timer_hz,
    };
    let outcome = interpreter.run(&config);

    // shove some junk on stdout to stop the cli messing up the last frame
    for _ in 0..12 {
        println!();
    }

    outcome?;
    Ok(())
}
