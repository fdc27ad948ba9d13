use std::io::{IsTerminal, stdin, stdout};
use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;

use lc3_vm::Emulator;
use lc3_vm::hardware::keyboard::{ReaderInputProvider, TerminalInputProvider};
use lc3_vm::terminal;

/// Runs LC-3 object images until the program issues a HALT trap.
#[derive(Parser)]
#[command(name = "lc3", version)]
struct Args {
    /// Object image files, loaded in order; later images win where they
    /// overlap
    #[arg(required = true, value_name = "IMAGE")]
    images: Vec<PathBuf>,
}

fn main() -> ExitCode {
    let args = Args::parse();

    let mut emulator = if stdin().is_terminal() {
        Emulator::new(TerminalInputProvider::new())
    } else {
        Emulator::new(ReaderInputProvider::new(stdin().lock()))
    };

    for path in &args.images {
        if let Err(error) = emulator.load_image_file(path) {
            eprintln!("{error}");
            return ExitCode::from(2);
        }
    }

    // Keypresses must reach the program unbuffered; restored on drop.
    let _raw_lock = if stdin().is_terminal() {
        match terminal::set_terminal_raw() {
            Ok(lock) => Some(lock),
            Err(error) => {
                eprintln!("cannot configure terminal: {error}");
                return ExitCode::FAILURE;
            }
        }
    } else {
        None
    };

    match emulator.run(&mut stdout()) {
        Ok(()) => ExitCode::SUCCESS,
        Err(error) => {
            eprintln!("{error}");
            ExitCode::FAILURE
        }
    }
}
