//! # LC-3 virtual machine.
//!
//! `lc3_vm` emulates the LC-3 educational computer: 65,536 words of memory,
//! eight general-purpose registers, condition flags, the 15-opcode
//! instruction set and the console trap routines. Programs are object
//! images, a big-endian origin word followed by big-endian instruction
//! words; execution starts at 0x3000 and ends with the HALT trap.
//!
//! # Example
//! ```
//! use std::io;
//! use std::io::Cursor;
//! use lc3_vm::emulator::Emulator;
//! use lc3_vm::hardware::keyboard::ReaderInputProvider;
//!
//! // A one-instruction image at the conventional origin: TRAP x25 (HALT).
//! let image: Vec<u8> = [0x3000u16, 0xF025]
//!     .iter()
//!     .flat_map(|word| word.to_be_bytes())
//!     .collect();
//! let mut emulator = Emulator::new(ReaderInputProvider::new(io::empty()));
//! emulator.load_image(&mut Cursor::new(image)).unwrap();
//! let mut output = Vec::new();
//! emulator.run(&mut output).unwrap();
//! assert_eq!(output, b"HALT\n");
//! ```
//! # Errors
//! - [`errors::ImageLoadError`] when an object image cannot be read
//! - [`errors::ExecutionError`] when console I/O fails during a trap

pub mod emulator;
pub mod errors;
pub mod hardware;
pub mod numbers;
pub mod terminal;

pub use emulator::Emulator;
