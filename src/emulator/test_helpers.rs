//! Helpers shared by the unit tests: an in-memory stand-in for the console.

use crate::emulator::Emulator;
use crate::hardware::keyboard::ReaderInputProvider;
use crate::hardware::memory::Memory;
use crate::hardware::registers::Registers;
use std::io;
use std::io::{Cursor, Write};

pub struct StringWriter {
    vec: Vec<u8>,
}
impl Write for StringWriter {
    fn write(&mut self, data: &[u8]) -> Result<usize, io::Error> {
        self.vec.write(data)
    }
    fn flush(&mut self) -> Result<(), io::Error> {
        Ok(())
    }
}
impl StringWriter {
    pub fn new() -> Self {
        let vec = Vec::<u8>::with_capacity(120);
        Self { vec }
    }
    pub fn get_string(&self) -> String {
        String::from_utf8(self.vec.clone()).unwrap()
    }
}

/// Builds the byte form of an object image: the big-endian origin word
/// followed by the big-endian program words.
pub fn image_bytes(origin: u16, words: &[u16]) -> Vec<u8> {
    let mut bytes = Vec::with_capacity((words.len() + 1) * 2);
    bytes.extend_from_slice(&origin.to_be_bytes());
    for word in words {
        bytes.extend_from_slice(&word.to_be_bytes());
    }
    bytes
}

/// An emulator wired to canned keyboard input and a capturing writer.
pub struct FakeEmulator {
    inner: Emulator,
    stdout: StringWriter,
}
impl FakeEmulator {
    /// Emulator with `program` placed at 0x3000 and `stdin_data` queued as
    /// keyboard input.
    pub fn new(program: &[u16], stdin_data: &str) -> Self {
        let keyboard = ReaderInputProvider::new(Cursor::new(stdin_data.as_bytes().to_vec()));
        let mut inner = Emulator::new(keyboard);
        inner
            .load_image(&mut Cursor::new(image_bytes(0x3000, program)))
            .expect("Error loading test program");
        Self {
            inner,
            stdout: StringWriter::new(),
        }
    }
    pub fn get_parts(&mut self) -> (&mut Registers, &mut Memory, &mut StringWriter) {
        (
            &mut self.inner.registers,
            &mut self.inner.memory,
            &mut self.stdout,
        )
    }
    /// Runs to HALT and returns everything the program wrote.
    pub fn run(&mut self) -> String {
        self.inner
            .run(&mut self.stdout)
            .expect("Error running test program");
        self.stdout.get_string()
    }
    pub fn registers(&self) -> &Registers {
        &self.inner.registers
    }
}
