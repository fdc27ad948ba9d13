//! Keyboard input sources for the emulator.
//!
//! The non-blocking pair `check_input_available`/`get_input_character`
//! backs the memory-mapped keyboard status registers; `read_char` is the
//! blocking read the GETC and IN traps are built on.

use crossterm::event::{KeyCode, KeyEventKind, poll, read};
use std::io;
use std::io::BufRead;
use std::time::Duration;

pub trait KeyboardInputProvider {
    /// Checks for a pending character without blocking and latches it.
    fn check_input_available(&mut self) -> io::Result<bool>;
    /// Takes the latched character.
    ///
    /// # Panics
    /// - no character was latched by a prior `check_input_available`
    fn get_input_character(&mut self) -> u8;
    /// Reads the next character, blocking until one is available.
    fn read_char(&mut self) -> io::Result<u8>;
}

/// Input provider reading key events from the controlling terminal.
pub struct TerminalInputProvider {
    available_char: Option<u8>,
}
impl TerminalInputProvider {
    #[must_use]
    pub const fn new() -> Self {
        Self {
            available_char: None,
        }
    }
}
impl Default for TerminalInputProvider {
    fn default() -> Self {
        Self::new()
    }
}
impl KeyboardInputProvider for TerminalInputProvider {
    fn check_input_available(&mut self) -> io::Result<bool> {
        if self.available_char.is_some() {
            return Ok(true);
        }
        if poll(Duration::from_secs(0))?
            && let Some(event) = read()?.as_key_event()
            && event.kind != KeyEventKind::Release
            && let Some(c) = key_byte(event.code)
        {
            self.available_char = Some(c);
            return Ok(true);
        }
        Ok(false)
    }
    fn get_input_character(&mut self) -> u8 {
        self.available_char
            .take()
            .unwrap_or_else(|| panic!("No input available"))
    }
    fn read_char(&mut self) -> io::Result<u8> {
        if let Some(c) = self.available_char.take() {
            return Ok(c);
        }
        loop {
            if let Some(event) = read()?.as_key_event()
                && event.kind != KeyEventKind::Release
                && let Some(c) = key_byte(event.code)
            {
                return Ok(c);
            }
        }
    }
}

#[expect(
    clippy::cast_possible_truncation,
    reason = "guarded by is_ascii, the character fits one byte"
)]
fn key_byte(code: KeyCode) -> Option<u8> {
    match code {
        KeyCode::Char(c) if c.is_ascii() => Some(c as u8),
        KeyCode::Enter => Some(b'\n'),
        _ => None,
    }
}

/// Input provider over any buffered reader.
///
/// Serves piped stdin, where terminal key events are unavailable, and the
/// test suite.
pub struct ReaderInputProvider<R> {
    reader: R,
}
impl<R: BufRead> ReaderInputProvider<R> {
    pub const fn new(reader: R) -> Self {
        Self { reader }
    }
}
impl<R: BufRead> KeyboardInputProvider for ReaderInputProvider<R> {
    fn check_input_available(&mut self) -> io::Result<bool> {
        Ok(!self.reader.fill_buf()?.is_empty())
    }
    fn get_input_character(&mut self) -> u8 {
        let c = self
            .reader
            .fill_buf()
            .ok()
            .and_then(|buffered| buffered.first().copied())
            .unwrap_or_else(|| panic!("No input available"));
        self.reader.consume(1);
        c
    }
    fn read_char(&mut self) -> io::Result<u8> {
        let mut c = [0u8; 1];
        self.reader.read_exact(&mut c)?;
        Ok(c[0])
    }
}
