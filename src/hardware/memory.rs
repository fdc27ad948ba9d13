//! An abstraction for the LC-3 memory: 65,536 words plus the image loader
//! and the memory-mapped keyboard status registers.

use crate::errors::ImageLoadError;
use crate::hardware::keyboard::KeyboardInputProvider;
use std::io::{ErrorKind, Read};

/// Total number of addressable 16-bit words.
pub const MEMORY_SIZE: usize = 1 << 16;
/// Conventional load origin for user programs; PC starts here.
pub const PC_START: u16 = 0x3000;

/// Addresses with device semantics on read.
#[derive(Debug, Copy, Clone)]
pub enum MemoryMappedIOLocations {
    /// Keyboard status register, bit 15 set while a key is pending.
    Kbsr = 0xFE00,
    /// Keyboard data register, the pending character.
    Kbdr = 0xFE02,
}

pub struct Memory {
    /// Index equals memory address
    data: Vec<u16>,
    keyboard: Box<dyn KeyboardInputProvider>,
}
impl Memory {
    #[must_use]
    pub fn new(keyboard: Box<dyn KeyboardInputProvider>) -> Self {
        Self {
            data: vec![0x0u16; MEMORY_SIZE],
            keyboard,
        }
    }

    /// Reads one word.
    ///
    /// Reading the keyboard status register polls the input provider and
    /// latches a pending character into the data register, so programs that
    /// busy-wait on KBSR/KBDR keep working.
    pub fn read(&mut self, addr: u16) -> u16 {
        if addr == MemoryMappedIOLocations::Kbsr as u16 {
            if self.keyboard.check_input_available().unwrap_or(false) {
                let c = self.keyboard.get_input_character();
                self.data[MemoryMappedIOLocations::Kbsr as usize] = 1 << 15;
                self.data[MemoryMappedIOLocations::Kbdr as usize] = u16::from(c);
            } else {
                self.data[MemoryMappedIOLocations::Kbsr as usize] = 0;
            }
        }
        self.data[usize::from(addr)]
    }

    pub fn write(&mut self, addr: u16, value: u16) {
        self.data[usize::from(addr)] = value;
    }

    pub fn keyboard(&mut self) -> &mut dyn KeyboardInputProvider {
        self.keyboard.as_mut()
    }

    /// Loads one object image: a big-endian origin word followed by
    /// big-endian program words placed at consecutive addresses.
    ///
    /// Reading stops at end-of-stream or at the end of memory, whichever
    /// comes first; a trailing odd byte is dropped. Loading several images
    /// merges them, later writes winning at overlapping addresses.
    ///
    /// # Errors
    /// - the stream is shorter than the two origin bytes
    /// - the stream reports a read failure
    pub fn load_image(&mut self, image: &mut impl Read) -> Result<(), ImageLoadError> {
        let Some(origin) = read_word(image)? else {
            return Err(ImageLoadError::ImageMissingOrigin);
        };
        let mut addr = usize::from(origin);
        while addr < MEMORY_SIZE {
            match read_word(image)? {
                Some(word) => {
                    self.data[addr] = word;
                    addr += 1;
                }
                None => break,
            }
        }
        Ok(())
    }

    #[cfg(test)]
    pub(crate) fn with_words(origin: u16, words: &[u16]) -> Self {
        use crate::hardware::keyboard::ReaderInputProvider;
        let mut memory = Self::new(Box::new(ReaderInputProvider::new(std::io::empty())));
        for (offset, word) in words.iter().enumerate() {
            memory.data[usize::from(origin) + offset] = *word;
        }
        memory
    }
}

/// One big-endian word from the stream; `None` at end-of-stream.
fn read_word(stream: &mut impl Read) -> Result<Option<u16>, ImageLoadError> {
    let mut word = [0u8; 2];
    match stream.read_exact(&mut word) {
        Ok(()) => Ok(Some(u16::from_be_bytes(word))),
        Err(e) if e.kind() == ErrorKind::UnexpectedEof => Ok(None),
        Err(e) => Err(ImageLoadError::ImageStreamUnreadable(e.to_string())),
    }
}
