//! The emulator core: machine state plus the fetch–decode–execute loop.

pub mod instruction;
pub mod opcodes;
#[cfg(test)]
pub mod test_helpers;
pub mod trap_routines;

use crate::emulator::instruction::{Instruction, Opcode};
use crate::errors::{ExecutionError, ImageLoadError};
use crate::hardware::keyboard::KeyboardInputProvider;
use crate::hardware::memory::{Memory, PC_START};
use crate::hardware::registers::Registers;
use std::fs::File;
use std::io::{BufReader, Read, Write};
use std::ops::ControlFlow;
use std::path::Path;

/// The public facing emulator used to run LC-3 programs.
pub struct Emulator {
    pub(crate) memory: Memory,
    pub(crate) registers: Registers,
}
impl Emulator {
    /// Constructor method; memory zeroed, registers cleared, keyboard input
    /// drawn from `keyboard`.
    #[must_use]
    pub fn new(keyboard: impl KeyboardInputProvider + 'static) -> Self {
        Self {
            memory: Memory::new(Box::new(keyboard)),
            registers: Registers::new(),
        }
    }

    /// Loads one object image from a byte stream; see
    /// [`Memory::load_image`]. May be called repeatedly, later images
    /// winning at overlapping addresses.
    ///
    /// # Errors
    /// - the stream is shorter than the two origin bytes
    /// - the stream reports a read failure
    pub fn load_image(&mut self, image: &mut impl Read) -> Result<(), ImageLoadError> {
        self.memory.load_image(image)
    }

    /// Opens `path` and loads it as an object image.
    ///
    /// # Errors
    /// - the file cannot be opened or read as an image
    pub fn load_image_file(&mut self, path: &Path) -> Result<(), ImageLoadError> {
        let not_loadable = |message: String| ImageLoadError::ImageNotLoadable {
            file: path.display().to_string(),
            message,
        };
        let file = File::open(path).map_err(|e| not_loadable(e.to_string()))?;
        self.load_image(&mut BufReader::new(file))
            .map_err(|e| not_loadable(e.to_string()))
    }

    /// Runs from the 0x3000 origin until the program issues a HALT trap.
    ///
    /// # Errors
    /// - console I/O fails inside a trap routine
    pub fn run(&mut self, stdout: &mut impl Write) -> Result<(), ExecutionError> {
        self.registers.set_pc(PC_START);
        loop {
            let word = self.memory.read(self.registers.pc().as_binary());
            self.registers.inc_pc();
            if let ControlFlow::Break(result) = self.step(Instruction::from(word), stdout) {
                return result;
            }
        }
    }

    /// Executes one already-fetched instruction; PC points past it.
    fn step(
        &mut self,
        i: Instruction,
        stdout: &mut impl Write,
    ) -> ControlFlow<Result<(), ExecutionError>> {
        let regs = &mut self.registers;
        let memory = &mut self.memory;
        match i.opcode() {
            Opcode::Br => opcodes::br(i, regs),
            Opcode::Add => opcodes::add(i, regs),
            Opcode::Ld => opcodes::ld(i, regs, memory),
            Opcode::St => opcodes::st(i, regs, memory),
            Opcode::Jsr => opcodes::jsr(i, regs),
            Opcode::And => opcodes::and(i, regs),
            Opcode::Ldr => opcodes::ldr(i, regs, memory),
            Opcode::Str => opcodes::str(i, regs, memory),
            Opcode::Not => opcodes::not(i, regs),
            Opcode::Ldi => opcodes::ldi(i, regs, memory),
            Opcode::Sti => opcodes::sti(i, regs, memory),
            Opcode::Jmp => opcodes::jmp(i, regs),
            Opcode::Lea => opcodes::lea(i, regs),
            // Neither RTI nor the reserved opcode has user-visible behavior
            // on this machine.
            Opcode::Rti | Opcode::Res => {}
            Opcode::Trap => return trap_routines::execute(i, regs, memory, stdout),
        }
        ControlFlow::Continue(())
    }
}
