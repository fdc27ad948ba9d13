//! This code does emulate the trap routines but does not implement them via
//! the opcodes of the LC3 but directly.
//!
//! In the real system the code for these routines is at the target of the
//! [Trap Vector Tables](https://cs131.info/Assembly/Instructions/TRAPRoutines.html#trap-vector-table);
//! here the vector is decoded and the matching native routine is called, so
//! the table in low memory is never consulted and writes to it change
//! nothing.
use crate::emulator::instruction::Instruction;
use crate::errors::ExecutionError;
use crate::hardware::memory::Memory;
use crate::hardware::registers::{Registers, from_binary};
use std::io;
use std::io::Write;
use std::ops::ControlFlow;

const TRAP_GETC: u8 = 0x20;
const TRAP_OUT: u8 = 0x21;
const TRAP_PUTS: u8 = 0x22;
const TRAP_IN: u8 = 0x23;
const TRAP_PUTSP: u8 = 0x24;
const TRAP_HALT: u8 = 0x25;

/// Saves the return address into R7, then dispatches on the trap vector.
///
/// Unknown vectors have no defined behavior and are ignored. Trap routines
/// never update the condition flags.
pub fn execute(
    i: Instruction,
    regs: &mut Registers,
    memory: &mut Memory,
    stdout: &mut impl Write,
) -> ControlFlow<Result<(), ExecutionError>> {
    regs.set(7, regs.pc());
    match i.trap_vector() {
        TRAP_GETC => get_c(regs, memory),
        TRAP_OUT => out(regs, stdout),
        TRAP_PUTS => put_s(regs, memory, stdout),
        TRAP_IN => in_trap(regs, memory, stdout),
        TRAP_PUTSP => put_sp(regs, memory, stdout),
        TRAP_HALT => halt(stdout),
        _ => ControlFlow::Continue(()),
    }
}

/// GETC: Read a single character from the keyboard. The character is not
/// echoed onto the console.
///
/// Its ASCII code is copied into R0. The high eight bits of R0 are cleared.
pub fn get_c(
    regs: &mut Registers,
    memory: &mut Memory,
) -> ControlFlow<Result<(), ExecutionError>> {
    match memory.keyboard().read_char() {
        Ok(c) => {
            regs.set(0, from_binary(u16::from(c)));
            ControlFlow::Continue(())
        }
        Err(e) => wrap_io_error_in_cf(&e),
    }
}

/// IN: Print a prompt on the screen and read a single character echoed back
/// from the keyboard.
///
/// Otherwise, like 0x20 GETC.
pub fn in_trap(
    regs: &mut Registers,
    memory: &mut Memory,
    stdout: &mut impl Write,
) -> ControlFlow<Result<(), ExecutionError>> {
    write_bytes_out(b"Enter a character: ", stdout)?;
    let c = match memory.keyboard().read_char() {
        Ok(c) => c,
        Err(e) => return wrap_io_error_in_cf(&e),
    };
    regs.set(0, from_binary(u16::from(c)));
    write_bytes_out(&[c], stdout)
}

/// OUT: Write a character in R0\[7:0\] to the console display.
#[expect(
    clippy::cast_possible_truncation,
    reason = "OUT writes the low byte of R0"
)]
pub fn out(regs: &Registers, stdout: &mut impl Write) -> ControlFlow<Result<(), ExecutionError>> {
    let c = regs.get(0).as_binary() as u8;
    write_bytes_out(&[c], stdout)
}

#[expect(
    clippy::cast_possible_truncation,
    reason = "each word holds one character in its low byte"
)]
fn put_one_char_per_word(word: u16, append_to: &mut Vec<u8>) {
    append_to.push(word as u8);
}

#[expect(
    clippy::cast_possible_truncation,
    reason = "each word holds two characters, low byte first"
)]
fn put_two_chars_per_word(word: u16, append_to: &mut Vec<u8>) {
    append_to.push(word as u8);
    let second = (word >> 8) as u8;
    if second != 0 {
        append_to.push(second);
    }
}

/// Walks memory from the address in R0 until the 0x0000 terminator word,
/// collecting output bytes with `handle_word`.
fn put(
    regs: &Registers,
    memory: &mut Memory,
    stdout: &mut impl Write,
    handle_word: fn(u16, &mut Vec<u8>),
) -> ControlFlow<Result<(), ExecutionError>> {
    let mut address = regs.get(0).as_binary();
    let mut bytes = Vec::with_capacity(120);
    loop {
        let word = memory.read(address);
        if word == 0 {
            break;
        }
        handle_word(word, &mut bytes);
        address = address.wrapping_add(1);
    }
    write_bytes_out(&bytes, stdout)
}

/// PUTS: print null-delimited string of one character per word, starting at
/// the address in register 0
pub fn put_s(
    regs: &Registers,
    memory: &mut Memory,
    stdout: &mut impl Write,
) -> ControlFlow<Result<(), ExecutionError>> {
    put(regs, memory, stdout, put_one_char_per_word)
}

/// PUTSP: Packed version of PUTS
///
/// The ASCII code contained in bits \[7:0\] of a memory location is written
/// to the console first. The second character of the last memory location
/// can be 0x00. Writing terminates with a 0x0000 word.
pub fn put_sp(
    regs: &Registers,
    memory: &mut Memory,
    stdout: &mut impl Write,
) -> ControlFlow<Result<(), ExecutionError>> {
    put(regs, memory, stdout, put_two_chars_per_word)
}

/// HALT: print the halt notice and stop the run loop.
pub fn halt(stdout: &mut impl Write) -> ControlFlow<Result<(), ExecutionError>> {
    write_bytes_out(b"HALT\n", stdout)?;
    ControlFlow::Break(Ok(()))
}

fn write_bytes_out(
    message: &[u8],
    stdout: &mut impl Write,
) -> ControlFlow<Result<(), ExecutionError>> {
    match stdout.write_all(message).and_then(|()| stdout.flush()) {
        Ok(()) => ControlFlow::Continue(()),
        Err(e) => wrap_io_error_in_cf(&e),
    }
}

fn wrap_io_error_in_cf(error: &io::Error) -> ControlFlow<Result<(), ExecutionError>> {
    ControlFlow::Break(Err(ExecutionError::IOInputOutputError(error.to_string())))
}
